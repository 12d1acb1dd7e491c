use std::{collections::BTreeMap, collections::HashMap, fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tabled::Tabled;

/// Named fields of an entity as they travel on the wire.
pub type Fields = Map<String, Value>;

/// Opaque identifier of an entity within its collection.
///
/// Backends disagree on the JSON type of ids, so both strings and integers
/// are accepted and kept as text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Integer(i64),
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => EntityId(s),
            RawId::Integer(n) => EntityId(n.to_string()),
        })
    }
}

/// Lifecycle status of an entity. Which values apply depends on the entity
/// type; anything outside the common four is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    Draft,
    Active,
    Published,
    Expired,
    Other(String),
}

impl Status {
    pub fn as_str(&self) -> &str {
        match self {
            Status::Draft => "draft",
            Status::Active => "active",
            Status::Published => "published",
            Status::Expired => "expired",
            Status::Other(s) => s,
        }
    }
}

impl From<String> for Status {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "draft" => Status::Draft,
            "active" => Status::Active,
            "published" => Status::Published,
            "expired" => Status::Expired,
            _ => Status::Other(s),
        }
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        status.as_str().to_string()
    }
}

impl FromStr for Status {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Status::from(s.to_string()))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One record of a manageable resource type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(alias = "_id")]
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(flatten)]
    pub fields: Fields,
}

impl Entity {
    pub fn new(id: impl Into<EntityId>) -> Self {
        Self {
            id: id.into(),
            status: None,
            fields: Fields::new(),
        }
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    /// Text rendering of an attribute or field, as used for search, filter
    /// equality and table cells. `id` and `status` resolve to the entity's
    /// own attributes.
    pub fn field_text(&self, name: &str) -> Option<String> {
        match name {
            "id" => Some(self.id.to_string()),
            "status" => self.status.as_ref().map(|s| s.to_string()),
            _ => self.fields.get(name).and_then(value_text),
        }
    }
}

/// Renders a scalar or list JSON value as display text. Null is absent.
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(value_text)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        Value::Object(_) => Some(value.to_string()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder {
    pub field: String,
    pub descending: bool,
}

impl FromStr for SortOrder {
    type Err = String;

    /// Parses `field` or `field:asc` / `field:desc`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, direction) = match s.split_once(':') {
            Some((field, direction)) => (field.trim(), direction.trim()),
            None => (s.trim(), "asc"),
        };
        if field.is_empty() {
            return Err(format!("missing sort field in {:?}", s));
        }
        let descending = match direction.to_lowercase().as_str() {
            "asc" => false,
            "desc" => true,
            other => return Err(format!("unknown sort direction {:?}", other)),
        };
        Ok(SortOrder {
            field: field.to_string(),
            descending,
        })
    }
}

const RESERVED_PARAMS: [&str; 5] = ["page", "limit", "search", "sort", "order"];

/// Query of one page of a remote collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub filters: BTreeMap<String, String>,
    pub sort: Option<SortOrder>,
}

impl ListParams {
    /// Parameters asking for the whole collection in one response.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(page) = self.page {
            query.push(("page".to_string(), page.to_string()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(search) = self.search.as_ref().filter(|s| !s.is_empty()) {
            query.push(("search".to_string(), search.clone()));
        }
        for (key, value) in &self.filters {
            query.push((key.clone(), value.clone()));
        }
        if let Some(sort) = &self.sort {
            query.push(("sort".to_string(), sort.field.clone()));
            let order = if sort.descending { "desc" } else { "asc" };
            query.push(("order".to_string(), order.to_string()));
        }
        query
    }

    /// Inverse of [`ListParams::to_query`]. Unparsable numbers are ignored.
    pub fn from_query(query: &HashMap<String, String>) -> Self {
        let sort = query.get("sort").filter(|s| !s.is_empty()).map(|field| SortOrder {
            field: field.clone(),
            descending: query
                .get("order")
                .is_some_and(|o| o.eq_ignore_ascii_case("desc")),
        });
        Self {
            page: query.get("page").and_then(|p| p.parse().ok()),
            limit: query.get("limit").and_then(|l| l.parse().ok()),
            search: query.get("search").filter(|s| !s.is_empty()).cloned(),
            filters: query
                .iter()
                .filter(|(k, _)| !RESERVED_PARAMS.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            sort,
        }
    }
}

/// One page of a remote collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListPage {
    pub items: Vec<Entity>,
    pub total_pages: u32,
}

fn default_success() -> bool {
    true
}

/// `{success, data[], totalPages}` list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListEnvelope {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub data: Vec<Entity>,
    #[serde(rename = "totalPages", default)]
    pub total_pages: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Single-entity response, either wrapped in `{success, data}` or bare.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityEnvelope {
    Wrapped {
        #[serde(default = "default_success")]
        success: bool,
        data: Entity,
    },
    Bare(Entity),
}

impl EntityEnvelope {
    pub fn into_entity(self) -> Entity {
        match self {
            EntityEnvelope::Wrapped { data, .. } => data,
            EntityEnvelope::Bare(entity) => entity,
        }
    }
}

/// `{success, message}` / `{success, url}` acknowledgement.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Tabled)]
pub struct FieldTableRow {
    pub field: String,
    pub value: String,
}

#[derive(Tabled)]
pub struct BulkDeleteTableRow {
    pub id: String,
    pub outcome: String,
}
