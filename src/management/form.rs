use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde_json::{Number, Value};

use crate::{
    error::FormError,
    management::DataGateway,
    remote::Remote,
    schema::{EntitySchema, FieldKind, FieldSpec},
    types::{Entity, Fields, Status, value_text},
    utils::{self, DATE_FORMAT},
};

/// A coerced form value. Tags and person names stay text until they are
/// mapped to the wire on submit.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Decimal(f64),
    Bool(bool),
    Date(NaiveDate),
}

impl FieldValue {
    /// Coerces raw input for a field kind. `None` when the input does not
    /// parse.
    pub fn coerce(kind: FieldKind, raw: &str) -> Option<FieldValue> {
        match kind {
            FieldKind::Integer => raw.trim().parse().ok().map(FieldValue::Integer),
            FieldKind::Decimal => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(FieldValue::Decimal),
            FieldKind::Bool => utils::parse_bool(raw).map(FieldValue::Bool),
            FieldKind::Date => utils::parse_date(raw).map(FieldValue::Date),
            _ => Some(FieldValue::Text(raw.to_string())),
        }
    }

    fn is_blank(&self) -> bool {
        matches!(self, FieldValue::Text(s) if s.trim().is_empty())
    }

    fn to_json(&self) -> Value {
        match self {
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Integer(n) => Value::from(*n),
            FieldValue::Decimal(n) => Number::from_f64(*n).map_or(Value::Null, Value::Number),
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Date(d) => Value::String(d.format(DATE_FORMAT).to_string()),
        }
    }
}

/// Uncommitted edit state of one entity.
#[derive(Debug, Clone, Default)]
pub struct Draft {
    original: Option<Entity>,
    values: BTreeMap<String, FieldValue>,
    status: Option<Status>,
}

impl Draft {
    pub fn is_new(&self) -> bool {
        self.original.is_none()
    }

    pub fn original(&self) -> Option<&Entity> {
        self.original.as_ref()
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }
}

/// Create/edit form of one entity type.
pub struct FormController {
    schema: &'static EntitySchema,
    draft: Option<Draft>,
}

impl FormController {
    pub fn new(schema: &'static EntitySchema) -> Self {
        Self {
            schema,
            draft: None,
        }
    }

    /// Opens the form empty for a create, or filled from `initial` for an
    /// edit. An already open draft is discarded.
    pub fn open(&mut self, initial: Option<&Entity>) {
        let mut draft = Draft {
            original: initial.cloned(),
            ..Draft::default()
        };
        if let Some(entity) = initial {
            for spec in self.schema.fields {
                if let Some(value) = read_wire(spec, entity) {
                    draft.values.insert(spec.name.to_string(), value);
                }
            }
            draft.status = entity.status.clone();
        }
        self.draft = Some(draft);
    }

    pub fn is_open(&self) -> bool {
        self.draft.is_some()
    }

    pub fn draft(&self) -> Option<&Draft> {
        self.draft.as_ref()
    }

    pub fn cancel(&mut self) {
        self.draft = None;
    }

    /// Sets a field from raw input, coercing it to the field's kind. Empty
    /// input clears the field. `status` is checked against the schema.
    pub fn set_field(&mut self, name: &str, raw: &str) -> Result<(), FormError> {
        let schema = self.schema;
        let draft = self.draft.as_mut().ok_or(FormError::NotOpen)?;

        if name == "status" {
            if raw.trim().is_empty() {
                draft.status = None;
            } else if schema.allows_status(raw.trim()) {
                draft.status = Some(Status::from(raw.trim().to_lowercase()));
            } else {
                return Err(FormError::InvalidValue {
                    field: name.to_string(),
                    expected: "a status allowed for this entity",
                    value: raw.to_string(),
                });
            }
            return Ok(());
        }

        let spec = schema
            .field(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?;

        if raw.trim().is_empty() {
            draft.values.remove(name);
            return Ok(());
        }

        let value = FieldValue::coerce(spec.kind, raw).ok_or_else(|| FormError::InvalidValue {
            field: name.to_string(),
            expected: spec.kind.expected(),
            value: raw.to_string(),
        })?;
        draft.values.insert(name.to_string(), value);
        Ok(())
    }

    /// Stores the URL returned by an upload in a field.
    pub fn attach(&mut self, name: &str, url: &str) -> Result<(), FormError> {
        self.set_field(name, url)
    }

    /// Required fields of the schema that are empty in the open draft.
    pub fn missing_required(&self) -> Vec<String> {
        let Some(draft) = &self.draft else {
            return Vec::new();
        };
        self.schema
            .required_fields()
            .filter(|spec| draft.values.get(spec.name).is_none_or(FieldValue::is_blank))
            .map(|spec| spec.name.to_string())
            .collect()
    }

    /// Validates the draft and hands it to the gateway: a create for a new
    /// entity, a patch with the changed fields for an existing one.
    ///
    /// On success the draft is discarded and the stored entity returned. On
    /// any error the draft stays open for correction.
    pub async fn submit<R: Remote>(
        &mut self,
        gateway: &mut DataGateway<R>,
    ) -> Result<Entity, FormError> {
        let draft = self.draft.as_ref().ok_or(FormError::NotOpen)?;

        let missing = self.missing_required();
        if !missing.is_empty() {
            return Err(FormError::Validation { missing });
        }

        let entity = match &draft.original {
            None => {
                let payload = self.create_payload(draft);
                gateway.create(&payload).await?
            }
            Some(original) => {
                let changes = self.update_payload(draft, original);
                if changes.is_empty() {
                    original.clone()
                } else {
                    gateway.update(&original.id, &changes).await?
                }
            }
        };

        self.draft = None;
        Ok(entity)
    }

    /// Full wire shape of the draft.
    fn wire_fields(&self, draft: &Draft) -> Fields {
        let mut fields = Fields::new();
        for spec in self.schema.fields {
            if let Some(value) = draft.values.get(spec.name) {
                write_wire(spec, value, &mut fields);
            }
        }
        if let Some(status) = &draft.status {
            fields.insert("status".to_string(), Value::String(status.to_string()));
        }
        fields
    }

    fn create_payload(&self, draft: &Draft) -> Fields {
        let mut fields = self.wire_fields(draft);
        if !fields.contains_key("status") {
            if let Some(status) = self.schema.default_status() {
                fields.insert("status".to_string(), Value::String(status.to_string()));
            }
        }
        fields
    }

    /// Fields whose wire value differs from the opened entity. Cleared
    /// fields are sent as `null`.
    fn update_payload(&self, draft: &Draft, original: &Entity) -> Fields {
        let current = self.wire_fields(draft);
        let mut changes = Fields::new();

        for spec in self.schema.fields {
            for key in wire_keys(spec) {
                match current.get(key) {
                    Some(value) if !same_value(original.fields.get(key), value) => {
                        changes.insert(key.to_string(), value.clone());
                    }
                    Some(_) => {}
                    None if original.fields.get(key).is_some_and(|v| !v.is_null()) => {
                        changes.insert(key.to_string(), Value::Null);
                    }
                    None => {}
                }
            }
        }

        if draft.status != original.status {
            let status = draft
                .status
                .as_ref()
                .map_or(Value::Null, |s| Value::String(s.to_string()));
            changes.insert("status".to_string(), status);
        }
        changes
    }
}

fn wire_keys(spec: &FieldSpec) -> Vec<&'static str> {
    match spec.kind {
        FieldKind::PersonName { first, last } => vec![first, last],
        _ => vec![spec.name],
    }
}

fn write_wire(spec: &FieldSpec, value: &FieldValue, fields: &mut Fields) {
    match (spec.kind, value) {
        (FieldKind::PersonName { first, last }, FieldValue::Text(name)) => {
            let (first_name, last_name) = utils::split_person_name(name);
            fields.insert(first.to_string(), Value::String(first_name));
            fields.insert(last.to_string(), Value::String(last_name));
        }
        (FieldKind::Tags, FieldValue::Text(tags)) => {
            let tags = utils::parse_tags(tags).into_iter().map(Value::String).collect();
            fields.insert(spec.name.to_string(), Value::Array(tags));
        }
        _ => {
            fields.insert(spec.name.to_string(), value.to_json());
        }
    }
}

/// Reverse of [`write_wire`]: the form value of a field of a stored entity.
/// Values that do not coerce are kept as text so an edit does not drop them.
fn read_wire(spec: &FieldSpec, entity: &Entity) -> Option<FieldValue> {
    let value = match spec.kind {
        FieldKind::PersonName { first, last } => {
            let first = entity.field_text(first).unwrap_or_default();
            let last = entity.field_text(last).unwrap_or_default();
            let name = utils::join_person_name(&first, &last);
            return (!name.is_empty()).then_some(FieldValue::Text(name));
        }
        _ => entity.fields.get(spec.name)?,
    };

    match (spec.kind, value) {
        (FieldKind::Integer, Value::Number(n)) if n.is_i64() => n.as_i64().map(FieldValue::Integer),
        (FieldKind::Decimal, Value::Number(n)) => n.as_f64().map(FieldValue::Decimal),
        (FieldKind::Bool, Value::Bool(b)) => Some(FieldValue::Bool(*b)),
        _ => {
            let text = value_text(value)?;
            FieldValue::coerce(spec.kind, &text).or(Some(FieldValue::Text(text)))
        }
    }
}

/// Wire equality that treats `10`, `10.0` and `"10"` as the same number, and
/// `"true"` as the same as `true`, since backends may store either form.
fn same_value(original: Option<&Value>, current: &Value) -> bool {
    match (original, current) {
        (Some(Value::Number(a)), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Some(Value::String(a)), Value::Number(b)) => {
            a.trim().parse::<f64>().ok() == b.as_f64()
        }
        (Some(Value::String(a)), Value::Bool(b)) => utils::parse_bool(a) == Some(*b),
        (Some(a), b) => a == b,
        (None, Value::String(s)) => s.is_empty(),
        (None, _) => false,
    }
}
