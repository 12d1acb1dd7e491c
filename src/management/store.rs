use std::{collections::HashMap, path::PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    debug,
    error::StoreError,
    management::query::{compare_entities, matches_filters, matches_search, page_window, total_pages},
    schema::EntityKind,
    types::{Entity, EntityId, Fields, ListPage, ListParams, Status},
    utils,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CollectionFile {
    /// Next id to hand out. Never decremented, so ids are not reused.
    next_id: u64,
    items: Vec<Entity>,
}

/// JSON-file store of entity collections.
///
/// Backs offline mode, where the local data is the system of record, and the
/// mock backend server. Each collection lives in `<root>/store/<name>.json`
/// and is loaded on first use. A mutation is applied to a copy of the
/// collection and only becomes visible once that copy is on disk, so a
/// failed write leaves the store as it was. Uploaded files go to
/// `<root>/media/`.
#[derive(Debug)]
pub struct LocalStore {
    root: PathBuf,
    collections: HashMap<String, CollectionFile>,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            collections: HashMap::new(),
        }
    }

    pub fn media_dir(&self) -> PathBuf {
        self.root.join("media")
    }

    pub async fn list(
        &mut self,
        collection: &str,
        params: &ListParams,
    ) -> Result<ListPage, StoreError> {
        let search_fields = search_fields_for(collection);
        let file = self.load(collection).await?;

        let mut items: Vec<&Entity> = file
            .items
            .iter()
            .filter(|e| {
                matches_search(
                    e,
                    &search_fields,
                    params.search.as_deref().unwrap_or_default(),
                ) && matches_filters(e, &params.filters)
            })
            .collect();
        if let Some(sort) = &params.sort {
            items.sort_by(|a, b| compare_entities(a, b, sort));
        }

        let page = match params.limit {
            Some(limit) if limit > 0 => {
                let limit = limit as usize;
                let page = params.page.unwrap_or(1) as usize;
                let window = page_window(items.len(), page, limit);
                ListPage {
                    total_pages: total_pages(items.len(), limit),
                    items: items[window].iter().map(|e| (*e).clone()).collect(),
                }
            }
            _ => ListPage {
                total_pages: 1,
                items: items.into_iter().cloned().collect(),
            },
        };
        Ok(page)
    }

    pub async fn get(&mut self, collection: &str, id: &EntityId) -> Result<Entity, StoreError> {
        let file = self.load(collection).await?;
        file.items
            .iter()
            .find(|e| &e.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    /// Inserts a new entity under a fresh id. Client-sent ids are ignored.
    pub async fn create(&mut self, collection: &str, fields: Fields) -> Result<Entity, StoreError> {
        let kind = EntityKind::from_collection(collection);
        let mut file = self.load(collection).await?.clone();

        let mut entity = Entity::new(EntityId::from(file.next_id.max(1)));
        apply_fields(&mut entity, fields);
        if entity.status.is_none() {
            entity.status = kind
                .and_then(|k| k.schema().default_status())
                .map(|s| Status::from(s.to_string()));
        }
        check_required(kind, &entity)?;

        let now = utils::now_timestamp();
        entity
            .fields
            .insert("created_at".to_string(), Value::String(now.clone()));
        entity
            .fields
            .insert("updated_at".to_string(), Value::String(now));

        file.next_id = file.next_id.max(1) + 1;
        file.items.push(entity.clone());
        self.commit(collection, file).await?;
        debug!("store: created {}/{}", collection, entity.id);
        Ok(entity)
    }

    /// Merges `fields` into an existing entity. A `null` value removes the
    /// field. The merged entity must still carry every required field.
    pub async fn update(
        &mut self,
        collection: &str,
        id: &EntityId,
        fields: Fields,
    ) -> Result<Entity, StoreError> {
        let kind = EntityKind::from_collection(collection);
        let mut file = self.load(collection).await?.clone();
        let slot = file
            .items
            .iter_mut()
            .find(|e| &e.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        let mut updated = slot.clone();
        apply_fields(&mut updated, fields);
        check_required(kind, &updated)?;
        updated.fields.insert(
            "updated_at".to_string(),
            Value::String(utils::now_timestamp()),
        );
        *slot = updated.clone();

        self.commit(collection, file).await?;
        debug!("store: updated {}/{}", collection, id);
        Ok(updated)
    }

    pub async fn delete(&mut self, collection: &str, id: &EntityId) -> Result<(), StoreError> {
        let mut file = self.load(collection).await?.clone();
        let before = file.items.len();
        file.items.retain(|e| &e.id != id);
        if file.items.len() == before {
            return Err(StoreError::NotFound(id.clone()));
        }

        self.commit(collection, file).await?;
        debug!("store: deleted {}/{}", collection, id);
        Ok(())
    }

    /// Stores an uploaded file under its content-addressed name and returns
    /// that name.
    pub async fn save_media(&self, original_name: &str, bytes: &[u8]) -> Result<String, StoreError> {
        let name = utils::media_file_name(bytes, original_name);
        let dir = self.media_dir();
        async_fs::create_dir_all(&dir).await?;
        async_fs::write(dir.join(&name), bytes).await?;
        Ok(name)
    }

    pub async fn read_media(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        if !utils::is_safe_file_name(name) {
            return Err(StoreError::InvalidPayload(format!("bad file name {:?}", name)));
        }
        Ok(async_fs::read(self.media_dir().join(name)).await?)
    }

    fn collection_path(&self, collection: &str) -> PathBuf {
        self.root.join("store").join(format!("{}.json", collection))
    }

    async fn load(&mut self, collection: &str) -> Result<&mut CollectionFile, StoreError> {
        if !utils::is_safe_file_name(collection) {
            return Err(StoreError::InvalidPayload(format!(
                "bad collection name {:?}",
                collection
            )));
        }

        if !self.collections.contains_key(collection) {
            let path = self.collection_path(collection);
            let file = match async_fs::read_to_string(&path).await {
                Ok(content) => serde_json::from_str(&content)?,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => CollectionFile::default(),
                Err(e) => return Err(StoreError::Io(e)),
            };
            self.collections.insert(collection.to_string(), file);
        }

        self.collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::InvalidPayload(format!("{} not loaded", collection)))
    }

    /// Writes `file` to disk and only then replaces the loaded collection.
    async fn commit(&mut self, collection: &str, file: CollectionFile) -> Result<(), StoreError> {
        let path = self.collection_path(collection);
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(&file)?;
        async_fs::write(&path, json).await?;
        self.collections.insert(collection.to_string(), file);
        Ok(())
    }
}

fn search_fields_for(collection: &str) -> Vec<String> {
    match EntityKind::from_collection(collection) {
        Some(kind) => kind
            .schema()
            .search_fields
            .iter()
            .map(|f| f.to_string())
            .collect(),
        None => vec!["title".to_string(), "name".to_string()],
    }
}

fn apply_fields(entity: &mut Entity, fields: Fields) {
    for (key, value) in fields {
        match key.as_str() {
            "id" | "_id" => {}
            "status" => {
                entity.status = match value {
                    Value::String(s) if !s.is_empty() => Some(Status::from(s)),
                    _ => None,
                }
            }
            _ if value.is_null() => {
                entity.fields.remove(&key);
            }
            _ => {
                entity.fields.insert(key, value);
            }
        }
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

fn check_required(kind: Option<EntityKind>, entity: &Entity) -> Result<(), StoreError> {
    let Some(kind) = kind else {
        return Ok(());
    };
    let missing: Vec<String> = kind
        .schema()
        .required_wire_fields()
        .into_iter()
        .filter(|name| is_blank(entity.fields.get(*name)))
        .map(str::to_string)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(StoreError::Validation(missing))
    }
}
