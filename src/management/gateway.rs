use crate::{
    debug,
    error::GatewayError,
    remote::Remote,
    types::{Entity, EntityId, Fields, ListPage, ListParams},
};

/// Mediates every read and write against one remote collection and keeps
/// the local cache of it.
///
/// The cache only changes after the remote confirmed an operation. A failed
/// call leaves it exactly as it was.
pub struct DataGateway<R> {
    remote: R,
    collection: &'static str,
    cache: Vec<Entity>,
    total_pages: u32,
}

impl<R: Remote> DataGateway<R> {
    pub fn new(collection: &'static str, remote: R) -> Self {
        Self {
            remote,
            collection,
            cache: Vec::new(),
            total_pages: 0,
        }
    }

    pub fn collection(&self) -> &'static str {
        self.collection
    }

    pub fn cache(&self) -> &[Entity] {
        &self.cache
    }

    pub fn get(&self, id: &EntityId) -> Option<&Entity> {
        self.cache.iter().find(|e| &e.id == id)
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.get(id).is_some()
    }

    /// Page count reported by the last successful `list`.
    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// True when writes go to the local store instead of a server.
    pub fn is_offline(&self) -> bool {
        self.remote.is_local()
    }

    /// Fetches one page and replaces the cache with it.
    pub async fn list(&mut self, params: &ListParams) -> Result<ListPage, GatewayError> {
        let page = self.remote.list(self.collection, params).await?;
        debug!(
            "{}: listed {} items ({} pages)",
            self.collection,
            page.items.len(),
            page.total_pages
        );
        self.cache = page.items.clone();
        self.total_pages = page.total_pages;
        Ok(page)
    }

    /// Loads a single entity into the cache.
    pub async fn fetch(&mut self, id: &EntityId) -> Result<Entity, GatewayError> {
        let entity = self.remote.fetch(self.collection, id).await?;
        self.patch(entity.clone());
        Ok(entity)
    }

    pub async fn create(&mut self, fields: &Fields) -> Result<Entity, GatewayError> {
        let entity = self.remote.create(self.collection, fields).await?;
        self.patch(entity.clone());
        Ok(entity)
    }

    pub async fn update(&mut self, id: &EntityId, fields: &Fields) -> Result<Entity, GatewayError> {
        let entity = self.remote.update(self.collection, id, fields).await?;
        self.patch(entity.clone());
        Ok(entity)
    }

    /// Deletes an entity. An id the remote no longer knows counts as deleted,
    /// so repeating a delete is harmless.
    pub async fn delete(&mut self, id: &EntityId) -> Result<(), GatewayError> {
        match self.remote.delete(self.collection, id).await {
            Ok(()) => {}
            Err(GatewayError::NotFound(_)) => {
                debug!("{}: {} was already gone", self.collection, id);
            }
            Err(e) => return Err(e),
        }
        self.cache.retain(|e| &e.id != id);
        Ok(())
    }

    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, GatewayError> {
        self.remote.upload(file_name, bytes).await
    }

    fn patch(&mut self, entity: Entity) {
        match self.cache.iter_mut().find(|e| e.id == entity.id) {
            Some(slot) => *slot = entity,
            None => self.cache.push(entity),
        }
    }
}
