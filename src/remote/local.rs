use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    error::{GatewayError, StoreError},
    management::LocalStore,
    remote::Remote,
    types::{Entity, EntityId, Fields, ListPage, ListParams},
};

/// Offline remote: the local store is the system of record.
///
/// Every mutation is persisted by the store before it returns, so a
/// successful response here is as final as a server confirmation.
#[derive(Debug, Clone)]
pub struct LocalRemote {
    store: Arc<Mutex<LocalStore>>,
}

impl LocalRemote {
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self::with_store(Arc::new(Mutex::new(LocalStore::new(root))))
    }

    pub fn with_store(store: Arc<Mutex<LocalStore>>) -> Self {
        Self { store }
    }
}

fn to_gateway_error(err: StoreError) -> GatewayError {
    match err {
        StoreError::NotFound(id) => GatewayError::NotFound(id),
        StoreError::Validation(missing) => {
            GatewayError::Rejected(format!("missing required fields: {}", missing.join(", ")))
        }
        other => GatewayError::Store(other),
    }
}

#[async_trait]
impl Remote for LocalRemote {
    async fn list(&self, collection: &str, params: &ListParams) -> Result<ListPage, GatewayError> {
        let mut store = self.store.lock().await;
        store
            .list(collection, params)
            .await
            .map_err(to_gateway_error)
    }

    async fn fetch(&self, collection: &str, id: &EntityId) -> Result<Entity, GatewayError> {
        let mut store = self.store.lock().await;
        store.get(collection, id).await.map_err(to_gateway_error)
    }

    async fn create(&self, collection: &str, fields: &Fields) -> Result<Entity, GatewayError> {
        let mut store = self.store.lock().await;
        store
            .create(collection, fields.clone())
            .await
            .map_err(to_gateway_error)
    }

    async fn update(
        &self,
        collection: &str,
        id: &EntityId,
        fields: &Fields,
    ) -> Result<Entity, GatewayError> {
        let mut store = self.store.lock().await;
        store
            .update(collection, id, fields.clone())
            .await
            .map_err(to_gateway_error)
    }

    async fn delete(&self, collection: &str, id: &EntityId) -> Result<(), GatewayError> {
        let mut store = self.store.lock().await;
        store.delete(collection, id).await.map_err(to_gateway_error)
    }

    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, GatewayError> {
        let store = self.store.lock().await;
        let name = store
            .save_media(file_name, &bytes)
            .await
            .map_err(to_gateway_error)?;
        Ok(format!("file://{}", store.media_dir().join(name).display()))
    }

    fn is_local(&self) -> bool {
        true
    }
}
