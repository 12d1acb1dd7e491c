//! # Remote Collections
//!
//! Clients of the remote entity collections. The [`Remote`] trait is the seam
//! between the data gateway and whatever holds the records:
//!
//! ```text
//! DataGateway (cache)
//!      ↓
//! Remote
//!   ├── HttpRemote   REST API over reqwest
//!   └── LocalRemote  local JSON store (offline / mock mode)
//! ```
//!
//! Both implementations report failures as [`GatewayError`]. Neither retries
//! and neither cancels in-flight requests.
//!
//! ## HTTP endpoints
//!
//! - `GET /{collection}?page&limit&search&status&category` → `{success, data[], totalPages}`
//! - `GET /{collection}/{id}` → entity
//! - `POST /{collection}` → created entity
//! - `PATCH /{collection}/{id}` → updated entity
//! - `DELETE /{collection}/{id}` → `{success}`
//! - `POST /uploads/{file_name}` → `{success, url}`

mod http;
mod local;

pub use http::HttpRemote;
pub use local::LocalRemote;

use async_trait::async_trait;

use crate::{
    error::GatewayError,
    types::{Entity, EntityId, Fields, ListPage, ListParams},
};

#[async_trait]
pub trait Remote: Send + Sync {
    async fn list(&self, collection: &str, params: &ListParams) -> Result<ListPage, GatewayError>;

    async fn fetch(&self, collection: &str, id: &EntityId) -> Result<Entity, GatewayError>;

    async fn create(&self, collection: &str, fields: &Fields) -> Result<Entity, GatewayError>;

    async fn update(
        &self,
        collection: &str,
        id: &EntityId,
        fields: &Fields,
    ) -> Result<Entity, GatewayError>;

    async fn delete(&self, collection: &str, id: &EntityId) -> Result<(), GatewayError>;

    /// Uploads a file and returns the URL it is served from.
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, GatewayError>;

    /// True when the remote is the local store rather than a server.
    fn is_local(&self) -> bool {
        false
    }
}

#[async_trait]
impl<R: Remote + ?Sized> Remote for Box<R> {
    async fn list(&self, collection: &str, params: &ListParams) -> Result<ListPage, GatewayError> {
        (**self).list(collection, params).await
    }

    async fn fetch(&self, collection: &str, id: &EntityId) -> Result<Entity, GatewayError> {
        (**self).fetch(collection, id).await
    }

    async fn create(&self, collection: &str, fields: &Fields) -> Result<Entity, GatewayError> {
        (**self).create(collection, fields).await
    }

    async fn update(
        &self,
        collection: &str,
        id: &EntityId,
        fields: &Fields,
    ) -> Result<Entity, GatewayError> {
        (**self).update(collection, id, fields).await
    }

    async fn delete(&self, collection: &str, id: &EntityId) -> Result<(), GatewayError> {
        (**self).delete(collection, id).await
    }

    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, GatewayError> {
        (**self).upload(file_name, bytes).await
    }

    fn is_local(&self) -> bool {
        (**self).is_local()
    }
}
