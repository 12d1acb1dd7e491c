//! # API Module
//!
//! HTTP handlers of the mock backend started by `lmsadm serve`. The mock
//! speaks the same wire format the HTTP remote expects, backed by a
//! [`LocalStore`](crate::management::LocalStore), so the CLI can be pointed
//! at it for local development and for integration tests.
//!
//! ## Endpoints
//!
//! - [`health`] - liveness and the list of served collections
//! - [`list`] / [`create`] - `GET` and `POST /{collection}`
//! - [`fetch`] / [`update`] / [`delete`] - `GET`, `PATCH`/`PUT` and
//!   `DELETE /{collection}/{id}`
//! - [`upload`] - `POST /uploads/{file_name}` with the raw file as body
//! - [`file`] - `GET /files/{name}` serving stored uploads
//!
//! Errors are answered as `{"success": false, "message": ...}` with a
//! status code matching the failure (404 unknown id or collection, 422
//! missing required fields, 400 malformed body).

mod collection;
mod health;

pub use collection::{ApiError, SharedStore, create, delete, fetch, file, list, update, upload};
pub use health::health;
