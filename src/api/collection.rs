use std::{collections::HashMap, sync::Arc};

use axum::{
    Extension,
    body::Bytes,
    extract::{Path, Query},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Json, Response},
};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    debug,
    error::StoreError,
    management::LocalStore,
    schema::EntityKind,
    types::{Ack, Entity, EntityId, ListEnvelope, ListParams},
};

pub type SharedStore = Arc<Mutex<LocalStore>>;

/// Error response `{success: false, message}` with a status code.
pub struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Ack {
            success: false,
            message: Some(self.1),
            url: None,
        };
        (self.0, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        let status = match &err {
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            StoreError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            StoreError::Io(_) | StoreError::Serde(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError(status, err.to_string())
    }
}

fn known_collection(collection: &str) -> Result<(), ApiError> {
    match EntityKind::from_collection(collection) {
        Some(_) => Ok(()),
        None => Err(ApiError(
            StatusCode::NOT_FOUND,
            format!("unknown collection {}", collection),
        )),
    }
}

fn object_body(body: Value) -> Result<serde_json::Map<String, Value>, ApiError> {
    match body {
        Value::Object(fields) => Ok(fields),
        _ => Err(ApiError(
            StatusCode::BAD_REQUEST,
            "expected a JSON object".to_string(),
        )),
    }
}

pub async fn list(
    Path(collection): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    Extension(store): Extension<SharedStore>,
) -> Result<Json<ListEnvelope>, ApiError> {
    known_collection(&collection)?;
    let params = ListParams::from_query(&query);
    debug!("mock: GET /{} {:?}", collection, params);

    let page = store.lock().await.list(&collection, &params).await?;
    Ok(Json(ListEnvelope {
        success: true,
        data: page.items,
        total_pages: page.total_pages,
        message: None,
    }))
}

pub async fn fetch(
    Path((collection, id)): Path<(String, String)>,
    Extension(store): Extension<SharedStore>,
) -> Result<Json<Entity>, ApiError> {
    known_collection(&collection)?;
    let entity = store
        .lock()
        .await
        .get(&collection, &EntityId::new(id))
        .await?;
    Ok(Json(entity))
}

pub async fn create(
    Path(collection): Path<String>,
    Extension(store): Extension<SharedStore>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Entity>), ApiError> {
    known_collection(&collection)?;
    let fields = object_body(body)?;
    let entity = store.lock().await.create(&collection, fields).await?;
    debug!("mock: created /{}/{}", collection, entity.id);
    Ok((StatusCode::CREATED, Json(entity)))
}

pub async fn update(
    Path((collection, id)): Path<(String, String)>,
    Extension(store): Extension<SharedStore>,
    Json(body): Json<Value>,
) -> Result<Json<Entity>, ApiError> {
    known_collection(&collection)?;
    let fields = object_body(body)?;
    let entity = store
        .lock()
        .await
        .update(&collection, &EntityId::new(id), fields)
        .await?;
    Ok(Json(entity))
}

pub async fn delete(
    Path((collection, id)): Path<(String, String)>,
    Extension(store): Extension<SharedStore>,
) -> Result<Json<Ack>, ApiError> {
    known_collection(&collection)?;
    store
        .lock()
        .await
        .delete(&collection, &EntityId::new(id))
        .await?;
    Ok(Json(Ack {
        success: true,
        message: None,
        url: None,
    }))
}

/// Stores the request body as a media file and answers with the URL it is
/// served from on this server.
pub async fn upload(
    Path(file_name): Path<String>,
    Extension(store): Extension<SharedStore>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Ack>, ApiError> {
    if body.is_empty() {
        return Err(ApiError(StatusCode::BAD_REQUEST, "empty upload".to_string()));
    }
    let name = store.lock().await.save_media(&file_name, &body).await?;
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    debug!("mock: stored upload {} as {}", file_name, name);

    Ok(Json(Ack {
        success: true,
        message: None,
        url: Some(format!("http://{}/files/{}", host, name)),
    }))
}

pub async fn file(
    Path(name): Path<String>,
    Extension(store): Extension<SharedStore>,
) -> Result<impl IntoResponse, ApiError> {
    let bytes = store.lock().await.read_media(&name).await.map_err(|e| match e {
        StoreError::Io(io) if io.kind() == std::io::ErrorKind::NotFound => {
            ApiError(StatusCode::NOT_FOUND, format!("{} not found", name))
        }
        other => ApiError::from(other),
    })?;
    Ok(([(header::CONTENT_TYPE, "application/octet-stream")], bytes))
}
