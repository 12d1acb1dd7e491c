use axum::response::Json;
use serde_json::{Value, json};

use crate::schema::EntityKind;

/// Liveness probe of the mock backend, listing the collections it serves.
pub async fn health() -> Json<Value> {
    let collections: Vec<&str> = EntityKind::ALL.iter().map(|k| k.collection()).collect();
    Json(json!({
        "status": "ok",
        "backend": "mock",
        "version": env!("CARGO_PKG_VERSION"),
        "collections": collections,
    }))
}
