use thiserror::Error;

use crate::types::EntityId;

/// Failure of a call against the remote collection.
///
/// The variants exist for diagnostics only. Every variant renders as
/// `operation failed: ...` and callers are expected to treat them alike.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("operation failed: transport error: {0}")]
    Transport(String),

    #[error("operation failed: server responded with status {0}")]
    Status(u16),

    #[error("operation failed: rejected by server: {0}")]
    Rejected(String),

    #[error("operation failed: {0} not found")]
    NotFound(EntityId),

    #[error("operation failed: malformed response: {0}")]
    Decode(String),

    #[error("operation failed: {0}")]
    Store(#[from] StoreError),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GatewayError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            GatewayError::Status(status.as_u16())
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}

/// Failure of the local JSON store backing offline mode and the mock server.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("{0} not found")]
    NotFound(EntityId),

    #[error("missing required fields: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

/// Failure of a form interaction.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("no form is open")]
    NotOpen,

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("invalid value {value:?} for {field}: expected {expected}")]
    InvalidValue {
        field: String,
        expected: &'static str,
        value: String,
    },

    #[error("missing required fields: {}", .missing.join(", "))]
    Validation { missing: Vec<String> },

    #[error("{0} is not loaded")]
    UnknownEntity(EntityId),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl FormError {
    /// True for errors caught before anything was sent to the remote.
    pub fn is_validation(&self) -> bool {
        !matches!(self, FormError::Gateway(_))
    }
}
