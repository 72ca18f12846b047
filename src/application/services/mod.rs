//! Application services

mod model_service;
mod object_service;

use thiserror::Error;

use crate::domain::merge::MergeError;

pub use model_service::{ActiveModel, ModelService};
pub use object_service::ObjectService;

/// Request-level failure taxonomy shared by the services. Every variant
/// is a recoverable, per-request condition the HTTP layer maps to a
/// status code.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("unrecognized object type: {0}")]
    UnrecognizedType(String),
}

impl From<MergeError> for ServiceError {
    fn from(err: MergeError) -> Self {
        match err {
            MergeError::UnrecognizedType(tag) => Self::UnrecognizedType(tag),
            MergeError::NotFound(id) => Self::NotFound(id),
            MergeError::BadPayload(msg) => Self::BadRequest(msg),
            mismatch @ (MergeError::TypeMismatch { .. } | MergeError::WrongCollection { .. }) => {
                Self::TypeMismatch(mismatch.to_string())
            }
        }
    }
}
