//! Registry object API routes
//!
//! One set of handlers serves every collection: the first path segment
//! names the collection (`/environment`, `/mover`, `/initializer`, ...)
//! and resolves against the schema catalog's collection set.

use axum::{
    body::Bytes,
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{Map as JsonMap, Value};
use std::sync::Arc;

use crate::application::services::ServiceError;
use crate::domain::schema::Collection;
use crate::domain::value_objects::SessionId;
use crate::infrastructure::state::AppState;

/// Map a service failure to its HTTP status.
pub(super) fn error_response(err: ServiceError) -> (StatusCode, String) {
    let status = match &err {
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::BadRequest(_)
        | ServiceError::TypeMismatch(_)
        | ServiceError::UnrecognizedType(_) => StatusCode::BAD_REQUEST,
    };
    (status, err.to_string())
}

/// Parse an optional JSON body; an empty body is `None`, malformed JSON
/// is a 400.
pub(super) fn parse_json_body(body: &Bytes) -> Result<Option<Value>, (StatusCode, String)> {
    if body.is_empty() {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("malformed JSON payload: {e}")))
}

/// The request body as a JSON object; 400 when absent or any other shape.
pub(super) fn require_object_payload(
    body: &Bytes,
) -> Result<JsonMap<String, Value>, (StatusCode, String)> {
    match parse_json_body(body)? {
        Some(Value::Object(map)) => Ok(map),
        _ => Err((
            StatusCode::BAD_REQUEST,
            "a JSON object payload is required".to_string(),
        )),
    }
}

fn parse_collection(path: &str) -> Result<Collection, (StatusCode, String)> {
    Collection::from_path(path).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            format!("no such collection: {path}"),
        )
    })
}

/// List all objects of a collection, keyed by id
pub async fn list_objects(
    State(state): State<Arc<AppState>>,
    Extension(session_id): Extension<SessionId>,
    Path(collection): Path<String>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let collection = parse_collection(&collection)?;
    let handle = state.session(session_id).await;
    let mut entry = handle.lock().await;
    entry.touch();

    Ok(Json(state.object_service.list(&entry.workspace, collection)))
}

/// Create an object in a collection
pub async fn create_object(
    State(state): State<Arc<AppState>>,
    Extension(session_id): Extension<SessionId>,
    Path(collection): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, (StatusCode, String)> {
    let collection = parse_collection(&collection)?;
    let payload = require_object_payload(&body)?;
    let handle = state.session(session_id).await;
    let mut entry = handle.lock().await;
    entry.touch();

    state
        .object_service
        .create(&mut entry.workspace, collection, &payload)
        .map(Json)
        .map_err(error_response)
}

/// Get an object by id
pub async fn get_object(
    State(state): State<Arc<AppState>>,
    Extension(session_id): Extension<SessionId>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let collection = parse_collection(&collection)?;
    let handle = state.session(session_id).await;
    let mut entry = handle.lock().await;
    entry.touch();

    state
        .object_service
        .get(&entry.workspace, collection, &id)
        .map(Json)
        .map_err(error_response)
}

/// Update an object by id
pub async fn update_object(
    State(state): State<Arc<AppState>>,
    Extension(session_id): Extension<SessionId>,
    Path((collection, id)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<Value>, (StatusCode, String)> {
    let collection = parse_collection(&collection)?;
    let payload = require_object_payload(&body)?;
    let handle = state.session(session_id).await;
    let mut entry = handle.lock().await;
    entry.touch();

    state
        .object_service
        .update(&mut entry.workspace, collection, &id, &payload)
        .map(Json)
        .map_err(error_response)
}
