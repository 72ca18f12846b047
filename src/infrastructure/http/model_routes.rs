//! Active model API routes
//!
//! The model endpoints differ from the generic collection routes: the
//! model is session-scoped, created lazily on fetch, and replaced (never
//! duplicated) on create.

use axum::{
    body::Bytes,
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use super::object_routes::{error_response, parse_json_body, require_object_payload};
use crate::application::services::ActiveModel;
use crate::domain::value_objects::SessionId;
use crate::infrastructure::state::AppState;

/// Get the active model, default-constructing one when the session has
/// none. A lazily created model is wrapped under its short type name so
/// clients can tell the two cases apart.
pub async fn get_model(
    State(state): State<Arc<AppState>>,
    Extension(session_id): Extension<SessionId>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let handle = state.session(session_id).await;
    let mut entry = handle.lock().await;
    entry.touch();

    match state.model_service.get_or_create_active(&mut entry.workspace) {
        Ok(ActiveModel::Existing(model)) => Ok(Json(model)),
        Ok(ActiveModel::Created(model)) => Ok(Json(json!({ "Model": model }))),
        Err(err) => Err(error_response(err)),
    }
}

/// Get the model by id; 404 unless the id names the session's active model
pub async fn get_model_by_id(
    State(state): State<Arc<AppState>>,
    Extension(session_id): Extension<SessionId>,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let handle = state.session(session_id).await;
    let mut entry = handle.lock().await;
    entry.touch();

    state
        .model_service
        .fetch(&entry.workspace, &id)
        .map(Json)
        .map_err(error_response)
}

/// Create a new active model, replacing any current one. Unlike every
/// other create endpoint, the payload is optional: posting nothing yields
/// a blank model.
pub async fn create_model(
    State(state): State<Arc<AppState>>,
    Extension(session_id): Extension<SessionId>,
    body: Bytes,
) -> Result<Json<Value>, (StatusCode, String)> {
    let payload = match parse_json_body(&body)? {
        Some(Value::Object(map)) => Some(map),
        Some(Value::Null) | None => None,
        Some(_) => {
            return Err((
                StatusCode::BAD_REQUEST,
                "the model payload must be a JSON object".to_string(),
            ))
        }
    };
    let handle = state.session(session_id).await;
    let mut entry = handle.lock().await;
    entry.touch();

    state
        .model_service
        .create_active(&mut entry.workspace, payload.as_ref())
        .map(Json)
        .map_err(error_response)
}

/// Update the active model
pub async fn update_model(
    State(state): State<Arc<AppState>>,
    Extension(session_id): Extension<SessionId>,
    body: Bytes,
) -> Result<Json<Value>, (StatusCode, String)> {
    let payload = require_object_payload(&body)?;
    let handle = state.session(session_id).await;
    let mut entry = handle.lock().await;
    entry.touch();

    state
        .model_service
        .update_active(&mut entry.workspace, &payload)
        .map(Json)
        .map_err(error_response)
}

/// Update the active model by id; the id must match the active model
pub async fn update_model_by_id(
    State(state): State<Arc<AppState>>,
    Extension(session_id): Extension<SessionId>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, (StatusCode, String)> {
    let payload = require_object_payload(&body)?;
    let handle = state.session(session_id).await;
    let mut entry = handle.lock().await;
    entry.touch();

    state
        .model_service
        .update_active_with_id(&mut entry.workspace, &id, &payload)
        .map(Json)
        .map_err(error_response)
}
