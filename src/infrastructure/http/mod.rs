//! HTTP REST API routes

mod model_routes;
mod object_routes;
mod session_layer;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::infrastructure::state::AppState;

pub use session_layer::session_middleware;

/// Create all API routes
///
/// The static `/model` routes take precedence over the `/{collection}`
/// parameter routes, so the model's session-scoped semantics never fall
/// through to the generic handlers.
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Active model routes
        .route("/model", get(model_routes::get_model))
        .route("/model", post(model_routes::create_model))
        .route("/model", put(model_routes::update_model))
        .route("/model/{id}", get(model_routes::get_model_by_id))
        .route("/model/{id}", put(model_routes::update_model_by_id))
        // Registry collection routes
        .route("/{collection}", get(object_routes::list_objects))
        .route("/{collection}", put(object_routes::create_object))
        .route("/{collection}", post(object_routes::create_object))
        .route("/{collection}/{id}", get(object_routes::get_object))
        .route("/{collection}/{id}", put(object_routes::update_object))
}
