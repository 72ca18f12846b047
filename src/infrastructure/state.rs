//! Shared application state

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::application::services::{ModelService, ObjectService};
use crate::domain::schema::SchemaCatalog;
use crate::domain::value_objects::SessionId;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::session::{SessionHandle, SessionManager};

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
    /// Live client sessions
    pub sessions: RwLock<SessionManager>,
    // Application services
    pub object_service: ObjectService,
    pub model_service: ModelService,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let catalog = Arc::new(SchemaCatalog::builtin());
        let session_idle_minutes = config.session_idle_minutes;

        Self {
            config,
            sessions: RwLock::new(SessionManager::new(session_idle_minutes)),
            object_service: ObjectService::new(catalog.clone()),
            model_service: ModelService::new(catalog),
        }
    }

    /// The workspace handle for a session, created on first use.
    pub async fn session(&self, id: SessionId) -> SessionHandle {
        self.sessions.write().await.get_or_create(id)
    }
}
