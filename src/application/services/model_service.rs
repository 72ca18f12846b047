//! Session-scoped active model lifecycle

use std::sync::Arc;

use serde_json::{Map as JsonMap, Value};

use super::ServiceError;
use crate::application::workspace::SessionWorkspace;
use crate::domain::merge::Merger;
use crate::domain::registry::Transaction;
use crate::domain::schema::SchemaCatalog;
use crate::domain::serialize::render;
use crate::domain::value_objects::ObjectId;

const MODEL_TAG: &str = "spillsim.model.Model";

/// Result of the lazy fetch path: whether the model already existed or
/// was default-constructed by the request.
pub enum ActiveModel {
    Existing(Value),
    Created(Value),
}

/// Create, fetch, and update the one model bound to a session.
#[derive(Clone)]
pub struct ModelService {
    catalog: Arc<SchemaCatalog>,
}

impl ModelService {
    pub fn new(catalog: Arc<SchemaCatalog>) -> Self {
        Self { catalog }
    }

    /// The session's active model, if one has been created.
    pub fn active(&self, workspace: &SessionWorkspace) -> Option<Value> {
        let id = workspace.active_model?;
        let obj = workspace.registry.get(id)?;
        Some(render(obj, &workspace.registry, &self.catalog))
    }

    /// Fetch by id: succeeds only when the id names the active model.
    pub fn fetch(&self, workspace: &SessionWorkspace, id: &str) -> Result<Value, ServiceError> {
        let not_found = || ServiceError::NotFound(id.to_string());
        let parsed = ObjectId::parse(id).ok_or_else(not_found)?;
        if workspace.active_model != Some(parsed) {
            return Err(not_found());
        }
        self.active(workspace).ok_or_else(not_found)
    }

    /// Install a brand-new model as the session's active model. Any
    /// previous model is detached, never mutated; the new id is always
    /// fresh, including across repeated no-payload creates.
    pub fn create_active(
        &self,
        workspace: &mut SessionWorkspace,
        payload: Option<&JsonMap<String, Value>>,
    ) -> Result<Value, ServiceError> {
        let merger = Merger::new(&self.catalog);
        let mut txn = Transaction::new(&workspace.registry);
        let id = merger.create_default(&mut txn, MODEL_TAG)?;
        if let Some(payload) = payload {
            if !payload.is_empty() {
                merger.update(&mut txn, id, payload)?;
            }
        }
        let staged = txn.into_staged();
        workspace.registry.apply(staged);
        workspace.active_model = Some(id);

        tracing::debug!(%id, "installed active model");
        self.active(workspace)
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))
    }

    /// The lazy fetch path: return the active model, default-constructing
    /// and installing one when the session has none yet.
    pub fn get_or_create_active(
        &self,
        workspace: &mut SessionWorkspace,
    ) -> Result<ActiveModel, ServiceError> {
        if let Some(model) = self.active(workspace) {
            return Ok(ActiveModel::Existing(model));
        }
        let model = self.create_active(workspace, None)?;
        Ok(ActiveModel::Created(model))
    }

    /// Merge a payload into the active model; `NotFound` when the session
    /// has no active model.
    pub fn update_active(
        &self,
        workspace: &mut SessionWorkspace,
        payload: &JsonMap<String, Value>,
    ) -> Result<Value, ServiceError> {
        let id = workspace
            .active_model
            .ok_or_else(|| ServiceError::NotFound("no active model".into()))?;

        let merger = Merger::new(&self.catalog);
        let mut txn = Transaction::new(&workspace.registry);
        merger.update(&mut txn, id, payload)?;
        let staged = txn.into_staged();
        workspace.registry.apply(staged);

        tracing::debug!(%id, "updated active model");
        self.active(workspace)
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))
    }

    /// Id-qualified update: the id must name the active model.
    pub fn update_active_with_id(
        &self,
        workspace: &mut SessionWorkspace,
        id: &str,
        payload: &JsonMap<String, Value>,
    ) -> Result<Value, ServiceError> {
        let parsed = ObjectId::parse(id).ok_or_else(|| ServiceError::NotFound(id.to_string()))?;
        if workspace.active_model != Some(parsed) {
            return Err(ServiceError::NotFound(id.to_string()));
        }
        self.update_active(workspace, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn service() -> ModelService {
        ModelService::new(Arc::new(SchemaCatalog::builtin()))
    }

    fn as_map(value: Value) -> JsonMap<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    fn model_payload() -> JsonMap<String, Value> {
        as_map(json!({
            "obj_type": "spillsim.model.Model",
            "cache_enabled": false,
            "duration": 86400.0,
            "start_time": "2014-04-09T15:00:00",
            "time_step": 900.0,
            "uncertain": false,
            "weathering_substeps": 1,
            "environment": [],
            "movers": [],
            "weatherers": [],
            "outputters": [],
            "spills": []
        }))
    }

    #[test]
    fn test_no_active_model_initially() {
        let service = service();
        let ws = SessionWorkspace::new();
        assert!(service.active(&ws).is_none());
    }

    #[test]
    fn test_create_twice_yields_distinct_ids() {
        let service = service();
        let mut ws = SessionWorkspace::new();

        let first = service.create_active(&mut ws, None).unwrap();
        let second = service.create_active(&mut ws, None).unwrap();
        assert_ne!(first["id"], second["id"]);

        // the second create fully replaces the first as active
        assert_eq!(service.active(&ws).unwrap()["id"], second["id"]);
    }

    #[test]
    fn test_create_with_payload_applies_fields() {
        let service = service();
        let mut ws = SessionWorkspace::new();

        let model = service.create_active(&mut ws, Some(&model_payload())).unwrap();
        assert_eq!(model["time_step"], json!(900.0));
        assert_eq!(model["start_time"], json!("2014-04-09T15:00:00"));
        assert_eq!(model["map"], Value::Null);
    }

    #[test]
    fn test_update_without_create_is_not_found() {
        let service = service();
        let mut ws = SessionWorkspace::new();

        let err = service.update_active(&mut ws, &model_payload()).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn test_update_preserves_id_and_applies_changes() {
        let service = service();
        let mut ws = SessionWorkspace::new();

        let model = service.create_active(&mut ws, Some(&model_payload())).unwrap();
        let id = model["id"].clone();

        let mut body = as_map(model);
        body.insert("time_step".to_string(), json!(1800.0));
        let updated = service.update_active(&mut ws, &body).unwrap();

        assert_eq!(updated["time_step"], json!(1800.0));
        assert_eq!(updated["id"], id);
    }

    #[test]
    fn test_fetch_only_matches_active_id() {
        let service = service();
        let mut ws = SessionWorkspace::new();

        let model = service.create_active(&mut ws, None).unwrap();
        let id = model["id"].as_str().unwrap().to_string();

        assert!(service.fetch(&ws, &id).is_ok());
        assert!(matches!(
            service.fetch(&ws, "deadbeef"),
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            service.fetch(&ws, &ObjectId::new().to_string()),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn test_get_or_create_installs_default_once() {
        let service = service();
        let mut ws = SessionWorkspace::new();

        let ActiveModel::Created(created) = service.get_or_create_active(&mut ws).unwrap() else {
            panic!("expected lazy creation");
        };
        let ActiveModel::Existing(existing) = service.get_or_create_active(&mut ws).unwrap()
        else {
            panic!("expected the installed model");
        };
        assert_eq!(created["id"], existing["id"]);
    }

    #[test]
    fn test_create_rejects_wrong_obj_type() {
        let service = service();
        let mut ws = SessionWorkspace::new();

        let err = service
            .create_active(
                &mut ws,
                Some(&as_map(json!({"obj_type": "spillsim.environment.Wind"}))),
            )
            .unwrap_err();
        assert!(matches!(err, ServiceError::TypeMismatch(_)));
    }
}
