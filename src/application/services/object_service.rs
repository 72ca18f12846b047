//! Registry CRUD over a session workspace

use std::sync::Arc;

use serde_json::{Map as JsonMap, Value};

use super::ServiceError;
use crate::application::workspace::SessionWorkspace;
use crate::domain::merge::Merger;
use crate::domain::registry::Transaction;
use crate::domain::schema::{Collection, SchemaCatalog};
use crate::domain::serialize::render;
use crate::domain::value_objects::ObjectId;

/// Create, fetch, list, and update registry objects by collection.
#[derive(Clone)]
pub struct ObjectService {
    catalog: Arc<SchemaCatalog>,
}

impl ObjectService {
    pub fn new(catalog: Arc<SchemaCatalog>) -> Self {
        Self { catalog }
    }

    /// Create an object from a full payload. The payload must carry an
    /// `obj_type` resolving to a variant served under `collection`.
    pub fn create(
        &self,
        workspace: &mut SessionWorkspace,
        collection: Collection,
        payload: &JsonMap<String, Value>,
    ) -> Result<Value, ServiceError> {
        let tag = payload
            .get("obj_type")
            .and_then(Value::as_str)
            .ok_or_else(|| ServiceError::BadRequest("obj_type is required".into()))?;
        let schema = self
            .catalog
            .resolve(tag)
            .ok_or_else(|| ServiceError::UnrecognizedType(tag.to_string()))?;
        if schema.collection != collection {
            return Err(ServiceError::TypeMismatch(format!(
                "object of type {} is not a {collection} object",
                schema.tag
            )));
        }

        let merger = Merger::new(&self.catalog);
        let mut txn = Transaction::new(&workspace.registry);
        let id = merger.create(&mut txn, payload)?;
        let staged = txn.into_staged();
        workspace.registry.apply(staged);

        tracing::debug!(%id, collection = %collection, "created object");
        Ok(self.render_by_id(workspace, id))
    }

    /// Fetch one object. Ids that do not parse, do not exist, or belong
    /// to a different collection are all `NotFound`.
    pub fn get(
        &self,
        workspace: &SessionWorkspace,
        collection: Collection,
        id: &str,
    ) -> Result<Value, ServiceError> {
        let id = self.lookup(workspace, collection, id)?;
        Ok(self.render_by_id(workspace, id))
    }

    /// All objects of the collection, keyed by id.
    pub fn list(&self, workspace: &SessionWorkspace, collection: Collection) -> Value {
        let entries = workspace
            .registry
            .in_collection(&self.catalog, collection)
            .map(|obj| {
                (
                    obj.id().to_string(),
                    render(obj, &workspace.registry, &self.catalog),
                )
            })
            .collect();
        Value::Object(entries)
    }

    /// Merge a payload into an existing object.
    pub fn update(
        &self,
        workspace: &mut SessionWorkspace,
        collection: Collection,
        id: &str,
        payload: &JsonMap<String, Value>,
    ) -> Result<Value, ServiceError> {
        let id = self.lookup(workspace, collection, id)?;

        let merger = Merger::new(&self.catalog);
        let mut txn = Transaction::new(&workspace.registry);
        merger.update(&mut txn, id, payload)?;
        let staged = txn.into_staged();
        workspace.registry.apply(staged);

        tracing::debug!(%id, collection = %collection, "updated object");
        Ok(self.render_by_id(workspace, id))
    }

    fn lookup(
        &self,
        workspace: &SessionWorkspace,
        collection: Collection,
        id: &str,
    ) -> Result<ObjectId, ServiceError> {
        let not_found = || ServiceError::NotFound(id.to_string());
        let parsed = ObjectId::parse(id).ok_or_else(not_found)?;
        let obj = workspace.registry.get(parsed).ok_or_else(not_found)?;
        let in_collection = self
            .catalog
            .resolve(obj.obj_type().as_str())
            .is_some_and(|schema| schema.collection == collection);
        if !in_collection {
            return Err(not_found());
        }
        Ok(parsed)
    }

    fn render_by_id(&self, workspace: &SessionWorkspace, id: ObjectId) -> Value {
        workspace
            .registry
            .get(id)
            .map(|obj| render(obj, &workspace.registry, &self.catalog))
            .unwrap_or(Value::Null)
    }
}
