//! Nested graph merger
//!
//! Reconciles an incoming JSON payload into a target object inside a
//! registry transaction. Scalars overwrite in place; nested objects are
//! cleared, spliced from a sparse reference, or recursively
//! created-or-merged from a full specification; collection fields use
//! replace-collection semantics with per-element merge-by-id.
//!
//! Nothing here writes to the registry directly: every touched object is
//! staged on the transaction, and a failed merge is discarded by dropping
//! the transaction uncommitted.

use std::collections::BTreeMap;

use serde_json::{Map as JsonMap, Value};
use thiserror::Error;

use crate::domain::entities::{ChildRef, DomainObject, FieldValue};
use crate::domain::registry::Transaction;
use crate::domain::schema::{Collection, FieldKind, Schema, SchemaCatalog, OVERLAY_FIELDS};
use crate::domain::value_objects::ObjectId;

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("unrecognized object type: {0}")]
    UnrecognizedType(String),

    #[error("object type {payload} conflicts with target type {target}")]
    TypeMismatch { target: String, payload: String },

    #[error("object of type {tag} is not a {collection} object")]
    WrongCollection { tag: String, collection: Collection },

    #[error("object not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    BadPayload(String),
}

/// Schema-directed merge operations over a registry transaction.
pub struct Merger<'a> {
    catalog: &'a SchemaCatalog,
}

impl<'a> Merger<'a> {
    pub fn new(catalog: &'a SchemaCatalog) -> Self {
        Self { catalog }
    }

    /// Default-construct an object of the given type and stage it.
    pub fn create_default(
        &self,
        txn: &mut Transaction<'_>,
        tag: &str,
    ) -> Result<ObjectId, MergeError> {
        let schema = self.resolve(tag)?;
        let obj = self.default_object(schema);
        let id = obj.id();
        txn.stage(obj);
        Ok(id)
    }

    /// Create a new object from a full payload, staging it together with
    /// any implicitly created children. The payload must name its type.
    pub fn create(
        &self,
        txn: &mut Transaction<'_>,
        payload: &JsonMap<String, Value>,
    ) -> Result<ObjectId, MergeError> {
        let tag = payload
            .get("obj_type")
            .and_then(Value::as_str)
            .ok_or_else(|| MergeError::BadPayload("obj_type is required".into()))?;
        let schema = self.resolve(tag)?;
        let mut obj = self.default_object(schema);
        self.apply_fields(txn, &mut obj, schema, payload)?;
        let id = obj.id();
        txn.stage(obj);
        Ok(id)
    }

    /// Merge a payload into the existing object with the given id. The
    /// target's id and type identity never change; a payload `obj_type`
    /// that resolves to a different variant is rejected.
    pub fn update(
        &self,
        txn: &mut Transaction<'_>,
        id: ObjectId,
        payload: &JsonMap<String, Value>,
    ) -> Result<(), MergeError> {
        let mut target = txn
            .get(id)
            .cloned()
            .ok_or_else(|| MergeError::NotFound(id.to_string()))?;
        let schema = self.resolve(target.obj_type().as_str())?;
        if let Some(tag) = payload.get("obj_type").and_then(Value::as_str) {
            let payload_schema = self.resolve(tag)?;
            if payload_schema.tag != *target.obj_type() {
                return Err(MergeError::TypeMismatch {
                    target: target.obj_type().to_string(),
                    payload: payload_schema.tag.to_string(),
                });
            }
        }
        self.apply_fields(txn, &mut target, schema, payload)?;
        txn.stage(target);
        Ok(())
    }

    fn resolve(&self, tag: &str) -> Result<&'a Schema, MergeError> {
        self.catalog
            .resolve(tag)
            .ok_or_else(|| MergeError::UnrecognizedType(tag.to_string()))
    }

    fn default_object(&self, schema: &Schema) -> DomainObject {
        let mut obj = DomainObject::new(schema.tag.clone());
        for spec in &schema.fields {
            match &spec.kind {
                FieldKind::Scalar(_) => {
                    if let Some(default) = &spec.default {
                        obj.set_field(spec.name, FieldValue::Scalar(default.clone()));
                    }
                }
                FieldKind::Object(_) => {}
                FieldKind::ObjectList(_) => {
                    obj.set_field(spec.name, FieldValue::Children(Vec::new()));
                }
                FieldKind::ObjectMap(_) => {
                    obj.set_field(spec.name, FieldValue::NamedChildren(BTreeMap::new()));
                }
            }
        }
        obj
    }

    fn apply_fields(
        &self,
        txn: &mut Transaction<'_>,
        obj: &mut DomainObject,
        schema: &Schema,
        payload: &JsonMap<String, Value>,
    ) -> Result<(), MergeError> {
        for (key, value) in payload {
            if key == "id" || key == "obj_type" {
                continue;
            }
            // fields outside the schema (serialization markers etc.) are ignored
            let Some(spec) = schema.field(key) else {
                continue;
            };
            match &spec.kind {
                FieldKind::Scalar(shape) => {
                    if value.is_null() {
                        obj.set_field(spec.name, FieldValue::Scalar(Value::Null));
                    } else if shape.accepts(value) {
                        obj.set_field(spec.name, FieldValue::Scalar(value.clone()));
                    } else {
                        return Err(MergeError::BadPayload(format!(
                            "invalid value for field `{key}`"
                        )));
                    }
                }
                FieldKind::Object(collection) => {
                    if value.is_null() {
                        obj.clear_field(key);
                    } else if let Value::Object(child_payload) = value {
                        let existing = obj.child(key).cloned();
                        let child =
                            self.merge_child(txn, existing.as_ref(), child_payload, *collection)?;
                        obj.set_field(spec.name, FieldValue::Child(child));
                    } else {
                        return Err(MergeError::BadPayload(format!(
                            "field `{key}` expects an object"
                        )));
                    }
                }
                FieldKind::ObjectList(collection) => {
                    let Value::Array(items) = value else {
                        return Err(MergeError::BadPayload(format!(
                            "field `{key}` expects a list"
                        )));
                    };
                    // replace-collection semantics: entries absent from the
                    // incoming list are dropped from the target
                    let current = obj.children(key).to_vec();
                    let mut next = Vec::with_capacity(items.len());
                    for item in items {
                        let Value::Object(child_payload) = item else {
                            return Err(MergeError::BadPayload(format!(
                                "field `{key}` expects a list of objects"
                            )));
                        };
                        let existing = payload_id(child_payload)
                            .and_then(|id| current.iter().find(|r| r.id == id));
                        let child = self.merge_child(txn, existing, child_payload, *collection)?;
                        next.push(child);
                    }
                    obj.set_field(spec.name, FieldValue::Children(next));
                }
                FieldKind::ObjectMap(collection) => {
                    let Value::Object(entries) = value else {
                        return Err(MergeError::BadPayload(format!(
                            "field `{key}` expects a mapping"
                        )));
                    };
                    let current = obj.named_children(key).cloned().unwrap_or_default();
                    let mut next = BTreeMap::new();
                    for (entry_name, entry_value) in entries {
                        let Value::Object(child_payload) = entry_value else {
                            return Err(MergeError::BadPayload(format!(
                                "entry `{entry_name}` of field `{key}` expects an object"
                            )));
                        };
                        let existing = current.get(entry_name);
                        let child = self.merge_child(txn, existing, child_payload, *collection)?;
                        next.insert(entry_name.clone(), child);
                    }
                    obj.set_field(spec.name, FieldValue::NamedChildren(next));
                }
            }
        }
        Ok(())
    }

    /// Create-or-merge one nested object payload. This is the explicit
    /// sparse-reference vs full-specification decision: an id whose only
    /// companions are `obj_type` and overlay fields resolves an existing
    /// registry object; anything richer is a full specification.
    fn merge_child(
        &self,
        txn: &mut Transaction<'_>,
        existing: Option<&ChildRef>,
        payload: &JsonMap<String, Value>,
        collection: Collection,
    ) -> Result<ChildRef, MergeError> {
        if is_sparse_reference(payload) {
            let id_str = payload
                .get("id")
                .and_then(Value::as_str)
                .ok_or_else(|| MergeError::BadPayload("reference id must be a string".into()))?;
            let id = ObjectId::parse(id_str)
                .ok_or_else(|| MergeError::NotFound(id_str.to_string()))?;
            let resolved = txn
                .get(id)
                .ok_or_else(|| MergeError::NotFound(id_str.to_string()))?;
            if let Some(tag) = payload.get("obj_type").and_then(Value::as_str) {
                let payload_schema = self.resolve(tag)?;
                if payload_schema.tag != *resolved.obj_type() {
                    return Err(MergeError::TypeMismatch {
                        target: resolved.obj_type().to_string(),
                        payload: payload_schema.tag.to_string(),
                    });
                }
            }
            let resolved_schema = self.resolve(resolved.obj_type().as_str())?;
            if resolved_schema.collection != collection {
                return Err(MergeError::WrongCollection {
                    tag: resolved.obj_type().to_string(),
                    collection,
                });
            }
            Ok(ChildRef::with_overlay(id, overlay_fields(payload)))
        } else {
            match payload_id(payload) {
                // full specification addressing the current child: merge it
                // in place; the overlay is superseded by the merged fields
                Some(id) if existing.is_some_and(|e| e.id == id) => {
                    self.update(txn, id, payload)?;
                    Ok(ChildRef::new(id))
                }
                // no id, or an id the target does not currently hold:
                // create fresh; client payloads never mint ids
                _ => {
                    let id = self.create_in(txn, payload, collection)?;
                    Ok(ChildRef::new(id))
                }
            }
        }
    }

    fn create_in(
        &self,
        txn: &mut Transaction<'_>,
        payload: &JsonMap<String, Value>,
        collection: Collection,
    ) -> Result<ObjectId, MergeError> {
        let tag = payload
            .get("obj_type")
            .and_then(Value::as_str)
            .ok_or_else(|| MergeError::BadPayload("nested object requires obj_type".into()))?;
        let schema = self.resolve(tag)?;
        if schema.collection != collection {
            return Err(MergeError::WrongCollection {
                tag: schema.tag.to_string(),
                collection,
            });
        }
        let mut obj = self.default_object(schema);
        self.apply_fields(txn, &mut obj, schema, payload)?;
        let id = obj.id();
        txn.stage(obj);
        Ok(id)
    }
}

fn payload_id(payload: &JsonMap<String, Value>) -> Option<ObjectId> {
    payload
        .get("id")
        .and_then(Value::as_str)
        .and_then(ObjectId::parse)
}

fn is_sparse_reference(payload: &JsonMap<String, Value>) -> bool {
    payload.contains_key("id")
        && payload
            .keys()
            .all(|k| k == "id" || k == "obj_type" || OVERLAY_FIELDS.contains(&k.as_str()))
}

fn overlay_fields(payload: &JsonMap<String, Value>) -> JsonMap<String, Value> {
    payload
        .iter()
        .filter(|(k, _)| OVERLAY_FIELDS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
