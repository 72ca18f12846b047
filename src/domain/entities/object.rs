//! The polymorphic domain object document model
//!
//! Every entity reachable from the aggregate root is a `DomainObject`: an
//! id assigned exactly once, a canonical type tag, and a bag of fields.
//! Nested objects are held by reference into the session registry rather
//! than inline, so the same instance can appear at several points in the
//! graph (a wind shared between a model's environment list and a mover).

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;

use crate::domain::value_objects::{ObjectId, TypeTag};

/// A reference from a parent object to a child in the registry.
///
/// The overlay carries presentation fields (currently `name`) applied on
/// top of the shared instance when this particular reference is rendered.
/// Overlay fields never mutate the registry instance itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildRef {
    pub id: ObjectId,
    pub overlay: serde_json::Map<String, Value>,
}

impl ChildRef {
    pub fn new(id: ObjectId) -> Self {
        Self {
            id,
            overlay: serde_json::Map::new(),
        }
    }

    pub fn with_overlay(id: ObjectId, overlay: serde_json::Map<String, Value>) -> Self {
        Self { id, overlay }
    }
}

/// A single stored field of a domain object.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Scalar JSON value (numbers, strings, booleans, positions,
    /// timeseries) stored as validated raw JSON.
    Scalar(Value),
    /// A single nested object.
    Child(ChildRef),
    /// An ordered collection of nested objects.
    Children(Vec<ChildRef>),
    /// Named sub-objects, keyed by name (e.g. element type initializers).
    NamedChildren(BTreeMap<String, ChildRef>),
}

/// An entity in the session registry.
#[derive(Debug, Clone)]
pub struct DomainObject {
    id: ObjectId,
    obj_type: TypeTag,
    fields: HashMap<String, FieldValue>,
}

impl DomainObject {
    /// Allocate a fresh object of the given canonical type with no fields.
    pub fn new(obj_type: TypeTag) -> Self {
        Self {
            id: ObjectId::new(),
            obj_type,
            fields: HashMap::new(),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn obj_type(&self) -> &TypeTag {
        &self.obj_type
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }

    pub fn clear_field(&mut self, name: &str) {
        self.fields.remove(name);
    }

    /// The current child reference under a single-object field, if any.
    pub fn child(&self, name: &str) -> Option<&ChildRef> {
        match self.fields.get(name) {
            Some(FieldValue::Child(child)) => Some(child),
            _ => None,
        }
    }

    /// The current references under a collection field; empty when the
    /// field is unset or holds a different shape.
    pub fn children(&self, name: &str) -> &[ChildRef] {
        match self.fields.get(name) {
            Some(FieldValue::Children(refs)) => refs,
            _ => &[],
        }
    }

    /// The current named references under a map field.
    pub fn named_children(&self, name: &str) -> Option<&BTreeMap<String, ChildRef>> {
        match self.fields.get(name) {
            Some(FieldValue::NamedChildren(map)) => Some(map),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_object_has_fresh_id() {
        let a = DomainObject::new(TypeTag::new("spillsim.model.Model"));
        let b = DomainObject::new(TypeTag::new("spillsim.model.Model"));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_scalar_field_overwrite() {
        let mut obj = DomainObject::new(TypeTag::new("spillsim.model.Model"));
        obj.set_field("time_step", FieldValue::Scalar(json!(900.0)));
        obj.set_field("time_step", FieldValue::Scalar(json!(1800.0)));
        assert_eq!(
            obj.field("time_step"),
            Some(&FieldValue::Scalar(json!(1800.0)))
        );
    }

    #[test]
    fn test_children_accessor_on_unset_field() {
        let obj = DomainObject::new(TypeTag::new("spillsim.model.Model"));
        assert!(obj.children("movers").is_empty());
        assert!(obj.child("map").is_none());
    }
}
