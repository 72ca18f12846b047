//! Session-scoped object registry
//!
//! Maps opaque ids to live domain objects. All mutation goes through a
//! `Transaction`: merges stage every object they touch and the staged set
//! is committed in one step, so a rejected merge leaves the registry
//! exactly as it was.

use std::collections::HashMap;

use crate::domain::entities::DomainObject;
use crate::domain::schema::{Collection, SchemaCatalog};
use crate::domain::value_objects::ObjectId;

/// In-memory store of every domain object created within a session.
#[derive(Debug, Default)]
pub struct ObjectRegistry {
    objects: HashMap<ObjectId, DomainObject>,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ObjectId) -> Option<&DomainObject> {
        self.objects.get(&id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// All objects whose type is served under the given collection.
    pub fn in_collection<'a>(
        &'a self,
        catalog: &'a SchemaCatalog,
        collection: Collection,
    ) -> impl Iterator<Item = &'a DomainObject> {
        self.objects.values().filter(move |obj| {
            catalog
                .resolve(obj.obj_type().as_str())
                .is_some_and(|schema| schema.collection == collection)
        })
    }

    /// Apply a committed transaction's staged objects.
    pub fn apply(&mut self, staged: HashMap<ObjectId, DomainObject>) {
        self.objects.extend(staged);
    }
}

/// A staging overlay over the registry for one merge operation.
///
/// Reads see staged objects first, then the underlying store. Nothing is
/// written to the store until the caller takes the staged set with
/// [`Transaction::into_staged`] and applies it.
pub struct Transaction<'a> {
    registry: &'a ObjectRegistry,
    staged: HashMap<ObjectId, DomainObject>,
}

impl<'a> Transaction<'a> {
    pub fn new(registry: &'a ObjectRegistry) -> Self {
        Self {
            registry,
            staged: HashMap::new(),
        }
    }

    pub fn get(&self, id: ObjectId) -> Option<&DomainObject> {
        self.staged.get(&id).or_else(|| self.registry.get(id))
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.staged.contains_key(&id) || self.registry.contains(id)
    }

    /// Stage an object for commit, replacing any staged copy.
    pub fn stage(&mut self, object: DomainObject) {
        self.staged.insert(object.id(), object);
    }

    /// Consume the transaction, releasing its borrow of the registry.
    pub fn into_staged(self) -> HashMap<ObjectId, DomainObject> {
        self.staged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::DomainObject;
    use crate::domain::value_objects::TypeTag;

    fn wind() -> DomainObject {
        DomainObject::new(TypeTag::new("spillsim.environment.wind.Wind"))
    }

    #[test]
    fn test_staged_objects_invisible_until_applied() {
        let mut registry = ObjectRegistry::new();
        let obj = wind();
        let id = obj.id();

        let mut txn = Transaction::new(&registry);
        txn.stage(obj);
        assert!(txn.contains(id));

        // dropped without apply: nothing committed
        drop(txn);
        assert!(!registry.contains(id));

        let mut txn = Transaction::new(&registry);
        txn.stage(wind());
        let staged = txn.into_staged();
        registry.apply(staged);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_transaction_reads_through_to_store() {
        let mut registry = ObjectRegistry::new();
        let obj = wind();
        let id = obj.id();
        registry.apply(HashMap::from([(id, obj)]));

        let txn = Transaction::new(&registry);
        assert!(txn.get(id).is_some());
    }

    #[test]
    fn test_in_collection_filters_by_schema() {
        let catalog = SchemaCatalog::builtin();
        let mut registry = ObjectRegistry::new();
        let wind_obj = wind();
        let mover =
            DomainObject::new(TypeTag::new("spillsim.movers.wind_mover.WindMover"));
        registry.apply(HashMap::from([
            (wind_obj.id(), wind_obj),
            (mover.id(), mover),
        ]));

        assert_eq!(
            registry
                .in_collection(&catalog, Collection::Environment)
                .count(),
            1
        );
        assert_eq!(registry.in_collection(&catalog, Collection::Mover).count(), 1);
        assert_eq!(registry.in_collection(&catalog, Collection::Spill).count(), 0);
    }
}
