//! Per-session mutable state
//!
//! Everything a client can reach is scoped to its session: the object
//! registry and the currently active model. The session layer serializes
//! access, so the workspace itself needs no interior locking.

use crate::domain::registry::ObjectRegistry;
use crate::domain::value_objects::ObjectId;

#[derive(Debug, Default)]
pub struct SessionWorkspace {
    pub registry: ObjectRegistry,
    /// The model currently bound to this session, if any.
    pub active_model: Option<ObjectId>,
}

impl SessionWorkspace {
    pub fn new() -> Self {
        Self::default()
    }
}
