//! Domain entities - Polymorphic objects with identity

mod object;

pub use object::{ChildRef, DomainObject, FieldValue};
