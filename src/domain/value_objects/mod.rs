//! Value objects - Immutable domain primitives

mod ids;
mod time_bounds;
mod type_tag;

pub use ids::{ObjectId, SessionId};
pub use time_bounds::{parse_timestamp, TimeBound};
pub use type_tag::TypeTag;
