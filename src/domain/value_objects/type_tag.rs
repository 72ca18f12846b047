//! Dotted type-path tags identifying polymorphic object variants

use serde::{Deserialize, Serialize};

/// A fully-qualified type tag, e.g. `spillsim.environment.wind.Wind`.
///
/// The tag names both the concrete variant and its serialization schema.
/// Tags are compared canonically; short aliases are resolved to canonical
/// form by the schema catalog before they reach a stored object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeTag(String);

impl TypeTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The final dotted segment, used as the default display name and as
    /// the key in catalog listings.
    pub fn short_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }
}

impl std::fmt::Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TypeTag {
    fn from(tag: &str) -> Self {
        Self(tag.to_string())
    }
}
