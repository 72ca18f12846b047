//! Type catalog and payload shape validation
//!
//! Every polymorphic variant is registered here with a schema: its
//! canonical dotted tag, accepted short aliases, the collection it belongs
//! to, and the names/shapes/defaults of its fields. The catalog is the
//! single lookup table the merger consults to resolve `obj_type` strings.

mod catalog;

use std::collections::HashMap;

use serde_json::Value;

use crate::domain::value_objects::{parse_timestamp, TimeBound, TypeTag};

/// Fields a sparse reference may carry as a local presentation overlay
/// without turning into a full specification.
pub const OVERLAY_FIELDS: &[&str] = &["name"];

/// The resource collection a variant is served under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Model,
    Map,
    Environment,
    Mover,
    Weatherer,
    Outputter,
    Spill,
    Release,
    ElementType,
    Initializer,
}

impl Collection {
    pub fn as_path(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Map => "map",
            Self::Environment => "environment",
            Self::Mover => "mover",
            Self::Weatherer => "weatherer",
            Self::Outputter => "outputter",
            Self::Spill => "spill",
            Self::Release => "release",
            Self::ElementType => "element_type",
            Self::Initializer => "initializer",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            "model" => Some(Self::Model),
            "map" => Some(Self::Map),
            "environment" => Some(Self::Environment),
            "mover" => Some(Self::Mover),
            "weatherer" => Some(Self::Weatherer),
            "outputter" => Some(Self::Outputter),
            "spill" => Some(Self::Spill),
            "release" => Some(Self::Release),
            "element_type" => Some(Self::ElementType),
            "initializer" => Some(Self::Initializer),
            _ => None,
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_path())
    }
}

/// Expected wire shape of a scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarShape {
    Bool,
    Integer,
    Float,
    Text,
    /// ISO-8601 timestamp string.
    Timestamp,
    /// `"-inf"` / `"inf"` sentinel or a timestamp.
    ActiveBound,
    /// Two-element numeric array.
    FloatPair,
    /// Two-element integer array.
    IntPair,
    /// Three-element numeric array (lon, lat, z).
    Position,
    /// List of two-element numeric arrays (e.g. a viewport's corners).
    PointList,
    /// List of (timestamp, [magnitude, direction]) pairs.
    Timeseries,
}

impl ScalarShape {
    /// Whether a JSON value matches this shape. `null` is handled by the
    /// merger, not here.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::Bool => value.is_boolean(),
            Self::Integer => value.as_i64().is_some() || value.as_u64().is_some(),
            Self::Float => value.is_number(),
            Self::Text => value.is_string(),
            Self::Timestamp => value
                .as_str()
                .is_some_and(|s| parse_timestamp(s).is_some()),
            Self::ActiveBound => value.as_str().is_some_and(|s| TimeBound::parse(s).is_some()),
            Self::FloatPair => is_number_array(value, 2),
            Self::IntPair => matches!(value, Value::Array(items)
                if items.len() == 2 && items.iter().all(|v| v.as_i64().is_some())),
            Self::Position => is_number_array(value, 3),
            Self::PointList => matches!(value, Value::Array(items)
                if items.iter().all(|v| is_number_array(v, 2))),
            Self::Timeseries => matches!(value, Value::Array(items)
                if items.iter().all(is_timeseries_entry)),
        }
    }
}

fn is_number_array(value: &Value, len: usize) -> bool {
    matches!(value, Value::Array(items)
        if items.len() == len && items.iter().all(Value::is_number))
}

fn is_timeseries_entry(value: &Value) -> bool {
    matches!(value, Value::Array(entry)
        if entry.len() == 2
            && entry[0].as_str().is_some_and(|s| parse_timestamp(s).is_some())
            && is_number_array(&entry[1], 2))
}

/// The structural kind of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Scalar(ScalarShape),
    /// A single nested object drawn from the given collection.
    Object(Collection),
    /// An ordered collection of nested objects.
    ObjectList(Collection),
    /// Named nested objects keyed by caller-chosen names.
    ObjectMap(Collection),
}

/// One field of a schema.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Applied at default construction; fields without one render as null
    /// until set.
    pub default: Option<Value>,
}

impl FieldSpec {
    pub fn scalar(name: &'static str, shape: ScalarShape) -> Self {
        Self {
            name,
            kind: FieldKind::Scalar(shape),
            default: None,
        }
    }

    pub fn scalar_with_default(name: &'static str, shape: ScalarShape, default: Value) -> Self {
        Self {
            name,
            kind: FieldKind::Scalar(shape),
            default: Some(default),
        }
    }

    pub fn object(name: &'static str, collection: Collection) -> Self {
        Self {
            name,
            kind: FieldKind::Object(collection),
            default: None,
        }
    }

    pub fn object_list(name: &'static str, collection: Collection) -> Self {
        Self {
            name,
            kind: FieldKind::ObjectList(collection),
            default: None,
        }
    }

    pub fn object_map(name: &'static str, collection: Collection) -> Self {
        Self {
            name,
            kind: FieldKind::ObjectMap(collection),
            default: None,
        }
    }
}

/// The full field schema of one registered variant.
#[derive(Debug, Clone)]
pub struct Schema {
    pub tag: TypeTag,
    pub aliases: Vec<&'static str>,
    pub collection: Collection,
    pub fields: Vec<FieldSpec>,
}

impl Schema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn short_name(&self) -> &str {
        self.tag.short_name()
    }
}

/// The polymorphic type resolver: tag string (canonical or alias) to
/// schema.
pub struct SchemaCatalog {
    schemas: Vec<Schema>,
    by_tag: HashMap<String, usize>,
}

impl SchemaCatalog {
    /// The built-in catalog of every supported variant.
    pub fn builtin() -> Self {
        Self::from_schemas(catalog::builtin_schemas())
    }

    fn from_schemas(schemas: Vec<Schema>) -> Self {
        let mut by_tag = HashMap::new();
        for (idx, schema) in schemas.iter().enumerate() {
            by_tag.insert(schema.tag.as_str().to_string(), idx);
            for alias in &schema.aliases {
                by_tag.insert(alias.to_string(), idx);
            }
        }
        Self { schemas, by_tag }
    }

    /// Resolve a tag, canonicalizing aliases; `None` for unrecognized tags.
    pub fn resolve(&self, tag: &str) -> Option<&Schema> {
        self.by_tag.get(tag).map(|&idx| &self.schemas[idx])
    }

    /// All schemas served under a collection.
    pub fn schemas_in(&self, collection: Collection) -> impl Iterator<Item = &Schema> {
        self.schemas
            .iter()
            .filter(move |s| s.collection == collection)
    }
}
