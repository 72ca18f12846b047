//! Registry-expanding JSON rendering
//!
//! A stored object holds its children by reference; rendering resolves
//! each reference through the registry and applies the reference's
//! overlay fields on top of the shared instance's own fields.

use serde_json::{json, Map as JsonMap, Value};

use crate::domain::entities::{ChildRef, DomainObject, FieldValue};
use crate::domain::registry::ObjectRegistry;
use crate::domain::schema::{FieldKind, SchemaCatalog};

/// Render an object to its full wire shape, fields in schema order.
pub fn render(obj: &DomainObject, registry: &ObjectRegistry, catalog: &SchemaCatalog) -> Value {
    let mut out = JsonMap::new();
    out.insert("id".to_string(), json!(obj.id().to_string()));
    out.insert("obj_type".to_string(), json!(obj.obj_type().as_str()));

    if let Some(schema) = catalog.resolve(obj.obj_type().as_str()) {
        for spec in &schema.fields {
            let value = match obj.field(spec.name) {
                Some(FieldValue::Scalar(v)) => v.clone(),
                Some(FieldValue::Child(child)) => render_ref(child, registry, catalog),
                Some(FieldValue::Children(refs)) => Value::Array(
                    refs.iter()
                        .map(|r| render_ref(r, registry, catalog))
                        .collect(),
                ),
                Some(FieldValue::NamedChildren(map)) => Value::Object(
                    map.iter()
                        .map(|(name, r)| (name.clone(), render_ref(r, registry, catalog)))
                        .collect(),
                ),
                None => match &spec.kind {
                    FieldKind::ObjectList(_) => json!([]),
                    FieldKind::ObjectMap(_) => json!({}),
                    _ => Value::Null,
                },
            };
            out.insert(spec.name.to_string(), value);
        }
    }

    Value::Object(out)
}

fn render_ref(child: &ChildRef, registry: &ObjectRegistry, catalog: &SchemaCatalog) -> Value {
    let Some(obj) = registry.get(child.id) else {
        // a dangling reference renders as null rather than poisoning the
        // whole response
        return Value::Null;
    };
    let mut rendered = render(obj, registry, catalog);
    if let Value::Object(map) = &mut rendered {
        for (key, value) in &child.overlay {
            map.insert(key.clone(), value.clone());
        }
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::merge::Merger;
    use crate::domain::registry::Transaction;

    fn as_map(value: Value) -> JsonMap<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_render_includes_every_schema_field() {
        let catalog = SchemaCatalog::builtin();
        let mut registry = ObjectRegistry::new();
        let merger = Merger::new(&catalog);

        let mut txn = Transaction::new(&registry);
        let id = merger.create_default(&mut txn, "spillsim.model.Model").unwrap();
        let staged = txn.into_staged();
        registry.apply(staged);

        let rendered = render(registry.get(id).unwrap(), &registry, &catalog);
        for key in [
            "id",
            "obj_type",
            "name",
            "start_time",
            "time_step",
            "duration",
            "cache_enabled",
            "uncertain",
            "weathering_substeps",
            "map",
            "environment",
            "movers",
            "weatherers",
            "outputters",
            "spills",
        ] {
            assert!(rendered.get(key).is_some(), "missing {key}");
        }
        assert_eq!(rendered["map"], Value::Null);
        assert_eq!(rendered["environment"], json!([]));
    }

    #[test]
    fn test_render_expands_children_recursively() {
        let catalog = SchemaCatalog::builtin();
        let mut registry = ObjectRegistry::new();
        let merger = Merger::new(&catalog);

        let payload = as_map(json!({
            "obj_type": "spillsim.spills.spill.Spill",
            "name": "What a Name",
            "release": {
                "obj_type": "spillsim.spills.release.PointLineRelease",
                "num_elements": 1000,
                "release_time": "2013-02-13T09:00:00"
            },
            "element_type": {
                "obj_type": "spillsim.spills.elements.ElementType",
                "initializers": {
                    "windages": {
                        "obj_type": "spillsim.spills.elements.InitWindages",
                        "windage_range": [0.01, 0.04],
                        "windage_persist": 900
                    }
                }
            }
        }));

        let mut txn = Transaction::new(&registry);
        let id = merger.create(&mut txn, &payload).unwrap();
        let staged = txn.into_staged();
        registry.apply(staged);

        let rendered = render(registry.get(id).unwrap(), &registry, &catalog);
        assert_eq!(rendered["release"]["num_elements"], json!(1000));
        assert_eq!(
            rendered["element_type"]["initializers"]["windages"]["windage_persist"],
            json!(900)
        );
        assert_eq!(
            rendered["element_type"]["initializers"]["windages"]["windage_range"],
            json!([0.01, 0.04])
        );
    }

    #[test]
    fn test_overlay_shadows_instance_fields_locally() {
        let catalog = SchemaCatalog::builtin();
        let mut registry = ObjectRegistry::new();
        let merger = Merger::new(&catalog);

        let mut txn = Transaction::new(&registry);
        let wind_id = merger
            .create(
                &mut txn,
                &as_map(json!({"obj_type": "spillsim.environment.Wind"})),
            )
            .unwrap();
        let model_id = merger.create_default(&mut txn, "spillsim.model.Model").unwrap();
        merger
            .update(
                &mut txn,
                model_id,
                &as_map(json!({
                    "environment": [{
                        "obj_type": "spillsim.environment.wind.Wind",
                        "id": wind_id.to_string(),
                        "name": "Custom Wind"
                    }]
                })),
            )
            .unwrap();
        let staged = txn.into_staged();
        registry.apply(staged);

        let model = render(registry.get(model_id).unwrap(), &registry, &catalog);
        assert_eq!(model["environment"][0]["name"], json!("Custom Wind"));
        assert_eq!(model["environment"][0]["id"], json!(wind_id.to_string()));

        // fetching the wind directly shows its own name
        let wind = render(registry.get(wind_id).unwrap(), &registry, &catalog);
        assert_eq!(wind["name"], json!("Wind"));
    }
}
