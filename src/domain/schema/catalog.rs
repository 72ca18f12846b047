//! Built-in variant registrations
//!
//! Field sets and defaults for every supported object type. Aliases let
//! clients address a variant by its package-level short path; the stored
//! and serialized tag is always the canonical one.

use chrono::Utc;
use serde_json::json;

use super::{Collection, FieldSpec, Schema, ScalarShape};
use crate::domain::value_objects::TypeTag;

fn schema(
    tag: &'static str,
    aliases: &[&'static str],
    collection: Collection,
    mut fields: Vec<FieldSpec>,
) -> Schema {
    let tag = TypeTag::new(tag);
    // every variant carries a display name, defaulting to its short name
    fields.insert(
        0,
        FieldSpec::scalar_with_default("name", ScalarShape::Text, json!(tag.short_name())),
    );
    Schema {
        tag,
        aliases: aliases.to_vec(),
        collection,
        fields,
    }
}

fn initializer(tag: &'static str, fields: Vec<FieldSpec>) -> Schema {
    schema(tag, &[], Collection::Initializer, fields)
}

pub(super) fn builtin_schemas() -> Vec<Schema> {
    use ScalarShape::*;

    let start_of_run = Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string();

    vec![
        schema(
            "spillsim.model.Model",
            &["spillsim.Model"],
            Collection::Model,
            vec![
                FieldSpec::scalar_with_default("start_time", Timestamp, json!(start_of_run)),
                FieldSpec::scalar_with_default("duration", Float, json!(86400.0)),
                FieldSpec::scalar_with_default("time_step", Float, json!(900.0)),
                FieldSpec::scalar_with_default("uncertain", Bool, json!(false)),
                FieldSpec::scalar_with_default("cache_enabled", Bool, json!(false)),
                FieldSpec::scalar_with_default("weathering_substeps", Integer, json!(1)),
                FieldSpec::object("map", Collection::Map),
                FieldSpec::object_list("environment", Collection::Environment),
                FieldSpec::object_list("movers", Collection::Mover),
                FieldSpec::object_list("weatherers", Collection::Weatherer),
                FieldSpec::object_list("outputters", Collection::Outputter),
                FieldSpec::object_list("spills", Collection::Spill),
            ],
        ),
        schema(
            "spillsim.map.GnomeMap",
            &["spillsim.map.Map"],
            Collection::Map,
            vec![FieldSpec::scalar_with_default(
                "refloat_halflife",
                Float,
                json!(1.0),
            )],
        ),
        schema(
            "spillsim.map.MapFromBNA",
            &[],
            Collection::Map,
            vec![
                FieldSpec::scalar("filename", Text),
                FieldSpec::scalar_with_default("refloat_halflife", Float, json!(1.0)),
            ],
        ),
        schema(
            "spillsim.environment.wind.Wind",
            &["spillsim.environment.Wind"],
            Collection::Environment,
            vec![
                FieldSpec::scalar_with_default("description", Text, json!("")),
                FieldSpec::scalar("updated_at", Timestamp),
                FieldSpec::scalar_with_default("source_type", Text, json!("undefined")),
                FieldSpec::scalar_with_default("source_id", Text, json!("undefined")),
                FieldSpec::scalar_with_default("units", Text, json!("meter per second")),
                FieldSpec::scalar_with_default("timeseries", Timeseries, json!([])),
            ],
        ),
        schema(
            "spillsim.movers.wind_mover.WindMover",
            &["spillsim.movers.WindMover"],
            Collection::Mover,
            vec![
                FieldSpec::scalar_with_default("on", Bool, json!(true)),
                FieldSpec::scalar_with_default("active_start", ActiveBound, json!("-inf")),
                FieldSpec::scalar_with_default("active_stop", ActiveBound, json!("inf")),
                FieldSpec::scalar_with_default("uncertain_angle_scale", Float, json!(0.4)),
                FieldSpec::scalar_with_default("uncertain_duration", Float, json!(3.0)),
                FieldSpec::scalar_with_default("uncertain_speed_scale", Float, json!(2.0)),
                FieldSpec::scalar_with_default("uncertain_time_delay", Float, json!(0.0)),
                FieldSpec::object("wind", Collection::Environment),
            ],
        ),
        schema(
            "spillsim.weatherers.core.Weatherer",
            &["spillsim.weatherers.Weatherer"],
            Collection::Weatherer,
            vec![
                FieldSpec::scalar_with_default("on", Bool, json!(true)),
                FieldSpec::scalar_with_default("active_start", ActiveBound, json!("-inf")),
                FieldSpec::scalar_with_default("active_stop", ActiveBound, json!("inf")),
            ],
        ),
        schema(
            "spillsim.outputters.renderer.Renderer",
            &["spillsim.outputters.Renderer"],
            Collection::Outputter,
            vec![
                FieldSpec::scalar_with_default("output_last_step", Bool, json!(true)),
                FieldSpec::scalar_with_default("output_zero_step", Bool, json!(true)),
                FieldSpec::scalar_with_default("draw_ontop", Text, json!("forecast")),
                FieldSpec::scalar("filename", Text),
                FieldSpec::scalar("images_dir", Text),
                FieldSpec::scalar_with_default("image_size", IntPair, json!([800, 600])),
                FieldSpec::scalar_with_default(
                    "viewport",
                    PointList,
                    json!([[-180.0, -90.0], [180.0, 90.0]]),
                ),
            ],
        ),
        schema(
            "spillsim.spills.spill.Spill",
            &["spillsim.spills.Spill"],
            Collection::Spill,
            vec![
                FieldSpec::scalar_with_default("on", Bool, json!(true)),
                FieldSpec::object("release", Collection::Release),
                FieldSpec::object("element_type", Collection::ElementType),
            ],
        ),
        schema(
            "spillsim.spills.release.PointLineRelease",
            &["spillsim.spills.PointLineRelease"],
            Collection::Release,
            vec![
                FieldSpec::scalar_with_default("num_elements", Integer, json!(1000)),
                FieldSpec::scalar("release_time", Timestamp),
                FieldSpec::scalar("end_release_time", Timestamp),
                FieldSpec::scalar_with_default("start_position", Position, json!([0.0, 0.0, 0.0])),
                FieldSpec::scalar_with_default("end_position", Position, json!([0.0, 0.0, 0.0])),
            ],
        ),
        schema(
            "spillsim.spills.elements.ElementType",
            &[],
            Collection::ElementType,
            vec![FieldSpec::object_map("initializers", Collection::Initializer)],
        ),
        initializer(
            "spillsim.spills.elements.InitWindages",
            vec![
                FieldSpec::scalar_with_default("windage_range", FloatPair, json!([0.01, 0.04])),
                FieldSpec::scalar_with_default("windage_persist", Integer, json!(900)),
            ],
        ),
        initializer("spillsim.spills.elements.InitMassComponentsFromOilProps", vec![]),
        initializer("spillsim.spills.elements.InitHalfLivesFromOilProps", vec![]),
        initializer("spillsim.spills.elements.InitMassFromTotalMass", vec![]),
        initializer("spillsim.spills.elements.InitMassFromVolume", vec![]),
        initializer("spillsim.spills.elements.InitMassFromPlume", vec![]),
        initializer("spillsim.spills.elements.InitRiseVelFromDist", vec![]),
    ]
}
