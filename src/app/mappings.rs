//! Entity mapping specifications for the vismooc output set.
//!
//! This is configuration data, not engine logic: each output entity is an
//! ordered list of stages over one or more source collections, and every
//! computed field is a named pure function registered here. The engine never
//! attaches meaning to any of these field names.
//!
//! Fields the new-MITx exports do not carry (for example the profile
//! `country`) are populated with literal nulls; the downstream vismooc pipe
//! only needs the subset produced here.

use serde_json::{Value, json};

use crate::app::models::{Collection, EntitySpec, FieldSource, Record, Stage, field_str};
use crate::app::services::diagnostics::Diagnostics;
use crate::app::services::timestamp;
use crate::constants::{
    TIMESTAMP_FORMAT_FORUM, TIMESTAMP_FORMAT_IN, TIMESTAMP_FORMAT_SQL,
    TIMESTAMP_FORMAT_STRUCTURE,
};
use crate::{Error, Result};

/// Build the full entity mapping table.
pub fn entity_specs() -> Vec<EntitySpec> {
    vec![
        structure_spec(),
        certificate_spec(),
        enrollment_spec(),
        user_spec(),
        profile_spec(),
        forum_spec(),
    ]
}

fn structure_spec() -> EntitySpec {
    EntitySpec {
        name: "structure",
        stages: vec![
            // The id field is temporary; the keyed post-process consumes it
            Stage::DirectCopy {
                source: "course_axis",
                fields: vec![
                    ("id", FieldSource::Copy("url_name")),
                    ("category", FieldSource::Copy("category")),
                ],
            },
            Stage::PerRecordCompute {
                source: "course_axis",
                fields: vec![("metadata", axis_metadata)],
            },
            Stage::PerRecordWithSiblingsCompute {
                source: "course_axis",
                fields: vec![("children", axis_children)],
            },
            Stage::PostProcess {
                transform: structure_keyed,
            },
        ],
    }
}

fn certificate_spec() -> EntitySpec {
    EntitySpec {
        name: "certificate",
        stages: vec![
            // id sourced from id_map_hash_id: shared identifier contract
            // with the enrollment entity, to be confirmed downstream
            Stage::DirectCopy {
                source: "user_info_combo",
                fields: vec![
                    ("id", FieldSource::Copy("id_map_hash_id")),
                    ("user_id", FieldSource::Copy("user_id")),
                    ("course_id", FieldSource::Copy("certificate_course_id")),
                ],
            },
            Stage::PerRecordCompute {
                source: "user_info_combo",
                fields: vec![
                    ("grade", certificate_grade),
                    ("created_date", certificate_created_date),
                ],
            },
        ],
    }
}

fn enrollment_spec() -> EntitySpec {
    EntitySpec {
        name: "enrollment",
        stages: vec![
            Stage::PerRecordCompute {
                source: "user_info_combo",
                fields: vec![("created", enrollment_created)],
            },
            Stage::DirectCopy {
                source: "user_info_combo",
                fields: vec![
                    ("id", FieldSource::Copy("id_map_hash_id")),
                    ("user_id", FieldSource::Copy("user_id")),
                    ("course_id", FieldSource::Copy("enrollment_course_id")),
                    ("is_active", FieldSource::Copy("enrollment_is_active")),
                ],
            },
        ],
    }
}

fn user_spec() -> EntitySpec {
    EntitySpec {
        name: "user",
        stages: vec![Stage::DirectCopy {
            source: "user_info_combo",
            fields: vec![
                ("id", FieldSource::Copy("user_id")),
                ("username", FieldSource::Copy("username")),
            ],
        }],
    }
}

fn profile_spec() -> EntitySpec {
    EntitySpec {
        name: "profile",
        stages: vec![Stage::DirectCopy {
            source: "user_info_combo",
            fields: vec![
                ("id", FieldSource::Copy("user_id")),
                ("name", FieldSource::Copy("profile_name")),
                ("language", FieldSource::Copy("profile_language")),
                ("location", FieldSource::Copy("profile_location")),
                ("year_of_birth", FieldSource::Copy("profile_year_of_birth")),
                (
                    "level_of_education",
                    FieldSource::Copy("profile_level_of_education"),
                ),
                ("goals", FieldSource::Copy("profile_goals")),
                ("gender", FieldSource::Copy("profile_gender")),
                ("country", FieldSource::Null),
            ],
        }],
    }
}

fn forum_spec() -> EntitySpec {
    EntitySpec {
        name: "forum",
        stages: vec![
            Stage::PerRecordCompute {
                source: "forum",
                fields: vec![
                    ("_id", forum_id),
                    ("created_at", forum_created_at),
                    ("updated_at", forum_updated_at),
                    ("comment_thread_id", forum_comment_thread_id),
                    ("parent_id", forum_parent_id),
                ],
            },
            Stage::DirectCopy {
                source: "forum",
                fields: vec![
                    ("course_id", FieldSource::Copy("course_id")),
                    ("author_id", FieldSource::Copy("author_id")),
                    ("body", FieldSource::Copy("body")),
                    ("_type", FieldSource::Copy("_type")),
                    ("title", FieldSource::Copy("title")),
                    ("thread_type", FieldSource::Copy("thread_type")),
                ],
            },
        ],
    }
}

// =============================================================================
// Named field transforms
// =============================================================================

/// Take a field value, tallying the anomaly and yielding null when absent.
fn take_field(record: &Record, field: &str, diagnostics: &mut Diagnostics) -> Value {
    match record.get(field) {
        Some(value) => value.clone(),
        None => {
            diagnostics.missing_field(field);
            Value::Null
        }
    }
}

/// Normalize a timestamp value into `out_format`, passing null through.
fn timestamp_value(value: &Value, out_format: &str) -> Result<Value> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::String(raw) => Ok(
            timestamp::normalize(Some(raw), TIMESTAMP_FORMAT_IN, out_format)?
                .map(Value::String)
                .unwrap_or(Value::Null),
        ),
        other => Err(Error::configuration(format!(
            "timestamp value is not a string: {}",
            other
        ))),
    }
}

/// Take a timestamp field and re-render it, tallying absence.
fn take_timestamp(
    record: &Record,
    field: &str,
    out_format: &str,
    diagnostics: &mut Diagnostics,
) -> Result<Value> {
    match record.get(field) {
        Some(value) => timestamp_value(value, out_format),
        None => {
            diagnostics.missing_field(field);
            Ok(Value::Null)
        }
    }
}

/// Category-dependent metadata object for a course-axis record.
fn axis_metadata(record: &Record, diagnostics: &mut Diagnostics) -> Result<Value> {
    if !record.contains_key("category") {
        return Ok(json!([]));
    }

    let display_name = take_field(record, "name", diagnostics);
    match field_str(record, "category") {
        Some("course") => Ok(json!({
            "display_name": display_name,
            "start": take_timestamp(record, "start", TIMESTAMP_FORMAT_STRUCTURE, diagnostics)?,
            "end": take_timestamp(record, "due", TIMESTAMP_FORMAT_STRUCTURE, diagnostics)?,
        })),
        Some("video") => {
            let youtube_id = match record.get("data").and_then(|d| d.get("ytid")) {
                Some(ytid) => ytid.clone(),
                None => {
                    diagnostics.missing_field("data.ytid");
                    Value::Null
                }
            };
            Ok(json!({
                "display_name": display_name,
                // the html path is absent from the new exports
                "html5_sources": [],
                "youtube_id_1_0": youtube_id,
            }))
        }
        _ => Ok(json!({ "display_name": display_name })),
    }
}

/// Children of a course-axis record: the url_names of every sibling whose
/// parent pointer equals this record's url_name, in source order.
fn axis_children(
    record: &Record,
    siblings: &Collection,
    diagnostics: &mut Diagnostics,
) -> Result<Value> {
    let Some(url_name) = field_str(record, "url_name") else {
        diagnostics.missing_field("url_name");
        return Ok(Value::Null);
    };

    let mut children = Vec::new();
    for sibling in siblings {
        if field_str(sibling, "parent") == Some(url_name) {
            match sibling.get("url_name") {
                Some(child) => children.push(child.clone()),
                None => {
                    diagnostics.missing_field("url_name");
                    children.push(Value::Null);
                }
            }
        }
    }

    Ok(Value::Array(children))
}

/// Collapse the structure collection into one record keyed by id.
fn structure_keyed(collection: Collection, diagnostics: &mut Diagnostics) -> Result<Collection> {
    let mut keyed = Record::new();
    for mut record in collection {
        match record.remove("id") {
            Some(Value::String(id)) => {
                keyed.insert(id, Value::Object(record));
            }
            _ => diagnostics.missing_field("id"),
        }
    }
    Ok(vec![keyed])
}

/// Certificate grade, defaulting to "0" when the export has none.
fn certificate_grade(record: &Record, _diagnostics: &mut Diagnostics) -> Result<Value> {
    Ok(record
        .get("certificate_grade")
        .cloned()
        .unwrap_or_else(|| json!("0")))
}

fn certificate_created_date(record: &Record, diagnostics: &mut Diagnostics) -> Result<Value> {
    take_timestamp(
        record,
        "certificate_created_date",
        TIMESTAMP_FORMAT_SQL,
        diagnostics,
    )
}

/// Enrollment creation time; the export carries no enrollment timestamp of
/// its own, so the certificate creation date stands in for it.
fn enrollment_created(record: &Record, diagnostics: &mut Diagnostics) -> Result<Value> {
    take_timestamp(
        record,
        "certificate_created_date",
        TIMESTAMP_FORMAT_SQL,
        diagnostics,
    )
}

fn forum_id(record: &Record, diagnostics: &mut Diagnostics) -> Result<Value> {
    Ok(json!({ "$oid": take_field(record, "mongoid", diagnostics) }))
}

fn forum_created_at(record: &Record, diagnostics: &mut Diagnostics) -> Result<Value> {
    Ok(json!({
        "$date": take_timestamp(record, "created_at", TIMESTAMP_FORMAT_FORUM, diagnostics)?
    }))
}

fn forum_updated_at(record: &Record, diagnostics: &mut Diagnostics) -> Result<Value> {
    Ok(json!({
        "$date": take_timestamp(record, "updated_at", TIMESTAMP_FORMAT_FORUM, diagnostics)?
    }))
}

fn forum_comment_thread_id(record: &Record, diagnostics: &mut Diagnostics) -> Result<Value> {
    Ok(json!({ "$oid": take_field(record, "comment_thread_id", diagnostics) }))
}

fn forum_parent_id(record: &Record, diagnostics: &mut Diagnostics) -> Result<Value> {
    Ok(json!({ "$oid": take_field(record, "parent_id", diagnostics) }))
}
