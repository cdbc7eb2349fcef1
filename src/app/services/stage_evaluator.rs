//! Evaluation of individual mapping stages.
//!
//! Given a stage and the working set of source collections, produces one
//! partial record per source record. Missing source fields in a direct-copy
//! stage are recoverable: the output field is null and the anomaly is
//! tallied. Computed stages decide field presence themselves through the
//! transform functions they carry.

use serde_json::Value;
use tracing::debug;

use crate::app::models::{Collection, FieldSource, Record, RecordSet, Stage};
use crate::app::services::diagnostics::Diagnostics;
use crate::{Error, Result};

/// Evaluate one non-PostProcess stage into a list of partial records.
///
/// PostProcess stages operate on an already concatenated collection and are
/// applied by the mapping engine, not here.
pub fn evaluate(
    stage: &Stage,
    sources: &RecordSet,
    diagnostics: &mut Diagnostics,
) -> Result<Collection> {
    match stage {
        Stage::DirectCopy { source, fields } => {
            let records = sources.get(source)?;
            debug!(
                "Direct copy of {} fields over {} '{}' records",
                fields.len(),
                records.len(),
                source
            );
            Ok(records
                .iter()
                .map(|record| direct_copy(record, fields, diagnostics))
                .collect())
        }

        Stage::PerRecordCompute { source, fields } => {
            let records = sources.get(source)?;
            debug!(
                "Computing {} fields over {} '{}' records",
                fields.len(),
                records.len(),
                source
            );
            let mut partial = Collection::with_capacity(records.len());
            for record in records {
                let mut out = Record::new();
                for (out_field, transform) in fields {
                    out.insert(out_field.to_string(), transform(record, diagnostics)?);
                }
                partial.push(out);
            }
            Ok(partial)
        }

        Stage::PerRecordWithSiblingsCompute { source, fields } => {
            let records = sources.get(source)?;
            debug!(
                "Computing {} sibling-aware fields over {} '{}' records",
                fields.len(),
                records.len(),
                source
            );
            let mut partial = Collection::with_capacity(records.len());
            for record in records {
                let mut out = Record::new();
                for (out_field, transform) in fields {
                    out.insert(
                        out_field.to_string(),
                        transform(record, records, diagnostics)?,
                    );
                }
                partial.push(out);
            }
            Ok(partial)
        }

        Stage::PostProcess { .. } => Err(Error::configuration(
            "post-process stage cannot be evaluated against a source collection",
        )),
    }
}

/// Copy the mapped fields out of one record, substituting null and tallying
/// the anomaly for each absent source field.
fn direct_copy(
    record: &Record,
    fields: &[(&'static str, FieldSource)],
    diagnostics: &mut Diagnostics,
) -> Record {
    fields
        .iter()
        .map(|(out_field, source)| {
            let value = match source {
                FieldSource::Null => Value::Null,
                FieldSource::Copy(src_field) => match record.get(*src_field) {
                    Some(value) => value.clone(),
                    None => {
                        diagnostics.missing_field(src_field);
                        Value::Null
                    }
                },
            };
            (out_field.to_string(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(pairs: &[(&str, Value)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn sources_with(name: &str, records: Collection) -> RecordSet {
        let mut set = RecordSet::new();
        set.insert(name, records);
        set
    }

    #[test]
    fn test_direct_copy_renames_fields() {
        let sources = sources_with(
            "user_info_combo",
            vec![record(&[
                ("user_id", json!("1")),
                ("username", json!("alice")),
            ])],
        );
        let stage = Stage::DirectCopy {
            source: "user_info_combo",
            fields: vec![
                ("id", FieldSource::Copy("user_id")),
                ("username", FieldSource::Copy("username")),
            ],
        };

        let mut diag = Diagnostics::new();
        let partial = evaluate(&stage, &sources, &mut diag).unwrap();

        assert_eq!(partial.len(), 1);
        assert_eq!(partial[0]["id"], "1");
        assert_eq!(partial[0]["username"], "alice");
        assert!(diag.is_empty());
    }

    #[test]
    fn test_direct_copy_missing_field_yields_null_and_is_tallied() {
        let sources = sources_with(
            "user_info_combo",
            vec![record(&[("user_id", json!("1"))])],
        );
        let stage = Stage::DirectCopy {
            source: "user_info_combo",
            fields: vec![
                ("id", FieldSource::Copy("user_id")),
                ("username", FieldSource::Copy("username")),
            ],
        };

        let mut diag = Diagnostics::new();
        let partial = evaluate(&stage, &sources, &mut diag).unwrap();

        assert_eq!(partial[0]["username"], Value::Null);
        assert_eq!(diag.count("username"), 1);
        assert_eq!(diag.total(), 1);
    }

    #[test]
    fn test_direct_copy_null_literal() {
        let sources = sources_with("user_info_combo", vec![record(&[("id", json!("1"))])]);
        let stage = Stage::DirectCopy {
            source: "user_info_combo",
            fields: vec![("country", FieldSource::Null)],
        };

        let mut diag = Diagnostics::new();
        let partial = evaluate(&stage, &sources, &mut diag).unwrap();

        assert_eq!(partial[0]["country"], Value::Null);
        assert!(diag.is_empty());
    }

    #[test]
    fn test_per_record_compute() {
        fn upper_body(d: &Record, diag: &mut Diagnostics) -> Result<Value> {
            match d.get("body").and_then(Value::as_str) {
                Some(s) => Ok(json!(s.to_uppercase())),
                None => {
                    diag.missing_field("body");
                    Ok(Value::Null)
                }
            }
        }

        let sources = sources_with(
            "forum",
            vec![
                record(&[("body", json!("hello"))]),
                record(&[("title", json!("no body"))]),
            ],
        );
        let stage = Stage::PerRecordCompute {
            source: "forum",
            fields: vec![("body", upper_body)],
        };

        let mut diag = Diagnostics::new();
        let partial = evaluate(&stage, &sources, &mut diag).unwrap();

        assert_eq!(partial[0]["body"], "HELLO");
        assert_eq!(partial[1]["body"], Value::Null);
        assert_eq!(diag.count("body"), 1);
    }

    #[test]
    fn test_sibling_compute_collects_children_in_source_order() {
        fn children(d: &Record, siblings: &Collection, diag: &mut Diagnostics) -> Result<Value> {
            let id = match d.get("id").and_then(Value::as_str) {
                Some(id) => id,
                None => {
                    diag.missing_field("id");
                    return Ok(Value::Null);
                }
            };
            let child_ids: Vec<Value> = siblings
                .iter()
                .filter(|od| od.get("parent").and_then(Value::as_str) == Some(id))
                .map(|od| od.get("id").cloned().unwrap_or(Value::Null))
                .collect();
            Ok(Value::Array(child_ids))
        }

        let sources = sources_with(
            "course_axis",
            vec![
                record(&[("id", json!("a"))]),
                record(&[("id", json!("b")), ("parent", json!("a"))]),
                record(&[("id", json!("c")), ("parent", json!("a"))]),
            ],
        );
        let stage = Stage::PerRecordWithSiblingsCompute {
            source: "course_axis",
            fields: vec![("children", children)],
        };

        let mut diag = Diagnostics::new();
        let partial = evaluate(&stage, &sources, &mut diag).unwrap();

        assert_eq!(partial[0]["children"], json!(["b", "c"]));
        assert_eq!(partial[1]["children"], json!([]));
    }

    #[test]
    fn test_unknown_source_collection_is_configuration_error() {
        let sources = RecordSet::new();
        let stage = Stage::DirectCopy {
            source: "missing",
            fields: vec![("id", FieldSource::Copy("id"))],
        };

        let mut diag = Diagnostics::new();
        let result = evaluate(&stage, &sources, &mut diag);
        assert!(matches!(result, Err(Error::Configuration { .. })));
    }
}
