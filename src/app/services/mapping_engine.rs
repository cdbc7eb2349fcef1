//! Orchestration of the per-entity mapping stages.
//!
//! For each entity the engine evaluates every non-PostProcess stage against
//! the source collections, concatenates the partial outputs into complete
//! records, then applies the entity's PostProcess stages in order. Stages
//! never see each other's values; only their positional outputs meet in the
//! concatenator.

use tracing::info;

use crate::app::models::{Collection, EntitySpec, RecordSet, Stage};
use crate::app::services::concatenator;
use crate::app::services::diagnostics::Diagnostics;
use crate::app::services::stage_evaluator;
use crate::Result;

/// Run every entity spec against the source collections, producing the final
/// output collections.
pub fn run(
    specs: &[EntitySpec],
    sources: &RecordSet,
    diagnostics: &mut Diagnostics,
) -> Result<RecordSet> {
    let mut outputs = RecordSet::new();

    for spec in specs {
        let collection = run_entity(spec, sources, diagnostics)?;
        info!(
            "Produced {} records for entity '{}'",
            collection.len(),
            spec.name
        );
        outputs.insert(spec.name, collection);
    }

    Ok(outputs)
}

/// Produce the output collection for one entity.
fn run_entity(
    spec: &EntitySpec,
    sources: &RecordSet,
    diagnostics: &mut Diagnostics,
) -> Result<Collection> {
    let mut partials = Vec::new();
    for stage in spec.stages.iter().filter(|s| !s.is_post_process()) {
        partials.push(stage_evaluator::evaluate(stage, sources, diagnostics)?);
    }

    let mut collection = concatenator::concatenate(spec.name, &partials)?;

    for stage in &spec.stages {
        if let Stage::PostProcess { transform } = stage {
            collection = transform(collection, diagnostics)?;
        }
    }

    Ok(collection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::{FieldSource, Record};
    use crate::Error;
    use serde_json::{Value, json};

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
    fn test_two_stages_merge_into_complete_records() {
        fn doubled(d: &Record, _diag: &mut Diagnostics) -> Result<Value> {
            let n = d.get("n").and_then(Value::as_i64).unwrap_or(0);
            Ok(json!(n * 2))
        }

        let sources = sources_with(
            "numbers",
            vec![record(&[("n", json!(1))]), record(&[("n", json!(2))])],
        );
        let specs = vec![EntitySpec {
            name: "doubled",
            stages: vec![
                Stage::DirectCopy {
                    source: "numbers",
                    fields: vec![("n", FieldSource::Copy("n"))],
                },
                Stage::PerRecordCompute {
                    source: "numbers",
                    fields: vec![("twice", doubled)],
                },
            ],
        }];

        let mut diag = Diagnostics::new();
        let outputs = run(&specs, &sources, &mut diag).unwrap();
        let doubled = outputs.get("doubled").unwrap();

        assert_eq!(doubled.len(), 2);
        assert_eq!(doubled[0]["n"], 1);
        assert_eq!(doubled[0]["twice"], 2);
        assert_eq!(doubled[1]["twice"], 4);
    }

    #[test]
    fn test_post_process_runs_after_concatenation() {
        fn reverse(mut c: Collection, _diag: &mut Diagnostics) -> Result<Collection> {
            c.reverse();
            Ok(c)
        }

        let sources = sources_with(
            "numbers",
            vec![record(&[("n", json!(1))]), record(&[("n", json!(2))])],
        );
        let specs = vec![EntitySpec {
            name: "reversed",
            stages: vec![
                Stage::DirectCopy {
                    source: "numbers",
                    fields: vec![("n", FieldSource::Copy("n"))],
                },
                Stage::PostProcess { transform: reverse },
            ],
        }];

        let mut diag = Diagnostics::new();
        let outputs = run(&specs, &sources, &mut diag).unwrap();
        let reversed = outputs.get("reversed").unwrap();

        assert_eq!(reversed[0]["n"], 2);
        assert_eq!(reversed[1]["n"], 1);
    }

    #[test]
    fn test_colliding_stages_abort_the_entity() {
        let sources = sources_with("numbers", vec![record(&[("n", json!(1))])]);
        let specs = vec![EntitySpec {
            name: "collides",
            stages: vec![
                Stage::DirectCopy {
                    source: "numbers",
                    fields: vec![("n", FieldSource::Copy("n"))],
                },
                Stage::DirectCopy {
                    source: "numbers",
                    fields: vec![("n", FieldSource::Copy("n"))],
                },
            ],
        }];

        let mut diag = Diagnostics::new();
        let result = run(&specs, &sources, &mut diag);
        assert!(matches!(result, Err(Error::KeyCollision { .. })));
    }
}
