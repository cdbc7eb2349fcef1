//! Positional, disjoint-key merge of partial stage outputs.
//!
//! Every stage contributing to one entity must describe the same logical
//! records: the partial lists must be equally long, and position i identifies
//! the same record in each of them. Field sets must be pairwise disjoint —
//! two stages defining the same output field is always a
//! mapping-specification bug, never a data bug. This module only ever looks
//! at field names as a set; it attaches no meaning to them.

use std::collections::BTreeSet;

use crate::app::models::{Collection, Record};
use crate::{Error, Result};

/// Merge the partial-record lists produced for one entity into complete
/// records, preserving positional order.
pub fn concatenate(entity: &str, partials: &[Collection]) -> Result<Collection> {
    let Some(first) = partials.first() else {
        return Ok(Collection::new());
    };

    let expected = first.len();
    for (stage, partial) in partials.iter().enumerate().skip(1) {
        if partial.len() != expected {
            return Err(Error::shape_mismatch(entity, stage, expected, partial.len()));
        }
    }

    (0..expected)
        .map(|index| merge_at(entity, partials, index))
        .collect()
}

/// Union the i-th partial record from every stage, rejecting overlapping
/// field names.
fn merge_at(entity: &str, partials: &[Collection], index: usize) -> Result<Record> {
    let mut merged = Record::new();
    let mut seen = BTreeSet::new();

    for partial in partials {
        for (field, value) in &partial[index] {
            if !seen.insert(field.clone()) {
                return Err(Error::key_collision(entity, field));
            }
            merged.insert(field.clone(), value.clone());
        }
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn record(pairs: &[(&str, Value)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_concatenate_unions_disjoint_fields_positionally() {
        let ids = vec![
            record(&[("id", json!("1"))]),
            record(&[("id", json!("2"))]),
        ];
        let grades = vec![
            record(&[("grade", json!("0.9"))]),
            record(&[("grade", json!("0.5"))]),
        ];

        let merged = concatenate("certificate", &[ids, grades]).unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0]["id"], "1");
        assert_eq!(merged[0]["grade"], "0.9");
        assert_eq!(merged[1]["id"], "2");
        assert_eq!(merged[1]["grade"], "0.5");
    }

    #[test]
    fn test_unequal_lengths_are_shape_mismatch() {
        let ids = vec![record(&[("id", json!("1"))])];
        let grades = vec![
            record(&[("grade", json!("0.9"))]),
            record(&[("grade", json!("0.5"))]),
        ];

        let result = concatenate("certificate", &[ids, grades]);
        match result {
            Err(Error::ShapeMismatch {
                entity,
                stage,
                expected,
                found,
            }) => {
                assert_eq!(entity, "certificate");
                assert_eq!(stage, 1);
                assert_eq!(expected, 1);
                assert_eq!(found, 2);
            }
            other => panic!("expected shape mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_overlapping_fields_are_key_collision_regardless_of_values() {
        let left = vec![record(&[("id", json!("1"))])];
        let right = vec![record(&[("id", json!("1"))])];

        let result = concatenate("user", &[left, right]);
        match result {
            Err(Error::KeyCollision { entity, field }) => {
                assert_eq!(entity, "user");
                assert_eq!(field, "id");
            }
            other => panic!("expected key collision, got {:?}", other),
        }
    }

    #[test]
    fn test_single_stage_passes_through() {
        let only = vec![record(&[("id", json!("1")), ("username", json!("alice"))])];
        let merged = concatenate("user", &[only.clone()]).unwrap();
        assert_eq!(merged, only);
    }

    #[test]
    fn test_no_stages_yields_empty_collection() {
        let merged = concatenate("user", &[]).unwrap();
        assert!(merged.is_empty());
    }
}
