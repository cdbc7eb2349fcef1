//! Core data model for the record-transformation engine.
//!
//! Records are flat key/value JSON objects, collections are ordered record
//! sequences, and stages describe how one output entity is assembled from the
//! source collections. Stage kinds are an explicit enum so an invalid kind is
//! unrepresentable; the field transforms they carry are plain function
//! pointers, keeping the mapping specification itself pure data.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::app::services::diagnostics::Diagnostics;
use crate::{Error, Result};

/// One logical entity instance: a mapping from field name to JSON value
pub type Record = serde_json::Map<String, Value>;

/// Ordered sequence of records
pub type Collection = Vec<Record>;

/// Per-record field transform
pub type RecordFn = fn(&Record, &mut Diagnostics) -> Result<Value>;

/// Per-record field transform with read access to the full source collection
pub type SiblingFn = fn(&Record, &Collection, &mut Diagnostics) -> Result<Value>;

/// Whole-collection transform applied after concatenation
pub type CollectionFn = fn(Collection, &mut Diagnostics) -> Result<Collection>;

/// Source of a directly copied output field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSource {
    /// Copy the value of the named source field
    Copy(&'static str),
    /// Emit a literal null regardless of the source record
    Null,
}

/// One mapping operation contributing to an output entity
#[derive(Debug, Clone)]
pub enum Stage {
    /// Copy source fields into output fields by name
    DirectCopy {
        source: &'static str,
        fields: Vec<(&'static str, FieldSource)>,
    },

    /// Compute each output field from one source record
    PerRecordCompute {
        source: &'static str,
        fields: Vec<(&'static str, RecordFn)>,
    },

    /// Compute each output field from one source record plus its full
    /// source collection, enabling parent/child lookups
    PerRecordWithSiblingsCompute {
        source: &'static str,
        fields: Vec<(&'static str, SiblingFn)>,
    },

    /// Transform the entity's fully concatenated collection
    PostProcess { transform: CollectionFn },
}

impl Stage {
    /// Whether this stage runs after concatenation
    pub fn is_post_process(&self) -> bool {
        matches!(self, Stage::PostProcess { .. })
    }
}

/// Ordered list of stages defining one output entity
#[derive(Debug, Clone)]
pub struct EntitySpec {
    pub name: &'static str,
    pub stages: Vec<Stage>,
}

/// The working set of named collections threaded through the pipeline
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    collections: BTreeMap<String, Collection>,
}

impl RecordSet {
    /// Create an empty record set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a named collection
    pub fn insert(&mut self, name: impl Into<String>, collection: Collection) {
        self.collections.insert(name.into(), collection);
    }

    /// Look up a collection; a stage referencing an unknown collection is a
    /// mapping-specification bug
    pub fn get(&self, name: &str) -> Result<&Collection> {
        self.collections.get(name).ok_or_else(|| {
            Error::configuration(format!("unknown source collection '{}'", name))
        })
    }

    /// Whether a collection with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.collections.contains_key(name)
    }

    /// Iterate over collection names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }

    /// Number of collections in the set
    pub fn len(&self) -> usize {
        self.collections.len()
    }

    /// Whether the set holds no collections
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}

/// Borrow a record field as a string, treating null and absent alike
pub fn field_str<'a>(record: &'a Record, name: &str) -> Option<&'a str> {
    record.get(name).and_then(Value::as_str)
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

    #[test]
    fn test_record_set_lookup() {
        let mut set = RecordSet::new();
        set.insert("forum", vec![record(&[("body", json!("hello"))])]);

        assert!(set.contains("forum"));
        assert_eq!(set.get("forum").unwrap().len(), 1);
        assert!(matches!(
            set.get("missing"),
            Err(Error::Configuration { .. })
        ));
    }

    #[test]
    fn test_field_str_treats_null_as_absent() {
        let r = record(&[("a", json!("x")), ("b", Value::Null)]);
        assert_eq!(field_str(&r, "a"), Some("x"));
        assert_eq!(field_str(&r, "b"), None);
        assert_eq!(field_str(&r, "c"), None);
    }

    #[test]
    fn test_post_process_detection() {
        fn identity(c: Collection, _diag: &mut Diagnostics) -> Result<Collection> {
            Ok(c)
        }

        let stage = Stage::PostProcess {
            transform: identity,
        };
        assert!(stage.is_post_process());

        let copy = Stage::DirectCopy {
            source: "forum",
            fields: vec![("body", FieldSource::Copy("body"))],
        };
        assert!(!copy.is_post_process());
    }
}
