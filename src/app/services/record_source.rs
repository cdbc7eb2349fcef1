//! Loading of named source collections from newline-delimited JSON files.
//!
//! Each export file holds one JSON object per line. A malformed line is
//! fatal with no partial recovery: a broken export cannot be silently
//! trimmed without corrupting the positional correspondence the mapping
//! stages rely on.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use crate::app::models::{Collection, RecordSet};
use crate::{Error, Result};

/// Load the named collections listed in `files` from `source_dir`.
pub fn load_collections(source_dir: &Path, files: &[(&str, &str)]) -> Result<RecordSet> {
    if !source_dir.is_dir() {
        return Err(Error::storage(
            source_dir.display().to_string(),
            "source directory missing or not a directory",
        ));
    }

    let mut set = RecordSet::new();
    for (name, file) in files {
        let path = source_dir.join(file);
        let collection = load_file(&path)?;
        info!(
            "Loaded {} records into collection '{}' from {}",
            collection.len(),
            name,
            path.display()
        );
        set.insert(*name, collection);
    }

    Ok(set)
}

/// Parse one newline-delimited JSON file into a collection.
fn load_file(path: &Path) -> Result<Collection> {
    let content = fs::read_to_string(path)
        .map_err(|e| Error::io(format!("failed to read {}", path.display()), e))?;

    let file_name = path.display().to_string();
    let mut collection = Collection::new();

    for (index, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let value: Value = serde_json::from_str(line)
            .map_err(|e| Error::parse(&file_name, index + 1, e.to_string()))?;

        match value {
            Value::Object(record) => collection.push(record),
            other => {
                return Err(Error::parse(
                    &file_name,
                    index + 1,
                    format!("expected a JSON object, found {}", json_kind(&other)),
                ));
            }
        }
    }

    debug!("Parsed {} records from {}", collection.len(), file_name);
    Ok(collection)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
