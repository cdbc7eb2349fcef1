//! Serialization of output collections into their target file formats.
//!
//! The destination file's extension selects the format: `.json` is one
//! pretty-printed JSON document per record, `.mongo` is one compact JSON
//! document per record, and `.sql` is tab-separated text with a sorted
//! header row, double-quote quoting and backslash escaping for relational
//! bulk load. A delimited collection must be homogeneous before writing.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde_json::Value;
use tracing::info;

use crate::app::models::{Collection, RecordSet};
use crate::constants::{
    JSON_DOCUMENT_EXTENSION, MONGO_EXPORT_EXTENSION, SQL_DELIMITER, SQL_ESCAPE,
    SQL_LOAD_EXTENSION, SQL_QUOTE,
};
use crate::{Error, Result};

/// Write every entity listed in `files` from `outputs` into `output_dir`.
pub fn write_collections(
    output_dir: &Path,
    files: &[(&str, &str)],
    outputs: &RecordSet,
) -> Result<()> {
    if !output_dir.is_dir() {
        return Err(Error::storage(
            output_dir.display().to_string(),
            "output directory missing or not a directory",
        ));
    }

    for (entity, _) in files {
        if !outputs.contains(entity) {
            return Err(Error::incomplete_output(*entity));
        }
    }

    for (entity, file) in files {
        let path = output_dir.join(file);
        let collection = outputs.get(entity)?;
        write_file(&path, entity, collection)?;
        info!(
            "Wrote {} records for entity '{}' to {}",
            collection.len(),
            entity,
            path.display()
        );
    }

    Ok(())
}

/// Write one collection in the format implied by the file extension.
fn write_file(path: &Path, entity: &str, collection: &Collection) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();

    match extension {
        JSON_DOCUMENT_EXTENSION => write_json(path, collection, true),
        MONGO_EXPORT_EXTENSION => write_json(path, collection, false),
        SQL_LOAD_EXTENSION => write_delimited(path, entity, collection),
        other => Err(Error::configuration(format!(
            "no serializer for extension '{}' of {}",
            other,
            path.display()
        ))),
    }
}

/// Write one JSON document per record, pretty or compact.
fn write_json(path: &Path, collection: &Collection, pretty: bool) -> Result<()> {
    let mut file = File::create(path)
        .map_err(|e| Error::io(format!("failed to create {}", path.display()), e))?;

    for record in collection {
        let rendered = if pretty {
            serde_json::to_string_pretty(record)
        } else {
            serde_json::to_string(record)
        }
        .map_err(|e| Error::configuration(format!("failed to serialize record: {}", e)))?;

        file.write_all(rendered.as_bytes())?;
        file.write_all(b"\n")?;
    }

    Ok(())
}

/// Write a tab-separated bulk-load file with a sorted header row.
fn write_delimited(path: &Path, entity: &str, collection: &Collection) -> Result<()> {
    let fields = collect_fields(entity, collection)?;

    let file = File::create(path)
        .map_err(|e| Error::io(format!("failed to create {}", path.display()), e))?;
    let mut writer = csv::WriterBuilder::new()
        .delimiter(SQL_DELIMITER)
        .quote(SQL_QUOTE)
        .double_quote(false)
        .escape(SQL_ESCAPE)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(file);

    writer
        .write_record(&fields)
        .map_err(|e| Error::configuration(format!("failed to write header row: {}", e)))?;

    for record in collection {
        let row: Vec<String> = fields
            .iter()
            .map(|field| render_scalar(record.get(field).unwrap_or(&Value::Null)))
            .collect();
        writer
            .write_record(&row)
            .map_err(|e| Error::configuration(format!("failed to write record: {}", e)))?;
    }

    writer
        .flush()
        .map_err(|e| Error::io(format!("failed to flush {}", path.display()), e))?;
    Ok(())
}

/// Verify the collection is homogeneous and return its sorted field names.
fn collect_fields(entity: &str, collection: &Collection) -> Result<Vec<String>> {
    let Some(first) = collection.first() else {
        return Ok(Vec::new());
    };

    let mut fields: Vec<String> = first.keys().cloned().collect();
    fields.sort();

    for record in collection {
        let mut keys: Vec<&String> = record.keys().collect();
        keys.sort();
        if keys.len() != fields.len() || keys.iter().zip(&fields).any(|(a, b)| *a != b) {
            return Err(Error::configuration(format!(
                "records for entity '{}' do not share one field set",
                entity
            )));
        }
    }

    Ok(fields)
}

/// Render one JSON value as a delimited-text cell. Null becomes the empty
/// string; nested values fall back to compact JSON.
fn render_scalar(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        nested => nested.to_string(),
    }
}
