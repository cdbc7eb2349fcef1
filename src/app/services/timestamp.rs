//! Timestamp normalization between textual formats.
//!
//! The new-MITx exports carry every timestamp in a single format; each output
//! entity re-renders it in its own fixed format. Absent timestamps are
//! legitimate and pass through as null. A non-null value that does not match
//! the declared input format is fatal: silently coercing a bad timestamp
//! would corrupt certificate and enrollment timing downstream.

use chrono::NaiveDateTime;

use crate::{Error, Result};

/// Convert a timestamp string from `in_format` to `out_format`.
///
/// Null or empty input yields `None`. Non-null input is parsed strictly
/// against `in_format` and re-rendered in `out_format`.
pub fn normalize(
    raw: Option<&str>,
    in_format: &str,
    out_format: &str,
) -> Result<Option<String>> {
    let raw = match raw {
        Some(s) if !s.is_empty() => s,
        _ => return Ok(None),
    };

    let parsed = NaiveDateTime::parse_from_str(raw, in_format)
        .map_err(|e| Error::timestamp_format(raw, in_format, e))?;

    Ok(Some(parsed.format(out_format).to_string()))
}
