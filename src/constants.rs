//! Application constants for MITx processor
//!
//! This module contains the fixed file tables, timestamp formats and
//! serialization settings used throughout the MITx processor application.

// =============================================================================
// Source Collection Names and File Names
// =============================================================================

/// Named source collections and the export files they are loaded from
pub const INPUT_FILES: &[(&str, &str)] = &[
    ("course_axis", "course_axis.json"),
    ("course_item", "course_item.json"),
    ("chapter_grades", "chapter_grades.json"),
    ("user_info_combo", "user_info_combo.json"),
    ("forum", "forum.json"),
];

/// Output entities and the vismooc file names they are written to
pub const OUTPUT_FILES: &[(&str, &str)] = &[
    ("structure", "course_structure-prod-analytics.json"),
    ("certificate", "certificates_generatedcertificate-prod-analytics.sql"),
    ("enrollment", "student_courseenrollment-prod-analytics.sql"),
    ("user", "auth_user-prod-analytics.sql"),
    ("profile", "auth_userprofile-prod-analytics.sql"),
    ("forum", "prod.mongo"),
];

// =============================================================================
// Timestamp Formats
// =============================================================================

/// Format of every timestamp in the new-MITx exports
pub const TIMESTAMP_FORMAT_IN: &str = "%Y-%m-%d %H:%M:%S UTC";

/// ISO-with-Z format used by the structure entity
pub const TIMESTAMP_FORMAT_STRUCTURE: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Forum format: the export carries no sub-second precision, so it is forced
/// to zero to match the mongo export convention
pub const TIMESTAMP_FORMAT_FORUM: &str = "%Y-%m-%dT%H:%M:%S.000Z";

/// Space-separated SQL-style format used by certificate and enrollment
pub const TIMESTAMP_FORMAT_SQL: &str = "%Y-%m-%d %H:%M:%S";

// =============================================================================
// Serialization Settings
// =============================================================================

/// Extension written as pretty-printed line-delimited JSON
pub const JSON_DOCUMENT_EXTENSION: &str = "json";

/// Extension written as compact line-delimited JSON (mongo export style)
pub const MONGO_EXPORT_EXTENSION: &str = "mongo";

/// Extension written as delimited text for relational bulk load
pub const SQL_LOAD_EXTENSION: &str = "sql";

/// Field delimiter for bulk-load files
pub const SQL_DELIMITER: u8 = b'\t';

/// Quote character for bulk-load files
pub const SQL_QUOTE: u8 = b'"';

/// Escape character for bulk-load files
pub const SQL_ESCAPE: u8 = b'\\';

// =============================================================================
// Helper Functions
// =============================================================================

/// Look up the output file name for an entity
pub fn output_filename(entity: &str) -> Option<&'static str> {
    OUTPUT_FILES
        .iter()
        .find(|(name, _)| *name == entity)
        .map(|(_, file)| *file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_filename_lookup() {
        assert_eq!(
            output_filename("structure"),
            Some("course_structure-prod-analytics.json")
        );
        assert_eq!(output_filename("forum"), Some("prod.mongo"));
        assert_eq!(output_filename("unknown"), None);
    }

    #[test]
    fn test_every_input_collection_has_distinct_name() {
        for (i, (name, _)) in INPUT_FILES.iter().enumerate() {
            for (other, _) in &INPUT_FILES[i + 1..] {
                assert_ne!(name, other);
            }
        }
    }
}
