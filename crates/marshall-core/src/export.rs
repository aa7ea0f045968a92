//! Writing documents to disk.

use crate::document::Document;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Policy for [`export`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportOptions {
    /// Replace an existing file instead of leaving it alone.
    pub overwrite: bool,
}

impl ExportOptions {
    /// Options with the given overwrite policy.
    pub fn overwrite(overwrite: bool) -> Self {
        Self { overwrite }
    }
}

/// What [`export`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The document was written.
    Written,

    /// A file already existed and overwriting was not allowed; nothing changed.
    Skipped,
}

/// Serialize `document` and write it to `path` in one call.
///
/// An existing regular file is only replaced when `options.overwrite` is set;
/// otherwise the call returns [`ExportOutcome::Skipped`]. I/O failures are
/// returned as they are, and a partially written file is not cleaned up.
pub fn export(document: &Document, path: &Path, options: ExportOptions) -> Result<ExportOutcome> {
    if path.is_file() && !options.overwrite {
        warn!(path = %path.display(), "File already exists; not overwriting");
        return Ok(ExportOutcome::Skipped);
    }

    let xml = document.to_xml_string()?;
    std::fs::write(path, xml)?;
    info!(path = %path.display(), "Exported document");
    Ok(ExportOutcome::Written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ROOT, Schema, SchemaSpec};
    use crate::Error;
    use std::fs;
    use tempfile::TempDir;

    fn document() -> Document {
        let schema = Schema::load(
            SchemaSpec::new("Probe", "requests")
                .namespace("urn:test")
                .tag("read", ROOT, "read")
                .attribute("database", "read", "database"),
        )
        .unwrap();
        let mut doc = Document::new(schema.into_shared());
        doc.set("database", "roma").unwrap();
        doc
    }

    #[test]
    fn test_export_writes_canonical_text() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("query.xml");
        let doc = document();

        let outcome = export(&doc, &path, ExportOptions::default()).unwrap();
        assert_eq!(outcome, ExportOutcome::Written);
        assert_eq!(fs::read_to_string(&path).unwrap(), doc.to_xml_string().unwrap());
    }

    #[test]
    fn test_existing_file_is_kept_without_overwrite() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("query.xml");
        fs::write(&path, "original").unwrap();

        let outcome = export(&document(), &path, ExportOptions::default()).unwrap();
        assert_eq!(outcome, ExportOutcome::Skipped);
        assert_eq!(fs::read_to_string(&path).unwrap(), "original");
    }

    #[test]
    fn test_existing_file_is_replaced_with_overwrite() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("query.xml");
        fs::write(&path, "original").unwrap();

        let outcome = document().export(&path, ExportOptions::overwrite(true)).unwrap();
        assert_eq!(outcome, ExportOutcome::Written);
        assert!(fs::read_to_string(&path).unwrap().contains(r#"database="roma""#));
    }

    #[test]
    fn test_io_error_is_returned() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing-dir").join("query.xml");
        let err = export(&document(), &path, ExportOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_directory_is_not_an_existing_file() {
        let temp = TempDir::new().unwrap();
        for overwrite in [false, true] {
            let err = export(&document(), temp.path(), ExportOptions::overwrite(overwrite))
                .unwrap_err();
            assert!(matches!(err, Error::Io(_)), "{:?}", err);
        }
    }

    #[test]
    fn test_options_from_toml() {
        let options: ExportOptions = toml::from_str("overwrite = true").unwrap();
        assert!(options.overwrite);
        let options: ExportOptions = toml::from_str("").unwrap();
        assert!(!options.overwrite);
    }
}
