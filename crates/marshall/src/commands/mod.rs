//! Command implementations for the marshall CLI
//!
//! Each command module handles the CLI interface and delegates to
//! marshall-core and marshall-sky for the document work.

pub mod get;
pub mod new;
pub mod output_name;
pub mod query;
pub mod set;
pub mod show;

use anyhow::{Context, Result, bail};
use marshall_core::{Document, ExportOptions, ExportOutcome, Schema, SchemaSpec};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// The schema named on the command line, or the built-in SKY schema.
pub fn load_schema(path: Option<&Path>) -> Result<Arc<Schema>> {
    match path {
        Some(path) => {
            let spec = SchemaSpec::from_path(path)
                .with_context(|| format!("Failed to read schema {}", path.display()))?;
            let schema = Schema::load(spec)
                .with_context(|| format!("Invalid schema {}", path.display()))?;
            debug!(path = %path.display(), name = schema.name(), "Loaded schema");
            Ok(schema.into_shared())
        }
        None => Ok(marshall_sky::schema()?),
    }
}

pub fn open_document(schema: Option<&Path>, file: &Path) -> Result<Document> {
    let schema = load_schema(schema)?;
    Document::open(schema, file).with_context(|| format!("Failed to open {}", file.display()))
}

/// Split `KEY=VALUE` at the first `=`.
pub fn parse_assignment(assignment: &str) -> Result<(&str, &str)> {
    match assignment.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value)),
        _ => bail!("Expected KEY=VALUE, got '{}'", assignment),
    }
}

/// Apply every assignment in order; stops at the first failure.
pub fn apply_assignments(document: &mut Document, assignments: &[String]) -> Result<()> {
    for assignment in assignments {
        let (key, value) = parse_assignment(assignment)?;
        document
            .set(key, value)
            .with_context(|| format!("Failed to set '{}'", key))?;
    }
    Ok(())
}

/// Export to `output`, or print to standard output when there is none.
pub fn write_document(document: &Document, output: Option<&Path>, overwrite: bool) -> Result<()> {
    let Some(output) = output else {
        print!("{}", document);
        return Ok(());
    };

    match document.export(output, ExportOptions::overwrite(overwrite))? {
        ExportOutcome::Written => {}
        ExportOutcome::Skipped => {
            eprintln!(
                "{} already exists; use --overwrite to replace it",
                output.display()
            );
        }
    }
    Ok(())
}
