//! Get command implementation

use anyhow::{Context, Result};
use std::path::Path;

/// Print each identifier's text, one per line; unset values print as empty lines.
pub fn execute(schema: Option<&Path>, file: &Path, identifiers: &[String]) -> Result<()> {
    let mut document = super::open_document(schema, file)?;
    for identifier in identifiers {
        let value = document
            .get_text(identifier)
            .with_context(|| format!("Failed to read '{}'", identifier))?;
        println!("{}", value);
    }
    Ok(())
}
