//! New command implementation

use anyhow::Result;
use marshall_core::Document;
use std::path::Path;

pub fn execute(
    schema: Option<&Path>,
    assignments: &[String],
    output: Option<&Path>,
    overwrite: bool,
) -> Result<()> {
    let mut document = Document::new(super::load_schema(schema)?);
    super::apply_assignments(&mut document, assignments)?;
    super::write_document(&document, output, overwrite)
}
