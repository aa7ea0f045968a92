//! Set command implementation

use anyhow::Result;
use std::path::Path;
use tracing::info;

/// Arguments for the set command
#[derive(Debug)]
pub struct SetArgs<'a> {
    pub schema: Option<&'a Path>,
    /// Document to start from
    pub file: &'a Path,
    /// `KEY=VALUE` pairs, applied in order
    pub assignments: &'a [String],
    /// Output file; standard output when absent
    pub output: Option<&'a Path>,
    pub overwrite: bool,
}

pub fn execute(args: SetArgs<'_>) -> Result<()> {
    let mut document = super::open_document(args.schema, args.file)?;
    super::apply_assignments(&mut document, args.assignments)?;
    info!(
        file = %args.file.display(),
        count = args.assignments.len(),
        "Applied assignments"
    );
    super::write_document(&document, args.output, args.overwrite)
}
