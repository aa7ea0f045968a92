//! Output-name command implementation

use anyhow::Result;
use marshall_sky::SkyQuery;
use std::path::Path;

pub fn execute(schema: Option<&Path>, file: &Path) -> Result<()> {
    let document = super::open_document(schema, file)?;
    let mut query = SkyQuery::from_document(document);
    println!("{}", query.output_name()?.display());
    Ok(())
}
