//! Query command implementation
//!
//! Feeds a SKY query document to the SKY client (or another program given
//! with `--program`) and exits with the program's status.

use anyhow::{Result, bail};
use marshall_sky::{QueryRunner, SkyQuery};
use std::path::Path;

pub fn execute(schema: Option<&Path>, file: &Path, program: &str, args: &[String]) -> Result<()> {
    let query = SkyQuery::from_document(super::open_document(schema, file)?);
    let runner = args
        .iter()
        .fold(QueryRunner::new(program), |runner, arg| runner.arg(arg.as_str()));

    let status = runner.run(&query)?;
    if !status.success() {
        bail!("{} exited with {}", runner.program(), status);
    }
    Ok(())
}
