//! Show command implementation

use anyhow::Result;
use marshall_core::{IdentifierKind, Value};
use std::path::Path;

pub fn execute(schema: Option<&Path>, file: &Path, xml: bool) -> Result<()> {
    let mut document = super::open_document(schema, file)?;
    if xml {
        print!("{}", document);
        return Ok(());
    }

    let identifiers: Vec<(String, &'static str)> = document
        .schema()
        .identifiers()
        .filter(|(_, kind)| !matches!(kind, IdentifierKind::FieldPattern { .. }))
        .map(|(identifier, kind)| (identifier.to_string(), kind.table()))
        .collect();
    let width = identifiers.iter().map(|(id, _)| id.len()).max().unwrap_or(0);

    for (identifier, table) in identifiers {
        let value = match document.get(&identifier)? {
            Value::Text(text) => text,
            Value::Node(_) | Value::Absent => "-".to_string(),
        };
        println!("{:<width$}  {:<11}  {}", identifier, table, value);
    }
    Ok(())
}
