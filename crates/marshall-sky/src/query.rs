//! The SKY query document.

use crate::categories::category_for_path;
use crate::error::{Error, Result};
use marshall_core::{Document, ExportOptions, ExportOutcome, Schema, SchemaSpec};
use once_cell::sync::OnceCell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Schema tables for SKY request collections.
pub const SCHEMA_TOML: &str = include_str!("../schema/sky.toml");

static SCHEMA: OnceCell<Arc<Schema>> = OnceCell::new();

/// The built-in SKY schema, loaded on first use.
pub fn schema() -> Result<Arc<Schema>> {
    SCHEMA
        .get_or_try_init(|| {
            let spec = SchemaSpec::from_toml_str(SCHEMA_TOML)?;
            Ok::<_, Error>(Schema::load(spec)?.into_shared())
        })
        .cloned()
}

/// Generates a getter/setter pair per SKY shortcut identifier.
macro_rules! shortcuts {
    ($($(#[$meta:meta])* $get:ident / $set:ident => $identifier:literal;)*) => {
        $(
            $(#[$meta])*
            pub fn $get(&mut self) -> Result<String> {
                Ok(self.document.get_text($identifier)?)
            }

            #[doc = concat!("Set `", $identifier, "`.")]
            pub fn $set(&mut self, value: impl Into<String>) -> Result<()> {
                Ok(self.document.set($identifier, value)?)
            }
        )*
    };
}

/// A SKY batch query.
///
/// Reads and writes go through the underlying [`Document`]; the shortcuts
/// below cover the identifiers every query uses.
pub struct SkyQuery {
    document: Document,
}

impl SkyQuery {
    /// An empty query with just the `requestCollection` root.
    pub fn new() -> Result<Self> {
        Ok(Self {
            document: Document::new(schema()?),
        })
    }

    /// Parse a query from text.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(Self {
            document: Document::parse(schema()?, text)?,
        })
    }

    /// Read and parse a query file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            document: Document::open(schema()?, path)?,
        })
    }

    /// Wrap a document that was loaded with a SKY-compatible schema.
    pub fn from_document(document: Document) -> Self {
        Self { document }
    }

    /// The underlying document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    shortcuts! {
        /// Model run date, e.g. `2013041600`.
        reference_date / set_reference_date => "reference_date";
        /// Short name of the queried parameter, e.g. `T2M`.
        field / set_field => "field";
        ensemble_member / set_ensemble_member => "ensemble_member";
        /// Forecast lead time in hours.
        forecast_time / set_forecast_time => "forecast_time";
        database / set_database => "database";
        category / set_category => "category";
        /// Name of the file SKY writes the result to.
        file / set_file => "file";
    }

    /// Set the category from its catalogue path.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::UnknownCategoryPath`] if the path isn't in
    /// [`crate::categories::CATEGORY_PATHS`].
    pub fn set_category_path(&mut self, path: &str) -> Result<()> {
        let category = category_for_path(path).ok_or_else(|| Error::UnknownCategoryPath {
            path: path.to_string(),
        })?;
        debug!(path, category, "Resolved category path");
        self.set_category(category)
    }

    /// Relative output path derived from the query.
    ///
    /// The layout is `<reference date>/m<member>/<field>/lfff<hours>0000`,
    /// with the member padded to three digits and the lead time to four.
    /// Unset parts are left out.
    pub fn output_name(&mut self) -> Result<PathBuf> {
        let reference_date = self.reference_date()?;
        let member = self.ensemble_member()?;
        let field = self.field()?;
        let forecast = self.forecast_time()?;

        let member = (!member.is_empty()).then(|| format!("m{:0>3}", member));
        let forecast = (!forecast.is_empty()).then(|| format!("lfff{:0>4}0000", forecast));

        Ok([Some(reference_date), member, Some(field), forecast]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect())
    }

    /// Serialize the query in canonical form.
    pub fn to_xml_string(&self) -> Result<String> {
        Ok(self.document.to_xml_string()?)
    }

    /// Write the query to `path`; see [`marshall_core::export`].
    pub fn export(&self, path: impl AsRef<Path>, options: ExportOptions) -> Result<ExportOutcome> {
        Ok(self.document.export(path, options)?)
    }
}

impl fmt::Display for SkyQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.document, f)
    }
}

impl fmt::Debug for SkyQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.document, f)
    }
}
