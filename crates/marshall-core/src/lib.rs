//! Schema-driven, attribute-style access to XML documents.
//!
//! A [`Document`] hides the nesting of an XML tree behind flat, human-meaningful
//! identifiers. Which identifier lives where is described by a [`Schema`]: a
//! set of tables mapping identifiers to tags, attributes, discriminated `field`
//! elements and text aliases. Reading or writing an identifier creates any
//! missing part of the path to it on the fly.
//!
//! # Overview
//!
//! - [`SchemaSpec`]: The declarative tables, usually loaded from TOML
//! - [`Schema`]: A validated, classified schema (see [`IdentifierKind`])
//! - [`Resolver`]: Maps identifiers to nodes, creating ancestors as needed
//! - [`Document`]: The `get`/`set` surface, returning [`Value`]s
//! - [`export()`]: Writes a document to disk under an [`ExportOptions`] policy
//!
//! # Example
//!
//! ```rust
//! use marshall_core::{Document, Schema, SchemaSpec, Value};
//!
//! let spec = SchemaSpec::from_toml_str(r#"
//! root = "requests"
//! namespace = "http://example.org/q"
//!
//! [tags]
//! read = ["root", "read"]
//! select = ["read", "select"]
//!
//! [attributes]
//! database = ["read", "database"]
//!
//! [fields.shortname]
//! parent = "select"
//! discriminator = "PARAMETER_SHORTNAME"
//!
//! [aliases]
//! parameter = "shortname_value"
//! "#).unwrap();
//!
//! let mut doc = Document::new(Schema::load(spec).unwrap().into_shared());
//! assert_eq!(doc.get("database").unwrap(), Value::Absent);
//!
//! doc.set("database", "archive").unwrap();
//! doc.set("parameter", "T2M").unwrap();
//! assert_eq!(doc.get_text("parameter").unwrap(), "T2M");
//!
//! let xml = doc.to_xml_string().unwrap();
//! assert!(xml.contains(r#"<field name="PARAMETER_SHORTNAME">"#));
//! ```

pub mod document;
pub mod error;
pub mod export;
pub mod resolver;
pub mod schema;
pub mod value;

pub use document::Document;
pub use error::{Error, Result, SchemaError};
pub use export::{ExportOptions, ExportOutcome, export};
pub use marshall_xml::{NodeId, XmlTree};
pub use resolver::Resolver;
pub use schema::{FieldSpec, IdentifierKind, Schema, SchemaSpec, TagEntry};
pub use value::Value;
