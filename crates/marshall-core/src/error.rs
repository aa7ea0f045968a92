//! Error types for schema loading and document access.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for marshall-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while reading or writing a document.
#[derive(Debug, Error)]
pub enum Error {
    /// The identifier is in none of the schema's tables.
    #[error("{document} has no identifier '{identifier}'")]
    UnknownIdentifier { document: String, identifier: String },

    /// The identifier names a node handle, which has no settable value.
    #[error("'{identifier}' names a field element and cannot be assigned a value")]
    NotWritable { identifier: String },

    /// The schema failed validation.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The document text could not be parsed or written.
    #[error(transparent)]
    Xml(#[from] marshall_xml::Error),

    /// Reading or writing a document file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Configuration errors found when a schema is loaded.
///
/// These are fatal: a schema that fails to load is never used to resolve
/// identifiers.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The tag hierarchy loops back on itself.
    #[error("Tag hierarchy contains a cycle: {}", .chain.join(" -> "))]
    Cycle { chain: Vec<String> },

    /// A tag names a parent that is neither `root` nor another tag.
    #[error("Tag '{identifier}' has unknown parent '{parent}'")]
    UnknownParent { identifier: String, parent: String },

    /// An attribute is owned by an identifier that is not a tag.
    #[error("Attribute '{identifier}' is owned by unknown tag '{owner}'")]
    UnknownOwner { identifier: String, owner: String },

    /// An alias points at an identifier that is not a tag.
    #[error("Alias '{identifier}' points at unknown tag '{target}'")]
    UnknownAliasTarget { identifier: String, target: String },

    /// The same identifier is declared in more than one table.
    #[error("Identifier '{identifier}' is declared as both {first} and {second}")]
    AmbiguousIdentifier {
        identifier: String,
        first: &'static str,
        second: &'static str,
    },

    /// Two fields under one parent share a discriminator.
    #[error("Fields '{first}' and '{second}' under '{parent}' share discriminator '{discriminator}'")]
    DuplicateDiscriminator {
        parent: String,
        discriminator: String,
        first: String,
        second: String,
    },

    /// The reserved root identifier was declared as an ordinary identifier.
    #[error("'{identifier}' is reserved for the document root")]
    ReservedIdentifier { identifier: String },

    /// The schema file is not valid TOML or does not match the schema layout.
    #[error("Invalid schema definition: {0}")]
    Toml(#[from] toml::de::Error),

    /// The schema file could not be read.
    #[error("Failed to read schema file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
