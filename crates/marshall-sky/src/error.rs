//! Error types for SKY queries.

use thiserror::Error;

/// Result type alias for marshall-sky operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or running a SKY query.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading or writing the query document failed.
    #[error(transparent)]
    Document(#[from] marshall_core::Error),

    /// The built-in schema failed to load.
    #[error(transparent)]
    Schema(#[from] marshall_core::SchemaError),

    /// The category path has no known SKY category.
    #[error("Unknown SKY category path '{path}'")]
    UnknownCategoryPath { path: String },

    /// The query program could not be started.
    #[error("Failed to start query program '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Feeding the query to the program, or waiting for it, failed.
    #[error("Query program '{program}' failed: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}
