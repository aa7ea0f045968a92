//! Error types for XML parsing and writing.

use thiserror::Error;

/// Result type alias for marshall-xml operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading or writing XML.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// XML syntax error from quick-xml.
    #[error("XML syntax error: {message}{}", .position.map(|p| format!(" at byte {}", p)).unwrap_or_default())]
    XmlSyntax {
        message: String,
        /// Byte offset where the error occurred.
        position: Option<u64>,
    },

    /// Unexpected end of input.
    #[error("Unexpected end of input, expected {expected}")]
    UnexpectedEof {
        /// What was expected when EOF was encountered.
        expected: String,
    },

    /// Mismatched end tag.
    #[error("Mismatched end tag: expected </{expected}>, found </{found}>")]
    MismatchedEndTag { expected: String, found: String },

    /// A prefix was used without a matching `xmlns:` declaration in scope.
    #[error("Namespace prefix '{prefix}' is not bound")]
    UnboundPrefix { prefix: String },

    /// Invalid XML structure.
    #[error("Invalid XML structure: {message}")]
    InvalidStructure { message: String },

    /// Empty document (no root element).
    #[error("Empty XML document: no root element found")]
    EmptyDocument,

    /// Multiple root elements.
    #[error("Invalid XML: multiple root elements")]
    MultipleRoots,

    /// Serialization failed.
    #[error("Failed to write XML: {message}")]
    Write { message: String },
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlSyntax {
            message: err.to_string(),
            position: None,
        }
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlSyntax {
            message: format!("Attribute error: {}", err),
            position: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_display_with_position() {
        let err = Error::XmlSyntax {
            message: "bad".to_string(),
            position: Some(12),
        };
        assert_eq!(err.to_string(), "XML syntax error: bad at byte 12");

        let err = Error::XmlSyntax {
            message: "bad".to_string(),
            position: None,
        };
        assert_eq!(err.to_string(), "XML syntax error: bad");
    }

    #[test]
    fn test_mismatched_end_tag_display() {
        let err = Error::MismatchedEndTag {
            expected: "read".to_string(),
            found: "select".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Mismatched end tag: expected </read>, found </select>"
        );
    }
}
