//! Values returned by document reads.

use marshall_xml::NodeId;
use std::fmt;

/// The result of reading an identifier.
///
/// Keeping the three outcomes apart lets callers tell "leaf with no text yet"
/// from "attribute never set" without inspecting empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Text content or an attribute value.
    Text(String),

    /// A structural element, or a leaf that has no text yet.
    Node(NodeId),

    /// An attribute or bookkeeping value that was never set.
    Absent,
}

impl Value {
    /// The text, with `Node` and `Absent` read as the empty string.
    pub fn as_text(&self) -> &str {
        match self {
            Value::Text(text) => text,
            Value::Node(_) | Value::Absent => "",
        }
    }

    /// Owned version of [`Value::as_text`].
    pub fn into_text(self) -> String {
        match self {
            Value::Text(text) => text,
            Value::Node(_) | Value::Absent => String::new(),
        }
    }

    /// The node handle, if this is a `Node`.
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Value::Node(id) => Some(*id),
            _ => None,
        }
    }

    /// Whether the value was never set.
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(text) => f.write_str(text),
            Value::Node(id) => write!(f, "<node {}>", id),
            Value::Absent => Ok(()),
        }
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}
