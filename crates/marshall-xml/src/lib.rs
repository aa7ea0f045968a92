//! Mutable, namespace-aware XML trees for document marshalling.
//!
//! This crate wraps [`quick-xml`] to provide an arena of [`XmlNode`]s that can
//! be parsed from text, grown in place, and written back out in a canonical
//! form. Nodes are addressed by [`NodeId`] handles that stay valid for the
//! lifetime of the tree, because nodes are only ever added, never removed.
//!
//! # Overview
//!
//! The main types are:
//! - [`XmlTree`]: The node arena plus its root
//! - [`XmlNode`]: An element with name, attributes, optional text, and children
//! - [`QName`]: An element name as written, with its resolved namespace
//! - [`XmlAttribute`]: A name/value pair, as written in the source
//!
//! # Example
//!
//! ```rust
//! use marshall_xml::parse;
//!
//! let tree = parse(r#"<requests xmlns="http://example.org/q">
//!   <read database="archive"/>
//! </requests>"#).unwrap();
//!
//! let root = tree.root();
//! assert_eq!(tree.default_namespace(), Some("http://example.org/q"));
//!
//! let read = tree.find_child(root, "read", Some("http://example.org/q")).unwrap();
//! assert_eq!(tree.get_attribute(read, "database"), Some("archive"));
//! ```
//!
//! # Canonical output
//!
//! [`XmlTree::to_xml_string`] always emits a double-quoted XML declaration,
//! two-space indentation and newline-terminated lines, regardless of how the
//! input was formatted.

pub mod error;
pub mod parser;
pub mod types;
pub mod writer;

// Re-export main types
pub use error::{Error, Result};
pub use parser::parse;
pub use types::{NodeId, QName, XmlAttribute, XmlNode, XmlTree};
