//! The attribute-style document facade.

use crate::error::{Error, Result};
use crate::export::{ExportOptions, ExportOutcome, export};
use crate::resolver::Resolver;
use crate::schema::{FIELD_DISCRIMINATOR, IdentifierKind, SOURCE_FILE, Schema};
use crate::value::Value;
use indexmap::IndexMap;
use marshall_xml::{NodeId, XmlTree};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// An XML document read and written through schema identifiers.
///
/// Every read or write goes through the identifier's [`IdentifierKind`]:
///
/// | Kind | `get` | `set` |
/// |------|-------|-------|
/// | `Structural` | text if non-empty, else the node | sets the node's text |
/// | `FieldPattern` | the field node (its `name` is confirmed) | not writable |
/// | `Attribute` | the attribute value, or `Absent` | sets the attribute |
/// | `TextAlias` | target's text if non-empty, else the node | sets the target's text |
/// | `Bookkeeping` | the stored value, or `Absent` | stores the value |
///
/// Paths to the affected node are created on first access, so even a read
/// can grow the tree. A document is not meant to be shared between threads
/// while it is being mutated.
pub struct Document {
    schema: Arc<Schema>,
    tree: XmlTree,
    resolver: Resolver,
    bookkeeping: IndexMap<String, String>,
}

impl Document {
    /// Create an empty document holding just the schema's root element.
    pub fn new(schema: Arc<Schema>) -> Self {
        let tree = XmlTree::new_root(schema.root_tag(), schema.namespace());
        let resolver = Resolver::new(schema.namespace().map(str::to_string));
        Self {
            schema,
            tree,
            resolver,
            bookkeeping: IndexMap::new(),
        }
    }

    /// Parse a document from text.
    ///
    /// The document namespace is the one the root element resolved to, which
    /// for ordinary documents is the root's default namespace declaration.
    /// Documents without one fall back to the schema's namespace.
    pub fn parse(schema: Arc<Schema>, text: &str) -> Result<Self> {
        let tree = marshall_xml::parse(text)?;
        let namespace = tree
            .root_namespace()
            .or(schema.namespace())
            .map(str::to_string);
        debug!(
            schema = %schema.name(),
            namespace = ?namespace,
            nodes = tree.len(),
            "Parsed document"
        );
        Ok(Self {
            schema,
            tree,
            resolver: Resolver::new(namespace),
            bookkeeping: IndexMap::new(),
        })
    }

    /// Read and parse a document file, remembering its path as `source_file`.
    pub fn open(schema: Arc<Schema>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let mut document = Self::parse(schema, &text)?;
        document
            .bookkeeping
            .insert(SOURCE_FILE.to_string(), path.display().to_string());
        Ok(document)
    }

    /// The schema this document is read through.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// The underlying tree, for inspection.
    pub fn tree(&self) -> &XmlTree {
        &self.tree
    }

    /// The namespace used to match qualified tags.
    pub fn namespace(&self) -> Option<&str> {
        self.resolver.namespace()
    }

    /// The file this document was opened from, if any.
    pub fn source_file(&self) -> Option<&str> {
        self.bookkeeping.get(SOURCE_FILE).map(String::as_str)
    }

    /// Read an identifier.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::UnknownIdentifier`] if the schema doesn't know
    /// `identifier`.
    pub fn get(&mut self, identifier: &str) -> Result<Value> {
        let schema = Arc::clone(&self.schema);
        let kind = self.classify(&schema, identifier)?;

        match kind {
            IdentifierKind::Structural => {
                let node = self.resolve(identifier)?;
                Ok(self.text_or_node(node))
            }
            IdentifierKind::FieldPattern { discriminator } => {
                let node = self.resolve(identifier)?;
                let current = self.tree.get_attribute(node, FIELD_DISCRIMINATOR);
                if current != Some(discriminator.as_str()) {
                    self.tree.set_attribute(node, FIELD_DISCRIMINATOR, discriminator.as_str());
                }
                Ok(Value::Node(node))
            }
            IdentifierKind::Attribute { owner, attribute } => {
                let node = self.resolve(owner)?;
                debug!(identifier, owner = %owner, "Reading tag attribute");
                Ok(self
                    .tree
                    .get_attribute(node, attribute)
                    .map_or(Value::Absent, |v| Value::Text(v.to_string())))
            }
            IdentifierKind::TextAlias { target } => {
                let node = self.resolve(target)?;
                Ok(self.text_or_node(node))
            }
            IdentifierKind::Bookkeeping => Ok(self
                .bookkeeping
                .get(identifier)
                .map_or(Value::Absent, |v| Value::Text(v.clone()))),
        }
    }

    /// Read an identifier as text; nodes and unset values read as `""`.
    pub fn get_text(&mut self, identifier: &str) -> Result<String> {
        Ok(self.get(identifier)?.into_text())
    }

    /// Write an identifier.
    ///
    /// Values are stored verbatim; no type coercion happens.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::UnknownIdentifier`] for identifiers outside the
    /// schema and [`Error::NotWritable`] for field elements.
    pub fn set(&mut self, identifier: &str, value: impl Into<String>) -> Result<()> {
        let schema = Arc::clone(&self.schema);
        let kind = self.classify(&schema, identifier)?;
        let value = value.into();

        match kind {
            IdentifierKind::Attribute { owner, attribute } => {
                let node = self.resolve(owner)?;
                debug!(identifier, owner = %owner, %value, "Setting tag attribute");
                self.tree.set_attribute(node, attribute, value);
            }
            IdentifierKind::TextAlias { target } => {
                let node = self.resolve(target)?;
                debug!(identifier, target = %target, %value, "Setting aliased tag text");
                self.tree.set_text(node, value);
            }
            IdentifierKind::Structural => {
                let node = self.resolve(identifier)?;
                debug!(identifier, %value, "Setting tag text");
                self.tree.set_text(node, value);
            }
            IdentifierKind::FieldPattern { .. } => {
                return Err(Error::NotWritable {
                    identifier: identifier.to_string(),
                });
            }
            IdentifierKind::Bookkeeping => {
                self.bookkeeping.insert(identifier.to_string(), value);
            }
        }
        Ok(())
    }

    /// Field elements directly under the element named by `parent`.
    ///
    /// Includes field elements the schema doesn't describe, in document order.
    pub fn field_nodes(&mut self, parent: &str) -> Result<Vec<NodeId>> {
        let parent = self.resolve(parent)?;
        Ok(self.resolver.field_nodes(&self.tree, parent))
    }

    /// Resolve a tag identifier to its node, creating it if needed.
    pub fn resolve(&mut self, identifier: &str) -> Result<NodeId> {
        self.resolver.resolve_or_create(&self.schema, &mut self.tree, identifier)
    }

    /// Serialize the document in canonical form.
    pub fn to_xml_string(&self) -> Result<String> {
        Ok(self.tree.to_xml_string()?)
    }

    /// Write the document to `path`; see [`export`].
    pub fn export(&self, path: impl AsRef<Path>, options: ExportOptions) -> Result<ExportOutcome> {
        export(self, path.as_ref(), options)
    }

    fn classify<'s>(&self, schema: &'s Schema, identifier: &str) -> Result<&'s IdentifierKind> {
        schema
            .classify_identifier(identifier)
            .ok_or_else(|| Error::UnknownIdentifier {
                document: schema.name().to_string(),
                identifier: identifier.to_string(),
            })
    }

    fn text_or_node(&self, node: NodeId) -> Value {
        match self.tree.text(node) {
            Some(text) if !text.is_empty() => Value::Text(text.to_string()),
            _ => Value::Node(node),
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let xml = self.to_xml_string().map_err(|_| fmt::Error)?;
        f.write_str(&xml)
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}(\"{}\")",
            self.schema.name(),
            self.source_file().unwrap_or_default()
        )
    }
}
