//! Schema tables and their load-time classification.
//!
//! A schema is data, not code: it is written as a [`SchemaSpec`] (normally a
//! TOML file) and turned into a [`Schema`] by [`Schema::load`], which validates
//! the tables once and assigns every identifier exactly one
//! [`IdentifierKind`]. Adding a document variant means writing a new table,
//! never touching the resolver.
//!
//! ```toml
//! name = "SkyQuery"
//! root = "requestCollection"
//! namespace = "http://dwd.de/sky"
//! bookkeeping = ["note"]
//!
//! [tags]                      # identifier = [parent, tag name]
//! read = ["root", "read"]
//! select = ["read", "select"]
//!
//! [attributes]                # identifier = [owning tag, attribute name]
//! database = ["read", "database"]
//!
//! [fields.ensemble]           # <field name="ENSEMBLE_MEMBER"><value/></field>
//! parent = "select"
//! discriminator = "ENSEMBLE_MEMBER"
//!
//! [aliases]                   # identifier = tag whose text it exposes
//! ensemble_member = "ensemble_value"
//! ```

use crate::error::SchemaError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Parent identifier denoting the document root.
pub const ROOT: &str = "root";

/// Tag name shared by all discriminated field elements.
pub const FIELD_TAG: &str = "field";

/// Attribute that tells field elements apart.
pub const FIELD_DISCRIMINATOR: &str = "name";

/// Tag name of the child holding a field's value.
pub const FIELD_VALUE_TAG: &str = "value";

/// Bookkeeping identifier every schema carries for the document's origin.
pub const SOURCE_FILE: &str = "source_file";

/// Declarative schema tables, as written by a schema author.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaSpec {
    /// Name of the document variant, used in error messages.
    #[serde(default = "default_name")]
    pub name: String,

    /// Tag name of the document root.
    pub root: String,

    /// Namespace new documents are created in.
    #[serde(default)]
    pub namespace: Option<String>,

    /// Identifiers stored on the document itself, never in the tree.
    #[serde(default)]
    pub bookkeeping: Vec<String>,

    /// Hierarchy table: identifier → (parent identifier, tag name).
    #[serde(default)]
    pub tags: IndexMap<String, (String, String)>,

    /// Unique-attribute table: identifier → (owning tag identifier, attribute name).
    #[serde(default)]
    pub attributes: IndexMap<String, (String, String)>,

    /// Field table: identifier → parent and discriminator.
    #[serde(default)]
    pub fields: IndexMap<String, FieldSpec>,

    /// Text aliases: identifier → tag identifier whose text it reads and writes.
    #[serde(default)]
    pub aliases: IndexMap<String, String>,
}

fn default_name() -> String {
    "Document".to_string()
}

/// One entry of the field table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    /// Identifier of the element the field elements live under.
    pub parent: String,

    /// Value of the field element's `name` attribute.
    pub discriminator: String,
}

impl SchemaSpec {
    /// Start an empty spec for a document variant.
    pub fn new(name: impl Into<String>, root: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            ..Self::default()
        }
    }

    /// Parse a spec from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, SchemaError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a spec from a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Set the namespace new documents are created in.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Add a hierarchy entry.
    pub fn tag(mut self, identifier: &str, parent: &str, tag: &str) -> Self {
        self.tags
            .insert(identifier.to_string(), (parent.to_string(), tag.to_string()));
        self
    }

    /// Add an attribute of the tag `owner`.
    pub fn attribute(mut self, identifier: &str, owner: &str, attribute: &str) -> Self {
        self.attributes.insert(
            identifier.to_string(),
            (owner.to_string(), attribute.to_string()),
        );
        self
    }

    /// Add a `field` element under `parent`, told apart by `discriminator`.
    pub fn field(mut self, identifier: &str, parent: &str, discriminator: &str) -> Self {
        self.fields.insert(
            identifier.to_string(),
            FieldSpec {
                parent: parent.to_string(),
                discriminator: discriminator.to_string(),
            },
        );
        self
    }

    /// Expose the text of tag `target` under another name.
    pub fn alias(mut self, identifier: &str, target: &str) -> Self {
        self.aliases.insert(identifier.to_string(), target.to_string());
        self
    }

    /// Declare a value kept beside the tree, never serialized.
    pub fn bookkeeping(mut self, identifier: &str) -> Self {
        self.bookkeeping.push(identifier.to_string());
        self
    }
}

/// Where a tag identifier sits in the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEntry {
    /// Parent identifier; `None` when the parent is the document root.
    pub parent: Option<String>,

    /// Tag name of the element.
    pub tag: String,

    /// For field elements, the required value of their `name` attribute.
    pub discriminator: Option<String>,
}

/// How the document treats an identifier, decided once at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifierKind {
    /// An element of the hierarchy; reads yield its text or its handle.
    Structural,

    /// A discriminated `field` element; reads yield its handle.
    FieldPattern { discriminator: String },

    /// A unique attribute on the element named by `owner`.
    Attribute { owner: String, attribute: String },

    /// A friendly name for the text of the element named by `target`.
    TextAlias { target: String },

    /// A plain value kept on the document, outside the tree.
    Bookkeeping,
}

impl IdentifierKind {
    /// The schema table this kind comes from.
    pub fn table(&self) -> &'static str {
        match self {
            IdentifierKind::Structural => "tag",
            IdentifierKind::FieldPattern { .. } => "field",
            IdentifierKind::Attribute { .. } => "attribute",
            IdentifierKind::TextAlias { .. } => "alias",
            IdentifierKind::Bookkeeping => "bookkeeping",
        }
    }
}

/// A validated schema.
#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    root: String,
    namespace: Option<String>,
    hierarchy: IndexMap<String, TagEntry>,
    kinds: IndexMap<String, IdentifierKind>,
}

impl Schema {
    /// Validate and classify a spec.
    ///
    /// Each field entry contributes two tags: the field element itself and a
    /// `<identifier>_value` child holding its value.
    ///
    /// # Errors
    ///
    /// Fails if the hierarchy has a cycle or a dangling parent, if an
    /// attribute or alias refers to an unknown tag, if an identifier is
    /// declared twice, or if two fields under one parent share a discriminator.
    pub fn load(spec: SchemaSpec) -> Result<Self, SchemaError> {
        let mut schema = Schema {
            name: spec.name,
            root: spec.root,
            namespace: spec.namespace,
            hierarchy: IndexMap::new(),
            kinds: IndexMap::new(),
        };

        for (identifier, (parent, tag)) in spec.tags {
            schema.insert_tag(identifier, &parent, tag, IdentifierKind::Structural)?;
        }

        for (identifier, field) in spec.fields {
            let value_identifier = field_value_identifier(&identifier);
            schema.insert_tag(
                identifier.clone(),
                &field.parent,
                FIELD_TAG.to_string(),
                IdentifierKind::FieldPattern {
                    discriminator: field.discriminator,
                },
            )?;
            schema.insert_tag(
                value_identifier,
                &identifier,
                FIELD_VALUE_TAG.to_string(),
                IdentifierKind::Structural,
            )?;
        }

        schema.check_parents()?;
        schema.check_acyclic()?;
        schema.check_discriminators()?;

        for (identifier, (owner, attribute)) in spec.attributes {
            if owner != ROOT && !schema.hierarchy.contains_key(&owner) {
                return Err(SchemaError::UnknownOwner { identifier, owner });
            }
            schema.classify(identifier, IdentifierKind::Attribute { owner, attribute })?;
        }

        for (identifier, target) in spec.aliases {
            if !schema.hierarchy.contains_key(&target) {
                return Err(SchemaError::UnknownAliasTarget { identifier, target });
            }
            schema.classify(identifier, IdentifierKind::TextAlias { target })?;
        }

        for identifier in spec.bookkeeping {
            schema.classify(identifier, IdentifierKind::Bookkeeping)?;
        }
        if !schema.kinds.contains_key(SOURCE_FILE) {
            schema.classify(SOURCE_FILE.to_string(), IdentifierKind::Bookkeeping)?;
        }

        tracing::debug!(
            schema = %schema.name,
            identifiers = schema.kinds.len(),
            tags = schema.hierarchy.len(),
            "Loaded schema"
        );
        Ok(schema)
    }

    /// Wrap the schema for sharing between documents.
    pub fn into_shared(self) -> Arc<Schema> {
        Arc::new(self)
    }

    /// Name of the document variant.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tag name of the document root.
    pub fn root_tag(&self) -> &str {
        &self.root
    }

    /// Namespace new documents are created in.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// How an identifier is treated, or `None` if the schema doesn't know it.
    pub fn classify_identifier(&self, identifier: &str) -> Option<&IdentifierKind> {
        self.kinds.get(identifier)
    }

    /// The hierarchy entry for a tag identifier.
    pub fn tag(&self, identifier: &str) -> Option<&TagEntry> {
        self.hierarchy.get(identifier)
    }

    /// All identifiers with their classification, in declaration order.
    pub fn identifiers(&self) -> impl Iterator<Item = (&str, &IdentifierKind)> {
        self.kinds.iter().map(|(id, kind)| (id.as_str(), kind))
    }

    /// Field identifiers declared under `parent`, with their discriminators.
    pub fn fields_under<'a>(&'a self, parent: &'a str) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.hierarchy.iter().filter_map(move |(id, entry)| {
            let discriminator = entry.discriminator.as_deref()?;
            let entry_parent = entry.parent.as_deref().unwrap_or(ROOT);
            (entry_parent == parent).then_some((id.as_str(), discriminator))
        })
    }

    fn insert_tag(
        &mut self,
        identifier: String,
        parent: &str,
        tag: String,
        kind: IdentifierKind,
    ) -> Result<(), SchemaError> {
        if identifier == ROOT {
            return Err(SchemaError::ReservedIdentifier { identifier });
        }
        let discriminator = match &kind {
            IdentifierKind::FieldPattern { discriminator } => Some(discriminator.clone()),
            _ => None,
        };
        self.classify(identifier.clone(), kind)?;
        self.hierarchy.insert(
            identifier,
            TagEntry {
                parent: (parent != ROOT).then(|| parent.to_string()),
                tag,
                discriminator,
            },
        );
        Ok(())
    }

    fn classify(&mut self, identifier: String, kind: IdentifierKind) -> Result<(), SchemaError> {
        if identifier == ROOT {
            return Err(SchemaError::ReservedIdentifier { identifier });
        }
        if let Some(existing) = self.kinds.get(&identifier) {
            return Err(SchemaError::AmbiguousIdentifier {
                identifier,
                first: existing.table(),
                second: kind.table(),
            });
        }
        self.kinds.insert(identifier, kind);
        Ok(())
    }

    fn check_parents(&self) -> Result<(), SchemaError> {
        for (identifier, entry) in &self.hierarchy {
            if let Some(parent) = &entry.parent {
                if !self.hierarchy.contains_key(parent) {
                    return Err(SchemaError::UnknownParent {
                        identifier: identifier.clone(),
                        parent: parent.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Walk every tag up to the root; revisiting an identifier is a cycle.
    fn check_acyclic(&self) -> Result<(), SchemaError> {
        for start in self.hierarchy.keys() {
            let mut chain = vec![start.clone()];
            let mut current = start;
            while let Some(parent) = self.hierarchy.get(current).and_then(|e| e.parent.as_ref()) {
                if let Some(pos) = chain.iter().position(|seen| seen == parent) {
                    chain.push(parent.clone());
                    return Err(SchemaError::Cycle {
                        chain: chain.split_off(pos),
                    });
                }
                chain.push(parent.clone());
                current = parent;
            }
        }
        Ok(())
    }

    fn check_discriminators(&self) -> Result<(), SchemaError> {
        let mut seen: HashMap<(&str, &str), &str> = HashMap::new();
        for (identifier, entry) in &self.hierarchy {
            let Some(discriminator) = entry.discriminator.as_deref() else {
                continue;
            };
            let parent = entry.parent.as_deref().unwrap_or(ROOT);
            if let Some(first) = seen.insert((parent, discriminator), identifier) {
                return Err(SchemaError::DuplicateDiscriminator {
                    parent: parent.to_string(),
                    discriminator: discriminator.to_string(),
                    first: first.to_string(),
                    second: identifier.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Identifier of the value child generated for a field identifier.
pub fn field_value_identifier(field: &str) -> String {
    format!("{}_{}", field, FIELD_VALUE_TAG)
}
