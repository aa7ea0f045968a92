//! Identifier → node resolution with on-demand creation.
//!
//! [`Resolver::resolve_or_create`] walks the hierarchy from the requested
//! identifier up to the root, resolving (and if necessary creating) each
//! ancestor first. Children are matched in two passes: first in no namespace,
//! then in the document namespace, because documents written by different
//! tools may or may not qualify their tags. New nodes are always created in
//! the canonical, qualified form.
//!
//! Field elements all share the tag `field` and are told apart by their
//! `name` attribute. When several siblings carry the same discriminator the
//! first one in document order wins.

use crate::error::{Error, Result};
use crate::schema::{FIELD_DISCRIMINATOR, FIELD_TAG, ROOT, Schema, TagEntry};
use indexmap::IndexMap;
use marshall_xml::{NodeId, XmlTree};
use tracing::debug;

/// Resolves identifiers against one tree.
///
/// Resolved nodes are remembered in an insertion-ordered index. The index is
/// only a shortcut: nodes are never removed from the tree, so a remembered
/// handle is always the node a fresh search would find.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    index: IndexMap<String, NodeId>,
    namespace: Option<String>,
}

impl Resolver {
    /// Create a resolver for a tree whose tags live in `namespace`.
    pub fn new(namespace: Option<String>) -> Self {
        Self {
            index: IndexMap::new(),
            namespace,
        }
    }

    /// The namespace used for the qualified search pass.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Identifiers resolved so far, in the order they were first resolved.
    pub fn resolved(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.index.iter().map(|(id, node)| (id.as_str(), *node))
    }

    /// Return the node for `identifier`, creating it and any missing
    /// ancestors.
    ///
    /// The reserved identifier `root` resolves to the tree root.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::UnknownIdentifier`] if `identifier` is not in the
    /// schema's hierarchy.
    pub fn resolve_or_create(
        &mut self,
        schema: &Schema,
        tree: &mut XmlTree,
        identifier: &str,
    ) -> Result<NodeId> {
        if identifier == ROOT {
            return Ok(tree.root());
        }
        if let Some(&node) = self.index.get(identifier) {
            return Ok(node);
        }

        let entry = hierarchy_entry(schema, identifier)?;
        let parent = match &entry.parent {
            Some(parent) => self.resolve_or_create(schema, tree, parent)?,
            None => tree.root(),
        };

        let node = match self.search(tree, parent, entry) {
            Some(node) => {
                debug!(identifier, tag = %entry.tag, %node, "Found existing tag");
                node
            }
            None => {
                let node = tree.append_child(parent, &entry.tag);
                if let Some(discriminator) = &entry.discriminator {
                    // Set before anyone can search for it again, or the next
                    // lookup would create a second field with the same role.
                    tree.set_attribute(node, FIELD_DISCRIMINATOR, discriminator.as_str());
                }
                debug!(identifier, tag = %entry.tag, %parent, %node, "Created tag");
                node
            }
        };

        self.index.insert(identifier.to_string(), node);
        Ok(node)
    }

    /// Find the node for `identifier` without creating anything.
    ///
    /// Ignores the index and searches the tree from the root, so it can be
    /// used to check that the index agrees with the tree.
    pub fn lookup(
        &self,
        schema: &Schema,
        tree: &XmlTree,
        identifier: &str,
    ) -> Result<Option<NodeId>> {
        if identifier == ROOT {
            return Ok(Some(tree.root()));
        }
        let entry = hierarchy_entry(schema, identifier)?;
        let parent = match &entry.parent {
            Some(parent) => match self.lookup(schema, tree, parent)? {
                Some(parent) => parent,
                None => return Ok(None),
            },
            None => tree.root(),
        };
        Ok(self.search(tree, parent, entry))
    }

    fn search(&self, tree: &XmlTree, parent: NodeId, entry: &TagEntry) -> Option<NodeId> {
        match &entry.discriminator {
            Some(discriminator) => self.find_field(tree, parent, discriminator),
            None => tree
                .find_child(parent, &entry.tag, None)
                .or_else(|| self.qualified_child(tree, parent, &entry.tag)),
        }
    }

    fn qualified_child(&self, tree: &XmlTree, parent: NodeId, tag: &str) -> Option<NodeId> {
        let namespace = self.namespace.as_deref()?;
        tree.find_child(parent, tag, Some(namespace))
    }

    /// All `field` children of `parent`, qualified or not, in document order.
    pub fn field_nodes(&self, tree: &XmlTree, parent: NodeId) -> Vec<NodeId> {
        tree.children(parent)
            .iter()
            .copied()
            .filter(|&child| self.is_field(tree, child))
            .collect()
    }

    /// The first `field` child of `parent` whose `name` is `discriminator`.
    pub fn find_field(
        &self,
        tree: &XmlTree,
        parent: NodeId,
        discriminator: &str,
    ) -> Option<NodeId> {
        tree.children(parent).iter().copied().find(|&child| {
            self.is_field(tree, child)
                && tree.get_attribute(child, FIELD_DISCRIMINATOR) == Some(discriminator)
        })
    }

    fn is_field(&self, tree: &XmlTree, node: NodeId) -> bool {
        let name = &tree.node(node).name;
        name.matches(FIELD_TAG, None) || name.matches(FIELD_TAG, self.namespace.as_deref())
    }
}

fn hierarchy_entry<'a>(schema: &'a Schema, identifier: &str) -> Result<&'a TagEntry> {
    schema.tag(identifier).ok_or_else(|| Error::UnknownIdentifier {
        document: schema.name().to_string(),
        identifier: identifier.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaSpec;
    use marshall_xml::parse;

    const NS: &str = "http://dwd.de/sky";

    fn schema() -> Schema {
        Schema::load(
            SchemaSpec::new("Test", "requestCollection")
                .namespace(NS)
                .tag("read", ROOT, "read")
                .tag("select", "read", "select")
                .tag("reference_date", "select", "referenceDate")
                .tag("reference_date_value", "reference_date", "value")
                .field("shortname", "select", "PARAMETER_SHORTNAME")
                .field("member", "select", "ENSEMBLE_MEMBER"),
        )
        .unwrap()
    }

    fn fresh() -> (Schema, XmlTree, Resolver) {
        (
            schema(),
            XmlTree::new_root("requestCollection", Some(NS)),
            Resolver::new(Some(NS.to_string())),
        )
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let (schema, mut tree, mut resolver) = fresh();
        let first = resolver.resolve_or_create(&schema, &mut tree, "select").unwrap();
        let size = tree.len();
        let second = resolver.resolve_or_create(&schema, &mut tree, "select").unwrap();
        assert_eq!(first, second);
        assert_eq!(tree.len(), size);
    }

    #[test]
    fn test_index_matches_fresh_search() {
        let (schema, mut tree, mut resolver) = fresh();
        let node = resolver
            .resolve_or_create(&schema, &mut tree, "reference_date_value")
            .unwrap();

        // A resolver with an empty index must find the same node.
        let cold = Resolver::new(Some(NS.to_string()));
        assert_eq!(cold.lookup(&schema, &tree, "reference_date_value").unwrap(), Some(node));

        let mut cold = Resolver::new(Some(NS.to_string()));
        let size = tree.len();
        assert_eq!(
            cold.resolve_or_create(&schema, &mut tree, "reference_date_value").unwrap(),
            node
        );
        assert_eq!(tree.len(), size);
    }

    #[test]
    fn test_missing_ancestors_are_created_once() {
        let (schema, mut tree, mut resolver) = fresh();
        let value = resolver
            .resolve_or_create(&schema, &mut tree, "reference_date_value")
            .unwrap();

        // root + read + select + referenceDate + value
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.depth(value), 4);

        let date = tree.parent(value).unwrap();
        let select = tree.parent(date).unwrap();
        let read = tree.parent(select).unwrap();
        assert_eq!(tree.node(date).name.local, "referenceDate");
        assert_eq!(tree.node(select).name.local, "select");
        assert_eq!(tree.node(read).name.local, "read");
        assert_eq!(tree.parent(read), Some(tree.root()));

        let order: Vec<_> = resolver.resolved().map(|(id, _)| id).collect();
        assert_eq!(
            order,
            vec!["read", "select", "reference_date", "reference_date_value"]
        );
    }

    #[test]
    fn test_fields_are_disambiguated() {
        let (schema, mut tree, mut resolver) = fresh();
        let shortname = resolver.resolve_or_create(&schema, &mut tree, "shortname").unwrap();
        let member = resolver.resolve_or_create(&schema, &mut tree, "member").unwrap();

        assert_ne!(shortname, member);
        assert_eq!(tree.parent(shortname), tree.parent(member));
        assert_eq!(tree.get_attribute(shortname, "name"), Some("PARAMETER_SHORTNAME"));
        assert_eq!(tree.get_attribute(member, "name"), Some("ENSEMBLE_MEMBER"));

        let size = tree.len();
        let mut cold = Resolver::new(Some(NS.to_string()));
        assert_eq!(cold.resolve_or_create(&schema, &mut tree, "shortname").unwrap(), shortname);
        assert_eq!(cold.resolve_or_create(&schema, &mut tree, "member").unwrap(), member);
        assert_eq!(tree.len(), size);

        let select = tree.parent(shortname).unwrap();
        assert_eq!(resolver.field_nodes(&tree, select), vec![shortname, member]);
    }

    #[test]
    fn test_first_matching_field_wins() {
        let schema = schema();
        let mut tree = parse(&format!(
            r#"<requestCollection xmlns="{NS}"><read><select>
<field name="ENSEMBLE_MEMBER"><value>1</value></field>
<field name="ENSEMBLE_MEMBER"><value>2</value></field>
</select></read></requestCollection>"#
        ))
        .unwrap();
        let mut resolver = Resolver::new(Some(NS.to_string()));
        let value = resolver.resolve_or_create(&schema, &mut tree, "member_value").unwrap();
        assert_eq!(tree.text(value), Some("1"));
    }

    #[test]
    fn test_unqualified_document_is_reused() {
        let schema = schema();
        let mut tree =
            parse("<requestCollection><read><select/></read></requestCollection>").unwrap();
        let size = tree.len();
        let mut resolver = Resolver::new(Some(NS.to_string()));
        let select = resolver.resolve_or_create(&schema, &mut tree, "select").unwrap();
        assert_eq!(tree.len(), size);
        assert_eq!(tree.node(select).name.namespace, None);
    }

    #[test]
    fn test_qualified_document_is_reused() {
        let schema = schema();
        for xml in [
            format!(
                r#"<requestCollection xmlns="{NS}"><read><select/></read></requestCollection>"#
            ),
            format!(
                r#"<s:requestCollection xmlns:s="{NS}"><s:read><s:select/></s:read></s:requestCollection>"#
            ),
        ] {
            let mut tree = parse(&xml).unwrap();
            let size = tree.len();
            let mut resolver = Resolver::new(Some(NS.to_string()));
            let select = resolver.resolve_or_create(&schema, &mut tree, "select").unwrap();
            assert_eq!(tree.len(), size, "duplicate created for {}", xml);
            assert_eq!(tree.node(select).name.namespace.as_deref(), Some(NS));
        }
    }

    #[test]
    fn test_unknown_identifier() {
        let (schema, mut tree, mut resolver) = fresh();
        let err = resolver
            .resolve_or_create(&schema, &mut tree, "station_number")
            .unwrap_err();
        assert!(matches!(
            err,
            Error::UnknownIdentifier { ref identifier, .. } if identifier == "station_number"
        ));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_lookup_does_not_create() {
        let (schema, tree, resolver) = fresh();
        assert_eq!(resolver.lookup(&schema, &tree, "select").unwrap(), None);
        assert_eq!(tree.len(), 1);
        assert_eq!(resolver.lookup(&schema, &tree, ROOT).unwrap(), Some(tree.root()));
    }
}
