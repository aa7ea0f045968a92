//! Core types for the mutable XML tree.

use std::fmt;

/// Handle to a node in an [`XmlTree`].
///
/// Handles are plain indices into the tree's arena. Nodes are never removed,
/// so a handle stays valid for as long as the tree that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of this node in the arena (document creation order).
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An element name as written in the document, with its resolved namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    /// Namespace prefix, if any (e.g., "sky" in `<sky:read>`).
    pub prefix: Option<String>,

    /// The local name of the element (without namespace prefix).
    pub local: String,

    /// The namespace URI the name resolved to, if any.
    pub namespace: Option<String>,
}

impl QName {
    /// Create a name with no prefix and no namespace.
    pub fn new(local: impl Into<String>) -> Self {
        Self {
            prefix: None,
            local: local.into(),
            namespace: None,
        }
    }

    /// Create a name bound to a namespace.
    pub fn with_namespace(
        prefix: Option<String>,
        local: impl Into<String>,
        namespace: Option<String>,
    ) -> Self {
        Self {
            prefix,
            local: local.into(),
            namespace,
        }
    }

    /// The name as it appears in markup, `prefix:local` or `local`.
    pub fn qualified(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.local),
            None => self.local.clone(),
        }
    }

    /// Check whether this name has the given local part and namespace.
    ///
    /// `None` matches only names that are in no namespace.
    pub fn matches(&self, local: &str, namespace: Option<&str>) -> bool {
        self.local == local && self.namespace.as_deref() == namespace
    }
}

impl fmt::Display for QName {
    /// Clark notation: `{namespace}local`, or just `local` without a namespace.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local),
            None => f.write_str(&self.local),
        }
    }
}

/// An XML attribute.
///
/// The name is kept exactly as written (including any prefix), and namespace
/// declarations (`xmlns`, `xmlns:p`) are stored as ordinary attributes so that
/// they survive a parse/serialize round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    /// The attribute name as written.
    pub name: String,

    /// The attribute value (after unescaping XML entities).
    pub value: String,
}

impl XmlAttribute {
    /// Create a new attribute.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An element in an [`XmlTree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlNode {
    /// The element name.
    pub name: QName,

    /// Attributes in document order.
    pub attributes: Vec<XmlAttribute>,

    /// Text content, if any.
    pub text: Option<String>,

    /// The parent element; `None` only for the root.
    pub parent: Option<NodeId>,

    /// Child elements in document order.
    pub children: Vec<NodeId>,
}

impl XmlNode {
    fn new(name: QName, parent: Option<NodeId>) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            text: None,
            parent,
            children: Vec::new(),
        }
    }

    /// Get an attribute value by name.
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Check if this element has non-empty text content.
    pub fn has_text(&self) -> bool {
        self.text.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Check if this element has child elements.
    pub fn has_elements(&self) -> bool {
        !self.children.is_empty()
    }
}

/// An arena of XML elements with a single root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlTree {
    nodes: Vec<XmlNode>,
    root: NodeId,
}

impl XmlTree {
    /// Create a tree holding only a root element.
    ///
    /// When `namespace` is given, the root is placed in it and carries a
    /// default namespace declaration (`xmlns="..."`).
    pub fn new_root(local: &str, namespace: Option<&str>) -> Self {
        let name = QName::with_namespace(None, local, namespace.map(str::to_string));
        let mut root = XmlNode::new(name, None);
        if let Some(ns) = namespace {
            root.attributes.push(XmlAttribute::new("xmlns", ns));
        }
        Self {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    /// Start a tree whose root is the given element; used by the parser.
    pub(crate) fn with_root(name: QName, attributes: Vec<XmlAttribute>) -> Self {
        let mut root = XmlNode::new(name, None);
        root.attributes = attributes;
        Self {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    /// The root element.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of elements in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree always has a root, so it is never empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Borrow a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by a different tree and is out of range.
    pub fn node(&self, id: NodeId) -> &XmlNode {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut XmlNode {
        &mut self.nodes[id.0]
    }

    /// Iterate over all nodes in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &XmlNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Child elements of a node, in document order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Parent of a node; `None` for the root.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// The namespace declared by the root's `xmlns` attribute, if any.
    pub fn default_namespace(&self) -> Option<&str> {
        self.node(self.root).get_attribute("xmlns")
    }

    /// The namespace the root element resolved to, if any.
    pub fn root_namespace(&self) -> Option<&str> {
        self.node(self.root).name.namespace.as_deref()
    }

    /// Append a node with an explicit name; used by the parser.
    pub(crate) fn push_node(
        &mut self,
        parent: NodeId,
        name: QName,
        attributes: Vec<XmlAttribute>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        let mut node = XmlNode::new(name, Some(parent));
        node.attributes = attributes;
        self.nodes.push(node);
        self.node_mut(parent).children.push(id);
        id
    }

    /// Create a new last child of `parent`.
    ///
    /// New nodes always take the canonical form: the same prefix and namespace
    /// as the root element, so they serialize alongside the root without extra
    /// declarations.
    pub fn append_child(&mut self, parent: NodeId, local: &str) -> NodeId {
        let root_name = &self.node(self.root).name;
        let name = QName::with_namespace(
            root_name.prefix.clone(),
            local,
            root_name.namespace.clone(),
        );
        self.push_node(parent, name, Vec::new())
    }

    /// First child of `parent` whose name matches `local` in `namespace`.
    pub fn find_child(
        &self,
        parent: NodeId,
        local: &str,
        namespace: Option<&str>,
    ) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|&child| self.node(child).name.matches(local, namespace))
    }

    /// All children of `parent` with the given local name, in any namespace.
    pub fn find_children(&self, parent: NodeId, local: &str) -> Vec<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .filter(|&child| self.node(child).name.local == local)
            .collect()
    }

    /// Get an attribute value by name.
    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id).get_attribute(name)
    }

    /// Set an attribute, replacing any existing value in place.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        let value = value.into();
        let node = self.node_mut(id);
        match node.attributes.iter_mut().find(|a| a.name == name) {
            Some(attr) => attr.value = value,
            None => node.attributes.push(XmlAttribute::new(name, value)),
        }
    }

    /// Text content of a node, if any.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.node(id).text.as_deref()
    }

    /// Replace the text content of a node.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        self.node_mut(id).text = Some(text.into());
    }

    /// Number of ancestors between a node and the root.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.parent(id);
        while let Some(parent) = current {
            depth += 1;
            current = self.parent(parent);
        }
        depth
    }
}
