//! XML parser that builds mutable [`XmlTree`]s.

use crate::{Error, NodeId, QName, Result, XmlAttribute, XmlTree};
use quick_xml::NsReader;
use quick_xml::events::{BytesCData, BytesStart, BytesText, Event};
use quick_xml::name::ResolveResult;

/// Parse XML from a string, producing an [`XmlTree`].
///
/// Element namespaces are resolved against the `xmlns` declarations in scope.
/// Whitespace-only text between elements is dropped; comments, processing
/// instructions, DOCTYPE and the XML declaration are skipped.
///
/// # Example
///
/// ```rust
/// use marshall_xml::parse;
///
/// let tree = parse("<root><child/></root>").unwrap();
/// assert_eq!(tree.node(tree.root()).name.local, "root");
/// assert_eq!(tree.children(tree.root()).len(), 1);
/// ```
///
/// # Errors
///
/// Returns an error if the XML is malformed or if parsing fails.
pub fn parse(content: &str) -> Result<XmlTree> {
    let mut parser = XmlParser::new(content);
    parser.parse()
}

/// Internal parser state.
struct XmlParser<'a> {
    /// The namespace-resolving quick-xml reader.
    reader: NsReader<&'a [u8]>,

    /// The tree under construction; created when the root start tag is read.
    tree: Option<XmlTree>,

    /// Open elements, innermost last.
    stack: Vec<OpenElement>,
}

/// An element whose end tag has not been seen yet.
struct OpenElement {
    id: NodeId,

    /// Name as written, for end-tag matching.
    raw_name: String,

    /// Text read before the first child element.
    text: String,

    /// Text read after the first child element.
    tail: String,

    has_children: bool,
}

impl OpenElement {
    fn push_text(&mut self, text: &str) {
        if self.has_children {
            self.tail.push_str(text);
        } else {
            self.text.push_str(text);
        }
    }
}

impl<'a> XmlParser<'a> {
    fn new(source: &'a str) -> Self {
        let mut reader = NsReader::from_str(source);
        reader.config_mut().trim_text_start = false;
        reader.config_mut().trim_text_end = false;

        Self {
            reader,
            tree: None,
            stack: Vec::new(),
        }
    }

    fn parse(&mut self) -> Result<XmlTree> {
        loop {
            let event_start = self.reader.buffer_position();
            let (resolved, event) = match self.reader.read_resolved_event() {
                Ok((resolved, event)) => (resolve_namespace(resolved)?, event.into_owned()),
                Err(e) => {
                    return Err(Error::XmlSyntax {
                        message: e.to_string(),
                        position: Some(self.reader.error_position()),
                    });
                }
            };

            match event {
                Event::Start(e) => {
                    self.handle_start(&e, resolved, event_start, false)?;
                }
                Event::Empty(e) => {
                    self.handle_start(&e, resolved, event_start, true)?;
                }
                Event::End(e) => {
                    let end_name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                    self.handle_end(&end_name)?;
                }
                Event::Text(e) => {
                    self.handle_text(&e, event_start)?;
                }
                Event::CData(e) => {
                    self.handle_cdata(&e);
                }
                Event::Comment(_) | Event::PI(_) | Event::Decl(_) | Event::DocType(_) => {
                    // Not represented in the tree
                }
                Event::Eof => break,
            }
        }

        // Check for unclosed elements
        if let Some(open) = self.stack.last() {
            return Err(Error::UnexpectedEof {
                expected: format!("closing tag </{}>", open.raw_name),
            });
        }

        self.tree.take().ok_or(Error::EmptyDocument)
    }

    fn handle_start(
        &mut self,
        e: &BytesStart<'_>,
        namespace: Option<String>,
        event_start: u64,
        empty: bool,
    ) -> Result<()> {
        let raw_name = String::from_utf8_lossy(e.name().as_ref()).to_string();
        let (local, prefix) = split_name(&raw_name);
        let name = QName::with_namespace(prefix, local, namespace);
        let attributes = self.parse_attributes(e, event_start)?;

        let parent = self.stack.last_mut().map(|open| {
            open.has_children = true;
            open.id
        });
        let id = match (self.tree.as_mut(), parent) {
            (Some(tree), Some(parent)) => tree.push_node(parent, name, attributes),
            (None, _) => {
                let tree = XmlTree::with_root(name, attributes);
                let root = tree.root();
                self.tree = Some(tree);
                root
            }
            (Some(_), None) => return Err(Error::MultipleRoots),
        };

        if !empty {
            self.stack.push(OpenElement {
                id,
                raw_name,
                text: String::new(),
                tail: String::new(),
                has_children: false,
            });
        }
        Ok(())
    }

    fn handle_end(&mut self, end_name: &str) -> Result<()> {
        let open = self.stack.pop().ok_or_else(|| Error::InvalidStructure {
            message: format!("Unexpected closing tag </{}>", end_name),
        })?;

        // Verify tag names match
        if open.raw_name != end_name {
            return Err(Error::MismatchedEndTag {
                expected: open.raw_name,
                found: end_name.to_string(),
            });
        }

        if let Some(tree) = self.tree.as_mut() {
            finalize_text(tree, open);
        }
        Ok(())
    }

    fn handle_text(&mut self, e: &BytesText<'_>, event_start: u64) -> Result<()> {
        let text = e.unescape().map_err(|err| Error::XmlSyntax {
            message: format!("Invalid text content: {}", err),
            position: Some(event_start),
        })?;

        match self.stack.last_mut() {
            Some(open) => open.push_text(&text),
            None if text.trim().is_empty() => {}
            None => {
                return Err(Error::InvalidStructure {
                    message: format!("Text outside the root element: {:?}", text.trim()),
                });
            }
        }
        Ok(())
    }

    fn handle_cdata(&mut self, e: &BytesCData<'_>) {
        if let Some(open) = self.stack.last_mut() {
            open.push_text(&String::from_utf8_lossy(e.as_ref()));
        }
    }

    fn parse_attributes(&self, e: &BytesStart<'_>, tag_start: u64) -> Result<Vec<XmlAttribute>> {
        let mut attributes = Vec::new();

        for attr_result in e.attributes() {
            let attr = attr_result?;
            let name = String::from_utf8_lossy(attr.key.as_ref()).to_string();
            let value = attr.unescape_value().map_err(|err| Error::XmlSyntax {
                message: format!("Invalid attribute value: {}", err),
                position: Some(tag_start),
            })?;
            attributes.push(XmlAttribute::new(name, value.into_owned()));
        }

        Ok(attributes)
    }
}

/// Map a quick-xml resolution result to a namespace URI.
fn resolve_namespace(resolved: ResolveResult<'_>) -> Result<Option<String>> {
    match resolved {
        ResolveResult::Bound(ns) => Ok(Some(String::from_utf8_lossy(ns.as_ref()).to_string())),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(Error::UnboundPrefix {
            prefix: String::from_utf8_lossy(&prefix).to_string(),
        }),
    }
}

/// Split `prefix:local` into `(local, Some(prefix))`.
fn split_name(full_name: &str) -> (String, Option<String>) {
    match full_name.split_once(':') {
        Some((prefix, local)) => (local.to_string(), Some(prefix.to_string())),
        None => (full_name.to_string(), None),
    }
}

/// Store accumulated text on a closed element.
///
/// Leaves keep their text exactly, and so does text written before the first
/// child, which is where the writer puts it. Whitespace-only chunks around
/// children are indentation and are dropped. Text that only appears after
/// the first child is kept trimmed.
fn finalize_text(tree: &mut XmlTree, open: OpenElement) {
    let id = open.id;
    if !open.has_children {
        if !open.text.is_empty() {
            tree.set_text(id, open.text);
        }
    } else if !open.text.trim().is_empty() {
        tree.set_text(id, open.text);
    } else {
        let tail = open.tail.trim();
        if !tail.is_empty() {
            tree.set_text(id, tail);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = "http://dwd.de/sky";

    #[test]
    fn test_parse_simple_element() {
        let tree = parse("<root/>").unwrap();
        let root = tree.node(tree.root());
        assert_eq!(root.name.local, "root");
        assert!(!root.has_elements());
        assert_eq!(root.text, None);
    }

    #[test]
    fn test_parse_nested_elements() {
        let tree = parse("<root><child/></root>").unwrap();
        let children = tree.children(tree.root());
        assert_eq!(children.len(), 1);
        assert_eq!(tree.node(children[0]).name.local, "child");
        assert_eq!(tree.parent(children[0]), Some(tree.root()));
    }

    #[test]
    fn test_parse_text_content() {
        let tree = parse("<root>Hello, world!</root>").unwrap();
        assert_eq!(tree.text(tree.root()), Some("Hello, world!"));
    }

    #[test]
    fn test_parse_unescapes_text_and_attributes() {
        let tree = parse(r#"<root a="x &amp; y">1 &lt; 2</root>"#).unwrap();
        assert_eq!(tree.get_attribute(tree.root(), "a"), Some("x & y"));
        assert_eq!(tree.text(tree.root()), Some("1 < 2"));
    }

    #[test]
    fn test_parse_cdata_as_text() {
        let tree = parse("<root><![CDATA[a <b>]]></root>").unwrap();
        assert_eq!(tree.text(tree.root()), Some("a <b>"));
    }

    #[test]
    fn test_indentation_is_not_text() {
        let tree = parse("<root>\n  <read>\n    <value>5</value>\n  </read>\n</root>\n").unwrap();
        let root = tree.root();
        assert_eq!(tree.text(root), None);
        let read = tree.children(root)[0];
        assert_eq!(tree.text(read), None);
        let value = tree.children(read)[0];
        assert_eq!(tree.text(value), Some("5"));
    }

    #[test]
    fn test_text_before_children_is_kept_exactly() {
        let tree = parse("<root>  padded  <child/>\n</root>").unwrap();
        assert_eq!(tree.text(tree.root()), Some("  padded  "));

        let tree = parse("<root>\n  <child/>\n  trailing\n</root>").unwrap();
        assert_eq!(tree.text(tree.root()), Some("trailing"));
    }

    #[test]
    fn test_default_namespace_is_resolved() {
        let xml = format!(r#"<requestCollection xmlns="{NS}"><read/></requestCollection>"#);
        let tree = parse(&xml).unwrap();
        let root = tree.root();
        assert_eq!(tree.default_namespace(), Some(NS));
        assert_eq!(tree.root_namespace(), Some(NS));

        let read = tree.children(root)[0];
        assert!(tree.node(read).name.matches("read", Some(NS)));
        assert_eq!(tree.node(read).name.prefix, None);
    }

    #[test]
    fn test_prefixed_namespace_is_resolved() {
        let xml = format!(
            r#"<sky:requestCollection xmlns:sky="{NS}"><sky:read/></sky:requestCollection>"#
        );
        let tree = parse(&xml).unwrap();
        let root = tree.root();
        assert_eq!(tree.default_namespace(), None);
        assert_eq!(tree.root_namespace(), Some(NS));

        let read = tree.children(root)[0];
        assert!(tree.node(read).name.matches("read", Some(NS)));
        assert_eq!(tree.node(read).name.qualified(), "sky:read");
    }

    #[test]
    fn test_no_namespace() {
        let tree = parse("<requestCollection><read/></requestCollection>").unwrap();
        let read = tree.children(tree.root())[0];
        assert!(tree.node(read).name.matches("read", None));
    }

    #[test]
    fn test_unbound_prefix_error() {
        let result = parse("<sky:root/>");
        assert!(
            matches!(result, Err(Error::UnboundPrefix { ref prefix }) if prefix == "sky"),
            "Expected UnboundPrefix, got: {:?}",
            result
        );
    }

    #[test]
    fn test_declaration_and_comments_skipped() {
        let tree = parse(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!-- note -->\n<root><!-- inner --><a/></root>",
        )
        .unwrap();
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_empty_document_error() {
        let result = parse("");
        assert!(matches!(result, Err(Error::EmptyDocument)));
    }

    #[test]
    fn test_multiple_roots_error() {
        let result = parse("<root/><another/>");
        assert!(matches!(result, Err(Error::MultipleRoots)), "got: {:?}", result);
    }

    #[test]
    fn test_unclosed_element_error() {
        let result = parse("<root><child>");
        assert!(
            matches!(result, Err(Error::UnexpectedEof { .. } | Error::XmlSyntax { .. })),
            "got: {:?}",
            result
        );
    }

    #[test]
    fn test_mismatched_tags_error() {
        let result = parse("<root></wrong>");
        // quick-xml checks end names itself by default and reports a syntax error
        assert!(
            matches!(
                result,
                Err(Error::MismatchedEndTag { .. } | Error::XmlSyntax { .. })
            ),
            "Expected MismatchedEndTag or XmlSyntax error, got: {:?}",
            result
        );
    }

    #[test]
    fn test_syntax_error() {
        let result = parse("<root attr=unquoted/>");
        assert!(matches!(result, Err(Error::XmlSyntax { .. })), "got: {:?}", result);
    }
}
