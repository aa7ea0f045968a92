//! Canonical serialization of [`XmlTree`]s.

use crate::{Error, NodeId, Result, XmlTree};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

/// Spaces per nesting level.
const INDENT: usize = 2;

impl XmlTree {
    /// Serialize the tree in canonical form.
    ///
    /// The output starts with `<?xml version="1.0" encoding="UTF-8" standalone="yes"?>`
    /// (double quotes; some consumers reject single-quoted declarations),
    /// indents two spaces per level, keeps leaf text inline, self-closes empty
    /// elements and ends every line with a newline.
    pub fn to_xml_string(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT);

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
            .map_err(write_error)?;
        self.write_node(&mut writer, self.root())?;

        let mut output = String::from_utf8(writer.into_inner()).map_err(write_error)?;
        output.push('\n');
        Ok(output)
    }

    fn write_node(&self, writer: &mut Writer<Vec<u8>>, id: NodeId) -> Result<()> {
        let node = self.node(id);
        let name = node.name.qualified();

        let mut start = BytesStart::new(name.as_str());
        for attr in &node.attributes {
            start.push_attribute((attr.name.as_str(), attr.value.as_str()));
        }

        let text = node.text.as_deref().filter(|t| !t.is_empty());
        if text.is_none() && node.children.is_empty() {
            return writer.write_event(Event::Empty(start)).map_err(write_error);
        }

        writer.write_event(Event::Start(start)).map_err(write_error)?;
        if let Some(text) = text {
            writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(write_error)?;
        }
        for &child in &node.children {
            self.write_node(writer, child)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(name.as_str())))
            .map_err(write_error)
    }
}

fn write_error(err: impl std::fmt::Display) -> Error {
    Error::Write {
        message: err.to_string(),
    }
}
