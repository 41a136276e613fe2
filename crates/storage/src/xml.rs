//! XML parsing and serialization
//!
//! Documents and fragments are read with `quick-xml`'s pull reader straight
//! into a [`Tree`]. Serialization writes one node (and its subtree) back to a
//! string, escaping text and attribute content.

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use arbor_core::{Error, NodeId, NodeKind, Result};

use crate::tree::Tree;

/// Parse a complete document. Exactly one root element is required.
pub fn parse_document(xml: &str, chop: bool) -> Result<Tree> {
    let tree = parse(xml, chop)?;
    let roots = tree
        .children(NodeId::ROOT)
        .iter()
        .filter(|id| tree.kind(**id) == Some(NodeKind::Element))
        .count();
    let stray_text = tree
        .children(NodeId::ROOT)
        .iter()
        .any(|id| tree.kind(*id) == Some(NodeKind::Text));
    if roots != 1 || stray_text {
        return Err(Error::Parse(
            "document must contain exactly one root element".to_string(),
        ));
    }
    Ok(tree)
}

/// Parse a fragment: any sequence of elements, text, comments and PIs.
pub fn parse_fragment(xml: &str, chop: bool) -> Result<Tree> {
    parse(xml, chop)
}

fn parse_error(reader: &Reader<&[u8]>, err: impl std::fmt::Display) -> Error {
    Error::Parse(format!("{} (at byte {})", err, reader.error_position()))
}

fn parse(xml: &str, chop: bool) -> Result<Tree> {
    let mut reader = Reader::from_str(xml);
    let mut tree = Tree::new();
    let mut open: Vec<NodeId> = vec![NodeId::ROOT];

    loop {
        let parent = *open.last().unwrap_or(&NodeId::ROOT);
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let id = open_element(&mut tree, parent, &e)?;
                open.push(id);
            }
            Ok(Event::Empty(e)) => {
                open_element(&mut tree, parent, &e)?;
            }
            Ok(Event::End(_)) => {
                if open.len() <= 1 {
                    return Err(parse_error(&reader, "unexpected closing tag"));
                }
                open.pop();
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_err(|err| parse_error(&reader, err))?;
                if chop && text.trim().is_empty() {
                    continue;
                }
                tree.insert_text(parent, None, &text)?;
            }
            Ok(Event::CData(e)) => {
                let raw = e.into_inner();
                let text = String::from_utf8_lossy(&raw);
                tree.insert_text(parent, None, &text)?;
            }
            Ok(Event::Comment(e)) => {
                let text = String::from_utf8_lossy(&e);
                tree.insert_comment(parent, None, &text)?;
            }
            Ok(Event::PI(e)) => {
                let target = String::from_utf8_lossy(e.target()).into_owned();
                let content = String::from_utf8_lossy(e.content()).into_owned();
                tree.insert_pi(parent, None, &target, content.trim_start())?;
            }
            Ok(Event::Decl(_)) | Ok(Event::DocType(_)) => {}
            Ok(Event::Eof) => break,
            Err(e) => return Err(parse_error(&reader, e)),
        }
    }

    if open.len() > 1 {
        return Err(Error::Parse(format!(
            "unclosed element at end of input (depth {})",
            open.len() - 1
        )));
    }
    Ok(tree)
}

fn open_element(tree: &mut Tree, parent: NodeId, e: &BytesStart<'_>) -> Result<NodeId> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let id = tree.insert_element(parent, None, &name)?;
    for attr in e.attributes() {
        let attr = attr.map_err(|err| Error::Parse(err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| Error::Parse(err.to_string()))?;
        tree.insert_attribute(id, &key, &value)?;
    }
    Ok(id)
}

/// Serialize a node and its subtree.
///
/// Attributes serialize as `name="value"`; the document node serializes its
/// children back to back.
pub fn serialize(tree: &Tree, id: NodeId) -> String {
    let mut out = String::new();
    write_node(tree, id, &mut out);
    out
}

fn write_node(tree: &Tree, id: NodeId, out: &mut String) {
    let Some(kind) = tree.kind(id) else {
        return;
    };
    let name = tree.name(id).unwrap_or_default();
    let value = tree.value(id).unwrap_or_default();
    match kind {
        NodeKind::Document => {
            for child in tree.children(id) {
                write_node(tree, *child, out);
            }
        }
        NodeKind::Element => {
            out.push('<');
            out.push_str(name);
            for attr in tree.attributes(id) {
                out.push(' ');
                write_node(tree, *attr, out);
            }
            let children = tree.children(id);
            if children.is_empty() {
                out.push_str("/>");
            } else {
                out.push('>');
                for child in children {
                    write_node(tree, *child, out);
                }
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
        }
        NodeKind::Attribute => {
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape(value));
            out.push('"');
        }
        NodeKind::Text => out.push_str(&escape(value)),
        NodeKind::Comment => {
            out.push_str("<!--");
            out.push_str(value);
            out.push_str("-->");
        }
        NodeKind::ProcessingInstruction => {
            out.push_str("<?");
            out.push_str(name);
            if !value.is_empty() {
                out.push(' ');
                out.push_str(value);
            }
            out.push_str("?>");
        }
    }
}
