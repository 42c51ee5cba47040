//! Serialization of a [`Document`] back to markup.
//!
//! Two flavors are supported: plain HTML for standalone pages, and XHTML for
//! content documents that go back into an EPUB container, where void
//! elements must be self-closed.

use std::fmt::Write;

use html5ever::QualName;

use super::arena::{Document, Node, NodeData, NodeId};

/// Output markup flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    Html,
    Xhtml,
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

enum Op {
    Open(NodeId),
    Close(NodeId),
}

/// Serialize the whole document.
pub fn serialize_document(doc: &Document, flavor: Flavor) -> String {
    let children: Vec<_> = doc.children(doc.root()).collect();
    serialize_nodes(doc, &children, flavor)
}

/// Serialize a single node including its own tag.
pub fn serialize_node(doc: &Document, id: NodeId, flavor: Flavor) -> String {
    serialize_nodes(doc, &[id], flavor)
}

fn serialize_nodes(doc: &Document, ids: &[NodeId], flavor: Flavor) -> String {
    let mut out = String::new();
    let mut ops: Vec<Op> = ids.iter().rev().map(|&id| Op::Open(id)).collect();

    while let Some(op) = ops.pop() {
        match op {
            Op::Open(id) => {
                let Some(node) = doc.get(id) else { continue };
                match &node.data {
                    NodeData::Document => {
                        let mut children: Vec<_> = doc.children(id).collect();
                        children.reverse();
                        ops.extend(children.into_iter().map(Op::Open));
                    }
                    NodeData::Element { name, attrs } => {
                        let tag = name.local.as_ref();
                        out.push('<');
                        push_name(&mut out, name);
                        for attr in attrs {
                            out.push(' ');
                            push_name(&mut out, &attr.name);
                            out.push_str("=\"");
                            escape_attr(&mut out, &attr.value);
                            out.push('"');
                        }

                        if VOID_ELEMENTS.contains(&tag) {
                            out.push_str(match flavor {
                                Flavor::Html => ">",
                                Flavor::Xhtml => " />",
                            });
                            continue;
                        }

                        out.push('>');
                        ops.push(Op::Close(id));
                        let mut children: Vec<_> = doc.children(id).collect();
                        children.reverse();
                        ops.extend(children.into_iter().map(Op::Open));
                    }
                    NodeData::Text(text) => {
                        let raw = doc
                            .element_name(node.parent)
                            .is_some_and(|n| RAW_TEXT_ELEMENTS.contains(&n.as_ref()));
                        if raw {
                            out.push_str(text);
                        } else {
                            escape_text(&mut out, text);
                        }
                    }
                    NodeData::Comment(text) => {
                        if text.len() > 1 && text.starts_with('?') && text.ends_with('?') {
                            out.push('<');
                            out.push_str(&utf8_declaration(text));
                            out.push('>');
                        } else {
                            let _ = write!(out, "<!--{text}-->");
                        }
                    }
                    NodeData::Doctype {
                        name,
                        public_id,
                        system_id,
                    } => {
                        let _ = write!(out, "<!DOCTYPE {name}");
                        if !public_id.is_empty() {
                            let _ = write!(out, " PUBLIC \"{public_id}\"");
                            if !system_id.is_empty() {
                                let _ = write!(out, " \"{system_id}\"");
                            }
                        } else if !system_id.is_empty() {
                            let _ = write!(out, " SYSTEM \"{system_id}\"");
                        }
                        out.push('>');
                    }
                }
            }
            Op::Close(id) => {
                if let Some(Node {
                    data: NodeData::Element { name, .. },
                    ..
                }) = doc.get(id)
                {
                    out.push_str("</");
                    push_name(&mut out, name);
                    out.push('>');
                }
            }
        }
    }

    out
}

fn push_name(out: &mut String, name: &QualName) {
    if let Some(prefix) = &name.prefix {
        out.push_str(prefix.as_ref());
        out.push(':');
    }
    out.push_str(name.local.as_ref());
}

/// Output is always UTF-8, so an XML declaration must say so.
fn utf8_declaration(pi: &str) -> String {
    if !pi.starts_with("?xml") {
        return pi.to_string();
    }
    let lower = pi.to_ascii_lowercase();
    let Some(start) = lower.find("encoding=") else {
        return pi.to_string();
    };
    let value_start = start + "encoding=".len();
    let Some(quote) = pi[value_start..].chars().next().filter(|c| *c == '"' || *c == '\'') else {
        return pi.to_string();
    };
    let Some(len) = pi[value_start + 1..].find(quote) else {
        return pi.to_string();
    };
    format!(
        "{}{quote}utf-8{quote}{}",
        &pi[..value_start],
        &pi[value_start + 1 + len + 1..]
    )
}

fn escape_text(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse_html;
    use super::*;

    #[test]
    fn test_roundtrip_html() {
        let doc = parse_html("<!DOCTYPE html><html><head><title>T</title></head><body><p class=\"x\">A &amp; B<br></p></body></html>");
        let out = serialize_document(&doc, Flavor::Html);
        assert_eq!(
            out,
            "<!DOCTYPE html><html><head><title>T</title></head><body><p class=\"x\">A &amp; B<br></p></body></html>"
        );
    }

    #[test]
    fn test_xhtml_void_elements() {
        let doc = parse_html("<html><body><p>x<br/><img src=\"a.png\"/></p></body></html>");
        let out = serialize_document(&doc, Flavor::Xhtml);
        assert!(out.contains("<br />"));
        assert!(out.contains("<img src=\"a.png\" />"));
    }

    #[test]
    fn test_doctype_with_ids() {
        let doc = parse_html(
            "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.1//EN\" \"http://www.w3.org/TR/xhtml11/DTD/xhtml11.dtd\"><html><body></body></html>",
        );
        let out = serialize_document(&doc, Flavor::Xhtml);
        assert!(out.starts_with(
            "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.1//EN\" \"http://www.w3.org/TR/xhtml11/DTD/xhtml11.dtd\">"
        ));
    }

    #[test]
    fn test_xml_declaration_restored_as_utf8() {
        let doc = parse_html(
            "<?xml version=\"1.0\" encoding=\"iso-8859-1\"?>\n<html><body><p>x</p></body></html>",
        );
        let out = serialize_document(&doc, Flavor::Xhtml);
        assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"), "{out}");
    }

    #[test]
    fn test_style_text_not_escaped() {
        let doc = parse_html("<html><head><style>p > a { color: red }</style></head><body></body></html>");
        let out = serialize_document(&doc, Flavor::Html);
        assert!(out.contains("<style>p > a { color: red }</style>"));
    }
}
