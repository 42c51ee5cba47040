//! quick-xml reader that builds a [`Document`] from well-formed XHTML.
//!
//! EPUB content documents are XML: `<a id="x"/>` is an empty anchor, not an
//! open tag swallowing its siblings as the HTML tree builder would have it.

use html5ever::{LocalName, Prefix, QualName, ns};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::arena::{Attribute, Document, NodeId};
use crate::epub::xml::resolve_entity;
use crate::error::{Error, Result};

/// Parse a well-formed XHTML document.
///
/// Unlike [`parse_html`](super::parse_html) nothing is repaired: markup that
/// is not well-formed XML, or that uses an entity not known here, is an
/// error and the caller decides how to fall back.
pub fn parse_xhtml(xhtml: &str) -> Result<Document> {
    let mut reader = Reader::from_str(xhtml);
    let mut doc = Document::new();
    let mut stack: Vec<NodeId> = vec![doc.root()];

    loop {
        let parent = stack.last().copied().unwrap_or(doc.root());
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let element = create_element(&mut doc, &e)?;
                doc.append(parent, element);
                stack.push(element);
            }
            Ok(Event::Empty(e)) => {
                let element = create_element(&mut doc, &e)?;
                doc.append(parent, element);
            }
            Ok(Event::End(_)) => {
                if stack.len() == 1 {
                    return Err(Error::MarkupParse("unbalanced end tag".to_string()));
                }
                stack.pop();
            }
            Ok(Event::Text(e)) => doc.append_text(parent, &String::from_utf8_lossy(e.as_ref())),
            Ok(Event::CData(e)) => doc.append_text(parent, &String::from_utf8_lossy(e.as_ref())),
            Ok(Event::GeneralRef(e)) => {
                let entity = String::from_utf8_lossy(e.as_ref());
                doc.append_text(parent, &resolve(&entity)?);
            }
            Ok(Event::Comment(e)) => {
                let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                let comment = doc.create_comment(text);
                doc.append(parent, comment);
            }
            Ok(Event::Decl(e)) => {
                let decl = format!("?{}?", String::from_utf8_lossy(e.as_ref()));
                let node = doc.create_comment(decl);
                doc.append(parent, node);
            }
            Ok(Event::PI(e)) => {
                let pi = format!("?{}?", String::from_utf8_lossy(e.as_ref()));
                let node = doc.create_comment(pi);
                doc.append(parent, node);
            }
            Ok(Event::DocType(e)) => {
                let (name, public_id, system_id) =
                    parse_doctype(&String::from_utf8_lossy(e.as_ref()));
                let node = doc.create_doctype(name, public_id, system_id);
                doc.append(parent, node);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(Error::Xml(e)),
        }
    }

    if stack.len() > 1 {
        let open = doc
            .element_name(stack[stack.len() - 1])
            .map(|name| name.to_string())
            .unwrap_or_default();
        return Err(Error::MarkupParse(format!("unclosed <{open}>")));
    }
    Ok(doc)
}

fn qual_name(raw: &str, default_ns: bool) -> QualName {
    match raw.split_once(':') {
        Some((prefix, local)) => {
            QualName::new(Some(Prefix::from(prefix)), ns!(), LocalName::from(local))
        }
        None if default_ns => QualName::new(None, ns!(html), LocalName::from(raw)),
        None => QualName::new(None, ns!(), LocalName::from(raw)),
    }
}

fn create_element(doc: &mut Document, e: &BytesStart<'_>) -> Result<NodeId> {
    let name = qual_name(&String::from_utf8_lossy(e.name().as_ref()), true);
    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| Error::Xml(err.into()))?;
        attrs.push(Attribute {
            name: qual_name(&String::from_utf8_lossy(attr.key.as_ref()), false),
            value: unescape(&String::from_utf8_lossy(&attr.value))?,
        });
    }
    Ok(doc.create_element(name, attrs))
}

/// XML entities plus the HTML ones common in ebook XHTML.
fn resolve(entity: &str) -> Result<String> {
    if let Some(resolved) = resolve_entity(entity) {
        return Ok(resolved);
    }
    let c = match entity {
        "nbsp" => '\u{a0}',
        "shy" => '\u{ad}',
        "copy" => '©',
        "mdash" => '—',
        "ndash" => '–',
        "hellip" => '…',
        "lsquo" => '‘',
        "rsquo" => '’',
        "ldquo" => '“',
        "rdquo" => '”',
        "laquo" => '«',
        "raquo" => '»',
        _ => return Err(Error::MarkupParse(format!("unknown entity &{entity};"))),
    };
    Ok(c.to_string())
}

fn unescape(raw: &str) -> Result<String> {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let Some(semi) = rest[amp..].find(';') else {
            return Err(Error::MarkupParse("unterminated entity in attribute".to_string()));
        };
        out.push_str(&resolve(&rest[amp + 1..amp + semi])?);
        rest = &rest[amp + semi + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Split `html PUBLIC "pub" "sys"` into name, public id and system id.
fn parse_doctype(decl: &str) -> (String, String, String) {
    let decl = decl.trim();
    let (name, rest) = decl.split_once(char::is_whitespace).unwrap_or((decl, ""));
    let rest = rest.trim_start();

    let mut ids = Vec::new();
    let mut tail = rest;
    while let Some(open) = tail.find(['"', '\'']) {
        let quote = &tail[open..open + 1];
        let Some(len) = tail[open + 1..].find(quote) else { break };
        ids.push(tail[open + 1..open + 1 + len].to_string());
        tail = &tail[open + 1 + len + 1..];
    }
    let mut ids = ids.into_iter();

    let keyword = rest.get(..6).map(str::to_ascii_uppercase);
    let (public_id, system_id) = match keyword.as_deref() {
        Some("PUBLIC") => (ids.next().unwrap_or_default(), ids.next().unwrap_or_default()),
        Some("SYSTEM") => (String::new(), ids.next().unwrap_or_default()),
        _ => (String::new(), String::new()),
    };
    (name.to_string(), public_id, system_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Flavor, serialize_document};

    const CHAPTER: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.1//EN" "http://www.w3.org/TR/xhtml11/DTD/xhtml11.dtd">
<html xmlns="http://www.w3.org/1999/xhtml"><head><title>One</title></head>
<body><a id="top"/><p>Fish &amp; chips&nbsp;<br/>again</p><div class="pb"/><p>Two</p></body></html>"#;

    #[test]
    fn test_empty_elements_have_no_children() {
        let doc = parse_xhtml(CHAPTER).unwrap();
        let body = doc.find_by_tag("body").unwrap();
        let children: Vec<_> = doc
            .children(body)
            .filter(|&id| doc.is_element(id))
            .map(|id| doc.element_name(id).unwrap().to_string())
            .collect();
        assert_eq!(children, ["a", "p", "div", "p"]);

        let anchor = doc.find_by_tag("a").unwrap();
        assert_eq!(doc.children(anchor).count(), 0);
        assert_eq!(doc.text(doc.find_by_tag("p").unwrap()), "Fish & chips\u{a0}again");
    }

    #[test]
    fn test_serializes_back_to_xhtml() {
        let doc = parse_xhtml(CHAPTER).unwrap();
        let out = serialize_document(&doc, Flavor::Xhtml);
        assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.1//EN\" \"http://www.w3.org/TR/xhtml11/DTD/xhtml11.dtd\">"), "{out}");
        assert!(out.contains(r#"<html xmlns="http://www.w3.org/1999/xhtml">"#));
        assert!(out.contains(r#"<a id="top"></a><p>Fish &amp; chips"#));
        assert!(out.contains("<br />again"));
        assert!(out.contains(r#"<div class="pb"></div><p>Two</p>"#));
    }

    #[test]
    fn test_prefixed_names_kept() {
        let doc = parse_xhtml(
            r#"<html xmlns:epub="http://www.idpf.org/2007/ops"><body><svg:svg epub:type="cover"/></body></html>"#,
        )
        .unwrap();
        let out = serialize_document(&doc, Flavor::Xhtml);
        assert!(out.contains(r#"<svg:svg epub:type="cover"></svg:svg>"#), "{out}");
    }

    #[test]
    fn test_not_well_formed_is_error() {
        assert!(parse_xhtml("<html><body><p>open<br></p></body></html>").is_err());
        assert!(parse_xhtml("<html><body><p>open</p></body>").is_err());
        assert!(parse_xhtml("<html><body>&bogus;</body></html>").is_err());
        assert!(parse_xhtml(r#"<html><body><img alt="&bogus;"/></body></html>"#).is_err());
    }

    #[test]
    fn test_attribute_entities_resolved() {
        let doc = parse_xhtml(r#"<p title="a &amp; b &#x2A;"/>"#).unwrap();
        let p = doc.find_by_tag("p").unwrap();
        assert_eq!(doc.get_attr(p, "title"), Some("a & b *"));
    }

    #[test]
    fn test_parse_doctype() {
        assert_eq!(
            parse_doctype(r#" html PUBLIC "-//W3C//DTD XHTML 1.1//EN" 'x.dtd'"#),
            ("html".to_string(), "-//W3C//DTD XHTML 1.1//EN".to_string(), "x.dtd".to_string())
        );
        assert_eq!(parse_doctype("html"), ("html".to_string(), String::new(), String::new()));
        assert_eq!(
            parse_doctype(r#"html SYSTEM "about:legacy-compat""#),
            ("html".to_string(), String::new(), "about:legacy-compat".to_string())
        );
    }
}
