//! In-memory HTML document model.
//!
//! Book pages are parsed with html5ever into an arena [`Document`], edited in
//! place, and written back out with [`serialize_document`]. EPUB content
//! documents go through [`parse_xhtml`] instead when they are well formed.

mod arena;
mod serialize;
mod tree_sink;
mod xhtml;

pub use arena::{Attribute, Document, Node, NodeData, NodeId};
pub use serialize::{Flavor, serialize_document, serialize_node};
pub use xhtml::parse_xhtml;

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;

use tree_sink::DocumentSink;

/// Parse an HTML (or XHTML) string into a [`Document`].
///
/// Parsing never fails; malformed markup is repaired the way a browser
/// would repair it, so `<html>`, `<head>` and `<body>` always exist.
pub fn parse_html(html: &str) -> Document {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            drop_doctype: false,
            ..Default::default()
        },
        ..Default::default()
    };
    parse_document(DocumentSink::new(), opts)
        .from_utf8()
        .one(html.as_bytes())
        .into_document()
}

/// Parse a markup fragment and return the document plus the nodes that ended
/// up directly under `<body>`.
pub fn parse_fragment(html: &str) -> (Document, Vec<NodeId>) {
    let doc = parse_html(&format!(
        "<!DOCTYPE html><html><head></head><body>{html}</body></html>"
    ));
    let nodes = doc
        .find_by_tag("body")
        .map(|body| doc.children(body).collect())
        .unwrap_or_default();
    (doc, nodes)
}
