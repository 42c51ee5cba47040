//! html5ever `TreeSink` that builds a [`Document`].

use std::borrow::Cow;
use std::cell::RefCell;

use html5ever::tendril::StrTendril;
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{Attribute as Html5Attribute, QualName};

use super::arena::{Attribute, Document, NodeData, NodeId};

/// Handle the tree builder uses to refer to nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handle(pub NodeId);

impl Default for Handle {
    fn default() -> Self {
        Handle(NodeId::NONE)
    }
}

/// Sink that accumulates parser output into an arena.
///
/// `TreeSink` takes `&self` everywhere, so the document sits behind a
/// `RefCell`.
pub struct DocumentSink {
    doc: RefCell<Document>,
    quirks_mode: RefCell<QuirksMode>,
}

impl Default for DocumentSink {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentSink {
    pub fn new() -> Self {
        Self {
            doc: RefCell::new(Document::new()),
            quirks_mode: RefCell::new(QuirksMode::NoQuirks),
        }
    }

    pub fn into_document(self) -> Document {
        self.doc.into_inner()
    }

    fn append_to(doc: &mut Document, parent: NodeId, child: NodeOrText<Handle>) {
        match child {
            NodeOrText::AppendNode(node) => doc.append(parent, node.0),
            NodeOrText::AppendText(text) => doc.append_text(parent, &text),
        }
    }
}

impl TreeSink for DocumentSink {
    type Handle = Handle;
    type Output = Self;
    type ElemName<'a>
        = &'a QualName
    where
        Self: 'a;

    fn finish(self) -> Self::Output {
        self
    }

    fn parse_error(&self, _msg: Cow<'static, str>) {
        // Legacy ebook markup is full of errors; parse like a browser would.
    }

    fn get_document(&self) -> Self::Handle {
        Handle(self.doc.borrow().root())
    }

    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> Self::ElemName<'a> {
        static EMPTY: QualName = QualName {
            prefix: None,
            ns: html5ever::ns!(),
            local: html5ever::local_name!(""),
        };

        let doc = self.doc.borrow();
        match doc.get(target.0).map(|n| &n.data) {
            Some(NodeData::Element { name, .. }) => {
                // SAFETY: element names are never mutated or dropped while the
                // sink is alive, and the tree builder uses the reference
                // before it appends any further node.
                unsafe { std::mem::transmute::<&QualName, &'a QualName>(name) }
            }
            _ => &EMPTY,
        }
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<Html5Attribute>,
        _flags: ElementFlags,
    ) -> Self::Handle {
        let attrs = attrs
            .into_iter()
            .map(|a| Attribute {
                name: a.name,
                value: a.value.to_string(),
            })
            .collect();
        Handle(self.doc.borrow_mut().create_element(name, attrs))
    }

    fn create_comment(&self, text: StrTendril) -> Self::Handle {
        Handle(self.doc.borrow_mut().create_comment(text.to_string()))
    }

    fn create_pi(&self, target: StrTendril, data: StrTendril) -> Self::Handle {
        // Kept in the same shape the HTML tokenizer produces for `<?...?>`.
        let text = format!("?{target} {data}?");
        Handle(self.doc.borrow_mut().create_comment(text))
    }

    fn append(&self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        Self::append_to(&mut self.doc.borrow_mut(), parent.0, child);
    }

    fn append_based_on_parent_node(
        &self,
        element: &Self::Handle,
        prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        let parent = self
            .doc
            .borrow()
            .get(element.0)
            .map(|n| n.parent)
            .unwrap_or(NodeId::NONE);
        if parent.is_some() {
            Self::append_to(&mut self.doc.borrow_mut(), parent, child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(
        &self,
        name: StrTendril,
        public_id: StrTendril,
        system_id: StrTendril,
    ) {
        let mut doc = self.doc.borrow_mut();
        let root = doc.root();
        let doctype = doc.create_doctype(
            name.to_string(),
            public_id.to_string(),
            system_id.to_string(),
        );
        doc.append(root, doctype);
    }

    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        *target
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        x.0 == y.0
    }

    fn set_quirks_mode(&self, mode: QuirksMode) {
        *self.quirks_mode.borrow_mut() = mode;
    }

    fn append_before_sibling(&self, sibling: &Self::Handle, new_node: NodeOrText<Self::Handle>) {
        let mut doc = self.doc.borrow_mut();
        let node = match new_node {
            NodeOrText::AppendNode(node) => node.0,
            NodeOrText::AppendText(text) => doc.create_text(text.to_string()),
        };
        doc.insert_before(sibling.0, node);
    }

    fn add_attrs_if_missing(&self, target: &Self::Handle, attrs: Vec<Html5Attribute>) {
        let mut doc = self.doc.borrow_mut();
        if let Some(node) = doc.get_mut(target.0)
            && let NodeData::Element {
                attrs: existing, ..
            } = &mut node.data
        {
            for attr in attrs {
                if !existing.iter().any(|a| a.name == attr.name) {
                    existing.push(Attribute {
                        name: attr.name,
                        value: attr.value.to_string(),
                    });
                }
            }
        }
    }

    fn remove_from_parent(&self, target: &Self::Handle) {
        self.doc.borrow_mut().detach(target.0);
    }

    fn reparent_children(&self, node: &Self::Handle, new_parent: &Self::Handle) {
        let mut doc = self.doc.borrow_mut();
        let children: Vec<_> = doc.children(node.0).collect();
        for child in children {
            doc.detach(child);
            doc.append(new_parent.0, child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse_html;

    #[test]
    fn test_basic_parse() {
        let doc = parse_html("<html><body><p>Hello</p></body></html>");
        let p = doc.find_by_tag("p").expect("should find p");
        assert_eq!(doc.element_name(p).unwrap().as_ref(), "p");
        assert_eq!(doc.text(p), "Hello");
    }

    #[test]
    fn test_attributes() {
        let doc = parse_html(r#"<div id="main" class="container">Content</div>"#);
        let div = doc.find_by_tag("div").expect("should find div");
        assert_eq!(doc.get_attr(div, "id"), Some("main"));
        assert_eq!(doc.get_attr(div, "class"), Some("container"));
    }

    #[test]
    fn test_implied_structure() {
        let doc = parse_html("<p>First</p><p>Second</p>");
        let body = doc.find_by_tag("body").expect("implied body");
        assert!(doc.find_by_tag("head").is_some());
        let paragraphs = doc
            .children(body)
            .filter(|&c| doc.is_element_named(c, "p"))
            .count();
        assert_eq!(paragraphs, 2);
    }

    #[test]
    fn test_xml_declaration_kept_as_comment() {
        let doc = parse_html("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<html><body></body></html>");
        let first = doc.children(doc.root()).next().expect("first node");
        assert!(!doc.is_element(first));
    }
}
