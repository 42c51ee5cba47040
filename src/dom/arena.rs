//! Arena-allocated document tree.
//!
//! Nodes live in one vector and link to each other by index. Removing a node
//! only unlinks it from its parent, so ids stay valid for the lifetime of the
//! [`Document`]; detached nodes are simply never visited again.

use html5ever::{LocalName, QualName, ns};

/// Unique identifier for a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Sentinel value for no node.
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_some(&self) -> bool {
        self.0 != u32::MAX
    }

    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }
}

/// Payload of a node.
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Document root.
    Document,
    Element {
        name: QualName,
        attrs: Vec<Attribute>,
    },
    Text(String),
    /// Comments, including `<?xml ...?>` declarations which the HTML
    /// tokenizer turns into bogus comments. The XHTML reader stores
    /// declarations and processing instructions the same way.
    Comment(String),
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },
}

/// Element attribute.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

#[derive(Debug)]
pub struct Node {
    pub data: NodeData,
    pub parent: NodeId,
    pub first_child: NodeId,
    pub last_child: NodeId,
    pub prev_sibling: NodeId,
    pub next_sibling: NodeId,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
        }
    }
}

/// A parsed HTML document.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Document {
    /// Create an empty document holding only the root node.
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId::NONE,
        };
        doc.root = doc.alloc(Node::new(NodeData::Document));
        doc
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get_mut(id.0 as usize)
    }

    pub fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>) -> NodeId {
        self.alloc(Node::new(NodeData::Element { name, attrs }))
    }

    /// Create an HTML-namespace element with plain attributes.
    pub fn create_html_element(&mut self, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let attrs = attrs
            .iter()
            .map(|(name, value)| Attribute {
                name: QualName::new(None, ns!(), LocalName::from(*name)),
                value: value.to_string(),
            })
            .collect();
        self.create_element(QualName::new(None, ns!(html), LocalName::from(tag)), attrs)
    }

    pub fn create_text(&mut self, text: String) -> NodeId {
        self.alloc(Node::new(NodeData::Text(text)))
    }

    pub fn create_comment(&mut self, text: String) -> NodeId {
        self.alloc(Node::new(NodeData::Comment(text)))
    }

    pub fn create_doctype(&mut self, name: String, public_id: String, system_id: String) -> NodeId {
        self.alloc(Node::new(NodeData::Doctype {
            name,
            public_id,
            system_id,
        }))
    }

    /// Append `child` as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        let last_child = self
            .get(parent)
            .map(|n| n.last_child)
            .unwrap_or(NodeId::NONE);

        if let Some(child_node) = self.get_mut(child) {
            child_node.parent = parent;
            child_node.prev_sibling = last_child;
            child_node.next_sibling = NodeId::NONE;
        }

        if let Some(last_node) = self.get_mut(last_child) {
            last_node.next_sibling = child;
        }

        if let Some(parent_node) = self.get_mut(parent) {
            if parent_node.first_child.is_none() {
                parent_node.first_child = child;
            }
            parent_node.last_child = child;
        }
    }

    /// Insert `new_node` immediately before `sibling`.
    pub fn insert_before(&mut self, sibling: NodeId, new_node: NodeId) {
        let (parent, prev) = match self.get(sibling) {
            Some(n) => (n.parent, n.prev_sibling),
            None => return,
        };

        if let Some(new) = self.get_mut(new_node) {
            new.parent = parent;
            new.prev_sibling = prev;
            new.next_sibling = sibling;
        }

        if let Some(sib) = self.get_mut(sibling) {
            sib.prev_sibling = new_node;
        }

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = new_node;
            }
        } else if let Some(par) = self.get_mut(parent) {
            par.first_child = new_node;
        }
    }

    /// Make `child` the first child of `parent`.
    pub fn prepend(&mut self, parent: NodeId, child: NodeId) {
        let first = self
            .get(parent)
            .map(|n| n.first_child)
            .unwrap_or(NodeId::NONE);
        if first.is_some() {
            self.insert_before(first, child);
        } else {
            self.append(parent, child);
        }
    }

    /// Append text, merging into the last child when it is already text.
    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        let last_child = self
            .get(parent)
            .map(|n| n.last_child)
            .unwrap_or(NodeId::NONE);

        if let Some(last) = self.get_mut(last_child)
            && let NodeData::Text(ref mut existing) = last.data
        {
            existing.push_str(text);
            return;
        }

        let text_node = self.create_text(text.to_string());
        self.append(parent, text_node);
    }

    /// Unlink a node (and its subtree) from its parent.
    pub fn detach(&mut self, id: NodeId) {
        let (parent, prev, next) = match self.get(id) {
            Some(n) => (n.parent, n.prev_sibling, n.next_sibling),
            None => return,
        };

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = next;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.first_child = next;
        }

        if next.is_some() {
            if let Some(n) = self.get_mut(next) {
                n.prev_sibling = prev;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.last_child = prev;
        }

        if let Some(node) = self.get_mut(id) {
            node.parent = NodeId::NONE;
            node.prev_sibling = NodeId::NONE;
            node.next_sibling = NodeId::NONE;
        }
    }

    /// Remove every child of `id`.
    pub fn clear_children(&mut self, id: NodeId) {
        let children: Vec<_> = self.children(id).collect();
        for child in children {
            self.detach(child);
        }
    }

    /// Deep-copy a subtree of another document into this one.
    ///
    /// The copy is returned detached; the caller decides where it goes.
    pub fn import(&mut self, other: &Document, id: NodeId) -> NodeId {
        let Some(node) = other.get(id) else {
            return NodeId::NONE;
        };
        let copy = self.alloc(Node::new(node.data.clone()));
        let children: Vec<_> = other.children(id).collect();
        for child in children {
            let child_copy = self.import(other, child);
            self.append(copy, child_copy);
        }
        copy
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn children(&self, parent: NodeId) -> Children<'_> {
        let first = self
            .get(parent)
            .map(|n| n.first_child)
            .unwrap_or(NodeId::NONE);
        Children {
            doc: self,
            current: first,
        }
    }

    /// Collect all attached nodes under `start` (inclusive) in document order.
    pub fn descendants(&self, start: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            if self.get(id).is_none() {
                continue;
            }
            out.push(id);
            let mut children: Vec<_> = self.children(id).collect();
            children.reverse();
            stack.extend(children);
        }
        out
    }

    /// First element with the given tag name (depth-first).
    pub fn find_by_tag(&self, tag: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|&id| self.is_element_named(id, tag))
    }

    /// All elements with the given tag name, in document order.
    pub fn find_all_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|&id| self.is_element_named(id, tag))
            .collect()
    }

    /// Concatenated text of all text nodes in the subtree.
    pub fn text(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node in self.descendants(id) {
            if let Some(Node {
                data: NodeData::Text(text),
                ..
            }) = self.get(node)
            {
                out.push_str(text);
            }
        }
        out
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the children of a node.
pub struct Children<'a> {
    doc: &'a Document,
    current: NodeId,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_none() {
            return None;
        }
        let id = self.current;
        self.current = self
            .doc
            .get(id)
            .map(|n| n.next_sibling)
            .unwrap_or(NodeId::NONE);
        Some(id)
    }
}

/// Element accessors.
impl Document {
    pub fn element_name(&self, id: NodeId) -> Option<&LocalName> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { name, .. } => Some(&name.local),
            _ => None,
        })
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id)
            .is_some_and(|n| matches!(n.data, NodeData::Element { .. }))
    }

    pub fn is_element_named(&self, id: NodeId, tag: &str) -> bool {
        self.element_name(id).is_some_and(|n| n.as_ref() == tag)
    }

    pub fn get_attr(&self, id: NodeId, attr_name: &str) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|a| a.name.local.as_ref() == attr_name)
                .map(|a| a.value.as_str()),
            _ => None,
        })
    }

    /// Set an attribute, adding it when missing.
    pub fn set_attr(&mut self, id: NodeId, attr_name: &str, value: impl Into<String>) {
        if let Some(node) = self.get_mut(id)
            && let NodeData::Element { attrs, .. } = &mut node.data
        {
            let value = value.into();
            if let Some(existing) = attrs.iter_mut().find(|a| a.name.local.as_ref() == attr_name)
            {
                existing.value = value;
            } else {
                attrs.push(Attribute {
                    name: QualName::new(None, ns!(), LocalName::from(attr_name)),
                    value,
                });
            }
        }
    }

    /// Replace the children of `id` with a single text node.
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        self.clear_children(id);
        let text_node = self.create_text(text.to_string());
        self.append(id, text_node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, NodeId, Vec<NodeId>) {
        let mut doc = Document::new();
        let body = doc.create_html_element("body", &[]);
        let root = doc.root();
        doc.append(root, body);
        let mut kids = Vec::new();
        for label in ["a", "b", "c"] {
            let p = doc.create_html_element("p", &[("class", label)]);
            doc.append(body, p);
            doc.append_text(p, label);
            kids.push(p);
        }
        (doc, body, kids)
    }

    #[test]
    fn test_append_children() {
        let (doc, body, kids) = sample();
        let children: Vec<_> = doc.children(body).collect();
        assert_eq!(children, kids);
        assert_eq!(doc.text(body), "abc");
    }

    #[test]
    fn test_detach_middle_and_ends() {
        let (mut doc, body, kids) = sample();
        doc.detach(kids[1]);
        assert_eq!(doc.children(body).collect::<Vec<_>>(), vec![kids[0], kids[2]]);
        doc.detach(kids[0]);
        doc.detach(kids[2]);
        assert_eq!(doc.children(body).count(), 0);
        assert_eq!(doc.text(body), "");
    }

    #[test]
    fn test_prepend_and_attrs() {
        let (mut doc, body, kids) = sample();
        let div = doc.create_html_element("div", &[]);
        doc.prepend(body, div);
        assert_eq!(doc.children(body).next(), Some(div));

        doc.set_attr(kids[0], "class", "z");
        doc.set_attr(kids[0], "id", "first");
        assert_eq!(doc.get_attr(kids[0], "class"), Some("z"));
        assert_eq!(doc.get_attr(kids[0], "id"), Some("first"));
    }

    #[test]
    fn test_text_merging() {
        let mut doc = Document::new();
        let p = doc.create_html_element("p", &[]);
        let root = doc.root();
        doc.append(root, p);
        doc.append_text(p, "Hello, ");
        doc.append_text(p, "World!");
        assert_eq!(doc.children(p).count(), 1);
        assert_eq!(doc.text(p), "Hello, World!");
    }

    #[test]
    fn test_import_subtree() {
        let (src, _, kids) = sample();
        let mut dst = Document::new();
        let copy = dst.import(&src, kids[2]);
        let root = dst.root();
        dst.append(root, copy);
        assert_eq!(dst.get_attr(copy, "class"), Some("c"));
        assert_eq!(dst.text(copy), "c");
    }
}
