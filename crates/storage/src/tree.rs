//! Arena-backed XML tree
//!
//! Every database holds exactly one [`Tree`]. Nodes live in a `Vec` arena and
//! are addressed by [`NodeId`]; removal marks nodes dead instead of
//! compacting, so ids held by other sessions' selections never alias a
//! different node.
//!
//! A dead slot keeps only its kind and parent. Its name, value and child
//! lists are freed on removal, so a slot costs one fixed-size `Node` and
//! cloning the arena for a staged write copies no heap data for it. The slot
//! count still grows with every node ever created in the database.
//!
//! # Size
//!
//! `size()` counts live nodes of every kind, including the document node and
//! attributes. It is the figure reported by `InfoDb`/`List` and is maintained
//! incrementally by every mutation.

use arbor_core::{validate_qname, Error, NodeId, NodeKind, Result};

/// A single node in the arena
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    kind: NodeKind,
    name: Option<String>,
    value: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attributes: Vec<NodeId>,
    live: bool,
}

impl Node {
    fn new(kind: NodeKind, name: Option<String>, value: Option<String>) -> Self {
        Self {
            kind,
            name,
            value,
            parent: None,
            children: Vec::new(),
            attributes: Vec::new(),
            live: true,
        }
    }

    /// Node kind
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Element, attribute or PI name
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Text, comment, attribute or PI content
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

/// XML document tree with stable node ids
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    size: usize,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Create a tree holding only a document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Document, None, None)],
            size: 1,
        }
    }

    /// Number of live nodes, document node and attributes included
    pub fn size(&self) -> usize {
        self.size
    }

    /// Get a live node
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index()).filter(|n| n.live)
    }

    /// Whether `id` names a live node
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Kind of a live node
    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.get(id).map(|n| n.kind)
    }

    /// Name of a live element, attribute or PI
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| n.name.as_deref())
    }

    /// Content of a live text, comment, attribute or PI
    pub fn value(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| n.value.as_deref())
    }

    /// Parent of a live node (`None` for the document node)
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Content children in document order
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Attributes of an element in insertion order
    pub fn attributes(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.attributes.as_slice()).unwrap_or(&[])
    }

    /// Lazy pre-order walk over the content descendants of `id`
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        Descendants { tree: self, stack }
    }

    /// XPath string value: concatenated descendant text for containers
    pub fn string_value(&self, id: NodeId) -> String {
        match self.kind(id) {
            Some(kind) if kind.is_container() => self
                .descendants(id)
                .filter(|d| self.kind(*d) == Some(NodeKind::Text))
                .filter_map(|d| self.value(d))
                .collect(),
            Some(_) => self.value(id).unwrap_or_default().to_string(),
            None => String::new(),
        }
    }

    /// Sort `nodes` into document order and drop duplicates and dead ids.
    ///
    /// Attributes order directly after their owner element.
    pub fn sort_document_order(&self, nodes: &mut Vec<NodeId>) {
        let mut rank = vec![usize::MAX; self.nodes.len()];
        let mut next = 0usize;
        let mut stack = vec![NodeId::ROOT];
        while let Some(id) = stack.pop() {
            rank[id.index()] = next;
            next += 1;
            for attr in self.attributes(id) {
                rank[attr.index()] = next;
                next += 1;
            }
            stack.extend(self.children(id).iter().rev());
        }
        nodes.retain(|id| rank.get(id.index()).is_some_and(|r| *r != usize::MAX));
        nodes.sort_by_key(|id| rank[id.index()]);
        nodes.dedup();
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        self.size += 1;
        id
    }

    fn container(&self, parent: NodeId) -> Result<&Node> {
        let node = self.get(parent).ok_or(Error::NodeNotFound(parent))?;
        if !node.kind.is_container() {
            return Err(Error::InvalidOperation(format!(
                "{} node {} cannot have children",
                node.kind, parent
            )));
        }
        Ok(node)
    }

    /// Resolve a 1-based insert position to a child index (`None` appends)
    fn child_index(&self, parent: NodeId, pos: Option<usize>) -> usize {
        let len = self.children(parent).len();
        match pos {
            Some(p) if p >= 1 => (p - 1).min(len),
            _ => len,
        }
    }

    fn attach(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.insert(index, child);
    }

    /// Insert a new empty element
    pub fn insert_element(&mut self, parent: NodeId, pos: Option<usize>, name: &str) -> Result<NodeId> {
        validate_qname(name)?;
        self.container(parent)?;
        let index = self.child_index(parent, pos);
        let id = self.alloc(Node::new(NodeKind::Element, Some(name.to_string()), None));
        self.attach(parent, index, id);
        Ok(id)
    }

    /// Insert text, merging into an adjacent text sibling when there is one.
    ///
    /// Returns the id of the text node that now holds the content.
    pub fn insert_text(&mut self, parent: NodeId, pos: Option<usize>, text: &str) -> Result<NodeId> {
        self.container(parent)?;
        let index = self.child_index(parent, pos);
        let siblings = self.children(parent);
        let before = index.checked_sub(1).map(|i| siblings[i]);
        let after = siblings.get(index).copied();

        if let Some(prev) = before.filter(|id| self.kind(*id) == Some(NodeKind::Text)) {
            self.nodes[prev.index()]
                .value
                .get_or_insert_with(String::new)
                .push_str(text);
            return Ok(prev);
        }
        if let Some(next) = after.filter(|id| self.kind(*id) == Some(NodeKind::Text)) {
            let slot = self.nodes[next.index()].value.get_or_insert_with(String::new);
            slot.insert_str(0, text);
            return Ok(next);
        }

        let id = self.alloc(Node::new(NodeKind::Text, None, Some(text.to_string())));
        self.attach(parent, index, id);
        Ok(id)
    }

    /// Insert a comment
    pub fn insert_comment(&mut self, parent: NodeId, pos: Option<usize>, text: &str) -> Result<NodeId> {
        if text.contains("--") {
            return Err(Error::InvalidOperation(
                "comment must not contain '--'".to_string(),
            ));
        }
        self.container(parent)?;
        let index = self.child_index(parent, pos);
        let id = self.alloc(Node::new(NodeKind::Comment, None, Some(text.to_string())));
        self.attach(parent, index, id);
        Ok(id)
    }

    /// Insert a processing instruction
    pub fn insert_pi(
        &mut self,
        parent: NodeId,
        pos: Option<usize>,
        target: &str,
        content: &str,
    ) -> Result<NodeId> {
        validate_qname(target)?;
        if target.eq_ignore_ascii_case("xml") {
            return Err(Error::InvalidOperation(
                "processing instruction target 'xml' is reserved".to_string(),
            ));
        }
        self.container(parent)?;
        let index = self.child_index(parent, pos);
        let id = self.alloc(Node::new(
            NodeKind::ProcessingInstruction,
            Some(target.to_string()),
            Some(content.to_string()),
        ));
        self.attach(parent, index, id);
        Ok(id)
    }

    /// Add an attribute to an element; duplicate names are rejected
    pub fn insert_attribute(&mut self, element: NodeId, name: &str, value: &str) -> Result<NodeId> {
        validate_qname(name)?;
        match self.kind(element) {
            Some(NodeKind::Element) => {}
            Some(kind) => {
                return Err(Error::InvalidOperation(format!(
                    "attributes can only be added to elements, not {} nodes",
                    kind
                )))
            }
            None => return Err(Error::NodeNotFound(element)),
        }
        if self
            .attributes(element)
            .iter()
            .any(|a| self.name(*a) == Some(name))
        {
            return Err(Error::InvalidOperation(format!(
                "duplicate attribute '{}'",
                name
            )));
        }
        let id = self.alloc(Node::new(
            NodeKind::Attribute,
            Some(name.to_string()),
            Some(value.to_string()),
        ));
        self.nodes[id.index()].parent = Some(element);
        self.nodes[element.index()].attributes.push(id);
        Ok(id)
    }

    /// Copy every child (and top-level attribute) of `fragment`'s document
    /// node into `parent`. Returns the number of nodes added.
    pub fn graft(&mut self, parent: NodeId, pos: Option<usize>, fragment: &Tree) -> Result<usize> {
        self.container(parent)?;
        let before = self.size;

        for attr in fragment.attributes(NodeId::ROOT) {
            let name = fragment.name(*attr).unwrap_or_default();
            let value = fragment.value(*attr).unwrap_or_default();
            self.insert_attribute(parent, name, value)?;
        }

        let mut index = self.child_index(parent, pos);
        for child in fragment.children(NodeId::ROOT) {
            let copy = self.copy_node(fragment, *child);
            self.attach(parent, index, copy);
            index += 1;
        }
        Ok(self.size - before)
    }

    fn copy_node(&mut self, src: &Tree, id: NodeId) -> NodeId {
        let node = &src.nodes[id.index()];
        let copy = self.alloc(Node::new(node.kind, node.name.clone(), node.value.clone()));
        for attr in &node.attributes {
            let a = self.copy_node(src, *attr);
            self.nodes[a.index()].parent = Some(copy);
            self.nodes[copy.index()].attributes.push(a);
        }
        for child in &node.children {
            let c = self.copy_node(src, *child);
            let end = self.nodes[copy.index()].children.len();
            self.attach(copy, end, c);
        }
        copy
    }

    /// Deep-copy one node into a standalone fragment tree.
    ///
    /// Document nodes contribute their children; attributes land on the
    /// fragment's document node so that [`Tree::graft`] re-attaches them.
    pub fn extract(&self, id: NodeId) -> Result<Tree> {
        let kind = self.kind(id).ok_or(Error::NodeNotFound(id))?;
        let mut fragment = Tree::new();
        match kind {
            NodeKind::Document => {
                for child in self.children(id) {
                    let c = fragment.copy_node(self, *child);
                    let end = fragment.children(NodeId::ROOT).len();
                    fragment.attach(NodeId::ROOT, end, c);
                }
            }
            NodeKind::Attribute => {
                let a = fragment.copy_node(self, id);
                fragment.nodes[a.index()].parent = Some(NodeId::ROOT);
                fragment.nodes[0].attributes.push(a);
            }
            _ => {
                let c = fragment.copy_node(self, id);
                fragment.attach(NodeId::ROOT, 0, c);
            }
        }
        Ok(fragment)
    }

    /// Rename an element, attribute or processing instruction
    pub fn rename(&mut self, id: NodeId, name: &str) -> Result<()> {
        validate_qname(name)?;
        let kind = self.kind(id).ok_or(Error::NodeNotFound(id))?;
        match kind {
            NodeKind::Element | NodeKind::ProcessingInstruction => {}
            NodeKind::Attribute => {
                let owner = self.parent(id);
                let clash = owner
                    .map(|o| {
                        self.attributes(o)
                            .iter()
                            .any(|a| *a != id && self.name(*a) == Some(name))
                    })
                    .unwrap_or(false);
                if clash {
                    return Err(Error::InvalidOperation(format!(
                        "duplicate attribute '{}'",
                        name
                    )));
                }
            }
            other => {
                return Err(Error::InvalidOperation(format!(
                    "{} nodes have no name",
                    other
                )))
            }
        }
        self.nodes[id.index()].name = Some(name.to_string());
        Ok(())
    }

    /// Replace the content of a text, comment, attribute or PI
    pub fn set_value(&mut self, id: NodeId, value: &str) -> Result<()> {
        let kind = self.kind(id).ok_or(Error::NodeNotFound(id))?;
        if kind.is_container() {
            return Err(Error::InvalidOperation(format!(
                "{} nodes have no direct value",
                kind
            )));
        }
        if kind == NodeKind::Comment && value.contains("--") {
            return Err(Error::InvalidOperation(
                "comment must not contain '--'".to_string(),
            ));
        }
        self.nodes[id.index()].value = Some(value.to_string());
        Ok(())
    }

    /// Detach a node and its subtree. Returns the number of nodes removed.
    pub fn remove(&mut self, id: NodeId) -> Result<usize> {
        let kind = self.kind(id).ok_or(Error::NodeNotFound(id))?;
        if kind == NodeKind::Document {
            return Err(Error::InvalidOperation(
                "the document node cannot be deleted".to_string(),
            ));
        }

        if let Some(parent) = self.parent(id) {
            let owner = &mut self.nodes[parent.index()];
            if kind == NodeKind::Attribute {
                owner.attributes.retain(|a| *a != id);
            } else {
                owner.children.retain(|c| *c != id);
            }
        }

        let mut removed = 0;
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            let node = &mut self.nodes[next.index()];
            if !node.live {
                continue;
            }
            node.live = false;
            removed += 1;
            node.name = None;
            node.value = None;
            stack.append(&mut node.children);
            stack.append(&mut node.attributes);
            node.children.shrink_to_fit();
            node.attributes.shrink_to_fit();
        }
        self.size -= removed;
        Ok(removed)
    }
}

/// Pre-order iterator returned by [`Tree::descendants`]
pub struct Descendants<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}
