//! DOM Tree (arena-based allocation)
//!
//! Core node manipulation: append, insert, detach, remove children.
//! These operations do not queue mutation records; `Document` wraps the
//! ones observers must see.

use crate::{Node, NodeData, ElementData, NodeId};

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// Node not found
    #[error("node {0} not found")]
    NotFound(NodeId),
    /// Inserting a node into itself or one of its descendants
    #[error("hierarchy request error: {child} cannot be inserted into {parent}")]
    HierarchyRequest { parent: NodeId, child: NodeId },
    /// Parent cannot hold children (text, comment)
    #[error("node {0} cannot have children")]
    InvalidNodeType(NodeId),
    /// Node has no parent
    #[error("node {0} has no parent")]
    NoParent(NodeId),
}

/// Arena-based DOM tree
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
        }
    }

    /// Document node
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Number of nodes in the arena (attached or not)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(Node::element(tag))
    }

    /// Create a detached element with attributes
    pub fn create_element_with_attrs(&mut self, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let mut data = ElementData::new(tag);
        for (name, value) in attrs {
            data.set_attr(name, value);
        }
        self.push(Node {
            parent: None,
            children: Vec::new(),
            data: NodeData::Element(data),
        })
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.push(Node::text(content))
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, content: &str) -> NodeId {
        self.push(Node::comment(content))
    }

    /// Element data for `id`, if it is an element
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(Node::as_element)
    }

    /// Mutable element data for `id`, if it is an element
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(Node::as_element_mut)
    }

    /// Whether `id` is an element node
    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::is_element)
    }

    /// Lowercase tag name of an element
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.tag.as_str())
    }

    /// Parent of a node
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Children of a node in document order
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Ancestors from the parent up to the root
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// Whether `ancestor` is `node` or one of its ancestors
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        node == ancestor || self.ancestors(node).any(|a| a == ancestor)
    }

    /// Whether the node is attached to the document
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.get(id).is_some() && self.contains(NodeId::ROOT, id)
    }

    /// `id` followed by all its descendants, in document order
    pub fn inclusive_descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if self.get(id).is_none() {
            return out;
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// All descendants of `id` (excluding itself), in document order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut all = self.inclusive_descendants(id);
        if !all.is_empty() {
            all.remove(0);
        }
        all
    }

    fn check_insert(&self, parent: NodeId, child: NodeId) -> DomResult<()> {
        let parent_node = self.get(parent).ok_or(DomError::NotFound(parent))?;
        if self.get(child).is_none() {
            return Err(DomError::NotFound(child));
        }
        if !parent_node.is_container() {
            return Err(DomError::InvalidNodeType(parent));
        }
        if child == NodeId::ROOT || self.contains(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        Ok(())
    }

    /// Remove a node from its parent; no-op when already detached
    pub fn detach(&mut self, id: NodeId) -> DomResult<()> {
        let parent = self.get(id).ok_or(DomError::NotFound(id))?.parent;
        if let Some(parent) = parent {
            if let Some(p) = self.get_mut(parent) {
                p.children.retain(|&c| c != id);
            }
            if let Some(n) = self.get_mut(id) {
                n.parent = None;
            }
        }
        Ok(())
    }

    /// Append a child node (moving it if already attached)
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        let index = self.children(parent).len();
        self.insert_child(parent, index, child)
    }

    /// Insert a child at `index` among the parent's children
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> DomResult<()> {
        self.check_insert(parent, child)?;
        // Index is measured before the move; adjust when moving within the same parent
        let mut index = index;
        if let Some(pos) = self.children(parent).iter().position(|&c| c == child) {
            if pos < index {
                index -= 1;
            }
        }
        self.detach(child)?;
        let node = self.get_mut(parent).ok_or(DomError::NotFound(parent))?;
        let index = index.min(node.children.len());
        node.children.insert(index, child);
        if let Some(c) = self.get_mut(child) {
            c.parent = Some(parent);
        }
        Ok(())
    }

    /// Insert `child` immediately before `reference` under the same parent
    pub fn insert_before(&mut self, reference: NodeId, child: NodeId) -> DomResult<()> {
        let parent = self.parent(reference).ok_or(DomError::NoParent(reference))?;
        let index = self
            .children(parent)
            .iter()
            .position(|&c| c == reference)
            .ok_or(DomError::NotFound(reference))?;
        self.insert_child(parent, index, child)
    }

    /// Insert `child` immediately after `reference` under the same parent
    pub fn insert_after(&mut self, reference: NodeId, child: NodeId) -> DomResult<()> {
        let parent = self.parent(reference).ok_or(DomError::NoParent(reference))?;
        let index = self
            .children(parent)
            .iter()
            .position(|&c| c == reference)
            .ok_or(DomError::NotFound(reference))?;
        self.insert_child(parent, index + 1, child)
    }

    /// Detach every child of `id`, returning them
    pub fn remove_children(&mut self, id: NodeId) -> DomResult<Vec<NodeId>> {
        let node = self.get_mut(id).ok_or(DomError::NotFound(id))?;
        let removed = std::mem::take(&mut node.children);
        for &child in &removed {
            if let Some(c) = self.get_mut(child) {
                c.parent = None;
            }
        }
        Ok(removed)
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node in self.inclusive_descendants(id) {
            if let Some(text) = self.get(node).and_then(Node::as_text) {
                out.push_str(text);
            }
        }
        out
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over a node's ancestors
pub struct Ancestors<'a> {
    tree: &'a DomTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (DomTree, NodeId, NodeId, NodeId) {
        let mut tree = DomTree::new();
        let body = tree.create_element("body");
        let a = tree.create_element("div");
        let b = tree.create_element("div");
        tree.append_child(tree.root(), body).unwrap();
        tree.append_child(body, a).unwrap();
        tree.append_child(body, b).unwrap();
        (tree, body, a, b)
    }

    #[test]
    fn test_append_and_order() {
        let (mut tree, body, a, b) = sample();
        let c = tree.create_text("x");
        tree.insert_child(body, 0, c).unwrap();

        assert_eq!(tree.children(body), &[c, a, b]);
        assert_eq!(tree.parent(a), Some(body));
        assert!(tree.is_connected(b));
    }

    #[test]
    fn test_move_within_parent() {
        let (mut tree, body, a, b) = sample();
        tree.append_child(body, a).unwrap();
        assert_eq!(tree.children(body), &[b, a]);

        tree.insert_child(body, 0, a).unwrap();
        assert_eq!(tree.children(body), &[a, b]);
    }

    #[test]
    fn test_hierarchy_errors() {
        let (mut tree, body, a, _) = sample();
        assert_eq!(
            tree.append_child(a, body),
            Err(DomError::HierarchyRequest { parent: a, child: body })
        );
        let text = tree.create_text("t");
        assert_eq!(tree.append_child(text, a), Err(DomError::InvalidNodeType(text)));
        assert_eq!(tree.append_child(body, NodeId(999)), Err(DomError::NotFound(NodeId(999))));
    }

    #[test]
    fn test_remove_children_detaches() {
        let (mut tree, body, a, b) = sample();
        let removed = tree.remove_children(body).unwrap();
        assert_eq!(removed, vec![a, b]);
        assert!(!tree.is_connected(a));
        assert_eq!(tree.parent(b), None);
        // Detached nodes keep their slot
        assert!(tree.get(a).is_some());
    }

    #[test]
    fn test_descendants_document_order() {
        let (mut tree, body, a, b) = sample();
        let inner = tree.create_element("span");
        tree.append_child(a, inner).unwrap();

        assert_eq!(tree.inclusive_descendants(body), vec![body, a, inner, b]);
        assert_eq!(tree.descendants(a), vec![inner]);
    }

    #[test]
    fn test_insert_before_after() {
        let (mut tree, body, a, b) = sample();
        let x = tree.create_element("p");
        let y = tree.create_element("p");
        tree.insert_before(a, x).unwrap();
        tree.insert_after(b, y).unwrap();
        assert_eq!(tree.children(body), &[x, a, b, y]);

        let detached = tree.create_element("p");
        assert_eq!(tree.insert_before(detached, x), Err(DomError::NoParent(detached)));
    }

    #[test]
    fn test_text_content() {
        let (mut tree, _, a, _) = sample();
        let t1 = tree.create_text("Hello ");
        let span = tree.create_element("span");
        let t2 = tree.create_text("World");
        tree.append_child(a, t1).unwrap();
        tree.append_child(a, span).unwrap();
        tree.append_child(span, t2).unwrap();

        assert_eq!(tree.text_content(a), "Hello World");
    }
}
