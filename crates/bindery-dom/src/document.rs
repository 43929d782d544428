//! Document - High-level document API
//!
//! Owns the tree together with listeners and mutation observers. Structural
//! changes made through `Document` queue child-list records; changes made
//! directly on the tree do not.

use std::cell::RefCell;
use std::rc::Rc;

use crate::mutation::MutationLog;
use crate::{
    DOMStringMap, DOMTokenList, DomResult, DomTree, FormData, Listener, ListenerRegistry,
    MutationObserverInit, MutationRecord, NodeId, ObserverId, Selector, SelectorError,
};

/// Document shared between the page, its listeners and in-flight tasks
pub type SharedDocument = Rc<RefCell<Document>>;

/// HTML Document
#[derive(Debug)]
pub struct Document {
    tree: DomTree,
    /// Cached reference to <html> element
    html_element: NodeId,
    /// Cached reference to <head> element
    head_element: NodeId,
    /// Cached reference to <body> element
    body_element: NodeId,
    listeners: ListenerRegistry,
    mutations: MutationLog,
}

impl Document {
    /// Create a new document with `<html>`, `<head>` and `<body>`
    pub fn new() -> Self {
        let mut doc = Self::empty();
        doc.finalize();
        doc
    }

    /// Create an empty document (no structure)
    ///
    /// Element handles point at the document node until `finalize` runs.
    pub fn empty() -> Self {
        Self {
            tree: DomTree::new(),
            html_element: NodeId::ROOT,
            head_element: NodeId::ROOT,
            body_element: NodeId::ROOT,
            listeners: ListenerRegistry::new(),
            mutations: MutationLog::default(),
        }
    }

    /// Resolve the `<html>/<head>/<body>` handles, creating missing elements
    pub fn finalize(&mut self) {
        let root = self.tree.root();
        let html = self.find_or_create(root, "html");
        self.head_element = self.find_or_create(html, "head");
        self.body_element = self.find_or_create(html, "body");
        self.html_element = html;
    }

    fn find_or_create(&mut self, parent: NodeId, tag: &str) -> NodeId {
        if let Some(&found) = self
            .tree
            .children(parent)
            .iter()
            .find(|&&c| self.tree.tag_name(c) == Some(tag))
        {
            return found;
        }
        let id = self.tree.create_element(tag);
        // parent is a container created above, so this cannot fail
        let _ = self.tree.append_child(parent, id);
        id
    }

    /// Get <html> element
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    /// Get <head> element
    pub fn head(&self) -> NodeId {
        self.head_element
    }

    /// Get <body> element
    pub fn body(&self) -> NodeId {
        self.body_element
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Mutable tree access; bypasses mutation records
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    // ---- Node creation ----

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.tree.create_element(tag)
    }

    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.tree.create_text(content)
    }

    // ---- Observed structural mutations ----

    /// Append `child` as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        let index = self.tree.children(parent).len();
        self.insert_child(parent, index, child)
    }

    /// Insert `child` as the first child of `parent`
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.insert_child(parent, 0, child)
    }

    /// Insert `child` at `index` among the children of `parent`
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> DomResult<()> {
        let old_parent = self.tree.parent(child);
        self.tree.insert_child(parent, index, child)?;
        if let Some(old) = old_parent {
            self.queue(MutationRecord {
                target: old,
                added_nodes: Vec::new(),
                removed_nodes: vec![child],
            });
        }
        self.queue(MutationRecord {
            target: parent,
            added_nodes: vec![child],
            removed_nodes: Vec::new(),
        });
        Ok(())
    }

    /// Insert `child` immediately before `reference`
    pub fn insert_before(&mut self, reference: NodeId, child: NodeId) -> DomResult<()> {
        let parent = self
            .tree
            .parent(reference)
            .ok_or(crate::DomError::NoParent(reference))?;
        let index = self.position_in_parent(parent, reference)?;
        self.insert_child(parent, index, child)
    }

    /// Insert `child` immediately after `reference`
    pub fn insert_after(&mut self, reference: NodeId, child: NodeId) -> DomResult<()> {
        let parent = self
            .tree
            .parent(reference)
            .ok_or(crate::DomError::NoParent(reference))?;
        let index = self.position_in_parent(parent, reference)?;
        self.insert_child(parent, index + 1, child)
    }

    fn position_in_parent(&self, parent: NodeId, node: NodeId) -> DomResult<usize> {
        self.tree
            .children(parent)
            .iter()
            .position(|&c| c == node)
            .ok_or(crate::DomError::NotFound(node))
    }

    /// Detach `node` from its parent
    pub fn remove_child(&mut self, node: NodeId) -> DomResult<()> {
        let Some(parent) = self.tree.parent(node) else {
            return Ok(());
        };
        self.tree.detach(node)?;
        self.queue(MutationRecord {
            target: parent,
            added_nodes: Vec::new(),
            removed_nodes: vec![node],
        });
        Ok(())
    }

    /// Replace all children of `parent` with `nodes`, as one record
    pub fn replace_children(&mut self, parent: NodeId, nodes: &[NodeId]) -> DomResult<()> {
        // Validate every insertion before touching the tree
        for &node in nodes {
            if self.tree.contains(node, parent) {
                return Err(crate::DomError::HierarchyRequest { parent, child: node });
            }
        }
        let removed = self.tree.remove_children(parent)?;
        for &node in nodes {
            self.tree.append_child(parent, node)?;
        }
        self.queue(MutationRecord {
            target: parent,
            added_nodes: nodes.to_vec(),
            removed_nodes: removed,
        });
        Ok(())
    }

    /// Replace all children of `node` with a single text node
    pub fn set_text_content(&mut self, node: NodeId, text: &str) -> DomResult<()> {
        if text.is_empty() {
            return self.replace_children(node, &[]);
        }
        let text_node = self.tree.create_text(text);
        self.replace_children(node, &[text_node])
    }

    fn queue(&mut self, record: MutationRecord) {
        self.mutations.queue(&self.tree, record);
    }

    // ---- Attributes ----

    pub fn get_attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.tree.element(node)?.get_attr(name)
    }

    pub fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.tree.element(node).is_some_and(|el| el.has_attr(name))
    }

    /// Set an attribute; returns false when `node` is not an element
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> bool {
        match self.tree.element_mut(node) {
            Some(el) => {
                el.set_attr(name, value);
                true
            }
            None => false,
        }
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> Option<String> {
        self.tree.element_mut(node)?.remove_attr(name)
    }

    /// `data-*` attributes of an element
    pub fn dataset(&self, node: NodeId) -> DOMStringMap {
        self.tree
            .element(node)
            .map(|el| DOMStringMap::from_attributes(&el.attrs))
            .unwrap_or_default()
    }

    // ---- Class list ----

    pub fn class_list(&self, node: NodeId) -> DOMTokenList {
        DOMTokenList::from_string(self.get_attribute(node, "class").unwrap_or(""))
    }

    pub fn set_class_list(&mut self, node: NodeId, list: &DOMTokenList) -> bool {
        self.set_attribute(node, "class", &list.value())
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.class_list(node).contains(class)
    }

    pub fn add_classes<'a>(&mut self, node: NodeId, classes: impl IntoIterator<Item = &'a str>) {
        let mut list = self.class_list(node);
        list.add(classes);
        self.set_class_list(node, &list);
    }

    pub fn remove_classes<'a>(&mut self, node: NodeId, classes: impl IntoIterator<Item = &'a str>) {
        if !self.has_attribute(node, "class") {
            return;
        }
        let mut list = self.class_list(node);
        list.remove(classes);
        self.set_class_list(node, &list);
    }

    // ---- Queries ----

    /// Get connected element by ID
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree
            .descendants(self.tree.root())
            .into_iter()
            .find(|&n| self.tree.element(n).and_then(|el| el.id()) == Some(id))
    }

    /// First descendant of `scope` matching `selector`, in document order
    pub fn query_selector(&self, scope: NodeId, selector: &str) -> Result<Option<NodeId>, SelectorError> {
        let selector = Selector::parse(selector)?;
        Ok(self.select_first(scope, &selector))
    }

    /// All descendants of `scope` matching `selector`, in document order
    pub fn query_selector_all(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>, SelectorError> {
        let selector = Selector::parse(selector)?;
        Ok(self.select_all(scope, &selector))
    }

    pub fn select_first(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.tree
            .descendants(scope)
            .into_iter()
            .find(|&n| selector.matches(&self.tree, n))
    }

    pub fn select_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.tree
            .descendants(scope)
            .into_iter()
            .filter(|&n| selector.matches(&self.tree, n))
            .collect()
    }

    /// Check `node` itself against `selector`
    pub fn matches(&self, node: NodeId, selector: &str) -> Result<bool, SelectorError> {
        Ok(Selector::parse(selector)?.matches(&self.tree, node))
    }

    // ---- Events ----

    /// Add a listener; the same `Rc` registered twice is kept once
    pub fn add_event_listener(&mut self, node: NodeId, event_type: &str, listener: Listener) -> bool {
        self.listeners.add(node, event_type, listener)
    }

    pub fn remove_event_listener(&mut self, node: NodeId, event_type: &str, listener: &Listener) -> bool {
        self.listeners.remove(node, event_type, listener)
    }

    pub fn event_listeners(&self, node: NodeId, event_type: &str) -> Vec<Listener> {
        self.listeners.get(node, event_type)
    }

    pub fn listener_count(&self, node: NodeId, event_type: &str) -> usize {
        self.listeners.count(node, event_type)
    }

    /// Drop every listener registered on `node`, of any event type
    pub fn clear_event_listeners(&mut self, node: NodeId) -> usize {
        self.listeners.clear_node(node)
    }

    // ---- Mutation observers ----

    pub fn observe(&mut self, target: NodeId, options: MutationObserverInit) -> ObserverId {
        self.mutations.observe(target, options)
    }

    /// Stop an observer; returns false when it was already disconnected
    pub fn disconnect(&mut self, observer: ObserverId) -> bool {
        self.mutations.disconnect(observer)
    }

    pub fn is_observing(&self, observer: ObserverId) -> bool {
        self.mutations.is_observing(observer)
    }

    /// Drain the records queued for `observer`
    pub fn take_records(&mut self, observer: ObserverId) -> Vec<MutationRecord> {
        self.mutations.take_records(observer)
    }

    pub fn has_pending_records(&self) -> bool {
        self.mutations.has_pending()
    }

    // ---- Content ----

    pub fn inner_html(&self, node: NodeId) -> String {
        self.tree.inner_html(node)
    }

    pub fn outer_html(&self, node: NodeId) -> String {
        self.tree.outer_html(node)
    }

    pub fn text_content(&self, node: NodeId) -> String {
        self.tree.text_content(node)
    }

    /// Form data set of a form element
    pub fn form_data(&self, form: NodeId) -> FormData {
        FormData::from_form(&self.tree, form)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observed() -> (Document, ObserverId) {
        let mut doc = Document::new();
        let body = doc.body();
        let id = doc.observe(body, MutationObserverInit { child_list: true, subtree: true });
        (doc, id)
    }

    #[test]
    fn test_structure() {
        let doc = Document::new();
        assert_eq!(doc.tree().tag_name(doc.document_element()), Some("html"));
        assert_eq!(doc.tree().tag_name(doc.head()), Some("head"));
        assert_eq!(doc.tree().tag_name(doc.body()), Some("body"));
        assert_eq!(doc.tree().parent(doc.body()), Some(doc.document_element()));
    }

    #[test]
    fn test_append_and_prepend_queue_records() {
        let (mut doc, observer) = observed();
        let body = doc.body();
        let a = doc.create_element("p");
        let b = doc.create_element("p");
        doc.append_child(body, a).unwrap();
        doc.prepend_child(body, b).unwrap();

        assert_eq!(doc.tree().children(body), &[b, a]);
        let records = doc.take_records(observer);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].added_nodes, vec![a]);
        assert_eq!(records[1].added_nodes, vec![b]);
        assert!(!doc.has_pending_records());
    }

    #[test]
    fn test_move_records_removal_and_addition() {
        let (mut doc, observer) = observed();
        let body = doc.body();
        let first = doc.create_element("ul");
        let second = doc.create_element("ul");
        let item = doc.create_element("li");
        doc.append_child(body, first).unwrap();
        doc.append_child(body, second).unwrap();
        doc.append_child(first, item).unwrap();
        doc.take_records(observer);

        doc.append_child(second, item).unwrap();
        let records = doc.take_records(observer);
        assert_eq!(records[0].target, first);
        assert_eq!(records[0].removed_nodes, vec![item]);
        assert_eq!(records[1].target, second);
        assert_eq!(records[1].added_nodes, vec![item]);
    }

    #[test]
    fn test_replace_children_single_record() {
        let (mut doc, observer) = observed();
        let body = doc.body();
        let list = doc.create_element("ul");
        let old = doc.create_element("li");
        doc.append_child(body, list).unwrap();
        doc.append_child(list, old).unwrap();
        doc.take_records(observer);

        let new = doc.create_element("li");
        doc.replace_children(list, &[new]).unwrap();
        let records = doc.take_records(observer);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].removed_nodes, vec![old]);
        assert_eq!(records[0].added_nodes, vec![new]);
        assert!(!doc.tree().is_connected(old));
    }

    #[test]
    fn test_replace_children_rejects_ancestor() {
        let mut doc = Document::new();
        let body = doc.body();
        let div = doc.create_element("div");
        doc.append_child(body, div).unwrap();
        let html = doc.document_element();
        assert!(doc.replace_children(div, &[html]).is_err());
        assert!(doc.tree().is_connected(div));
    }

    #[test]
    fn test_detached_mutations_not_observed() {
        let (mut doc, observer) = observed();
        let detached = doc.create_element("div");
        let child = doc.create_element("span");
        doc.append_child(detached, child).unwrap();
        assert!(doc.take_records(observer).is_empty());
    }

    #[test]
    fn test_classes() {
        let mut doc = Document::new();
        let panel = doc.create_element("div");
        doc.set_attribute(panel, "class", "p-4 hidden");
        doc.remove_classes(panel, ["hidden", "bg-red-100"]);
        doc.add_classes(panel, ["bg-green-100"]);
        assert_eq!(doc.get_attribute(panel, "class"), Some("p-4 bg-green-100"));
        assert!(doc.has_class(panel, "bg-green-100"));
        assert!(!doc.has_class(panel, "hidden"));
    }

    #[test]
    fn test_queries() {
        let mut doc = Document::new();
        let body = doc.body();
        let list = doc.tree_mut().create_element_with_attrs("ul", &[("id", "tasks")]);
        let item = doc.tree_mut().create_element_with_attrs("li", &[("class", "task done")]);
        doc.append_child(body, list).unwrap();
        doc.append_child(list, item).unwrap();

        assert_eq!(doc.get_element_by_id("tasks"), Some(list));
        assert_eq!(doc.query_selector(body, "#tasks > .done").unwrap(), Some(item));
        assert_eq!(doc.query_selector(list, "ul").unwrap(), None);
        assert_eq!(doc.query_selector_all(doc.tree().root(), "li, ul").unwrap(), vec![list, item]);
        assert!(doc.matches(item, "li.task").unwrap());
        assert!(doc.query_selector(body, "#").is_err());
    }

    #[test]
    fn test_set_text_content() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        doc.set_text_content(p, "Saved").unwrap();
        assert_eq!(doc.text_content(p), "Saved");
        doc.set_text_content(p, "").unwrap();
        assert!(doc.tree().children(p).is_empty());
    }
}
