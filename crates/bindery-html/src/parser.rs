//! HTML5 Parser implementation
//!
//! Uses html5ever's built-in RcDom and converts to our arena DOM.

use bindery_dom::{Document, DomTree, NodeId};
use html5ever::{LocalName, QualName, ns, parse_document, parse_fragment};
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

use crate::HtmlError;

/// How text nodes are carried over from the RcDom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Whitespace {
    /// Drop text nodes that are only whitespace (document bootstrap)
    Collapse,
    /// Keep every text node (fragments are inserted verbatim)
    Preserve,
}

/// HTML5 parser
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlParser;

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self
    }

    /// Parse HTML string into a Document
    pub fn parse(&self, html: &str) -> Result<Document, HtmlError> {
        let dom = read_dom(html)?;

        let mut document = Document::empty();
        let root = document.tree().root();
        convert_children(&dom.document, document.tree_mut(), root, Whitespace::Collapse);
        document.finalize();

        tracing::debug!(nodes = document.tree().len(), "parsed HTML document");
        Ok(document)
    }

    /// Parse markup as the children of `context` into detached nodes
    ///
    /// `context` decides how the tree builder treats the markup, as for
    /// `innerHTML`: `<tr>` survives under a `<tbody>` but not under a `<div>`.
    /// A context that is not an element parses as `<body>`. Returns the
    /// top-level nodes of the fragment in source order. Nothing is inserted
    /// and no mutation records are queued.
    pub fn parse_fragment(
        &self,
        document: &mut Document,
        context: NodeId,
        html: &str,
    ) -> Result<Vec<NodeId>, HtmlError> {
        let tag = document.tree().tag_name(context).unwrap_or("body");
        let context_name = QualName::new(None, ns!(html), LocalName::from(tag));
        let dom = parse_fragment(RcDom::default(), Default::default(), context_name, Vec::new(), false)
            .from_utf8()
            .read_from(&mut html.as_bytes())?;
        // Fragment output hangs off a synthetic <html> root
        let root = find_child(&dom.document, "html").ok_or(HtmlError::MissingFragmentRoot)?;

        let tree = document.tree_mut();
        let nodes: Vec<NodeId> = root
            .children
            .borrow()
            .iter()
            .filter_map(|child| convert_node(child, tree, Whitespace::Preserve))
            .collect();

        tracing::trace!(context = %context, top_level = nodes.len(), "parsed HTML fragment");
        Ok(nodes)
    }
}

fn read_dom(html: &str) -> Result<RcDom, HtmlError> {
    let dom = parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut html.as_bytes())?;
    Ok(dom)
}

fn find_child(handle: &Handle, tag: &str) -> Option<Handle> {
    handle
        .children
        .borrow()
        .iter()
        .find(|child| matches!(&child.data, RcNodeData::Element { name, .. } if &*name.local == tag))
        .cloned()
}

fn convert_children(handle: &Handle, tree: &mut DomTree, parent: NodeId, whitespace: Whitespace) {
    for child in handle.children.borrow().iter() {
        if let Some(id) = convert_node(child, tree, whitespace) {
            // Parents built here are always elements or the document node
            if let Err(err) = tree.append_child(parent, id) {
                tracing::warn!(%err, "dropping node during HTML conversion");
            }
        }
    }
}

/// Convert one RcDom node (and its subtree) into a detached arena node
fn convert_node(handle: &Handle, tree: &mut DomTree, whitespace: Whitespace) -> Option<NodeId> {
    match &handle.data {
        RcNodeData::Text { contents } => {
            let text = contents.borrow();
            if whitespace == Whitespace::Collapse && text.trim().is_empty() {
                return None;
            }
            Some(tree.create_text(&text))
        }
        RcNodeData::Comment { contents } => Some(tree.create_comment(contents)),
        RcNodeData::Element { name, attrs, .. } => {
            let id = tree.create_element(&name.local);
            if let Some(el) = tree.element_mut(id) {
                for attr in attrs.borrow().iter() {
                    el.set_attr(&attr.name.local, &attr.value);
                }
            }
            convert_children(handle, tree, id, whitespace);
            Some(id)
        }
        // Doctype and processing instructions have no arena counterpart
        RcNodeData::Document | RcNodeData::Doctype { .. } | RcNodeData::ProcessingInstruction { .. } => None,
    }
}
