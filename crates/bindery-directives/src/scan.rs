//! Directive scanning
//!
//! Finds elements declaring a directive under a root and binds each
//! (element, directive) pair exactly once.

use std::cell::{Ref, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use bindery_dom::{NodeId, SharedDocument};

use crate::registry::DirectiveRegistry;

/// (element, directive) pairs already bound
///
/// Node ids are never reused, so a pair identifies one element lifetime.
/// Pairs of elements that leave the document are forgotten, so a later
/// re-insertion binds again.
#[derive(Debug, Default)]
pub struct BindingLedger {
    bound: HashMap<NodeId, HashSet<String>>,
}

impl BindingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a binding; false when the pair was already bound
    pub fn insert(&mut self, element: NodeId, directive: &str) -> bool {
        self.bound.entry(element).or_default().insert(directive.to_string())
    }

    pub fn contains(&self, element: NodeId, directive: &str) -> bool {
        self.bound.get(&element).is_some_and(|names| names.contains(directive))
    }

    /// Forget every binding of `element`; returns how many were forgotten
    pub fn forget(&mut self, element: NodeId) -> usize {
        self.bound.remove(&element).map_or(0, |names| names.len())
    }

    pub fn len(&self) -> usize {
        self.bound.values().map(HashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }
}

/// Registry plus ledger
#[derive(Debug)]
pub struct Scanner {
    registry: Rc<DirectiveRegistry>,
    ledger: RefCell<BindingLedger>,
}

impl Scanner {
    pub fn new(registry: Rc<DirectiveRegistry>) -> Self {
        Self {
            registry,
            ledger: RefCell::new(BindingLedger::new()),
        }
    }

    pub fn registry(&self) -> &DirectiveRegistry {
        &self.registry
    }

    pub fn ledger(&self) -> Ref<'_, BindingLedger> {
        self.ledger.borrow()
    }

    /// Bind every directive on `root` and its descendants, in document order
    ///
    /// Returns the number of new bindings.
    pub fn scan(&self, document: &SharedDocument, root: NodeId) -> usize {
        let mut bound = 0;
        for (name, directive) in self.registry.iter() {
            let candidates: Vec<NodeId> = match document.try_borrow() {
                Ok(doc) => doc
                    .tree()
                    .inclusive_descendants(root)
                    .into_iter()
                    .filter(|&n| doc.tree().is_element(n) && directive.matches(&doc, n))
                    .collect(),
                Err(_) => {
                    tracing::error!(%root, "scan while document is mutably borrowed");
                    return bound;
                }
            };

            for element in candidates {
                if !self.ledger.borrow_mut().insert(element, name) {
                    tracing::trace!(%element, directive = name, "already bound");
                    continue;
                }
                tracing::debug!(%element, directive = name, "binding directive");
                directive.bind(document, element);
                bound += 1;
            }
        }
        bound
    }

    /// Forget the bindings of `element` so a later scan binds it again
    pub fn forget(&self, element: NodeId) -> usize {
        self.ledger.borrow_mut().forget(element)
    }

    /// Scan each root in order
    pub fn scan_all(&self, document: &SharedDocument, roots: &[NodeId]) -> usize {
        roots.iter().map(|&root| self.scan(document, root)).sum()
    }
}
