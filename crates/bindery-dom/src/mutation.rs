//! Mutation Observer
//!
//! Child-list mutation records queued per observer and taken in batches.

use std::collections::HashMap;

use crate::{DomTree, NodeId};

/// Mutation observer handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Mutation observer options
#[derive(Debug, Clone, Copy, Default)]
pub struct MutationObserverInit {
    pub child_list: bool,
    pub subtree: bool,
}

/// Child-list mutation record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub target: NodeId,
    pub added_nodes: Vec<NodeId>,
    pub removed_nodes: Vec<NodeId>,
}

#[derive(Debug)]
struct Registration {
    id: ObserverId,
    target: NodeId,
    options: MutationObserverInit,
}

/// Observer registrations and their pending records
#[derive(Debug, Default)]
pub(crate) struct MutationLog {
    next_id: u64,
    registrations: Vec<Registration>,
    pending: HashMap<ObserverId, Vec<MutationRecord>>,
}

impl MutationLog {
    pub(crate) fn observe(&mut self, target: NodeId, options: MutationObserverInit) -> ObserverId {
        self.next_id += 1;
        let id = ObserverId(self.next_id);
        self.registrations.push(Registration { id, target, options });
        id
    }

    /// Stop observing; returns false when already disconnected
    pub(crate) fn disconnect(&mut self, id: ObserverId) -> bool {
        self.pending.remove(&id);
        let before = self.registrations.len();
        self.registrations.retain(|r| r.id != id);
        self.registrations.len() != before
    }

    pub(crate) fn is_observing(&self, id: ObserverId) -> bool {
        self.registrations.iter().any(|r| r.id == id)
    }

    /// Queue a record for every observer interested in `record.target`
    pub(crate) fn queue(&mut self, tree: &DomTree, record: MutationRecord) {
        if record.added_nodes.is_empty() && record.removed_nodes.is_empty() {
            return;
        }
        for reg in &self.registrations {
            if !reg.options.child_list {
                continue;
            }
            let interested = reg.target == record.target
                || (reg.options.subtree && tree.contains(reg.target, record.target));
            if interested {
                self.pending.entry(reg.id).or_default().push(record.clone());
            }
        }
    }

    pub(crate) fn take_records(&mut self, id: ObserverId) -> Vec<MutationRecord> {
        self.pending.remove(&id).unwrap_or_default()
    }

    pub(crate) fn has_pending(&self) -> bool {
        self.pending.values().any(|records| !records.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(target: NodeId, added: &[NodeId]) -> MutationRecord {
        MutationRecord {
            target,
            added_nodes: added.to_vec(),
            removed_nodes: Vec::new(),
        }
    }

    #[test]
    fn test_subtree_filtering() {
        let mut tree = DomTree::new();
        let body = tree.create_element("body");
        let list = tree.create_element("ul");
        let aside = tree.create_element("aside");
        tree.append_child(tree.root(), body).unwrap();
        tree.append_child(body, list).unwrap();
        tree.append_child(tree.root(), aside).unwrap();

        let mut log = MutationLog::default();
        let deep = log.observe(body, MutationObserverInit { child_list: true, subtree: true });
        let shallow = log.observe(body, MutationObserverInit { child_list: true, subtree: false });

        log.queue(&tree, record(list, &[NodeId(10)]));
        log.queue(&tree, record(aside, &[NodeId(11)]));
        log.queue(&tree, record(body, &[NodeId(12)]));

        assert_eq!(log.take_records(deep).len(), 2);
        assert_eq!(log.take_records(shallow), vec![record(body, &[NodeId(12)])]);
        assert!(!log.has_pending());
    }

    #[test]
    fn test_disconnect_is_idempotent() {
        let tree = DomTree::new();
        let mut log = MutationLog::default();
        let id = log.observe(tree.root(), MutationObserverInit { child_list: true, subtree: true });
        log.queue(&tree, record(tree.root(), &[NodeId(1)]));

        assert!(log.disconnect(id));
        assert!(!log.disconnect(id));
        assert!(!log.is_observing(id));
        assert!(log.take_records(id).is_empty());
    }

    #[test]
    fn test_empty_records_dropped() {
        let tree = DomTree::new();
        let mut log = MutationLog::default();
        let id = log.observe(tree.root(), MutationObserverInit { child_list: true, subtree: true });
        log.queue(&tree, record(tree.root(), &[]));
        assert!(log.take_records(id).is_empty());
    }
}
