//! DOM Observation Controller
//!
//! Initial scan of the whole document, then a subtree watcher on the body
//! whose insertion batches are rescanned at each microtask checkpoint.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use bindery_dom::{Document, MutationObserverInit, MutationRecord, NodeId, ObserverId, SharedDocument};

use crate::scan::Scanner;

/// Stops a running watcher; safe to call any number of times
#[derive(Debug, Clone)]
pub struct CancelHandle {
    document: Weak<RefCell<Document>>,
    observer: ObserverId,
    cancelled: Rc<Cell<bool>>,
}

impl CancelHandle {
    /// Permanently stop future scans
    ///
    /// Listeners already attached and invocations in flight are unaffected.
    pub fn cancel(&self) {
        if self.cancelled.replace(true) {
            return;
        }
        tracing::debug!(observer = ?self.observer, "directive watcher cancelled");
        // A torn-down or busy document is disconnected lazily by `deliver`
        if let Some(document) = self.document.upgrade() {
            if let Ok(mut doc) = document.try_borrow_mut() {
                doc.disconnect(self.observer);
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

#[derive(Debug)]
struct Watch {
    document: Weak<RefCell<Document>>,
    observer: ObserverId,
    cancelled: Rc<Cell<bool>>,
}

/// Drives scans from the initial load and from observed insertions
#[derive(Debug)]
pub struct ObservationController {
    scanner: Scanner,
    watch: RefCell<Option<Watch>>,
}

impl ObservationController {
    pub fn new(scanner: Scanner) -> Self {
        Self {
            scanner,
            watch: RefCell::new(None),
        }
    }

    pub fn scanner(&self) -> &Scanner {
        &self.scanner
    }

    /// Scan the whole document and start watching body insertions
    pub fn start(&self, document: &SharedDocument) -> CancelHandle {
        if let Some(previous) = self.watch.borrow_mut().take() {
            tracing::warn!("directive watcher restarted");
            previous.cancelled.set(true);
            if let Some(doc) = previous.document.upgrade() {
                if let Ok(mut doc) = doc.try_borrow_mut() {
                    doc.disconnect(previous.observer);
                }
            }
        }

        let root = document.borrow().tree().root();
        let bound = self.scanner.scan(document, root);
        tracing::debug!(bound, "initial directive scan complete");

        let observer = {
            let mut doc = document.borrow_mut();
            let body = doc.body();
            doc.observe(body, MutationObserverInit { child_list: true, subtree: true })
        };
        let cancelled = Rc::new(Cell::new(false));
        *self.watch.borrow_mut() = Some(Watch {
            document: Rc::downgrade(document),
            observer,
            cancelled: cancelled.clone(),
        });

        CancelHandle {
            document: Rc::downgrade(document),
            observer,
            cancelled,
        }
    }

    /// Whether a watcher is running
    pub fn is_watching(&self) -> bool {
        self.watch
            .borrow()
            .as_ref()
            .is_some_and(|w| !w.cancelled.get())
    }

    /// Microtask checkpoint: release removed subtrees, then rescan every
    /// element inserted since the last one
    ///
    /// A removed node that is still disconnected loses its listeners and
    /// its bindings, so re-inserting it later binds it again. Returns the
    /// number of new bindings.
    pub fn deliver(&self) -> usize {
        let Some((document, records)) = self.take_batch() else {
            return 0;
        };
        self.release_removed(&document, &records);

        let added = added_elements(&document.borrow(), &records);
        if added.is_empty() {
            return 0;
        }
        tracing::debug!(inserted = added.len(), "rescanning inserted elements");
        self.rescan(&document, &added)
    }

    fn release_removed(&self, document: &SharedDocument, records: &[MutationRecord]) {
        let Ok(mut doc) = document.try_borrow_mut() else {
            tracing::warn!("document busy; removed nodes keep their listeners");
            return;
        };
        let mut listeners = 0;
        let mut bindings = 0;
        for &removed in records.iter().flat_map(|r| &r.removed_nodes) {
            if doc.tree().is_connected(removed) {
                continue;
            }
            for node in doc.tree().inclusive_descendants(removed) {
                listeners += doc.clear_event_listeners(node);
                bindings += self.scanner.forget(node);
            }
        }
        if listeners > 0 || bindings > 0 {
            tracing::debug!(listeners, bindings, "released removed nodes");
        }
    }

    fn take_batch(&self) -> Option<(SharedDocument, Vec<MutationRecord>)> {
        let mut watch = self.watch.borrow_mut();
        let state = watch.as_ref()?;
        let Some(document) = state.document.upgrade() else {
            *watch = None;
            return None;
        };
        let observer = state.observer;

        if state.cancelled.get() {
            // Disconnect that `CancelHandle::cancel` could not perform
            if let Ok(mut doc) = document.try_borrow_mut() {
                doc.disconnect(observer);
                *watch = None;
            }
            return None;
        }
        drop(watch);

        let records = document.try_borrow_mut().ok()?.take_records(observer);
        if records.is_empty() {
            return None;
        }
        Some((document, records))
    }

    /// Scan a list of inserted nodes as if an insertion batch reported them
    pub fn rescan(&self, document: &SharedDocument, nodes: &[NodeId]) -> usize {
        self.scanner.scan_all(document, nodes)
    }
}

/// Added elements of a batch still in the document, in record order,
/// without duplicates
fn added_elements(doc: &Document, records: &[MutationRecord]) -> Vec<NodeId> {
    let mut seen = Vec::new();
    for node in records.iter().flat_map(|r| r.added_nodes.iter().copied()) {
        if doc.tree().is_element(node) && doc.tree().is_connected(node) && !seen.contains(&node) {
            seen.push(node);
        }
    }
    seen
}
