//! DOM Events
//!
//! Events, listener storage and bubbling dispatch.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;

use crate::{Document, NodeId};

/// Event listener callback
pub type Listener = Rc<dyn Fn(&mut Event)>;

/// DOM event
#[derive(Debug, Clone)]
pub struct Event {
    event_type: String,
    target: NodeId,
    current_target: Option<NodeId>,
    bubbles: bool,
    cancelable: bool,
    detail: Option<Value>,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl Event {
    /// Plain event: does not bubble, not cancelable
    pub fn new(event_type: &str) -> Self {
        Self {
            event_type: event_type.to_string(),
            target: NodeId::ROOT,
            current_target: None,
            bubbles: false,
            cancelable: false,
            detail: None,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// Bubbling custom event carrying `detail`
    pub fn custom(event_type: &str, detail: Value) -> Self {
        Self {
            detail: Some(detail),
            ..Self::new(event_type).with_bubbles(true)
        }
    }

    pub fn with_bubbles(mut self, bubbles: bool) -> Self {
        self.bubbles = bubbles;
        self
    }

    pub fn with_cancelable(mut self, cancelable: bool) -> Self {
        self.cancelable = cancelable;
        self
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Node the event was dispatched to
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Node whose listeners are currently running
    pub fn current_target(&self) -> Option<NodeId> {
        self.current_target
    }

    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    pub fn cancelable(&self) -> bool {
        self.cancelable
    }

    pub fn detail(&self) -> Option<&Value> {
        self.detail.as_ref()
    }

    /// Prevent default action (only effective on cancelable events)
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    /// Stop propagation to further nodes on the path
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Check if default was prevented
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Event listener storage: node -> event type -> listeners
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: HashMap<NodeId, HashMap<String, Vec<Listener>>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener; adding the same listener twice is a no-op
    pub fn add(&mut self, node: NodeId, event_type: &str, listener: Listener) -> bool {
        let list = self
            .listeners
            .entry(node)
            .or_default()
            .entry(event_type.to_string())
            .or_default();
        if list.iter().any(|l| Rc::ptr_eq(l, &listener)) {
            return false;
        }
        list.push(listener);
        true
    }

    /// Remove a listener by identity
    pub fn remove(&mut self, node: NodeId, event_type: &str, listener: &Listener) -> bool {
        let Some(list) = self
            .listeners
            .get_mut(&node)
            .and_then(|types| types.get_mut(event_type))
        else {
            return false;
        };
        let before = list.len();
        list.retain(|l| !Rc::ptr_eq(l, listener));
        list.len() != before
    }

    /// Listeners for a node and event type, in registration order
    pub fn get(&self, node: NodeId, event_type: &str) -> Vec<Listener> {
        self.listeners
            .get(&node)
            .and_then(|types| types.get(event_type))
            .cloned()
            .unwrap_or_default()
    }

    /// Number of listeners for a node and event type
    pub fn count(&self, node: NodeId, event_type: &str) -> usize {
        self.listeners
            .get(&node)
            .and_then(|types| types.get(event_type))
            .map_or(0, Vec::len)
    }

    /// Drop every listener of a node; returns how many were dropped
    pub fn clear_node(&mut self, node: NodeId) -> usize {
        self.listeners
            .remove(&node)
            .map_or(0, |types| types.values().map(Vec::len).sum())
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let total: usize = self
            .listeners
            .values()
            .flat_map(|types| types.values())
            .map(Vec::len)
            .sum();
        f.debug_struct("ListenerRegistry")
            .field("nodes", &self.listeners.len())
            .field("listeners", &total)
            .finish()
    }
}

/// Dispatch `event` at `target`, running listeners on the target and, for
/// bubbling events, on each ancestor.
///
/// The document is only borrowed between listener calls, so listeners may
/// mutate the document or dispatch nested events. Returns the event after
/// dispatch so callers can inspect `is_default_prevented`.
pub fn dispatch_event(document: &RefCell<Document>, target: NodeId, mut event: Event) -> Event {
    event.target = target;
    let path: Vec<NodeId> = match document.try_borrow() {
        Ok(doc) => {
            let mut path = vec![target];
            if event.bubbles {
                path.extend(doc.tree().ancestors(target));
            }
            path
        }
        Err(_) => {
            tracing::error!(event = %event.event_type, %target, "dispatch while document is mutably borrowed");
            return event;
        }
    };
    tracing::trace!(event = %event.event_type, %target, "dispatching event");

    for node in path {
        if event.propagation_stopped {
            break;
        }
        let listeners = match document.try_borrow() {
            Ok(doc) => doc.event_listeners(node, &event.event_type),
            Err(_) => break,
        };
        if listeners.is_empty() {
            continue;
        }
        event.current_target = Some(node);
        for listener in listeners {
            listener(&mut event);
        }
    }
    event.current_target = None;
    event
}
