//! Bindery DOM - Document Object Model
//!
//! Arena-backed DOM tree with the pieces a declarative binding layer drives:
//! selector queries, class lists, `data-*` attributes, event listeners,
//! child-list mutation records and form data.

mod node;
mod tree;
mod document;
mod selector;
mod classlist;
mod dataset;
mod events;
mod mutation;
mod forms;
mod serialize;

pub use node::{Node, NodeData, ElementData, Attribute};
pub use tree::{DomTree, DomError, DomResult};
pub use document::{Document, SharedDocument};
pub use selector::{Selector, SelectorError};
pub use classlist::DOMTokenList;
pub use dataset::DOMStringMap;
pub use events::{Event, Listener, ListenerRegistry, dispatch_event};
pub use mutation::{MutationObserverInit, MutationRecord, ObserverId};
pub use forms::FormData;

/// Node identifier (index into arena)
///
/// Ids are never reused: a detached node keeps its slot for the lifetime of
/// the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root (document) node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
