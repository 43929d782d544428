//! Directive Registry
//!
//! Directive name -> handler. Populated before the first scan and read-only
//! afterwards.

use std::collections::BTreeMap;
use std::rc::Rc;

use bindery_dom::{Document, NodeId, SharedDocument};

/// Attribute-driven binding kind
pub trait Directive {
    /// Directive name; elements opt in with `data-<name>`
    fn name(&self) -> &str;

    /// Whether `element` declares this directive
    fn matches(&self, document: &Document, element: NodeId) -> bool {
        document.has_attribute(element, &format!("data-{}", self.name()))
    }

    /// Attach behavior to `element`
    ///
    /// Called with no outstanding borrow of `document`, at most once per
    /// element lifetime.
    fn bind(&self, document: &SharedDocument, element: NodeId);
}

/// Registered directives, iterated in name order
#[derive(Default)]
pub struct DirectiveRegistry {
    directives: BTreeMap<String, Rc<dyn Directive>>,
}

impl DirectiveRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a directive under its name; the last registration wins
    pub fn register(&mut self, directive: impl Directive + 'static) -> &mut Self {
        self.register_rc(Rc::new(directive))
    }

    pub fn register_rc(&mut self, directive: Rc<dyn Directive>) -> &mut Self {
        let name = directive.name().to_string();
        if self.directives.insert(name.clone(), directive).is_some() {
            tracing::debug!(directive = %name, "replaced directive");
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&Rc<dyn Directive>> {
        self.directives.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.directives.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Rc<dyn Directive>)> {
        self.directives.iter().map(|(name, d)| (name.as_str(), d))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.directives.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }
}

impl std::fmt::Debug for DirectiveRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
