//! Page - a loaded document bound to a host
//!
//! Single-threaded event loop: user events and timers run synchronously,
//! host invocations run as tasks on a local executor, and mutation
//! deliveries happen at checkpoints between task steps.

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::rc::Rc;
use std::time::Instant;

use bindery_directives::{
    ApplyReport, CancelHandle, CommandDirective, Directive, DirectiveRegistry, Host,
    ObservationController, PageResponse, ResultApplier, Scanner, TimerQueue,
};
use bindery_dom::{Document, Event, NodeId, SelectorError, SharedDocument, dispatch_event};
use bindery_html::{HtmlError, HtmlParser};
use smol::LocalExecutor;

use crate::Config;

/// Page lifecycle errors
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("failed to parse page: {0}")]
    Html(#[from] HtmlError),

    #[error("directives are read-only once the page is loaded")]
    AlreadyLoaded,

    #[error(transparent)]
    Selector(#[from] SelectorError),
}

/// A loaded page
pub struct Page<H: Host + 'static> {
    document: SharedDocument,
    executor: Rc<LocalExecutor<'static>>,
    timers: Rc<RefCell<TimerQueue>>,
    applier: ResultApplier,
    command: CommandDirective<H>,
    /// Directives registered before load
    registry: DirectiveRegistry,
    controller: Option<ObservationController>,
    cancel: Option<CancelHandle>,
    last_pump: Cell<Option<Instant>>,
    config: Config,
}

impl<H: Host + 'static> Page<H> {
    /// Parse `html` and prepare a page talking to `host`
    pub fn new(html: &str, host: H, config: Config) -> Result<Self, PageError> {
        let document = HtmlParser::new().parse(html)?;
        Ok(Self::from_document(document, host, config))
    }

    /// Prepare a page over an existing document
    pub fn from_document(document: Document, host: H, config: Config) -> Self {
        let executor = Rc::new(LocalExecutor::new());
        let timers = Rc::new(RefCell::new(TimerQueue::new()));
        let command = CommandDirective::new(host, config.directives.clone(), timers.clone(), &executor);

        let mut registry = DirectiveRegistry::new();
        registry.register(command.clone());

        Self {
            document: Rc::new(RefCell::new(document)),
            executor,
            timers,
            applier: ResultApplier::new(config.directives.notification.clone()),
            command,
            registry,
            controller: None,
            cancel: None,
            last_pump: Cell::new(None),
            config,
        }
    }

    /// Add a directive; only possible before `load`
    pub fn register(&mut self, directive: impl Directive + 'static) -> Result<(), PageError> {
        if self.controller.is_some() {
            return Err(PageError::AlreadyLoaded);
        }
        self.registry.register(directive);
        Ok(())
    }

    /// DOMContentLoaded: bind the whole document and start watching insertions
    pub fn load(&mut self) -> Result<CancelHandle, PageError> {
        if self.controller.is_some() {
            return Err(PageError::AlreadyLoaded);
        }
        let registry = Rc::new(std::mem::take(&mut self.registry));
        tracing::info!(directives = registry.len(), "setting up directive system");

        let controller = ObservationController::new(Scanner::new(registry));
        let handle = controller.start(&self.document);
        self.controller = Some(controller);
        self.cancel = Some(handle.clone());
        self.run_until_idle();
        Ok(handle)
    }

    /// Stop watching for insertions; bound listeners keep working
    pub fn unload(&mut self) {
        if let Some(handle) = &self.cancel {
            handle.cancel();
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.controller.is_some()
    }

    // ---- Events ----

    /// Dispatch `event` at `target`, then run until idle
    pub fn dispatch(&self, target: NodeId, event: Event) -> Event {
        let event = dispatch_event(&self.document, target, event);
        self.run_until_idle();
        event
    }

    /// User click
    pub fn click(&self, target: NodeId) -> Event {
        self.dispatch(target, Event::new("click").with_bubbles(true).with_cancelable(true))
    }

    /// User form submission
    pub fn submit(&self, form: NodeId) -> Event {
        self.dispatch(form, Event::new("submit").with_bubbles(true).with_cancelable(true))
    }

    /// Apply a response directly, as if a command had returned it
    pub fn apply(&self, response: &PageResponse) -> ApplyReport {
        let report = {
            let mut doc = self.document.borrow_mut();
            let mut timers = self.timers.borrow_mut();
            self.applier.apply(&mut doc, &mut timers, response)
        };
        self.run_until_idle();
        report
    }

    // ---- Event loop ----

    /// Run ready tasks and mutation deliveries until neither makes progress
    pub fn run_until_idle(&self) {
        loop {
            let ticked = self.executor.try_tick();
            let bound = self.deliver();
            if !ticked && bound == 0 {
                break;
            }
        }
    }

    /// Rescan `nodes` as if they had just been inserted
    ///
    /// Returns the number of new bindings; already bound pairs are skipped.
    pub fn rescan(&self, nodes: &[NodeId]) -> usize {
        let bound = self
            .controller
            .as_ref()
            .map_or(0, |c| c.rescan(&self.document, nodes));
        self.run_until_idle();
        bound
    }

    fn deliver(&self) -> usize {
        self.controller.as_ref().map_or(0, ObservationController::deliver)
    }

    /// Run until every in-flight invocation has settled
    ///
    /// Unlike `run_until_idle`, this also waits for tasks blocked on
    /// wake-ups from outside the page.
    pub async fn settle(&self) {
        loop {
            self.run_until_idle();
            if self.executor.is_empty() {
                break;
            }
            self.executor.tick().await;
        }
    }

    /// Whether invocations are still in flight
    pub fn has_pending_tasks(&self) -> bool {
        !self.executor.is_empty()
    }

    // ---- Timers ----

    /// Advance the page clock, fire due timers, then run until idle
    pub fn advance_time(&self, ms: u64) {
        let due = self.timers.borrow_mut().advance(ms);
        if !due.is_empty() {
            let mut doc = self.document.borrow_mut();
            for action in &due {
                tracing::trace!(?action, "timer fired");
                self.applier.run_timer(&mut doc, action);
            }
        }
        self.run_until_idle();
    }

    /// Advance by the wall-clock time elapsed since the previous pump
    pub fn pump(&self) {
        let now = Instant::now();
        let elapsed = self
            .last_pump
            .replace(Some(now))
            .map_or(0, |last| now.duration_since(last).as_millis() as u64);
        self.advance_time(elapsed);
    }

    /// Milliseconds until the next timer fires
    pub fn time_until_next_timer(&self) -> Option<u64> {
        self.timers.borrow().time_until_next()
    }

    // ---- Accessors ----

    pub fn document(&self) -> Ref<'_, Document> {
        self.document.borrow()
    }

    pub fn document_mut(&self) -> RefMut<'_, Document> {
        self.document.borrow_mut()
    }

    pub fn shared_document(&self) -> &SharedDocument {
        &self.document
    }

    /// First element in the document matching `selector`
    pub fn query_selector(&self, selector: &str) -> Result<Option<NodeId>, PageError> {
        let doc = self.document.borrow();
        let root = doc.tree().root();
        Ok(doc.query_selector(root, selector)?)
    }

    pub fn host(&self) -> &H {
        self.command.host()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl<H: Host + 'static> std::fmt::Debug for Page<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("loaded", &self.is_loaded())
            .field("pending_tasks", &self.has_pending_tasks())
            .field("pending_timers", &self.timers.borrow().pending())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bindery_directives::CommandTable;

    #[test]
    fn test_register_after_load_fails() {
        let mut page = Page::new("<p>x</p>", CommandTable::new(), Config::default()).unwrap();
        page.load().unwrap();
        assert!(matches!(page.load(), Err(PageError::AlreadyLoaded)));

        let command = CommandDirective::new(
            CommandTable::new(),
            Default::default(),
            Rc::new(RefCell::new(TimerQueue::new())),
            &Rc::new(LocalExecutor::new()),
        );
        assert!(matches!(page.register(command), Err(PageError::AlreadyLoaded)));
    }

    #[test]
    fn test_unload_is_idempotent() {
        let mut page = Page::new("<p>x</p>", CommandTable::new(), Config::default()).unwrap();
        page.unload();
        let handle = page.load().unwrap();
        page.unload();
        page.unload();
        assert!(handle.is_cancelled());
    }

    #[test]
    fn test_pump_starts_clock() {
        let page = Page::new("<p>x</p>", CommandTable::new(), Config::default()).unwrap();
        page.pump();
        page.pump();
        assert_eq!(page.time_until_next_timer(), None);
    }
}
