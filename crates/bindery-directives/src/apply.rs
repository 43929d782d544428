//! Result-Application Engine
//!
//! Applies a `PageResponse` to the live document: ordered fragment updates,
//! then the optional notification.

use bindery_dom::{Document, NodeId, SelectorError};
use bindery_html::{AdjacentPosition, HtmlError, insert_adjacent_html, set_inner_html};

use crate::config::NotificationConfig;
use crate::timers::{TimerAction, TimerQueue};
use crate::types::{DomUpdate, Notification, PageResponse, UpdateAction};

/// Why an update was skipped
#[derive(Debug)]
pub enum SkipReason {
    /// No element matched the target selector
    UnresolvedTarget,
    /// Action outside replace/append/prepend
    UnknownAction,
    /// Target selector did not parse
    InvalidSelector(SelectorError),
    /// Fragment could not be inserted at the target
    InsertFailed(HtmlError),
}

/// A skipped update and its position in the batch
#[derive(Debug)]
pub struct SkippedUpdate {
    pub index: usize,
    pub target: String,
    pub reason: SkipReason,
}

/// What happened to the notification of a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationOutcome {
    /// Response carried no notification
    #[default]
    None,
    /// Message shown and hide timer scheduled
    Shown,
    /// Container or text slot absent; pass skipped
    MissingHost,
    /// Text set, but the container has no styleable panel
    MissingPanel,
}

/// Outcome of one `apply`
#[derive(Debug, Default)]
pub struct ApplyReport {
    pub applied: usize,
    pub skipped: Vec<SkippedUpdate>,
    pub notification: NotificationOutcome,
}

impl ApplyReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Applies page responses using the notification chrome conventions
#[derive(Debug, Clone, Default)]
pub struct ResultApplier {
    config: NotificationConfig,
}

impl ResultApplier {
    pub fn new(config: NotificationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NotificationConfig {
        &self.config
    }

    /// Apply every update in order, then the notification
    ///
    /// Updates are not transactional: a skipped update leaves earlier ones
    /// applied and does not stop later ones.
    pub fn apply(&self, doc: &mut Document, timers: &mut TimerQueue, response: &PageResponse) -> ApplyReport {
        let mut report = ApplyReport::default();

        for (index, update) in response.updates.iter().enumerate() {
            match apply_update(doc, update) {
                Ok(()) => report.applied += 1,
                Err(reason) => {
                    tracing::warn!(index, target = %update.target, action = %update.action, ?reason, "skipping DOM update");
                    report.skipped.push(SkippedUpdate {
                        index,
                        target: update.target.clone(),
                        reason,
                    });
                }
            }
        }

        if let Some(notification) = &response.notification {
            report.notification = self.show_notification(doc, timers, notification);
        }
        report
    }

    /// Show `notification` and schedule it to hide again
    pub fn show_notification(
        &self,
        doc: &mut Document,
        timers: &mut TimerQueue,
        notification: &Notification,
    ) -> NotificationOutcome {
        let cfg = &self.config;
        let root = doc.tree().root();
        let (Some(container), Some(text)) = (
            find(doc, root, &cfg.container_selector),
            find(doc, root, &cfg.text_selector),
        ) else {
            tracing::warn!(message = %notification.message, "notification container missing");
            return NotificationOutcome::MissingHost;
        };

        if let Err(err) = doc.set_text_content(text, &notification.message) {
            tracing::warn!(%err, "cannot set notification text");
        }

        let Some(panel) = find(doc, container, &cfg.panel_selector) else {
            tracing::warn!("notification panel missing");
            return NotificationOutcome::MissingPanel;
        };

        let styles = cfg.success_classes.iter().chain(&cfg.error_classes);
        doc.remove_classes(panel, styles.map(String::as_str));
        let chosen = if notification.is_error() {
            &cfg.error_classes
        } else {
            &cfg.success_classes
        };
        doc.add_classes(panel, chosen.iter().map(String::as_str));
        doc.remove_classes(panel, [cfg.hidden_class.as_str()]);

        let duration = notification
            .duration
            .filter(|&ms| ms > 0)
            .unwrap_or(cfg.default_duration_ms);
        timers.schedule(
            duration,
            TimerAction::Hide {
                element: panel,
                class: cfg.hidden_class.clone(),
            },
        );
        tracing::debug!(kind = %notification.notification_type, duration, "notification shown");
        NotificationOutcome::Shown
    }

    /// Run a due timer action
    pub fn run_timer(&self, doc: &mut Document, action: &TimerAction) {
        match action {
            TimerAction::Hide { element, class } => {
                // Hiding an already hidden panel is a no-op
                doc.add_classes(*element, [class.as_str()]);
            }
        }
    }
}

fn find(doc: &Document, scope: NodeId, selector: &str) -> Option<NodeId> {
    doc.query_selector(scope, selector).ok().flatten()
}

fn apply_update(doc: &mut Document, update: &DomUpdate) -> Result<(), SkipReason> {
    let root = doc.tree().root();
    let target = doc
        .query_selector(root, &update.target)
        .map_err(SkipReason::InvalidSelector)?
        .ok_or(SkipReason::UnresolvedTarget)?;
    let action = UpdateAction::parse(&update.action).ok_or(SkipReason::UnknownAction)?;

    let result = match action {
        UpdateAction::Replace => set_inner_html(doc, target, &update.html),
        UpdateAction::Append => insert_adjacent_html(doc, target, AdjacentPosition::BeforeEnd, &update.html),
        UpdateAction::Prepend => insert_adjacent_html(doc, target, AdjacentPosition::AfterBegin, &update.html),
    };
    result.map(|_| ()).map_err(SkipReason::InsertFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bindery_html::HtmlParser;

    const CHROME: &str = r#"
        <div id="notification">
            <div class="p-4 bg-red-100 border-red-500 text-red-700 hidden">
                <p id="notification-text">old</p>
            </div>
        </div>
        <ul id="list"><li>a</li></ul>
    "#;

    fn setup() -> (Document, TimerQueue, ResultApplier) {
        let doc = HtmlParser::new().parse(CHROME).unwrap();
        (doc, TimerQueue::new(), ResultApplier::default())
    }

    fn panel(doc: &Document) -> NodeId {
        let container = doc.get_element_by_id("notification").unwrap();
        doc.query_selector(container, "div").unwrap().unwrap()
    }

    #[test]
    fn test_updates_in_order() {
        let (mut doc, mut timers, applier) = setup();
        let response = PageResponse {
            updates: vec![
                DomUpdate::append("<li>c</li>", "#list"),
                DomUpdate::prepend("<li>0</li>", "#list"),
                DomUpdate::append("<li>d</li>", "#list"),
            ],
            notification: None,
        };
        let report = applier.apply(&mut doc, &mut timers, &response);

        assert_eq!(report.applied, 3);
        assert!(report.is_clean());
        assert_eq!(report.notification, NotificationOutcome::None);
        let list = doc.get_element_by_id("list").unwrap();
        assert_eq!(doc.inner_html(list), "<li>0</li><li>a</li><li>c</li><li>d</li>");
    }

    #[test]
    fn test_skips_are_independent() {
        let (mut doc, mut timers, applier) = setup();
        let response = PageResponse {
            updates: vec![
                DomUpdate::new("<p>x</p>", "#list", "remove"),
                DomUpdate::replace("<p>x</p>", "#missing"),
                DomUpdate::replace("<p>x</p>", "##bad"),
                DomUpdate::replace("<li>z</li>", "#list"),
            ],
            notification: None,
        };
        let report = applier.apply(&mut doc, &mut timers, &response);

        assert_eq!(report.applied, 1);
        assert!(matches!(report.skipped[0].reason, SkipReason::UnknownAction));
        assert!(matches!(report.skipped[1].reason, SkipReason::UnresolvedTarget));
        assert!(matches!(report.skipped[2].reason, SkipReason::InvalidSelector(_)));
        assert_eq!(report.skipped[2].index, 2);
        let list = doc.get_element_by_id("list").unwrap();
        assert_eq!(doc.inner_html(list), "<li>z</li>");
    }

    #[test]
    fn test_success_notification_styling() {
        let (mut doc, mut timers, applier) = setup();
        let notification = Notification::new("Saved", "success", None);
        let outcome = applier.show_notification(&mut doc, &mut timers, &notification);

        assert_eq!(outcome, NotificationOutcome::Shown);
        let text = doc.get_element_by_id("notification-text").unwrap();
        assert_eq!(doc.text_content(text), "Saved");
        let panel = panel(&doc);
        assert_eq!(
            doc.get_attribute(panel, "class"),
            Some("p-4 bg-green-100 border-green-500 text-green-700")
        );
        assert_eq!(timers.time_until_next(), Some(3000));
    }

    #[test]
    fn test_error_notification_and_zero_duration() {
        let (mut doc, mut timers, applier) = setup();
        let notification = Notification::new("Nope", "error", Some(0));
        applier.show_notification(&mut doc, &mut timers, &notification);

        let panel = panel(&doc);
        assert!(doc.has_class(panel, "bg-red-100"));
        assert!(!doc.has_class(panel, "bg-green-100"));
        assert_eq!(timers.time_until_next(), Some(3000));

        for action in timers.advance(3000) {
            applier.run_timer(&mut doc, &action);
        }
        assert!(doc.has_class(panel, "hidden"));
    }

    #[test]
    fn test_missing_chrome_is_skipped() {
        let mut doc = HtmlParser::new().parse("<div id=\"notification\"></div>").unwrap();
        let mut timers = TimerQueue::new();
        let applier = ResultApplier::default();
        let response = PageResponse::error("boom", 5000);

        let report = applier.apply(&mut doc, &mut timers, &response);
        assert_eq!(report.notification, NotificationOutcome::MissingHost);
        assert!(!timers.has_pending());
    }

    #[test]
    fn test_table_targets_parse_in_context() {
        let mut doc = HtmlParser::new()
            .parse(r#"<table><tbody id="rows"><tr><td>old</td></tr></tbody></table>"#)
            .unwrap();
        let mut timers = TimerQueue::new();
        let response = PageResponse {
            updates: vec![
                DomUpdate::replace("<tr><td>new</td></tr>", "#rows"),
                DomUpdate::append("<tr><td>more</td></tr>", "#rows"),
                DomUpdate::prepend("<tr><td>first</td></tr>", "#rows"),
            ],
            notification: None,
        };
        let report = ResultApplier::default().apply(&mut doc, &mut timers, &response);

        assert_eq!(report.applied, 3);
        let rows = doc.get_element_by_id("rows").unwrap();
        assert_eq!(
            doc.inner_html(rows),
            "<tr><td>first</td></tr><tr><td>new</td></tr><tr><td>more</td></tr>"
        );
    }
}
