//! The `command` directive
//!
//! Binds an element to a host command. Binding is synchronous: read the
//! trigger, register a listener, and for the immediate trigger dispatch it
//! once. Firing is split into `CommandInvocation::prepare` (synchronous),
//! `execute` (suspends on the host) and `CommandDirective::settle`.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use bindery_dom::{Document, Event, Listener, NodeId, SharedDocument, dispatch_event};
use serde_json::{Map, Value, json};
use smol::LocalExecutor;

use crate::apply::{ApplyReport, ResultApplier};
use crate::config::DirectiveConfig;
use crate::error::DirectiveError;
use crate::host::Host;
use crate::registry::Directive;
use crate::timers::TimerQueue;
use crate::types::PageResponse;

/// One firing of a bound element
#[derive(Debug, Clone, PartialEq)]
pub struct CommandInvocation {
    pub command: String,
    pub payload: Map<String, Value>,
}

impl CommandInvocation {
    /// Read `data-command` and `data-payload` at fire time
    ///
    /// `Ok(None)` when the element declares no command. A form element's
    /// fields are merged over the declared payload, later fields winning.
    pub fn prepare(
        doc: &Document,
        element: NodeId,
        config: &DirectiveConfig,
    ) -> Result<Option<Self>, DirectiveError> {
        let data = doc.dataset(element);
        let Some(command) = data.get("command").filter(|c| !c.is_empty()) else {
            return Ok(None);
        };
        let raw = data.get("payload").unwrap_or(&config.default_payload);
        let Value::Object(mut payload) = serde_json::from_str::<Value>(raw)? else {
            return Err(DirectiveError::PayloadNotObject);
        };

        if doc.tree().tag_name(element) == Some("form") {
            for (name, value) in doc.form_data(element).entries() {
                payload.insert(name.to_string(), Value::String(value.to_string()));
            }
        }

        Ok(Some(Self {
            command: command.to_string(),
            payload,
        }))
    }
}

/// Invoke the host for a prepared invocation
pub async fn execute<H: Host>(host: &H, invocation: &CommandInvocation) -> Result<PageResponse, DirectiveError> {
    tracing::debug!(command = %invocation.command, "invoking host command");
    let payload = Value::Object(invocation.payload.clone());
    Ok(host.invoke(&invocation.command, payload).await?)
}

struct Shared<H> {
    host: H,
    applier: ResultApplier,
    timers: Rc<RefCell<TimerQueue>>,
    executor: Weak<LocalExecutor<'static>>,
    config: DirectiveConfig,
}

/// Directive dispatching host commands from `data-command` elements
pub struct CommandDirective<H> {
    shared: Rc<Shared<H>>,
}

impl<H> Clone for CommandDirective<H> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<H: Host + 'static> CommandDirective<H> {
    /// Invocations run as tasks on `executor`; hide timers go to `timers`
    pub fn new(
        host: H,
        config: DirectiveConfig,
        timers: Rc<RefCell<TimerQueue>>,
        executor: &Rc<LocalExecutor<'static>>,
    ) -> Self {
        Self {
            shared: Rc::new(Shared {
                host,
                applier: ResultApplier::new(config.notification.clone()),
                timers,
                executor: Rc::downgrade(executor),
                config,
            }),
        }
    }

    pub fn config(&self) -> &DirectiveConfig {
        &self.shared.config
    }

    pub fn host(&self) -> &H {
        &self.shared.host
    }

    /// Listener body: prepare synchronously, then run the host call as a task
    fn fire(&self, document: &SharedDocument, element: NodeId) {
        let prepared = match document.try_borrow() {
            Ok(doc) => CommandInvocation::prepare(&doc, element, &self.shared.config),
            Err(_) => {
                tracing::error!(%element, "command fired while document is mutably borrowed");
                return;
            }
        };

        let invocation = match prepared {
            Ok(Some(invocation)) => invocation,
            Ok(None) => {
                tracing::debug!(%element, "no command declared");
                return;
            }
            Err(err) => {
                let command = document
                    .borrow()
                    .dataset(element)
                    .get("command")
                    .unwrap_or_default()
                    .to_string();
                self.settle(document, element, &command, Err(err));
                return;
            }
        };

        let Some(executor) = self.shared.executor.upgrade() else {
            tracing::warn!(command = %invocation.command, "page torn down; dropping invocation");
            return;
        };
        let this = self.clone();
        let document = document.clone();
        executor
            .spawn(async move {
                let outcome = execute(&this.shared.host, &invocation).await;
                this.settle(&document, element, &invocation.command, outcome);
            })
            .detach();
    }

    /// Apply the outcome of an invocation and emit the completion event
    ///
    /// Success applies the response and emits the success event with
    /// `{response}`. Failure applies an error notification and emits the
    /// error event with `{error}`. Both events bubble.
    pub fn settle(
        &self,
        document: &SharedDocument,
        element: NodeId,
        command: &str,
        outcome: Result<PageResponse, DirectiveError>,
    ) {
        let config = &self.shared.config;
        match outcome {
            Ok(response) => {
                if self.apply(document, &response).is_some() {
                    let detail = json!({ "response": serde_json::to_value(&response).unwrap_or_default() });
                    dispatch_event(document, element, Event::custom(&config.success_event, detail));
                } else {
                    let err = DirectiveError::Unapplied;
                    tracing::error!(command, error = %err, "error invoking command");
                    let detail = json!({ "error": err.to_value() });
                    dispatch_event(document, element, Event::custom(&config.error_event, detail));
                }
            }
            Err(err) => {
                tracing::error!(command, error = %err, "error invoking command");
                let message = match &err {
                    DirectiveError::Host(host) => host.message(),
                    other => other.to_string(),
                };
                let response = PageResponse::error(message, config.notification.error_duration_ms);
                self.apply(document, &response);
                let detail = json!({ "error": err.to_value() });
                dispatch_event(document, element, Event::custom(&config.error_event, detail));
            }
        }
    }

    fn apply(&self, document: &SharedDocument, response: &PageResponse) -> Option<ApplyReport> {
        let (Ok(mut doc), Ok(mut timers)) = (document.try_borrow_mut(), self.shared.timers.try_borrow_mut()) else {
            tracing::error!("cannot apply page response while the document is borrowed");
            return None;
        };
        let report = self.shared.applier.apply(&mut doc, &mut timers, response);
        tracing::debug!(applied = report.applied, skipped = report.skipped.len(), "page response applied");
        Some(report)
    }
}

impl<H: Host + 'static> Directive for CommandDirective<H> {
    fn name(&self) -> &str {
        "command"
    }

    fn bind(&self, document: &SharedDocument, element: NodeId) {
        let config = &self.shared.config;
        let trigger = match document.try_borrow() {
            Ok(doc) => doc
                .dataset(element)
                .get("trigger")
                .unwrap_or(&config.default_trigger)
                .to_string(),
            Err(_) => {
                tracing::error!(%element, "bind while document is mutably borrowed");
                return;
            }
        };

        let this = self.clone();
        let weak = Rc::downgrade(document);
        let listener: Listener = Rc::new(move |event: &mut Event| {
            event.prevent_default();
            if let Some(document) = weak.upgrade() {
                this.fire(&document, element);
            }
        });
        document.borrow_mut().add_event_listener(element, &trigger, listener);
        tracing::debug!(%element, %trigger, "hooked up command directive");

        if trigger == config.immediate_trigger {
            dispatch_event(document, element, Event::new(&trigger).with_cancelable(true));
        }
    }
}

impl<H> std::fmt::Debug for CommandDirective<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDirective")
            .field("config", &self.shared.config)
            .finish_non_exhaustive()
    }
}
