//! Bindery Directives
//!
//! Declarative bindings between markup and host commands. Elements declare
//! `data-command` (plus optional `data-trigger` and `data-payload`); the
//! observation controller binds them on load and whenever they are inserted
//! later. A fired binding invokes the host and applies the returned
//! `PageResponse` (ordered fragment updates plus an optional notification)
//! back onto the document.
//!
//! # Example
//! ```rust,ignore
//! use bindery_directives::{CommandDirective, CommandTable, DirectiveRegistry};
//!
//! let mut host = CommandTable::new();
//! host.register_sync("index", |_| Ok(PageResponse::new(DomUpdate::replace(html, "#app"))));
//! let mut registry = DirectiveRegistry::new();
//! registry.register(CommandDirective::new(host, config, timers, &executor));
//! ```

mod apply;
mod command;
mod config;
mod error;
mod host;
mod observe;
mod registry;
mod scan;
mod timers;
mod types;

pub use apply::{ApplyReport, NotificationOutcome, ResultApplier, SkipReason, SkippedUpdate};
pub use command::{CommandDirective, CommandInvocation, execute};
pub use config::{ConfigError, DirectiveConfig, NotificationConfig};
pub use error::DirectiveError;
pub use host::{CommandTable, Host, HostError};
pub use observe::{CancelHandle, ObservationController};
pub use registry::{Directive, DirectiveRegistry};
pub use scan::{BindingLedger, Scanner};
pub use timers::{TimerAction, TimerQueue};
pub use types::{DomUpdate, Notification, PageResponse, UpdateAction};
