//! Bindery
//!
//! Runtime for frontends whose behavior is declared in markup and whose
//! logic lives in a host process.
//!
//! # Example
//! ```rust,ignore
//! use bindery::{CommandTable, Config, Page, PageResponse, DomUpdate};
//!
//! let mut host = CommandTable::new();
//! host.register_sync("index", |_| Ok(PageResponse::new(DomUpdate::replace("<p>Hi</p>", "#app"))));
//!
//! let mut page = Page::new(html, host, Config::default())?;
//! page.load()?;
//! smol::block_on(page.settle());
//! ```

mod config;
mod logging;
mod page;

pub use config::Config;
pub use logging::init_logging;
pub use page::{Page, PageError};

pub use bindery_directives::{
    ApplyReport, CancelHandle, CommandDirective, CommandTable, Directive, DirectiveConfig,
    DirectiveError, DomUpdate, Host, HostError, Notification, NotificationConfig, PageResponse,
};

// Re-export sub-crates for advanced usage
pub use bindery_directives as directives;
pub use bindery_dom as dom;
pub use bindery_html as html;

/// Bindery version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
