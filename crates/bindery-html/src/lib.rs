//! Bindery HTML Parser
//!
//! HTML5 parsing built on html5ever: whole documents for page bootstrap and
//! markup fragments for content inserted at runtime.

mod parser;
mod fragment;

pub use parser::HtmlParser;
pub use fragment::{AdjacentPosition, insert_adjacent_html, set_inner_html};

use bindery_dom::{Document, DomError};

/// Parse an HTML string into a Document
pub fn parse(html: &str) -> Result<Document, HtmlError> {
    HtmlParser::new().parse(html)
}

/// HTML parsing and insertion errors
#[derive(Debug, thiserror::Error)]
pub enum HtmlError {
    #[error("failed to read HTML input: {0}")]
    Io(#[from] std::io::Error),

    #[error("fragment parse produced no root element")]
    MissingFragmentRoot,

    #[error("unknown insertion position: {0}")]
    InvalidPosition(String),

    #[error(transparent)]
    Dom(#[from] DomError),
}
