//! Directive errors

use crate::host::HostError;

/// Failures of one command invocation
///
/// Every variant ends as an error notification plus an error event on the
/// bound element; none of them escapes the listener.
#[derive(Debug, thiserror::Error)]
pub enum DirectiveError {
    #[error("invalid payload: {0}")]
    PayloadParse(#[from] serde_json::Error),

    #[error("payload must be a JSON object")]
    PayloadNotObject,

    #[error(transparent)]
    Host(#[from] HostError),

    #[error("page response could not be applied while the document is busy")]
    Unapplied,
}

impl DirectiveError {
    /// Value carried as `detail.error` by the error event
    pub fn to_value(&self) -> serde_json::Value {
        match self {
            Self::Host(err) => err.value().clone(),
            other => serde_json::Value::String(other.to_string()),
        }
    }
}
