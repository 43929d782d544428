//! Page response model
//!
//! The structured result every host command returns: ordered DOM updates
//! plus an optional notification.

use serde::{Deserialize, Serialize};

/// Notification shown in the page chrome
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    /// Only `"error"` is distinguished; anything else is styled as success
    #[serde(alias = "type")]
    pub notification_type: String,
    /// Visibility in milliseconds
    #[serde(default)]
    pub duration: Option<u64>,
}

impl Notification {
    pub fn new(message: impl Into<String>, notification_type: &str, duration: Option<u64>) -> Self {
        Self {
            message: message.into(),
            notification_type: notification_type.to_string(),
            duration,
        }
    }

    pub fn is_error(&self) -> bool {
        self.notification_type == "error"
    }
}

/// One raw-fragment mutation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomUpdate {
    pub html: String,
    /// Selector; the first match is the target
    pub target: String,
    pub action: String,
}

impl DomUpdate {
    pub fn new(html: impl Into<String>, target: &str, action: &str) -> Self {
        Self {
            html: html.into(),
            target: target.to_string(),
            action: action.to_string(),
        }
    }

    pub fn replace(html: impl Into<String>, target: &str) -> Self {
        Self::new(html, target, "replace")
    }

    pub fn append(html: impl Into<String>, target: &str) -> Self {
        Self::new(html, target, "append")
    }

    pub fn prepend(html: impl Into<String>, target: &str) -> Self {
        Self::new(html, target, "prepend")
    }
}

/// Known update actions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateAction {
    /// Overwrite the target's content
    Replace,
    /// Insert as last child
    Append,
    /// Insert as first child
    Prepend,
}

impl UpdateAction {
    /// Parse a wire action; unknown actions yield `None`
    pub fn parse(action: &str) -> Option<Self> {
        match action {
            "replace" => Some(Self::Replace),
            "append" => Some(Self::Append),
            "prepend" => Some(Self::Prepend),
            _ => None,
        }
    }
}

/// Result of a host command
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResponse {
    #[serde(default)]
    pub updates: Vec<DomUpdate>,
    #[serde(default)]
    pub notification: Option<Notification>,
}

impl PageResponse {
    pub fn new(update: DomUpdate) -> Self {
        Self {
            updates: vec![update],
            notification: None,
        }
    }

    pub fn with_notification(
        update: DomUpdate,
        message: impl Into<String>,
        notification_type: &str,
        duration: Option<u64>,
    ) -> Self {
        Self {
            updates: vec![update],
            notification: Some(Notification::new(message, notification_type, duration)),
        }
    }

    /// Response with no updates and an error notification
    pub fn error(message: impl Into<String>, duration: u64) -> Self {
        Self {
            updates: Vec::new(),
            notification: Some(Notification::new(message, "error", Some(duration))),
        }
    }
}
