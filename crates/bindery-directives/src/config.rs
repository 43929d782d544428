//! Directive Configuration

use serde::{Deserialize, Serialize};

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Command directive configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectiveConfig {
    /// Trigger used when `data-trigger` is absent
    pub default_trigger: String,

    /// Trigger value that fires once at bind time
    pub immediate_trigger: String,

    /// Payload used when `data-payload` is absent
    pub default_payload: String,

    /// Event emitted on the bound element after a successful invocation
    pub success_event: String,

    /// Event emitted on the bound element after a failed invocation
    pub error_event: String,

    pub notification: NotificationConfig,
}

impl Default for DirectiveConfig {
    fn default() -> Self {
        Self {
            default_trigger: "click".to_string(),
            immediate_trigger: "now".to_string(),
            default_payload: "{}".to_string(),
            success_event: "tauri:success".to_string(),
            error_event: "tauri:error".to_string(),
            notification: NotificationConfig::default(),
        }
    }
}

impl DirectiveConfig {
    /// Load from JSON; absent fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Notification chrome configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Singleton notification container
    pub container_selector: String,

    /// Element receiving the message text
    pub text_selector: String,

    /// Styleable panel inside the container
    pub panel_selector: String,

    pub hidden_class: String,
    pub success_classes: Vec<String>,
    pub error_classes: Vec<String>,

    /// Visibility when a notification carries no duration (ms)
    pub default_duration_ms: u64,

    /// Visibility of synthesized failure notifications (ms)
    pub error_duration_ms: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            container_selector: "#notification".to_string(),
            text_selector: "#notification-text".to_string(),
            panel_selector: "div".to_string(),
            hidden_class: "hidden".to_string(),
            success_classes: ["bg-green-100", "border-green-500", "text-green-700"]
                .map(String::from)
                .to_vec(),
            error_classes: ["bg-red-100", "border-red-500", "text-red-700"]
                .map(String::from)
                .to_vec(),
            default_duration_ms: 3000,
            error_duration_ms: 5000,
        }
    }
}
