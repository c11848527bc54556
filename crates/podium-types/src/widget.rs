//! Per-widget configuration.

use serde::{Deserialize, Serialize};
use std::fmt;

fn default_title() -> String {
    "Voice Assistant".to_string()
}

fn default_description() -> String {
    "Click the button below to start a conversation with your AI assistant".to_string()
}

fn default_start_button_text() -> String {
    "Start Conversation".to_string()
}

/// Configuration for one rendered widget instance.
///
/// `widget_id`, `api_key` and `assistant_id` are required; the display
/// strings default to the stock demo copy.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetConfig {
    /// Stable, caller-supplied widget identifier.
    pub widget_id: String,
    /// Vendor SDK API key used to instantiate the voice client.
    #[serde(skip_serializing)]
    pub api_key: String,
    /// Identifier of the assistant this widget connects to.
    pub assistant_id: String,
    /// Heading shown above the start affordance.
    #[serde(default = "default_title")]
    pub title: String,
    /// Supporting copy shown under the heading.
    #[serde(default = "default_description")]
    pub description: String,
    /// Label of the start affordance.
    #[serde(default = "default_start_button_text")]
    pub start_button_text: String,
}

impl fmt::Debug for WidgetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetConfig")
            .field("widget_id", &self.widget_id)
            .field("api_key", &"[REDACTED]")
            .field("assistant_id", &self.assistant_id)
            .field("title", &self.title)
            .field("description", &self.description)
            .field("start_button_text", &self.start_button_text)
            .finish()
    }
}

impl WidgetConfig {
    /// Builds a config with default display strings.
    pub fn new(
        widget_id: impl Into<String>,
        api_key: impl Into<String>,
        assistant_id: impl Into<String>,
    ) -> Self {
        Self {
            widget_id: widget_id.into(),
            api_key: api_key.into(),
            assistant_id: assistant_id.into(),
            title: default_title(),
            description: default_description(),
            start_button_text: default_start_button_text(),
        }
    }
}
