//! Voice pipeline settings

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// The optional `voice` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Speech provider identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Voice/model identifier on the provider side
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Provider-specific settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<JsonValue>,
}

fn default_enabled() -> bool {
    true
}
