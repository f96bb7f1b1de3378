//! Conversation memory settings

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// The optional `memory` section. Present means a memory store is configured;
/// `enabled: false` keeps the configuration around without using it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Memory backend identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Backend-specific settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<JsonValue>,
}

fn default_enabled() -> bool {
    true
}
