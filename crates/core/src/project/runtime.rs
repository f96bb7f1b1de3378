//! Runtime model configuration

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// The `runtime` section in canonical form: a list of named models with an
/// optional explicit default designation
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RuntimeConfig {
    /// Name of the designated default model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
    #[serde(default)]
    pub models: Vec<ModelConfig>,
}

impl RuntimeConfig {
    /// Look up a model by name
    pub fn model(&self, name: &str) -> Option<&ModelConfig> {
        self.models.iter().find(|m| m.name == name)
    }

    /// All model names, in declaration order
    pub fn model_names(&self) -> Vec<&str> {
        self.models.iter().map(|m| m.name.as_str()).collect()
    }

    /// The effective default model: the explicit `default_model` designation,
    /// else the model flagged `default: true`, else the sole model.
    pub fn effective_default(&self) -> Option<&ModelConfig> {
        if let Some(name) = &self.default_model {
            return self.model(name);
        }
        if let Some(flagged) = self.models.iter().find(|m| m.is_default) {
            return Some(flagged);
        }
        if self.models.len() == 1 {
            self.models.first()
        } else {
            None
        }
    }
}

/// One runtime model entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub name: String,
    pub provider: Provider,
    /// Provider-side model identifier (e.g. "gpt-4o-mini")
    pub model: String,
    /// Prompt sets this model uses, by name
    #[serde(default)]
    pub prompts: Vec<String>,
    /// Marks this model as the project default
    #[serde(default, rename = "default")]
    pub is_default: bool,
    /// Free-form provider settings (temperature, context window, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<JsonValue>,
}

/// Supported model providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Anthropic,
    Gemini,
    Ollama,
    Custom,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Gemini => "gemini",
            Provider::Ollama => "ollama",
            Provider::Custom => "custom",
        };
        f.write_str(name)
    }
}
