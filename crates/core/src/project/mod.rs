//! Typed project model
//!
//! The strict, immutable representation of a fully resolved configuration.
//! Values reach these types only after structural validation, semantic
//! validation, and reference resolution have all succeeded; partially
//! validated documents stay in `serde_json::Value` form and never surface
//! here.

mod dataset;
mod memory;
mod prompts;
mod rag;
mod runtime;
mod voice;

pub use dataset::DatasetConfig;
pub use memory::MemoryConfig;
pub use prompts::{MessageRole, PromptMessage, PromptSet};
pub use rag::{
    DatabaseConfig, ParserConfig, ProcessingStrategyConfig, RagConfig, StrategyConfig,
};
pub use runtime::{ModelConfig, Provider, RuntimeConfig};
pub use voice::VoiceConfig;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

/// A resolved value failed to decode into the typed model
#[derive(Error, Debug)]
#[error("Failed to decode project configuration: {0}")]
pub struct ProjectDecodeError(String);

/// A fully resolved LlamaFarm project configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Config format version (always "v1")
    pub version: String,
    /// Project name
    pub name: String,
    /// Tenant/organization namespace
    pub namespace: String,
    /// Runtime models
    pub runtime: RuntimeConfig,
    /// Named prompt sets referenced by models
    #[serde(default)]
    pub prompts: Vec<PromptSet>,
    /// RAG databases and data processing strategies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rag: Option<RagConfig>,
    /// Datasets feeding the RAG pipeline
    #[serde(default)]
    pub datasets: Vec<DatasetConfig>,
    /// Conversation memory store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<MemoryConfig>,
    /// Voice pipeline settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<VoiceConfig>,
    /// Reusable component definitions, carried through as declared
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<JsonValue>,
}

impl ProjectConfig {
    /// Decode a resolved configuration value into the typed model
    pub fn from_value(value: JsonValue) -> Result<Self, ProjectDecodeError> {
        serde_json::from_value(value).map_err(|e| ProjectDecodeError(e.to_string()))
    }

    /// The effective default model (explicit designation, flag, or sole model)
    pub fn default_model(&self) -> Option<&ModelConfig> {
        self.runtime.effective_default()
    }

    /// Look up a model by name
    pub fn model(&self, name: &str) -> Option<&ModelConfig> {
        self.runtime.model(name)
    }

    /// Look up a prompt set by name
    pub fn prompt_set(&self, name: &str) -> Option<&PromptSet> {
        self.prompts.iter().find(|p| p.name == name)
    }

    /// Look up a RAG database by name
    pub fn database(&self, name: &str) -> Option<&DatabaseConfig> {
        self.rag.as_ref().and_then(|rag| rag.database(name))
    }

    /// Look up a data processing strategy by name
    pub fn processing_strategy(&self, name: &str) -> Option<&ProcessingStrategyConfig> {
        self.rag.as_ref().and_then(|rag| rag.processing_strategy(name))
    }

    /// Look up a dataset by name
    pub fn dataset(&self, name: &str) -> Option<&DatasetConfig> {
        self.datasets.iter().find(|d| d.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESOLVED_PROJECT: &str = r#"
version: v1
name: support-bot
namespace: acme
runtime:
  default_model: chat
  models:
    - name: chat
      provider: openai
      model: gpt-4o-mini
      prompts: [support]
      default: true
    - name: fallback
      provider: ollama
      model: llama3.2
prompts:
  - name: support
    messages:
      - role: system
        content: You are a support assistant.
rag:
  databases:
    - name: main_db
      type: chroma
      embedding_strategies:
        - name: default
          type: dense
          config:
            model: nomic-embed-text
      default_embedding_strategy: default
  data_processing_strategies:
    - name: ingest
      parsers:
        - type: markdown
          priority: 50
datasets:
  - name: docs
    database: main_db
    data_processing_strategy: ingest
"#;

    #[test]
    fn test_decode_resolved_project() {
        let value: JsonValue = serde_yaml::from_str(RESOLVED_PROJECT).unwrap();
        let project = ProjectConfig::from_value(value).unwrap();

        assert_eq!(project.version, "v1");
        assert_eq!(project.name, "support-bot");
        assert_eq!(project.runtime.models.len(), 2);
        assert_eq!(project.prompts.len(), 1);
        assert_eq!(project.datasets.len(), 1);
    }

    #[test]
    fn test_accessors() {
        let value: JsonValue = serde_yaml::from_str(RESOLVED_PROJECT).unwrap();
        let project = ProjectConfig::from_value(value).unwrap();

        assert_eq!(project.default_model().unwrap().name, "chat");
        assert_eq!(project.model("fallback").unwrap().model, "llama3.2");
        assert!(project.model("missing").is_none());
        assert!(project.prompt_set("support").is_some());
        assert_eq!(project.database("main_db").unwrap().kind, "chroma");
        assert!(project.processing_strategy("ingest").is_some());
        assert_eq!(project.dataset("docs").unwrap().database, "main_db");
    }

    #[test]
    fn test_missing_required_field_fails() {
        let value: JsonValue = serde_yaml::from_str("version: v1\nname: x\n").unwrap();
        let err = ProjectConfig::from_value(value).unwrap_err();
        assert!(err.to_string().contains("namespace"));
    }
}
