//! RAG configuration: databases, strategies, parsers

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::constants::resolution::DEFAULT_PARSER_PRIORITY;

/// The `rag` section of a resolved project
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RagConfig {
    #[serde(default)]
    pub databases: Vec<DatabaseConfig>,
    #[serde(default)]
    pub data_processing_strategies: Vec<ProcessingStrategyConfig>,
}

impl RagConfig {
    pub fn database(&self, name: &str) -> Option<&DatabaseConfig> {
        self.databases.iter().find(|d| d.name == name)
    }

    pub fn processing_strategy(&self, name: &str) -> Option<&ProcessingStrategyConfig> {
        self.data_processing_strategies
            .iter()
            .find(|s| s.name == name)
    }

    pub fn database_names(&self) -> Vec<&str> {
        self.databases.iter().map(|d| d.name.as_str()).collect()
    }
}

/// One vector database with its strategy composition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub name: String,
    /// Store backend identifier (e.g. "chroma", "qdrant")
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub embedding_strategies: Vec<StrategyConfig>,
    #[serde(default)]
    pub retrieval_strategies: Vec<StrategyConfig>,
    /// Name of the embedding strategy used when no explicit choice is given.
    /// After resolution this names an entry of `embedding_strategies`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_embedding_strategy: Option<String>,
    /// Retrieval counterpart of `default_embedding_strategy`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_retrieval_strategy: Option<String>,
    /// Backend-specific settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<JsonValue>,
}

impl DatabaseConfig {
    pub fn embedding_strategy(&self, name: &str) -> Option<&StrategyConfig> {
        self.embedding_strategies.iter().find(|s| s.name == name)
    }

    pub fn retrieval_strategy(&self, name: &str) -> Option<&StrategyConfig> {
        self.retrieval_strategies.iter().find(|s| s.name == name)
    }

    /// The designated default embedding strategy (falls back to a sole entry)
    pub fn default_embedding(&self) -> Option<&StrategyConfig> {
        if let Some(name) = &self.default_embedding_strategy {
            return self.embedding_strategy(name);
        }
        if self.embedding_strategies.len() == 1 {
            self.embedding_strategies.first()
        } else {
            None
        }
    }

    /// The designated default retrieval strategy (falls back to a sole entry)
    pub fn default_retrieval(&self) -> Option<&StrategyConfig> {
        if let Some(name) = &self.default_retrieval_strategy {
            return self.retrieval_strategy(name);
        }
        if self.retrieval_strategies.len() == 1 {
            self.retrieval_strategies.first()
        } else {
            None
        }
    }
}

/// A fully inlined embedding or retrieval strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u64>,
}

/// A named data processing strategy: an ordered parser pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingStrategyConfig {
    pub name: String,
    #[serde(default)]
    pub parsers: Vec<ParserConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<JsonValue>,
}

/// One parser in a processing strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Present when the parser came from the `components` section
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    /// Parsers run in ascending priority order
    #[serde(default = "default_parser_priority")]
    pub priority: u64,
    /// File extensions this parser claims
    #[serde(default)]
    pub file_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<JsonValue>,
}

fn default_parser_priority() -> u64 {
    DEFAULT_PARSER_PRIORITY
}
