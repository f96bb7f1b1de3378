//! Dataset model

use serde::{Deserialize, Serialize};

/// A dataset wired into the RAG pipeline. `database` and
/// `data_processing_strategy` are relational name keys validated against the
/// `rag` section; they stay references after resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub name: String,
    /// Target database, by name
    pub database: String,
    /// Processing strategy applied at ingest, by name
    pub data_processing_strategy: String,
    /// Where the raw data comes from (path, URL, bucket, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Explicit file list, when `source` is not a directory
    #[serde(default)]
    pub files: Vec<String>,
}
