//! YAML persistence for LlamaFarm project files
//!
//! Reads project configuration into plain `serde_json::Value` trees and
//! writes them back in block style. A formatting sidecar captured at read
//! time carries comments, blank-line positions, and scalar quote styles so a
//! rewrite reproduces the original layout for every path that still exists.
//! Writes go to a temp file in the destination directory and land via atomic
//! rename, so a failed write never corrupts the original.
//!
//! Validation and resolution always operate on the plain tree
//! (`ConfigDocument::value`), never on the sidecar.

pub mod comments;
pub mod document;
pub mod emitter;

pub use comments::{CommentMap, ScalarStyle};
pub use document::ConfigDocument;

use thiserror::Error;

/// I/O and decode failures for configuration files
#[derive(Error, Debug)]
pub enum ConfigIoError {
    #[error("Configuration file not found: {path}")]
    NotFound { path: String },

    #[error("Failed to read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Failed to parse {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("Failed to write {path}: {reason}")]
    Write { path: String, reason: String },
}
