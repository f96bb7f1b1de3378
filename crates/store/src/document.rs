//! Configuration document with formatting preserved across a round trip

use std::fs;
use std::io::Write;
use std::path::Path;

use serde_json::Value as JsonValue;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::comments::{self, CommentMap};
use crate::emitter;
use crate::ConfigIoError;

/// A parsed YAML document plus the formatting sidecar of its source text.
///
/// The value tree is plain `serde_json::Value` data, which is what the
/// validation and resolution layers consume. The sidecar never influences
/// the value tree; it only shapes the text written back out.
#[derive(Debug, Clone)]
pub struct ConfigDocument {
    value: JsonValue,
    sidecar: CommentMap,
}

impl ConfigDocument {
    /// Read and parse a YAML file, capturing its formatting
    pub fn read(path: &Path) -> Result<Self, ConfigIoError> {
        let text = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigIoError::NotFound {
                    path: path.display().to_string(),
                }
            } else {
                ConfigIoError::Read {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                }
            }
        })?;
        let doc = Self::parse(&text).map_err(|e| match e {
            ConfigIoError::Parse { reason, .. } => ConfigIoError::Parse {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })?;
        debug!(path = %path.display(), "read configuration document");
        Ok(doc)
    }

    /// Parse YAML text held in memory.
    ///
    /// Parsing goes through `serde_yaml::Value` first so duplicate mapping
    /// keys are rejected instead of silently overwriting each other, then
    /// converts to a JSON tree with key order intact.
    pub fn parse(text: &str) -> Result<Self, ConfigIoError> {
        let parse_err = |reason: String| ConfigIoError::Parse {
            path: "<memory>".to_string(),
            reason,
        };
        let tree: serde_yaml::Value =
            serde_yaml::from_str(text).map_err(|e| parse_err(e.to_string()))?;
        let value: JsonValue =
            serde_json::to_value(&tree).map_err(|e| parse_err(e.to_string()))?;
        Ok(Self {
            value,
            sidecar: comments::scan(text),
        })
    }

    /// Wrap an already-built value tree; emits in default style
    pub fn from_value(value: JsonValue) -> Self {
        Self {
            value,
            sidecar: CommentMap::default(),
        }
    }

    pub fn value(&self) -> &JsonValue {
        &self.value
    }

    pub fn into_value(self) -> JsonValue {
        self.value
    }

    /// Replace the value tree, keeping the sidecar for surviving paths
    pub fn set_value(&mut self, value: JsonValue) {
        self.value = value;
    }

    pub fn comments(&self) -> &CommentMap {
        &self.sidecar
    }

    /// Render to YAML text with the sidecar applied
    pub fn to_yaml(&self) -> String {
        emitter::emit(&self.value, &self.sidecar)
    }

    /// Write the document to disk. The text lands in a temporary file in
    /// the target directory first and is renamed into place, so a crash
    /// mid-write never leaves a truncated configuration behind.
    pub fn write(&self, path: &Path) -> Result<(), ConfigIoError> {
        let text = self.to_yaml();
        let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
        let mut tmp = NamedTempFile::new_in(dir.unwrap_or_else(|| Path::new(".")))
            .map_err(|e| ConfigIoError::Write {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        tmp.write_all(text.as_bytes())
            .and_then(|_| tmp.flush())
            .map_err(|e| ConfigIoError::Write {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        tmp.persist(path).map_err(|e| ConfigIoError::Write {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        info!(path = %path.display(), bytes = text.len(), "wrote configuration document");
        Ok(())
    }
}
