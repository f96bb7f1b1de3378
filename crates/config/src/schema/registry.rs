//! Schema lifecycle: load once, compile once, reload on demand

use std::path::{Path, PathBuf};

use jsonschema::{Draft, JSONSchema};
use serde_json::Value as JsonValue;
use tracing::{info, warn};

use super::loader::{self, SchemaIntegrityError};

/// A dereferenced schema tree together with its compiled validator
#[derive(Debug)]
pub struct CompiledSchema {
    tree: JsonValue,
    validator: JSONSchema,
}

impl CompiledSchema {
    /// Compile an in-memory tree; the tree must already be dereferenced
    pub fn from_tree(tree: JsonValue) -> Result<Self, SchemaIntegrityError> {
        let validator = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&tree)
            .map_err(|e| SchemaIntegrityError::Compile(e.to_string()))?;
        Ok(Self { tree, validator })
    }

    pub fn tree(&self) -> &JsonValue {
        &self.tree
    }

    pub fn validator(&self) -> &JSONSchema {
        &self.validator
    }
}

/// Owns the schema path and the compiled schema derived from it.
///
/// Explicit lifecycle object, never a global: every loader instance holds
/// its own registry, and reloads are a caller decision.
#[derive(Debug)]
pub struct SchemaRegistry {
    path: PathBuf,
    compiled: Option<CompiledSchema>,
}

impl SchemaRegistry {
    /// Load, dereference, and compile the schema at `path`
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SchemaIntegrityError> {
        let path = path.into();
        let compiled = CompiledSchema::from_tree(loader::load_schema(&path)?)?;
        info!(path = %path.display(), "schema registry opened");
        Ok(Self {
            path,
            compiled: Some(compiled),
        })
    }

    /// Re-run load + compile. On failure the cached schema is dropped and
    /// every subsequent `schema()` call fails with `Unavailable`; the
    /// registry never validates against a stale or partial schema.
    pub fn reload(&mut self) -> Result<(), SchemaIntegrityError> {
        self.compiled = None;
        match loader::load_schema(&self.path).and_then(CompiledSchema::from_tree) {
            Ok(compiled) => {
                self.compiled = Some(compiled);
                info!(path = %self.path.display(), "schema registry reloaded");
                Ok(())
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "schema reload failed; registry unavailable");
                Err(e)
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn schema(&self) -> Result<&CompiledSchema, SchemaIntegrityError> {
        self.compiled
            .as_ref()
            .ok_or(SchemaIntegrityError::Unavailable)
    }
}
