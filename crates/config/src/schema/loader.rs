//! Schema loading with full `$ref` dereferencing
//!
//! The project schema ships as YAML draft-07 split across files. Loading
//! parses the root file and recursively replaces every `$ref`, same-file
//! (`#/definitions/x`) and cross-file (`components.yaml#/definitions/y`,
//! resolved relative to the referencing file), with the referenced
//! subschema, so validation never performs reference lookups. Referenced
//! files are parsed once per load call.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value as JsonValue};
use thiserror::Error;
use tracing::debug;

use llamafarm_core::constants::schema::MIN_SCHEMA_BYTES;

#[derive(Error, Debug)]
pub enum SchemaIntegrityError {
    #[error("Failed to read schema file {path}: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("Failed to parse schema file {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("Dangling schema reference '{reference}' in {file}")]
    DanglingRef { reference: String, file: String },

    #[error("Circular schema reference involving '{reference}'")]
    CircularRef { reference: String },

    #[error("Schema document is empty")]
    EmptyDocument,

    #[error("Schema root declares neither type nor properties")]
    MissingShape,

    #[error("Schema serializes to {bytes} bytes; this looks like truncated generator output")]
    Truncated { bytes: usize },

    #[error("Schema failed to compile: {0}")]
    Compile(String),

    #[error("No usable schema loaded; reload the registry after fixing the schema file")]
    Unavailable,
}

/// Load and fully dereference a schema file.
///
/// The returned tree contains no `$ref` anywhere, and `$schema`/`$id`
/// survive only at the document root. Pure: file caching lives inside the
/// call, lifecycle caching belongs to the registry.
pub fn load_schema(path: &Path) -> Result<JsonValue, SchemaIntegrityError> {
    let file = fs::canonicalize(path).map_err(|e| SchemaIntegrityError::Unreadable {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let mut walker = Dereferencer::default();
    let document = walker.document(&file)?;
    let tree = walker.dereference(&document, &file, true)?;
    verify_integrity(&tree)?;
    debug!(path = %path.display(), "schema loaded and dereferenced");
    Ok(tree)
}

/// Ordered integrity checks on the dereferenced result
fn verify_integrity(tree: &JsonValue) -> Result<(), SchemaIntegrityError> {
    if tree.is_null() {
        return Err(SchemaIntegrityError::EmptyDocument);
    }
    if tree.get("type").is_none() && tree.get("properties").is_none() {
        return Err(SchemaIntegrityError::MissingShape);
    }
    let bytes = tree.to_string().len();
    if bytes < MIN_SCHEMA_BYTES {
        return Err(SchemaIntegrityError::Truncated { bytes });
    }
    Ok(())
}

#[derive(Default)]
struct Dereferencer {
    /// Parsed file documents, one parse per file per load call
    cache: HashMap<PathBuf, JsonValue>,
    /// (file, pointer) pairs currently being expanded; re-entry is a cycle
    in_progress: HashSet<(PathBuf, String)>,
}

impl Dereferencer {
    fn document(&mut self, file: &Path) -> Result<JsonValue, SchemaIntegrityError> {
        if let Some(document) = self.cache.get(file) {
            return Ok(document.clone());
        }
        let text = fs::read_to_string(file).map_err(|e| SchemaIntegrityError::Unreadable {
            path: file.display().to_string(),
            reason: e.to_string(),
        })?;
        let document: JsonValue =
            serde_yaml::from_str(&text).map_err(|e| SchemaIntegrityError::Parse {
                path: file.display().to_string(),
                reason: e.to_string(),
            })?;
        self.cache.insert(file.to_path_buf(), document.clone());
        Ok(document)
    }

    /// Rebuild a node with every `$ref` expanded. Maps are rebuilt rather
    /// than edited in place: removing keys from an order-preserving map
    /// swaps from the end and would scramble sibling order.
    fn dereference(
        &mut self,
        node: &JsonValue,
        file: &Path,
        is_root: bool,
    ) -> Result<JsonValue, SchemaIntegrityError> {
        match node {
            JsonValue::Object(obj) => {
                if let Some(JsonValue::String(reference)) = obj.get("$ref") {
                    // Draft-07: siblings of $ref are ignored, the node is
                    // replaced wholesale.
                    return self.expand(reference, file);
                }
                let mut rebuilt = Map::new();
                for (key, value) in obj {
                    if !is_root && (key == "$schema" || key == "$id") {
                        continue;
                    }
                    rebuilt.insert(key.clone(), self.dereference(value, file, false)?);
                }
                Ok(JsonValue::Object(rebuilt))
            }
            JsonValue::Array(items) => {
                let mut rebuilt = Vec::with_capacity(items.len());
                for item in items {
                    rebuilt.push(self.dereference(item, file, false)?);
                }
                Ok(JsonValue::Array(rebuilt))
            }
            other => Ok(other.clone()),
        }
    }

    fn expand(
        &mut self,
        reference: &str,
        file: &Path,
    ) -> Result<JsonValue, SchemaIntegrityError> {
        let (relative, pointer) = match reference.split_once('#') {
            Some((relative, pointer)) => (relative, pointer),
            None => (reference, ""),
        };
        let target_file = if relative.is_empty() {
            file.to_path_buf()
        } else {
            let base = file.parent().unwrap_or_else(|| Path::new("."));
            fs::canonicalize(base.join(relative)).map_err(|_| {
                SchemaIntegrityError::DanglingRef {
                    reference: reference.to_string(),
                    file: file.display().to_string(),
                }
            })?
        };

        let key = (target_file.clone(), pointer.to_string());
        if !self.in_progress.insert(key.clone()) {
            return Err(SchemaIntegrityError::CircularRef {
                reference: reference.to_string(),
            });
        }

        let document = self.document(&target_file)?;
        let target = if pointer.is_empty() {
            document
        } else {
            document
                .pointer(pointer)
                .cloned()
                .ok_or_else(|| SchemaIntegrityError::DanglingRef {
                    reference: reference.to_string(),
                    file: file.display().to_string(),
                })?
        };
        let expanded = self.dereference(&target, &target_file, false)?;
        self.in_progress.remove(&key);
        Ok(expanded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_same_file_refs_are_inlined() {
        let dir = tempdir().unwrap();
        let path = write(
            dir.path(),
            "schema.yaml",
            r##"
$schema: "http://json-schema.org/draft-07/schema#"
$id: "test/schema"
type: object
properties:
  first:
    $ref: "#/definitions/named"
  second:
    $ref: "#/definitions/named"
definitions:
  named:
    type: object
    properties:
      name:
        type: string
"##,
        );
        let tree = load_schema(&path).unwrap();
        assert!(tree.to_string().find("$ref").is_none());
        // Diamond reuse: the target is inlined twice
        assert_eq!(
            tree["properties"]["first"]["properties"]["name"]["type"],
            "string"
        );
        assert_eq!(
            tree["properties"]["second"]["properties"]["name"]["type"],
            "string"
        );
        // Root keeps its metadata
        assert!(tree.get("$schema").is_some());
        assert!(tree.get("$id").is_some());
    }

    #[test]
    fn test_cross_file_refs_resolve_relative_to_referencing_file() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "components.yaml",
            r##"
$schema: "http://json-schema.org/draft-07/schema#"
$id: "test/components"
definitions:
  part:
    $id: "test/components/part"
    type: object
    properties:
      kind:
        $ref: "#/definitions/kind"
  kind:
    type: string
"##,
        );
        let path = write(
            dir.path(),
            "root.yaml",
            r#"
$schema: "http://json-schema.org/draft-07/schema#"
type: object
properties:
  part:
    $ref: "components.yaml#/definitions/part"
"#,
        );
        let tree = load_schema(&path).unwrap();
        assert_eq!(tree["properties"]["part"]["properties"]["kind"]["type"], "string");
        // Expanded subschemas shed their $schema/$id
        assert!(tree["properties"]["part"].get("$id").is_none());
        assert!(tree["properties"]["part"].get("$schema").is_none());
    }

    #[test]
    fn test_dangling_pointer() {
        let dir = tempdir().unwrap();
        let path = write(
            dir.path(),
            "schema.yaml",
            "type: object\nproperties:\n  a:\n    $ref: \"#/definitions/missing\"\n",
        );
        let err = load_schema(&path).unwrap_err();
        match err {
            SchemaIntegrityError::DanglingRef { reference, .. } => {
                assert_eq!(reference, "#/definitions/missing");
            }
            other => panic!("expected DanglingRef, got {other:?}"),
        }
    }

    #[test]
    fn test_dangling_file() {
        let dir = tempdir().unwrap();
        let path = write(
            dir.path(),
            "schema.yaml",
            "type: object\nproperties:\n  a:\n    $ref: \"absent.yaml#/definitions/x\"\n",
        );
        let err = load_schema(&path).unwrap_err();
        assert!(matches!(err, SchemaIntegrityError::DanglingRef { .. }));
    }

    #[test]
    fn test_reference_cycle_detected() {
        let dir = tempdir().unwrap();
        let path = write(
            dir.path(),
            "schema.yaml",
            r##"
type: object
properties:
  node:
    $ref: "#/definitions/a"
definitions:
  a:
    properties:
      next:
        $ref: "#/definitions/b"
  b:
    properties:
      back:
        $ref: "#/definitions/a"
"##,
        );
        let err = load_schema(&path).unwrap_err();
        assert!(matches!(err, SchemaIntegrityError::CircularRef { .. }));
    }

    #[test]
    fn test_empty_document_rejected() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "schema.yaml", "");
        let err = load_schema(&path).unwrap_err();
        assert!(matches!(err, SchemaIntegrityError::EmptyDocument));
    }

    #[test]
    fn test_shapeless_root_rejected() {
        let dir = tempdir().unwrap();
        let path = write(
            dir.path(),
            "schema.yaml",
            "$schema: \"http://json-schema.org/draft-07/schema#\"\ntitle: nothing here\ndescription: no structure at all\n",
        );
        let err = load_schema(&path).unwrap_err();
        assert!(matches!(err, SchemaIntegrityError::MissingShape));
    }

    #[test]
    fn test_tiny_schema_rejected_as_truncated() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "schema.yaml", "type: object\n");
        let err = load_schema(&path).unwrap_err();
        assert!(matches!(err, SchemaIntegrityError::Truncated { .. }));
    }

    #[test]
    fn test_missing_root_file() {
        let dir = tempdir().unwrap();
        let err = load_schema(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, SchemaIntegrityError::Unreadable { .. }));
    }

    #[test]
    fn test_pointer_escapes_honored() {
        let dir = tempdir().unwrap();
        let path = write(
            dir.path(),
            "schema.yaml",
            r##"
type: object
properties:
  odd:
    $ref: "#/definitions/a~1b"
definitions:
  a/b:
    type: string
    minLength: 1
    description: key with a slash in it
"##,
        );
        let tree = load_schema(&path).unwrap();
        assert_eq!(tree["properties"]["odd"]["type"], "string");
    }
}
