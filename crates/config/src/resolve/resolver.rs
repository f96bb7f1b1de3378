//! Reference expansion and default filling
//!
//! Turns a validated document into its canonical resolved form: every
//! bare-name component reference becomes a full inline definition, omitted
//! defaults are filled in, and the legacy flat runtime is rewritten to the
//! models list. The transform is pure and idempotent; resolving an already
//! resolved document reproduces it byte for byte.

use std::collections::HashSet;

use serde_json::{Map, Value as JsonValue};
use thiserror::Error;
use tracing::debug;

use llamafarm_core::component::ComponentKind;
use llamafarm_core::constants::resolution::DEFAULT_PARSER_PRIORITY;

use crate::shape;

use super::{ComponentRegistry, DefaultsTable};

/// Internal guard errors. Validation rejects dangling references before
/// resolution runs, so these surface only on misuse of the API or an alias
/// chain the validator cannot see.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Unknown {kind} component '{name}' during resolution")]
    UnknownComponent { kind: ComponentKind, name: String },

    #[error("Component alias cycle involving {kind} '{name}'")]
    Cycle { kind: ComponentKind, name: String },
}

/// Resolve a validated document into its fully-inlined form.
///
/// The caller guarantees the document passed both validators; the facade
/// enforces that ordering.
pub fn resolve(
    document: &JsonValue,
    registry: &ComponentRegistry,
    defaults: &DefaultsTable,
) -> Result<JsonValue, ResolveError> {
    let mut resolved = document.clone();
    let JsonValue::Object(root) = &mut resolved else {
        return Ok(resolved);
    };
    if let Some(runtime) = root.get_mut("runtime") {
        normalize_runtime(runtime);
    }
    if let Some(rag) = root.get_mut("rag") {
        resolve_rag(rag, registry, defaults)?;
    }
    Ok(resolved)
}

/// Rewrite the legacy flat `provider` + `model` runtime into the canonical
/// models list: one model named `default`, flagged as the default.
fn normalize_runtime(runtime: &mut JsonValue) {
    let JsonValue::Object(obj) = runtime else {
        return;
    };
    if obj.contains_key("models") {
        return;
    }
    let provider = obj.get("provider").cloned();
    let model = obj.get("model").cloned();
    if provider.is_none() && model.is_none() {
        return;
    }

    let mut entry = Map::new();
    entry.insert("name".to_string(), JsonValue::String("default".to_string()));
    if let Some(provider) = provider {
        entry.insert("provider".to_string(), provider);
    }
    if let Some(model) = model {
        entry.insert("model".to_string(), model);
    }
    entry.insert("default".to_string(), JsonValue::Bool(true));

    // Rebuild instead of removing in place: Map::remove swaps from the end
    // and would scramble key order.
    let mut rebuilt = Map::new();
    for (key, value) in obj.iter() {
        if key == "provider" || key == "model" {
            continue;
        }
        rebuilt.insert(key.clone(), value.clone());
    }
    rebuilt.insert(
        "models".to_string(),
        JsonValue::Array(vec![JsonValue::Object(entry)]),
    );
    *obj = rebuilt;
    debug!("normalized legacy runtime into models list");
}

fn resolve_rag(
    rag: &mut JsonValue,
    registry: &ComponentRegistry,
    defaults: &DefaultsTable,
) -> Result<(), ResolveError> {
    let JsonValue::Object(obj) = rag else {
        return Ok(());
    };
    if let Some(JsonValue::Array(databases)) = obj.get_mut("databases") {
        for database in databases {
            resolve_database(database, registry, defaults)?;
        }
    }
    if let Some(JsonValue::Array(strategies)) = obj.get_mut("data_processing_strategies") {
        for strategy in strategies {
            resolve_processing_strategy(strategy, registry, defaults)?;
        }
    }
    Ok(())
}

fn resolve_database(
    database: &mut JsonValue,
    registry: &ComponentRegistry,
    defaults: &DefaultsTable,
) -> Result<(), ResolveError> {
    let JsonValue::Object(obj) = database else {
        return Ok(());
    };
    for (kind, default_key) in [
        (
            ComponentKind::EmbeddingStrategy,
            "default_embedding_strategy",
        ),
        (
            ComponentKind::RetrievalStrategy,
            "default_retrieval_strategy",
        ),
    ] {
        resolve_component_list(obj, kind, registry, defaults)?;
        fill_default_strategy(obj, kind, default_key, defaults);
    }
    Ok(())
}

fn resolve_processing_strategy(
    strategy: &mut JsonValue,
    registry: &ComponentRegistry,
    defaults: &DefaultsTable,
) -> Result<(), ResolveError> {
    let JsonValue::Object(obj) = strategy else {
        return Ok(());
    };
    resolve_component_list(obj, ComponentKind::Parser, registry, defaults)
}

/// Expand every entry of a component list in place. A missing list with a
/// defaults-table entry receives the designated component as its sole entry.
fn resolve_component_list(
    owner: &mut Map<String, JsonValue>,
    kind: ComponentKind,
    registry: &ComponentRegistry,
    defaults: &DefaultsTable,
) -> Result<(), ResolveError> {
    let list_key = kind.section();
    if !owner.contains_key(list_key) {
        let Some(default_name) = defaults.get(kind) else {
            return Ok(());
        };
        let mut visited = HashSet::new();
        let inlined = expand_reference(kind, default_name, None, registry, &mut visited)?;
        owner.insert(
            list_key.to_string(),
            JsonValue::Array(vec![inlined]),
        );
        return Ok(());
    }
    if let Some(JsonValue::Array(entries)) = owner.get_mut(list_key) {
        for entry in entries {
            resolve_entry(entry, kind, registry)?;
        }
    }
    Ok(())
}

/// One list entry: a bare string is always a reference; a mapping whose
/// `name` matches a registered component is a reference with local
/// overrides; anything else is an inline definition.
fn resolve_entry(
    entry: &mut JsonValue,
    kind: ComponentKind,
    registry: &ComponentRegistry,
) -> Result<(), ResolveError> {
    let mut visited = HashSet::new();
    match entry {
        JsonValue::String(name) => {
            let expanded = expand_reference(kind, name, None, registry, &mut visited)?;
            *entry = expanded;
        }
        JsonValue::Object(local) => {
            let reference = local
                .get("name")
                .and_then(JsonValue::as_str)
                .filter(|name| registry.contains(kind, name))
                .map(str::to_string);
            match reference {
                Some(name) => {
                    let expanded =
                        expand_reference(kind, &name, Some(local), registry, &mut visited)?;
                    *entry = expanded;
                }
                None => apply_inline_defaults(local, kind),
            }
        }
        _ => {}
    }
    Ok(())
}

/// Deep-copy a registry definition under the referenced name, merged with
/// local overrides (local wins) at the top level only: a local `config`
/// replaces the component's `config` wholesale.
///
/// The merged object is built name-first so repeated resolution yields the
/// same key order. String definitions alias another component of the same
/// kind; the visited set bounds alias chains.
fn expand_reference(
    kind: ComponentKind,
    name: &str,
    local: Option<&Map<String, JsonValue>>,
    registry: &ComponentRegistry,
    visited: &mut HashSet<(ComponentKind, String)>,
) -> Result<JsonValue, ResolveError> {
    if !visited.insert((kind, name.to_string())) {
        return Err(ResolveError::Cycle {
            kind,
            name: name.to_string(),
        });
    }
    let Some(definition) = registry.get(kind, name) else {
        return Err(ResolveError::UnknownComponent {
            kind,
            name: name.to_string(),
        });
    };
    debug!(component = name, kind = %kind, "expanding component reference");

    let base = match definition {
        JsonValue::Object(fields) => fields.clone(),
        JsonValue::String(alias) => {
            let alias = alias.clone();
            match expand_reference(kind, &alias, None, registry, visited)? {
                JsonValue::Object(fields) => fields,
                _ => Map::new(),
            }
        }
        _ => Map::new(),
    };

    let mut merged = Map::new();
    merged.insert("name".to_string(), JsonValue::String(name.to_string()));
    for (key, value) in &base {
        if key == "name" {
            continue;
        }
        merged.insert(key.clone(), value.clone());
    }
    if let Some(local) = local {
        for (key, value) in local {
            if key == "name" {
                continue;
            }
            merged.insert(key.clone(), value.clone());
        }
    }
    apply_inline_defaults(&mut merged, kind);
    Ok(JsonValue::Object(merged))
}

/// Sub-field defaults for definitions that end up inline in the output
fn apply_inline_defaults(fields: &mut Map<String, JsonValue>, kind: ComponentKind) {
    if kind == ComponentKind::Parser && !fields.contains_key("priority") {
        fields.insert(
            "priority".to_string(),
            JsonValue::from(DEFAULT_PARSER_PRIORITY),
        );
    }
}

/// Fill an omitted designated default: the sole entry's name, else the
/// defaults-table name when it is a member of the list.
fn fill_default_strategy(
    owner: &mut Map<String, JsonValue>,
    kind: ComponentKind,
    default_key: &str,
    defaults: &DefaultsTable,
) {
    if owner.contains_key(default_key) {
        return;
    }
    let names: Vec<String> = owner
        .get(kind.section())
        .and_then(JsonValue::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(shape::entry_name)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let chosen = if names.len() == 1 {
        Some(names[0].clone())
    } else {
        defaults
            .get(kind)
            .filter(|name| names.iter().any(|n| n == name))
            .map(str::to_string)
    };
    if let Some(name) = chosen {
        owner.insert(default_key.to_string(), JsonValue::String(name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolve_doc(document: &JsonValue) -> JsonValue {
        let registry = ComponentRegistry::from_document(document);
        let defaults = DefaultsTable::from_document(document);
        resolve(document, &registry, &defaults).unwrap()
    }

    #[test]
    fn test_bare_reference_expanded() {
        let doc = json!({
            "components": {
                "embedding_strategies": {
                    "default_embeddings": {"type": "sentence_transformer", "config": {"model": "x"}}
                }
            },
            "rag": {
                "databases": [{
                    "name": "main_db", "type": "chroma",
                    "embedding_strategies": ["default_embeddings"]
                }]
            }
        });
        let resolved = resolve_doc(&doc);
        let entry = &resolved["rag"]["databases"][0]["embedding_strategies"][0];
        assert_eq!(entry["name"], "default_embeddings");
        assert_eq!(entry["type"], "sentence_transformer");
        assert_eq!(entry["config"]["model"], "x");
    }

    #[test]
    fn test_local_overrides_win_shallow() {
        let doc = json!({
            "components": {
                "embedding_strategies": {
                    "default_embeddings": {
                        "type": "sentence_transformer",
                        "config": {"model": "x", "batch": 8}
                    }
                }
            },
            "rag": {
                "databases": [{
                    "name": "main_db", "type": "chroma",
                    "embedding_strategies": [{
                        "name": "default_embeddings",
                        "priority": 5,
                        "config": {"model": "y"}
                    }]
                }]
            }
        });
        let resolved = resolve_doc(&doc);
        let entry = &resolved["rag"]["databases"][0]["embedding_strategies"][0];
        assert_eq!(entry["type"], "sentence_transformer");
        assert_eq!(entry["priority"], 5);
        // Shallow merge: the local config replaces the whole object
        assert_eq!(entry["config"], json!({"model": "y"}));
    }

    #[test]
    fn test_no_name_only_references_remain() {
        let doc = json!({
            "components": {
                "embedding_strategies": {"e": {"type": "a"}},
                "retrieval_strategies": {"r": {"type": "b"}},
                "parsers": {"p": {"type": "c"}}
            },
            "rag": {
                "databases": [{
                    "name": "db", "type": "chroma",
                    "embedding_strategies": ["e"],
                    "retrieval_strategies": ["r"]
                }],
                "data_processing_strategies": [{"name": "s", "parsers": ["p"]}]
            }
        });
        let resolved = resolve_doc(&doc);
        let db = &resolved["rag"]["databases"][0];
        assert!(db["embedding_strategies"][0].is_object());
        assert!(db["retrieval_strategies"][0].is_object());
        assert!(resolved["rag"]["data_processing_strategies"][0]["parsers"][0].is_object());
    }

    #[test]
    fn test_inline_definition_passes_through() {
        let doc = json!({
            "rag": {
                "data_processing_strategies": [{
                    "name": "custom",
                    "parsers": [{"name": "mine", "type": "text"}]
                }]
            }
        });
        let resolved = resolve_doc(&doc);
        let parser = &resolved["rag"]["data_processing_strategies"][0]["parsers"][0];
        assert_eq!(parser["name"], "mine");
        assert_eq!(parser["type"], "text");
        assert_eq!(parser["priority"], 50);
    }

    #[test]
    fn test_missing_list_filled_from_defaults_table() {
        let doc = json!({
            "components": {
                "embedding_strategies": {"default_embeddings": {"type": "st"}},
                "defaults": {"embedding_strategies": "default_embeddings"}
            },
            "rag": {
                "databases": [{"name": "db", "type": "chroma"}]
            }
        });
        let resolved = resolve_doc(&doc);
        let db = &resolved["rag"]["databases"][0];
        assert_eq!(db["embedding_strategies"][0]["name"], "default_embeddings");
        assert_eq!(db["default_embedding_strategy"], "default_embeddings");
    }

    #[test]
    fn test_sole_entry_fills_default_name() {
        let doc = json!({
            "rag": {
                "databases": [{
                    "name": "db", "type": "chroma",
                    "retrieval_strategies": [{"name": "basic", "type": "similarity"}]
                }]
            }
        });
        let resolved = resolve_doc(&doc);
        assert_eq!(
            resolved["rag"]["databases"][0]["default_retrieval_strategy"],
            "basic"
        );
    }

    #[test]
    fn test_legacy_runtime_normalized() {
        let doc = json!({
            "version": "v1", "name": "p", "namespace": "n",
            "runtime": {"provider": "ollama", "model": "llama3.2"}
        });
        let resolved = resolve_doc(&doc);
        assert_eq!(
            resolved["runtime"],
            json!({
                "models": [{
                    "name": "default",
                    "provider": "ollama",
                    "model": "llama3.2",
                    "default": true
                }]
            })
        );
    }

    #[test]
    fn test_canonical_runtime_untouched() {
        let doc = json!({
            "runtime": {
                "default_model": "chat",
                "models": [{"name": "chat", "provider": "ollama", "model": "llama3.2"}]
            }
        });
        let resolved = resolve_doc(&doc);
        assert_eq!(resolved["runtime"], doc["runtime"]);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let doc = json!({
            "version": "v1", "name": "p", "namespace": "n",
            "runtime": {"provider": "ollama", "model": "llama3.2"},
            "components": {
                "embedding_strategies": {
                    "default_embeddings": {"type": "st", "config": {"model": "x"}}
                },
                "parsers": {"markdown": {"type": "markdown"}},
                "defaults": {"embedding_strategies": "default_embeddings"}
            },
            "rag": {
                "databases": [{
                    "name": "db", "type": "chroma",
                    "embedding_strategies": [
                        {"name": "default_embeddings", "priority": 5}
                    ]
                }],
                "data_processing_strategies": [{"name": "s", "parsers": ["markdown"]}]
            }
        });
        let registry = ComponentRegistry::from_document(&doc);
        let defaults = DefaultsTable::from_document(&doc);
        let once = resolve(&doc, &registry, &defaults).unwrap();
        let registry_again = ComponentRegistry::from_document(&once);
        let defaults_again = DefaultsTable::from_document(&once);
        let twice = resolve(&once, &registry_again, &defaults_again).unwrap();
        assert_eq!(
            serde_json::to_string(&once).unwrap(),
            serde_json::to_string(&twice).unwrap()
        );
    }

    #[test]
    fn test_alias_definition_expands_to_target() {
        let doc = json!({
            "components": {
                "embedding_strategies": {
                    "default_embeddings": {"type": "st", "config": {"model": "x"}},
                    "fast": "default_embeddings"
                }
            },
            "rag": {
                "databases": [{
                    "name": "db", "type": "chroma",
                    "embedding_strategies": ["fast"]
                }]
            }
        });
        let resolved = resolve_doc(&doc);
        let entry = &resolved["rag"]["databases"][0]["embedding_strategies"][0];
        assert_eq!(entry["name"], "fast");
        assert_eq!(entry["type"], "st");
    }

    #[test]
    fn test_alias_cycle_is_an_error() {
        let doc = json!({
            "components": {
                "embedding_strategies": {"a": "b", "b": "a"}
            },
            "rag": {
                "databases": [{"name": "db", "type": "chroma", "embedding_strategies": ["a"]}]
            }
        });
        let registry = ComponentRegistry::from_document(&doc);
        let defaults = DefaultsTable::from_document(&doc);
        let err = resolve(&doc, &registry, &defaults).unwrap_err();
        assert!(matches!(err, ResolveError::Cycle { .. }));
    }

    #[test]
    fn test_unknown_reference_is_guarded() {
        let doc = json!({
            "rag": {
                "databases": [{"name": "db", "type": "chroma", "embedding_strategies": ["ghost"]}]
            }
        });
        let registry = ComponentRegistry::from_document(&doc);
        let defaults = DefaultsTable::from_document(&doc);
        let err = resolve(&doc, &registry, &defaults).unwrap_err();
        assert!(matches!(err, ResolveError::UnknownComponent { .. }));
    }

    #[test]
    fn test_datasets_keep_relational_names() {
        let doc = json!({
            "rag": {
                "databases": [{
                    "name": "db", "type": "chroma",
                    "embedding_strategies": [{"name": "e", "type": "st"}]
                }],
                "data_processing_strategies": [{"name": "s", "parsers": []}]
            },
            "datasets": [{"name": "docs", "database": "db", "data_processing_strategy": "s"}]
        });
        let resolved = resolve_doc(&doc);
        assert_eq!(resolved["datasets"][0]["database"], "db");
        assert_eq!(resolved["datasets"][0]["data_processing_strategy"], "s");
    }
}
