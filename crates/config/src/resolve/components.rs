//! Component registry and defaults table read from a document's
//! `components` section

use std::collections::HashMap;

use serde_json::{Map, Value as JsonValue};

use llamafarm_core::component::ComponentKind;

/// Reusable component definitions, kind → name → definition.
///
/// Definitions stay untyped: a definition is usually a mapping of
/// configuration fields, but may also be a bare string aliasing another
/// component of the same kind.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    components: HashMap<ComponentKind, Map<String, JsonValue>>,
}

impl ComponentRegistry {
    pub fn from_document(document: &JsonValue) -> Self {
        let mut components = HashMap::new();
        if let Some(JsonValue::Object(section)) = document.get("components") {
            for kind in ComponentKind::ALL {
                if let Some(JsonValue::Object(definitions)) = section.get(kind.section()) {
                    components.insert(kind, definitions.clone());
                }
            }
        }
        Self { components }
    }

    pub fn get(&self, kind: ComponentKind, name: &str) -> Option<&JsonValue> {
        self.components.get(&kind).and_then(|defs| defs.get(name))
    }

    pub fn contains(&self, kind: ComponentKind, name: &str) -> bool {
        self.get(kind, name).is_some()
    }

    /// Registered names of a kind, in document order
    pub fn names(&self, kind: ComponentKind) -> Vec<&str> {
        self.components
            .get(&kind)
            .map(|defs| defs.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.components.values().all(Map::is_empty)
    }
}

/// Designated default component per kind, from `components.defaults`
#[derive(Debug, Clone, Default)]
pub struct DefaultsTable {
    defaults: HashMap<ComponentKind, String>,
}

impl DefaultsTable {
    pub fn from_document(document: &JsonValue) -> Self {
        let mut defaults = HashMap::new();
        let table = document
            .get("components")
            .and_then(|c| c.get("defaults"))
            .and_then(JsonValue::as_object);
        if let Some(table) = table {
            for (section, value) in table {
                let (Some(kind), Some(name)) =
                    (ComponentKind::from_section(section), value.as_str())
                else {
                    continue;
                };
                defaults.insert(kind, name.to_string());
            }
        }
        Self { defaults }
    }

    pub fn get(&self, kind: ComponentKind) -> Option<&str> {
        self.defaults.get(&kind).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.defaults.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document() -> JsonValue {
        json!({
            "components": {
                "embedding_strategies": {
                    "default_embeddings": {"type": "sentence_transformer"},
                    "fast_embeddings": {"type": "hash"}
                },
                "parsers": {
                    "markdown": {"type": "markdown", "priority": 10}
                },
                "defaults": {
                    "embedding_strategies": "default_embeddings"
                }
            }
        })
    }

    #[test]
    fn test_registry_lookup() {
        let registry = ComponentRegistry::from_document(&document());
        assert!(registry.contains(ComponentKind::EmbeddingStrategy, "default_embeddings"));
        assert!(registry.contains(ComponentKind::Parser, "markdown"));
        assert!(!registry.contains(ComponentKind::RetrievalStrategy, "default_embeddings"));
        assert_eq!(
            registry
                .get(ComponentKind::Parser, "markdown")
                .and_then(|d| d.get("priority"))
                .and_then(JsonValue::as_u64),
            Some(10)
        );
    }

    #[test]
    fn test_registry_names_in_document_order() {
        let registry = ComponentRegistry::from_document(&document());
        assert_eq!(
            registry.names(ComponentKind::EmbeddingStrategy),
            vec!["default_embeddings", "fast_embeddings"]
        );
        assert!(registry.names(ComponentKind::RetrievalStrategy).is_empty());
    }

    #[test]
    fn test_defaults_table() {
        let defaults = DefaultsTable::from_document(&document());
        assert_eq!(
            defaults.get(ComponentKind::EmbeddingStrategy),
            Some("default_embeddings")
        );
        assert_eq!(defaults.get(ComponentKind::Parser), None);
    }

    #[test]
    fn test_missing_components_section() {
        let doc = json!({"version": "v1"});
        assert!(ComponentRegistry::from_document(&doc).is_empty());
        assert!(DefaultsTable::from_document(&doc).is_empty());
    }
}
