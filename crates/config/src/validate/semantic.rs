//! Cross-reference validation of a project document
//!
//! Runs on the plain pre-resolution tree, after (or independently of)
//! structural validation. Every check runs on every call so a single pass
//! surfaces every problem; nothing short-circuits. Messages always name the
//! offending entity, what it references, and the valid alternatives.

use std::collections::HashSet;

use serde_json::Value as JsonValue;

use llamafarm_core::component::ComponentKind;
use llamafarm_core::path;

use crate::resolve::{ComponentRegistry, DefaultsTable};
use crate::settings::DefaultModelPolicy;
use crate::shape;

use super::ValidationError;

/// Pairs of (strategy list key, designated-default key) on a database
const DATABASE_STRATEGY_FIELDS: [(ComponentKind, &str); 2] = [
    (ComponentKind::EmbeddingStrategy, "default_embedding_strategy"),
    (ComponentKind::RetrievalStrategy, "default_retrieval_strategy"),
];

pub struct SemanticValidator {
    policy: DefaultModelPolicy,
}

impl SemanticValidator {
    pub fn new(policy: DefaultModelPolicy) -> Self {
        Self { policy }
    }

    /// Empty result means every cross-reference in the document holds
    pub fn validate(&self, document: &JsonValue) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let registry = ComponentRegistry::from_document(document);
        let defaults = DefaultsTable::from_document(document);

        self.check_unique_names(document, &mut errors);
        self.check_prompt_references(document, &mut errors);
        self.check_default_strategies(document, &defaults, &mut errors);
        self.check_dataset_references(document, &mut errors);
        self.check_default_model(document, &mut errors);
        self.check_runtime_shape(document, &mut errors);
        self.check_component_references(document, &registry, &mut errors);
        errors
    }

    /// Check 1: names that act as keys must be unique within their list
    fn check_unique_names(&self, document: &JsonValue, errors: &mut Vec<ValidationError>) {
        self.unique_names(shape::list(document, "prompts"), "prompt set", "prompts", errors);
        self.unique_names(shape::list(document, "datasets"), "dataset", "datasets", errors);

        let runtime = document.get("runtime").unwrap_or(&JsonValue::Null);
        self.unique_names(shape::list(runtime, "models"), "model", "runtime.models", errors);

        let rag = document.get("rag").unwrap_or(&JsonValue::Null);
        self.unique_names(shape::list(rag, "databases"), "database", "rag.databases", errors);
        self.unique_names(
            shape::list(rag, "data_processing_strategies"),
            "data processing strategy",
            "rag.data_processing_strategies",
            errors,
        );
        for (idx, db) in shape::list(rag, "databases").iter().enumerate() {
            let db_path = path::index("rag.databases", idx);
            for (kind, _) in DATABASE_STRATEGY_FIELDS {
                self.unique_names(
                    shape::list(db, kind.section()),
                    kind.label(),
                    &path::join(&db_path, kind.section()),
                    errors,
                );
            }
        }
    }

    fn unique_names(
        &self,
        entries: &[JsonValue],
        label: &str,
        list_path: &str,
        errors: &mut Vec<ValidationError>,
    ) {
        let mut counts: Vec<(&str, usize)> = Vec::new();
        for name in entries.iter().filter_map(shape::entry_name) {
            match counts.iter_mut().find(|(n, _)| *n == name) {
                Some((_, count)) => *count += 1,
                None => counts.push((name, 1)),
            }
        }
        for (name, count) in counts.into_iter().filter(|(_, c)| *c > 1) {
            errors.push(ValidationError::duplicate(
                list_path,
                format!(
                    "Duplicate {label} name '{name}' ({count} occurrences); names in {list_path} must be unique"
                ),
            ));
        }
    }

    /// Check 2: model prompt lists reference defined prompt sets
    fn check_prompt_references(&self, document: &JsonValue, errors: &mut Vec<ValidationError>) {
        let prompt_names: Vec<&str> = shape::list(document, "prompts")
            .iter()
            .filter_map(shape::entry_name)
            .collect();
        let known: HashSet<&str> = prompt_names.iter().copied().collect();

        let runtime = document.get("runtime").unwrap_or(&JsonValue::Null);
        for (midx, model) in shape::list(runtime, "models").iter().enumerate() {
            let model_name = shape::str_field(model, "name").unwrap_or("<unnamed>");
            let prompts_path = path::join(&path::index("runtime.models", midx), "prompts");
            for (pidx, entry) in shape::list(model, "prompts").iter().enumerate() {
                let Some(reference) = entry.as_str() else { continue };
                if !known.contains(reference) {
                    errors.push(ValidationError::invalid_reference(
                        path::index(&prompts_path, pidx),
                        format!(
                            "Model '{model_name}' references unknown prompt set '{reference}'; available prompt sets: {}",
                            alternatives(&prompt_names)
                        ),
                    ));
                }
            }
        }
    }

    /// Check 3: designated default strategies exist; undesignated defaults
    /// must be derivable
    fn check_default_strategies(
        &self,
        document: &JsonValue,
        defaults: &DefaultsTable,
        errors: &mut Vec<ValidationError>,
    ) {
        let rag = document.get("rag").unwrap_or(&JsonValue::Null);
        for (idx, db) in shape::list(rag, "databases").iter().enumerate() {
            let db_path = path::index("rag.databases", idx);
            let db_name = shape::str_field(db, "name").unwrap_or("<unnamed>");
            for (kind, default_key) in DATABASE_STRATEGY_FIELDS {
                let names: Vec<&str> = shape::list(db, kind.section())
                    .iter()
                    .filter_map(shape::entry_name)
                    .collect();
                match shape::str_field(db, default_key) {
                    Some(designated) => {
                        if !names.contains(&designated) {
                            errors.push(ValidationError::invalid_reference(
                                path::join(&db_path, default_key),
                                format!(
                                    "Database '{db_name}' sets {default_key} '{designated}' which is not one of its {}; valid entries: {}",
                                    kind.section(),
                                    alternatives(&names)
                                ),
                            ));
                        }
                    }
                    None if names.len() > 1 => {
                        let derivable = defaults
                            .get(kind)
                            .map_or(false, |name| names.contains(&name));
                        if !derivable {
                            errors.push(ValidationError::ambiguous_default(
                                path::join(&db_path, kind.section()),
                                format!(
                                    "Database '{db_name}' has {} {} entries and no {default_key}; set {default_key} to one of {} or register one in components.defaults",
                                    names.len(),
                                    kind.label(),
                                    alternatives(&names)
                                ),
                            ));
                        }
                    }
                    None => {}
                }
            }
        }
    }

    /// Check 4: datasets point at defined databases and processing strategies
    fn check_dataset_references(&self, document: &JsonValue, errors: &mut Vec<ValidationError>) {
        let rag = document.get("rag").unwrap_or(&JsonValue::Null);
        let database_names: Vec<&str> = shape::list(rag, "databases")
            .iter()
            .filter_map(shape::entry_name)
            .collect();
        let strategy_names: Vec<&str> = shape::list(rag, "data_processing_strategies")
            .iter()
            .filter_map(shape::entry_name)
            .collect();

        for (idx, dataset) in shape::list(document, "datasets").iter().enumerate() {
            let dataset_path = path::index("datasets", idx);
            let dataset_name = shape::str_field(dataset, "name").unwrap_or("<unnamed>");
            if let Some(reference) = shape::str_field(dataset, "data_processing_strategy") {
                if !strategy_names.contains(&reference) {
                    errors.push(ValidationError::invalid_reference(
                        path::join(&dataset_path, "data_processing_strategy"),
                        format!(
                            "Dataset '{dataset_name}' references unknown data processing strategy '{reference}'; available strategies: {}",
                            alternatives(&strategy_names)
                        ),
                    ));
                }
            }
            if let Some(reference) = shape::str_field(dataset, "database") {
                if !database_names.contains(&reference) {
                    errors.push(ValidationError::invalid_reference(
                        path::join(&dataset_path, "database"),
                        format!(
                            "Dataset '{dataset_name}' references unknown database '{reference}'; available databases: {}",
                            alternatives(&database_names)
                        ),
                    ));
                }
            }
        }
    }

    /// Check 5: exactly one unambiguous default model
    fn check_default_model(&self, document: &JsonValue, errors: &mut Vec<ValidationError>) {
        let runtime = document.get("runtime").unwrap_or(&JsonValue::Null);
        let models = shape::list(runtime, "models");
        if models.is_empty() {
            // Legacy flat runtime or a shape problem; check 6 covers those
            return;
        }
        let names: Vec<&str> = models.iter().filter_map(shape::entry_name).collect();
        let flagged: Vec<&str> = models
            .iter()
            .filter(|m| m.get("default").and_then(JsonValue::as_bool) == Some(true))
            .filter_map(shape::entry_name)
            .collect();

        if flagged.len() > 1 {
            errors.push(ValidationError::ambiguous_default(
                "runtime.models",
                format!(
                    "Models {} are all marked default: true; at most one model may carry the flag",
                    alternatives(&flagged)
                ),
            ));
        }

        let declared = shape::str_field(runtime, "default_model");
        if let Some(declared) = declared {
            if !names.contains(&declared) {
                errors.push(ValidationError::invalid_reference(
                    "runtime.default_model",
                    format!(
                        "runtime.default_model '{declared}' does not match any model; available models: {}",
                        alternatives(&names)
                    ),
                ));
            } else if flagged.len() == 1 && flagged[0] != declared {
                errors.push(ValidationError::ambiguous_default(
                    "runtime.default_model",
                    format!(
                        "runtime.default_model '{declared}' disagrees with model '{}' marked default: true; designate one default",
                        flagged[0]
                    ),
                ));
            }
        } else if flagged.is_empty() {
            if names.len() > 1 {
                errors.push(ValidationError::ambiguous_default(
                    "runtime.models",
                    format!(
                        "No default model designated among {} models; set runtime.default_model or mark one of {} with default: true",
                        names.len(),
                        alternatives(&names)
                    ),
                ));
            } else if names.len() == 1 && self.policy == DefaultModelPolicy::Strict {
                errors.push(ValidationError::ambiguous_default(
                    "runtime.models",
                    format!(
                        "No default model designated; set runtime.default_model or mark '{}' with default: true",
                        names[0]
                    ),
                ));
            }
        }
    }

    /// Check 6: runtime uses exactly one of the two accepted shapes
    fn check_runtime_shape(&self, document: &JsonValue, errors: &mut Vec<ValidationError>) {
        let Some(JsonValue::Object(runtime)) = document.get("runtime") else {
            // Missing or mistyped runtime is a structural finding
            return;
        };
        let has_provider = runtime.contains_key("provider");
        let has_model = runtime.contains_key("model");
        let has_models = runtime.contains_key("models");

        if (has_provider || has_model) && has_models {
            errors.push(ValidationError::schema_mismatch(
                "runtime",
                "runtime mixes the legacy provider/model fields with a models list; use exactly one shape",
            ));
            return;
        }
        if !has_provider && !has_model && !has_models {
            errors.push(ValidationError::missing_required(
                "runtime",
                "runtime defines neither provider/model nor a models list; one shape is required",
            ));
            return;
        }
        if has_provider != has_model {
            let missing = if has_provider { "model" } else { "provider" };
            errors.push(ValidationError::missing_required(
                path::join("runtime", missing),
                format!("Legacy runtime shape requires both provider and model; '{missing}' is missing"),
            ));
        }
    }

    /// Check 7: bare-name component references and the defaults table
    /// resolve against the component registry
    fn check_component_references(
        &self,
        document: &JsonValue,
        registry: &ComponentRegistry,
        errors: &mut Vec<ValidationError>,
    ) {
        let rag = document.get("rag").unwrap_or(&JsonValue::Null);
        for (idx, db) in shape::list(rag, "databases").iter().enumerate() {
            let db_path = path::index("rag.databases", idx);
            let db_name = shape::str_field(db, "name").unwrap_or("<unnamed>");
            for (kind, _) in DATABASE_STRATEGY_FIELDS {
                let list_path = path::join(&db_path, kind.section());
                for (eidx, entry) in shape::list(db, kind.section()).iter().enumerate() {
                    let Some(reference) = entry.as_str() else { continue };
                    if !registry.contains(kind, reference) {
                        errors.push(ValidationError::invalid_reference(
                            path::index(&list_path, eidx),
                            format!(
                                "Database '{db_name}' references unknown {kind} component '{reference}'; registered components: {}",
                                alternatives(&registry.names(kind))
                            ),
                        ));
                    }
                }
            }
        }

        for (sidx, strategy) in shape::list(rag, "data_processing_strategies")
            .iter()
            .enumerate()
        {
            let strategy_name = shape::str_field(strategy, "name").unwrap_or("<unnamed>");
            let parsers_path = path::join(
                &path::index("rag.data_processing_strategies", sidx),
                "parsers",
            );
            for (pidx, entry) in shape::list(strategy, "parsers").iter().enumerate() {
                let Some(reference) = entry.as_str() else { continue };
                if !registry.contains(ComponentKind::Parser, reference) {
                    errors.push(ValidationError::invalid_reference(
                        path::index(&parsers_path, pidx),
                        format!(
                            "Processing strategy '{strategy_name}' references unknown parser component '{reference}'; registered components: {}",
                            alternatives(&registry.names(ComponentKind::Parser))
                        ),
                    ));
                }
            }
        }

        let defaults = document
            .get("components")
            .and_then(|c| c.get("defaults"))
            .and_then(JsonValue::as_object);
        if let Some(defaults) = defaults {
            for (section, value) in defaults {
                let defaults_path = path::join("components.defaults", section);
                let Some(kind) = ComponentKind::from_section(section) else {
                    errors.push(ValidationError::invalid_reference(
                        defaults_path,
                        format!(
                            "Unknown component kind '{section}' in components.defaults; expected one of embedding_strategies, retrieval_strategies, parsers"
                        ),
                    ));
                    continue;
                };
                let Some(reference) = value.as_str() else { continue };
                if !registry.contains(kind, reference) {
                    errors.push(ValidationError::invalid_reference(
                        defaults_path,
                        format!(
                            "components.defaults names unknown {kind} component '{reference}'; registered components: {}",
                            alternatives(&registry.names(kind))
                        ),
                    ));
                }
            }
        }
    }
}

/// Quoted, comma-separated alternatives in document order, or a phrase
/// making the emptiness explicit
fn alternatives(names: &[&str]) -> String {
    if names.is_empty() {
        "none defined".to_string()
    } else {
        format!("'{}'", names.join("', '"))
    }
}
