//! Pipeline facade: read, validate, resolve, type

use std::path::Path;

use serde_json::Value as JsonValue;
use tracing::{info, warn};

use llamafarm_core::ProjectConfig;
use llamafarm_store::ConfigDocument;

use crate::resolve::{self, ComponentRegistry, DefaultsTable};
use crate::schema::SchemaRegistry;
use crate::settings::EngineSettings;
use crate::validate::{SemanticValidator, StructuralValidator, ValidationReport};
use crate::ConfigError;

/// Facade over the whole pipeline: schema registry + validators + resolver
/// + persistence, wired according to [`EngineSettings`].
pub struct ProjectLoader {
    registry: SchemaRegistry,
    settings: EngineSettings,
}

/// A project that passed the full pipeline
pub struct LoadedProject {
    /// The document as read, with its formatting sidecar
    pub document: ConfigDocument,
    /// The resolved value tree, no name-only references remaining
    pub resolved: JsonValue,
    /// Typed view of the resolved tree
    pub project: ProjectConfig,
}

impl ProjectLoader {
    /// Open the schema registry at the configured path
    pub fn new(settings: EngineSettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        let registry = SchemaRegistry::open(settings.schema.path.clone())?;
        Ok(Self { registry, settings })
    }

    /// Wire a loader around an already-opened registry
    pub fn with_registry(registry: SchemaRegistry, settings: EngineSettings) -> Self {
        Self { registry, settings }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn schema_registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Re-load and re-compile the schema from disk
    pub fn reload_schema(&mut self) -> Result<(), ConfigError> {
        Ok(self.registry.reload()?)
    }

    /// Run both validators and combine their findings: the structural
    /// validator's first violation plus every semantic violation.
    ///
    /// Fails only when no usable schema is loaded; findings about the
    /// document itself are data in the report.
    pub fn validate_document(&self, document: &JsonValue) -> Result<ValidationReport, ConfigError> {
        let schema = self.registry.schema()?;
        let mut report = ValidationReport::new();
        report.extend(StructuralValidator::new(schema).validate(document));
        report.extend(
            SemanticValidator::new(self.settings.resolution.default_model_policy)
                .validate(document),
        );
        if !report.is_valid() {
            warn!(errors = report.len(), "project document failed validation");
        }
        Ok(report)
    }

    /// Validation gate, then resolution. A document with outstanding
    /// findings from either validator is never resolved.
    pub fn resolve_document(&self, document: &JsonValue) -> Result<JsonValue, ConfigError> {
        let report = self.validate_document(document)?;
        if !report.is_valid() {
            return Err(ConfigError::Validation(report));
        }
        let registry = ComponentRegistry::from_document(document);
        let defaults = DefaultsTable::from_document(document);
        Ok(resolve::resolve(document, &registry, &defaults)?)
    }

    /// Read a project file and take it through the full pipeline
    pub fn load(&self, path: &Path) -> Result<LoadedProject, ConfigError> {
        let document = ConfigDocument::read(path)?;
        let resolved = self.resolve_document(document.value())?;
        let project = ProjectConfig::from_value(resolved.clone())?;
        info!(path = %path.display(), project = %project.name, "project loaded");
        Ok(LoadedProject {
            document,
            resolved,
            project,
        })
    }

    /// Persist a document after verifying it validates and resolves.
    ///
    /// The document is written as authored; resolution output is what the
    /// runtime consumes, not what lands in the user's file.
    pub fn save(&self, path: &Path, document: &ConfigDocument) -> Result<(), ConfigError> {
        self.resolve_document(document.value())?;
        if self.settings.persistence.preserve_comments {
            document.write(path)?;
        } else {
            ConfigDocument::from_value(document.value().clone()).write(path)?;
        }
        info!(path = %path.display(), "project saved");
        Ok(())
    }
}
