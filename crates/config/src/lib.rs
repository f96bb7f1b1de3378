//! Project configuration pipeline for LlamaFarm
//!
//! Takes a project YAML document from raw text to a fully resolved,
//! strongly typed configuration in four stages:
//!
//! 1. Schema loading: the project schema is read from YAML, every `$ref`
//!    (including cross-file references) is dereferenced, and the result is
//!    compiled once per [`SchemaRegistry`].
//! 2. Structural validation: the document is checked against the compiled
//!    schema; the first violation is reported with its dotted path.
//! 3. Semantic validation: cross-references between models, prompts,
//!    databases, strategies, and datasets are checked exhaustively; every
//!    violation is collected before reporting.
//! 4. Reference resolution: named component references are expanded into
//!    their full definitions, defaults are filled in, and the output tree
//!    contains no name-only references.
//!
//! [`ProjectLoader`] is the facade over the whole pipeline; the individual
//! stages are public for callers that need only one of them.

pub mod loader;
pub mod resolve;
pub mod schema;
pub mod settings;
pub mod shape;
pub mod validate;

use thiserror::Error;

pub use llamafarm_core::{ProjectConfig, ProjectDecodeError};
pub use llamafarm_store::{ConfigDocument, ConfigIoError};

pub use loader::{LoadedProject, ProjectLoader};
pub use resolve::{resolve, ComponentRegistry, DefaultsTable, ResolveError};
pub use schema::{SchemaIntegrityError, SchemaRegistry};
pub use settings::{load_settings, DefaultModelPolicy, EngineSettings};
pub use validate::{
    SemanticValidator, StructuralValidator, ValidationCategory, ValidationError, ValidationReport,
};

/// Failure of any stage of the configuration pipeline
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Schema(#[from] SchemaIntegrityError),

    #[error("Project validation failed: {0}")]
    Validation(ValidationReport),

    #[error(transparent)]
    Io(#[from] ConfigIoError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Decode(#[from] ProjectDecodeError),

    #[error("Failed to load engine settings: {0}")]
    Settings(#[from] ::config::ConfigError),

    #[error("Invalid setting {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<ValidationReport> for ConfigError {
    fn from(report: ValidationReport) -> Self {
        ConfigError::Validation(report)
    }
}
