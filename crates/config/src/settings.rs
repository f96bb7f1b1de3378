//! Engine settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use llamafarm_core::constants::{env, schema};

use crate::ConfigError;

/// How the engine treats a sole model with no explicit default designation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DefaultModelPolicy {
    /// A default must always be designated explicitly
    #[default]
    Strict,
    /// A single model with no designation is accepted as the default
    AdoptSole,
}

/// Engine settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EngineSettings {
    /// Schema location
    #[serde(default)]
    pub schema: SchemaSettings,

    /// Resolution behavior
    #[serde(default)]
    pub resolution: ResolutionSettings,

    /// Persistence behavior
    #[serde(default)]
    pub persistence: PersistenceSettings,
}

/// Schema location settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaSettings {
    /// Path to the project schema root file
    #[serde(default = "default_schema_path")]
    pub path: String,
}

impl Default for SchemaSettings {
    fn default() -> Self {
        Self {
            path: default_schema_path(),
        }
    }
}

fn default_schema_path() -> String {
    schema::DEFAULT_SCHEMA_PATH.to_string()
}

/// Resolution behavior settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ResolutionSettings {
    /// Policy for a sole model without an explicit default
    #[serde(default)]
    pub default_model_policy: DefaultModelPolicy,
}

/// Persistence behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceSettings {
    /// Replay comments and styles captured at read time when writing
    #[serde(default = "default_preserve_comments")]
    pub preserve_comments: bool,
}

impl Default for PersistenceSettings {
    fn default() -> Self {
        Self {
            preserve_comments: default_preserve_comments(),
        }
    }
}

fn default_preserve_comments() -> bool {
    true
}

impl EngineSettings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.schema.path.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "schema.path".to_string(),
                message: "Schema path must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Load settings from the optional config file and environment
///
/// Priority (highest to lowest):
/// 1. Environment variables (LLAMAFARM__ prefix, `__` separator)
/// 2. config/engine.{yaml,toml,json}
pub fn load_settings() -> Result<EngineSettings, ConfigError> {
    let config = Config::builder()
        .add_source(File::with_name("config/engine").required(false))
        .add_source(
            Environment::with_prefix(env::PREFIX)
                .separator(env::SEPARATOR)
                .try_parsing(true),
        )
        .build()?;
    let settings: EngineSettings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}
