//! Centralized constants for the configuration engine
//!
//! Single source of truth for the defaults and limits used across the
//! workspace. Use these instead of hardcoding values in multiple files.

/// Schema handling
pub mod schema {
    /// The only config format version this engine accepts
    pub const SUPPORTED_VERSION: &str = "v1";

    /// Default location of the project schema, relative to the working directory
    pub const DEFAULT_SCHEMA_PATH: &str = "schemas/project.yaml";

    /// Minimum plausible serialized size of a dereferenced schema.
    /// Anything smaller is treated as truncated generator output.
    pub const MIN_SCHEMA_BYTES: usize = 100;
}

/// Reference resolution defaults
pub mod resolution {
    /// Parser priority applied when an inline parser omits one
    pub const DEFAULT_PARSER_PRIORITY: u64 = 50;
}

/// Environment variable conventions
pub mod env {
    /// Prefix for settings overrides (e.g. LLAMAFARM__SCHEMA__PATH)
    pub const PREFIX: &str = "LLAMAFARM";

    /// Separator between nested setting segments
    pub const SEPARATOR: &str = "__";
}
