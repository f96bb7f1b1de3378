//! Core types for the LlamaFarm configuration engine
//!
//! This crate provides foundational types used across all other crates:
//! - Centralized constants (supported config version, resolution defaults)
//! - Component kinds for the reusable `components` section
//! - Dotted-path helpers shared by validation errors and the persistence layer
//! - The typed project model (`ProjectConfig` and friends), deserialized from
//!   a fully validated and resolved configuration value

pub mod component;
pub mod constants;
pub mod path;
pub mod project;

pub use component::ComponentKind;
pub use project::{
    DatabaseConfig, DatasetConfig, MemoryConfig, MessageRole, ModelConfig, ParserConfig,
    ProcessingStrategyConfig, ProjectConfig, ProjectDecodeError, PromptMessage, PromptSet,
    Provider, RagConfig, RuntimeConfig, StrategyConfig, VoiceConfig,
};
