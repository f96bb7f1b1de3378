//! Project schema loading, dereferencing, and compilation

mod loader;
mod registry;

pub use loader::{load_schema, SchemaIntegrityError};
pub use registry::{CompiledSchema, SchemaRegistry};
