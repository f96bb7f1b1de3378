//! Reference resolution: named components expanded into full definitions

mod components;
mod resolver;

pub use components::{ComponentRegistry, DefaultsTable};
pub use resolver::{resolve, ResolveError};
