//! Component kinds for the reusable `components` section
//!
//! A component is a strategy or parser definition declared once under
//! `components` and referenced by name from databases and processing
//! strategies. Each kind maps to one section of the `components` mapping.

use std::fmt;

/// The kinds of reusable components a project can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    EmbeddingStrategy,
    RetrievalStrategy,
    Parser,
}

impl ComponentKind {
    /// All kinds, in the order they appear under `components`
    pub const ALL: [ComponentKind; 3] = [
        ComponentKind::EmbeddingStrategy,
        ComponentKind::RetrievalStrategy,
        ComponentKind::Parser,
    ];

    /// Key of this kind's section under `components`
    pub fn section(&self) -> &'static str {
        match self {
            ComponentKind::EmbeddingStrategy => "embedding_strategies",
            ComponentKind::RetrievalStrategy => "retrieval_strategies",
            ComponentKind::Parser => "parsers",
        }
    }

    /// Human-readable singular label for error messages
    pub fn label(&self) -> &'static str {
        match self {
            ComponentKind::EmbeddingStrategy => "embedding strategy",
            ComponentKind::RetrievalStrategy => "retrieval strategy",
            ComponentKind::Parser => "parser",
        }
    }

    /// Look up a kind from its section key
    pub fn from_section(section: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.section() == section)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
