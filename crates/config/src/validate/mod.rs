//! Validation findings and the two validators that produce them
//!
//! Violations are data, never panics: each check appends
//! [`ValidationError`] records to a [`ValidationReport`], and the platform
//! layer serializes them as `{message, path}` for its own surfaces.

pub mod semantic;
pub mod structural;

pub use semantic::SemanticValidator;
pub use structural::StructuralValidator;

use std::fmt;

use serde::Serialize;

/// Broad classification of a validation finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationCategory {
    /// Document violates the compiled schema
    SchemaMismatch,
    /// A name that must be unique appears more than once
    Duplicate,
    /// A name reference points at nothing
    InvalidReference,
    /// A required field or shape is absent
    MissingRequired,
    /// No single default can be determined
    AmbiguousDefault,
}

/// One validation finding with its dotted document path
///
/// `path` is empty for findings about the document root.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationError {
    pub category: ValidationCategory,
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(
        category: ValidationCategory,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn schema_mismatch(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ValidationCategory::SchemaMismatch, path, message)
    }

    pub fn duplicate(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ValidationCategory::Duplicate, path, message)
    }

    pub fn invalid_reference(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ValidationCategory::InvalidReference, path, message)
    }

    pub fn missing_required(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ValidationCategory::MissingRequired, path, message)
    }

    pub fn ambiguous_default(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ValidationCategory::AmbiguousDefault, path, message)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "[{}] {}", self.path, self.message)
        }
    }
}

/// Aggregated findings from one or both validators
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn extend(&mut self, errors: Vec<ValidationError>) {
        self.errors.extend(errors);
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation error(s)", self.errors.len())?;
        for error in &self.errors {
            write!(f, "; {}", error)?;
        }
        Ok(())
    }
}
