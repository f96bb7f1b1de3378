//! Structural validation against the compiled project schema

use serde_json::Value as JsonValue;

use llamafarm_core::path;

use crate::schema::CompiledSchema;

use super::ValidationError;

/// Checks a raw document against the dereferenced draft-07 schema.
///
/// Reports only the first violation: structural errors tend to cascade
/// (one wrong type fails every keyword beneath it), so the leading finding
/// is the actionable one. Cross-field rules live in the semantic validator.
pub struct StructuralValidator<'a> {
    schema: &'a CompiledSchema,
}

impl<'a> StructuralValidator<'a> {
    pub fn new(schema: &'a CompiledSchema) -> Self {
        Self { schema }
    }

    /// Empty result means the document matches the schema
    pub fn validate(&self, document: &JsonValue) -> Vec<ValidationError> {
        match self.schema.validator().validate(document) {
            Ok(()) => Vec::new(),
            Err(violations) => violations
                .into_iter()
                .next()
                .map(|violation| {
                    vec![ValidationError::schema_mismatch(
                        path::from_pointer(&violation.instance_path.to_string()),
                        violation.to_string(),
                    )]
                })
                .unwrap_or_default(),
        }
    }
}
