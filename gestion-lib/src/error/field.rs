//! Typed access to row attributes

/// A row attribute was absent or held another kind of value.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FieldError {
    #[error("row has no '{field}' attribute")]
    Missing { field: String },

    #[error("'{field}' holds a {actual}, not a {expected}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },
}

impl FieldError {
    pub fn missing(field: impl Into<String>) -> Self {
        Self::Missing { field: field.into() }
    }

    pub fn type_mismatch(field: impl Into<String>, expected: &'static str, actual: &'static str) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            expected,
            actual,
        }
    }
}
