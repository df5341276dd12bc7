use std::collections::BTreeMap;
use std::fmt;

/// A rule failure on one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field_name: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field_name, self.message)
    }
}

/// Outcome of a validation run over a form.
///
/// Not an error type: a failed validation is an expected, local result that
/// the form displays next to its fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ValidationResult {
    #[default]
    Valid,
    /// At most one error per field, in rule registration order.
    Invalid(Vec<FieldError>),
}

impl ValidationResult {
    pub fn from_errors(errors: Vec<FieldError>) -> Self {
        if errors.is_empty() {
            Self::Valid
        } else {
            Self::Invalid(errors)
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors().is_empty()
    }

    pub fn is_invalid(&self) -> bool {
        !self.errors().is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        if let Self::Invalid(errors) = self {
            errors
        } else {
            &[]
        }
    }

    pub fn first_error(&self) -> Option<&FieldError> {
        self.errors().first()
    }

    /// Message recorded for `field_name`, if it failed.
    pub fn error_for(&self, field_name: &str) -> Option<&str> {
        self.errors()
            .iter()
            .find(|e| e.field_name == field_name)
            .map(|e| e.message.as_str())
    }

    /// Field name to message.
    pub fn messages(&self) -> BTreeMap<String, String> {
        self.errors()
            .iter()
            .map(|e| (e.field_name.clone(), e.message.clone()))
            .collect()
    }
}
