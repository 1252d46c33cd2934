use serde::{Deserialize, Serialize};
use std::fmt;

/// One failing constraint on a field.
///
/// This is domain data, not a fault: a form with violations is still a
/// perfectly usable form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub constraint: String,
    pub message: String,
}

impl FieldError {
    pub fn new(constraint: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            constraint: constraint.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.constraint, self.message)
    }
}

impl std::error::Error for FieldError {}

/// Error kind for rule document failures.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaErrorKind {
    Syntax,
    TypeMismatch,
    UnknownOperator,
    InvalidRule,
}

/// Produced by [`crate::schema::parse`] when a rule document cannot be turned
/// into a registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaError {
    pub kind: SchemaErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl SchemaError {
    pub(crate) fn new(kind: SchemaErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            path: None,
        }
    }

    pub(crate) fn at(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}: {}", path, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for SchemaError {}

/// Faults raised while building or driving a [`crate::Form`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormError {
    /// Initial state or a bulk update was not a JSON object.
    NotAnObject { found: &'static str },
    /// A write or bulk update named a field the form was not built with.
    UnknownField { field: String },
    /// The registry carries constraints for a field the form does not have.
    UnregisteredField { field: String },
    /// A field name collides with the aggregate `isError` key.
    ReservedFieldName { field: String },
    /// Field state could not be converted to or from a typed value.
    Deserialize { message: String },
    Schema(SchemaError),
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::NotAnObject { found } => {
                write!(f, "field state must be an object, got {}", found)
            }
            FormError::UnknownField { field } => write!(f, "unknown field '{}'", field),
            FormError::UnregisteredField { field } => write!(
                f,
                "constraints registered for '{}', which is not a field of the form",
                field
            ),
            FormError::ReservedFieldName { field } => {
                write!(f, "field name '{}' is reserved", field)
            }
            FormError::Deserialize { message } => {
                write!(f, "field state conversion failed: {}", message)
            }
            FormError::Schema(e) => write!(f, "Schema error: {}", e),
        }
    }
}

impl std::error::Error for FormError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FormError::Schema(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SchemaError> for FormError {
    fn from(e: SchemaError) -> Self {
        FormError::Schema(e)
    }
}
