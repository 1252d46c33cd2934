//! The host-facing form: field values plus the engine that judges them.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::engine::ValidationEngine;
use crate::error::FormError;
use crate::registry::ValidationRegistry;
use crate::types::{FieldState, FormErrors, IS_ERROR_KEY, value_kind};

/// Explicit field accessor. Reads are plain; writes may have side effects.
pub trait FieldAccess {
    fn get(&self, field: &str) -> Option<&Value>;

    fn set(&mut self, field: &str, value: Value) -> Result<(), FormError>;
}

/// Field values, the validation engine, and the operations a host drives.
///
/// ```rust
/// use formval::{FieldAccess, FieldState, Form, ValidationRegistry};
/// use serde_json::json;
///
/// let registry = ValidationRegistry::new()
///     .rule("age", "minAge", "too young", |v, _| v.as_i64().is_some_and(|n| n >= 18));
/// let mut form = Form::new(FieldState::new().with("age", 15), registry).unwrap();
///
/// assert!(!form.validate());
/// assert_eq!(form.errors().field("age").unwrap()[0].message, "too young");
///
/// form.value().set("age", json!(20)).unwrap();
/// assert!(!form.errors().is_error());
/// ```
#[derive(Debug)]
pub struct Form {
    state: FieldState,
    engine: ValidationEngine,
}

impl Form {
    /// Build a form over `initial`.
    ///
    /// The field set is fixed from here on. Every field the registry names
    /// must be part of `initial`.
    pub fn new(initial: FieldState, registry: ValidationRegistry) -> Result<Self, FormError> {
        if initial.contains(IS_ERROR_KEY) {
            return Err(FormError::ReservedFieldName {
                field: IS_ERROR_KEY.to_string(),
            });
        }

        if let Some(field) = registry.fields().find(|f| !initial.contains(f)) {
            return Err(FormError::UnregisteredField {
                field: field.to_string(),
            });
        }

        let engine = ValidationEngine::new(registry, initial.names());
        Ok(Self {
            state: initial,
            engine,
        })
    }

    /// Build a form from any value that serializes to an object.
    pub fn from_serialize<T: Serialize>(
        initial: &T,
        registry: ValidationRegistry,
    ) -> Result<Self, FormError> {
        let value = serde_json::to_value(initial).map_err(|e| FormError::Deserialize {
            message: e.to_string(),
        })?;
        Self::new(FieldState::try_from(value)?, registry)
    }

    /// Intercepting view over the field values.
    pub fn value(&mut self) -> FieldView<'_> {
        FieldView { form: self }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.state.get(field)
    }

    /// Write one field, validating it first.
    ///
    /// The write always lands, even when the value violates constraints.
    /// Only unknown fields are rejected.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> Result<(), FormError> {
        if !self.state.contains(field) {
            return Err(FormError::UnknownField {
                field: field.to_string(),
            });
        }

        let value = value.into();
        self.engine.apply(field, &value, &self.state);
        self.state.replace(field, value);
        Ok(())
    }

    pub fn fields(&self) -> &FieldState {
        &self.state
    }

    /// `true` once [`Form::validate`] has run and no reset followed.
    pub fn dirty(&self) -> bool {
        self.engine.is_dirty()
    }

    pub fn errors(&self) -> &FormErrors {
        self.engine.errors()
    }

    /// Validate every field. Returns `true` when the form is valid.
    pub fn validate(&mut self) -> bool {
        self.engine.validate(&self.state)
    }

    /// Clear all errors and the dirty flag. Field values are untouched.
    pub fn reset(&mut self) {
        self.engine.reset();
    }

    /// Merge `partial` into the field values, then reset.
    ///
    /// Unlike [`Form::set`] nothing is validated. `partial` must be an object
    /// naming only known fields; otherwise nothing changes.
    pub fn set_value(&mut self, partial: Value) -> Result<(), FormError> {
        let partial = match partial {
            Value::Object(map) => map,
            other => {
                return Err(FormError::NotAnObject {
                    found: value_kind(&other),
                });
            }
        };

        if let Some(field) = partial.keys().find(|k| !self.state.contains(k)) {
            return Err(FormError::UnknownField {
                field: field.clone(),
            });
        }

        log::debug!("merging {} field(s)", partial.len());
        for (field, value) in partial {
            self.state.replace(&field, value);
        }
        self.reset();
        Ok(())
    }

    /// Convert the current values into a typed value.
    pub fn deserialize_fields<T: DeserializeOwned>(&self) -> Result<T, FormError> {
        serde_json::from_value(Value::Object(self.state.as_map().clone())).map_err(|e| {
            FormError::Deserialize {
                message: e.to_string(),
            }
        })
    }

    pub fn engine(&self) -> &ValidationEngine {
        &self.engine
    }
}

/// Accessor over a [`Form`]'s values whose writes run validation.
///
/// Reads return the stored value verbatim. Writes go through [`Form::set`].
#[derive(Debug)]
pub struct FieldView<'a> {
    form: &'a mut Form,
}

impl FieldAccess for FieldView<'_> {
    fn get(&self, field: &str) -> Option<&Value> {
        self.form.get(field)
    }

    fn set(&mut self, field: &str, value: Value) -> Result<(), FormError> {
        self.form.set(field, value)
    }
}
