//! Rule evaluation and the dirty gate.

use serde_json::Value;

use crate::error::FieldError;
use crate::registry::ValidationRegistry;
use crate::types::{FieldErrorList, FieldState, FormErrors};

static NULL: Value = Value::Null;

/// Evaluates constraints and owns the stored error snapshot.
///
/// Until the first [`ValidationEngine::validate`] the engine is clean: field
/// level validation still runs but its result is withheld.
#[derive(Debug)]
pub struct ValidationEngine {
    registry: ValidationRegistry,
    errors: FormErrors,
    dirty: bool,
}

impl ValidationEngine {
    /// Engine over `fields` with an all-empty snapshot and the gate closed.
    pub fn new<'a, I>(registry: ValidationRegistry, fields: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self {
            registry,
            errors: FormErrors::empty(fields),
            dirty: false,
        }
    }

    pub fn registry(&self) -> &ValidationRegistry {
        &self.registry
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Evaluate every constraint of `field` against `value`, ungated.
    ///
    /// All constraints run; failures are reported in registration order.
    pub fn check_field(&self, field: &str, value: &Value, form: &FieldState) -> FieldErrorList {
        let list: FieldErrorList = self
            .registry
            .constraints(field)
            .iter()
            .filter(|c| !c.check(value, form))
            .map(|c| FieldError::new(c.name(), c.message()))
            .collect();
        log::trace!("field '{}': {} violation(s)", field, list.len());
        list
    }

    /// Error state after `field` takes `value`.
    ///
    /// The candidate merges the field's fresh list into the stored snapshot.
    /// While the engine is clean the stored snapshot is returned unchanged.
    pub fn run_validation(&self, field: &str, value: &Value, form: &FieldState) -> FormErrors {
        let list = self.check_field(field, value, form);
        let candidate = self.errors.with_field(field, list);
        if !self.dirty {
            if candidate != self.errors {
                log::trace!("withholding errors for '{}' until first validate", field);
            }
            return self.errors.clone();
        }
        candidate
    }

    /// Run [`run_validation`] for one field and store the result.
    ///
    /// Fields outside the engine's field set leave the snapshot unchanged.
    ///
    /// [`run_validation`]: ValidationEngine::run_validation
    pub fn apply(
        &mut self,
        field: &str,
        value: &Value,
        form: &FieldState,
    ) -> &FormErrors {
        self.errors = self.run_validation(field, value, form);
        &self.errors
    }

    /// Open the gate and validate every field the engine was built with.
    ///
    /// Values are read from `form`; a field missing from it is checked as
    /// `null`, and fields of `form` the engine does not know are ignored.
    /// Returns `true` when no field has a violation.
    pub fn validate(&mut self, form: &FieldState) -> bool {
        self.dirty = true;
        let lists: Vec<(String, FieldErrorList)> = self
            .errors
            .names()
            .map(|field| {
                let value = form.get(field).unwrap_or(&NULL);
                (field.to_string(), self.check_field(field, value, form))
            })
            .collect();
        self.errors = FormErrors::from_lists(lists);
        log::debug!(
            "validated {} field(s): {} violation(s)",
            self.errors.len(),
            self.errors.count()
        );
        !self.errors.is_error()
    }

    /// Close the gate and clear every list.
    pub fn reset(&mut self) {
        self.dirty = false;
        let names: Vec<String> = self.errors.names().map(str::to_string).collect();
        self.errors = FormErrors::empty(names);
        log::debug!("errors reset");
    }
}
