//! Per-field constraint registry.

use serde_json::Value;
use std::fmt;

use crate::types::FieldState;

/// Predicate over a candidate value and the whole form.
///
/// Validators must be total: a validator that panics propagates the panic to
/// whoever triggered validation. They only ever see shared references, so
/// they cannot write back into the form.
pub type ValidatorFn = dyn Fn(&Value, &FieldState) -> bool + Send + Sync;

/// A named predicate plus the message reported when it fails.
pub struct Constraint {
    name: String,
    message: String,
    validator: Box<ValidatorFn>,
}

impl Constraint {
    pub fn new<F>(name: impl Into<String>, message: impl Into<String>, validator: F) -> Self
    where
        F: Fn(&Value, &FieldState) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            message: message.into(),
            validator: Box::new(validator),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn check(&self, value: &Value, form: &FieldState) -> bool {
        (self.validator)(value, form)
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constraint")
            .field("name", &self.name)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
struct FieldConstraints {
    field: String,
    constraints: Vec<Constraint>,
}

/// Map from field name to its constraints, in registration order.
///
/// Fields without an entry have no constraints and are always valid.
#[derive(Debug, Default)]
pub struct ValidationRegistry {
    fields: Vec<FieldConstraints>,
}

impl ValidationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`ValidationRegistry::add`].
    ///
    /// ```rust
    /// use formval::ValidationRegistry;
    ///
    /// let registry = ValidationRegistry::new()
    ///     .rule("age", "minAge", "too young", |v, _| v.as_i64().is_some_and(|n| n >= 18));
    /// assert_eq!(registry.constraints("age").len(), 1);
    /// ```
    pub fn rule<F>(
        mut self,
        field: impl Into<String>,
        name: impl Into<String>,
        message: impl Into<String>,
        validator: F,
    ) -> Self
    where
        F: Fn(&Value, &FieldState) -> bool + Send + Sync + 'static,
    {
        self.add(field, Constraint::new(name, message, validator));
        self
    }

    /// Register a constraint under `field`.
    ///
    /// A second constraint with the same name on the same field replaces the
    /// first one in place, so evaluation order stays stable.
    pub fn add(&mut self, field: impl Into<String>, constraint: Constraint) {
        let field = field.into();
        let entry = match self.fields.iter().position(|f| f.field == field) {
            Some(i) => &mut self.fields[i],
            None => {
                self.fields.push(FieldConstraints {
                    field,
                    constraints: Vec::new(),
                });
                let last = self.fields.len() - 1;
                &mut self.fields[last]
            }
        };

        match entry
            .constraints
            .iter_mut()
            .find(|c| c.name == constraint.name)
        {
            Some(slot) => *slot = constraint,
            None => entry.constraints.push(constraint),
        }
    }

    /// Declare `field` without constraints. Only useful to make the field
    /// show up in [`ValidationRegistry::fields`].
    pub fn declare(&mut self, field: impl Into<String>) {
        let field = field.into();
        if !self.fields.iter().any(|f| f.field == field) {
            self.fields.push(FieldConstraints {
                field,
                constraints: Vec::new(),
            });
        }
    }

    /// Constraints for `field`; empty for unregistered fields.
    pub fn constraints(&self, field: &str) -> &[Constraint] {
        self.fields
            .iter()
            .find(|f| f.field == field)
            .map(|f| f.constraints.as_slice())
            .unwrap_or(&[])
    }

    /// Fields with an entry, in registration order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.field.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Move every entry of `other` into `self`, replacing same-named
    /// constraints.
    pub fn extend(&mut self, other: ValidationRegistry) {
        for entry in other.fields {
            self.declare(entry.field.clone());
            for constraint in entry.constraints {
                self.add(entry.field.clone(), constraint);
            }
        }
    }
}
