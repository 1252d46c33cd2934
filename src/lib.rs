//! Dirty-gated validation for form-like field state.
//!
//! A [`Form`] holds a fixed set of named fields, each with one atomic JSON
//! value, and a [`ValidationRegistry`] of named constraints per field. Writes
//! through [`Form::value`] re-validate the written field; [`Form::validate`]
//! checks every field. Errors stay hidden until the first full validation:
//!
//! ```text
//! new ─▶ clean ──validate()──▶ dirty ──reset() / set_value()──▶ clean
//!          │ set(): errors withheld   │ set(): errors updated
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use formval::FieldAccess;
//! use serde_json::json;
//!
//! let rules = r#"
//! fields:
//!   age:
//!     minAge:
//!       gte: 18
//!       message: too young
//! "#;
//!
//! let mut form = formval::load(rules, json!({ "age": 15 })).expect("valid rules");
//!
//! // Clean forms keep quiet.
//! form.value().set("age", json!(12)).unwrap();
//! assert!(!form.errors().is_error());
//!
//! assert!(!form.validate());
//! assert_eq!(form.errors().field("age").unwrap()[0].constraint, "minAge");
//!
//! form.value().set("age", json!(20)).unwrap();
//! assert!(!form.errors().is_error());
//! ```
//!
//! # Logging
//!
//! The crate logs through the [`log`] facade: full validations, resets and
//! bulk merges at `debug`, per-field evaluation at `trace`. No logger is
//! installed.

pub mod engine;
pub mod error;
pub mod form;
pub mod registry;
pub mod rules;
pub mod schema;
pub mod types;

pub use error::*;
pub use types::*;

pub use engine::ValidationEngine;
pub use form::{FieldAccess, FieldView, Form};
pub use registry::{Constraint, ValidationRegistry};

/// Convenience entry point composing rule parsing and [`Form::new`].
///
/// # Errors
///
/// Returns [`FormError::Schema`] if the rule document is invalid, and the
/// [`Form::new`] errors if `initial` does not fit the rules.
pub fn load(rules: &str, initial: serde_json::Value) -> Result<Form, FormError> {
    let registry = schema::parse(rules)?;
    Form::new(FieldState::try_from(initial)?, registry)
}
