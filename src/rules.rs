//! Declarative rule operators.
//!
//! A [`Rule`] is the data form of a constraint: a message plus one or more
//! operators, all of which must hold. [`compile`] turns a rule into a
//! [`Constraint`] usable by the engine.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{SchemaError, SchemaErrorKind};
use crate::registry::Constraint;
use crate::types::FieldState;

/// Operators of a declarative constraint. Every present operator must hold.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rule {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contains: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_with: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_with: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub any_of: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gt: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lt: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gte: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lte: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equals_field: Option<String>,
}

impl Rule {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    fn has_operator(&self) -> bool {
        self.required.is_some()
            || self.min_length.is_some()
            || self.max_length.is_some()
            || self.contains.is_some()
            || self.starts_with.is_some()
            || self.ends_with.is_some()
            || self.regex.is_some()
            || self.any_of.is_some()
            || self.gt.is_some()
            || self.lt.is_some()
            || self.gte.is_some()
            || self.lte.is_some()
            || self.equals_field.is_some()
    }
}

/// A rule whose regex has been compiled.
#[derive(Clone, Debug)]
pub struct CompiledRule {
    rule: Rule,
    regex: Option<Regex>,
}

impl CompiledRule {
    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    /// Evaluate every operator against `value`. Operators applied to a value
    /// of the wrong type fail.
    pub fn evaluate(&self, value: &Value, form: &FieldState) -> bool {
        let rule = &self.rule;

        if rule.required == Some(true) && is_blank(value) {
            return false;
        }

        if let Some(min) = rule.min_length {
            match value.as_str() {
                Some(s) if s.chars().count() >= min => {}
                _ => return false,
            }
        }

        if let Some(max) = rule.max_length {
            match value.as_str() {
                Some(s) if s.chars().count() <= max => {}
                _ => return false,
            }
        }

        if let Some(ref s) = rule.contains {
            match value.as_str() {
                Some(v) if v.contains(s.as_str()) => {}
                _ => return false,
            }
        }

        if let Some(ref s) = rule.starts_with {
            match value.as_str() {
                Some(v) if v.starts_with(s.as_str()) => {}
                _ => return false,
            }
        }

        if let Some(ref s) = rule.ends_with {
            match value.as_str() {
                Some(v) if v.ends_with(s.as_str()) => {}
                _ => return false,
            }
        }

        if let Some(ref re) = self.regex {
            match value.as_str() {
                Some(v) if re.is_match(v) => {}
                _ => return false,
            }
        }

        if let Some(ref items) = rule.any_of
            && !items.iter().any(|item| values_deep_equal(value, item))
        {
            return false;
        }

        if let Some(threshold) = rule.gt {
            match value.as_f64() {
                Some(v) if v > threshold => {}
                _ => return false,
            }
        }

        if let Some(threshold) = rule.lt {
            match value.as_f64() {
                Some(v) if v < threshold => {}
                _ => return false,
            }
        }

        if let Some(threshold) = rule.gte {
            match value.as_f64() {
                Some(v) if v >= threshold => {}
                _ => return false,
            }
        }

        if let Some(threshold) = rule.lte {
            match value.as_f64() {
                Some(v) if v <= threshold => {}
                _ => return false,
            }
        }

        if let Some(ref other) = rule.equals_field {
            match form.get(other) {
                Some(v) if values_deep_equal(value, v) => {}
                _ => return false,
            }
        }

        true
    }
}

/// Check a rule for internal consistency and compile its regex.
pub fn compile_rule(rule: Rule) -> Result<CompiledRule, SchemaError> {
    if !rule.has_operator() {
        return Err(SchemaError::new(
            SchemaErrorKind::InvalidRule,
            "rule must declare at least one operator besides 'message'",
        ));
    }

    if let (Some(min), Some(max)) = (rule.min_length, rule.max_length)
        && min > max
    {
        return Err(SchemaError::new(
            SchemaErrorKind::InvalidRule,
            format!("min_length ({}) exceeds max_length ({})", min, max),
        ));
    }

    let regex = match &rule.regex {
        Some(pattern) => Some(Regex::new(pattern).map_err(|e| {
            SchemaError::new(
                SchemaErrorKind::InvalidRule,
                format!("invalid regex '{}': {}", pattern, e),
            )
        })?),
        None => None,
    };

    Ok(CompiledRule { rule, regex })
}

/// Compile a rule into a named [`Constraint`].
pub fn compile(name: impl Into<String>, rule: Rule) -> Result<Constraint, SchemaError> {
    let compiled = compile_rule(rule)?;
    let message = compiled.rule.message.clone();
    Ok(Constraint::new(name, message, move |value, form| {
        compiled.evaluate(value, form)
    }))
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Equality used by `any_of` and `equals_field`.
///
/// Numbers match across integer and float representations (`18` matches
/// `18.0`). Composite values compare element-wise and key-by-key, ignoring
/// key order.
pub fn values_deep_equal(a: &Value, b: &Value) -> bool {
    if let (Value::Number(x), Value::Number(y)) = (a, b) {
        return match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        };
    }

    match (a, b) {
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_deep_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(key, x)| ys.get(key).is_some_and(|y| values_deep_equal(x, y)))
        }
        // Scalars of the same kind compare directly; mixed kinds never match.
        _ => a == b,
    }
}
