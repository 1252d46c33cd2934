//! Rule document → [`ValidationRegistry`].
//!
//! ```text
//! fields:
//!   <field>:
//!     <constraint>:
//!       message: "..."
//!       <operator>: <argument>
//! ```
//!
//! Documents are YAML; JSON is accepted as the YAML subset it is. Field and
//! constraint order in the document is the evaluation order.

use serde_json::Value;

use crate::error::{SchemaError, SchemaErrorKind};
use crate::registry::ValidationRegistry;
use crate::rules::{Rule, compile};
use crate::types::value_kind;

/// Parse a rule document into a registry.
///
/// Regexes are compiled here, so a registry returned from this function never
/// fails at evaluation time.
pub fn parse(input: &str) -> Result<ValidationRegistry, SchemaError> {
    if input.trim().is_empty() {
        return Err(SchemaError::new(SchemaErrorKind::Syntax, "empty input"));
    }

    let value: Value = serde_saphyr::from_str(input)
        .map_err(|e| SchemaError::new(SchemaErrorKind::Syntax, e.to_string()))?;

    from_value(value)
}

/// Build a registry from an already-decoded document.
pub fn from_value(value: Value) -> Result<ValidationRegistry, SchemaError> {
    let root = match value {
        Value::Object(map) => map,
        other => {
            return Err(SchemaError::new(
                SchemaErrorKind::TypeMismatch,
                format!("document root must be a mapping, got {}", value_kind(&other)),
            ));
        }
    };

    for key in root.keys() {
        match key.as_str() {
            "fields" => {}
            other if other.starts_with("x-") => {}
            other => {
                return Err(SchemaError::new(
                    SchemaErrorKind::TypeMismatch,
                    format!("unknown top-level field: {}", other),
                )
                .at(other));
            }
        }
    }

    let fields = match root.get("fields") {
        Some(Value::Object(map)) => map,
        Some(other) => {
            return Err(SchemaError::new(
                SchemaErrorKind::TypeMismatch,
                format!("'fields' must be a mapping, got {}", value_kind(other)),
            )
            .at("fields"));
        }
        None => {
            return Err(SchemaError::new(
                SchemaErrorKind::TypeMismatch,
                "missing required field: fields",
            ));
        }
    };

    let mut registry = ValidationRegistry::new();
    for (field, constraints) in fields {
        let path = format!("fields.{}", field);
        registry.declare(field.clone());
        for (name, rule) in constraint_entries(constraints, &path)? {
            let rule_path = format!("{}.{}", path, name);
            let rule = decode_rule(rule, &rule_path)?;
            let constraint = compile(name.clone(), rule).map_err(|e| e.at(rule_path))?;
            registry.add(field.clone(), constraint);
        }
    }

    log::debug!(
        "loaded rule document with {} field entries",
        registry.fields().count()
    );
    Ok(registry)
}

fn constraint_entries<'a>(
    value: &'a Value,
    path: &str,
) -> Result<Vec<(&'a String, &'a Value)>, SchemaError> {
    match value {
        Value::Object(map) => Ok(map.iter().collect()),
        // `age: ~` declares a field without constraints.
        Value::Null => Ok(Vec::new()),
        other => Err(SchemaError::new(
            SchemaErrorKind::TypeMismatch,
            format!("constraints must be a mapping, got {}", value_kind(other)),
        )
        .at(path)),
    }
}

fn decode_rule(value: &Value, path: &str) -> Result<Rule, SchemaError> {
    if !value.is_object() {
        return Err(SchemaError::new(
            SchemaErrorKind::TypeMismatch,
            format!("rule must be a mapping, got {}", value_kind(value)),
        )
        .at(path));
    }

    serde_json::from_value(value.clone()).map_err(|e| {
        let msg = e.to_string();
        SchemaError::new(classify_json_error(&msg), msg).at(path)
    })
}

fn classify_json_error(msg: &str) -> SchemaErrorKind {
    if msg.contains("unknown field") {
        SchemaErrorKind::UnknownOperator
    } else {
        SchemaErrorKind::TypeMismatch
    }
}
