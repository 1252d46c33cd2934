use formval::{
    Constraint, FieldError, FieldState, FormErrors, ValidationEngine, ValidationRegistry,
};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn state() -> FieldState {
    FieldState::new().with("code", "ab").with("qty", 0)
}

fn registry() -> ValidationRegistry {
    ValidationRegistry::new()
        .rule("code", "upper", "must be upper case", |v, _| {
            v.as_str().is_some_and(|s| s == s.to_uppercase())
        })
        .rule("code", "len", "must be 3 chars", |v, _| {
            v.as_str().is_some_and(|s| s.len() == 3)
        })
        .rule("qty", "positive", "must be positive", |v, _| {
            v.as_i64().is_some_and(|n| n > 0)
        })
}

#[test]
fn failures_follow_registration_order() {
    let form = state();
    let engine = ValidationEngine::new(registry(), form.names());
    assert_eq!(
        engine.check_field("code", &json!("x"), &form),
        [
            FieldError::new("upper", "must be upper case"),
            FieldError::new("len", "must be 3 chars"),
        ]
    );
}

#[test]
fn every_constraint_runs_even_after_a_failure() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = ValidationRegistry::new();
    for name in ["first", "second", "third"] {
        let calls = Arc::clone(&calls);
        registry.add(
            "code",
            Constraint::new(name, "fails", move |_, _| {
                calls.fetch_add(1, Ordering::SeqCst);
                false
            }),
        );
    }
    let form = state();
    let engine = ValidationEngine::new(registry, form.names());
    assert_eq!(engine.check_field("code", &json!("A"), &form).len(), 3);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
fn unregistered_field_is_always_valid() {
    let form = state();
    let engine = ValidationEngine::new(ValidationRegistry::new(), form.names());
    assert!(engine.check_field("qty", &json!(-1), &form).is_empty());
}

#[test]
fn duplicate_constraint_name_replaces_in_place() {
    let registry = registry().rule("code", "upper", "shout it", |_, _| false);
    let names: Vec<&str> = registry
        .constraints("code")
        .iter()
        .map(|c| c.name())
        .collect();
    assert_eq!(names, ["upper", "len"]);
    assert_eq!(registry.constraints("code")[0].message(), "shout it");
}

#[test]
fn run_validation_merges_one_field_when_dirty() {
    let form = state();
    let mut engine = ValidationEngine::new(registry(), form.names());
    assert!(!engine.validate(&form));
    assert_eq!(engine.errors().field("qty").unwrap().len(), 1);

    let next = engine.run_validation("code", &json!("ABC"), &form);
    assert!(next.field("code").unwrap().is_empty());
    // qty untouched, still failing.
    assert_eq!(next.field("qty").unwrap().len(), 1);
    assert!(next.is_error());

    // run_validation only computes; apply stores.
    assert_eq!(engine.errors().field("code").unwrap().len(), 2);
    assert_eq!(engine.apply("code", &json!("ABC"), &form), &next);
    assert_eq!(engine.errors(), &next);
}

#[test]
fn apply_to_unknown_field_keeps_snapshot() {
    let form = state();
    let mut engine = ValidationEngine::new(registry(), form.names());
    engine.validate(&form);
    let before = engine.errors().clone();
    assert_eq!(engine.apply("zzz", &json!(1), &form), &before);
}

#[test]
fn validate_keeps_the_engine_field_set() {
    let mut engine = ValidationEngine::new(registry(), ["code", "qty"]);
    let foreign = FieldState::new().with("q", 1).with("r", 2).with("qty", 5);
    assert!(!engine.validate(&foreign));

    let names: Vec<&str> = engine.errors().names().collect();
    assert_eq!(names, ["code", "qty"]);
    // `code` is missing from the state and is checked as null.
    assert_eq!(engine.errors().field("code").unwrap().len(), 2);
    assert!(engine.errors().field("qty").unwrap().is_empty());
}

#[test]
fn run_validation_returns_stored_snapshot_while_clean() {
    let form = state();
    let engine = ValidationEngine::new(registry(), form.names());
    let out = engine.run_validation("code", &json!("x"), &form);
    assert_eq!(&out, engine.errors());
    assert!(!out.is_error());
}

#[test]
fn validate_returns_negated_aggregate() {
    let form = FieldState::new().with("code", "ABC").with("qty", 3);
    let mut engine = ValidationEngine::new(registry(), form.names());
    assert!(engine.validate(&form));
    assert!(engine.is_dirty());
    assert!(!engine.errors().is_error());
}

#[test]
fn reset_closes_gate_and_keeps_field_set() {
    let form = state();
    let mut engine = ValidationEngine::new(registry(), form.names());
    engine.validate(&form);
    engine.reset();
    assert!(!engine.is_dirty());
    assert_eq!(engine.errors(), &FormErrors::empty(["code", "qty"]));
}

// ─── FormErrors shape ───────────────────────────────────────────────────────

#[test]
fn form_errors_serialize_with_is_error_first() {
    let errors = FormErrors::from_lists([
        ("age", vec![FieldError::new("minAge", "too young")]),
        ("name", vec![]),
    ]);
    let text = serde_json::to_string(&errors).unwrap();
    assert_eq!(
        text,
        r#"{"isError":true,"age":[{"constraint":"minAge","message":"too young"}],"name":[]}"#
    );
}

#[test]
fn form_errors_deserialize_recomputes_aggregate() {
    let errors: FormErrors = serde_json::from_value(json!({
        "a": [],
        "b": [{ "constraint": "c", "message": "m" }]
    }))
    .unwrap();
    assert!(errors.is_error());
    assert_eq!(errors.count(), 1);

    let corrupt = serde_json::from_value::<FormErrors>(json!({
        "isError": false,
        "b": [{ "constraint": "c", "message": "m" }]
    }));
    assert!(corrupt.is_err());
}

#[test]
fn with_field_ignores_unknown_names() {
    let errors = FormErrors::empty(["a"]);
    let next = errors.with_field("zzz", vec![FieldError::new("c", "m")]);
    assert_eq!(next, errors);
    assert_eq!(next.len(), 1);
}
