#![no_main]

use arbitrary::Arbitrary;
use formval::{FieldAccess, FieldState, Form, ValidationRegistry};
use libfuzzer_sys::fuzz_target;
use serde_json::json;

#[derive(Arbitrary, Debug)]
enum Op {
    Set { field: u8, value: i32 },
    Validate,
    Reset,
    Merge { field: u8, value: i32 },
}

const FIELDS: [&str; 3] = ["a", "b", "c"];

fn form() -> Form {
    let registry = ValidationRegistry::new()
        .rule("a", "positive", "must be positive", |v, _| {
            v.as_i64().is_some_and(|n| n > 0)
        })
        .rule("b", "below_a", "must be below a", |v, form| {
            match (v.as_i64(), form.get("a").and_then(|a| a.as_i64())) {
                (Some(b), Some(a)) => b < a,
                _ => false,
            }
        });
    let state = FieldState::new().with("a", 1).with("b", 0).with("c", 0);
    Form::new(state, registry).unwrap()
}

fuzz_target!(|ops: Vec<Op>| {
    let mut form = form();

    for op in ops {
        match op {
            Op::Set { field, value } => {
                let field = FIELDS[usize::from(field) % FIELDS.len()];
                form.value().set(field, json!(value)).unwrap();
                assert_eq!(form.get(field), Some(&json!(value)));
            }
            Op::Validate => {
                let ok = form.validate();
                assert_eq!(ok, !form.errors().is_error());
            }
            Op::Reset => form.reset(),
            Op::Merge { field, value } => {
                let field = FIELDS[usize::from(field) % FIELDS.len()];
                form.set_value(json!({ field: value })).unwrap();
                assert!(!form.errors().is_error());
            }
        }

        let any = form.errors().iter().any(|(_, list)| !list.is_empty());
        assert_eq!(form.errors().is_error(), any);
        assert_eq!(form.errors().len(), FIELDS.len());
        if !form.dirty() {
            assert!(!any);
        }
    }
});
