use formval::{FieldAccess, FieldState, Form, ValidationRegistry};
use proptest::prelude::*;
use serde_json::json;

/// Three numeric fields; `a` must be positive, `b` even, `c` unconstrained.
fn form_for(a: i64, b: i64, c: i64) -> Form {
    let registry = ValidationRegistry::new()
        .rule("a", "positive", "must be positive", |v, _| {
            v.as_i64().is_some_and(|n| n > 0)
        })
        .rule("b", "even", "must be even", |v, _| {
            v.as_i64().is_some_and(|n| n % 2 == 0)
        })
        .rule("b", "small", "must be below 100", |v, _| {
            v.as_i64().is_some_and(|n| n < 100)
        });
    let state = FieldState::new().with("a", a).with("b", b).with("c", c);
    Form::new(state, registry).unwrap()
}

fn assert_aggregate_consistent(form: &Form) -> Result<(), TestCaseError> {
    let any = form.errors().iter().any(|(_, list)| !list.is_empty());
    prop_assert_eq!(form.errors().is_error(), any);
    prop_assert_eq!(form.errors().len(), form.fields().len());
    Ok(())
}

#[derive(Clone, Debug)]
enum Op {
    Set(&'static str, i64),
    Validate,
    Reset,
    Merge(i64),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (prop::sample::select(vec!["a", "b", "c"]), -200i64..200).prop_map(|(f, v)| Op::Set(f, v)),
        Just(Op::Validate),
        Just(Op::Reset),
        (-200i64..200).prop_map(Op::Merge),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    // validate() returns !is_error and the aggregate matches the lists
    #[test]
    fn validate_result_matches_lists(a in -50i64..50, b in -50i64..150, c in any::<i64>()) {
        let mut form = form_for(a, b, c);
        let ok = form.validate();
        prop_assert_eq!(ok, !form.errors().is_error());
        prop_assert_eq!(form.errors().field("a").unwrap().is_empty(), a > 0);
        prop_assert_eq!(
            form.errors().field("b").unwrap().len(),
            usize::from(b % 2 != 0) + usize::from(b >= 100)
        );
        prop_assert!(form.errors().field("c").unwrap().is_empty());
        assert_aggregate_consistent(&form)?;
    }

    // validate() twice with unchanged state is idempotent
    #[test]
    fn validate_is_idempotent(a in -50i64..50, b in -50i64..150) {
        let mut form = form_for(a, b, 0);
        let first = form.validate();
        let snapshot = form.errors().clone();
        prop_assert_eq!(form.validate(), first);
        prop_assert_eq!(form.errors(), &snapshot);
    }

    // any operation sequence keeps the aggregate and the key set consistent
    #[test]
    fn aggregate_holds_across_operation_sequences(ops in prop::collection::vec(op(), 0..40)) {
        let mut form = form_for(1, 2, 3);
        for op in ops {
            match op {
                Op::Set(field, v) => form.value().set(field, json!(v)).unwrap(),
                Op::Validate => { form.validate(); }
                Op::Reset => form.reset(),
                Op::Merge(v) => form.set_value(json!({ "b": v })).unwrap(),
            }
            assert_aggregate_consistent(&form)?;
        }
    }

    // once dirty, a single write leaves the same errors as a full validate
    #[test]
    fn dirty_write_matches_full_validate(a in -50i64..50, b in -50i64..150, next in -50i64..150) {
        let mut form = form_for(a, b, 0);
        form.validate();
        form.value().set("b", json!(next)).unwrap();
        let incremental = form.errors().clone();
        form.validate();
        prop_assert_eq!(&incremental, form.errors());
    }
}
