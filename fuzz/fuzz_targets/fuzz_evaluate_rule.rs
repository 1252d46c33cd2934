#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use formval::FieldState;
use formval::rules::{Rule, compile_rule};
use libfuzzer_sys::fuzz_target;
use serde_json::Value;

/// Generate an arbitrary Rule from fuzzer bytes.
fn arbitrary_rule(u: &mut Unstructured<'_>) -> arbitrary::Result<Rule> {
    Ok(Rule {
        message: String::arbitrary(u)?,
        required: Option::<bool>::arbitrary(u)?,
        min_length: Option::<u8>::arbitrary(u)?.map(usize::from),
        max_length: Option::<u8>::arbitrary(u)?.map(usize::from),
        contains: Option::<String>::arbitrary(u)?,
        starts_with: Option::<String>::arbitrary(u)?,
        ends_with: Option::<String>::arbitrary(u)?,
        regex: Option::<String>::arbitrary(u)?,
        any_of: {
            if bool::arbitrary(u)? {
                let len = u.int_in_range(0..=5)?;
                let mut v = Vec::with_capacity(len);
                for _ in 0..len {
                    v.push(arbitrary_value(u)?);
                }
                Some(v)
            } else {
                None
            }
        },
        gt: Option::<f64>::arbitrary(u)?,
        lt: Option::<f64>::arbitrary(u)?,
        gte: Option::<f64>::arbitrary(u)?,
        lte: Option::<f64>::arbitrary(u)?,
        equals_field: Option::<String>::arbitrary(u)?,
    })
}

/// Generate a simple arbitrary JSON value from fuzzer bytes.
fn arbitrary_value(u: &mut Unstructured<'_>) -> arbitrary::Result<Value> {
    match u.int_in_range(0..=4)? {
        0 => Ok(Value::Null),
        1 => Ok(Value::Bool(bool::arbitrary(u)?)),
        2 => {
            let n = f64::arbitrary(u)?;
            Ok(serde_json::Number::from_f64(n)
                .map(Value::Number)
                .unwrap_or(Value::Null))
        }
        3 => Ok(Value::String(String::arbitrary(u)?)),
        _ => Ok(Value::Null),
    }
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);

    let rule = match arbitrary_rule(&mut u) {
        Ok(r) => r,
        Err(_) => return,
    };

    let value = match arbitrary_value(&mut u) {
        Ok(v) => v,
        Err(_) => return,
    };

    let form = match arbitrary_value(&mut u) {
        Ok(other) => FieldState::new().with("other", other),
        Err(_) => return,
    };

    if let Ok(compiled) = compile_rule(rule) {
        let _ = compiled.evaluate(&value, &form);
    }
});
