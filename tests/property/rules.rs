use formval::FieldState;
use formval::rules::{Rule, compile_rule};
use proptest::prelude::*;
use serde_json::Value;

fn check(rule: Rule, value: &Value) -> bool {
    compile_rule(rule)
        .unwrap()
        .evaluate(value, &FieldState::new())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    // min_length/max_length agree with chars().count()
    #[test]
    fn length_bounds_match_char_count(value in "\\PC{0,20}", min in 0usize..10, span in 0usize..10) {
        let max = min + span;
        let rule = Rule { min_length: Some(min), max_length: Some(max), ..Rule::new("len") };
        let n = value.chars().count();
        prop_assert_eq!(check(rule, &Value::String(value)), n >= min && n <= max);
    }

    // gt and lte are complements on numbers
    #[test]
    fn gt_lte_complementary(a in -1000.0f64..1000.0, b in -1000.0f64..1000.0) {
        let v = serde_json::json!(a);
        let gt = check(Rule { gt: Some(b), ..Rule::new("gt") }, &v);
        let lte = check(Rule { lte: Some(b), ..Rule::new("lte") }, &v);
        prop_assert!(gt != lte, "a={}, b={}", a, b);
    }

    // contains agrees with str::contains
    #[test]
    fn contains_matches_std(value in "[a-z ]{0,30}", needle in "[a-z]{0,4}") {
        let rule = Rule { contains: Some(needle.clone()), ..Rule::new("contains") };
        prop_assert_eq!(check(rule, &Value::String(value.clone())), value.contains(&needle));
    }

    // a regex compiled from an escaped literal matches exactly that literal
    #[test]
    fn escaped_regex_matches_literal(literal in "\\PC{1,12}") {
        let rule = Rule {
            regex: Some(format!("^{}$", regex::escape(&literal))),
            ..Rule::new("literal")
        };
        prop_assert!(check(rule, &Value::String(literal)));
    }
}
