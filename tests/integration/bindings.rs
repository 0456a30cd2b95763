//! Binding semantics as seen through expansion.

use anyhow::Result;
use serde_json::json;
use solutions::test_utils::{init_test_logging, solution_fixture};
use solutions::{BindingPolicy, Scalar, Solution, SolutionConfig, SolutionError};

#[test]
fn test_accumulate_skips_duplicate_values() -> Result<()> {
    init_test_logging(None);
    let solution = solution_fixture(r#"["$x"]"#)?;
    solution.set_value("x", "same")?;
    solution.set_value("x", "same")?;
    solution.add_values([("x", json!("same"))])?;

    assert_eq!(solution.values("x"), Some(vec![Scalar::from("same")]));
    assert_eq!(solution.generate_run_sequence()?.len(), 1);
    Ok(())
}

#[test]
fn test_values_keep_binding_order() -> Result<()> {
    init_test_logging(None);
    let solution = solution_fixture(r#"{"v": "$v"}"#)?;
    for v in [3, 1, 2] {
        solution.set_value("v", v)?;
    }

    let order: Vec<_> = solution
        .generate_run_sequence()?
        .into_iter()
        .map(|doc| doc["v"].clone())
        .collect();
    assert_eq!(order, vec![json!(3), json!(1), json!(2)]);
    Ok(())
}

#[test]
fn test_overwrite_policy_last_write_wins() -> Result<()> {
    init_test_logging(None);
    let config = SolutionConfig::default().with_binding_policy(BindingPolicy::Overwrite);
    let solution = Solution::with_config(r#"{"v": "$v"}"#, "u", "l", "b", config)?;
    solution.set_value("v", 1)?;
    solution.set_value("v", 2)?;
    solution.add_values([("v", json!(3))])?;

    assert_eq!(solution.generate_run_sequence()?, vec![json!({"v": 3})]);
    Ok(())
}

#[test]
fn test_failed_batch_leaves_prior_state() -> Result<()> {
    init_test_logging(None);
    let solution = solution_fixture(r#"{"a": "$a", "b": "$b"}"#)?;
    solution.set_value("a", 1)?;
    solution.set_value("b", 1)?;
    let before = solution.generate_run_sequence()?;

    let result = solution.add_values([
        ("a", json!(2)),
        ("b", json!(2)),
        ("bad name", json!(3)),
    ]);
    assert!(matches!(result, Err(SolutionError::InvalidBinding { .. })));
    assert_eq!(solution.generate_run_sequence()?, before);

    let result = solution.add_values([("a", json!(2)), ("b", json!(null))]);
    assert!(matches!(result, Err(SolutionError::InvalidBinding { ref name, .. }) if name == "b"));
    assert_eq!(solution.generate_run_sequence()?, before);
    Ok(())
}

#[test]
fn test_empty_batch_is_a_no_op() -> Result<()> {
    init_test_logging(None);
    let solution = solution_fixture("{}")?;
    solution.add_values(Vec::<(String, serde_json::Value)>::new())?;
    assert!(solution.variable_names().is_empty());
    Ok(())
}

#[test]
fn test_batch_from_json_object() -> Result<()> {
    init_test_logging(None);
    let solution = solution_fixture(r#"{"host": "$host", "port": "$port"}"#)?;
    let bindings = json!({"host": "db.internal", "port": 5432});
    let serde_json::Value::Object(map) = bindings else {
        unreachable!("literal is an object");
    };
    solution.add_values(map)?;

    assert_eq!(
        solution.generate_run_sequence()?,
        vec![json!({"host": "db.internal", "port": 5432})]
    );
    Ok(())
}

#[test]
fn test_bindings_are_independent_of_template() -> Result<()> {
    init_test_logging(None);
    let solution = solution_fixture(r#"{"a": "$a"}"#)?;
    solution.set_value("unrelated", "x")?;
    solution.set_value("a", true)?;

    assert_eq!(solution.variable_names(), vec!["a".to_string(), "unrelated".to_string()]);
    assert_eq!(solution.generate_run_sequence()?, vec![json!({"a": true})]);
    Ok(())
}
