//! Error taxonomy and reporting.

use anyhow::{Context, Result};
use serde_json::json;
use solutions::test_utils::{init_test_logging, solution_fixture};
use solutions::{Solution, SolutionConfig, SolutionError, user_friendly_error};

#[test]
fn test_malformed_templates() {
    init_test_logging(None);
    let cases = [
        ("{\"a\": ", ""),
        (r#"{"a": "trailing $"}"#, "/a"),
        (r#"{"a": ["ok", "${open"]}"#, "/a/1"),
        (r#"{"a": {"b": "${}"}}"#, "/a/b"),
        (r#"{"a": "${not-valid}"}"#, "/a"),
        (r#"{"a": "$9"}"#, "/a"),
    ];
    for (content, expected_pointer) in cases {
        match Solution::new(content, "u", "l", "b") {
            Err(SolutionError::MalformedTemplate {
                pointer,
                ..
            }) => assert_eq!(pointer, expected_pointer, "content {content}"),
            other => panic!("expected MalformedTemplate for {content}, got {other:?}"),
        }
    }
}

#[test]
fn test_unbound_variable_returns_no_sequence() -> Result<()> {
    init_test_logging(None);
    let solution = solution_fixture(r#"{"cmd": "run", "target": "$x"}"#)?;
    let err = solution.generate_run_sequence().unwrap_err();
    assert_eq!(
        err,
        SolutionError::UnboundVariable {
            name: "x".to_string(),
            suggestions: vec![],
        }
    );
    Ok(())
}

#[test]
fn test_first_unbound_in_template_order_is_reported() -> Result<()> {
    init_test_logging(None);
    let solution = solution_fixture(r#"{"one": "$first", "two": "$second"}"#)?;
    solution.set_value("second", 2)?;
    assert!(matches!(
        solution.generate_run_sequence(),
        Err(SolutionError::UnboundVariable { ref name, .. }) if name == "first"
    ));
    Ok(())
}

#[test]
fn test_unbound_variable_friendly_suggestion() -> Result<()> {
    init_test_logging(None);
    let solution = solution_fixture(r#"{"target": "$branch"}"#)?;
    solution.set_value("brnch", "main")?;

    let err = solution
        .generate_run_sequence()
        .context("generating runs for test-label")
        .unwrap_err();
    let ctx = user_friendly_error(err);
    assert_eq!(ctx.suggestion.as_deref(), Some("Did you mean: brnch?"));
    assert!(ctx.to_string().starts_with("Unbound variable: 'branch'"));
    Ok(())
}

#[test]
fn test_invalid_variable_names() -> Result<()> {
    init_test_logging(None);
    let solution = solution_fixture("{}")?;
    for name in ["", "1st", "has space", "a-b", "a.b"] {
        assert_eq!(
            solution.set_value(name, "v").unwrap_err(),
            SolutionError::InvalidVariableName {
                name: name.to_string()
            }
        );
    }
    assert!(solution.variable_names().is_empty());
    Ok(())
}

#[test]
fn test_non_scalar_bindings_rejected() -> Result<()> {
    init_test_logging(None);
    let solution = solution_fixture("{}")?;
    for value in [json!(null), json!([1]), json!({"k": "v"})] {
        assert!(matches!(
            solution.add_values([("v", value)]),
            Err(SolutionError::InvalidBinding { .. })
        ));
    }
    assert!(solution.values("v").is_none());
    Ok(())
}

#[test]
fn test_expansion_too_large_returns_no_sequence() -> Result<()> {
    init_test_logging(None);
    let config = SolutionConfig::default().with_max_runs(10);
    let solution = Solution::with_config(r#"["$a", "$b"]"#, "u", "l", "b", config)?;
    solution.replace_values("a", 0..4)?;
    solution.replace_values("b", 0..3)?;

    assert_eq!(solution.run_count()?, 12);
    let err = solution.generate_run_sequence().unwrap_err();
    assert_eq!(
        err,
        SolutionError::ExpansionTooLarge {
            size: 12,
            limit: 10,
        }
    );
    let ctx = user_friendly_error(err.into());
    assert!(ctx.suggestion.is_some());
    assert!(ctx.details.is_some());
    Ok(())
}
