//! Run sequences generated for a namespace.

use anyhow::Result;
use serde_json::json;
use solutions::templating::functions::namespace_selector;
use solutions::test_utils::{init_test_logging, solution_fixture};
use solutions::{Scalar, SolutionError};

const NAMESPACED_SPEC: &str = r#"{
    "metadata": {"namespace": "$NS", "labels": {"ns": "$NS_SELECTOR"}},
    "image": "app:$tag"
}"#;

#[test]
fn test_reserved_variables_are_bound() -> Result<()> {
    init_test_logging(None);
    let solution = solution_fixture(NAMESPACED_SPEC)?;
    solution.set_value("tag", "v3")?;

    let runs = solution.generate_run_sequence_for("team-a")?;
    assert_eq!(
        runs,
        vec![json!({
            "metadata": {"namespace": "team-a", "labels": {"ns": namespace_selector("team-a")}},
            "image": "app:v3"
        })]
    );
    Ok(())
}

#[test]
fn test_namespace_is_not_stored() -> Result<()> {
    init_test_logging(None);
    let solution = solution_fixture(NAMESPACED_SPEC)?;
    solution.set_value("tag", "v3")?;
    solution.generate_run_sequence_for("team-a")?;

    assert_eq!(solution.variable_names(), vec!["tag".to_string()]);
    assert!(matches!(
        solution.generate_run_sequence(),
        Err(SolutionError::UnboundVariable { ref name, .. }) if name == "NS"
    ));
    Ok(())
}

#[test]
fn test_namespace_overrides_caller_binding() -> Result<()> {
    init_test_logging(None);
    let solution = solution_fixture(r#"["$NS", "$tag"]"#)?;
    solution.set_value("NS", "from-caller")?;
    solution.set_value("NS", "other")?;
    solution.set_value("tag", "x")?;

    assert_eq!(solution.generate_run_sequence_for("prod")?, vec![json!(["prod", "x"])]);
    assert_eq!(solution.run_count()?, 2);
    assert_eq!(
        solution.values("NS"),
        Some(vec![Scalar::from("from-caller"), Scalar::from("other")])
    );
    Ok(())
}

#[test]
fn test_namespaces_give_distinct_selectors() -> Result<()> {
    init_test_logging(None);
    let solution = solution_fixture(r#"{"sel": "$NS_SELECTOR", "again": "${NS|selector}"}"#)?;

    let a = solution.generate_run_sequence_for("alpha")?;
    let b = solution.generate_run_sequence_for("beta")?;
    assert_ne!(a, b);
    assert_eq!(a[0]["sel"], a[0]["again"]);
    Ok(())
}

#[test]
fn test_namespaced_run_configurations_record_bindings() -> Result<()> {
    init_test_logging(None);
    let solution = solution_fixture(NAMESPACED_SPEC)?;
    solution.replace_values("tag", ["v1", "v2"])?;

    let runs = solution.run_configurations_for("staging")?;
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[1].binding("NS"), Some(&Scalar::from("staging")));
    assert_eq!(runs[1].binding("tag"), Some(&Scalar::from("v2")));
    Ok(())
}
