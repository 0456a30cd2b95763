//! Default values declared in the content's `env` object.

use anyhow::Result;
use serde_json::json;
use solutions::test_utils::{init_test_logging, solution_fixture};
use solutions::{BindingPolicy, Scalar, Solution, SolutionConfig, SolutionError};

const SPEC_WITH_DEFAULTS: &str = r#"{
    "env": {"region": "eu-west", "replicas": 2},
    "deploy": {"region": "$region", "replicas": "$replicas", "tag": "$tag"}
}"#;

#[test]
fn test_defaults_fill_unbound_variables() -> Result<()> {
    init_test_logging(None);
    let solution = solution_fixture(SPEC_WITH_DEFAULTS)?;
    solution.set_value("tag", "v1")?;

    assert!(solution.is_defaulted("region"));
    assert_eq!(
        solution.generate_run_sequence()?,
        vec![json!({
            "env": {"region": "eu-west", "replicas": 2},
            "deploy": {"region": "eu-west", "replicas": 2, "tag": "v1"}
        })]
    );
    Ok(())
}

#[test]
fn test_caller_binds_override_defaults() -> Result<()> {
    init_test_logging(None);
    let solution = solution_fixture(SPEC_WITH_DEFAULTS)?;
    solution.set_value("tag", "v1")?;
    solution.set_value("region", "us-east")?;
    solution.set_value("region", "ap-south")?;

    let regions: Vec<_> = solution
        .generate_run_sequence()?
        .into_iter()
        .map(|doc| doc["deploy"]["region"].clone())
        .collect();
    assert_eq!(regions, vec![json!("us-east"), json!("ap-south")]);
    assert!(!solution.is_defaulted("region"));
    Ok(())
}

#[test]
fn test_overwrite_policy_overrides_default_once() -> Result<()> {
    init_test_logging(None);
    let config = SolutionConfig::default().with_binding_policy(BindingPolicy::Overwrite);
    let solution = Solution::with_config(SPEC_WITH_DEFAULTS, "u", "l", "b", config)?;
    solution.add_values([("replicas", json!(5)), ("tag", json!("v2"))])?;

    let runs = solution.generate_run_sequence()?;
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0]["deploy"], json!({"region": "eu-west", "replicas": 5, "tag": "v2"}));
    Ok(())
}

#[test]
fn test_unset_restores_default() -> Result<()> {
    init_test_logging(None);
    let solution = solution_fixture(SPEC_WITH_DEFAULTS)?;
    solution.set_value("replicas", 9)?;
    assert_eq!(solution.values("replicas"), Some(vec![Scalar::from(9)]));

    assert!(solution.unset_value("replicas"));
    assert_eq!(solution.values("replicas"), Some(vec![Scalar::from(2)]));
    assert!(!solution.unset_value("replicas"));
    Ok(())
}

#[test]
fn test_defaults_can_be_disabled() -> Result<()> {
    init_test_logging(None);
    let config = SolutionConfig::default().with_env_defaults(false);
    let solution = Solution::with_config(SPEC_WITH_DEFAULTS, "u", "l", "b", config)?;
    solution.set_value("tag", "v1")?;

    assert_eq!(solution.variable_names(), vec!["tag".to_string()]);
    assert!(matches!(
        solution.generate_run_sequence(),
        Err(SolutionError::UnboundVariable { ref name, .. }) if name == "region"
    ));
    Ok(())
}

#[test]
fn test_yaml_env_defaults() -> Result<()> {
    init_test_logging(None);
    let config = SolutionConfig::default().with_format(solutions::ContentFormat::Yaml);
    let content = "env:\n  port: 8080\n  debug: true\nserve:\n  port: $port\n  debug: $debug\n";
    let solution = Solution::with_config(content, "u", "l", "b", config)?;

    let runs = solution.generate_run_sequence()?;
    assert_eq!(runs[0]["serve"], json!({"port": 8080, "debug": true}));
    Ok(())
}
