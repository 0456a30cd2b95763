//! Configuration of solutions from TOML and the environment.

use anyhow::Result;
use serde_json::json;
use serial_test::serial;
use solutions::constants::{ENV_BINDING_POLICY, ENV_FORMAT, ENV_MAX_RUNS};
use solutions::test_utils::init_test_logging;
use solutions::{BindingPolicy, ContentFormat, Solution, SolutionConfig, SolutionError};

fn clear_env() {
    // SAFETY: every test touching SOLUTIONS_* variables runs under #[serial].
    unsafe {
        std::env::remove_var(ENV_MAX_RUNS);
        std::env::remove_var(ENV_BINDING_POLICY);
        std::env::remove_var(ENV_FORMAT);
    }
}

#[test]
fn test_toml_config_drives_solution() -> Result<()> {
    init_test_logging(None);
    let config = SolutionConfig::from_toml_str(
        r#"
max_runs = 2
binding_policy = "accumulate"
format = "yaml"
"#,
    )?;
    let solution = Solution::with_config("n: $n\n", "u", "l", "b", config)?;
    solution.replace_values("n", [1, 2])?;
    assert_eq!(solution.generate_run_sequence()?, vec![json!({"n": 1}), json!({"n": 2})]);

    solution.set_value("n", 3)?;
    assert!(matches!(
        solution.generate_run_sequence(),
        Err(SolutionError::ExpansionTooLarge { size: 3, limit: 2 })
    ));
    Ok(())
}

#[test]
#[serial]
fn test_env_overrides_toml() -> Result<()> {
    init_test_logging(None);
    clear_env();
    // SAFETY: see clear_env
    unsafe {
        std::env::set_var(ENV_BINDING_POLICY, "overwrite");
        std::env::set_var(ENV_FORMAT, "json");
    }

    let config = SolutionConfig::from_toml_str("binding_policy = \"accumulate\"\nformat = \"yaml\"")?
        .with_env_overrides()?;
    clear_env();

    assert_eq!(config.binding_policy, BindingPolicy::Overwrite);
    assert_eq!(config.format, ContentFormat::Json);
    Ok(())
}

#[test]
#[serial]
fn test_invalid_env_value_is_config_error() {
    init_test_logging(None);
    clear_env();
    // SAFETY: see clear_env
    unsafe {
        std::env::set_var(ENV_MAX_RUNS, "-1");
    }

    let result = SolutionConfig::default().with_env_overrides();
    clear_env();

    assert!(matches!(result, Err(SolutionError::Config { .. })));
}

#[test]
fn test_config_serializes_to_toml() -> Result<()> {
    init_test_logging(None);
    let config = SolutionConfig::default()
        .with_max_runs(42)
        .with_binding_policy(BindingPolicy::Overwrite)
        .with_env_defaults(false);
    let text = toml::to_string(&config)?;
    assert_eq!(SolutionConfig::from_toml_str(&text)?, config);
    Ok(())
}
