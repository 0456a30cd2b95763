//! Determinism, round trips and checksums of generated runs.

use anyhow::Result;
use serde_json::{Value, json};
use solutions::serialize::{checksum, to_compact_string, to_pretty_string};
use solutions::test_utils::{init_test_logging, solution_fixture};
use solutions::{Scalar, Solution};
use std::collections::HashSet;

fn matrix_solution() -> Result<Solution> {
    let solution = solution_fixture(
        r#"{"z_last_key": "$flag", "os": "$os", "steps": ["build-$os", {"threads": "$threads"}]}"#,
    )?;
    solution.replace_values("os", ["linux", "macos", "windows"])?;
    solution.replace_values("threads", [1, 4])?;
    solution.replace_values("flag", [true, false])?;
    Ok(solution)
}

#[test]
fn test_repeated_generation_is_identical() -> Result<()> {
    init_test_logging(None);
    let solution = matrix_solution()?;
    let first = solution.generate_run_sequence()?;
    let second = solution.generate_run_sequence()?;
    assert_eq!(first.len(), 12);
    assert_eq!(first, second);
    assert_eq!(solution.generate_run_sequence_json()?, solution.generate_run_sequence_json()?);
    Ok(())
}

#[test]
fn test_key_order_matches_content() -> Result<()> {
    init_test_logging(None);
    let solution = matrix_solution()?;
    let runs = solution.generate_run_sequence()?;
    let Value::Object(map) = &runs[0] else {
        panic!("expected an object, got {}", runs[0]);
    };
    let keys: Vec<&str> = map.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["z_last_key", "os", "steps"]);
    Ok(())
}

#[test]
fn test_scalars_round_trip_through_serialization() -> Result<()> {
    init_test_logging(None);
    let solution = solution_fixture(r#"{"s": "$s", "i": "$i", "n": "$n", "f": "$f", "b": "$b"}"#)?;
    let bound = [
        ("s", Scalar::from("text with \"quotes\" and ünicode")),
        ("i", Scalar::from(-42)),
        ("n", Scalar::from(u64::MAX)),
        ("f", Scalar::try_from(2.5).map_err(|n| anyhow::anyhow!("bad float {n}"))?),
        ("b", Scalar::from(true)),
    ];
    for (name, value) in &bound {
        solution.set_value(name, value.clone())?;
    }

    let document = solution.generate_run_sequence()?.remove(0);
    for text in [to_compact_string(&document), to_pretty_string(&document)] {
        let parsed: Value = serde_json::from_str(&text)?;
        for (name, value) in &bound {
            assert_eq!(Scalar::from_value(&parsed[*name]).as_ref(), Some(value), "field {name}");
        }
    }
    Ok(())
}

#[test]
fn test_checksums_identify_runs() -> Result<()> {
    init_test_logging(None);
    let solution = matrix_solution()?;
    let runs = solution.generate_run_sequence()?;

    let sums: Vec<String> = runs.iter().map(checksum).collect();
    let unique: HashSet<&String> = sums.iter().collect();
    assert_eq!(unique.len(), runs.len());

    let again: Vec<String> = solution.generate_run_sequence()?.iter().map(checksum).collect();
    assert_eq!(sums, again);
    Ok(())
}

#[test]
fn test_runs_are_independent_values() -> Result<()> {
    init_test_logging(None);
    let solution = solution_fixture(r#"{"list": ["$x"]}"#)?;
    solution.replace_values("x", ["a", "b"])?;

    let mut runs = solution.generate_run_sequence()?;
    runs[0]["list"][0] = json!("mutated");
    assert_eq!(runs[1], json!({"list": ["b"]}));
    assert_eq!(solution.generate_run_sequence()?[0], json!({"list": ["a"]}));
    Ok(())
}
