//! Integration test suite for solution expansion
//!
//! These tests drive the public API the way a host wrapper would: construct a
//! solution from content and context, bind variables, generate the run
//! sequence.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **bindings**: set_value / add_values semantics under both policies
//! - **config**: TOML and environment configuration of solutions
//! - **defaults**: default values from the content's `env` object
//! - **determinism**: stable ordering, round trips and checksums
//! - **error_scenarios**: error taxonomy and user-friendly reporting
//! - **namespaces**: run sequences with the reserved `NS` variables bound
//! - **run_sequence**: end-to-end expansion of realistic specifications
//! - **template_functions**: built-in and custom placeholder functions

mod bindings;
mod config;
mod defaults;
mod determinism;
mod error_scenarios;
mod namespaces;
