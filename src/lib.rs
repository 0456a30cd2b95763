//! Solutions - run sequence expansion for solution specifications
//!
//! A solution specification is a JSON (or YAML) document describing how to run
//! something, with `$name` placeholders for variables. This crate binds values
//! to those variables and expands the document into a deterministic, ordered
//! sequence of fully resolved run configurations, one per combination of bound
//! values.
//!
//! # Architecture Overview
//!
//! - [`Solution`] holds the immutable context (content, user, label, branch),
//!   the parsed template and the variable bindings
//! - [`templating`] parses content into a [`TemplateTree`] and expands it with
//!   the [`Expander`]
//! - [`variables`] models bindings as a [`VariableStore`] of typed [`Scalar`]s
//! - [`serialize`] renders resolved documents (compact, pretty, checksums)
//! - [`config`] controls the run bound, binding policy and content format
//! - [`core`](crate::core) defines [`SolutionError`] and user-facing error reporting
//!
//! # Placeholder Syntax
//!
//! ```json
//! {
//!   "cmd": "deploy",
//!   "target": "$branch_target",
//!   "replicas": "${replicas}",
//!   "image": "registry/app:${tag}-$arch",
//!   "note": "costs $$5"
//! }
//! ```
//!
//! A string that is exactly one placeholder takes the bound value with its type
//! (`"${replicas}"` becomes the number `3`). Placeholders inside longer strings
//! are interpolated as text. `$$` is a literal `$`. Object keys are never
//! substituted.
//!
//! # Matrix Expansion
//!
//! Under the default [`BindingPolicy::Accumulate`], binding the same variable
//! repeatedly adds candidate values, and the run sequence covers the cartesian
//! product of all referenced variables:
//!
//! ```rust
//! use serde_json::json;
//! use solutions::Solution;
//!
//! let solution = Solution::new(r#"{"env": "$env", "arch": "$arch"}"#, "ci", "matrix", "main")?;
//! solution.set_value("env", "staging")?;
//! solution.set_value("env", "prod")?;
//! solution.add_values([("arch", json!("x86_64"))])?;
//!
//! let runs = solution.generate_run_sequence()?;
//! assert_eq!(runs, vec![
//!     json!({"env": "staging", "arch": "x86_64"}),
//!     json!({"env": "prod", "arch": "x86_64"}),
//! ]);
//! # Ok::<(), solutions::SolutionError>(())
//! ```
//!
//! [`BindingPolicy::Overwrite`] switches to last-write-wins bindings, in which
//! case every expansion yields exactly one run.
//!
//! # Defaults, Namespaces and Functions
//!
//! - Literal members of a top-level `"env"` object are default values that
//!   caller binds replace
//! - [`Solution::generate_run_sequence_for`] binds the reserved `NS` and
//!   `NS_SELECTOR` variables for one call
//! - `${name|func}` pipes a value through template functions; register your
//!   own with [`Solution::set_template_function`]
//!
//! # Errors
//!
//! Every fallible operation returns [`Result`] with a [`SolutionError`]:
//! `MalformedTemplate` at construction, `InvalidVariableName` and
//! `InvalidBinding` when binding, `UnboundVariable`, `TemplateFunction` and
//! `ExpansionTooLarge` when expanding. Failed operations never leave partial state behind.

pub mod config;
pub mod constants;
pub mod core;
pub mod serialize;
pub mod solution;
pub mod templating;
pub mod variables;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{BindingPolicy, ContentFormat, SolutionConfig};
pub use crate::core::{ErrorContext, Result, SolutionError, user_friendly_error};
pub use solution::{Solution, SolutionContext};
pub use templating::{
    Expander, FunctionRegistry, Reference, RunConfiguration, TemplateFunction, TemplateNode, TemplateTree,
};
pub use variables::{Scalar, VariableStore};
