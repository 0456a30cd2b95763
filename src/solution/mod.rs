//! The solution object: context, bindings and run sequence generation.
//!
//! A [`Solution`] is built once from specification content plus three pieces
//! of opaque context (user, label, branch). Callers then bind variables and
//! finally ask for the run sequence.
//!
//! Literal members of the content's top-level `env` object are default values
//! (unless [`SolutionConfig::env_defaults`] is off). A caller bind of the same
//! name replaces the default.
//!
//! # Namespaces
//!
//! [`Solution::generate_run_sequence_for`] generates runs for one namespace.
//! It binds the reserved variables `NS` (the namespace) and `NS_SELECTOR`
//! (its [`namespace_selector`]) on a copy of the bindings, so the solution
//! itself is left as it was.
//!
//! # Concurrency
//!
//! All methods take `&self`. The variable store and the template functions sit
//! behind one mutex: every bind runs under it, and expansion holds it for its
//! whole duration, so a batch bind is never observed half applied and an
//! expansion always sees one consistent snapshot. A `Solution` can therefore be shared across threads
//! (for example in an `Arc`) by a host that allows concurrent calls.
//!
//! # Examples
//!
//! ```rust
//! use serde_json::json;
//! use solutions::Solution;
//!
//! let solution = Solution::new(
//!     r#"{"cmd": "run", "target": "$branch_target"}"#,
//!     "alice",
//!     "nightly",
//!     "main",
//! )?;
//! solution.set_value("branch_target", "prod")?;
//!
//! let runs = solution.generate_run_sequence()?;
//! assert_eq!(runs, vec![json!({"cmd": "run", "target": "prod"})]);
//! # Ok::<(), solutions::SolutionError>(())
//! ```


use serde::Serialize;
use serde_json::Value;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::config::SolutionConfig;
use crate::constants::{DEFAULTS_SECTION, NAMESPACE_KEY, NAMESPACE_SELECTOR_KEY};
use crate::core::Result;
use crate::serialize;
use crate::templating::functions::namespace_selector;
use crate::templating::{Expander, FunctionRegistry, RunConfiguration, TemplateFunction, TemplateTree};
use crate::variables::{Scalar, VariableStore};

/// Immutable context captured when a solution is created.
///
/// None of these values are interpreted by the crate; they are carried for
/// the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SolutionContext {
    content: String,
    user: String,
    label: String,
    branch: String,
}

impl SolutionContext {
    /// Raw specification content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Requesting user.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Label of the solution.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Branch the solution was requested for.
    pub fn branch(&self) -> &str {
        &self.branch
    }
}

/// Everything callers can change after construction.
#[derive(Debug)]
struct State {
    store: VariableStore,
    functions: FunctionRegistry,
}

/// A solution specification with its variable bindings.
#[derive(Debug)]
pub struct Solution {
    context: SolutionContext,
    config: SolutionConfig,
    template: TemplateTree,
    state: Mutex<State>,
}

impl Solution {
    /// Create a solution with the default [`SolutionConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::SolutionError::MalformedTemplate`] if `content` cannot
    /// be parsed or uses invalid placeholder syntax.
    pub fn new(
        content: impl Into<String>,
        user: impl Into<String>,
        label: impl Into<String>,
        branch: impl Into<String>,
    ) -> Result<Self> {
        Self::with_config(content, user, label, branch, SolutionConfig::default())
    }

    /// Create a solution with an explicit configuration.
    ///
    /// # Errors
    ///
    /// - [`crate::SolutionError::Config`] if `config` is invalid
    /// - [`crate::SolutionError::MalformedTemplate`] if `content` cannot be parsed
    pub fn with_config(
        content: impl Into<String>,
        user: impl Into<String>,
        label: impl Into<String>,
        branch: impl Into<String>,
        config: SolutionConfig,
    ) -> Result<Self> {
        config.validate()?;
        let context = SolutionContext {
            content: content.into(),
            user: user.into(),
            label: label.into(),
            branch: branch.into(),
        };

        let template = TemplateTree::parse(&context.content, config.format)?;

        let mut store = VariableStore::new(config.binding_policy);
        if config.env_defaults {
            for (name, value) in template.defaults(DEFAULTS_SECTION) {
                store.set_default(&name, value)?;
            }
        }
        tracing::debug!(
            "Opened solution '{}' for user '{}' on branch '{}' ({} variable(s), {} default(s))",
            context.label,
            context.user,
            context.branch,
            template.variables().len(),
            store.len()
        );

        Ok(Self {
            state: Mutex::new(State {
                store,
                functions: FunctionRegistry::default(),
            }),
            context,
            config,
            template,
        })
    }

    /// The immutable construction context.
    pub const fn context(&self) -> &SolutionContext {
        &self.context
    }

    /// The configuration in effect.
    pub const fn config(&self) -> &SolutionConfig {
        &self.config
    }

    /// The parsed template.
    pub const fn template(&self) -> &TemplateTree {
        &self.template
    }

    /// Variables the template references, in first-appearance order.
    pub fn referenced_variables(&self) -> &[String] {
        self.template.variables()
    }

    /// Bind `name` to `value`.
    ///
    /// Under the default policy this adds a candidate value; see
    /// [`crate::config::BindingPolicy`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::SolutionError::InvalidVariableName`] if `name` is empty
    /// or malformed.
    pub fn set_value(&self, name: &str, value: impl Into<Scalar>) -> Result<()> {
        self.state().store.set_value(name, value)
    }

    /// Bind many variables at once; all or nothing.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SolutionError::InvalidBinding`] if any entry has a
    /// malformed name or a value that is not a string, number or boolean.
    pub fn add_values<I, K>(&self, bindings: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        self.state().store.add_values(bindings)
    }

    /// Replace the binding of `name` with exactly `values`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SolutionError::InvalidBinding`] if the name is invalid
    /// or `values` is empty.
    pub fn replace_values<I>(&self, name: &str, values: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<Scalar>,
    {
        self.state().store.replace_values(name, values)
    }

    /// Remove the caller binding of `name`. Returns whether it was bound.
    ///
    /// A default for `name` applies again afterwards.
    pub fn unset_value(&self, name: &str) -> bool {
        self.state().store.unset(name).is_some()
    }

    /// Values in effect for `name`: the caller binding, else the default.
    pub fn values(&self, name: &str) -> Option<Vec<Scalar>> {
        self.state().store.values(name).map(<[Scalar]>::to_vec)
    }

    /// Whether `name` currently resolves to its default value.
    pub fn is_defaulted(&self, name: &str) -> bool {
        self.state().store.is_defaulted(name)
    }

    /// Names of all bound or defaulted variables, sorted.
    pub fn variable_names(&self) -> Vec<String> {
        self.state().store.names()
    }

    /// Register a template function, replacing any function of the same name.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SolutionError::TemplateFunction`] if `name` is not an
    /// identifier.
    pub fn set_template_function<F>(&self, name: &str, function: F) -> Result<()>
    where
        F: Fn(&Scalar) -> std::result::Result<Scalar, String> + Send + Sync + 'static,
    {
        self.state().functions.register(name, function)
    }

    /// Register many template functions at once; all or nothing.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SolutionError::TemplateFunction`] for the first
    /// invalid name. No function of the batch is registered in that case.
    pub fn add_template_functions<I, K>(&self, functions: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, TemplateFunction)>,
        K: Into<String>,
    {
        let mut state = self.state();
        let mut staged = state.functions.clone();
        for (name, function) in functions {
            let name: String = name.into();
            staged.insert(&name, function)?;
        }
        state.functions = staged;
        Ok(())
    }

    /// Names of the available template functions, sorted.
    pub fn template_function_names(&self) -> Vec<String> {
        self.state().functions.names()
    }

    /// Number of run configurations the current bindings would produce.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SolutionError::UnboundVariable`] if a referenced
    /// variable has no binding.
    pub fn run_count(&self) -> Result<usize> {
        let state = self.state();
        self.expander().run_count(&self.template, &state.store)
    }

    /// Expand into run configurations, with the bindings chosen for each.
    ///
    /// # Errors
    ///
    /// - [`crate::SolutionError::UnboundVariable`] if a referenced variable has no binding
    /// - [`crate::SolutionError::TemplateFunction`] if a function is unknown or fails
    /// - [`crate::SolutionError::ExpansionTooLarge`] if the product exceeds `max_runs`
    pub fn run_configurations(&self) -> Result<Vec<RunConfiguration>> {
        let state = self.state();
        let runs = self.expander().expand_with(&self.template, &state.store, &state.functions)?;
        tracing::info!(
            "Generated {} run configuration(s) for solution '{}'",
            runs.len(),
            self.context.label
        );
        Ok(runs)
    }

    /// Expand for `namespace`, with `NS` and `NS_SELECTOR` bound.
    ///
    /// The reserved variables take precedence over any caller binding of the
    /// same names, for this call only.
    ///
    /// # Errors
    ///
    /// Same as [`run_configurations`](Self::run_configurations).
    pub fn run_configurations_for(&self, namespace: &str) -> Result<Vec<RunConfiguration>> {
        let state = self.state();
        let mut store = state.store.clone();
        store.replace_values(NAMESPACE_KEY, [namespace])?;
        store.replace_values(NAMESPACE_SELECTOR_KEY, [namespace_selector(namespace)])?;

        let runs = self.expander().expand_with(&self.template, &store, &state.functions)?;
        tracing::info!(
            "Generated {} run configuration(s) for solution '{}' in namespace '{}'",
            runs.len(),
            self.context.label,
            namespace
        );
        Ok(runs)
    }

    /// Generate the ordered run sequence as JSON documents.
    ///
    /// # Errors
    ///
    /// - [`crate::SolutionError::UnboundVariable`] if a referenced variable has no binding
    /// - [`crate::SolutionError::ExpansionTooLarge`] if the product exceeds `max_runs`
    pub fn generate_run_sequence(&self) -> Result<Vec<Value>> {
        Ok(self.run_configurations()?.iter().map(serialize::serialize).collect())
    }

    /// Generate the run sequence as one compact JSON array.
    ///
    /// # Errors
    ///
    /// Same as [`generate_run_sequence`](Self::generate_run_sequence).
    pub fn generate_run_sequence_json(&self) -> Result<String> {
        Ok(serialize::sequence_to_compact_string(&self.generate_run_sequence()?))
    }

    /// Generate the run sequence for `namespace` as JSON documents.
    ///
    /// # Errors
    ///
    /// Same as [`generate_run_sequence`](Self::generate_run_sequence).
    pub fn generate_run_sequence_for(&self, namespace: &str) -> Result<Vec<Value>> {
        Ok(self.run_configurations_for(namespace)?.iter().map(serialize::serialize).collect())
    }

    const fn expander(&self) -> Expander {
        Expander::new(self.config.max_runs)
    }

    /// Lock the mutable state. Every mutation validates before it writes, so
    /// a panic elsewhere cannot leave it half updated and poisoning is ignored.
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
