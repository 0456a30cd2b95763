//! Variable bindings for solution expansion.
//!
//! A [`VariableStore`] maps variable names to a non-empty, ordered sequence of
//! [`Scalar`] values. How a second bind of an already bound name behaves is
//! decided by the store's [`BindingPolicy`]:
//!
//! - [`BindingPolicy::Accumulate`] appends the value as another candidate,
//!   unless an identical value is already bound. This is how multi-valued
//!   variables (and therefore matrix expansion) are built up one bind at a
//!   time.
//! - [`BindingPolicy::Overwrite`] replaces the binding (last write wins).
//!
//! Batch binds ([`VariableStore::add_values`]) are validated completely before
//! anything is applied, so a rejected batch leaves the store untouched.
//!
//! # Defaults
//!
//! A store can also hold one default value per name
//! ([`VariableStore::set_default`]). A default answers lookups only while the
//! caller has not bound the name. The first caller bind replaces it under
//! either policy, and [`VariableStore::unset`] makes it visible again.
//!
//! # Examples
//!
//! ```rust
//! use solutions::variables::{Scalar, VariableStore};
//! use solutions::config::BindingPolicy;
//!
//! let mut store = VariableStore::new(BindingPolicy::Accumulate);
//! store.set_value("region", "eu")?;
//! store.set_value("region", "us")?;
//! assert_eq!(store.values("region").unwrap(), &[Scalar::from("eu"), Scalar::from("us")]);
//! # Ok::<(), solutions::SolutionError>(())
//! ```

mod scalar;

pub use scalar::Scalar;
pub(crate) use scalar::describe_value;

use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::config::BindingPolicy;
use crate::constants::NAME_PATTERN;
use crate::core::{Result, SolutionError};

/// Pattern every variable name must match. Placeholders use the same grammar,
/// so any bindable name can be referenced from a template.
fn name_pattern() -> Option<&'static Regex> {
    static NAME: OnceLock<Option<Regex>> = OnceLock::new();
    NAME.get_or_init(|| match Regex::new(NAME_PATTERN) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::error!("Variable name pattern failed to compile, using character check: {e}");
            None
        }
    })
    .as_ref()
}

/// Check whether `name` is a valid variable name.
pub fn is_valid_name(name: &str) -> bool {
    match name_pattern() {
        Some(re) => re.is_match(name),
        None => is_identifier(name),
    }
}

/// Character-level equivalent of [`NAME_PATTERN`].
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Mutable mapping from variable name to its bound values.
#[derive(Debug, Clone, Default)]
pub struct VariableStore {
    policy: BindingPolicy,
    bindings: HashMap<String, Vec<Scalar>>,
    defaults: HashMap<String, Vec<Scalar>>,
}

impl VariableStore {
    /// Create an empty store using `policy` for repeated binds.
    pub fn new(policy: BindingPolicy) -> Self {
        Self {
            policy,
            bindings: HashMap::new(),
            defaults: HashMap::new(),
        }
    }

    /// The policy repeated binds follow.
    pub const fn policy(&self) -> BindingPolicy {
        self.policy
    }

    /// Bind `name` to `value` according to the store's policy.
    ///
    /// # Errors
    ///
    /// Returns [`SolutionError::InvalidVariableName`] if `name` is empty or not
    /// an identifier. The store is unchanged in that case.
    pub fn set_value(&mut self, name: &str, value: impl Into<Scalar>) -> Result<()> {
        if !is_valid_name(name) {
            return Err(SolutionError::InvalidVariableName {
                name: name.to_string(),
            });
        }
        self.apply(name.to_string(), value.into());
        Ok(())
    }

    /// Bind every `(name, value)` pair as one atomic batch.
    ///
    /// Each pair follows [`set_value`](Self::set_value) semantics. The whole
    /// batch is validated before anything is applied.
    ///
    /// # Errors
    ///
    /// Returns [`SolutionError::InvalidBinding`] for the first pair with an
    /// invalid name or a value that is not a string, number or boolean. No
    /// pair of the batch is applied in that case.
    pub fn add_values<I, K>(&mut self, bindings: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut validated = Vec::new();
        for (name, value) in bindings {
            let name = name.into();
            if !is_valid_name(&name) {
                return Err(SolutionError::invalid_binding(name, "invalid variable name"));
            }
            let scalar = Scalar::try_from(value).map_err(|rejected| {
                SolutionError::invalid_binding(
                    name.clone(),
                    format!(
                        "expected a string, number or boolean, got {}",
                        describe_value(&rejected)
                    ),
                )
            })?;
            validated.push((name, scalar));
        }

        tracing::debug!("Applying batch of {} binding(s)", validated.len());
        for (name, scalar) in validated {
            self.apply(name, scalar);
        }
        Ok(())
    }

    /// Replace the binding of `name` with exactly `values`, regardless of policy.
    ///
    /// Duplicate values are dropped, keeping the first occurrence.
    ///
    /// # Errors
    ///
    /// Returns [`SolutionError::InvalidBinding`] if the name is invalid or
    /// `values` is empty, since a variable is never bound to nothing.
    pub fn replace_values<I>(&mut self, name: &str, values: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<Scalar>,
    {
        if !is_valid_name(name) {
            return Err(SolutionError::invalid_binding(name, "invalid variable name"));
        }
        let mut deduped: Vec<Scalar> = Vec::new();
        for value in values {
            let value = value.into();
            if !deduped.contains(&value) {
                deduped.push(value);
            }
        }
        if deduped.is_empty() {
            return Err(SolutionError::invalid_binding(name, "a variable needs at least one value"));
        }
        tracing::debug!("Replaced '{}' with {} value(s)", name, deduped.len());
        self.bindings.insert(name.to_string(), deduped);
        Ok(())
    }

    /// Set the default value of `name`, replacing any earlier default.
    ///
    /// # Errors
    ///
    /// Returns [`SolutionError::InvalidVariableName`] if `name` is empty or not
    /// an identifier.
    pub fn set_default(&mut self, name: &str, value: impl Into<Scalar>) -> Result<()> {
        if !is_valid_name(name) {
            return Err(SolutionError::InvalidVariableName {
                name: name.to_string(),
            });
        }
        let value = value.into();
        tracing::debug!("Default for '{}' is {} value {}", name, value.kind(), value);
        self.defaults.insert(name.to_string(), vec![value]);
        Ok(())
    }

    /// Remove the caller binding of `name`, returning its values if it was
    /// bound. A default for `name`, if any, applies again afterwards.
    pub fn unset(&mut self, name: &str) -> Option<Vec<Scalar>> {
        self.bindings.remove(name)
    }

    /// Values in effect for `name`: the caller binding, else the default.
    pub fn values(&self, name: &str) -> Option<&[Scalar]> {
        self.bindings.get(name).or_else(|| self.defaults.get(name)).map(Vec::as_slice)
    }

    /// Whether `name` has a binding or a default.
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name) || self.defaults.contains_key(name)
    }

    /// Whether `name` currently resolves to its default value.
    pub fn is_defaulted(&self, name: &str) -> bool {
        !self.bindings.contains_key(name) && self.defaults.contains_key(name)
    }

    /// Names with a binding or a default, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.bindings.keys().chain(self.defaults.keys()).cloned().collect();
        names.sort();
        names.dedup();
        names
    }

    /// Number of variables with a binding or a default.
    pub fn len(&self) -> usize {
        self.bindings.len() + self.defaults.keys().filter(|name| !self.bindings.contains_key(*name)).count()
    }

    /// Whether no variable has a binding or a default.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty() && self.defaults.is_empty()
    }

    fn apply(&mut self, name: String, value: Scalar) {
        match self.policy {
            BindingPolicy::Overwrite => {
                tracing::debug!("Bound '{}' to {} value {}", name, value.kind(), value);
                self.bindings.insert(name, vec![value]);
            }
            BindingPolicy::Accumulate => {
                let values = self.bindings.entry(name).or_default();
                if values.contains(&value) {
                    tracing::debug!("Value {} already bound, skipping", value);
                } else {
                    tracing::debug!("Appended {} value {} ({} total)", value.kind(), value, values.len() + 1);
                    values.push(value);
                }
            }
        }
    }
}
