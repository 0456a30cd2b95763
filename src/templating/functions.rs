//! Template functions applied to placeholder values.
//!
//! A braced placeholder can pipe its value through functions,
//! `${branch|lower|trim}`. Each function takes the current [`Scalar`] and
//! returns a new one. Functions are looked up by name in a
//! [`FunctionRegistry`], which starts out with these built-ins:
//!
//! - `lower` / `upper` - ASCII and Unicode case conversion of the text form
//! - `trim` - strip leading and trailing whitespace from the text form
//! - `selector` - label-safe selector of a namespace, see [`namespace_selector`]
//!
//! Built-ins always produce strings. Custom functions may return any scalar,
//! and when a placeholder is the whole string its result keeps that type.
//!
//! # Examples
//!
//! ```rust
//! use solutions::templating::FunctionRegistry;
//! use solutions::variables::Scalar;
//!
//! let mut functions = FunctionRegistry::default();
//! functions.register("double", |value: &Scalar| match value {
//!     Scalar::Number(n) => n
//!         .as_i64()
//!         .map(|n| Scalar::from(n * 2))
//!         .ok_or_else(|| format!("{n} is not an integer")),
//!     other => Err(format!("expected a number, got {}", other.kind())),
//! })?;
//!
//! assert_eq!(functions.apply("double", &Scalar::from(21))?, Scalar::from(42));
//! assert_eq!(functions.apply("upper", &Scalar::from("prod"))?, Scalar::from("PROD"));
//! # Ok::<(), solutions::SolutionError>(())
//! ```

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::constants::NAMESPACE_SELECTOR_BYTES;
use crate::core::{Result, SolutionError};
use crate::variables::{Scalar, is_valid_name};

/// A function callable from a placeholder.
///
/// An `Err` carries the reason the input was rejected.
pub type TemplateFunction = Arc<dyn Fn(&Scalar) -> std::result::Result<Scalar, String> + Send + Sync>;

/// Label-safe selector for a namespace.
///
/// Namespace names may contain characters that label values do not allow, so
/// the selector is the hex encoding of the first bytes of the SHA-256 digest
/// of the name: 32 lowercase hex characters, stable for a given namespace.
pub fn namespace_selector(namespace: &str) -> String {
    let digest = Sha256::digest(namespace.as_bytes());
    hex::encode(&digest[..NAMESPACE_SELECTOR_BYTES])
}

/// Wrap a text transform as a function over the scalar's text form.
fn text_function(transform: fn(&str) -> String) -> TemplateFunction {
    Arc::new(move |value: &Scalar| -> std::result::Result<Scalar, String> {
        Ok(Scalar::from(transform(&value.to_string())))
    })
}

/// Named template functions.
#[derive(Clone)]
pub struct FunctionRegistry {
    functions: HashMap<String, TemplateFunction>,
}

impl Default for FunctionRegistry {
    /// A registry holding the built-in functions.
    fn default() -> Self {
        let builtins: [(&str, fn(&str) -> String); 4] = [
            ("lower", str::to_lowercase),
            ("upper", str::to_uppercase),
            ("trim", |text| text.trim().to_string()),
            ("selector", namespace_selector),
        ];
        let functions = builtins
            .into_iter()
            .map(|(name, transform)| (name.to_string(), text_function(transform)))
            .collect();
        Self {
            functions,
        }
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry").field("functions", &self.names()).finish()
    }
}

impl FunctionRegistry {
    /// Register `function` under `name`, replacing any function (built-in
    /// included) of the same name.
    ///
    /// # Errors
    ///
    /// Returns [`SolutionError::TemplateFunction`] if `name` is not an
    /// identifier.
    pub fn register<F>(&mut self, name: &str, function: F) -> Result<()>
    where
        F: Fn(&Scalar) -> std::result::Result<Scalar, String> + Send + Sync + 'static,
    {
        self.insert(name, Arc::new(function))
    }

    /// Register an already shared function.
    ///
    /// # Errors
    ///
    /// Same as [`register`](Self::register).
    pub fn insert(&mut self, name: &str, function: TemplateFunction) -> Result<()> {
        if !is_valid_name(name) {
            return Err(SolutionError::template_function(name, "invalid function name"));
        }
        if self.functions.insert(name.to_string(), function).is_some() {
            tracing::debug!("Replaced template function '{}'", name);
        } else {
            tracing::debug!("Registered template function '{}'", name);
        }
        Ok(())
    }

    /// Whether a function called `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered function names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.keys().cloned().collect();
        names.sort();
        names
    }

    /// Call `name` on `value`.
    ///
    /// # Errors
    ///
    /// Returns [`SolutionError::TemplateFunction`] if no such function is
    /// registered or the function rejects `value`.
    pub fn apply(&self, name: &str, value: &Scalar) -> Result<Scalar> {
        let function = self
            .functions
            .get(name)
            .ok_or_else(|| SolutionError::template_function(name, "unknown template function"))?;
        function(value).map_err(|reason| SolutionError::template_function(name, reason))
    }
}
