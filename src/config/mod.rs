//! Configuration for solution expansion.
//!
//! [`SolutionConfig`] controls how a [`crate::Solution`] parses its content,
//! how repeated bindings of one variable combine, and how large an expansion
//! may grow.
//!
//! # Sources
//!
//! Settings are layered, later sources win:
//!
//! 1. Built-in defaults ([`SolutionConfig::default`])
//! 2. A TOML document ([`SolutionConfig::from_toml_str`])
//! 3. Environment overrides ([`SolutionConfig::with_env_overrides`]):
//!    `SOLUTIONS_MAX_RUNS`, `SOLUTIONS_BINDING_POLICY`, `SOLUTIONS_FORMAT`
//!
//! # File Format
//!
//! ```toml
//! max_runs = 500
//! binding_policy = "overwrite"   # or "accumulate" (default)
//! format = "yaml"                # or "json" (default)
//! env_defaults = false           # ignore the content's `env` defaults
//! ```
//!
//! Every field is optional; missing fields keep their defaults.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{DEFAULT_MAX_RUNS, ENV_BINDING_POLICY, ENV_FORMAT, ENV_MAX_RUNS};
use crate::core::{Result, SolutionError};

/// How a bind combines with an existing binding of the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingPolicy {
    /// Each bind appends one more candidate value (duplicates are skipped),
    /// so repeated binds build the value sets the matrix expansion iterates.
    #[default]
    Accumulate,
    /// Each bind replaces the previous binding entirely (last write wins).
    Overwrite,
}

impl fmt::Display for BindingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accumulate => write!(f, "accumulate"),
            Self::Overwrite => write!(f, "overwrite"),
        }
    }
}

impl FromStr for BindingPolicy {
    type Err = SolutionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accumulate" | "append" => Ok(Self::Accumulate),
            "overwrite" | "replace" => Ok(Self::Overwrite),
            other => Err(SolutionError::config(format!(
                "unknown binding policy '{other}', expected 'accumulate' or 'overwrite'"
            ))),
        }
    }
}

/// Syntax of the specification content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentFormat {
    /// JSON text
    #[default]
    Json,
    /// YAML text, parsed into the same document model as JSON
    Yaml,
}

impl fmt::Display for ContentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Yaml => write!(f, "yaml"),
        }
    }
}

impl FromStr for ContentFormat {
    type Err = SolutionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(SolutionError::config(format!(
                "unknown content format '{other}', expected 'json' or 'yaml'"
            ))),
        }
    }
}

const fn default_max_runs() -> usize {
    DEFAULT_MAX_RUNS
}

const fn default_env_defaults() -> bool {
    true
}

/// Settings for a [`crate::Solution`].
///
/// # Examples
///
/// ```rust
/// use solutions::config::{BindingPolicy, SolutionConfig};
///
/// let config = SolutionConfig::from_toml_str("max_runs = 64").unwrap();
/// assert_eq!(config.max_runs, 64);
/// assert_eq!(config.binding_policy, BindingPolicy::Accumulate);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SolutionConfig {
    /// Maximum number of run configurations one expansion may produce.
    ///
    /// Default: 10,000. Must be at least 1.
    #[serde(default = "default_max_runs")]
    pub max_runs: usize,

    /// How repeated binds of one variable combine.
    #[serde(default)]
    pub binding_policy: BindingPolicy,

    /// Syntax of the specification content.
    #[serde(default)]
    pub format: ContentFormat,

    /// Seed default values from the content's top-level `env` object.
    ///
    /// Default: true.
    #[serde(default = "default_env_defaults")]
    pub env_defaults: bool,
}

impl Default for SolutionConfig {
    fn default() -> Self {
        Self {
            max_runs: default_max_runs(),
            binding_policy: BindingPolicy::default(),
            format: ContentFormat::default(),
            env_defaults: default_env_defaults(),
        }
    }
}

impl SolutionConfig {
    /// Parse a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`SolutionError::Config`] if the TOML is invalid, contains
    /// unknown keys, or sets `max_runs` to zero.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| SolutionError::config(format!("invalid TOML: {e}")))?;
        config.validate()?;
        tracing::debug!(
            "Loaded solution config: max_runs={}, binding_policy={}, format={}",
            config.max_runs,
            config.binding_policy,
            config.format
        );
        Ok(config)
    }

    /// Apply `SOLUTIONS_*` environment variable overrides.
    ///
    /// Unset variables leave the corresponding field untouched.
    ///
    /// # Errors
    ///
    /// Returns [`SolutionError::Config`] if a set variable has an invalid value.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// This is what [`with_env_overrides`](Self::with_env_overrides) uses with
    /// `std::env::var`; it is exposed so hosts can feed settings from their own
    /// environment abstraction.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_MAX_RUNS) {
            self.max_runs = raw.trim().parse().map_err(|_| {
                SolutionError::config(format!("{ENV_MAX_RUNS} must be a positive integer, got '{raw}'"))
            })?;
            tracing::debug!("{} override: max_runs={}", ENV_MAX_RUNS, self.max_runs);
        }
        if let Some(raw) = lookup(ENV_BINDING_POLICY) {
            self.binding_policy = raw.parse()?;
            tracing::debug!("{} override: binding_policy={}", ENV_BINDING_POLICY, self.binding_policy);
        }
        if let Some(raw) = lookup(ENV_FORMAT) {
            self.format = raw.parse()?;
            tracing::debug!("{} override: format={}", ENV_FORMAT, self.format);
        }
        self.validate()?;
        Ok(self)
    }

    /// Builder-style setter for [`max_runs`](Self::max_runs).
    #[must_use]
    pub const fn with_max_runs(mut self, max_runs: usize) -> Self {
        self.max_runs = max_runs;
        self
    }

    /// Builder-style setter for [`binding_policy`](Self::binding_policy).
    #[must_use]
    pub const fn with_binding_policy(mut self, policy: BindingPolicy) -> Self {
        self.binding_policy = policy;
        self
    }

    /// Builder-style setter for [`format`](Self::format).
    #[must_use]
    pub const fn with_format(mut self, format: ContentFormat) -> Self {
        self.format = format;
        self
    }

    /// Builder-style setter for [`env_defaults`](Self::env_defaults).
    #[must_use]
    pub const fn with_env_defaults(mut self, enabled: bool) -> Self {
        self.env_defaults = enabled;
        self
    }

    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.max_runs == 0 {
            return Err(SolutionError::config("max_runs must be at least 1"));
        }
        Ok(())
    }
}
