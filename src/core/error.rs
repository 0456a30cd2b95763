//! Error handling for solution expansion
//!
//! This module provides the error taxonomy of the crate and user-friendly error
//! reporting for whatever sits on top of it (a host wrapper, a CLI, a service).
//!
//! # Architecture
//!
//! - [`SolutionError`] - Enumerated error types for every failure the core detects
//! - [`ErrorContext`] - Wrapper that adds user-friendly details and suggestions
//!
//! # When errors are raised
//!
//! - **Construction**: [`SolutionError::MalformedTemplate`]
//! - **Binding**: [`SolutionError::InvalidVariableName`], [`SolutionError::InvalidBinding`]
//! - **Expansion**: [`SolutionError::UnboundVariable`], [`SolutionError::ExpansionTooLarge`],
//!   [`SolutionError::TemplateFunction`]
//! - **Configuration**: [`SolutionError::Config`]
//!
//! Every error is terminal for the inputs that produced it. No operation leaves
//! partially applied state behind when it fails, so the caller can fix the input
//! and retry against the same solution.
//!
//! # Examples
//!
//! ```rust,no_run
//! use solutions::core::{SolutionError, user_friendly_error};
//! use solutions::Solution;
//!
//! let solution = Solution::new(r#"{"target": "$env"}"#, "alice", "nightly", "main")?;
//! if let Err(e) = solution.generate_run_sequence() {
//!     let ctx = user_friendly_error(anyhow::Error::from(e));
//!     ctx.display(); // Shows colored error with suggestions
//! }
//! # Ok::<(), SolutionError>(())
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for solution operations.
///
/// Variants carry the offending input (a name, a JSON pointer, a size) so that
/// callers can report them without re-deriving anything.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolutionError {
    /// The specification content could not be parsed, or a string inside it
    /// uses invalid placeholder syntax.
    ///
    /// `pointer` is the JSON pointer of the offending node, empty when the
    /// content as a whole failed to parse.
    #[error("Malformed template at '{pointer}': {reason}")]
    MalformedTemplate {
        /// JSON pointer of the node that failed (`""` for the whole document)
        pointer: String,
        /// What was wrong
        reason: String,
    },

    /// A single-value bind used an empty or malformed variable name.
    #[error("Invalid variable name: '{name}'")]
    InvalidVariableName {
        /// The rejected name
        name: String,
    },

    /// A batch bind contained a malformed name or a non-scalar value.
    /// None of the batch was applied.
    #[error("Invalid binding for '{name}': {reason}")]
    InvalidBinding {
        /// Name of the first rejected entry
        name: String,
        /// Why it was rejected
        reason: String,
    },

    /// The template references a variable that has no binding.
    #[error("Unbound variable: '{name}'")]
    UnboundVariable {
        /// The referenced name
        name: String,
        /// Bound names close to `name`, closest first
        suggestions: Vec<String>,
    },

    /// The cartesian product of bound values exceeds the configured bound.
    ///
    /// `size` saturates at `usize::MAX` when the product overflows.
    #[error("Expansion too large: {size} run configurations exceed the limit of {limit}")]
    ExpansionTooLarge {
        /// Number of run configurations the bindings would produce
        size: usize,
        /// Configured maximum
        limit: usize,
    },

    /// A template function is not registered, or failed on its input.
    #[error("Template function '{function}' failed: {reason}")]
    TemplateFunction {
        /// Name of the function
        function: String,
        /// What went wrong
        reason: String,
    },

    /// Configuration input (TOML or environment) was invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the invalid setting
        message: String,
    },

    /// Any failure that did not originate in this crate
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl SolutionError {
    /// Shorthand for a [`SolutionError::MalformedTemplate`] at `pointer`.
    pub fn malformed(pointer: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedTemplate {
            pointer: pointer.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`SolutionError::InvalidBinding`].
    pub fn invalid_binding(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidBinding {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`SolutionError::TemplateFunction`].
    pub fn template_function(function: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::TemplateFunction {
            function: function.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`SolutionError::Config`].
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// Error context wrapper that provides user-friendly error information
///
/// `ErrorContext` wraps a [`SolutionError`] and adds optional details and a
/// suggestion for resolving it. It is the presentation layer on top of the
/// typed errors: code matches on [`SolutionError`], people read `ErrorContext`.
///
/// # Examples
///
/// ```rust,no_run
/// use solutions::core::{SolutionError, ErrorContext};
///
/// let context = ErrorContext::new(SolutionError::ExpansionTooLarge { size: 50_000, limit: 10_000 })
///     .with_suggestion("Bind fewer values or raise max_runs")
///     .with_details("Every multi-valued variable multiplies the number of runs");
///
/// context.display();
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: SolutionError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no details or suggestion.
    #[must_use]
    pub const fn new(error: SolutionError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    ///
    /// - Error message: Red and bold
    /// - Details: Yellow
    /// - Suggestion: Green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Convert any error into an [`ErrorContext`] with suggestions.
///
/// Errors that are (or wrap) a [`SolutionError`] get a suggestion specific to
/// their variant. Anything else is reported as [`SolutionError::Other`]
/// carrying the full `anyhow` chain.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(ctx) = error.downcast_ref::<ErrorContext>() {
        return ErrorContext {
            error: ctx.error.clone(),
            suggestion: ctx.suggestion.clone(),
            details: ctx.details.clone(),
        };
    }

    let Some(solution_error) = error.downcast_ref::<SolutionError>() else {
        return ErrorContext::new(SolutionError::Other {
            message: format!("{error:#}"),
        });
    };

    let base = ErrorContext::new(solution_error.clone());
    match solution_error {
        SolutionError::MalformedTemplate {
            pointer,
            ..
        } => {
            let base = base.with_suggestion(
                "Placeholders are written $name or ${name}; write $$ for a literal dollar sign",
            );
            if pointer.is_empty() {
                base.with_details("The specification content is not a valid document")
            } else {
                base.with_details(format!("The offending value is at JSON pointer '{pointer}'"))
            }
        }
        SolutionError::InvalidVariableName {
            ..
        } => base.with_suggestion(
            "Variable names start with a letter or underscore and contain only letters, digits and underscores",
        ),
        SolutionError::InvalidBinding {
            ..
        } => base
            .with_details("No binding from this batch was applied")
            .with_suggestion("Bind only strings, numbers or booleans to valid variable names"),
        SolutionError::UnboundVariable {
            name,
            suggestions,
        } => {
            if suggestions.is_empty() {
                base.with_suggestion(format!("Bind a value with set_value(\"{name}\", ...)"))
            } else {
                base.with_suggestion(format!("Did you mean: {}?", suggestions.join(", ")))
            }
        }
        SolutionError::ExpansionTooLarge {
            ..
        } => base
            .with_details("Every multi-valued variable multiplies the number of run configurations")
            .with_suggestion(format!(
                "Bind fewer values or raise max_runs (env: {})",
                crate::constants::ENV_MAX_RUNS
            )),
        SolutionError::TemplateFunction {
            function,
            ..
        } => base.with_suggestion(format!(
            "Register '{function}' with set_template_function, or use one of the built-in functions (lower, upper, trim, selector)"
        )),
        SolutionError::Config {
            ..
        } => base.with_suggestion("Check the solution configuration and SOLUTIONS_* environment variables"),
        SolutionError::Other {
            ..
        } => base,
    }
}
