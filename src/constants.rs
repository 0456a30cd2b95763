//! Global constants used throughout the solutions crate.
//!
//! Limits, environment variable names and placeholder syntax markers that are
//! shared by the configuration layer, the template parser and the expander.

/// Default upper bound on the number of run configurations one expansion may
/// produce.
///
/// The cartesian product grows multiplicatively with every multi-valued
/// variable, so this bound is checked before any document is built.
pub const DEFAULT_MAX_RUNS: usize = 10_000;

/// Fraction (in percent) of the run bound at which expansion logs a warning.
pub const RUN_BOUND_WARN_PERCENT: usize = 80;

/// Environment variable overriding [`crate::config::SolutionConfig::max_runs`].
pub const ENV_MAX_RUNS: &str = "SOLUTIONS_MAX_RUNS";

/// Environment variable overriding [`crate::config::SolutionConfig::binding_policy`].
pub const ENV_BINDING_POLICY: &str = "SOLUTIONS_BINDING_POLICY";

/// Environment variable overriding [`crate::config::SolutionConfig::format`].
pub const ENV_FORMAT: &str = "SOLUTIONS_FORMAT";

/// Sigil that introduces a placeholder inside a string value.
pub const PLACEHOLDER_SIGIL: char = '$';

/// Maximum Levenshtein distance, as a percentage of the unbound name's length,
/// for a bound name to be offered as a suggestion.
pub const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Maximum number of suggestions attached to an unbound variable error.
pub const MAX_SUGGESTIONS: usize = 3;

/// Separates a variable from the template functions applied to it
/// (`${name|lower|trim}`).
pub const FUNCTION_SEPARATOR: char = '|';

/// Grammar shared by variable names and template function names.
pub const NAME_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]*$";

/// Top-level object of the content whose literal members seed default values.
pub const DEFAULTS_SECTION: &str = "env";

/// Reserved variable bound to the namespace a run sequence is generated for.
pub const NAMESPACE_KEY: &str = "NS";

/// Reserved variable bound to the label-safe selector of that namespace.
pub const NAMESPACE_SELECTOR_KEY: &str = "NS_SELECTOR";

/// Number of digest bytes kept in a namespace selector (hex encoded, so the
/// selector is twice as long).
pub const NAMESPACE_SELECTOR_BYTES: usize = 16;
