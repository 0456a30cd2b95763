//! Matrix expansion of a template tree over bound variables.
//!
//! The [`Expander`] takes a [`TemplateTree`] and a [`VariableStore`] and
//! produces one [`RunConfiguration`] per combination of bound values.
//!
//! # Ordering
//!
//! Variables are ordered by first appearance in the template; each variable's
//! values keep their binding order. Combinations are enumerated like an
//! odometer: the first variable is the outermost loop and the last variable
//! changes fastest. For `a = [1, 2]` and `b = [x, y, z]` the runs are
//! `(1,x) (1,y) (1,z) (2,x) (2,y) (2,z)`.
//!
//! # Failure
//!
//! Expansion is all-or-nothing. An unbound variable, an unknown template
//! function or a product larger than the configured bound fails before any
//! document is built. A function rejecting a value fails the whole expansion.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use strsim::levenshtein;

use super::{FunctionRegistry, Reference, Segment, TemplateNode, TemplateTree};
use crate::constants::{MAX_SUGGESTIONS, RUN_BOUND_WARN_PERCENT, SIMILARITY_THRESHOLD_PERCENT};
use crate::core::{Result, SolutionError};
use crate::variables::{Scalar, VariableStore};

/// One fully resolved run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfiguration {
    /// Position in the run sequence, starting at 0
    pub index: usize,
    /// The value chosen for each referenced variable, in variable order
    pub bindings: Vec<(String, Scalar)>,
    /// The resolved document
    pub document: Value,
}

impl RunConfiguration {
    /// Value chosen for `name` in this run.
    pub fn binding(&self, name: &str) -> Option<&Scalar> {
        self.bindings.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

/// Expands templates into run configurations under a size bound.
#[derive(Debug, Clone, Copy)]
pub struct Expander {
    max_runs: usize,
}

impl Expander {
    /// Create an expander that refuses to produce more than `max_runs` runs.
    pub const fn new(max_runs: usize) -> Self {
        Self {
            max_runs,
        }
    }

    /// The configured bound.
    pub const fn max_runs(&self) -> usize {
        self.max_runs
    }

    /// Number of runs the current bindings would produce, without building
    /// them and without applying the bound.
    ///
    /// Saturates at `usize::MAX`.
    ///
    /// # Errors
    ///
    /// Returns [`SolutionError::UnboundVariable`] for the first referenced
    /// variable without a binding.
    pub fn run_count(&self, tree: &TemplateTree, store: &VariableStore) -> Result<usize> {
        let value_sets = Self::resolve_value_sets(tree, store)?;
        Ok(Self::product_size(&value_sets))
    }

    /// Expand `tree` over every combination of the values bound in `store`,
    /// with only the built-in template functions available.
    ///
    /// A template without placeholders yields exactly one run: the document
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Same as [`expand_with`](Self::expand_with).
    pub fn expand(&self, tree: &TemplateTree, store: &VariableStore) -> Result<Vec<RunConfiguration>> {
        self.expand_with(tree, store, &FunctionRegistry::default())
    }

    /// Expand `tree` with the template functions in `functions`.
    ///
    /// # Errors
    ///
    /// - [`SolutionError::UnboundVariable`] if a referenced variable has no binding
    /// - [`SolutionError::TemplateFunction`] if a referenced function is not
    ///   registered or rejects a value
    /// - [`SolutionError::ExpansionTooLarge`] if the product exceeds the bound
    pub fn expand_with(
        &self,
        tree: &TemplateTree,
        store: &VariableStore,
        functions: &FunctionRegistry,
    ) -> Result<Vec<RunConfiguration>> {
        let value_sets = Self::resolve_value_sets(tree, store)?;
        if let Some(missing) = tree.functions().iter().find(|name| !functions.contains(name)) {
            return Err(SolutionError::template_function(missing.as_str(), "unknown template function"));
        }
        let size = Self::product_size(&value_sets);

        if size > self.max_runs {
            tracing::debug!("Refusing expansion of {} runs (limit {})", size, self.max_runs);
            return Err(SolutionError::ExpansionTooLarge {
                size,
                limit: self.max_runs,
            });
        }
        if self.is_near_limit(size) {
            tracing::warn!(
                "Expansion produces {} runs, close to the limit of {}",
                size,
                self.max_runs
            );
        }

        tracing::debug!(
            "Expanding {} variable(s) into {} run(s): {}",
            value_sets.len(),
            size,
            value_sets
                .iter()
                .map(|(name, values)| format!("{name}[{}]", values.len()))
                .collect::<Vec<_>>()
                .join(" x ")
        );

        let mut runs = Vec::with_capacity(size);
        let mut odometer = vec![0_usize; value_sets.len()];
        loop {
            let chosen: Vec<(&str, &Scalar)> = value_sets
                .iter()
                .zip(&odometer)
                .map(|((name, values), &idx)| (*name, &values[idx]))
                .collect();
            let lookup: HashMap<&str, &Scalar> = chosen.iter().copied().collect();
            let document = Self::substitute(tree.root(), &lookup, functions)?;

            runs.push(RunConfiguration {
                index: runs.len(),
                bindings: chosen
                    .into_iter()
                    .map(|(name, value)| (name.to_string(), value.clone()))
                    .collect(),
                document,
            });

            if !Self::advance(&mut odometer, &value_sets) {
                break;
            }
        }

        Ok(runs)
    }

    /// Whether `size` runs is close enough to the bound to warn about.
    ///
    /// A single run never is, so a bound of 1 stays quiet.
    pub(crate) const fn is_near_limit(&self, size: usize) -> bool {
        size > 1 && size.saturating_mul(100) >= self.max_runs.saturating_mul(RUN_BOUND_WARN_PERCENT)
    }

    /// Look up the values of every referenced variable, in variable order.
    fn resolve_value_sets<'s>(
        tree: &'s TemplateTree,
        store: &'s VariableStore,
    ) -> Result<Vec<(&'s str, &'s [Scalar])>> {
        tree.variables()
            .iter()
            .map(|name| match store.values(name) {
                Some(values) => Ok((name.as_str(), values)),
                None => Err(SolutionError::UnboundVariable {
                    name: name.clone(),
                    suggestions: Self::find_similar_variables(name, &store.names()),
                }),
            })
            .collect()
    }

    fn product_size(value_sets: &[(&str, &[Scalar])]) -> usize {
        value_sets
            .iter()
            .try_fold(1_usize, |acc, (_, values)| acc.checked_mul(values.len()))
            .unwrap_or(usize::MAX)
    }

    /// Step the odometer; the last position turns fastest.
    ///
    /// Returns `false` once every combination has been produced.
    fn advance(odometer: &mut [usize], value_sets: &[(&str, &[Scalar])]) -> bool {
        for pos in (0..odometer.len()).rev() {
            odometer[pos] += 1;
            if odometer[pos] < value_sets[pos].1.len() {
                return true;
            }
            odometer[pos] = 0;
        }
        false
    }

    /// Build the document for one combination.
    fn substitute(
        node: &TemplateNode,
        lookup: &HashMap<&str, &Scalar>,
        functions: &FunctionRegistry,
    ) -> Result<Value> {
        Ok(match node {
            TemplateNode::Literal(value) => value.clone(),
            TemplateNode::Placeholder(reference) => Self::resolve(reference, lookup, functions)?.into(),
            TemplateNode::Interpolated(segments) => {
                let mut rendered = String::new();
                for segment in segments {
                    match segment {
                        Segment::Text(text) => rendered.push_str(text),
                        Segment::Variable(reference) => {
                            rendered.push_str(&Self::resolve(reference, lookup, functions)?.to_string());
                        }
                    }
                }
                Value::String(rendered)
            }
            TemplateNode::Array(children) => Value::Array(
                children
                    .iter()
                    .map(|child| Self::substitute(child, lookup, functions))
                    .collect::<Result<Vec<_>>>()?,
            ),
            TemplateNode::Object(members) => {
                let mut map = Map::with_capacity(members.len());
                for (key, child) in members {
                    map.insert(key.clone(), Self::substitute(child, lookup, functions)?);
                }
                Value::Object(map)
            }
        })
    }

    /// Value of one reference: the chosen scalar piped through its functions.
    fn resolve(
        reference: &Reference,
        lookup: &HashMap<&str, &Scalar>,
        functions: &FunctionRegistry,
    ) -> Result<Scalar> {
        let value = lookup.get(reference.name.as_str()).copied().ok_or_else(|| {
            SolutionError::UnboundVariable {
                name: reference.name.clone(),
                suggestions: Vec::new(),
            }
        })?;
        reference
            .functions
            .iter()
            .try_fold(value.clone(), |current, function| functions.apply(function, &current))
    }

    /// Find bound names similar to `target` using Levenshtein distance
    fn find_similar_variables(target: &str, available: &[String]) -> Vec<String> {
        let mut scored: Vec<_> = available
            .iter()
            .map(|var| (var.clone(), levenshtein(target, var)))
            .collect();

        // Closest first, ties by name for stable output
        scored.sort_by(|(a_name, a_dist), (b_name, b_dist)| {
            a_dist.cmp(b_dist).then_with(|| a_name.cmp(b_name))
        });

        scored
            .into_iter()
            .filter(|(_, dist)| *dist <= target.len() * SIMILARITY_THRESHOLD_PERCENT / 100)
            .take(MAX_SUGGESTIONS)
            .map(|(var, _)| var)
            .collect()
    }
}
