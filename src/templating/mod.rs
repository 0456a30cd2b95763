//! Template tree for solution specifications.
//!
//! The specification content is parsed once into a [`TemplateTree`]: an owned,
//! immutable tree mirroring the document, in which string values that contain
//! placeholders have been turned into placeholder or interpolation nodes.
//!
//! # Placeholders
//!
//! Placeholders appear in string values only. Object keys are always literal.
//!
//! - `"$target"` / `"${target}"` - the whole string is replaced by the bound
//!   value, keeping its type (a bound number stays a number)
//! - `"deploy-${env}-$region"` - each placeholder is replaced by the textual
//!   form of its value and the result is a string
//! - `"${branch|lower}"` - the bound value piped through template functions
//!   (see [`functions`])
//! - `"$$"` - a literal dollar sign
//!
//! See [`placeholder`] for the exact grammar.
//!
//! # Defaults
//!
//! When the root is an object with an `env` object member, the literal
//! string, number and boolean members of `env` are available as default
//! values through [`TemplateTree::defaults`]. The `env` member itself is still
//! part of the document.
//!
//! # Variable Order
//!
//! [`TemplateTree::variables`] lists every referenced variable once, in order
//! of first appearance in a pre-order walk (object members in document order,
//! array items by index, interpolation segments left to right). The expander
//! uses this order for the cartesian product.
//!
//! # Examples
//!
//! ```rust
//! use solutions::config::ContentFormat;
//! use solutions::templating::TemplateTree;
//!
//! let tree = TemplateTree::parse(
//!     r#"{"image": "app:${tag}", "replicas": "$replicas", "tag_again": "$tag"}"#,
//!     ContentFormat::Json,
//! )?;
//! assert_eq!(tree.variables(), &["tag".to_string(), "replicas".to_string()]);
//! # Ok::<(), solutions::SolutionError>(())
//! ```

pub mod expander;
pub mod functions;
pub mod placeholder;


pub use expander::{Expander, RunConfiguration};
pub use functions::{FunctionRegistry, TemplateFunction};
pub use placeholder::{Reference, Segment};

use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::config::ContentFormat;
use crate::core::{Result, SolutionError};
use crate::variables::{Scalar, is_valid_name};

/// One node of a [`TemplateTree`].
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateNode {
    /// A value without placeholders: `null`, a boolean, a number or a string
    Literal(Value),
    /// A string that is exactly one placeholder; replaced by the typed value
    Placeholder(Reference),
    /// A string mixing text and placeholders; always renders to a string
    Interpolated(Vec<Segment>),
    /// An array of child nodes
    Array(Vec<TemplateNode>),
    /// An object; members keep their document order
    Object(Vec<(String, TemplateNode)>),
}

impl TemplateNode {
    fn from_value(value: &Value, pointer: &mut String) -> Result<Self> {
        match value {
            Value::String(s) => placeholder::parse_string(s, pointer),
            Value::Array(items) => {
                let mut children = Vec::with_capacity(items.len());
                for (idx, item) in items.iter().enumerate() {
                    let len = pointer.len();
                    pointer.push('/');
                    pointer.push_str(&idx.to_string());
                    children.push(Self::from_value(item, pointer)?);
                    pointer.truncate(len);
                }
                Ok(Self::Array(children))
            }
            Value::Object(map) => {
                let mut members = Vec::with_capacity(map.len());
                for (key, child) in map {
                    let len = pointer.len();
                    pointer.push('/');
                    pointer.push_str(&escape_pointer_token(key));
                    members.push((key.clone(), Self::from_value(child, pointer)?));
                    pointer.truncate(len);
                }
                Ok(Self::Object(members))
            }
            Value::Null | Value::Bool(_) | Value::Number(_) => Ok(Self::Literal(value.clone())),
        }
    }

    /// Walk the subtree in pre-order, calling `visit` for every variable
    /// reference (repeats included).
    fn visit_references<'a>(&'a self, visit: &mut impl FnMut(&'a Reference)) {
        match self {
            Self::Literal(_) => {}
            Self::Placeholder(reference) => visit(reference),
            Self::Interpolated(segments) => {
                for segment in segments {
                    if let Segment::Variable(reference) = segment {
                        visit(reference);
                    }
                }
            }
            Self::Array(children) => {
                for child in children {
                    child.visit_references(visit);
                }
            }
            Self::Object(members) => {
                for (_, child) in members {
                    child.visit_references(visit);
                }
            }
        }
    }

    /// Rebuild the JSON value of a subtree that has no variable references.
    ///
    /// Returns `None` if a placeholder is found.
    fn to_literal_value(&self) -> Option<Value> {
        match self {
            Self::Literal(value) => Some(value.clone()),
            Self::Placeholder(_) | Self::Interpolated(_) => None,
            Self::Array(children) => children
                .iter()
                .map(Self::to_literal_value)
                .collect::<Option<Vec<_>>>()
                .map(Value::Array),
            Self::Object(members) => {
                let mut map = Map::with_capacity(members.len());
                for (key, child) in members {
                    map.insert(key.clone(), child.to_literal_value()?);
                }
                Some(Value::Object(map))
            }
        }
    }
}

/// Escape a key for use as a JSON pointer reference token (RFC 6901).
fn escape_pointer_token(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

/// Parsed, immutable specification content.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateTree {
    root: TemplateNode,
    variables: Vec<String>,
    functions: Vec<String>,
}

impl TemplateTree {
    /// Parse specification content in the given format.
    ///
    /// # Errors
    ///
    /// Returns [`SolutionError::MalformedTemplate`] if the content is not a
    /// valid document in `format`, or if any string uses invalid placeholder
    /// syntax.
    pub fn parse(content: &str, format: ContentFormat) -> Result<Self> {
        let value: Value = match format {
            ContentFormat::Json => serde_json::from_str(content)
                .map_err(|e| SolutionError::malformed("", format!("invalid JSON: {e}")))?,
            ContentFormat::Yaml => serde_yaml::from_str(content)
                .map_err(|e| SolutionError::malformed("", format!("invalid YAML: {e}")))?,
        };
        Self::from_value(&value)
    }

    /// Build a tree from an already parsed document.
    ///
    /// # Errors
    ///
    /// Returns [`SolutionError::MalformedTemplate`] if any string uses invalid
    /// placeholder syntax.
    pub fn from_value(value: &Value) -> Result<Self> {
        let mut pointer = String::new();
        let root = TemplateNode::from_value(value, &mut pointer)?;

        let (variables, functions) = {
            let mut seen_variables = HashSet::new();
            let mut seen_functions = HashSet::new();
            let mut variables = Vec::new();
            let mut functions = Vec::new();
            root.visit_references(&mut |reference| {
                if seen_variables.insert(reference.name.as_str()) {
                    variables.push(reference.name.clone());
                }
                for function in &reference.functions {
                    if seen_functions.insert(function.as_str()) {
                        functions.push(function.clone());
                    }
                }
            });
            (variables, functions)
        };

        tracing::debug!(
            "Parsed template referencing {} variable(s): [{}]",
            variables.len(),
            variables.join(", ")
        );
        Ok(Self {
            root,
            variables,
            functions,
        })
    }

    /// The root node.
    pub const fn root(&self) -> &TemplateNode {
        &self.root
    }

    /// Referenced variable names, each once, in first-appearance order.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Template functions used by placeholders, each once, in first-appearance
    /// order.
    pub fn functions(&self) -> &[String] {
        &self.functions
    }

    /// Default values declared in the `section` object at the root.
    ///
    /// Only members whose key is a valid variable name and whose value is a
    /// literal string, number or boolean count. Anything else is skipped.
    pub fn defaults(&self, section: &str) -> Vec<(String, Scalar)> {
        let TemplateNode::Object(members) = &self.root else {
            return Vec::new();
        };
        let Some((_, TemplateNode::Object(entries))) = members.iter().find(|(key, _)| key == section) else {
            return Vec::new();
        };

        let mut defaults = Vec::new();
        for (name, node) in entries {
            let scalar = match node {
                TemplateNode::Literal(value) => Scalar::from_value(value),
                _ => None,
            };
            match scalar {
                Some(scalar) if is_valid_name(name) => defaults.push((name.clone(), scalar)),
                _ => tracing::debug!("Skipping '{}' in '{}': not a literal scalar default", name, section),
            }
        }
        defaults
    }

    /// Whether the template references no variables at all.
    pub fn is_static(&self) -> bool {
        self.variables.is_empty()
    }

    /// The document itself, if the template has no placeholders.
    pub fn to_literal_value(&self) -> Option<Value> {
        self.root.to_literal_value()
    }
}
