//! Placeholder syntax inside string values.
//!
//! Grammar:
//!
//! - `$name` - `name` is the longest run of `[A-Za-z0-9_]` after the sigil and
//!   must start with a letter or underscore
//! - `${name}` - braced form, needed when the name is directly followed by
//!   identifier characters (`${env}_suffix`)
//! - `${name|func|...}` - braced form that pipes the value through template
//!   functions, left to right (`${branch|lower|trim}`)
//! - `$$` - a literal `$`
//!
//! Anything else after a `$` is a syntax error.

use std::fmt;

use super::TemplateNode;
use crate::constants::{FUNCTION_SEPARATOR, PLACEHOLDER_SIGIL};
use crate::core::{Result, SolutionError};
use crate::variables::is_valid_name;

/// A variable reference, with the template functions applied to its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Variable name
    pub name: String,
    /// Functions applied in order; empty for a plain reference
    pub functions: Vec<String>,
}

impl Reference {
    /// A plain reference to `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            functions: Vec::new(),
        }
    }

    /// Append a function to the pipeline.
    #[must_use]
    pub fn pipe(mut self, function: impl Into<String>) -> Self {
        self.functions.push(function.into());
        self
    }
}

impl From<&str> for Reference {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${{{}", self.name)?;
        for function in &self.functions {
            write!(f, "{FUNCTION_SEPARATOR}{function}")?;
        }
        write!(f, "}}")
    }
}

/// One piece of an interpolated string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text, with `$$` escapes already resolved
    Text(String),
    /// Reference to a variable
    Variable(Reference),
}

/// Parse one string value into a template node.
///
/// - No placeholder at all: [`TemplateNode::Literal`]
/// - Exactly one placeholder and nothing else: [`TemplateNode::Placeholder`]
/// - Anything else: [`TemplateNode::Interpolated`]
///
/// `pointer` is the JSON pointer of the value, used in error messages.
pub(crate) fn parse_string(input: &str, pointer: &str) -> Result<TemplateNode> {
    if !input.contains(PLACEHOLDER_SIGIL) {
        return Ok(TemplateNode::Literal(input.into()));
    }

    let segments = parse_segments(input, pointer)?;
    let node = match segments.as_slice() {
        [Segment::Variable(reference)] => TemplateNode::Placeholder(reference.clone()),
        [] => TemplateNode::Literal(String::new().into()),
        [Segment::Text(text)] => TemplateNode::Literal(text.clone().into()),
        _ => TemplateNode::Interpolated(segments),
    };
    Ok(node)
}

fn parse_segments(input: &str, pointer: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut text = String::new();
    let mut chars = input.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if c != PLACEHOLDER_SIGIL {
            text.push(c);
            continue;
        }

        let reference = match chars.peek().copied() {
            None => {
                return Err(SolutionError::malformed(
                    pointer,
                    format!("dangling '$' at end of \"{input}\" (write '$$' for a literal '$')"),
                ));
            }
            Some((_, '$')) => {
                chars.next();
                text.push(PLACEHOLDER_SIGIL);
                continue;
            }
            Some((open, '{')) => {
                chars.next();
                let start = open + 1;
                let mut end = None;
                for (idx, ch) in chars.by_ref() {
                    if ch == '}' {
                        end = Some(idx);
                        break;
                    }
                }
                let Some(end) = end else {
                    return Err(SolutionError::malformed(
                        pointer,
                        format!("unterminated '${{' in \"{input}\""),
                    ));
                };
                parse_braced(&input[start..end], input, pointer)?
            }
            Some((start, ch)) if ch.is_ascii_alphabetic() || ch == '_' => {
                let mut end = input.len();
                while let Some(&(idx, ch)) = chars.peek() {
                    if ch.is_ascii_alphanumeric() || ch == '_' {
                        chars.next();
                    } else {
                        end = idx;
                        break;
                    }
                }
                Reference::new(&input[start..end])
            }
            Some((_, other)) => {
                return Err(SolutionError::malformed(
                    pointer,
                    format!(
                        "'$' must be followed by a variable name, '{{' or '$', found '{other}' in \"{input}\""
                    ),
                ));
            }
        };

        if !text.is_empty() {
            segments.push(Segment::Text(std::mem::take(&mut text)));
        }
        segments.push(Segment::Variable(reference));
    }

    if !text.is_empty() {
        segments.push(Segment::Text(text));
    }
    Ok(segments)
}

/// Parse the inside of `${...}`: a name optionally followed by functions.
fn parse_braced(inner: &str, input: &str, pointer: &str) -> Result<Reference> {
    if inner.is_empty() {
        return Err(SolutionError::malformed(
            pointer,
            format!("empty placeholder '${{}}' in \"{input}\""),
        ));
    }

    let mut parts = inner.split(FUNCTION_SEPARATOR).map(str::trim);
    let name = parts.next().unwrap_or_default();
    if !is_valid_name(name) {
        return Err(SolutionError::malformed(
            pointer,
            format!("invalid variable name '{name}' in \"{input}\""),
        ));
    }

    let mut reference = Reference::new(name);
    for function in parts {
        if !is_valid_name(function) {
            return Err(SolutionError::malformed(
                pointer,
                format!("invalid function name '{function}' in \"{input}\""),
            ));
        }
        reference = reference.pipe(function);
    }
    Ok(reference)
}
