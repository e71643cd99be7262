//! Transformations applied to resolved token values
//!
//! A token may carry a pipe-separated chain of transformations:
//!
//! ```text
//! {{%color.identity.kebabcase|uppercase|replace(-, _)%}}
//! ```
//!
//! Each call is parsed into a [`Transformation`] and the chain is applied
//! left to right.

mod grammar;
mod lexer;

use thiserror::Error;

pub use grammar::{parse_call, Call};

/// Errors that can occur when parsing a transformation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    /// Malformed call syntax, unknown name or wrong arity
    #[error("unknown transformation: {spec}")]
    Unknown { spec: String },
}

/// A post-processing function applied to a token's rendered value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transformation {
    Lowercase,
    Uppercase,
    Replace { from: String, to: String },
}

impl Transformation {
    /// Parse a single transformation such as `lowercase` or `replace(-, _)`
    pub fn parse(spec: &str) -> Result<Self, TransformError> {
        let unknown = || TransformError::Unknown {
            spec: spec.trim().to_string(),
        };
        let call = parse_call(spec).ok_or_else(unknown)?;

        match (call.name.as_str(), call.args.as_slice()) {
            ("lowercase", []) => Ok(Transformation::Lowercase),
            ("uppercase", []) => Ok(Transformation::Uppercase),
            ("replace", [from, to]) => Ok(Transformation::Replace {
                from: from.clone(),
                to: to.clone(),
            }),
            _ => Err(unknown()),
        }
    }

    pub fn apply(&self, input: &str) -> String {
        match self {
            Transformation::Lowercase => input.to_lowercase(),
            Transformation::Uppercase => input.to_uppercase(),
            // An empty pattern would match between every character
            Transformation::Replace { from, .. } if from.is_empty() => input.to_string(),
            Transformation::Replace { from, to } => input.replace(from.as_str(), to),
        }
    }
}

/// An ordered chain of transformations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pipeline {
    steps: Vec<Transformation>,
}

impl Pipeline {
    /// Parse every step in order, failing on the first unknown one
    pub fn parse<'s>(specs: impl IntoIterator<Item = &'s str>) -> Result<Self, TransformError> {
        let steps = specs
            .into_iter()
            .map(Transformation::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { steps })
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[Transformation] {
        &self.steps
    }

    pub fn apply(&self, input: &str) -> String {
        self.steps
            .iter()
            .fold(input.to_string(), |value, step| step.apply(&value))
    }
}

/// Split token content on `|`, ignoring pipes inside double quotes.
///
/// Segments are returned untrimmed.
pub fn split_pipes(content: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for (index, c) in content.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            '|' if !in_quotes => {
                segments.push(&content[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    segments.push(&content[start..]);
    segments
}
