//! Error taxonomy for the engine.
//!
//! Every error here is a caller contract violation or malformed input.
//! Questions the engine cannot answer confidently never error; they return
//! the conservative answer instead.

use std::ops::Range;

use thiserror::Error;

/// Contradictory or inapplicable option records.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum OptionsError {
    /// `minimumArguments` exceeds `maximumArguments`.
    #[error("minimumArguments ({min}) exceeds maximumArguments ({max})")]
    InvertedBounds {
        /// Requested minimum.
        min: usize,
        /// Requested maximum.
        max: usize,
    },

    /// `argumentsLength` lies outside the minimum/maximum window.
    #[error("argumentsLength ({exact}) is outside the allowed argument bounds")]
    ExactOutsideBounds {
        /// Requested exact count.
        exact: usize,
    },

    /// A key that the target record does not support.
    #[error("option `{key}` does not apply to {target}")]
    InapplicableKey {
        /// The offending camelCase key.
        key: &'static str,
        /// The record being normalized.
        target: &'static str,
    },

    /// Two keys that cannot hold at the same time.
    #[error("options `{first}` and `{second}` contradict each other")]
    Contradiction {
        /// First conflicting key.
        first: &'static str,
        /// Second conflicting key.
        second: &'static str,
    },

    /// The raw options could not be deserialized.
    #[error("invalid options: {message}")]
    Malformed {
        /// Deserializer message.
        message: String,
    },
}

impl OptionsError {
    /// Creates an inapplicable key error.
    #[must_use]
    pub const fn inapplicable(key: &'static str, target: &'static str) -> Self {
        Self::InapplicableKey { key, target }
    }
}

impl From<serde_json::Error> for OptionsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed {
            message: err.to_string(),
        }
    }
}

/// Malformed selector strings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SelectorError {
    /// Input ended while a construct was still open.
    #[error("unexpected end of selector, expected {expected}")]
    UnexpectedEnd {
        /// What the parser was looking for.
        expected: &'static str,
    },

    /// An unexpected character.
    #[error("unexpected '{found}' at offset {offset}, expected {expected}")]
    UnexpectedChar {
        /// The character found.
        found: char,
        /// Byte offset into the selector.
        offset: usize,
        /// What the parser was looking for.
        expected: &'static str,
    },

    /// An attribute value that is neither a string, an integer nor a boolean.
    #[error("invalid attribute value '{value}'")]
    InvalidValue {
        /// The rejected text.
        value: String,
    },
}

/// Invalid edits or nodes a rewrite primitive cannot handle.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FixError {
    /// Two edits of one fix overlap.
    #[error("edits overlap: {first:?} and {second:?}")]
    OverlappingEdits {
        /// Range of the earlier edit.
        first: Range<usize>,
        /// Range of the later edit.
        second: Range<usize>,
    },

    /// An edit range lies outside the text or splits a character.
    #[error("edit range {range:?} is not valid for a text of {len} bytes")]
    InvalidRange {
        /// The rejected range.
        range: Range<usize>,
        /// Length of the text.
        len: usize,
    },

    /// A primitive was given a node it does not handle.
    #[error("{primitive} does not support {kind} nodes")]
    UnsupportedNode {
        /// Name of the primitive.
        primitive: &'static str,
        /// ESTree type of the node.
        kind: &'static str,
    },

    /// The tokens a primitive relies on were not found.
    #[error("{primitive} could not locate `{token}`")]
    MissingToken {
        /// Name of the primitive.
        primitive: &'static str,
        /// The token that was expected.
        token: &'static str,
    },
}

/// Configuration loading failures.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The configuration text is not valid.
    #[error("invalid engine configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of its allowed range.
    #[error("invalid value for `{field}`: {message}")]
    InvalidValue {
        /// Field name.
        field: &'static str,
        /// Description of the problem.
        message: String,
    },
}

/// Any engine error.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EngineError {
    /// See [`OptionsError`].
    #[error(transparent)]
    Options(#[from] OptionsError),
    /// See [`SelectorError`].
    #[error(transparent)]
    Selector(#[from] SelectorError),
    /// See [`FixError`].
    #[error(transparent)]
    Fix(#[from] FixError),
    /// See [`ConfigError`].
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// See [`tessel_syntax::SyntaxError`].
    #[error(transparent)]
    Syntax(#[from] tessel_syntax::SyntaxError),
}
