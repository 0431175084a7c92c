//! Error types for expression evaluation, resolution and statement building.

use core::fmt;

use thiserror::Error;

use crate::statement::Statement;

/// Malformed mini-language input, an unknown operator/arity combination, or
/// an input value that cannot be turned into an expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}: '{fragment}'")]
pub struct EvaluationError {
    /// What went wrong.
    pub message: String,
    /// The offending part of the input.
    pub fragment: String,
}

impl EvaluationError {
    /// Creates a new evaluation error.
    #[must_use]
    pub fn new(message: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            fragment: fragment.into(),
        }
    }

    /// Creates an "unexpected input" error at the given byte offset.
    #[must_use]
    pub fn unexpected(expected: &str, input: &str, offset: usize) -> Self {
        let fragment = input.get(offset..).unwrap_or_default();
        let fragment = if fragment.is_empty() {
            String::from("<end of input>")
        } else {
            String::from(fragment)
        };
        Self::new(format!("expected {expected} at offset {offset}"), fragment)
    }
}

/// The kind of structure a resolution was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureKind {
    /// A namespace (schema / database).
    Namespace,
    /// A table.
    Table,
    /// A table column or result column.
    Column,
}

impl fmt::Display for StructureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Namespace => "namespace",
            Self::Table => "table",
            Self::Column => "column",
        })
    }
}

/// An identifier could not be matched against the active scopes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unable to resolve {kind} '{path}'")]
pub struct ResolutionError {
    /// What was being resolved.
    pub kind: StructureKind,
    /// The dotted path as written by the caller.
    pub path: String,
}

impl ResolutionError {
    /// Creates a new resolution error.
    #[must_use]
    pub fn new(kind: StructureKind, path: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }
}

/// A statement is shaped in a way the target platform cannot render.
#[derive(Debug, Clone, Error)]
#[error("invalid statement: {message}")]
pub struct StatementConstructionError {
    /// What is wrong with the statement.
    pub message: String,
    /// The offending statement.
    pub statement: Box<Statement>,
}

impl StatementConstructionError {
    /// Creates a new construction error carrying the offending statement.
    #[must_use]
    pub fn new(message: impl Into<String>, statement: Statement) -> Self {
        Self {
            message: message.into(),
            statement: Box::new(statement),
        }
    }
}

/// Errors raised while compiling expressions and statements.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Input could not be evaluated into an expression.
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    /// An identifier could not be resolved.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// A statement could not be rendered.
    #[error(transparent)]
    StatementConstruction(#[from] StatementConstructionError),

    /// The tokenizer has no rendering for this node shape.
    #[error("unsupported expression node: {0}")]
    UnsupportedNode(&'static str),

    /// The platform has no valid rendering for a construct.
    #[error("{platform} does not support {feature}")]
    Unsupported {
        /// Platform name.
        platform: &'static str,
        /// The construct that cannot be rendered.
        feature: String,
    },
}

impl Error {
    /// Creates an [`Error::Unsupported`].
    #[must_use]
    pub fn unsupported(platform: &'static str, feature: impl Into<String>) -> Self {
        Self::Unsupported {
            platform,
            feature: feature.into(),
        }
    }
}

/// Result type for compilation operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_carries_remaining_input() {
        let err = EvaluationError::unexpected("operand", "a + )", 4);
        assert_eq!(err.fragment, ")");
        assert_eq!(err.to_string(), "expected operand at offset 4: ')'");
    }

    #[test]
    fn test_unexpected_at_end_of_input() {
        let err = EvaluationError::unexpected("operand", "a +", 3);
        assert_eq!(err.fragment, "<end of input>");
    }

    #[test]
    fn test_resolution_error_display() {
        let err = ResolutionError::new(StructureKind::Column, "users.nickname");
        assert_eq!(err.to_string(), "unable to resolve column 'users.nickname'");
    }

    #[test]
    fn test_umbrella_conversion() {
        let err: Error = EvaluationError::new("bad", "x").into();
        assert!(matches!(err, Error::Evaluation(_)));
    }
}
