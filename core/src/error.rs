//! Error types for spec compilation, tokenizing and definition checks.
//!
//! [`ErrorKind`] is the dispatch failure taxonomy shared by every crate in the
//! workspace. The other types here describe failures that happen before a
//! command's executor runs.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ArgTypes;

/// Dispatch failure taxonomy.
///
/// Displays and serializes as the upper-case token (e.g. `UNKNOWN_COMMAND`).
///
/// # Examples
///
/// ```
/// use command_dispatch_core::ErrorKind;
///
/// assert_eq!(ErrorKind::SyntaxError.to_string(), "SYNTAX_ERROR");
/// assert_eq!(ErrorKind::MissingExecuter.as_str(), "MISSING_EXECUTER");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    EmptyCommand,
    InvalidCommand,
    UnknownCommand,
    CommandSuspended,
    InsufficientAuth,
    MissingExecuter,
    IncompleteArgs,
    ExtraneousArgs,
    UnsupportedArg,
    SyntaxError,
    BufferOverflow,
    ExecutionFailed,
    ExecutionAborted,
    UnresolvedFailure,
    PostProcessingFailed,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::EmptyCommand => "EMPTY_COMMAND",
            ErrorKind::InvalidCommand => "INVALID_COMMAND",
            ErrorKind::UnknownCommand => "UNKNOWN_COMMAND",
            ErrorKind::CommandSuspended => "COMMAND_SUSPENDED",
            ErrorKind::InsufficientAuth => "INSUFFICIENT_AUTH",
            ErrorKind::MissingExecuter => "MISSING_EXECUTER",
            ErrorKind::IncompleteArgs => "INCOMPLETE_ARGS",
            ErrorKind::ExtraneousArgs => "EXTRANEOUS_ARGS",
            ErrorKind::UnsupportedArg => "UNSUPPORTED_ARG",
            ErrorKind::SyntaxError => "SYNTAX_ERROR",
            ErrorKind::BufferOverflow => "BUFFER_OVERFLOW",
            ErrorKind::ExecutionFailed => "EXECUTION_FAILED",
            ErrorKind::ExecutionAborted => "EXECUTION_ABORTED",
            ErrorKind::UnresolvedFailure => "UNRESOLVED_FAILURE",
            ErrorKind::PostProcessingFailed => "POST_PROCESSING_FAILED",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Spec string compilation errors. Positions are byte offsets into the spec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    /// A letter that does not name an argument type.
    #[error("unknown argument type '{letter}' at position {position}")]
    UnknownType { letter: char, position: usize },
    /// More `|`-separated segments than the fixed slot capacity.
    #[error("too many argument slots at position {position} (capacity {capacity})")]
    TooManySlots { position: usize, capacity: usize },
    /// A slot declared after a greedy one.
    #[error("argument slot declared after greedy slot at position {position}")]
    SlotAfterGreedy { position: usize },
}

/// Tokenizer errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// End of input reached inside a quoted string.
    #[error("unterminated {quote} quote starting at position {position}")]
    UnterminatedQuote { quote: char, position: usize },
    /// A write past the scratch buffer's capacity.
    #[error("argument buffer overflow (capacity {capacity})")]
    BufferOverflow { capacity: usize },
}

impl ParseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::UnterminatedQuote { .. } => ErrorKind::SyntaxError,
            ParseError::BufferOverflow { .. } => ErrorKind::BufferOverflow,
        }
    }
}

/// Post-parse argument check failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    #[error("expected at least {min} argument(s), got {argc}")]
    Incomplete { min: usize, argc: usize },
    #[error("expected at most {max} argument(s), got {argc}")]
    Extraneous { max: usize, argc: usize },
    #[error("argument {index} is {found}, expected {expected}")]
    Unsupported {
        index: usize,
        expected: String,
        found: String,
    },
}

impl ArgumentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ArgumentError::Incomplete { .. } => ErrorKind::IncompleteArgs,
            ArgumentError::Extraneous { .. } => ErrorKind::ExtraneousArgs,
            ArgumentError::Unsupported { .. } => ErrorKind::UnsupportedArg,
        }
    }

    pub(crate) fn unsupported(index: usize, slot: ArgTypes, tag: ArgTypes) -> Self {
        ArgumentError::Unsupported {
            index,
            expected: slot.describe(),
            found: tag.describe(),
        }
    }
}

/// Command definition errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// Command name is empty or whitespace-only.
    #[error("command name cannot be empty")]
    EmptyName,
    /// Bounds violate `min <= max <= capacity`.
    #[error("invalid argument bounds: min {min}, max {max} (capacity {capacity})")]
    InvalidBounds {
        min: usize,
        max: usize,
        capacity: usize,
    },
    /// More tags than argument slots.
    #[error("{count} argument tags declared but at most {max} arguments accepted")]
    TooManyTags { count: usize, max: usize },
    /// Two slots share a tag name.
    #[error("duplicate argument tag: {0}")]
    DuplicateTag(String),
    /// The spec string failed to compile.
    #[error("invalid argument spec: {0}")]
    Spec(#[from] SpecError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_serializes_as_token() {
        let json = serde_json::to_string(&ErrorKind::PostProcessingFailed).unwrap();
        assert_eq!(json, "\"POST_PROCESSING_FAILED\"");
        let kind: ErrorKind = serde_json::from_str("\"COMMAND_SUSPENDED\"").unwrap();
        assert_eq!(kind, ErrorKind::CommandSuspended);
    }

    #[test]
    fn test_parse_error_kinds() {
        let syntax = ParseError::UnterminatedQuote {
            quote: '"',
            position: 0,
        };
        assert_eq!(syntax.kind(), ErrorKind::SyntaxError);
        assert_eq!(
            ParseError::BufferOverflow { capacity: 4 }.kind(),
            ErrorKind::BufferOverflow
        );
    }
}
