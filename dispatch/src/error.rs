//! Error types for registry, dispatch and manifest operations.
//!
//! [`DispatchError`] is what [`Controller::dispatch`](crate::Controller::dispatch)
//! returns; every variant maps onto an [`ErrorKind`] through
//! [`DispatchError::kind`].

use command_dispatch_core::{ArgumentError, DefinitionError, ErrorKind, ParseError};
use thiserror::Error;

/// Errors from attaching, replacing or detaching commands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Command name is empty or whitespace-only.
    #[error("command name cannot be empty")]
    EmptyName,

    /// The naming policy rejected the command name.
    #[error("invalid command name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// Two distinct commands hash to the same value (or share a name).
    #[error("command '{name}' collides with existing command '{existing}' (hash {hash:#010x})")]
    HashCollision {
        name: String,
        existing: String,
        hash: u32,
    },

    /// A protected command cannot be detached or replaced.
    #[error("command '{0}' is protected")]
    Protected(String),

    /// No command is registered under this name.
    #[error("command not found: {0}")]
    NotFound(String),

    /// The definition itself is malformed.
    #[error("invalid definition: {0}")]
    Definition(#[from] DefinitionError),
}

/// Failures returned by dispatch.
///
/// Hook faults (`UNRESOLVED_FAILURE`, `POST_PROCESSING_FAILED`) are reported to
/// the error sink only and never replace the primary outcome, so they have no
/// variant here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    #[error("empty command")]
    EmptyCommand,

    #[error("invalid command name '{name}': {reason}")]
    InvalidCommand { name: String, reason: String },

    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("command '{0}' is suspended")]
    Suspended(String),

    #[error("'{invoker}' is not authorized to run '{command}' (requires level {required})")]
    InsufficientAuth {
        command: String,
        invoker: String,
        required: u32,
    },

    #[error("command '{0}' has no executor bound")]
    MissingExecuter(String),

    /// Tokenizing failed (`SYNTAX_ERROR` or `BUFFER_OVERFLOW`).
    #[error("cannot parse arguments of '{command}': {source}")]
    Parse {
        command: String,
        #[source]
        source: ParseError,
    },

    /// Argument count or type check failed.
    #[error("bad arguments for '{command}': {source}; usage: {usage}")]
    Arguments {
        command: String,
        usage: String,
        #[source]
        source: ArgumentError,
    },

    #[error("command '{command}' failed: {reason}")]
    ExecutionFailed { command: String, reason: String },

    #[error("command '{0}' aborted")]
    ExecutionAborted(String),
}

impl DispatchError {
    /// Taxonomy entry for this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::EmptyCommand => ErrorKind::EmptyCommand,
            DispatchError::InvalidCommand { .. } => ErrorKind::InvalidCommand,
            DispatchError::UnknownCommand(_) => ErrorKind::UnknownCommand,
            DispatchError::Suspended(_) => ErrorKind::CommandSuspended,
            DispatchError::InsufficientAuth { .. } => ErrorKind::InsufficientAuth,
            DispatchError::MissingExecuter(_) => ErrorKind::MissingExecuter,
            DispatchError::Parse { source, .. } => source.kind(),
            DispatchError::Arguments { source, .. } => source.kind(),
            DispatchError::ExecutionFailed { .. } => ErrorKind::ExecutionFailed,
            DispatchError::ExecutionAborted(_) => ErrorKind::ExecutionAborted,
        }
    }
}

/// Errors from loading or validating a command manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Manifest version string is empty.
    #[error("manifest version cannot be empty")]
    EmptyVersion,

    /// Two entries share a command name.
    #[error("duplicate command in manifest: {0}")]
    DuplicateCommand(String),

    /// One entry has a malformed definition.
    #[error("invalid definition for '{command}': {source}")]
    Definition {
        command: String,
        #[source]
        source: DefinitionError,
    },
}

/// Convenience alias for results with [`ManifestError`].
pub type Result<T> = std::result::Result<T, ManifestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collision_message_names_both_commands() {
        let err = RegistryError::HashCollision {
            name: "tp".into(),
            existing: "tp".into(),
            hash: 0xdead_beef,
        };
        assert_eq!(
            err.to_string(),
            "command 'tp' collides with existing command 'tp' (hash 0xdeadbeef)"
        );
    }

    #[test]
    fn test_parse_error_kind_passes_through() {
        let err = DispatchError::Parse {
            command: "say".into(),
            source: ParseError::UnterminatedQuote {
                quote: '\'',
                position: 2,
            },
        };
        assert_eq!(err.kind(), ErrorKind::SyntaxError);
    }
}
