//! Collaborator contracts consumed by the dispatcher.
//!
//! A [`Controller`](crate::Controller) is configured with three policies:
//!
//! - [`NamePolicy`]: decides which command names are well-formed.
//! - [`AuthPolicy`]: decides whether an [`Invoker`] may run a command.
//! - [`ErrorSink`]: receives every reported failure.
//!
//! The defaults are [`IdentifierPolicy`], [`LevelAuthPolicy`] and
//! [`TracingSink`].

use std::sync::LazyLock;

use command_dispatch_core::ErrorKind;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Context;

/// Whoever issued a command line.
///
/// # Examples
///
/// ```
/// use command_dispatch::Invoker;
///
/// let player = Invoker::new("alice", 10);
/// assert_eq!(player.name, "alice");
/// assert!(Invoker::console().auth_level > player.auth_level);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoker {
    pub name: String,
    #[serde(default)]
    pub auth_level: u32,
}

impl Invoker {
    pub fn new(name: impl Into<String>, auth_level: u32) -> Self {
        Self {
            name: name.into(),
            auth_level,
        }
    }

    /// The local console, authorized for everything.
    pub fn console() -> Self {
        Self::new("console", u32::MAX)
    }
}

impl Default for Invoker {
    fn default() -> Self {
        Self::console()
    }
}

/// A command name rejected by a [`NamePolicy`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct InvalidName {
    pub reason: String,
}

impl InvalidName {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Validates command names, both at registration and at dispatch.
pub trait NamePolicy {
    fn validate(&self, name: &str) -> Result<(), InvalidName>;
}

/// Maximum command name length accepted by [`IdentifierPolicy`].
pub const MAX_NAME_LEN: usize = 32;

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.\-]*$").expect("static regex must compile"));

/// Accepts identifier-like names: a letter or `_`, then letters, digits,
/// `_`, `.` or `-`, at most [`MAX_NAME_LEN`] bytes.
///
/// # Examples
///
/// ```
/// use command_dispatch::{IdentifierPolicy, NamePolicy};
///
/// let policy = IdentifierPolicy;
/// assert!(policy.validate("sv.restart").is_ok());
/// assert!(policy.validate("9lives").is_err());
/// assert!(policy.validate("rm -rf").is_err());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentifierPolicy;

impl NamePolicy for IdentifierPolicy {
    fn validate(&self, name: &str) -> Result<(), InvalidName> {
        if name.len() > MAX_NAME_LEN {
            return Err(InvalidName::new(format!(
                "name is longer than {MAX_NAME_LEN} characters"
            )));
        }
        if !IDENTIFIER_RE.is_match(name) {
            return Err(InvalidName::new(
                "name must start with a letter or '_' and contain only letters, digits, '_', '.' or '-'",
            ));
        }
        Ok(())
    }
}

/// Decides whether an invoker may run a command requiring `required` level.
pub trait AuthPolicy {
    fn authorize(&self, invoker: &Invoker, command: &str, required: u32) -> bool;
}

/// Grants access when the invoker's level is at least the required level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LevelAuthPolicy;

impl AuthPolicy for LevelAuthPolicy {
    fn authorize(&self, invoker: &Invoker, _command: &str, required: u32) -> bool {
        invoker.auth_level >= required
    }
}

/// One failure notification.
#[derive(Debug, Clone)]
pub struct ErrorReport<'a> {
    pub kind: ErrorKind,
    pub message: String,
    /// Snapshot of the active invocation, if the failure happened inside one.
    pub context: Option<&'a Context>,
}

/// Receives every reported failure. Implementations must not panic.
pub trait ErrorSink {
    fn report(&self, report: &ErrorReport<'_>);
}

/// Forwards reports to `tracing` at warn level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ErrorSink for TracingSink {
    fn report(&self, report: &ErrorReport<'_>) {
        let command = report.context.map(|ctx| ctx.command()).unwrap_or_default();
        let invoker = report
            .context
            .map(|ctx| ctx.invoker().name.as_str())
            .unwrap_or_default();
        tracing::warn!(kind = %report.kind, command, invoker, "{}", report.message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_policy_length_limit() {
        let long = "a".repeat(MAX_NAME_LEN + 1);
        let err = IdentifierPolicy.validate(&long).unwrap_err();
        assert!(err.reason.contains("longer"));
        assert!(IdentifierPolicy.validate(&"a".repeat(MAX_NAME_LEN)).is_ok());
    }

    #[test]
    fn test_identifier_policy_charset() {
        assert!(IdentifierPolicy.validate("_hidden").is_ok());
        assert!(IdentifierPolicy.validate("tp").is_ok());
        assert!(IdentifierPolicy.validate("").is_err());
        assert!(IdentifierPolicy.validate("say!").is_err());
    }

    #[test]
    fn test_level_auth_policy() {
        let policy = LevelAuthPolicy;
        assert!(policy.authorize(&Invoker::new("mod", 50), "kick", 50));
        assert!(!policy.authorize(&Invoker::new("guest", 0), "kick", 50));
        assert!(policy.authorize(&Invoker::console(), "kick", u32::MAX));
    }
}
