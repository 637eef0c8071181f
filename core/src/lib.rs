//! Argument specs, usage rendering and typed tokenizing for command dispatch.
//!
//! This crate holds the parts of the dispatch engine that need no registry
//! state:
//!
//! - [`ArgSpec`]: per-slot type masks compiled from a compact spec string
//!   such as `"i|f|s"` ([`ArgSpec::compile`]).
//! - [`render_usage`] / [`render_signature`]: human-readable signatures like
//!   `tp <x:float> <y:float> <z:float>`.
//! - [`tokenize`]: turns raw argument text into typed [`Argument`]s.
//! - [`validate_definition`] / [`check_arguments`]: structural checks on
//!   definitions and parsed argument lists.
//! - [`ErrorKind`]: the failure taxonomy shared by the whole workspace.
//!
//! # Example
//!
//! ```
//! use command_dispatch_core::*;
//!
//! let spec = ArgSpec::compile("l|g").unwrap();
//! let bounds = ArgBounds::new(1, 2).unwrap();
//! let tags = vec!["target".to_string(), "message".to_string()];
//!
//! assert_eq!(
//!     render_signature("msg", &spec, &tags, bounds, UsageMode::Compact),
//!     "msg <target:string> <message*:...>"
//! );
//!
//! let mut scratch = ScratchBuffer::default();
//! let argv = tokenize("Alice see you at \"noon\"", &spec, bounds, &mut scratch).unwrap();
//! assert_eq!(argv[0], Argument::string("alice"));
//! assert_eq!(argv[1], Argument::greedy("see you at \"noon\""));
//! assert!(check_arguments(&argv, &spec, bounds).is_ok());
//! ```

mod error;
mod spec;
mod tokenize;
mod types;
mod usage;
mod validate;

pub use error::{ArgumentError, DefinitionError, ErrorKind, ParseError, SpecError};
pub use tokenize::{ScratchBuffer, tokenize};
pub use types::*;
pub use usage::{UsageMode, render_signature, render_usage};
pub use validate::{check_arguments, validate_definition};
