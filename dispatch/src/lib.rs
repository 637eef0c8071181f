//! Command registry and reentrant dispatcher.
//!
//! This crate turns raw command lines into calls of registered executors. It
//! builds on the spec compiler and tokenizer in `command-dispatch-core` and
//! adds the registry ([`Controller`]), per-invocation state ([`Context`]),
//! the dispatch pipeline and YAML/JSON command manifests.
//!
//! # Quick start
//!
//! ```
//! use command_dispatch::{Controller, Invoker, Listener};
//!
//! let controller = Controller::new();
//! controller
//!     .register(
//!         Listener::builder("tp")
//!             .description("Teleport to coordinates")
//!             .spec("f|f|f")
//!             .tags(["x", "y", "z"])
//!             .args(3, 3)
//!             .on_exec(|_, _, args| {
//!                 let z = args.get(2).and_then(|v| v.as_f64()).unwrap_or_default();
//!                 Ok(z as i64)
//!             }),
//!     )
//!     .unwrap();
//!
//! let code = controller.dispatch(&Invoker::console(), "tp 1.0 2.5 -3.25").unwrap();
//! assert_eq!(code, -3);
//! ```
//!
//! # Reentrancy
//!
//! Executors receive `&Controller` and may call
//! [`dispatch`](Controller::dispatch) again. Each call installs its own
//! [`Context`] through a guard that restores the caller's context when the
//! call returns, fails or panics.

mod arguments;
mod config;
mod context;
mod dispatcher;
mod error;
mod listener;
mod policy;
mod registry;

pub use arguments::{ArgKey, ArgumentMode, Arguments};
pub use config::{CommandConfig, CommandManifest};
pub use context::{Context, ContextGuard};
pub use error::{DispatchError, ManifestError, RegistryError, Result};
pub use listener::{ExecHook, FailHook, Hooks, Listener, ListenerBuilder, PostHook};
pub use policy::{
    AuthPolicy, ErrorReport, ErrorSink, IdentifierPolicy, InvalidName, Invoker, LevelAuthPolicy,
    MAX_NAME_LEN, NamePolicy, TracingSink,
};
pub use registry::{CommandHandle, Controller, ControllerBuilder, command_hash};
