//! The dispatch pipeline.
//!
//! [`Controller::dispatch`] runs one command line through a fixed sequence
//! of checks (name, lookup, suspension, authorization, executor presence,
//! tokenizing, argument bounds and types) and stops at the first failure.
//! Every failure is reported once to the controller's
//! [`ErrorSink`](crate::ErrorSink) and returned as a [`DispatchError`].
//!
//! Executors and hooks are foreign code: an `Err` or a panic from them is
//! caught and converted, and hook faults never change the primary outcome.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use command_dispatch_core::{ArgBounds, ArgSpec, ErrorKind, check_arguments};
use tracing::debug;

use crate::{
    ArgumentMode, Arguments, CommandHandle, Context, Controller, DispatchError, ErrorReport,
    ExecHook, Hooks, Invoker,
};

/// What the pipeline needs from a definition, copied out so no borrow of the
/// definition is held while its executor runs.
struct Invocation {
    handle: CommandHandle,
    exec: ExecHook,
    spec: ArgSpec,
    bounds: ArgBounds,
    tags: Vec<String>,
    mode: ArgumentMode,
    hooks: Hooks,
    usage: String,
}

impl Controller {
    /// Parses and runs one command line on behalf of `invoker`.
    ///
    /// Returns the executor's result clamped to `i32`. May be called again
    /// from inside an executor; each nesting level gets its own
    /// [`Context`](crate::Context).
    ///
    /// # Errors
    ///
    /// Returns a [`DispatchError`] whose [`kind`](DispatchError::kind) names
    /// the failed step. The same failure has already been reported to the
    /// error sink.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_dispatch::{Controller, Invoker, Listener};
    /// use command_dispatch_core::ErrorKind;
    ///
    /// let controller = Controller::new();
    /// controller
    ///     .register(
    ///         Listener::builder("add")
    ///             .spec("i|i")
    ///             .args(2, 2)
    ///             .on_exec(|_, _, args| {
    ///                 let a = args.get(0).and_then(|v| v.as_i64()).unwrap_or_default();
    ///                 let b = args.get(1).and_then(|v| v.as_i64()).unwrap_or_default();
    ///                 Ok(a + b)
    ///             }),
    ///     )
    ///     .unwrap();
    ///
    /// let console = Invoker::console();
    /// assert_eq!(controller.dispatch(&console, "add 2 40"), Ok(42));
    /// assert_eq!(
    ///     controller.dispatch(&console, "add 2").unwrap_err().kind(),
    ///     ErrorKind::IncompleteArgs
    /// );
    /// ```
    pub fn dispatch(&self, invoker: &Invoker, line: &str) -> Result<i32, DispatchError> {
        if line.trim_matches(is_space).is_empty() {
            return Err(self.fail(DispatchError::EmptyCommand));
        }

        let (command, raw_args) = split_command(line);
        debug!(command, depth = self.depth(), invoker = %invoker.name, "dispatching");

        let _guard = self.enter(Context::new(invoker.clone(), command, raw_args));
        self.run(invoker, command, raw_args)
    }

    fn run(&self, invoker: &Invoker, command: &str, raw_args: &str) -> Result<i32, DispatchError> {
        if let Err(invalid) = self.name_policy.validate(command) {
            return Err(self.fail(DispatchError::InvalidCommand {
                name: command.to_string(),
                reason: invalid.reason,
            }));
        }

        let invocation = self.resolve(invoker, command)?;

        let argv = if raw_args.is_empty() {
            Vec::new()
        } else {
            let parsed = self
                .with_current(|ctx| {
                    ctx.parse_arguments(&invocation.spec, invocation.bounds)
                        .map(|()| ctx.argv().to_vec())
                })
                .unwrap_or_else(|| Ok(Vec::new()));
            match parsed {
                Ok(argv) => argv,
                Err(source) => {
                    return Err(self.fail(DispatchError::Parse {
                        command: command.to_string(),
                        source,
                    }));
                }
            }
        };
        debug!(command, argc = argv.len(), "parsed arguments");

        if let Err(source) = check_arguments(&argv, &invocation.spec, invocation.bounds) {
            return Err(self.fail(DispatchError::Arguments {
                command: command.to_string(),
                usage: invocation.usage.clone(),
                source,
            }));
        }

        let args = Arguments::build(invocation.mode, &argv, &invocation.tags);
        self.execute(invoker, command, &invocation, &args)
    }

    /// Lookup, suspension, authorization and executor-presence checks.
    fn resolve(&self, invoker: &Invoker, command: &str) -> Result<Invocation, DispatchError> {
        let unknown = || DispatchError::UnknownCommand(command.to_string());
        let Some(handle) = self.find_by_name(command) else {
            return Err(self.fail(unknown()));
        };
        let Some(listener) = handle.upgrade() else {
            return Err(self.fail(unknown()));
        };
        self.with_current(|ctx| ctx.set_listener(handle.clone()));

        let (suspended, required, hooks) = {
            let listener = listener.borrow();
            (
                listener.is_suspended(),
                listener.auth_level(),
                listener.hooks().clone(),
            )
        };

        if suspended {
            return Err(self.fail(DispatchError::Suspended(command.to_string())));
        }
        if !self.auth_policy.authorize(invoker, command, required) {
            return Err(self.fail(DispatchError::InsufficientAuth {
                command: command.to_string(),
                invoker: invoker.name.clone(),
                required,
            }));
        }
        let Some(exec) = hooks.on_exec.clone() else {
            return Err(self.fail(DispatchError::MissingExecuter(command.to_string())));
        };

        let listener = listener.borrow();
        Ok(Invocation {
            handle,
            exec,
            spec: *listener.spec(),
            bounds: listener.bounds(),
            tags: listener.tags().to_vec(),
            mode: listener.mode(),
            hooks,
            usage: listener.usage().to_string(),
        })
    }

    fn execute(
        &self,
        invoker: &Invoker,
        command: &str,
        invocation: &Invocation,
        args: &Arguments,
    ) -> Result<i32, DispatchError> {
        let exec = &invocation.exec;
        let code = match contain(|| exec(self, invoker, args)) {
            Ok(code) => code,
            Err(reason) => {
                let err = DispatchError::ExecutionFailed {
                    command: command.to_string(),
                    reason,
                };
                return Err(self.fail_with_hook(invoker, invocation, err));
            }
        };

        if code == 0 {
            let err = DispatchError::ExecutionAborted(command.to_string());
            return Err(self.fail_with_hook(invoker, invocation, err));
        }

        if let Some(post) = invocation.hooks.on_post.as_ref() {
            if let Err(reason) = contain(|| post(self, invoker, code)) {
                self.report(
                    ErrorKind::PostProcessingFailed,
                    format!("post-processing of '{command}' failed: {reason}"),
                );
            }
        }

        debug!(command, code, handle = ?invocation.handle, "command completed");
        Ok(clamp_code(code))
    }

    /// Reports the primary failure, then gives the on-fail hook a look at it.
    fn fail_with_hook(
        &self,
        invoker: &Invoker,
        invocation: &Invocation,
        err: DispatchError,
    ) -> DispatchError {
        let err = self.fail(err);
        if let Some(on_fail) = invocation.hooks.on_fail.as_ref() {
            if let Err(reason) = contain(|| on_fail(self, invoker, &err)) {
                self.report(
                    ErrorKind::UnresolvedFailure,
                    format!("failure handler of '{}' failed: {reason}", invocation.handle.name()),
                );
            }
        }
        err
    }

    fn fail(&self, err: DispatchError) -> DispatchError {
        self.report(err.kind(), err.to_string());
        err
    }

    fn report(&self, kind: ErrorKind, message: String) {
        let context = self.current_context();
        self.sink.report(&ErrorReport {
            kind,
            message,
            context: context.as_ref(),
        });
    }

    fn with_current<R>(&self, f: impl FnOnce(&mut Context) -> R) -> Option<R> {
        self.current.borrow_mut().as_mut().map(f)
    }
}

fn is_space(c: char) -> bool {
    c.is_ascii_whitespace()
}

/// Splits at the first whitespace after the command token. The argument text
/// starts right after that single separator.
fn split_command(line: &str) -> (&str, &str) {
    let line = line.trim_start_matches(is_space);
    match line.find(is_space) {
        Some(index) => (&line[..index], &line[index + 1..]),
        None => (line, ""),
    }
}

/// Runs foreign code, turning both `Err` and panics into a reason string.
fn contain<T>(f: impl FnOnce() -> anyhow::Result<T>) -> Result<T, String> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(format!("{err:#}")),
        Err(payload) => Err(format!("panicked: {}", panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

fn clamp_code(code: i64) -> i32 {
    i32::try_from(code).unwrap_or(if code < 0 { i32::MIN } else { i32::MAX })
}
