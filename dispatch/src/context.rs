//! Per-invocation state and the guard that installs it.
//!
//! Every dispatch gets its own [`Context`]. A [`ContextGuard`] swaps it into
//! the controller's "current" slot and puts the caller's context back when it
//! drops, so nested dispatches from inside an executor never clobber the outer
//! invocation, whether the inner one succeeds, fails or panics.

use std::cell::{Cell, RefCell};

use command_dispatch_core::{ArgBounds, ArgSpec, Argument, ParseError, ScratchBuffer, tokenize};

use crate::{CommandHandle, Invoker};

/// Mutable state of one invocation.
#[derive(Debug, Clone)]
pub struct Context {
    invoker: Invoker,
    command: String,
    raw_args: String,
    listener: Option<CommandHandle>,
    argv: Vec<Argument>,
    scratch: ScratchBuffer,
}

impl Context {
    /// Creates a context with a scratch buffer sized for `raw_args`.
    pub fn new(invoker: Invoker, command: impl Into<String>, raw_args: impl Into<String>) -> Self {
        let raw_args = raw_args.into();
        Self {
            scratch: ScratchBuffer::with_capacity(raw_args.len()),
            invoker,
            command: command.into(),
            raw_args,
            listener: None,
            argv: Vec::new(),
        }
    }

    pub fn invoker(&self) -> &Invoker {
        &self.invoker
    }

    /// Command token as typed.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Argument text after the command token.
    pub fn raw_args(&self) -> &str {
        &self.raw_args
    }

    /// Resolved definition, once lookup succeeded.
    pub fn listener(&self) -> Option<&CommandHandle> {
        self.listener.as_ref()
    }

    pub fn argv(&self) -> &[Argument] {
        &self.argv
    }

    pub fn argc(&self) -> usize {
        self.argv.len()
    }

    pub(crate) fn set_listener(&mut self, handle: CommandHandle) {
        self.listener = Some(handle);
    }

    /// Tokenizes the raw argument text into `argv`.
    ///
    /// `argv` is left empty when tokenizing fails.
    pub fn parse_arguments(&mut self, spec: &ArgSpec, bounds: ArgBounds) -> Result<(), ParseError> {
        self.argv.clear();
        self.argv = tokenize(&self.raw_args, spec, bounds, &mut self.scratch)?;
        Ok(())
    }
}

/// Equality ignores the scratch buffer.
impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        self.invoker == other.invoker
            && self.command == other.command
            && self.raw_args == other.raw_args
            && self.listener == other.listener
            && self.argv == other.argv
    }
}

/// Installs a [`Context`] as current and restores the previous one on drop.
#[must_use = "the context is uninstalled as soon as the guard drops"]
pub struct ContextGuard<'c> {
    slot: &'c RefCell<Option<Context>>,
    depth: &'c Cell<usize>,
    previous: Option<Context>,
}

impl<'c> ContextGuard<'c> {
    pub(crate) fn enter(slot: &'c RefCell<Option<Context>>, depth: &'c Cell<usize>, context: Context) -> Self {
        let previous = slot.replace(Some(context));
        depth.set(depth.get() + 1);
        Self {
            slot,
            depth,
            previous,
        }
    }
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        self.slot.replace(self.previous.take());
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use command_dispatch_core::ArgValue;

    fn context(command: &str, raw_args: &str) -> Context {
        Context::new(Invoker::console(), command, raw_args)
    }

    #[test]
    fn test_scratch_sized_to_arguments() {
        let ctx = context("say", "a fairly long argument string");
        assert!(ctx.scratch.capacity() >= ctx.raw_args().len());
    }

    #[test]
    fn test_parse_arguments_fills_argv() {
        let mut ctx = context("tp", "1.0 2.5 -3.25");
        let spec = ArgSpec::compile("f|f|f").unwrap();
        ctx.parse_arguments(&spec, ArgBounds { min: 3, max: 3 }).unwrap();
        assert_eq!(ctx.argc(), 3);
        assert_eq!(ctx.argv()[2].value, ArgValue::Float(-3.25));
    }

    #[test]
    fn test_fresh_contexts_parse_identically() {
        let spec = ArgSpec::compile("s|g").unwrap();
        let bounds = ArgBounds { min: 0, max: 2 };
        let mut first = context("say", "'hi there' rest 'of' it");
        let mut second = context("say", "'hi there' rest 'of' it");
        first.parse_arguments(&spec, bounds).unwrap();
        second.parse_arguments(&spec, bounds).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_guard_restores_previous_context() {
        let slot = RefCell::new(None);
        let depth = Cell::new(0);

        let outer = ContextGuard::enter(&slot, &depth, context("outer", ""));
        {
            let _inner = ContextGuard::enter(&slot, &depth, context("inner", ""));
            assert_eq!(slot.borrow().as_ref().map(|c| c.command().to_string()), Some("inner".into()));
            assert_eq!(depth.get(), 2);
        }
        assert_eq!(slot.borrow().as_ref().map(|c| c.command().to_string()), Some("outer".into()));
        assert_eq!(depth.get(), 1);

        drop(outer);
        assert!(slot.borrow().is_none());
        assert_eq!(depth.get(), 0);
    }

    #[test]
    fn test_guard_restores_on_panic() {
        let slot = RefCell::new(Some(context("outer", "")));
        let depth = Cell::new(1);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _inner = ContextGuard::enter(&slot, &depth, context("inner", ""));
            panic!("executor blew up");
        }));

        assert!(result.is_err());
        assert_eq!(slot.borrow().as_ref().map(|c| c.command().to_string()), Some("outer".into()));
        assert_eq!(depth.get(), 1);
    }
}
