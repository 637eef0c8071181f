//! Command definitions ("listeners") and their builder.
//!
//! A [`Listener`] bundles everything the dispatcher needs to run one command:
//! the compiled argument spec, bounds, tags, policy flags and hooks. Build one
//! with [`Listener::builder`] and hand it to
//! [`Controller::register`](crate::Controller::register).

use std::fmt;
use std::rc::Rc;

use command_dispatch_core::{
    ArgBounds, ArgSpec, DefinitionError, SpecError, UsageMode, render_signature,
    validate_definition,
};

use crate::{ArgumentMode, Arguments, Controller, DispatchError, Invoker};

/// Executor: runs the command. `Ok(0)` means the command aborted.
pub type ExecHook = Rc<dyn Fn(&Controller, &Invoker, &Arguments) -> anyhow::Result<i64>>;

/// Called after an executor failure or abort.
pub type FailHook = Rc<dyn Fn(&Controller, &Invoker, &DispatchError) -> anyhow::Result<()>>;

/// Called after a successful (non-zero) executor result.
pub type PostHook = Rc<dyn Fn(&Controller, &Invoker, i64) -> anyhow::Result<()>>;

/// Callbacks bound to a definition.
#[derive(Clone, Default)]
pub struct Hooks {
    pub on_exec: Option<ExecHook>,
    pub on_fail: Option<FailHook>,
    pub on_post: Option<PostHook>,
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("on_exec", &self.on_exec.is_some())
            .field("on_fail", &self.on_fail.is_some())
            .field("on_post", &self.on_post.is_some())
            .finish()
    }
}

/// A registered command definition.
#[derive(Debug, Clone)]
pub struct Listener {
    name: String,
    description: Option<String>,
    /// One entry per slot up to `bounds.max`; empty means untagged.
    tags: Vec<String>,
    spec: ArgSpec,
    bounds: ArgBounds,
    auth_level: u32,
    protected: bool,
    suspended: bool,
    mode: ArgumentMode,
    hooks: Hooks,
    usage: String,
}

impl Listener {
    /// Starts building a definition for `name`.
    pub fn builder(name: impl Into<String>) -> ListenerBuilder {
        ListenerBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn spec(&self) -> &ArgSpec {
        &self.spec
    }

    pub fn bounds(&self) -> ArgBounds {
        self.bounds
    }

    pub fn auth_level(&self) -> u32 {
        self.auth_level
    }

    pub fn is_protected(&self) -> bool {
        self.protected
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn mode(&self) -> ArgumentMode {
        self.mode
    }

    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    /// Generated compact signature, e.g. `tp <x:float> <y:float> <z:float>`.
    pub fn usage(&self) -> &str {
        &self.usage
    }

    /// Renders the signature in the given mode.
    pub fn usage_with(&self, mode: UsageMode) -> String {
        render_signature(&self.name, &self.spec, &self.tags, self.bounds, mode)
    }

    /// Recompiles the argument spec.
    ///
    /// On failure the spec falls back to the unrestricted default; usage is
    /// regenerated either way.
    pub fn set_spec(&mut self, source: &str) -> Result<(), SpecError> {
        let result = self.spec.apply(source);
        self.refresh_usage();
        result
    }

    pub fn set_suspended(&mut self, suspended: bool) {
        self.suspended = suspended;
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
    }

    pub fn set_hooks(&mut self, hooks: Hooks) {
        self.hooks = hooks;
    }

    fn refresh_usage(&mut self) {
        self.usage = self.usage_with(UsageMode::Compact);
    }
}

/// Builder for [`Listener`].
///
/// `min` defaults to 0. When no maximum is given it is the larger of the tag
/// count and the number of spec segments.
///
/// # Examples
///
/// ```
/// use command_dispatch::Listener;
///
/// let listener = Listener::builder("tp")
///     .description("Teleport to coordinates")
///     .spec("f|f|f")
///     .tags(["x", "y", "z"])
///     .args(3, 3)
///     .auth_level(10)
///     .build()
///     .unwrap();
///
/// assert_eq!(listener.usage(), "tp <x:float> <y:float> <z:float>");
/// assert_eq!(listener.bounds().max, 3);
/// ```
#[derive(Debug, Clone)]
pub struct ListenerBuilder {
    name: String,
    description: Option<String>,
    spec: String,
    tags: Vec<String>,
    min_args: usize,
    max_args: Option<usize>,
    auth_level: u32,
    protected: bool,
    suspended: bool,
    mode: ArgumentMode,
    hooks: Hooks,
}

impl ListenerBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            spec: String::new(),
            tags: Vec::new(),
            min_args: 0,
            max_args: None,
            auth_level: 0,
            protected: false,
            suspended: false,
            mode: ArgumentMode::Positional,
            hooks: Hooks::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Compact type spec, e.g. `"i|f|s"` or `"l|g"`.
    pub fn spec(mut self, spec: impl Into<String>) -> Self {
        self.spec = spec.into();
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Minimum and maximum argument counts.
    pub fn args(mut self, min: usize, max: usize) -> Self {
        self.min_args = min;
        self.max_args = Some(max);
        self
    }

    /// Sets only the minimum; the maximum keeps its default.
    pub fn min_args(mut self, min: usize) -> Self {
        self.min_args = min;
        self
    }

    pub fn auth_level(mut self, level: u32) -> Self {
        self.auth_level = level;
        self
    }

    pub fn protected(mut self, protected: bool) -> Self {
        self.protected = protected;
        self
    }

    pub fn suspended(mut self, suspended: bool) -> Self {
        self.suspended = suspended;
        self
    }

    pub fn associative(mut self, associative: bool) -> Self {
        self.mode = if associative {
            ArgumentMode::Associative
        } else {
            ArgumentMode::Positional
        };
        self
    }

    pub fn on_exec<F>(mut self, f: F) -> Self
    where
        F: Fn(&Controller, &Invoker, &Arguments) -> anyhow::Result<i64> + 'static,
    {
        self.hooks.on_exec = Some(Rc::new(f));
        self
    }

    pub fn on_fail<F>(mut self, f: F) -> Self
    where
        F: Fn(&Controller, &Invoker, &DispatchError) -> anyhow::Result<()> + 'static,
    {
        self.hooks.on_fail = Some(Rc::new(f));
        self
    }

    pub fn on_post<F>(mut self, f: F) -> Self
    where
        F: Fn(&Controller, &Invoker, i64) -> anyhow::Result<()> + 'static,
    {
        self.hooks.on_post = Some(Rc::new(f));
        self
    }

    /// Validates and compiles the definition.
    ///
    /// # Errors
    ///
    /// Returns the first [`DefinitionError`] found: empty name, invalid
    /// bounds, surplus or duplicate tags, or a spec compile failure.
    pub fn build(self) -> Result<Listener, DefinitionError> {
        let name = self.name.trim().to_string();
        let spec = ArgSpec::compile(&self.spec)?;

        let max = self.max_args.unwrap_or_else(|| {
            let segments = if self.spec.is_empty() {
                0
            } else {
                self.spec.split('|').count()
            };
            segments.max(self.tags.len())
        });
        let bounds = ArgBounds {
            min: self.min_args,
            max,
        };

        if let Some(err) = validate_definition(&name, &self.tags, bounds).into_iter().next() {
            return Err(err);
        }

        let mut tags = self.tags;
        tags.resize(bounds.max, String::new());

        let mut listener = Listener {
            name,
            description: self.description,
            tags,
            spec,
            bounds,
            auth_level: self.auth_level,
            protected: self.protected,
            suspended: self.suspended,
            mode: self.mode,
            hooks: self.hooks,
            usage: String::new(),
        };
        listener.refresh_usage();
        Ok(listener)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use command_dispatch_core::{ArgTypes, MAX_ARGS};

    #[test]
    fn test_default_bounds_follow_spec_segments() {
        let listener = Listener::builder("kick").spec("l|g").build().unwrap();
        assert_eq!(listener.bounds(), ArgBounds { min: 0, max: 2 });
        assert_eq!(listener.tags(), &[String::new(), String::new()]);
    }

    #[test]
    fn test_no_spec_means_no_args() {
        let listener = Listener::builder("quit").build().unwrap();
        assert_eq!(listener.bounds(), ArgBounds { min: 0, max: 0 });
        assert_eq!(listener.usage(), "quit");
    }

    #[test]
    fn test_build_rejects_empty_name() {
        let err = Listener::builder("  ").build().unwrap_err();
        assert_eq!(err, DefinitionError::EmptyName);
    }

    #[test]
    fn test_build_rejects_bounds_past_capacity() {
        let err = Listener::builder("big").args(0, MAX_ARGS + 1).build().unwrap_err();
        assert!(matches!(err, DefinitionError::InvalidBounds { .. }));
    }

    #[test]
    fn test_build_rejects_bad_spec() {
        let err = Listener::builder("bad").spec("i|z").build().unwrap_err();
        assert!(matches!(err, DefinitionError::Spec(SpecError::UnknownType { letter: 'z', .. })));
    }

    #[test]
    fn test_set_spec_rolls_back_and_refreshes_usage() {
        let mut listener = Listener::builder("give")
            .spec("l|i")
            .tags(["item", "count"])
            .args(1, 2)
            .build()
            .unwrap();
        assert_eq!(listener.usage(), "give <item:string> <count*:integer>");

        assert!(listener.set_spec("l|?i|k").is_err());
        assert_eq!(listener.spec(), &ArgSpec::default());
        assert_eq!(listener.usage(), "give <item:any> <count*:any>");

        listener.set_spec("g").unwrap();
        assert_eq!(listener.spec().slot(0), Some(ArgTypes::GREEDY));
        assert_eq!(listener.usage(), "give <item:...>");
    }

    #[test]
    fn test_min_args_keeps_default_max() {
        let listener = Listener::builder("tp").spec("f|f|f").min_args(2).build().unwrap();
        assert_eq!(listener.bounds(), ArgBounds { min: 2, max: 3 });

        let err = Listener::builder("tp").spec("f").min_args(2).build().unwrap_err();
        assert!(matches!(err, DefinitionError::InvalidBounds { min: 2, max: 1, .. }));
    }

    #[test]
    fn test_associative_flag_sets_mode() {
        let listener = Listener::builder("set").associative(true).build().unwrap();
        assert_eq!(listener.mode(), ArgumentMode::Associative);
    }
}
