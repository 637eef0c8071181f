//! Command registry.
//!
//! The [`Controller`] owns every attached command definition, resolves names
//! to definitions and holds the "current invocation" slot used by the
//! dispatcher. Names are identified by a stable 32-bit hash; two names that
//! hash alike are refused with a message naming both.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use command_dispatch_core::UsageMode;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::context::ContextGuard;
use crate::{
    AuthPolicy, Context, ErrorSink, IdentifierPolicy, LevelAuthPolicy, Listener, ListenerBuilder,
    NamePolicy, RegistryError, TracingSink,
};

static NEXT_CONTROLLER_ID: AtomicU64 = AtomicU64::new(1);

/// Stable hash of a command name: the first four bytes of its SHA-256 digest.
///
/// # Examples
///
/// ```
/// use command_dispatch::command_hash;
///
/// assert_eq!(command_hash("tp"), command_hash("tp"));
/// assert_ne!(command_hash("tp"), command_hash("TP"));
/// ```
pub fn command_hash(name: &str) -> u32 {
    let digest = Sha256::digest(name.as_bytes());
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}

/// One attached command.
struct CommandEntry {
    hash: u32,
    name: String,
    listener: Rc<RefCell<Listener>>,
}

/// Reference to an attached command.
///
/// Handles do not keep the definition alive: once the command is detached or
/// replaced, [`is_attached`](CommandHandle::is_attached) turns `false` and the
/// accessors return `None`.
#[derive(Clone)]
pub struct CommandHandle {
    hash: u32,
    name: String,
    owner: u64,
    listener: Weak<RefCell<Listener>>,
}

impl CommandHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hash(&self) -> u32 {
        self.hash
    }

    /// Returns `true` if this handle was issued by `controller`.
    pub fn belongs_to(&self, controller: &Controller) -> bool {
        self.owner == controller.id
    }

    pub fn is_attached(&self) -> bool {
        self.listener.strong_count() > 0
    }

    /// Reads the definition, or `None` if the handle is stale.
    pub fn with<R>(&self, f: impl FnOnce(&Listener) -> R) -> Option<R> {
        let listener = self.listener.upgrade()?;
        let borrowed = listener.borrow();
        Some(f(&*borrowed))
    }

    /// Mutates the definition, or `None` if the handle is stale.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut Listener) -> R) -> Option<R> {
        let listener = self.listener.upgrade()?;
        let mut borrowed = listener.borrow_mut();
        Some(f(&mut *borrowed))
    }

    /// Recompiles the definition's argument spec; see [`Listener::set_spec`].
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for a stale handle, or the compile
    /// error wrapped in [`RegistryError::Definition`].
    pub fn set_spec(&self, source: &str) -> Result<(), RegistryError> {
        self.with_mut(|listener| listener.set_spec(source))
            .ok_or_else(|| RegistryError::NotFound(self.name.clone()))?
            .map_err(|err| RegistryError::Definition(err.into()))
    }

    pub(crate) fn upgrade(&self) -> Option<Rc<RefCell<Listener>>> {
        self.listener.upgrade()
    }
}

impl PartialEq for CommandHandle {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner && Weak::ptr_eq(&self.listener, &other.listener)
    }
}

impl fmt::Debug for CommandHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandHandle")
            .field("name", &self.name)
            .field("hash", &format_args!("{:#010x}", self.hash))
            .field("attached", &self.is_attached())
            .finish()
    }
}

/// Registry and dispatcher for one command scope.
///
/// Single-threaded and reentrant: executors receive `&Controller` and may
/// dispatch further commands through it.
///
/// # Examples
///
/// ```
/// use command_dispatch::{Controller, Listener};
///
/// let controller = Controller::new();
/// let handle = controller
///     .register(Listener::builder("ping").on_exec(|_, _, _| Ok(1)))
///     .unwrap();
///
/// assert!(controller.contains("ping"));
/// assert_eq!(controller.find_by_name("ping"), Some(handle));
/// assert!(controller.register(Listener::builder("ping")).is_err());
/// ```
pub struct Controller {
    id: u64,
    entries: RefCell<Vec<CommandEntry>>,
    pub(crate) current: RefCell<Option<Context>>,
    pub(crate) depth: Cell<usize>,
    pub(crate) name_policy: Box<dyn NamePolicy>,
    pub(crate) auth_policy: Box<dyn AuthPolicy>,
    pub(crate) sink: Box<dyn ErrorSink>,
}

impl Controller {
    /// Creates a controller with the default policies.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> ControllerBuilder {
        ControllerBuilder::default()
    }

    /// Builds and attaches a definition.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Definition`] if the builder is invalid, plus
    /// any error [`attach`](Controller::attach) can return.
    pub fn register(&self, builder: ListenerBuilder) -> Result<CommandHandle, RegistryError> {
        let listener = builder.build()?;
        self.attach(listener)
    }

    /// Attaches a built definition.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::EmptyName`], [`RegistryError::InvalidName`]
    /// when the naming policy refuses the name, or
    /// [`RegistryError::HashCollision`] when the name's hash is taken.
    pub fn attach(&self, listener: Listener) -> Result<CommandHandle, RegistryError> {
        let name = listener.name().to_string();
        self.check_name(&name)?;
        let hash = command_hash(&name);

        let mut entries = self.entries.borrow_mut();
        if let Some(existing) = entries.iter().find(|entry| entry.hash == hash) {
            return Err(RegistryError::HashCollision {
                name,
                existing: existing.name.clone(),
                hash,
            });
        }

        let entry = CommandEntry {
            hash,
            name,
            listener: Rc::new(RefCell::new(listener)),
        };
        let handle = self.handle_for(&entry);
        info!(command = %entry.name, hash, "attached command");
        entries.push(entry);
        Ok(handle)
    }

    /// Replaces the definition registered under the builder's name, or
    /// attaches it if the name is free. Handles to the old definition go
    /// stale.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Protected`] if the existing definition is
    /// protected.
    pub fn replace(&self, builder: ListenerBuilder) -> Result<CommandHandle, RegistryError> {
        let listener = builder.build()?;
        let name = listener.name().to_string();
        self.check_name(&name)?;
        let hash = command_hash(&name);

        let mut entries = self.entries.borrow_mut();
        let Some(position) = entries.iter().position(|entry| entry.hash == hash) else {
            drop(entries);
            return self.attach(listener);
        };
        if entries[position].name != name {
            return Err(RegistryError::HashCollision {
                name,
                existing: entries[position].name.clone(),
                hash,
            });
        }
        if entries[position].listener.borrow().is_protected() {
            return Err(RegistryError::Protected(name));
        }

        let entry = CommandEntry {
            hash,
            name,
            listener: Rc::new(RefCell::new(listener)),
        };
        let handle = self.handle_for(&entry);
        info!(command = %entry.name, "replaced command");
        entries[position] = entry;
        Ok(handle)
    }

    /// Detaches a command. Outstanding handles go stale.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] or [`RegistryError::Protected`].
    pub fn detach(&self, name: &str) -> Result<(), RegistryError> {
        let mut entries = self.entries.borrow_mut();
        let position = entries
            .iter()
            .position(|entry| entry.name == name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        if entries[position].listener.borrow().is_protected() {
            return Err(RegistryError::Protected(name.to_string()));
        }
        entries.remove(position);
        info!(command = name, "detached command");
        Ok(())
    }

    /// Resolves a name to its entry.
    pub fn find_by_name(&self, name: &str) -> Option<CommandHandle> {
        let hash = command_hash(name);
        let entries = self.entries.borrow();
        entries
            .iter()
            .find(|entry| entry.hash == hash && entry.name == name)
            .map(|entry| self.handle_for(entry))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find_by_name(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Attached command names in attach order.
    pub fn commands(&self) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .map(|entry| entry.name.clone())
            .collect()
    }

    /// Usage signature of a command.
    pub fn usage(&self, name: &str, mode: UsageMode) -> Option<String> {
        self.find_by_name(name)?
            .with(|listener| listener.usage_with(mode))
    }

    /// Suspends or resumes a command.
    pub fn set_suspended(&self, name: &str, suspended: bool) -> Result<(), RegistryError> {
        self.find_by_name(name)
            .and_then(|handle| handle.with_mut(|listener| listener.set_suspended(suspended)))
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// Snapshot of the innermost active invocation.
    pub fn current_context(&self) -> Option<Context> {
        self.current.borrow().clone()
    }

    /// Number of invocations currently on the stack.
    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    pub(crate) fn enter(&self, context: Context) -> ContextGuard<'_> {
        ContextGuard::enter(&self.current, &self.depth, context)
    }

    fn check_name(&self, name: &str) -> Result<(), RegistryError> {
        if name.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }
        self.name_policy
            .validate(name)
            .map_err(|err| RegistryError::InvalidName {
                name: name.to_string(),
                reason: err.reason,
            })
    }

    fn handle_for(&self, entry: &CommandEntry) -> CommandHandle {
        CommandHandle {
            hash: entry.hash,
            name: entry.name.clone(),
            owner: self.id,
            listener: Rc::downgrade(&entry.listener),
        }
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("id", &self.id)
            .field("commands", &self.commands())
            .field("depth", &self.depth.get())
            .finish()
    }
}

/// Configures a [`Controller`]'s policies.
///
/// # Examples
///
/// ```
/// use command_dispatch::{Controller, IdentifierPolicy, LevelAuthPolicy, TracingSink};
///
/// let controller = Controller::builder()
///     .name_policy(IdentifierPolicy)
///     .auth_policy(LevelAuthPolicy)
///     .error_sink(TracingSink)
///     .build();
/// assert!(controller.is_empty());
/// ```
#[derive(Default)]
pub struct ControllerBuilder {
    name_policy: Option<Box<dyn NamePolicy>>,
    auth_policy: Option<Box<dyn AuthPolicy>>,
    sink: Option<Box<dyn ErrorSink>>,
}

impl ControllerBuilder {
    pub fn name_policy(mut self, policy: impl NamePolicy + 'static) -> Self {
        self.name_policy = Some(Box::new(policy));
        self
    }

    pub fn auth_policy(mut self, policy: impl AuthPolicy + 'static) -> Self {
        self.auth_policy = Some(Box::new(policy));
        self
    }

    pub fn error_sink(mut self, sink: impl ErrorSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn build(self) -> Controller {
        Controller {
            id: NEXT_CONTROLLER_ID.fetch_add(1, Ordering::Relaxed),
            entries: RefCell::new(Vec::new()),
            current: RefCell::new(None),
            depth: Cell::new(0),
            name_policy: self.name_policy.unwrap_or_else(|| Box::new(IdentifierPolicy)),
            auth_policy: self.auth_policy.unwrap_or_else(|| Box::new(LevelAuthPolicy)),
            sink: self.sink.unwrap_or_else(|| Box::new(TracingSink)),
        }
    }
}
