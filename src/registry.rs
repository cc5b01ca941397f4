use crate::any_value::AnyTable;
use crate::args::IntoArgs;
use crate::dispatcher::Dispatcher;
use crate::error::DispatchError;
use crate::registrar::IntoImplementation;
use crate::signature::Signature;
use crate::table::{DispatchTable, Implementation, Metadata};
use std::any::type_name;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};

/// A thread-safe directory of dispatch tables, keyed by function name
///
/// `DispatchRegistry` is a cheap handle: clones share the same tables. Create
/// one with [`new`](Self::new) wherever an isolated set of functions is
/// wanted (every test, for instance), or use [`global`](Self::global) for a
/// single process-wide registry.
///
/// Tables are created on first registration. A name is tied to the output
/// type of its first table; every implementation under that name must
/// return the same type.
///
/// # Examples
///
/// ```
/// use sovran_multimethod::{DispatchRegistry, DispatchError};
///
/// let registry = DispatchRegistry::new();
/// registry.register_fn("f", |_: i32| 1)?;
/// registry.register_fn("f", |_: String| 2)?;
///
/// assert_eq!(registry.dispatch::<i32, _>("f", (5,))?, 1);
/// assert_eq!(registry.dispatch::<i32, _>("f", ("x".to_string(),))?, 2);
/// assert!(registry.dispatch::<i32, _>("f", (5.0,)).is_err());
/// # Ok::<(), DispatchError>(())
/// ```
#[derive(Clone, Default)]
pub struct DispatchRegistry {
    tables: Arc<Mutex<HashMap<String, AnyTable>>>,
}

impl DispatchRegistry {
    /// Creates a new, empty registry
    pub fn new() -> Self {
        Self {
            tables: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The process-wide registry, created empty on first use
    pub fn global() -> &'static DispatchRegistry {
        static GLOBAL: OnceLock<DispatchRegistry> = OnceLock::new();
        GLOBAL.get_or_init(DispatchRegistry::new)
    }

    /// Returns the table for `name`, creating an empty one if needed
    ///
    /// The lookup and the insert happen under one lock, so concurrent callers
    /// always receive the same table.
    ///
    /// # Errors
    ///
    /// - Returns `DispatchError::OutputMismatch` if `name` already holds
    ///   implementations with a different output type
    /// - Returns `DispatchError::LockError` if the internal lock cannot be acquired
    pub fn get_or_create_table<R: 'static>(
        &self,
        name: &str,
    ) -> Result<Arc<DispatchTable<R>>, DispatchError> {
        let mut tables = self.tables.lock().map_err(|_| DispatchError::LockError)?;
        if let Some(existing) = tables.get(name) {
            return downcast_table(name, existing);
        }

        let table = Arc::new(DispatchTable::new(name));
        tables.insert(name.to_string(), AnyTable::new(Arc::clone(&table)));
        tracing::trace!(name, output = type_name::<R>(), "created dispatch table");
        Ok(table)
    }

    /// Returns the table for `name` without creating one
    ///
    /// # Errors
    ///
    /// - Returns `DispatchError::OutputMismatch` if the table has a different output type
    /// - Returns `DispatchError::LockError` if the internal lock cannot be acquired
    pub fn table<R: 'static>(
        &self,
        name: &str,
    ) -> Result<Option<Arc<DispatchTable<R>>>, DispatchError> {
        let tables = self.tables.lock().map_err(|_| DispatchError::LockError)?;
        tables
            .get(name)
            .map(|existing| downcast_table(name, existing))
            .transpose()
    }

    /// Binds `implementation` to `signature` under `name`
    ///
    /// Returns a [`Dispatcher`] that routes through the table for `name`,
    /// including implementations registered before or after this one.
    ///
    /// # Errors
    ///
    /// - Returns `DispatchError::RegistrationConflict` if the signature is already bound
    /// - Returns `DispatchError::OutputMismatch` if `name` is in use with another output type
    /// - Returns `DispatchError::LockError` if a lock cannot be acquired
    pub fn register<R: 'static>(
        &self,
        name: &str,
        signature: Signature,
        implementation: Implementation<R>,
        metadata: Metadata,
    ) -> Result<Dispatcher<R>, DispatchError> {
        let table = self.get_or_create_table::<R>(name)?;
        table.register(signature.clone(), implementation, metadata)?;
        tracing::debug!(name, %signature, "registered implementation");
        Ok(Dispatcher::new(table))
    }

    /// Binds a typed closure under `name`, using its parameter types as the signature
    ///
    /// # Errors
    ///
    /// Same as [`register`](Self::register).
    pub fn register_fn<R, F, M>(&self, name: &str, implementation: F) -> Result<Dispatcher<R>, DispatchError>
    where
        R: 'static,
        F: IntoImplementation<R, M>,
    {
        self.register(
            name,
            F::signature(),
            implementation.into_implementation(),
            Metadata::new(name),
        )
    }

    /// Returns a dispatcher for an already registered name
    ///
    /// # Errors
    ///
    /// - Returns `DispatchError::UnknownFunction` if nothing is registered under `name`
    /// - Returns `DispatchError::OutputMismatch` if the table has a different output type
    /// - Returns `DispatchError::LockError` if the internal lock cannot be acquired
    pub fn dispatcher<R: 'static>(&self, name: &str) -> Result<Dispatcher<R>, DispatchError> {
        self.table::<R>(name)?
            .map(Dispatcher::new)
            .ok_or_else(|| DispatchError::UnknownFunction(name.to_string()))
    }

    /// Looks up `name` and calls it with `args`
    ///
    /// # Errors
    ///
    /// - Returns `DispatchError::DispatchMiss` if `name` is unknown or has no
    ///   implementation for the argument types
    /// - Returns `DispatchError::OutputMismatch` if `name` returns another type
    /// - Returns `DispatchError::LockError` if a lock cannot be acquired
    pub fn dispatch<R: 'static, A: IntoArgs>(&self, name: &str, args: A) -> Result<R, DispatchError> {
        let args = args.into_args();
        match self.table::<R>(name)? {
            Some(table) => Dispatcher::new(table).call_args(args),
            None => Err(DispatchError::DispatchMiss {
                name: name.to_string(),
                signature: args.signature(),
            }),
        }
    }

    /// Returns a view whose names are qualified with `namespace`
    pub fn scoped(&self, namespace: impl Into<String>) -> ScopedRegistry {
        ScopedRegistry {
            registry: self.clone(),
            namespace: namespace.into(),
        }
    }

    /// Returns all registered function names
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::LockError` if the internal lock cannot be acquired.
    pub fn names(&self) -> Result<Vec<String>, DispatchError> {
        let tables = self.tables.lock().map_err(|_| DispatchError::LockError)?;
        Ok(tables.keys().cloned().collect())
    }

    pub fn contains(&self, name: &str) -> Result<bool, DispatchError> {
        let tables = self.tables.lock().map_err(|_| DispatchError::LockError)?;
        Ok(tables.contains_key(name))
    }

    /// Returns the number of function names
    pub fn len(&self) -> Result<usize, DispatchError> {
        let tables = self.tables.lock().map_err(|_| DispatchError::LockError)?;
        Ok(tables.len())
    }

    pub fn is_empty(&self) -> Result<bool, DispatchError> {
        let tables = self.tables.lock().map_err(|_| DispatchError::LockError)?;
        Ok(tables.is_empty())
    }
}

fn downcast_table<R: 'static>(
    name: &str,
    existing: &AnyTable,
) -> Result<Arc<DispatchTable<R>>, DispatchError> {
    existing
        .downcast::<R>()
        .ok_or_else(|| DispatchError::OutputMismatch {
            name: name.to_string(),
            expected: existing.output_name(),
            requested: type_name::<R>(),
        })
}

impl fmt::Debug for DispatchRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("DispatchRegistry");
        if let Ok(tables) = self.tables.lock() {
            s.field("names", &tables.keys().collect::<Vec<_>>());
        }
        s.finish()
    }
}

/// A namespaced view onto a [`DispatchRegistry`]
///
/// Every name passed through a `ScopedRegistry` is qualified as
/// `namespace::name`, so components that happen to pick the same function
/// name do not share a table unless they share a namespace.
///
/// ```
/// use sovran_multimethod::{DispatchRegistry, DispatchError};
///
/// let registry = DispatchRegistry::new();
/// let audio = registry.scoped("audio");
/// let video = registry.scoped("video");
///
/// audio.register_fn("open", |_: u32| "audio")?;
/// video.register_fn("open", |_: u32| "video")?;
///
/// assert_eq!(audio.dispatch::<&str, _>("open", (1u32,))?, "audio");
/// assert_eq!(registry.dispatch::<&str, _>("video::open", (1u32,))?, "video");
/// # Ok::<(), DispatchError>(())
/// ```
#[derive(Clone, Debug)]
pub struct ScopedRegistry {
    registry: DispatchRegistry,
    namespace: String,
}

impl ScopedRegistry {
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The underlying, unscoped registry
    pub fn registry(&self) -> &DispatchRegistry {
        &self.registry
    }

    /// Returns `name` qualified with this view's namespace
    pub fn qualify(&self, name: &str) -> String {
        format!("{}::{}", self.namespace, name)
    }

    /// Returns a nested view, `namespace::child`
    pub fn scoped(&self, child: &str) -> ScopedRegistry {
        self.registry.scoped(self.qualify(child))
    }

    pub fn register<R: 'static>(
        &self,
        name: &str,
        signature: Signature,
        implementation: Implementation<R>,
        metadata: Metadata,
    ) -> Result<Dispatcher<R>, DispatchError> {
        self.registry
            .register(&self.qualify(name), signature, implementation, metadata)
    }

    pub fn register_fn<R, F, M>(&self, name: &str, implementation: F) -> Result<Dispatcher<R>, DispatchError>
    where
        R: 'static,
        F: IntoImplementation<R, M>,
    {
        self.registry.register_fn(&self.qualify(name), implementation)
    }

    pub fn dispatcher<R: 'static>(&self, name: &str) -> Result<Dispatcher<R>, DispatchError> {
        self.registry.dispatcher(&self.qualify(name))
    }

    pub fn dispatch<R: 'static, A: IntoArgs>(&self, name: &str, args: A) -> Result<R, DispatchError> {
        self.registry.dispatch(&self.qualify(name), args)
    }
}
