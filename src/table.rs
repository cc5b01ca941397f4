use crate::args::Args;
use crate::error::DispatchError;
use crate::signature::Signature;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

/// A type-erased implementation bound into a [`DispatchTable`]
///
/// Typed closures are converted into this form by
/// [`IntoImplementation`](crate::IntoImplementation); raw implementations
/// take their arguments out of [`Args`] themselves.
pub type Implementation<R> = Arc<dyn Fn(Args) -> Result<R, DispatchError> + Send + Sync>;

/// Descriptive information about a registered implementation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Metadata {
    display_name: String,
    doc: Option<String>,
}

impl Metadata {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            doc: None,
        }
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }
}

struct TableState<R> {
    entries: HashMap<Signature, Implementation<R>>,
    latest: Option<Metadata>,
}

/// The implementations registered under one function name
///
/// Each entry binds a [`Signature`] to an implementation returning `R`. No two
/// entries share a signature. Entries are only ever added; a table grows for
/// as long as the registry that owns it is alive.
///
/// Registration takes the write lock across the duplicate check and the
/// insert, so concurrent registrations of one signature produce exactly one
/// success. Resolution takes the read lock and hands back a clone of the
/// implementation handle, so the implementation runs with no lock held.
///
/// # Examples
///
/// ```
/// use sovran_multimethod::{signature, Args, DispatchTable, Metadata, DispatchError};
/// use std::sync::Arc;
///
/// let table = DispatchTable::<i32>::new("double");
/// table.register(
///     signature![i32],
///     Arc::new(|mut args: Args| -> Result<i32, DispatchError> { Ok(args.take::<i32>(0)? * 2) }),
///     Metadata::new("double"),
/// )?;
///
/// let double = table.resolve(&signature![i32])?;
/// assert_eq!(double(Args::new().with(21))?, 42);
/// assert!(table.resolve(&signature![i64]).is_err());
/// # Ok::<(), DispatchError>(())
/// ```
pub struct DispatchTable<R> {
    name: String,
    state: RwLock<TableState<R>>,
}

impl<R> DispatchTable<R> {
    /// Creates an empty table for the function `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: RwLock::new(TableState {
                entries: HashMap::new(),
                latest: None,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Binds `implementation` to `signature`
    ///
    /// On success `metadata` becomes the table's most recent metadata.
    ///
    /// # Errors
    ///
    /// - Returns `DispatchError::RegistrationConflict` if the signature is
    ///   already bound, whatever the implementation. The table is left as it was.
    /// - Returns `DispatchError::LockError` if the internal lock cannot be acquired
    pub fn register(
        &self,
        signature: Signature,
        implementation: Implementation<R>,
        metadata: Metadata,
    ) -> Result<(), DispatchError> {
        let mut state = self.state.write().map_err(|_| DispatchError::LockError)?;
        if state.entries.contains_key(&signature) {
            return Err(DispatchError::RegistrationConflict {
                name: self.name.clone(),
                signature,
            });
        }
        state.entries.insert(signature, implementation);
        state.latest = Some(metadata);
        Ok(())
    }

    /// Finds the implementation bound to exactly `signature`
    ///
    /// # Errors
    ///
    /// - Returns `DispatchError::DispatchMiss` if no entry has this signature
    /// - Returns `DispatchError::LockError` if the internal lock cannot be acquired
    pub fn resolve(&self, signature: &Signature) -> Result<Implementation<R>, DispatchError> {
        let state = self.state.read().map_err(|_| DispatchError::LockError)?;
        state
            .entries
            .get(signature)
            .cloned()
            .ok_or_else(|| DispatchError::DispatchMiss {
                name: self.name.clone(),
                signature: signature.clone(),
            })
    }

    pub fn contains(&self, signature: &Signature) -> Result<bool, DispatchError> {
        let state = self.state.read().map_err(|_| DispatchError::LockError)?;
        Ok(state.entries.contains_key(signature))
    }

    /// Returns all registered signatures, in no particular order
    pub fn signatures(&self) -> Result<Vec<Signature>, DispatchError> {
        let state = self.state.read().map_err(|_| DispatchError::LockError)?;
        Ok(state.entries.keys().cloned().collect())
    }

    pub fn len(&self) -> Result<usize, DispatchError> {
        let state = self.state.read().map_err(|_| DispatchError::LockError)?;
        Ok(state.entries.len())
    }

    pub fn is_empty(&self) -> Result<bool, DispatchError> {
        let state = self.state.read().map_err(|_| DispatchError::LockError)?;
        Ok(state.entries.is_empty())
    }

    /// Metadata of the most recent successful registration, if any
    pub fn metadata(&self) -> Result<Option<Metadata>, DispatchError> {
        let state = self.state.read().map_err(|_| DispatchError::LockError)?;
        Ok(state.latest.clone())
    }
}

impl<R> fmt::Debug for DispatchTable<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("DispatchTable");
        s.field("name", &self.name);
        if let Ok(state) = self.state.read() {
            s.field("entries", &state.entries.len());
        }
        s.finish()
    }
}
