use crate::args::{Args, IntoArgs};
use crate::error::DispatchError;
use crate::signature::Signature;
use crate::table::{DispatchTable, Metadata};
use std::fmt;
use std::sync::Arc;

/// A callable handle onto every implementation registered under one name
///
/// Calling a dispatcher computes the runtime type signature of the
/// arguments, resolves it against the shared [`DispatchTable`] and invokes
/// the matching implementation with the arguments untouched. Every
/// dispatcher for a name observes the same table, so an implementation
/// registered later is callable through dispatchers handed out earlier.
///
/// # Examples
///
/// ```
/// use sovran_multimethod::{DispatchRegistry, DispatchError};
///
/// let registry = DispatchRegistry::new();
/// let describe = registry.register_fn("describe", |n: i32| format!("int {}", n))?;
/// registry.register_fn("describe", |s: &'static str| format!("str {}", s))?;
///
/// assert_eq!(describe.call((5,))?, "int 5");
/// assert_eq!(describe.call(("x",))?, "str x");
/// assert!(matches!(describe.call((5.0,)), Err(DispatchError::DispatchMiss { .. })));
/// # Ok::<(), DispatchError>(())
/// ```
pub struct Dispatcher<R> {
    table: Arc<DispatchTable<R>>,
}

impl<R> Dispatcher<R> {
    pub(crate) fn new(table: Arc<DispatchTable<R>>) -> Self {
        Self { table }
    }

    /// The logical function name
    pub fn name(&self) -> &str {
        self.table.name()
    }

    /// Calls the implementation whose signature matches `args` exactly
    ///
    /// # Errors
    ///
    /// - Returns `DispatchError::DispatchMiss` if no registered signature
    ///   matches; no implementation is invoked
    /// - Returns `DispatchError::LockError` if the table lock cannot be acquired
    /// - Returns whatever error the implementation itself returns
    pub fn call<A: IntoArgs>(&self, args: A) -> Result<R, DispatchError> {
        self.call_args(args.into_args())
    }

    /// Like [`call`](Self::call), for an already assembled [`Args`]
    pub fn call_args(&self, args: Args) -> Result<R, DispatchError> {
        let signature = args.signature();
        let implementation = self.table.resolve(&signature)?;
        tracing::trace!(name = self.name(), %signature, "dispatching");
        implementation(args)
    }

    /// Metadata of the most recently registered implementation
    ///
    /// Falls back to the logical name when nothing has been registered yet.
    pub fn metadata(&self) -> Result<Metadata, DispatchError> {
        Ok(self
            .table
            .metadata()?
            .unwrap_or_else(|| Metadata::new(self.name())))
    }

    pub fn display_name(&self) -> Result<String, DispatchError> {
        Ok(self.metadata()?.display_name().to_string())
    }

    pub fn doc(&self) -> Result<Option<String>, DispatchError> {
        Ok(self.metadata()?.doc().map(str::to_string))
    }

    /// Returns every signature this dispatcher can currently route
    pub fn signatures(&self) -> Result<Vec<Signature>, DispatchError> {
        self.table.signatures()
    }

    /// Returns true if a call with exactly `signature` would resolve
    pub fn supports(&self, signature: &Signature) -> Result<bool, DispatchError> {
        self.table.contains(signature)
    }

    /// Returns true if both dispatchers route through the same table
    pub fn shares_table(&self, other: &Dispatcher<R>) -> bool {
        Arc::ptr_eq(&self.table, &other.table)
    }
}

impl<R> Clone for Dispatcher<R> {
    fn clone(&self) -> Self {
        Self {
            table: Arc::clone(&self.table),
        }
    }
}

impl<R> fmt::Debug for Dispatcher<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("name", &self.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature;

    fn table() -> Arc<DispatchTable<String>> {
        let table = DispatchTable::new("greet");
        table
            .register(
                signature![&'static str],
                Arc::new(|mut args: Args| -> Result<String, DispatchError> {
                    let name: &'static str = args.take(0)?;
                    Ok(format!("Hello, {}", name))
                }),
                Metadata::new("greet").with_doc("Greets by name"),
            )
            .unwrap();
        Arc::new(table)
    }

    #[test]
    fn test_call_passes_arguments_through() -> Result<(), DispatchError> {
        let greet = Dispatcher::new(table());
        assert_eq!(greet.call(("Ivan",))?, "Hello, Ivan");
        assert_eq!(greet.call_args(Args::new().with("Ada"))?, "Hello, Ada");
        Ok(())
    }

    #[test]
    fn test_miss_does_not_invoke() {
        let greet = Dispatcher::new(table());
        let err = greet.call((String::from("Ivan"),)).unwrap_err();
        assert_eq!(
            err,
            DispatchError::DispatchMiss {
                name: "greet".to_string(),
                signature: signature![String],
            }
        );
        assert!(greet.call(()).is_err());
    }

    #[test]
    fn test_metadata() -> Result<(), DispatchError> {
        let greet = Dispatcher::new(table());
        assert_eq!(greet.name(), "greet");
        assert_eq!(greet.display_name()?, "greet");
        assert_eq!(greet.doc()?, Some("Greets by name".to_string()));

        let empty = Dispatcher::new(Arc::new(DispatchTable::<()>::new("nothing")));
        assert_eq!(empty.metadata()?, Metadata::new("nothing"));
        assert_eq!(empty.doc()?, None);
        Ok(())
    }

    #[test]
    fn test_clones_share_table() -> Result<(), DispatchError> {
        let greet = Dispatcher::new(table());
        let other = greet.clone();
        assert!(greet.shares_table(&other));
        assert!(other.supports(&signature![&'static str])?);
        assert_eq!(format!("{:?}", other), "Dispatcher { name: \"greet\" }");
        Ok(())
    }
}
