use crate::args::Args;
use crate::dispatcher::Dispatcher;
use crate::error::DispatchError;
use crate::registry::DispatchRegistry;
use crate::signature::{Signature, TypeDescriptor};
use crate::table::{Implementation, Metadata};
use std::any::Any;
use std::sync::Arc;

/// Closures that can be bound into a dispatch table
///
/// Implemented for every `Fn(A1, .., An) -> R + Send + Sync + 'static` with
/// up to eight `'static` parameters. The closure's parameter types are its
/// signature. `Marker` only tells the arities apart and is always inferred.
pub trait IntoImplementation<R, Marker> {
    /// The signature described by the closure's parameter types
    fn signature() -> Signature;

    /// Wraps the closure so it can be called with type-erased [`Args`]
    fn into_implementation(self) -> Implementation<R>;
}

macro_rules! impl_into_implementation {
    ($($ty:ident),*) => {
        impl<F, R, $($ty,)*> IntoImplementation<R, fn($($ty,)*) -> R> for F
        where
            F: Fn($($ty),*) -> R + Send + Sync + 'static,
            R: 'static,
            $($ty: Any,)*
        {
            fn signature() -> Signature {
                let descriptors: Vec<TypeDescriptor> = vec![$(TypeDescriptor::of::<$ty>()),*];
                Signature::from(descriptors)
            }

            #[allow(non_snake_case, unused_mut, unused_variables, unused_assignments)]
            fn into_implementation(self) -> Implementation<R> {
                Arc::new(move |mut args: Args| -> Result<R, DispatchError> {
                    let mut index = 0;
                    $(
                        let $ty = args.take::<$ty>(index)?;
                        index += 1;
                    )*
                    Ok((self)($($ty),*))
                })
            }
        }
    };
}

impl_into_implementation!();
impl_into_implementation!(A1);
impl_into_implementation!(A1, A2);
impl_into_implementation!(A1, A2, A3);
impl_into_implementation!(A1, A2, A3, A4);
impl_into_implementation!(A1, A2, A3, A4, A5);
impl_into_implementation!(A1, A2, A3, A4, A5, A6);
impl_into_implementation!(A1, A2, A3, A4, A5, A6, A7);
impl_into_implementation!(A1, A2, A3, A4, A5, A6, A7, A8);

/// Starts a registration for the given argument types
///
/// The returned [`Registrar`] binds implementations under an explicit name.
/// Use the [`signature!`](crate::signature) macro to spell the types.
///
/// ```
/// use sovran_multimethod::{register_signature, signature, DispatchRegistry, DispatchError};
///
/// let registry = DispatchRegistry::new();
/// let area = register_signature(signature![f64, f64])
///     .doc("Area of a rectangle")
///     .register(&registry, "area", |w: f64, h: f64| w * h)?;
///
/// register_signature(signature![f64])
///     .doc("Area of a square")
///     .register(&registry, "area", |side: f64| side * side)?;
///
/// assert_eq!(area.call((2.0, 3.0))?, 6.0);
/// assert_eq!(area.call((3.0,))?, 9.0);
/// assert_eq!(area.doc()?.as_deref(), Some("Area of a square"));
/// # Ok::<(), DispatchError>(())
/// ```
pub fn register_signature(signature: impl Into<Signature>) -> Registrar {
    Registrar::new(signature)
}

/// Registration front-end for one declared signature
///
/// A `Registrar` is reusable: each `register` call binds one more
/// implementation and returns a fresh [`Dispatcher`] onto the shared table.
#[derive(Clone, Debug)]
pub struct Registrar {
    signature: Signature,
    display_name: Option<String>,
    doc: Option<String>,
}

impl Registrar {
    pub fn new(signature: impl Into<Signature>) -> Self {
        Self {
            signature: signature.into(),
            display_name: None,
            doc: None,
        }
    }

    /// Sets the name reported by [`Dispatcher::display_name`]; defaults to the registered name
    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Sets the documentation reported by [`Dispatcher::doc`]
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Binds a typed closure under `name`
    ///
    /// # Errors
    ///
    /// - Returns `DispatchError::InvalidSignature` if the closure's parameter
    ///   types differ from the declared signature; nothing is registered
    /// - Returns `DispatchError::RegistrationConflict` if the signature is
    ///   already bound under `name`
    /// - Returns `DispatchError::OutputMismatch` if `name` is in use with a
    ///   different output type
    /// - Returns `DispatchError::LockError` if a lock cannot be acquired
    pub fn register<R, F, M>(
        &self,
        registry: &DispatchRegistry,
        name: &str,
        implementation: F,
    ) -> Result<Dispatcher<R>, DispatchError>
    where
        R: 'static,
        F: IntoImplementation<R, M>,
    {
        let actual = F::signature();
        if actual != self.signature {
            return Err(DispatchError::InvalidSignature {
                name: name.to_string(),
                declared: self.signature.clone(),
                actual,
            });
        }
        registry.register(
            name,
            self.signature.clone(),
            implementation.into_implementation(),
            self.metadata(name),
        )
    }

    /// Binds a closure over raw [`Args`] under `name`
    ///
    /// The declared signature is trusted. The closure is only called with
    /// arguments of exactly those types, and should take them out with
    /// [`Args::take`].
    ///
    /// # Errors
    ///
    /// Same as [`register`](Self::register), except `InvalidSignature`.
    pub fn register_raw<R, F>(
        &self,
        registry: &DispatchRegistry,
        name: &str,
        implementation: F,
    ) -> Result<Dispatcher<R>, DispatchError>
    where
        R: 'static,
        F: Fn(Args) -> Result<R, DispatchError> + Send + Sync + 'static,
    {
        registry.register(
            name,
            self.signature.clone(),
            Arc::new(implementation),
            self.metadata(name),
        )
    }

    fn metadata(&self, name: &str) -> Metadata {
        let metadata = Metadata::new(self.display_name.as_deref().unwrap_or(name));
        match &self.doc {
            Some(doc) => metadata.with_doc(doc.clone()),
            None => metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature;

    #[test]
    fn test_closure_signature() {
        fn signature_of<R, F: IntoImplementation<R, M>, M>(_: &F) -> Signature {
            F::signature()
        }

        assert_eq!(signature_of(&|| 0), signature![]);
        assert_eq!(signature_of(&|_: i32, _: String| 0), signature![i32, String]);
        assert_eq!(
            signature_of(&|_: u8, _: u8, _: u8, _: u8, _: u8, _: u8, _: u8, _: u8| ()),
            signature![u8, u8, u8, u8, u8, u8, u8, u8]
        );
    }

    #[test]
    fn test_typed_wrapper_takes_arguments_in_order() -> Result<(), DispatchError> {
        let concat = (|a: String, b: &'static str, n: usize| format!("{}{}", a, b.repeat(n)))
            .into_implementation();
        let args = Args::new().with(String::from("a")).with("b").with(3usize);
        assert_eq!(concat(args)?, "abbb");
        Ok(())
    }

    #[test]
    fn test_register_rejects_mismatched_closure() {
        let registry = DispatchRegistry::new();
        let err = register_signature(signature![i32])
            .register(&registry, "f", |s: String| s.len())
            .unwrap_err();
        assert_eq!(
            err,
            DispatchError::InvalidSignature {
                name: "f".to_string(),
                declared: signature![i32],
                actual: signature![String],
            }
        );
        assert!(!registry.contains("f").unwrap());
    }

    #[test]
    fn test_register_raw() -> Result<(), DispatchError> {
        let registry = DispatchRegistry::new();
        let sum = register_signature(signature![i64, i64]).register_raw(
            &registry,
            "sum",
            |mut args: Args| Ok(args.take::<i64>(0)? + args.take::<i64>(1)?),
        )?;
        assert_eq!(sum.call((2i64, 40i64))?, 42);
        Ok(())
    }

    #[test]
    fn test_metadata_defaults_to_name() -> Result<(), DispatchError> {
        let registry = DispatchRegistry::new();
        let f = register_signature(signature![]).register(&registry, "f", || 1)?;
        assert_eq!(f.display_name()?, "f");
        assert_eq!(f.doc()?, None);

        let g = register_signature(signature![u8])
            .display_name("f(u8)")
            .doc("bytes")
            .register(&registry, "f", |b: u8| i32::from(b))?;
        assert_eq!(g.display_name()?, "f(u8)");
        // earlier dispatchers see the latest metadata too
        assert_eq!(f.doc()?, Some("bytes".to_string()));
        Ok(())
    }
}
