use crate::error::DispatchError;
use crate::signature::{Signature, TypeDescriptor};
use std::any::{type_name, Any};
use std::fmt;

struct Slot {
    descriptor: TypeDescriptor,
    value: Option<Box<dyn Any>>,
}

/// Positional call arguments with their runtime types
///
/// `Args` is what a [`Dispatcher`](crate::Dispatcher) hands to an
/// implementation. The types of the values, in order, form the call's
/// [`Signature`]. Values are moved in and moved out again unchanged.
///
/// # Examples
///
/// ```
/// use sovran_multimethod::{signature, Args};
///
/// let mut args = Args::new().with(7i32).with("seven");
/// assert_eq!(args.signature(), signature![i32, &'static str]);
///
/// let number: i32 = args.take(0)?;
/// assert_eq!(number, 7);
/// # Ok::<(), sovran_multimethod::DispatchError>(())
/// ```
#[derive(Default)]
pub struct Args {
    slots: Vec<Slot>,
}

impl Args {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Appends an argument, builder style
    pub fn with<T: Any>(mut self, value: T) -> Self {
        self.push(value);
        self
    }

    /// Appends an argument
    pub fn push<T: Any>(&mut self, value: T) {
        self.slots.push(Slot {
            descriptor: TypeDescriptor::of::<T>(),
            value: Some(Box::new(value)),
        });
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The runtime type signature of these arguments
    ///
    /// Taking a value out does not change the signature.
    pub fn signature(&self) -> Signature {
        self.slots.iter().map(|slot| slot.descriptor).collect()
    }

    /// Borrows the argument at `index` if it is a `T`
    pub fn get<T: Any>(&self, index: usize) -> Option<&T> {
        self.slots
            .get(index)?
            .value
            .as_ref()?
            .downcast_ref::<T>()
    }

    /// Moves the argument at `index` out as a `T`
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::ArgumentMismatch` if there is no argument at
    /// `index`, it was already taken, or it is not a `T`. A mismatched value
    /// stays in place.
    pub fn take<T: Any>(&mut self, index: usize) -> Result<T, DispatchError> {
        let mismatch = |found: &'static str| DispatchError::ArgumentMismatch {
            index,
            expected: type_name::<T>(),
            found,
        };

        let slot = self.slots.get_mut(index).ok_or_else(|| mismatch("nothing"))?;
        let value = slot.value.take().ok_or_else(|| mismatch("a taken argument"))?;
        match value.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(value) => {
                slot.value = Some(value);
                Err(mismatch(slot.descriptor.name()))
            }
        }
    }
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Args")
            .field("signature", &self.signature())
            .finish()
    }
}

/// Values that can be turned into call [`Args`]
///
/// Implemented for `Args` itself, `()` and tuples of up to eight `'static`
/// values, so a dispatcher can be called as `f.call((1, "two"))`.
pub trait IntoArgs {
    fn into_args(self) -> Args;
}

impl IntoArgs for Args {
    fn into_args(self) -> Args {
        self
    }
}

macro_rules! impl_into_args {
    ($($ty:ident),*) => {
        impl<$($ty: Any,)*> IntoArgs for ($($ty,)*) {
            #[allow(non_snake_case, unused_mut)]
            fn into_args(self) -> Args {
                let ($($ty,)*) = self;
                let mut args = Args::new();
                $(args.push($ty);)*
                args
            }
        }
    };
}

impl_into_args!();
impl_into_args!(A1);
impl_into_args!(A1, A2);
impl_into_args!(A1, A2, A3);
impl_into_args!(A1, A2, A3, A4);
impl_into_args!(A1, A2, A3, A4, A5);
impl_into_args!(A1, A2, A3, A4, A5, A6);
impl_into_args!(A1, A2, A3, A4, A5, A6, A7);
impl_into_args!(A1, A2, A3, A4, A5, A6, A7, A8);
