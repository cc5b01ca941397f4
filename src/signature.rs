use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Runtime identity of a single Rust type
///
/// Two descriptors are equal only when they describe exactly the same type.
/// The type name is carried along for display and error messages and takes
/// no part in comparisons.
#[derive(Clone, Copy)]
pub struct TypeDescriptor {
    id: TypeId,
    name: &'static str,
}

impl TypeDescriptor {
    /// Returns the descriptor for `T`
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns true if this descriptor describes `T`
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// An ordered, immutable list of argument types
///
/// A `Signature` is both the key an implementation is registered under and
/// the key computed from the arguments of a call. Lookups compare signatures
/// by exact equality: same length, same type at every position.
///
/// # Examples
///
/// ```
/// use sovran_multimethod::{signature, Signature, TypeDescriptor};
///
/// let declared = signature![i32, String];
/// let from_tuple = Signature::of::<(i32, String)>();
/// let from_parts = Signature::new([TypeDescriptor::of::<i32>(), TypeDescriptor::of::<String>()]);
///
/// assert_eq!(declared, from_tuple);
/// assert_eq!(declared, from_parts);
/// assert_ne!(declared, signature![String, i32]);
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Signature(Arc<[TypeDescriptor]>);

impl Signature {
    /// Creates a signature from descriptors in argument order
    pub fn new<I>(descriptors: I) -> Self
    where
        I: IntoIterator<Item = TypeDescriptor>,
    {
        Self(descriptors.into_iter().collect())
    }

    /// The signature of a function taking no arguments
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Returns the signature described by the tuple type `T`
    pub fn of<T: SignatureOf>() -> Self {
        T::signature()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<TypeDescriptor> {
        self.0.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = TypeDescriptor> + '_ {
        self.0.iter().copied()
    }

    pub fn descriptors(&self) -> &[TypeDescriptor] {
        &self.0
    }
}

impl Default for Signature {
    fn default() -> Self {
        Self::empty()
    }
}

impl FromIterator<TypeDescriptor> for Signature {
    fn from_iter<I: IntoIterator<Item = TypeDescriptor>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl From<&[TypeDescriptor]> for Signature {
    fn from(descriptors: &[TypeDescriptor]) -> Self {
        Self(Arc::from(descriptors))
    }
}

impl From<Vec<TypeDescriptor>> for Signature {
    fn from(descriptors: Vec<TypeDescriptor>) -> Self {
        Self(Arc::from(descriptors))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature{}", self)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, descriptor) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(descriptor.name())?;
        }
        f.write_str(")")
    }
}

/// Tuple types that describe a [`Signature`]
///
/// Implemented for `()` and tuples of up to eight `'static` types.
pub trait SignatureOf {
    fn signature() -> Signature;
}

macro_rules! impl_signature_of {
    ($($ty:ident),*) => {
        impl<$($ty: 'static,)*> SignatureOf for ($($ty,)*) {
            fn signature() -> Signature {
                let descriptors: Vec<TypeDescriptor> = vec![$(TypeDescriptor::of::<$ty>()),*];
                Signature::from(descriptors)
            }
        }
    };
}

impl_signature_of!();
impl_signature_of!(A1);
impl_signature_of!(A1, A2);
impl_signature_of!(A1, A2, A3);
impl_signature_of!(A1, A2, A3, A4);
impl_signature_of!(A1, A2, A3, A4, A5);
impl_signature_of!(A1, A2, A3, A4, A5, A6);
impl_signature_of!(A1, A2, A3, A4, A5, A6, A7);
impl_signature_of!(A1, A2, A3, A4, A5, A6, A7, A8);

/// Builds a [`Signature`] from a list of types
///
/// ```
/// use sovran_multimethod::signature;
///
/// let sig = signature![u8, &'static str];
/// assert_eq!(sig.len(), 2);
/// assert!(signature![].is_empty());
/// ```
#[macro_export]
macro_rules! signature {
    () => {
        $crate::Signature::empty()
    };
    ($($ty:ty),+ $(,)?) => {
        $crate::Signature::new([$($crate::TypeDescriptor::of::<$ty>()),+])
    };
}
