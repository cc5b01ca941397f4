use crate::error::FieldError;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Removes every named field from `map` and hands the map back
///
/// # Examples
///
/// ```
/// use sovran_multimethod::fields::drop_fields;
/// use std::collections::HashMap;
///
/// let mut person = HashMap::from([("name", "John"), ("age", "32"), ("city", "Sofia")]);
/// drop_fields(&mut person, ["age", "city"])?;
/// assert_eq!(person, HashMap::from([("name", "John")]));
/// # Ok::<(), sovran_multimethod::FieldError>(())
/// ```
///
/// # Errors
///
/// Returns `FieldError::KeyNotFound` for the first field that is missing.
/// Fields listed before it have already been removed.
pub fn drop_fields<'a, 'f, K, V, Q, I>(
    map: &'a mut HashMap<K, V>,
    fields: I,
) -> Result<&'a mut HashMap<K, V>, FieldError>
where
    K: Eq + Hash + Borrow<Q>,
    Q: Eq + Hash + Debug + ?Sized + 'f,
    I: IntoIterator<Item = &'f Q>,
{
    drop_fields_with(map, fields, Err)
}

/// Like [`drop_fields`], but passes missing fields to `on_missing`
///
/// Returning `Ok(())` from the handler skips the field and carries on;
/// returning an error stops and propagates it.
///
/// ```
/// use sovran_multimethod::fields::{drop_fields_with, ignore_missing};
/// use std::collections::HashMap;
///
/// let mut data = HashMap::from([("name".to_string(), 1)]);
/// drop_fields_with(&mut data, ["age", "name"], ignore_missing)?;
/// assert!(data.is_empty());
/// # Ok::<(), sovran_multimethod::FieldError>(())
/// ```
pub fn drop_fields_with<'a, 'f, K, V, Q, I, H>(
    map: &'a mut HashMap<K, V>,
    fields: I,
    mut on_missing: H,
) -> Result<&'a mut HashMap<K, V>, FieldError>
where
    K: Eq + Hash + Borrow<Q>,
    Q: Eq + Hash + Debug + ?Sized + 'f,
    I: IntoIterator<Item = &'f Q>,
    H: FnMut(FieldError) -> Result<(), FieldError>,
{
    for field in fields {
        if map.remove(field).is_none() {
            on_missing(FieldError::KeyNotFound(format!("{:?}", field)))?;
        }
    }
    Ok(map)
}

/// Missing-field handler that skips every missing field
pub fn ignore_missing(_: FieldError) -> Result<(), FieldError> {
    Ok(())
}
