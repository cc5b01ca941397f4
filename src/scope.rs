use std::fmt;
use std::ops::{Deref, DerefMut};

/// Resources with a closing step
pub trait Close {
    fn close(&mut self);
}

/// Guard that runs a closing action on a value when it goes out of scope
///
/// The guard dereferences to the wrapped value. The action runs exactly
/// once, on drop, unless the guard was [cancelled](Self::cancel).
///
/// # Examples
///
/// ```
/// use sovran_multimethod::scope::on_exit;
///
/// let mut log = Vec::new();
/// {
///     let mut session = on_exit(String::from("session"), |s| s.push_str(" closed"));
///     session.push_str(" opened");
///     log.push(session.clone());
/// }
/// assert_eq!(log, vec!["session opened".to_string()]);
/// ```
pub struct OnExit<T, F>
where
    F: FnOnce(&mut T),
{
    thing: T,
    on_exit: Option<F>,
}

impl<T, F> OnExit<T, F>
where
    F: FnOnce(&mut T),
{
    pub fn new(thing: T, on_exit: F) -> Self {
        Self {
            thing,
            on_exit: Some(on_exit),
        }
    }

    /// Disarms the guard; the value is dropped without the closing action
    pub fn cancel(&mut self) {
        self.on_exit = None;
    }

    pub fn is_armed(&self) -> bool {
        self.on_exit.is_some()
    }
}

impl<T, F> Deref for OnExit<T, F>
where
    F: FnOnce(&mut T),
{
    type Target = T;

    fn deref(&self) -> &T {
        &self.thing
    }
}

impl<T, F> DerefMut for OnExit<T, F>
where
    F: FnOnce(&mut T),
{
    fn deref_mut(&mut self) -> &mut T {
        &mut self.thing
    }
}

impl<T, F> Drop for OnExit<T, F>
where
    F: FnOnce(&mut T),
{
    fn drop(&mut self) {
        if let Some(on_exit) = self.on_exit.take() {
            on_exit(&mut self.thing);
        }
    }
}

impl<T: fmt::Debug, F> fmt::Debug for OnExit<T, F>
where
    F: FnOnce(&mut T),
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnExit")
            .field("thing", &self.thing)
            .field("armed", &self.is_armed())
            .finish()
    }
}

/// Wraps `thing` so that `on_exit` runs on it at the end of the scope
pub fn on_exit<T, F>(thing: T, on_exit: F) -> OnExit<T, F>
where
    F: FnOnce(&mut T),
{
    OnExit::new(thing, on_exit)
}

/// Wraps `thing` so that [`Close::close`] runs on it at the end of the scope
pub fn closing<T: Close>(thing: T) -> OnExit<T, fn(&mut T)> {
    OnExit::new(thing, T::close as fn(&mut T))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Connection {
        closed: Rc<Cell<u32>>,
    }

    impl Close for Connection {
        fn close(&mut self) {
            self.closed.set(self.closed.get() + 1);
        }
    }

    #[test]
    fn test_closing_calls_close_once() {
        let closed = Rc::new(Cell::new(0));
        {
            let conn = closing(Connection {
                closed: Rc::clone(&closed),
            });
            assert!(conn.is_armed());
            assert_eq!(conn.closed.get(), 0);
        }
        assert_eq!(closed.get(), 1);
    }

    #[test]
    fn test_cancel() {
        let closed = Rc::new(Cell::new(0));
        {
            let mut conn = closing(Connection {
                closed: Rc::clone(&closed),
            });
            conn.cancel();
            assert!(!conn.is_armed());
        }
        assert_eq!(closed.get(), 0);
    }

    #[test]
    fn test_runs_on_panic_unwind() {
        let closed = Rc::new(Cell::new(0));
        let inner = Rc::clone(&closed);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _conn = closing(Connection { closed: inner });
            panic!("boom");
        }));
        assert!(result.is_err());
        assert_eq!(closed.get(), 1);
    }

    #[test]
    fn test_guard_derefs_to_value() {
        let mut guard = on_exit(vec![1, 2], |v: &mut Vec<i32>| v.clear());
        guard.push(3);
        assert_eq!(*guard, vec![1, 2, 3]);
        assert!(format!("{:?}", guard).contains("armed: true"));
    }
}
