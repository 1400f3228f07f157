//! Override slots.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// An optional, replaceable callback.
///
/// `F` is an unsized callback type such as `dyn Fn(&Stub, i32) -> String`.
/// [`Slot::get`] hands out a clone of the `Rc` so the callback can run while
/// the slot is reconfigured from inside it.
pub struct Slot<F: ?Sized>(RefCell<Option<Rc<F>>>);

impl<F: ?Sized> Default for Slot<F> {
    fn default() -> Self {
        Self(RefCell::new(None))
    }
}

impl<F: ?Sized> Slot<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a callback, replacing any previous one.
    pub fn set(&self, callback: Rc<F>) {
        *self.0.borrow_mut() = Some(callback);
    }

    pub fn get(&self) -> Option<Rc<F>> {
        self.0.borrow().clone()
    }

    pub fn is_set(&self) -> bool {
        self.0.borrow().is_some()
    }

    pub fn clear(&self) {
        *self.0.borrow_mut() = None;
    }
}

impl<F: ?Sized> fmt::Debug for Slot<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot").field("set", &self.is_set()).finish()
    }
}
