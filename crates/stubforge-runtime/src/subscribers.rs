//! Event subscriber lists.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Handlers subscribed to one event, in subscription order.
///
/// Handlers are compared by identity (`Rc::ptr_eq`), so unsubscribing needs the
/// same `Rc` that was subscribed. Raising iterates over a [`snapshot`] so a
/// handler may subscribe or unsubscribe while the event is being raised.
///
/// [`snapshot`]: Subscribers::snapshot
pub struct Subscribers<F: ?Sized>(RefCell<Vec<Rc<F>>>);

impl<F: ?Sized> Default for Subscribers<F> {
    fn default() -> Self {
        Self(RefCell::new(Vec::new()))
    }
}

impl<F: ?Sized> Subscribers<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, handler: Rc<F>) {
        self.0.borrow_mut().push(handler);
    }

    /// Remove the most recent subscription of `handler`.
    ///
    /// Returns `false` if the handler was not subscribed.
    pub fn remove(&self, handler: &Rc<F>) -> bool {
        let mut handlers = self.0.borrow_mut();
        match handlers.iter().rposition(|h| Rc::ptr_eq(h, handler)) {
            Some(index) => {
                handlers.remove(index);
                true
            }
            None => false,
        }
    }

    /// Current handlers, detached from the list.
    pub fn snapshot(&self) -> Vec<Rc<F>> {
        self.0.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

impl<F: ?Sized> fmt::Debug for Subscribers<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn add_and_remove_by_identity() {
        let subscribers: Subscribers<dyn Fn()> = Subscribers::new();
        let a: Rc<dyn Fn()> = Rc::new(|| {});
        let b: Rc<dyn Fn()> = Rc::new(|| {});
        subscribers.add(Rc::clone(&a));
        subscribers.add(Rc::clone(&b));
        assert_eq!(subscribers.len(), 2);

        assert!(subscribers.remove(&a));
        assert!(!subscribers.remove(&a));
        assert_eq!(subscribers.len(), 1);
        assert!(Rc::ptr_eq(&subscribers.snapshot()[0], &b));
    }

    #[test]
    fn remove_takes_latest_duplicate() {
        let subscribers: Subscribers<dyn Fn()> = Subscribers::new();
        let a: Rc<dyn Fn()> = Rc::new(|| {});
        let b: Rc<dyn Fn()> = Rc::new(|| {});
        subscribers.add(Rc::clone(&a));
        subscribers.add(Rc::clone(&b));
        subscribers.add(Rc::clone(&a));
        subscribers.remove(&a);
        let order: Vec<bool> = subscribers
            .snapshot()
            .iter()
            .map(|h| Rc::ptr_eq(h, &a))
            .collect();
        assert_eq!(order, vec![true, false]);
    }

    #[test]
    fn snapshot_survives_mutation() {
        let subscribers: Rc<Subscribers<dyn Fn()>> = Rc::new(Subscribers::new());
        let calls = Rc::new(Cell::new(0));
        let inner = Rc::clone(&subscribers);
        let counted = Rc::clone(&calls);
        subscribers.add(Rc::new(move || {
            counted.set(counted.get() + 1);
            inner.clear();
        }));
        for handler in subscribers.snapshot() {
            handler();
        }
        assert_eq!(calls.get(), 1);
        assert!(subscribers.is_empty());
    }
}
