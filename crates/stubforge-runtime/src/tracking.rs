//! Call tracking cells.
//!
//! Stubs are driven from one test thread, so all tracking state is plain
//! `Cell`/`RefCell`. A stub built from these types is `!Sync`.

use std::cell::{Cell, RefCell};

/// A monotonically increasing call counter.
#[derive(Debug, Default)]
pub struct Counter(Cell<usize>);

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one more call.
    pub fn bump(&self) {
        self.0.set(self.0.get() + 1);
    }

    pub fn get(&self) -> usize {
        self.0.get()
    }

    pub fn reset(&self) {
        self.0.set(0);
    }
}

/// The most recent value recorded, if any.
#[derive(Debug)]
pub struct LastValue<T>(RefCell<Option<T>>);

impl<T> Default for LastValue<T> {
    fn default() -> Self {
        Self(RefCell::new(None))
    }
}

impl<T> LastValue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored value.
    pub fn set(&self, value: T) {
        *self.0.borrow_mut() = Some(value);
    }

    /// Remove and return the stored value.
    pub fn take(&self) -> Option<T> {
        self.0.borrow_mut().take()
    }

    pub fn is_set(&self) -> bool {
        self.0.borrow().is_some()
    }

    pub fn clear(&self) {
        *self.0.borrow_mut() = None;
    }
}

impl<T: Clone> LastValue<T> {
    /// A copy of the stored value.
    pub fn get(&self) -> Option<T> {
        self.0.borrow().clone()
    }
}

/// Every value recorded, oldest first.
#[derive(Debug)]
pub struct History<T>(RefCell<Vec<T>>);

impl<T> Default for History<T> {
    fn default() -> Self {
        Self(RefCell::new(Vec::new()))
    }
}

impl<T> History<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, value: T) {
        self.0.borrow_mut().push(value);
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

impl<T: Clone> History<T> {
    /// A copy of every recorded value.
    pub fn all(&self) -> Vec<T> {
        self.0.borrow().clone()
    }

    pub fn last(&self) -> Option<T> {
        self.0.borrow().last().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_bumps_and_resets() {
        let counter = Counter::new();
        counter.bump();
        counter.bump();
        assert_eq!(counter.get(), 2);
        counter.reset();
        assert_eq!(counter.get(), 0);
    }

    #[test]
    fn last_value_replaces() {
        let last = LastValue::new();
        assert!(!last.is_set());
        last.set("a".to_string());
        last.set("b".to_string());
        assert_eq!(last.get().as_deref(), Some("b"));
        assert_eq!(last.take().as_deref(), Some("b"));
        assert!(!last.is_set());
    }

    #[test]
    fn last_value_clear() {
        let last = LastValue::new();
        last.set((1, 2));
        last.clear();
        assert_eq!(last.get(), None);
    }

    #[test]
    fn history_keeps_order() {
        let history = History::new();
        assert!(history.is_empty());
        history.push(1);
        history.push(2);
        assert_eq!(history.all(), vec![1, 2]);
        assert_eq!(history.last(), Some(2));
        history.clear();
        assert_eq!(history.len(), 0);
    }
}
