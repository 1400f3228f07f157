//! Fixture types for end-to-end stub tests.
//!
//! The build script generates a stub for every trait and base class declared
//! here and writes them to `$OUT_DIR/stubs.rs`, which is included below. The
//! integration tests drive those generated stubs directly.

use std::cell::Cell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

/// Future returned by async event handlers.
pub type Completion = Pin<Box<dyn Future<Output = ()>>>;

pub trait Pinger {
    fn ping(&self);
}

pub trait FindById {
    fn find(&self, id: i32) -> Option<String>;
}

pub trait FindByName {
    fn find(&self, name: &str) -> Option<String>;
}

/// Both lookups under one name; its members live on the two supertraits.
pub trait Finder: FindById + FindByName {}

pub trait Person {
    fn name(&self) -> String;
    fn set_name(&mut self, value: String);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub host: String,
}

/// A read-only sequence with no default of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOnlyList<T>(Vec<T>);

impl<T> ReadOnlyList<T> {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T> From<Vec<T>> for ReadOnlyList<T> {
    fn from(items: Vec<T>) -> Self {
        Self(items)
    }
}

pub trait Lookup {
    fn entry(&self, key: String) -> Connection;
    fn tags(&self, key: String) -> ReadOnlyList<String>;
}

pub trait Repository {
    fn get<T: 'static>(&self) -> T;
}

pub trait Parser {
    fn try_parse(&self, text: &str, result: &mut i32) -> bool;
}

pub trait Widget {
    fn add_closed(&self, handler: Rc<dyn Fn()>);
    fn remove_closed(&self, handler: &Rc<dyn Fn()>);
    fn add_changed(&self, handler: Rc<dyn Fn(String)>);
    fn remove_changed(&self, handler: &Rc<dyn Fn(String)>);
    fn add_loaded(&self, handler: Rc<dyn Fn() -> Completion>);
    fn remove_loaded(&self, handler: &Rc<dyn Fn() -> Completion>);
    fn add_validate(&self, handler: Rc<dyn Fn() -> bool>);
    fn remove_validate(&self, handler: &Rc<dyn Fn() -> bool>);
}

pub trait Tally {
    fn count(&self) -> usize;
}

pub trait Clock {
    fn now(&self) -> u64;
}

/// Overridable surface of [`Channel`].
pub trait Transport {
    fn send(&self, bytes: i32) -> usize;
    fn receive(&self) -> String;
    fn host(&self) -> String;
}

/// A base class: `send` may be overridden, `receive` must be, `host` is fixed.
#[derive(Debug)]
pub struct Channel {
    host: String,
    sends: Cell<usize>,
}

impl Channel {
    pub fn open(host: String) -> Self {
        Self {
            host,
            sends: Cell::new(0),
        }
    }

    /// Calls that reached the real `send`.
    pub fn sends(&self) -> usize {
        self.sends.get()
    }
}

impl Transport for Channel {
    fn send(&self, bytes: i32) -> usize {
        self.sends.set(self.sends.get() + 1);
        usize::try_from(bytes).unwrap_or(0)
    }

    fn receive(&self) -> String {
        format!("frame from {}", self.host)
    }

    fn host(&self) -> String {
        self.host.clone()
    }
}

include!(concat!(env!("OUT_DIR"), "/stubs.rs"));

impl TallyStub {
    fn count(&self) -> usize {
        42
    }
}
