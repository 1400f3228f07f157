//! The runtime building blocks used together, outside any generated stub.
//!
//! Generated stubs are exercised end to end by the fixtures crate; these
//! tests pin down the primitive behaviors those stubs rely on.

use std::cell::Cell;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;

use stubforge_runtime::{
    BoxFuture, Counter, DefaultProvider, GenericRegistry, History, IndexBacking, LastValue, Slot,
    Subscribers, Tracked, TypeKey, UnconfiguredMember, completed, unconfigured,
};

fn failure_message<T>(result: std::thread::Result<T>) -> String {
    match result {
        Ok(_) => panic!("expected the call to fail"),
        Err(payload) => payload
            .downcast_ref::<String>()
            .cloned()
            .unwrap_or_default(),
    }
}

/// A typed interceptor in the shape the generator emits for generic methods.
#[derive(Default)]
struct Typed {
    call_count: Counter,
    last: LastValue<String>,
    on_call: Slot<dyn Fn() -> u32>,
}

impl Tracked for Typed {
    fn call_count(&self) -> usize {
        self.call_count.get()
    }

    fn reset(&self) {
        self.call_count.reset();
        self.last.clear();
        self.on_call.clear();
    }
}

#[test]
fn registry_reuses_interceptor_per_type_tuple() {
    let registry = GenericRegistry::new();
    let pair = || TypeKey::new().with::<i32>().with::<String>();
    let first: Rc<Typed> = registry.get_or_create(pair(), Typed::default);
    first.call_count.bump();
    let again: Rc<Typed> = registry.get_or_create(pair(), Typed::default);
    again.call_count.bump();
    let swapped: Rc<Typed> =
        registry.get_or_create(TypeKey::new().with::<String>().with::<i32>(), Typed::default);

    assert!(Rc::ptr_eq(&first, &again));
    assert!(!swapped.was_called());
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.total_call_count(), 2);
}

#[test]
fn registry_reset_clears_state_held_elsewhere() {
    let registry = GenericRegistry::new();
    let typed: Rc<Typed> = registry.get_or_create(TypeKey::of::<u8>(), Typed::default);
    typed.call_count.bump();
    typed.last.set("kept by caller".to_string());
    typed.on_call.set(Rc::new(|| 3_u32));

    registry.reset();
    assert!(registry.is_empty());
    assert_eq!(typed.call_count(), 0);
    assert_eq!(typed.last.get(), None);
    assert!(!typed.on_call.is_set());
}

#[test]
fn slot_replacement_keeps_latest_callback() {
    let slot: Slot<dyn Fn(i32) -> i32> = Slot::new();
    assert!(slot.get().is_none());
    slot.set(Rc::new(|x: i32| x + 1));
    slot.set(Rc::new(|x: i32| x * 10));
    let callback = slot.get().map(|f| f(4));
    assert_eq!(callback, Some(40));
}

#[test]
fn subscribers_tolerate_changes_during_raise() {
    let subscribers: Rc<Subscribers<dyn Fn()>> = Rc::new(Subscribers::new());
    let calls = Rc::new(Cell::new(0));

    let list = Rc::clone(&subscribers);
    let count = Rc::clone(&calls);
    let late: Rc<dyn Fn()> = Rc::new(move || count.set(count.get() + 100));
    let adder: Rc<dyn Fn()> = Rc::new(move || list.add(Rc::clone(&late)));
    subscribers.add(Rc::clone(&adder));

    for handler in subscribers.snapshot() {
        handler();
    }
    assert_eq!(calls.get(), 0);
    assert_eq!(subscribers.len(), 2);

    assert!(subscribers.remove(&adder));
    assert!(!subscribers.remove(&adder));
    for handler in subscribers.snapshot() {
        handler();
    }
    assert_eq!(calls.get(), 100);
}

#[test]
fn async_handlers_complete_in_order() {
    let order = Rc::new(History::new());
    let handlers: Subscribers<dyn Fn() -> BoxFuture<()>> = Subscribers::new();
    for label in ["first", "second"] {
        let sink = Rc::clone(&order);
        handlers.add(Rc::new(move || {
            sink.push(label);
            completed(())
        }));
    }
    futures::executor::block_on(async {
        for handler in handlers.snapshot() {
            handler().await;
        }
    });
    assert_eq!(order.all(), vec!["first", "second"]);
}

#[test]
fn index_backing_with_tuple_keys() {
    let backing: IndexBacking<(String, u8), String> = IndexBacking::new();
    backing.insert(("a".to_string(), 1), "one".to_string());
    backing.insert(("a".to_string(), 2), "two".to_string());
    assert_eq!(backing.get(&("a".to_string(), 2)), Some("two".to_string()));
    assert_eq!(backing.remove(&("a".to_string(), 1)), Some("one".to_string()));
    assert_eq!(backing.len(), 1);
}

#[test]
fn provider_fails_with_member_and_hint() {
    let mut provider = DefaultProvider::with_std_defaults();
    assert_eq!(provider.provide_or_fail::<u64>("Repo::get", "hint"), 0);

    let message = failure_message(catch_unwind(AssertUnwindSafe(|| {
        provider.provide_or_fail::<Vec<u8>>("Repo::get", "register a default")
    })));
    assert_eq!(
        message,
        UnconfiguredMember::new("Repo::get", "register a default").to_string()
    );

    provider.register(|| vec![1_u8, 2]);
    assert_eq!(provider.provide_or_fail::<Vec<u8>>("Repo::get", "hint"), vec![1, 2]);
}

#[test]
fn unconfigured_is_usable_in_any_position() {
    let message = failure_message(catch_unwind(|| -> Option<String> {
        unconfigured("Lookup::entry", "insert a value")
    }));
    assert_eq!(message, "member 'Lookup::entry' is not configured: insert a value");
}
