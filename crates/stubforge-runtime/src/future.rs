//! Async helpers for generated code.

use std::future::Future;
use std::pin::Pin;

/// The boxed future type used by async members and async event handlers.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T>>>;

/// A future that is already complete with `value`.
pub fn completed<T: 'static>(value: T) -> BoxFuture<T> {
    Box::pin(std::future::ready(value))
}
