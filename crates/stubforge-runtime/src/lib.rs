//! Runtime support for generated stubs.
//!
//! Generated interceptors are assembled from these building blocks:
//!
//! - [`Counter`], [`LastValue`], [`History`] - call tracking
//! - [`Slot`] - the per-member override callback
//! - [`IndexBacking`] - indexer storage
//! - [`Subscribers`] - event handler lists
//! - [`GenericRegistry`], [`TypeKey`], [`Tracked`] - per-type-argument interceptors
//! - [`DefaultProvider`] - last-resort defaults for generic members
//! - [`unconfigured`] - the failure raised when a member has nothing to return
//!
//! Everything here is single-threaded: a stub is driven by one test thread.

mod backing;
mod defaults;
mod failure;
mod future;
mod generic;
mod slot;
mod subscribers;
mod tracking;

pub use backing::IndexBacking;
pub use defaults::DefaultProvider;
pub use failure::{UnconfiguredMember, unconfigured};
pub use future::{BoxFuture, completed};
pub use generic::{GenericRegistry, Tracked, TypeKey};
pub use slot::Slot;
pub use subscribers::Subscribers;
pub use tracking::{Counter, History, LastValue};
