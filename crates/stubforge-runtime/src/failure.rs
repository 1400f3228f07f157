//! The "unconfigured member" failure.

use thiserror::Error;

/// A member was invoked with no override, no implementation and no safe default.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("member '{member}' is not configured: {hint}")]
pub struct UnconfiguredMember {
    /// Qualified member name, e.g. `Repository::find`.
    pub member: String,
    /// How to configure it, e.g. `set stub.repository.find.on_call(..)`.
    pub hint: String,
}

impl UnconfiguredMember {
    pub fn new(member: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            member: member.into(),
            hint: hint.into(),
        }
    }
}

/// Fail the current call because `member` has nothing to return.
///
/// Panics with the [`UnconfiguredMember`] message. Generated code calls this
/// instead of fabricating a value.
#[track_caller]
pub fn unconfigured(member: &str, hint: &str) -> ! {
    let failure = UnconfiguredMember::new(member, hint);
    tracing::warn!(member, "unconfigured stub member invoked");
    panic!("{failure}")
}
