//! Fallback chain construction.
//!
//! Every generated member runs the same fixed order:
//!
//! 1. record the invocation
//! 2. run the override slot if one is set
//! 3. call the hand-written implementation if one matches
//! 4. produce a value: backing storage, base implementation or default strategy
//!
//! `Out` parameters are assigned before step 1 and event accessors manage the
//! subscriber list in place of step 4.

use stubforge_core::ParameterModel;

use super::user_impl::UserMatch;
use crate::defaults::DefaultValueStrategy;
use crate::ir::{Accessor, FallbackStep};

/// What ends the chain when nothing earlier does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    /// Backing storage, then the member's default strategy.
    Default,
    /// The wrapped base value's implementation.
    Base,
}

/// Inputs that decide a member's chain.
#[derive(Debug, Clone)]
pub struct ChainSpec {
    pub accessor: Accessor,
    pub terminal: Terminal,
    pub user: UserMatch,
    /// Default strategy of the returned value, for getters and calls.
    pub strategy: DefaultValueStrategy,
    /// Use the runtime default provider instead of failing outright.
    pub runtime_default: bool,
    /// Resolvable defaults of `Out` parameters.
    pub out_defaults: Vec<(ParameterModel, DefaultValueStrategy)>,
}

/// Build the ordered fallback chain for one generated function.
pub fn build_chain(mut spec: ChainSpec) -> Vec<FallbackStep> {
    let mut chain = Vec::new();
    if spec.accessor == Accessor::Call && !spec.out_defaults.is_empty() {
        chain.push(FallbackStep::DefaultOutParams(std::mem::take(&mut spec.out_defaults)));
    }

    chain.push(FallbackStep::Record);
    if matches!(
        spec.accessor,
        Accessor::Getter | Accessor::Setter | Accessor::Call
    ) {
        chain.push(FallbackStep::Override);
    }

    if spec.user == UserMatch::Usable {
        chain.push(FallbackStep::UserImplementation);
        return chain;
    }

    match spec.accessor {
        Accessor::Getter => {
            chain.push(FallbackStep::BackingLookup);
            chain.push(terminal_value(&spec));
        }
        Accessor::Setter => chain.push(match spec.terminal {
            Terminal::Base => FallbackStep::BaseImplementation,
            Terminal::Default => FallbackStep::BackingStore,
        }),
        Accessor::Call => chain.push(terminal_value(&spec)),
        Accessor::Subscribe | Accessor::Unsubscribe => chain.push(match spec.terminal {
            Terminal::Base => FallbackStep::BaseImplementation,
            Terminal::Default => FallbackStep::ManageSubscribers,
        }),
    }
    chain
}

fn terminal_value(spec: &ChainSpec) -> FallbackStep {
    match spec.terminal {
        Terminal::Base => FallbackStep::BaseImplementation,
        Terminal::Default if spec.runtime_default => FallbackStep::RuntimeDefault,
        Terminal::Default => FallbackStep::Default(spec.strategy.clone()),
    }
}
