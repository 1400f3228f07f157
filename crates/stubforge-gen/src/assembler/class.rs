//! Base class member collection.
//!
//! The class chain is walked with an explicit worklist, most-derived first.
//! A member is identified by its declaring trait and signature; the first
//! class to contribute an identity wins, so an override further down the chain
//! hides the declaration it overrides.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;
use stubforge_core::{Accessibility, ClassModel, MemberModel, Modifiers};

use super::{MemberIdentity, SourceMember};
use super::fallback::Terminal;
use crate::ir::ForwardingConstructor;

/// How a class member is implemented on the stub.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Intercepted, ending in `terminal`.
    Intercept(Terminal),
    /// Forwarded to the base value without interception.
    Forward,
}

impl Disposition {
    pub fn of(member: &MemberModel) -> Self {
        let modifiers = member.modifiers();
        if member.accessibility() == Accessibility::Private || modifiers.contains(Modifiers::SEALED) {
            Disposition::Forward
        } else if modifiers.contains(Modifiers::ABSTRACT) {
            Disposition::Intercept(Terminal::Default)
        } else if modifiers.contains(Modifiers::VIRTUAL) {
            Disposition::Intercept(Terminal::Base)
        } else {
            Disposition::Forward
        }
    }
}

/// Every member of `class` and its ancestors, deduplicated most-derived first.
pub fn collect_members(class: &ClassModel) -> Vec<SourceMember<'_>> {
    let mut worklist = VecDeque::from([class]);
    let mut seen: FxHashSet<(String, MemberIdentity)> = FxHashSet::default();
    let mut members = Vec::new();

    while let Some(level) = worklist.pop_front() {
        for member in &level.members {
            let declaring = member.declaring_or(&level.surface).to_string();
            if !seen.insert((declaring.clone(), MemberIdentity::of(member))) {
                continue;
            }
            members.push(SourceMember {
                member,
                declaring,
                owner: &level.simple_name,
                disposition: Disposition::of(member),
            });
        }
        if let Some(base) = level.base.as_deref() {
            worklist.push_back(base);
        }
    }
    members
}

/// One forwarding constructor per constructor of the most-derived class that
/// a derived type may call.
pub fn forwarding_constructors(class: &ClassModel) -> Vec<ForwardingConstructor> {
    class
        .accessible_constructors()
        .map(|ctor| ForwardingConstructor {
            name: ctor.name.clone(),
            params: ctor.parameters.clone(),
        })
        .collect()
}
