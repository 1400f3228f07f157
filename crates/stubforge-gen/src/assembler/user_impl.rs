//! Hand-written implementations supplied by the stub's author.
//!
//! A user method is used as the fallback for a generated member only when its
//! signature matches exactly and it is not public. Public matches are reported
//! and ignored, because a public inherent method would shadow the trait method
//! for callers.

use rustc_hash::FxHashMap;
use stubforge_core::{Accessibility, MethodMember, SignatureKey};

/// Result of looking up a generated member among the user methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserMatch {
    Usable,
    PublicIgnored,
    Missing,
}

/// User methods indexed by exact signature.
#[derive(Debug, Default)]
pub struct UserImplementations {
    by_signature: FxHashMap<SignatureKey, Accessibility>,
}

impl UserImplementations {
    pub fn new(methods: &[MethodMember]) -> Self {
        let by_signature = methods
            .iter()
            .map(|m| (SignatureKey::of_method(m), m.accessibility))
            .collect();
        Self { by_signature }
    }

    pub fn lookup(&self, key: &SignatureKey) -> UserMatch {
        match self.by_signature.get(key) {
            None => UserMatch::Missing,
            Some(Accessibility::Public) => UserMatch::PublicIgnored,
            Some(_) => UserMatch::Usable,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.by_signature.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stubforge_core::{ParameterModel, Primitive, Receiver, TypeRef};

    fn find(ty: TypeRef) -> MethodMember {
        MethodMember::new("find")
            .with_param(ParameterModel::new("id", ty))
            .returning(TypeRef::text().nullable())
    }

    #[test]
    fn private_exact_match_is_usable() {
        let user = find(TypeRef::Primitive(Primitive::I32)).with_accessibility(Accessibility::Private);
        let index = UserImplementations::new(&[user]);
        let key = SignatureKey::of_method(&find(TypeRef::Primitive(Primitive::I32)));
        assert_eq!(index.lookup(&key), UserMatch::Usable);
    }

    #[test]
    fn public_match_is_ignored() {
        let index = UserImplementations::new(&[find(TypeRef::Primitive(Primitive::I32))]);
        let key = SignatureKey::of_method(&find(TypeRef::Primitive(Primitive::I32)));
        assert_eq!(index.lookup(&key), UserMatch::PublicIgnored);
    }

    #[test]
    fn signature_must_match_exactly() {
        let user = find(TypeRef::Primitive(Primitive::I64)).with_accessibility(Accessibility::Private);
        let index = UserImplementations::new(&[user.clone()]);
        let key = SignatureKey::of_method(&find(TypeRef::Primitive(Primitive::I32)));
        assert_eq!(index.lookup(&key), UserMatch::Missing);

        let exclusive = SignatureKey::of_method(&user.clone().with_receiver(Receiver::Exclusive));
        assert_eq!(index.lookup(&exclusive), UserMatch::Missing);
    }
}
