//! Overload grouping.
//!
//! Methods are partitioned by name. Each partition is an [`OverloadGroup`]
//! whose overloads keep their input order and carry a stable 1-based index;
//! interceptor names embed that index, so nothing here ever re-sorts.
//!
//! ## Combined Parameter Profile
//!
//! Every group also exposes the union of its overloads' tracked parameter
//! names. A name missing from at least one overload is optional and its type
//! is widened to `Option<T>`. When the same name appears with different types
//! the first one seen wins.

use indexmap::IndexMap;
use stubforge_core::{MethodMember, TypeRef};

/// One parameter of a group's combined profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinedParam {
    pub name: String,
    pub ty: TypeRef,
    pub present_in_all_overloads: bool,
}

impl CombinedParam {
    pub fn is_optional(&self) -> bool {
        !self.present_in_all_overloads
    }
}

/// A method together with its position in its group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overload {
    /// 1-based position in input order.
    pub index: usize,
    pub method: MethodMember,
}

/// All methods sharing one name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverloadGroup {
    pub name: String,
    pub overloads: Vec<Overload>,
    pub combined_parameters: Vec<CombinedParam>,
}

impl OverloadGroup {
    /// Whether the group needs per-overload interceptor names.
    pub fn is_overloaded(&self) -> bool {
        self.overloads.len() > 1
    }

    /// Index to embed in interceptor names, `None` for a lone method.
    pub fn naming_index(&self, overload: &Overload) -> Option<usize> {
        self.is_overloaded().then_some(overload.index)
    }

    /// Whether generic and non-generic overloads share this name.
    pub fn mixes_generic(&self) -> bool {
        let generic = self.overloads.iter().filter(|o| o.method.is_dispatched_generic()).count();
        generic > 0 && generic < self.overloads.len()
    }
}

/// Partition `methods` by name, in first-appearance order.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn group_overloads<'a>(methods: impl IntoIterator<Item = &'a MethodMember>) -> Vec<OverloadGroup> {
    let mut by_name: IndexMap<&str, Vec<&MethodMember>> = IndexMap::new();
    for method in methods {
        by_name.entry(method.name.as_str()).or_default().push(method);
    }

    by_name
        .into_iter()
        .map(|(name, methods)| {
            let combined_parameters = combine_parameters(&methods);
            let overloads = methods
                .into_iter()
                .enumerate()
                .map(|(i, method)| Overload {
                    index: i + 1,
                    method: method.clone(),
                })
                .collect();
            OverloadGroup {
                name: name.to_string(),
                overloads,
                combined_parameters,
            }
        })
        .collect()
}

fn combine_parameters(methods: &[&MethodMember]) -> Vec<CombinedParam> {
    // name -> (first type, number of overloads declaring it)
    let mut seen: IndexMap<&str, (&TypeRef, usize)> = IndexMap::new();
    for method in methods {
        let mut counted: Vec<&str> = Vec::new();
        for param in method.tracked_params() {
            if counted.contains(&param.name.as_str()) {
                continue;
            }
            counted.push(param.name.as_str());
            seen.entry(param.name.as_str())
                .and_modify(|(_, count)| *count += 1)
                .or_insert((&param.ty, 1));
        }
    }

    seen.into_iter()
        .map(|(name, (ty, count))| {
            let present_in_all_overloads = count == methods.len();
            let ty = if present_in_all_overloads {
                ty.clone()
            } else {
                ty.clone().nullable()
            };
            CombinedParam {
                name: name.to_string(),
                ty,
                present_in_all_overloads,
            }
        })
        .collect()
}
