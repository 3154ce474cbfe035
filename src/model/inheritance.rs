//! Type/inheritance engine — transitive heritage queries.
//!
//! Everything here is a read-only walk over the linked heritage graph.
//! The graph may contain cycles (a user modeling error); every traversal
//! carries a visited set keyed by *resolved target identity* and silently
//! truncates instead of looping. Reporting cycles is a validation concern,
//! not this layer's.
//!
//! Unresolved heritage edges are treated as absent: a partially-linked
//! model answers conservatively rather than erroring.

use rustc_hash::FxHashSet;

use crate::model::arena::Model;
use crate::model::element::{Direction, ElementId, HeritageKind};

/// Which heritage kinds a traversal follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeritageFilter {
    /// Every heritage kind, conjugation included.
    All,
    /// Only kinds that contribute supertypes (see
    /// [`HeritageKind::is_supertype_kind`]).
    Supertypes,
    /// Exactly one kind.
    Kind(HeritageKind),
}

impl HeritageFilter {
    pub fn admits(self, kind: HeritageKind) -> bool {
        match self {
            HeritageFilter::All => true,
            HeritageFilter::Supertypes => kind.is_supertype_kind(),
            HeritageFilter::Kind(k) => k == kind,
        }
    }
}

/// Direct heritage edges of `ty`, declaration order, filtered.
///
/// Single-kind queries hit the cached per-kind buckets; they are
/// invalidated whenever heritage mutates.
pub fn specializations(model: &Model, ty: ElementId, filter: HeritageFilter) -> Vec<ElementId> {
    if let HeritageFilter::Kind(kind) = filter {
        return model.heritage_of_kind(ty, kind);
    }
    let Some(data) = model.element(ty).ty.as_ref() else {
        return Vec::new();
    };
    data.heritage
        .iter()
        .copied()
        .filter(|&edge| {
            HeritageKind::of(model.element(edge).kind).is_some_and(|k| filter.admits(k))
        })
        .collect()
}

/// The resolved far end of a heritage edge, if it resolved to a type.
pub fn edge_target(model: &Model, edge: ElementId) -> Option<ElementId> {
    let target = model.element(edge).resolved_target()?;
    model.element(target).kind.is_type().then_some(target)
}

/// The original type a conjugate was declared against, if any.
pub fn conjugate_original(model: &Model, ty: ElementId) -> Option<ElementId> {
    specializations(model, ty, HeritageFilter::Kind(HeritageKind::Conjugation))
        .into_iter()
        .find_map(|edge| edge_target(model, edge))
}

/// Lazy depth-first traversal of the transitive heritage graph, yielding
/// heritage *edges* (excluding `ty`'s own position, i.e. self is not
/// represented by any edge).
///
/// Each yielded edge's target is expanded by its own direct
/// specializations. The `visited` set is keyed by resolved target identity,
/// so diamond inheritance yields a shared ancestor once and pathological
/// cycles terminate instead of looping. Finiteness is guaranteed by this
/// guard alone, not by the iterator machinery.
pub struct AllSpecializations<'a> {
    model: &'a Model,
    filter: HeritageFilter,
    stack: Vec<ElementId>,
    visited: FxHashSet<ElementId>,
}

impl<'a> AllSpecializations<'a> {
    pub fn new(model: &'a Model, ty: ElementId, filter: HeritageFilter) -> Self {
        let mut visited = FxHashSet::default();
        visited.insert(ty);
        let mut stack = specializations(model, ty, filter);
        stack.reverse();
        Self {
            model,
            filter,
            stack,
            visited,
        }
    }
}

impl Iterator for AllSpecializations<'_> {
    type Item = ElementId;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(edge) = self.stack.pop() {
            // Unresolved edges are absent, not errors.
            let Some(target) = edge_target(self.model, edge) else {
                continue;
            };
            if !self.visited.insert(target) {
                continue;
            }
            let mut children = specializations(self.model, target, self.filter);
            children.reverse();
            self.stack.extend(children);
            return Some(edge);
        }
        None
    }
}

/// Transitive heritage edges from `ty`, depth-first declaration order.
pub fn all_specializations(
    model: &Model,
    ty: ElementId,
    filter: HeritageFilter,
) -> AllSpecializations<'_> {
    AllSpecializations::new(model, ty, filter)
}

/// The types `ty` inherits from (mapped from [`all_specializations`]),
/// optionally prefixed with `ty` itself.
pub fn all_types<'a>(
    model: &'a Model,
    ty: ElementId,
    filter: HeritageFilter,
    include_self: bool,
) -> impl Iterator<Item = ElementId> + 'a {
    include_self
        .then_some(ty)
        .into_iter()
        .chain(all_specializations(model, ty, filter).filter_map(move |edge| edge_target(model, edge)))
}

/// A type to compare against: by identity or by qualified name.
#[derive(Debug, Clone, Copy)]
pub enum TypeOrName<'s> {
    Id(ElementId),
    Name(&'s str),
}

impl<'s> From<ElementId> for TypeOrName<'s> {
    fn from(id: ElementId) -> Self {
        TypeOrName::Id(id)
    }
}

impl<'s> From<&'s str> for TypeOrName<'s> {
    fn from(name: &'s str) -> Self {
        TypeOrName::Name(name)
    }
}

fn matches(model: &Model, ty: ElementId, other: TypeOrName<'_>) -> bool {
    match other {
        TypeOrName::Id(id) => ty == id,
        TypeOrName::Name(name) => model.qualified_name(ty) == Some(name),
    }
}

/// True iff `other` appears in `ty`'s transitive type set, self included.
pub fn conforms<'s>(model: &Model, ty: ElementId, other: impl Into<TypeOrName<'s>>) -> bool {
    let other = other.into();
    all_types(model, ty, HeritageFilter::All, true).any(|t| matches(model, t, other))
}

/// Like [`conforms`], but restricted to supertype heritage kinds, and
/// unwrapping conjugation: a conjugate's supertype set is defined relative
/// to its original.
pub fn specializes<'s>(model: &Model, ty: ElementId, other: impl Into<TypeOrName<'s>>) -> bool {
    let mut guard = FxHashSet::default();
    specializes_guarded(model, ty, other.into(), &mut guard)
}

fn specializes_guarded(
    model: &Model,
    ty: ElementId,
    other: TypeOrName<'_>,
    guard: &mut FxHashSet<ElementId>,
) -> bool {
    if !guard.insert(ty) {
        return false;
    }
    if let Some(original) = conjugate_original(model, ty) {
        return specializes_guarded(model, original, other, guard);
    }
    all_types(model, ty, HeritageFilter::Supertypes, true).any(|t| matches(model, t, other))
}

/// The first of `candidates` encountered while walking `ty`'s type set in
/// traversal order (self first). The result reflects graph order, not
/// candidate-list order: used to pick the most specific applicable
/// implicit supertype.
pub fn first_conforming<'c>(
    model: &Model,
    ty: ElementId,
    candidates: &[&'c str],
) -> Option<&'c str> {
    for t in all_types(model, ty, HeritageFilter::All, true) {
        if let Some(qname) = model.qualified_name(t) {
            if let Some(&hit) = candidates.iter().find(|&&c| c == qname) {
                return Some(hit);
            }
        }
    }
    None
}

/// Effective direction of `feature` as seen from `ty`.
///
/// Walks up conjugation (flipping in/out) and specialization (first
/// non-`None` direction wins). `visited` must receive each type *before*
/// recursing into its neighbors; self-referential conjugates would
/// otherwise recurse forever.
pub fn direction_of(
    model: &Model,
    ty: ElementId,
    feature: ElementId,
    visited: &mut FxHashSet<ElementId>,
) -> Direction {
    visited.insert(ty);

    let declared = model
        .element(feature)
        .feature
        .as_ref()
        .map(|f| f.direction)
        .unwrap_or_default();
    if model.owning_namespace(feature) == Some(ty) {
        return declared;
    }

    for edge in specializations(model, ty, HeritageFilter::Kind(HeritageKind::Conjugation)) {
        let Some(original) = edge_target(model, edge) else {
            continue;
        };
        if visited.contains(&original) {
            continue;
        }
        let direction = direction_of(model, original, feature, visited);
        if direction != Direction::None {
            return direction.conjugated();
        }
    }

    for edge in specializations(model, ty, HeritageFilter::All) {
        let kind = HeritageKind::of(model.element(edge).kind);
        if kind == Some(HeritageKind::Conjugation) {
            continue;
        }
        let Some(target) = edge_target(model, edge) else {
            continue;
        };
        if visited.contains(&target) {
            continue;
        }
        let direction = direction_of(model, target, feature, visited);
        if direction != Direction::None {
            return direction;
        }
    }

    Direction::None
}

/// [`direction_of`] with a fresh visited set.
pub fn feature_direction(model: &Model, ty: ElementId, feature: ElementId) -> Direction {
    let mut visited = FxHashSet::default();
    direction_of(model, ty, feature, &mut visited)
}

/// Recompute classifier flags for every live type from its own kind plus
/// its transitive heritage. Called after linking and after any heritage
/// mutation; flags are never read while stale.
pub fn recompute_classifier_flags(model: &mut Model) {
    use crate::model::element::ClassifierFlags;

    let ids: Vec<ElementId> = model
        .iter_alive()
        .filter(|e| e.kind.is_type())
        .map(|e| e.id)
        .collect();
    for id in ids {
        let mut flags = ClassifierFlags::from_kind(model.element(id).kind);
        for t in all_types(model, id, HeritageFilter::All, false) {
            flags.insert(ClassifierFlags::from_kind(model.element(t).kind));
        }
        if let Some(ty) = model.element_mut(id).ty.as_mut() {
            ty.classifier_flags = flags;
        }
    }
}
