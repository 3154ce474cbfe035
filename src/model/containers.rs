//! Cached per-element child indexes.
//!
//! Namespaces are queried constantly for "children of kind K" and "member
//! named N". Those answers are cached here per element and rebuilt lazily:
//! structural mutation marks the owner dirty, and [`crate::model::Model::ensure_indexes`]
//! rebuilds every dirty index before the next query phase.

use rustc_hash::FxHashMap;

use crate::base::Name;
use crate::model::element::{ElementId, ElementKind, HeritageKind};

/// Outcome of a name lookup in one namespace's member map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberEntry {
    /// Exactly one membership carries this name.
    Unique(ElementId),
    /// More than one membership carries this name; lookups through it are
    /// ambiguous until the model is corrected.
    Duplicate(ElementId),
}

impl MemberEntry {
    pub fn membership(self) -> ElementId {
        match self {
            MemberEntry::Unique(id) | MemberEntry::Duplicate(id) => id,
        }
    }
}

/// Cached views over one element's children.
#[derive(Debug, Clone, Default)]
pub struct ChildIndex {
    /// Children bucketed by kind, declaration order preserved per bucket.
    pub by_kind: FxHashMap<ElementKind, Vec<ElementId>>,
    /// Declared and short names of named memberships.
    pub members: FxHashMap<Name, MemberEntry>,
    /// Heritage edges bucketed by heritage kind (types only).
    pub heritage: FxHashMap<HeritageKind, Vec<ElementId>>,
}

impl ChildIndex {
    pub fn record_child(&mut self, kind: ElementKind, child: ElementId) {
        self.by_kind.entry(kind).or_default().push(child);
        if let Some(hk) = HeritageKind::of(kind) {
            self.heritage.entry(hk).or_default().push(child);
        }
    }

    pub fn record_member_name(&mut self, name: Name, membership: ElementId) {
        self.members
            .entry(name)
            .and_modify(|entry| {
                if entry.membership() != membership {
                    *entry = MemberEntry::Duplicate(entry.membership());
                }
            })
            .or_insert(MemberEntry::Unique(membership));
    }

    pub fn of_kind(&self, kind: ElementKind) -> &[ElementId] {
        self.by_kind.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn heritage_of(&self, kind: HeritageKind) -> &[ElementId] {
        self.heritage.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }
}
