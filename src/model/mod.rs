//! The element model: arena, metamodel build, and inheritance engine.
//!
//! Elements form an ownership tree (never a graph); relationships are
//! elements too, so heritage edges, memberships, and imports all live in the
//! same arena and are addressed by [`ElementId`]. Cross-references between
//! elements are [`QualifiedRef`]s resolved later by the linker.

mod arena;
mod build;
mod containers;
mod element;
pub mod inheritance;

pub use arena::{MemberLookup, Model};
pub use build::{build_document, inject_implicit_supertypes, resolve_qualified};
pub use containers::{ChildIndex, MemberEntry};
pub use element::{
    ClassifierFlags, Direction, ElementData, ElementId, ElementKind, ExpectedKind, FeatureData,
    FeatureValue, HeritageKind, ImportData, MembershipData, Multiplicity, QualifiedRef, RefSegment,
    RefStatus, RelationshipData, TypeData, Visibility,
};
pub use inheritance::{
    AllSpecializations, HeritageFilter, TypeOrName, all_specializations, all_types, conforms,
    conjugate_original, direction_of, feature_direction, first_conforming,
    recompute_classifier_flags, specializations, specializes,
};
