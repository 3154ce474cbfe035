//! Conformance and specialization queries over linked models.

use rstest::rstest;

use crate::helpers::*;
use sysmod::model::{self, HeritageFilter};

// =============================================================================
// REFLEXIVITY / TRANSITIVITY
// =============================================================================

#[rstest]
#[case("C", "C")]
#[case("C", "B")]
#[case("C", "A")]
#[case("B", "A")]
#[case("A", "A")]
fn conformance_is_reflexive_and_transitive(#[case] sub: &str, #[case] sup: &str) {
    let workspace = workspace_from_kerml("class A; class B :> A; class C :> B;");
    assert!(
        workspace.conforms(sub, sup),
        "{sub} should conform to {sup}"
    );
}

#[test]
fn siblings_do_not_conform_to_each_other() {
    let workspace = workspace_from_kerml("class Root; class X :> Root; class Y :> Root;");
    assert!(!workspace.conforms("X", "Y"));
    assert!(!workspace.conforms("Y", "X"));
    assert!(workspace.conforms("X", "Root"));
}

#[test]
fn end_to_end_class_chain() {
    let workspace = workspace_from_kerml("class A; class B :> A; class C :> B; class D;");
    assert!(workspace.conforms("C", "A"));
    assert!(!workspace.conforms("D", "A"));
    assert!(!workspace.conforms("D", "C"));
}

// =============================================================================
// DIAMONDS AND CYCLES
// =============================================================================

#[test]
fn diamond_ancestor_appears_once() {
    let workspace =
        workspace_from_kerml("class A; class B :> A; class C :> A; class D :> B, C;");
    let types = workspace.all_type_names("D");
    let count = types.iter().filter(|t| t.as_str() == "A").count();
    assert_eq!(count, 1, "diamond ancestor duplicated in {types:?}");
}

#[test]
fn specialization_cycle_terminates() {
    // A user modeling error; the traversal truncates silently.
    let workspace = workspace_from_kerml("class A :> C; class B :> A; class C :> B;");
    let types = workspace.all_type_names("A");
    assert_eq!(types.len(), 3, "each type collected once in {types:?}");
    assert!(workspace.conforms("A", "C"));
}

// =============================================================================
// FIRST CONFORMING
// =============================================================================

#[test]
fn first_conforming_reflects_traversal_order() {
    let workspace = workspace_from_kerml("class A; class B :> A; class C :> B; class D;");
    let model = workspace.model();
    let c = assert_element(&workspace, "C");
    // "A" is found while walking C -> B -> A even though "D" is listed first.
    assert_eq!(model::first_conforming(model, c, &["D", "A"]), Some("A"));
    // "B" is reached before "A" in traversal order.
    assert_eq!(model::first_conforming(model, c, &["A", "B"]), Some("B"));
    let d = assert_element(&workspace, "D");
    assert_eq!(model::first_conforming(model, d, &["A", "B"]), None);
}

// =============================================================================
// SPECIALIZES VS CONFORMS
// =============================================================================

#[test]
fn subsetting_is_not_a_supertype_relation() {
    let workspace = workspace_from_kerml("feature f; feature g :> f;");
    // Conformance walks every heritage kind; specializes only supertype
    // kinds, which subsetting is not.
    assert!(workspace.conforms("g", "f"));
    assert!(!workspace.specializes("g", "f"));
}

#[test]
fn typing_contributes_supertypes() {
    let workspace = workspace_from_kerml("class T; feature f : T;");
    assert!(workspace.specializes("f", "T"));
}

#[test]
fn conjugate_specializes_through_its_original() {
    let workspace =
        workspace_from_kerml("class A; class B :> A; class Conj ~ B;");
    assert!(workspace.specializes("Conj", "A"));
    assert!(workspace.specializes("Conj", "B"));
}

// =============================================================================
// IMPLICIT SUPERTYPES
// =============================================================================

#[test]
fn classes_default_to_the_library_root() {
    let workspace = workspace_with_stdlib("class X;");
    assert!(workspace.conforms("X", "Base::Anything"));
    assert_eq!(
        first_heritage_target(&workspace, "X").as_deref(),
        Some("Base::Anything")
    );
}

#[test]
fn features_default_to_things() {
    let workspace = workspace_with_stdlib("feature x;");
    assert!(workspace.conforms("x", "Base::things"));
}

#[test]
fn declared_heritage_suppresses_the_implicit_root() {
    let workspace = workspace_with_stdlib("class A; class B :> A;");
    // B's only direct edge is the declared one; the root arrives via A.
    assert_eq!(
        first_heritage_target(&workspace, "B").as_deref(),
        Some("A")
    );
    assert!(workspace.conforms("B", "Base::Anything"));
}

#[test]
fn no_library_means_no_implicit_root() {
    let workspace = workspace_from_kerml("class X;");
    assert!(!workspace.conforms("X", "Base::Anything"));
    let model = workspace.model();
    let x = assert_element(&workspace, "X");
    assert_eq!(
        model::all_types(model, x, HeritageFilter::All, false).count(),
        0
    );
}
