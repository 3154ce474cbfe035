//! Feature semantics: direction inference, modifiers, chains.

use crate::helpers::*;
use sysmod::model::Direction;

// =============================================================================
// DIRECTION
// =============================================================================

#[test]
fn declared_direction_is_reported() {
    let workspace = workspace_from_kerml("class A { in feature f; out feature g; }");
    assert_eq!(workspace.direction_of("A", "A::f"), Direction::In);
    assert_eq!(workspace.direction_of("A", "A::g"), Direction::Out);
}

#[test]
fn direction_is_inherited_through_specialization() {
    let source = "
        class A { in feature f; }
        class B :> A;
    ";
    let workspace = workspace_from_kerml(source);
    assert_eq!(workspace.direction_of("B", "A::f"), Direction::In);
}

#[test]
fn conjugation_flips_direction() {
    let source = "
        class Orig { in feature f; out feature g; inout feature h; }
        class Conj ~ Orig;
    ";
    let workspace = workspace_from_kerml(source);
    assert_eq!(workspace.direction_of("Conj", "Orig::f"), Direction::Out);
    assert_eq!(workspace.direction_of("Conj", "Orig::g"), Direction::In);
    assert_eq!(workspace.direction_of("Conj", "Orig::h"), Direction::Inout);
}

#[test]
fn double_conjugation_restores_direction() {
    let source = "
        class Orig { in feature f; }
        class Conj ~ Orig;
        class Back ~ Conj;
    ";
    let workspace = workspace_from_kerml(source);
    assert_eq!(workspace.direction_of("Back", "Orig::f"), Direction::In);
}

#[test]
fn conjugation_cycle_terminates() {
    let source = "
        class A ~ B;
        class B ~ A;
        class Orig { in feature f; }
    ";
    let workspace = workspace_from_kerml(source);
    // Not reachable from the cycle; must return None, not hang.
    assert_eq!(workspace.direction_of("A", "Orig::f"), Direction::None);
}

// =============================================================================
// MODIFIERS, MULTIPLICITY, VALUES
// =============================================================================

#[test]
fn feature_modifiers_are_recorded() {
    let workspace =
        workspace_from_kerml("class A { readonly derived ordered feature xs[0..*]; }");
    let model = workspace.model();
    let xs = assert_element(&workspace, "A::xs");
    let data = model.element(xs).feature.as_ref().unwrap();
    assert!(data.is_readonly);
    assert!(data.is_derived);
    assert!(data.is_ordered);
    assert!(!data.is_composite);
    let multiplicity = data.multiplicity.unwrap();
    assert_eq!(multiplicity.lower, 0);
    assert_eq!(multiplicity.upper, None);
}

#[test]
fn feature_value_is_kept_verbatim() {
    let workspace = workspace_from_kerml("class A { feature f = 42; }");
    let model = workspace.model();
    let f = assert_element(&workspace, "A::f");
    let data = model.element(f).feature.as_ref().unwrap();
    assert_eq!(data.value.as_ref().map(|v| v.text.as_str()), Some("42"));
}

#[test]
fn end_features_on_connectors() {
    let source = "
        class A; class B;
        connector link {
            end feature src : A;
            end feature tgt : B;
        }
    ";
    let workspace = workspace_from_kerml(source);
    let model = workspace.model();
    let src = assert_element(&workspace, "link::src");
    assert!(model.element(src).feature.as_ref().unwrap().is_end);
    assert!(workspace.specializes("link::src", "A"));
}

// =============================================================================
// FEATURE CHAINS
// =============================================================================

#[test]
fn chained_target_resolves_through_the_feature_type() {
    let source = "
        class T { feature g; }
        class C {
            feature f : T;
            feature h :>> f.g;
        }
    ";
    let workspace = workspace_from_kerml(source);
    assert_eq!(
        first_heritage_target(&workspace, "C::h").as_deref(),
        Some("T::g")
    );
}

#[test]
fn broken_chain_reports_one_error() {
    let source = "
        class T { feature g; }
        class C {
            feature f : T;
            feature h :>> f.missing.deeper;
        }
    ";
    let workspace = workspace_from_kerml(source);
    let diagnostics = workspace.link_diagnostics("test.kerml");
    // One error at the failing segment; later segments are not attempted.
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].index, Some(1));
}
