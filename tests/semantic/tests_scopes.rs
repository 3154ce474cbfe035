//! Scope priority, shadowing, and visibility rules.

use crate::helpers::*;
use sysmod::CancelToken;

// =============================================================================
// PRIORITY: LOCAL BEATS INHERITED BEATS IMPORTED
// =============================================================================

#[test]
fn local_member_shadows_inherited() {
    let source = "
        class A { feature x; }
        class B :> A { feature x; }
    ";
    let workspace = workspace_from_kerml(source);
    assert_eq!(assert_resolves(&workspace, "B", "x"), "B::x");
    assert_eq!(assert_resolves(&workspace, "A", "x"), "A::x");
}

#[test]
fn enumeration_yields_shadowed_name_once() {
    let source = "
        class A { feature x; feature y; }
        class B :> A { feature x; }
    ";
    let workspace = workspace_from_kerml(source);
    let names = workspace.visible_names("B", &CancelToken::never()).unwrap();
    let xs = names.iter().filter(|n| n.as_str() == "x").count();
    assert_eq!(xs, 1, "shadowed name duplicated in {names:?}");
    // The inherited, unshadowed member is still enumerated.
    assert!(names.iter().any(|n| n.as_str() == "y"));
}

#[test]
fn local_member_shadows_imported() {
    let source = "
        package P { class X; }
        package M {
            import P::*;
            class X;
            class U :> X;
        }
    ";
    let workspace = workspace_from_kerml(source);
    assert!(workspace.conforms("M::U", "M::X"));
    assert!(!workspace.conforms("M::U", "P::X"));
}

#[test]
fn inherited_member_beats_imported() {
    let source = "
        package P { class N; }
        class Sup { feature n; }
        class Sub :> Sup {
            import P::*;
        }
    ";
    let workspace = workspace_from_kerml(source);
    // `n` through inheritance, `N` through the import: both visible.
    assert_eq!(assert_resolves(&workspace, "Sub", "n"), "Sup::n");
    assert_eq!(assert_resolves(&workspace, "Sub", "N"), "P::N");
}

// =============================================================================
// LEXICAL NESTING
// =============================================================================

#[test]
fn nested_namespaces_see_enclosing_members() {
    let source = "
        package Outer {
            class Shared;
            package Inner {
                class User :> Shared;
            }
        }
    ";
    let workspace = workspace_from_kerml(source);
    assert!(workspace.conforms("Outer::Inner::User", "Outer::Shared"));
}

#[test]
fn inner_declaration_shadows_outer() {
    let source = "
        package Outer {
            class Thing;
            package Inner {
                class Thing;
                class User :> Thing;
            }
        }
    ";
    let workspace = workspace_from_kerml(source);
    assert!(workspace.conforms("Outer::Inner::User", "Outer::Inner::Thing"));
    assert!(!workspace.conforms("Outer::Inner::User", "Outer::Thing"));
}

#[test]
fn sibling_namespace_members_are_not_visible_unqualified() {
    let source = "
        package P { class Hidden; }
        package Q { class User :> Hidden; }
    ";
    let workspace = workspace_from_kerml(source);
    // Hidden is not in Q's scope chain; the reference fails.
    assert!(!workspace.conforms("Q::User", "P::Hidden"));
    assert_eq!(workspace.link_diagnostics("test.kerml").len(), 1);
}

#[test]
fn qualified_reference_reaches_sibling_members() {
    let source = "
        package P { class Target; }
        package Q { class User :> P::Target; }
    ";
    let workspace = workspace_from_kerml(source);
    assert!(workspace.conforms("Q::User", "P::Target"));
}

// =============================================================================
// VISIBILITY
// =============================================================================

#[test]
fn protected_members_are_inherited() {
    let source = "
        class A { protected feature p; }
        class B :> A;
    ";
    let workspace = workspace_from_kerml(source);
    assert_eq!(assert_resolves(&workspace, "B", "p"), "A::p");
}

#[test]
fn private_members_are_not_inherited() {
    let source = "
        class A { private feature s; }
        class B :> A;
    ";
    let workspace = workspace_from_kerml(source);
    assert_not_visible(&workspace, "B", "s");
}

#[test]
fn private_members_are_visible_inside_their_namespace() {
    let source = "
        package P {
            private class Secret;
            class User :> Secret;
        }
    ";
    let workspace = workspace_from_kerml(source);
    assert!(workspace.conforms("P::User", "P::Secret"));
}

#[test]
fn self_reference_in_own_clause_resolves_outward() {
    // The inner A's specialization must not resolve to itself; the skip
    // filter hides it while keeping the rest of the scope visible.
    let source = "
        class A;
        package Q {
            class A :> A;
        }
    ";
    let workspace = workspace_from_kerml(source);
    assert_eq!(
        first_heritage_target(&workspace, "Q::A").as_deref(),
        Some("A")
    );
}

// =============================================================================
// REDEFINITION SHADOWING
// =============================================================================

#[test]
fn unnamed_redefining_feature_inherits_the_name() {
    let source = "
        class A { feature x; }
        class B :> A { feature :>> x; }
    ";
    let workspace = workspace_from_kerml(source);
    // The redefining feature answers to `x` with B's qualified name.
    assert_eq!(assert_resolves(&workspace, "B", "x"), "B::x");
    let names = workspace.visible_names("B", &CancelToken::never()).unwrap();
    let xs = names.iter().filter(|n| n.as_str() == "x").count();
    assert_eq!(xs, 1, "redefined name duplicated in {names:?}");
}

#[test]
fn renamed_redefinition_hides_the_old_name() {
    let source = "
        class A { feature x; }
        class B :> A { feature y :>> x; }
    ";
    let workspace = workspace_from_kerml(source);
    assert_eq!(assert_resolves(&workspace, "B", "y"), "B::y");
    // The redefined member is consumed; its old name no longer resolves.
    assert_not_visible(&workspace, "B", "x");
}
