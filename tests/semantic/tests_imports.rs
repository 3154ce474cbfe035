//! Import resolution: wildcard, recursive, membership, re-export chains.

use crate::helpers::*;
use sysmod::CancelToken;

// =============================================================================
// WILDCARD VS RECURSIVE DEPTH
// =============================================================================

#[test]
fn wildcard_import_exposes_immediate_members_only() {
    let source = "
        package P {
            class X;
            package Q { class Nested; }
        }
        package M {
            import P::*;
            class A :> X;
        }
    ";
    let workspace = workspace_from_kerml(source);
    assert!(workspace.conforms("M::A", "P::X"));
    // Q itself is visible, its contents are not.
    assert_eq!(assert_resolves(&workspace, "M", "Q"), "P::Q");
    assert_not_visible(&workspace, "M", "Nested");
}

#[test]
fn recursive_import_exposes_nested_contents() {
    let source = "
        package P {
            class X;
            package Q { class Nested; package R { class Deep; } }
        }
        package M {
            import P::**;
            class A :> Nested;
            class B :> Deep;
        }
    ";
    let workspace = workspace_from_kerml(source);
    assert!(workspace.conforms("M::A", "P::Q::Nested"));
    assert!(workspace.conforms("M::B", "P::Q::R::Deep"));
}

#[test]
fn membership_import_exposes_one_name() {
    let source = "
        package P { class X; class Y; }
        package M {
            import P::X;
            class A :> X;
        }
    ";
    let workspace = workspace_from_kerml(source);
    assert!(workspace.conforms("M::A", "P::X"));
    assert_not_visible(&workspace, "M", "Y");
}

// =============================================================================
// RE-EXPORT CHAINS
// =============================================================================

#[test]
fn public_import_reexports_through_a_chain() {
    let source = "
        package P1 { class A; }
        package P2 { public import P1::*; }
        package M {
            import P2::*;
            class B :> A;
        }
    ";
    let workspace = workspace_from_kerml(source);
    assert!(workspace.conforms("M::B", "P1::A"));
}

#[test]
fn private_import_is_not_reexported() {
    let source = "
        package P1 { class A; }
        package P2 { import P1::*; }
        package M {
            import P2::*;
            class B :> A;
        }
    ";
    let workspace = workspace_from_kerml(source);
    assert!(!workspace.conforms("M::B", "P1::A"));
    assert_eq!(workspace.link_diagnostics("test.kerml").len(), 1);
}

#[test]
fn private_import_is_usable_inside_its_namespace() {
    let source = "
        package P1 { class A; }
        package P2 {
            import P1::*;
            class B :> A;
        }
    ";
    let workspace = workspace_from_kerml(source);
    assert!(workspace.conforms("P2::B", "P1::A"));
}

// =============================================================================
// VISIBILITY THROUGH IMPORTS
// =============================================================================

#[test]
fn private_members_do_not_cross_imports() {
    let source = "
        package P {
            class X;
            private class Hidden;
        }
        package M {
            import P::*;
            class A :> Hidden;
        }
    ";
    let workspace = workspace_from_kerml(source);
    assert!(!workspace.conforms("M::A", "P::Hidden"));
}

// =============================================================================
// CYCLES
// =============================================================================

#[test]
fn mutually_importing_packages_resolve() {
    let source = "
        package P {
            import Q::*;
            class FromP;
            class UsesQ :> FromQ;
        }
        package Q {
            import P::*;
            class FromQ;
            class UsesP :> FromP;
        }
    ";
    let workspace = workspace_from_kerml(source);
    assert!(workspace.conforms("P::UsesQ", "Q::FromQ"));
    assert!(workspace.conforms("Q::UsesP", "P::FromP"));
}

#[test]
fn self_import_terminates() {
    let source = "
        package P {
            import P::*;
            class A;
            class B :> A;
        }
    ";
    let workspace = workspace_from_kerml(source);
    assert!(workspace.conforms("P::B", "P::A"));
}

// =============================================================================
// ENUMERATION THROUGH IMPORTS
// =============================================================================

#[test]
fn enumeration_includes_imported_names() {
    let source = "
        package P { class X; class Y; }
        package M {
            import P::*;
            class Own;
        }
    ";
    let workspace = workspace_from_kerml(source);
    let names = workspace.visible_names("M", &CancelToken::never()).unwrap();
    for expected in ["Own", "X", "Y"] {
        assert!(
            names.iter().any(|n| n.as_str() == expected),
            "missing {expected} in {names:?}"
        );
    }
}
