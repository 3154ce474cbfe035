//! Alias memberships: round trips, chains, and cycles.

use crate::helpers::*;

#[test]
fn alias_resolves_to_the_same_element() {
    let source = "
        package P {
            class A;
            alias B for A;
            class ViaAlias :> B;
            class Direct :> A;
        }
    ";
    let workspace = workspace_from_kerml(source);
    let via_alias = first_heritage_target(&workspace, "P::ViaAlias");
    let direct = first_heritage_target(&workspace, "P::Direct");
    assert_eq!(via_alias.as_deref(), Some("P::A"));
    assert_eq!(via_alias, direct);
}

#[test]
fn alias_chain_follows_to_the_terminal() {
    let source = "
        package P {
            class A;
            alias B for A;
            alias C for B;
            class User :> C;
        }
    ";
    let workspace = workspace_from_kerml(source);
    assert!(workspace.conforms("P::User", "P::A"));
}

#[test]
fn alias_to_a_sibling_package_member() {
    let source = "
        package Lib { class Real; }
        package P {
            alias Shortcut for Lib::Real;
            class User :> Shortcut;
        }
    ";
    let workspace = workspace_from_kerml(source);
    assert!(workspace.conforms("P::User", "Lib::Real"));
}

#[test]
fn alias_cycle_degrades_to_a_linking_error() {
    let source = "
        package P {
            alias X for Y;
            alias Y for X;
            class User :> X;
        }
    ";
    let workspace = workspace_from_kerml(source);
    // Terminates; the user reference reports an error instead of hanging.
    let diagnostics = workspace.link_diagnostics("test.kerml");
    assert!(!diagnostics.is_empty());
    assert!(!workspace.conforms("P::User", "P::X"));
}

#[test]
fn imported_alias_resolves_through_both_hops() {
    let source = "
        package Lib {
            class Real;
            alias Nick for Real;
        }
        package M {
            import Lib::*;
            class User :> Nick;
        }
    ";
    let workspace = workspace_from_kerml(source);
    assert!(workspace.conforms("M::User", "Lib::Real"));
}

#[test]
fn alias_shows_up_in_exports_under_its_own_name() {
    let source = "
        package P { class A; }
        alias Top for P::A;
        class User :> Top;
    ";
    let workspace = workspace_from_kerml(source);
    assert!(workspace.conforms("User", "P::A"));
}
