//! Workspace lifecycle: multiple documents, replacement, removal,
//! cross-document exports, cancellation.

use crate::helpers::*;
use sysmod::{CancelToken, Cancelled, Workspace};

// =============================================================================
// CROSS-DOCUMENT RESOLUTION
// =============================================================================

#[test]
fn references_resolve_across_documents() {
    let workspace = workspace_from_sources(&[
        ("lib.kerml", "package Lib { class Base; }"),
        ("app.kerml", "class App :> Lib::Base;"),
    ]);
    assert!(workspace.conforms("App", "Lib::Base"));
}

#[test]
fn imports_resolve_across_documents() {
    let workspace = workspace_from_sources(&[
        ("lib.kerml", "package Lib { class Base; }"),
        ("app.kerml", "package App { import Lib::*; class A :> Base; }"),
    ]);
    assert!(workspace.conforms("App::A", "Lib::Base"));
}

#[test]
fn root_level_wildcard_reexport_is_a_dynamic_export() {
    let workspace = workspace_from_sources(&[
        ("lib.kerml", "package Lib { class Base; }"),
        // `Base` is only reachable through this document's root scope.
        ("rexp.kerml", "public import Lib::*;"),
        ("app.kerml", "class App :> Base;"),
    ]);
    assert!(workspace.conforms("App", "Lib::Base"));
}

// =============================================================================
// REPLACEMENT AND REMOVAL
// =============================================================================

#[test]
fn replacing_a_document_replaces_its_exports() {
    let mut workspace = Workspace::new();
    workspace.set_document("a.kerml", "class Old;");
    workspace.link();
    assert!(workspace.find_element("Old").is_some());

    workspace.set_document("a.kerml", "class New;");
    workspace.link();
    assert!(workspace.find_element("Old").is_none());
    assert!(workspace.find_element("New").is_some());
}

#[test]
fn reexporting_the_same_name_does_not_leak_stale_entries() {
    let mut workspace = Workspace::new();
    workspace.set_document("a.kerml", "class Same;");
    workspace.link();
    let first = workspace.find_element("Same").unwrap();

    workspace.set_document("a.kerml", "class Same;");
    workspace.link();
    let second = workspace.find_element("Same").unwrap();
    assert_ne!(first, second, "stale entry survived replacement");
    assert!(workspace.model().is_alive(second));
    assert!(!workspace.model().is_alive(first));
}

#[test]
fn removing_a_document_breaks_its_references() {
    let mut workspace = Workspace::new();
    workspace.set_document("lib.kerml", "package Lib { class Base; }");
    workspace.set_document("app.kerml", "class App :> Lib::Base;");
    workspace.link();
    assert!(workspace.conforms("App", "Lib::Base"));

    workspace.remove_document("lib.kerml");
    workspace.link();
    assert!(!workspace.conforms("App", "Lib::Base"));
    assert_eq!(workspace.link_diagnostics("app.kerml").len(), 1);
}

#[test]
fn replacement_relinks_dependent_documents() {
    let mut workspace = Workspace::new();
    workspace.set_document("lib.kerml", "package Lib { class Base; }");
    workspace.set_document("app.kerml", "class App :> Lib::Base;");
    workspace.link();

    // The dependency disappears, then comes back.
    workspace.set_document("lib.kerml", "package Lib { }");
    workspace.link();
    assert!(!workspace.conforms("App", "Lib::Base"));

    workspace.set_document("lib.kerml", "package Lib { class Base; }");
    workspace.link();
    assert!(workspace.conforms("App", "Lib::Base"));
}

// =============================================================================
// STATIC EXPORT PRECEDENCE
// =============================================================================

#[test]
fn later_document_wins_a_name_clash() {
    let workspace = workspace_from_sources(&[
        ("one.kerml", "class Clash { feature from_one; }"),
        ("two.kerml", "class Clash { feature from_two; }"),
        ("user.kerml", "class User :> Clash;"),
    ]);
    let target = first_heritage_target(&workspace, "User").unwrap();
    assert_eq!(target, "Clash");
    let clash = workspace.find_element("Clash").unwrap();
    // Append order: the entry from two.kerml wins.
    assert!(workspace.model().find_member(clash, "from_two").is_found());
}

// =============================================================================
// PARSE ERRORS
// =============================================================================

#[test]
fn parse_errors_are_surfaced_per_document() {
    let mut workspace = Workspace::new();
    let errors = workspace.set_document("bad.kerml", "class A :> ;");
    assert!(!errors.is_empty());
    assert_eq!(workspace.parse_errors("bad.kerml"), errors.as_slice());
    // The document still contributes what did parse.
    workspace.link();
    assert!(workspace.find_element("A").is_some());
}

// =============================================================================
// CANCELLATION
// =============================================================================

#[test]
fn cancelled_link_aborts_and_can_be_rerun() {
    let mut workspace = Workspace::new();
    workspace.set_document("a.kerml", "class A; class B :> A;");

    let cancel = CancelToken::new();
    cancel.cancel();
    assert!(matches!(
        workspace.link_cancellable(&cancel),
        Err(Cancelled)
    ));
    assert!(!workspace.is_linked());

    // A fresh token completes the pass.
    workspace.link();
    assert!(workspace.is_linked());
    assert!(workspace.conforms("B", "A"));
}

#[test]
fn cancelled_enumeration_propagates_the_signal() {
    let workspace = workspace_from_kerml("package P { class A; class B; }");
    let cancel = CancelToken::new();
    cancel.cancel();
    assert_eq!(workspace.visible_names("P", &cancel), Err(Cancelled));
}
