//! Linker behavior: error taxonomy, qualified-name chaining, caching.

use crate::helpers::*;
use sysmod::linker::LinkErrorKind;
use sysmod::model::{ElementKind, ExpectedKind};

fn link_error_kinds(workspace: &sysmod::Workspace, path: &str) -> Vec<String> {
    workspace
        .link_diagnostics(path)
        .iter()
        .map(|d| d.code.as_deref().unwrap_or("").to_string())
        .collect()
}

// =============================================================================
// NOT FOUND
// =============================================================================

#[test]
fn unresolved_name_yields_a_typed_error() {
    let mut workspace = sysmod::Workspace::new();
    workspace.set_document("test.kerml", "class B :> Missing;");
    let errors = workspace.link().to_vec();
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0].kind, LinkErrorKind::NotFound { .. }));
    assert_eq!(errors[0].segment, 0);

    let diagnostic = errors[0].to_diagnostic();
    assert_eq!(diagnostic.code.as_deref(), Some("E0001"));
    assert_eq!(diagnostic.property, Some("reference"));
    // The node is the specialization edge itself.
    let node = workspace.model().element(diagnostic.node);
    assert_eq!(node.kind, ElementKind::Specialization);
}

#[test]
fn one_bad_reference_does_not_abort_the_rest() {
    let source = "
        class A;
        class Bad :> Missing;
        class Good :> A;
    ";
    let workspace = workspace_from_kerml(source);
    assert!(workspace.conforms("Good", "A"));
    assert_eq!(workspace.link_diagnostics("test.kerml").len(), 1);
}

// =============================================================================
// WRONG KIND
// =============================================================================

#[test]
fn subsetting_a_class_reports_the_found_kind() {
    let source = "
        class C;
        feature f :> C;
    ";
    let mut workspace = sysmod::Workspace::new();
    workspace.set_document("test.kerml", source);
    let errors = workspace.link().to_vec();
    assert_eq!(errors.len(), 1);
    match &errors[0].kind {
        LinkErrorKind::WrongKind {
            expected, found, ..
        } => {
            assert_eq!(*expected, ExpectedKind::Feature);
            assert_eq!(*found, ElementKind::Class);
        }
        other => panic!("expected WrongKind, got {other:?}"),
    }
    assert_eq!(link_error_kinds(&workspace, "test.kerml"), vec!["E0003"]);
}

// =============================================================================
// AMBIGUITY
// =============================================================================

#[test]
fn duplicate_names_make_references_ambiguous() {
    let source = "
        package P {
            class A;
            class A;
            class User :> A;
        }
    ";
    let mut workspace = sysmod::Workspace::new();
    workspace.set_document("test.kerml", source);
    let errors = workspace.link().to_vec();
    assert!(
        errors
            .iter()
            .any(|e| matches!(e.kind, LinkErrorKind::Ambiguous { .. })),
        "expected an ambiguity error, got {errors:?}"
    );
}

// =============================================================================
// QUALIFIED-NAME CHAINING
// =============================================================================

#[test]
fn qualified_segments_link_left_to_right() {
    let source = "
        package Outer {
            package Inner { class Target; }
        }
        class User :> Outer::Inner::Target;
    ";
    let workspace = workspace_from_kerml(source);
    assert!(workspace.conforms("User", "Outer::Inner::Target"));
}

#[test]
fn failed_segment_aborts_later_segments() {
    let source = "
        package Outer {}
        class User :> Outer::Missing::Target;
    ";
    let mut workspace = sysmod::Workspace::new();
    workspace.set_document("test.kerml", source);
    let errors = workspace.link().to_vec();
    // One error at the failed segment; `Target` is never attempted.
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].segment, 1);
    assert!(matches!(errors[0].kind, LinkErrorKind::NotFound { .. }));
}

#[test]
fn qualified_access_sees_inherited_members() {
    let source = "
        class Base { feature inherited; }
        class Sub :> Base;
        class User { feature u :>> Sub::inherited; }
    ";
    let workspace = workspace_from_kerml(source);
    assert_eq!(
        first_heritage_target(&workspace, "User::u").as_deref(),
        Some("Base::inherited")
    );
}

#[test]
fn qualified_access_from_outside_is_public_only() {
    let source = "
        package P { private class Secret; class Open; }
        class User :> P::Secret;
        class Ok :> P::Open;
    ";
    let mut workspace = sysmod::Workspace::new();
    workspace.set_document("test.kerml", source);
    let errors = workspace.link().to_vec();
    assert_eq!(errors.len(), 1);
    assert!(workspace.conforms("Ok", "P::Open"));
}

// =============================================================================
// FORWARD AND CIRCULAR REFERENCES
// =============================================================================

#[test]
fn forward_references_resolve() {
    let workspace = workspace_from_kerml("class B :> A; class A;");
    assert!(workspace.conforms("B", "A"));
}

#[test]
fn mutually_referential_declarations_link() {
    // Conjugation in one direction, a typed feature in the other.
    let source = "
        class A { feature f : B; }
        class B ~ A;
    ";
    let workspace = workspace_from_kerml(source);
    assert!(workspace.specializes("A::f", "B"));
    assert!(workspace.specializes("B", "A"));
}

// =============================================================================
// TYPE RELATIONSHIPS AND QUOTED NAMES
// =============================================================================

#[test]
fn type_relationships_link_like_heritage() {
    let source = "
        class A; class B;
        class C disjoint from A unions B;
    ";
    let workspace = workspace_from_kerml(source);
    let model = workspace.model();
    let c = workspace.find_element("C").unwrap();
    let rels = &model.element(c).ty.as_ref().unwrap().type_relationships;
    assert_eq!(rels.len(), 2);
    let targets: Vec<_> = rels
        .iter()
        .filter_map(|&edge| model.element(edge).resolved_target())
        .filter_map(|t| model.qualified_name(t))
        .collect();
    assert_eq!(targets, vec!["A", "B"]);
    // Type relationships are not heritage: no conformance through them.
    assert!(!workspace.conforms("C", "A"));
}

#[test]
fn quoted_names_resolve_like_plain_ones() {
    let source = "
        class 'door assembly';
        class Door :> 'door assembly';
    ";
    let workspace = workspace_from_kerml(source);
    assert!(workspace.conforms("Door", "door assembly"));
}

// =============================================================================
// CACHING
// =============================================================================

#[test]
fn second_link_pass_is_a_no_op() {
    let mut workspace = sysmod::Workspace::new();
    workspace.set_document("test.kerml", "class A; class B :> A;");
    assert!(workspace.link().is_empty());
    // Nothing pending: resolved references are cached on the reference.
    assert!(workspace.model().pending_references().is_empty());
    assert!(workspace.link().is_empty());
    assert!(workspace.conforms("B", "A"));
}
