//! Test helpers for setting up workspaces and asserting on resolution.

use once_cell::sync::Lazy;
use sysmod::Workspace;
use sysmod::model::ElementId;

/// Minimal standard library carrying the well-known roots implicit
/// supertypes point at.
pub static BASE_LIB: Lazy<String> = Lazy::new(|| {
    [
        "standard library package Base {",
        "    abstract classifier Anything;",
        "    abstract feature things;",
        "    abstract datatype DataValue;",
        "}",
        "standard library package Links {",
        "    abstract assoc Link;",
        "    abstract connector links;",
        "}",
        "standard library package Objects {",
        "    abstract struct Object;",
        "    abstract assoc struct LinkObject;",
        "}",
    ]
    .join("\n")
});

/// Creates a linked workspace with a single KerML document.
pub fn workspace_from_kerml(source: &str) -> Workspace {
    workspace_from_sources(&[("test.kerml", source)])
}

/// Creates a linked workspace from multiple documents.
///
/// Panics on parse errors; linking errors are allowed (assert on them via
/// `Workspace::link_diagnostics`).
pub fn workspace_from_sources(files: &[(&str, &str)]) -> Workspace {
    let mut workspace = Workspace::new();
    for (path, text) in files {
        let errors = workspace.set_document(path, text);
        assert!(errors.is_empty(), "Parse errors in '{path}': {errors:?}");
    }
    workspace.link();
    workspace
}

/// Creates a linked workspace with the standard library plus one document.
pub fn workspace_with_stdlib(source: &str) -> Workspace {
    workspace_from_sources(&[("lib.kerml", BASE_LIB.as_str()), ("test.kerml", source)])
}

/// Asserts the element exists and returns its id.
pub fn assert_element(workspace: &Workspace, qname: &str) -> ElementId {
    workspace
        .find_element(qname)
        .unwrap_or_else(|| panic!("element `{qname}` should exist"))
}

/// Asserts `name` resolves from `context` and returns the target's
/// qualified name.
pub fn assert_resolves(workspace: &Workspace, context: &str, name: &str) -> String {
    let element = workspace
        .resolve_from(context, name)
        .unwrap_or_else(|| panic!("`{name}` should resolve from `{context}`"));
    workspace
        .qualified_name(element)
        .unwrap_or_else(|| panic!("resolved `{name}` should have a qualified name"))
        .to_string()
}

/// Asserts `name` does not resolve from `context`.
pub fn assert_not_visible(workspace: &Workspace, context: &str, name: &str) {
    if let Some(element) = workspace.resolve_from(context, name) {
        panic!(
            "`{name}` should not be visible from `{context}`, resolved to {:?}",
            workspace.qualified_name(element)
        );
    }
}

/// The qualified name of the first heritage-edge target of `qname`.
pub fn first_heritage_target(workspace: &Workspace, qname: &str) -> Option<String> {
    let ty = assert_element(workspace, qname);
    let model = workspace.model();
    let data = model.element(ty).ty.as_ref()?;
    let edge = *data.heritage.first()?;
    let target = model.element(edge).resolved_target()?;
    model.qualified_name(target).map(str::to_string)
}
