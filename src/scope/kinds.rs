//! Concrete scope kinds and their child-scope policies.
//!
//! Construction is cheap and lazy: a scope is a handful of ids, options,
//! and shared visited sets; its children are built only when a query misses
//! locally. Two distinct visited sets thread through a traversal — one
//! deduplicating specialization targets (diamond inheritance), one blocking
//! import cycles — plus a shadow set for members consumed by redefinitions.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashSet;
use tracing::trace;

use crate::base::Name;
use crate::model::inheritance::edge_target;
use crate::model::{ElementId, ElementKind, MemberLookup, Model, Visibility};
use crate::scope::options::ScopeOptions;
use crate::scope::{AmbiguousName, LocalLookup, Scope, ScopeCx, ScopeRef};

/// Visited/shadow set shared across one traversal.
type SharedSet = Rc<RefCell<FxHashSet<ElementId>>>;

fn shared_set() -> SharedSet {
    Rc::new(RefCell::new(FxHashSet::default()))
}

// ============================================================================
// LOCAL MEMBER LOOKUP (shared by every namespace-backed scope)
// ============================================================================

/// Strictly-local member lookup with a visibility ceiling.
///
/// A name that exists but is above the ceiling prunes: it shadows any
/// same-named inherited or imported member, so the walk must not fall
/// through to deeper scopes.
fn local_member(
    cx: &ScopeCx<'_>,
    element: ElementId,
    ceiling: Visibility,
    name: &str,
) -> Result<LocalLookup, AmbiguousName> {
    match cx.model.find_member(element, name) {
        MemberLookup::Missing => Ok(LocalLookup::Missing),
        MemberLookup::Ambiguous(membership) => Err(AmbiguousName { membership }),
        MemberLookup::Found(membership) => {
            if cx.model.element(membership).visibility <= ceiling {
                Ok(LocalLookup::Found(membership))
            } else {
                Ok(LocalLookup::Prune)
            }
        }
    }
}

/// Declaration-ordered enumeration of a namespace's own named members.
///
/// Hidden names (above the ceiling, or already in `ignored`) are added to
/// `ignored` so descendant scopes of the same query skip them too.
fn local_member_list(
    cx: &ScopeCx<'_>,
    element: ElementId,
    ceiling: Visibility,
    ignored: &mut FxHashSet<Name>,
) -> Vec<(Name, ElementId)> {
    let mut out = Vec::new();
    for membership in cx.model.memberships(element) {
        let admitted = cx.model.element(membership).visibility <= ceiling;
        for name in cx.model.membership_names(membership) {
            if ignored.contains(&name) {
                continue;
            }
            ignored.insert(name.clone());
            if admitted {
                out.push((name, membership));
            }
        }
    }
    out
}

// ============================================================================
// ELEMENT SCOPE
// ============================================================================

/// Leaf scope over one element's own named members. No children.
pub struct ElementScope {
    pub element: ElementId,
    pub options: ScopeOptions,
}

impl ElementScope {
    pub fn new(element: ElementId, options: ScopeOptions) -> Self {
        Self { element, options }
    }
}

impl Scope for ElementScope {
    fn get_local_element(
        &self,
        cx: &ScopeCx<'_>,
        name: &str,
    ) -> Result<LocalLookup, AmbiguousName> {
        local_member(cx, self.element, self.options.visibility, name)
    }

    fn get_all_local_elements(
        &self,
        cx: &ScopeCx<'_>,
        ignored: &mut FxHashSet<Name>,
    ) -> Vec<(Name, ElementId)> {
        local_member_list(cx, self.element, self.options.visibility, ignored)
    }

    fn child_scopes(&self, _cx: &ScopeCx<'_>) -> Vec<ScopeRef> {
        Vec::new()
    }
}

// ============================================================================
// NAMESPACE SCOPE
// ============================================================================

/// Scope over a namespace: local members, then import scopes.
///
/// Subtype-specific inherited scopes are empty here; [`TypeScope`] overrides
/// them. Import edges are expanded at most once per traversal (the shared
/// `import_visited` set blocks A-imports-B-imports-A cycles) and only when
/// the edge's own visibility passes the current ceiling.
pub struct NamespaceScope {
    pub element: ElementId,
    pub options: ScopeOptions,
    import_visited: SharedSet,
}

impl NamespaceScope {
    pub fn new(element: ElementId, options: ScopeOptions) -> Self {
        Self {
            element,
            options,
            import_visited: shared_set(),
        }
    }
}

/// Build the import child scopes of `element` under `options`.
fn import_scopes(
    cx: &ScopeCx<'_>,
    element: ElementId,
    options: &ScopeOptions,
    visited: &SharedSet,
) -> Vec<ScopeRef> {
    let mut out: Vec<ScopeRef> = Vec::new();
    for edge in cx.model.imports(element) {
        if cx.model.element(edge).visibility > options.visibility {
            continue;
        }
        if !visited.borrow_mut().insert(edge) {
            trace!("[SCOPE] import cycle at {:?}; truncated", edge);
            continue;
        }
        // Unresolved imports are absent, not errors.
        let Some(target) = cx.model.element(edge).resolved_target() else {
            continue;
        };
        let data = cx.model.element(edge).import.clone().unwrap_or_default();
        if data.imports_all {
            if cx.model.element(target).kind.is_namespace() {
                out.push(Rc::new(NamespaceImportScope {
                    target,
                    options: options.step_imported(),
                    import_visited: Rc::clone(visited),
                    recursive: data.is_recursive,
                }));
            }
        } else if cx.model.element(target).kind.is_membership() {
            out.push(Rc::new(MembershipImportScope { membership: target }));
        }
    }
    out
}

impl Scope for NamespaceScope {
    fn get_local_element(
        &self,
        cx: &ScopeCx<'_>,
        name: &str,
    ) -> Result<LocalLookup, AmbiguousName> {
        local_member(cx, self.element, self.options.visibility, name)
    }

    fn get_all_local_elements(
        &self,
        cx: &ScopeCx<'_>,
        ignored: &mut FxHashSet<Name>,
    ) -> Vec<(Name, ElementId)> {
        local_member_list(cx, self.element, self.options.visibility, ignored)
    }

    fn child_scopes(&self, cx: &ScopeCx<'_>) -> Vec<ScopeRef> {
        import_scopes(cx, self.element, &self.options, &self.import_visited)
    }
}

// ============================================================================
// TYPE SCOPE
// ============================================================================

/// Scope over a type: local members, then inherited scopes for every direct
/// heritage target, then import scopes.
///
/// Inherited scopes come first — a subtype member beats an inherited one,
/// and an inherited one beats an imported one. The `spec_visited` set is
/// keyed by *resolved target identity* and shared down the traversal, so a
/// diamond ancestor is searched once and heritage cycles terminate. The
/// `shadowed` set collects members consumed by redefinitions on the way
/// down; [`Scope::is_valid_candidate`] drops them wherever they resurface.
pub struct TypeScope {
    pub element: ElementId,
    pub options: ScopeOptions,
    import_visited: SharedSet,
    spec_visited: SharedSet,
    shadowed: SharedSet,
}

impl TypeScope {
    pub fn new(element: ElementId, options: ScopeOptions) -> Self {
        let spec_visited = shared_set();
        spec_visited.borrow_mut().insert(element);
        Self {
            element,
            options,
            import_visited: shared_set(),
            spec_visited,
            shadowed: shared_set(),
        }
    }

    /// Record the members consumed by redefinitions declared on this type
    /// or on any of its own features, before the walk descends into
    /// ancestor scopes.
    fn collect_shadowed(&self, cx: &ScopeCx<'_>) {
        let mut sources = vec![self.element];
        for membership in cx.model.memberships(self.element) {
            if let Some(member) = cx.model.owned_member(membership) {
                if cx.model.element(member).kind.is_type() {
                    sources.push(member);
                }
            }
        }
        let mut shadowed = self.shadowed.borrow_mut();
        for source in sources {
            let Some(ty) = cx.model.element(source).ty.as_ref() else {
                continue;
            };
            for &edge in &ty.heritage {
                if cx.model.element(edge).kind != ElementKind::Redefinition {
                    continue;
                }
                if let Some(target) = cx.model.element(edge).resolved_target() {
                    shadowed.insert(target);
                }
            }
        }
    }

    fn inherited_scopes(&self, cx: &ScopeCx<'_>) -> Vec<ScopeRef> {
        self.collect_shadowed(cx);
        let Some(ty) = cx.model.element(self.element).ty.as_ref() else {
            return Vec::new();
        };
        let mut out: Vec<ScopeRef> = Vec::new();
        for &edge in &ty.heritage {
            let Some(target) = edge_target(cx.model, edge) else {
                continue;
            };
            if !self.spec_visited.borrow_mut().insert(target) {
                continue;
            }
            out.push(Rc::new(TypeScope {
                element: target,
                options: self.options.step_inherited(),
                import_visited: Rc::clone(&self.import_visited),
                spec_visited: Rc::clone(&self.spec_visited),
                shadowed: Rc::clone(&self.shadowed),
            }));
        }
        out
    }
}

impl Scope for TypeScope {
    fn get_local_element(
        &self,
        cx: &ScopeCx<'_>,
        name: &str,
    ) -> Result<LocalLookup, AmbiguousName> {
        local_member(cx, self.element, self.options.visibility, name)
    }

    fn get_all_local_elements(
        &self,
        cx: &ScopeCx<'_>,
        ignored: &mut FxHashSet<Name>,
    ) -> Vec<(Name, ElementId)> {
        local_member_list(cx, self.element, self.options.visibility, ignored)
    }

    fn child_scopes(&self, cx: &ScopeCx<'_>) -> Vec<ScopeRef> {
        let mut children = self.inherited_scopes(cx);
        children.extend(import_scopes(
            cx,
            self.element,
            &self.options,
            &self.import_visited,
        ));
        children
    }

    fn is_valid_candidate(&self, cx: &ScopeCx<'_>, membership: ElementId) -> bool {
        let shadowed = self.shadowed.borrow();
        if shadowed.contains(&membership) {
            return false;
        }
        match cx.model.terminal_element(membership) {
            Some(element) => !shadowed.contains(&element),
            None => true,
        }
    }
}

// ============================================================================
// IMPORT SCOPES
// ============================================================================

/// Scope exposing the single membership a non-wildcard import names.
pub struct MembershipImportScope {
    pub membership: ElementId,
}

impl Scope for MembershipImportScope {
    fn get_local_element(
        &self,
        cx: &ScopeCx<'_>,
        name: &str,
    ) -> Result<LocalLookup, AmbiguousName> {
        let found = cx
            .model
            .membership_names(self.membership)
            .iter()
            .any(|n| n.as_str() == name);
        Ok(if found {
            LocalLookup::Found(self.membership)
        } else {
            LocalLookup::Missing
        })
    }

    fn get_all_local_elements(
        &self,
        cx: &ScopeCx<'_>,
        ignored: &mut FxHashSet<Name>,
    ) -> Vec<(Name, ElementId)> {
        let mut out = Vec::new();
        for name in cx.model.membership_names(self.membership) {
            if ignored.insert(name.clone()) {
                out.push((name, self.membership));
            }
        }
        out
    }

    fn child_scopes(&self, _cx: &ScopeCx<'_>) -> Vec<ScopeRef> {
        Vec::new()
    }
}

/// Scope exposing a wildcard-imported namespace's contents.
///
/// Locals are the target's members under the imported-content ceiling.
/// Children continue through the target's own public imports (re-export
/// chains) and, for `::**`, through every nested namespace member.
pub struct NamespaceImportScope {
    pub target: ElementId,
    pub options: ScopeOptions,
    import_visited: SharedSet,
    recursive: bool,
}

impl Scope for NamespaceImportScope {
    fn get_local_element(
        &self,
        cx: &ScopeCx<'_>,
        name: &str,
    ) -> Result<LocalLookup, AmbiguousName> {
        local_member(cx, self.target, self.options.visibility, name)
    }

    fn get_all_local_elements(
        &self,
        cx: &ScopeCx<'_>,
        ignored: &mut FxHashSet<Name>,
    ) -> Vec<(Name, ElementId)> {
        local_member_list(cx, self.target, self.options.visibility, ignored)
    }

    fn child_scopes(&self, cx: &ScopeCx<'_>) -> Vec<ScopeRef> {
        let mut children = import_scopes(cx, self.target, &self.options, &self.import_visited);
        if self.recursive {
            for membership in cx.model.memberships(self.target) {
                if cx.model.element(membership).visibility > self.options.visibility {
                    continue;
                }
                let Some(element) = cx.model.terminal_element(membership) else {
                    continue;
                };
                if !cx.model.element(element).kind.is_namespace() {
                    continue;
                }
                children.push(Rc::new(NamespaceImportScope {
                    target: element,
                    options: self.options.step_imported(),
                    import_visited: Rc::clone(&self.import_visited),
                    recursive: true,
                }));
            }
        }
        children
    }
}

// ============================================================================
// SCOPE STREAM
// ============================================================================

/// An ordered collection of scopes presented as one scope's children.
///
/// No local elements of its own; used to assemble linking-scope priority
/// chains (self, enclosing namespaces outward, global).
pub struct ScopeStream {
    scopes: Vec<ScopeRef>,
}

impl ScopeStream {
    pub fn new(scopes: Vec<ScopeRef>) -> Self {
        Self { scopes }
    }
}

impl Scope for ScopeStream {
    fn get_local_element(
        &self,
        _cx: &ScopeCx<'_>,
        _name: &str,
    ) -> Result<LocalLookup, AmbiguousName> {
        Ok(LocalLookup::Missing)
    }

    fn get_all_local_elements(
        &self,
        _cx: &ScopeCx<'_>,
        _ignored: &mut FxHashSet<Name>,
    ) -> Vec<(Name, ElementId)> {
        Vec::new()
    }

    fn child_scopes(&self, _cx: &ScopeCx<'_>) -> Vec<ScopeRef> {
        self.scopes.clone()
    }
}

// ============================================================================
// FILTERED SCOPE
// ============================================================================

/// Decorator applying a predicate at every query surface of an inner scope,
/// and of its whole subtree.
///
/// Used to exclude a specific element (the one currently being declared,
/// so its own specialization clause cannot resolve to itself) without
/// hiding the rest of its scope.
pub struct FilteredScope {
    inner: ScopeRef,
    filter: Rc<dyn Fn(&ScopeCx<'_>, ElementId) -> bool>,
}

impl FilteredScope {
    pub fn new(inner: ScopeRef, filter: Rc<dyn Fn(&ScopeCx<'_>, ElementId) -> bool>) -> Self {
        Self { inner, filter }
    }

    /// Exclude one element wherever it appears: as the membership itself,
    /// as its owned member, or as the alias-chain terminal.
    pub fn excluding(inner: ScopeRef, skip: ElementId) -> Self {
        Self::new(
            inner,
            Rc::new(move |cx: &ScopeCx<'_>, membership: ElementId| {
                if membership == skip {
                    return false;
                }
                if cx.model.owned_member(membership) == Some(skip) {
                    return false;
                }
                cx.model.terminal_element(membership) != Some(skip)
            }),
        )
    }
}

impl Scope for FilteredScope {
    fn get_local_element(
        &self,
        cx: &ScopeCx<'_>,
        name: &str,
    ) -> Result<LocalLookup, AmbiguousName> {
        match self.inner.get_local_element(cx, name)? {
            LocalLookup::Found(membership) if !(self.filter)(cx, membership) => {
                // The excluded element must not hide other same-named
                // candidates further along the walk.
                Ok(LocalLookup::Missing)
            }
            other => Ok(other),
        }
    }

    fn get_all_local_elements(
        &self,
        cx: &ScopeCx<'_>,
        ignored: &mut FxHashSet<Name>,
    ) -> Vec<(Name, ElementId)> {
        self.inner
            .get_all_local_elements(cx, ignored)
            .into_iter()
            .filter(|(_, membership)| (self.filter)(cx, *membership))
            .collect()
    }

    fn child_scopes(&self, cx: &ScopeCx<'_>) -> Vec<ScopeRef> {
        self.inner
            .child_scopes(cx)
            .into_iter()
            .map(|child| {
                Rc::new(FilteredScope {
                    inner: child,
                    filter: Rc::clone(&self.filter),
                }) as ScopeRef
            })
            .collect()
    }

    fn is_valid_candidate(&self, cx: &ScopeCx<'_>, membership: ElementId) -> bool {
        self.inner.is_valid_candidate(cx, membership) && (self.filter)(cx, membership)
    }
}

// ============================================================================
// GLOBAL SCOPE VIEW
// ============================================================================

/// The cross-document index presented as a scope.
///
/// Locals are the static exports; children are one external namespace scope
/// per dynamic-export root. Documents without dynamic exports cost nothing
/// beyond the static map probe.
pub struct GlobalScopeView;

impl Scope for GlobalScopeView {
    fn get_local_element(
        &self,
        cx: &ScopeCx<'_>,
        name: &str,
    ) -> Result<LocalLookup, AmbiguousName> {
        let Some(global) = cx.global else {
            return Ok(LocalLookup::Missing);
        };
        Ok(
            match global.static_lookup_preferring(cx.model, name, cx.lang) {
                Some(membership) => LocalLookup::Found(membership),
                None => LocalLookup::Missing,
            },
        )
    }

    fn get_all_local_elements(
        &self,
        cx: &ScopeCx<'_>,
        ignored: &mut FxHashSet<Name>,
    ) -> Vec<(Name, ElementId)> {
        let Some(global) = cx.global else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for (name, membership) in global.static_entries(cx.model) {
            if ignored.insert(name.clone()) {
                out.push((name, membership));
            }
        }
        out
    }

    fn child_scopes(&self, cx: &ScopeCx<'_>) -> Vec<ScopeRef> {
        let Some(global) = cx.global else {
            return Vec::new();
        };
        global
            .dynamic_roots()
            .map(|root| {
                Rc::new(NamespaceScope::new(root, ScopeOptions::external())) as ScopeRef
            })
            .collect()
    }
}

// ============================================================================
// SCOPE ASSEMBLY
// ============================================================================

/// The scope over one element's members, dispatched by kind.
pub fn scope_for_element(model: &Model, element: ElementId, options: ScopeOptions) -> ScopeRef {
    let kind = model.element(element).kind;
    if kind.is_type() {
        Rc::new(TypeScope::new(element, options))
    } else if kind.is_namespace() {
        Rc::new(NamespaceScope::new(element, options))
    } else {
        Rc::new(ElementScope::new(element, options))
    }
}

/// Assemble the priority chain a reference resolves against:
/// (1) the element's own scope, (2) each enclosing namespace outward,
/// (3) the global scope. A `skip` element is excluded from every tier via
/// [`FilteredScope`] — the rest of each scope stays visible.
pub fn make_linking_scope(model: &Model, element: ElementId, skip: Option<ElementId>) -> ScopeRef {
    let mut scopes: Vec<ScopeRef> = Vec::new();
    let start = if model.element(element).kind.is_namespace() {
        Some(element)
    } else {
        model.owning_namespace(element)
    };
    let mut current = start;
    while let Some(ns) = current {
        scopes.push(scope_for_element(model, ns, ScopeOptions::local()));
        current = model.owning_namespace(ns);
    }
    scopes.push(Rc::new(GlobalScopeView));

    let stream: ScopeRef = Rc::new(ScopeStream::new(scopes));
    match skip {
        Some(skip) => Rc::new(FilteredScope::excluding(stream, skip)),
        None => stream,
    }
}
