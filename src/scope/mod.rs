//! The scope model — lazily evaluated, composable visibility trees.
//!
//! A [`Scope`] answers "what names are visible from here, and what do they
//! resolve to" without materializing a symbol table: most queries need one
//! name, and the full visible set depends on mutually recursive
//! inheritance/import structure that would be expensive to compute eagerly.
//!
//! Each scope exposes its *own* names through [`Scope::get_local_element`]
//! and the scopes to search next through [`Scope::child_scopes`], in
//! priority order — the first match along the depth-first walk wins. The
//! walk itself lives here ([`get_element`], [`get_all_elements`]); the
//! concrete scope kinds live in [`kinds`], the cross-document index in
//! [`global`].

mod global;
mod kinds;
mod options;

use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::FxHashSet;

use crate::base::{CancelToken, Cancelled, Lang, Name};
use crate::model::{ElementId, Model};

pub use global::{ExportedNames, GlobalScope, StaticExport};
pub use kinds::{
    ElementScope, FilteredScope, GlobalScopeView, MembershipImportScope, NamespaceImportScope,
    NamespaceScope, ScopeStream, TypeScope, make_linking_scope, scope_for_element,
};
pub use options::{Depth, ScopeOptions, VisibilityTier};

/// Context threaded through every scope query.
///
/// Scopes own only plain data (element ids, options, shared visited sets);
/// the model and the global index are supplied per query.
#[derive(Clone, Copy)]
pub struct ScopeCx<'a> {
    pub model: &'a Model,
    pub global: Option<&'a GlobalScope>,
    /// Language of the querying document; static-export clashes prefer
    /// same-language entries.
    pub lang: Option<Lang>,
}

impl<'a> ScopeCx<'a> {
    pub fn new(model: &'a Model, global: Option<&'a GlobalScope>) -> Self {
        Self {
            model,
            global,
            lang: None,
        }
    }

    pub fn with_lang(mut self, lang: Option<Lang>) -> Self {
        self.lang = lang;
        self
    }
}

/// Outcome of a strictly-local name lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalLookup {
    /// The name maps to this membership.
    Found(ElementId),
    /// The name exists here but is intentionally hidden; stop searching
    /// this branch's entire subtree, not just this scope.
    Prune,
    /// Not present locally; descend into child scopes.
    Missing,
}

/// Internal sentinel: a lookup hit a name that is ambiguous in its
/// namespace (declared more than once). Raised mid-walk and converted into
/// a typed linking error at the linker boundary — it never escapes further.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unresolved reference: ambiguous name")]
pub struct AmbiguousName {
    /// One of the contending memberships, for diagnostics.
    pub membership: ElementId,
}

/// Shared, reference-counted scope handle.
///
/// Scopes are cheap immutable values; `Rc` lets a [`ScopeStream`] hand out
/// its children repeatedly without cloning their visited-set state.
pub type ScopeRef = Rc<dyn Scope>;

/// A node in the lazily-evaluated scope tree.
pub trait Scope {
    /// Look up a single name strictly within this scope's own contents.
    /// No delegation to children.
    fn get_local_element(&self, cx: &ScopeCx<'_>, name: &str)
    -> Result<LocalLookup, AmbiguousName>;

    /// Enumerate every name this scope itself exports, in declaration
    /// order. Names this scope shadows are added to `ignored`; the caller
    /// hands the updated set to descendant evaluations of the same query.
    fn get_all_local_elements(
        &self,
        cx: &ScopeCx<'_>,
        ignored: &mut FxHashSet<Name>,
    ) -> Vec<(Name, ElementId)>;

    /// The scopes to search when the local lookup misses, in priority
    /// order: first match wins across the whole depth-first walk.
    fn child_scopes(&self, cx: &ScopeCx<'_>) -> Vec<ScopeRef>;

    /// Veto hook applied to every candidate the walk finds (used to drop
    /// members already consumed by a redefinition chain).
    fn is_valid_candidate(&self, _cx: &ScopeCx<'_>, _membership: ElementId) -> bool {
        true
    }
}

/// Resolve one name: depth-first over self plus [`Scope::child_scopes`],
/// first acceptable candidate wins, `Prune` cuts a whole subtree.
pub fn get_element(
    scope: &dyn Scope,
    cx: &ScopeCx<'_>,
    name: &str,
) -> Result<Option<ElementId>, AmbiguousName> {
    match scope.get_local_element(cx, name)? {
        LocalLookup::Found(membership) => {
            if scope.is_valid_candidate(cx, membership) {
                return Ok(Some(membership));
            }
        }
        LocalLookup::Prune => return Ok(None),
        LocalLookup::Missing => {}
    }
    for child in scope.child_scopes(cx) {
        if let Some(found) = get_element(child.as_ref(), cx, name)? {
            return Ok(Some(found));
        }
    }
    Ok(None)
}

/// Enumerate every visible name with its highest-priority membership.
///
/// Same walk as [`get_element`], deduplicated by name keeping the first
/// entry encountered. The ignored-name set is copied per branch: shadow
/// exclusions apply downward, never sideways or upward.
pub fn get_all_elements(scope: &dyn Scope, cx: &ScopeCx<'_>) -> IndexMap<Name, ElementId> {
    let mut out = IndexMap::new();
    let ignored = FxHashSet::default();
    collect_all(scope, cx, &ignored, &mut out);
    out
}

/// [`get_all_elements`] with cancellation checks between top-level branches.
pub fn get_all_elements_cancellable(
    scope: &dyn Scope,
    cx: &ScopeCx<'_>,
    cancel: &CancelToken,
) -> Result<IndexMap<Name, ElementId>, Cancelled> {
    cancel.check()?;
    let mut out = IndexMap::new();
    let mut ignored = FxHashSet::default();
    for (name, membership) in scope.get_all_local_elements(cx, &mut ignored) {
        if scope.is_valid_candidate(cx, membership) {
            out.entry(name).or_insert(membership);
        }
    }
    for child in scope.child_scopes(cx) {
        // Yield point: one child's full subtree finished.
        cancel.check()?;
        collect_all(child.as_ref(), cx, &ignored, &mut out);
    }
    Ok(out)
}

fn collect_all(
    scope: &dyn Scope,
    cx: &ScopeCx<'_>,
    inherited_ignored: &FxHashSet<Name>,
    out: &mut IndexMap<Name, ElementId>,
) {
    let mut ignored = inherited_ignored.clone();
    for (name, membership) in scope.get_all_local_elements(cx, &mut ignored) {
        if scope.is_valid_candidate(cx, membership) {
            out.entry(name).or_insert(membership);
        }
    }
    for child in scope.child_scopes(cx) {
        collect_all(child.as_ref(), cx, &ignored, out);
    }
}
