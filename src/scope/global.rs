//! Global scope — the workspace-wide export index.
//!
//! Two tiers, split for scale:
//!
//! - **Static exports**: a flat map from bare top-level name to the
//!   `(language, membership)` entries exporting it, across all documents.
//!   O(1) average lookup; precedence is last-writer-wins by append order,
//!   with a same-language entry overriding a cross-language clash.
//! - **Dynamic exports**: whole root-namespace scopes, consulted only for
//!   documents that actually contain wildcard public imports or public
//!   members whose name is not knowable before linking. Documents with no
//!   dynamic exports must not degrade lookup performance — that invariant
//!   is the reason this split exists.
//!
//! Invalidation is precise: every static entry a document contributed is
//! removed by entry identity through a per-document reverse index, so a
//! replaced document re-exporting the same names never leaks stale entries.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::base::{CancelToken, Cancelled, FileId, Lang, Name};
use crate::model::{ElementId, Model, Visibility};

/// One static export entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticExport {
    pub document: FileId,
    pub lang: Lang,
    pub membership: ElementId,
}

/// Enumeration result: name → winning membership.
pub type ExportedNames = Vec<(Name, ElementId)>;

/// The cross-document export index.
#[derive(Debug, Default)]
pub struct GlobalScope {
    /// Bare top-level name → exporting entries, append order.
    statics: IndexMap<Name, Vec<StaticExport>>,
    /// Documents whose full root scope must be consulted as fallback.
    dynamics: IndexMap<FileId, ElementId>,
    /// Reverse index: names each document contributed static entries for.
    contributed: FxHashMap<FileId, Vec<Name>>,
}

impl GlobalScope {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // COLLECTION
    // ========================================================================

    /// Collect exports for every document, yielding between documents.
    pub fn collect_all(&mut self, model: &Model, cancel: &CancelToken) -> Result<(), Cancelled> {
        let documents: Vec<(FileId, ElementId)> = model.documents().collect();
        for (document, root) in documents {
            cancel.check()?;
            self.collect_document(model, document, root);
        }
        Ok(())
    }

    /// (Re)collect one document's exports, invalidating its prior entries.
    pub fn collect_document(&mut self, model: &Model, document: FileId, root: ElementId) {
        self.invalidate(document);
        let lang = model.lang(document).unwrap_or(Lang::KerML);

        let mut contributed = Vec::new();
        let mut dynamic = false;

        for membership in model.memberships(root) {
            let m = model.element(membership);
            if m.visibility != Visibility::Public {
                continue;
            }
            let names = model.membership_names(membership);
            if names.is_empty() {
                // A public member with no knowable name yet (it may gain one
                // through redefinition during linking): whole-scope fallback.
                dynamic = true;
                continue;
            }
            for name in names {
                self.statics.entry(name.clone()).or_default().push(StaticExport {
                    document,
                    lang,
                    membership,
                });
                contributed.push(name);
            }
        }

        // A public wildcard import re-exports another namespace's contents;
        // those names are only reachable by walking the root scope.
        for edge in model.imports(root) {
            let e = model.element(edge);
            if e.visibility == Visibility::Public
                && e.import.as_ref().is_some_and(|i| i.imports_all)
            {
                dynamic = true;
            }
        }

        if dynamic {
            self.dynamics.insert(document, root);
        }
        if !contributed.is_empty() {
            self.contributed.insert(document, contributed);
        }
        debug!(
            "[EXPORTS] document {:?}: {} static names, dynamic={}",
            document,
            self.contributed.get(&document).map_or(0, Vec::len),
            dynamic
        );
    }

    /// Remove exactly the entries `document` contributed.
    pub fn invalidate(&mut self, document: FileId) {
        if let Some(names) = self.contributed.remove(&document) {
            for name in names {
                if let Some(entries) = self.statics.get_mut(&name) {
                    entries.retain(|e| e.document != document);
                    if entries.is_empty() {
                        self.statics.shift_remove(&name);
                    }
                }
            }
        }
        if self.dynamics.shift_remove(&document).is_some() {
            trace!("[EXPORTS] dropped dynamic root of {:?}", document);
        }
    }

    // ========================================================================
    // LOOKUP
    // ========================================================================

    /// Pick the winning entry: the latest same-language one, else the
    /// latest overall.
    fn pick<'e>(
        entries: &'e [StaticExport],
        preferred: Option<Lang>,
    ) -> Option<&'e StaticExport> {
        if let Some(lang) = preferred {
            if let Some(entry) = entries.iter().rev().find(|e| e.lang == lang) {
                return Some(entry);
            }
        }
        entries.last()
    }

    /// Static lookup of a bare top-level name.
    pub fn static_lookup(&self, model: &Model, name: &str) -> Option<ElementId> {
        self.static_lookup_preferring(model, name, None)
    }

    /// Static lookup preferring entries of the given language on clashes.
    pub fn static_lookup_preferring(
        &self,
        model: &Model,
        name: &str,
        preferred: Option<Lang>,
    ) -> Option<ElementId> {
        let entries = self.statics.get(name)?;
        let live: Vec<StaticExport> = entries
            .iter()
            .filter(|e| model.is_alive(e.membership))
            .copied()
            .collect();
        Self::pick(&live, preferred).map(|e| e.membership)
    }

    /// Every statically exported name with its winning membership, in
    /// first-export order.
    pub fn static_entries(&self, model: &Model) -> ExportedNames {
        self.statics
            .iter()
            .filter_map(|(name, entries)| {
                let live: Vec<StaticExport> = entries
                    .iter()
                    .filter(|e| model.is_alive(e.membership))
                    .copied()
                    .collect();
                Self::pick(&live, None).map(|e| (name.clone(), e.membership))
            })
            .collect()
    }

    /// Root namespaces that must be consulted as whole-scope fallbacks.
    pub fn dynamic_roots(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.dynamics.values().copied()
    }

    /// True when no document contributed anything.
    pub fn is_empty(&self) -> bool {
        self.statics.is_empty() && self.dynamics.is_empty()
    }
}
