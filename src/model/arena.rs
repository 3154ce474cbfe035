//! The element arena.
//!
//! All elements of all documents live in one `Vec`, addressed by monotonic
//! [`ElementId`]. The arena is the single source of truth: every other
//! structure (child indexes, qualified names, the global export index) is a
//! cache over it, invalidated eagerly when the arena mutates and rebuilt by
//! an explicit `ensure`/`reindex` call before the next query phase.

use std::ops::Index;
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

use crate::base::{FileId, Lang, Name, join_qualified};
use crate::model::containers::{ChildIndex, MemberEntry};
use crate::model::element::{
    ClassifierFlags, ElementData, ElementId, ElementKind, HeritageKind, RefStatus,
};

/// Outcome of a member-name lookup in a namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberLookup {
    /// No member carries the name.
    Missing,
    /// Exactly one membership carries the name.
    Found(ElementId),
    /// The name is declared more than once; resolving through it would be
    /// arbitrary, so lookups report the ambiguity instead.
    Ambiguous(ElementId),
}

impl MemberLookup {
    pub fn is_found(self) -> bool {
        matches!(self, MemberLookup::Found(_))
    }
}

/// The model arena plus its caches.
#[derive(Debug, Default)]
pub struct Model {
    elements: Vec<ElementData>,
    /// Root namespace per document.
    roots: FxHashMap<FileId, ElementId>,
    langs: FxHashMap<FileId, Lang>,
    /// Elements of removed documents. Ids are never reused; dead elements
    /// stay in the vec so stale ids fail soft instead of aliasing.
    dead: FxHashSet<ElementId>,
    indexes: FxHashMap<ElementId, ChildIndex>,
    dirty: FxHashSet<ElementId>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Allocation and structure
    // ========================================================================

    pub fn alloc(&mut self, kind: ElementKind, document: FileId) -> ElementId {
        let id = ElementId(self.elements.len() as u32);
        self.elements.push(ElementData::new(id, kind, document));
        id
    }

    pub fn element(&self, id: ElementId) -> &ElementData {
        &self.elements[id.index()]
    }

    pub fn element_mut(&mut self, id: ElementId) -> &mut ElementData {
        &mut self.elements[id.index()]
    }

    pub fn is_alive(&self, id: ElementId) -> bool {
        !self.dead.contains(&id)
    }

    /// Make `child` an owned child of `parent`. Every non-root element has
    /// exactly one owner; attaching an already-owned element is a logic error.
    pub fn attach(&mut self, parent: ElementId, child: ElementId) {
        debug_assert!(self.element(child).owner.is_none(), "element already owned");
        self.element_mut(child).owner = Some(parent);
        self.element_mut(parent).children.push(child);
        self.mark_dirty(parent);
    }

    /// Record a heritage edge on its owning type (also attaches it).
    pub fn attach_heritage(&mut self, ty: ElementId, edge: ElementId) {
        self.attach(ty, edge);
        let data = self
            .element_mut(ty)
            .ty
            .as_mut()
            .expect("heritage owner must be a type");
        data.heritage.push(edge);
    }

    /// Record a non-heritage type relationship on its owning type.
    pub fn attach_type_relationship(&mut self, ty: ElementId, edge: ElementId) {
        self.attach(ty, edge);
        let data = self
            .element_mut(ty)
            .ty
            .as_mut()
            .expect("type relationship owner must be a type");
        data.type_relationships.push(edge);
    }

    // ========================================================================
    // Documents
    // ========================================================================

    pub fn set_root(&mut self, document: FileId, lang: Lang, root: ElementId) {
        self.roots.insert(document, root);
        self.langs.insert(document, lang);
    }

    pub fn root(&self, document: FileId) -> Option<ElementId> {
        self.roots.get(&document).copied()
    }

    pub fn lang(&self, document: FileId) -> Option<Lang> {
        self.langs.get(&document).copied()
    }

    pub fn documents(&self) -> impl Iterator<Item = (FileId, ElementId)> + '_ {
        self.roots.iter().map(|(&f, &r)| (f, r))
    }

    /// Drop a document's elements from the live model. Entries stay in the
    /// arena (ids are never reused); they just stop being reachable.
    pub fn remove_document(&mut self, document: FileId) {
        let Some(root) = self.roots.remove(&document) else {
            return;
        };
        self.langs.remove(&document);
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            self.dead.insert(id);
            self.indexes.remove(&id);
            self.dirty.remove(&id);
            stack.extend(self.element(id).children.iter().copied());
        }
        trace!("[MODEL] removed document {:?}", document);
    }

    /// Reset every reference and every linking-derived cache to the
    /// pre-linking state. Called when any document changes: linking is
    /// rerun from scratch rather than patched incrementally.
    ///
    /// Implied heritage edges are removed outright — they are a product of
    /// linking (implicit supertype injection) and are re-synthesized by the
    /// next pass; resetting them by name would re-link them as if the user
    /// had written them.
    pub fn reset_all_references(&mut self) {
        let implied: Vec<ElementId> = self
            .elements
            .iter()
            .filter(|e| self.is_alive(e.id))
            .filter(|e| e.rel.as_ref().is_some_and(|r| r.is_implied))
            .map(|e| e.id)
            .collect();
        for edge in implied {
            self.remove_implied_edge(edge);
        }

        let ids: Vec<ElementId> = self
            .elements
            .iter()
            .map(|e| e.id)
            .filter(|id| self.is_alive(*id))
            .collect();
        for id in ids {
            let mut owner_to_dirty = None;
            {
                let element = self.element_mut(id);
                if let Some(rel) = element.rel.as_mut() {
                    if let Some(reference) = rel.reference.as_mut() {
                        reference.reset();
                    }
                }
                if element.implicit_name.take().is_some() {
                    owner_to_dirty = element.owner;
                }
                let kind = element.kind;
                if let Some(ty) = element.ty.as_mut() {
                    ty.classifier_flags = ClassifierFlags::from_kind(kind);
                }
            }
            if let Some(owner) = owner_to_dirty {
                // The implicit name was indexed on the owning namespace.
                let ns = self.owning_namespace(owner).unwrap_or(owner);
                self.mark_dirty(ns);
            }
        }
    }

    // ========================================================================
    // Ownership queries
    // ========================================================================

    /// The owner chain from `id` (exclusive) to the root.
    pub fn owners(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        std::iter::successors(self.element(id).owner, move |&o| self.element(o).owner)
    }

    /// Nearest ancestor that is a namespace (skipping relationship owners
    /// such as the membership an element is owned through).
    pub fn owning_namespace(&self, id: ElementId) -> Option<ElementId> {
        self.owners(id).find(|&o| self.element(o).kind.is_namespace())
    }

    /// The document root this element belongs to, if still reachable.
    pub fn root_namespace(&self, id: ElementId) -> ElementId {
        self.owners(id).last().unwrap_or(id)
    }

    // ========================================================================
    // Child indexes
    // ========================================================================

    fn mark_dirty(&mut self, id: ElementId) {
        self.dirty.insert(id);
        self.indexes.remove(&id);
    }

    /// Rebuild every dirty child index. Call after a mutation phase, before
    /// the next query phase; query paths fall back to linear scans when an
    /// index is missing, so this is a performance contract, not a safety one.
    pub fn ensure_indexes(&mut self) {
        let dirty: Vec<ElementId> = self.dirty.drain().collect();
        for id in dirty {
            if !self.is_alive(id) {
                continue;
            }
            let index = self.build_index(id);
            self.indexes.insert(id, index);
        }
    }

    fn build_index(&self, id: ElementId) -> ChildIndex {
        let mut index = ChildIndex::default();
        for &child in &self.element(id).children {
            let child_data = self.element(child);
            index.record_child(child_data.kind, child);
            if child_data.kind.is_membership() {
                for name in self.membership_names(child) {
                    index.record_member_name(name, child);
                }
            }
        }
        index
    }

    fn child_index(&self, id: ElementId) -> Option<&ChildIndex> {
        self.indexes.get(&id)
    }

    /// The names a membership exports: declared (or alias) name plus short name.
    pub fn membership_names(&self, membership: ElementId) -> Vec<Name> {
        let data = self.element(membership);
        let mut names = Vec::new();
        if data.membership.as_ref().is_some_and(|m| m.is_alias) {
            names.extend(data.name.clone());
            names.extend(data.short_name.clone());
        } else if let Some(target) = self.owned_member(membership) {
            let target_data = self.element(target);
            names.extend(target_data.effective_name().cloned());
            names.extend(target_data.short_name.clone());
        }
        names
    }

    // ========================================================================
    // Memberships
    // ========================================================================

    /// Children of a given kind, declaration order preserved.
    pub fn children_of_kind(&self, id: ElementId, kind: ElementKind) -> Vec<ElementId> {
        if let Some(index) = self.child_index(id) {
            return index.of_kind(kind).to_vec();
        }
        self.element(id)
            .children
            .iter()
            .copied()
            .filter(|&c| self.element(c).kind == kind)
            .collect()
    }

    pub fn memberships(&self, ns: ElementId) -> Vec<ElementId> {
        self.children_of_kind(ns, ElementKind::Membership)
    }

    pub fn imports(&self, ns: ElementId) -> Vec<ElementId> {
        self.children_of_kind(ns, ElementKind::Import)
    }

    /// Heritage edges of one kind, served from the cached per-kind bucket
    /// when the index is built.
    pub fn heritage_of_kind(&self, ty: ElementId, kind: HeritageKind) -> Vec<ElementId> {
        if let Some(index) = self.child_index(ty) {
            return index.heritage_of(kind).to_vec();
        }
        self.element(ty)
            .ty
            .as_ref()
            .map(|t| {
                t.heritage
                    .iter()
                    .copied()
                    .filter(|&e| HeritageKind::of(self.element(e).kind) == Some(kind))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Look up a member by declared or short name, strictly within `ns`.
    pub fn find_member(&self, ns: ElementId, name: &str) -> MemberLookup {
        if let Some(index) = self.child_index(ns) {
            return match index.members.get(name) {
                None => MemberLookup::Missing,
                Some(MemberEntry::Unique(id)) => MemberLookup::Found(*id),
                Some(MemberEntry::Duplicate(id)) => MemberLookup::Ambiguous(*id),
            };
        }
        // Index not built yet: linear fallback with the same semantics.
        let mut found = None;
        for membership in self.memberships(ns) {
            if self
                .membership_names(membership)
                .iter()
                .any(|n| n.as_str() == name)
            {
                if found.is_some() {
                    return MemberLookup::Ambiguous(found.unwrap());
                }
                found = Some(membership);
            }
        }
        match found {
            Some(id) => MemberLookup::Found(id),
            None => MemberLookup::Missing,
        }
    }

    /// The element an owning membership owns, if any.
    pub fn owned_member(&self, membership: ElementId) -> Option<ElementId> {
        self.element(membership)
            .children
            .iter()
            .copied()
            .find(|&c| !self.element(c).kind.is_relationship())
    }

    /// The membership's target: the owned element, or for aliases whatever
    /// the alias reference resolved to (possibly another membership).
    pub fn membership_target(&self, membership: ElementId) -> Option<ElementId> {
        let data = self.element(membership);
        if data.membership.as_ref().is_some_and(|m| m.is_alias) {
            data.resolved_target()
        } else {
            self.owned_member(membership)
        }
    }

    /// Follow a membership's alias chain to its non-membership terminal.
    ///
    /// Alias cycles are survivable model errors: the walk is cycle-guarded
    /// and returns the last element it reached (possibly a membership)
    /// rather than failing.
    pub fn terminal_element(&self, membership: ElementId) -> Option<ElementId> {
        let mut visited: FxHashSet<ElementId> = FxHashSet::default();
        let mut current = membership;
        loop {
            if !visited.insert(current) {
                trace!(
                    "[MODEL] alias cycle at {:?}; returning partial",
                    current
                );
                return Some(current);
            }
            match self.membership_target(current) {
                Some(next) if self.element(next).kind.is_membership() => current = next,
                other => return other,
            }
        }
    }

    fn remove_implied_edge(&mut self, edge: ElementId) {
        if let Some(owner) = self.element(edge).owner {
            self.element_mut(owner).children.retain(|&c| c != edge);
            if let Some(ty) = self.element_mut(owner).ty.as_mut() {
                ty.heritage.retain(|&e| e != edge);
                ty.type_relationships.retain(|&e| e != edge);
            }
            self.mark_dirty(owner);
        }
        self.dead.insert(edge);
        self.indexes.remove(&edge);
    }

    /// Assign a redefinition-inherited name to an unnamed element and
    /// invalidate the member map it now appears in.
    pub fn set_implicit_name(&mut self, element: ElementId, name: Name) {
        self.element_mut(element).implicit_name = Some(name);
        if let Some(ns) = self.owning_namespace(element) {
            self.mark_dirty(ns);
        }
    }

    // ========================================================================
    // Qualified names
    // ========================================================================

    /// Recompute cached qualified names for every live element.
    ///
    /// Unnamed elements break the path: they and their subtree get no
    /// qualified name (they are still reachable by scope traversal).
    pub fn reindex_names(&mut self) {
        let roots: Vec<ElementId> = self.roots.values().copied().collect();
        for root in roots {
            self.assign_names(root, Some(String::new()));
        }
    }

    fn assign_names(&mut self, id: ElementId, path: Option<String>) {
        let children: Vec<ElementId> = self.element(id).children.clone();
        for child in children {
            let child_kind = self.element(child).kind;
            if child_kind.is_membership() {
                let is_alias = self
                    .element(child)
                    .membership
                    .as_ref()
                    .is_some_and(|m| m.is_alias);
                if is_alias {
                    let qname = match (&path, self.element(child).name.as_ref()) {
                        (Some(p), Some(n)) => Some(join_qualified(p, n)),
                        _ => None,
                    };
                    self.element_mut(child).qualified_name =
                        qname.map(|q| Arc::from(q.as_str()));
                } else if let Some(member) = self.owned_member(child) {
                    let member_path = match (&path, self.element(member).effective_name()) {
                        (Some(p), Some(n)) => Some(join_qualified(p, n.as_str())),
                        _ => None,
                    };
                    self.element_mut(member).qualified_name = member_path
                        .as_deref()
                        .map(Arc::from);
                    self.assign_names(member, member_path);
                }
            } else if child_kind.is_relationship() {
                // Heritage and imports neither carry nor extend the path,
                // but relationships may own nested elements (none today).
                self.assign_names(child, None);
            } else {
                // Directly-owned element without a membership (root members
                // are always membership-owned; this is the defensive arm).
                self.assign_names(child, None);
            }
        }
    }

    /// The cached qualified name, if the element has one.
    pub fn qualified_name(&self, id: ElementId) -> Option<&str> {
        self.element(id).qualified_name.as_deref()
    }

    // ========================================================================
    // Reference iteration (for the linker)
    // ========================================================================

    /// All live relationship elements that carry an unresolved reference.
    pub fn pending_references(&self) -> Vec<ElementId> {
        self.elements
            .iter()
            .filter(|e| self.is_alive(e.id))
            .filter(|e| {
                e.rel
                    .as_ref()
                    .and_then(|r| r.reference.as_ref())
                    .is_some_and(|q| q.status == RefStatus::Pending)
            })
            .map(|e| e.id)
            .collect()
    }

    /// All live elements, in allocation order.
    pub fn iter_alive(&self) -> impl Iterator<Item = &ElementData> {
        self.elements.iter().filter(|e| self.is_alive(e.id))
    }
}

impl Index<ElementId> for Model {
    type Output = ElementData;

    fn index(&self, id: ElementId) -> &ElementData {
        self.element(id)
    }
}
