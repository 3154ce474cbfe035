//! Workspace facade — document management plus the read-only query surface.
//!
//! Documents arrive as strings (the language decided by extension), are
//! parsed and built into the shared model, and are linked together on
//! demand. Any document change resets linking wholesale: invalidation is
//! eager and synchronous, and the next [`Workspace::link`] rebuilds exports
//! and reruns the fixpoint. Between those phases readers see a partially
//! linked model in which unresolved references are simply absent.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::base::{CancelToken, Cancelled, FileId, Lang, Name};
use crate::diagnostics::Diagnostic;
use crate::linker::{LinkError, Linker, resolve_visible};
use crate::model::{
    self, Direction, ElementId, Model, build_document, inject_implicit_supertypes,
    resolve_qualified,
};
use crate::parser::{ParseError, parse};
use crate::scope::{
    GlobalScope, ScopeCx, ScopeOptions, get_all_elements_cancellable, scope_for_element,
};

/// The set of loaded documents and everything derived from them.
#[derive(Default)]
pub struct Workspace {
    model: Model,
    global: GlobalScope,
    files: IndexMap<String, FileId>,
    next_file: u32,
    parse_errors: FxHashMap<FileId, Vec<ParseError>>,
    link_errors: Vec<LinkError>,
    linked: bool,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // DOCUMENTS
    // ========================================================================

    /// Add or replace a document. Returns the parse errors; the document is
    /// built into the model even when some members failed to parse.
    pub fn set_document(&mut self, path: &str, text: &str) -> Vec<ParseError> {
        let lang = Lang::from_extension(path);
        let file = match self.files.get(path) {
            Some(&file) => {
                self.model.remove_document(file);
                self.global.invalidate(file);
                file
            }
            None => {
                let file = FileId::new(self.next_file);
                self.next_file += 1;
                self.files.insert(path.to_string(), file);
                file
            }
        };

        let parse = parse(text);
        build_document(&mut self.model, file, lang, &parse.file);
        self.parse_errors.insert(file, parse.errors.clone());

        // Other documents may reference this one: relink everything.
        self.model.reset_all_references();
        self.linked = false;
        debug!("[WORKSPACE] set {:?} ({} bytes)", path, text.len());
        parse.errors
    }

    /// Remove a document and invalidate everything it exported.
    pub fn remove_document(&mut self, path: &str) {
        if let Some(file) = self.files.shift_remove(path) {
            self.model.remove_document(file);
            self.global.invalidate(file);
            self.parse_errors.remove(&file);
            self.model.reset_all_references();
            self.linked = false;
        }
    }

    pub fn file_id(&self, path: &str) -> Option<FileId> {
        self.files.get(path).copied()
    }

    pub fn parse_errors(&self, path: &str) -> &[ParseError] {
        self.file_id(path)
            .and_then(|f| self.parse_errors.get(&f))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    // ========================================================================
    // LINKING
    // ========================================================================

    /// Link all pending references, rebuilding the export index first.
    pub fn link(&mut self) -> &[LinkError] {
        // A never-firing token cannot cancel; the errors land in
        // `link_errors` either way.
        let _ = self.link_cancellable(&CancelToken::never());
        &self.link_errors
    }

    /// [`Workspace::link`] under a cancellation token. A cancelled pass
    /// leaves the model partially linked; rerun to finish.
    pub fn link_cancellable(&mut self, cancel: &CancelToken) -> Result<&[LinkError], Cancelled> {
        self.model.ensure_indexes();
        self.model.reindex_names();
        self.global.collect_all(&self.model, cancel)?;
        inject_implicit_supertypes(&mut self.model, &self.global);
        self.model.ensure_indexes();

        let mut linker = Linker::new(&mut self.model, &self.global);
        let outcome = linker.link_all(cancel)?;
        self.link_errors = outcome.errors;
        self.linked = true;
        Ok(&self.link_errors)
    }

    pub fn is_linked(&self) -> bool {
        self.linked
    }

    /// Linking errors of the last pass, as diagnostics. One call per
    /// document validation pass.
    pub fn link_diagnostics(&self, path: &str) -> Vec<Diagnostic> {
        let Some(file) = self.file_id(path) else {
            return Vec::new();
        };
        self.link_errors
            .iter()
            .filter(|e| self.model.element(e.node).document == file)
            .map(LinkError::to_diagnostic)
            .collect()
    }

    // ========================================================================
    // QUERY SURFACE (read-only)
    // ========================================================================

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn global(&self) -> &GlobalScope {
        &self.global
    }

    /// Find an element by fully qualified name.
    pub fn find_element(&self, qname: &str) -> Option<ElementId> {
        resolve_qualified(&self.model, &self.global, qname)
    }

    /// Does the type named `qname` conform to `other` (a qualified name)?
    pub fn conforms(&self, qname: &str, other: &str) -> bool {
        self.find_element(qname)
            .is_some_and(|ty| model::conforms(&self.model, ty, other))
    }

    /// Like [`Workspace::conforms`], restricted to supertype heritage and
    /// unwrapping conjugation.
    pub fn specializes(&self, qname: &str, other: &str) -> bool {
        self.find_element(qname)
            .is_some_and(|ty| model::specializes(&self.model, ty, other))
    }

    /// Qualified names of the full type set of `qname`, self first,
    /// traversal order.
    pub fn all_type_names(&self, qname: &str) -> Vec<String> {
        let Some(ty) = self.find_element(qname) else {
            return Vec::new();
        };
        model::all_types(&self.model, ty, model::HeritageFilter::All, true)
            .filter_map(|t| self.model.qualified_name(t).map(str::to_string))
            .collect()
    }

    /// Resolve `name` as visible from the element named `context`.
    pub fn resolve_from(&self, context: &str, name: &str) -> Option<ElementId> {
        let context = self.find_element(context)?;
        resolve_visible(&self.model, &self.global, context, name)
    }

    /// Every name visible in the scope of the element named `qname`
    /// (members, inherited, imported), highest priority first.
    pub fn visible_names(
        &self,
        qname: &str,
        cancel: &CancelToken,
    ) -> Result<Vec<Name>, Cancelled> {
        let Some(element) = self.find_element(qname) else {
            return Ok(Vec::new());
        };
        let scope = scope_for_element(&self.model, element, ScopeOptions::local());
        let cx = ScopeCx::new(&self.model, Some(&self.global))
            .with_lang(self.model.lang(self.model.element(element).document));
        let names = get_all_elements_cancellable(scope.as_ref(), &cx, cancel)?;
        Ok(names.into_iter().map(|(name, _)| name).collect())
    }

    /// Effective direction of `feature` as seen from `ty` (both qualified
    /// names).
    pub fn direction_of(&self, ty: &str, feature: &str) -> Direction {
        let (Some(ty), Some(feature)) = (self.find_element(ty), self.find_element(feature)) else {
            return Direction::None;
        };
        model::feature_direction(&self.model, ty, feature)
    }

    /// Qualified name of an element, when it has one.
    pub fn qualified_name(&self, element: ElementId) -> Option<&str> {
        self.model.qualified_name(element)
    }
}
