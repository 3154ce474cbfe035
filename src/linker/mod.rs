//! The linker — resolving qualified-name references to model elements.
//!
//! Each reference is an ordered list of name segments. Segments link
//! independently and strictly left to right: segment 0 resolves against the
//! full linking-scope chain of the referencing context, segment *i*
//! against the members of segment *i-1*'s resolved element. A failed
//! segment aborts the rest of its reference.
//!
//! References reach each other circularly through specialization,
//! conjugation, and import chains, so linking runs as fixpoint sweeps:
//! every sweep attempts all still-pending references, deferring the ones
//! whose prerequisites have not resolved yet; when a sweep makes no
//! progress the survivors are marked failed with typed errors. One bad
//! reference never aborts resolution of the rest of the document.

mod errors;

pub use errors::{LinkError, LinkErrorKind};

use std::sync::Arc;

use tracing::{debug, trace};

use crate::base::{CancelToken, Cancelled};
use crate::diagnostics::Diagnostic;
use crate::model::inheritance::recompute_classifier_flags;
use crate::model::{
    ElementId, ElementKind, ExpectedKind, Model, QualifiedRef, RefStatus,
};
use crate::scope::{
    GlobalScope, ScopeCx, ScopeOptions, get_element, make_linking_scope, scope_for_element,
};

/// Result of one linking pass.
#[derive(Debug, Default)]
pub struct LinkOutcome {
    /// References fully resolved by this pass.
    pub resolved: usize,
    /// Typed errors for the references that could not be resolved.
    pub errors: Vec<LinkError>,
}

impl LinkOutcome {
    /// The errors as presentation-ready diagnostics.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.errors.iter().map(LinkError::to_diagnostic).collect()
    }
}

/// Outcome of attempting one reference within a sweep.
enum LinkStep {
    /// Every segment resolved; the result is cached on the reference.
    Done,
    /// A segment could not resolve yet; retry next sweep.
    Defer { segment: usize },
    /// Definitive failure (wrong kind, ambiguity); no retry.
    Fail { segment: usize, kind: LinkErrorKind },
}

/// Links all pending references of a model against a global index.
pub struct Linker<'a> {
    model: &'a mut Model,
    global: &'a GlobalScope,
}

impl<'a> Linker<'a> {
    pub fn new(model: &'a mut Model, global: &'a GlobalScope) -> Self {
        Self { model, global }
    }

    /// Run fixpoint sweeps until every reference is resolved or failed.
    ///
    /// Cancellation is checked between references, never mid-mutation; a
    /// cancelled pass leaves a partially-linked model whose unresolved
    /// references read as absent.
    pub fn link_all(&mut self, cancel: &CancelToken) -> Result<LinkOutcome, Cancelled> {
        let mut outcome = LinkOutcome::default();

        loop {
            let pending = self.model.pending_references();
            if pending.is_empty() {
                break;
            }
            let mut progress = 0usize;
            for &edge in &pending {
                cancel.check()?;
                match self.try_link(edge) {
                    LinkStep::Done => {
                        progress += 1;
                        outcome.resolved += 1;
                    }
                    LinkStep::Defer { .. } => {}
                    LinkStep::Fail { segment, kind } => {
                        // Definitive: record now so later sweeps skip it.
                        progress += 1;
                        self.fail(edge, segment, kind, &mut outcome);
                    }
                }
            }
            // Redefinition naming can unlock further resolutions.
            if self.assign_implicit_names() {
                progress += 1;
            }
            self.model.ensure_indexes();
            if progress == 0 {
                break;
            }
        }

        // No more progress possible: the survivors are unresolved.
        for edge in self.model.pending_references() {
            cancel.check()?;
            let step = self.try_link(edge);
            let (segment, kind) = match step {
                LinkStep::Defer { segment } => {
                    let name = self.segment_name(edge, segment);
                    (segment, LinkErrorKind::NotFound { name })
                }
                LinkStep::Fail { segment, kind } => (segment, kind),
                LinkStep::Done => continue,
            };
            self.fail(edge, segment, kind, &mut outcome);
        }

        self.model.ensure_indexes();
        self.model.reindex_names();
        recompute_classifier_flags(self.model);
        debug!(
            "[LINK] pass complete: {} resolved, {} errors",
            outcome.resolved,
            outcome.errors.len()
        );
        Ok(outcome)
    }

    fn segment_name(&self, edge: ElementId, segment: usize) -> Arc<str> {
        self.model
            .element(edge)
            .rel
            .as_ref()
            .and_then(|r| r.reference.as_ref())
            .and_then(|q| q.segments.get(segment))
            .map(|s| Arc::from(s.name.as_str()))
            .unwrap_or_else(|| Arc::from(""))
    }

    fn fail(
        &mut self,
        edge: ElementId,
        segment: usize,
        kind: LinkErrorKind,
        outcome: &mut LinkOutcome,
    ) {
        if let Some(reference) = self
            .model
            .element_mut(edge)
            .rel
            .as_mut()
            .and_then(|r| r.reference.as_mut())
        {
            reference.status = RefStatus::Failed;
        }
        trace!("[LINK] failed {:?} segment {}: {}", edge, segment, kind);
        outcome.errors.push(LinkError {
            node: edge,
            segment,
            kind,
        });
    }

    // ========================================================================
    // PER-REFERENCE STATE MACHINE
    // ========================================================================

    /// The context whose linking scope a reference's first segment searches,
    /// and the element excluded from it.
    fn reference_context(&self, edge: ElementId) -> (ElementId, Option<ElementId>) {
        let data = self.model.element(edge);
        let source = data
            .rel
            .as_ref()
            .and_then(|r| r.source)
            .or(data.owner)
            .unwrap_or(edge);
        match data.kind {
            // A declaration's own clause must not resolve to the element
            // being declared.
            k if k.is_heritage() || k.is_type_relationship() => (source, Some(source)),
            // An alias must not resolve to itself.
            ElementKind::Membership => (source, Some(edge)),
            // Imports search the enclosing chain unfiltered; their own
            // unresolved edge reads as absent, so no self-cycle arises.
            _ => (source, None),
        }
    }

    fn try_link(&mut self, edge: ElementId) -> LinkStep {
        let Some(mut reference) = self
            .model
            .element(edge)
            .rel
            .as_ref()
            .and_then(|r| r.reference.clone())
        else {
            return LinkStep::Done;
        };
        if reference.segments.is_empty() {
            // Nothing to resolve; mark it so it leaves the pending set.
            reference.status = RefStatus::Resolved;
            self.write_back(edge, reference);
            return LinkStep::Done;
        }
        let (context, skip) = self.reference_context(edge);
        let model = &*self.model;
        let lang = model.lang(model.element(edge).document);
        let cx = ScopeCx::new(model, Some(self.global)).with_lang(lang);

        let last = reference.segments.len() - 1;
        let mut previous: Option<ElementId> = None;

        for i in 0..reference.segments.len() {
            let name = reference.segments[i].name.clone();
            let scope = match previous {
                None => make_linking_scope(model, context, skip),
                Some(prev) => {
                    // Qualified access into one's own enclosing chain may
                    // still name non-public members.
                    let options = if self.is_enclosing(prev, context) {
                        ScopeOptions::local()
                    } else {
                        ScopeOptions::external()
                    };
                    scope_for_element(model, prev, options)
                }
            };

            let membership = match get_element(scope.as_ref(), &cx, &name) {
                Err(ambiguous) => {
                    // The mid-lookup sentinel surfaces here, as a typed
                    // error rather than a crash.
                    return LinkStep::Fail {
                        segment: i,
                        kind: LinkErrorKind::Ambiguous {
                            name: Arc::from(name.as_str()),
                            membership: ambiguous.membership,
                        },
                    };
                }
                Ok(None) => return LinkStep::Defer { segment: i },
                Ok(Some(m)) => m,
            };

            let expected = if i == last {
                reference.expected
            } else {
                ExpectedKind::Namespace
            };

            let resolved = if expected == ExpectedKind::Membership {
                // The membership itself is the target; no alias unwrapping.
                membership
            } else {
                let Some(element) = model.terminal_element(membership) else {
                    // Alias target not linked yet.
                    return LinkStep::Defer { segment: i };
                };
                if model.element(element).kind.is_membership() {
                    // Alias cycle: the chain never reaches a terminal.
                    return LinkStep::Defer { segment: i };
                }
                let found = model.element(element).kind;
                if !expected.accepts(found) {
                    return LinkStep::Fail {
                        segment: i,
                        kind: LinkErrorKind::WrongKind {
                            name: Arc::from(name.as_str()),
                            expected,
                            found,
                        },
                    };
                }
                element
            };

            reference.segments[i].resolved = Some(resolved);
            previous = Some(resolved);
        }

        reference.status = RefStatus::Resolved;
        self.write_back(edge, reference);
        trace!("[LINK] resolved {:?}", edge);
        LinkStep::Done
    }

    fn write_back(&mut self, edge: ElementId, reference: QualifiedRef) {
        if let Some(rel) = self.model.element_mut(edge).rel.as_mut() {
            rel.reference = Some(reference);
        }
    }

    /// Is `candidate` the context itself or one of its ancestors?
    fn is_enclosing(&self, candidate: ElementId, context: ElementId) -> bool {
        candidate == context || self.model.owners(context).any(|o| o == candidate)
    }

    // ========================================================================
    // REDEFINITION NAMING
    // ========================================================================

    /// An unnamed feature redefining a named one implicitly inherits the
    /// name. Returns true when any name was assigned (member maps change,
    /// which can unlock deferred references).
    fn assign_implicit_names(&mut self) -> bool {
        let mut assignments = Vec::new();
        for element in self.model.iter_alive() {
            if element.kind != ElementKind::Redefinition {
                continue;
            }
            let Some(target) = element.resolved_target() else {
                continue;
            };
            let Some(source) = element.rel.as_ref().and_then(|r| r.source) else {
                continue;
            };
            let source_data = self.model.element(source);
            if source_data.effective_name().is_some() {
                continue;
            }
            if let Some(name) = self.model.element(target).effective_name() {
                assignments.push((source, name.clone()));
            }
        }
        let assigned = !assignments.is_empty();
        for (element, name) in assignments {
            trace!("[LINK] implicit name {:?} on {:?}", name, element);
            self.model.set_implicit_name(element, name);
        }
        assigned
    }
}

/// Resolve one name from an element's context against an already-linked
/// model. Read-only convenience for query layers; unresolved structure
/// reads as absent.
pub fn resolve_visible(
    model: &Model,
    global: &GlobalScope,
    context: ElementId,
    name: &str,
) -> Option<ElementId> {
    let cx = ScopeCx::new(model, Some(global))
        .with_lang(model.lang(model.element(context).document));
    let scope = make_linking_scope(model, context, None);
    let membership = get_element(scope.as_ref(), &cx, name).ok()??;
    model.terminal_element(membership)
}
