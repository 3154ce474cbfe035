//! Typed linking errors.
//!
//! Naming errors are values attached to the failing reference, never
//! panics: one bad reference leaves the rest of the document resolvable.

use std::sync::Arc;

use thiserror::Error;

use crate::diagnostics::{Diagnostic, codes};
use crate::model::{ElementId, ElementKind, ExpectedKind};

/// Why a reference segment failed to link.
#[derive(Debug, Clone, Error)]
pub enum LinkErrorKind {
    /// No visible element carries the name.
    #[error("could not resolve reference to `{name}`")]
    NotFound { name: Arc<str> },

    /// The name is declared more than once in the namespace that won the
    /// lookup.
    #[error("reference to `{name}` is ambiguous")]
    Ambiguous {
        name: Arc<str>,
        /// One of the contending memberships.
        membership: ElementId,
    },

    /// The name resolved, but to the wrong kind of element for this
    /// grammatical position. Carries the found kind for diagnostics.
    #[error(
        "expected `{name}` to be a {}, found a {}",
        expected.display(),
        found.display()
    )]
    WrongKind {
        name: Arc<str>,
        expected: ExpectedKind,
        found: ElementKind,
    },

    /// A prior segment of the qualified name failed, so this segment has
    /// no scope to resolve in.
    #[error("no scope to resolve `{name}` in")]
    NoScope { name: Arc<str> },
}

impl LinkErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            LinkErrorKind::NotFound { .. } => codes::UNDEFINED_REFERENCE,
            LinkErrorKind::Ambiguous { .. } => codes::AMBIGUOUS_REFERENCE,
            LinkErrorKind::WrongKind { .. } => codes::WRONG_REFERENCE_KIND,
            LinkErrorKind::NoScope { .. } => codes::NO_SCOPE,
        }
    }
}

/// A linking error anchored to the relationship element that failed.
#[derive(Debug, Clone, Error)]
#[error("{kind}")]
pub struct LinkError {
    /// The relationship element whose reference failed.
    pub node: ElementId,
    /// Index of the failing name segment.
    pub segment: usize,
    pub kind: LinkErrorKind,
}

impl LinkError {
    /// Presentation-ready form: structural identity plus property/index so
    /// a front end can map back to the exact name segment.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.node, self.kind.to_string())
            .with_property("reference")
            .with_index(self.segment)
            .with_code(self.kind.code())
    }
}
