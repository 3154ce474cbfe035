//! Diagnostics — structural error reporting.
//!
//! The core computes structural identity only: a diagnostic names the
//! element it is about (plus optionally which property and which index
//! within it) and the presentation layer maps that back to source text
//! through the element's recorded span.

use std::sync::Arc;

use crate::model::ElementId;

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

/// Related information for a diagnostic.
#[derive(Clone, Debug)]
pub struct RelatedInfo {
    /// The element this note points at.
    pub node: ElementId,
    /// The message.
    pub message: Arc<str>,
}

/// A diagnostic with structural location.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    /// The element the diagnostic is about.
    pub node: ElementId,
    /// The property of the element, when one applies (e.g. `"reference"`).
    pub property: Option<&'static str>,
    /// Index within the property (e.g. which name segment).
    pub index: Option<usize>,
    /// Severity level.
    pub severity: Severity,
    /// Error/warning code (e.g. "E0001").
    pub code: Option<Arc<str>>,
    /// The diagnostic message.
    pub message: Arc<str>,
    /// Optional related information.
    pub related: Vec<RelatedInfo>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(node: ElementId, message: impl Into<Arc<str>>) -> Self {
        Self {
            node,
            property: None,
            index: None,
            severity: Severity::Error,
            code: None,
            message: message.into(),
            related: Vec::new(),
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(node: ElementId, message: impl Into<Arc<str>>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(node, message)
        }
    }

    /// Set the property this diagnostic refers to.
    pub fn with_property(mut self, property: &'static str) -> Self {
        self.property = Some(property);
        self
    }

    /// Set the index within the property.
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Set the error code.
    pub fn with_code(mut self, code: impl Into<Arc<str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Add related information.
    pub fn with_related(mut self, info: RelatedInfo) -> Self {
        self.related.push(info);
        self
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Standard diagnostic codes for linking and metamodel errors.
///
/// ## Error Code Ranges
///
/// - **E0001-E0099**: Linking errors (name resolution, reference typing)
/// - **W0001-W0099**: Warnings
pub mod codes {
    // ========================================================================
    // LINKING ERRORS (E0001-E0099)
    // ========================================================================

    /// Undefined reference (name not found in any visible scope).
    pub const UNDEFINED_REFERENCE: &str = "E0001";
    /// Ambiguous reference (name declared more than once).
    pub const AMBIGUOUS_REFERENCE: &str = "E0002";
    /// Reference resolved to the wrong kind of element.
    pub const WRONG_REFERENCE_KIND: &str = "E0003";
    /// A prior segment of the qualified name failed; no scope to search.
    pub const NO_SCOPE: &str = "E0004";
    /// Invalid import statement.
    pub const INVALID_IMPORT: &str = "E0005";

    // ========================================================================
    // WARNINGS (W0001-W0099)
    // ========================================================================

    /// Unused import.
    pub const UNUSED_IMPORT: &str = "W0001";
}
