//! # sysmod
//!
//! Metamodel, scope resolution, and reference linking engine for KerML and
//! SysML v2 textual models.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! workspace → document management, linking driver, query surface
//!   ↓
//! linker    → qualified-name resolution, alias chains, link errors
//!   ↓
//! scope     → lazy composable scope tree, global export index
//!   ↓
//! model     → element arena, metamodel build, inheritance engine
//!   ↓
//! parser    → Logos lexer, recursive-descent parser, AST
//!   ↓
//! base      → primitives (FileId, Name, Span, cancellation)
//! ```
//!
//! `diagnostics` sits beside `linker`: structural error records a
//! presentation layer maps back to source text.

// ============================================================================
// MODULES (dependency order: base → parser → model → scope → linker → workspace)
// ============================================================================

/// Foundation types: FileId, Name, Span, cancellation
pub mod base;

/// Parser: Logos lexer, recursive-descent parser, AST
pub mod parser;

/// Element model: arena, metamodel build, inheritance engine
pub mod model;

/// Scope model: lazy composable scope tree, global export index
pub mod scope;

/// Linker: qualified-name resolution, typed link errors
pub mod linker;

/// Diagnostics: structural error records and codes
pub mod diagnostics;

/// Workspace: document management and the query surface
pub mod workspace;

// Re-export foundation types
pub use base::{CancelToken, Cancelled, FileId, Lang, Name, Position, Span};

// Re-export the main entry points
pub use workspace::Workspace;
