//! Foundation types for the sysmod engine.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`FileId`], [`Lang`] - Document identity and surface language
//! - [`Position`], [`Span`] - Line/column positions for AST nodes
//! - [`Name`] - Element names (SmolStr-backed)
//! - [`CancelToken`], [`Cancelled`] - Cooperative cancellation
//!
//! This module has NO dependencies on other sysmod modules.

mod cancel;
mod file_id;
mod names;
mod position;

pub use cancel::{CancelToken, Cancelled};
pub use file_id::{FileId, Lang};
pub use names::{Name, is_basic_name, join_qualified, sanitize_name};
pub use position::{Position, Span};

// Re-export text-size types for convenience
pub use text_size::{TextRange, TextSize};
