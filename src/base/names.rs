//! Element names.
//!
//! Declared names come in two lexical forms: plain identifiers and quoted
//! unrestricted names (`'door assembly'`). Both map to the same [`Name`]
//! value; the quotes are part of the concrete syntax only.

use smol_str::SmolStr;

/// An element name. Cheap to clone, compared by value.
pub type Name = SmolStr;

/// Strip the quotes from an unrestricted name token, or intern a plain
/// identifier as-is.
///
/// Returns `None` for quoted names whose body is empty or contains characters
/// that cannot appear in any name form.
pub fn sanitize_name(raw: &str) -> Option<Name> {
    if let Some(body) = raw.strip_prefix('\'') {
        let body = body.strip_suffix('\'').unwrap_or(body);
        if body.is_empty() || body.chars().any(|c| c == '\'' || c.is_control()) {
            return None;
        }
        return Some(Name::from(body));
    }
    Some(Name::from(raw))
}

/// Check whether `text` is a valid plain identifier (no quoting needed).
pub fn is_basic_name(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if unicode_ident::is_xid_start(c) || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| unicode_ident::is_xid_continue(c))
}

/// Join qualified-name segments with the `::` separator.
pub fn join_qualified(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{}::{}", parent, child)
    }
}
