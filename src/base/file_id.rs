//! Interned document identifiers.

/// Identifies a document in the workspace.
///
/// Allocated monotonically by the workspace; never reused within a session,
/// so a stale `FileId` can be detected rather than silently aliased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(u32);

impl FileId {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

/// The surface language of a document.
///
/// KerML documents carry the kernel language; SysML documents the systems
/// language built on it. The global index prefers same-language entries when
/// two documents export the same top-level name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lang {
    KerML,
    SysML,
}

impl Lang {
    /// Language from a file extension, defaulting to KerML.
    pub fn from_extension(path: &str) -> Self {
        if path.ends_with(".sysml") {
            Lang::SysML
        } else {
            Lang::KerML
        }
    }
}
