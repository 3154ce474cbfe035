//! AST types for the KerML/SysML textual subset.
//!
//! The parser produces this plain typed tree directly; there is no lossless
//! CST layer. Each node keeps the [`Span`] of its declaration so diagnostics
//! can be mapped back to source text by a presentation layer.

use crate::base::{Name, Span};

/// A parsed source file: the root namespace's member list.
#[derive(Debug, Clone, Default)]
pub struct SourceFile {
    pub members: Vec<AstMember>,
}

/// Anything that can appear in a namespace body.
#[derive(Debug, Clone)]
pub enum AstMember {
    Decl(AstDecl),
    Import(AstImport),
    Alias(AstAlias),
}

impl AstMember {
    pub fn span(&self) -> Span {
        match self {
            AstMember::Decl(d) => d.span,
            AstMember::Import(i) => i.span,
            AstMember::Alias(a) => a.span,
        }
    }
}

/// Declaration keyword → structural category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Package,
    Type,
    Classifier,
    Class,
    Structure,
    DataType,
    Association,
    AssociationStructure,
    Feature,
    Connector,
}

impl DeclKind {
    /// True for kinds that declare features (direction/modifiers apply).
    pub fn is_feature(self) -> bool {
        matches!(self, DeclKind::Feature | DeclKind::Connector)
    }
}

/// Visibility prefix as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AstVisibility {
    Public,
    Protected,
    Private,
}

/// Feature direction prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AstDirection {
    In,
    Out,
    Inout,
}

/// Feature modifier flags, all defaulting to off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AstFeatureModifiers {
    pub readonly: bool,
    pub derived: bool,
    pub composite: bool,
    pub portion: bool,
    pub end: bool,
    pub ordered: bool,
    pub nonunique: bool,
}

/// Multiplicity bounds; `upper == None` means unbounded (`*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AstMultiplicity {
    pub lower: u32,
    pub upper: Option<u32>,
}

/// One segment of a (possibly chained) qualified name.
///
/// `via_dot` marks feature-chain segments (`a.b`) as opposed to namespace
/// qualification (`A::b`); resolution treats both as member steps but the
/// distinction is preserved for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstSegment {
    pub name: Name,
    pub span: Span,
    pub via_dot: bool,
}

/// A qualified name reference as written in source.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AstQualifiedName {
    pub segments: Vec<AstSegment>,
}

impl AstQualifiedName {
    /// The textual form, for logs and error messages.
    pub fn display(&self) -> String {
        let mut out = String::new();
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                out.push_str(if seg.via_dot { "." } else { "::" });
            }
            out.push_str(&seg.name);
        }
        out
    }
}

/// Heritage clause kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AstHeritageKind {
    /// `:>` / `specializes` on a type
    Specializes,
    /// `:>` / `subsets` on a feature
    Subsets,
    /// `:>>` / `redefines`
    Redefines,
    /// `~` / `conjugates`
    Conjugates,
    /// `: T` on a feature
    TypedBy,
}

/// One heritage clause target.
#[derive(Debug, Clone)]
pub struct AstHeritage {
    pub kind: AstHeritageKind,
    pub target: AstQualifiedName,
}

/// Non-heritage type relationship kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AstTypeRelKind {
    DisjointFrom,
    Unions,
    Intersects,
    Differences,
}

/// One type-relationship clause target.
#[derive(Debug, Clone)]
pub struct AstTypeRel {
    pub kind: AstTypeRelKind,
    pub target: AstQualifiedName,
}

/// A declaration: `class Vehicle :> Base { ... }` and friends.
#[derive(Debug, Clone)]
pub struct AstDecl {
    pub kind: DeclKind,
    pub visibility: Option<AstVisibility>,
    pub is_abstract: bool,
    /// Set by `library package` (and `standard library package`).
    pub is_library: bool,
    pub direction: Option<AstDirection>,
    pub modifiers: AstFeatureModifiers,
    pub name: Option<Name>,
    pub short_name: Option<Name>,
    pub heritage: Vec<AstHeritage>,
    pub type_relationships: Vec<AstTypeRel>,
    pub multiplicity: Option<AstMultiplicity>,
    /// Raw token text of a `= value` clause; not evaluated here.
    pub value: Option<String>,
    pub members: Vec<AstMember>,
    pub span: Span,
}

/// An import statement.
#[derive(Debug, Clone)]
pub struct AstImport {
    pub visibility: Option<AstVisibility>,
    pub target: AstQualifiedName,
    /// `::*` — import the whole namespace's contents.
    pub wildcard: bool,
    /// `::**` — also expose nested namespaces' contents.
    pub recursive: bool,
    pub span: Span,
}

/// `alias B for A;`
#[derive(Debug, Clone)]
pub struct AstAlias {
    pub visibility: Option<AstVisibility>,
    pub name: Name,
    pub short_name: Option<Name>,
    pub target: AstQualifiedName,
    pub span: Span,
}
