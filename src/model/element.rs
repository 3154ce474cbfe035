//! Element data — the nodes of the metamodel ownership tree.
//!
//! Every parsed construct becomes one [`ElementData`] in the arena. Instead
//! of a class hierarchy, structural categories are a closed [`ElementKind`]
//! enumeration with predicate methods, and the per-category payloads
//! ([`RelationshipData`], [`MembershipData`], [`ImportData`], [`TypeData`],
//! [`FeatureData`]) compose on the one concrete struct. A capability is
//! present exactly when the kind predicate says it must be.

use std::sync::Arc;

use crate::base::{FileId, Name, Span};

/// Identifier of an element in the arena. Monotonic per model, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub(crate) u32);

impl ElementId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The closed set of grammatical/structural kinds.
///
/// Dispatch is always a match over this enum; there is no open registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    // Namespaces
    Namespace,
    Package,
    // Types
    Type,
    Classifier,
    Class,
    Structure,
    DataType,
    Association,
    AssociationStructure,
    // Features (features are types; types are namespaces)
    Feature,
    Connector,
    // Memberships and imports
    Membership,
    Import,
    // Heritage relationships
    Specialization,
    Subsetting,
    Redefinition,
    FeatureTyping,
    Conjugation,
    // Non-heritage type relationships
    Disjoining,
    Unioning,
    Intersecting,
    Differencing,
}

impl ElementKind {
    /// Namespaces own memberships and imports. All types are namespaces.
    pub fn is_namespace(self) -> bool {
        matches!(self, ElementKind::Namespace | ElementKind::Package) || self.is_type()
    }

    /// Types carry heritage and classifier flags. All features are types.
    pub fn is_type(self) -> bool {
        matches!(
            self,
            ElementKind::Type
                | ElementKind::Classifier
                | ElementKind::Class
                | ElementKind::Structure
                | ElementKind::DataType
                | ElementKind::Association
                | ElementKind::AssociationStructure
        ) || self.is_feature()
    }

    pub fn is_classifier(self) -> bool {
        matches!(
            self,
            ElementKind::Classifier
                | ElementKind::Class
                | ElementKind::Structure
                | ElementKind::DataType
                | ElementKind::Association
                | ElementKind::AssociationStructure
        )
    }

    pub fn is_feature(self) -> bool {
        matches!(self, ElementKind::Feature | ElementKind::Connector)
    }

    pub fn is_membership(self) -> bool {
        matches!(self, ElementKind::Membership)
    }

    pub fn is_import(self) -> bool {
        matches!(self, ElementKind::Import)
    }

    pub fn is_heritage(self) -> bool {
        HeritageKind::of(self).is_some()
    }

    pub fn is_type_relationship(self) -> bool {
        matches!(
            self,
            ElementKind::Disjoining
                | ElementKind::Unioning
                | ElementKind::Intersecting
                | ElementKind::Differencing
        )
    }

    /// Directed edges: memberships, imports, heritage, type relationships.
    pub fn is_relationship(self) -> bool {
        self.is_membership() || self.is_import() || self.is_heritage() || self.is_type_relationship()
    }

    /// Human-readable label for diagnostics.
    pub fn display(self) -> &'static str {
        match self {
            ElementKind::Namespace => "namespace",
            ElementKind::Package => "package",
            ElementKind::Type => "type",
            ElementKind::Classifier => "classifier",
            ElementKind::Class => "class",
            ElementKind::Structure => "struct",
            ElementKind::DataType => "datatype",
            ElementKind::Association => "association",
            ElementKind::AssociationStructure => "association struct",
            ElementKind::Feature => "feature",
            ElementKind::Connector => "connector",
            ElementKind::Membership => "membership",
            ElementKind::Import => "import",
            ElementKind::Specialization => "specialization",
            ElementKind::Subsetting => "subsetting",
            ElementKind::Redefinition => "redefinition",
            ElementKind::FeatureTyping => "feature typing",
            ElementKind::Conjugation => "conjugation",
            ElementKind::Disjoining => "disjoining",
            ElementKind::Unioning => "unioning",
            ElementKind::Intersecting => "intersecting",
            ElementKind::Differencing => "differencing",
        }
    }
}

/// Heritage edge kinds, used as bucket keys by the inheritance engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeritageKind {
    Specialization,
    Subsetting,
    Redefinition,
    FeatureTyping,
    Conjugation,
}

impl HeritageKind {
    pub fn of(kind: ElementKind) -> Option<Self> {
        match kind {
            ElementKind::Specialization => Some(HeritageKind::Specialization),
            ElementKind::Subsetting => Some(HeritageKind::Subsetting),
            ElementKind::Redefinition => Some(HeritageKind::Redefinition),
            ElementKind::FeatureTyping => Some(HeritageKind::FeatureTyping),
            ElementKind::Conjugation => Some(HeritageKind::Conjugation),
            _ => None,
        }
    }

    pub fn element_kind(self) -> ElementKind {
        match self {
            HeritageKind::Specialization => ElementKind::Specialization,
            HeritageKind::Subsetting => ElementKind::Subsetting,
            HeritageKind::Redefinition => ElementKind::Redefinition,
            HeritageKind::FeatureTyping => ElementKind::FeatureTyping,
            HeritageKind::Conjugation => ElementKind::Conjugation,
        }
    }

    /// Kinds that contribute supertypes for `specializes` queries.
    ///
    /// Subsetting and redefinition specialize *features*, not supertypes;
    /// conjugation is unwrapped separately by delegating to the original.
    pub fn is_supertype_kind(self) -> bool {
        matches!(self, HeritageKind::Specialization | HeritageKind::FeatureTyping)
    }
}

/// Member visibility. The ordinal ordering (`public < protected < private`)
/// is what scope filtering compares against a ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

impl Visibility {
    pub fn display(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        }
    }
}

/// Feature direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    None,
    In,
    Out,
    Inout,
}

impl Direction {
    /// Direction as seen across a conjugation boundary.
    pub fn conjugated(self) -> Self {
        match self {
            Direction::In => Direction::Out,
            Direction::Out => Direction::In,
            other => other,
        }
    }
}

/// Structural-category bit flags derived from the heritage graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassifierFlags(u8);

impl ClassifierFlags {
    pub const CLASS: ClassifierFlags = ClassifierFlags(1);
    pub const STRUCTURE: ClassifierFlags = ClassifierFlags(1 << 1);
    pub const DATA_TYPE: ClassifierFlags = ClassifierFlags(1 << 2);
    pub const ASSOCIATION: ClassifierFlags = ClassifierFlags(1 << 3);
    pub const ASSOCIATION_STRUCT: ClassifierFlags = ClassifierFlags(1 << 4);

    pub const fn empty() -> Self {
        ClassifierFlags(0)
    }

    pub fn insert(&mut self, other: ClassifierFlags) {
        self.0 |= other.0;
    }

    pub fn contains(self, other: ClassifierFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// The flag contributed directly by an element kind.
    pub fn from_kind(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Class => Self::CLASS,
            ElementKind::Structure => {
                let mut f = Self::CLASS;
                f.insert(Self::STRUCTURE);
                f
            }
            ElementKind::DataType => Self::DATA_TYPE,
            ElementKind::Association => Self::ASSOCIATION,
            ElementKind::AssociationStructure => {
                let mut f = Self::ASSOCIATION;
                f.insert(Self::STRUCTURE);
                f.insert(Self::CLASS);
                f.insert(Self::ASSOCIATION_STRUCT);
                f
            }
            _ => Self::empty(),
        }
    }
}

/// What a reference position is allowed to resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpectedKind {
    /// Any element.
    Any,
    /// A namespace (wildcard import target).
    Namespace,
    /// A type (specialization/typing target).
    Type,
    /// A feature (subsetting/redefinition target).
    Feature,
    /// A membership itself (non-wildcard import target).
    Membership,
}

impl ExpectedKind {
    pub fn accepts(self, kind: ElementKind) -> bool {
        match self {
            ExpectedKind::Any => true,
            ExpectedKind::Namespace => kind.is_namespace(),
            ExpectedKind::Type => kind.is_type(),
            ExpectedKind::Feature => kind.is_feature(),
            // Membership expectations are checked against the membership
            // element, before alias unwrapping.
            ExpectedKind::Membership => kind.is_membership(),
        }
    }

    pub fn display(self) -> &'static str {
        match self {
            ExpectedKind::Any => "element",
            ExpectedKind::Namespace => "namespace",
            ExpectedKind::Type => "type",
            ExpectedKind::Feature => "feature",
            ExpectedKind::Membership => "membership",
        }
    }
}

/// Resolution state of a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefStatus {
    /// Not yet attempted, or awaiting another sweep.
    #[default]
    Pending,
    /// Every segment resolved.
    Resolved,
    /// Resolution failed; a linking error is recorded on the reference.
    Failed,
}

/// One segment of a qualified-name reference.
#[derive(Debug, Clone)]
pub struct RefSegment {
    pub name: Name,
    pub span: Span,
    /// Feature-chain step (`a.b`) rather than namespace step (`A::b`).
    pub via_dot: bool,
    pub resolved: Option<ElementId>,
}

/// A qualified-name reference carried by a relationship element.
///
/// Segments link independently, left to right; the resolved terminal is
/// cached here so repeat queries are O(1).
#[derive(Debug, Clone)]
pub struct QualifiedRef {
    pub segments: Vec<RefSegment>,
    pub expected: ExpectedKind,
    pub status: RefStatus,
}

impl QualifiedRef {
    pub fn new(segments: Vec<RefSegment>, expected: ExpectedKind) -> Self {
        Self {
            segments,
            expected,
            status: RefStatus::Pending,
        }
    }

    /// The resolved terminal element, if linking has succeeded.
    pub fn target(&self) -> Option<ElementId> {
        if self.status == RefStatus::Resolved {
            self.segments.last().and_then(|s| s.resolved)
        } else {
            None
        }
    }

    /// Reset to the pre-linking state.
    pub fn reset(&mut self) {
        self.status = RefStatus::Pending;
        for seg in &mut self.segments {
            seg.resolved = None;
        }
    }

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

/// Relationship payload: a directed edge in the model.
#[derive(Debug, Clone, Default)]
pub struct RelationshipData {
    /// Near end; defaults to the owning element.
    pub source: Option<ElementId>,
    /// Far end, when it needs linking. Owning memberships have no reference:
    /// their target is the owned element itself.
    pub reference: Option<QualifiedRef>,
    /// Synthesized by the system (implicit supertype), not written by the user.
    pub is_implied: bool,
}

/// Membership payload.
#[derive(Debug, Clone, Default)]
pub struct MembershipData {
    /// Alias memberships carry their own name and a reference; owning
    /// memberships own their member element directly.
    pub is_alias: bool,
}

/// Import payload.
#[derive(Debug, Clone, Default)]
pub struct ImportData {
    /// `::*` — the whole target namespace's contents are imported.
    pub imports_all: bool,
    /// `::**` — nested namespaces' contents are visible too.
    pub is_recursive: bool,
}

/// Type payload: heritage and type-relationship edge lists, both ordered
/// as declared, plus derived classifier flags.
#[derive(Debug, Clone, Default)]
pub struct TypeData {
    pub heritage: Vec<ElementId>,
    pub type_relationships: Vec<ElementId>,
    pub classifier_flags: ClassifierFlags,
}

/// Multiplicity bounds; `upper == None` is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Multiplicity {
    pub lower: u32,
    pub upper: Option<u32>,
}

/// A bound feature value; raw text only, evaluation happens elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureValue {
    pub text: String,
}

/// Feature payload.
#[derive(Debug, Clone, Default)]
pub struct FeatureData {
    pub direction: Direction,
    pub is_composite: bool,
    pub is_derived: bool,
    pub is_readonly: bool,
    pub is_end: bool,
    pub is_portion: bool,
    pub is_ordered: bool,
    pub is_nonunique: bool,
    pub multiplicity: Option<Multiplicity>,
    pub value: Option<FeatureValue>,
}

/// One node of the model tree.
#[derive(Debug, Clone)]
pub struct ElementData {
    pub id: ElementId,
    pub kind: ElementKind,
    pub name: Option<Name>,
    pub short_name: Option<Name>,
    /// Name inherited through redefinition when the element itself is
    /// unnamed. Assigned during linking.
    pub implicit_name: Option<Name>,
    pub owner: Option<ElementId>,
    /// Order-preserving; includes memberships, imports, and heritage edges.
    pub children: Vec<ElementId>,
    pub document: FileId,
    pub visibility: Visibility,
    pub is_library: bool,
    pub is_abstract: bool,
    pub declared_span: Span,
    /// Derived from the owner chain; cached by the arena's reindex pass.
    pub qualified_name: Option<Arc<str>>,

    // Capability payloads (see module docs).
    pub rel: Option<RelationshipData>,
    pub membership: Option<MembershipData>,
    pub import: Option<ImportData>,
    pub ty: Option<TypeData>,
    pub feature: Option<FeatureData>,
}

impl ElementData {
    pub(crate) fn new(id: ElementId, kind: ElementKind, document: FileId) -> Self {
        let rel = kind.is_relationship().then(RelationshipData::default);
        let membership = kind.is_membership().then(MembershipData::default);
        let import = kind.is_import().then(ImportData::default);
        let ty = kind.is_type().then(TypeData::default);
        let feature = kind.is_feature().then(FeatureData::default);
        Self {
            id,
            kind,
            name: None,
            short_name: None,
            implicit_name: None,
            owner: None,
            children: Vec::new(),
            document,
            visibility: Visibility::default(),
            is_library: false,
            is_abstract: false,
            declared_span: Span::default(),
            qualified_name: None,
            rel,
            membership,
            import,
            ty,
            feature,
        }
    }

    /// Declared name, falling back to a redefinition-inherited one.
    pub fn effective_name(&self) -> Option<&Name> {
        self.name.as_ref().or(self.implicit_name.as_ref())
    }

    /// The relationship's resolved far end, if any.
    pub fn resolved_target(&self) -> Option<ElementId> {
        self.rel.as_ref()?.reference.as_ref()?.target()
    }
}
