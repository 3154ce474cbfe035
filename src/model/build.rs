//! Metamodel build — wrapping the AST into arena elements.
//!
//! Pure construction: every declaration becomes an element owned through a
//! membership, every clause with a target becomes a relationship element
//! carrying an unresolved [`QualifiedRef`]. Linking happens later; the build
//! pass never resolves names, with one exception — implicit supertype
//! injection pre-resolves its edges against the library index because the
//! targets are well-known roots, not user references.

use tracing::{debug, trace};

use crate::base::{FileId, Lang};
use crate::model::arena::{MemberLookup, Model};
use crate::model::element::{
    Direction, ElementId, ElementKind, ExpectedKind, FeatureValue, Multiplicity, QualifiedRef,
    RefSegment, RefStatus, Visibility,
};
use crate::parser::{
    AstAlias, AstDecl, AstDirection, AstHeritage, AstHeritageKind, AstImport, AstMember,
    AstQualifiedName, AstTypeRelKind, AstVisibility, DeclKind, SourceFile,
};
use crate::scope::GlobalScope;

/// Build one parsed document into the model, returning its root namespace.
pub fn build_document(
    model: &mut Model,
    document: FileId,
    lang: Lang,
    file: &SourceFile,
) -> ElementId {
    let root = model.alloc(ElementKind::Namespace, document);
    model.set_root(document, lang, root);
    let mut builder = Builder { model, document };
    for member in &file.members {
        builder.build_member(root, member, false);
    }
    debug!("[BUILD] document {:?} built", document);
    root
}

struct Builder<'a> {
    model: &'a mut Model,
    document: FileId,
}

impl Builder<'_> {
    fn build_member(&mut self, ns: ElementId, member: &AstMember, in_library: bool) {
        match member {
            AstMember::Decl(decl) => self.build_decl(ns, decl, in_library),
            AstMember::Import(import) => self.build_import(ns, import),
            AstMember::Alias(alias) => self.build_alias(ns, alias),
        }
    }

    fn build_decl(&mut self, ns: ElementId, decl: &AstDecl, in_library: bool) {
        let kind = element_kind(decl.kind);
        let is_library = in_library || decl.is_library;

        let membership = self.model.alloc(ElementKind::Membership, self.document);
        {
            let m = self.model.element_mut(membership);
            m.visibility = visibility(decl.visibility);
            m.declared_span = decl.span;
        }

        let element = self.model.alloc(kind, self.document);
        {
            let e = self.model.element_mut(element);
            e.name = decl.name.clone();
            e.short_name = decl.short_name.clone();
            e.visibility = visibility(decl.visibility);
            e.is_abstract = decl.is_abstract;
            e.is_library = is_library;
            e.declared_span = decl.span;
            if let Some(f) = e.feature.as_mut() {
                f.direction = direction(decl.direction);
                f.is_readonly = decl.modifiers.readonly;
                f.is_derived = decl.modifiers.derived;
                f.is_composite = decl.modifiers.composite;
                f.is_portion = decl.modifiers.portion;
                f.is_end = decl.modifiers.end;
                f.is_ordered = decl.modifiers.ordered;
                f.is_nonunique = decl.modifiers.nonunique;
                f.multiplicity = decl.multiplicity.map(|m| Multiplicity {
                    lower: m.lower,
                    upper: m.upper,
                });
                f.value = decl.value.clone().map(|text| FeatureValue { text });
            }
        }

        self.model.attach(ns, membership);
        self.model.attach(membership, element);

        // Heritage and type relationships only exist on types; clauses the
        // parser accepted on other kinds are dropped here.
        if kind.is_type() {
            for clause in &decl.heritage {
                self.build_heritage(element, clause);
            }
            for rel in &decl.type_relationships {
                let kind = match rel.kind {
                    AstTypeRelKind::DisjointFrom => ElementKind::Disjoining,
                    AstTypeRelKind::Unions => ElementKind::Unioning,
                    AstTypeRelKind::Intersects => ElementKind::Intersecting,
                    AstTypeRelKind::Differences => ElementKind::Differencing,
                };
                let edge = self.model.alloc(kind, self.document);
                {
                    let e = self.model.element_mut(edge);
                    let r = e.rel.as_mut().unwrap();
                    r.source = Some(element);
                    r.reference = Some(reference(&rel.target, ExpectedKind::Type));
                }
                self.model.attach_type_relationship(element, edge);
            }
        }

        for member in &decl.members {
            self.build_member(element, member, is_library);
        }
    }

    fn build_heritage(&mut self, owner: ElementId, clause: &AstHeritage) {
        let owner_is_feature = self.model.element(owner).kind.is_feature();
        let (kind, expected) = match clause.kind {
            AstHeritageKind::Specializes => (ElementKind::Specialization, ExpectedKind::Type),
            AstHeritageKind::Subsets => (ElementKind::Subsetting, ExpectedKind::Feature),
            AstHeritageKind::Redefines if owner_is_feature => {
                (ElementKind::Redefinition, ExpectedKind::Feature)
            }
            AstHeritageKind::Redefines => (ElementKind::Redefinition, ExpectedKind::Type),
            AstHeritageKind::Conjugates => (ElementKind::Conjugation, ExpectedKind::Type),
            AstHeritageKind::TypedBy => (ElementKind::FeatureTyping, ExpectedKind::Type),
        };
        let edge = self.model.alloc(kind, self.document);
        {
            let e = self.model.element_mut(edge);
            let r = e.rel.as_mut().unwrap();
            r.source = Some(owner);
            r.reference = Some(reference(&clause.target, expected));
        }
        self.model.attach_heritage(owner, edge);
        trace!(
            "[BUILD] heritage {:?} on {:?} -> {}",
            kind,
            owner,
            clause.target.display()
        );
    }

    fn build_import(&mut self, ns: ElementId, import: &AstImport) {
        let expected = if import.wildcard {
            ExpectedKind::Namespace
        } else {
            ExpectedKind::Membership
        };
        let edge = self.model.alloc(ElementKind::Import, self.document);
        {
            let e = self.model.element_mut(edge);
            e.visibility = visibility_or(import.visibility, Visibility::Private);
            e.declared_span = import.span;
            let data = e.import.as_mut().unwrap();
            data.imports_all = import.wildcard;
            data.is_recursive = import.recursive;
            let r = e.rel.as_mut().unwrap();
            r.source = Some(ns);
            r.reference = Some(reference(&import.target, expected));
        }
        self.model.attach(ns, edge);
    }

    fn build_alias(&mut self, ns: ElementId, alias: &AstAlias) {
        let membership = self.model.alloc(ElementKind::Membership, self.document);
        {
            let e = self.model.element_mut(membership);
            e.name = Some(alias.name.clone());
            e.short_name = alias.short_name.clone();
            e.visibility = visibility(alias.visibility);
            e.declared_span = alias.span;
            e.membership.as_mut().unwrap().is_alias = true;
            let r = e.rel.as_mut().unwrap();
            r.source = Some(ns);
            r.reference = Some(reference(&alias.target, ExpectedKind::Any));
        }
        self.model.attach(ns, membership);
    }
}

fn element_kind(kind: DeclKind) -> ElementKind {
    match kind {
        DeclKind::Package => ElementKind::Package,
        DeclKind::Type => ElementKind::Type,
        DeclKind::Classifier => ElementKind::Classifier,
        DeclKind::Class => ElementKind::Class,
        DeclKind::Structure => ElementKind::Structure,
        DeclKind::DataType => ElementKind::DataType,
        DeclKind::Association => ElementKind::Association,
        DeclKind::AssociationStructure => ElementKind::AssociationStructure,
        DeclKind::Feature => ElementKind::Feature,
        DeclKind::Connector => ElementKind::Connector,
    }
}

fn visibility(vis: Option<AstVisibility>) -> Visibility {
    visibility_or(vis, Visibility::Public)
}

fn visibility_or(vis: Option<AstVisibility>, default: Visibility) -> Visibility {
    match vis {
        Some(AstVisibility::Public) => Visibility::Public,
        Some(AstVisibility::Protected) => Visibility::Protected,
        Some(AstVisibility::Private) => Visibility::Private,
        None => default,
    }
}

fn direction(dir: Option<AstDirection>) -> Direction {
    match dir {
        Some(AstDirection::In) => Direction::In,
        Some(AstDirection::Out) => Direction::Out,
        Some(AstDirection::Inout) => Direction::Inout,
        None => Direction::None,
    }
}

fn reference(target: &AstQualifiedName, expected: ExpectedKind) -> QualifiedRef {
    QualifiedRef::new(
        target
            .segments
            .iter()
            .map(|seg| RefSegment {
                name: seg.name.clone(),
                span: seg.span,
                via_dot: seg.via_dot,
                resolved: None,
            })
            .collect(),
        expected,
    )
}

// ============================================================================
// IMPLICIT SUPERTYPES
// ============================================================================

/// The well-known library root each structural category defaults to.
fn implicit_supertype_name(kind: ElementKind) -> Option<&'static str> {
    match kind {
        ElementKind::Type | ElementKind::Classifier | ElementKind::Class => Some("Base::Anything"),
        ElementKind::Structure => Some("Objects::Object"),
        ElementKind::DataType => Some("Base::DataValue"),
        ElementKind::Association => Some("Links::Link"),
        ElementKind::AssociationStructure => Some("Objects::LinkObject"),
        ElementKind::Feature => Some("Base::things"),
        ElementKind::Connector => Some("Links::links"),
        _ => None,
    }
}

/// Resolve a `::`-separated qualified name against the global index:
/// first segment through the static exports, the rest through member
/// lookup, alias chains unwrapped at every step.
pub fn resolve_qualified(model: &Model, global: &GlobalScope, qname: &str) -> Option<ElementId> {
    let mut segments = qname.split("::");
    let first = segments.next()?;
    let membership = global.static_lookup(model, first)?;
    let mut current = model.terminal_element(membership)?;
    for segment in segments {
        let membership = match model.find_member(current, segment) {
            MemberLookup::Found(m) => m,
            _ => return None,
        };
        current = model.terminal_element(membership)?;
    }
    Some(current)
}

/// Inject the implicit supertype edge for every type with no declared
/// heritage. Runs once per element: types that already carry heritage
/// (declared or previously injected) are left alone.
///
/// Injection is skipped silently when the well-known root is not present in
/// the index (no library documents loaded).
pub fn inject_implicit_supertypes(model: &mut Model, global: &GlobalScope) {
    let candidates: Vec<ElementId> = model
        .iter_alive()
        .filter(|e| e.kind.is_type())
        .filter(|e| e.ty.as_ref().is_some_and(|t| t.heritage.is_empty()))
        .map(|e| e.id)
        .collect();

    for id in candidates {
        let kind = model.element(id).kind;
        let Some(root_name) = implicit_supertype_name(kind) else {
            continue;
        };
        let Some(target) = resolve_qualified(model, global, root_name) else {
            trace!("[BUILD] no library root {root_name}; skipping implicit supertype");
            continue;
        };
        if target == id {
            // The library root itself.
            continue;
        }
        let document = model.element(id).document;
        let edge = model.alloc(ElementKind::Specialization, document);
        {
            let e = model.element_mut(edge);
            let r = e.rel.as_mut().unwrap();
            r.source = Some(id);
            r.is_implied = true;
            let last = root_name.rsplit("::").next().unwrap_or(root_name);
            let mut reference = QualifiedRef::new(
                vec![RefSegment {
                    name: crate::base::Name::from(last),
                    span: Default::default(),
                    via_dot: false,
                    resolved: Some(target),
                }],
                ExpectedKind::Type,
            );
            reference.status = RefStatus::Resolved;
            r.reference = Some(reference);
        }
        model.attach_heritage(id, edge);
        debug!("[BUILD] implied supertype {root_name} on {:?}", id);
    }
}
