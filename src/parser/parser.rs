//! Recursive descent parser for the KerML/SysML textual subset.
//!
//! Builds the typed AST directly from tokens. Supports error recovery:
//! a malformed member is skipped to the next `;` or closing `}` and the
//! parse continues.

use super::ast::*;
use super::lexer::{Lexer, Token, TokenKind};
use crate::base::{Name, Position, Span, sanitize_name};

/// Parse result containing the AST and any errors.
#[derive(Debug, Clone)]
pub struct Parse {
    pub file: SourceFile,
    pub errors: Vec<ParseError>,
}

impl Parse {
    /// Check if parsing succeeded without errors.
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A syntax error with location and message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// Parse source text into an AST.
pub fn parse(input: &str) -> Parse {
    let tokens: Vec<_> = Lexer::new(input)
        .filter(|t| !t.kind.is_trivia())
        .collect();
    let mut parser = Parser::new(&tokens);
    let file = parser.parse_source_file();
    Parse {
        file,
        errors: parser.errors,
    }
}

/// The parser state.
struct Parser<'a> {
    tokens: &'a [Token<'a>],
    pos: usize,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token<'a>]) -> Self {
        Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
        }
    }

    // =========================================================================
    // Token inspection
    // =========================================================================

    fn current(&self) -> Option<&'a Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn current_kind(&self) -> Option<TokenKind> {
        self.current().map(|t| t.kind)
    }

    fn current_pos(&self) -> Position {
        self.current()
            .map(|t| t.pos)
            .or_else(|| self.tokens.last().map(|t| t.pos))
            .unwrap_or_default()
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current_kind() == Some(kind)
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn nth(&self, n: usize) -> Option<TokenKind> {
        self.tokens.get(self.pos + n).map(|t| t.kind)
    }

    // =========================================================================
    // Token consumption
    // =========================================================================

    fn bump(&mut self) -> Option<&'a Token<'a>> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> bool {
        if self.eat(kind) {
            true
        } else {
            self.error_here(format!(
                "expected {}, found {}",
                kind.display(),
                self.current_kind()
                    .map(TokenKind::display)
                    .unwrap_or("end of file")
            ));
            false
        }
    }

    fn error_here(&mut self, message: impl Into<String>) {
        let pos = self.current_pos();
        self.errors
            .push(ParseError::new(message, Span::new(pos, pos)));
    }

    /// Skip to the next member boundary: past the next `;`, or up to a
    /// closing `}` (left for the caller), balancing nested braces.
    fn recover_member(&mut self) {
        let mut depth = 0usize;
        while let Some(kind) = self.current_kind() {
            match kind {
                TokenKind::Semicolon if depth == 0 => {
                    self.pos += 1;
                    return;
                }
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                }
                _ => {}
            }
            self.pos += 1;
        }
    }

    // =========================================================================
    // Names
    // =========================================================================

    fn parse_name(&mut self) -> Option<Name> {
        if self.current_kind().is_some_and(TokenKind::is_name) {
            let raw = self.bump().unwrap().text;
            let name = sanitize_name(raw);
            if name.is_none() {
                self.error_here(format!("invalid name {raw}"));
            }
            name
        } else {
            None
        }
    }

    /// `<sn>` short name clause.
    fn parse_short_name(&mut self) -> Option<Name> {
        if !self.at(TokenKind::Lt) {
            return None;
        }
        self.pos += 1;
        let name = self.parse_name();
        if name.is_none() {
            self.error_here("expected a short name after `<`");
        }
        self.expect(TokenKind::Gt);
        name
    }

    fn parse_qualified_name(&mut self) -> Option<AstQualifiedName> {
        let mut qn = AstQualifiedName::default();
        let mut via_dot = false;
        loop {
            if !self.current_kind().is_some_and(TokenKind::is_name) {
                if qn.segments.is_empty() {
                    self.error_here(format!(
                        "expected a name, found {}",
                        self.current_kind()
                            .map(TokenKind::display)
                            .unwrap_or("end of file")
                    ));
                    return None;
                }
                self.error_here("expected a name segment");
                return Some(qn);
            }
            let token = self.bump().unwrap();
            let start = token.pos;
            let end = Position::new(start.line, start.column + token.text.chars().count());
            match sanitize_name(token.text) {
                Some(name) => qn.segments.push(AstSegment {
                    name,
                    span: Span::new(start, end),
                    via_dot,
                }),
                None => {
                    self.error_here(format!("invalid name {}", token.text));
                    return Some(qn);
                }
            }
            // `::*` / `::**` belong to the import statement, not the name.
            if self.at(TokenKind::ColonColon)
                && !matches!(self.nth(1), Some(TokenKind::Star | TokenKind::StarStar))
            {
                self.pos += 1;
                via_dot = false;
            } else if self.at(TokenKind::Dot) {
                self.pos += 1;
                via_dot = true;
            } else {
                return Some(qn);
            }
        }
    }

    fn parse_target_list(&mut self) -> Vec<AstQualifiedName> {
        let mut targets = Vec::new();
        loop {
            match self.parse_qualified_name() {
                Some(qn) if !qn.segments.is_empty() => targets.push(qn),
                _ => break,
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        targets
    }

    // =========================================================================
    // Source file and members
    // =========================================================================

    fn parse_source_file(&mut self) -> SourceFile {
        let mut file = SourceFile::default();
        while !self.at_eof() {
            if self.at(TokenKind::RBrace) {
                self.error_here("unmatched `}`");
                self.pos += 1;
                continue;
            }
            match self.parse_member() {
                Some(member) => file.members.push(member),
                None => self.recover_member(),
            }
        }
        file
    }

    fn parse_member(&mut self) -> Option<AstMember> {
        let visibility = self.parse_visibility();
        match self.current_kind()? {
            TokenKind::ImportKw => self.parse_import(visibility).map(AstMember::Import),
            TokenKind::AliasKw => self.parse_alias(visibility).map(AstMember::Alias),
            _ => self.parse_decl(visibility).map(AstMember::Decl),
        }
    }

    fn parse_visibility(&mut self) -> Option<AstVisibility> {
        let vis = match self.current_kind()? {
            TokenKind::PublicKw => AstVisibility::Public,
            TokenKind::PrivateKw => AstVisibility::Private,
            TokenKind::ProtectedKw => AstVisibility::Protected,
            _ => return None,
        };
        self.pos += 1;
        Some(vis)
    }

    // =========================================================================
    // Imports and aliases
    // =========================================================================

    fn parse_import(&mut self, visibility: Option<AstVisibility>) -> Option<AstImport> {
        let start = self.current_pos();
        self.expect(TokenKind::ImportKw);
        let target = self.parse_qualified_name()?;
        let mut wildcard = false;
        let mut recursive = false;
        if self.eat(TokenKind::ColonColon) {
            if self.eat(TokenKind::StarStar) {
                wildcard = true;
                recursive = true;
            } else if self.eat(TokenKind::Star) {
                wildcard = true;
            } else {
                self.error_here("expected `*` or `**` after `::` in import");
            }
        }
        let end = self.current_pos();
        if !self.expect(TokenKind::Semicolon) {
            self.recover_member();
        }
        Some(AstImport {
            visibility,
            target,
            wildcard,
            recursive,
            span: Span::new(start, end),
        })
    }

    fn parse_alias(&mut self, visibility: Option<AstVisibility>) -> Option<AstAlias> {
        let start = self.current_pos();
        self.expect(TokenKind::AliasKw);
        let short_name = self.parse_short_name();
        let name = match self.parse_name() {
            Some(name) => name,
            None => {
                self.error_here("expected an alias name");
                return None;
            }
        };
        self.expect(TokenKind::ForKw);
        let target = self.parse_qualified_name()?;
        let end = self.current_pos();
        if !self.expect(TokenKind::Semicolon) {
            self.recover_member();
        }
        Some(AstAlias {
            visibility,
            name,
            short_name,
            target,
            span: Span::new(start, end),
        })
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn parse_decl(&mut self, visibility: Option<AstVisibility>) -> Option<AstDecl> {
        let start = self.current_pos();
        let mut is_abstract = false;
        let mut is_library = false;
        let mut direction = None;
        let mut modifiers = AstFeatureModifiers::default();

        // Prefix keywords, in any order the grammar allows.
        loop {
            match self.current_kind()? {
                TokenKind::AbstractKw => {
                    self.pos += 1;
                    is_abstract = true;
                }
                TokenKind::StandardKw => {
                    self.pos += 1;
                    // `standard` only ever precedes `library`.
                    if !self.at(TokenKind::LibraryKw) {
                        self.error_here("expected `library` after `standard`");
                    }
                }
                TokenKind::LibraryKw => {
                    self.pos += 1;
                    is_library = true;
                }
                TokenKind::InKw => {
                    self.pos += 1;
                    direction = Some(AstDirection::In);
                }
                TokenKind::OutKw => {
                    self.pos += 1;
                    direction = Some(AstDirection::Out);
                }
                TokenKind::InoutKw => {
                    self.pos += 1;
                    direction = Some(AstDirection::Inout);
                }
                TokenKind::ReadonlyKw => {
                    self.pos += 1;
                    modifiers.readonly = true;
                }
                TokenKind::DerivedKw => {
                    self.pos += 1;
                    modifiers.derived = true;
                }
                TokenKind::CompositeKw => {
                    self.pos += 1;
                    modifiers.composite = true;
                }
                TokenKind::PortionKw => {
                    self.pos += 1;
                    modifiers.portion = true;
                }
                TokenKind::EndKw => {
                    self.pos += 1;
                    modifiers.end = true;
                }
                TokenKind::OrderedKw => {
                    self.pos += 1;
                    modifiers.ordered = true;
                }
                TokenKind::NonuniqueKw => {
                    self.pos += 1;
                    modifiers.nonunique = true;
                }
                _ => break,
            }
        }

        let kind = match self.current_kind()? {
            TokenKind::PackageKw => {
                self.pos += 1;
                DeclKind::Package
            }
            TokenKind::TypeKw => {
                self.pos += 1;
                DeclKind::Type
            }
            TokenKind::ClassifierKw => {
                self.pos += 1;
                DeclKind::Classifier
            }
            TokenKind::ClassKw => {
                self.pos += 1;
                DeclKind::Class
            }
            TokenKind::StructKw => {
                self.pos += 1;
                DeclKind::Structure
            }
            TokenKind::DatatypeKw => {
                self.pos += 1;
                DeclKind::DataType
            }
            TokenKind::AssocKw => {
                self.pos += 1;
                if self.eat(TokenKind::StructKw) {
                    DeclKind::AssociationStructure
                } else {
                    DeclKind::Association
                }
            }
            TokenKind::FeatureKw => {
                self.pos += 1;
                DeclKind::Feature
            }
            TokenKind::ConnectorKw => {
                self.pos += 1;
                DeclKind::Connector
            }
            other => {
                self.error_here(format!("expected a declaration, found {}", other.display()));
                return None;
            }
        };

        if is_library && kind != DeclKind::Package {
            self.error_here("`library` applies only to packages");
            is_library = false;
        }

        // `<sn>` may precede or follow the declared name.
        let mut short_name = self.parse_short_name();
        let name = self.parse_name();
        if short_name.is_none() {
            short_name = self.parse_short_name();
        }

        let multiplicity = self.parse_multiplicity();
        let heritage = self.parse_heritage_clauses(kind);
        let type_relationships = self.parse_type_rel_clauses();
        let value = self.parse_value_clause();

        let mut members = Vec::new();
        if self.eat(TokenKind::LBrace) {
            while !self.at(TokenKind::RBrace) && !self.at_eof() {
                match self.parse_member() {
                    Some(member) => members.push(member),
                    None => self.recover_member(),
                }
            }
            self.expect(TokenKind::RBrace);
        } else if !self.expect(TokenKind::Semicolon) {
            self.recover_member();
        }

        let end = self.current_pos();
        Some(AstDecl {
            kind,
            visibility,
            is_abstract,
            is_library,
            direction,
            modifiers,
            name,
            short_name,
            heritage,
            type_relationships,
            multiplicity,
            value,
            members,
            span: Span::new(start, end),
        })
    }

    fn parse_multiplicity(&mut self) -> Option<AstMultiplicity> {
        if !self.eat(TokenKind::LBracket) {
            return None;
        }
        let mult = if self.eat(TokenKind::Star) {
            AstMultiplicity {
                lower: 0,
                upper: None,
            }
        } else {
            let lower = self.parse_integer().unwrap_or_else(|| {
                self.error_here("expected a multiplicity bound");
                0
            });
            if self.eat(TokenKind::DotDot) {
                let upper = if self.eat(TokenKind::Star) {
                    None
                } else {
                    self.parse_integer()
                };
                AstMultiplicity { lower, upper }
            } else {
                AstMultiplicity {
                    lower,
                    upper: Some(lower),
                }
            }
        };
        self.expect(TokenKind::RBracket);
        Some(mult)
    }

    fn parse_integer(&mut self) -> Option<u32> {
        if self.at(TokenKind::Integer) {
            let text = self.bump().unwrap().text;
            text.parse().ok()
        } else {
            None
        }
    }

    fn parse_heritage_clauses(&mut self, decl_kind: DeclKind) -> Vec<AstHeritage> {
        let mut heritage = Vec::new();
        loop {
            let kind = match self.current_kind() {
                Some(TokenKind::ColonGt) => {
                    // `:>` is subsetting on features, specialization on types.
                    if decl_kind.is_feature() {
                        AstHeritageKind::Subsets
                    } else {
                        AstHeritageKind::Specializes
                    }
                }
                Some(TokenKind::SpecializesKw) => AstHeritageKind::Specializes,
                Some(TokenKind::SubsetsKw) => AstHeritageKind::Subsets,
                Some(TokenKind::ColonGtGt) | Some(TokenKind::RedefinesKw) => {
                    AstHeritageKind::Redefines
                }
                Some(TokenKind::Tilde) | Some(TokenKind::ConjugatesKw) => {
                    AstHeritageKind::Conjugates
                }
                Some(TokenKind::Colon) => AstHeritageKind::TypedBy,
                _ => break,
            };
            self.pos += 1;
            for target in self.parse_target_list() {
                heritage.push(AstHeritage { kind, target });
            }
        }
        heritage
    }

    fn parse_type_rel_clauses(&mut self) -> Vec<AstTypeRel> {
        let mut rels = Vec::new();
        loop {
            let kind = match self.current_kind() {
                Some(TokenKind::DisjointKw) => {
                    self.pos += 1;
                    self.expect(TokenKind::FromKw);
                    AstTypeRelKind::DisjointFrom
                }
                Some(TokenKind::UnionsKw) => {
                    self.pos += 1;
                    AstTypeRelKind::Unions
                }
                Some(TokenKind::IntersectsKw) => {
                    self.pos += 1;
                    AstTypeRelKind::Intersects
                }
                Some(TokenKind::DifferencesKw) => {
                    self.pos += 1;
                    AstTypeRelKind::Differences
                }
                _ => break,
            };
            for target in self.parse_target_list() {
                rels.push(AstTypeRel { kind, target });
            }
        }
        rels
    }

    /// `= <raw tokens>` — captured verbatim, evaluation is out of scope.
    fn parse_value_clause(&mut self) -> Option<String> {
        if !self.eat(TokenKind::Eq) {
            return None;
        }
        let mut parts = Vec::new();
        while let Some(kind) = self.current_kind() {
            if matches!(
                kind,
                TokenKind::Semicolon | TokenKind::LBrace | TokenKind::RBrace
            ) {
                break;
            }
            parts.push(self.bump().unwrap().text.to_string());
        }
        Some(parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(input: &str) -> SourceFile {
        let parse = parse(input);
        assert!(parse.ok(), "parse errors: {:?}", parse.errors);
        parse.file
    }

    fn first_decl(file: &SourceFile) -> &AstDecl {
        match &file.members[0] {
            AstMember::Decl(d) => d,
            other => panic!("expected a declaration, got {other:?}"),
        }
    }

    #[test]
    fn parse_class_chain() {
        let file = parse_ok("class A; class B :> A; class C :> B;");
        assert_eq!(file.members.len(), 3);
        let b = match &file.members[1] {
            AstMember::Decl(d) => d,
            _ => unreachable!(),
        };
        assert_eq!(b.heritage.len(), 1);
        assert_eq!(b.heritage[0].kind, AstHeritageKind::Specializes);
        assert_eq!(b.heritage[0].target.display(), "A");
    }

    #[test]
    fn parse_feature_subsetting_and_typing() {
        let file = parse_ok("feature f : T :> g;");
        let f = first_decl(&file);
        assert_eq!(f.kind, DeclKind::Feature);
        let kinds: Vec<_> = f.heritage.iter().map(|h| h.kind).collect();
        assert_eq!(
            kinds,
            vec![AstHeritageKind::TypedBy, AstHeritageKind::Subsets]
        );
    }

    #[test]
    fn parse_recursive_import() {
        let file = parse_ok("package P { public import Q::**; }");
        let p = first_decl(&file);
        let import = match &p.members[0] {
            AstMember::Import(i) => i,
            other => panic!("expected import, got {other:?}"),
        };
        assert!(import.wildcard);
        assert!(import.recursive);
        assert_eq!(import.visibility, Some(AstVisibility::Public));
    }

    #[test]
    fn parse_alias() {
        let file = parse_ok("alias B for A;");
        let alias = match &file.members[0] {
            AstMember::Alias(a) => a,
            other => panic!("expected alias, got {other:?}"),
        };
        assert_eq!(alias.name.as_str(), "B");
        assert_eq!(alias.target.display(), "A");
    }

    #[test]
    fn parse_library_package() {
        let file = parse_ok("standard library package Base { abstract classifier Anything; }");
        let base = first_decl(&file);
        assert!(base.is_library);
        assert_eq!(base.members.len(), 1);
    }

    #[test]
    fn parse_conjugation() {
        let file = parse_ok("class Neg ~ Pos;");
        let neg = first_decl(&file);
        assert_eq!(neg.heritage[0].kind, AstHeritageKind::Conjugates);
    }

    #[test]
    fn parse_feature_chain_target() {
        let file = parse_ok("feature g :>> a.b;");
        let g = first_decl(&file);
        let target = &g.heritage[0].target;
        assert_eq!(target.segments.len(), 2);
        assert!(target.segments[1].via_dot);
    }

    #[test]
    fn parse_multiplicity_forms() {
        let file = parse_ok("feature xs[0..*] : T; feature y[1];");
        let xs = first_decl(&file);
        assert_eq!(xs.multiplicity.unwrap().lower, 0);
        assert_eq!(xs.multiplicity.unwrap().upper, None);
    }

    #[test]
    fn recovery_keeps_later_members() {
        let parse = parse("class A :> ; class B;");
        assert!(!parse.ok());
        // B still parsed after recovery.
        assert!(parse.file.members.iter().any(|m| matches!(
            m,
            AstMember::Decl(d) if d.name.as_deref() == Some("B")
        )));
    }

    #[test]
    fn value_clause_is_raw_text() {
        let file = parse_ok("feature f = 42;");
        let f = first_decl(&file);
        assert_eq!(f.value.as_deref(), Some("42"));
    }
}
