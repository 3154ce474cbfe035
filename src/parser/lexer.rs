//! Logos-based lexer for the KerML/SysML textual subset.
//!
//! Fast tokenization using the logos crate. The lexer tracks both byte
//! offsets and line/column positions so downstream diagnostics can report
//! either form.

use crate::base::Position;
use logos::Logos;
use text_size::TextSize;

/// A token with its kind, text, byte offset, and line/column position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub offset: TextSize,
    pub pos: Position,
}

/// Lexer wrapping the logos-generated tokenizer.
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, TokenKind>,
    offset: u32,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: TokenKind::lexer(input),
            offset: 0,
            line: 0,
            column: 0,
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let logos_token = self.inner.next()?;
        let text = self.inner.slice();
        let offset = TextSize::new(self.offset);
        let pos = Position::new(self.line, self.column);
        self.offset += text.len() as u32;

        // Advance line/column over the token text.
        for c in text.chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 0;
            } else {
                self.column += 1;
            }
        }

        let kind = logos_token.unwrap_or(TokenKind::Error);
        Some(Token {
            kind,
            text,
            offset,
            pos,
        })
    }
}

/// Tokenize an entire string into a Vec.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

/// Token kinds for the modeling-language subset.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[regex(r"/\*([^*]|\*[^/])*\*/")]
    BlockComment,

    // =========================================================================
    // LITERALS
    // =========================================================================
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    #[regex(r"'[^'\n]*'")]
    QuotedName,

    #[regex(r"[0-9]+")]
    Integer,

    // =========================================================================
    // MULTI-CHARACTER PUNCTUATION (must come before single-char)
    // =========================================================================
    #[token(":>>")]
    ColonGtGt,

    #[token(":>")]
    ColonGt,

    #[token("::")]
    ColonColon,

    #[token("..")]
    DotDot,

    #[token("**")]
    StarStar,

    // =========================================================================
    // SINGLE-CHARACTER PUNCTUATION
    // =========================================================================
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("*")]
    Star,
    #[token("~")]
    Tilde,

    // =========================================================================
    // KEYWORDS (alphabetical, longest match wins in logos)
    // =========================================================================
    #[token("abstract")]
    AbstractKw,
    #[token("alias")]
    AliasKw,
    #[token("assoc")]
    AssocKw,
    #[token("class")]
    ClassKw,
    #[token("classifier")]
    ClassifierKw,
    #[token("composite")]
    CompositeKw,
    #[token("conjugates")]
    ConjugatesKw,
    #[token("connector")]
    ConnectorKw,
    #[token("datatype")]
    DatatypeKw,
    #[token("derived")]
    DerivedKw,
    #[token("differences")]
    DifferencesKw,
    #[token("disjoint")]
    DisjointKw,
    #[token("end")]
    EndKw,
    #[token("feature")]
    FeatureKw,
    #[token("for")]
    ForKw,
    #[token("from")]
    FromKw,
    #[token("import")]
    ImportKw,
    #[token("in")]
    InKw,
    #[token("inout")]
    InoutKw,
    #[token("intersects")]
    IntersectsKw,
    #[token("library")]
    LibraryKw,
    #[token("nonunique")]
    NonuniqueKw,
    #[token("ordered")]
    OrderedKw,
    #[token("out")]
    OutKw,
    #[token("package")]
    PackageKw,
    #[token("portion")]
    PortionKw,
    #[token("private")]
    PrivateKw,
    #[token("protected")]
    ProtectedKw,
    #[token("public")]
    PublicKw,
    #[token("readonly")]
    ReadonlyKw,
    #[token("redefines")]
    RedefinesKw,
    #[token("specializes")]
    SpecializesKw,
    #[token("standard")]
    StandardKw,
    #[token("struct")]
    StructKw,
    #[token("subsets")]
    SubsetsKw,
    #[token("type")]
    TypeKw,
    #[token("unions")]
    UnionsKw,

    /// Unrecognized input.
    Error,
}

impl TokenKind {
    /// Whitespace and comments.
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::LineComment | TokenKind::BlockComment
        )
    }

    /// Tokens that can start or continue a declared name.
    pub fn is_name(self) -> bool {
        matches!(self, TokenKind::Ident | TokenKind::QuotedName)
    }

    /// Visibility prefix keywords.
    pub fn is_visibility(self) -> bool {
        matches!(
            self,
            TokenKind::PublicKw | TokenKind::PrivateKw | TokenKind::ProtectedKw
        )
    }

    /// Human-readable label for error messages.
    pub fn display(self) -> &'static str {
        match self {
            TokenKind::Whitespace => "whitespace",
            TokenKind::LineComment | TokenKind::BlockComment => "comment",
            TokenKind::Ident => "identifier",
            TokenKind::QuotedName => "quoted name",
            TokenKind::Integer => "integer",
            TokenKind::ColonGtGt => "`:>>`",
            TokenKind::ColonGt => "`:>`",
            TokenKind::ColonColon => "`::`",
            TokenKind::DotDot => "`..`",
            TokenKind::StarStar => "`**`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::Semicolon => "`;`",
            TokenKind::Colon => "`:`",
            TokenKind::Dot => "`.`",
            TokenKind::Comma => "`,`",
            TokenKind::Eq => "`=`",
            TokenKind::Lt => "`<`",
            TokenKind::Gt => "`>`",
            TokenKind::Star => "`*`",
            TokenKind::Tilde => "`~`",
            TokenKind::AbstractKw => "`abstract`",
            TokenKind::AliasKw => "`alias`",
            TokenKind::AssocKw => "`assoc`",
            TokenKind::ClassKw => "`class`",
            TokenKind::ClassifierKw => "`classifier`",
            TokenKind::CompositeKw => "`composite`",
            TokenKind::ConjugatesKw => "`conjugates`",
            TokenKind::ConnectorKw => "`connector`",
            TokenKind::DatatypeKw => "`datatype`",
            TokenKind::DerivedKw => "`derived`",
            TokenKind::DifferencesKw => "`differences`",
            TokenKind::DisjointKw => "`disjoint`",
            TokenKind::EndKw => "`end`",
            TokenKind::FeatureKw => "`feature`",
            TokenKind::ForKw => "`for`",
            TokenKind::FromKw => "`from`",
            TokenKind::ImportKw => "`import`",
            TokenKind::InKw => "`in`",
            TokenKind::InoutKw => "`inout`",
            TokenKind::IntersectsKw => "`intersects`",
            TokenKind::LibraryKw => "`library`",
            TokenKind::NonuniqueKw => "`nonunique`",
            TokenKind::OrderedKw => "`ordered`",
            TokenKind::OutKw => "`out`",
            TokenKind::PackageKw => "`package`",
            TokenKind::PortionKw => "`portion`",
            TokenKind::PrivateKw => "`private`",
            TokenKind::ProtectedKw => "`protected`",
            TokenKind::PublicKw => "`public`",
            TokenKind::ReadonlyKw => "`readonly`",
            TokenKind::RedefinesKw => "`redefines`",
            TokenKind::SpecializesKw => "`specializes`",
            TokenKind::StandardKw => "`standard`",
            TokenKind::StructKw => "`struct`",
            TokenKind::SubsetsKw => "`subsets`",
            TokenKind::TypeKw => "`type`",
            TokenKind::UnionsKw => "`unions`",
            TokenKind::Error => "invalid token",
        }
    }
}
