//! Parser: Logos lexer and recursive-descent parser for the textual syntax.
//!
//! Produces the typed AST consumed by the metamodel build pass. Lossless
//! syntax trees and formatting concerns live outside this crate.

mod ast;
mod lexer;
#[allow(clippy::module_inception)]
mod parser;

pub use ast::{
    AstAlias, AstDecl, AstDirection, AstFeatureModifiers, AstHeritage, AstHeritageKind, AstImport,
    AstMember, AstMultiplicity, AstQualifiedName, AstSegment, AstTypeRel, AstTypeRelKind,
    AstVisibility, DeclKind, SourceFile,
};
pub use lexer::{Lexer, Token, TokenKind, tokenize};
pub use parser::{Parse, ParseError, parse};
