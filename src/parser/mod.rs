//! Stage 2 of the pipeline (§4.2): a recursive-descent parser over the
//! token stream, emitting an unresolved AST. Grammar responsibilities are
//! split by syntactic category the way the teacher splits its grammar
//! across `parser/clause.rs`, `parser/noun.rs`, `parser/verb.rs`, ... —
//! `types.rs` owns the `type` grammar, `attributes.rs` owns `attr`/doc
//! association, `literals.rs` owns literal tokens, and this file is the
//! top-level driver plus the shared token-cursor plumbing every other file
//! calls into.

mod attributes;
mod definitions;
mod literals;
mod types;

use crate::ast::{Ast, TypeArena};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::token::{Token, TokenKind};

/// Keywords that start a new top-level construct. Used both to dispatch
/// parsing and, on error, as recovery points (§4.2: "skipping to the next
/// definition-start keyword or closing `}`").
const DEFINITION_START: &[TokenKind] = &[
    TokenKind::KwEnum,
    TokenKind::KwStruct,
    TokenKind::KwMessage,
    TokenKind::KwUnion,
    TokenKind::KwConst,
    TokenKind::KwReadonly,
    TokenKind::KwImport,
];

pub struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    arena: &'a TypeArena<'a>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, arena: &'a TypeArena<'a>) -> Self {
        Self { tokens, pos: 0, arena, diagnostics: Vec::new() }
    }

    /// Parses one file's worth of tokens into an `Ast`. Never panics on
    /// malformed input: errors are recorded and parsing resumes at the next
    /// recovery point, so the caller gets a partial AST plus every
    /// diagnostic found along the way (§4.2 contract).
    pub fn parse(mut self) -> (Ast<'a>, Vec<Diagnostic>) {
        let mut ast = Ast::default();

        while !self.is_at_end() {
            if self.check(&TokenKind::KwImport) {
                self.parse_import(&mut ast);
                continue;
            }

            match self.parse_top_level_definition() {
                Ok(def) => ast.definitions.push(def),
                Err(diag) => {
                    self.diagnostics.push(diag);
                    self.recover();
                }
            }
        }

        (ast, self.diagnostics)
    }

    fn parse_import(&mut self, ast: &mut Ast<'a>) {
        let start = self.peek().span;
        self.advance(); // "import"
        match self.expect_literal_string() {
            Ok((name, _)) => {
                if let Err(diag) = self.expect(&TokenKind::Semicolon, "';'") {
                    self.diagnostics.push(diag);
                    self.recover();
                    return;
                }
                ast.imports.push((name, start));
            }
            Err(diag) => {
                self.diagnostics.push(diag);
                self.recover();
            }
        }
    }

    /// Skips tokens until the next definition-start keyword, a closing
    /// `}`, or end of file, then stops (without consuming the recovery
    /// token) so the main loop resumes parsing from there.
    fn recover(&mut self) {
        while !self.is_at_end() {
            if DEFINITION_START.contains(&self.peek().kind) {
                return;
            }
            if matches!(self.peek().kind, TokenKind::RBrace) {
                self.advance();
                return;
            }
            self.advance();
        }
    }

    // ---- token cursor ----------------------------------------------------
    //
    // `BlockComment` tokens are trivia everywhere except the handful of
    // doc-association points `take_doc` consumes them at (§4.2, GLOSSARY:
    // "never surfaced to the parser except as documentation"). `take_doc`
    // runs first at each of those points and reads the raw token stream
    // directly; everywhere else, `peek`/`peek_ahead`/`advance` silently
    // step over any `BlockComment` left in the stream instead of surfacing
    // it as an unexpected token.

    /// Index of the first non-`BlockComment` token at or after `i`. Safe to
    /// run off a comment run because the stream always ends in `Eof`.
    fn skip_to_significant(&self, mut i: usize) -> usize {
        while matches!(self.tokens[i].kind, TokenKind::BlockComment(_)) {
            i += 1;
        }
        i
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.skip_to_significant(self.pos)]
    }

    fn peek_ahead(&self, n: usize) -> &Token {
        let mut i = self.skip_to_significant(self.pos);
        for _ in 0..n {
            i = self.skip_to_significant(i + 1);
        }
        self.tokens.get(i).unwrap_or_else(|| self.tokens.last().unwrap())
    }

    fn is_at_end(&self) -> bool {
        self.peek().is_eof()
    }

    fn advance(&mut self) -> Token {
        self.pos = self.skip_to_significant(self.pos);
        let tok = self.tokens[self.pos].clone();
        if !tok.is_eof() {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn expect(&mut self, kind: &TokenKind, expected_desc: &str) -> Result<Token, Diagnostic> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(expected_desc))
        }
    }

    fn unexpected(&self, expected_desc: &str) -> Diagnostic {
        let found = self.peek().kind.clone();
        Diagnostic::new(
            DiagnosticKind::UnexpectedToken { expected: expected_desc.to_string(), found: found.clone() },
            self.peek().span,
            format!("expected {expected_desc}, found {found:?}"),
        )
    }

    fn expect_identifier(&mut self) -> Result<(String, crate::span::Span), Diagnostic> {
        match self.peek().kind.clone() {
            TokenKind::Identifier(name) => {
                let span = self.peek().span;
                self.advance();
                Ok((name, span))
            }
            _ => Err(self.unexpected("an identifier")),
        }
    }
}
