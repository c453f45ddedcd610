//! Literal tokens (§4.2 `literal`, `intLiteral`). Values stay in their raw
//! lexical form here; resolving them against a target type and range is the
//! const-evaluation analysis pass's job, not the parser's.

use super::Parser;
use crate::diagnostics::Diagnostic;
use crate::span::Span;
use crate::token::{LiteralValue, TokenKind};

impl<'a> Parser<'a> {
    pub(super) fn parse_literal(&mut self) -> Result<(LiteralValue, Span), Diagnostic> {
        let span = self.peek().span;
        match self.peek().kind.clone() {
            TokenKind::Literal(lit) => {
                self.advance();
                Ok((lit, span))
            }
            TokenKind::KwTrue => {
                self.advance();
                Ok((LiteralValue::Bool(true), span))
            }
            TokenKind::KwFalse => {
                self.advance();
                Ok((LiteralValue::Bool(false), span))
            }
            _ => Err(self.unexpected("a literal")),
        }
    }

    /// An `intLiteral`: the index/value position in `enumMember`,
    /// `messageField`, and `unionBranch` only ever accepts an integer.
    pub(super) fn parse_int_literal(&mut self) -> Result<(LiteralValue, Span), Diagnostic> {
        let span = self.peek().span;
        match self.peek().kind.clone() {
            TokenKind::Literal(lit @ LiteralValue::Integer { .. }) => {
                self.advance();
                Ok((lit, span))
            }
            _ => Err(self.unexpected("an integer literal")),
        }
    }

    pub(super) fn expect_literal_string(&mut self) -> Result<(String, Span), Diagnostic> {
        let span = self.peek().span;
        match self.peek().kind.clone() {
            TokenKind::Literal(LiteralValue::String(s)) => {
                self.advance();
                Ok((s, span))
            }
            _ => Err(self.unexpected("a string literal")),
        }
    }
}
