//! `attr` and documentation association (§4.2): `[name]` / `[name(value)]`
//! lists, and the rule that a run of block comments immediately preceding a
//! definition or field becomes its documentation.

use super::Parser;
use crate::ast::Attribute;
use crate::diagnostics::Diagnostic;
use crate::token::TokenKind;

impl<'a> Parser<'a> {
    /// Consumes every consecutive `BlockComment` token at the cursor and
    /// joins them into one documentation string, or returns `None` if the
    /// cursor isn't sitting on one. Reads the raw token stream directly
    /// (not `peek`/`advance`, which skip `BlockComment`s as trivia) since
    /// this is the one place they're meant to be seen.
    pub(super) fn take_doc(&mut self) -> Option<String> {
        let mut parts = Vec::new();
        while let TokenKind::BlockComment(text) = self.tokens[self.pos].kind.clone() {
            parts.push(text);
            self.pos += 1;
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n"))
        }
    }

    pub(super) fn take_attributes(&mut self) -> Result<Vec<Attribute>, Diagnostic> {
        let mut attrs = Vec::new();
        while self.check(&TokenKind::LBracket) {
            attrs.push(self.parse_attribute()?);
        }
        Ok(attrs)
    }

    fn parse_attribute(&mut self) -> Result<Attribute, Diagnostic> {
        let start = self.peek().span;
        self.expect(&TokenKind::LBracket, "'['")?;
        let (name, _) = self.expect_identifier()?;

        let value = if self.check(&TokenKind::LParen) {
            self.advance();
            let (lit, _) = self.parse_literal()?;
            self.expect(&TokenKind::RParen, "')'")?;
            Some(lit)
        } else {
            None
        };

        let end = self.peek().span;
        self.expect(&TokenKind::RBracket, "']'")?;

        Ok(Attribute { name, value, span: start.merge(end) })
    }
}
