//! The `type` grammar (§4.2):
//!
//! ```text
//! type = baseType | IDENT | type "[" "]" | "map" "[" type "," type "]" | type "?"
//! ```
//!
//! `?` and `[]` are both postfix and apply to whatever precedes them in
//! source order, so `int32?[]` is an array of optional ints and `int32[]?`
//! is an optional array of ints — the tighter-binding `?` is simply the one
//! written closer to its operand.

use super::Parser;
use crate::ast::TypeRef;
use crate::diagnostics::Diagnostic;
use crate::token::{BaseType, TokenKind};

impl<'a> Parser<'a> {
    pub(super) fn parse_type(&mut self) -> Result<TypeRef<'a>, Diagnostic> {
        let mut ty = self.parse_type_primary()?;
        loop {
            if self.check(&TokenKind::Question) {
                self.advance();
                ty = TypeRef::Option(self.arena.alloc(ty));
            } else if self.check(&TokenKind::LBracket) && matches!(self.peek_ahead(1).kind, TokenKind::RBracket) {
                self.advance();
                self.advance();
                ty = TypeRef::Array(self.arena.alloc(ty));
            } else {
                break;
            }
        }
        Ok(ty)
    }

    fn parse_type_primary(&mut self) -> Result<TypeRef<'a>, Diagnostic> {
        if self.check(&TokenKind::KwMap) {
            self.advance();
            self.expect(&TokenKind::LBracket, "'['")?;
            let key = self.parse_type()?;
            self.expect(&TokenKind::Comma, "','")?;
            let value = self.parse_type()?;
            self.expect(&TokenKind::RBracket, "']'")?;
            return Ok(TypeRef::Map(self.arena.alloc(key), self.arena.alloc(value)));
        }

        match self.peek().kind.clone() {
            TokenKind::Identifier(name) => {
                self.advance();
                match BaseType::from_keyword(&name) {
                    Some(base) => Ok(TypeRef::Scalar(base)),
                    None => Ok(TypeRef::Named(name)),
                }
            }
            _ => Err(self.unexpected("a type")),
        }
    }
}
