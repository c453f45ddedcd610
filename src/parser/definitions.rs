//! Top-level and nested definition grammar (§4.2): `enumDef`, `structDef`,
//! `messageDef`, `unionDef`, `constDef`, and their field-level productions.

use super::Parser;
use crate::ast::{Definition, EnumMember, MessageField, StructField, UnionBranch};
use crate::diagnostics::Diagnostic;
use crate::token::{BaseType, TokenKind};

impl<'a> Parser<'a> {
    /// `definition = doc? attr* (enumDef | structDef | messageDef | unionDef | constDef)`
    pub(super) fn parse_top_level_definition(&mut self) -> Result<Definition<'a>, Diagnostic> {
        let doc = self.take_doc();
        let attributes = self.take_attributes()?;
        self.parse_definition_body(doc, attributes)
    }

    fn parse_definition_body(
        &mut self,
        documentation: Option<String>,
        attributes: Vec<crate::ast::Attribute>,
    ) -> Result<Definition<'a>, Diagnostic> {
        match self.peek().kind.clone() {
            TokenKind::KwEnum => self.parse_enum(documentation, attributes),
            TokenKind::KwStruct => self.parse_struct(documentation, attributes, false),
            TokenKind::KwReadonly => {
                self.advance();
                self.expect(&TokenKind::KwStruct, "'struct'")?;
                self.parse_struct_body(documentation, attributes, true)
            }
            TokenKind::KwMessage => self.parse_message(documentation, attributes),
            TokenKind::KwUnion => self.parse_union(documentation, attributes),
            TokenKind::KwConst => self.parse_const(documentation, attributes),
            _ => Err(self.unexpected("'enum', 'struct', 'message', 'union', or 'const'")),
        }
    }

    // ---- enum --------------------------------------------------------

    fn parse_enum(&mut self, documentation: Option<String>, attributes: Vec<crate::ast::Attribute>) -> Result<Definition<'a>, Diagnostic> {
        let start = self.peek().span;
        self.advance(); // "enum"
        let (name, _) = self.expect_identifier()?;

        // `: baseType` is optional (§4.2 `enumDef`); an undeclared enum
        // defaults to a `uint32` backing (§3: "scalar_type … default UInt32").
        let scalar_type = if self.check(&TokenKind::Colon) {
            self.advance();
            let (scalar_name, scalar_span) = self.expect_identifier()?;
            BaseType::from_keyword(&scalar_name)
                .filter(|b| b.is_integer())
                .ok_or_else(|| Diagnostic::new(
                    crate::diagnostics::DiagnosticKind::UnexpectedToken {
                        expected: "an integer base type".to_string(),
                        found: self.peek().kind.clone(),
                    },
                    scalar_span,
                    "enum must declare an integer underlying type",
                ))?
        } else {
            BaseType::UInt32
        };

        let is_flags = if self.check_identifier_value("flags") {
            self.advance();
            true
        } else {
            false
        };

        self.expect(&TokenKind::LBrace, "'{'")?;
        let mut members = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            members.push(self.parse_enum_member()?);
        }
        let end = self.peek().span;
        self.advance(); // "}"

        Ok(Definition::Enum {
            header: crate::ast::DefHeader { name, attributes, documentation, span: start.merge(end) },
            scalar_type,
            is_flags,
            members,
        })
    }

    fn parse_enum_member(&mut self) -> Result<EnumMember, Diagnostic> {
        let documentation = self.take_doc();
        let attributes = self.take_attributes()?;
        let start = self.peek().span;
        let (name, _) = self.expect_identifier()?;
        self.expect(&TokenKind::Equals, "'='")?;
        let (value, _) = self.parse_int_literal()?;
        let end = self.peek().span;
        self.expect(&TokenKind::Semicolon, "';'")?;
        Ok(EnumMember { name, value, attributes, documentation, span: start.merge(end) })
    }

    // ---- struct --------------------------------------------------------

    fn parse_struct(
        &mut self,
        documentation: Option<String>,
        attributes: Vec<crate::ast::Attribute>,
        is_readonly: bool,
    ) -> Result<Definition<'a>, Diagnostic> {
        self.advance(); // "struct"
        self.parse_struct_body(documentation, attributes, is_readonly)
    }

    fn parse_struct_body(
        &mut self,
        documentation: Option<String>,
        attributes: Vec<crate::ast::Attribute>,
        is_readonly: bool,
    ) -> Result<Definition<'a>, Diagnostic> {
        let start = self.peek().span;
        let (name, _) = self.expect_identifier()?;
        self.expect(&TokenKind::LBrace, "'{'")?;
        let mut fields = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            fields.push(self.parse_struct_field()?);
        }
        let end = self.peek().span;
        self.advance(); // "}"

        Ok(Definition::Struct {
            header: crate::ast::DefHeader { name, attributes, documentation, span: start.merge(end) },
            is_readonly,
            fields,
        })
    }

    fn parse_struct_field(&mut self) -> Result<StructField<'a>, Diagnostic> {
        let documentation = self.take_doc();
        let attributes = self.take_attributes()?;
        let start = self.peek().span;
        let ty = self.parse_type()?;
        let (name, _) = self.expect_identifier()?;
        let end = self.peek().span;
        self.expect(&TokenKind::Semicolon, "';'")?;
        Ok(StructField { name, ty, attributes, documentation, span: start.merge(end) })
    }

    // ---- message --------------------------------------------------------

    fn parse_message(&mut self, documentation: Option<String>, attributes: Vec<crate::ast::Attribute>) -> Result<Definition<'a>, Diagnostic> {
        let start = self.peek().span;
        self.advance(); // "message"
        let (name, _) = self.expect_identifier()?;
        self.expect(&TokenKind::LBrace, "'{'")?;
        let mut fields = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            fields.push(self.parse_message_field()?);
        }
        let end = self.peek().span;
        self.advance(); // "}"

        Ok(Definition::Message {
            header: crate::ast::DefHeader { name, attributes, documentation, span: start.merge(end) },
            fields,
        })
    }

    fn parse_message_field(&mut self) -> Result<MessageField<'a>, Diagnostic> {
        let documentation = self.take_doc();
        let attributes = self.take_attributes()?;
        let start = self.peek().span;
        let (index, _) = self.parse_int_literal()?;
        self.expect(&TokenKind::Arrow, "'->'")?;
        let ty = self.parse_type()?;
        let (name, _) = self.expect_identifier()?;
        let end = self.peek().span;
        self.expect(&TokenKind::Semicolon, "';'")?;
        Ok(MessageField { index, name, ty, attributes, documentation, span: start.merge(end) })
    }

    // ---- union --------------------------------------------------------

    fn parse_union(&mut self, documentation: Option<String>, attributes: Vec<crate::ast::Attribute>) -> Result<Definition<'a>, Diagnostic> {
        let start = self.peek().span;
        self.advance(); // "union"
        let (name, _) = self.expect_identifier()?;
        self.expect(&TokenKind::LBrace, "'{'")?;
        let mut branches = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            branches.push(self.parse_union_branch()?);
        }
        let end = self.peek().span;
        self.advance(); // "}"

        Ok(Definition::Union {
            header: crate::ast::DefHeader { name, attributes, documentation, span: start.merge(end) },
            branches,
        })
    }

    /// `unionBranch = doc? attr* intLiteral "->" (structDef | messageDef) ";"`
    ///
    /// The grammar sketch in the source spec only shows the discriminator
    /// and nested definition; doc comments and attributes on a branch are
    /// accepted the same way they are on a message field, for consistency.
    fn parse_union_branch(&mut self) -> Result<UnionBranch<'a>, Diagnostic> {
        let branch_doc = self.take_doc();
        let branch_attrs = self.take_attributes()?;
        let start = self.peek().span;
        let (discriminator, _) = self.parse_int_literal()?;
        self.expect(&TokenKind::Arrow, "'->'")?;

        let inner_doc = self.take_doc().or(branch_doc);
        let inner_attrs = {
            let mut extra = self.take_attributes()?;
            let mut all = branch_attrs;
            all.append(&mut extra);
            all
        };

        let definition = match self.peek().kind.clone() {
            TokenKind::KwStruct => self.parse_struct(inner_doc, inner_attrs, false)?,
            TokenKind::KwReadonly => {
                self.advance();
                self.expect(&TokenKind::KwStruct, "'struct'")?;
                self.parse_struct_body(inner_doc, inner_attrs, true)?
            }
            TokenKind::KwMessage => self.parse_message(inner_doc, inner_attrs)?,
            _ => return Err(self.unexpected("'struct' or 'message'")),
        };

        let end = self.peek().span;
        self.expect(&TokenKind::Semicolon, "';'")?;

        Ok(UnionBranch { discriminator, definition, span: start.merge(end) })
    }

    // ---- const --------------------------------------------------------

    fn parse_const(&mut self, documentation: Option<String>, attributes: Vec<crate::ast::Attribute>) -> Result<Definition<'a>, Diagnostic> {
        let start = self.peek().span;
        self.advance(); // "const"
        let (ty_name, ty_span) = self.expect_identifier()?;
        let ty = BaseType::from_keyword(&ty_name).ok_or_else(|| {
            Diagnostic::new(
                crate::diagnostics::DiagnosticKind::UnexpectedToken {
                    expected: "a base type".to_string(),
                    found: self.peek().kind.clone(),
                },
                ty_span,
                "const must declare a scalar base type",
            )
        })?;
        let (name, _) = self.expect_identifier()?;
        self.expect(&TokenKind::Equals, "'='")?;
        let (value, _) = self.parse_literal()?;
        let end = self.peek().span;
        self.expect(&TokenKind::Semicolon, "';'")?;

        Ok(Definition::Const {
            header: crate::ast::DefHeader { name, attributes, documentation, span: start.merge(end) },
            ty,
            value,
        })
    }

    fn check_identifier_value(&self, value: &str) -> bool {
        matches!(&self.peek().kind, TokenKind::Identifier(name) if name == value)
    }
}
