//! The unresolved definition tree produced by the parser (§3, §4.2).
//!
//! AST nodes live only for the duration of parsing; semantic analysis
//! interns them into the IR (`crate::ir`) and this tree is dropped. `TypeRef`
//! recurses (arrays of arrays, maps of options, ...) so it is allocated out
//! of a bump arena the way the teacher arenas its recursive expression tree
//! — everything else here is owned, since only `TypeRef` needs that.

use crate::arena::Arena;
use crate::span::Span;
use crate::token::{BaseType, LiteralValue};

#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef<'a> {
    Scalar(BaseType),
    Array(&'a TypeRef<'a>),
    Map(&'a TypeRef<'a>, &'a TypeRef<'a>),
    Option(&'a TypeRef<'a>),
    Named(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: Option<LiteralValue>,
    pub span: Span,
}

impl Attribute {
    pub fn find<'a>(attrs: &'a [Attribute], name: &str) -> Option<&'a Attribute> {
        attrs.iter().find(|a| a.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    pub name: String,
    pub value: LiteralValue,
    pub attributes: Vec<Attribute>,
    pub documentation: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructField<'a> {
    pub name: String,
    pub ty: TypeRef<'a>,
    pub attributes: Vec<Attribute>,
    pub documentation: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageField<'a> {
    pub index: LiteralValue,
    pub name: String,
    pub ty: TypeRef<'a>,
    pub attributes: Vec<Attribute>,
    pub documentation: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnionBranch<'a> {
    pub discriminator: LiteralValue,
    pub definition: Definition<'a>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DefHeader {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub documentation: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Definition<'a> {
    Enum {
        header: DefHeader,
        scalar_type: BaseType,
        is_flags: bool,
        members: Vec<EnumMember>,
    },
    Struct {
        header: DefHeader,
        is_readonly: bool,
        fields: Vec<StructField<'a>>,
    },
    Message {
        header: DefHeader,
        fields: Vec<MessageField<'a>>,
    },
    Union {
        header: DefHeader,
        branches: Vec<UnionBranch<'a>>,
    },
    Const {
        header: DefHeader,
        ty: BaseType,
        value: LiteralValue,
    },
}

impl<'a> Definition<'a> {
    pub fn header(&self) -> &DefHeader {
        match self {
            Definition::Enum { header, .. }
            | Definition::Struct { header, .. }
            | Definition::Message { header, .. }
            | Definition::Union { header, .. }
            | Definition::Const { header, .. } => header,
        }
    }

    pub fn name(&self) -> &str {
        &self.header().name
    }

    pub fn span(&self) -> Span {
        self.header().span
    }
}

/// The full parsed program: every top-level definition, in source order.
/// `imports` records the logical names named by `import "...";` statements —
/// parsed for completeness, but resolving them to text is the host's job
/// (§6); the core only ever sees already-resolved source.
#[derive(Debug, Default)]
pub struct Ast<'a> {
    pub imports: Vec<(String, Span)>,
    pub definitions: Vec<Definition<'a>>,
}

pub type TypeArena<'a> = Arena<TypeRef<'a>>;
