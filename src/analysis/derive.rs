//! Derived size facts (§4.3, §4.4): whether a type's wire encoding has a
//! fixed width, its minimal possible encoded size, and the rule that a
//! `struct`'s fields must themselves all be fixed-size — `struct` is a
//! fixed, indirection-free layout, so a variable-length field (`string`,
//! `array`, `map`, `[opt]`, or a `message`/`union`) has no place in one.

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::ir::{DefId, Definition, Schema, TypeRef};
use crate::wire;
use std::collections::HashSet;

/// A struct that directly contains itself (§3 rule 6) is already reported as
/// `InfiniteStruct` by `recursion::check_struct_recursion`; here we just need
/// to not blow the stack walking the same cycle, so a definition already on
/// the current path is treated as fixed-size (its real answer doesn't matter,
/// the schema is already rejected).
pub fn is_fixed_size(schema: &Schema, ty: &TypeRef) -> bool {
    is_fixed_size_inner(schema, ty, &mut HashSet::new())
}

fn is_fixed_size_inner(schema: &Schema, ty: &TypeRef, visiting: &mut HashSet<DefId>) -> bool {
    match ty {
        TypeRef::Scalar(base) => base.fixed_size().is_some(),
        TypeRef::Array(_) | TypeRef::Map(_, _) | TypeRef::Option(_) => false,
        TypeRef::Def(id) => match schema.get(*id) {
            Definition::Enum { .. } => true,
            Definition::Struct { fields, .. } => {
                if !visiting.insert(*id) {
                    return true;
                }
                let result = fields.iter().all(|f| is_fixed_size_inner(schema, &f.ty, visiting));
                visiting.remove(id);
                result
            }
            Definition::Message { .. } | Definition::Union { .. } | Definition::Const { .. } => false,
        },
    }
}

/// The smallest number of bytes `ty` can ever encode to — an empty string,
/// array, or map still costs a length prefix; an absent option costs its
/// one presence byte; an empty message still carries its length prefix and
/// end-of-fields sentinel.
pub fn minimal_encoded_size(schema: &Schema, ty: &TypeRef) -> u32 {
    minimal_encoded_size_inner(schema, ty, &mut HashSet::new())
}

fn minimal_encoded_size_inner(schema: &Schema, ty: &TypeRef, visiting: &mut HashSet<DefId>) -> u32 {
    match ty {
        TypeRef::Scalar(base) => base.fixed_size().unwrap_or(wire::LENGTH_PREFIX_SIZE),
        TypeRef::Array(_) | TypeRef::Map(_, _) => wire::LENGTH_PREFIX_SIZE,
        TypeRef::Option(_) => 1,
        TypeRef::Def(id) => match schema.get(*id) {
            Definition::Enum { scalar_type, .. } => scalar_type.fixed_size().unwrap_or(4),
            Definition::Struct { fields, .. } => {
                if !visiting.insert(*id) {
                    return 0;
                }
                let total = fields.iter().map(|f| minimal_encoded_size_inner(schema, &f.ty, visiting)).sum();
                visiting.remove(id);
                total
            }
            Definition::Message { .. } => wire::LENGTH_PREFIX_SIZE + 1,
            Definition::Union { branches, .. } => {
                let smallest_branch = branches
                    .iter()
                    .map(|b| minimal_encoded_size_inner(schema, &TypeRef::Def(b.def), visiting))
                    .min()
                    .unwrap_or(0);
                wire::LENGTH_PREFIX_SIZE + 1 + smallest_branch
            }
            Definition::Const { .. } => 0,
        },
    }
}

pub fn check_struct_fields_fixed_size(schema: &Schema, diags: &mut Vec<Diagnostic>) {
    for (_, def) in schema.all() {
        let Definition::Struct { fields, header, .. } = def else { continue };
        for field in fields {
            if !is_fixed_size(schema, &field.ty) {
                diags.push(Diagnostic::new(
                    DiagnosticKind::UnsupportedFeature {
                        description: format!("field `{}` of struct `{}` has a variable-size type; struct fields must be fixed-size", field.name, header.name),
                    },
                    field.span,
                    "struct fields must have fixed-size types",
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{DefHeader, StructField};
    use crate::span::{FileId, Span};
    use crate::token::BaseType;

    fn header(name: &str) -> DefHeader {
        DefHeader { name: name.to_string(), attributes: vec![], documentation: None, span: Span::point(FileId(0), 0), parent: None }
    }

    fn field(name: &str, ty: TypeRef) -> StructField {
        StructField { name: name.to_string(), ty, attributes: vec![], documentation: None, span: Span::point(FileId(0), 0) }
    }

    #[test]
    fn struct_of_scalars_is_fixed_size() {
        let mut schema = Schema::new();
        let id = schema.alloc(Definition::Struct {
            header: header("Point"),
            is_readonly: false,
            fields: vec![field("x", TypeRef::Scalar(BaseType::Int32)), field("y", TypeRef::Scalar(BaseType::Int32))],
            opcode: None,
        });
        assert!(is_fixed_size(&schema, &TypeRef::Def(id)));
        assert_eq!(minimal_encoded_size(&schema, &TypeRef::Def(id)), 8);
    }

    #[test]
    fn string_field_in_struct_is_rejected() {
        let mut schema = Schema::new();
        schema.alloc(Definition::Struct {
            header: header("Bad"),
            is_readonly: false,
            fields: vec![field("name", TypeRef::Scalar(BaseType::String))],
            opcode: None,
        });
        let mut diags = Vec::new();
        check_struct_fields_fixed_size(&schema, &mut diags);
        assert_eq!(diags.len(), 1);
        assert!(matches!(diags[0].kind, DiagnosticKind::UnsupportedFeature { .. }));
    }

    #[test]
    fn nested_fixed_size_struct_field_is_allowed() {
        let mut schema = Schema::new();
        let inner = schema.alloc(Definition::Struct { header: header("Inner"), is_readonly: false, fields: vec![field("x", TypeRef::Scalar(BaseType::Byte))], opcode: None });
        schema.alloc(Definition::Struct { header: header("Outer"), is_readonly: false, fields: vec![field("inner", TypeRef::Def(inner))], opcode: None });
        let mut diags = Vec::new();
        check_struct_fields_fixed_size(&schema, &mut diags);
        assert!(diags.is_empty());
    }

    #[test]
    fn union_minimal_size_tracks_its_smallest_branch() {
        let mut schema = Schema::new();
        let empty = schema.alloc(Definition::Struct { header: header("Empty"), is_readonly: false, fields: vec![], opcode: None });
        let one_byte = schema.alloc(Definition::Struct {
            header: header("OneByte"),
            is_readonly: false,
            fields: vec![field("x", TypeRef::Scalar(BaseType::Byte))],
            opcode: None,
        });
        let id = schema.alloc(Definition::Union {
            header: header("U"),
            branches: vec![
                crate::ir::UnionBranch { discriminator: 1, def: one_byte },
                crate::ir::UnionBranch { discriminator: 2, def: empty },
            ],
            opcode: None,
        });
        // length (4) + discriminator (1) + the empty branch's 0 bytes, not the
        // 1-byte branch — a hardcoded "+1" here would overestimate.
        assert_eq!(minimal_encoded_size(&schema, &TypeRef::Def(id)), 5);
    }

    #[test]
    fn union_with_no_branches_has_zero_branch_floor() {
        let mut schema = Schema::new();
        let id = schema.alloc(Definition::Union { header: header("Empty"), branches: vec![], opcode: None });
        assert_eq!(minimal_encoded_size(&schema, &TypeRef::Def(id)), 5);
    }
}
