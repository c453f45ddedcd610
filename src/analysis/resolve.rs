//! Name resolution and IR construction (§4.3 passes 1-2): walks the parsed
//! AST twice — once to declare every name so forward references resolve,
//! once to resolve field/member bodies against those names — and produces
//! the `Schema` later passes validate further.

use crate::ast;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::ir::{self, ConstValue, DefHeader, DefId, Schema, TypeRef};
use crate::scope::ScopeStack;
use crate::span::Span;
use crate::token::LiteralValue;

use super::const_eval;

pub fn build_schema(top_level: &[ast::Definition]) -> (Schema, Vec<Diagnostic>) {
    let mut schema = Schema::new();
    let mut scopes = ScopeStack::new();
    let mut diags = Vec::new();

    let mut ids = Vec::with_capacity(top_level.len());
    for def in top_level {
        let id = declare_shell(def, None, &mut schema, &mut diags);
        bind_and_register(def.name(), def.span(), id, true, &mut scopes, &mut schema, &mut diags);
        ids.push(id);
    }

    for (def, id) in top_level.iter().zip(ids.iter()) {
        resolve_body(def, *id, &mut schema, &mut scopes, &mut diags);
    }

    (schema, diags)
}

fn bind_and_register(
    name: &str,
    span: Span,
    id: DefId,
    is_root: bool,
    scopes: &mut ScopeStack,
    schema: &mut Schema,
    diags: &mut Vec<Diagnostic>,
) {
    if let Some(prev) = scopes.bind(name, id) {
        diags.push(
            Diagnostic::new(DiagnosticKind::DuplicateDefinition { name: name.to_string() }, span, format!("`{name}` is already defined"))
                .with_secondary(schema.get(prev).header().span),
        );
        return;
    }
    if is_root {
        schema.register_root(name.to_string(), id);
    }
}

fn convert_header(header: &ast::DefHeader, parent: Option<DefId>) -> DefHeader {
    DefHeader {
        name: header.name.clone(),
        attributes: convert_attributes(&header.attributes),
        documentation: header.documentation.clone(),
        span: header.span,
        parent,
    }
}

fn convert_attributes(attrs: &[ast::Attribute]) -> Vec<ir::Attribute> {
    attrs
        .iter()
        .map(|a| ir::Attribute {
            name: a.name.clone(),
            value: a.value.as_ref().and_then(const_eval::literal_to_const_value_untyped),
            span: a.span,
        })
        .collect()
}

/// Allocates an `ir::Definition` shell with a real header but an empty body;
/// `resolve_body` fills the body in once every name in its scope exists.
/// `Const` has no forward-reference concerns, so it's fully resolved here.
fn declare_shell(def: &ast::Definition, parent: Option<DefId>, schema: &mut Schema, diags: &mut Vec<Diagnostic>) -> DefId {
    let header = convert_header(def.header(), parent);
    match def {
        ast::Definition::Enum { scalar_type, is_flags, members, .. } => {
            let resolved_members = members.iter().map(|m| convert_enum_member(m, diags)).collect();
            schema.alloc(ir::Definition::Enum { header, scalar_type: *scalar_type, is_flags: *is_flags, members: resolved_members })
        }
        ast::Definition::Struct { is_readonly, .. } => {
            schema.alloc(ir::Definition::Struct { header, is_readonly: *is_readonly, fields: vec![], opcode: None })
        }
        ast::Definition::Message { .. } => schema.alloc(ir::Definition::Message { header, fields: vec![], opcode: None }),
        ast::Definition::Union { .. } => schema.alloc(ir::Definition::Union { header, branches: vec![], opcode: None }),
        ast::Definition::Const { ty, value, .. } => {
            let resolved = const_eval::eval_const_value(value, *ty, header.span).unwrap_or_else(|diag| {
                let fallback = fallback_for(*ty);
                diags.push(diag);
                fallback
            });
            schema.alloc(ir::Definition::Const { header, ty: *ty, value: resolved })
        }
    }
}

fn fallback_for(ty: crate::token::BaseType) -> ConstValue {
    use crate::token::BaseType::*;
    match ty {
        Bool => ConstValue::Bool(false),
        Float32 | Float64 => ConstValue::Float(0.0),
        crate::token::BaseType::String => ConstValue::String(std::string::String::new()),
        Guid => ConstValue::Guid([0; 16]),
        other if other.is_signed() => ConstValue::Int(0),
        _ => ConstValue::UInt(0),
    }
}

fn convert_enum_member(m: &ast::EnumMember, diags: &mut Vec<Diagnostic>) -> ir::EnumMember {
    let value = const_eval::parse_int(&m.value, m.span)
        .ok()
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or_else(|| {
            diags.push(Diagnostic::new(DiagnosticKind::EnumValueOutOfRange, m.span, format!("`{}` does not fit in a uint32", m.name)));
            0
        });
    ir::EnumMember { name: m.name.clone(), value, attributes: convert_attributes(&m.attributes), documentation: m.documentation.clone(), span: m.span }
}

fn resolve_body(def: &ast::Definition, id: DefId, schema: &mut Schema, scopes: &mut ScopeStack, diags: &mut Vec<Diagnostic>) {
    match def {
        ast::Definition::Enum { .. } | ast::Definition::Const { .. } => {}

        ast::Definition::Struct { fields, .. } => {
            let resolved: Vec<ir::StructField> = fields
                .iter()
                .map(|f| ir::StructField {
                    name: f.name.clone(),
                    ty: resolve_type(&f.ty, f.span, scopes, diags),
                    attributes: convert_attributes(&f.attributes),
                    documentation: f.documentation.clone(),
                    span: f.span,
                })
                .collect();
            let opcode = extract_opcode(&def.header().attributes, def.span(), diags);
            if let ir::Definition::Struct { fields, opcode: oc, .. } = schema.get_mut(id) {
                *fields = resolved;
                *oc = opcode;
            }
        }

        ast::Definition::Message { fields, .. } => {
            let resolved: Vec<ir::MessageField> = fields
                .iter()
                .map(|f| {
                    let index = const_eval::parse_u8(&f.index, f.span).unwrap_or_else(|diag| {
                        diags.push(diag);
                        0
                    });
                    ir::MessageField {
                        index,
                        name: f.name.clone(),
                        ty: resolve_type(&f.ty, f.span, scopes, diags),
                        attributes: convert_attributes(&f.attributes),
                        documentation: f.documentation.clone(),
                        span: f.span,
                    }
                })
                .collect();
            let opcode = extract_opcode(&def.header().attributes, def.span(), diags);
            if let ir::Definition::Message { fields, opcode: oc, .. } = schema.get_mut(id) {
                *fields = resolved;
                *oc = opcode;
            }
        }

        ast::Definition::Union { branches, .. } => {
            scopes.push_scope();
            let mut branch_ids = Vec::with_capacity(branches.len());
            for b in branches {
                let bid = declare_shell(&b.definition, Some(id), schema, diags);
                bind_and_register(b.definition.name(), b.span, bid, false, scopes, schema, diags);
                branch_ids.push(bid);
            }
            for (b, bid) in branches.iter().zip(branch_ids.iter()) {
                resolve_body(&b.definition, *bid, schema, scopes, diags);
            }
            scopes.pop_scope();

            let resolved: Vec<ir::UnionBranch> = branches
                .iter()
                .zip(branch_ids.iter())
                .map(|(b, bid)| {
                    let discriminator = const_eval::parse_u8(&b.discriminator, b.span).unwrap_or_else(|diag| {
                        diags.push(diag);
                        0
                    });
                    ir::UnionBranch { discriminator, def: *bid }
                })
                .collect();
            let opcode = extract_opcode(&def.header().attributes, def.span(), diags);
            if let ir::Definition::Union { branches, opcode: oc, .. } = schema.get_mut(id) {
                *branches = resolved;
                *oc = opcode;
            }
        }
    }
}

fn resolve_type(ty: &ast::TypeRef, field_span: Span, scopes: &ScopeStack, diags: &mut Vec<Diagnostic>) -> TypeRef {
    match ty {
        ast::TypeRef::Scalar(base) => TypeRef::Scalar(*base),
        ast::TypeRef::Array(inner) => TypeRef::Array(Box::new(resolve_type(inner, field_span, scopes, diags))),
        ast::TypeRef::Map(key, value) => {
            TypeRef::Map(Box::new(resolve_type(key, field_span, scopes, diags)), Box::new(resolve_type(value, field_span, scopes, diags)))
        }
        ast::TypeRef::Option(inner) => TypeRef::Option(Box::new(resolve_type(inner, field_span, scopes, diags))),
        ast::TypeRef::Named(name) => match scopes.lookup(name) {
            Some(id) => TypeRef::Def(id),
            None => {
                diags.push(Diagnostic::new(DiagnosticKind::UnknownType { name: name.clone() }, field_span, format!("unknown type `{name}`")));
                TypeRef::Scalar(crate::token::BaseType::Byte)
            }
        },
    }
}

/// Pulls the `opcode` attribute's value, accepting either a plain integer or
/// a 4-character ASCII tag packed little-endian into a `uint32` (Bebop's
/// usual "fourcc" opcode convention).
fn extract_opcode(attrs: &[ast::Attribute], def_span: Span, diags: &mut Vec<Diagnostic>) -> Option<u32> {
    let attr = ast::Attribute::find(attrs, "opcode")?;
    let span = attr.span;
    match &attr.value {
        Some(LiteralValue::Integer { .. }) => match const_eval::parse_int(attr.value.as_ref().unwrap(), span) {
            Ok(v) if (0..=u32::MAX as i128).contains(&v) => Some(v as u32),
            _ => {
                diags.push(Diagnostic::new(DiagnosticKind::ConstOutOfRange, span, "opcode does not fit in a uint32"));
                None
            }
        },
        Some(LiteralValue::String(s)) if s.len() == 4 && s.is_ascii() => {
            let bytes = s.as_bytes();
            Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
        }
        _ => {
            diags.push(Diagnostic::new(DiagnosticKind::MalformedAttribute, span, "opcode must be a uint32 or a 4-character string"));
            let _ = def_span;
            None
        }
    }
}
