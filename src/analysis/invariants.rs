//! Message field-index and union discriminator rules (§3 invariant 5,
//! §4.3): field index `0` is reserved as the end-of-message sentinel,
//! indices must strictly increase so the wire reader can stop early, and
//! neither a field index nor a union discriminator may repeat.

use std::collections::HashSet;

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::ir::{Definition, Schema};

pub fn check_message_indices(schema: &Schema, diags: &mut Vec<Diagnostic>) {
    for (_, def) in schema.all() {
        let Definition::Message { fields, .. } = def else { continue };
        let mut previous: Option<u8> = None;
        let mut seen = HashSet::new();
        for field in fields {
            if field.index == 0 {
                diags.push(Diagnostic::new(DiagnosticKind::ReservedFieldIndexZero, field.span, "field index 0 is reserved for the end-of-message marker"));
                continue;
            }
            if !seen.insert(field.index) {
                diags.push(Diagnostic::new(DiagnosticKind::DuplicateFieldIndex { index: field.index }, field.span, format!("field index {} is already used in this message", field.index)));
                continue;
            }
            if let Some(prev) = previous {
                if field.index <= prev {
                    diags.push(Diagnostic::new(
                        DiagnosticKind::FieldIndexNotIncreasing { index: field.index, previous: prev },
                        field.span,
                        format!("field index {} must be greater than the previous field's index {prev}", field.index),
                    ));
                }
            }
            previous = Some(field.index);
        }
    }
}

pub fn check_union_discriminators(schema: &Schema, diags: &mut Vec<Diagnostic>) {
    for (_, def) in schema.all() {
        let Definition::Union { branches, header, .. } = def else { continue };
        let mut seen = HashSet::new();
        let mut previous: Option<u8> = None;
        for branch in branches {
            if branch.discriminator == 0 {
                diags.push(Diagnostic::new(DiagnosticKind::ReservedFieldIndexZero, header.span, "union discriminator 0 is reserved"));
                continue;
            }
            if !seen.insert(branch.discriminator) {
                diags.push(Diagnostic::new(
                    DiagnosticKind::DuplicateFieldIndex { index: branch.discriminator },
                    header.span,
                    format!("union discriminator {} is already used in `{}`", branch.discriminator, header.name),
                ));
                continue;
            }
            if let Some(prev) = previous {
                if branch.discriminator <= prev {
                    diags.push(Diagnostic::new(
                        DiagnosticKind::FieldIndexNotIncreasing { index: branch.discriminator, previous: prev },
                        header.span,
                        format!("union discriminator {} must be greater than the previous branch's discriminator {prev}", branch.discriminator),
                    ));
                }
            }
            previous = Some(branch.discriminator);
        }
    }
}

/// Enum member values must fit the declared scalar type (§3 rule 3) and,
/// unless the enum is `flags` (any `u32` bit pattern is legal there, since
/// members are meant to be OR'd together), must be pairwise distinct.
pub fn check_enum_values(schema: &Schema, diags: &mut Vec<Diagnostic>) {
    for (_, def) in schema.all() {
        let Definition::Enum { scalar_type, is_flags, members, header } = def else { continue };
        let max = scalar_type.enum_value_max();
        let mut seen = std::collections::HashMap::new();
        for member in members {
            if member.value > max {
                diags.push(Diagnostic::new(
                    DiagnosticKind::EnumValueOutOfRange,
                    member.span,
                    format!("`{}.{}` = {} does not fit in {:?}", header.name, member.name, member.value, scalar_type),
                ));
                continue;
            }
            if !*is_flags {
                if let Some(previous) = seen.insert(member.value, member.name.clone()) {
                    diags.push(Diagnostic::new(
                        DiagnosticKind::DuplicateDefinition { name: member.name.clone() },
                        member.span,
                        format!("`{}.{}` repeats the value already used by `{previous}`", header.name, member.name),
                    ));
                }
            }
        }
    }
}
