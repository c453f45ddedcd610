//! Global opcode uniqueness (§3 invariant, §4.3): only `struct`, `message`,
//! and `union` may carry an `[opcode(...)]` attribute, and every opcode that
//! does appear must be unique across the whole compiled schema, not just
//! within one file.

use std::collections::HashMap;

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::ir::Schema;
use crate::span::Span;

pub fn check_opcode_uniqueness(schema: &Schema, diags: &mut Vec<Diagnostic>) {
    let mut seen: HashMap<u32, Span> = HashMap::new();
    for (_, def) in schema.all() {
        let Some(opcode) = def.opcode() else { continue };
        match seen.get(&opcode) {
            Some(&first_span) => {
                diags.push(Diagnostic::new(DiagnosticKind::DuplicateOpcode { opcode }, def.header().span, format!("opcode {opcode:#x} is already used")).with_secondary(first_span));
            }
            None => {
                seen.insert(opcode, def.header().span);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{DefHeader, Definition};
    use crate::span::FileId;

    fn header(name: &str) -> DefHeader {
        DefHeader { name: name.to_string(), attributes: vec![], documentation: None, span: Span::point(FileId(0), 0), parent: None }
    }

    #[test]
    fn reports_duplicate_opcode_across_different_kinds() {
        let mut schema = Schema::new();
        schema.alloc(Definition::Struct { header: header("A"), is_readonly: false, fields: vec![], opcode: Some(1) });
        schema.alloc(Definition::Message { header: header("B"), fields: vec![], opcode: Some(1) });
        let mut diags = Vec::new();
        check_opcode_uniqueness(&schema, &mut diags);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::DuplicateOpcode { opcode: 1 });
    }

    #[test]
    fn distinct_opcodes_are_fine() {
        let mut schema = Schema::new();
        schema.alloc(Definition::Struct { header: header("A"), is_readonly: false, fields: vec![], opcode: Some(1) });
        schema.alloc(Definition::Struct { header: header("B"), is_readonly: false, fields: vec![], opcode: Some(2) });
        let mut diags = Vec::new();
        check_opcode_uniqueness(&schema, &mut diags);
        assert!(diags.is_empty());
    }
}
