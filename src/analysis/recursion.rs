//! Struct recursion checking (§3, §9): a `struct` is laid out inline with no
//! indirection, so a direct (unwrapped) struct-to-struct field reference
//! forces the referenced struct's bytes to be embedded at that point. A
//! cycle in that "must be stored inline" graph has no finite size and is
//! rejected as `InfiniteStruct`. Wrapping the reference in `array`, `map`,
//! or `[opt]` breaks the cycle, since those are length-prefixed — so does
//! referencing it through a `message` or `union`, both sparse by design.

use std::collections::HashMap;

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::ir::{DefId, Definition, Schema, TypeRef};

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    InProgress,
    Done,
}

pub fn check_struct_recursion(schema: &Schema, diags: &mut Vec<Diagnostic>) {
    let graph = build_inline_graph(schema);
    let mut marks: HashMap<DefId, Mark> = HashMap::new();
    let mut reported: std::collections::HashSet<DefId> = std::collections::HashSet::new();

    // Walk structs in `DefId`/source order, not `graph.keys()`'s hash order,
    // so which node a cycle is reported against — and the order diagnostics
    // come out in — is deterministic (§5, §8 property 6).
    for (id, _) in schema.all() {
        if graph.contains_key(&id) && !marks.contains_key(&id) {
            let mut path = Vec::new();
            dfs(schema, &graph, id, &mut marks, &mut path, &mut reported, diags);
        }
    }
}

fn build_inline_graph(schema: &Schema) -> HashMap<DefId, Vec<DefId>> {
    let mut graph = HashMap::new();
    for (id, def) in schema.all() {
        if let Definition::Struct { fields, .. } = def {
            let deps = fields
                .iter()
                .filter_map(|f| match &f.ty {
                    TypeRef::Def(target) if matches!(schema.get(*target), Definition::Struct { .. }) => Some(*target),
                    _ => None,
                })
                .collect();
            graph.insert(id, deps);
        }
    }
    graph
}

fn dfs(
    schema: &Schema,
    graph: &HashMap<DefId, Vec<DefId>>,
    id: DefId,
    marks: &mut HashMap<DefId, Mark>,
    path: &mut Vec<DefId>,
    reported: &mut std::collections::HashSet<DefId>,
    diags: &mut Vec<Diagnostic>,
) {
    marks.insert(id, Mark::InProgress);
    path.push(id);

    if let Some(deps) = graph.get(&id) {
        for &dep in deps {
            match marks.get(&dep) {
                Some(Mark::InProgress) => {
                    if reported.insert(id) {
                        let cycle_start = path.iter().position(|&x| x == dep).unwrap_or(0);
                        let names: Vec<String> = path[cycle_start..].iter().map(|&d| schema.get(d).name().to_string()).collect();
                        diags.push(Diagnostic::new(
                            DiagnosticKind::InfiniteStruct { cycle: names.clone() },
                            schema.get(id).header().span,
                            format!("struct `{}` has infinite size: {}", schema.get(id).name(), names.join(" -> ")),
                        ));
                    }
                }
                Some(Mark::Done) => {}
                None => dfs(schema, graph, dep, marks, path, reported, diags),
            }
        }
    }

    path.pop();
    marks.insert(id, Mark::Done);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{DefHeader, StructField};
    use crate::span::{FileId, Span};

    fn header(name: &str) -> DefHeader {
        DefHeader { name: name.to_string(), attributes: vec![], documentation: None, span: Span::point(FileId(0), 0), parent: None }
    }

    fn field(name: &str, ty: TypeRef) -> StructField {
        StructField { name: name.to_string(), ty, attributes: vec![], documentation: None, span: Span::point(FileId(0), 0) }
    }

    #[test]
    fn direct_self_reference_is_infinite() {
        let mut schema = Schema::new();
        let id = schema.alloc(Definition::Struct { header: header("Node"), is_readonly: false, fields: vec![], opcode: None });
        if let Definition::Struct { fields, .. } = schema.get_mut(id) {
            *fields = vec![field("next", TypeRef::Def(id))];
        }
        let mut diags = Vec::new();
        check_struct_recursion(&schema, &mut diags);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::InfiniteStruct { cycle: vec!["Node".to_string()] });
    }

    #[test]
    fn reference_through_array_is_finite() {
        let mut schema = Schema::new();
        let id = schema.alloc(Definition::Struct { header: header("Node"), is_readonly: false, fields: vec![], opcode: None });
        if let Definition::Struct { fields, .. } = schema.get_mut(id) {
            *fields = vec![field("children", TypeRef::Array(Box::new(TypeRef::Def(id))))];
        }
        let mut diags = Vec::new();
        check_struct_recursion(&schema, &mut diags);
        assert!(diags.is_empty());
    }

    #[test]
    fn mutual_recursion_between_two_structs_is_infinite() {
        let mut schema = Schema::new();
        let a = schema.alloc(Definition::Struct { header: header("A"), is_readonly: false, fields: vec![], opcode: None });
        let b = schema.alloc(Definition::Struct { header: header("B"), is_readonly: false, fields: vec![field("a", TypeRef::Def(a))], opcode: None });
        if let Definition::Struct { fields, .. } = schema.get_mut(a) {
            *fields = vec![field("b", TypeRef::Def(b))];
        }
        let mut diags = Vec::new();
        check_struct_recursion(&schema, &mut diags);
        assert_eq!(diags.len(), 1);
    }
}
