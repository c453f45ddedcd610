//! The double-dispatch traversal generators are built on (§4.5). A
//! `Visitor` implementation overrides only the `visit_*` methods it cares
//! about; the `walk_*` free functions supply the default traversal so
//! overriding one method doesn't require reimplementing recursion into its
//! children.
//!
//! A message or `[opt]` field is allowed to reference its own enclosing
//! definition (§8 boundary cases) since both are sparse, indirection-backed
//! encodings rather than inline ones — so the graph `walk_*` traverses can
//! have cycles even though the schema is valid. Every method threads an
//! `in_progress: &mut HashSet<DefId>` of definitions currently on the walk's
//! call stack; re-entering one is a no-op instead of a stack overflow.

use std::collections::HashSet;

use crate::ir::{DefId, Definition, Schema, TypeRef};

pub trait Visitor: Sized {
    fn visit_schema(&mut self, schema: &Schema) {
        walk_schema(self, schema);
    }

    fn visit_definition(&mut self, schema: &Schema, def: &Definition, in_progress: &mut HashSet<DefId>) {
        walk_definition(self, schema, def, in_progress);
    }

    fn visit_type(&mut self, schema: &Schema, ty: &TypeRef, in_progress: &mut HashSet<DefId>) {
        walk_type(self, schema, ty, in_progress);
    }
}

pub fn walk_schema<V: Visitor>(v: &mut V, schema: &Schema) {
    let mut in_progress = HashSet::new();
    for &id in &schema.roots {
        visit_def(v, schema, id, &mut in_progress);
    }
}

pub fn walk_definition<V: Visitor>(v: &mut V, schema: &Schema, def: &Definition, in_progress: &mut HashSet<DefId>) {
    match def {
        Definition::Enum { .. } => {}

        Definition::Struct { fields, .. } => {
            for field in fields {
                v.visit_type(schema, &field.ty, in_progress);
            }
        }

        Definition::Message { fields, .. } => {
            for field in fields {
                v.visit_type(schema, &field.ty, in_progress);
            }
        }

        Definition::Union { branches, .. } => {
            for branch in branches {
                visit_def(v, schema, branch.def, in_progress);
            }
        }

        Definition::Const { .. } => {}
    }
}

pub fn walk_type<V: Visitor>(v: &mut V, schema: &Schema, ty: &TypeRef, in_progress: &mut HashSet<DefId>) {
    match ty {
        TypeRef::Scalar(_) => {}
        TypeRef::Array(inner) | TypeRef::Option(inner) => v.visit_type(schema, inner, in_progress),
        TypeRef::Map(key, value) => {
            v.visit_type(schema, key, in_progress);
            v.visit_type(schema, value, in_progress);
        }
        TypeRef::Def(id) => visit_def(v, schema, *id, in_progress),
    }
}

/// Visits `id` unless it's already on the current path, then removes it
/// again so a second, non-cyclic reference elsewhere in the schema still
/// gets visited.
fn visit_def<V: Visitor>(v: &mut V, schema: &Schema, id: DefId, in_progress: &mut HashSet<DefId>) {
    if !in_progress.insert(id) {
        return;
    }
    v.visit_definition(schema, schema.get(id), in_progress);
    in_progress.remove(&id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{ConstValue, DefHeader, StructField};
    use crate::span::{FileId, Span};
    use crate::token::BaseType;

    fn header(name: &str) -> DefHeader {
        DefHeader { name: name.to_string(), attributes: vec![], documentation: None, span: Span::point(FileId(0), 0), parent: None }
    }

    struct DefinitionCounter {
        count: usize,
    }

    impl Visitor for DefinitionCounter {
        fn visit_definition(&mut self, schema: &Schema, def: &Definition, in_progress: &mut HashSet<DefId>) {
            self.count += 1;
            walk_definition(self, schema, def, in_progress);
        }
    }

    #[test]
    fn counts_struct_and_its_referenced_definition() {
        let mut schema = Schema::new();
        let inner = schema.alloc(Definition::Struct { header: header("Inner"), is_readonly: false, fields: vec![], opcode: None });
        schema.register_root("Inner".into(), inner);

        let field = StructField {
            name: "x".into(),
            ty: TypeRef::Def(inner),
            attributes: vec![],
            documentation: None,
            span: Span::point(FileId(0), 0),
        };
        let outer = schema.alloc(Definition::Struct { header: header("Outer"), is_readonly: false, fields: vec![field], opcode: None });
        schema.register_root("Outer".into(), outer);

        let mut counter = DefinitionCounter { count: 0 };
        let mut in_progress = HashSet::new();
        counter.visit_definition(&schema, schema.get(outer), &mut in_progress);
        assert_eq!(counter.count, 2);
    }

    #[test]
    fn walk_type_descends_through_array_and_option() {
        let mut schema = Schema::new();
        let leaf = schema.alloc(Definition::Const { header: header("C"), ty: BaseType::Int32, value: ConstValue::Int(1) });

        struct TypeCollector {
            scalars: Vec<BaseType>,
        }
        impl Visitor for TypeCollector {
            fn visit_type(&mut self, schema: &Schema, ty: &TypeRef, in_progress: &mut HashSet<DefId>) {
                if let TypeRef::Scalar(base) = ty {
                    self.scalars.push(*base);
                }
                walk_type(self, schema, ty, in_progress);
            }
        }

        let ty = TypeRef::Array(Box::new(TypeRef::Option(Box::new(TypeRef::Scalar(BaseType::UInt16)))));
        let mut collector = TypeCollector { scalars: vec![] };
        let mut in_progress = HashSet::new();
        collector.visit_type(&schema, &ty, &mut in_progress);
        assert_eq!(collector.scalars, vec![BaseType::UInt16]);
        let _ = leaf;
    }

    #[test]
    fn self_referential_message_does_not_overflow_the_stack() {
        let mut schema = Schema::new();
        let id = schema.alloc(Definition::Message { header: header("Tree"), fields: vec![], opcode: None });
        if let Definition::Message { fields, .. } = schema.get_mut(id) {
            *fields = vec![crate::ir::MessageField {
                index: 1,
                name: "child".into(),
                ty: TypeRef::Def(id),
                attributes: vec![],
                documentation: None,
                span: Span::point(FileId(0), 0),
            }];
        }
        schema.register_root("Tree".into(), id);

        let mut counter = DefinitionCounter { count: 0 };
        counter.visit_schema(&schema);
        assert_eq!(counter.count, 1);
    }
}
