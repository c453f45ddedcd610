//! The pluggable generator interface (§4.5): a target-language-neutral seam
//! between the validated `Schema` and whatever output a back end produces.
//! This crate ships one reference implementation, `DebugGenerator`, whose
//! only job is to exercise the trait without depending on any real target
//! language.

use std::collections::HashSet;

use crate::analysis;
use crate::ir::{DefId, Definition, Schema, TypeRef};
use crate::visitor::{self, Visitor};

/// A back end that turns a validated `Schema` into target-language source.
/// `emit` produces the main output for one schema; `write_auxiliary_files`
/// returns any additional named files a back end needs alongside it (shared
/// runtime support, a project manifest, ...) — most generators return none.
pub trait Generator {
    fn emit(&self, schema: &Schema) -> Result<String, String>;

    fn write_auxiliary_files(&self, _schema: &Schema) -> Vec<(String, String)> {
        Vec::new()
    }
}

/// Dumps every definition in a schema as indented text. Exists so the
/// `Visitor`/`Generator` traits have at least one concrete, dependency-free
/// implementation exercising the full traversal.
#[derive(Debug, Default)]
pub struct DebugGenerator;

impl Generator for DebugGenerator {
    fn emit(&self, schema: &Schema) -> Result<String, String> {
        let mut dumper = Dumper { out: String::new() };
        dumper.visit_schema(schema);
        Ok(dumper.out)
    }
}

struct Dumper {
    out: String,
}

impl Visitor for Dumper {
    fn visit_definition(&mut self, schema: &Schema, def: &Definition, in_progress: &mut HashSet<DefId>) {
        let header = def.header();
        self.out.push_str(&format!("{}: {}\n", kind_name(def), header.name));
        if let Some(doc) = &header.documentation {
            self.out.push_str(&format!("  doc: {doc}\n"));
        }
        for attr in &header.attributes {
            self.out.push_str(&format!("  attribute: {}\n", attr.name));
        }
        if !matches!(def, Definition::Const { .. } | Definition::Enum { .. }) {
            let ty = TypeRef::Def(schema.id_of(def).expect("definition came from this schema"));
            self.out.push_str(&format!(
                "  minimal encoded size: {} bytes (fixed: {})\n",
                analysis::minimal_encoded_size(schema, &ty),
                analysis::is_fixed_size(schema, &ty),
            ));
        }
        visitor::walk_definition(self, schema, def, in_progress);
    }

    fn visit_type(&mut self, schema: &Schema, ty: &TypeRef, in_progress: &mut HashSet<DefId>) {
        self.out.push_str(&format!("  field type: {}\n", type_name(ty)));
        visitor::walk_type(self, schema, ty, in_progress);
    }
}

fn kind_name(def: &Definition) -> &'static str {
    match def {
        Definition::Enum { .. } => "enum",
        Definition::Struct { .. } => "struct",
        Definition::Message { .. } => "message",
        Definition::Union { .. } => "union",
        Definition::Const { .. } => "const",
    }
}

fn type_name(ty: &TypeRef) -> String {
    match ty {
        TypeRef::Scalar(base) => format!("{base:?}"),
        TypeRef::Array(inner) => format!("{}[]", type_name(inner)),
        TypeRef::Map(k, v) => format!("map[{}, {}]", type_name(k), type_name(v)),
        TypeRef::Option(inner) => format!("{}?", type_name(inner)),
        TypeRef::Def(_) => "<definition>".to_string(),
    }
}
