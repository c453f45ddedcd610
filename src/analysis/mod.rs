//! Semantic analysis (§4.3): name resolution followed by a fixed sequence of
//! independent validation passes over the resulting `Schema`. Each pass is
//! best-effort — one struct's infinite-size cycle doesn't stop another
//! struct's fields from being checked — so callers get every diagnostic the
//! schema has, not just the first one found.

mod const_eval;
mod derive;
mod invariants;
mod opcodes;
mod recursion;
mod resolve;

pub use derive::{is_fixed_size, minimal_encoded_size};

use crate::ast;
use crate::diagnostics::Diagnostic;
use crate::ir::Schema;

pub fn analyze(top_level: &[ast::Definition]) -> (Schema, Vec<Diagnostic>) {
    let (schema, mut diags) = resolve::build_schema(top_level);

    invariants::check_message_indices(&schema, &mut diags);
    invariants::check_union_discriminators(&schema, &mut diags);
    invariants::check_enum_values(&schema, &mut diags);
    recursion::check_struct_recursion(&schema, &mut diags);
    opcodes::check_opcode_uniqueness(&schema, &mut diags);
    derive::check_struct_fields_fixed_size(&schema, &mut diags);

    (schema, diags)
}
