//! Core compiler pipeline for the Bebop binary schema language: lexer,
//! parser, semantic analyzer, and the validated IR generators consume
//! (§2, §6). A host embeds this crate, resolves `import` statements to
//! source text itself, and hands every file's final text to [`compile`] in
//! one call — the core never touches the filesystem.

pub mod analysis;
pub mod arena;
pub mod ast;
pub mod diagnostics;
pub mod generator;
pub mod ir;
pub mod lexer;
pub mod parser;
pub mod scope;
pub mod span;
pub mod token;
pub mod visitor;
pub mod wire;

pub use analysis::{is_fixed_size, minimal_encoded_size};
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use generator::{DebugGenerator, Generator};
pub use ir::{DefId, Schema};
pub use lexer::Lexer;
pub use parser::Parser;
pub use span::{FileId, SourceMap, Span};
pub use visitor::Visitor;

use arena::Arena;

/// Compiles a set of already-resolved source files into a validated
/// `Schema`, in input order (§6). A file's lexical errors stop it from
/// being parsed, but not its siblings; every other diagnostic across every
/// stage is collected and returned together. Returns the schema only when
/// compilation is completely clean — partial results live only in the
/// diagnostics' spans, never in a returned `Schema`, so a caller can never
/// mistake a broken schema for a valid one.
pub fn compile(sources: &[(&str, &str)]) -> Result<Schema, Vec<Diagnostic>> {
    let mut source_map = SourceMap::new();
    let mut diagnostics = Vec::new();
    let type_arena: Arena<ast::TypeRef> = Arena::new();
    let mut definitions = Vec::new();

    for (name, text) in sources {
        let file = source_map.add_file(*name, *text);
        let (tokens, lex_errors) = Lexer::new(text, file).tokenize();
        if !lex_errors.is_empty() {
            diagnostics.extend(lex_errors);
            continue;
        }

        let (ast, parse_errors) = Parser::new(tokens, &type_arena).parse();
        diagnostics.extend(parse_errors);
        definitions.extend(ast.definitions);
    }

    if !diagnostics.is_empty() {
        return Err(diagnostics);
    }

    let (schema, analysis_errors) = analysis::analyze(&definitions);
    if !analysis_errors.is_empty() {
        return Err(analysis_errors);
    }

    Ok(schema)
}
