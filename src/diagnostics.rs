//! Diagnostics collected by every stage of the pipeline (§7).
//!
//! Nothing in this crate panics on malformed user input; a panic here is a
//! bug. Diagnostics are collected into a `Vec` and returned, never thrown.

use crate::span::{SourceMap, Span};
use crate::token::TokenKind;

#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticKind {
    // Lex
    UnrecognizedCharacter { ch: char },
    UnterminatedString,
    UnterminatedBlockComment,

    // Parse
    UnexpectedToken { expected: String, found: TokenKind },
    MissingSemicolon,
    MalformedAttribute,
    MalformedLiteral { reason: String },

    // Semantic
    DuplicateDefinition { name: String },
    UnknownType { name: String },
    DuplicateFieldIndex { index: u8 },
    FieldIndexOutOfRange { index: i64 },
    FieldIndexNotIncreasing { index: u8, previous: u8 },
    ReservedFieldIndexZero,
    DuplicateOpcode { opcode: u32 },
    InvalidUnionBranch,
    InfiniteStruct { cycle: Vec<String> },
    ConstTypeMismatch { expected: String },
    ConstOutOfRange,
    InvalidGuid,
    EnumValueOutOfRange,

    // Generator-surfaced consistency checks
    UnsupportedFeature { description: String },
}

/// A single diagnostic. Carries the span(s) that locate it in source and a
/// short human message; rendering (source excerpts, colors) is the caller's
/// job — the core only supplies the facts.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub primary_span: Span,
    pub secondary_spans: Vec<Span>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, span: Span, message: impl Into<String>) -> Self {
        Self { kind, primary_span: span, secondary_spans: Vec::new(), message: message.into() }
    }

    pub fn with_secondary(mut self, span: Span) -> Self {
        self.secondary_spans.push(span);
        self
    }

    /// Renders as `file:line:col: kind: message` plus a source excerpt with
    /// an underline, matching the CLI's `--generator`-agnostic stderr form
    /// described in §6.
    pub fn render(&self, source_map: &SourceMap) -> String {
        let (file, line, col) = source_map.resolve(self.primary_span);
        let line_text = source_map.line_text(self.primary_span);
        let underline_len = self.primary_span.len().max(1);
        let underline = format!("{}{}", " ".repeat(col.saturating_sub(1)), "^".repeat(underline_len));

        format!(
            "{file}:{line}:{col}: error: {msg}\n  {line_no:>4} | {text}\n       | {underline}",
            file = file,
            line = line,
            col = col,
            msg = self.message,
            line_no = line,
            text = line_text,
            underline = underline,
        )
    }
}
