//! Source locations: a multi-file map from byte offsets to `(file, line, column)`.

/// Identifies one source file handed to [`compile`](crate::compile).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FileId(pub u32);

/// A half-open byte range within one source file.
///
/// Attached to every token, AST node, and diagnostic. `start`/`end` are byte
/// offsets into that file's text, not the concatenation of all files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub file: FileId,
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(file: FileId, start: usize, end: usize) -> Self {
        Self { file, start, end }
    }

    /// A zero-width span at `pos`, used for end-of-file markers.
    pub fn point(file: FileId, pos: usize) -> Self {
        Self { file, start: pos, end: pos }
    }

    /// The smallest span covering both `self` and `other`. Panics if they
    /// name different files — callers should never merge spans across files.
    pub fn merge(self, other: Span) -> Span {
        assert_eq!(self.file, other.file, "cannot merge spans from different files");
        Span {
            file: self.file,
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(self) -> bool {
        self.start == self.end
    }
}

/// One source file's name and text, plus a precomputed line-start table so
/// span resolution doesn't rescan the whole file per diagnostic.
struct SourceFile {
    name: String,
    text: String,
    /// Byte offset of the start of each line; `line_starts[0] == 0`.
    line_starts: Vec<usize>,
}

impl SourceFile {
    fn new(name: String, text: String) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { name, text, line_starts }
    }

    /// 1-based `(line, column)` for a byte offset into this file.
    fn line_col(&self, offset: usize) -> (usize, usize) {
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let col = offset - self.line_starts[line_idx] + 1;
        (line_idx + 1, col)
    }

    fn line_text(&self, line: usize) -> &str {
        let start = self.line_starts[line - 1];
        let end = self
            .line_starts
            .get(line)
            .map(|&s| s.saturating_sub(1))
            .unwrap_or(self.text.len());
        &self.text[start..end.max(start)]
    }
}

/// Holds every source file passed to [`compile`](crate::compile), in input
/// order, and resolves spans to human-readable locations.
///
/// Diagnostics are emitted in source order within a file and in input order
/// across files (§5) — callers should lex/parse files in the order they
/// appear here and that ordering falls out naturally.
#[derive(Default)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a source file and returns the `FileId` its tokens/spans
    /// should carry. Imports are resolved to text by the host before this
    /// is called — the core never touches a filesystem.
    pub fn add_file(&mut self, name: impl Into<String>, text: impl Into<String>) -> FileId {
        let id = FileId(self.files.len() as u32);
        self.files.push(SourceFile::new(name.into(), text.into()));
        id
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn file_name(&self, file: FileId) -> &str {
        &self.files[file.0 as usize].name
    }

    pub fn text(&self, file: FileId) -> &str {
        &self.files[file.0 as usize].text
    }

    pub fn text_at(&self, span: Span) -> &str {
        &self.text(span.file)[span.start..span.end]
    }

    /// Resolves a span's start to `(file_name, line, column)` for rendering.
    pub fn resolve(&self, span: Span) -> (&str, usize, usize) {
        let file = &self.files[span.file.0 as usize];
        let (line, col) = file.line_col(span.start);
        (&file.name, line, col)
    }

    /// The full text of the line a span starts on, for source excerpts.
    pub fn line_text(&self, span: Span) -> &str {
        let file = &self.files[span.file.0 as usize];
        let (line, _) = file.line_col(span.start);
        file.line_text(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_first_line() {
        let mut map = SourceMap::new();
        let f = map.add_file("a.bop", "struct Foo {\n  int32 x;\n}\n");
        let span = Span::new(f, 0, 6);
        let (name, line, col) = map.resolve(span);
        assert_eq!(name, "a.bop");
        assert_eq!((line, col), (1, 1));
    }

    #[test]
    fn resolves_later_line_and_column() {
        let mut map = SourceMap::new();
        let f = map.add_file("a.bop", "struct Foo {\n  int32 x;\n}\n");
        let offset = "struct Foo {\n  ".len();
        let span = Span::new(f, offset, offset + 5);
        let (_, line, col) = map.resolve(span);
        assert_eq!(line, 2);
        assert_eq!(col, 3);
    }

    #[test]
    fn line_text_extracts_exact_line() {
        let mut map = SourceMap::new();
        let f = map.add_file("a.bop", "struct Foo {\n  int32 x;\n}\n");
        let offset = "struct Foo {\n  ".len();
        let span = Span::new(f, offset, offset + 5);
        assert_eq!(map.line_text(span), "  int32 x;");
    }

    #[test]
    fn multiple_files_keep_independent_line_tables() {
        let mut map = SourceMap::new();
        let a = map.add_file("a.bop", "const int32 X = 1;\n");
        let b = map.add_file("b.bop", "\n\nconst int32 Y = 2;\n");
        let span_b = Span::new(b, "\n\n".len(), "\n\nconst".len());
        let (name, line, _) = map.resolve(span_b);
        assert_eq!(name, "b.bop");
        assert_eq!(line, 3);
        assert_ne!(a, b);
    }

    #[test]
    fn merge_spans_takes_union() {
        let file = FileId(0);
        let a = Span::new(file, 5, 10);
        let b = Span::new(file, 2, 7);
        let merged = a.merge(b);
        assert_eq!(merged, Span::new(file, 2, 10));
    }

    #[test]
    fn text_at_slices_exact_lexeme() {
        let mut map = SourceMap::new();
        let f = map.add_file("a.bop", "struct Foo {}");
        let span = Span::new(f, 0, 6);
        assert_eq!(map.text_at(span), "struct");
    }
}
