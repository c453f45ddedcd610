//! Stage 1 of the pipeline (§4.1): turns one source file into a token
//! stream. Single-threaded, synchronous, pull-based — there is no
//! background work and no I/O; the caller already read the file into a
//! `&str` and handed it to [`SourceMap`](crate::span::SourceMap).

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::span::{FileId, Span};
use crate::token::{keyword_for, LiteralValue, Token, TokenKind};

pub struct Lexer<'a> {
    source: &'a str,
    file: FileId,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, file: FileId) -> Self {
        Self { source, file, pos: 0 }
    }

    /// Produces the full token stream for this file, terminated by `Eof`.
    /// Errors are collected rather than aborting the scan outright, so a
    /// single bad file still reports every lexical problem it has; the
    /// caller should not proceed to parsing if `errors` is non-empty.
    pub fn tokenize(mut self) -> (Vec<Token>, Vec<Diagnostic>) {
        let mut tokens = Vec::new();
        let mut errors = Vec::new();

        loop {
            self.skip_trivia(&mut tokens, &mut errors);
            let start = self.pos;
            match self.peek() {
                None => {
                    tokens.push(Token::new(TokenKind::Eof, "", Span::point(self.file, start)));
                    break;
                }
                Some(c) => match self.scan_token(c) {
                    Ok(tok) => tokens.push(tok),
                    Err(diag) => {
                        errors.push(diag);
                        self.advance();
                    }
                },
            }
        }

        (tokens, errors)
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_at(&self, byte_offset: usize) -> Option<char> {
        self.source.get(self.pos + byte_offset..)?.chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn starts_with(&self, s: &str) -> bool {
        self.source[self.pos..].starts_with(s)
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(self.file, start, self.pos)
    }

    fn lexeme_from(&self, start: usize) -> &'a str {
        &self.source[start..self.pos]
    }

    /// Consumes whitespace, line comments, and block comments. Block
    /// comments are pushed onto `tokens` as `BlockComment` — the parser
    /// decides whether to actually attach one as documentation; line
    /// comments are discarded outright.
    fn skip_trivia(&mut self, tokens: &mut Vec<Token>, errors: &mut Vec<Diagnostic>) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                Some('/') if self.peek_at(1) == Some('*') => {
                    let start = self.pos;
                    match self.scan_block_comment() {
                        Ok(cleaned) => {
                            tokens.push(Token::new(
                                TokenKind::BlockComment(cleaned),
                                self.lexeme_from(start),
                                self.span_from(start),
                            ));
                        }
                        Err(diag) => errors.push(diag),
                    }
                }
                _ => break,
            }
        }
    }

    /// Nestable `/* ... */`. Returns the cleaned inner text: each line
    /// trimmed of leading whitespace and a leading `*` decoration, joined
    /// by `\n`.
    fn scan_block_comment(&mut self) -> Result<String, Diagnostic> {
        let comment_start = self.pos;
        self.advance(); // '/'
        self.advance(); // '*'
        let mut depth = 1usize;
        let inner_start = self.pos;
        let mut inner_end = self.pos;

        loop {
            if self.starts_with("/*") {
                self.advance();
                self.advance();
                depth += 1;
                inner_end = self.pos;
                continue;
            }
            if self.starts_with("*/") {
                inner_end = self.pos;
                self.advance();
                self.advance();
                depth -= 1;
                if depth == 0 {
                    break;
                }
                continue;
            }
            match self.advance() {
                Some(_) => inner_end = self.pos,
                None => {
                    return Err(Diagnostic::new(
                        DiagnosticKind::UnterminatedBlockComment,
                        self.span_from(comment_start),
                        "unterminated block comment",
                    ))
                }
            }
        }

        Ok(clean_block_comment(&self.source[inner_start..inner_end]))
    }

    fn scan_token(&mut self, c: char) -> Result<Token, Diagnostic> {
        let start = self.pos;

        if let Some(tok) = self.scan_symbol(c, start) {
            return Ok(tok);
        }
        if c.is_alphabetic() || c == '_' {
            return Ok(self.scan_identifier_or_keyword(start));
        }
        if c == '\'' || c == '"' {
            return self.scan_string(c, start);
        }
        if c == '-' || c.is_ascii_digit() {
            return self.scan_number(start);
        }

        self.advance();
        Err(Diagnostic::new(
            DiagnosticKind::UnrecognizedCharacter { ch: c },
            self.span_from(start),
            format!("unrecognized character '{c}'"),
        ))
    }

    fn scan_symbol(&mut self, c: char, start: usize) -> Option<Token> {
        if self.starts_with("->") {
            self.advance();
            self.advance();
            return Some(Token::new(TokenKind::Arrow, "->", self.span_from(start)));
        }
        let kind = match c {
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '=' => TokenKind::Equals,
            '|' => TokenKind::Pipe,
            '?' => TokenKind::Question,
            '<' => TokenKind::LAngle,
            '>' => TokenKind::RAngle,
            ':' => TokenKind::Colon,
            _ => return None,
        };
        self.advance();
        Some(Token::new(kind, self.lexeme_from(start), self.span_from(start)))
    }

    fn scan_identifier_or_keyword(&mut self, start: usize) -> Token {
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }
        let text = self.lexeme_from(start);
        let kind = match text {
            "inf" => TokenKind::Literal(LiteralValue::Float("inf".to_string())),
            "nan" => TokenKind::Literal(LiteralValue::Float("nan".to_string())),
            other => keyword_for(other).unwrap_or_else(|| TokenKind::Identifier(other.to_string())),
        };
        Token::new(kind, text, self.span_from(start))
    }

    /// Quotes double to escape themselves (`''`, `""`); backslash has no
    /// special meaning; newlines are allowed inside the literal.
    fn scan_string(&mut self, quote: char, start: usize) -> Result<Token, Diagnostic> {
        self.advance(); // opening quote
        let mut value = String::new();
        loop {
            match self.peek() {
                None => {
                    return Err(Diagnostic::new(
                        DiagnosticKind::UnterminatedString,
                        self.span_from(start),
                        "unterminated string literal",
                    ))
                }
                Some(c) if c == quote => {
                    self.advance();
                    if self.peek() == Some(quote) {
                        value.push(quote);
                        self.advance();
                    } else {
                        break;
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
            }
        }
        Ok(Token::new(
            TokenKind::Literal(LiteralValue::String(value)),
            self.lexeme_from(start),
            self.span_from(start),
        ))
    }

    fn scan_number(&mut self, start: usize) -> Result<Token, Diagnostic> {
        let negative = self.peek() == Some('-');
        if negative {
            self.advance();
            if self.starts_with("inf") {
                self.advance();
                self.advance();
                self.advance();
                return Ok(Token::new(
                    TokenKind::Literal(LiteralValue::Float("-inf".to_string())),
                    self.lexeme_from(start),
                    self.span_from(start),
                ));
            }
        }

        if self.starts_with("0x") || self.starts_with("0X") {
            self.advance();
            self.advance();
            let digits_start = self.pos;
            while let Some(c) = self.peek() {
                if c.is_ascii_hexdigit() {
                    self.advance();
                } else {
                    break;
                }
            }
            if self.pos == digits_start {
                return Err(Diagnostic::new(
                    DiagnosticKind::MalformedLiteral { reason: "empty hex literal".into() },
                    self.span_from(start),
                    "malformed hex literal",
                ));
            }
            return Ok(Token::new(
                TokenKind::Literal(LiteralValue::Integer {
                    digits: self.lexeme_from(digits_start).to_string(),
                    negative,
                    radix: 16,
                }),
                self.lexeme_from(start),
                self.span_from(start),
            ));
        }

        let digits_start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }
        if self.pos == digits_start {
            self.advance();
            return Err(Diagnostic::new(
                DiagnosticKind::MalformedLiteral { reason: "expected digits".into() },
                self.span_from(start),
                "malformed number literal",
            ));
        }

        let mut is_float = false;
        if self.peek() == Some('.') && self.peek_at(1).map(|c| c.is_ascii_digit()).unwrap_or(false) {
            is_float = true;
            self.advance(); // '.'
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    self.advance();
                } else {
                    break;
                }
            }
        }

        if is_float {
            Ok(Token::new(
                TokenKind::Literal(LiteralValue::Float(self.lexeme_from(start).to_string())),
                self.lexeme_from(start),
                self.span_from(start),
            ))
        } else {
            Ok(Token::new(
                TokenKind::Literal(LiteralValue::Integer {
                    digits: self.lexeme_from(digits_start).to_string(),
                    negative,
                    radix: 10,
                }),
                self.lexeme_from(start),
                self.span_from(start),
            ))
        }
    }
}

fn clean_block_comment(raw: &str) -> String {
    raw.lines()
        .map(|line| {
            let trimmed = line.trim_start();
            trimmed.strip_prefix('*').map(|s| s.trim_start()).unwrap_or(trimmed)
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
