//! Lexer for the Loon programming language
//!
//! Handles tokenization including:
//! - Identifiers (`foo`, `@prim`, `:keyword`, `Path/Like`) and operator runs (`!=`, `<==<`)
//! - Literals (int, float, rune, quoted and raw strings)
//! - Line and block comments, kept as tokens
//! - Indentation-based blocks (synthetic `Begin`/`End` tokens, the offside rule)
//!
//! ## Module Structure
//!
//! - `tokens` - Token types (TokenKind, Token)
//! - `strings` - String/rune/raw-string and comment scanning
//! - `numbers` - Numeric literal scanning
//! - `indent` - Begin/End emission and whitespace hygiene
//!
//! Lexing never fails as a whole: malformed lexemes produce diagnostics and scanning continues
//! with the remaining input.

mod indent;
mod numbers;
mod strings;
pub mod tokens;

pub use tokens::{Token, TokenKind};

use crate::diagnostics::{Diagnostic, errors};
use crate::span::{Pos, Span};

// ============================================================================
// LEXER STATE
// ----------------------------------------------------------------------------
// Per lexeme:
//
// [skip whitespace] → scan raw lexeme → classify
//                                          ↓
//                         first token on a new line (bracket depth 0)?
//                                          ↓ yes
//                         offside rule → Begin / End / End+Begin
//                                          ↓
//                         glue adjacent opish chars, split `10.` into `10` `.`
// ============================================================================

/// Output of [`lex`]: the token sequence plus any lexical diagnostics.
#[derive(Debug, Clone, Default)]
pub struct Lexed {
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Lexer for Loon source code.
pub struct Lexer<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    current_pos: usize,
    /// Line/char of the next unconsumed character.
    line: usize,
    column: usize,
    /// Columns of the open indentation levels, innermost last.
    indent_stack: Vec<usize>,
    /// Bracket depth; indentation is only tracked while this is zero or below.
    bracket_depth: isize,
    had_cr_err: bool,
    had_tab_err: bool,
    tokens: Vec<Token>,
    errors: Vec<Diagnostic>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            current_pos: 0,
            line: 1,
            column: 1,
            indent_stack: Vec::new(),
            bracket_depth: 0,
            had_cr_err: false,
            had_tab_err: false,
            tokens: Vec::with_capacity(source.len() / 3),
            errors: Vec::new(),
        }
    }

    /// Tokenize the entire source code.
    ///
    /// Every `Begin` in the result has a matching `End`: levels still open at the end of input are
    /// closed right after the last token.
    pub fn tokenize(mut self) -> Lexed {
        loop {
            self.skip_whitespace();
            let Some(c) = self.peek() else {
                break;
            };
            let start = self.current_pos;
            let start_pos = self.pos();
            let kind = self.scan_lexeme(c);
            self.push_token(Token::new(kind, start_pos, start, self.current_pos - start));
        }
        self.close_all_levels();

        Lexed {
            tokens: self.tokens,
            diagnostics: self.errors,
        }
    }

    // ========================================================================
    // Core character handling
    // ========================================================================

    fn pos(&self) -> Pos {
        Pos::new(self.line, self.column)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn peek_next(&self) -> Option<char> {
        let mut iter = self.source[self.current_pos..].chars();
        iter.next(); // skip current
        iter.next()
    }

    fn advance(&mut self) -> Option<char> {
        let (pos, c) = self.chars.next()?;
        self.current_pos = pos + c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(' ' | '\t' | '\n' | '\r') = self.peek() {
            self.advance();
        }
    }

    /// Record a malformed-lexeme diagnostic spanning `start` up to the current position.
    fn lexing_error(&mut self, start: Pos, detail: &str) {
        let span = Span::new(start, self.pos());
        self.errors.push(errors::lexing(span, detail));
    }

    /// The last non-layout token emitted so far.
    fn prev(&self) -> Option<&Token> {
        self.tokens.iter().rev().find(|tok| !tok.kind.is_layout())
    }

    // ========================================================================
    // Raw lexeme scanning
    // ========================================================================

    fn scan_lexeme(&mut self, c: char) -> TokenKind {
        if self.is_ident_start(c) {
            self.scan_identifier();
            return TokenKind::IdentWord;
        }
        match c {
            '0'..='9' => self.scan_number(),
            '.' if self.peek_next().is_some_and(|c| c.is_ascii_digit()) => self.scan_number(),
            '"' => {
                self.scan_string();
                TokenKind::LitStr
            }
            '`' => {
                self.scan_raw_string();
                TokenKind::LitStr
            }
            '\'' => {
                self.scan_rune();
                TokenKind::LitRune
            }
            '/' if matches!(self.peek_next(), Some('/' | '*')) => {
                self.scan_comment();
                TokenKind::Comment
            }
            '(' | ')' | '[' | ']' | '{' | '}' => {
                self.advance();
                TokenKind::Bracketing
            }
            _ => {
                self.advance();
                TokenKind::IdentOpish
            }
        }
    }

    /// Identifiers may start with a letter or `_`, with `@`, or with `:` when the colon is not
    /// glued onto a preceding identifier-ish token (so `foo:bar` keeps `:` apart while
    /// `foo :bar` lexes `:bar` as one identifier).
    fn is_ident_start(&self, c: char) -> bool {
        if c == '_' || c == '@' || c.is_alphabetic() {
            return true;
        }
        if c != ':' {
            return false;
        }
        match self.prev() {
            None => true,
            Some(prev) => {
                prev.kind == TokenKind::IdentOpish
                    || prev.is_bracket_opening(self.source, None)
                    || prev.end_offset() < self.current_pos
            }
        }
    }

    /// After the first character, identifiers also accept digits, and `/` when the identifier
    /// began with an uppercase letter.
    fn scan_identifier(&mut self) {
        let Some(first) = self.advance() else {
            return;
        };
        while let Some(c) = self.peek() {
            if c == '_' || c.is_alphabetic() || c.is_numeric() || (c == '/' && first.is_uppercase()) {
                self.advance();
            } else {
                break;
            }
        }
    }

    // ========================================================================
    // Classification passes
    // ========================================================================

    fn push_token(&mut self, tok: Token) {
        let prev = self.prev().copied();

        if let Some(prev) = prev
            && tok.is_whitespacelessly_right_after(&prev)
            && ((prev.kind.is_numeric_literal() && tok.kind == TokenKind::IdentWord)
                || (prev.kind.is_literal() && tok.kind.is_numeric_literal()))
        {
            let detail = format!("separate `{}` from `{}`", prev.src(self.source), tok.src(self.source));
            self.errors.push(errors::lexing(tok.span(self.source), &detail));
        }

        match prev {
            None => self.open_first_level(&tok),
            Some(prev) => {
                let prev_end_line = prev.span(self.source).end.line;
                if self.bracket_depth <= 0 && tok.pos.line > prev_end_line {
                    self.on_new_line(&prev, &tok);
                }
            }
        }

        // only now can the bracket depth be adjusted
        if let Some((_, opening)) = tok.bracket(self.source) {
            self.bracket_depth += if opening { 1 } else { -1 };
        }

        // multi-char operators such as `!=` arrive as single-char tokens; stitch them together
        if let Some(prev) = prev
            && prev.kind == TokenKind::IdentOpish
            && tok.kind == TokenKind::IdentOpish
            && !prev.is_sep(self.source)
            && !tok.is_sep(self.source)
            && tok.is_whitespacelessly_right_after(&prev)
        {
            if let Some(last) = self.tokens.iter_mut().rev().find(|it| !it.kind.is_layout()) {
                last.len += tok.len;
            }
            return;
        }

        // split dot-ending floats like `10.` into an int and a dot, to allow `10.timesDo`
        if tok.kind == TokenKind::LitFloat && tok.src(self.source).ends_with('.') {
            let int_len = tok.len - 1;
            let int = Token::new(TokenKind::LitInt, tok.pos, tok.offset, int_len);
            let dot = Token::new(
                TokenKind::IdentOpish,
                Pos::new(tok.pos.line, tok.pos.char + int_len),
                tok.offset + int_len,
                1,
            );
            self.tokens.push(int);
            self.tokens.push(dot);
            return;
        }

        self.tokens.push(tok);
    }
}

/// Convenience function to lex a source string.
///
/// This is a shorthand for `Lexer::new(source).tokenize()`. Empty input yields no tokens.
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn lex(source: &str) -> Lexed {
    Lexer::new(source).tokenize()
}

// ============================================================================
// TESTS
// ============================================================================
