//! Token types for the Loon lexer.
//!
//! Tokens do not own their text: they record a byte offset and length into the source buffer
//! they were lexed from, and [`Token::src`] slices that buffer. A token is only meaningful
//! together with the exact text version that produced it.

use std::ops::Range;

use crate::span::{Pos, Span};

/// Kind of token produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // ========== Layout (synthetic, zero-width) ==========
    Begin,
    End,

    Comment, // both /* multi-line */ and // single-line
    Bracketing,

    // ========== Huddling kinds ==========
    // below: only kinds that, without separator or whitespace between them, huddle together into
    // one implicit expression as if parenthesized
    IdentWord,
    IdentOpish,
    LitRune,
    LitStr,
    LitInt,
    LitFloat,
}

/// A token with its kind, start position and location in the source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: Pos,
    pub offset: usize,
    pub len: usize,
}

impl Token {
    pub fn new(kind: TokenKind, pos: Pos, offset: usize, len: usize) -> Self {
        Self { kind, pos, offset, len }
    }

    /// A zero-width `Begin` or `End` marker at `pos`.
    pub fn layout(kind: TokenKind, pos: Pos, offset: usize) -> Self {
        debug_assert!(matches!(kind, TokenKind::Begin | TokenKind::End));
        Self::new(kind, pos, offset, 0)
    }

    /// The token's text within `source`.
    pub fn src<'s>(&self, source: &'s str) -> &'s str {
        &source[self.byte_range()]
    }

    pub fn byte_range(&self) -> Range<usize> {
        self.offset..self.end_offset()
    }

    /// Byte offset just past this token.
    pub fn end_offset(&self) -> usize {
        self.offset + self.len
    }

    /// Span from this token's start to just past its last character.
    pub fn span(&self, source: &str) -> Span {
        Span::new(self.pos, self.pos.advanced_over(self.src(source)))
    }
}
