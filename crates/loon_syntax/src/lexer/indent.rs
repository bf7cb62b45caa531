//! Indentation handling: the offside rule and leading-whitespace hygiene.
//!
//! ## Notes
//!
//! - Indentation is measured in characters (columns), not display width.
//! - Lines inside open brackets never open or close blocks.
//! - `Begin`/`End` markers emitted for a line sit at that line's first token, zero-width.

use super::{Lexer, Token, TokenKind};
use crate::diagnostics::errors;

impl<'a> Lexer<'a> {
    /// Open the outermost level at the very first token of the input.
    ///
    /// A first token not in column 1 is reported, but its column still becomes the base level so
    /// the rest of the file lexes normally.
    pub(super) fn open_first_level(&mut self, tok: &Token) {
        self.indent_stack.push(tok.pos.char);
        self.tokens.push(Token::layout(TokenKind::Begin, tok.pos, tok.offset));
        if tok.pos.char > 1 {
            self.errors.push(errors::indentation(tok.span(self.source)));
        }
    }

    /// Emit layout markers for `tok`, the first token on a new line outside of brackets.
    pub(super) fn on_new_line(&mut self, prev: &Token, tok: &Token) {
        let column = tok.pos.char;
        let begin = Token::layout(TokenKind::Begin, tok.pos, tok.offset);
        let end = Token::layout(TokenKind::End, tok.pos, tok.offset);
        let top = self.indent_stack.last().copied().unwrap_or(0);

        if column < top {
            // dedent: close every level deeper than this line
            while self.indent_stack.last().is_some_and(|&level| level > column) {
                self.indent_stack.pop();
                self.tokens.push(end);
            }
            match self.indent_stack.last().copied() {
                None => {
                    // dedented past a mis-indented base level (already reported)
                    self.indent_stack.push(column);
                    self.tokens.push(begin);
                }
                Some(level) => {
                    if level != column {
                        self.errors.push(errors::indentation(tok.span(self.source)));
                    }
                    self.tokens.push(end);
                    self.tokens.push(begin);
                }
            }
        } else if column > top {
            self.indent_stack.push(column);
            self.tokens.push(begin);
        } else {
            self.tokens.push(end);
            self.tokens.push(begin);
        }

        self.check_leading_whitespace(prev, tok);
    }

    /// Carriage returns anywhere between two lines, or tabs in a line's leading whitespace, are
    /// each reported once per file.
    fn check_leading_whitespace(&mut self, prev: &Token, tok: &Token) {
        let gap = &self.source[prev.end_offset()..tok.offset];
        if !self.had_cr_err && gap.contains('\r') {
            self.had_cr_err = true;
            self.errors.push(errors::whitespace(tok.span(self.source)));
        }
        let leading = gap.find('\n').map_or(gap, |idx| &gap[idx + 1..]);
        if !self.had_tab_err && leading.contains('\t') {
            self.had_tab_err = true;
            self.errors.push(errors::whitespace(tok.span(self.source)));
        }
    }

    /// Close every level still open at the end of input, right after the last token.
    pub(super) fn close_all_levels(&mut self) {
        let Some(last) = self.prev().copied() else {
            return;
        };
        let end_pos = last.span(self.source).end;
        for _ in 0..self.indent_stack.len() {
            self.tokens.push(Token::layout(TokenKind::End, end_pos, last.end_offset()));
        }
        self.indent_stack.clear();
    }
}
