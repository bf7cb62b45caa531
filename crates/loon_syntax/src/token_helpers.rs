//! Small helper APIs for working with `Token` / `TokenKind`.
//!
//! Tokens do not carry their text, so most helpers take the source buffer they were lexed from.

use std::fmt;
use std::ops::Range;

use crate::lexer::{Token, TokenKind};
use crate::span::Span;

/// The three bracketing families. Openers only ever match closers of the same family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BracketFamily {
    Parens,
    Brackets,
    Braces,
}

impl BracketFamily {
    /// Classify a bracket character, also reporting whether it opens.
    pub fn of_char(c: char) -> Option<(BracketFamily, bool)> {
        match c {
            '(' => Some((BracketFamily::Parens, true)),
            ')' => Some((BracketFamily::Parens, false)),
            '[' => Some((BracketFamily::Brackets, true)),
            ']' => Some((BracketFamily::Brackets, false)),
            '{' => Some((BracketFamily::Braces, true)),
            '}' => Some((BracketFamily::Braces, false)),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BracketFamily::Parens => "parens",
            BracketFamily::Brackets => "brackets",
            BracketFamily::Braces => "braces",
        }
    }
}

impl fmt::Display for BracketFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TokenKind {
    /// Return `true` for the synthetic `Begin`/`End` markers.
    pub fn is_layout(&self) -> bool {
        matches!(self, TokenKind::Begin | TokenKind::End)
    }

    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            TokenKind::LitRune | TokenKind::LitStr | TokenKind::LitInt | TokenKind::LitFloat
        )
    }

    pub fn is_numeric_literal(&self) -> bool {
        matches!(self, TokenKind::LitInt | TokenKind::LitFloat)
    }

    pub fn is_ident(&self) -> bool {
        matches!(self, TokenKind::IdentWord | TokenKind::IdentOpish)
    }
}

impl Token {
    /// Bracket family and opening-ness, for `Bracketing` tokens only.
    pub fn bracket(&self, source: &str) -> Option<(BracketFamily, bool)> {
        if self.kind != TokenKind::Bracketing {
            return None;
        }
        self.src(source).chars().next().and_then(BracketFamily::of_char)
    }

    /// Return `true` if this token opens a bracket (of `family`, if given).
    pub fn is_bracket_opening(&self, source: &str, family: Option<BracketFamily>) -> bool {
        matches!(self.bracket(source), Some((fam, true)) if family.is_none_or(|it| it == fam))
    }

    /// Return `true` if this token closes a bracket (of `family`, if given).
    pub fn is_bracket_closing(&self, source: &str, family: Option<BracketFamily>) -> bool {
        matches!(self.bracket(source), Some((fam, false)) if family.is_none_or(|it| it == fam))
    }

    /// Separators are the single-character `,` and `:` tokens.
    pub fn is_sep(&self, source: &str) -> bool {
        matches!(self.src(source), "," | ":")
    }

    /// Return `true` if this token starts exactly where `prev` ends.
    pub fn is_whitespacelessly_right_after(&self, prev: &Token) -> bool {
        self.offset == prev.end_offset()
    }
}

/// Span covering `tokens[range]`, from the first token's start to the last token's end.
///
/// Trailing zero-width layout tokens are ignored unless the range holds nothing else.
pub fn toks_span(tokens: &[Token], range: Range<usize>, source: &str) -> Span {
    let toks = &tokens[range];
    let Some(first) = toks.first() else {
        return Span::default();
    };
    let last = toks
        .iter()
        .rev()
        .find(|tok| !tok.kind.is_layout())
        .unwrap_or(first);
    Span::new(first.pos, last.span(source).end)
}

/// Byte range of the source text covered by `tokens[range]`.
pub fn toks_byte_range(tokens: &[Token], range: Range<usize>) -> Range<usize> {
    let toks = &tokens[range];
    match (toks.first(), toks.iter().rev().find(|tok| !tok.kind.is_layout())) {
        (Some(first), Some(last)) if last.end_offset() >= first.offset => first.offset..last.end_offset(),
        (Some(first), _) => first.offset..first.offset,
        _ => 0..0,
    }
}

/// Split `tokens[range]` on top-level single-character `delim` tokens.
///
/// Delimiters nested inside brackets do not split. An empty range or a range without any
/// top-level delimiter yields one part; a trailing delimiter yields an empty last part.
pub fn split_toks(tokens: &[Token], range: Range<usize>, delim: &str, source: &str) -> Vec<Range<usize>> {
    let mut parts = Vec::new();
    let mut part_start = range.start;
    let mut level: usize = 0;
    for idx in range.clone() {
        let tok = &tokens[idx];
        if level == 0 && tok.src(source) == delim {
            parts.push(part_start..idx);
            part_start = idx + 1;
        } else if tok.is_bracket_opening(source, None) {
            level += 1;
        } else if tok.is_bracket_closing(source, None) {
            level = level.saturating_sub(1);
        }
    }
    parts.push(part_start..range.end);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer;

    #[test]
    fn test_bracket_classification() {
        let src = "(a]";
        let toks = lexer::lex(src).tokens;
        let open = toks.iter().find(|t| t.kind == TokenKind::Bracketing).unwrap();
        assert_eq!(open.bracket(src), Some((BracketFamily::Parens, true)));
        assert!(open.is_bracket_opening(src, Some(BracketFamily::Parens)));
        assert!(!open.is_bracket_opening(src, Some(BracketFamily::Braces)));
        let close = toks.iter().rev().find(|t| t.kind == TokenKind::Bracketing).unwrap();
        assert!(close.is_bracket_closing(src, Some(BracketFamily::Brackets)));
    }

    #[test]
    fn test_split_ignores_nested_commas() {
        let src = "a, (b, c), d";
        let toks = lexer::lex(src).tokens;
        // skip the outer Begin/End markers
        let parts = split_toks(&toks, 1..toks.len() - 1, ",", src);
        assert_eq!(parts.len(), 3);
        let texts: Vec<String> = parts
            .iter()
            .map(|r| src[toks_byte_range(&toks, r.clone())].to_string())
            .collect();
        assert_eq!(texts, vec!["a", "(b, c)", "d"]);
    }

    #[test]
    fn test_split_keeps_trailing_empty_part() {
        let src = "a,";
        let toks = lexer::lex(src).tokens;
        let parts = split_toks(&toks, 1..toks.len() - 1, ",", src);
        assert_eq!(parts, vec![1..2, 3..3]);
    }

    #[test]
    fn test_split_without_delimiter_is_single_part() {
        let src = "a b";
        let toks = lexer::lex(src).tokens;
        let parts = split_toks(&toks, 1..toks.len() - 1, ",", src);
        assert_eq!(parts, vec![1..toks.len() - 1]);
    }
}
