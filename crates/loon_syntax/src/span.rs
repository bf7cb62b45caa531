//! Source positions and spans.
//!
//! Positions are 1-based in both line and character (a character is one Unicode scalar value,
//! not a byte). Spans are closed: both `start` and `end` count as inside the span.

use std::cmp::Ordering;
use std::fmt;

/// A 1-based line/character position in a source file.
///
/// Ordering is lexicographic by `(line, char)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos {
    /// Line number, starting at 1.
    pub line: usize,
    /// Character column, starting at 1.
    pub char: usize,
}

impl Pos {
    pub const fn new(line: usize, char: usize) -> Self {
        Self { line, char }
    }

    /// The very beginning of any source text.
    pub const fn origin() -> Self {
        Self { line: 1, char: 1 }
    }

    /// A zero-width span at this position.
    pub const fn to_span(self) -> Span {
        Span { start: self, end: self }
    }

    /// Position reached after walking over `text` starting at `self`.
    pub fn advanced_over(self, text: &str) -> Pos {
        let mut pos = self;
        for c in text.chars() {
            if c == '\n' {
                pos.line += 1;
                pos.char = 1;
            } else {
                pos.char += 1;
            }
        }
        pos
    }
}

impl Default for Pos {
    fn default() -> Self {
        Self::origin()
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.line, self.char)
    }
}

/// An ordered region of source text between two positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: Pos,
    pub end: Pos,
}

impl Span {
    pub const fn new(start: Pos, end: Pos) -> Self {
        Self { start, end }
    }

    pub fn is_single_pos(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.start <= pos && pos <= self.end
    }

    /// Smallest span covering both `self` and `other`.
    pub fn expanded(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Orders spans by their start position only, used to sort diagnostics.
    pub fn cmp_start(&self, other: &Span) -> Ordering {
        self.start.cmp(&other.start)
    }

    /// `path:line,char` (or `path:l,c-l,c`), or just the span when `path` is empty.
    pub fn loc_str(&self, path: &str) -> String {
        if path.is_empty() {
            self.to_string()
        } else {
            format!("{path}:{self}")
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_pos() {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pos_ordering_is_line_then_char() {
        assert!(Pos::new(1, 9) < Pos::new(2, 1));
        assert!(Pos::new(3, 2) < Pos::new(3, 4));
        assert_eq!(Pos::new(2, 2).cmp(&Pos::new(2, 2)), Ordering::Equal);
    }

    #[test]
    fn test_span_contains_is_inclusive() {
        let span = Span::new(Pos::new(1, 3), Pos::new(2, 5));
        assert!(span.contains(Pos::new(1, 3)));
        assert!(span.contains(Pos::new(1, 80)));
        assert!(span.contains(Pos::new(2, 5)));
        assert!(!span.contains(Pos::new(2, 6)));
        assert!(!span.contains(Pos::new(1, 2)));
    }

    #[test]
    fn test_span_expanded_covers_both() {
        let a = Span::new(Pos::new(2, 4), Pos::new(2, 9));
        let b = Span::new(Pos::new(1, 7), Pos::new(2, 6));
        assert_eq!(a.expanded(b), Span::new(Pos::new(1, 7), Pos::new(2, 9)));
        assert_eq!(a.expanded(a), a);
    }

    #[test]
    fn test_advanced_over_counts_chars_not_bytes() {
        let end = Pos::origin().advanced_over("äö\nxy");
        assert_eq!(end, Pos::new(2, 3));
        assert_eq!(Pos::new(4, 2).advanced_over("ab"), Pos::new(4, 4));
    }

    #[test]
    fn test_display() {
        assert_eq!(Pos::new(3, 1).to_span().to_string(), "3,1");
        assert_eq!(Span::new(Pos::new(1, 1), Pos::new(1, 4)).loc_str("a.ls"), "a.ls:1,1-1,4");
    }
}
