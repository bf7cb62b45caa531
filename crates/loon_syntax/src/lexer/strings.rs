//! String, rune and comment scanning.
//!
//! Quoted strings and runes may not span lines. Raw (backtick) strings and block comments may.
//! Escape sequences are only validated here; the parser turns them into characters.

use super::Lexer;

impl<'a> Lexer<'a> {
    /// Scan a `"..."` string literal.
    pub(super) fn scan_string(&mut self) {
        let start = self.pos();
        self.advance(); // opening quote
        loop {
            match self.peek() {
                None | Some('\n') => {
                    self.lexing_error(start, "literal not terminated");
                    return;
                }
                Some('"') => {
                    self.advance();
                    return;
                }
                Some('\\') => self.scan_escape('"'),
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    /// Scan a `` `...` `` raw string literal. No escapes, newlines allowed.
    pub(super) fn scan_raw_string(&mut self) {
        let start = self.pos();
        self.advance(); // opening backtick
        while let Some(c) = self.advance() {
            if c == '`' {
                return;
            }
        }
        self.lexing_error(start, "literal not terminated");
    }

    /// Scan a `'x'` rune literal, which must hold exactly one (possibly escaped) character.
    pub(super) fn scan_rune(&mut self) {
        let start = self.pos();
        self.advance(); // opening quote
        let mut count = 0;
        loop {
            match self.peek() {
                None | Some('\n') => {
                    self.lexing_error(start, "literal not terminated");
                    return;
                }
                Some('\'') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.scan_escape('\'');
                    count += 1;
                }
                Some(_) => {
                    self.advance();
                    count += 1;
                }
            }
        }
        if count != 1 {
            self.lexing_error(start, "invalid char literal");
        }
    }

    /// Scan a `//` line comment (up to, not including, the newline) or a `/* */` block comment.
    pub(super) fn scan_comment(&mut self) {
        let start = self.pos();
        self.advance(); // '/'
        if self.match_char('/') {
            while let Some(c) = self.peek() {
                if c == '\n' {
                    break;
                }
                self.advance();
            }
            return;
        }

        self.advance(); // '*'
        while let Some(c) = self.advance() {
            if c == '*' && self.match_char('/') {
                return;
            }
        }
        self.lexing_error(start, "comment not terminated");
    }

    /// Consume one escape sequence starting at the backslash.
    fn scan_escape(&mut self, quote: char) {
        let start = self.pos();
        self.advance(); // '\\'
        let Some(c) = self.peek() else {
            return; // the enclosing literal reports the missing terminator
        };
        let (digits, base) = match c {
            'a' | 'b' | 'f' | 'n' | 'r' | 't' | 'v' | '\\' => {
                self.advance();
                return;
            }
            _ if c == quote => {
                self.advance();
                return;
            }
            '0'..='7' => (3, 8),
            'x' => (2, 16),
            'u' => (4, 16),
            'U' => (8, 16),
            _ => {
                self.lexing_error(start, "unknown escape sequence");
                return;
            }
        };
        if base == 16 {
            self.advance(); // 'x', 'u' or 'U'
        }
        for _ in 0..digits {
            match self.peek() {
                Some(d) if d.is_digit(base) => {
                    self.advance();
                }
                _ => {
                    self.lexing_error(start, "escape sequence is incomplete or has invalid digits");
                    return;
                }
            }
        }
    }
}
