//! Numeric literal scanning.
//!
//! Accepts decimal, `0x` hex, `0o`/legacy-`0` octal and `0b` binary integers, with `_` digit
//! separators anywhere after the prefix. Decimal and hex numbers may carry a fraction and an
//! exponent (`e` for decimal, `p` for hex). A float may end in a bare `.` (`10.`), which the
//! classification pass later splits off again.
//!
//! Values are not computed here; the parser decodes literal text.

use super::{Lexer, TokenKind};

impl<'a> Lexer<'a> {
    pub(super) fn scan_number(&mut self) -> TokenKind {
        let start = self.pos();
        let mut kind = TokenKind::LitInt;
        let mut base = 10;
        let mut prefix = None;
        let mut invalid_digit = None;
        let mut has_mantissa_digits = false;

        if self.peek() != Some('.') {
            if self.peek() == Some('0') {
                self.advance();
                match self.peek().map(|c| c.to_ascii_lowercase()) {
                    Some('x') => {
                        self.advance();
                        base = 16;
                        prefix = Some('x');
                    }
                    Some('o') => {
                        self.advance();
                        base = 8;
                        prefix = Some('o');
                    }
                    Some('b') => {
                        self.advance();
                        base = 2;
                        prefix = Some('b');
                    }
                    _ => {
                        base = 8;
                        prefix = Some('0');
                        has_mantissa_digits = true;
                    }
                }
            }
            has_mantissa_digits |= self.scan_digits(base, &mut invalid_digit);
        }

        // fraction
        if self.peek() == Some('.') {
            kind = TokenKind::LitFloat;
            if matches!(prefix, Some('o' | 'b')) {
                self.lexing_error(start, &format!("invalid radix point in {} literal", base_name(prefix)));
            }
            self.advance();
            has_mantissa_digits |= self.scan_digits(base, &mut invalid_digit);
        }

        if !has_mantissa_digits {
            self.lexing_error(start, &format!("{} literal has no digits", base_name(prefix)));
        }

        // exponent: only taken when digits follow, so that `10.each` stays a dot call
        if self.exponent_follows(base) {
            let exp = self.advance();
            if matches!(exp, Some('p' | 'P')) && base != 16 {
                self.lexing_error(start, "'p' exponent requires hexadecimal mantissa");
            }
            kind = TokenKind::LitFloat;
            if matches!(self.peek(), Some('+' | '-')) {
                self.advance();
            }
            let mut exp_invalid = None;
            if !self.scan_digits(10, &mut exp_invalid) {
                self.lexing_error(start, "exponent has no digits");
            }
        } else if kind == TokenKind::LitFloat && base == 16 {
            self.lexing_error(start, "hexadecimal mantissa requires a 'p' exponent");
        }

        // a legacy octal like `09` is fine as long as it turns out to be a float (`09.5`)
        if kind == TokenKind::LitInt
            && let Some(digit) = invalid_digit
        {
            self.lexing_error(start, &format!("invalid digit '{digit}' in {} literal", base_name(prefix)));
        }

        kind
    }

    /// Consume digits (and `_` separators), returning whether any digit was seen.
    ///
    /// Decimal digits too large for `base` are consumed and recorded in `invalid` instead of
    /// ending the literal.
    fn scan_digits(&mut self, base: u32, invalid: &mut Option<char>) -> bool {
        let mut saw_digit = false;
        while let Some(c) = self.peek() {
            if c == '_' {
                self.advance();
                continue;
            }
            let accepted = if base == 16 { c.is_ascii_hexdigit() } else { c.is_ascii_digit() };
            if !accepted {
                break;
            }
            if c.to_digit(base).is_none() && invalid.is_none() {
                *invalid = Some(c);
            }
            saw_digit = true;
            self.advance();
        }
        saw_digit
    }

    fn exponent_follows(&self, base: u32) -> bool {
        let rest = &self.source[self.current_pos..];
        let mut chars = rest.chars();
        let marker_ok = match chars.next() {
            Some('e' | 'E') => base != 16,
            Some('p' | 'P') => true,
            _ => false,
        };
        if !marker_ok {
            return false;
        }
        match chars.next() {
            Some('+' | '-') => chars.next().is_some_and(|c| c.is_ascii_digit()),
            Some(c) => c.is_ascii_digit(),
            None => false,
        }
    }
}

fn base_name(prefix: Option<char>) -> &'static str {
    match prefix {
        Some('x') => "hexadecimal",
        Some('o' | '0') => "octal",
        Some('b') => "binary",
        _ => "decimal",
    }
}

#[cfg(test)]
mod tests {
    use crate::lexer::{TokenKind, lex};

    fn single(source: &str) -> (TokenKind, String, usize) {
        let lexed = lex(source);
        let toks: Vec<_> = lexed.tokens.iter().filter(|t| !t.kind.is_layout()).collect();
        assert_eq!(toks.len(), 1, "expected a single token in {source:?}");
        (toks[0].kind, toks[0].src(source).to_string(), lexed.diagnostics.len())
    }

    #[test]
    fn test_integer_forms() {
        for source in ["0", "123", "1_000", "0x1F", "0o17", "017", "0b1010"] {
            assert_eq!(single(source), (TokenKind::LitInt, source.to_string(), 0));
        }
    }

    #[test]
    fn test_float_forms() {
        for source in ["1.5", ".5", "1e10", "1.5e-3", "0x1p4", "0x1.8p1", "09.5"] {
            assert_eq!(single(source), (TokenKind::LitFloat, source.to_string(), 0));
        }
    }

    #[test]
    fn test_exponent_only_with_digits() {
        // `2.e` is not an exponent: `2` `.` `e`
        let lexed = lex("2.e");
        let kinds: Vec<_> = lexed.tokens.iter().filter(|t| !t.kind.is_layout()).map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TokenKind::LitInt, TokenKind::IdentOpish, TokenKind::IdentWord]);
    }

    #[test]
    fn test_malformed_numbers_are_reported() {
        assert_eq!(single("0x").2, 1);
        assert_eq!(single("0b102").2, 1);
        assert_eq!(single("08").2, 1);
        assert_eq!(single("0x1.5").2, 1);
    }
}
