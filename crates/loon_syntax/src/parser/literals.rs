/// Literal decoding.
///
/// The lexer only checks the shape of literal tokens; this chunk turns their text into values.
/// A token that cannot be decoded becomes an `Err` node with a `LiteralDoesntParse` diagnostic
/// that embeds the [`LiteralError`] text.

/// Why a literal token's text could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LiteralError {
    #[error("cannot parse `{text}` as integer: {source}")]
    Int {
        text: String,
        source: std::num::ParseIntError,
    },
    #[error("cannot parse `{text}` as float: {source}")]
    Float {
        text: String,
        source: std::num::ParseFloatError,
    },
    #[error("cannot parse `{text}` as float: {reason}")]
    FloatShape { text: String, reason: &'static str },
    #[error("invalid escape sequence `{0}`")]
    Escape(String),
    #[error("rune literal must hold exactly one character, not {0}")]
    RuneLength(usize),
    #[error("literal `{0}` is not properly quoted")]
    Unquoted(String),
}

/// Decode an unsigned integer literal: `_` separators, `0x`/`0o`/`0b` prefixes, legacy `0` octal.
pub fn decode_uint(text: &str) -> Result<u64, LiteralError> {
    let cleaned = text.replace('_', "");
    let (radix, digits) = split_radix(&cleaned);
    u64::from_str_radix(digits, radix).map_err(|source| LiteralError::Int {
        text: text.to_string(),
        source,
    })
}

/// Decode a signed integer literal written with a leading `-`.
pub fn decode_int(text: &str) -> Result<i64, LiteralError> {
    let cleaned = text.replace('_', "");
    let magnitude = cleaned.strip_prefix('-').unwrap_or(&cleaned);
    let (radix, digits) = split_radix(magnitude);
    i64::from_str_radix(&format!("-{digits}"), radix).map_err(|source| LiteralError::Int {
        text: text.to_string(),
        source,
    })
}

fn split_radix(digits: &str) -> (u32, &str) {
    let prefix = digits.get(..2).map(str::to_ascii_lowercase);
    match prefix.as_deref() {
        Some("0x") => (16, &digits[2..]),
        Some("0o") => (8, &digits[2..]),
        Some("0b") => (2, &digits[2..]),
        _ if digits.len() > 1 && digits.starts_with('0') => (8, &digits[1..]),
        _ => (10, digits),
    }
}

/// Decode a decimal or hexadecimal (`0x1.8p3`) float literal.
pub fn decode_float(text: &str) -> Result<f64, LiteralError> {
    let cleaned = text.replace('_', "");
    let value = match cleaned.get(..2).map(str::to_ascii_lowercase).as_deref() {
        Some("0x") => decode_hex_float(text, &cleaned[2..])?,
        _ => cleaned.parse::<f64>().map_err(|source| LiteralError::Float {
            text: text.to_string(),
            source,
        })?,
    };
    if value.is_infinite() {
        return Err(LiteralError::FloatShape {
            text: text.to_string(),
            reason: "value out of range",
        });
    }
    Ok(value)
}

fn decode_hex_float(text: &str, body: &str) -> Result<f64, LiteralError> {
    let malformed = |reason| LiteralError::FloatShape {
        text: text.to_string(),
        reason,
    };
    let (mantissa, exp) = body
        .split_once(['p', 'P'])
        .ok_or_else(|| malformed("hexadecimal mantissa requires a 'p' exponent"))?;
    let exp: i32 = exp.parse().map_err(|_| malformed("invalid exponent"))?;
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let mut value = 0f64;
    for c in int_part.chars().chain(frac_part.chars()) {
        let digit = c.to_digit(16).ok_or_else(|| malformed("invalid hexadecimal digit"))?;
        value = value * 16.0 + f64::from(digit);
    }
    let frac_digits = i32::try_from(frac_part.len()).map_err(|_| malformed("mantissa too long"))?;
    Ok(value * 2f64.powi(exp.saturating_sub(4 * frac_digits)))
}

/// Decode a `"quoted"` (escapes processed) or `` `raw` `` (verbatim, CRs dropped) string literal.
pub fn decode_str(text: &str) -> Result<String, LiteralError> {
    if let Some(raw) = text.strip_prefix('`').and_then(|it| it.strip_suffix('`')) {
        return Ok(raw.replace('\r', ""));
    }
    let body = text
        .strip_prefix('"')
        .and_then(|it| it.strip_suffix('"'))
        .ok_or_else(|| LiteralError::Unquoted(text.to_string()))?;
    unescape(body, '"')
}

/// Decode a `'x'` rune literal, which must hold exactly one character after unescaping.
pub fn decode_rune(text: &str) -> Result<char, LiteralError> {
    let body = text
        .strip_prefix('\'')
        .and_then(|it| it.strip_suffix('\''))
        .ok_or_else(|| LiteralError::Unquoted(text.to_string()))?;
    let decoded = unescape(body, '\'')?;
    let mut chars = decoded.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(LiteralError::RuneLength(decoded.chars().count())),
    }
}

/// Process backslash escapes; `quote` is the one quote character that may be escaped.
fn unescape(body: &str, quote: char) -> Result<String, LiteralError> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(esc) = chars.next() else {
            return Err(LiteralError::Escape("\\".to_string()));
        };
        let decoded = match esc {
            'a' => '\x07',
            'b' => '\x08',
            'f' => '\x0C',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'v' => '\x0B',
            '\\' => '\\',
            _ if esc == quote => esc,
            'x' => escaped_code_point(&mut chars, esc, 2, 16)?,
            'u' => escaped_code_point(&mut chars, esc, 4, 16)?,
            'U' => escaped_code_point(&mut chars, esc, 8, 16)?,
            '0'..='7' => {
                let rest: String = chars.by_ref().take(2).collect();
                let digits = format!("{esc}{rest}");
                u32::from_str_radix(&digits, 8)
                    .ok()
                    .filter(|_| digits.len() == 3)
                    .and_then(char::from_u32)
                    .ok_or_else(|| LiteralError::Escape(format!("\\{digits}")))?
            }
            other => return Err(LiteralError::Escape(format!("\\{other}"))),
        };
        out.push(decoded);
    }
    Ok(out)
}

fn escaped_code_point(chars: &mut std::str::Chars<'_>, marker: char, len: usize, radix: u32) -> Result<char, LiteralError> {
    let digits: String = chars.by_ref().take(len).collect();
    u32::from_str_radix(&digits, radix)
        .ok()
        .filter(|_| digits.len() == len)
        .and_then(char::from_u32)
        .ok_or_else(|| LiteralError::Escape(format!("\\{marker}{digits}")))
}

impl<'a> Parser<'a> {
    /// Decode the literal token at `idx` into a `Lit` node, or an `Err` node if it won't parse.
    fn parse_lit(&self, idx: usize) -> Node {
        let tok = &self.tokens[idx];
        let text = tok.src(self.source);
        let decoded = match tok.kind {
            TokenKind::LitStr => decode_str(text).map(LitValue::Str),
            TokenKind::LitFloat => decode_float(text).map(LitValue::Float),
            TokenKind::LitRune => decode_rune(text).map(LitValue::Rune),
            _ if text.starts_with('-') => decode_int(text).map(LitValue::Int),
            _ => decode_uint(text).map(LitValue::Uint),
        };
        let kind = match decoded {
            Ok(value) => NodeKind::Lit(value),
            Err(err) => NodeKind::Err(Diagnostic::from_error(DiagCode::LitWontParse, tok.span(self.source), &err)),
        };
        Node::leaf(kind, idx..idx + 1)
    }
}
