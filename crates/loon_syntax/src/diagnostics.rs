//! Diagnostics produced while reading, lexing and parsing Loon sources.
//!
//! Diagnostics are plain data: they are attached to tokens, AST nodes and files, and are never
//! used for control flow. Every diagnostic carries a stable [`DiagCode`] whose message template is
//! filled with positional arguments.

use std::fmt;
use std::path::PathBuf;

use crate::span::Span;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
            Severity::Hint => write!(f, "hint"),
        }
    }
}

/// Stable diagnostic codes.
///
/// The semantic codes are reserved for the (future) name-resolution and type-checking stage and
/// are not produced by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagCode {
    LoonTodo,
    FileReadError,

    // lexing
    Whitespace,
    LexingError,
    Indentation,

    // parsing
    BracketingMismatch,
    LitWontParse,

    // semantic (errors)
    ExpectedFoo,
    NotDefined,
    NoSuchField,
    NotAValue,
    NotCallable,
    Reserved,
    NoElseCase,
    IndexOutOfBounds,
    RangeNegative,
    DictDuplKey,
    NotComparable,
    NotConvertible,
    DuplTopDecl,
    TypeMismatch,
    TypeInfinite,
    ComputationFailed,
    NotTypifiable,
    OrFuncsParamsMismatch,
    DivModZero,

    // semantic (warnings / infos / hints)
    Unused,
}

impl DiagCode {
    /// The code as published to clients.
    pub fn as_str(self) -> &'static str {
        match self {
            DiagCode::LoonTodo => "LoonTodo",
            DiagCode::FileReadError => "FileReadError",
            DiagCode::Whitespace => "Whitespace",
            DiagCode::LexingError => "LexingError",
            DiagCode::Indentation => "Indentation",
            DiagCode::BracketingMismatch => "BracketingMismatch",
            DiagCode::LitWontParse => "LiteralDoesntParse",
            DiagCode::ExpectedFoo => "Unexpected",
            DiagCode::NotDefined => "NotDefined",
            DiagCode::NoSuchField => "NoSuchField",
            DiagCode::NotAValue => "NotAValue",
            DiagCode::NotCallable => "NotCallable",
            DiagCode::Reserved => "Reserved",
            DiagCode::NoElseCase => "ElseCaseMissing",
            DiagCode::IndexOutOfBounds => "IndexOutOfBounds",
            DiagCode::RangeNegative => "RangeNegative",
            DiagCode::DictDuplKey => "DictDuplKey",
            DiagCode::NotComparable => "NotComparable",
            DiagCode::NotConvertible => "NotConvertible",
            DiagCode::DuplTopDecl => "DuplTopDecl",
            DiagCode::TypeMismatch => "TypeMismatch",
            DiagCode::TypeInfinite => "TypeInfinite",
            DiagCode::ComputationFailed => "ComputationFailed",
            DiagCode::NotTypifiable => "Untypifiable",
            DiagCode::OrFuncsParamsMismatch => "OrFuncsParamsCountMismatch",
            DiagCode::DivModZero => "NumDivModZero",
            DiagCode::Unused => "Unused",
        }
    }

    /// Message template; each `{}` is replaced by the next positional argument.
    pub fn template(self) -> &'static str {
        match self {
            DiagCode::LoonTodo => "TODO, please report as a Loon bug: \"{}\"",
            DiagCode::FileReadError => "{}",
            DiagCode::Whitespace => {
                "unsupported white-space; ensure both: no line-leading tabs, and LF-only line endings (no CR or CRLF)"
            }
            DiagCode::LexingError => "invalid token: {}",
            DiagCode::Indentation => "incorrect indentation",
            DiagCode::BracketingMismatch => "opening and closing {} don't match up",
            DiagCode::LitWontParse => "invalid literal: {}",
            DiagCode::ExpectedFoo => "expected {}",
            DiagCode::NotDefined => "`{}` is not defined or not in scope",
            DiagCode::NoSuchField => "`{}` does not resolve to any of this object's fields",
            DiagCode::NotAValue => "`{}` cannot be used as a value, only as a callee",
            DiagCode::NotCallable => "`{}` is not callable",
            DiagCode::Reserved => "cannot assign to or define `{}` or any other `{}`-prefixed identifier",
            DiagCode::NoElseCase => "missing a fallback case",
            DiagCode::IndexOutOfBounds => "index {} out of bounds, given length {}",
            DiagCode::RangeNegative => "range end {} is smaller than range start {}",
            DiagCode::DictDuplKey => "duplicate key `{}` in dict constructor",
            DiagCode::NotComparable => "operands `{}` and `{}` cannot be compared in {} terms",
            DiagCode::NotConvertible => "cannot convert `{}` to {}",
            DiagCode::DuplTopDecl => "top-level declaration `{}` already defined",
            DiagCode::TypeMismatch => "expected {} instead of {}",
            DiagCode::TypeInfinite => "infinite type detected: `{}`",
            DiagCode::ComputationFailed => "{}",
            DiagCode::NotTypifiable => "expression untypifiable",
            DiagCode::OrFuncsParamsMismatch => {
                "union of funcs with different parameter counts ({} vs. {}) not callable"
            }
            DiagCode::DivModZero => "(potential) division by zero",
            DiagCode::Unused => "code unreachable or without effects (and will be discarded by code generation)",
        }
    }

    /// Render the message template with `args`. Missing arguments render as empty text.
    pub fn message(self, args: &[&dyn fmt::Display]) -> String {
        let template = self.template();
        let mut out = String::with_capacity(template.len());
        let mut args = args.iter();
        let mut rest = template;
        while let Some(idx) = rest.find("{}") {
            out.push_str(&rest[..idx]);
            if let Some(arg) = args.next() {
                out.push_str(&arg.to_string());
            }
            rest = &rest[idx + 2..];
        }
        out.push_str(rest);
        out.trim().to_string()
    }
}

impl fmt::Display for DiagCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A group of related source locations within one file.
#[derive(Debug, Clone)]
pub struct RelatedLocations {
    pub file: PathBuf,
    pub spans: Vec<Span>,
    /// Either one hint per span, or empty to use [`RelatedLocations::DEFAULT_HINT`] for all.
    pub hints: Vec<String>,
}

impl RelatedLocations {
    pub const DEFAULT_HINT: &'static str = "namely, here";

    pub fn new(file: impl Into<PathBuf>, spans: Vec<Span>) -> Self {
        Self {
            file: file.into(),
            spans,
            hints: Vec::new(),
        }
    }

    pub fn with_hints(mut self, hints: Vec<String>) -> Self {
        self.hints = hints;
        self
    }

    /// The hint shown for the span at `idx`.
    pub fn hint(&self, idx: usize) -> &str {
        if self.hints.len() == self.spans.len() {
            &self.hints[idx]
        } else {
            Self::DEFAULT_HINT
        }
    }

    /// Same file and the same set of spans, in any order.
    fn same_locations(&self, other: &RelatedLocations) -> bool {
        self.file == other.file
            && self.spans.len() == other.spans.len()
            && self.spans.iter().all(|span| other.spans.contains(span))
            && other.spans.iter().all(|span| self.spans.contains(span))
    }
}

/// A coded, severity-tagged finding at a source span.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagCode,
    pub message: String,
    pub span: Span,
    pub related: Vec<RelatedLocations>,
}

impl Diagnostic {
    pub fn new(severity: Severity, code: DiagCode, span: Span, args: &[&dyn fmt::Display]) -> Self {
        Self {
            severity,
            code,
            message: code.message(args),
            span,
            related: Vec::new(),
        }
    }

    pub fn error(code: DiagCode, span: Span, args: &[&dyn fmt::Display]) -> Self {
        Self::new(Severity::Error, code, span, args)
    }

    /// Wrap an underlying error's message into `code`'s template.
    pub fn from_error(code: DiagCode, span: Span, err: &dyn fmt::Display) -> Self {
        Self::error(code, span, &[err])
    }

    pub fn with_related(mut self, related: RelatedLocations) -> Self {
        self.related.push(related);
        self
    }

    /// Equality by code, severity and message, and optionally also by span and related locations.
    pub fn equals(&self, other: &Diagnostic, including_spans: bool) -> bool {
        self.code == other.code
            && self.severity == other.severity
            && self.message == other.message
            && (!including_spans
                || (self.span == other.span
                    && self.related.len() == other.related.len()
                    && self
                        .related
                        .iter()
                        .zip(&other.related)
                        .all(|(a, b)| a.same_locations(b))))
    }

    pub fn loc_str(&self, path: &str) -> String {
        self.span.loc_str(path)
    }
}

impl PartialEq for Diagnostic {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other, true)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

// ============================================================================
// Constructors for the diagnostics this crate produces
// ============================================================================

pub mod errors {
    use super::*;

    pub fn indentation(span: Span) -> Diagnostic {
        Diagnostic::error(DiagCode::Indentation, span, &[])
    }

    pub fn whitespace(span: Span) -> Diagnostic {
        Diagnostic::error(DiagCode::Whitespace, span, &[])
    }

    pub fn lexing(span: Span, detail: &str) -> Diagnostic {
        Diagnostic::error(DiagCode::LexingError, span, &[&detail])
    }

    /// `family` is one of `parens`, `brackets` or `braces`.
    pub fn bracketing_mismatch(span: Span, family: &str) -> Diagnostic {
        Diagnostic::error(DiagCode::BracketingMismatch, span, &[&family])
    }

    pub fn expected(span: Span, what: &str) -> Diagnostic {
        Diagnostic::error(DiagCode::ExpectedFoo, span, &[&what])
    }
}

// ============================================================================
// Terminal rendering
// ============================================================================

/// Render a diagnostic with the offending source line and a caret underline.
pub fn render_diagnostic(file_name: &str, source: &str, diag: &Diagnostic) -> String {
    let red = "\x1b[31m";
    let cyan = "\x1b[36m";
    let yellow = "\x1b[33m";
    let bold = "\x1b[1m";
    let reset = "\x1b[0m";

    let kind_color = match diag.severity {
        Severity::Error => red,
        Severity::Warning | Severity::Info | Severity::Hint => yellow,
    };

    let line_num = diag.span.start.line;
    let col_num = diag.span.start.char.max(1);
    let line_text = source.lines().nth(line_num.saturating_sub(1)).unwrap_or("");
    let line_num_width = line_num.to_string().len();

    let underline_len = if diag.span.end.line == diag.span.start.line && diag.span.end.char > col_num {
        diag.span.end.char - col_num
    } else {
        1
    };

    let mut out = String::new();
    out.push_str(&format!(
        "{bold}{kind_color}{severity}[{code}]{reset}{bold}: {message}{reset}\n",
        severity = diag.severity,
        code = diag.code,
        message = diag.message,
    ));
    out.push_str(&format!("  {cyan}-->{reset} {}\n", diag.loc_str(file_name)));
    out.push_str(&format!("  {cyan}{:>width$} |{reset}\n", "", width = line_num_width));
    out.push_str(&format!(
        "  {cyan}{:>width$} |{reset} {}\n",
        line_num,
        line_text,
        width = line_num_width
    ));
    out.push_str(&format!(
        "  {cyan}{:>width$} |{reset} {}{kind_color}{}{reset}\n",
        "",
        " ".repeat(col_num - 1),
        "^".repeat(underline_len),
        width = line_num_width
    ));
    for related in &diag.related {
        for (idx, span) in related.spans.iter().enumerate() {
            out.push_str(&format!(
                "  {cyan}= note:{reset} {} ({})\n",
                related.hint(idx),
                span.loc_str(&related.file.display().to_string())
            ));
        }
    }
    out
}

/// Print a diagnostic to stderr, see [`render_diagnostic`].
pub fn print_diagnostic(file_name: &str, source: &str, diag: &Diagnostic) {
    eprintln!("{}", render_diagnostic(file_name, source, diag));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Pos;

    fn span(l1: usize, c1: usize, l2: usize, c2: usize) -> Span {
        Span::new(Pos::new(l1, c1), Pos::new(l2, c2))
    }

    #[test]
    fn test_message_templates_fill_positionally() {
        let diag = errors::bracketing_mismatch(span(1, 1, 1, 4), "parens");
        assert_eq!(diag.message, "opening and closing parens don't match up");
        assert_eq!(diag.code.as_str(), "BracketingMismatch");

        let msg = DiagCode::IndexOutOfBounds.message(&[&7, &3]);
        assert_eq!(msg, "index 7 out of bounds, given length 3");
    }

    #[test]
    fn test_from_error_embeds_underlying_message() {
        let diag = Diagnostic::from_error(DiagCode::LitWontParse, span(2, 1, 2, 5), &"number too large");
        assert_eq!(diag.message, "invalid literal: number too large");
        assert_eq!(diag.to_string(), "[LiteralDoesntParse] invalid literal: number too large");
    }

    #[test]
    fn test_equals_optionally_ignores_spans() {
        let a = errors::indentation(span(1, 1, 1, 1));
        let b = errors::indentation(span(3, 2, 3, 2));
        assert!(a.equals(&b, false));
        assert!(!a.equals(&b, true));
        assert_ne!(a, b);
    }

    #[test]
    fn test_related_locations_compare_in_any_order() {
        let s1 = span(1, 1, 1, 2);
        let s2 = span(4, 1, 4, 2);
        let a = errors::expected(s1, "x").with_related(RelatedLocations::new("/p/a.ls", vec![s1, s2]));
        let b = errors::expected(s1, "x").with_related(RelatedLocations::new("/p/a.ls", vec![s2, s1]));
        let c = errors::expected(s1, "x").with_related(RelatedLocations::new("/p/b.ls", vec![s2, s1]));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_related_hints_fall_back_to_default() {
        let locs = RelatedLocations::new("/p/a.ls", vec![Span::default(), Span::default()]);
        assert_eq!(locs.hint(1), RelatedLocations::DEFAULT_HINT);
        let locs = locs.with_hints(vec!["first".into(), "second".into()]);
        assert_eq!(locs.hint(1), "second");
    }

    #[test]
    fn test_render_points_at_column() {
        let diag = errors::lexing(span(2, 3, 2, 5), "separate `1` from `x`");
        let rendered = render_diagnostic("a.ls", "foo\n  1x\n", &diag);
        assert!(rendered.contains("a.ls:2,3-2,5"));
        assert!(rendered.contains("  1x"));
        assert!(rendered.contains("^^"));
    }
}
