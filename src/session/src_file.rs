//! A single tracked source file and its derived data.

use std::io;
use std::path::{Path, PathBuf};

use loon_syntax::ast::{Ast, NodeId};
use loon_syntax::diagnostics::{DiagCode, Diagnostic};
use loon_syntax::lexer::{self, Token};
use loon_syntax::parser::Parser;
use loon_syntax::span::{Pos, Span};

use super::RecomputeStats;
use super::content_hash::content_hash;

/// Maximum source file size (10 MB) - prevents memory exhaustion
pub const MAX_SOURCE_SIZE: u64 = 10 * 1024 * 1024;

/// Why a source file's text could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("file not found")]
    NotFound,
    #[error("file is too large ({size} bytes, max {max} bytes)")]
    TooLarge { size: u64, max: u64 },
    #[error("cannot read file: {0}")]
    Io(#[from] io::Error),
    #[error("file is not valid UTF-8: {0}")]
    NotUtf8(#[from] std::string::FromUtf8Error),
}

/// Read a source file's full text, refusing files over [`MAX_SOURCE_SIZE`].
pub fn read_source(path: &Path) -> Result<String, ReadError> {
    let not_found = |err: io::Error| match err.kind() {
        io::ErrorKind::NotFound => ReadError::NotFound,
        _ => ReadError::Io(err),
    };
    let size = std::fs::metadata(path).map_err(not_found)?.len();
    if size > MAX_SOURCE_SIZE {
        return Err(ReadError::TooLarge { size, max: MAX_SOURCE_SIZE });
    }
    let bytes = std::fs::read(path).map_err(not_found)?;
    Ok(String::from_utf8(bytes)?)
}

/// A tracked source file: its current text and the tokens and AST derived from it.
///
/// Owned by the [`SrcPack`](super::SrcPack) of its directory. Tokens and AST are only valid for
/// the exact `text` they were derived from; replacing the text re-derives both.
#[derive(Debug)]
pub struct SrcFile {
    path: PathBuf,
    pack_dir: PathBuf,
    text: String,
    tokens: Vec<Token>,
    ast: Ast,
    last_read_err: Option<Diagnostic>,
    lex_errs: Vec<Diagnostic>,
    ever_read: bool,
}

/// What re-deriving a file's tokens and AST turned up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Rederived {
    /// The file's diagnostics may differ from what was last published.
    pub diags_relevant: bool,
    /// The new AST differs structurally from the old one.
    pub structural: bool,
}

impl SrcFile {
    pub(crate) fn new(path: PathBuf) -> Self {
        let pack_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self {
            path,
            pack_dir,
            text: String::new(),
            tokens: Vec::new(),
            ast: Ast::default(),
            last_read_err: None,
            lex_errs: Vec::new(),
            ever_read: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory of the pack this file belongs to.
    pub fn pack_dir(&self) -> &Path {
        &self.pack_dir
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    pub fn last_read_error(&self) -> Option<&Diagnostic> {
        self.last_read_err.as_ref()
    }

    pub fn lex_diagnostics(&self) -> &[Diagnostic] {
        &self.lex_errs
    }

    /// Whether the file's text was ever loaded from disk without error.
    pub fn ever_read(&self) -> bool {
        self.ever_read
    }

    pub fn content_hash(&self) -> String {
        content_hash(&self.text)
    }

    /// Span covering the whole file, from line 1 to its last line.
    pub fn span(&self) -> Span {
        let mut end = Pos::origin();
        end.line += self.text.bytes().filter(|&b| b == b'\n').count();
        if !self.text.is_empty() && !self.text.ends_with('\n') {
            end.line += 1;
        }
        Span::new(Pos::origin(), end)
    }

    /// Read, lexing or parsing errors; any of these holds back the pack's tree refresh.
    pub fn has_lex_or_parse_errs(&self) -> bool {
        self.last_read_err.is_some() || !self.lex_errs.is_empty() || self.ast.any_errs()
    }

    /// The read error, then lexical diagnostics, then every `Err` node's diagnostic in tree order.
    pub fn all_diagnostics(&self) -> Vec<Diagnostic> {
        let mut diags: Vec<Diagnostic> = self.last_read_err.iter().cloned().collect();
        diags.extend(self.lex_errs.iter().cloned());
        diags.extend(self.ast.err_diagnostics().into_iter().cloned());
        diags
    }

    /// The node at `pos`, see [`Ast::node_at_pos`].
    pub fn node_at_pos(&self, pos: Pos, or_ancestor: bool) -> Option<NodeId> {
        self.ast.node_at_pos(pos, or_ancestor)
    }

    /// Source text of the node spanning exactly `span`, if any.
    pub fn src_at(&self, span: Span) -> Option<&str> {
        self.ast.node_at_span(span).map(|id| self.ast.src(id, &self.text))
    }

    // ========================================================================
    // Content updates
    // ========================================================================

    /// Take editor-supplied text. Returns the previous text.
    pub(crate) fn set_text(&mut self, text: &str) -> String {
        self.last_read_err = None;
        std::mem::replace(&mut self.text, text.to_string())
    }

    /// Load the text from disk. Returns the previous text, or `None` if the file is gone.
    ///
    /// Other read failures are kept as the file's read diagnostic, and leave the text empty.
    pub(crate) fn read_from_disk(&mut self) -> Option<String> {
        match read_source(&self.path) {
            Ok(text) => {
                self.last_read_err = None;
                self.ever_read = true;
                Some(std::mem::replace(&mut self.text, text))
            }
            Err(ReadError::NotFound) => None,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "source read failed");
                self.last_read_err = Some(Diagnostic::from_error(DiagCode::FileReadError, self.span(), &err));
                Some(std::mem::take(&mut self.text))
            }
        }
    }

    /// Discard tokens and AST and derive them afresh from the current text.
    ///
    /// Parsing only happens when lexing produced no diagnostics. The new AST is compared with
    /// the old one to tell a structural edit from a cosmetic one.
    pub(crate) fn rederive(&mut self, shebang_prefix: &str, stats: &mut RecomputeStats) -> Rederived {
        let old_ast = std::mem::take(&mut self.ast);
        let mut result = Rederived {
            diags_relevant: !self.lex_errs.is_empty() || old_ast.any_errs(),
            structural: false,
        };
        self.tokens.clear();
        self.lex_errs.clear();

        if self.last_read_err.is_some() {
            result.diags_relevant = true;
            return result;
        }

        stats.tokenizations += 1;
        let lexed = lexer::lex(&self.text);
        self.tokens = lexed.tokens;
        self.lex_errs = lexed.diagnostics;
        if !self.lex_errs.is_empty() {
            result.diags_relevant = true;
            return result;
        }

        stats.parses += 1;
        let new_ast = Parser::new(&self.tokens, &self.text)
            .with_shebang_prefix(shebang_prefix)
            .parse();
        if new_ast.any_errs() {
            result.diags_relevant = true;
        }
        result.structural = !Ast::is_cosmetic_edit(&old_ast, &new_ast);
        self.ast = new_ast;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loon_syntax::parser::DEFAULT_SHEBANG_PREFIX;

    fn file_with(text: &str) -> (SrcFile, RecomputeStats) {
        let mut file = SrcFile::new(PathBuf::from("/pkg/main.ls"));
        let mut stats = RecomputeStats::default();
        file.set_text(text);
        file.rederive(DEFAULT_SHEBANG_PREFIX, &mut stats);
        (file, stats)
    }

    #[test]
    fn test_pack_dir_is_parent() {
        let file = SrcFile::new(PathBuf::from("/pkg/sub/main.ls"));
        assert_eq!(file.pack_dir(), Path::new("/pkg/sub"));
    }

    #[test]
    fn test_whole_file_span() {
        let (file, _) = file_with("");
        assert_eq!(file.span(), Span::new(Pos::new(1, 1), Pos::new(1, 1)));
        let (file, _) = file_with("a\nb\n");
        assert_eq!(file.span(), Span::new(Pos::new(1, 1), Pos::new(3, 1)));
        let (file, _) = file_with("a\nb");
        assert_eq!(file.span(), Span::new(Pos::new(1, 1), Pos::new(3, 1)));
    }

    #[test]
    fn test_rederive_counts_and_classifies() {
        let (mut file, mut stats) = file_with("x\n");
        assert_eq!((stats.tokenizations, stats.parses), (1, 1));

        file.set_text("x  \n");
        let result = file.rederive(DEFAULT_SHEBANG_PREFIX, &mut stats);
        assert!(!result.structural);
        assert!(!result.diags_relevant);

        file.set_text("y\n");
        assert!(file.rederive(DEFAULT_SHEBANG_PREFIX, &mut stats).structural);
        assert_eq!((stats.tokenizations, stats.parses), (3, 3));
    }

    #[test]
    fn test_lex_errors_skip_parsing() {
        let (file, stats) = file_with("x = \"open\n");
        assert_eq!((stats.tokenizations, stats.parses), (1, 0));
        assert!(file.ast().is_empty());
        assert!(file.has_lex_or_parse_errs());
        assert_eq!(file.all_diagnostics().len(), file.lex_diagnostics().len());
    }

    #[test]
    fn test_parse_errors_are_collected() {
        let (file, _) = file_with("(a b\n");
        let diags = file.all_diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, DiagCode::BracketingMismatch);
        assert!(file.has_lex_or_parse_errs());
    }

    #[test]
    fn test_src_at_finds_node_text() {
        let (file, _) = file_with("foo (bar baz)\n");
        let span = Span::new(Pos::new(1, 6), Pos::new(1, 9));
        assert_eq!(file.src_at(span), Some("bar"));
    }

    #[test]
    fn test_missing_file_read() {
        let mut file = SrcFile::new(PathBuf::from("/nonexistent/loon/main.ls"));
        assert!(file.read_from_disk().is_none());
        assert!(!file.ever_read());
    }

    #[test]
    fn test_oversized_file_becomes_read_diagnostic() {
        let dir = tempfile::Builder::new().prefix("loon").tempdir().unwrap();
        let path = dir.path().join("big.ls");
        std::fs::File::create(&path).unwrap().set_len(MAX_SOURCE_SIZE + 1).unwrap();
        assert!(matches!(read_source(&path), Err(ReadError::TooLarge { .. })));

        let mut file = SrcFile::new(path);
        file.set_text("x\n");
        assert_eq!(file.read_from_disk().as_deref(), Some("x\n"));
        assert_eq!(file.text(), "");
        let diag = file.last_read_error().unwrap();
        assert_eq!(diag.code, DiagCode::FileReadError);
        assert!(diag.message.contains("too large"));
    }
}
