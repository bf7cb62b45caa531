//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::SessionConfig;
use crate::diagnostics::{self, Diagnostic, Severity};
use crate::lexer::{self, TokenKind};
use crate::parser::Parser;
use crate::session::{self, Session};

use super::{CliError, CliResult, ExitCode};

// ============================================================================
// File Utilities
// ============================================================================

/// Read a source file through the session reader, as a CLI error on failure.
pub fn read_source(file_path: &Path) -> CliResult<String> {
    session::read_source(file_path)
        .map_err(|e| CliError::failure(format!("Error reading file '{}': {}", file_path.display(), e)))
}

fn absolute(path: &Path) -> CliResult<PathBuf> {
    fs::canonicalize(path).map_err(|e| CliError::failure(format!("Cannot access '{}': {}", path.display(), e)))
}

/// Render every diagnostic of one file, and return how many of them are errors.
fn report(file_path: &Path, source: &str, diags: &[Diagnostic]) -> usize {
    let shown = file_path.display().to_string();
    for diag in diags {
        diagnostics::print_diagnostic(&shown, source, diag);
    }
    diags.iter().filter(|diag| diag.severity == Severity::Error).count()
}

fn outcome(errors: usize) -> CliResult<ExitCode> {
    match errors {
        0 => Ok(ExitCode::SUCCESS),
        1 => Err(CliError::failure("1 error found")),
        n => Err(CliError::failure(format!("{n} errors found"))),
    }
}

// ============================================================================
// Commands
// ============================================================================

/// Load the packs of all given files/directories and print their diagnostics.
pub fn check_paths(paths: &[PathBuf], config: SessionConfig) -> CliResult<ExitCode> {
    let session = Session::new(config);
    let mut pack_dirs = Vec::new();
    for path in paths {
        let path = absolute(path)?;
        let dir = if path.is_dir() {
            path
        } else if session.access(|state| state.is_source_file_path(&path)) {
            path.parent().map(Path::to_path_buf).unwrap_or(path)
        } else {
            return Err(CliError::failure(format!("Not a loon source file: '{}'", path.display())));
        };
        if !pack_dirs.contains(&dir) {
            pack_dirs.push(dir);
        }
    }

    let (files, errors) = session.access(|state| {
        for dir in &pack_dirs {
            state.get_pack(dir, true);
        }
        let published = state.current_diagnostics();
        let (mut files, mut errors) = (0, 0);
        for pack in state.all_packs() {
            for file in pack.files() {
                files += 1;
                if let Some(diags) = published.get(file.path()) {
                    errors += report(file.path(), file.text(), diags);
                }
            }
        }
        (files, errors)
    });

    if files == 0 {
        return Err(CliError::failure("No loon source files found"));
    }
    if errors == 0 {
        println!("✓ {files} file(s) checked, no problems found");
    }
    outcome(errors)
}

/// Tokenize and display tokens.
pub fn lex_file(file_path: &Path) -> CliResult<ExitCode> {
    let source = read_source(file_path)?;
    let lexed = lexer::lex(&source);

    for tok in &lexed.tokens {
        let text = match tok.kind {
            TokenKind::Begin | TokenKind::End => "",
            _ => tok.src(&source),
        };
        println!("{:<12} {:<12} {:?}", format!("{:?}", tok.kind), tok.span(&source).to_string(), text);
    }
    outcome(report(file_path, &source, &lexed.diagnostics))
}

/// Parse and display the syntax tree.
pub fn parse_file(file_path: &Path, shebang_prefix: &str) -> CliResult<ExitCode> {
    let source = read_source(file_path)?;
    let lexed = lexer::lex(&source);
    if !lexed.diagnostics.is_empty() {
        return outcome(report(file_path, &source, &lexed.diagnostics));
    }

    let ast = Parser::new(&lexed.tokens, &source)
        .with_shebang_prefix(shebang_prefix)
        .parse();
    print!("{}", ast.dump(&source));
    let errs: Vec<Diagnostic> = ast.err_diagnostics().into_iter().cloned().collect();
    outcome(report(file_path, &source, &errs))
}
