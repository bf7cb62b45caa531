//! CLI module for the loon tooling
//!
//! This module provides the command-line interface over the syntax frontend and the session
//! cache.
//!
//! ## Commands
//!
//! - `check <path>...` - Load the packs of the given files/directories and report diagnostics
//! - `tokens <file>` - Print the token stream of one file (debug)
//! - `ast <file>` - Print the syntax tree of one file (debug)
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.
//! Log verbosity is taken from `RUST_LOG` (see `main.rs`).

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};

use crate::config::SessionConfig;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Loon language tooling
#[derive(Parser, Debug)]
#[command(name = "loon")]
#[command(version = VERSION)]
#[command(about = "Lexer, parser and diagnostics for the loon language", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load source packs and report their diagnostics
    Check {
        /// Source files or pack directories
        #[arg(value_name = "PATH", default_value = ".")]
        paths: Vec<PathBuf>,
        #[command(flatten)]
        session: SessionArgs,
    },

    /// Print the token stream of a file (debug)
    Tokens {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print the syntax tree of a file (debug)
    Ast {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[command(flatten)]
        session: SessionArgs,
    },
}

/// Flags mapping onto [`SessionConfig`].
#[derive(Args, Debug, Clone)]
pub struct SessionArgs {
    /// Source file extension, without the dot
    #[arg(long = "ext", value_name = "EXT", default_value = "ls")]
    pub extension: String,
    /// Interpreter-directive prefix turning a first line into a comment
    #[arg(long = "shebang-prefix", value_name = "PREFIX", default_value = "#!/usr/bin/env ")]
    pub shebang_prefix: String,
    /// Also load files below dot-prefixed directories
    #[arg(long = "include-dot-dirs")]
    pub include_dot_dirs: bool,
}

impl SessionArgs {
    pub fn to_config(&self) -> SessionConfig {
        SessionConfig::new()
            .with_source_extension(self.extension.as_str())
            .with_shebang_prefix(self.shebang_prefix.as_str())
            .with_exclude_dot_dirs(!self.include_dot_dirs)
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Command::Check { paths, session } => commands::check_paths(&paths, session.to_config()),
        Command::Tokens { file } => commands::lex_file(&file),
        Command::Ast { file, session } => commands::parse_file(&file, &session.shebang_prefix),
    }
}

// ============================================================================
// Tests
// ============================================================================
