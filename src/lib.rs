#![forbid(unsafe_code)]
//! Loon language analysis engine
//!
//! This crate keeps the tokens, syntax trees and diagnostics of loon source files current as
//! files are edited, created, deleted or re-read from disk. The syntax frontend (lexer, parser,
//! AST, diagnostics) lives in `loon_syntax` and is re-exported here; this crate adds the
//! incremental [`session`] cache that groups files into directory-scoped packs, and a small CLI.
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Malformed input**: Never panics. Read, lexing and parsing failures become `Diagnostic` values attached to
//!   the file they were found in.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **True invariants**: If a panic represents a programming error (logic error), use
//!   `.expect("INVARIANT: reason")` with a clear explanation.

pub mod cli;
pub mod config;
pub mod session;

pub use loon_syntax::ast;
pub use loon_syntax::diagnostics;
pub use loon_syntax::lexer;
pub use loon_syntax::parser;
pub use loon_syntax::span;

pub use config::SessionConfig;
pub use session::{DiagnosticsChanged, Session, SessionState, SrcFile, SrcPack};
