//! Shared syntax frontend for the Loon language: lexer, parser, AST, diagnostics.
//!
//! This crate is dependency-light and intended for reuse by the session cache, the CLI, and any
//! future language-server front end.
//!
//! ## Notes
//! - This crate is intentionally “syntax-only”: it does not do name resolution or type checking.
//! - Neither lexing nor parsing fails as a whole: problems come back as [`diagnostics::Diagnostic`]
//!   values (lexer output) or `Err` nodes (parser output).
//!
//! ## Examples
//! ```rust
//! use loon_syntax::{lexer, parser};
//!
//! let source = "greet \"world\"\n";
//! let lexed = lexer::lex(source);
//! assert!(lexed.diagnostics.is_empty());
//! let ast = parser::parse(&lexed.tokens, source);
//! assert_eq!(ast.roots().len(), 1);
//! ```

pub mod ast;
pub mod diagnostics;
pub mod lexer;
pub mod parser;
pub mod span;
pub mod token_helpers;
