//! Parser for the Loon programming language
//!
//! Turns the token sequence of one file into an [`Ast`]. Parsing never fails as a whole: every
//! syntax problem becomes an [`NodeKind::Err`] node wrapping the smallest recoverable region,
//! and parsing continues after it.
//!
//! ## Examples
//!
//! ```rust
//! use loon_syntax::{lexer, parser};
//!
//! let source = "print (1, 2)\n";
//! let lexed = lexer::lex(source);
//! let ast = parser::parse(&lexed.tokens, source);
//! assert_eq!(ast.roots().len(), 1);
//! assert!(!ast.any_errs());
//! ```

use std::ops::Range;

use crate::ast::*;
use crate::diagnostics::{DiagCode, Diagnostic, errors};
use crate::lexer::{Token, TokenKind};
use crate::token_helpers::{BracketFamily, split_toks, toks_span};

// NOTE: This module is split across multiple files using `include!` to keep all parser
// methods in the same Rust module (preserving privacy + call patterns) while avoiding
// a single large source file.

include!("parser/core.rs");
include!("parser/literals.rs");
include!("parser/brackets.rs");
include!("parser/huddle.rs");
include!("parser/api.rs");
include!("parser/tests.rs");
