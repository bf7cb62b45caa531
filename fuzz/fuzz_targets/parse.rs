#![no_main]

use libfuzzer_sys::fuzz_target;
use loon_syntax::{lexer, parser};

fuzz_target!(|data: &[u8]| {
    // Convert bytes to UTF-8 string (ignore invalid UTF-8)
    if let Ok(s) = std::str::from_utf8(data) {
        // Malformed input must never panic: errors end up as diagnostics and `Err` nodes
        let lexed = lexer::lex(s);
        let ast = parser::parse(&lexed.tokens, s);
        let _ = ast.err_diagnostics();
    }
});
