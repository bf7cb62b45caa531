/// Parse a token sequence into an [`Ast`].
///
/// This is the main public entrypoint for parsing. Syntax errors are reported as `Err` nodes
/// inside the tree; see [`Ast::err_diagnostics`].
///
/// ## Parameters
/// - `tokens`: Token sequence produced by `loon_syntax::lexer`.
/// - `source`: The exact text the tokens were lexed from.
#[tracing::instrument(skip_all, fields(token_count = tokens.len()))]
pub fn parse(tokens: &[Token], source: &str) -> Ast {
    Parser::new(tokens, source).parse()
}
