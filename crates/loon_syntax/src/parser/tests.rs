#[cfg(test)]
/// Parser unit tests.
///
/// These tests focus on the shapes the parser builds (block lines, groups, huddles) and on its
/// recovery behavior: every problem stays local to one `Err` node.
mod tests {
    use super::*;
    use crate::lexer;

    fn parse_str(source: &str) -> Ast {
        let lexed = lexer::lex(source);
        parse(&lexed.tokens, source)
    }

    /// The kinds of a node's children.
    fn child_kinds(ast: &Ast, id: NodeId) -> Vec<NodeKind> {
        ast.node(id).children.iter().map(|&c| ast.node(c).kind.clone()).collect()
    }

    fn only_root(ast: &Ast) -> NodeId {
        assert_eq!(ast.roots().len(), 1, "expected exactly one top-level node");
        ast.roots()[0]
    }

    /// The single child of the single top-level block line.
    fn line_content(ast: &Ast) -> NodeId {
        let line = only_root(ast);
        assert_eq!(ast.node(line).kind, NodeKind::BlockLine);
        assert_eq!(ast.node(line).children.len(), 1);
        ast.node(line).children[0]
    }

    fn ident(name: &str) -> NodeKind {
        NodeKind::Ident(name.to_string())
    }

    #[test]
    fn test_empty_source_has_no_nodes() {
        let ast = parse_str("");
        assert!(ast.is_empty());
        assert_eq!(ast.len(), 0);
    }

    #[test]
    fn test_lines_and_indented_blocks() {
        let ast = parse_str("a\n  b\nc");
        assert_eq!(ast.roots().len(), 2);
        let first = ast.roots()[0];
        assert_eq!(child_kinds(&ast, first), vec![ident("a"), NodeKind::BlockLine]);
        let nested = ast.node(first).children[1];
        assert_eq!(child_kinds(&ast, nested), vec![ident("b")]);
        assert_eq!(child_kinds(&ast, ast.roots()[1]), vec![ident("c")]);
    }

    #[test]
    fn test_comments_become_comment_nodes() {
        let ast = parse_str("x // hi");
        assert_eq!(child_kinds(&ast, only_root(&ast)), vec![ident("x"), NodeKind::Comment]);
    }

    #[test]
    fn test_literal_nodes() {
        let ast = parse_str("1 2.5 'c' \"s\"");
        assert_eq!(
            child_kinds(&ast, only_root(&ast)),
            vec![
                NodeKind::Lit(LitValue::Uint(1)),
                NodeKind::Lit(LitValue::Float(2.5)),
                NodeKind::Lit(LitValue::Rune('c')),
                NodeKind::Lit(LitValue::Str("s".into())),
            ]
        );
    }

    #[test]
    fn test_literal_decoders() {
        assert_eq!(decode_int("-42"), Ok(-42));
        assert_eq!(decode_int("-0x10"), Ok(-16));
        assert_eq!(decode_uint("1_000"), Ok(1000));
        assert_eq!(decode_uint("0x_FF"), Ok(255));
        assert_eq!(decode_uint("017"), Ok(15));
        assert_eq!(decode_uint("0b101"), Ok(5));
        assert_eq!(decode_float("0x1.8p1"), Ok(3.0));
        assert_eq!(decode_float(".5"), Ok(0.5));
        assert_eq!(decode_str(r#""a\tbé""#), Ok("a\tbé".to_string()));
        assert_eq!(decode_str("`raw\\n`"), Ok("raw\\n".to_string()));
        assert_eq!(decode_rune(r"'\n'"), Ok('\n'));
        assert_eq!(decode_rune(r"'\''"), Ok('\''));
        assert_eq!(decode_rune("'ab'"), Err(LiteralError::RuneLength(2)));
        assert!(matches!(decode_str(r#""\q""#), Err(LiteralError::Escape(_))));
    }

    #[test]
    fn test_out_of_range_int_is_a_local_err_node() {
        let ast = parse_str("x 99999999999999999999 y");
        let errs = ast.err_diagnostics();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].code, DiagCode::LitWontParse);
        assert!(errs[0].message.starts_with("invalid literal: "));
        assert!(errs[0].message.contains("too large"), "got: {}", errs[0].message);
        // neighbours survive
        let kinds = child_kinds(&ast, only_root(&ast));
        assert_eq!(kinds.len(), 3);
        assert_eq!(kinds[0], ident("x"));
        assert_eq!(kinds[2], ident("y"));
    }

    #[test]
    fn test_unclosed_paren_is_one_bracketing_err() {
        let ast = parse_str("(a b");
        let errs = ast.err_diagnostics();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].code, DiagCode::BracketingMismatch);
        assert_eq!(errs[0].message, "opening and closing parens don't match up");
        assert!(ast.node(line_content(&ast)).kind.is_err());
    }

    #[test]
    fn test_mismatched_family_names_the_opener() {
        let ast = parse_str("[a)");
        let errs = ast.err_diagnostics();
        assert_eq!(errs.len(), 1);
        assert!(errs[0].message.contains("brackets"));

        let ast = parse_str("} x");
        assert!(ast.err_diagnostics()[0].message.contains("braces"));
    }

    #[test]
    fn test_bracket_error_keeps_earlier_lines() {
        let ast = parse_str("a\n  (b");
        assert_eq!(ast.err_diagnostics().len(), 1);
        let line = only_root(&ast);
        assert_eq!(child_kinds(&ast, line)[0], ident("a"));
    }

    #[test]
    fn test_parens_vs_tuple() {
        let ast = parse_str("(a)");
        assert_eq!(ast.node(line_content(&ast)).kind, NodeKind::Group(GroupKind::Parens));

        let ast = parse_str("(a, b c)");
        let tuple = line_content(&ast);
        assert_eq!(ast.node(tuple).kind, NodeKind::Group(GroupKind::Tuple));
        assert_eq!(
            child_kinds(&ast, tuple),
            vec![ident("a"), NodeKind::Group(GroupKind::Implicit)]
        );

        let ast = parse_str("(a,)");
        let tuple = line_content(&ast);
        assert_eq!(ast.node(tuple).kind, NodeKind::Group(GroupKind::Tuple));
        assert_eq!(child_kinds(&ast, tuple), vec![ident("a")]);

        let ast = parse_str("()");
        assert!(ast.node(line_content(&ast)).children.is_empty());
    }

    #[test]
    fn test_square_brackets() {
        let ast = parse_str("[a b]");
        let list = line_content(&ast);
        assert_eq!(ast.node(list).kind, NodeKind::Group(GroupKind::Brackets));
        assert_eq!(child_kinds(&ast, list), vec![ident("a"), ident("b")]);

        let ast = parse_str("[a, b]");
        assert_eq!(child_kinds(&ast, line_content(&ast)), vec![ident("a"), ident("b")]);
    }

    #[test]
    fn test_nested_commas_do_not_split() {
        let ast = parse_str("(f (a, b), c)");
        let tuple = line_content(&ast);
        assert_eq!(ast.node(tuple).children.len(), 2);
    }

    #[test]
    fn test_curly_pairs() {
        let ast = parse_str("{a: 1, b: 2}");
        let dict = line_content(&ast);
        assert_eq!(ast.node(dict).kind, NodeKind::Group(GroupKind::Braces));
        for &pair in &ast.node(dict).children {
            assert_eq!(ast.node(pair).kind, NodeKind::Group(GroupKind::Implicit));
            assert_eq!(ast.node(pair).children.len(), 2);
        }

        let ast = parse_str("{a: 1, b}");
        let errs = ast.err_diagnostics();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].code, DiagCode::ExpectedFoo);
        assert_eq!(errs[0].message, "expected expression pair separated by `:`");
        let dict = line_content(&ast);
        assert_eq!(ast.node(dict).children.len(), 2);
    }

    #[test]
    fn test_superfluous_comma() {
        let ast = parse_str("(a,,b)");
        let tuple = line_content(&ast);
        let kinds = child_kinds(&ast, tuple);
        assert_eq!(kinds.len(), 3);
        assert!(kinds[1].is_err());
        assert_eq!(
            ast.err_diagnostics()[0].message,
            "expected expression before the superfluous comma"
        );

        let ast = parse_str("(, a)");
        assert_eq!(ast.err_diagnostics().len(), 1);
    }

    #[test]
    fn test_huddling_groups_adjacent_nodes() {
        let ast = parse_str("foo x+1 y");
        let line = only_root(&ast);
        assert_eq!(
            child_kinds(&ast, line),
            vec![ident("foo"), NodeKind::Group(GroupKind::Implicit), ident("y")]
        );
        let huddle = ast.node(line).children[1];
        assert_eq!(
            child_kinds(&ast, huddle),
            vec![ident("x"), ident("+"), NodeKind::Lit(LitValue::Uint(1))]
        );
    }

    #[test]
    fn test_single_run_is_not_wrapped() {
        let ast = parse_str("x+1");
        assert_eq!(
            child_kinds(&ast, only_root(&ast)),
            vec![ident("x"), ident("+"), NodeKind::Lit(LitValue::Uint(1))]
        );
    }

    #[test]
    fn test_separators_do_not_huddle() {
        let ast = parse_str("{a: b}");
        let pair = ast.node(line_content(&ast)).children[0];
        assert_eq!(child_kinds(&ast, pair), vec![ident("a"), ident("b")]);
    }

    #[test]
    fn test_huddle_is_idempotent() {
        let source = "foo x+1 (a.b c)\n  bar [1,2]-x";
        let lexed = lexer::lex(source);
        let ast = parse(&lexed.tokens, source);
        let mut nodes = ast.to_nodes();
        huddle(&mut nodes, &lexed.tokens);
        assert_eq!(nodes, ast.to_nodes());
    }

    #[test]
    fn test_shebang_line_is_a_comment() {
        let ast = parse_str("#!/usr/bin/env loon\nfoo");
        assert_eq!(ast.roots().len(), 2);
        let first = ast.node(ast.roots()[0]);
        assert_eq!(first.kind, NodeKind::Comment);
        assert!(first.children.is_empty());

        let lexed = lexer::lex("#!/bin/loon x");
        let ast = Parser::new(&lexed.tokens, "#!/bin/loon x").with_shebang_prefix("#!/bin/").parse();
        assert_eq!(ast.node(ast.roots()[0]).kind, NodeKind::Comment);
    }

    #[test]
    fn test_unclosed_levels_become_one_indentation_err() {
        let source = "a\n  b";
        let mut tokens = lexer::lex(source).tokens;
        assert_eq!(tokens.pop().map(|t| t.kind), Some(TokenKind::End));
        let ast = parse(&tokens, source);
        let root = only_root(&ast);
        assert!(ast.node(root).kind.is_err());
        assert_eq!(child_kinds(&ast, root), vec![ident("a"), NodeKind::BlockLine]);
        let errs = ast.err_diagnostics();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].code, DiagCode::Indentation);
    }

    #[test]
    fn test_stray_end_is_ignored() {
        let source = "a";
        let mut tokens = lexer::lex(source).tokens;
        let end = tokens[tokens.len() - 1];
        tokens.push(end);
        let ast = parse(&tokens, source);
        assert!(!ast.any_errs());
        assert_eq!(ast.roots().len(), 1);
    }

    #[test]
    fn test_tree_dump() {
        let source = "f x+1\n  (a, b)\n";
        let ast = parse_str(source);
        insta::assert_snapshot!(ast.dump(source).trim_end(), @r"
        BlockLine 1,1-2,9
          Ident 1,1-1,2 f
          Group 1,3-1,6 Implicit
            Ident 1,3-1,4 x
            Ident 1,4-1,5 +
            Lit 1,5-1,6 1
          BlockLine 2,3-2,9
            Group 2,3-2,9 Tuple
              Ident 2,4-2,5 a
              Ident 2,7-2,8 b
        ");
    }
}
