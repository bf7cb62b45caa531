/// Bracketed groups: `(...)`, `[...]` and `{...}`.
///
/// ## Notes
/// - Only brackets of the opener's own family count towards finding its closer.
/// - A comma-free round or square interior parses as a plain node sequence. Otherwise the
///   interior is split on top-level commas and each item is parsed on its own; curly items must
///   each be one `key: value` pair.

impl<'a> Parser<'a> {
    /// Parse the bracketed group opened at `idx`, looking for its closer before `end`.
    ///
    /// Returns the group and the index just past its closer, or an `Err` node covering the rest
    /// of the range if the bracketing does not match up.
    fn parse_bracketed(&self, idx: usize, end: usize) -> Result<(Node, usize), Node> {
        let (family, opening) = self.tokens[idx]
            .bracket(self.source)
            .expect("INVARIANT: Bracketing tokens are one of ()[]{}");
        if !opening {
            return Err(self.bracketing_err(idx, end, family));
        }
        let Some(close) = self.find_closer(idx, end, family) else {
            return Err(self.bracketing_err(idx, end, family));
        };

        let inner = idx + 1..close;
        let mut kind = match family {
            BracketFamily::Parens => GroupKind::Parens,
            BracketFamily::Brackets => GroupKind::Brackets,
            BracketFamily::Braces => GroupKind::Braces,
        };
        let mut children = Vec::new();
        if !inner.is_empty() {
            let items = split_toks(self.tokens, inner.clone(), ",", self.source);
            let is_curly = family == BracketFamily::Braces;
            if !is_curly && items.len() == 1 {
                children = self.parse_nodes(inner);
            } else {
                if family == BracketFamily::Parens {
                    kind = GroupKind::Tuple;
                }
                children = self.parse_items(&items, idx + 1, is_curly);
            }
        }

        Ok((Node::with_children(NodeKind::Group(kind), idx..close + 1, children), close + 1))
    }

    fn find_closer(&self, idx: usize, end: usize, family: BracketFamily) -> Option<usize> {
        let mut level: usize = 0;
        for (i, tok) in self.tokens[..end].iter().enumerate().skip(idx) {
            if tok.is_bracket_opening(self.source, Some(family)) {
                level += 1;
            } else if tok.is_bracket_closing(self.source, Some(family)) {
                level -= 1;
                if level == 0 {
                    return Some(i);
                }
            }
        }
        None
    }

    /// An `Err` node spanning everything from `idx` to the end of the current level.
    fn bracketing_err(&self, idx: usize, end: usize, family: BracketFamily) -> Node {
        let mut stop = end;
        while stop > idx + 1 && self.tokens[stop - 1].kind.is_layout() {
            stop -= 1;
        }
        let span = toks_span(self.tokens, idx..stop, self.source);
        Node::leaf(NodeKind::Err(errors::bracketing_mismatch(span, family.name())), idx..stop)
    }

    /// Parse comma items. `first_inner` is the token right after the opener, where a leading
    /// empty item gets reported.
    fn parse_items(&self, items: &[Range<usize>], first_inner: usize, is_curly: bool) -> Vec<Node> {
        let mut err_tok = first_inner;
        let mut nodes = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            if item.is_empty() {
                // a single trailing comma is fine: `(a,)`, `{k: v,}`
                if i > 0 && i + 1 == items.len() {
                    continue;
                }
                nodes.push(self.expected_at(err_tok, "expression before the superfluous comma"));
                continue;
            }

            err_tok = item.end - 1;
            if !is_curly {
                nodes.push(self.parse_node(item.clone()));
                continue;
            }
            match split_toks(self.tokens, item.clone(), ":", self.source).as_slice() {
                [key, value] if !key.is_empty() && !value.is_empty() => {
                    let pair = vec![self.parse_node(key.clone()), self.parse_node(value.clone())];
                    nodes.push(Node::with_children(
                        NodeKind::Group(GroupKind::Implicit),
                        Node::toks_of(&pair),
                        pair,
                    ));
                }
                _ => nodes.push(self.expected_at(err_tok, "expression pair separated by `:`")),
            }
        }
        nodes
    }

    fn expected_at(&self, tok_idx: usize, what: &str) -> Node {
        let span = self.tokens[tok_idx].span(self.source);
        Node::leaf(NodeKind::Err(errors::expected(span, what)), tok_idx..tok_idx + 1)
    }
}
