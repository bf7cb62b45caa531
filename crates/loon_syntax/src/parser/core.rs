/// Parser core types and entrypoint.
///
/// This chunk defines the [`Parser`] type, its top-level `parse()` entrypoint and the main
/// token-kind dispatch loop.
///
/// ## Notes
/// - This file is `include!`'d into `crate::parser` to keep all parser methods in a
///   single module while avoiding a single “god file”.

/// Nodes accumulated for an enclosing indentation level while a deeper one is open.
struct Frame {
    /// Token index of the `Begin` that opened the deeper level.
    begin: usize,
    outer: Vec<Node>,
}

/// Interpreter directive that turns a script's first line into a comment.
pub const DEFAULT_SHEBANG_PREFIX: &str = "#!/usr/bin/env ";

/// Parser state.
///
/// ## Notes
/// - The parser never aborts: problems become `Err` nodes and parsing resumes right after them
///   (or, for bracketing mismatches, at the end of the current nesting level).
pub struct Parser<'a> {
    tokens: &'a [Token],
    source: &'a str,
    shebang_prefix: &'a str,
}

impl<'a> Parser<'a> {
    /// Create a new parser.
    ///
    /// ## Parameters
    /// - `tokens`: Token sequence produced by `loon_syntax::lexer` from `source`.
    /// - `source`: The exact text the tokens were lexed from.
    pub fn new(tokens: &'a [Token], source: &'a str) -> Self {
        Self {
            tokens,
            source,
            shebang_prefix: DEFAULT_SHEBANG_PREFIX,
        }
    }

    /// Use a different interpreter-directive prefix for the first-line comment exception.
    pub fn with_shebang_prefix(mut self, prefix: &'a str) -> Self {
        self.shebang_prefix = prefix;
        self
    }

    /// Parse the entire token sequence into an [`Ast`].
    pub fn parse(self) -> Ast {
        let mut roots = self.parse_nodes(0..self.tokens.len());

        // `foo x+z y` is `foo x + z y` right now, make it `foo (x+z) y`
        huddle(&mut roots, self.tokens);

        self.comment_out_shebang(&mut roots);

        Ast::from_nodes(roots, self.tokens, self.source)
    }

    /// Parse a token range that should form one node: a single parsed node stays as it is,
    /// several are wrapped into an implicit group over the whole range.
    fn parse_node(&self, range: Range<usize>) -> Node {
        let mut nodes = self.parse_nodes(range.clone());
        if nodes.len() == 1
            && let Some(node) = nodes.pop()
        {
            return node;
        }
        Node::with_children(NodeKind::Group(GroupKind::Implicit), range, nodes)
    }

    /// Parse a token range into a sibling list.
    fn parse_nodes(&self, range: Range<usize>) -> Vec<Node> {
        let mut frames: Vec<Frame> = Vec::new();
        let mut nodes: Vec<Node> = Vec::new();
        let mut had_bracket_err = false;

        let mut idx = range.start;
        while idx < range.end {
            let tok = &self.tokens[idx];
            match tok.kind {
                TokenKind::Comment => {
                    nodes.push(Node::leaf(NodeKind::Comment, idx..idx + 1));
                    idx += 1;
                }
                TokenKind::LitStr | TokenKind::LitFloat | TokenKind::LitRune | TokenKind::LitInt => {
                    nodes.push(self.parse_lit(idx));
                    idx += 1;
                }
                TokenKind::IdentWord | TokenKind::IdentOpish => {
                    let name = tok.src(self.source).to_string();
                    nodes.push(Node::leaf(NodeKind::Ident(name), idx..idx + 1));
                    idx += 1;
                }
                TokenKind::Bracketing => match self.parse_bracketed(idx, range.end) {
                    Ok((group, next)) => {
                        nodes.push(group);
                        idx = next;
                    }
                    Err(err_node) => {
                        had_bracket_err = true;
                        nodes.push(err_node);
                        idx = range.end;
                    }
                },
                TokenKind::Begin => {
                    frames.push(Frame {
                        begin: idx,
                        outer: std::mem::take(&mut nodes),
                    });
                    idx += 1;
                }
                TokenKind::End => {
                    // a stray End (no open frame) is ignored
                    if let Some(frame) = frames.pop() {
                        let line = std::mem::replace(&mut nodes, frame.outer);
                        if !line.is_empty() {
                            nodes.push(Node::with_children(NodeKind::BlockLine, Node::toks_of(&line), line));
                        }
                    }
                    idx += 1;
                }
            }
        }

        // levels left open: one indentation error for the innermost, unless a bracketing error
        // already cut this level short (then everything just folds into block lines)
        let mut report_unclosed = !had_bracket_err;
        while let Some(frame) = frames.pop() {
            let inner = std::mem::replace(&mut nodes, frame.outer);
            if report_unclosed {
                report_unclosed = false;
                let toks = frame.begin..range.end;
                let diag = errors::indentation(toks_span(self.tokens, toks.clone(), self.source));
                nodes.push(Node::with_children(NodeKind::Err(diag), toks, inner));
            } else if !inner.is_empty() {
                nodes.push(Node::with_children(NodeKind::BlockLine, Node::toks_of(&inner), inner));
            }
        }

        nodes
    }

    /// A script's leading interpreter directive line becomes a comment.
    fn comment_out_shebang(&self, roots: &mut [Node]) {
        let Some(first) = roots.first_mut() else {
            return;
        };
        let Some(first_tok) = self.tokens.get(first.toks.start) else {
            return;
        };
        if first_tok.pos != crate::span::Pos::origin() || self.shebang_prefix.is_empty() {
            return;
        }
        let start = first_tok.offset;
        if self.source[start..].starts_with(self.shebang_prefix) {
            first.kind = NodeKind::Comment;
            first.children.clear();
        }
    }
}
