//! Abstract Syntax Tree definitions for Loon
//!
//! The parser first builds an owned [`Node`] tree (easy to restructure during huddling), then
//! freezes it into an [`Ast`] arena where nodes refer to each other by [`NodeId`]. Parent links
//! exist only in the arena and are assigned after all restructuring is done.
//!
//! ## Notes
//! - Every node covers a contiguous range of the file's token sequence (`toks`), so a node can
//!   always be mapped back into the token array and, from there, the source text.
//! - Nodes hold no text; use [`Ast::src`] with the source the tokens were lexed from.

use std::fmt::{self, Write as _};
use std::ops::Range;

use crate::diagnostics::Diagnostic;
use crate::lexer::Token;
use crate::span::{Pos, Span};
use crate::token_helpers::{toks_byte_range, toks_span};

// ============================================================================
// Node kinds
// ============================================================================

/// A decoded literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum LitValue {
    /// Integer literals written with a leading `-`.
    Int(i64),
    Uint(u64),
    Float(f64),
    Rune(char),
    Str(String),
}

impl fmt::Display for LitValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LitValue::Int(v) => write!(f, "{v}"),
            LitValue::Uint(v) => write!(f, "{v}"),
            LitValue::Float(v) => write!(f, "{v:?}"),
            LitValue::Rune(c) => write!(f, "{c:?}"),
            LitValue::Str(s) => write!(f, "{s:?}"),
        }
    }
}

/// What a [`NodeKind::Group`] arose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKind {
    /// `( ... )` with a single comma-free interior (call-ish).
    Parens,
    /// `[ ... ]`
    Brackets,
    /// `{ ... }`
    Braces,
    /// `( a, b, ... )` with several comma items (tuple-ish).
    Tuple,
    /// No brackets: huddled juxtaposition, a `key: value` pair, or a multi-node comma item.
    Implicit,
}

impl GroupKind {
    pub fn is_bracketed(self) -> bool {
        !matches!(self, GroupKind::Implicit)
    }
}

/// A node's kind together with its kind-specific payload.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Unparseable region; carries the diagnostic and any recovered children.
    Err(Diagnostic),
    /// Both `/* multi-line */` and `// single-line`.
    Comment,
    /// `foo`, `@prim`, `:kw`, `==`, `<==<`
    Ident(String),
    /// `123`, `-321`, `1.23`, `"foo"`, `` `bar` ``, `'ö'`
    Lit(LitValue),
    Group(GroupKind),
    /// One line (plus its indented continuation lines) of an indentation block.
    BlockLine,
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Err(_) => "Err",
            NodeKind::Comment => "Comment",
            NodeKind::Ident(_) => "Ident",
            NodeKind::Lit(_) => "Lit",
            NodeKind::Group(_) => "Group",
            NodeKind::BlockLine => "BlockLine",
        }
    }

    pub fn is_err(&self) -> bool {
        matches!(self, NodeKind::Err(_))
    }

    /// Identifiers (other than the `,` and `:` separators), literals and groups may huddle.
    pub fn can_huddle(&self) -> bool {
        match self {
            NodeKind::Ident(name) => !matches!(name.as_str(), "," | ":"),
            NodeKind::Lit(_) | NodeKind::Group(_) => true,
            _ => false,
        }
    }
}

// ============================================================================
// Owned tree (parser output before freezing)
// ============================================================================

/// An owned syntax node, as built by the parser.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    /// Range into the file's token sequence.
    pub toks: Range<usize>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn leaf(kind: NodeKind, toks: Range<usize>) -> Self {
        Self {
            kind,
            toks,
            children: Vec::new(),
        }
    }

    pub fn with_children(kind: NodeKind, toks: Range<usize>, children: Vec<Node>) -> Self {
        Self { kind, toks, children }
    }

    /// Token range from the first node's start to the last node's end.
    pub fn toks_of(nodes: &[Node]) -> Range<usize> {
        match (nodes.first(), nodes.last()) {
            (Some(first), Some(last)) => first.toks.start..last.toks.end,
            _ => 0..0,
        }
    }

    /// Return `true` if this node's first token starts exactly where `prev`'s last token ends.
    pub fn is_whitespacelessly_right_after(&self, prev: &Node, tokens: &[Token]) -> bool {
        let (Some(first), Some(prev_last)) = (tokens.get(self.toks.start), prev.toks.end.checked_sub(1)) else {
            return false;
        };
        tokens
            .get(prev_last)
            .is_some_and(|prev_last| first.is_whitespacelessly_right_after(prev_last))
    }
}

// ============================================================================
// Arena
// ============================================================================

/// Index of a node within its [`Ast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A frozen syntax node.
#[derive(Debug, Clone, PartialEq)]
pub struct AstNode {
    pub kind: NodeKind,
    /// Range into the file's token sequence.
    pub toks: Range<usize>,
    /// Byte range of the node's source text.
    pub bytes: Range<usize>,
    pub span: Span,
    /// Structural container; `None` for top-level nodes.
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// A file's syntax tree: an arena of nodes plus the ordered top-level node list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ast {
    nodes: Vec<AstNode>,
    roots: Vec<NodeId>,
}

impl Ast {
    /// Freeze an owned tree into an arena, assigning parent links.
    pub fn from_nodes(roots: Vec<Node>, tokens: &[Token], source: &str) -> Ast {
        let mut ast = Ast::default();
        let mut root_ids = Vec::with_capacity(roots.len());
        for node in roots {
            root_ids.push(ast.alloc(node, None, tokens, source));
        }
        ast.roots = root_ids;
        ast
    }

    fn alloc(&mut self, node: Node, parent: Option<NodeId>, tokens: &[Token], source: &str) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).expect("INVARIANT: fewer than 2^32 AST nodes"));
        let span = toks_span(tokens, node.toks.clone(), source);
        let bytes = toks_byte_range(tokens, node.toks.clone());
        self.nodes.push(AstNode {
            kind: node.kind,
            toks: node.toks,
            bytes,
            span,
            parent,
            children: Vec::with_capacity(node.children.len()),
        });
        for child in node.children {
            let child_id = self.alloc(child, Some(id), tokens, source);
            self.nodes[id.index()].children.push(child_id);
        }
        id
    }

    /// Thaw back into an owned tree.
    pub fn to_nodes(&self) -> Vec<Node> {
        self.roots.iter().map(|&id| self.to_node(id)).collect()
    }

    fn to_node(&self, id: NodeId) -> Node {
        let node = self.node(id);
        Node::with_children(
            node.kind.clone(),
            node.toks.clone(),
            node.children.iter().map(|&child| self.to_node(child)).collect(),
        )
    }

    // ========================================================================
    // Access
    // ========================================================================

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> &AstNode {
        &self.nodes[id.index()]
    }

    pub fn get(&self, id: NodeId) -> Option<&AstNode> {
        self.nodes.get(id.index())
    }

    /// Total number of nodes at all depths.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// The node's source text.
    pub fn src<'s>(&self, id: NodeId, source: &'s str) -> &'s str {
        &source[self.node(id).bytes.clone()]
    }

    /// The node itself, then its parent, and so on up to its top-level node.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), |&it| self.node(it).parent)
    }

    // ========================================================================
    // Walking
    // ========================================================================

    /// Pre-order walk over all nodes; returning `false` from `visit` skips that node's children.
    pub fn walk<'a>(&'a self, mut visit: impl FnMut(NodeId, &'a AstNode) -> bool) {
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            if visit(id, node) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
    }

    /// First node, in pre-order below and including `from`, satisfying `pred`.
    pub fn find_from(&self, from: NodeId, pred: impl Fn(&AstNode) -> bool) -> Option<NodeId> {
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            if pred(node) {
                return Some(id);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        None
    }

    /// Return `true` if any node at any depth satisfies `pred`.
    pub fn has(&self, pred: impl Fn(&AstNode) -> bool) -> bool {
        self.nodes.iter().any(pred)
    }

    /// Return `true` if any node at any depth has the same kind as `kind` (payloads ignored).
    pub fn has_kind(&self, kind: &NodeKind) -> bool {
        let wanted = std::mem::discriminant(kind);
        self.has(|node| std::mem::discriminant(&node.kind) == wanted)
    }

    pub fn any_errs(&self) -> bool {
        self.has(|node| node.kind.is_err())
    }

    /// The diagnostics of all `Err` nodes, in tree order.
    pub fn err_diagnostics(&self) -> Vec<&Diagnostic> {
        let mut out = Vec::new();
        self.walk(|_, node| {
            if let NodeKind::Err(diag) = &node.kind {
                out.push(diag);
            }
            true
        });
        out
    }

    // ========================================================================
    // Lookup by position
    // ========================================================================

    /// Deepest leaf containing `pos`, searching the first top-level node that contains it.
    ///
    /// With `or_ancestor`, falls back to that top-level node when no leaf contains `pos`.
    pub fn node_at_pos(&self, pos: Pos, or_ancestor: bool) -> Option<NodeId> {
        let &top = self.roots.iter().find(|&&id| self.node(id).span.contains(pos))?;
        self.find_from(top, |node| node.children.is_empty() && node.span.contains(pos))
            .or(or_ancestor.then_some(top))
    }

    /// The first node whose span equals `span` exactly.
    pub fn node_at_span(&self, span: Span) -> Option<NodeId> {
        self.roots
            .iter()
            .filter(|&&id| {
                let top_span = self.node(id).span;
                top_span.contains(span.start) || top_span.contains(span.end)
            })
            .find_map(|&top| self.find_from(top, |node| node.span == span))
    }

    // ========================================================================
    // Structural comparison
    // ========================================================================

    /// Comments, and block lines holding nothing but comments, do not count structurally.
    pub fn is_comment_like(&self, id: NodeId) -> bool {
        let node = self.node(id);
        match node.kind {
            NodeKind::Comment => true,
            NodeKind::BlockLine => node.children.iter().all(|&child| self.is_comment_like(child)),
            _ => false,
        }
    }

    pub fn without_comments(&self, ids: &[NodeId]) -> Vec<NodeId> {
        ids.iter().copied().filter(|&id| !self.is_comment_like(id)).collect()
    }

    /// The span a node is compared by: a block line covers only its non-comment children, so a
    /// trailing comment does not move it.
    fn structural_span(&self, id: NodeId) -> Span {
        let node = self.node(id);
        if node.kind != NodeKind::BlockLine {
            return node.span;
        }
        self.without_comments(&node.children)
            .into_iter()
            .map(|child| self.structural_span(child))
            .reduce(Span::expanded)
            .unwrap_or(node.span)
    }

    /// Compare two nodes (possibly from different trees) by kind, payload and children, ignoring
    /// comments; spans are compared too when `including_spans`.
    pub fn node_eq(&self, id: NodeId, other: &Ast, other_id: NodeId, including_spans: bool) -> bool {
        let (mine, theirs) = (self.node(id), other.node(other_id));
        if including_spans && self.structural_span(id) != other.structural_span(other_id) {
            return false;
        }
        let kinds_eq = match (&mine.kind, &theirs.kind) {
            (NodeKind::Err(d1), NodeKind::Err(d2)) => d1.equals(d2, including_spans),
            (k1, k2) => k1 == k2,
        };
        if !kinds_eq {
            return false;
        }
        let (my_children, their_children) = (
            self.without_comments(&mine.children),
            other.without_comments(&theirs.children),
        );
        my_children.len() == their_children.len()
            && my_children
                .iter()
                .zip(&their_children)
                .all(|(&c1, &c2)| self.node_eq(c1, other, c2, including_spans))
    }

    /// Return `true` if going from `old` to `new` changed only comments, whitespace that
    /// moves no node, or the order of top-level nodes.
    ///
    /// Both sides must have the same number of non-comment top-level nodes, and every one in
    /// `new` must equal (spans included) some node in `old`. Duplicates are not paired up.
    pub fn is_cosmetic_edit(old: &Ast, new: &Ast) -> bool {
        let old_roots = old.without_comments(&old.roots);
        let new_roots = new.without_comments(&new.roots);
        old_roots.len() == new_roots.len()
            && new_roots
                .iter()
                .all(|&new_id| old_roots.iter().any(|&old_id| new.node_eq(new_id, old, old_id, true)))
    }

    // ========================================================================
    // Debug output
    // ========================================================================

    /// Indented one-node-per-line dump of the tree.
    pub fn dump(&self, source: &str) -> String {
        let mut out = String::new();
        for &root in &self.roots {
            self.dump_node(&mut out, root, 0, source);
        }
        out
    }

    fn dump_node(&self, out: &mut String, id: NodeId, depth: usize, source: &str) {
        let node = self.node(id);
        let _ = write!(out, "{:indent$}{} {}", "", node.kind.name(), node.span, indent = depth * 2);
        let _ = match &node.kind {
            NodeKind::Err(diag) => write!(out, " {diag}"),
            NodeKind::Comment => write!(out, " {:?}", self.src(id, source)),
            NodeKind::Ident(name) => write!(out, " {name}"),
            NodeKind::Lit(lit) => write!(out, " {lit}"),
            NodeKind::Group(group) => write!(out, " {group:?}"),
            NodeKind::BlockLine => Ok(()),
        };
        out.push('\n');
        for &child in &node.children {
            self.dump_node(out, child, depth + 1, source);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagCode;
    use crate::{lexer, parser};

    fn ast_of(source: &str) -> Ast {
        let lexed = lexer::lex(source);
        parser::parse(&lexed.tokens, source)
    }

    #[test]
    fn test_parents_are_consistent() {
        let ast = ast_of("foo (a, b)\n  bar [c d]\n");
        ast.walk(|id, node| {
            for &child in &node.children {
                assert_eq!(ast.node(child).parent, Some(id));
            }
            true
        });
        for &root in ast.roots() {
            assert_eq!(ast.node(root).parent, None);
        }
    }

    #[test]
    fn test_ancestors_end_at_top_level() {
        let source = "f (x y)";
        let ast = ast_of(source);
        let leaf = ast.node_at_pos(Pos::new(1, 6), false).unwrap();
        assert_eq!(ast.src(leaf, source), "y");
        let chain: Vec<_> = ast.ancestors(leaf).collect();
        assert_eq!(chain.first(), Some(&leaf));
        assert_eq!(chain.last(), ast.roots().first());
        assert!(chain.len() >= 3);
    }

    #[test]
    fn test_node_at_pos_falls_back_to_top_level() {
        let source = "foo   bar";
        let ast = ast_of(source);
        assert_eq!(ast.node_at_pos(Pos::new(1, 5), false), None);
        assert_eq!(ast.node_at_pos(Pos::new(1, 5), true), ast.roots().first().copied());
        assert_eq!(ast.node_at_pos(Pos::new(3, 1), true), None);
    }

    #[test]
    fn test_node_at_span() {
        let source = "foo bar";
        let ast = ast_of(source);
        let id = ast.node_at_span(Span::new(Pos::new(1, 5), Pos::new(1, 8))).unwrap();
        assert_eq!(ast.src(id, source), "bar");
    }

    #[test]
    fn test_has_kind_and_errs() {
        let ast = ast_of("x // c");
        assert!(ast.has_kind(&NodeKind::Comment));
        assert!(ast.has_kind(&NodeKind::Ident(String::new())));
        assert!(!ast.any_errs());
        assert!(ast_of("(a b").any_errs());
    }

    #[test]
    fn test_cosmetic_edits() {
        let base = ast_of("x\n");
        assert!(Ast::is_cosmetic_edit(&base, &ast_of("x  \n")));
        assert!(Ast::is_cosmetic_edit(&base, &ast_of("x\n// note\n")));
        assert!(Ast::is_cosmetic_edit(&base, &ast_of("x // note\n")));
        assert!(!Ast::is_cosmetic_edit(&base, &ast_of("// note\nx\n")));
        assert!(!Ast::is_cosmetic_edit(&base, &ast_of("y\n")));
        assert!(!Ast::is_cosmetic_edit(&base, &ast_of("x\nx\n")));
        assert!(!Ast::is_cosmetic_edit(&Ast::default(), &base));
    }

    #[test]
    fn test_err_diagnostics_in_tree_order() {
        let ast = ast_of("{a}\nb {c}\n");
        let diags = ast.err_diagnostics();
        assert_eq!(diags.len(), 2);
        assert!(diags.iter().all(|diag| diag.code == DiagCode::ExpectedFoo));
        assert_eq!(diags[0].span.start, Pos::new(1, 2));
        assert_eq!(diags[1].span.start, Pos::new(2, 4));
    }

    #[test]
    fn test_round_trip_through_owned_nodes() {
        let source = "a (b, c)\n  d";
        let lexed = lexer::lex(source);
        let ast = parser::parse(&lexed.tokens, source);
        let again = Ast::from_nodes(ast.to_nodes(), &lexed.tokens, source);
        assert_eq!(ast, again);
    }
}
