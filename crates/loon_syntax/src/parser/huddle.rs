/// Huddling: regrouping whitespace-adjacent nodes.
///
/// Within a sibling list, a run of nodes that may huddle (see [`NodeKind::can_huddle`]) with no
/// whitespace between them, like `x+1` in `foo x+1 y`, is treated as if it were parenthesized
/// and becomes one implicit [`GroupKind::Implicit`] group.
///
/// ## Notes
/// - Runs of one node are left alone.
/// - A list that is already one single run is left unchanged (no redundant wrapping), which
///   also makes the pass idempotent.

/// Huddle every sibling list in the tree, children before parents, the top level included.
pub fn huddle(nodes: &mut Vec<Node>, tokens: &[Token]) {
    for node in nodes.iter_mut() {
        huddle(&mut node.children, tokens);
    }
    huddle_siblings(nodes, tokens);
}

fn huddles_with(prev: &Node, cur: &Node, tokens: &[Token]) -> bool {
    prev.kind.can_huddle() && cur.kind.can_huddle() && cur.is_whitespacelessly_right_after(prev, tokens)
}

fn huddle_siblings(nodes: &mut Vec<Node>, tokens: &[Token]) {
    if nodes.len() <= 1 || nodes.windows(2).all(|pair| huddles_with(&pair[0], &pair[1], tokens)) {
        return;
    }

    let mut huddled = Vec::with_capacity(nodes.len());
    let mut run: Vec<Node> = Vec::new();
    for node in std::mem::take(nodes) {
        if let Some(prev) = run.last()
            && !huddles_with(prev, &node, tokens)
        {
            huddled.push(into_group(std::mem::take(&mut run)));
        }
        run.push(node);
    }
    huddled.push(into_group(run));
    *nodes = huddled;
}

fn into_group(mut run: Vec<Node>) -> Node {
    if run.len() == 1
        && let Some(only) = run.pop()
    {
        return only;
    }
    Node::with_children(NodeKind::Group(GroupKind::Implicit), Node::toks_of(&run), run)
}
