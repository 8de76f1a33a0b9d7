//! Generic "visit every node" utility over a target tree
//!
//! Post-processing passes plug in a per-node callback instead of writing their
//! own traversal. Every node reachable from the root is visited exactly once,
//! in pre-order, even if a rule attached the same handle twice.

use crate::target::{TargetId, TargetNode, TargetTree};

/// Handles reachable from the root, in pre-order.
pub fn reachable(tree: &TargetTree) -> Vec<TargetId> {
    let mut visited = vec![false; tree.len()];
    let mut order = Vec::new();
    let mut stack = vec![tree.root()];

    while let Some(id) = stack.pop() {
        let Some(node) = tree.get(id) else { continue };
        if std::mem::replace(&mut visited[id.index()], true) {
            continue;
        }
        order.push(id);

        let children: Vec<TargetId> = node.child_ids().collect();
        stack.extend(children.into_iter().rev());
    }

    order
}

pub fn walk<F>(tree: &TargetTree, mut enter: F)
where
    F: FnMut(TargetId, &TargetNode),
{
    for id in reachable(tree) {
        if let Some(node) = tree.get(id) {
            enter(id, node);
        }
    }
}

/// Like [`walk`], with mutable access to each node's kind and positions.
pub fn walk_mut<F>(tree: &mut TargetTree, mut enter: F)
where
    F: FnMut(TargetId, &mut TargetNode),
{
    for id in reachable(tree) {
        if let Some(node) = tree.get_mut(id) {
            enter(id, node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::{SourceLocation, TextRange};
    use crate::target::Field;

    fn leaf(kind: &str) -> TargetNode {
        TargetNode::new(
            kind.to_string(),
            Vec::new(),
            TextRange::default(),
            SourceLocation::default(),
            false,
        )
    }

    fn parent(kind: &str, fields: Vec<(&str, Field)>) -> TargetNode {
        TargetNode::new(
            kind.to_string(),
            fields
                .into_iter()
                .map(|(name, field)| (name.to_string(), field))
                .collect(),
            TextRange::default(),
            SourceLocation::default(),
            false,
        )
    }

    fn id(index: usize) -> TargetId {
        TargetId::from_index(index)
    }

    #[test]
    fn test_walk_is_pre_order_in_field_order() {
        // 0: a, 1: b, 2: c, 3: Binary(a, b), 4: Program[Binary, c], 5: orphan
        let nodes = vec![
            leaf("a"),
            leaf("b"),
            leaf("c"),
            parent("Binary", vec![("left", Field::Node(id(0))), ("right", Field::Node(id(1)))]),
            parent("Program", vec![("body", Field::Nodes(vec![id(3), id(2)]))]),
            leaf("orphan"),
        ];
        let tree = TargetTree::new(nodes, id(4));

        let mut kinds = Vec::new();
        walk(&tree, |_, node| kinds.push(node.kind.clone()));

        assert_eq!(kinds, vec!["Program", "Binary", "a", "b", "c"]);
    }

    #[test]
    fn test_shared_handle_is_visited_once() {
        let nodes = vec![
            leaf("shared"),
            parent("Pair", vec![("first", Field::Node(id(0))), ("second", Field::Node(id(0)))]),
        ];
        let mut tree = TargetTree::new(nodes, id(1));

        let mut visits = 0;
        walk_mut(&mut tree, |_, node| {
            visits += 1;
            node.range = None;
        });

        assert_eq!(visits, 2);
        assert_eq!(reachable(&tree), vec![id(1), id(0)]);
        assert!(tree.get(id(0)).unwrap().range.is_none());
    }
}
