use crate::tree::{NodeIndex, Tree};
use std::collections::{HashMap, HashSet};

/// One row of the visible list: a node and the node it is drawn inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleEntry {
    pub node: NodeIndex,
    pub parent: Option<NodeIndex>,
}

/// Pre-order walk from the root that only descends into expanded nodes. The
/// root is always the first entry.
pub fn collect_visible(tree: &Tree) -> Vec<VisibleEntry> {
    let mut out = Vec::new();
    let mut stack = vec![VisibleEntry {
        node: tree.root(),
        parent: None,
    }];
    while let Some(entry) = stack.pop() {
        out.push(entry);
        let node = tree.node(entry.node);
        if node.expanded {
            stack.extend(node.children().iter().rev().map(|&child| VisibleEntry {
                node: child,
                parent: Some(entry.node),
            }));
        }
    }
    out
}

pub fn visible_ids(visible: &[VisibleEntry]) -> HashSet<NodeIndex> {
    visible.iter().map(|entry| entry.node).collect()
}

/// Id lookup over the whole tree, visible or not: links name hosts regardless
/// of what is currently on screen.
pub fn index_all_nodes(tree: &Tree) -> HashMap<String, NodeIndex> {
    tree.iter().map(|(idx, node)| (node.id.clone(), idx)).collect()
}
