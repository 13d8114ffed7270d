//! Nested circle layout over the currently expanded part of the tree.
//!
//! Every recompute runs three passes from the root: radii bottom-up, local
//! offsets top-down (packing again and scaling the cluster to fit the parent),
//! then absolute positions. Nothing is patched incrementally.

pub mod pack;
pub mod visibility;

pub use pack::{Circle, pack_enclose, pack_siblings, pack_with_padding};
pub use visibility::{VisibleEntry, collect_visible, index_all_nodes, visible_ids};

use crate::config::LayoutConfig;
use crate::tree::{NodeIndex, Tree};

/// Full layout pass. Deterministic in tree shape, expand state and `config`.
pub fn compute_layout(tree: &mut Tree, config: &LayoutConfig) {
    let _span = tracing::debug_span!("compute_layout", nodes = tree.len()).entered();
    let root = tree.root();
    compute_radius(tree, root, config);

    let node = tree.node_mut(root);
    node.x = 0.0;
    node.y = 0.0;
    layout_children(tree, root, config);

    compute_absolute_positions(tree, root, 0.0, 0.0);
    tracing::debug!(root_radius = tree.node(root).r, "layout complete");
}

/// Post-order radius pass. Collapsed and childless nodes get the base radius;
/// expanded ones wrap their packed children plus the outer padding.
pub fn compute_radius(tree: &mut Tree, index: NodeIndex, config: &LayoutConfig) -> f64 {
    let children = tree.node(index).children().to_vec();
    for &child in &children {
        compute_radius(tree, child, config);
    }

    let r = if children.is_empty() || !tree.node(index).expanded {
        config.base_radius
    } else {
        let mut circles = child_circles(tree, &children);
        let enclosing = pack_with_padding(&mut circles, config.sibling_padding);
        config.base_radius.max(enclosing.r + config.outer_padding)
    };
    tree.node_mut(index).r = r;
    r
}

/// Pre-order offset pass. Children are packed again with the same inputs as
/// the radius pass and scaled so the cluster fills `r - outer_padding`.
pub fn layout_children(tree: &mut Tree, index: NodeIndex, config: &LayoutConfig) {
    let node = tree.node(index);
    if !node.has_children() || !node.expanded {
        return;
    }
    let children = node.children().to_vec();
    let target = (node.r - config.outer_padding).max(0.0);

    let mut circles = child_circles(tree, &children);
    let enclosing = pack_with_padding(&mut circles, config.sibling_padding);
    let scale = if enclosing.r > 0.0 {
        target / enclosing.r
    } else {
        1.0
    };

    for (&child, circle) in children.iter().zip(&circles) {
        let node = tree.node_mut(child);
        node.x = (circle.x - enclosing.x) * scale;
        node.y = (circle.y - enclosing.y) * scale;
    }
    for &child in &children {
        layout_children(tree, child, config);
    }
}

/// Accumulates local offsets into absolute coordinates. Stops at collapsed
/// nodes; anything below them keeps stale coordinates that must not be read.
pub fn compute_absolute_positions(
    tree: &mut Tree,
    index: NodeIndex,
    parent_abs_x: f64,
    parent_abs_y: f64,
) {
    let node = tree.node_mut(index);
    node.abs_x = parent_abs_x + node.x;
    node.abs_y = parent_abs_y + node.y;
    if !node.expanded || !node.has_children() {
        return;
    }
    let (abs_x, abs_y) = (node.abs_x, node.abs_y);
    let children = node.children().to_vec();
    for child in children {
        compute_absolute_positions(tree, child, abs_x, abs_y);
    }
}

/// Deepest visible non-root node whose circle contains `(x, y)`; ties go to
/// the nearest centre.
pub fn hit_test(tree: &Tree, visible: &[VisibleEntry], x: f64, y: f64) -> Option<NodeIndex> {
    visible
        .iter()
        .filter_map(|entry| {
            let node = tree.node(entry.node);
            if node.is_root() {
                return None;
            }
            let distance = ((node.abs_x - x).powi(2) + (node.abs_y - y).powi(2)).sqrt();
            (distance <= node.r).then_some((entry.node, node.depth, distance))
        })
        .max_by(|a, b| a.1.cmp(&b.1).then(b.2.total_cmp(&a.2)))
        .map(|(index, _, _)| index)
}

fn child_circles(tree: &Tree, children: &[NodeIndex]) -> Vec<Circle> {
    children
        .iter()
        .map(|&child| Circle::with_radius(tree.node(child).r))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{NodeKind, Topology};

    fn hosts(prefix: &str, count: usize) -> Vec<Topology> {
        (0..count)
            .map(|i| Topology::new(format!("{prefix}-host-{i}"), NodeKind::Host))
            .collect()
    }

    fn sample() -> Tree {
        Tree::from_topology(
            &Topology::new("Root", NodeKind::Root).with_children(vec![
                Topology::new("SZ-1", NodeKind::Zone).with_children(vec![
                    Topology::new("app-1", NodeKind::Application).with_children(hosts("a1", 3)),
                    Topology::new("app-2", NodeKind::Application).with_children(hosts("a2", 5)),
                    Topology::new("app-3", NodeKind::Application),
                ]),
                Topology::new("SZ-2", NodeKind::Zone)
                    .with_children(vec![Topology::new("only", NodeKind::Application)
                        .with_children(hosts("o", 1))]),
            ]),
            10.0,
        )
    }

    fn distance(tree: &Tree, a: NodeIndex, b: NodeIndex) -> f64 {
        let (a, b) = (tree.node(a), tree.node(b));
        ((a.abs_x - b.abs_x).powi(2) + (a.abs_y - b.abs_y).powi(2)).sqrt()
    }

    #[test]
    fn collapsed_nodes_keep_base_radius() {
        let mut tree = sample();
        let config = LayoutConfig::default();
        compute_layout(&mut tree, &config);
        for (idx, node) in tree.iter() {
            if idx == tree.root() {
                assert!(node.r > config.base_radius);
            } else {
                assert_eq!(node.r, config.base_radius);
            }
        }
    }

    #[test]
    fn expanded_children_fit_inside_parent() {
        let mut tree = sample();
        tree.expand_all();
        let config = LayoutConfig::default();
        compute_layout(&mut tree, &config);
        for (idx, node) in tree.iter() {
            if !node.expanded {
                continue;
            }
            for &child in node.children() {
                let reach = distance(&tree, idx, child) + tree.node(child).r;
                assert!(reach <= node.r + 1e-6, "{} escapes {}", tree.node(child).id, node.id);
            }
            for (i, &a) in node.children().iter().enumerate() {
                for &b in &node.children()[i + 1..] {
                    let gap = distance(&tree, a, b) - tree.node(a).r - tree.node(b).r;
                    assert!(gap >= -1e-6);
                }
            }
        }
        assert_eq!(tree.node(tree.root()).abs_x, 0.0);
        assert_eq!(tree.node(tree.root()).abs_y, 0.0);
    }

    #[test]
    fn single_child_is_centred() {
        let mut tree = sample();
        tree.expand_all();
        compute_layout(&mut tree, &LayoutConfig::default());
        let sz2 = tree.node(tree.root()).children()[1];
        let only = tree.node(sz2).children()[0];
        assert!(tree.node(only).x.abs() < 1e-9 && tree.node(only).y.abs() < 1e-9);
    }

    #[test]
    fn layout_is_idempotent() {
        let mut tree = sample();
        tree.expand_all();
        let config = LayoutConfig::default();
        compute_layout(&mut tree, &config);
        let first: Vec<_> = tree.iter().map(|(_, n)| (n.r, n.x, n.y, n.abs_x, n.abs_y)).collect();
        compute_layout(&mut tree, &config);
        let second: Vec<_> = tree.iter().map(|(_, n)| (n.r, n.x, n.y, n.abs_x, n.abs_y)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn expanding_deep_node_grows_ancestors() {
        let mut tree = sample();
        let config = LayoutConfig::default();
        let sz1 = tree.node(tree.root()).children()[0];
        tree.toggle(sz1);
        compute_layout(&mut tree, &config);
        let before = tree.node(sz1).r;
        let root_before = tree.node(tree.root()).r;
        let app2 = tree.node(sz1).children()[1];
        tree.toggle(app2);
        compute_layout(&mut tree, &config);
        assert!(tree.node(sz1).r > before);
        assert!(tree.node(tree.root()).r > root_before);
    }

    #[test]
    fn hit_test_prefers_deepest_circle() {
        let mut tree = sample();
        tree.expand_all();
        compute_layout(&mut tree, &LayoutConfig::default());
        let visible = collect_visible(&tree);
        let sz1 = tree.node(tree.root()).children()[0];
        let app1 = tree.node(sz1).children()[0];
        let host = tree.node(app1).children()[0];
        let (x, y) = (tree.node(host).abs_x, tree.node(host).abs_y);
        assert_eq!(hit_test(&tree, &visible, x, y), Some(host));
        let far = tree.node(tree.root()).r * 10.0;
        assert_eq!(hit_test(&tree, &visible, far, far), None);
    }
}
