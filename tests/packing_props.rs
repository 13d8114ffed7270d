//! Property tests for the packing primitive and the nested layout built on it.
//!
//! 1. Packed siblings keep at least the requested padding between them.
//! 2. The enclosing circle contains every (padded) packed circle.
//! 3. Packing is deterministic for identical input.
//! 4. Nested layout under any expand mask: root at the origin, radii never
//!    below base, children contained in their parent, siblings disjoint.

use proptest::prelude::*;
use topology_circles::layout::{Circle, pack_with_padding};
use topology_circles::{Config, NodeKind, Topology, Viewer};

fn tolerance(circles: &[Circle]) -> f64 {
    let scale = circles.iter().map(|c| c.r).fold(1.0, f64::max);
    1e-6 * scale
}

fn radii_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0f64..200.0, 1..40)
}

fn topology_strategy() -> impl Strategy<Value = Topology> {
    // zones -> tiers -> host counts
    prop::collection::vec(prop::collection::vec(0usize..6, 0..4), 1..4).prop_map(|zones| {
        let zones = zones
            .into_iter()
            .enumerate()
            .map(|(z, tiers)| {
                let tiers = tiers
                    .into_iter()
                    .enumerate()
                    .map(|(t, hosts)| {
                        let hosts = (0..hosts)
                            .map(|h| Topology::new(format!("h{h}"), NodeKind::Host))
                            .collect();
                        Topology::new(format!("T{t}"), NodeKind::Tier).with_children(hosts)
                    })
                    .collect();
                Topology::new(format!("Z{z}"), NodeKind::Zone).with_children(tiers)
            })
            .collect();
        Topology::new("R", NodeKind::Root).with_children(zones)
    })
}

proptest! {
    #[test]
    fn packed_siblings_respect_padding(radii in radii_strategy(), padding in 0.0f64..120.0) {
        let mut circles: Vec<Circle> = radii.iter().map(|&r| Circle::with_radius(r)).collect();
        pack_with_padding(&mut circles, padding);
        let eps = tolerance(&circles) + 1e-6 * padding;
        for (i, a) in circles.iter().enumerate() {
            for b in &circles[i + 1..] {
                let dist = (a.x - b.x).hypot(a.y - b.y);
                prop_assert!(dist + eps >= a.r + b.r + padding, "dist {dist} radii {} {}", a.r, b.r);
            }
        }
    }

    #[test]
    fn enclosing_circle_contains_padded_circles(radii in radii_strategy(), padding in 0.0f64..120.0) {
        let mut circles: Vec<Circle> = radii.iter().map(|&r| Circle::with_radius(r)).collect();
        let enclosing = pack_with_padding(&mut circles, padding);
        let eps = tolerance(&circles) + 1e-6 * padding;
        for circle in &circles {
            let dist = (circle.x - enclosing.x).hypot(circle.y - enclosing.y);
            prop_assert!(dist + circle.r + padding / 2.0 <= enclosing.r + eps);
        }
        // radii come back unpadded
        for (circle, &r) in circles.iter().zip(&radii) {
            prop_assert!((circle.r - r).abs() <= 1e-9 * (r + padding));
        }
    }

    #[test]
    fn packing_is_deterministic(radii in radii_strategy(), padding in 0.0f64..120.0) {
        let mut first: Vec<Circle> = radii.iter().map(|&r| Circle::with_radius(r)).collect();
        let mut second = first.clone();
        let a = pack_with_padding(&mut first, padding);
        let b = pack_with_padding(&mut second, padding);
        prop_assert_eq!(a, b);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn nested_layout_invariants(
        topology in topology_strategy(),
        mask in prop::collection::vec(any::<bool>(), 1..64),
    ) {
        let mut viewer = Viewer::new(&topology, Vec::new(), &Config::default());
        viewer.expand_all();
        prop_assert_eq!(viewer.derived().visible.len(), topology.node_count());

        // mixed state: some subtrees collapsed, hidden ones possibly expanded
        let ids: Vec<String> = viewer.tree().iter().map(|(_, node)| node.id.clone()).collect();
        for (i, id) in ids.iter().enumerate() {
            viewer.set_expanded(id, mask[i % mask.len()]);
        }

        let tree = viewer.tree();
        let base = viewer.layout_config().base_radius;
        let root = tree.node(tree.root());
        prop_assert_eq!((root.abs_x, root.abs_y), (0.0, 0.0));

        for entry in &viewer.derived().visible {
            let node = tree.node(entry.node);
            prop_assert!(node.r >= base);
            if !node.expanded || !node.has_children() {
                prop_assert_eq!(node.r, base);
            }
            if let Some(parent) = entry.parent {
                let parent = tree.node(parent);
                let dist = (node.abs_x - parent.abs_x).hypot(node.abs_y - parent.abs_y);
                prop_assert!(dist + node.r <= parent.r + 1e-6 * parent.r.max(1.0));
            }
            if node.expanded {
                let children = node.children();
                for (i, &a) in children.iter().enumerate() {
                    for &b in &children[i + 1..] {
                        let (a, b) = (tree.node(a), tree.node(b));
                        let dist = (a.abs_x - b.abs_x).hypot(a.abs_y - b.abs_y);
                        prop_assert!(
                            dist + 1e-6 * node.r.max(1.0) >= a.r + b.r,
                            "{} overlaps {}", a.id, b.id
                        );
                    }
                }
            }
        }
    }
}
