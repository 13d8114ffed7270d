//! Hover highlighting: which links and nodes light up for a hovered subtree.
//!
//! Candidates are filtered from the global link list by the subtree's host
//! set, capped, and only then resolved to nodes and snapped to their nearest
//! visible ancestor. Anything that fails to resolve is dropped silently.

use crate::ir::{Link, LinkKind};
use crate::tree::{NodeIndex, Tree};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightClass {
    #[default]
    None,
    Dimmed,
    Active,
    Connected,
}

impl HighlightClass {
    /// CSS-style class name, empty for `None`.
    pub fn css(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Dimmed => "dim",
            Self::Active => "active",
            Self::Connected => "connected",
        }
    }
}

/// A link whose endpoints resolved to hosts and then to visible proxies.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLink {
    /// Position in the global link list.
    pub link: usize,
    pub id: String,
    pub kind: LinkKind,
    pub source_host: NodeIndex,
    pub target_host: NodeIndex,
    pub source_proxy: NodeIndex,
    pub target_proxy: NodeIndex,
}

/// Everything a hover lights up. The default value is the cleared state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Highlight {
    pub hovered: Option<NodeIndex>,
    pub links: Vec<ResolvedLink>,
    pub connected: HashSet<NodeIndex>,
    /// Links that matched the host filter before the cap was applied.
    pub candidates: usize,
}

impl Highlight {
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn node_class(&self, node: NodeIndex) -> HighlightClass {
        if self.is_empty() {
            HighlightClass::None
        } else if self.hovered == Some(node) {
            HighlightClass::Active
        } else if self.connected.contains(&node) {
            HighlightClass::Connected
        } else {
            HighlightClass::Dimmed
        }
    }

    /// Every drawn link touches the hovered subtree, so drawn links are active.
    pub fn link_class(&self) -> HighlightClass {
        if self.is_empty() {
            HighlightClass::None
        } else {
            HighlightClass::Active
        }
    }
}

/// Read-only view of the state a hover needs, taken after the latest layout.
#[derive(Debug, Clone, Copy)]
pub struct HoverContext<'a> {
    pub tree: &'a Tree,
    pub links: &'a [Link],
    pub index: &'a HashMap<String, NodeIndex>,
    pub visible: &'a HashSet<NodeIndex>,
    pub max_links: usize,
}

impl HoverContext<'_> {
    /// Resolves the highlight for `hovered`. Returns the cleared state when the
    /// subtree has no hosts or none of its links survive resolution.
    pub fn resolve(&self, hovered: NodeIndex) -> Highlight {
        let _span = tracing::debug_span!("hover", node = %self.tree.node(hovered).id).entered();
        let hosts = self.tree.node(hovered).host_set();
        if hosts.is_empty() {
            tracing::debug!("no hosts under hovered node");
            return Highlight::default();
        }

        let candidates = filter_links(self.links, hosts);
        let total = candidates.len();
        let capped = &candidates[..total.min(self.max_links)];
        let links: Vec<ResolvedLink> = capped
            .iter()
            .filter_map(|&link| self.resolve_link(link))
            .collect();
        tracing::debug!(
            candidates = total,
            capped = capped.len(),
            drawn = links.len(),
            "hover resolved"
        );

        if links.is_empty() {
            return Highlight::default();
        }

        let connected = links
            .iter()
            .flat_map(|link| [link.source_proxy, link.target_proxy])
            .collect();
        Highlight {
            hovered: Some(hovered),
            links,
            connected,
            candidates: total,
        }
    }

    /// Every resolvable link snapped to visible geometry, without filter or cap.
    pub fn resolve_all(&self) -> Vec<ResolvedLink> {
        (0..self.links.len())
            .filter_map(|link| self.resolve_link(link))
            .collect()
    }

    fn resolve_link(&self, position: usize) -> Option<ResolvedLink> {
        let link = &self.links[position];
        let (Some(&source_host), Some(&target_host)) =
            (self.index.get(&link.source), self.index.get(&link.target))
        else {
            tracing::trace!(link = %link.id, "dropping link with unresolved endpoint");
            return None;
        };
        let source_proxy = self.tree.visible_proxy(source_host, self.visible)?;
        let target_proxy = self.tree.visible_proxy(target_host, self.visible)?;
        Some(ResolvedLink {
            link: position,
            id: link.id.clone(),
            kind: link.kind.clone(),
            source_host,
            target_host,
            source_proxy,
            target_proxy,
        })
    }
}

/// Positions of links with either endpoint in `hosts`, in link-list order.
pub fn filter_links(links: &[Link], hosts: &HashSet<String>) -> Vec<usize> {
    links
        .iter()
        .enumerate()
        .filter(|(_, link)| hosts.contains(&link.source) || hosts.contains(&link.target))
        .map(|(position, _)| position)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{NodeKind, Topology};
    use crate::layout::{collect_visible, index_all_nodes, visible_ids};

    struct Fixture {
        tree: Tree,
        links: Vec<Link>,
    }

    impl Fixture {
        fn new() -> Self {
            let topology = Topology::new("R", NodeKind::Root).with_children(vec![
                Topology::new("Z", NodeKind::Zone).with_children(vec![
                    Topology::new("A", NodeKind::Application).with_children(vec![
                        Topology::new("h1", NodeKind::Host),
                        Topology::new("h2", NodeKind::Host),
                        Topology::new("h3", NodeKind::Host),
                    ]),
                    Topology::new("T", NodeKind::Tier),
                ]),
                Topology::new("Y", NodeKind::Zone)
                    .with_children(vec![Topology::new("g1", NodeKind::Host)]),
            ]);
            let links = vec![
                Link::new("l0", "R/Z/A/h1", "R/Z/A/h2", LinkKind::Internal),
                Link::new("l1", "R/Z/A/h3", "R/Y/g1", LinkKind::CrossZone),
                Link::new("l2", "R/Z/A/h1", "R/nowhere", LinkKind::Internal),
                Link::new("l3", "R/Y/g1", "R/Y/g1", LinkKind::Internal),
            ];
            Self {
                tree: Tree::from_topology(&topology, 10.0),
                links,
            }
        }

        fn find(&self, id: &str) -> NodeIndex {
            index_all_nodes(&self.tree)[id]
        }

        fn resolve(&self, hovered: &str, max_links: usize) -> Highlight {
            let index = index_all_nodes(&self.tree);
            let visible = visible_ids(&collect_visible(&self.tree));
            let ctx = HoverContext {
                tree: &self.tree,
                links: &self.links,
                index: &index,
                visible: &visible,
                max_links,
            };
            ctx.resolve(self.find(hovered))
        }
    }

    #[test]
    fn filter_matches_either_endpoint() {
        let fx = Fixture::new();
        let hosts = fx.tree.node(fx.find("R/Y")).host_set().clone();
        assert_eq!(filter_links(&fx.links, &hosts), vec![1, 3]);
    }

    #[test]
    fn empty_subtree_clears() {
        let fx = Fixture::new();
        let highlight = fx.resolve("R/Z/T", 10);
        assert!(highlight.is_empty());
        assert_eq!(highlight, Highlight::default());
        assert_eq!(highlight.node_class(fx.find("R")), HighlightClass::None);
    }

    #[test]
    fn collapsed_endpoints_snap_to_visible_ancestor() {
        let fx = Fixture::new();
        let highlight = fx.resolve("R/Z", 10);
        let z = fx.find("R/Z");
        let y = fx.find("R/Y");
        // l2 is unresolved and dropped.
        assert_eq!(highlight.candidates, 3);
        assert_eq!(highlight.links.len(), 2);
        assert_eq!(highlight.links[0].source_proxy, z);
        assert_eq!(highlight.links[0].target_proxy, z);
        assert_eq!(highlight.links[1].target_proxy, y);
        assert_eq!(highlight.node_class(z), HighlightClass::Active);
        assert_eq!(highlight.node_class(y), HighlightClass::Connected);
        assert_eq!(highlight.node_class(fx.tree.root()), HighlightClass::Dimmed);
        assert_eq!(highlight.link_class(), HighlightClass::Active);
    }

    #[test]
    fn cap_counts_unresolved_candidates() {
        let mut fx = Fixture::new();
        // Put the unresolved link first so it eats the whole cap.
        fx.links.swap(0, 2);
        let highlight = fx.resolve("R/Z", 1);
        assert!(highlight.is_empty());
        let highlight = fx.resolve("R/Z", 2);
        assert_eq!(highlight.links.len(), 1);
        assert_eq!(highlight.links[0].id, "l1");
    }

    #[test]
    fn resolve_all_skips_unresolved() {
        let fx = Fixture::new();
        let index = index_all_nodes(&fx.tree);
        let visible = visible_ids(&collect_visible(&fx.tree));
        let ctx = HoverContext {
            tree: &fx.tree,
            links: &fx.links,
            index: &index,
            visible: &visible,
            max_links: 0,
        };
        let ids: Vec<_> = ctx.resolve_all().into_iter().map(|l| l.id).collect();
        assert_eq!(ids, ["l0", "l1", "l3"]);
    }
}
