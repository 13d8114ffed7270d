use crate::ir::{NodeKind, Topology};
use std::collections::{HashMap, HashSet};

/// Arena slot of a node. Stable for the lifetime of a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(usize);

impl NodeIndex {
    pub fn get(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
    pub expanded: bool,
    pub r: f64,
    pub x: f64,
    pub y: f64,
    pub abs_x: f64,
    pub abs_y: f64,
    pub depth: usize,
    pub zone: Option<String>,
    pub env: Option<String>,
    /// Position of the owning zone among the root's zones, for palette lookup.
    pub zone_rank: Option<usize>,
    parent: Option<NodeIndex>,
    children: Vec<NodeIndex>,
    host_set: HashSet<String>,
    host_list: Vec<NodeIndex>,
}

impl Node {
    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    pub fn children(&self) -> &[NodeIndex] {
        &self.children
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Ids of every host below this node (itself, for a host).
    pub fn host_set(&self) -> &HashSet<String> {
        &self.host_set
    }

    pub fn host_list(&self) -> &[NodeIndex] {
        &self.host_list
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Topology tree. The arena owns every node; parent links are plain indices
/// used for ancestor walks only.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Builds the tree, fills the host caches and expands the root.
    pub fn from_topology(topology: &Topology, base_radius: f64) -> Self {
        let mut tree = build_tree(topology, base_radius);
        build_host_caches(&mut tree);
        let root = tree.root();
        tree.nodes[root.0].expanded = true;
        tree
    }

    pub fn root(&self) -> NodeIndex {
        NodeIndex(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, index: NodeIndex) -> &Node {
        &self.nodes[index.0]
    }

    pub(crate) fn node_mut(&mut self, index: NodeIndex) -> &mut Node {
        &mut self.nodes[index.0]
    }

    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        self.nodes.get(index.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeIndex, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (NodeIndex(idx), node))
    }

    /// Ancestors from the parent up to the root.
    pub fn ancestors(&self, index: NodeIndex) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.node(index).parent,
        }
    }

    /// Nearest ancestor (inclusive) contained in `visible`. The root is always
    /// visible, so this only returns `None` for a malformed visible set.
    pub fn visible_proxy(
        &self,
        index: NodeIndex,
        visible: &HashSet<NodeIndex>,
    ) -> Option<NodeIndex> {
        let mut cur = Some(index);
        while let Some(idx) = cur {
            if visible.contains(&idx) {
                return Some(idx);
            }
            cur = self.node(idx).parent;
        }
        None
    }

    /// Flips the expand flag. The root and childless nodes cannot be toggled.
    pub fn toggle(&mut self, index: NodeIndex) -> bool {
        let expanded = self.node(index).expanded;
        self.set_expanded(index, !expanded)
    }

    /// Returns whether anything changed.
    pub fn set_expanded(&mut self, index: NodeIndex, expanded: bool) -> bool {
        let node = &mut self.nodes[index.0];
        if node.is_root() || node.children.is_empty() || node.expanded == expanded {
            return false;
        }
        node.expanded = expanded;
        true
    }

    pub fn expand_all(&mut self) -> usize {
        let mut changed = 0;
        for node in &mut self.nodes {
            if !node.children.is_empty() && !node.expanded {
                node.expanded = true;
                changed += 1;
            }
        }
        changed
    }

    /// Collapses everything below the root; the root stays expanded.
    pub fn collapse_all(&mut self) -> usize {
        let mut changed = 0;
        for node in &mut self.nodes {
            let want = node.is_root();
            if node.expanded != want {
                node.expanded = want;
                changed += 1;
            }
        }
        changed
    }
}

pub struct Ancestors<'a> {
    tree: &'a Tree,
    next: Option<NodeIndex>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<NodeIndex> {
        let cur = self.next?;
        self.next = self.tree.node(cur).parent;
        Some(cur)
    }
}

/// Converts a topology description into arena nodes in pre-order. Ids are
/// path-qualified; repeated sibling names get a `~N` suffix so ids stay unique.
pub fn build_tree(topology: &Topology, base_radius: f64) -> Tree {
    let mut nodes = Vec::with_capacity(topology.node_count());
    let mut zone_count = 0usize;
    push_node(
        &mut nodes,
        topology,
        topology.name.clone(),
        None,
        base_radius,
        &mut zone_count,
    );
    Tree { nodes }
}

fn push_node(
    nodes: &mut Vec<Node>,
    topo: &Topology,
    id: String,
    parent: Option<NodeIndex>,
    base_radius: f64,
    zone_count: &mut usize,
) -> NodeIndex {
    let index = NodeIndex(nodes.len());
    let parent_node = parent.map(|p| &nodes[p.0]);
    let depth = parent_node.map(|p| p.depth + 1).unwrap_or(0);

    let (zone, zone_rank) = match parent_node.and_then(|p| p.zone.clone().zip(p.zone_rank)) {
        Some((zone, rank)) => (Some(zone), Some(rank)),
        None if topo.kind == NodeKind::Zone => {
            let rank = *zone_count;
            *zone_count += 1;
            (Some(topo.name.clone()), Some(rank))
        }
        None => (None, None),
    };
    let env = parent_node
        .and_then(|p| p.env.clone())
        .or_else(|| (topo.kind == NodeKind::Environment).then(|| topo.name.clone()));

    nodes.push(Node {
        id: id.clone(),
        name: topo.name.clone(),
        kind: topo.kind,
        expanded: false,
        r: base_radius,
        x: 0.0,
        y: 0.0,
        abs_x: 0.0,
        abs_y: 0.0,
        depth,
        zone,
        env,
        zone_rank,
        parent,
        children: Vec::with_capacity(topo.children.len()),
        host_set: HashSet::new(),
        host_list: Vec::new(),
    });

    let mut seen: HashMap<&str, usize> = HashMap::new();
    for child in &topo.children {
        let count = seen.entry(child.name.as_str()).or_insert(0);
        *count += 1;
        let child_id = if *count == 1 {
            format!("{id}/{}", child.name)
        } else {
            format!("{id}/{}~{}", child.name, count)
        };
        let child_index = push_node(nodes, child, child_id, Some(index), base_radius, zone_count);
        nodes[index.0].children.push(child_index);
    }

    index
}

/// Bottom-up host aggregation. Children always sit after their parent in the
/// arena, so a reverse sweep sees every child before its parent.
pub fn build_host_caches(tree: &mut Tree) {
    for idx in (0..tree.nodes.len()).rev() {
        let (set, list) = if tree.nodes[idx].kind == NodeKind::Host {
            (
                HashSet::from([tree.nodes[idx].id.clone()]),
                vec![NodeIndex(idx)],
            )
        } else {
            let mut set = HashSet::new();
            let mut list = Vec::new();
            for child in &tree.nodes[idx].children {
                let child = &tree.nodes[child.0];
                set.extend(child.host_set.iter().cloned());
                list.extend_from_slice(&child.host_list);
            }
            (set, list)
        };
        let node = &mut tree.nodes[idx];
        node.host_set = set;
        node.host_list = list;
    }
}
