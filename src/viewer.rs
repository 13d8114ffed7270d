//! Event-driven session over one topology.
//!
//! Every structural change (expand, collapse, layout settings) runs the full
//! pipeline synchronously: radius pass, position pass, absolute positions,
//! then a wholesale rebuild of the visible list and id index. Hover state is
//! reset by every structural change, so a hover always reads derived state
//! that matches the latest layout.

use crate::config::{Config, HoverConfig, LabelConfig, LayoutConfig};
use crate::hover::{Highlight, HighlightClass, HoverContext, ResolvedLink};
use crate::ir::{Link, LinkKind, NodeKind, Topology};
use crate::layout::{self, VisibleEntry};
use crate::reconcile::{VisibleDiff, reconcile};
use crate::tree::{NodeIndex, Tree};
use regex::Regex;
use std::collections::{HashMap, HashSet};

/// Visible list and id index, rebuilt together after every layout pass.
#[derive(Debug, Clone, Default)]
pub struct DerivedState {
    /// Bumped on every rebuild.
    pub version: u64,
    pub visible: Vec<VisibleEntry>,
    pub visible_ids: HashSet<NodeIndex>,
    pub index: HashMap<String, NodeIndex>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverState {
    Idle,
    Highlighting(NodeIndex),
}

#[derive(Debug, Clone)]
pub struct FrameNode {
    pub id: String,
    pub parent_id: Option<String>,
    pub name: String,
    pub kind: NodeKind,
    pub depth: usize,
    pub x: f64,
    pub y: f64,
    pub r: f64,
    pub expanded: bool,
    pub expandable: bool,
    pub zone: Option<String>,
    pub env: Option<String>,
    pub zone_rank: Option<usize>,
    /// Shortened label, `None` when labels of this kind are hidden.
    pub label: Option<String>,
    pub font_size: f32,
    pub class: HighlightClass,
}

#[derive(Debug, Clone)]
pub struct FrameLink {
    pub id: String,
    pub kind: LinkKind,
    pub source: String,
    pub target: String,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub class: HighlightClass,
}

/// Everything a render adapter needs for one paint.
#[derive(Debug, Clone)]
pub struct Frame {
    pub version: u64,
    pub root_radius: f64,
    pub hovered: Option<String>,
    pub nodes: Vec<FrameNode>,
    pub links: Vec<FrameLink>,
    pub diff: VisibleDiff,
}

#[derive(Debug, Clone)]
pub struct Viewer {
    tree: Tree,
    links: Vec<Link>,
    layout: LayoutConfig,
    hover_config: HoverConfig,
    labels: LabelConfig,
    derived: DerivedState,
    previous_visible: Vec<String>,
    diff: VisibleDiff,
    hover: HoverState,
    highlight: Highlight,
}

impl Viewer {
    pub fn new(topology: &Topology, links: Vec<Link>, config: &Config) -> Self {
        let layout = config.layout.clone().sanitized();
        let tree = Tree::from_topology(topology, layout.base_radius);
        tracing::info!(nodes = tree.len(), links = links.len(), "topology loaded");
        let mut viewer = Self {
            tree,
            links,
            layout,
            hover_config: config.hover.clone(),
            labels: config.labels.clone(),
            derived: DerivedState::default(),
            previous_visible: Vec::new(),
            diff: VisibleDiff::default(),
            hover: HoverState::Idle,
            highlight: Highlight::default(),
        };
        viewer.recompute();
        viewer
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn derived(&self) -> &DerivedState {
        &self.derived
    }

    pub fn hover_state(&self) -> HoverState {
        self.hover
    }

    pub fn highlight(&self) -> &Highlight {
        &self.highlight
    }

    pub fn layout_config(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn labels(&self) -> &LabelConfig {
        &self.labels
    }

    pub fn find(&self, id: &str) -> Option<NodeIndex> {
        self.derived.index.get(id).copied()
    }

    pub fn is_visible(&self, index: NodeIndex) -> bool {
        self.derived.visible_ids.contains(&index)
    }

    /// Flips one node. Unknown ids, the root and childless nodes are no-ops.
    pub fn toggle_expand(&mut self, id: &str) -> bool {
        let Some(index) = self.find(id) else {
            return false;
        };
        if !self.tree.toggle(index) {
            return false;
        }
        self.recompute();
        true
    }

    pub fn set_expanded(&mut self, id: &str, expanded: bool) -> bool {
        let Some(index) = self.find(id) else {
            return false;
        };
        if !self.tree.set_expanded(index, expanded) {
            return false;
        }
        self.recompute();
        true
    }

    pub fn expand_all(&mut self) {
        self.tree.expand_all();
        self.recompute();
    }

    pub fn collapse_all(&mut self) {
        self.tree.collapse_all();
        self.recompute();
    }

    /// Expands every node whose id matches, plus its ancestors so the match is
    /// on screen. Returns the number of matched nodes.
    pub fn expand_matching(&mut self, pattern: &Regex) -> usize {
        let matched: Vec<NodeIndex> = self
            .tree
            .iter()
            .filter(|(_, node)| pattern.is_match(&node.id))
            .map(|(index, _)| index)
            .collect();
        for &index in &matched {
            self.tree.set_expanded(index, true);
            let ancestors: Vec<NodeIndex> = self.tree.ancestors(index).collect();
            for ancestor in ancestors {
                self.tree.set_expanded(ancestor, true);
            }
        }
        if !matched.is_empty() {
            self.recompute();
        }
        matched.len()
    }

    /// Replaces the layout settings and relays out from scratch.
    pub fn set_layout_config(&mut self, layout: LayoutConfig) {
        self.layout = layout.sanitized();
        self.recompute();
    }

    /// Takes effect on the next hover; the current highlight is cleared.
    pub fn set_hover_config(&mut self, hover: HoverConfig) {
        self.hover_config = hover;
        self.hover_leave();
    }

    /// Label cosmetics only; layout and hover state are untouched.
    pub fn set_label_style(&mut self, kind: NodeKind, font_size: Option<f32>, visible: Option<bool>) {
        let style = self.labels.style_mut(kind);
        if let Some(size) = font_size {
            style.font_size = size;
        }
        if let Some(visible) = visible {
            style.visible = visible;
        }
    }

    pub fn hover_enter(&mut self, id: &str) -> &Highlight {
        let Some(index) = self.find(id) else {
            self.hover_leave();
            return &self.highlight;
        };
        let highlight = self.hover_context().resolve(index);
        if highlight.is_empty() {
            self.hover_leave();
        } else {
            self.hover = HoverState::Highlighting(index);
            self.highlight = highlight;
        }
        &self.highlight
    }

    /// Hover by absolute position; leaves when nothing is under the point.
    pub fn hover_at(&mut self, x: f64, y: f64) -> &Highlight {
        match layout::hit_test(&self.tree, &self.derived.visible, x, y) {
            Some(index) => {
                let id = self.tree.node(index).id.clone();
                self.hover_enter(&id)
            }
            None => {
                self.hover_leave();
                &self.highlight
            }
        }
    }

    pub fn hover_leave(&mut self) {
        self.hover = HoverState::Idle;
        self.highlight = Highlight::default();
    }

    pub fn frame(&self) -> Frame {
        let nodes = self
            .derived
            .visible
            .iter()
            .map(|entry| self.frame_node(entry))
            .collect();

        let links = if !self.hover_config.show_links_only_on_hover {
            // Links outside the highlight stay on screen, dimmed.
            let active: HashSet<usize> = self.highlight.links.iter().map(|link| link.link).collect();
            self.hover_context()
                .resolve_all()
                .iter()
                .map(|link| {
                    let class = if self.highlight.is_empty() {
                        HighlightClass::None
                    } else if active.contains(&link.link) {
                        self.highlight.link_class()
                    } else {
                        HighlightClass::Dimmed
                    };
                    self.frame_link(link, class)
                })
                .collect()
        } else {
            self.highlight
                .links
                .iter()
                .map(|link| self.frame_link(link, self.highlight.link_class()))
                .collect()
        };

        Frame {
            version: self.derived.version,
            root_radius: self.tree.node(self.tree.root()).r,
            hovered: self
                .highlight
                .hovered
                .map(|index| self.tree.node(index).id.clone()),
            nodes,
            links,
            diff: self.diff.clone(),
        }
    }

    fn hover_context(&self) -> HoverContext<'_> {
        HoverContext {
            tree: &self.tree,
            links: &self.links,
            index: &self.derived.index,
            visible: &self.derived.visible_ids,
            max_links: self.hover_config.max_links,
        }
    }

    fn recompute(&mut self) {
        layout::compute_layout(&mut self.tree, &self.layout);

        let visible = layout::collect_visible(&self.tree);
        let visible_ids = layout::visible_ids(&visible);
        let index = layout::index_all_nodes(&self.tree);
        let next_visible: Vec<String> = visible
            .iter()
            .map(|entry| self.tree.node(entry.node).id.clone())
            .collect();

        self.diff = reconcile(&self.previous_visible, &next_visible);
        self.previous_visible = next_visible;
        self.derived = DerivedState {
            version: self.derived.version + 1,
            visible,
            visible_ids,
            index,
        };
        self.hover_leave();
        tracing::debug!(
            version = self.derived.version,
            visible = self.derived.visible.len(),
            entered = self.diff.entered.len(),
            exited = self.diff.exited.len(),
            "derived state rebuilt"
        );
    }

    fn frame_node(&self, entry: &VisibleEntry) -> FrameNode {
        let node = self.tree.node(entry.node);
        let style = self.labels.style(node.kind);
        FrameNode {
            id: node.id.clone(),
            parent_id: entry.parent.map(|p| self.tree.node(p).id.clone()),
            name: node.name.clone(),
            kind: node.kind,
            depth: node.depth,
            x: node.abs_x,
            y: node.abs_y,
            r: node.r,
            expanded: node.expanded,
            expandable: node.has_children() && !node.is_root(),
            zone: node.zone.clone(),
            env: node.env.clone(),
            zone_rank: node.zone_rank,
            label: self
                .labels
                .is_visible(node.kind)
                .then(|| short_label(&node.name, self.labels.max_chars)),
            font_size: style.font_size,
            class: self.highlight.node_class(entry.node),
        }
    }

    fn frame_link(&self, link: &ResolvedLink, class: HighlightClass) -> FrameLink {
        let source = self.tree.node(link.source_proxy);
        let target = self.tree.node(link.target_proxy);
        FrameLink {
            id: link.id.clone(),
            kind: link.kind.clone(),
            source: source.id.clone(),
            target: target.id.clone(),
            x1: source.abs_x,
            y1: source.abs_y,
            x2: target.abs_x,
            y2: target.abs_y,
            class,
        }
    }
}

/// Truncates to `max` characters, the last one being an ellipsis.
pub fn short_label(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        return name.to_string();
    }
    let mut out: String = name.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
