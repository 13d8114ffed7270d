#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod hover;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod parser;
pub mod reconcile;
pub mod render;
pub mod theme;
pub mod tree;
pub mod viewer;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, HoverConfig, LabelConfig, LayoutConfig, RenderConfig};
pub use error::LoadError;
pub use hover::{Highlight, HighlightClass};
pub use ir::{Link, LinkKind, NodeKind, Topology};
pub use layout::{compute_layout, hit_test};
pub use parser::{load_links, load_topology, parse_links, parse_topology};
pub use render::render_svg;
pub use theme::Theme;
pub use tree::{NodeIndex, Tree};
pub use viewer::{Frame, Viewer};

/// One-shot render of the initial view (root expanded, nothing hovered).
pub fn render_with_config(topology: &Topology, links: Vec<Link>, config: &Config) -> String {
    let viewer = Viewer::new(topology, links, config);
    render_svg(&viewer.frame(), config)
}
