use crate::ir::NodeKind;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Radius of every collapsed or childless node.
    pub base_radius: f64,
    /// Minimum gap between sibling circles.
    pub sibling_padding: f64,
    /// Gap between a packed cluster and its parent's boundary.
    pub outer_padding: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            base_radius: 10.0,
            sibling_padding: 100.0,
            outer_padding: 5.0,
        }
    }
}

impl LayoutConfig {
    /// Clamps values the packer cannot work with.
    pub fn sanitized(mut self) -> Self {
        if !(self.base_radius.is_finite() && self.base_radius > 0.0) {
            self.base_radius = LayoutConfig::default().base_radius;
        }
        if !self.sibling_padding.is_finite() {
            self.sibling_padding = 0.0;
        }
        if !self.outer_padding.is_finite() {
            self.outer_padding = 0.0;
        }
        self.sibling_padding = self.sibling_padding.max(0.0);
        self.outer_padding = self.outer_padding.max(0.0);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoverConfig {
    /// Upper bound on links drawn for one hover.
    pub max_links: usize,
    /// When false the idle frame also carries every resolvable link.
    pub show_links_only_on_hover: bool,
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            max_links: 300,
            show_links_only_on_hover: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelStyle {
    pub font_size: f32,
    pub visible: bool,
}

impl LabelStyle {
    pub const fn new(font_size: f32, visible: bool) -> Self {
        Self { font_size, visible }
    }
}

/// Per-kind label table indexed by [`NodeKind::index`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelConfig {
    pub styles: [LabelStyle; 6],
    pub max_chars: usize,
    /// Distance below the circle edge where the label baseline sits.
    pub offset: f64,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            styles: [
                LabelStyle::new(10.0, false),
                LabelStyle::new(14.0, true),
                LabelStyle::new(13.0, true),
                LabelStyle::new(12.0, true),
                LabelStyle::new(11.0, true),
                LabelStyle::new(10.0, true),
            ],
            max_chars: 15,
            offset: 14.0,
        }
    }
}

impl LabelConfig {
    pub fn style(&self, kind: NodeKind) -> LabelStyle {
        self.styles[kind.index()]
    }

    pub fn style_mut(&mut self, kind: NodeKind) -> &mut LabelStyle {
        &mut self.styles[kind.index()]
    }

    /// The root never carries a label.
    pub fn is_visible(&self, kind: NodeKind) -> bool {
        kind != NodeKind::Root && self.style(kind).visible
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            margin: 40.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub hover: HoverConfig,
    pub labels: LabelConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    hover: Option<HoverConfigFile>,
    labels: Option<LabelConfigFile>,
    render: Option<RenderConfigFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    background: Option<String>,
    node_fill: Option<String>,
    node_stroke: Option<String>,
    text_color: Option<String>,
    internal_link_color: Option<String>,
    cross_zone_link_color: Option<String>,
    highlight_color: Option<String>,
    dim_opacity: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    base_radius: Option<f64>,
    sibling_padding: Option<f64>,
    outer_padding: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HoverConfigFile {
    max_links: Option<usize>,
    show_links_only_on_hover: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LabelStyleFile {
    font_size: Option<f32>,
    visible: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LabelConfigFile {
    max_chars: Option<usize>,
    offset: Option<f64>,
    zone: Option<LabelStyleFile>,
    environment: Option<LabelStyleFile>,
    tier: Option<LabelStyleFile>,
    application: Option<LabelStyleFile>,
    host: Option<LabelStyleFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    width: Option<f32>,
    height: Option<f32>,
    margin: Option<f32>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = serde_json::from_str(contents)?;
    let mut config = Config::default();

    if let Some(theme_name) = parsed.theme.as_deref() {
        match theme_name {
            "dark" => config.theme = Theme::dark(),
            "default" | "light" => config.theme = Theme::light(),
            other => tracing::warn!(theme = other, "unknown theme, keeping default"),
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(v) = vars.node_fill {
            config.theme.node_fill = v;
        }
        if let Some(v) = vars.node_stroke {
            config.theme.node_stroke = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.internal_link_color {
            config.theme.internal_link_color = v;
        }
        if let Some(v) = vars.cross_zone_link_color {
            config.theme.cross_zone_link_color = v;
        }
        if let Some(v) = vars.highlight_color {
            config.theme.highlight_color = v;
        }
        if let Some(v) = vars.dim_opacity {
            config.theme.dim_opacity = v.clamp(0.0, 1.0);
        }
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.base_radius {
            config.layout.base_radius = v;
        }
        if let Some(v) = layout.sibling_padding {
            config.layout.sibling_padding = v;
        }
        if let Some(v) = layout.outer_padding {
            config.layout.outer_padding = v;
        }
        config.layout = config.layout.sanitized();
    }

    if let Some(hover) = parsed.hover {
        if let Some(v) = hover.max_links {
            config.hover.max_links = v;
        }
        if let Some(v) = hover.show_links_only_on_hover {
            config.hover.show_links_only_on_hover = v;
        }
    }

    if let Some(labels) = parsed.labels {
        if let Some(v) = labels.max_chars {
            config.labels.max_chars = v.max(1);
        }
        if let Some(v) = labels.offset {
            config.labels.offset = v;
        }
        let per_kind = [
            (NodeKind::Zone, labels.zone),
            (NodeKind::Environment, labels.environment),
            (NodeKind::Tier, labels.tier),
            (NodeKind::Application, labels.application),
            (NodeKind::Host, labels.host),
        ];
        for (kind, style) in per_kind {
            let Some(style) = style else {
                continue;
            };
            let target = config.labels.style_mut(kind);
            if let Some(v) = style.font_size {
                target.font_size = v;
            }
            if let Some(v) = style.visible {
                target.visible = v;
            }
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.width {
            config.render.width = v;
        }
        if let Some(v) = render.height {
            config.render.height = v;
        }
        if let Some(v) = render.margin {
            config.render.margin = v;
        }
    }

    Ok(config)
}
