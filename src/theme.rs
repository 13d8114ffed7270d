use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneColor {
    pub fill: String,
    pub stroke: String,
}

impl ZoneColor {
    fn new(fill: &str, stroke: &str) -> Self {
        Self {
            fill: fill.to_string(),
            stroke: stroke.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub background: String,
    pub node_fill: String,
    pub node_stroke: String,
    pub text_color: String,
    pub internal_link_color: String,
    pub cross_zone_link_color: String,
    pub other_link_color: String,
    pub highlight_color: String,
    pub dim_opacity: f32,
    /// Zone fills/strokes, assigned by zone order under the root.
    pub zone_palette: Vec<ZoneColor>,
}

impl Default for Theme {
    fn default() -> Self {
        Theme::light()
    }
}

impl Theme {
    pub fn light() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            background: "#FFFFFF".to_string(),
            node_fill: "rgba(148, 163, 184, 0.12)".to_string(),
            node_stroke: "#94A3B8".to_string(),
            text_color: "#1C2430".to_string(),
            internal_link_color: "rgba(71, 85, 105, 0.55)".to_string(),
            cross_zone_link_color: "rgba(220, 38, 38, 0.65)".to_string(),
            other_link_color: "rgba(100, 116, 139, 0.5)".to_string(),
            highlight_color: "#F59E0B".to_string(),
            dim_opacity: 0.25,
            zone_palette: default_zone_palette(),
        }
    }

    pub fn dark() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            background: "#0F172A".to_string(),
            node_fill: "rgba(148, 163, 184, 0.10)".to_string(),
            node_stroke: "#64748B".to_string(),
            text_color: "#E2E8F0".to_string(),
            internal_link_color: "rgba(203, 213, 225, 0.55)".to_string(),
            cross_zone_link_color: "rgba(248, 113, 113, 0.75)".to_string(),
            other_link_color: "rgba(148, 163, 184, 0.5)".to_string(),
            highlight_color: "#FBBF24".to_string(),
            dim_opacity: 0.2,
            zone_palette: default_zone_palette(),
        }
    }

    /// Palette entry for the zone at `rank`, wrapping around the palette.
    pub fn zone_color(&self, rank: usize) -> Option<&ZoneColor> {
        if self.zone_palette.is_empty() {
            return None;
        }
        self.zone_palette.get(rank % self.zone_palette.len())
    }
}

fn default_zone_palette() -> Vec<ZoneColor> {
    vec![
        ZoneColor::new("rgba(239, 68, 68, 0.20)", "rgba(239, 68, 68, 1.0)"),
        ZoneColor::new("rgba(249, 115, 22, 0.18)", "rgba(249, 115, 22, 1.0)"),
        ZoneColor::new("rgba(253, 224, 71, 0.18)", "rgba(234, 179, 8, 1.0)"),
        ZoneColor::new("rgba(34, 197, 94, 0.16)", "rgba(34, 197, 94, 1.0)"),
        ZoneColor::new("rgba(186, 230, 253, 0.25)", "rgba(14, 165, 233, 0.9)"),
        ZoneColor::new("rgba(30, 58, 138, 0.15)", "rgba(30, 58, 138, 1.0)"),
        ZoneColor::new("rgba(224, 242, 254, 0.30)", "rgba(125, 211, 252, 0.8)"),
    ]
}
