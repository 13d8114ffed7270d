use crate::config::Config;
use crate::hover::HighlightClass;
use crate::ir::{LinkKind, NodeKind};
use crate::theme::Theme;
use crate::viewer::{Frame, FrameLink, FrameNode};
use anyhow::Result;
use std::path::Path;

pub fn render_svg(frame: &Frame, config: &Config) -> String {
    let theme = &config.theme;
    let margin = config.render.margin.max(0.0) as f64;
    let half = frame.root_radius.max(1.0) + margin;
    let size = half * 2.0;
    let width = config.render.width.max(200.0);
    let height = config.render.height.max(200.0);

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"{:.2} {:.2} {size:.2} {size:.2}\" preserveAspectRatio=\"xMidYMid meet\">",
        -half, -half,
    ));
    svg.push_str(&format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        -half, -half, theme.background
    ));

    svg.push_str("<g class=\"links\">");
    for link in &frame.links {
        svg.push_str(&link_svg(link, theme));
    }
    svg.push_str("</g>");

    svg.push_str("<g class=\"nodes\">");
    for node in &frame.nodes {
        svg.push_str(&node_svg(node, theme, config.labels.offset));
    }
    svg.push_str("</g>");

    svg.push_str("</svg>");
    svg
}

fn link_svg(link: &FrameLink, theme: &Theme) -> String {
    let color = match link.kind {
        LinkKind::Internal => &theme.internal_link_color,
        LinkKind::CrossZone => &theme.cross_zone_link_color,
        LinkKind::Other => &theme.other_link_color,
    };
    let (stroke, width) = match link.class {
        HighlightClass::Active => (theme.highlight_color.as_str(), 1.6),
        _ => (color.as_str(), 1.0),
    };
    format!(
        "<line class=\"{}\" data-id=\"{}\" x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"{width}\"{}/>",
        class_list(&["link", link.kind.as_str(), link.class.css()]),
        escape_xml(&link.id),
        link.x1,
        link.y1,
        link.x2,
        link.y2,
        stroke,
        opacity_attr(link.class, theme),
    )
}

fn node_svg(node: &FrameNode, theme: &Theme, label_offset: f64) -> String {
    let mut out = format!(
        "<g class=\"{}\" data-id=\"{}\"{}{} transform=\"translate({:.2}, {:.2})\"{}>",
        class_list(&["node", node.kind.as_str(), node.class.css()]),
        escape_xml(&node.id),
        data_attr("zone", node.zone.as_deref()),
        data_attr("env", node.env.as_deref()),
        node.x,
        node.y,
        opacity_attr(node.class, theme),
    );

    // The root only frames the scene; its circle is never painted.
    if node.kind != NodeKind::Root {
        let zone = (node.kind == NodeKind::Zone)
            .then(|| node.zone_rank.and_then(|rank| theme.zone_color(rank)))
            .flatten();
        let (fill, mut stroke, mut stroke_width) = match zone {
            Some(color) => (color.fill.as_str(), color.stroke.as_str(), 3.0),
            None => (theme.node_fill.as_str(), theme.node_stroke.as_str(), 1.0),
        };
        match node.class {
            HighlightClass::Active => {
                stroke = theme.highlight_color.as_str();
                stroke_width += 1.5;
            }
            HighlightClass::Connected => stroke = theme.highlight_color.as_str(),
            _ => {}
        }
        out.push_str(&format!(
            "<circle r=\"{:.2}\" fill=\"{fill}\" stroke=\"{stroke}\" stroke-width=\"{stroke_width}\"/>",
            node.r
        ));
    }

    if let Some(label) = &node.label {
        out.push_str(&format!(
            "<text y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            node.r + label_offset,
            theme.font_family,
            node.font_size,
            theme.text_color,
            escape_xml(label)
        ));
    }

    out.push_str("</g>");
    out
}

fn class_list(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

fn data_attr(name: &str, value: Option<&str>) -> String {
    value
        .map(|value| format!(" data-{name}=\"{}\"", escape_xml(value)))
        .unwrap_or_default()
}

fn opacity_attr(class: HighlightClass, theme: &Theme) -> String {
    if class == HighlightClass::Dimmed {
        format!(" opacity=\"{}\"", theme.dim_opacity)
    } else {
        String::new()
    }
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, config: &Config) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = "Inter".to_string();
    opt.default_size = usvg::Size::from_wh(config.render.width, config.render.height)
        .ok_or_else(|| anyhow::anyhow!("Invalid render size"))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _config: &Config) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Link, Topology};
    use crate::viewer::Viewer;

    fn viewer() -> Viewer {
        let topology = Topology::new("Root", NodeKind::Root).with_children(vec![
            Topology::new("SZ<1>", NodeKind::Zone).with_children(vec![
                Topology::new("h1", NodeKind::Host),
                Topology::new("h2", NodeKind::Host),
            ]),
            Topology::new("SZ-2", NodeKind::Zone),
        ]);
        let links = vec![Link::new(
            "l_0",
            "Root/SZ<1>/h1",
            "Root/SZ<1>/h2",
            LinkKind::CrossZone,
        )];
        Viewer::new(&topology, links, &Config::default())
    }

    #[test]
    fn render_svg_basic() {
        let viewer = viewer();
        let svg = render_svg(&viewer.frame(), &Config::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("SZ&lt;1&gt;"));
        assert!(!svg.contains("<line"));
        // root circle hidden, two zone circles painted with palette strokes
        assert_eq!(svg.matches("<circle").count(), 2);
        assert!(svg.contains("rgba(239, 68, 68, 1.0)"));
        assert!(svg.contains("data-zone=\"SZ&lt;1&gt;\""));
    }

    #[test]
    fn render_svg_hover_classes() {
        let mut viewer = viewer();
        viewer.hover_enter("Root/SZ<1>");
        let svg = render_svg(&viewer.frame(), &Config::default());
        assert_eq!(svg.matches("<line").count(), 1);
        assert!(svg.contains("class=\"link cross-zone active\""));
        assert!(svg.contains("class=\"node zone active\""));
        assert!(svg.contains("class=\"node zone dim\""));
        assert!(svg.contains("opacity=\"0.25\""));
    }

    #[test]
    fn class_list_skips_empty() {
        assert_eq!(class_list(&["node", "host", ""]), "node host");
    }
}
