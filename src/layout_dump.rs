use crate::hover::HighlightClass;
use crate::reconcile::VisibleDiff;
use crate::viewer::Frame;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub version: u64,
    pub root_radius: f64,
    pub hovered: Option<String>,
    pub nodes: Vec<NodeDump>,
    pub links: Vec<LinkDump>,
    pub diff: VisibleDiff,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub parent: Option<String>,
    pub kind: String,
    pub depth: usize,
    pub zone: Option<String>,
    pub env: Option<String>,
    pub x: f64,
    pub y: f64,
    pub r: f64,
    pub expanded: bool,
    pub label: Option<String>,
    pub class: HighlightClass,
}

#[derive(Debug, Serialize)]
pub struct LinkDump {
    pub id: String,
    pub kind: String,
    pub source: String,
    pub target: String,
    pub points: [[f64; 2]; 2],
    pub class: HighlightClass,
}

impl LayoutDump {
    pub fn from_frame(frame: &Frame) -> Self {
        let nodes = frame
            .nodes
            .iter()
            .map(|node| NodeDump {
                id: node.id.clone(),
                parent: node.parent_id.clone(),
                kind: node.kind.as_str().to_string(),
                depth: node.depth,
                zone: node.zone.clone(),
                env: node.env.clone(),
                x: node.x,
                y: node.y,
                r: node.r,
                expanded: node.expanded,
                label: node.label.clone(),
                class: node.class,
            })
            .collect();

        let links = frame
            .links
            .iter()
            .map(|link| LinkDump {
                id: link.id.clone(),
                kind: link.kind.as_str().to_string(),
                source: link.source.clone(),
                target: link.target.clone(),
                points: [[link.x1, link.y1], [link.x2, link.y2]],
                class: link.class,
            })
            .collect();

        LayoutDump {
            version: frame.version,
            root_radius: frame.root_radius,
            hovered: frame.hovered.clone(),
            nodes,
            links,
            diff: frame.diff.clone(),
        }
    }
}

pub fn write_layout_dump(path: Option<&Path>, frame: &Frame) -> anyhow::Result<()> {
    let dump = LayoutDump::from_frame(frame);
    match path {
        Some(path) => {
            let file = File::create(path)?;
            serde_json::to_writer_pretty(BufWriter::new(file), &dump)?;
        }
        None => println!("{}", serde_json::to_string_pretty(&dump)?),
    }
    Ok(())
}
