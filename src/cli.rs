use crate::config::load_config;
use crate::ir::NodeKind;
use crate::layout_dump::write_layout_dump;
use crate::parser::{load_links, load_topology};
use crate::render::{render_svg, write_output_png, write_output_svg};
use crate::viewer::Viewer;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "topocircles", version, about = "Nested circle layout for zone/environment/tier/application/host topologies")]
pub struct Args {
    /// Topology file (JSON or JSON5)
    #[arg(short = 't', long = "topology")]
    pub topology: PathBuf,

    /// Link list file (JSON or JSON5). Links are only drawn for a hovered node.
    #[arg(short = 'l', long = "links")]
    pub links: Option<PathBuf>,

    /// Output file. Defaults to stdout for SVG and JSON if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Expand a node by id (repeatable); its ancestors are expanded too
    #[arg(long = "expand")]
    pub expand: Vec<String>,

    /// Expand every node whose id matches this regex
    #[arg(long = "expand-match")]
    pub expand_match: Option<String>,

    /// Expand the whole tree
    #[arg(long = "expand-all")]
    pub expand_all: bool,

    /// Hide labels of a node kind (repeatable): zone|sz, environment|env, tier, application|app, host
    #[arg(long = "hide-labels", value_parser = parse_kind)]
    pub hide_labels: Vec<NodeKind>,

    /// Render the highlight for this node id
    #[arg(long = "hover")]
    pub hover: Option<String>,

    /// Width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())
        .with_context(|| format!("loading config {:?}", args.config))?;
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }

    let topology = load_topology(&args.topology)?;
    let links = match args.links.as_deref() {
        Some(path) => load_links(path)?,
        None => Vec::new(),
    };

    let mut viewer = Viewer::new(&topology, links, &config);
    if args.expand_all {
        viewer.expand_all();
    }
    for id in &args.expand {
        let pattern = Regex::new(&format!("^{}$", regex::escape(id)))?;
        if viewer.expand_matching(&pattern) == 0 {
            tracing::warn!(id = %id, "no node with this id");
        }
    }
    if let Some(raw) = args.expand_match.as_deref() {
        let pattern = Regex::new(raw).with_context(|| format!("invalid --expand-match {raw:?}"))?;
        let matched = viewer.expand_matching(&pattern);
        tracing::info!(matched, "expanded matching nodes");
    }
    for &kind in &args.hide_labels {
        viewer.set_label_style(kind, None, Some(false));
    }
    if let Some(id) = args.hover.as_deref() {
        if viewer.hover_enter(id).is_empty() {
            tracing::warn!(id = %id, "hover produced no highlight");
        }
    }

    let frame = viewer.frame();
    match args.output_format {
        OutputFormat::Svg => {
            let svg = render_svg(&frame, &config);
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(args.output.as_deref(), "png")?;
            let svg = render_svg(&frame, &config);
            write_output_png(&svg, output, &config)?;
        }
        OutputFormat::Json => {
            write_layout_dump(args.output.as_deref(), &frame)?;
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn parse_kind(token: &str) -> Result<NodeKind, String> {
    NodeKind::from_token(token).ok_or_else(|| {
        let known: Vec<&str> = NodeKind::ALL.iter().map(|kind| kind.as_str()).collect();
        format!("unknown node kind {token:?}, expected one of {}", known.join(", "))
    })
}

fn ensure_output<'a>(output: Option<&'a Path>, ext: &str) -> Result<&'a Path> {
    output.ok_or_else(|| anyhow::anyhow!("Output path required for {} output", ext))
}
