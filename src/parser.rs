use crate::error::LoadError;
use crate::ir::{Link, Topology};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LinksFile {
    List(Vec<Link>),
    Wrapped { links: Vec<Link> },
}

/// Parses a topology description. Accepts strict JSON and JSON5 (comments,
/// trailing commas, unquoted keys).
pub fn parse_topology(input: &str) -> Result<Topology, LoadError> {
    let topology: Topology = match serde_json::from_str(input) {
        Ok(value) => value,
        Err(_) => json5::from_str(input).map_err(|err| LoadError::parse("topology", err))?,
    };
    if topology.name.trim().is_empty() {
        return Err(LoadError::EmptyTopology);
    }
    Ok(topology)
}

/// Parses a link list, either a bare array or an object with a `links` field.
/// Endpoints are not checked here: unresolved links are dropped at hover time.
pub fn parse_links(input: &str) -> Result<Vec<Link>, LoadError> {
    let parsed: LinksFile = match serde_json::from_str(input) {
        Ok(value) => value,
        Err(_) => json5::from_str(input).map_err(|err| LoadError::parse("links", err))?,
    };
    Ok(match parsed {
        LinksFile::List(links) => links,
        LinksFile::Wrapped { links } => links,
    })
}

pub fn load_topology(path: &Path) -> Result<Topology, LoadError> {
    parse_topology(&read(path)?)
}

pub fn load_links(path: &Path) -> Result<Vec<Link>, LoadError> {
    parse_links(&read(path)?)
}

fn read(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}
