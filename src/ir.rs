use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Root,
    Zone,
    Environment,
    Tier,
    Application,
    Host,
}

impl NodeKind {
    pub const ALL: [NodeKind; 6] = [
        NodeKind::Root,
        NodeKind::Zone,
        NodeKind::Environment,
        NodeKind::Tier,
        NodeKind::Application,
        NodeKind::Host,
    ];

    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "root" => Some(Self::Root),
            "zone" | "sz" => Some(Self::Zone),
            "environment" | "env" => Some(Self::Environment),
            "tier" => Some(Self::Tier),
            "application" | "app" => Some(Self::Application),
            "host" => Some(Self::Host),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Zone => "zone",
            Self::Environment => "environment",
            Self::Tier => "tier",
            Self::Application => "application",
            Self::Host => "host",
        }
    }

    /// Position in [`NodeKind::ALL`], used to index per-kind lookup tables.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Plain topology description consumed once by the tree builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topology {
    pub name: String,
    #[serde(alias = "type")]
    pub kind: NodeKind,
    #[serde(default)]
    pub children: Vec<Topology>,
}

impl Topology {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<Topology>) -> Self {
        self.children = children;
        self
    }

    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Topology::node_count).sum::<usize>()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkKind {
    Internal,
    CrossZone,
    #[serde(other)]
    Other,
}

impl LinkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::CrossZone => "cross-zone",
            Self::Other => "other",
        }
    }
}

/// Directed relation between two host ids. Links never point at node objects,
/// so they stay valid across tree rebuilds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub id: String,
    pub source: String,
    pub target: String,
    pub kind: LinkKind,
}

impl Link {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        kind: LinkKind,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            kind,
        }
    }
}
