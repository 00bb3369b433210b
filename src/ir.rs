use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Identifier of one source file in the graph.
pub type NodeId = String;

/// How a file path is turned into a [`NodeId`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum NodeNaming {
    /// File name without directory and extension (`src/foo.hpp` -> `foo`).
    #[default]
    Stem,
    /// File name without directory (`src/foo.hpp` -> `foo.hpp`).
    FileName,
    /// Path relative to the scanned root, `/`-separated.
    RelativePath,
}

impl NodeNaming {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "stem" => Some(Self::Stem),
            "file-name" | "filename" => Some(Self::FileName),
            "relative-path" | "path" => Some(Self::RelativePath),
            _ => None,
        }
    }
}

/// `from` includes `to`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
}

/// Everything the scanner learned about a source tree.
///
/// `edges` is a multigraph: a file including the same header twice yields two
/// identical edges.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    pub nodes: BTreeSet<NodeId>,
    pub edges: Vec<Edge>,
    /// Folder -> ids of the files found in it, in traversal order.
    pub folders: BTreeMap<PathBuf, Vec<NodeId>>,
    /// Ids that belong to scanned files, as opposed to headers that are only
    /// referenced.
    pub own: BTreeSet<NodeId>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self {
            nodes: BTreeSet::new(),
            edges: Vec::new(),
            folders: BTreeMap::new(),
            own: BTreeSet::new(),
        }
    }

    pub fn add_file(&mut self, folder: PathBuf, id: &str) {
        self.folders.entry(folder).or_default().push(id.to_string());
        self.own.insert(id.to_string());
        self.nodes.insert(id.to_string());
    }

    pub fn add_edge(&mut self, from: &str, to: &str) {
        self.nodes.insert(from.to_string());
        self.nodes.insert(to.to_string());
        self.edges.push(Edge {
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    pub fn is_own(&self, id: &str) -> bool {
        self.own.contains(id)
    }

    /// Referenced ids that no scanned file provides, in lexicographic order.
    pub fn external_nodes(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.iter().filter(|id| !self.own.contains(*id))
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn out_degree(&self, id: &str) -> usize {
        self.edges.iter().filter(|edge| edge.from == id).count()
    }

    pub fn in_degree(&self, id: &str) -> usize {
        self.edges.iter().filter(|edge| edge.to == id).count()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}
