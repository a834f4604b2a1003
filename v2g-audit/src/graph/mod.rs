//! Schematic Topology Graph
//!
//! An undirected graph of junction points and symbol instances, stored as a
//! node table, an edge list and a per-node neighbour index. The graph is
//! assembled once (by [`builder::GraphBuilder`] or [`Graph::from_parts`]) and
//! never mutated afterwards, so verifiers can share it freely.
//!
//! Parallel edges are kept in the edge list but collapse in the neighbour
//! index: degree and neighbours describe the simple graph.

pub mod builder;

use petgraph::unionfind::UnionFind;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use thiserror::Error;

use crate::geometry::Point;
use crate::symbols::SymbolLabel;

pub use builder::{BuildTolerances, GraphBuilder};

/// Position of a node in the node table.
pub type NodeIndex = usize;

/// Violations of the graph invariants.
///
/// These indicate a bug in whatever assembled the graph, not a rule failure.
#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("Duplicate node id: {0}")]
    DuplicateNode(String),

    #[error("Edge {u} -- {v} references unknown node {missing}")]
    UnknownNode {
        u: String,
        v: String,
        missing: String,
    },

    #[error("Self-loop on node {0}")]
    SelfLoop(String),

    #[error("GROUND_CONN edge {u} -- {v} must join a GROUND node to an ENDPOINT node")]
    InvalidGroundConn { u: String, v: String },
}

/// Node type: a synthetic wire junction or a labelled symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeType {
    Endpoint,
    Symbol(SymbolLabel),
}

impl NodeType {
    pub fn is_endpoint(&self) -> bool {
        matches!(self, NodeType::Endpoint)
    }

    pub fn is_label(&self, label: &SymbolLabel) -> bool {
        matches!(self, NodeType::Symbol(l) if l == label)
    }

    pub fn as_str(&self) -> &str {
        match self {
            NodeType::Endpoint => "ENDPOINT",
            NodeType::Symbol(label) => label.as_str(),
        }
    }
}

impl From<String> for NodeType {
    fn from(s: String) -> Self {
        if s == "ENDPOINT" {
            NodeType::Endpoint
        } else {
            NodeType::Symbol(SymbolLabel::from(s))
        }
    }
}

impl From<NodeType> for String {
    fn from(t: NodeType) -> Self {
        match t {
            NodeType::Endpoint => "ENDPOINT".to_string(),
            NodeType::Symbol(label) => label.into(),
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Known node attributes. Absent fields stay absent in JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeAttrs {
    /// Original symbol name from the drawing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Attached text annotations, in arrival order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub texts: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polarity: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub attrs: NodeAttrs,
}

impl Node {
    pub fn new(id: impl Into<String>, node_type: NodeType, at: Point) -> Self {
        Self {
            id: id.into(),
            node_type,
            x: at.x,
            y: at.y,
            attrs: NodeAttrs::default(),
        }
    }

    pub fn endpoint(id: impl Into<String>, at: Point) -> Self {
        Self::new(id, NodeType::Endpoint, at)
    }

    pub fn symbol(id: impl Into<String>, label: SymbolLabel, at: Point) -> Self {
        Self::new(id, NodeType::Symbol(label), at)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.attrs.name = Some(name.into());
        self
    }

    pub fn with_polarity(mut self, polarity: impl Into<String>) -> Self {
        self.attrs.polarity = Some(polarity.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.attrs.texts.push(text.into());
        self
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeKind {
    Wire,
    GroundConn,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Wire => "WIRE",
            EdgeKind::GroundConn => "GROUND_CONN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeAttrs {
    pub kind: EdgeKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub u: String,
    pub v: String,
    pub attrs: EdgeAttrs,
}

impl Edge {
    pub fn new(u: impl Into<String>, v: impl Into<String>, kind: EdgeKind) -> Self {
        Self {
            u: u.into(),
            v: v.into(),
            attrs: EdgeAttrs { kind },
        }
    }

    pub fn kind(&self) -> EdgeKind {
        self.attrs.kind
    }
}

/// Wire format of a graph: `{nodes: [...], edges: [...]}`.
///
/// Unvalidated; convert with `Graph::try_from`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphData {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "GraphData", into = "GraphData")]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    /// Node-table positions of each edge's `(u, v)`
    edge_ends: Vec<(NodeIndex, NodeIndex)>,
    index: HashMap<String, NodeIndex>,
    /// Distinct neighbours per node, in first-seen order
    adjacency: Vec<Vec<NodeIndex>>,
}

impl Graph {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Assemble a graph, checking id uniqueness, edge references and
    /// self-loops.
    pub fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Self, GraphError> {
        let mut index = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            if index.insert(node.id.clone(), i).is_some() {
                return Err(GraphError::DuplicateNode(node.id.clone()));
            }
        }

        let mut edge_ends = Vec::with_capacity(edges.len());
        for edge in &edges {
            let lookup = |id: &str| {
                index.get(id).copied().ok_or_else(|| GraphError::UnknownNode {
                    u: edge.u.clone(),
                    v: edge.v.clone(),
                    missing: id.to_string(),
                })
            };
            let u = lookup(&edge.u)?;
            let v = lookup(&edge.v)?;
            if u == v {
                return Err(GraphError::SelfLoop(edge.u.clone()));
            }
            if edge.kind() == EdgeKind::GroundConn && !joins_ground_to_endpoint(&nodes[u], &nodes[v]) {
                return Err(GraphError::InvalidGroundConn {
                    u: edge.u.clone(),
                    v: edge.v.clone(),
                });
            }
            edge_ends.push((u, v));
        }

        let adjacency = build_adjacency(nodes.len(), &edge_ends);
        Ok(Self {
            nodes,
            edges,
            edge_ends,
            index,
            adjacency,
        })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, idx: NodeIndex) -> &Node {
        &self.nodes[idx]
    }

    pub fn node_by_id(&self, id: &str) -> Option<&Node> {
        self.index_of(id).map(|idx| &self.nodes[idx])
    }

    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Edges paired with the node-table positions of their ends.
    pub fn edge_endpoints(&self) -> impl Iterator<Item = (&Edge, NodeIndex, NodeIndex)> {
        self.edges
            .iter()
            .zip(&self.edge_ends)
            .map(|(e, &(u, v))| (e, u, v))
    }

    /// Number of distinct neighbours.
    pub fn degree(&self, idx: NodeIndex) -> usize {
        self.adjacency[idx].len()
    }

    pub fn neighbors(&self, idx: NodeIndex) -> &[NodeIndex] {
        &self.adjacency[idx]
    }

    /// Node-table positions of every node carrying `label`.
    pub fn nodes_with_label<'a>(
        &'a self,
        label: &'a SymbolLabel,
    ) -> impl Iterator<Item = NodeIndex> + 'a {
        self.nodes
            .iter()
            .enumerate()
            .filter(move |(_, n)| n.node_type.is_label(label))
            .map(|(i, _)| i)
    }

    /// Partition of the node table into connected components.
    ///
    /// Components are ordered by their lowest node index and list their
    /// members in node-table order.
    pub fn connected_components(&self) -> Vec<Vec<NodeIndex>> {
        let mut sets = UnionFind::<usize>::new(self.nodes.len());
        for &(u, v) in &self.edge_ends {
            sets.union(u, v);
        }

        let mut by_root: HashMap<usize, usize> = HashMap::new();
        let mut components: Vec<Vec<NodeIndex>> = Vec::new();
        for idx in 0..self.nodes.len() {
            let root = sets.find(idx);
            let slot = *by_root.entry(root).or_insert_with(|| {
                components.push(Vec::new());
                components.len() - 1
            });
            components[slot].push(idx);
        }
        components
    }

    /// Subgraph on `keep` with every edge whose ends are both kept.
    ///
    /// Kept nodes retain their relative order from this graph.
    pub fn induced_subgraph(&self, keep: &HashSet<NodeIndex>) -> Graph {
        let mut remap: HashMap<NodeIndex, NodeIndex> = HashMap::with_capacity(keep.len());
        let mut nodes = Vec::with_capacity(keep.len());
        for (idx, node) in self.nodes.iter().enumerate() {
            if keep.contains(&idx) {
                remap.insert(idx, nodes.len());
                nodes.push(node.clone());
            }
        }

        let mut edges = Vec::new();
        let mut edge_ends = Vec::new();
        for (edge, u, v) in self.edge_endpoints() {
            if let (Some(&nu), Some(&nv)) = (remap.get(&u), remap.get(&v)) {
                edges.push(edge.clone());
                edge_ends.push((nu, nv));
            }
        }

        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();
        let adjacency = build_adjacency(nodes.len(), &edge_ends);
        Graph {
            nodes,
            edges,
            edge_ends,
            index,
            adjacency,
        }
    }

    pub fn stats(&self) -> GraphStats {
        let mut node_types = BTreeMap::new();
        for node in &self.nodes {
            *node_types.entry(node.node_type.to_string()).or_insert(0) += 1;
        }
        let mut edge_kinds = BTreeMap::new();
        for edge in &self.edges {
            *edge_kinds.entry(edge.kind().as_str().to_string()).or_insert(0) += 1;
        }
        GraphStats {
            node_count: self.nodes.len(),
            edge_count: self.edges.len(),
            node_types,
            edge_kinds,
        }
    }
}

fn joins_ground_to_endpoint(a: &Node, b: &Node) -> bool {
    let ground = |n: &Node| n.node_type.is_label(&SymbolLabel::Ground);
    (ground(a) && b.node_type.is_endpoint()) || (ground(b) && a.node_type.is_endpoint())
}

fn build_adjacency(node_count: usize, edge_ends: &[(NodeIndex, NodeIndex)]) -> Vec<Vec<NodeIndex>> {
    let mut adjacency = vec![Vec::new(); node_count];
    for &(u, v) in edge_ends {
        if !adjacency[u].contains(&v) {
            adjacency[u].push(v);
        }
        if !adjacency[v].contains(&u) {
            adjacency[v].push(u);
        }
    }
    adjacency
}

impl TryFrom<GraphData> for Graph {
    type Error = GraphError;

    fn try_from(data: GraphData) -> Result<Self, Self::Error> {
        Graph::from_parts(data.nodes, data.edges)
    }
}

impl From<Graph> for GraphData {
    fn from(graph: Graph) -> Self {
        GraphData {
            nodes: graph.nodes,
            edges: graph.edges,
        }
    }
}

/// Node-type and edge-kind histograms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub node_types: BTreeMap<String, usize>,
    pub edge_kinds: BTreeMap<String, usize>,
}
