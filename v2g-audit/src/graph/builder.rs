//! Graph Builder
//!
//! Turns decoded primitives into a [`Graph`]:
//!
//! 1. Cluster every wire endpoint; one `ENDPOINT` node per cluster (`EP{i}`).
//! 2. One `WIRE` edge per segment whose two ends land in different clusters.
//!    Segments collapsing into a single cluster are dropped.
//! 3. One node per symbol instance, typed by the resolver (`BLOCK` when
//!    unresolved). Symbol nodes are never merged.
//! 4. Each text annotation attaches to the single nearest node if it is
//!    within the attach distance.
//! 5. Each `GROUND` node is bonded to its nearest junction with a
//!    `GROUND_CONN` edge when within the junction tolerance.
//!
//! Only endpoint-to-endpoint contacts become edges; wires that merely cross
//! mid-span stay unconnected.

use crate::clustering::{cluster_endpoints, EndpointClusters};
use crate::geometry::{distance, Point};
use crate::parser::primitives::Primitives;
use crate::symbols::{SymbolLabel, SymbolResolver};

use super::{Edge, EdgeKind, Graph, GraphError, Node, NodeType};

/// Validated tolerances, in drawing units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildTolerances {
    pub endpoint_snap: f64,
    pub junction_snap: f64,
    pub text_attach: f64,
}

impl Default for BuildTolerances {
    fn default() -> Self {
        Self {
            endpoint_snap: 2.0,
            junction_snap: 2.0,
            text_attach: 3.0,
        }
    }
}

pub struct GraphBuilder<'r> {
    tolerances: BuildTolerances,
    resolver: &'r dyn SymbolResolver,
}

fn endpoint_id(cluster: usize) -> String {
    format!("EP{}", cluster)
}

impl<'r> GraphBuilder<'r> {
    pub fn new(tolerances: BuildTolerances, resolver: &'r dyn SymbolResolver) -> Self {
        Self {
            tolerances,
            resolver,
        }
    }

    pub fn build(&self, primitives: &Primitives) -> Result<Graph, GraphError> {
        let endpoints: Vec<Point> = primitives
            .wires
            .iter()
            .flat_map(|w| [w.p1, w.p2])
            .collect();
        let clusters = cluster_endpoints(&endpoints, self.tolerances.endpoint_snap);

        let mut nodes: Vec<Node> = clusters
            .representatives()
            .iter()
            .enumerate()
            .map(|(i, p)| Node::endpoint(endpoint_id(i), *p))
            .collect();

        let mut edges = self.wire_edges(primitives, &clusters);
        self.add_symbol_nodes(primitives, &mut nodes);
        self.attach_texts(primitives, &mut nodes);
        edges.extend(self.ground_edges(&nodes, &clusters));

        tracing::debug!(
            "Built graph: {} nodes ({} junctions), {} edges",
            nodes.len(),
            clusters.len(),
            edges.len()
        );

        Graph::from_parts(nodes, edges)
    }

    fn wire_edges(&self, primitives: &Primitives, clusters: &EndpointClusters) -> Vec<Edge> {
        let mut edges = Vec::with_capacity(primitives.wires.len());
        let mut degenerate = 0usize;

        for wire in &primitives.wires {
            let (Some(a), Some(b)) = (clusters.nearest(&wire.p1), clusters.nearest(&wire.p2)) else {
                continue;
            };
            if a == b {
                degenerate += 1;
                continue;
            }
            edges.push(Edge::new(endpoint_id(a), endpoint_id(b), EdgeKind::Wire));
        }

        if degenerate > 0 {
            tracing::debug!("Dropped {} wires shorter than the snap tolerance", degenerate);
        }
        edges
    }

    fn add_symbol_nodes(&self, primitives: &Primitives, nodes: &mut Vec<Node>) {
        for symbol in &primitives.symbols {
            // Same string mapping as graph.json loading, so a reloaded graph types alike
            let node_type = match self.resolver.resolve(&symbol.name) {
                Some(label) => NodeType::from(label),
                None => {
                    tracing::warn!("Symbol {:?} unresolved, using BLOCK", symbol.name);
                    NodeType::Symbol(SymbolLabel::Block)
                }
            };
            let id = format!("{}_{}", node_type, nodes.len());
            nodes.push(Node::new(id, node_type, symbol.position).with_name(symbol.name.clone()));
        }
    }

    fn attach_texts(&self, primitives: &Primitives, nodes: &mut [Node]) {
        for text in &primitives.texts {
            let mut nearest: Option<(usize, f64)> = None;
            for (i, node) in nodes.iter().enumerate() {
                let d = distance(&node.position(), &text.position);
                match nearest {
                    Some((_, best)) if d >= best => {}
                    _ => nearest = Some((i, d)),
                }
            }

            if let Some((i, d)) = nearest {
                if d <= self.tolerances.text_attach {
                    nodes[i].attrs.texts.push(text.text.clone());
                }
            }
        }
    }

    fn ground_edges(&self, nodes: &[Node], clusters: &EndpointClusters) -> Vec<Edge> {
        nodes
            .iter()
            .filter(|n| n.node_type.is_label(&SymbolLabel::Ground))
            .filter_map(|ground| {
                let (cluster, d) = clusters.nearest_with_distance(&ground.position())?;
                if d <= self.tolerances.junction_snap {
                    Some(Edge::new(ground.id.clone(), endpoint_id(cluster), EdgeKind::GroundConn))
                } else {
                    tracing::debug!("{} has no junction within {}", ground.id, self.tolerances.junction_snap);
                    None
                }
            })
            .collect()
    }
}
