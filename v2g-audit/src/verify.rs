//! Region Selection and Topological Verification
//!
//! [`GspVerifier`] wraps a finished [`Graph`], narrows it to a region and
//! evaluates one topological predicate per call. Predicates only read the
//! graph and never fail: every degenerate case (no grounds, no CTs, no
//! edges) comes back as a [`RuleResult`].

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::graph::{Graph, NodeIndex, NodeType};
use crate::symbols::SymbolLabel;

/// Subgraph selection policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// The whole graph
    All,
    /// Every connected component containing at least one `CT` node, or the
    /// whole graph when there is no `CT` at all
    AroundCt,
}

impl Region {
    /// `"All"` selects everything; any other name selects the CT components.
    pub fn parse(name: &str) -> Self {
        if name == "All" {
            Region::All
        } else {
            Region::AroundCt
        }
    }
}

/// Outcome of one rule invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleResult {
    /// `None` when the rule entry named no function
    pub function: Option<String>,
    pub region: String,
    pub status: bool,
    pub detail: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ground_count: Option<usize>,

    /// Ids of suspected open endpoints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspects: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub violations: Option<Vec<PolarityViolation>>,
}

impl RuleResult {
    pub fn new(
        function: impl Into<String>,
        region: impl Into<String>,
        status: bool,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            function: Some(function.into()),
            region: region.into(),
            status,
            detail: detail.into(),
            ground_count: None,
            suspects: None,
            violations: None,
        }
    }

    pub fn function_name(&self) -> &str {
        self.function.as_deref().unwrap_or("(none)")
    }
}

/// An edge whose two ends carry different polarity marks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolarityViolation {
    pub u: String,
    pub v: String,
    pub u_polarity: String,
    pub v_polarity: String,
}

impl fmt::Display for PolarityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.u, self.v, self.u_polarity, self.v_polarity)
    }
}

pub struct GspVerifier<'g> {
    graph: &'g Graph,
}

impl<'g> GspVerifier<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        Self { graph }
    }

    /// Resolve a region name to a subgraph.
    pub fn select_region(&self, region: &str) -> Graph {
        match Region::parse(region) {
            Region::All => self.graph.clone(),
            Region::AroundCt => {
                let ct = SymbolLabel::Ct;
                let ct_nodes: HashSet<NodeIndex> = self.graph.nodes_with_label(&ct).collect();
                if ct_nodes.is_empty() {
                    return self.graph.clone();
                }
                let keep: HashSet<NodeIndex> = self
                    .graph
                    .connected_components()
                    .into_iter()
                    .filter(|component| component.iter().any(|idx| ct_nodes.contains(idx)))
                    .flatten()
                    .collect();
                self.graph.induced_subgraph(&keep)
            }
        }
    }

    /// Pass iff the region holds exactly one `GROUND` node.
    pub fn check_grounding_uniqueness(&self, region: &str) -> RuleResult {
        let sub = self.select_region(region);
        let count = sub.nodes_with_label(&SymbolLabel::Ground).count();

        let (status, detail) = match count {
            1 => (true, "Exactly one grounding node.".to_string()),
            0 => (false, "Missing grounding.".to_string()),
            n => (false, format!("Multiple grounding nodes: {}.", n)),
        };

        let mut result = RuleResult::new("check_grounding_uniqueness", region, status, detail);
        result.ground_count = Some(count);
        result
    }

    /// Flag junctions of degree <= 1 that do not touch a breaker or
    /// terminal box.
    pub fn check_open_circuit(&self, region: &str) -> RuleResult {
        let sub = self.select_region(region);
        let terminates = |idx: NodeIndex| {
            let t = &sub.node(idx).node_type;
            t.is_label(&SymbolLabel::Breaker) || t.is_label(&SymbolLabel::TerminalBox)
        };

        let suspects: Vec<String> = (0..sub.node_count())
            .filter(|&idx| sub.node(idx).node_type == NodeType::Endpoint)
            .filter(|&idx| sub.degree(idx) <= 1)
            .filter(|&idx| !sub.neighbors(idx).iter().any(|&n| terminates(n)))
            .map(|idx| sub.node(idx).id.clone())
            .collect();

        let detail = format!("open endpoints: [{}]", suspects.join(", "));
        let mut result = RuleResult::new("check_open_circuit", region, suspects.is_empty(), detail);
        result.suspects = Some(suspects);
        result
    }

    /// Fail when two or more `CT` nodes share a connected component.
    pub fn check_inter_circuit_short(&self, region: &str) -> RuleResult {
        let sub = self.select_region(region);
        let ct = SymbolLabel::Ct;
        let ct_nodes: HashSet<NodeIndex> = sub.nodes_with_label(&ct).collect();

        let shorted = ct_nodes.len() >= 2
            && sub
                .connected_components()
                .iter()
                .any(|component| component.iter().filter(|idx| ct_nodes.contains(*idx)).count() >= 2);

        if shorted {
            RuleResult::new(
                "check_inter_circuit_short",
                region,
                false,
                "Multiple CTs in one connected component (possible inter-circuit short).",
            )
        } else {
            RuleResult::new("check_inter_circuit_short", region, true, "OK")
        }
    }

    /// Every edge whose ends both carry a polarity must agree on it.
    pub fn check_polarity_consistency(&self, region: &str) -> RuleResult {
        let sub = self.select_region(region);
        let mut seen: HashSet<(NodeIndex, NodeIndex)> = HashSet::new();
        let mut violations = Vec::new();

        for (_, u, v) in sub.edge_endpoints() {
            let key = (u.min(v), u.max(v));
            if !seen.insert(key) {
                continue;
            }
            let (nu, nv) = (sub.node(u), sub.node(v));
            if let (Some(pu), Some(pv)) = (&nu.attrs.polarity, &nv.attrs.polarity) {
                if pu != pv {
                    violations.push(PolarityViolation {
                        u: nu.id.clone(),
                        v: nv.id.clone(),
                        u_polarity: pu.clone(),
                        v_polarity: pv.clone(),
                    });
                }
            }
        }

        let listed: Vec<String> = violations.iter().map(|v| v.to_string()).collect();
        let detail = format!("violations: [{}]", listed.join(", "));
        let mut result =
            RuleResult::new("check_polarity_consistency", region, violations.is_empty(), detail);
        result.violations = Some(violations);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::graph::{Edge, EdgeKind, Node};

    fn ep(id: &str) -> Node {
        Node::endpoint(id, Point::new(0.0, 0.0))
    }

    fn sym(id: &str, label: SymbolLabel) -> Node {
        Node::symbol(id, label, Point::new(0.0, 0.0))
    }

    fn wire(u: &str, v: &str) -> Edge {
        Edge::new(u, v, EdgeKind::Wire)
    }

    #[test]
    fn test_region_parse() {
        assert_eq!(Region::parse("All"), Region::All);
        assert_eq!(Region::parse("CT_secondary"), Region::AroundCt);
        assert_eq!(Region::parse("all"), Region::AroundCt);
    }

    #[test]
    fn test_region_around_ct() {
        let g = Graph::from_parts(
            vec![ep("EP0"), ep("EP1"), sym("CT_2", SymbolLabel::Ct), ep("EP3"), ep("EP4")],
            vec![wire("EP0", "EP1"), wire("CT_2", "EP1"), wire("EP3", "EP4")],
        )
        .unwrap();
        let verifier = GspVerifier::new(&g);

        let sub = verifier.select_region("CT_secondary");
        let ids: Vec<&str> = sub.nodes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["EP0", "EP1", "CT_2"]);
        assert_eq!(verifier.select_region("All").node_count(), 5);
    }

    #[test]
    fn test_region_without_ct_falls_back_to_all() {
        let g = Graph::from_parts(vec![ep("EP0"), ep("EP1")], vec![]).unwrap();
        assert_eq!(GspVerifier::new(&g).select_region("anything").node_count(), 2);
    }

    #[test]
    fn test_grounding_uniqueness() {
        let one = Graph::from_parts(vec![ep("EP0"), sym("GROUND_1", SymbolLabel::Ground)], vec![])
            .unwrap();
        let result = GspVerifier::new(&one).check_grounding_uniqueness("All");
        assert!(result.status);
        assert_eq!(result.ground_count, Some(1));

        let two = Graph::from_parts(
            vec![sym("GROUND_0", SymbolLabel::Ground), sym("GROUND_1", SymbolLabel::Ground)],
            vec![],
        )
        .unwrap();
        let result = GspVerifier::new(&two).check_grounding_uniqueness("All");
        assert!(!result.status);
        assert_eq!(result.ground_count, Some(2));
        assert_eq!(result.detail, "Multiple grounding nodes: 2.");
    }

    #[test]
    fn test_empty_graph_outcomes() {
        let g = Graph::empty();
        let verifier = GspVerifier::new(&g);

        let grounding = verifier.check_grounding_uniqueness("All");
        assert!(!grounding.status);
        assert_eq!(grounding.detail, "Missing grounding.");
        assert!(verifier.check_open_circuit("All").status);
        assert!(verifier.check_inter_circuit_short("CT_secondary").status);
        assert!(verifier.check_polarity_consistency("All").status);
    }

    #[test]
    fn test_open_circuit_single_suspect() {
        // Triangle with one stub hanging off EP1
        let g = Graph::from_parts(
            vec![ep("EP0"), ep("EP1"), ep("EP2"), ep("EP3")],
            vec![wire("EP0", "EP1"), wire("EP1", "EP2"), wire("EP2", "EP0"), wire("EP1", "EP3")],
        )
        .unwrap();
        let result = GspVerifier::new(&g).check_open_circuit("All");

        assert!(!result.status);
        assert_eq!(result.suspects, Some(vec!["EP3".to_string()]));
        assert_eq!(result.detail, "open endpoints: [EP3]");
    }

    #[test]
    fn test_open_circuit_terminated_by_breaker() {
        let g = Graph::from_parts(
            vec![ep("EP0"), sym("BREAKER_1", SymbolLabel::Breaker), sym("TERMINAL_BOX_2", SymbolLabel::TerminalBox)],
            vec![wire("EP0", "BREAKER_1")],
        )
        .unwrap();
        let result = GspVerifier::new(&g).check_open_circuit("All");
        assert!(result.status);
        assert_eq!(result.detail, "open endpoints: []");
    }

    #[test]
    fn test_inter_circuit_short() {
        let joined = Graph::from_parts(
            vec![sym("CT_0", SymbolLabel::Ct), ep("EP1"), sym("CT_2", SymbolLabel::Ct)],
            vec![wire("CT_0", "EP1"), wire("EP1", "CT_2")],
        )
        .unwrap();
        let result = GspVerifier::new(&joined).check_inter_circuit_short("All");
        assert!(!result.status);
        assert!(result.detail.starts_with("Multiple CTs in one connected component"));

        let separate = Graph::from_parts(
            vec![sym("CT_0", SymbolLabel::Ct), ep("EP1"), sym("CT_2", SymbolLabel::Ct)],
            vec![wire("CT_0", "EP1")],
        )
        .unwrap();
        let result = GspVerifier::new(&separate).check_inter_circuit_short("CT_secondary");
        assert!(result.status);
        assert_eq!(result.detail, "OK");
    }

    #[test]
    fn test_polarity_consistency() {
        let g = Graph::from_parts(
            vec![
                ep("EP0").with_polarity("+"),
                ep("EP1").with_polarity("-"),
                ep("EP2"),
                ep("EP3").with_polarity("+"),
            ],
            vec![
                wire("EP0", "EP1"),
                wire("EP1", "EP0"),
                wire("EP1", "EP2"),
                wire("EP0", "EP3"),
            ],
        )
        .unwrap();
        let result = GspVerifier::new(&g).check_polarity_consistency("All");

        assert!(!result.status);
        let violations = result.violations.unwrap();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].u, "EP0");
        assert_eq!(violations[0].v, "EP1");
        assert_eq!(result.detail, "violations: [(EP0, EP1, +, -)]");
    }

    #[test]
    fn test_result_json_omits_absent_extras() {
        let result = RuleResult::new("check_inter_circuit_short", "All", true, "OK");
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "function": "check_inter_circuit_short",
                "region": "All",
                "status": true,
                "detail": "OK"
            })
        );
    }
}
