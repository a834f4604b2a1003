//! Rule Engine
//!
//! Runs a declarative list of `{region, function}` invocations against a
//! [`GspVerifier`]. Function names map onto the closed [`RuleFunction`] set;
//! a name outside it produces a failing "Unknown function" result and the
//! run carries on.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::verify::{GspVerifier, RuleResult};

#[derive(Debug, Error)]
pub enum RuleListError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid rule list JSON: {0}")]
    Json(#[from] serde_json::Error),
}

fn default_region() -> String {
    "All".to_string()
}

/// One rule invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default)]
    pub function: Option<String>,
}

impl RuleSpec {
    pub fn new(region: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            function: Some(function.into()),
        }
    }
}

/// Rule list document: `{"rules": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

impl RuleSet {
    pub fn from_json_str(content: &str) -> Result<Self, RuleListError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, RuleListError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}

/// The predicates a rule may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleFunction {
    GroundingUniqueness,
    OpenCircuit,
    InterCircuitShort,
    PolarityConsistency,
}

impl RuleFunction {
    pub const ALL: [RuleFunction; 4] = [
        RuleFunction::GroundingUniqueness,
        RuleFunction::OpenCircuit,
        RuleFunction::InterCircuitShort,
        RuleFunction::PolarityConsistency,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            RuleFunction::GroundingUniqueness => "check_grounding_uniqueness",
            RuleFunction::OpenCircuit => "check_open_circuit",
            RuleFunction::InterCircuitShort => "check_inter_circuit_short",
            RuleFunction::PolarityConsistency => "check_polarity_consistency",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RuleFunction::GroundingUniqueness => "Region contains exactly one grounding symbol",
            RuleFunction::OpenCircuit => {
                "Dangling wire ends must terminate at a breaker or terminal box"
            }
            RuleFunction::InterCircuitShort => {
                "No two current transformers share a connected component"
            }
            RuleFunction::PolarityConsistency => "Connected nodes agree on their polarity marks",
        }
    }

    pub fn evaluate(&self, verifier: &GspVerifier<'_>, region: &str) -> RuleResult {
        match self {
            RuleFunction::GroundingUniqueness => verifier.check_grounding_uniqueness(region),
            RuleFunction::OpenCircuit => verifier.check_open_circuit(region),
            RuleFunction::InterCircuitShort => verifier.check_inter_circuit_short(region),
            RuleFunction::PolarityConsistency => verifier.check_polarity_consistency(region),
        }
    }
}

/// Results in rule-list order: `{"results": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleReport {
    pub results: Vec<RuleResult>,
}

impl RuleReport {
    pub fn passed(&self) -> bool {
        self.results.iter().all(|r| r.status)
    }

    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| !r.status).count()
    }
}

pub struct RuleEngine<'v, 'g> {
    verifier: &'v GspVerifier<'g>,
}

impl<'v, 'g> RuleEngine<'v, 'g> {
    pub fn new(verifier: &'v GspVerifier<'g>) -> Self {
        Self { verifier }
    }

    pub fn run(&self, rules: &[RuleSpec]) -> RuleReport {
        let results = rules
            .iter()
            .map(|spec| match spec.function.as_deref().and_then(RuleFunction::from_name) {
                Some(function) => function.evaluate(self.verifier, &spec.region),
                None => {
                    tracing::warn!("Unknown rule function {:?}", spec.function);
                    let mut result =
                        RuleResult::new(String::new(), spec.region.clone(), false, "Unknown function");
                    result.function = spec.function.clone();
                    result
                }
            })
            .collect();
        RuleReport { results }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::graph::{Graph, Node};
    use crate::symbols::SymbolLabel;

    fn grounded_graph() -> Graph {
        Graph::from_parts(
            vec![Node::symbol("GROUND_0", SymbolLabel::Ground, Point::new(0.0, 0.0))],
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn test_unknown_function_is_isolated() {
        let graph = grounded_graph();
        let verifier = GspVerifier::new(&graph);
        let rules = vec![
            RuleSpec::new("All", "check_grounding_uniqueness"),
            RuleSpec::new("All", "check_everything"),
            RuleSpec::new("All", "check_open_circuit"),
        ];
        let report = RuleEngine::new(&verifier).run(&rules);

        assert_eq!(report.results.len(), 3);
        assert!(report.results[0].status);
        assert!(!report.results[1].status);
        assert_eq!(report.results[1].detail, "Unknown function");
        assert_eq!(report.results[1].function.as_deref(), Some("check_everything"));
        assert!(report.results[2].status);
        assert_eq!(report.failed_count(), 1);
        assert!(!report.passed());
    }

    #[test]
    fn test_order_preserved() {
        let graph = grounded_graph();
        let verifier = GspVerifier::new(&graph);
        let rules: Vec<RuleSpec> = RuleFunction::ALL
            .iter()
            .rev()
            .map(|f| RuleSpec::new("CT_secondary", f.name()))
            .collect();
        let report = RuleEngine::new(&verifier).run(&rules);

        let functions: Vec<&str> = report.results.iter().map(|r| r.function_name()).collect();
        assert_eq!(
            functions,
            vec![
                "check_polarity_consistency",
                "check_inter_circuit_short",
                "check_open_circuit",
                "check_grounding_uniqueness",
            ]
        );
        assert!(report.results.iter().all(|r| r.region == "CT_secondary"));
    }

    #[test]
    fn test_rule_set_defaults() {
        let set = RuleSet::from_json_str(r#"{"rules": [{"function": "check_open_circuit"}, {}]}"#)
            .unwrap();
        assert_eq!(set.rules[0].region, "All");
        assert_eq!(set.rules[1].function, None);
        assert!(RuleSet::from_json_str("{}").unwrap().rules.is_empty());
    }

    #[test]
    fn test_missing_function_echoes_null() {
        let graph = grounded_graph();
        let verifier = GspVerifier::new(&graph);
        let set = RuleSet::from_json_str(r#"{"rules": [{"region": "CT_secondary"}]}"#).unwrap();
        let report = RuleEngine::new(&verifier).run(&set.rules);

        let result = &report.results[0];
        assert!(!result.status);
        assert_eq!(result.function, None);
        assert_eq!(result.detail, "Unknown function");

        let json = serde_json::to_value(result).unwrap();
        assert!(json["function"].is_null());
        assert_eq!(json["region"], "CT_secondary");
    }

    #[test]
    fn test_function_names_round_trip() {
        for f in RuleFunction::ALL {
            assert_eq!(RuleFunction::from_name(f.name()), Some(f));
        }
    }
}
