//! Core audit pipeline shared by the library API and the CLI.
//! Primitives -> filtered primitives -> graph -> verifier -> rule report.

use std::path::Path;

use crate::config::{AuditConfig, ConfigError};
use crate::graph::{Graph, GraphBuilder, GraphError};
use crate::parser::primitives::{PrimitiveParseError, Primitives};
use crate::report::ReportError;
use crate::rules::{RuleEngine, RuleListError, RuleReport, RuleSpec};
use crate::verify::GspVerifier;

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Graph invariant violated: {0}")]
    Graph(#[from] GraphError),
    #[error("Report error: {0}")]
    Report(#[from] ReportError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<PrimitiveParseError> for AuditError {
    fn from(e: PrimitiveParseError) -> Self {
        AuditError::Parse(e.to_string())
    }
}

impl From<RuleListError> for AuditError {
    fn from(e: RuleListError) -> Self {
        AuditError::Parse(e.to_string())
    }
}

/// Run-time overrides applied on top of the loaded config.
#[derive(Clone, Debug, Default)]
pub struct AuditOptions {
    /// Replaces `tolerance.tau_endpoint_snap`
    pub tau_override: Option<f64>,
}

/// The built graph together with the rule results.
#[derive(Debug, Clone)]
pub struct AuditOutcome {
    pub graph: Graph,
    pub report: RuleReport,
}

impl AuditOutcome {
    pub fn passed(&self) -> bool {
        self.report.passed()
    }
}

/// Core audit API used by the CLI.
pub struct AuditCore;

impl AuditCore {
    /// Build the graph from decoded primitives and run `rules` over it.
    pub fn audit(
        primitives: &Primitives,
        config: &AuditConfig,
        rules: &[RuleSpec],
    ) -> Result<AuditOutcome, AuditError> {
        let tolerances = config.build_tolerances()?;
        let resolver = config.symbol_resolver()?;
        let primitives = primitives.filter_layers(&config.layers, &config.wires);
        if primitives.is_empty() {
            tracing::warn!("No primitives left after layer filtering");
        }

        let graph = GraphBuilder::new(tolerances, &resolver).build(&primitives)?;
        tracing::info!(
            "Graph built with {} nodes and {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        let report = Self::verify_graph(&graph, rules);
        Ok(AuditOutcome { graph, report })
    }

    /// Run `rules` over an existing graph.
    pub fn verify_graph(graph: &Graph, rules: &[RuleSpec]) -> RuleReport {
        let verifier = GspVerifier::new(graph);
        let report = RuleEngine::new(&verifier).run(rules);
        tracing::info!(
            "Evaluated {} rules, {} failed",
            report.results.len(),
            report.failed_count()
        );
        report
    }

    /// Load the three input files and audit.
    pub fn audit_files(
        primitives_path: &Path,
        config_path: &Path,
        rules_path: &Path,
        options: AuditOptions,
    ) -> Result<AuditOutcome, AuditError> {
        let mut config = AuditConfig::from_path(config_path)?;
        if let Some(tau) = options.tau_override {
            config.tolerance.tau_endpoint_snap = tau;
        }
        let primitives = Primitives::from_path(primitives_path)?;
        let rules = crate::rules::RuleSet::from_path(rules_path)?;

        Self::audit(&primitives, &config, &rules.rules)
    }

    /// Load a saved `graph.json`, re-checking its invariants.
    pub fn load_graph(path: &Path) -> Result<Graph, AuditError> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| AuditError::Parse(e.to_string()))
    }
}
