//! V2G Audit - topology audit of electrical one-line schematics
//!
//! This library turns the geometric primitives of a decoded vector drawing
//! (wire segments, symbol instances, text annotations) into a typed
//! topology graph and runs circuit-design rules over it: grounding
//! uniqueness, open circuits, inter-circuit shorts and polarity
//! consistency.
//!
//! # Quick Start
//!
//! ```no_run
//! use v2g_audit::{AuditCore, AuditOptions};
//! use std::path::Path;
//!
//! let outcome = AuditCore::audit_files(
//!     Path::new("drawing.json"),
//!     Path::new("config.json"),
//!     Path::new("rules.json"),
//!     AuditOptions::default(),
//! ).unwrap();
//!
//! for result in &outcome.report.results {
//!     println!("{} @ {}: {}", result.function_name(), result.region, result.detail);
//! }
//! ```
//!
//! # Pipeline
//!
//! - **Geometry**: distances, orientation, segment intersection
//! - **Clustering**: greedy snapping of wire endpoints into junctions
//! - **Graph building**: junctions, symbols, text attachment, ground bonds
//! - **Verification**: region selection and topological predicates
//! - **Rules**: ordered rule list in, ordered results out

pub mod clustering;
pub mod config;
pub mod core;
pub mod geometry;
pub mod graph;
pub mod parser;
pub mod report;
pub mod rules;
pub mod symbols;
pub mod verify;

// Re-export main types
pub use crate::core::{AuditCore, AuditError, AuditOptions, AuditOutcome};
pub use config::AuditConfig;
pub use geometry::{Point, Segment};
pub use graph::{BuildTolerances, Edge, EdgeKind, Graph, GraphBuilder, GraphError, Node, NodeType};
pub use parser::Primitives;
pub use rules::{RuleEngine, RuleFunction, RuleReport, RuleSet, RuleSpec};
pub use symbols::{PatternResolver, SymbolLabel, SymbolPatterns, SymbolResolver};
pub use verify::{GspVerifier, Region, RuleResult};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        AuditConfig, AuditCore, AuditError, AuditOptions, AuditOutcome, Graph, GspVerifier,
        Primitives, RuleReport, RuleResult, RuleSpec,
    };
}
