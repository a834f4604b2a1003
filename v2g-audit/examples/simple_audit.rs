//! Example: build a graph and run rules without touching the filesystem.
//! Run with: cargo run --example simple_audit

use v2g_audit::parser::{SymbolInstance, TextAnnotation, WirePrimitive};
use v2g_audit::prelude::*;
use v2g_audit::{Point, SymbolPatterns};

fn main() -> Result<(), v2g_audit::AuditError> {
    let primitives = Primitives {
        wires: vec![
            WirePrimitive::new(Point::new(0.0, 0.0), Point::new(50.0, 0.0)),
            WirePrimitive::new(Point::new(50.0, 0.0), Point::new(50.0, 30.0)),
            WirePrimitive::new(Point::new(50.2, 30.1), Point::new(90.0, 30.0)),
        ],
        symbols: vec![
            SymbolInstance::new("GND_PE", Point::new(0.5, -0.5)),
            SymbolInstance::new("QF1", Point::new(90.0, 31.0)),
        ],
        texts: vec![TextAnnotation::new("L1", Point::new(25.0, 1.0))],
    };

    let config = AuditConfig {
        symbols: vec![
            SymbolPatterns::new("GROUND", &["^gnd"]),
            SymbolPatterns::new("BREAKER", &["^qf"]),
        ],
        ..Default::default()
    };

    let rules = vec![
        RuleSpec::new("All", "check_grounding_uniqueness"),
        RuleSpec::new("All", "check_open_circuit"),
    ];

    let outcome = AuditCore::audit(&primitives, &config, &rules)?;
    let stats = outcome.graph.stats();
    println!("{} nodes, {} edges", stats.node_count, stats.edge_count);
    println!("{}", v2g_audit::report::format_summary(&outcome.report));

    if !outcome.passed() {
        std::process::exit(1);
    }
    Ok(())
}
