use criterion::{black_box, criterion_group, criterion_main, Criterion};
use v2g_audit::prelude::*;
use v2g_audit::parser::{SymbolInstance, WirePrimitive};
use v2g_audit::{Point, RuleFunction, SymbolPatterns};

/// A ladder of `rungs` rungs: two rails joined every 10 units.
fn ladder(rungs: usize) -> Primitives {
    let mut prims = Primitives::default();
    for i in 0..rungs {
        let x = i as f64 * 10.0;
        prims.wires.push(WirePrimitive::new(Point::new(x, 0.0), Point::new(x + 10.0, 0.0)));
        prims.wires.push(WirePrimitive::new(Point::new(x, 20.0), Point::new(x + 10.0, 20.0)));
        prims.wires.push(WirePrimitive::new(Point::new(x, 0.0), Point::new(x, 20.0)));
        if i % 10 == 0 {
            prims.symbols.push(SymbolInstance::new("CT", Point::new(x + 5.0, 10.0)));
        }
    }
    prims.symbols.push(SymbolInstance::new("GND", Point::new(0.0, -1.0)));
    prims
}

fn config() -> AuditConfig {
    AuditConfig {
        symbols: vec![
            SymbolPatterns::new("GROUND", &["^gnd"]),
            SymbolPatterns::new("CT", &["^ct"]),
        ],
        ..Default::default()
    }
}

fn bench_audit(c: &mut Criterion) {
    let prims = ladder(100);
    let config = config();
    let rules: Vec<RuleSpec> = RuleFunction::ALL
        .iter()
        .map(|f| RuleSpec::new("All", f.name()))
        .collect();

    c.bench_function("audit_ladder_100", |b| {
        b.iter(|| AuditCore::audit(black_box(&prims), black_box(&config), black_box(&rules)));
    });
}

fn bench_verify(c: &mut Criterion) {
    let outcome = AuditCore::audit(&ladder(100), &config(), &[]).expect("ladder builds");
    let rules: Vec<RuleSpec> = RuleFunction::ALL
        .iter()
        .map(|f| RuleSpec::new("CT_secondary", f.name()))
        .collect();

    c.bench_function("verify_ladder_100", |b| {
        b.iter(|| AuditCore::verify_graph(black_box(&outcome.graph), black_box(&rules)));
    });
}

criterion_group!(benches, bench_audit, bench_verify);
criterion_main!(benches);
