//! V2G audit CLI - schematic topology checks from the command line.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process;
use tracing::Level;
use v2g_audit::report::{format_result_line, write_reports};
use v2g_audit::{AuditCore, AuditOptions, Graph, RuleFunction, RuleReport, RuleSet};

#[derive(Parser)]
#[command(name = "v2g-audit")]
#[command(about = "One-line schematic topology audit tool", long_about = None)]
#[command(version)]
struct Cli {
    /// Log pipeline details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the connectivity graph from decoded primitives and run the rules
    Audit {
        /// Decoded drawing primitives (JSON)
        #[arg(long, value_name = "FILE")]
        primitives: PathBuf,

        /// Audit configuration (JSON)
        #[arg(long, value_name = "FILE")]
        config: PathBuf,

        /// Rule list (JSON)
        #[arg(long, value_name = "FILE")]
        rules: PathBuf,

        /// Directory for graph.json, report.json and report.txt
        #[arg(long, value_name = "DIR")]
        out: PathBuf,

        /// Override the endpoint snap tolerance
        #[arg(long)]
        tau: Option<f64>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,

        /// Exit with error code if any rule fails
        #[arg(long)]
        fail_on_failure: bool,
    },

    /// Re-run rules on a saved graph.json
    Verify {
        /// Saved graph (JSON)
        #[arg(long, value_name = "FILE")]
        graph: PathBuf,

        /// Rule list (JSON)
        #[arg(long, value_name = "FILE")]
        rules: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,

        /// Exit with error code if any rule fails
        #[arg(long)]
        fail_on_failure: bool,
    },

    /// Summarise a saved graph.json
    Inspect {
        /// Saved graph (JSON)
        #[arg(long, value_name = "FILE")]
        graph: PathBuf,
    },

    /// List available rule functions
    Rules,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output for CI/CD
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Audit {
            primitives,
            config,
            rules,
            out,
            tau,
            format,
            fail_on_failure,
        } => handle_audit(&primitives, &config, &rules, &out, tau, format, fail_on_failure),
        Commands::Verify {
            graph,
            rules,
            format,
            fail_on_failure,
        } => handle_verify(&graph, &rules, format, fail_on_failure),
        Commands::Inspect { graph } => handle_inspect(&graph),
        Commands::Rules => {
            handle_rules(cli.verbose);
            Ok(0)
        }
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    };

    process::exit(exit_code);
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn handle_audit(
    primitives: &Path,
    config: &Path,
    rules: &Path,
    out: &Path,
    tau: Option<f64>,
    format: OutputFormat,
    fail_on_failure: bool,
) -> anyhow::Result<i32> {
    let options = AuditOptions { tau_override: tau };
    let outcome = AuditCore::audit_files(primitives, config, rules, options)
        .with_context(|| format!("auditing {}", primitives.display()))?;
    let paths = write_reports(&outcome.graph, &outcome.report, out)
        .with_context(|| format!("writing reports to {}", out.display()))?;

    match format {
        OutputFormat::Human => {
            print_graph_line(&outcome.graph);
            output_human(&outcome.report);
            println!("\nReports written to {}", out.display());
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "graph": {
                    "nodes": outcome.graph.node_count(),
                    "edges": outcome.graph.edge_count(),
                },
                "results": outcome.report.results,
                "passed": outcome.passed(),
                "files": {
                    "graph": paths.graph.display().to_string(),
                    "report": paths.report.display().to_string(),
                    "summary": paths.summary.display().to_string(),
                },
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(exit_code(&outcome.report, fail_on_failure))
}

fn handle_verify(
    graph: &Path,
    rules: &Path,
    format: OutputFormat,
    fail_on_failure: bool,
) -> anyhow::Result<i32> {
    let graph = AuditCore::load_graph(graph)
        .with_context(|| format!("loading graph {}", graph.display()))?;
    let rules = RuleSet::from_path(rules)
        .with_context(|| format!("loading rules {}", rules.display()))?;
    let report = AuditCore::verify_graph(&graph, &rules.rules);

    match format {
        OutputFormat::Human => {
            print_graph_line(&graph);
            output_human(&report);
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(exit_code(&report, fail_on_failure))
}

fn exit_code(report: &RuleReport, fail_on_failure: bool) -> i32 {
    if fail_on_failure && !report.passed() {
        1
    } else {
        0
    }
}

fn print_graph_line(graph: &Graph) {
    println!(
        "\nGraph: {} nodes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );
}

fn output_human(report: &RuleReport) {
    println!("{}", "─".repeat(60));
    if report.results.is_empty() {
        println!("  No rules evaluated");
        return;
    }
    for result in &report.results {
        println!("  {}", format_result_line(result));
    }

    let total = report.results.len();
    println!("\n  Summary:");
    println!("    Passed: {}", total - report.failed_count());
    println!("    Failed: {}", report.failed_count());
}

fn handle_inspect(path: &Path) -> anyhow::Result<i32> {
    let graph = AuditCore::load_graph(path)
        .with_context(|| format!("loading graph {}", path.display()))?;
    let stats = graph.stats();

    println!("\nGraph: {}", path.display());
    println!("{}", "─".repeat(60));
    println!("  Nodes: {}", stats.node_count);
    for (node_type, count) in &stats.node_types {
        println!("    {:<14} {}", node_type, count);
    }
    println!("  Edges: {}", stats.edge_count);
    for (kind, count) in &stats.edge_kinds {
        println!("    {:<14} {}", kind, count);
    }

    match graph.nodes().iter().find(|n| !n.node_type.is_endpoint()) {
        Some(node) => {
            println!("\n  First symbol node:");
            println!("{}", serde_json::to_string_pretty(node)?);
        }
        None => println!("\n  No symbol nodes"),
    }

    Ok(0)
}

fn handle_rules(verbose: bool) {
    println!("Available rule functions:\n");

    for function in RuleFunction::ALL {
        println!("  {}", function.name());
        if verbose {
            println!("    {}", function.description());
        }
        println!();
    }
    println!("Regions: \"All\" or any other name for the CT neighbourhood");
}
