//! Symposium DST Simulator CLI
//!
//! Runs contention scenarios against the dining engine on a virtual
//! clock with seeded randomness. Exit code 0 means every scenario run
//! passed its oracle audits.

use clap::Parser;
use symposium_sim::scenarios::ScenarioId;
use symposium_sim::{ScenarioResult, ScenarioRunner};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Symposium Deterministic Simulation Testing CLI
#[derive(Parser, Debug)]
#[command(name = "symposium-sim")]
#[command(about = "Run deterministic contention scenarios for Symposium", long_about = None)]
struct Args {
    /// Master seed for deterministic delay draws (0 = derive from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Seats at the table for size-configurable scenarios
    #[arg(long, default_value = "5")]
    seats: usize,

    /// Servings per plate
    #[arg(long, default_value = "10")]
    servings: u32,

    /// Scenario to run (full_table, table_for_two, restart, resize, gauntlet, or "all")
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,

    /// Number of consecutive seeds to sweep (CI mode)
    #[arg(long, default_value = "1")]
    seeds: usize,

    /// Wall-clock deadline per course in seconds
    #[arg(short, long, default_value = "30")]
    deadline: f64,

    /// Verbose output (debug-level tracing)
    #[arg(short, long)]
    verbose: bool,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    if !args.json {
        info!("Symposium DST Simulator v0.1.0");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    // Parse scenarios
    let scenarios: Vec<ScenarioId> = if args.scenario == "all" {
        ScenarioId::all()
    } else {
        vec![args.scenario.parse().unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            eprintln!("Available scenarios: full_table, table_for_two, restart, resize, gauntlet, all");
            std::process::exit(1);
        })]
    };

    // Determine base seed
    let base_seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos() as u64
    } else {
        args.seed
    };

    // Track results
    let mut all_results: Vec<ScenarioResult> = Vec::new();
    let mut failed_count = 0;

    // Run simulations
    for seed_offset in 0..args.seeds {
        let seed = base_seed.wrapping_add(seed_offset as u64);

        let runner = ScenarioRunner::new(seed, args.seats)
            .with_servings(args.servings)
            .with_deadline(args.deadline);

        for scenario in &scenarios {
            let result = runner.run(*scenario);

            if !args.json {
                if result.passed {
                    info!("✓ {} (seed={}) PASSED", scenario.name(), seed);
                } else {
                    error!(
                        "✗ {} (seed={}) FAILED: {}",
                        scenario.name(),
                        seed,
                        result.failure_reason.as_deref().unwrap_or("unknown")
                    );
                }
            }

            if !result.passed {
                failed_count += 1;
            }

            all_results.push(result);
        }
    }

    // Summary
    let total = all_results.len();
    let passed = total - failed_count;

    if args.json {
        // JSON output for CI parsing
        let summary = serde_json::json!({
            "base_seed": base_seed,
            "total": total,
            "passed": passed,
            "failed": failed_count,
            "results": all_results.iter().map(|r| {
                serde_json::json!({
                    "scenario": r.scenario.name(),
                    "seed": r.seed,
                    "seats": r.seats,
                    "passed": r.passed,
                    "wall_ms": r.wall_ms,
                    "failure_reason": r.failure_reason,
                    "metrics": r.metrics,
                })
            }).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&summary).unwrap());
    } else {
        info!("");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        if failed_count == 0 {
            info!("✅ All {} scenario runs passed!", total);
        } else {
            error!("❌ {}/{} scenario runs failed!", failed_count, total);

            // List failed seeds
            for result in &all_results {
                if !result.passed {
                    error!(
                        "  - {} seed={}: {}",
                        result.scenario.name(),
                        result.seed,
                        result.failure_reason.as_deref().unwrap_or("unknown")
                    );
                }
            }
        }
    }

    // Exit with proper code for CI
    if failed_count > 0 {
        std::process::exit(1);
    }
}
