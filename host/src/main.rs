//! Symposium host - runs a dinner on the real clock.
//!
//! Seats a party of philosophers, starts the course, and prints a
//! status line every tick until every plate is empty or Ctrl+C asks
//! the table to wind down.

use anyhow::Result;
use clap::Parser;
use std::time::Duration;
use symposium_core::{DinnerConfig, DinnerService, Phase, Population, Table};
use symposium_env::{DinnerContext, TokioContext};
use tokio::signal;
use tokio::time::sleep;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Symposium dining host
#[derive(Parser, Debug)]
#[command(name = "symposium")]
#[command(about = "Host a dinner of philosophers on the real clock", long_about = None)]
struct Args {
    /// Seats at the table (clamped to 2..=10)
    #[arg(short = 'n', long, default_value = "5")]
    seats: usize,

    /// Pick the party size at random instead of --seats
    #[arg(long)]
    random_seats: bool,

    /// Servings on each plate
    #[arg(long, default_value = "10")]
    servings: u32,

    /// Use millisecond-scale delays instead of the classic second-scale ones
    #[arg(short, long)]
    quick: bool,

    /// Milliseconds between status lines
    #[arg(long, default_value = "500")]
    tick_ms: u64,

    /// Print the stop report as JSON
    #[arg(long)]
    json_report: bool,

    /// Verbose output (debug-level tracing)
    #[arg(short, long)]
    verbose: bool,
}

/// One glyph per seat: T thinking, 1/2 reaching, E eating.
fn status_line(table: &Table) -> String {
    let seats: Vec<&str> = table
        .philosophers()
        .iter()
        .map(|p| match p.phase() {
            Phase::Thinking => "T",
            Phase::ReachingForFirst => "1",
            Phase::ReachingForSecond => "2",
            Phase::Eating => "E",
        })
        .collect();
    let plates: Vec<String> = table
        .philosophers()
        .iter()
        .map(|p| p.meal().remaining().to_string())
        .collect();
    format!(
        "seats [{}] plates [{}] bites {}",
        seats.join(" "),
        plates.join(" "),
        table.total_bites()
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting default subscriber failed");

    let population = if args.random_seats {
        Population::random(&mut rand::thread_rng())
    } else {
        Population::new(args.seats)?
    };
    let config = if args.quick {
        DinnerConfig::quick()
    } else {
        DinnerConfig::default()
    }
    .with_servings(args.servings);

    let ctx = TokioContext::shared();
    let mut service = DinnerService::new(ctx.clone(), population, config);

    info!("seating {}", population);
    service.start()?;

    let tick = Duration::from_millis(args.tick_ms.max(1));
    loop {
        if service.table().is_course_finished() {
            info!("course finished: every plate is empty");
            break;
        }
        tokio::select! {
            _ = sleep(tick) => {
                info!("[{:>7.1}s] {}", ctx.now().as_secs_f64(), status_line(service.table()));
            }
            _ = signal::ctrl_c() => {
                info!("interrupt received, winding the table down");
                break;
            }
        }
    }

    let report = service.stop().await?;
    if args.json_report {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "finished {} | cancelled {} | stragglers {} | elapsed {:.1}s",
            report.finished.len(),
            report.cancelled.len(),
            report.stragglers.len(),
            report.elapsed.as_secs_f64()
        );
        for (seat, error) in &report.failures {
            println!("  {} failed: {}", seat, error);
        }
    }

    Ok(())
}
