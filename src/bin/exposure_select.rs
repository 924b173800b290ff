//! Exposure Selection Binary
//!
//! Loads the input tables, selects influencers within the budget, prints
//! the selection report as JSON on stdout and optionally writes the
//! chosen ids as a `user_id` table.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `COSTS_PATH`, `HATERS_PATH`, `FRIENDSHIPS_PATH`: input tables
//!   (default: `costs.csv`, `haters.csv`, `friendships.csv`)
//! - `BUDGET`: selection budget (default: 1500)
//! - `PROPAGATION_PROBABILITY`, `PENALTY_WEIGHT`, `MAX_ROUNDS`: diffusion
//!   (default: 0.2, 1.0, unset)
//! - `TRIALS`, `MAX_ITERATIONS`, `RESTARTS`, `SEEDED_PASSES`, `SEED`: search
//!   (default: 200, 1000, 2, true, 42)
//! - `OUTPUT_PATH`: where to write the selected ids (default: unset)
//! - `RUST_LOG`: Log level filter (default: info)
//! - `LOG_FORMAT`: "json" for structured logs, "pretty" for development (default: json)
//!
//! ## Usage
//!
//! ```bash
//! BUDGET=1500 OUTPUT_PATH=selected.csv cargo run --release --bin exposure_select
//! ```

use std::fs::File;
use std::io::BufWriter;
use std::process::ExitCode;
use std::time::Instant;

use tracing::{error, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use exposure_kernel::{
    write_selection_csv, GraphSnapshot, GreedySelector, RunConfig, SelectionReport,
};

/// Initialize the tracing subscriber with JSON or pretty format.
///
/// Logs go to stderr so stdout carries only the report.
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "exposure_select=info,exposure_kernel=info".into());

    if log_format == "pretty" {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE)
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_current_span(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .flatten_event(true)
            )
            .init();
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = RunConfig::from_env()?;
    info!(
        budget = config.budget,
        propagation_probability = config.diffusion.propagation_probability,
        penalty_weight = config.diffusion.penalty_weight,
        trials = config.search.trials_per_evaluation,
        restarts = config.search.restarts,
        seeded_passes = config.search.seeded_passes,
        seed = config.search.seed,
        "Starting exposure selection"
    );

    let started = Instant::now();
    let graph = config.table_paths().load()?;
    let snapshot = GraphSnapshot::compute(&graph);
    info!(
        snapshot_id = %snapshot.snapshot_id,
        nodes = snapshot.node_count,
        edges = snapshot.edge_count,
        influencers = snapshot.influencer_count,
        haters = snapshot.hater_count,
        "Graph snapshot computed"
    );

    let selector = GreedySelector::new(&graph, config.diffusion.clone(), config.search.clone());
    let selection = selector.select(config.budget)?;
    let report = SelectionReport::new(selection, &selector, &snapshot);

    if let Some(path) = &config.output_path {
        let file = File::create(path)?;
        write_selection_csv(BufWriter::new(file), &report.selected)?;
        info!(path = %path.display(), selected = report.selected.len(), "Selection written");
    }

    println!("{}", report.to_json_pretty()?);
    info!(
        fingerprint = %report.fingerprint,
        score = report.score(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Done"
    );
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Selection failed");
            ExitCode::FAILURE
        }
    }
}
