//! GridWatch simulation CLI
//!
//! Builds a population, drives the tick loop and prints a summary of the
//! final published snapshot.

use clap::Parser;
use gridwatch_sim::{SimParams, SimulationEngine};
use gridwatch_core::EnvironmentModel;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// GridWatch leader-relative anomaly simulation
#[derive(Parser, Debug)]
#[command(name = "gridwatch-sim")]
#[command(about = "Run the GridWatch fleet simulation", long_about = None)]
struct Args {
    /// Master seed for determinism
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Number of unit entities to distribute
    #[arg(short, long, default_value = "90")]
    units: usize,

    /// Number of ticks to run back-to-back (0 = drive on the timer instead)
    #[arg(short, long, default_value = "24")]
    ticks: u64,

    /// Wall-clock duration in seconds when driving on the timer
    #[arg(short, long, default_value = "30")]
    duration: u64,

    /// Tick interval in milliseconds for timer mode
    #[arg(long, default_value = "5000")]
    interval_ms: u64,

    /// Authoritative-leader radius in km
    #[arg(long, default_value = "100")]
    radius_km: f64,

    /// Anomaly threshold fraction
    #[arg(long, default_value = "0.7")]
    threshold: f64,

    /// Transient fault probability per entity per tick
    #[arg(long, default_value = "0.15")]
    fault_prob: f64,

    /// Zero-based simulation month (0 = January)
    #[arg(long, default_value = "6")]
    month: u32,

    /// Hour of day at tick 0
    #[arg(long, default_value = "8")]
    start_hour: u32,

    /// Chain-hash time seed (0 = derive from wall clock)
    #[arg(long, default_value = "0")]
    time_seed: u64,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON summary output for CI parsing
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let time_seed = if args.time_seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    } else {
        args.time_seed
    };

    let params = SimParams {
        seed: args.seed,
        units_requested: args.units,
        tick_interval: Duration::from_millis(args.interval_ms),
        radius_km: args.radius_km,
        low_threshold: args.threshold,
        fault_probability: args.fault_prob,
        time_seed,
        environment: EnvironmentModel::new(args.month, args.start_hour),
        ..Default::default()
    };

    let engine = match SimulationEngine::new(params) {
        Ok(engine) => Arc::new(engine),
        Err(e) => {
            error!("population build failed: {e}");
            std::process::exit(1);
        }
    };

    if args.ticks > 0 {
        // Immediate mode: run the ticks back-to-back, no timer.
        for _ in 0..args.ticks {
            engine.tick();
        }
    } else {
        let handle = gridwatch_sim::spawn(engine.clone(), engine.tick_interval());
        tokio::time::sleep(Duration::from_secs(args.duration)).await;
        let executed = handle.stop().await;
        info!("timer mode finished: {executed} ticks in {}s", args.duration);
    }

    print_summary(&engine, args.json);
}

fn print_summary(engine: &SimulationEngine, json: bool) {
    let population = engine.current_population();
    let readings = engine.current_readings();
    let anomalies = engine.current_anomalies();

    let total_output: f64 = readings.values().map(|r| r.value).sum();
    let anomalous: Vec<&str> = anomalies
        .values()
        .filter(|s| s.is_anomalous)
        .map(|s| s.entity_id.as_str())
        .collect();

    if json {
        let summary = serde_json::json!({
            "ticks": engine.tick_count(),
            "leaders": population.leaders().count(),
            "units": population.units().count(),
            "total_output_kwh": total_output,
            "anomalous_units": anomalous,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).unwrap_or_default()
        );
    } else {
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        info!("  Ticks:         {}", engine.tick_count());
        info!(
            "  Roster:        {} leaders, {} units",
            population.leaders().count(),
            population.units().count()
        );
        info!("  Total output:  {total_output:.1} kWh");
        info!(
            "  Anomalous:     {}/{} units",
            anomalous.len(),
            population.units().count()
        );
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }
}
