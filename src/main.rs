//! Cue Sim entry point
//!
//! Runs a single break shot or a seeded batch of shots headlessly and prints
//! the report as JSON.

use anyhow::Result;
use clap::Parser;
use glam::DVec2;

use cue_sim::SimConfig;
use cue_sim::analysis::{BatchParams, ShotParams, run_batch, run_shot_on};
use cue_sim::consts::{DEFAULT_DT, DEFAULT_SHOT_DURATION};

#[derive(Parser, Debug)]
#[command(name = "cue-sim", about = "Headless billiard shot simulation")]
struct Args {
    /// Cue ball x velocity (m/s)
    #[arg(long, default_value_t = 5.0, allow_hyphen_values = true)]
    vx: f64,
    /// Cue ball y velocity (m/s)
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    vy: f64,
    /// Rolling friction coefficient (default: from config)
    #[arg(long)]
    friction: Option<f64>,
    /// Cushion restitution (default: from config)
    #[arg(long)]
    cushion: Option<f64>,
    /// Simulated seconds
    #[arg(long, default_value_t = DEFAULT_SHOT_DURATION)]
    time: f64,
    /// Timestep (s)
    #[arg(long, default_value_t = DEFAULT_DT)]
    dt: f64,
    /// JSON table/ball config
    #[arg(long)]
    config: Option<std::path::PathBuf>,
    /// Run this many random break shots instead of one
    #[arg(long)]
    batch: Option<usize>,
    /// Seed for --batch
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Indent the JSON output
    #[arg(long)]
    pretty: bool,
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    Ok(if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    })
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    log::info!("Cue Sim starting...");

    let config = match &args.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    let friction = args.friction.unwrap_or(config.table.rolling_friction);
    let cushion = args.cushion.unwrap_or(config.table.cushion_restitution);

    let output = if let Some(shots) = args.batch {
        let params = BatchParams {
            seed: args.seed,
            shots,
            friction,
            cushion_restitution: cushion,
            duration: args.time,
            dt: args.dt,
            ..BatchParams::default()
        };
        let report = run_batch(&params, &config)?;
        to_json(&report, args.pretty)?
    } else {
        let params = ShotParams {
            initial_velocity: DVec2::new(args.vx, args.vy),
            friction,
            cushion_restitution: cushion,
            duration: args.time,
            dt: args.dt,
        };
        let report = run_shot_on(&params, &config)?;
        let summary = report.summary();
        log::info!(
            "Pocketed {}/{} (cue: {}, eight: {})",
            summary.pocketed,
            summary.total_balls,
            summary.cue_pocketed,
            summary.eight_pocketed
        );
        to_json(&report, args.pretty)?
    };

    println!("{}", output);
    Ok(())
}
