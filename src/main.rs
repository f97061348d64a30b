use anyhow::{Context, Result};
use clap::Parser;
use secretion_core::{init_logging, SimError};
use secretion_lib::model::config::AppConfig;
use secretion_lib::model::recorder::Recorder;
use secretion_lib::model::world::Simulation;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom config file path; defaults are used if it does not exist
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Number of ticks to simulate (overrides `run.ticks`)
    #[arg(short, long)]
    ticks: Option<u64>,

    /// Seed for the run (overrides `run.seed`)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Where to write the per-frame statistics
    #[arg(short, long, default_value = "frames.jsonl")]
    output: PathBuf,
}

fn load_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "Config file not found, using defaults");
        return Ok(AppConfig::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    AppConfig::from_toml(&content).with_context(|| format!("parsing {}", path.display()))
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let mut config = load_config(&args.config)?;
    if let Some(seed) = args.seed {
        config.run.seed = Some(seed);
    }
    let ticks = args.ticks.unwrap_or(config.run.ticks);

    let mut sim = Simulation::new(config)?;
    let mut recorder = Recorder::create(&args.output)?;
    tracing::info!(ticks, seed = sim.seed(), output = %args.output.display(), "Running simulation");

    if let Err(e) = sim.run(ticks, &mut recorder) {
        let fatal = e
            .downcast_ref::<SimError>()
            .is_some_and(SimError::is_fatal_inconsistency);
        tracing::error!(tick = sim.tick, fatal, "Simulation stopped: {e:#}");
        return Err(e);
    }

    let stats = sim.stats();
    tracing::info!(
        ticks = sim.tick,
        secretions = stats.total_secretions,
        frames = recorder.frames(),
        metrics = ?sim.metrics.snapshot(),
        "Run finished"
    );
    Ok(())
}
