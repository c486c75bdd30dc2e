use anyhow::Result;
use clap::Parser;
use potts_lib::app::{Runner, SeedCell};
use potts_lib::model::metrics::init_logging;
use potts_lib::model::SimulationConfig;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML config file; built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Monte Carlo steps to run
    #[arg(short, long, default_value_t = 10)]
    ticks: u64,

    /// RNG seed, overriding the config
    #[arg(long)]
    seed: Option<u64>,

    /// Single-voxel cell to place first, as population:x,y,z (repeatable)
    #[arg(long = "seed-cell")]
    seed_cells: Vec<SeedCell>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    match std::env::var("RUST_LOG") {
        Ok(filter) => tracing_subscriber::registry()
            .with(tracing_subscriber::EnvFilter::new(filter))
            .with(tracing_subscriber::fmt::layer())
            .init(),
        Err(_) => init_logging(),
    }

    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    if args.seed.is_some() {
        config.potts.seed = args.seed;
    }

    let mut runner = Runner::new(&config)?;
    runner.seed(&args.seed_cells)?;
    runner.run(args.ticks);

    println!("{}", serde_json::to_string_pretty(&runner.summary())?);
    Ok(())
}
