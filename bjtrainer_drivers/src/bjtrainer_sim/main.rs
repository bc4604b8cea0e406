mod simulation;

use anyhow::Context;
use bjtrainer_drivers::{load_config, DEFAULT_CONFIG_PATH};
use clap::Parser;

#[derive(Debug, Parser)]
#[command(author, about, long_about = None)]
struct CommandLineArgs {
    /// The path of the config file
    #[arg(short, long, default_value_t = String::from(DEFAULT_CONFIG_PATH))]
    config: String,

    /// Rounds to play, 0 plays until the bankroll runs out
    #[arg(short, long)]
    rounds: Option<u64>,

    /// Seed for the shoe, for reproducible runs
    #[arg(short, long)]
    seed: Option<u64>,

    /// Pause between two engine calls in milliseconds
    #[arg(short, long)]
    interval_ms: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = CommandLineArgs::parse();

    let mut config = load_config(&args.config).context("cannot load config")?;
    if let Some(rounds) = args.rounds {
        config.simulator.rounds = rounds;
    }
    if args.seed.is_some() {
        config.simulator.seed = args.seed;
    }
    if let Some(interval_ms) = args.interval_ms {
        config.simulator.interval_ms = interval_ms;
    }
    log::debug!("{:#?}", config);

    let session = simulation::simulate(&config)?;
    println!("{}", session.summary());
    println!("{}", session.handler().report());
    Ok(())
}
