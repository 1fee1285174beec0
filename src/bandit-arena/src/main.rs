//! Bandit Arena: headless runner for the k-armed bandit simulation.
//!
//! Generates one reward table, simulates the automated strategies, replays
//! the manual pulls given on the command line and prints the run summary as
//! JSON.

use anyhow::Context;
use arena_core::config::AppConfig;
use arena_rl_engine::SimulationOrchestrator;
use clap::Parser;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "bandit-arena")]
#[command(about = "Compare bandit strategies against a manual player on a shared reward table")]
#[command(version)]
struct Cli {
    /// Number of arms (overrides config)
    #[arg(long, env = "BANDIT_ARENA__SIMULATION__ARM_COUNT")]
    arms: Option<usize>,

    /// Trial horizon per strategy (overrides config)
    #[arg(long, env = "BANDIT_ARENA__SIMULATION__TRY_COUNT")]
    tries: Option<usize>,

    /// Reward distribution: bernoulli or gaussian (overrides config)
    #[arg(long, env = "BANDIT_ARENA__SIMULATION__DISTRIBUTION")]
    distribution: Option<String>,

    /// RNG seed for a reproducible run (overrides config)
    #[arg(long, env = "BANDIT_ARENA__SIMULATION__SEED")]
    seed: Option<u64>,

    /// Comma-separated arm indices pulled by the manual player, in order
    #[arg(long, value_delimiter = ',')]
    pulls: Vec<usize>,

    /// Pretty-print the JSON summary
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bandit_arena=info,arena_rl_engine=info".into()),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    // Load configuration
    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    // Apply CLI overrides
    if let Some(arms) = cli.arms {
        config.simulation.arm_count = arms;
    }
    if let Some(tries) = cli.tries {
        config.simulation.try_count = tries;
    }
    if let Some(distribution) = cli.distribution {
        config.simulation.distribution = distribution;
    }
    if let Some(seed) = cli.seed {
        config.simulation.seed = Some(seed);
    }

    info!(
        arms = config.simulation.arm_count,
        tries = config.simulation.try_count,
        distribution = %config.simulation.distribution,
        seed = ?config.simulation.seed,
        "Configuration loaded"
    );

    let mut orchestrator = SimulationOrchestrator::new(&config);
    orchestrator
        .start_run(
            config.simulation.arm_count,
            config.simulation.try_count,
            &config.simulation.distribution,
        )
        .context("failed to start simulation run")?;

    for &arm in &cli.pulls {
        match orchestrator.pull(arm)? {
            Some(outcome) => info!(
                arm,
                timestep = outcome.timestep,
                reward = outcome.reward,
                "Manual pull"
            ),
            None => {
                warn!(arm, "Manual horizon reached, ignoring remaining pulls");
                break;
            }
        }
    }

    let summary = orchestrator
        .summary()
        .context("simulation run is not active")?;
    if let Some(winners) = orchestrator.winners() {
        info!(?winners, "Winner declared");
    }

    let output = if cli.pretty {
        serde_json::to_string_pretty(&summary)?
    } else {
        serde_json::to_string(&summary)?
    };
    println!("{output}");

    Ok(())
}
