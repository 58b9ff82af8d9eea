use std::path::PathBuf;

use clap::Parser;

use trick_bench::config::BenchmarkConfig;
use trick_bench::logging::{init_console_logging, init_logging};
use trick_bench::runner::EpisodeRunner;

/// Batch evaluation harness for trick-taking agents.
#[derive(Debug, Parser)]
#[command(
    name = "trick-bench",
    author,
    version,
    about = "Deterministic multi-episode evaluation harness"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/trick.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of episodes to play.
    #[arg(long, value_name = "EPISODES")]
    episodes: Option<usize>,

    /// Override the master seed episode seeds are drawn from.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Exit after validating the configuration (no episodes are played).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = BenchmarkConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }
    if let Some(episodes) = cli.episodes {
        config.episodes.count = episodes;
    }
    if let Some(seed) = cli.seed {
        config.episodes.seed = Some(seed);
    }
    config.validate()?;

    let outputs = config.resolved_outputs();
    let agent_count = config.agents.len();
    let run_id = config.run_id.clone();

    println!(
        "Loaded configuration '{run_id}' with {agent_count} agent{} ({} episodes, reward {})",
        if agent_count == 1 { "" } else { "s" },
        config.episodes.count,
        config.reward.as_str()
    );

    if cli.validate_only {
        println!("Validation-only mode: no episodes played.");
        return Ok(());
    }

    let logging_guard = init_logging(&config.logging, &outputs)?;
    if logging_guard.is_none() {
        init_console_logging();
    }

    let summary = EpisodeRunner::new(config, outputs).run()?;
    println!(
        "Run complete for '{run_id}': {} episodes × {} agents → {} rows at {}",
        summary.episodes_played,
        summary.agents,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    for agent in &summary.analytics.agents {
        println!(
            "  {:<16} avg reward {:+.3} (Δ {:+.3}, p={:.3})",
            agent.name,
            agent.avg_reward,
            agent.delta_vs_baseline,
            summary.analytics.p_value(&agent.name)
        );
    }
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(guard) = logging_guard.as_ref() {
        println!("Telemetry log: {}", guard.telemetry_path.display());
    }

    Ok(())
}
