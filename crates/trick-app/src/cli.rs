use anyhow::Context;
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use trick_app::rl::{CardGameEnv, EnvConfig, EpisodeSummary, RewardMode, run_episode};
use trick_bot::policy::PolicyKind;
use tracing_subscriber::EnvFilter;

const DEFAULT_RANDOM_SEED: u64 = 123;

/// Play one deal of the partnership trick game with a scripted agent.
#[derive(Debug, Parser)]
#[command(name = "trickrl", author, version, about = "Partnership trick-taking RL environment")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Per-trick reward strategy (team_win, tens_shaped).
    #[arg(long, global = true, value_name = "MODE", default_value = "team_win")]
    reward: RewardMode,

    /// Bonus per captured ten; implies the tens_shaped reward.
    #[arg(long, global = true, value_name = "BONUS")]
    tens_bonus: Option<f32>,

    /// Print the final table state before the summary.
    #[arg(long, global = true)]
    render: bool,

    /// Emit the episode summary as JSON instead of text.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Agent always plays its highest-ranked card.
    Highest {
        /// Environment seed; a random one is drawn when omitted.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Agent plays a uniformly random card.
    Random {
        /// Environment seed.
        #[arg(long, default_value_t = DEFAULT_RANDOM_SEED)]
        seed: u64,

        /// Seed for the agent's own choices; defaults to the environment seed + 1.
        #[arg(long)]
        agent_seed: Option<u64>,
    },
}

pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let reward_mode = match cli.tens_bonus {
        Some(per_ten) => RewardMode::TensShaped { per_ten },
        None => cli.reward,
    };
    let config = EnvConfig { reward_mode };

    let (seed, agent_seed, kind) = match cli.command {
        Command::Highest { seed } => {
            let seed = seed.unwrap_or_else(rand::random);
            (seed, seed, PolicyKind::Highest)
        }
        Command::Random { seed, agent_seed } => (
            seed,
            agent_seed.unwrap_or(seed.wrapping_add(1)),
            PolicyKind::Random,
        ),
    };
    let mut policy = kind.build();

    let mut env = CardGameEnv::from_config(seed, config);
    let mut agent_rng = StdRng::seed_from_u64(agent_seed);
    let summary = run_episode(&mut env, seed, policy.as_mut(), &mut agent_rng)
        .with_context(|| format!("episode with seed {seed} failed"))?;

    if cli.render {
        println!("{}", env.render());
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary, kind.as_str(), reward_mode);
    }
    Ok(())
}

fn print_summary(summary: &EpisodeSummary, policy: &str, reward_mode: RewardMode) {
    println!(
        "Seed: {} | Agent: {policy} | Reward: {}",
        summary.seed,
        reward_mode.as_str()
    );
    println!("Game finished. Total reward: {}", summary.total_reward);
    println!(
        "Final tricks: TeamA(0,2)={} TeamB(1,3)={}",
        summary.tricks_won[0], summary.tricks_won[1]
    );
    println!(
        "10s won: TeamA(0,2)={} TeamB(1,3)={}",
        summary.tens_won[0], summary.tens_won[1]
    );
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // A subscriber may already be installed when embedded in a larger process.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
