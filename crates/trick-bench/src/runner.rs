use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};
use trick_app::rl::{CardGameEnv, EnvConfig, EnvError, EpisodeSummary, run_episode};
use trick_bot::policy::{Policy, PolicyKind};
use trick_core::model::seat::Team;

use crate::analytics::{AnalyticsCollector, AnalyticsError, AnalyticsSummary};
use crate::config::{BenchmarkConfig, ResolvedOutputs};

/// Plays every configured agent on the same sequence of seeded deals.
pub struct EpisodeRunner {
    config: BenchmarkConfig,
    outputs: ResolvedOutputs,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub episodes_played: usize,
    pub agents: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub analytics: AnalyticsSummary,
}

/// One agent's result on one deal.
#[derive(Debug, Clone)]
pub struct AgentEpisode {
    pub agent: String,
    pub policy: PolicyKind,
    pub summary: EpisodeSummary,
}

impl AgentEpisode {
    pub fn agent_team_won(&self) -> bool {
        let tricks = self.summary.tricks_won;
        tricks[Team::AGENT.index()] > tricks[Team::AGENT.opponent().index()]
    }
}

/// One JSONL line.
#[derive(Debug, Serialize)]
struct EpisodeRow<'a> {
    run_id: &'a str,
    episode_index: usize,
    episode_seed: u64,
    agent: &'a str,
    policy: PolicyKind,
    reward_mode: &'static str,
    total_reward: f32,
    steps: u32,
    tricks_won: [u32; 2],
    tens_won: [u32; 2],
    team_won: bool,
    corrections: u32,
}

impl EpisodeRunner {
    pub fn new(config: BenchmarkConfig, outputs: ResolvedOutputs) -> Self {
        Self { config, outputs }
    }

    /// Execute every episode, streaming JSONL rows to disk, then write the
    /// markdown summary.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut analytics = AnalyticsCollector::new(&self.config)?;
        let mut policies: Vec<Box<dyn Policy>> = self
            .config
            .agents
            .iter()
            .map(|agent| agent.policy.build())
            .collect();
        let mut seeds = StdRng::seed_from_u64(self.config.episodes.seed.unwrap_or(0));
        let mut rows_written = 0usize;

        for episode_index in 0..self.config.episodes.count {
            let episode_seed = seeds.next_u64();
            let mut results = Vec::with_capacity(policies.len());

            for (agent, policy) in self.config.agents.iter().zip(policies.iter_mut()) {
                let summary = self.play_episode(episode_seed, policy.as_mut())?;
                let result = AgentEpisode {
                    agent: agent.name.clone(),
                    policy: agent.policy,
                    summary,
                };
                self.write_row(&mut writer, episode_index, &result)?;
                rows_written += 1;
                results.push(result);
            }

            analytics.record_episode(&results)?;
        }
        writer.flush()?;

        let summary = analytics.finalize();
        summary.write_markdown(&self.outputs.summary_md)?;

        event!(
            target: "trick_bench::episode",
            Level::INFO,
            run_id = %self.config.run_id,
            episodes = self.config.episodes.count,
            rows = rows_written,
            "run complete"
        );

        Ok(RunSummary {
            episodes_played: self.config.episodes.count,
            agents: self.config.agents.len(),
            rows_written,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            analytics: summary,
        })
    }

    fn play_episode(
        &self,
        episode_seed: u64,
        policy: &mut dyn Policy,
    ) -> Result<EpisodeSummary, RunnerError> {
        let mut env = CardGameEnv::from_config(
            episode_seed,
            EnvConfig {
                reward_mode: self.config.reward,
            },
        );
        let mut agent_rng = StdRng::seed_from_u64(episode_seed.wrapping_add(1));
        Ok(run_episode(&mut env, episode_seed, policy, &mut agent_rng)?)
    }

    fn write_row(
        &self,
        writer: &mut BufWriter<File>,
        episode_index: usize,
        result: &AgentEpisode,
    ) -> Result<(), RunnerError> {
        let summary = &result.summary;
        let row = EpisodeRow {
            run_id: &self.config.run_id,
            episode_index,
            episode_seed: summary.seed,
            agent: &result.agent,
            policy: result.policy,
            reward_mode: self.config.reward.as_str(),
            total_reward: summary.total_reward,
            steps: summary.steps,
            tricks_won: summary.tricks_won,
            tens_won: summary.tens_won,
            team_won: result.agent_team_won(),
            corrections: summary.corrections,
        };

        event!(
            target: "trick_bench::episode",
            Level::DEBUG,
            run_id = %self.config.run_id,
            episode_index = episode_index as u64,
            seed = summary.seed,
            agent = %result.agent,
            reward = summary.total_reward,
            team_won = row.team_won,
            "episode complete"
        );

        serde_json::to_writer(&mut *writer, &row)?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("episode failed: {0}")]
    Episode(#[from] EnvError),
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
}
