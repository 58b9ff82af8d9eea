use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;
use trick_app::rl::RewardMode;
use trick_bot::policy::PolicyKind;
use trick_core::model::seat::Team;

use crate::config::BenchmarkConfig;
use crate::runner::AgentEpisode;

const CONFIDENCE_Z: f64 = 1.96; // 95% CI

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("baseline agent '{0}' not present in results")]
    MissingBaseline(String),
    #[error("agent '{0}' reported results but is missing from configuration")]
    UnknownAgent(String),
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Folds per-episode results into per-agent reports and paired comparisons
/// against the baseline agent.
pub struct AnalyticsCollector {
    baseline: String,
    reward: RewardMode,
    agents: HashMap<String, AgentAccumulator>,
    comparisons: HashMap<String, Vec<f64>>,
    agent_order: Vec<String>,
}

impl AnalyticsCollector {
    pub fn new(config: &BenchmarkConfig) -> Result<Self, AnalyticsError> {
        let baseline = config.metrics.baseline().to_string();
        if !config.agents.iter().any(|agent| agent.name == baseline) {
            return Err(AnalyticsError::MissingBaseline(baseline));
        }

        let mut agents = HashMap::new();
        let mut order = Vec::new();
        for agent in &config.agents {
            agents.insert(agent.name.clone(), AgentAccumulator::new(agent.policy));
            order.push(agent.name.clone());
        }

        Ok(Self {
            baseline,
            reward: config.reward,
            agents,
            comparisons: HashMap::new(),
            agent_order: order,
        })
    }

    /// Record every agent's result on one shared deal.
    pub fn record_episode(&mut self, results: &[AgentEpisode]) -> Result<(), AnalyticsError> {
        let baseline_reward = results
            .iter()
            .find(|r| r.agent == self.baseline)
            .map(|r| r.summary.total_reward as f64)
            .ok_or_else(|| AnalyticsError::MissingBaseline(self.baseline.clone()))?;

        for result in results {
            let acc = self
                .agents
                .get_mut(&result.agent)
                .ok_or_else(|| AnalyticsError::UnknownAgent(result.agent.clone()))?;
            acc.record(result);

            if result.agent != self.baseline {
                self.comparisons
                    .entry(result.agent.clone())
                    .or_default()
                    .push(result.summary.total_reward as f64 - baseline_reward);
            }
        }
        Ok(())
    }

    pub fn finalize(mut self) -> AnalyticsSummary {
        let mut agents = Vec::with_capacity(self.agent_order.len());
        for name in &self.agent_order {
            if let Some(acc) = self.agents.remove(name) {
                agents.push(acc.into_report(name.clone()));
            }
        }

        let comparisons = agents
            .iter()
            .map(|report| {
                let diffs = self.comparisons.remove(&report.name).unwrap_or_default();
                let (p_value, sample_size) = wilcoxon_signed_rank(diffs);
                ComparisonReport {
                    agent: report.name.clone(),
                    p_value,
                    sample_size,
                }
            })
            .collect();

        AnalyticsSummary {
            baseline: self.baseline,
            reward: self.reward,
            agents,
            comparisons,
        }
        .enrich()
    }
}

struct AgentAccumulator {
    policy: PolicyKind,
    rewards: Vec<f64>,
    team_wins: u32,
    tens: u32,
    corrections: u32,
}

impl AgentAccumulator {
    fn new(policy: PolicyKind) -> Self {
        Self {
            policy,
            rewards: Vec::new(),
            team_wins: 0,
            tens: 0,
            corrections: 0,
        }
    }

    fn record(&mut self, result: &AgentEpisode) {
        let summary = &result.summary;
        self.rewards.push(summary.total_reward as f64);
        if result.agent_team_won() {
            self.team_wins += 1;
        }
        self.tens += summary.tens_won[Team::AGENT.index()];
        self.corrections += summary.corrections;
    }

    fn into_report(self, name: String) -> AgentReport {
        let episodes = self.rewards.len();
        let per_episode = |total: u32| {
            if episodes == 0 {
                0.0
            } else {
                total as f64 / episodes as f64
            }
        };

        AgentReport {
            name,
            policy: self.policy,
            episodes,
            avg_reward: mean(&self.rewards),
            ci95: confidence_interval(&self.rewards),
            team_wins: self.team_wins as usize,
            avg_tens: per_episode(self.tens),
            avg_corrections: per_episode(self.corrections),
            delta_vs_baseline: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSummary {
    pub baseline: String,
    pub reward: RewardMode,
    pub agents: Vec<AgentReport>,
    pub comparisons: Vec<ComparisonReport>,
}

impl AnalyticsSummary {
    fn enrich(mut self) -> Self {
        let baseline_avg = self
            .agents
            .iter()
            .find(|agent| agent.name == self.baseline)
            .map(|agent| agent.avg_reward)
            .unwrap_or(0.0);
        for agent in &mut self.agents {
            agent.delta_vs_baseline = agent.avg_reward - baseline_avg;
        }
        self
    }

    pub fn agent(&self, name: &str) -> Option<&AgentReport> {
        self.agents.iter().find(|agent| agent.name == name)
    }

    pub fn p_value(&self, name: &str) -> f64 {
        self.comparisons
            .iter()
            .find(|c| c.agent == name)
            .map(|c| c.p_value)
            .unwrap_or(1.0)
    }

    pub fn to_markdown(&self) -> String {
        let mut rows = String::new();
        rows.push_str("# Evaluation Summary\n\n");
        rows.push_str(&format!(
            "Reward: {} | Baseline: {}\n\n",
            self.reward.as_str(),
            self.baseline
        ));
        rows.push_str("| Agent | Policy | Episodes | Avg reward | Δ vs baseline | 95% CI | Team win % | Avg 10s | Corrections/ep | p-value |\n");
        rows.push_str("|-------|--------|----------|------------|---------------|--------|------------|---------|----------------|---------|\n");

        for agent in &self.agents {
            let win_rate = if agent.episodes == 0 {
                0.0
            } else {
                agent.team_wins as f64 / agent.episodes as f64
            };
            rows.push_str(&format!(
                "| {name} | {policy} | {episodes} | {avg:.3} | {delta:+.3} | [{ci_low:.3}, {ci_high:.3}] | {win:.1}% | {tens:.2} | {corr:.2} | {pval:.3} |\n",
                name = agent.name,
                policy = agent.policy,
                episodes = agent.episodes,
                avg = agent.avg_reward,
                delta = agent.delta_vs_baseline,
                ci_low = agent.ci95.0,
                ci_high = agent.ci95.1,
                win = win_rate * 100.0,
                tens = agent.avg_tens,
                corr = agent.avg_corrections,
                pval = self.p_value(&agent.name),
            ));
        }
        rows
    }

    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        fs::write(path.as_ref(), self.to_markdown()).map_err(|source| AnalyticsError::Io {
            context: "writing summary markdown",
            source,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentReport {
    pub name: String,
    pub policy: PolicyKind,
    pub episodes: usize,
    pub avg_reward: f64,
    pub ci95: (f64, f64),
    /// Episodes in which the agent's partnership took the majority of tricks.
    pub team_wins: usize,
    /// Tens captured by the agent's partnership, per episode.
    pub avg_tens: f64,
    pub avg_corrections: f64,
    pub delta_vs_baseline: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub agent: String,
    pub p_value: f64,
    pub sample_size: usize,
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn confidence_interval(values: &[f64]) -> (f64, f64) {
    let mean = mean(values);
    if values.len() < 2 {
        return (mean, mean);
    }
    let variance = values
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / (values.len() as f64 - 1.0);
    let margin = CONFIDENCE_Z * (variance / values.len() as f64).sqrt();
    (mean - margin, mean + margin)
}

/// Two-sided Wilcoxon signed-rank test on paired differences, normal
/// approximation with tie correction. Returns `(p_value, non-zero pairs)`.
fn wilcoxon_signed_rank(diffs: Vec<f64>) -> (f64, usize) {
    let mut paired: Vec<(f64, bool)> = diffs
        .into_iter()
        .filter(|d| d.abs() > f64::EPSILON)
        .map(|d| (d.abs(), d > 0.0))
        .collect();
    let n = paired.len();
    if n == 0 {
        return (1.0, 0);
    }
    paired.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut w_plus = 0.0;
    let mut tie_adjustment = 0.0;
    let mut start = 0;
    while start < n {
        let mut end = start;
        while end + 1 < n && (paired[end + 1].0 - paired[start].0).abs() < 1e-12 {
            end += 1;
        }
        // Average rank over the tie group, ranks are 1-based.
        let rank = (start + end + 2) as f64 / 2.0;
        w_plus += rank * paired[start..=end].iter().filter(|(_, pos)| *pos).count() as f64;
        let ties = (end - start + 1) as f64;
        if ties > 1.0 {
            tie_adjustment += (ties.powi(3) - ties) / 48.0;
        }
        start = end + 1;
    }

    let n_f = n as f64;
    let total = n_f * (n_f + 1.0) / 2.0;
    let w = w_plus.min(total - w_plus);
    let mean_w = total / 2.0;
    let variance_w = n_f * (n_f + 1.0) * (2.0 * n_f + 1.0) / 24.0 - tie_adjustment;
    if variance_w <= 0.0 {
        return (1.0, n);
    }

    let z = (((w - mean_w).abs() - 0.5) / variance_w.sqrt()).max(0.0);
    let normal = Normal::new(0.0, 1.0).expect("standard normal parameters are valid");
    let p = 2.0 * (1.0 - normal.cdf(z));
    (p.clamp(0.0, 1.0), n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AgentConfig, BenchmarkConfig, EpisodeConfig, OutputsConfig};
    use trick_app::rl::EpisodeSummary;

    fn config() -> BenchmarkConfig {
        let mut cfg = BenchmarkConfig {
            run_id: "unit".into(),
            episodes: EpisodeConfig {
                seed: Some(1),
                count: 4,
            },
            agents: vec![
                AgentConfig {
                    name: "base".into(),
                    policy: PolicyKind::Random,
                },
                AgentConfig {
                    name: "greedy".into(),
                    policy: PolicyKind::Highest,
                },
            ],
            reward: RewardMode::TeamWin,
            outputs: OutputsConfig {
                jsonl: "out/rows.jsonl".into(),
                summary_md: "out/summary.md".into(),
            },
            metrics: Default::default(),
            logging: Default::default(),
        };
        cfg.validate().expect("valid");
        cfg
    }

    fn episode(agent: &str, policy: PolicyKind, tricks_a: u32, tens_a: u32) -> AgentEpisode {
        AgentEpisode {
            agent: agent.into(),
            policy,
            summary: EpisodeSummary {
                seed: 0,
                steps: 13,
                total_reward: tricks_a as f32 - (13 - tricks_a) as f32,
                tricks_won: [tricks_a, 13 - tricks_a],
                tens_won: [tens_a, 4 - tens_a],
                corrections: 2,
            },
        }
    }

    #[test]
    fn confidence_interval_brackets_mean() {
        let (low, high) = confidence_interval(&[1.0, 3.0, 5.0, 7.0]);
        assert!(low < 4.0 && 4.0 < high);
        assert_eq!(confidence_interval(&[2.5]), (2.5, 2.5));
        assert_eq!(confidence_interval(&[]), (0.0, 0.0));
    }

    #[test]
    fn wilcoxon_ignores_zero_differences() {
        assert_eq!(wilcoxon_signed_rank(vec![0.0, 0.0]), (1.0, 0));
    }

    #[test]
    fn wilcoxon_detects_consistent_shift() {
        let diffs: Vec<f64> = (1..=30).map(|i| i as f64).collect();
        let (p, n) = wilcoxon_signed_rank(diffs);
        assert_eq!(n, 30);
        assert!(p < 0.001, "p = {p}");

        let balanced: Vec<f64> = (1..=30)
            .map(|i| if i % 2 == 0 { i as f64 } else { -(i as f64) })
            .collect();
        let (p, _) = wilcoxon_signed_rank(balanced);
        assert!(p > 0.5, "p = {p}");
    }

    #[test]
    fn collector_reports_against_baseline() {
        let cfg = config();
        assert_eq!(cfg.metrics.baseline(), "base");
        let mut collector = AnalyticsCollector::new(&cfg).unwrap();
        for (base, greedy) in [(5, 9), (7, 10), (4, 8), (8, 8)] {
            collector
                .record_episode(&[
                    episode("base", PolicyKind::Random, base, 1),
                    episode("greedy", PolicyKind::Highest, greedy, 3),
                ])
                .unwrap();
        }
        let summary = collector.finalize();

        let base = summary.agent("base").unwrap();
        assert_eq!(base.episodes, 4);
        assert_eq!(base.team_wins, 2);
        assert_eq!(base.delta_vs_baseline, 0.0);
        assert_eq!(base.avg_corrections, 2.0);

        let greedy = summary.agent("greedy").unwrap();
        assert_eq!(greedy.team_wins, 4);
        assert_eq!(greedy.avg_tens, 3.0);
        assert!(greedy.delta_vs_baseline > 0.0);
        assert_eq!(summary.comparisons[1].sample_size, 3);
        assert_eq!(summary.p_value("base"), 1.0);

        let md = summary.to_markdown();
        assert!(md.starts_with("# Evaluation Summary"));
        assert!(md.contains("| greedy | highest | 4 |"));
    }

    #[test]
    fn unknown_agent_is_rejected() {
        let mut collector = AnalyticsCollector::new(&config()).unwrap();
        let err = collector
            .record_episode(&[
                episode("base", PolicyKind::Random, 7, 2),
                episode("ghost", PolicyKind::Random, 7, 2),
            ])
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::UnknownAgent(name) if name == "ghost"));
    }
}
