use crate::rl::env::{CardGameEnv, EnvError};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use trick_bot::policy::{Policy, PolicyContext};
use trick_core::model::seat::Seat;

/// Totals for one finished episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub seed: u64,
    pub steps: u32,
    pub total_reward: f32,
    pub tricks_won: [u32; 2],
    pub tens_won: [u32; 2],
    /// Plays the rule enforcer rewrote to follow suit, all seats combined.
    pub corrections: u32,
}

/// Plays a fresh episode seeded with `seed`, asking `policy` for every agent
/// action. `agent_rng` feeds the policy only; the environment keeps its own
/// generator for the deal and the other seats.
pub fn run_episode(
    env: &mut CardGameEnv,
    seed: u64,
    policy: &mut dyn Policy,
    agent_rng: &mut dyn RngCore,
) -> Result<EpisodeSummary, EnvError> {
    env.reset(Some(seed));
    let mut steps = 0u32;
    let mut total_reward = 0.0f32;
    let mut corrections = 0u32;

    while !env.is_done() {
        let action = {
            let round = env.round();
            let ctx = PolicyContext {
                seat: Seat::AGENT,
                hand: round.hand(Seat::AGENT),
                trick: round.current_trick(),
                scores: round.scores(),
            };
            policy.choose_play(&ctx, agent_rng)
        };
        let step = env.step(action)?;
        steps += 1;
        total_reward += step.reward;
        corrections += step.info.corrected_seats().count() as u32;
        if step.terminated || step.truncated {
            break;
        }
    }

    let scores = env.scores();
    Ok(EpisodeSummary {
        seed,
        steps,
        total_reward,
        tricks_won: scores.tricks_by_team(),
        tens_won: scores.tens_by_team(),
        corrections,
    })
}
