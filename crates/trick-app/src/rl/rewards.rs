//! Per-trick reward strategies.
//!
//! The environment asks its [`RewardFn`] for a scalar every time a trick is
//! scored. Any `FnMut(Team) -> f32` closure works as a strategy, so callers
//! can shape rewards without touching the environment.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use trick_core::model::score::TrickResult;
use trick_core::model::seat::Team;

const DEFAULT_TEN_BONUS: f32 = 0.25;

/// Strategy turning a scored trick into a reward for the agent.
pub trait RewardFn: Send {
    fn trick_reward(&mut self, result: &TrickResult) -> f32;
}

impl<F> RewardFn for F
where
    F: FnMut(Team) -> f32 + Send,
{
    fn trick_reward(&mut self, result: &TrickResult) -> f32 {
        self(result.team)
    }
}

/// `+1.0` when the agent's team takes the trick, `-1.0` otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct TeamWinReward;

impl RewardFn for TeamWinReward {
    fn trick_reward(&mut self, result: &TrickResult) -> f32 {
        if result.team == Team::AGENT { 1.0 } else { -1.0 }
    }
}

/// Team-win reward plus `per_ten` for every ten in the trick, signed the same
/// way as the base reward.
#[derive(Debug, Clone, Copy)]
pub struct TensShapedReward {
    pub per_ten: f32,
}

impl Default for TensShapedReward {
    fn default() -> Self {
        Self {
            per_ten: DEFAULT_TEN_BONUS,
        }
    }
}

impl RewardFn for TensShapedReward {
    fn trick_reward(&mut self, result: &TrickResult) -> f32 {
        let base = TeamWinReward.trick_reward(result);
        base * (1.0 + self.per_ten * result.tens as f32)
    }
}

/// Serializable selection of a built-in strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RewardMode {
    #[default]
    TeamWin,
    TensShaped {
        #[serde(default = "default_ten_bonus")]
        per_ten: f32,
    },
}

fn default_ten_bonus() -> f32 {
    DEFAULT_TEN_BONUS
}

impl RewardMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RewardMode::TeamWin => "team_win",
            RewardMode::TensShaped { .. } => "tens_shaped",
        }
    }

    pub fn build(self) -> Box<dyn RewardFn> {
        match self {
            RewardMode::TeamWin => Box::new(TeamWinReward),
            RewardMode::TensShaped { per_ten } => Box::new(TensShapedReward { per_ten }),
        }
    }
}

impl FromStr for RewardMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "team_win" | "default" => Ok(RewardMode::TeamWin),
            "tens_shaped" | "tens" => Ok(RewardMode::TensShaped {
                per_ten: DEFAULT_TEN_BONUS,
            }),
            _ => Err(format!("Unknown reward mode: {}", s)),
        }
    }
}
