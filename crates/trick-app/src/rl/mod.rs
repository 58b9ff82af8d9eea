mod env;
pub mod driver;
pub mod observation;
pub mod render;
pub mod rewards;

pub use driver::{EpisodeSummary, run_episode};
pub use env::{CardGameEnv, EnvConfig, EnvError, EpisodePhase, Step, StepInfo};
pub use observation::{FEATURE_DIM, Observation};
pub use rewards::{RewardFn, RewardMode, TeamWinReward, TensShapedReward};
