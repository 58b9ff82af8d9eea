pub mod rl;

pub use rl::{
    CardGameEnv, EnvConfig, EnvError, EpisodePhase, EpisodeSummary, Observation, RewardFn,
    RewardMode, Step, StepInfo, run_episode,
};
