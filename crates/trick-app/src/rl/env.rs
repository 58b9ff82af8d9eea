use crate::rl::observation::Observation;
use crate::rl::render::render_round;
use crate::rl::rewards::{RewardFn, RewardMode, TeamWinReward};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::{Level, event};
use trick_bot::policy::{FollowSuitRandomPolicy, Policy, PolicyContext};
use trick_core::model::card::Card;
use trick_core::model::hand::Hand;
use trick_core::model::round::{PlayOutcome, RoundState};
use trick_core::model::rules::{ResolvedPlay, legal_cards};
use trick_core::model::score::{ScoreBoard, TrickResult};
use trick_core::model::seat::Seat;

const AUTO_SEATS: [Seat; 3] = [Seat::East, Seat::South, Seat::West];

/// RL environment configuration
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnvConfig {
    pub reward_mode: RewardMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvError {
    #[error("invalid action: {0} is not in the agent's hand")]
    InvalidAction(Card),
    #[error("episode is done; call reset()")]
    EpisodeFinished,
}

/// Where the episode controller stands. Only `AwaitingAgentAction` and
/// `Terminal` are visible between calls; the other two exist while `step`
/// resolves a trick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EpisodePhase {
    AwaitingAgentAction,
    ResolvingTrick,
    TrickComplete,
    Terminal,
}

/// Single step result
#[derive(Debug, Clone)]
pub struct Step {
    pub obs: Observation,
    pub reward: f32,
    pub terminated: bool,
    /// Always false: episodes end only when the agent runs out of cards.
    pub truncated: bool,
    pub info: StepInfo,
}

/// Additional step information
#[derive(Debug, Clone, Serialize)]
pub struct StepInfo {
    /// Every play made during the step, in order, as recorded.
    pub plays: Vec<ResolvedPlay>,
    pub result: Option<TrickResult>,
    pub rounds_played: u32,
}

impl StepInfo {
    /// Seats whose requested card was replaced to follow suit.
    pub fn corrected_seats(&self) -> impl Iterator<Item = Seat> + '_ {
        self.plays.iter().filter(|p| p.corrected()).map(|p| p.seat)
    }
}

/// Single-deal partnership environment. The agent holds seat 0 and leads
/// every trick; seats 1-3 answer with [`FollowSuitRandomPolicy`]. One seeded
/// generator drives both the deal and the opponents.
pub struct CardGameEnv {
    rng: StdRng,
    round: RoundState,
    reward: Box<dyn RewardFn>,
    opponents: [Box<dyn Policy>; 3],
    current_player: Seat,
    phase: EpisodePhase,
    rounds_played: u32,
}

impl CardGameEnv {
    /// Create an environment with a reward strategy. Hands stay empty until
    /// the first [`reset`](Self::reset).
    pub fn new(seed: u64, reward: impl RewardFn + 'static) -> Self {
        Self::with_boxed_reward(seed, Box::new(reward))
    }

    pub fn with_default_reward(seed: u64) -> Self {
        Self::new(seed, TeamWinReward)
    }

    pub fn from_config(seed: u64, config: EnvConfig) -> Self {
        Self::with_boxed_reward(seed, config.reward_mode.build())
    }

    pub fn with_boxed_reward(seed: u64, reward: Box<dyn RewardFn>) -> Self {
        let empty = [Hand::new(), Hand::new(), Hand::new(), Hand::new()];
        Self {
            rng: StdRng::seed_from_u64(seed),
            round: RoundState::from_hands(empty, Seat::AGENT),
            reward,
            opponents: [
                Box::new(FollowSuitRandomPolicy),
                Box::new(FollowSuitRandomPolicy),
                Box::new(FollowSuitRandomPolicy),
            ],
            current_player: Seat::AGENT,
            phase: EpisodePhase::AwaitingAgentAction,
            rounds_played: 0,
        }
    }

    /// Deal a new episode. A seed restarts the generator; without one the
    /// generator continues from where it stood.
    pub fn reset(&mut self, seed: Option<u64>) -> Observation {
        if let Some(seed) = seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
        self.round = RoundState::deal(&mut self.rng, Seat::AGENT);
        self.current_player = Seat::AGENT;
        self.phase = EpisodePhase::AwaitingAgentAction;
        self.rounds_played = 0;

        event!(
            target: "trick_app::env",
            Level::DEBUG,
            seed = ?seed,
            agent_hand = %crate::rl::render::join_cards(self.round.hand(Seat::AGENT).cards()),
            "episode reset"
        );
        self.observation()
    }

    /// Play `action` for the agent, let the other three seats answer, and
    /// score the trick. Fails without changing anything when the episode is
    /// over or the card is not in the agent's hand.
    pub fn step(&mut self, action: Card) -> Result<Step, EnvError> {
        if self.is_done() {
            return Err(EnvError::EpisodeFinished);
        }
        if !self.round.hand(Seat::AGENT).contains(action) {
            return Err(EnvError::InvalidAction(action));
        }

        self.phase = EpisodePhase::ResolvingTrick;
        let mut plays = Vec::with_capacity(4);
        let mut completed = self.apply(Seat::AGENT, action, &mut plays);

        for (slot, seat) in AUTO_SEATS.into_iter().enumerate() {
            if self.round.hand(seat).is_empty() {
                continue;
            }
            let card = {
                let ctx = PolicyContext {
                    seat,
                    hand: self.round.hand(seat),
                    trick: self.round.current_trick(),
                    scores: self.round.scores(),
                };
                self.opponents[slot].choose_play(&ctx, &mut self.rng)
            };
            if let Some(result) = self.apply(seat, card, &mut plays) {
                completed = Some(result);
            }
        }

        let mut reward = 0.0;
        if let Some(result) = completed.as_ref() {
            self.phase = EpisodePhase::TrickComplete;
            reward = self.reward.trick_reward(result);
            self.rounds_played += 1;
            self.current_player = self.round.leader();

            event!(
                target: "trick_app::env",
                Level::DEBUG,
                round = self.rounds_played,
                winner = %result.winner,
                team = result.team.index(),
                tens = result.tens,
                reward,
                "trick scored"
            );
        }

        self.phase = if self.round.hand(Seat::AGENT).is_empty() {
            EpisodePhase::Terminal
        } else {
            EpisodePhase::AwaitingAgentAction
        };
        if self.is_done() {
            let scores = self.round.scores();
            event!(
                target: "trick_app::env",
                Level::INFO,
                rounds = self.rounds_played,
                tricks = ?scores.tricks_by_team(),
                tens = ?scores.tens_by_team(),
                "episode finished"
            );
        }

        Ok(Step {
            obs: self.observation(),
            reward,
            terminated: self.is_done(),
            truncated: false,
            info: StepInfo {
                plays,
                result: completed,
                rounds_played: self.rounds_played,
            },
        })
    }

    /// Commits one play. The agent's card was checked by `step` and the
    /// other seats choose from their own hands in turn order, so the round
    /// cannot reject it.
    fn apply(
        &mut self,
        seat: Seat,
        card: Card,
        plays: &mut Vec<ResolvedPlay>,
    ) -> Option<TrickResult> {
        let outcome = self
            .round
            .play_card(seat, card)
            .expect("held card played in turn order is always accepted");
        plays.push(outcome.play());
        self.current_player = seat.next();
        match outcome {
            PlayOutcome::Played(_) => None,
            PlayOutcome::TrickCompleted { result, .. } => Some(result),
        }
    }

    pub fn observation(&self) -> Observation {
        Observation::capture(&self.round, self.current_player)
    }

    /// Cards the agent may submit without correction. The agent always
    /// leads, so that is the whole hand.
    pub fn legal_actions(&self) -> Vec<Card> {
        if self.is_done() {
            return Vec::new();
        }
        legal_cards(self.round.hand(Seat::AGENT), self.round.current_trick())
    }

    /// Between calls this is only ever `AwaitingAgentAction` or `Terminal`;
    /// `ResolvingTrick` and `TrickComplete` are held while `step` runs.
    pub fn phase(&self) -> EpisodePhase {
        self.phase
    }

    pub fn is_done(&self) -> bool {
        matches!(self.phase, EpisodePhase::Terminal)
    }

    pub fn rounds_played(&self) -> u32 {
        self.rounds_played
    }

    pub fn scores(&self) -> &ScoreBoard {
        self.round.scores()
    }

    pub fn round(&self) -> &RoundState {
        &self.round
    }

    pub fn render(&self) -> String {
        render_round(&self.round)
    }
}

impl fmt::Display for CardGameEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::{CardGameEnv, EnvError, EpisodePhase};
    use crate::rl::rewards::RewardMode;
    use trick_core::model::card::Card;
    use trick_core::model::seat::{Seat, Team};

    fn assert_send<T: Send>() {}

    #[test]
    fn env_can_move_across_threads() {
        assert_send::<CardGameEnv>();
        let mut env = CardGameEnv::from_config(
            13,
            super::EnvConfig {
                reward_mode: RewardMode::TensShaped { per_ten: 0.5 },
            },
        );
        let obs = std::thread::spawn(move || env.reset(None))
            .join()
            .expect("reset on worker thread");
        assert_eq!(obs.hand.len(), 13);
    }

    #[test]
    fn step_fails_only_with_the_two_caller_errors() {
        let mut env = CardGameEnv::with_default_reward(21);
        let obs = env.reset(None);
        let missing = Card::all().find(|c| !obs.hand.contains(c)).unwrap();
        let mut errors = vec![env.step(missing).unwrap_err()];
        while !env.is_done() {
            let action = env.legal_actions()[0];
            env.step(action).unwrap();
        }
        errors.push(env.step(obs.hand[0]).unwrap_err());

        for err in errors {
            match err {
                EnvError::InvalidAction(card) => assert_eq!(card, missing),
                EnvError::EpisodeFinished => assert_eq!(env.phase(), EpisodePhase::Terminal),
            }
        }
    }

    #[test]
    fn unreset_env_rejects_every_action() {
        let mut env = CardGameEnv::with_default_reward(1);
        let card = Card::from_id(0).unwrap();
        assert_eq!(env.step(card).unwrap_err(), EnvError::InvalidAction(card));
        assert!(env.legal_actions().is_empty());
    }

    #[test]
    fn step_plays_a_full_trick() {
        let mut env = CardGameEnv::with_default_reward(3);
        let obs = env.reset(None);
        let action = obs.hand[0];
        let step = env.step(action).unwrap();

        assert_eq!(step.info.plays.len(), 4);
        assert_eq!(step.info.plays[0].card, action);
        assert!(step.info.result.is_some());
        assert!(step.reward == 1.0 || step.reward == -1.0);
        assert!(!step.terminated);
        assert!(!step.truncated);
        assert!(step.obs.current_trick.is_empty());
        assert_eq!(step.obs.remaining_tricks, 12);
        assert_eq!(step.obs.current_player, Seat::North);
        assert_eq!(env.phase(), EpisodePhase::AwaitingAgentAction);
        for seat in Seat::LOOP {
            assert_eq!(env.round().hand(seat).len(), 12);
        }
    }

    #[test]
    fn invalid_action_changes_nothing() {
        let mut env = CardGameEnv::with_default_reward(9);
        let obs = env.reset(None);
        let missing = Card::all().find(|c| !obs.hand.contains(c)).unwrap();
        assert_eq!(env.step(missing).unwrap_err(), EnvError::InvalidAction(missing));
        assert_eq!(env.observation(), obs);
        assert_eq!(env.rounds_played(), 0);
    }

    #[test]
    fn custom_reward_closure_is_used() {
        let reward = |team: Team| -> f32 {
            if team == Team::EastWest { 10.0 } else { 0.5 }
        };
        let mut env = CardGameEnv::new(5, reward);
        env.reset(None);
        let mut total = 0.0;
        while !env.is_done() {
            let action = env.legal_actions()[0];
            total += env.step(action).unwrap().reward;
        }
        let scores = env.scores();
        let expected = scores.tricks_won(Team::EastWest) as f32 * 10.0
            + scores.tricks_won(Team::NorthSouth) as f32 * 0.5;
        assert_eq!(total, expected);
    }
}
