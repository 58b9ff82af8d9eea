mod greedy;
mod random;

pub use greedy::HighestRankPolicy;
pub use random::{FollowSuitRandomPolicy, UniformRandomPolicy};

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{Level, event};
use trick_core::model::card::Card;
use trick_core::model::hand::Hand;
use trick_core::model::score::ScoreBoard;
use trick_core::model::seat::Seat;
use trick_core::model::trick::Trick;

/// Context provided to policies for decision-making
pub struct PolicyContext<'a> {
    pub seat: Seat,
    pub hand: &'a Hand,
    pub trick: &'a Trick,
    pub scores: &'a ScoreBoard,
}

/// A card-picking strategy for one seat.
///
/// Randomness is always supplied by the caller so that one seeded generator
/// can drive a whole episode.
pub trait Policy: Send {
    /// Choose a card from `ctx.hand`. The hand is never empty when called.
    fn choose_play(&mut self, ctx: &PolicyContext, rng: &mut dyn RngCore) -> Card;

    fn kind(&self) -> PolicyKind;
}

/// Built-in policies selectable from configuration and the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Highest rank in hand, suit ignored.
    Highest,
    /// Uniformly random card from the whole hand.
    Random,
    /// Uniformly random lead-suit card when possible, otherwise any card.
    FollowSuitRandom,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 3] = [
        PolicyKind::Highest,
        PolicyKind::Random,
        PolicyKind::FollowSuitRandom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyKind::Highest => "highest",
            PolicyKind::Random => "random",
            PolicyKind::FollowSuitRandom => "follow_suit_random",
        }
    }

    pub fn build(self) -> Box<dyn Policy> {
        match self {
            PolicyKind::Highest => Box::new(HighestRankPolicy),
            PolicyKind::Random => Box::new(UniformRandomPolicy),
            PolicyKind::FollowSuitRandom => Box::new(FollowSuitRandomPolicy),
        }
    }
}

impl FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "highest" | "highest_rank" => Ok(PolicyKind::Highest),
            "random" | "uniform" => Ok(PolicyKind::Random),
            "follow_suit_random" | "follow_suit" | "opponent" => Ok(PolicyKind::FollowSuitRandom),
            _ => Err(format!("Unknown policy: {}", s)),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) fn log_play_decision(ctx: &PolicyContext, kind: PolicyKind, chosen: Card) {
    if !tracing::enabled!(Level::TRACE) {
        return;
    }

    let lead = ctx
        .trick
        .lead_suit()
        .map(|suit| suit.to_string())
        .unwrap_or_else(|| "-".to_string());
    event!(
        target: "trick_bot::play",
        Level::TRACE,
        seat = %ctx.seat,
        policy = kind.as_str(),
        hand_size = ctx.hand.len(),
        lead_suit = %lead,
        trick_cards = ctx.trick.plays().len(),
        chosen = %chosen,
    );
}

#[cfg(test)]
mod tests {
    use super::PolicyKind;

    #[test]
    fn policy_kind_from_str() {
        assert_eq!("highest".parse::<PolicyKind>().unwrap(), PolicyKind::Highest);
        assert_eq!("Random".parse::<PolicyKind>().unwrap(), PolicyKind::Random);
        assert_eq!(
            "follow_suit".parse::<PolicyKind>().unwrap(),
            PolicyKind::FollowSuitRandom
        );
        assert!("invalid".parse::<PolicyKind>().is_err());
    }

    #[test]
    fn build_reports_matching_kind() {
        for kind in PolicyKind::ALL {
            assert_eq!(kind.build().kind(), kind);
            assert_eq!(kind.as_str().parse::<PolicyKind>().unwrap(), kind);
        }
    }
}
