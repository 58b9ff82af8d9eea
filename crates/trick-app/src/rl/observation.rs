use serde::{Deserialize, Serialize};
use trick_core::model::card::{Card, DECK_SIZE};
use trick_core::model::round::RoundState;
use trick_core::model::seat::{Seat, Team};

/// Total feature dimension produced by [`Observation::as_array`]
pub const FEATURE_DIM: usize = 52 + 52 + 4 + 1 + 4;

const TRICKS_PER_ROUND: f32 = 13.0;
const TENS_IN_DECK: f32 = 4.0;

/// What the agent sees between steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// Agent hand in ascending identifier order.
    pub hand: Vec<Card>,
    /// Plays already made in the trick the agent is about to act in.
    pub current_trick: Vec<(Seat, Card)>,
    pub trick_leader: Seat,
    /// Indexed by [`Team::index`].
    pub tricks_won: [u32; 2],
    /// Indexed by [`Team::index`].
    pub tens_won: [u32; 2],
    pub remaining_tricks: usize,
    pub current_player: Seat,
}

impl Observation {
    pub fn capture(round: &RoundState, current_player: Seat) -> Self {
        let trick = round.current_trick();
        let scores = round.scores();
        let hand = round.hand(Seat::AGENT);
        Self {
            hand: hand.cards().to_vec(),
            current_trick: trick.plays().iter().map(|p| (p.seat, p.card)).collect(),
            trick_leader: trick.leader(),
            tricks_won: scores.tricks_by_team(),
            tens_won: scores.tens_by_team(),
            remaining_tricks: hand.len(),
            current_player,
        }
    }

    pub fn tricks_won_by(&self, team: Team) -> u32 {
        self.tricks_won[team.index()]
    }

    pub fn tens_won_by(&self, team: Team) -> u32 {
        self.tens_won[team.index()]
    }

    /// Flatten observation into a single array for neural network input
    pub fn as_array(&self) -> [f32; FEATURE_DIM] {
        let mut arr = [0.0f32; FEATURE_DIM];
        let mut offset = 0;

        // Hand one-hot (52)
        for card in &self.hand {
            arr[offset + card.id() as usize] = 1.0;
        }
        offset += DECK_SIZE as usize;

        // Cards already on the table this trick (52)
        for (_, card) in &self.current_trick {
            arr[offset + card.id() as usize] = 1.0;
        }
        offset += DECK_SIZE as usize;

        // Tallies (4), normalised by what is available in a deal
        for team in Team::BOTH {
            arr[offset] = self.tricks_won_by(team) as f32 / TRICKS_PER_ROUND;
            arr[offset + 1] = self.tens_won_by(team) as f32 / TENS_IN_DECK;
            offset += 2;
        }

        // Remaining tricks (1)
        arr[offset] = self.remaining_tricks as f32 / TRICKS_PER_ROUND;
        offset += 1;

        // Current player one-hot (4)
        arr[offset + self.current_player.index()] = 1.0;
        offset += 4;

        debug_assert_eq!(offset, FEATURE_DIM);
        arr
    }
}

#[cfg(test)]
mod tests {
    use super::{FEATURE_DIM, Observation};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use trick_core::model::round::RoundState;
    use trick_core::model::seat::Seat;

    #[test]
    fn fresh_deal_observation() {
        let mut rng = StdRng::seed_from_u64(21);
        let round = RoundState::deal(&mut rng, Seat::North);
        let obs = Observation::capture(&round, Seat::North);

        assert_eq!(obs.hand.len(), 13);
        assert!(obs.hand.windows(2).all(|w| w[0] < w[1]));
        assert!(obs.current_trick.is_empty());
        assert_eq!(obs.trick_leader, Seat::North);
        assert_eq!(obs.tricks_won, [0, 0]);
        assert_eq!(obs.remaining_tricks, 13);
    }

    #[test]
    fn feature_array_marks_hand_cards() {
        let mut rng = StdRng::seed_from_u64(4);
        let round = RoundState::deal(&mut rng, Seat::North);
        let obs = Observation::capture(&round, Seat::North);
        let features = obs.as_array();

        assert_eq!(features.len(), FEATURE_DIM);
        let hand_bits: f32 = features[..52].iter().sum();
        assert_eq!(hand_bits, 13.0);
        for card in &obs.hand {
            assert_eq!(features[card.id() as usize], 1.0);
        }
        assert_eq!(features[52 + 52 + 4], 1.0);
        assert_eq!(features[FEATURE_DIM - 4], 1.0);
    }

    #[test]
    fn observation_serializes_cards_as_ids() {
        let mut rng = StdRng::seed_from_u64(8);
        let round = RoundState::deal(&mut rng, Seat::North);
        let obs = Observation::capture(&round, Seat::North);
        let json = serde_json::to_value(&obs).unwrap();

        let hand = json["hand"].as_array().unwrap();
        assert_eq!(hand.len(), 13);
        assert!(hand.iter().all(|v| v.as_u64().unwrap() < 52));
        assert_eq!(json["trick_leader"], 0);
        assert_eq!(json["remaining_tricks"], 13);

        let back: Observation = serde_json::from_value(json).unwrap();
        assert_eq!(back, obs);
    }
}
