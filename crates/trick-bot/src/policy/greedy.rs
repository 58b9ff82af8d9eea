use super::{Policy, PolicyContext, PolicyKind, log_play_decision};
use rand::RngCore;
use trick_core::model::card::Card;

/// Always asks for the highest-ranked card in hand, suit ignored. Among equal
/// ranks the lowest identifier is chosen. Consumes no randomness.
#[derive(Debug, Clone, Copy, Default)]
pub struct HighestRankPolicy;

impl Policy for HighestRankPolicy {
    fn choose_play(&mut self, ctx: &PolicyContext, _rng: &mut dyn RngCore) -> Card {
        let card = ctx
            .hand
            .highest_rank()
            .expect("policy called with an empty hand");
        log_play_decision(ctx, self.kind(), card);
        card
    }

    fn kind(&self) -> PolicyKind {
        PolicyKind::Highest
    }
}

#[cfg(test)]
mod tests {
    use super::HighestRankPolicy;
    use crate::policy::{Policy, PolicyContext};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use trick_core::model::card::Card;
    use trick_core::model::hand::Hand;
    use trick_core::model::score::ScoreBoard;
    use trick_core::model::seat::Seat;
    use trick_core::model::trick::Trick;

    #[test]
    fn picks_highest_rank_first_by_identifier() {
        let hand = Hand::with_cards(
            ["3S", "KH", "KC", "9D"]
                .iter()
                .map(|c| c.parse::<Card>().unwrap())
                .collect(),
        );
        let trick = Trick::new(Seat::North);
        let scores = ScoreBoard::new();
        let ctx = PolicyContext {
            seat: Seat::North,
            hand: &hand,
            trick: &trick,
            scores: &scores,
        };
        let mut rng = StdRng::seed_from_u64(0);
        let card = HighestRankPolicy.choose_play(&ctx, &mut rng);
        assert_eq!(card, "KC".parse::<Card>().unwrap());
    }
}
