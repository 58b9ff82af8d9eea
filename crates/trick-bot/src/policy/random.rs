use super::{Policy, PolicyContext, PolicyKind, log_play_decision};
use rand::RngCore;
use rand::seq::SliceRandom;
use trick_core::model::card::Card;
use trick_core::model::rules::legal_cards;

/// Seat policy used for the three non-agent seats: a uniformly random
/// lead-suit card when one is held, otherwise a uniformly random card.
#[derive(Debug, Clone, Copy, Default)]
pub struct FollowSuitRandomPolicy;

impl Policy for FollowSuitRandomPolicy {
    fn choose_play(&mut self, ctx: &PolicyContext, rng: &mut dyn RngCore) -> Card {
        let pool = legal_cards(ctx.hand, ctx.trick);
        let card = *pool.choose(rng).expect("policy called with an empty hand");
        log_play_decision(ctx, self.kind(), card);
        card
    }

    fn kind(&self) -> PolicyKind {
        PolicyKind::FollowSuitRandom
    }
}

/// Uniformly random card from the whole hand, ignoring the lead suit.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformRandomPolicy;

impl Policy for UniformRandomPolicy {
    fn choose_play(&mut self, ctx: &PolicyContext, rng: &mut dyn RngCore) -> Card {
        let card = *ctx
            .hand
            .cards()
            .choose(rng)
            .expect("policy called with an empty hand");
        log_play_decision(ctx, self.kind(), card);
        card
    }

    fn kind(&self) -> PolicyKind {
        PolicyKind::Random
    }
}
