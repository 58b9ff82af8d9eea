use crate::model::card::{Card, DECK_SIZE};
use crate::model::hand::Hand;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::array;

pub const HAND_SIZE: usize = 13;

#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// All 52 cards in identifier order.
    pub fn standard() -> Self {
        let cards = Card::all().collect::<Vec<_>>();
        debug_assert_eq!(cards.len(), DECK_SIZE as usize);
        Self { cards }
    }

    pub fn shuffled<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::standard();
        deck.shuffle_in_place(rng);
        deck
    }

    pub fn shuffled_with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::shuffled(&mut rng)
    }

    pub fn shuffle_in_place<R: rand::Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Splits the deck into four contiguous blocks of 13; seat `i` receives block `i`.
    pub fn deal(&self) -> [Hand; 4] {
        array::from_fn(|seat| {
            let block = self.cards[seat * HAND_SIZE..(seat + 1) * HAND_SIZE].to_vec();
            Hand::with_cards(block)
        })
    }
}
