use crate::model::card::Card;
use crate::model::suit::Suit;

/// Cards held by one seat, kept in ascending identifier order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn new() -> Self {
        Self { cards: Vec::new() }
    }

    pub fn with_cards(cards: Vec<Card>) -> Self {
        let mut hand = Self { cards };
        hand.sort();
        hand.cards.dedup();
        hand
    }

    pub fn add(&mut self, card: Card) {
        if let Err(index) = self.cards.binary_search(&card) {
            self.cards.insert(index, card);
        }
    }

    pub fn remove(&mut self, card: Card) -> bool {
        match self.cards.binary_search(&card) {
            Ok(index) => {
                self.cards.remove(index);
                true
            }
            Err(_) => false,
        }
    }

    pub fn contains(&self, card: Card) -> bool {
        self.cards.binary_search(&card).is_ok()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn has_suit(&self, suit: Suit) -> bool {
        self.cards.iter().any(|card| card.suit() == suit)
    }

    pub fn cards_of_suit(&self, suit: Suit) -> impl Iterator<Item = Card> + '_ {
        self.cards.iter().copied().filter(move |card| card.suit() == suit)
    }

    /// Lowest-ranked card of `suit`, if any.
    pub fn lowest_of_suit(&self, suit: Suit) -> Option<Card> {
        self.cards_of_suit(suit).min_by_key(|card| card.rank())
    }

    /// Highest-ranked card regardless of suit; the first in identifier order wins ties.
    pub fn highest_rank(&self) -> Option<Card> {
        self.cards
            .iter()
            .copied()
            .reduce(|best, card| if card.rank() > best.rank() { card } else { best })
    }

    fn sort(&mut self) {
        self.cards.sort_unstable();
    }
}
