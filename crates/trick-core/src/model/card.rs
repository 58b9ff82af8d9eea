use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DECK_SIZE: u8 = 52;
const RANKS_PER_SUIT: u8 = 13;

/// A playing card identified by `suit * 13 + rank_index`.
///
/// The identifier is the canonical form: observations, actions and hand
/// ordering all use it, and it serializes as a bare integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Card(u8);

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self(encode(rank.index(), suit.index() as u8))
    }

    pub const fn from_id(id: u8) -> Option<Self> {
        if id < DECK_SIZE { Some(Self(id)) } else { None }
    }

    pub const fn id(self) -> u8 {
        self.0
    }

    pub const fn rank(self) -> Rank {
        match Rank::from_index(rank_of(self.0)) {
            Some(rank) => rank,
            None => unreachable!(),
        }
    }

    pub const fn suit(self) -> Suit {
        match Suit::from_index(suit_of(self.0) as usize) {
            Some(suit) => suit,
            None => unreachable!(),
        }
    }

    pub const fn is_ten(self) -> bool {
        self.rank().is_ten()
    }

    /// Every card in identifier order.
    pub fn all() -> impl Iterator<Item = Card> {
        (0..DECK_SIZE).map(Card)
    }
}

/// Suit index of a raw identifier.
pub const fn suit_of(id: u8) -> u8 {
    id / RANKS_PER_SUIT
}

/// Rank index of a raw identifier (0 is the Two, 12 the Ace).
pub const fn rank_of(id: u8) -> u8 {
    id % RANKS_PER_SUIT
}

pub const fn encode(rank: u8, suit: u8) -> u8 {
    suit * RANKS_PER_SUIT + rank
}

/// Splits an identifier into `(rank_index, suit_index)`.
pub const fn decode(id: u8) -> (u8, u8) {
    (rank_of(id), suit_of(id))
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CardParseError {
    #[error("card id {0} is outside 0..52")]
    OutOfRange(u8),
    #[error("unrecognised card '{0}'")]
    Unrecognised(String),
}

impl TryFrom<u8> for Card {
    type Error = CardParseError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Card::from_id(id).ok_or(CardParseError::OutOfRange(id))
    }
}

impl From<Card> for u8 {
    fn from(card: Card) -> Self {
        card.id()
    }
}

impl FromStr for Card {
    type Err = CardParseError;

    /// Accepts the display form (`10H`, `qs`) or a bare identifier (`51`).
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim();
        if let Ok(id) = text.parse::<u8>() {
            return Card::try_from(id);
        }
        let unrecognised = || CardParseError::Unrecognised(text.to_string());
        let mut chars = text.chars();
        let suit_symbol = chars.next_back().ok_or_else(unrecognised)?;
        let suit = Suit::from_symbol(suit_symbol).ok_or_else(unrecognised)?;
        let rank = Rank::from_symbol(chars.as_str()).ok_or_else(unrecognised)?;
        Ok(Card::new(rank, suit))
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank(), self.suit())
    }
}

#[cfg(test)]
mod tests {
    use super::{Card, CardParseError, decode, encode, rank_of, suit_of};
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    #[test]
    fn identifier_layout_matches_suit_blocks() {
        assert_eq!(Card::new(Rank::Two, Suit::Clubs).id(), 0);
        assert_eq!(Card::new(Rank::Ten, Suit::Clubs).id(), 8);
        assert_eq!(Card::new(Rank::Two, Suit::Diamonds).id(), 13);
        assert_eq!(Card::new(Rank::Ace, Suit::Spades).id(), 51);
        assert_eq!(suit_of(27), 2);
        assert_eq!(rank_of(27), 1);
    }

    #[test]
    fn encode_inverts_decode_for_every_id() {
        for id in 0..52u8 {
            let (rank, suit) = decode(id);
            assert_eq!(encode(rank, suit), id);
            let card = Card::from_id(id).unwrap();
            assert_eq!(Card::new(card.rank(), card.suit()), card);
        }
    }

    #[test]
    fn out_of_range_ids_are_rejected() {
        assert_eq!(Card::from_id(52), None);
        assert_eq!(Card::try_from(200), Err(CardParseError::OutOfRange(200)));
    }

    #[test]
    fn display_and_parse_agree() {
        let ten_hearts = Card::new(Rank::Ten, Suit::Hearts);
        assert_eq!(ten_hearts.to_string(), "10H");
        assert_eq!("10H".parse::<Card>().unwrap(), ten_hearts);
        assert_eq!("qs".parse::<Card>().unwrap(), Card::new(Rank::Queen, Suit::Spades));
        assert_eq!("51".parse::<Card>().unwrap(), Card::new(Rank::Ace, Suit::Spades));
        assert!("1H".parse::<Card>().is_err());
        assert!("".parse::<Card>().is_err());
    }

    #[test]
    fn serializes_as_bare_identifier() {
        let card = Card::new(Rank::Ace, Suit::Clubs);
        assert_eq!(serde_json::to_string(&card).unwrap(), "12");
        assert_eq!(serde_json::from_str::<Card>("12").unwrap(), card);
        assert!(serde_json::from_str::<Card>("52").is_err());
    }

    #[test]
    fn all_yields_each_card_once() {
        let ids: Vec<u8> = Card::all().map(Card::id).collect();
        assert_eq!(ids, (0..52).collect::<Vec<_>>());
        assert_eq!(Card::all().filter(|c| c.is_ten()).count(), 4);
    }
}
