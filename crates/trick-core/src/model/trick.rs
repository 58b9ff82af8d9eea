use crate::model::card::Card;
use crate::model::seat::Seat;
use crate::model::suit::Suit;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SEATS_PER_TRICK: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trick {
    leader: Seat,
    plays: Vec<Play>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Play {
    pub seat: Seat,
    pub card: Card,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrickError {
    #[error("trick already complete")]
    TrickComplete,
    #[error("expected {expected} to play next but got {actual}")]
    OutOfTurn { expected: Seat, actual: Seat },
    #[error("{0} has already played this trick")]
    AlreadyPlayed(Seat),
}

impl Trick {
    pub fn new(leader: Seat) -> Self {
        Self {
            leader,
            plays: Vec::with_capacity(SEATS_PER_TRICK),
        }
    }

    pub fn leader(&self) -> Seat {
        self.leader
    }

    pub fn plays(&self) -> &[Play] {
        &self.plays
    }

    pub fn is_empty(&self) -> bool {
        self.plays.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.plays.len() == SEATS_PER_TRICK
    }

    pub fn lead_suit(&self) -> Option<Suit> {
        self.plays.first().map(|play| play.card.suit())
    }

    /// Seat that must play next, or `None` once the trick is full.
    pub fn expected_seat(&self) -> Option<Seat> {
        if self.is_complete() {
            return None;
        }
        Some(
            self.plays
                .last()
                .map(|play| play.seat.next())
                .unwrap_or(self.leader),
        )
    }

    /// Checks that `seat` may add a card now without changing the trick.
    pub fn check_turn(&self, seat: Seat) -> Result<(), TrickError> {
        let Some(expected) = self.expected_seat() else {
            return Err(TrickError::TrickComplete);
        };
        if self.plays.iter().any(|play| play.seat == seat) {
            return Err(TrickError::AlreadyPlayed(seat));
        }
        if expected != seat {
            return Err(TrickError::OutOfTurn {
                expected,
                actual: seat,
            });
        }
        Ok(())
    }

    pub fn play(&mut self, seat: Seat, card: Card) -> Result<(), TrickError> {
        self.check_turn(seat)?;
        self.plays.push(Play { seat, card });
        Ok(())
    }

    /// The first play holding the highest rank. Suit plays no part: there is
    /// no trump and the lead suit does not outrank the others.
    pub fn winning_play(&self) -> Option<Play> {
        if !self.is_complete() {
            return None;
        }
        self.plays.iter().copied().reduce(|best, play| {
            if play.card.rank() > best.card.rank() {
                play
            } else {
                best
            }
        })
    }

    pub fn winner(&self) -> Option<Seat> {
        self.winning_play().map(|play| play.seat)
    }

    pub fn tens(&self) -> u32 {
        self.plays.iter().filter(|play| play.card.is_ten()).count() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::{Trick, TrickError};
    use crate::model::card::Card;
    use crate::model::rank::Rank;
    use crate::model::seat::Seat;
    use crate::model::suit::Suit;

    fn full_trick(cards: [Card; 4]) -> Trick {
        let mut trick = Trick::new(Seat::North);
        for (seat, card) in Seat::LOOP.into_iter().zip(cards) {
            trick.play(seat, card).unwrap();
        }
        trick
    }

    #[test]
    fn plays_follow_turn_order() {
        let mut trick = Trick::new(Seat::North);
        assert!(trick.play(Seat::North, Card::new(Rank::Two, Suit::Clubs)).is_ok());
        assert!(matches!(
            trick.play(Seat::South, Card::new(Rank::Three, Suit::Clubs)),
            Err(TrickError::OutOfTurn { .. })
        ));
        assert_eq!(
            trick.play(Seat::North, Card::new(Rank::Four, Suit::Clubs)),
            Err(TrickError::AlreadyPlayed(Seat::North))
        );
    }

    #[test]
    fn full_trick_rejects_more_plays() {
        let mut trick = full_trick([
            Card::new(Rank::Two, Suit::Clubs),
            Card::new(Rank::Three, Suit::Clubs),
            Card::new(Rank::Four, Suit::Clubs),
            Card::new(Rank::Five, Suit::Clubs),
        ]);
        assert_eq!(trick.expected_seat(), None);
        assert_eq!(
            trick.play(Seat::North, Card::new(Rank::Six, Suit::Clubs)),
            Err(TrickError::TrickComplete)
        );
    }

    #[test]
    fn winner_is_highest_rank_regardless_of_suit() {
        let trick = full_trick([
            Card::new(Rank::Ten, Suit::Clubs),
            Card::new(Rank::Queen, Suit::Clubs),
            Card::new(Rank::Four, Suit::Clubs),
            Card::new(Rank::Ace, Suit::Spades),
        ]);
        assert_eq!(trick.winner(), Some(Seat::West));
        assert_eq!(trick.tens(), 1);
    }

    #[test]
    fn first_play_wins_equal_ranks() {
        let trick = full_trick([
            Card::new(Rank::Five, Suit::Hearts),
            Card::new(Rank::King, Suit::Diamonds),
            Card::new(Rank::King, Suit::Hearts),
            Card::new(Rank::King, Suit::Spades),
        ]);
        assert_eq!(trick.winner(), Some(Seat::East));
    }

    #[test]
    fn incomplete_trick_has_no_winner() {
        let mut trick = Trick::new(Seat::North);
        trick.play(Seat::North, Card::new(Rank::Ace, Suit::Clubs)).unwrap();
        assert_eq!(trick.winner(), None);
        assert_eq!(trick.lead_suit(), Some(Suit::Clubs));
    }
}
