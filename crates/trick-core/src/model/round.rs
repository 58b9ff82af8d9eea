use crate::model::card::Card;
use crate::model::deck::Deck;
use crate::model::hand::Hand;
use crate::model::rules::{PlayError, ResolvedPlay, resolve_play};
use crate::model::score::{ScoreBoard, TrickResult, score_trick};
use crate::model::seat::Seat;
use crate::model::trick::Trick;
use serde::{Deserialize, Serialize};

/// A trick that has been scored and moved out of play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedTrick {
    pub trick: Trick,
    pub result: TrickResult,
}

/// Hands, the trick in progress and the tallies of a single deal.
///
/// Every trick is led by the same seat: leadership never passes to the
/// previous trick's winner.
#[derive(Debug, Clone)]
pub struct RoundState {
    hands: [Hand; 4],
    current_trick: Trick,
    trick_history: Vec<CompletedTrick>,
    scores: ScoreBoard,
    leader: Seat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    Played(ResolvedPlay),
    TrickCompleted {
        play: ResolvedPlay,
        result: TrickResult,
    },
}

impl PlayOutcome {
    pub fn play(&self) -> ResolvedPlay {
        match self {
            PlayOutcome::Played(play) | PlayOutcome::TrickCompleted { play, .. } => *play,
        }
    }
}

impl RoundState {
    /// Shuffles a fresh deck with `rng` and deals 13 cards to each seat.
    pub fn deal<R: rand::Rng + ?Sized>(rng: &mut R, leader: Seat) -> Self {
        let deck = Deck::shuffled(rng);
        Self::from_hands(deck.deal(), leader)
    }

    pub fn from_hands(hands: [Hand; 4], leader: Seat) -> Self {
        Self {
            hands,
            current_trick: Trick::new(leader),
            trick_history: Vec::new(),
            scores: ScoreBoard::new(),
            leader,
        }
    }

    pub fn hand(&self, seat: Seat) -> &Hand {
        &self.hands[seat.index()]
    }

    pub fn current_trick(&self) -> &Trick {
        &self.current_trick
    }

    pub fn trick_history(&self) -> &[CompletedTrick] {
        &self.trick_history
    }

    pub fn tricks_completed(&self) -> usize {
        self.trick_history.len()
    }

    pub fn scores(&self) -> &ScoreBoard {
        &self.scores
    }

    pub fn leader(&self) -> Seat {
        self.leader
    }

    /// Seat whose turn it is in the current trick.
    pub fn next_to_play(&self) -> Seat {
        self.current_trick.expected_seat().unwrap_or(self.leader)
    }

    pub fn is_finished(&self) -> bool {
        self.hands.iter().all(Hand::is_empty)
    }

    /// Plays `card` for `seat`, applying follow-suit correction first.
    ///
    /// On error nothing changes. When the play fills the trick it is scored,
    /// archived, and a fresh trick is opened for the fixed leader.
    pub fn play_card(&mut self, seat: Seat, card: Card) -> Result<PlayOutcome, PlayError> {
        let play = resolve_play(&self.hands[seat.index()], &self.current_trick, seat, card)?;

        self.current_trick.play(seat, play.card)?;
        let removed = self.hands[seat.index()].remove(play.card);
        debug_assert!(removed, "resolved card must come from the seat's hand");

        if !self.current_trick.is_complete() {
            return Ok(PlayOutcome::Played(play));
        }

        let finished = std::mem::replace(&mut self.current_trick, Trick::new(self.leader));
        let result = score_trick(&finished).expect("complete trick always has a winner");
        self.scores.record(&result);
        self.trick_history.push(CompletedTrick {
            trick: finished,
            result,
        });
        Ok(PlayOutcome::TrickCompleted { play, result })
    }
}
