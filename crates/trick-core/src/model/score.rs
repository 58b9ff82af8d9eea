use crate::model::seat::{Seat, Team};
use crate::model::trick::Trick;
use serde::{Deserialize, Serialize};

/// Outcome of one completed trick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrickResult {
    pub winner: Seat,
    pub team: Team,
    /// Tens among all four cards; every one goes to the winning team.
    pub tens: u32,
}

/// Scores a full trick. Returns `None` while fewer than four cards are down.
pub fn score_trick(trick: &Trick) -> Option<TrickResult> {
    let winner = trick.winner()?;
    Some(TrickResult {
        winner,
        team: winner.team(),
        tens: trick.tens(),
    })
}

/// Per-team tallies for one episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreBoard {
    tricks_won: [u32; 2],
    tens_won: [u32; 2],
}

impl ScoreBoard {
    pub const fn new() -> Self {
        Self {
            tricks_won: [0; 2],
            tens_won: [0; 2],
        }
    }

    pub fn record(&mut self, result: &TrickResult) {
        let team = result.team.index();
        self.tricks_won[team] += 1;
        self.tens_won[team] += result.tens;
    }

    pub fn tricks_won(&self, team: Team) -> u32 {
        self.tricks_won[team.index()]
    }

    pub fn tens_won(&self, team: Team) -> u32 {
        self.tens_won[team.index()]
    }

    pub fn tricks_by_team(&self) -> [u32; 2] {
        self.tricks_won
    }

    pub fn tens_by_team(&self) -> [u32; 2] {
        self.tens_won
    }

    pub fn tricks_played(&self) -> u32 {
        self.tricks_won.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::{ScoreBoard, TrickResult, score_trick};
    use crate::model::card::Card;
    use crate::model::rank::Rank;
    use crate::model::seat::{Seat, Team};
    use crate::model::suit::Suit;
    use crate::model::trick::Trick;

    fn trick_of(cards: [Card; 4]) -> Trick {
        let mut trick = Trick::new(Seat::North);
        for (seat, card) in Seat::LOOP.into_iter().zip(cards) {
            trick.play(seat, card).unwrap();
        }
        trick
    }

    #[test]
    fn tens_go_to_the_winning_team() {
        let trick = trick_of([
            Card::new(Rank::Ten, Suit::Clubs),
            Card::new(Rank::Ten, Suit::Diamonds),
            Card::new(Rank::Jack, Suit::Clubs),
            Card::new(Rank::Ten, Suit::Spades),
        ]);
        let result = score_trick(&trick).unwrap();
        assert_eq!(
            result,
            TrickResult {
                winner: Seat::South,
                team: Team::NorthSouth,
                tens: 3,
            }
        );

        let mut board = ScoreBoard::new();
        board.record(&result);
        assert_eq!(board.tricks_won(Team::NorthSouth), 1);
        assert_eq!(board.tens_won(Team::NorthSouth), 3);
        assert_eq!(board.tricks_won(Team::EastWest), 0);
        assert_eq!(board.tens_won(Team::EastWest), 0);
    }

    #[test]
    fn winner_own_ten_counts() {
        let trick = trick_of([
            Card::new(Rank::Two, Suit::Hearts),
            Card::new(Rank::Ten, Suit::Hearts),
            Card::new(Rank::Three, Suit::Hearts),
            Card::new(Rank::Four, Suit::Hearts),
        ]);
        let result = score_trick(&trick).unwrap();
        assert_eq!(result.winner, Seat::East);
        assert_eq!(result.team, Team::EastWest);
        assert_eq!(result.tens, 1);
    }

    #[test]
    fn incomplete_trick_is_not_scored() {
        let mut trick = Trick::new(Seat::North);
        trick.play(Seat::North, Card::new(Rank::Ten, Suit::Clubs)).unwrap();
        assert_eq!(score_trick(&trick), None);
    }

    #[test]
    fn record_credits_the_winning_team() {
        let mut board = ScoreBoard::new();
        board.record(&TrickResult {
            winner: Seat::West,
            team: Team::EastWest,
            tens: 2,
        });
        assert_eq!(board.tricks_by_team(), [0, 1]);
        assert_eq!(board.tens_by_team(), [0, 2]);
        assert_eq!(board.tricks_played(), 1);
    }
}
