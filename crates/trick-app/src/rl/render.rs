use std::fmt::Write;
use trick_core::model::card::Card;
use trick_core::model::round::RoundState;
use trick_core::model::seat::{Seat, Team};

/// Human-readable table summary. Presentation only; nothing parses this.
pub fn render_round(round: &RoundState) -> String {
    let mut out = String::new();
    let sizes: Vec<usize> = Seat::LOOP.iter().map(|s| round.hand(*s).len()).collect();
    let scores = round.scores();

    let _ = writeln!(out, "Hand sizes: {sizes:?}");
    let _ = writeln!(
        out,
        "Tricks won: TeamA(0,2)={} TeamB(1,3)={}",
        scores.tricks_won(Team::NorthSouth),
        scores.tricks_won(Team::EastWest)
    );
    let _ = writeln!(
        out,
        "10s won:    TeamA(0,2)={} TeamB(1,3)={}",
        scores.tens_won(Team::NorthSouth),
        scores.tens_won(Team::EastWest)
    );

    let trick = round.current_trick();
    let plays = trick
        .plays()
        .iter()
        .map(|play| format!("{}:{}", play.seat, play.card))
        .collect::<Vec<_>>()
        .join(", ");
    let _ = writeln!(out, "Current trick (leader {}): {plays}", trick.leader());
    let _ = write!(out, "Agent hand: {}", join_cards(round.hand(Seat::AGENT).cards()));
    out
}

pub fn join_cards(cards: &[Card]) -> String {
    cards
        .iter()
        .map(Card::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::render_round;
    use trick_core::model::card::Card;
    use trick_core::model::hand::Hand;
    use trick_core::model::round::RoundState;
    use trick_core::model::seat::Seat;

    fn hand(cards: &[&str]) -> Hand {
        Hand::with_cards(cards.iter().map(|c| c.parse::<Card>().unwrap()).collect())
    }

    #[test]
    fn render_lists_sizes_tallies_and_trick() {
        let mut round = RoundState::from_hands(
            [hand(&["10C", "AS"]), hand(&["2C"]), hand(&["3H"]), hand(&["JC"])],
            Seat::North,
        );
        round.play_card(Seat::North, "AS".parse().unwrap()).unwrap();

        let text = render_round(&round);
        assert!(text.contains("Hand sizes: [1, 1, 1, 1]"));
        assert!(text.contains("TeamA(0,2)=0 TeamB(1,3)=0"));
        assert!(text.contains("Current trick (leader P0): P0:AS"));
        assert!(text.ends_with("Agent hand: 10C"));
    }
}
