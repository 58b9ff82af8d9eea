//! Follow-suit enforcement.
//!
//! A seat that holds a card of the lead suit must play one. Rather than
//! rejecting an off-suit request, the enforcer substitutes the lowest-ranked
//! lead-suit card from the seat's hand. The substitution is decided before
//! anything is committed, so callers apply a single, already-legal play.

use crate::model::card::Card;
use crate::model::hand::Hand;
use crate::model::seat::Seat;
use crate::model::trick::{Trick, TrickError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{Level, event};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayError {
    #[error("{seat} does not hold {card}")]
    CardNotInHand { seat: Seat, card: Card },
    #[error(transparent)]
    Trick(#[from] TrickError),
}

/// The play that will actually be recorded for a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPlay {
    pub seat: Seat,
    pub requested: Card,
    pub card: Card,
}

impl ResolvedPlay {
    /// Whether the enforcer replaced the requested card.
    pub fn corrected(&self) -> bool {
        self.requested != self.card
    }
}

/// Decides which card `seat` plays into `trick` when it asks for `requested`.
pub fn resolve_play(
    hand: &Hand,
    trick: &Trick,
    seat: Seat,
    requested: Card,
) -> Result<ResolvedPlay, PlayError> {
    if !hand.contains(requested) {
        return Err(PlayError::CardNotInHand {
            seat,
            card: requested,
        });
    }
    trick.check_turn(seat)?;

    let card = match trick.lead_suit() {
        Some(lead) if requested.suit() != lead => hand.lowest_of_suit(lead).unwrap_or(requested),
        _ => requested,
    };

    let resolved = ResolvedPlay {
        seat,
        requested,
        card,
    };
    if resolved.corrected() {
        event!(
            target: "trick_core::rules",
            Level::DEBUG,
            seat = %seat,
            requested = %requested,
            played = %card,
            "off-suit play replaced with lowest lead-suit card"
        );
    }
    Ok(resolved)
}

/// Cards `seat` may play without triggering a correction.
pub fn legal_cards(hand: &Hand, trick: &Trick) -> Vec<Card> {
    match trick.lead_suit() {
        Some(lead) if hand.has_suit(lead) => hand.cards_of_suit(lead).collect(),
        _ => hand.cards().to_vec(),
    }
}
