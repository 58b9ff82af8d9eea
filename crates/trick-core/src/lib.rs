#![deny(warnings)]
pub mod model;

pub use model::card::Card;
pub use model::rank::Rank;
pub use model::seat::{Seat, Team};
pub use model::suit::Suit;
