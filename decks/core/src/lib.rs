//! Core traits and types for deck-sync deck abstraction.
//!
//! This crate provides:
//! - Feature traits (`HasKeyImages`, `HasBrightness`, etc.) that decks can implement
//! - The `Deck` trait with `as_*()` methods for feature discovery
//! - The `Transport` trait decks use to reach the hardware
//! - Common types like `DeckInfo`, `Brightness`, `ControlStates`

mod deck;
mod features;
mod transport;
mod utils;

pub use deck::{Deck, DeckInfo, ImageEncoding, KeyImageFormat, KeyLayout};
pub use features::{
    Brightness, ControlStates, DeckError, HasBrightness, HasControlStates, HasKeyImages, Result,
};
pub use transport::Transport;
pub use utils::extract_string;
