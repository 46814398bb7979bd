//! TFM Engine - rules engine for a Mars terraforming board game
//!
//! Games live in a [`game::GameRepository`] and change only through the
//! operations in [`actions`]. Each operation validates against the live
//! state and then mutates it under the game's lock; the resulting
//! [`events`] are published once the lock is released, where passive card
//! effects pick them up.

pub mod actions;
pub mod core;
pub mod error;
pub mod events;
pub mod game;
pub mod loader;

pub use error::{EngineError, Result};
