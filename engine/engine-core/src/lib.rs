//! Core contract between the search engine and game implementations
//!
//! This crate provides the fundamental abstractions for game simulation:
//! - `GameState`: the capability set a searchable state must expose
//! - `PlayerId`: acting-actor ids, negative for chance events
//! - `StateError`: contract violations reported by games
//! - Score helpers for the common win/loss/draw vectors

pub mod scoring;
pub mod state;

// Re-export main types for convenience
pub use scoring::{draw, outcome, win_for};
pub use state::{is_chance, GameState, PlayerId, StateError, CHANCE_PLAYER};
