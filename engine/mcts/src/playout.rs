//! Simulation from a leaf to the end of the game.
//!
//! Playouts run on a private clone of the state and never touch the tree.
//! Chance steps draw by the chance weights; decision steps use the
//! configured [`PlayoutPolicy`], uniform random by default.

use engine_core::{is_chance, GameState, StateError};
use rand::Rng;
use rand_chacha::ChaCha20Rng;

use crate::selection::weighted_index;
use crate::tree::check_score;

/// Chooses moves for deciding players during a playout.
pub trait PlayoutPolicy<S: GameState>: Send + Sync {
    /// Index into `moves` (the legal moves of `state`, never empty).
    fn choose(&self, state: &S, moves: &[S::Move], rng: &mut ChaCha20Rng) -> usize;
}

/// Uniform random playouts.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformPlayout;

impl<S: GameState> PlayoutPolicy<S> for UniformPlayout {
    fn choose(&self, _state: &S, moves: &[S::Move], rng: &mut ChaCha20Rng) -> usize {
        rng.gen_range(0..moves.len())
    }
}

/// Play `state` out to a terminal position and return its score.
///
/// A state that is already terminal is scored directly. The outcome must
/// score every player of the starting position.
pub fn playout<S: GameState>(
    state: &S,
    policy: Option<&dyn PlayoutPolicy<S>>,
    rng: &mut ChaCha20Rng,
) -> Result<Vec<f64>, StateError> {
    let players = state.player_count();
    let mut state = state.clone();

    while !state.is_terminal() {
        let moves = state.legal_moves();
        if moves.is_empty() {
            return Err(StateError::Inconsistent(
                "non-terminal state has no legal moves".into(),
            ));
        }

        let index = if is_chance(state.acting_player()) {
            weighted_index(&state.chance_weights(), rng)
                .unwrap_or_else(|| rng.gen_range(0..moves.len()))
        } else {
            match policy {
                Some(policy) => policy.choose(&state, &moves, rng),
                None => rng.gen_range(0..moves.len()),
            }
        };

        let Some(mv) = moves.get(index) else {
            return Err(StateError::Inconsistent(format!(
                "playout picked move {index} of {}",
                moves.len()
            )));
        };
        state.apply_move(mv)?;
    }

    let score = state.terminal_score();
    check_score(&score, players)?;
    Ok(score)
}
