//! The state contract every game must satisfy to be searched.
//!
//! The search engine knows nothing about rules. It only clones states,
//! enumerates moves, applies them and reads scores at terminal positions.
//! Games implement [`GameState`] on their own state type; there is no base
//! class and no registry.

use std::fmt::Debug;

/// Identifier of the actor whose decision is pending.
///
/// Non-negative values are deciding players (`0..player_count`). Negative
/// values mark a chance actor, whose move is drawn from
/// [`GameState::chance_weights`] rather than chosen.
pub type PlayerId = i32;

/// Conventional id for the chance actor.
pub const CHANCE_PLAYER: PlayerId = -1;

/// Returns true if `player` denotes a chance actor.
#[inline]
pub fn is_chance(player: PlayerId) -> bool {
    player < 0
}

/// Errors a game reports when the engine breaks the contract.
///
/// These never happen with a conforming game and engine; the search treats
/// them as fatal.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StateError {
    #[error("Illegal move: {0}")]
    IllegalMove(String),

    #[error("Move applied to a finished game")]
    GameOver,

    #[error("Inconsistent state: {0}")]
    Inconsistent(String),
}

/// Capability set of a searchable game state.
///
/// # Contract
///
/// * `clone()` yields an independent deep copy.
/// * `==` holds exactly when two states are the same position.
/// * `legal_moves()` is finite, ordered, and empty only when terminal.
/// * `apply_move()` is only called with a move from `legal_moves()`.
/// * `terminal_score()` is only read when `is_terminal()`.
/// * `chance_weights()` is only read when the acting player is a chance
///   actor, and is parallel to `legal_moves()`.
///
/// # Example
///
/// ```rust
/// use engine_core::{GameState, PlayerId, StateError};
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Nim { stones: u8, to_move: PlayerId }
///
/// impl GameState for Nim {
///     type Move = u8;
///
///     fn legal_moves(&self) -> Vec<u8> {
///         (1..=self.stones.min(3)).collect()
///     }
///
///     fn apply_move(&mut self, mv: &u8) -> Result<PlayerId, StateError> {
///         if *mv == 0 || *mv > self.stones.min(3) {
///             return Err(StateError::IllegalMove(mv.to_string()));
///         }
///         self.stones -= mv;
///         self.to_move = 1 - self.to_move;
///         Ok(self.to_move)
///     }
///
///     fn is_terminal(&self) -> bool { self.stones == 0 }
///     fn acting_player(&self) -> PlayerId { self.to_move }
///     fn player_count(&self) -> usize { 2 }
///
///     fn terminal_score(&self) -> Vec<f64> {
///         // Whoever took the last stone won; the player to move lost.
///         engine_core::win_for((1 - self.to_move) as usize, 2)
///     }
/// }
/// ```
pub trait GameState: Clone + PartialEq + Send + 'static {
    /// Opaque move type. Ordering is only used for stable presentation.
    type Move: Clone + Eq + Ord + Debug + Send + Sync + 'static;

    /// Legal moves in a stable order.
    fn legal_moves(&self) -> Vec<Self::Move>;

    /// Apply `mv` in place and return the id of the next acting actor.
    fn apply_move(&mut self, mv: &Self::Move) -> Result<PlayerId, StateError>;

    /// Whether the game has ended.
    fn is_terminal(&self) -> bool;

    /// Id of the actor to move (negative for chance).
    fn acting_player(&self) -> PlayerId;

    /// Number of deciding players (at least 1).
    fn player_count(&self) -> usize;

    /// Per-player outcome. Only meaningful when terminal.
    fn terminal_score(&self) -> Vec<f64>;

    /// Positive weights parallel to `legal_moves()` for chance actors.
    ///
    /// Defaults to a uniform distribution.
    fn chance_weights(&self) -> Vec<f64> {
        vec![1.0; self.legal_moves().len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Coin {
        flipped: bool,
    }

    impl GameState for Coin {
        type Move = u8;

        fn legal_moves(&self) -> Vec<u8> {
            if self.flipped {
                Vec::new()
            } else {
                vec![0, 1]
            }
        }

        fn apply_move(&mut self, mv: &u8) -> Result<PlayerId, StateError> {
            if self.flipped {
                return Err(StateError::GameOver);
            }
            if *mv > 1 {
                return Err(StateError::IllegalMove(mv.to_string()));
            }
            self.flipped = true;
            Ok(0)
        }

        fn is_terminal(&self) -> bool {
            self.flipped
        }

        fn acting_player(&self) -> PlayerId {
            CHANCE_PLAYER
        }

        fn player_count(&self) -> usize {
            1
        }

        fn terminal_score(&self) -> Vec<f64> {
            vec![1.0]
        }
    }

    #[test]
    fn test_chance_id() {
        assert!(is_chance(CHANCE_PLAYER));
        assert!(is_chance(-7));
        assert!(!is_chance(0));
        assert!(!is_chance(3));
    }

    #[test]
    fn test_default_chance_weights_are_uniform() {
        let coin = Coin { flipped: false };
        assert_eq!(coin.chance_weights(), vec![1.0, 1.0]);
    }

    #[test]
    fn test_contract_errors() {
        let mut coin = Coin { flipped: false };
        assert_eq!(
            coin.apply_move(&5),
            Err(StateError::IllegalMove("5".to_string()))
        );
        assert_eq!(coin.apply_move(&1), Ok(0));
        assert!(coin.is_terminal());
        assert_eq!(coin.apply_move(&0), Err(StateError::GameOver));
    }
}
