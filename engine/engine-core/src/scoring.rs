//! Score-vector helpers shared by board games.
//!
//! Terminal scores follow the 1.0 win / 0.0 loss / 0.5 draw convention.
//! The engine treats the values as opaque; these helpers only keep the
//! games from each re-deriving the same vectors.

/// Score awarded to the winner.
pub const WIN: f64 = 1.0;
/// Score awarded to a loser.
pub const LOSS: f64 = 0.0;
/// Score awarded to every player on a draw.
pub const DRAW: f64 = 0.5;

/// Score vector where `winner` wins and everyone else loses.
pub fn win_for(winner: usize, players: usize) -> Vec<f64> {
    let mut score = vec![LOSS; players];
    if let Some(slot) = score.get_mut(winner) {
        *slot = WIN;
    }
    score
}

/// Score vector for a drawn game.
pub fn draw(players: usize) -> Vec<f64> {
    vec![DRAW; players]
}

/// Score vector from an optional winner (`None` = draw).
pub fn outcome(winner: Option<usize>, players: usize) -> Vec<f64> {
    match winner {
        Some(player) => win_for(player, players),
        None => draw(players),
    }
}
