//! Match tallies across self-play games.

use std::time::Instant;
use tracing::info;

/// Outcome of a single finished game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    /// Moves played, chance moves included
    pub plies: u32,
    /// Final score per player
    pub score: Vec<f64>,
}

impl GameRecord {
    /// The player with the strictly highest score, if any.
    pub fn winner(&self) -> Option<usize> {
        let (best, &top) = self
            .score
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))?;
        let tied = self.score.iter().filter(|&&s| s == top).count();
        (tied == 1).then_some(best)
    }
}

/// Running win/draw counts for a match.
#[derive(Debug)]
pub struct MatchStats {
    game: String,
    games_played: u32,
    wins: Vec<u32>,
    draws: u32,
    total_plies: u64,
    start_time: Instant,
}

impl MatchStats {
    pub fn new(game: &str, players: usize) -> Self {
        Self {
            game: game.to_string(),
            games_played: 0,
            wins: vec![0; players],
            draws: 0,
            total_plies: 0,
            start_time: Instant::now(),
        }
    }

    pub fn record(&mut self, record: &GameRecord) {
        self.games_played += 1;
        self.total_plies += u64::from(record.plies);
        match record.winner() {
            Some(player) if player < self.wins.len() => self.wins[player] += 1,
            _ => self.draws += 1,
        }
    }

    pub fn games_played(&self) -> u32 {
        self.games_played
    }

    pub fn wins(&self) -> &[u32] {
        &self.wins
    }

    pub fn draws(&self) -> u32 {
        self.draws
    }

    pub fn avg_game_length(&self) -> f64 {
        if self.games_played == 0 {
            0.0
        } else {
            self.total_plies as f64 / self.games_played as f64
        }
    }

    /// Log the current tally.
    pub fn log_summary(&self) {
        info!(
            game = %self.game,
            games = self.games_played,
            wins = ?self.wins,
            draws = self.draws,
            avg_plies = format!("{:.1}", self.avg_game_length()),
            runtime_secs = format!("{:.2}", self.start_time.elapsed().as_secs_f64()),
            "Match tally"
        );
    }
}
