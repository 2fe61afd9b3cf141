//! Self-play driver for the MCTS engine
//!
//! Plays engine-vs-engine matches of tic-tac-toe or connect four:
//! 1. Seats one MCTS engine per player
//! 2. Carries each engine's tree from move to move
//! 3. Optionally ponders on the opponent's turn
//! 4. Reports win/draw tallies

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use engine_core::GameState;
use mcts::{Heuristic, MctsConfig};
use tracing::{error, info};

mod arena;
mod config;
mod stats;

use crate::arena::Arena;
use crate::config::Config;
use crate::stats::MatchStats;

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    Ok(())
}

/// Play `config.games` games from `initial` and log the tally.
fn run_match<S: GameState>(
    config: &Config,
    mcts_config: &MctsConfig,
    initial: S,
    heuristic: Option<Arc<dyn Heuristic<S>>>,
) -> Result<MatchStats> {
    let players = initial.player_count();
    let mut arena = Arena::new(
        mcts_config,
        players,
        config.seed(),
        heuristic,
        config.ponder_enabled(),
    );
    let mut stats = MatchStats::new(&config.game, players);
    let log_interval = config.log_interval();

    for game in 1..=config.games {
        let record = match arena.play_game(initial.clone()) {
            Ok(record) => record,
            Err(e) => {
                error!("Game {} failed: {}", game, e);
                return Err(e);
            }
        };
        info!(
            game,
            plies = record.plies,
            winner = ?record.winner(),
            "Game completed"
        );
        stats.record(&record);

        if log_interval > 0 && game % log_interval == 0 {
            stats.log_summary();
        }
    }

    Ok(stats)
}

fn main() -> Result<()> {
    let config = Config::parse();
    config.validate()?;

    init_tracing(&config.log_level)?;
    info!(log_level = %config.log_level, "Tracing initialized");

    let mcts_config = config.mcts_config()?;
    info!(
        game = %config.game,
        games = config.games,
        iterations = mcts_config.iterations,
        time_budget_ms = mcts_config.time_budget.map(|d| d.as_millis() as u64),
        root_threads = mcts_config.root_threads,
        bounds = mcts_config.bounds,
        prove = mcts_config.prove,
        ponder = config.ponder_enabled(),
        seed = ?config.seed(),
        "Starting self-play"
    );

    let stats = match config.game.as_str() {
        "connect4" => {
            let heuristic = config.heuristic_enabled().then(|| {
                let h: Arc<dyn Heuristic<games_connect4::State>> =
                    Arc::new(games_connect4::column_preference);
                h
            });
            run_match(&config, &mcts_config, games_connect4::State::new(), heuristic)?
        }
        _ => run_match(&config, &mcts_config, games_tictactoe::State::new(), None)?,
    };

    stats.log_summary();
    info!(
        games = stats.games_played(),
        wins = ?stats.wins(),
        draws = stats.draws(),
        "Self-play finished"
    );
    Ok(())
}
