//! Configuration for the self-play driver
//!
//! Defaults come from the central config (config.toml plus `MCTS_*`
//! environment overrides). CLI arguments take highest priority.

use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::Parser;
use engine_config::{load_config, CentralConfig, SearchConfig};
use mcts::{FinalSelection, MctsConfig};
use once_cell::sync::Lazy;
use tracing::level_filters::LevelFilter;

// Load central config once at startup
static CENTRAL_CONFIG: Lazy<CentralConfig> = Lazy::new(load_config);

/// Games the driver knows how to play
pub const GAMES: &[&str] = &["tictactoe", "connect4"];

fn default_game() -> String {
    CENTRAL_CONFIG.common.game.clone()
}

fn default_games() -> u32 {
    CENTRAL_CONFIG.selfplay.games
}

fn default_iterations() -> u32 {
    CENTRAL_CONFIG.search.iterations
}

fn default_time_ms() -> u64 {
    CENTRAL_CONFIG.search.time_ms
}

fn default_threads() -> usize {
    CENTRAL_CONFIG.search.root_threads
}

fn default_log_level() -> String {
    CENTRAL_CONFIG.common.log_level.clone()
}

#[derive(Parser, Debug, Clone)]
#[command(name = "selfplay")]
#[command(about = "Engine-vs-engine self-play with Monte Carlo Tree Search")]
#[command(
    long_about = "Plays complete games between two MCTS engines, carrying each engine's
tree across moves, and reports win/draw tallies.

Configuration is loaded from config.toml with MCTS_<SECTION>_<KEY> environment
variable overrides. CLI arguments take highest priority."
)]
pub struct Config {
    /// Game to play (tictactoe, connect4)
    #[arg(long, default_value_t = default_game())]
    pub game: String,

    /// Number of games to play
    #[arg(long, default_value_t = default_games())]
    pub games: u32,

    /// Iterations per move (0 for no iteration budget)
    #[arg(long, default_value_t = default_iterations())]
    pub iterations: u32,

    /// Time budget per move in milliseconds (0 to disable)
    #[arg(long, default_value_t = default_time_ms())]
    pub time_ms: u64,

    /// Root-parallel search threads per engine
    #[arg(long, default_value_t = default_threads())]
    pub threads: usize,

    /// Search on the opponent's turn
    #[arg(long)]
    pub ponder: bool,

    /// Base seed for reproducible matches
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value_t = default_log_level())]
    pub log_level: String,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if !GAMES.contains(&self.game.as_str()) {
            return Err(anyhow!(
                "unknown game '{}', expected one of {}",
                self.game,
                GAMES.join(", ")
            ));
        }

        if self.iterations == 0 && self.time_ms == 0 {
            return Err(anyhow!(
                "either iterations or time_ms must be set, an unbounded search never returns"
            ));
        }

        if self.threads == 0 {
            return Err(anyhow!("threads must be at least 1"));
        }

        if self.log_level.parse::<LevelFilter>().is_err() {
            return Err(anyhow!(
                "invalid log level '{}', expected one of trace, debug, info, warn, error",
                self.log_level
            ));
        }

        Ok(())
    }

    /// Whether to ponder, from the flag or the central config.
    pub fn ponder_enabled(&self) -> bool {
        self.ponder || CENTRAL_CONFIG.selfplay.ponder
    }

    /// Whether to use the game's move heuristic.
    pub fn heuristic_enabled(&self) -> bool {
        CENTRAL_CONFIG.selfplay.heuristic
    }

    /// Log a tally every N games.
    pub fn log_interval(&self) -> u32 {
        CENTRAL_CONFIG.selfplay.log_interval
    }

    /// Base seed, falling back to the central config.
    pub fn seed(&self) -> Option<u64> {
        self.seed.or(CENTRAL_CONFIG.search.seed)
    }

    /// Search configuration for each engine.
    pub fn mcts_config(&self) -> Result<MctsConfig> {
        self.mcts_config_from(&CENTRAL_CONFIG.search)
    }

    /// Engine settings from a `[search]` section with this CLI's budgets on top.
    pub fn mcts_config_from(&self, search: &SearchConfig) -> Result<MctsConfig> {
        let final_selection: FinalSelection =
            search.final_selection.parse().map_err(|e: String| anyhow!(e))?;

        let mut config = MctsConfig::default()
            .with_iterations(self.iterations)
            .with_exploration(search.exploration_constant)
            .with_heuristic_weight(search.heuristic_weight)
            .with_prove(search.prove)
            .with_final_selection(final_selection)
            .with_root_threads(self.threads)
            .with_virtual_visits(search.virtual_visits)
            .with_max_nodes(search.max_nodes)
            .with_reuse_tree(search.reuse_tree);
        if search.bounds {
            config = config.with_bounds(search.optimistic_bias, search.pessimistic_bias);
        }
        if self.time_ms > 0 {
            config = config.with_time_budget(Duration::from_millis(self.time_ms));
        }

        config.validate().map_err(|e| anyhow!(e))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            game: "tictactoe".into(),
            games: 2,
            iterations: 100,
            time_ms: 0,
            threads: 1,
            ponder: false,
            seed: Some(7),
            log_level: "info".into(),
        }
    }

    #[test]
    fn validate_accepts_valid_config() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_unknown_game() {
        let mut config = base_config();
        config.game = "chess".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_unbounded_search() {
        let mut config = base_config();
        config.iterations = 0;
        assert!(config.validate().is_err());

        config.time_ms = 50;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_threads() {
        let mut config = base_config();
        config.threads = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut config = base_config();
        config.log_level = "verbose".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn mcts_config_applies_cli_budgets() {
        let mut config = base_config();
        config.time_ms = 250;
        config.threads = 3;

        let mcts = config.mcts_config_from(&SearchConfig::default()).unwrap();
        assert_eq!(mcts.iterations, 100);
        assert_eq!(mcts.time_budget, Some(Duration::from_millis(250)));
        assert_eq!(mcts.root_threads, 3);
        assert!(mcts.prove);
        assert!(!mcts.bounds);
        assert_eq!(mcts.final_selection, FinalSelection::RobustChild);
    }

    #[test]
    fn mcts_config_reads_search_section() {
        let search = SearchConfig {
            bounds: true,
            optimistic_bias: 0.25,
            pessimistic_bias: 0.5,
            final_selection: "max".into(),
            max_nodes: 1000,
            reuse_tree: false,
            ..SearchConfig::default()
        };

        let mcts = base_config().mcts_config_from(&search).unwrap();
        assert!(mcts.bounds);
        assert_eq!(mcts.optimistic_bias, 0.25);
        assert_eq!(mcts.pessimistic_bias, 0.5);
        assert_eq!(mcts.final_selection, FinalSelection::MaxChild);
        assert_eq!(mcts.max_nodes, 1000);
        assert!(!mcts.reuse_tree);
        assert_eq!(mcts.time_budget, None);
    }

    #[test]
    fn mcts_config_rejects_bad_selection() {
        let search = SearchConfig {
            final_selection: "best".into(),
            ..SearchConfig::default()
        };
        assert!(base_config().mcts_config_from(&search).is_err());
    }

    #[test]
    fn mcts_config_rejects_negative_exploration() {
        let search = SearchConfig {
            exploration_constant: -1.0,
            ..SearchConfig::default()
        };
        assert!(base_config().mcts_config_from(&search).is_err());
    }
}
