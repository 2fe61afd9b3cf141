//! Configuration loading logic.
//!
//! Handles loading config from files and applying environment variable overrides.

use crate::CentralConfig;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Standard locations to search for config.toml
pub const CONFIG_SEARCH_PATHS: &[&str] = &[
    "config.toml",    // Current directory
    "../config.toml", // Parent directory (when running from a crate directory)
];

/// Load the central configuration from config.toml.
///
/// Searches for config.toml in the following order:
/// 1. Path specified by the MCTS_CONFIG environment variable
/// 2. Current directory (config.toml)
/// 3. Parent directory (../config.toml)
///
/// After loading, environment variable overrides are applied.
pub fn load_config() -> CentralConfig {
    if let Ok(path) = std::env::var("MCTS_CONFIG") {
        let path = PathBuf::from(&path);
        if path.exists() {
            info!("Loading config from MCTS_CONFIG: {}", path.display());
            return load_from_path(&path);
        }
        warn!(
            "MCTS_CONFIG={} not found, searching defaults",
            path.display()
        );
    }

    for path_str in CONFIG_SEARCH_PATHS {
        let path = PathBuf::from(path_str);
        if path.exists() {
            info!("Loading config from {}", path.display());
            return load_from_path(&path);
        }
    }

    debug!("No config.toml found, using built-in defaults");
    apply_env_overrides(CentralConfig::default())
}

/// Load configuration from a specific path.
///
/// Unreadable or malformed files fall back to the built-in defaults.
pub fn load_from_path(path: &PathBuf) -> CentralConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => apply_env_overrides(config),
            Err(e) => {
                warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                apply_env_overrides(CentralConfig::default())
            }
        },
        Err(e) => {
            warn!("Failed to read {}: {}, using defaults", path.display(), e);
            apply_env_overrides(CentralConfig::default())
        }
    }
}

/// Macro to reduce env override boilerplate
macro_rules! env_override {
    // String field
    ($config:expr, $section:ident . $field:ident, $key:expr) => {
        if let Ok(v) = std::env::var($key) {
            $config.$section.$field = v;
        }
    };
    // Parseable field (u32, f64, bool, etc.)
    ($config:expr, $section:ident . $field:ident, $key:expr, parse) => {
        if let Ok(v) =
            std::env::var($key).and_then(|s| s.parse().map_err(|_| std::env::VarError::NotPresent))
        {
            $config.$section.$field = v;
        }
    };
    // Optional parseable field (Option<u64>, etc.)
    ($config:expr, $section:ident . $field:ident, $key:expr, optional_parse) => {
        if let Ok(v) =
            std::env::var($key).and_then(|s| s.parse().map_err(|_| std::env::VarError::NotPresent))
        {
            $config.$section.$field = Some(v);
        }
    };
}

/// Apply environment variable overrides to a configuration.
///
/// Environment variables follow the pattern: MCTS_<SECTION>_<KEY>. Values
/// that fail to parse are ignored.
pub fn apply_env_overrides(mut config: CentralConfig) -> CentralConfig {
    // Common
    env_override!(config, common.log_level, "MCTS_COMMON_LOG_LEVEL");
    env_override!(config, common.game, "MCTS_COMMON_GAME");

    // Search
    env_override!(config, search.iterations, "MCTS_SEARCH_ITERATIONS", parse);
    env_override!(config, search.time_ms, "MCTS_SEARCH_TIME_MS", parse);
    env_override!(
        config,
        search.exploration_constant,
        "MCTS_SEARCH_EXPLORATION_CONSTANT",
        parse
    );
    env_override!(
        config,
        search.heuristic_weight,
        "MCTS_SEARCH_HEURISTIC_WEIGHT",
        parse
    );
    env_override!(
        config,
        search.optimistic_bias,
        "MCTS_SEARCH_OPTIMISTIC_BIAS",
        parse
    );
    env_override!(
        config,
        search.pessimistic_bias,
        "MCTS_SEARCH_PESSIMISTIC_BIAS",
        parse
    );
    env_override!(config, search.bounds, "MCTS_SEARCH_BOUNDS", parse);
    env_override!(config, search.prove, "MCTS_SEARCH_PROVE", parse);
    env_override!(
        config,
        search.final_selection,
        "MCTS_SEARCH_FINAL_SELECTION"
    );
    env_override!(config, search.root_threads, "MCTS_SEARCH_ROOT_THREADS", parse);
    env_override!(
        config,
        search.virtual_visits,
        "MCTS_SEARCH_VIRTUAL_VISITS",
        parse
    );
    env_override!(config, search.max_nodes, "MCTS_SEARCH_MAX_NODES", parse);
    env_override!(config, search.reuse_tree, "MCTS_SEARCH_REUSE_TREE", parse);
    env_override!(config, search.seed, "MCTS_SEARCH_SEED", optional_parse);

    // Self-play
    env_override!(config, selfplay.games, "MCTS_SELFPLAY_GAMES", parse);
    env_override!(config, selfplay.ponder, "MCTS_SELFPLAY_PONDER", parse);
    env_override!(config, selfplay.heuristic, "MCTS_SELFPLAY_HEURISTIC", parse);
    env_override!(
        config,
        selfplay.log_interval,
        "MCTS_SELFPLAY_LOG_INTERVAL",
        parse
    );

    config
}
