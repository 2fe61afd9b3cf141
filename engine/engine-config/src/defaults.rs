//! Default configuration values loaded from config.defaults.toml.
//!
//! The defaults file is embedded at compile time so every binary agrees on
//! the same baseline, whatever directory it is launched from.

use once_cell::sync::Lazy;
use serde::Deserialize;

/// The embedded defaults TOML file (loaded at compile time)
const DEFAULTS_TOML: &str = include_str!("../../../config.defaults.toml");

/// Parsed defaults structure (parsed once at first use)
static DEFAULTS: Lazy<DefaultsConfig> = Lazy::new(|| {
    toml::from_str(DEFAULTS_TOML).expect("config.defaults.toml should be valid TOML")
});

// ============================================================================
// Internal structs for parsing config.defaults.toml
// ============================================================================

#[derive(Debug, Deserialize)]
struct DefaultsConfig {
    common: CommonDefaults,
    search: SearchDefaults,
    selfplay: SelfPlayDefaults,
}

#[derive(Debug, Deserialize)]
struct CommonDefaults {
    log_level: String,
    game: String,
}

#[derive(Debug, Deserialize)]
struct SearchDefaults {
    iterations: u32,
    time_ms: u64,
    exploration_constant: f64,
    heuristic_weight: f64,
    optimistic_bias: f64,
    pessimistic_bias: f64,
    bounds: bool,
    prove: bool,
    final_selection: String,
    root_threads: usize,
    virtual_visits: f64,
    max_nodes: usize,
    reuse_tree: bool,
}

#[derive(Debug, Deserialize)]
struct SelfPlayDefaults {
    games: u32,
    ponder: bool,
    heuristic: bool,
    log_interval: u32,
}

// ============================================================================
// Public accessor functions
// ============================================================================

// Common
pub fn log_level() -> &'static str {
    &DEFAULTS.common.log_level
}
pub fn game() -> &'static str {
    &DEFAULTS.common.game
}

// Search
pub fn iterations() -> u32 {
    DEFAULTS.search.iterations
}
pub fn time_ms() -> u64 {
    DEFAULTS.search.time_ms
}
pub fn exploration_constant() -> f64 {
    DEFAULTS.search.exploration_constant
}
pub fn heuristic_weight() -> f64 {
    DEFAULTS.search.heuristic_weight
}
pub fn optimistic_bias() -> f64 {
    DEFAULTS.search.optimistic_bias
}
pub fn pessimistic_bias() -> f64 {
    DEFAULTS.search.pessimistic_bias
}
pub fn bounds() -> bool {
    DEFAULTS.search.bounds
}
pub fn prove() -> bool {
    DEFAULTS.search.prove
}
pub fn final_selection() -> &'static str {
    &DEFAULTS.search.final_selection
}
pub fn root_threads() -> usize {
    DEFAULTS.search.root_threads
}
pub fn virtual_visits() -> f64 {
    DEFAULTS.search.virtual_visits
}
pub fn max_nodes() -> usize {
    DEFAULTS.search.max_nodes
}
pub fn reuse_tree() -> bool {
    DEFAULTS.search.reuse_tree
}

// Self-play
pub fn games() -> u32 {
    DEFAULTS.selfplay.games
}
pub fn ponder() -> bool {
    DEFAULTS.selfplay.ponder
}
pub fn heuristic() -> bool {
    DEFAULTS.selfplay.heuristic
}
pub fn log_interval() -> u32 {
    DEFAULTS.selfplay.log_interval
}
