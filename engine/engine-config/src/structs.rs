//! Configuration struct definitions.
//!
//! All config structs with serde deserialization support and default values.

use crate::defaults;
use serde::Deserialize;

// ============================================================================
// Serde default functions (required for #[serde(default = "...")])
// These call the accessor functions from defaults module
// ============================================================================

fn d_log_level() -> String {
    defaults::log_level().into()
}
fn d_game() -> String {
    defaults::game().into()
}
fn d_iterations() -> u32 {
    defaults::iterations()
}
fn d_time_ms() -> u64 {
    defaults::time_ms()
}
fn d_exploration() -> f64 {
    defaults::exploration_constant()
}
fn d_heuristic_weight() -> f64 {
    defaults::heuristic_weight()
}
fn d_optimistic_bias() -> f64 {
    defaults::optimistic_bias()
}
fn d_pessimistic_bias() -> f64 {
    defaults::pessimistic_bias()
}
fn d_bounds() -> bool {
    defaults::bounds()
}
fn d_prove() -> bool {
    defaults::prove()
}
fn d_final_selection() -> String {
    defaults::final_selection().into()
}
fn d_root_threads() -> usize {
    defaults::root_threads()
}
fn d_virtual_visits() -> f64 {
    defaults::virtual_visits()
}
fn d_max_nodes() -> usize {
    defaults::max_nodes()
}
fn d_reuse_tree() -> bool {
    defaults::reuse_tree()
}
fn d_games() -> u32 {
    defaults::games()
}
fn d_ponder() -> bool {
    defaults::ponder()
}
fn d_heuristic() -> bool {
    defaults::heuristic()
}
fn d_log_interval() -> u32 {
    defaults::log_interval()
}

// ============================================================================
// Config structs
// ============================================================================

/// Root configuration structure matching config.toml
#[derive(Debug, Deserialize, Default, Clone)]
pub struct CentralConfig {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub selfplay: SelfPlayConfig,
}

/// Settings shared by every binary
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CommonConfig {
    #[serde(default = "d_log_level")]
    pub log_level: String,
    /// Game to play: "tictactoe" or "connect4"
    #[serde(default = "d_game")]
    pub game: String,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::log_level().into(),
            game: defaults::game().into(),
        }
    }
}

/// Search knobs.
///
/// Mirrors the engine's `MctsConfig` in plain TOML types. A `time_ms` of 0
/// disables the time budget and a `seed` of `None` seeds from entropy.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    #[serde(default = "d_iterations")]
    pub iterations: u32,
    #[serde(default = "d_time_ms")]
    pub time_ms: u64,
    #[serde(default = "d_exploration")]
    pub exploration_constant: f64,
    #[serde(default = "d_heuristic_weight")]
    pub heuristic_weight: f64,
    #[serde(default = "d_optimistic_bias")]
    pub optimistic_bias: f64,
    #[serde(default = "d_pessimistic_bias")]
    pub pessimistic_bias: f64,
    #[serde(default = "d_bounds")]
    pub bounds: bool,
    #[serde(default = "d_prove")]
    pub prove: bool,
    /// "robust" or "max"
    #[serde(default = "d_final_selection")]
    pub final_selection: String,
    #[serde(default = "d_root_threads")]
    pub root_threads: usize,
    #[serde(default = "d_virtual_visits")]
    pub virtual_visits: f64,
    /// Node budget before the search reports low memory (0 = unlimited)
    #[serde(default = "d_max_nodes")]
    pub max_nodes: usize,
    /// Keep the search tree between moves of the same game
    #[serde(default = "d_reuse_tree")]
    pub reuse_tree: bool,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            iterations: defaults::iterations(),
            time_ms: defaults::time_ms(),
            exploration_constant: defaults::exploration_constant(),
            heuristic_weight: defaults::heuristic_weight(),
            optimistic_bias: defaults::optimistic_bias(),
            pessimistic_bias: defaults::pessimistic_bias(),
            bounds: defaults::bounds(),
            prove: defaults::prove(),
            final_selection: defaults::final_selection().into(),
            root_threads: defaults::root_threads(),
            virtual_visits: defaults::virtual_visits(),
            max_nodes: defaults::max_nodes(),
            reuse_tree: defaults::reuse_tree(),
            seed: None,
        }
    }
}

/// Engine-vs-engine match settings
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SelfPlayConfig {
    #[serde(default = "d_games")]
    pub games: u32,
    /// Keep searching on the opponent's turn
    #[serde(default = "d_ponder")]
    pub ponder: bool,
    /// Use the game's move heuristic when it has one
    #[serde(default = "d_heuristic")]
    pub heuristic: bool,
    /// Log a tally every N games (0 to disable)
    #[serde(default = "d_log_interval")]
    pub log_interval: u32,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        Self {
            games: defaults::games(),
            ponder: defaults::ponder(),
            heuristic: defaults::heuristic(),
            log_interval: defaults::log_interval(),
        }
    }
}
