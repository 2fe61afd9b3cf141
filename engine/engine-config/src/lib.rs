//! Centralized configuration for the MCTS engine.
//!
//! This crate provides configuration structs and loading logic shared
//! by the engine's binaries (currently the self-play driver).
//!
//! # Configuration Priority
//!
//! Settings are loaded with the following priority (highest to lowest):
//! 1. Environment variables (`MCTS_<SECTION>_<KEY>`)
//! 2. config.toml file
//! 3. Built-in defaults (config.defaults.toml, embedded at compile time)
//!
//! # Environment Variable Override Pattern
//!
//! ```text
//! MCTS_<SECTION>_<KEY>=value
//!
//! Examples:
//!     MCTS_COMMON_GAME=connect4
//!     MCTS_SEARCH_ITERATIONS=5000
//!     MCTS_SEARCH_BOUNDS=true
//!     MCTS_SEARCH_SEED=42
//!     MCTS_SELFPLAY_PONDER=true
//! ```

mod defaults;
mod loader;
mod structs;

pub use defaults::*;
pub use loader::{apply_env_overrides, load_config, load_from_path, CONFIG_SEARCH_PATHS};
pub use structs::*;
