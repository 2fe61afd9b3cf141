//! Game-agnostic Monte Carlo Tree Search.
//!
//! This crate searches any game implementing the `engine-core`
//! [`GameState`](engine_core::GameState) contract: deterministic or
//! stochastic, two-player or multi-player.
//!
//! # Overview
//!
//! MCTS builds a search tree by running cycles. Each cycle consists of four
//! phases:
//!
//! 1. **Selection**: Descend the tree with UCT, optionally biased by a
//!    heuristic and by score bounds. Chance nodes are sampled by weight.
//! 2. **Expansion**: The first unexpanded node reached gets one child per
//!    legal move
//! 3. **Playout**: Simulate from the new child to the end of the game
//! 4. **Backpropagation**: Update visits and per-player scores along the
//!    path, maintain optimistic/pessimistic bounds, and prove outcomes
//!
//! Proven and dominated subtrees are pruned, so small games are often solved
//! outright and the search then plays perfectly.
//!
//! # Usage
//!
//! ```rust,ignore
//! use mcts::{MctsConfig, MctsSearch};
//!
//! let mut state = games_tictactoe::State::new();
//! let mut search = MctsSearch::new(MctsConfig::for_testing()).with_seed(42);
//!
//! let result = search.search(&state)?;
//! println!("Best move: {}", result.best_move);
//!
//! // Keep the subtree of the move actually played
//! state.apply_move(&result.best_move)?;
//! search.advance(&result.best_move);
//! ```
//!
//! # Configuration
//!
//! The [`MctsConfig`] struct controls search behavior:
//!
//! - `iterations` / `time_budget`: Budget per search; both unset means run
//!   until [`StopHandle::request_completion`]
//! - `exploration_constant`: UCT exploration constant (default: sqrt(2))
//! - `bounds` / `prove`: Score-bounds pruning and proof propagation
//! - `final_selection`: Robust child (most visits) or max child
//! - `root_threads`: Independent trees combined by plurality vote
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         MctsSearch                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │  MctsTree   │  │  GameState  │  │ Heuristic / Playout │  │
//! │  │  (arena)    │  │ (cloned per │  │   (plug-ins)        │  │
//! │  │             │  │   cycle)    │  │                     │  │
//! │  └──────┬──────┘  └──────┬──────┘  └──────────┬──────────┘  │
//! │         │                │                    │             │
//! │         ▼                ▼                    ▼             │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │        select → expand → playout → backpropagate     │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod heuristic;
pub mod node;
pub mod parallel;
pub mod playout;
pub mod ponder;
pub mod search;
pub mod selection;
pub mod tree;

#[cfg(test)]
mod test_util;

// Re-export main types
pub use config::{FinalSelection, MctsConfig};
pub use heuristic::Heuristic;
pub use node::{MctsNode, NodeId};
pub use parallel::{plurality_vote, search_root_parallel};
pub use playout::{playout, PlayoutPolicy, UniformPlayout};
pub use ponder::Ponderer;
pub use search::{
    run_mcts, select_random, ChildStats, MctsSearch, SearchError, SearchResult, StopHandle,
    StopReason,
};
pub use selection::{final_child, select_child, weighted_index};
pub use tree::{BackpropMode, MctsTree, TreeStats};
