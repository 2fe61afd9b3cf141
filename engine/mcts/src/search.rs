//! MCTS search driver.
//!
//! Each cycle runs four phases:
//! 1. Selection: descend from the root with the tree policy, replaying moves
//!    on a private clone of the root state
//! 2. Expansion: the first unexpanded node reached gets one child per legal
//!    move, and the descent steps into one of them
//! 3. Playout: simulate to the end of the game, or reuse a proven outcome
//! 4. Backpropagation: update statistics, bounds and proofs up to the root
//!
//! The driver keeps its tree, and the position it was grown from, between
//! searches so that [`MctsSearch::advance`] can reuse the subtree of the move
//! actually played.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use engine_core::{GameState, StateError};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::config::MctsConfig;
use crate::heuristic::{seed_virtual_visits, Heuristic};
use crate::parallel::search_root_parallel;
use crate::playout::{playout, PlayoutPolicy};
use crate::selection::{final_child, select_child};
use crate::tree::{check_score, check_state, BackpropMode, MctsTree};

/// Errors that can occur during MCTS search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Game contract violated: {0}")]
    ContractViolation(#[from] StateError),

    #[error("No legal moves available")]
    NoLegalMoves,

    #[error("Search worker panicked")]
    WorkerPanicked,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Why a search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The root's outcome is known.
    Proven,
    /// The configured number of cycles ran.
    IterationBudget,
    /// The configured wall-clock budget elapsed.
    TimeBudget,
    /// Completion was requested through a [`StopHandle`].
    CompletionRequested,
    /// The low-memory signal was raised or the node cap reached.
    LowMemory,
    /// Chance roots get exactly one cycle.
    ChanceRoot,
    /// A root with a single legal move gets exactly one cycle.
    ForcedMove,
}

/// Cooperative cancellation for a running search.
///
/// Clones share their flags. A raised flag stays raised until [`reset`]
/// is called, so a request made before the search starts is honored
/// after its first cycle.
///
/// Flags are checked whether or not the search has an iteration or time
/// budget. A flag left raised therefore cuts every later search, budgeted
/// or not, to a single cycle until it is reset.
///
/// [`reset`]: StopHandle::reset
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    completion: Arc<AtomicBool>,
    low_memory: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the search to stop after its current cycle.
    pub fn request_completion(&self) {
        self.completion.store(true, Ordering::SeqCst);
    }

    /// Report memory pressure. Treated like a completion request.
    pub fn signal_low_memory(&self) {
        self.low_memory.store(true, Ordering::SeqCst);
    }

    /// Lower both flags.
    pub fn reset(&self) {
        self.completion.store(false, Ordering::SeqCst);
        self.low_memory.store(false, Ordering::SeqCst);
    }

    pub fn is_completion_requested(&self) -> bool {
        self.completion.load(Ordering::SeqCst)
    }

    pub fn is_low_memory(&self) -> bool {
        self.low_memory.load(Ordering::SeqCst)
    }
}

/// Statistics of one root child.
#[derive(Debug, Clone)]
pub struct ChildStats<M> {
    pub mv: M,
    pub visits: f64,
    /// Mean score for the root's acting player (0.0 at chance roots)
    pub mean_score: f64,
    pub pruned: bool,
    pub proven: Option<Vec<f64>>,
}

/// Result of an MCTS search.
#[derive(Debug, Clone)]
pub struct SearchResult<M> {
    /// Recommended move
    pub best_move: M,

    /// Per-child statistics in move order
    pub children: Vec<ChildStats<M>>,

    /// Cycles run by this search (summed over workers when root-parallel)
    pub iterations: u32,

    pub elapsed: Duration,

    /// Root outcome under perfect play, when proven
    pub proven: Option<Vec<f64>>,

    pub stop_reason: StopReason,

    /// Nodes in the tree when the search stopped
    pub tree_size: usize,
}

impl<M: PartialEq> SearchResult<M> {
    /// Statistics for the child reached by `mv`.
    pub fn child(&self, mv: &M) -> Option<&ChildStats<M>> {
        self.children.iter().find(|c| &c.mv == mv)
    }
}

/// Game-agnostic MCTS driver.
pub struct MctsSearch<S: GameState> {
    config: MctsConfig,
    heuristic: Option<Arc<dyn Heuristic<S>>>,
    playout_policy: Option<Arc<dyn PlayoutPolicy<S>>>,
    tree: Option<MctsTree<S::Move>>,
    /// Position at the root of `tree`.
    root_state: Option<S>,
    stop: StopHandle,
    rng: ChaCha20Rng,
}

impl<S: GameState> MctsSearch<S> {
    /// Create a driver seeded from system entropy.
    pub fn new(config: MctsConfig) -> Self {
        Self {
            config,
            heuristic: None,
            playout_policy: None,
            tree: None,
            root_state: None,
            stop: StopHandle::new(),
            rng: ChaCha20Rng::from_entropy(),
        }
    }

    /// Builder pattern: seed the driver for reproducible searches.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = ChaCha20Rng::seed_from_u64(seed);
        self
    }

    /// Builder pattern: bias selection with a heuristic.
    pub fn with_heuristic(mut self, heuristic: Arc<dyn Heuristic<S>>) -> Self {
        self.heuristic = Some(heuristic);
        self
    }

    /// Builder pattern: replace uniform random playouts.
    pub fn with_playout_policy(mut self, policy: Arc<dyn PlayoutPolicy<S>>) -> Self {
        self.playout_policy = Some(policy);
        self
    }

    /// Builder pattern: share cancellation flags with other drivers.
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut MctsConfig {
        &mut self.config
    }

    /// Handle for stopping a search running on another thread.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// The carried tree, if any (for inspection/debugging).
    pub fn tree(&self) -> Option<&MctsTree<S::Move>> {
        self.tree.as_ref()
    }

    /// Drop the carried tree so the next search starts fresh.
    pub fn clear_tree(&mut self) {
        self.tree = None;
        self.root_state = None;
    }

    /// Follow a move played in the real game.
    ///
    /// The subtree under `mv` becomes the new root and everything else is
    /// freed. On a miss, or if `mv` cannot be played from the tree's
    /// position, the tree is dropped.
    pub fn advance(&mut self, mv: &S::Move) {
        let (Some(tree), Some(mut root_state)) = (self.tree.take(), self.root_state.take()) else {
            self.clear_tree();
            return;
        };
        if let Err(e) = root_state.apply_move(mv) {
            debug!(mv = ?mv, error = %e, "Move not playable from the tree's root, dropping it");
            return;
        }
        let before = tree.len();
        self.tree = tree.rebase(mv);
        match &self.tree {
            Some(tree) => {
                debug!(mv = ?mv, kept = tree.len(), freed = before - tree.len(), "Rebased search tree");
                self.root_state = Some(root_state);
            }
            None => debug!(mv = ?mv, freed = before, "Move not in tree, dropping it"),
        }
    }

    /// Search `state` and recommend a move.
    ///
    /// Always runs at least one cycle. A carried tree is reused only when tree
    /// reuse is enabled and the tree was grown from a position equal to
    /// `state`, directly or through [`advance`](Self::advance).
    pub fn search(&mut self, state: &S) -> Result<SearchResult<S::Move>, SearchError> {
        self.config.validate().map_err(SearchError::InvalidConfig)?;
        if state.is_terminal() || state.legal_moves().is_empty() {
            return Err(SearchError::NoLegalMoves);
        }

        check_state(state, state.player_count())?;

        if self.config.root_threads > 1 {
            self.clear_tree();
            let base_seed = self.rng.gen();
            return search_root_parallel(
                state,
                &self.config,
                base_seed,
                self.heuristic.clone(),
                self.playout_policy.clone(),
                &self.stop,
            );
        }

        let carried = self.tree.take();
        let carried_state = self.root_state.take();
        let mut tree = match carried {
            Some(tree) if self.config.reuse_tree && carried_state.as_ref() == Some(state) => {
                debug!(
                    nodes = tree.len(),
                    visits = tree.get(tree.root()).visits,
                    "Reusing search tree"
                );
                tree
            }
            Some(_) => {
                debug!(
                    reuse = self.config.reuse_tree,
                    "Carried tree not reusable for this position, starting fresh"
                );
                MctsTree::new(state, self.config.score_range)
            }
            None => MctsTree::new(state, self.config.score_range),
        };

        let started = Instant::now();
        let (iterations, stop_reason) = self.grow(&mut tree, state, started)?;
        let result = summarize(
            &tree,
            &self.config,
            &mut self.rng,
            iterations,
            started.elapsed(),
            stop_reason,
        )?;
        self.tree = Some(tree);
        self.root_state = Some(state.clone());
        Ok(result)
    }

    fn backprop_mode(&self) -> BackpropMode {
        BackpropMode {
            bounds: self.config.bounds,
            prove: self.config.prove,
        }
    }

    /// Run cycles until a stop condition holds.
    fn grow(
        &mut self,
        tree: &mut MctsTree<S::Move>,
        state: &S,
        started: Instant,
    ) -> Result<(u32, StopReason), SearchError> {
        let root = tree.root();
        let chance_root = tree.get(root).is_chance();
        let mut iterations = 0u32;

        loop {
            self.cycle(tree, state)?;
            iterations += 1;

            if chance_root {
                return Ok((iterations, StopReason::ChanceRoot));
            }
            if tree.get(root).child_ids().len() == 1 {
                return Ok((iterations, StopReason::ForcedMove));
            }
            if let Some(reason) = self.stop_reason(tree, iterations, started) {
                return Ok((iterations, reason));
            }
        }
    }

    /// Continuation check, in priority order: proof, iteration budget, time
    /// budget, then the external signals and node cap.
    fn stop_reason(
        &self,
        tree: &MctsTree<S::Move>,
        iterations: u32,
        started: Instant,
    ) -> Option<StopReason> {
        if tree.get(tree.root()).is_proven() {
            return Some(StopReason::Proven);
        }
        if self.config.iterations > 0 {
            if iterations >= self.config.iterations {
                return Some(StopReason::IterationBudget);
            }
        } else if let Some(budget) = self.config.time_budget.filter(|b| !b.is_zero()) {
            if started.elapsed() >= budget {
                return Some(StopReason::TimeBudget);
            }
        }
        if self.stop.is_completion_requested() {
            return Some(StopReason::CompletionRequested);
        }
        if self.stop.is_low_memory() {
            return Some(StopReason::LowMemory);
        }
        if self.config.max_nodes > 0 && tree.len() >= self.config.max_nodes {
            warn!(
                nodes = tree.len(),
                max_nodes = self.config.max_nodes,
                "Node cap reached, stopping search"
            );
            return Some(StopReason::LowMemory);
        }
        None
    }

    /// Run a single cycle (select -> expand -> playout -> backpropagate).
    fn cycle(&mut self, tree: &mut MctsTree<S::Move>, root_state: &S) -> Result<(), SearchError> {
        let mut state = root_state.clone();
        let mut node_id = tree.root();
        let mut depth = 0u32;

        loop {
            let node = tree.get(node_id);
            if node.is_proven() || state.is_terminal() {
                break;
            }

            let fresh = !node.is_expanded();
            if fresh {
                if tree.expand(node_id, &state)? == 0 {
                    return Err(StateError::Inconsistent(
                        "non-terminal state has no legal moves".into(),
                    )
                    .into());
                }
                if let Some(heuristic) = self.heuristic.as_deref() {
                    seed_virtual_visits(tree, node_id, &state, heuristic, self.config.virtual_visits);
                }
            }

            let Some(child_id) = select_child(
                tree,
                node_id,
                &state,
                &self.config,
                self.heuristic.as_deref(),
                &mut self.rng,
            ) else {
                return Err(StateError::Inconsistent("expanded node has no children".into()).into());
            };
            if let Some(mv) = &tree.get(child_id).mv {
                state.apply_move(mv)?;
            }
            node_id = child_id;
            depth += 1;

            if fresh {
                break;
            }
        }

        if state.is_terminal() && !tree.get(node_id).is_proven() {
            let outcome = state.terminal_score();
            check_score(&outcome, tree.get(node_id).score.len())?;
            tree.get_mut(node_id).set_proven(outcome);
        }
        let score = match tree.get(node_id).proven.clone() {
            Some(outcome) => outcome,
            None => playout(&state, self.playout_policy.as_deref(), &mut self.rng)?,
        };

        trace!(leaf = node_id.0, depth, score = ?score, "MCTS cycle complete");
        tree.backpropagate(node_id, &score, self.backprop_mode());
        Ok(())
    }
}

/// Build the search result from a finished tree.
pub(crate) fn summarize<M, R>(
    tree: &MctsTree<M>,
    config: &MctsConfig,
    rng: &mut R,
    iterations: u32,
    elapsed: Duration,
    stop_reason: StopReason,
) -> Result<SearchResult<M>, SearchError>
where
    M: Clone + PartialEq + std::fmt::Debug,
    R: Rng + ?Sized,
{
    let best_id = final_child(tree, config, rng).ok_or(SearchError::NoLegalMoves)?;
    let best_move = tree.get(best_id).mv.clone().ok_or(SearchError::NoLegalMoves)?;

    let root = tree.get(tree.root());
    let children: Vec<ChildStats<M>> = root
        .child_ids()
        .iter()
        .filter_map(|&child_id| {
            let child = tree.get(child_id);
            Some(ChildStats {
                mv: child.mv.clone()?,
                visits: child.visits,
                mean_score: child.mean_score(root.player),
                pruned: child.pruned,
                proven: child.proven.clone(),
            })
        })
        .collect();

    debug!(
        best_move = ?best_move,
        iterations,
        elapsed_ms = elapsed.as_millis() as u64,
        nodes = tree.len(),
        proven = ?root.proven,
        reason = ?stop_reason,
        pv = ?tree.principal_variation(8),
        "Search complete"
    );
    for child in &children {
        trace!(
            mv = ?child.mv,
            visits = child.visits,
            mean_score = child.mean_score,
            pruned = child.pruned,
            proven = ?child.proven,
            "Root child stats"
        );
    }

    Ok(SearchResult {
        best_move,
        children,
        iterations,
        elapsed,
        proven: root.proven.clone(),
        stop_reason,
        tree_size: tree.len(),
    })
}

/// Uniformly random legal move, for baseline players.
pub fn select_random<S, R>(state: &S, rng: &mut R) -> Result<S::Move, SearchError>
where
    S: GameState,
    R: Rng + ?Sized,
{
    let mut moves = state.legal_moves();
    if state.is_terminal() || moves.is_empty() {
        return Err(SearchError::NoLegalMoves);
    }
    let index = rng.gen_range(0..moves.len());
    Ok(moves.swap_remove(index))
}

/// Convenience function to run a single seeded MCTS search.
pub fn run_mcts<S: GameState>(
    state: &S,
    config: MctsConfig,
    seed: u64,
) -> Result<SearchResult<S::Move>, SearchError> {
    MctsSearch::new(config).with_seed(seed).search(state)
}
