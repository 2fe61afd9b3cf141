//! Root parallelism.
//!
//! Several independent trees search the same position on scoped worker
//! threads, each with its own generator. Workers share nothing but the stop
//! flags. The move is decided by a plurality vote over each worker's
//! recommendation, ties broken at random.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;

use engine_core::GameState;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tracing::debug;

use crate::config::MctsConfig;
use crate::heuristic::Heuristic;
use crate::playout::PlayoutPolicy;
use crate::search::{ChildStats, MctsSearch, SearchError, SearchResult, StopHandle};

/// Most frequent value in `votes`, ties broken uniformly at random.
///
/// Returns None only if there are no votes.
pub fn plurality_vote<M, R>(votes: &[M], rng: &mut R) -> Option<M>
where
    M: Clone + Ord,
    R: Rng + ?Sized,
{
    let mut counts: BTreeMap<&M, usize> = BTreeMap::new();
    for vote in votes {
        *counts.entry(vote).or_insert(0) += 1;
    }

    let top = counts.values().copied().max()?;
    let leaders: Vec<&M> = counts
        .into_iter()
        .filter(|(_, n)| *n == top)
        .map(|(m, _)| m)
        .collect();
    let pick = rng.gen_range(0..leaders.len());
    Some(leaders[pick].clone())
}

/// Search `state` with `config.root_threads` independent trees.
///
/// Worker `i` is seeded with `base_seed + i`. A failing worker fails the
/// whole search. Child statistics in the result are summed over workers.
pub fn search_root_parallel<S: GameState>(
    state: &S,
    config: &MctsConfig,
    base_seed: u64,
    heuristic: Option<Arc<dyn Heuristic<S>>>,
    playout_policy: Option<Arc<dyn PlayoutPolicy<S>>>,
    stop: &StopHandle,
) -> Result<SearchResult<S::Move>, SearchError> {
    let threads = config.root_threads.max(1);
    let worker_config = config.clone().with_root_threads(1);

    let outcomes: Vec<Result<SearchResult<S::Move>, SearchError>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..threads)
            .map(|i| {
                let mut search = MctsSearch::new(worker_config.clone())
                    .with_seed(base_seed.wrapping_add(i as u64))
                    .with_stop_handle(stop.clone());
                if let Some(h) = &heuristic {
                    search = search.with_heuristic(Arc::clone(h));
                }
                if let Some(p) = &playout_policy {
                    search = search.with_playout_policy(Arc::clone(p));
                }
                let state = state.clone();
                scope.spawn(move || search.search(&state))
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or(Err(SearchError::WorkerPanicked)))
            .collect()
    });
    let results = outcomes.into_iter().collect::<Result<Vec<_>, _>>()?;

    let votes: Vec<S::Move> = results.iter().map(|r| r.best_move.clone()).collect();
    let mut rng = ChaCha20Rng::seed_from_u64(base_seed.wrapping_add(threads as u64));
    let best_move = plurality_vote(&votes, &mut rng).ok_or(SearchError::NoLegalMoves)?;
    debug!(threads, votes = ?votes, best_move = ?best_move, "Root-parallel vote");

    merge(results, best_move)
}

/// Combine worker results into one, summing child statistics.
fn merge<M: Clone + PartialEq>(
    results: Vec<SearchResult<M>>,
    best_move: M,
) -> Result<SearchResult<M>, SearchError> {
    let mut results = results.into_iter();
    let Some(first) = results.next() else {
        return Err(SearchError::NoLegalMoves);
    };

    let mut merged = SearchResult {
        best_move,
        children: first.children,
        iterations: first.iterations,
        elapsed: first.elapsed,
        proven: first.proven,
        stop_reason: first.stop_reason,
        tree_size: first.tree_size,
    };
    // Visit-weighted means are rebuilt once all totals are known
    for child in &mut merged.children {
        child.mean_score *= child.visits;
    }

    for result in results {
        merged.iterations += result.iterations;
        merged.elapsed = merged.elapsed.max(result.elapsed);
        merged.tree_size += result.tree_size;
        if merged.proven.is_none() {
            merged.proven = result.proven;
        }
        for child in result.children {
            match merged.children.iter_mut().find(|c| c.mv == child.mv) {
                Some(total) => accumulate(total, &child),
                None => merged.children.push(ChildStats {
                    mean_score: child.mean_score * child.visits,
                    ..child
                }),
            }
        }
    }

    for child in &mut merged.children {
        child.mean_score = if child.visits > 0.0 {
            child.mean_score / child.visits
        } else {
            0.0
        };
    }
    Ok(merged)
}

fn accumulate<M>(total: &mut ChildStats<M>, child: &ChildStats<M>) {
    total.visits += child.visits;
    total.mean_score += child.mean_score * child.visits;
    total.pruned &= child.pruned;
    if total.proven.is_none() {
        total.proven.clone_from(&child.proven);
    }
}
