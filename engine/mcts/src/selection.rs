//! Tree policy and final-move selection.
//!
//! At a deciding node every live child is scored with
//! `UCT + heuristic_weight * h + optimistic_bias * opt + pessimistic_bias * pess`
//! from the perspective of the node's player, and the best is picked with
//! uniform random tie-breaking. At a chance node the child is drawn by the
//! chance weights instead. Selection never fails: if no child qualifies the
//! pick falls back to a uniform random child.

use engine_core::GameState;
use rand::Rng;
use tracing::debug;

use crate::config::{FinalSelection, MctsConfig};
use crate::heuristic::{clamped, Heuristic};
use crate::node::NodeId;
use crate::tree::MctsTree;

/// Draw an index with probability `weights[i] / sum(weights)`.
///
/// Walks the cumulative weights over a uniform draw in `[0, sum)`. Non-positive
/// and non-finite weights are never drawn. Returns None if no weight is
/// positive.
pub fn weighted_index<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> Option<usize> {
    let usable = |w: f64| w.is_finite() && w > 0.0;
    let total: f64 = weights.iter().copied().filter(|w| usable(*w)).sum();
    if total <= 0.0 {
        return None;
    }

    let draw = rng.gen::<f64>() * total;
    let mut cumulative = 0.0;
    let mut last = None;
    for (i, &w) in weights.iter().enumerate() {
        if !usable(w) {
            continue;
        }
        cumulative += w;
        last = Some(i);
        if draw < cumulative {
            return Some(i);
        }
    }

    // Floating point residue at the top of the range
    last
}

/// Uniformly random element of a non-empty slice.
fn pick<T: Copy, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Option<T> {
    if items.is_empty() {
        None
    } else {
        Some(items[rng.gen_range(0..items.len())])
    }
}

/// Choose the child of `node_id` to descend into.
///
/// `state` is the position at `node_id`. Returns None only if the node has
/// no children at all.
pub fn select_child<S, R>(
    tree: &MctsTree<S::Move>,
    node_id: NodeId,
    state: &S,
    config: &MctsConfig,
    heuristic: Option<&dyn Heuristic<S>>,
    rng: &mut R,
) -> Option<NodeId>
where
    S: GameState,
    R: Rng + ?Sized,
{
    let node = tree.get(node_id);
    let children = node.child_ids();
    if children.is_empty() {
        return None;
    }

    if node.is_chance() {
        let weights: Vec<f64> = children.iter().map(|&c| tree.get(c).weight).collect();
        return match weighted_index(&weights, rng) {
            Some(i) => Some(children[i]),
            None => pick(children, rng),
        };
    }

    let player = node.player;
    let parent_log_visits = (node.visits + 1.0).ln();
    let live: Vec<NodeId> = tree.live_children(node_id).collect();
    // Proven children only compete once nothing else is left open
    let skip_proven = config.prove && live.iter().any(|&c| !tree.get(c).is_proven());

    let mut best = Vec::new();
    let mut best_value = f64::NEG_INFINITY;
    for &child_id in &live {
        let child = tree.get(child_id);
        if skip_proven && child.is_proven() {
            continue;
        }

        let mut value = child.uct_score(player, parent_log_visits, config.exploration_constant)
            + child.bound_bias(player, config.optimistic_bias, config.pessimistic_bias);
        if let (Some(h), Some(mv)) = (heuristic, child.mv.as_ref()) {
            value += config.heuristic_weight * clamped(h, state, mv);
        }

        if value.is_nan() {
            continue;
        }
        if value > best_value {
            best.clear();
            best.push(child_id);
            best_value = value;
        } else if value == best_value {
            best.push(child_id);
        }
    }

    if best.is_empty() {
        debug!(
            node = node_id.0,
            children = children.len(),
            live = live.len(),
            "No eligible child, falling back to a random pick"
        );
        return pick(children, rng);
    }
    pick(&best, rng)
}

/// Turn the root's statistics into the recommended child.
///
/// A proven deciding root yields its first unpruned child, which is the
/// proven best play. Otherwise the configured policy is applied over live children
/// (all children if every one was pruned), breaking ties at random.
pub fn final_child<M, R>(tree: &MctsTree<M>, config: &MctsConfig, rng: &mut R) -> Option<NodeId>
where
    M: Clone + PartialEq,
    R: Rng + ?Sized,
{
    let root_id = tree.root();
    let root = tree.get(root_id);

    if root.is_proven() && !root.is_chance() {
        if let Some(child_id) = tree.live_children(root_id).next() {
            return Some(child_id);
        }
    }

    let mut candidates: Vec<NodeId> = tree.live_children(root_id).collect();
    if candidates.is_empty() {
        candidates = root.child_ids().to_vec();
    }

    let value = |child_id: NodeId| {
        let child = tree.get(child_id);
        match config.final_selection {
            FinalSelection::RobustChild => child.visits,
            FinalSelection::MaxChild if root.is_chance() => child.visits,
            FinalSelection::MaxChild => {
                child.mean_score(root.player)
                    + child.bound_bias(root.player, config.optimistic_bias, config.pessimistic_bias)
            }
        }
    };

    let mut best = Vec::new();
    let mut best_value = f64::NEG_INFINITY;
    for child_id in candidates {
        let v = value(child_id);
        if v > best_value {
            best.clear();
            best.push(child_id);
            best_value = v;
        } else if v == best_value {
            best.push(child_id);
        }
    }
    pick(&best, rng)
}
