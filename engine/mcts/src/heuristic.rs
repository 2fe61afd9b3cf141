//! Heuristic plug-in for biasing selection.
//!
//! A heuristic scores a candidate move in `[-1, 1]` (bad to good). It only
//! nudges the tree policy; it never replaces simulation statistics. Any
//! `Fn(&S, &S::Move) -> f64` closure can be used directly.

use engine_core::GameState;

use crate::node::NodeId;
use crate::tree::MctsTree;

/// Scores a move on the position it would be played from.
pub trait Heuristic<S: GameState>: Send + Sync {
    /// Quality of `mv` on `state`, in `[-1, 1]`.
    fn score(&self, state: &S, mv: &S::Move) -> f64;
}

impl<S, F> Heuristic<S> for F
where
    S: GameState,
    F: Fn(&S, &S::Move) -> f64 + Send + Sync,
{
    fn score(&self, state: &S, mv: &S::Move) -> f64 {
        self(state, mv)
    }
}

/// Heuristic value clamped to its contractual range. NaN maps to 0.
#[inline]
pub(crate) fn clamped<S: GameState>(heuristic: &dyn Heuristic<S>, state: &S, mv: &S::Move) -> f64 {
    let h = heuristic.score(state, mv);
    if h.is_nan() {
        0.0
    } else {
        h.clamp(-1.0, 1.0)
    }
}

/// Seed freshly expanded children with heuristic-derived virtual visits.
///
/// Each child receives `visits` visits whose mean score for the parent's
/// player is the heuristic mapped linearly onto the score range. The
/// virtual statistics are never removed; real simulations dilute them.
pub(crate) fn seed_virtual_visits<S: GameState>(
    tree: &mut MctsTree<S::Move>,
    node_id: NodeId,
    state: &S,
    heuristic: &dyn Heuristic<S>,
    visits: f64,
) {
    let parent = tree.get(node_id);
    if visits <= 0.0 || parent.is_chance() {
        return;
    }
    let p = parent.player as usize;
    let (lo, hi) = tree.score_range();
    let children = parent.child_ids().to_vec();

    for child_id in children {
        let Some(mv) = tree.get(child_id).mv.clone() else {
            continue;
        };
        let h = clamped(heuristic, state, &mv);
        let value = lo + (h + 1.0) / 2.0 * (hi - lo);
        let child = tree.get_mut(child_id);
        child.visits += visits;
        if let Some(slot) = child.score.get_mut(p) {
            *slot += visits * value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::TwoPly;

    fn game() -> TwoPly {
        TwoPly::new(vec![vec![0.0], vec![1.0]])
    }

    #[test]
    fn test_closure_heuristic() {
        let h = |_: &TwoPly, mv: &usize| if *mv == 1 { 1.0 } else { -1.0 };
        assert_eq!(Heuristic::score(&h, &game(), &1), 1.0);
        assert_eq!(Heuristic::score(&h, &game(), &0), -1.0);
    }

    #[test]
    fn test_clamped() {
        let wild = |_: &TwoPly, mv: &usize| match mv {
            0 => 7.0,
            1 => f64::NAN,
            _ => -3.0,
        };
        assert_eq!(clamped(&wild, &game(), &0), 1.0);
        assert_eq!(clamped(&wild, &game(), &1), 0.0);
        assert_eq!(clamped(&wild, &game(), &2), -1.0);
    }

    #[test]
    fn test_seed_virtual_visits() {
        let game = game();
        let mut tree = MctsTree::new(&game, (0.0, 1.0));
        tree.expand(tree.root(), &game).unwrap();
        let h = |_: &TwoPly, mv: &usize| if *mv == 1 { 1.0 } else { 0.0 };
        let root = tree.root();
        seed_virtual_visits(&mut tree, root, &game, &h, 4.0);

        let children = tree.get(tree.root()).child_ids().to_vec();
        assert_eq!(tree.get(children[0]).visits, 4.0);
        assert!((tree.get(children[0]).mean_score(0) - 0.5).abs() < 1e-12);
        assert!((tree.get(children[1]).mean_score(0) - 1.0).abs() < 1e-12);
        // The root itself is untouched
        assert_eq!(tree.get(tree.root()).visits, 0.0);
    }
}
