//! MCTS tree node representation.
//!
//! Each node represents the game position reached by playing `mv` from the
//! parent. Nodes do not store positions; the search replays moves on a cloned
//! state while descending. Statistics are kept per player so that
//! multi-player and stochastic games share one representation.

use engine_core::{is_chance, PlayerId};

/// Index into the node arena. Using a newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn is_some(self) -> bool {
        !self.is_none()
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node in the MCTS tree.
#[derive(Debug, Clone)]
pub struct MctsNode<M> {
    /// Parent node index (NONE for root)
    pub parent: NodeId,

    /// Move that led to this node from the parent (None for root)
    pub mv: Option<M>,

    /// Actor to move at this node (negative for chance)
    pub player: PlayerId,

    /// Cumulative per-player score of simulations through this node
    pub score: Vec<f64>,

    /// Completed simulations through this node.
    /// Real-valued so virtual visits and proof rescaling stay exact.
    pub visits: f64,

    /// Per-player upper bound on the achievable outcome
    pub optimistic: Vec<f64>,

    /// Per-player lower bound on the achievable outcome
    pub pessimistic: Vec<f64>,

    /// Outcome under perfect play, once known (terminal or proven)
    pub proven: Option<Vec<f64>>,

    /// Pruned nodes are never selected again; their statistics remain.
    pub pruned: bool,

    /// Probability weight of this move when the parent is a chance node
    pub weight: f64,

    /// Child ids. None until the node is expanded.
    pub children: Option<Vec<NodeId>>,
}

impl<M> MctsNode<M> {
    /// Create a new root node.
    pub fn new_root(player: PlayerId, players: usize, score_range: (f64, f64)) -> Self {
        Self {
            parent: NodeId::NONE,
            mv: None,
            player,
            score: vec![0.0; players],
            visits: 0.0,
            optimistic: vec![score_range.1; players],
            pessimistic: vec![score_range.0; players],
            proven: None,
            pruned: false,
            weight: 1.0,
            children: None,
        }
    }

    /// Create a new child node.
    pub fn new_child(
        parent: NodeId,
        mv: M,
        player: PlayerId,
        players: usize,
        score_range: (f64, f64),
    ) -> Self {
        Self {
            parent,
            mv: Some(mv),
            ..Self::new_root(player, players, score_range)
        }
    }

    /// Whether the acting actor here is a chance actor.
    #[inline]
    pub fn is_chance(&self) -> bool {
        is_chance(self.player)
    }

    /// Check if this node has been expanded.
    #[inline]
    pub fn is_expanded(&self) -> bool {
        self.children.is_some()
    }

    /// Check if the outcome below this node is known.
    #[inline]
    pub fn is_proven(&self) -> bool {
        self.proven.is_some()
    }

    /// Children ids, empty if unexpanded.
    #[inline]
    pub fn child_ids(&self) -> &[NodeId] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Mean score for `player`. Returns 0.0 if never visited.
    #[inline]
    pub fn mean_score(&self, player: PlayerId) -> f64 {
        if self.visits <= 0.0 || player < 0 {
            return 0.0;
        }
        self.score
            .get(player as usize)
            .map_or(0.0, |s| s / self.visits)
    }

    /// Exploitation term of UCT from `player`'s perspective.
    ///
    /// Unvisited nodes are infinitely attractive so every child is tried
    /// once before any is tried twice.
    #[inline]
    pub fn exploitation(&self, player: PlayerId) -> f64 {
        if self.visits <= 0.0 {
            f64::INFINITY
        } else {
            self.mean_score(player)
        }
    }

    /// Calculate the UCT score for selecting this node from its parent.
    /// UCT = Q(s,a)[p] + c * sqrt(ln(N_parent + 1) / N(s,a))
    ///
    /// Takes pre-computed ln(parent_visits + 1) so the logarithm is taken once
    /// per selection rather than once per child.
    #[inline]
    pub fn uct_score(&self, player: PlayerId, parent_log_visits: f64, c: f64) -> f64 {
        let exploitation = self.exploitation(player);
        if exploitation.is_infinite() {
            return exploitation;
        }
        exploitation + c * (parent_log_visits / self.visits).sqrt()
    }

    /// Weighted sum of this node's bounds for `player`.
    #[inline]
    pub fn bound_bias(&self, player: PlayerId, optimistic_bias: f64, pessimistic_bias: f64) -> f64 {
        if player < 0 || (optimistic_bias == 0.0 && pessimistic_bias == 0.0) {
            return 0.0;
        }
        let p = player as usize;
        optimistic_bias * self.optimistic[p] + pessimistic_bias * self.pessimistic[p]
    }

    /// Add one simulation result.
    pub fn record(&mut self, score: &[f64]) {
        self.visits += 1.0;
        for (acc, s) in self.score.iter_mut().zip(score) {
            *acc += s;
        }
    }

    /// Mark the outcome as known and pin both bounds to it.
    pub fn set_proven(&mut self, outcome: Vec<f64>) {
        self.optimistic.clone_from(&outcome);
        self.pessimistic.clone_from(&outcome);
        self.proven = Some(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node() -> MctsNode<u8> {
        MctsNode::new_root(0, 2, (0.0, 1.0))
    }

    #[test]
    fn test_node_id_none() {
        assert!(NodeId::NONE.is_none());
        assert!(!NodeId::NONE.is_some());
        assert!(!NodeId(0).is_none());
        assert!(NodeId(0).is_some());
    }

    #[test]
    fn test_new_root() {
        let node = node();

        assert!(node.parent.is_none());
        assert!(node.mv.is_none());
        assert_eq!(node.visits, 0.0);
        assert_eq!(node.score, vec![0.0, 0.0]);
        assert_eq!(node.optimistic, vec![1.0, 1.0]);
        assert_eq!(node.pessimistic, vec![0.0, 0.0]);
        assert!(!node.is_expanded());
        assert!(!node.is_proven());
        assert!(!node.pruned);
    }

    #[test]
    fn test_new_child() {
        let child = MctsNode::new_child(NodeId(0), 7u8, -1, 3, (0.0, 1.0));
        assert_eq!(child.parent, NodeId(0));
        assert_eq!(child.mv, Some(7));
        assert!(child.is_chance());
        assert_eq!(child.score.len(), 3);
    }

    #[test]
    fn test_mean_score() {
        let mut node = node();
        assert_eq!(node.mean_score(0), 0.0);

        node.record(&[1.0, 0.0]);
        node.record(&[0.5, 0.5]);
        node.record(&[0.0, 1.0]);
        node.record(&[1.0, 0.0]);
        assert_eq!(node.visits, 4.0);
        assert!((node.mean_score(0) - 0.625).abs() < 1e-12);
        assert!((node.mean_score(1) - 0.375).abs() < 1e-12);
        assert_eq!(node.mean_score(-1), 0.0);
    }

    #[test]
    fn test_uct_score() {
        let mut node = node();

        // Unvisited nodes must be selected first
        assert!(node.uct_score(0, 0.0, 1.0).is_infinite());

        node.visits = 10.0;
        node.score = vec![5.0, 5.0];

        // UCT = 0.5 + 1.0 * sqrt(ln(101) / 10)
        let log_parent = 101f64.ln();
        let expected = 0.5 + (log_parent / 10.0).sqrt();
        assert!((node.uct_score(0, log_parent, 1.0) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_bound_bias() {
        let mut node = node();
        node.optimistic = vec![0.8, 0.4];
        node.pessimistic = vec![0.2, 0.1];

        assert_eq!(node.bound_bias(0, 0.0, 0.0), 0.0);
        assert!((node.bound_bias(0, 1.0, 0.5) - 0.9).abs() < 1e-12);
        assert!((node.bound_bias(1, 1.0, 1.0) - 0.5).abs() < 1e-12);
        assert_eq!(node.bound_bias(-1, 1.0, 1.0), 0.0);
    }

    #[test]
    fn test_set_proven_pins_bounds() {
        let mut node = node();
        node.set_proven(vec![1.0, 0.0]);
        assert!(node.is_proven());
        assert_eq!(node.optimistic, vec![1.0, 0.0]);
        assert_eq!(node.pessimistic, vec![1.0, 0.0]);
    }
}
