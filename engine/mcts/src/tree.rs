//! MCTS tree structure with arena allocation.
//!
//! The tree uses arena allocation for efficient node storage and
//! cache-friendly traversal. Nodes are stored in a contiguous Vec
//! and referenced by NodeId indices. Each node has exactly one parent,
//! so the arena is a strict tree: no sharing, no cycles.
//!
//! Besides storage, the tree owns the two mutations nodes ever see:
//! backpropagation of simulation results (statistics, score bounds and
//! proven outcomes) and rebasing onto the move actually played.

use engine_core::{is_chance, GameState, PlayerId, StateError};
use tracing::trace;

use crate::node::{MctsNode, NodeId};

/// Tolerance used when comparing scores and bounds.
const EPSILON: f64 = 1e-9;

/// Reject a state whose actor ids or outcome do not fit a `players`-player game.
///
/// Non-terminal states must name a chance actor or a player below `players`;
/// terminal states must score every player.
pub(crate) fn check_state<S: GameState>(state: &S, players: usize) -> Result<(), StateError> {
    if players == 0 {
        return Err(StateError::Inconsistent("a game needs at least one player".into()));
    }
    if state.player_count() != players {
        return Err(StateError::Inconsistent(format!(
            "player count changed from {players} to {}",
            state.player_count()
        )));
    }
    if state.is_terminal() {
        check_score(&state.terminal_score(), players)
    } else {
        check_actor(state.acting_player(), players)
    }
}

/// Reject an outcome that does not have one entry per player.
pub(crate) fn check_score(score: &[f64], players: usize) -> Result<(), StateError> {
    if score.len() != players {
        return Err(StateError::Inconsistent(format!(
            "terminal score has {} entries for {players} players",
            score.len()
        )));
    }
    Ok(())
}

fn check_actor(player: PlayerId, players: usize) -> Result<(), StateError> {
    if is_chance(player) || (player as usize) < players {
        Ok(())
    } else {
        Err(StateError::Inconsistent(format!(
            "acting player {player} outside 0..{players}"
        )))
    }
}

/// Which optional bookkeeping backpropagation performs.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackpropMode {
    /// Maintain score bounds and prune dominated children.
    pub bounds: bool,
    /// Propagate proven outcomes upward.
    pub prove: bool,
}

/// MCTS tree with arena-based node storage.
#[derive(Debug, Clone)]
pub struct MctsTree<M> {
    /// Arena storing all nodes
    nodes: Vec<MctsNode<M>>,

    /// Root node index (always 0 after construction or rebase)
    root: NodeId,

    /// Lowest and highest score a player can receive
    score_range: (f64, f64),
}

impl<M: Clone + PartialEq> MctsTree<M> {
    /// Create a new tree whose root wraps `state`.
    ///
    /// The search driver validates `state` before calling this.
    pub fn new<S>(state: &S, score_range: (f64, f64)) -> Self
    where
        S: GameState<Move = M>,
    {
        let mut root = MctsNode::new_root(state.acting_player(), state.player_count(), score_range);
        if state.is_terminal() {
            root.set_proven(state.terminal_score());
        }
        Self {
            nodes: vec![root],
            root: NodeId(0),
            score_range,
        }
    }

    /// Get the root node ID.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a reference to a node by ID.
    #[inline]
    pub fn get(&self, id: NodeId) -> &MctsNode<M> {
        &self.nodes[id.index()]
    }

    /// Get a mutable reference to a node by ID.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut MctsNode<M> {
        &mut self.nodes[id.index()]
    }

    /// Allocate a new node and return its ID.
    pub fn allocate(&mut self, node: MctsNode<M>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Get the total number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty (should never be true after construction).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get the arena slice for read access.
    #[inline]
    pub fn arena(&self) -> &[MctsNode<M>] {
        &self.nodes
    }

    /// Score range the bounds were initialized with.
    #[inline]
    pub fn score_range(&self) -> (f64, f64) {
        self.score_range
    }

    /// Children of `id` that have not been pruned.
    pub fn live_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.get(id)
            .child_ids()
            .iter()
            .copied()
            .filter(move |c| !self.get(*c).pruned)
    }

    /// Expand a node by adding one child per legal move of `state`.
    ///
    /// `state` must be the position at `node_id`. Each move is applied to a
    /// clone to learn the next actor; children reached by a game-ending move
    /// are born with their terminal outcome proven. Returns the number of
    /// children created, or [`StateError::Inconsistent`] when a successor
    /// names an unknown player or scores the wrong number of players.
    pub fn expand<S>(&mut self, node_id: NodeId, state: &S) -> Result<usize, StateError>
    where
        S: GameState<Move = M>,
    {
        let moves = state.legal_moves();
        let players = state.player_count();
        let weights = if self.get(node_id).is_chance() {
            let weights = state.chance_weights();
            if weights.len() != moves.len() {
                return Err(StateError::Inconsistent(format!(
                    "{} chance weights for {} legal moves",
                    weights.len(),
                    moves.len()
                )));
            }
            Some(weights)
        } else {
            None
        };

        let mut children = Vec::with_capacity(moves.len());
        for (i, mv) in moves.into_iter().enumerate() {
            let mut next = state.clone();
            let player = next.apply_move(&mv)?;
            check_state(&next, players)?;
            if !next.is_terminal() {
                check_actor(player, players)?;
            }
            let mut child = MctsNode::new_child(node_id, mv, player, players, self.score_range);
            if let Some(weights) = &weights {
                child.weight = weights[i];
            }
            if next.is_terminal() {
                child.set_proven(next.terminal_score());
            }
            children.push(self.allocate(child));
        }

        let count = children.len();
        self.get_mut(node_id).children = Some(children);
        Ok(count)
    }

    /// Backpropagate a simulation score from `leaf_id` to the root.
    ///
    /// Every node on the path gains one visit and the score vector. In
    /// bound mode each node's bounds are re-aggregated from its children and
    /// dominated children are pruned. In proof mode a node whose outcome
    /// becomes known is marked proven; propagation of proofs stops at the
    /// first ancestor that cannot be proven.
    pub fn backpropagate(&mut self, leaf_id: NodeId, score: &[f64], mode: BackpropMode) {
        let mut prove = mode.prove;
        let mut current_id = leaf_id;

        while current_id.is_some() {
            self.get_mut(current_id).record(score);

            if self.get(current_id).is_expanded() {
                if mode.bounds {
                    self.update_bounds(current_id);
                    if self.prune_dominated(current_id) > 0 {
                        self.update_bounds(current_id);
                    }
                }
                if prove {
                    // No point proving ancestors if this node is still open
                    prove = self.try_prove(current_id);
                }
            }

            current_id = self.get(current_id).parent;
        }
    }

    /// Re-aggregate a node's bounds from its live children.
    ///
    /// A deciding node takes the maximum over children for its own player and
    /// the minimum for everyone else. A chance node takes the widest envelope.
    pub fn update_bounds(&mut self, node_id: NodeId) {
        let node = self.get(node_id);
        if node.is_proven() {
            return;
        }

        let players = node.score.len();
        let own = (!node.is_chance()).then_some(node.player as usize);
        let mut optimistic = vec![f64::NEG_INFINITY; players];
        let mut pessimistic = vec![f64::NEG_INFINITY; players];
        let mut any = false;

        for (i, child_id) in self.live_children(node_id).enumerate() {
            let child = self.get(child_id);
            any = true;
            for p in 0..players {
                let (opt, pess) = (child.optimistic[p], child.pessimistic[p]);
                if i == 0 {
                    optimistic[p] = opt;
                    pessimistic[p] = pess;
                    continue;
                }
                match own {
                    Some(own) if own == p => {
                        optimistic[p] = optimistic[p].max(opt);
                        pessimistic[p] = pessimistic[p].max(pess);
                    }
                    Some(_) => {
                        optimistic[p] = optimistic[p].min(opt);
                        pessimistic[p] = pessimistic[p].min(pess);
                    }
                    None => {
                        optimistic[p] = optimistic[p].max(opt);
                        pessimistic[p] = pessimistic[p].min(pess);
                    }
                }
            }
        }

        if any {
            let node = self.get_mut(node_id);
            node.optimistic = optimistic;
            node.pessimistic = pessimistic;
        }
    }

    /// Prune live children whose optimistic bound for the node's player is
    /// below the node's pessimistic bound. Returns how many were pruned.
    pub fn prune_dominated(&mut self, node_id: NodeId) -> usize {
        let node = self.get(node_id);
        if node.is_chance() {
            return 0;
        }
        let p = node.player as usize;
        let floor = node.pessimistic[p];

        let dominated: Vec<NodeId> = self
            .live_children(node_id)
            .filter(|c| self.get(*c).optimistic[p] < floor - EPSILON)
            .collect();

        for &child_id in &dominated {
            trace!(node = node_id.0, child = child_id.0, floor, "Pruned dominated child");
            self.get_mut(child_id).pruned = true;
        }
        dominated.len()
    }

    /// Try to settle a node's outcome from its children.
    ///
    /// A deciding node is proven once every live child is proven, or as soon
    /// as one live child is a proven maximal win for its player. All other
    /// children are then pruned. A chance node is proven once every live
    /// child is proven, with the weighted mean outcome. The accumulated score
    /// is rescaled to `visits * outcome` so UCT keeps its scale.
    pub fn try_prove(&mut self, node_id: NodeId) -> bool {
        let live: Vec<NodeId> = self.live_children(node_id).collect();
        if live.is_empty() {
            return false;
        }

        let node = self.get(node_id);
        let outcome = if node.is_chance() {
            match self.weighted_outcome(&live) {
                Some(outcome) => outcome,
                None => return false,
            }
        } else {
            let p = node.player as usize;
            let mut best: Option<(NodeId, f64)> = None;
            let mut all_proven = true;
            for &child_id in &live {
                match &self.get(child_id).proven {
                    Some(o) if best.map_or(true, |(_, v)| o[p] > v) => best = Some((child_id, o[p])),
                    Some(_) => {}
                    None => all_proven = false,
                }
            }

            let Some((best_id, best_value)) = best else {
                return false;
            };
            if !all_proven && best_value < self.score_range.1 - EPSILON {
                return false;
            }

            for &child_id in &live {
                if child_id != best_id {
                    self.get_mut(child_id).pruned = true;
                }
            }
            match &self.get(best_id).proven {
                Some(outcome) => outcome.clone(),
                None => return false,
            }
        };

        let node = self.get_mut(node_id);
        node.score = outcome.iter().map(|o| o * node.visits).collect();
        node.set_proven(outcome);
        trace!(node = node_id.0, outcome = ?node.proven, "Proved node");
        true
    }

    /// Weighted mean of the proven outcomes of `children`, if all are proven.
    fn weighted_outcome(&self, children: &[NodeId]) -> Option<Vec<f64>> {
        let players = self.get(children[0]).score.len();
        let mut total = vec![0.0; players];
        let mut weight_sum = 0.0;
        for &child_id in children {
            let child = self.get(child_id);
            let outcome = child.proven.as_ref()?;
            for (t, o) in total.iter_mut().zip(outcome) {
                *t += child.weight * o;
            }
            weight_sum += child.weight;
        }
        if weight_sum <= 0.0 {
            return None;
        }
        Some(total.into_iter().map(|t| t / weight_sum).collect())
    }

    /// Find the root's child reached by `mv`.
    pub fn find_child(&self, mv: &M) -> Option<NodeId> {
        self.get(self.root)
            .child_ids()
            .iter()
            .copied()
            .find(|&c| self.get(c).mv.as_ref() == Some(mv))
    }

    /// Re-root the tree at the child reached by `mv`.
    ///
    /// The subtree is compacted into a fresh arena and every other node is
    /// freed. Returns None on a tree miss (root unexpanded or `mv` unknown),
    /// in which case the caller builds a fresh root.
    pub fn rebase(self, mv: &M) -> Option<Self> {
        let new_root = self.find_child(mv)?;

        // Breadth-first order of the kept subtree defines the new ids
        let mut remap = vec![NodeId::NONE; self.nodes.len()];
        let mut order = vec![new_root];
        let mut i = 0;
        while i < order.len() {
            let id = order[i];
            remap[id.index()] = NodeId(i as u32);
            order.extend_from_slice(self.get(id).child_ids());
            i += 1;
        }

        let mut slots: Vec<Option<MctsNode<M>>> = self.nodes.into_iter().map(Some).collect();
        let mut nodes = Vec::with_capacity(order.len());
        for id in order {
            let Some(mut node) = slots[id.index()].take() else {
                continue;
            };
            node.parent = if id == new_root {
                NodeId::NONE
            } else {
                remap[node.parent.index()]
            };
            if let Some(children) = node.children.as_mut() {
                for child in children.iter_mut() {
                    *child = remap[child.index()];
                }
            }
            nodes.push(node);
        }

        if let Some(root) = nodes.first_mut() {
            root.pruned = false;
        }

        Some(Self {
            nodes,
            root: NodeId(0),
            score_range: self.score_range,
        })
    }

    /// Most visited child of `node_id`, first in move order on ties.
    pub fn most_visited_child(&self, node_id: NodeId) -> Option<NodeId> {
        let mut best: Option<(NodeId, f64)> = None;
        for &child_id in self.get(node_id).child_ids() {
            let visits = self.get(child_id).visits;
            if best.map_or(true, |(_, v)| visits > v) {
                best = Some((child_id, visits));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Moves along the most-visited path from the root.
    pub fn principal_variation(&self, max_len: usize) -> Vec<M> {
        let mut line = Vec::new();
        let mut current = self.root;
        while line.len() < max_len {
            let Some(child_id) = self.most_visited_child(current) else {
                break;
            };
            let child = self.get(child_id);
            if child.visits <= 0.0 {
                break;
            }
            if let Some(mv) = &child.mv {
                line.push(mv.clone());
            }
            current = child_id;
        }
        line
    }

    /// Get statistics about the tree for debugging.
    pub fn stats(&self) -> TreeStats {
        let root = self.get(self.root);
        TreeStats {
            total_nodes: self.nodes.len(),
            root_visits: root.visits,
            pruned_nodes: self.nodes.iter().filter(|n| n.pruned).count(),
            proven_nodes: self.nodes.iter().filter(|n| n.is_proven()).count(),
            max_depth: self.compute_max_depth(),
        }
    }

    fn compute_max_depth(&self) -> u32 {
        let mut max_depth = 0;
        let mut stack = vec![(self.root, 0u32)];
        while let Some((node_id, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            for &child_id in self.get(node_id).child_ids() {
                stack.push((child_id, depth + 1));
            }
        }
        max_depth
    }
}

/// Statistics about an MCTS tree.
#[derive(Debug, Clone)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub root_visits: f64,
    pub pruned_nodes: usize,
    pub proven_nodes: usize,
    pub max_depth: u32,
}
