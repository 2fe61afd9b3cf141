//! MCTS configuration parameters.

use std::time::Duration;

/// How the recommended move is picked from the root's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FinalSelection {
    /// Most visited child.
    #[default]
    RobustChild,
    /// Child with the highest blended score plus bound bias.
    MaxChild,
}

impl std::str::FromStr for FinalSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "robust" | "robustchild" => Ok(Self::RobustChild),
            "max" | "maxchild" => Ok(Self::MaxChild),
            other => Err(format!("unknown final selection policy: {other}")),
        }
    }
}

/// Configuration for Monte Carlo Tree Search.
#[derive(Debug, Clone)]
pub struct MctsConfig {
    /// Exploration constant for the UCT formula.
    /// Higher values encourage exploration, lower values favor exploitation.
    pub exploration_constant: f64,

    /// Weight applied to the heuristic plug-in during selection.
    pub heuristic_weight: f64,

    /// Selection bias applied to a child's optimistic bound.
    pub optimistic_bias: f64,

    /// Selection bias applied to a child's pessimistic bound.
    pub pessimistic_bias: f64,

    /// Maintain optimistic/pessimistic score bounds and prune dominated children.
    pub bounds: bool,

    /// Propagate proven outcomes upward and prune around them.
    pub prove: bool,

    /// Number of cycles per search. 0 means no iteration budget.
    pub iterations: u32,

    /// Wall-clock budget per search. Only consulted without an iteration budget.
    pub time_budget: Option<Duration>,

    /// Policy used to turn statistics into a move.
    pub final_selection: FinalSelection,

    /// Independent trees searched in parallel. Values above 1 enable voting.
    pub root_threads: usize,

    /// Heuristic-derived visits seeded into each new child. 0.0 disables seeding.
    pub virtual_visits: f64,

    /// Node count at which the tree raises the low-memory signal. 0 disables the cap.
    pub max_nodes: usize,

    /// Keep the tree between searches of the same position or of a position
    /// reached through `advance`.
    pub reuse_tree: bool,

    /// Lowest and highest terminal score a player can receive.
    /// Used to initialize bounds and to recognise a maximal win.
    pub score_range: (f64, f64),
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            exploration_constant: std::f64::consts::SQRT_2,
            heuristic_weight: 1.0,
            optimistic_bias: 0.0,
            pessimistic_bias: 0.0,
            bounds: false,
            prove: true,
            iterations: 10_000,
            time_budget: None,
            final_selection: FinalSelection::RobustChild,
            root_threads: 1,
            virtual_visits: 0.0,
            max_nodes: 0,
            reuse_tree: true,
            score_range: (0.0, 1.0),
        }
    }
}

impl MctsConfig {
    /// Create config for interactive play under a time budget.
    pub fn for_play(time_budget: Duration) -> Self {
        Self {
            iterations: 0,
            time_budget: Some(time_budget),
            ..Self::default()
        }
    }

    /// Create a fast config for testing.
    pub fn for_testing() -> Self {
        Self {
            iterations: 200,
            ..Self::default()
        }
    }

    /// Whether neither an iteration nor a time budget is set.
    /// Such searches run until externally signaled.
    pub fn is_unbounded(&self) -> bool {
        self.iterations == 0 && self.time_budget.map_or(true, |t| t.is_zero())
    }

    /// Check the parameters a search cannot run with.
    pub fn validate(&self) -> Result<(), String> {
        let (min, max) = self.score_range;
        if !(min.is_finite() && max.is_finite() && min < max) {
            return Err(format!("score range ({min}, {max}) must be finite and increasing"));
        }
        if !self.exploration_constant.is_finite() || self.exploration_constant < 0.0 {
            return Err(format!(
                "exploration constant must be a non-negative number, got {}",
                self.exploration_constant
            ));
        }
        if !self.virtual_visits.is_finite() || self.virtual_visits < 0.0 {
            return Err(format!(
                "virtual visits must be non-negative, got {}",
                self.virtual_visits
            ));
        }
        Ok(())
    }

    /// Builder pattern: set number of iterations.
    pub fn with_iterations(mut self, n: u32) -> Self {
        self.iterations = n;
        self
    }

    /// Builder pattern: set the time budget.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    /// Builder pattern: set the exploration constant.
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration_constant = c;
        self
    }

    /// Builder pattern: set the heuristic weight.
    pub fn with_heuristic_weight(mut self, w: f64) -> Self {
        self.heuristic_weight = w;
        self
    }

    /// Builder pattern: enable bound mode with the given selection biases.
    pub fn with_bounds(mut self, optimistic_bias: f64, pessimistic_bias: f64) -> Self {
        self.bounds = true;
        self.optimistic_bias = optimistic_bias;
        self.pessimistic_bias = pessimistic_bias;
        self
    }

    /// Builder pattern: toggle proof mode.
    pub fn with_prove(mut self, prove: bool) -> Self {
        self.prove = prove;
        self
    }

    /// Builder pattern: set the final-move policy.
    pub fn with_final_selection(mut self, policy: FinalSelection) -> Self {
        self.final_selection = policy;
        self
    }

    /// Builder pattern: set the number of root-parallel trees.
    pub fn with_root_threads(mut self, threads: usize) -> Self {
        self.root_threads = threads.max(1);
        self
    }

    /// Builder pattern: set heuristic virtual visits.
    pub fn with_virtual_visits(mut self, visits: f64) -> Self {
        self.virtual_visits = visits;
        self
    }

    /// Builder pattern: cap the tree size.
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    /// Builder pattern: toggle tree reuse between searches.
    pub fn with_reuse_tree(mut self, reuse: bool) -> Self {
        self.reuse_tree = reuse;
        self
    }

    /// Builder pattern: set the terminal score range.
    pub fn with_score_range(mut self, min: f64, max: f64) -> Self {
        self.score_range = (min, max);
        self
    }
}
