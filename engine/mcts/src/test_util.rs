//! Small synthetic games for unit tests.

use engine_core::{GameState, PlayerId, StateError, CHANCE_PLAYER};

/// Two-ply game: player 0 picks a row, player 1 picks a column, and the
/// table entry is player 0's score (player 1 receives the complement).
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TwoPly {
    pub table: Vec<Vec<f64>>,
    pub row: Option<usize>,
    pub col: Option<usize>,
}

impl TwoPly {
    pub fn new(table: Vec<Vec<f64>>) -> Self {
        Self {
            table,
            row: None,
            col: None,
        }
    }

    /// Row maximising player 0's worst case.
    pub fn minimax_rows(&self) -> Vec<usize> {
        let values: Vec<f64> = self
            .table
            .iter()
            .map(|row| row.iter().cloned().fold(f64::INFINITY, f64::min))
            .collect();
        let best = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        values
            .iter()
            .enumerate()
            .filter(|(_, v)| (**v - best).abs() < 1e-12)
            .map(|(i, _)| i)
            .collect()
    }
}

impl GameState for TwoPly {
    type Move = usize;

    fn legal_moves(&self) -> Vec<usize> {
        match (self.row, self.col) {
            (None, _) => (0..self.table.len()).collect(),
            (Some(r), None) => (0..self.table[r].len()).collect(),
            _ => Vec::new(),
        }
    }

    fn apply_move(&mut self, mv: &usize) -> Result<PlayerId, StateError> {
        if !self.legal_moves().contains(mv) {
            return Err(StateError::IllegalMove(mv.to_string()));
        }
        if self.row.is_none() {
            self.row = Some(*mv);
        } else {
            self.col = Some(*mv);
        }
        Ok(self.acting_player())
    }

    fn is_terminal(&self) -> bool {
        self.col.is_some()
    }

    fn acting_player(&self) -> PlayerId {
        if self.row.is_none() {
            0
        } else {
            1
        }
    }

    fn player_count(&self) -> usize {
        2
    }

    fn terminal_score(&self) -> Vec<f64> {
        let v = match (self.row, self.col) {
            (Some(r), Some(c)) => self.table[r][c],
            _ => 0.5,
        };
        vec![v, 1.0 - v]
    }
}

/// A chance event with the given weights followed by the end of the game.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WeightedDraw {
    pub weights: Vec<f64>,
    pub outcome: Option<usize>,
}

impl WeightedDraw {
    pub fn new(weights: Vec<f64>) -> Self {
        Self {
            weights,
            outcome: None,
        }
    }
}

impl GameState for WeightedDraw {
    type Move = usize;

    fn legal_moves(&self) -> Vec<usize> {
        if self.outcome.is_some() {
            Vec::new()
        } else {
            (0..self.weights.len()).collect()
        }
    }

    fn apply_move(&mut self, mv: &usize) -> Result<PlayerId, StateError> {
        if self.outcome.is_some() {
            return Err(StateError::GameOver);
        }
        if *mv >= self.weights.len() {
            return Err(StateError::IllegalMove(mv.to_string()));
        }
        self.outcome = Some(*mv);
        Ok(0)
    }

    fn is_terminal(&self) -> bool {
        self.outcome.is_some()
    }

    fn acting_player(&self) -> PlayerId {
        if self.outcome.is_some() {
            0
        } else {
            CHANCE_PLAYER
        }
    }

    fn player_count(&self) -> usize {
        1
    }

    fn terminal_score(&self) -> Vec<f64> {
        // Outcome 0 is the win
        vec![if self.outcome == Some(0) { 1.0 } else { 0.0 }]
    }

    fn chance_weights(&self) -> Vec<f64> {
        self.weights.clone()
    }
}

/// Player 0 picks a die (0 = safe, 1 = risky); chance then rolls it.
/// The safe die always scores 0.6; the risky one wins with probability
/// 1/4 and scores 1.0, else 0.0.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct DiceChoice {
    pub die: Option<usize>,
    pub roll: Option<usize>,
}

impl GameState for DiceChoice {
    type Move = usize;

    fn legal_moves(&self) -> Vec<usize> {
        match (self.die, self.roll) {
            (None, _) => vec![0, 1],
            (Some(0), None) => vec![0],
            (Some(_), None) => vec![0, 1],
            _ => Vec::new(),
        }
    }

    fn apply_move(&mut self, mv: &usize) -> Result<PlayerId, StateError> {
        if self.is_terminal() {
            return Err(StateError::GameOver);
        }
        if !self.legal_moves().contains(mv) {
            return Err(StateError::IllegalMove(mv.to_string()));
        }
        if self.die.is_none() {
            self.die = Some(*mv);
        } else {
            self.roll = Some(*mv);
        }
        Ok(self.acting_player())
    }

    fn is_terminal(&self) -> bool {
        self.roll.is_some()
    }

    fn acting_player(&self) -> PlayerId {
        if self.die.is_some() && self.roll.is_none() {
            CHANCE_PLAYER
        } else {
            0
        }
    }

    fn player_count(&self) -> usize {
        1
    }

    fn terminal_score(&self) -> Vec<f64> {
        match (self.die, self.roll) {
            (Some(0), _) => vec![0.6],
            (Some(_), Some(0)) => vec![1.0],
            _ => vec![0.0],
        }
    }

    fn chance_weights(&self) -> Vec<f64> {
        match self.die {
            Some(0) => vec![1.0],
            _ => vec![1.0, 3.0],
        }
    }
}

/// A game that hands the engine an illegal move list.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Liar;

impl GameState for Liar {
    type Move = u8;

    fn legal_moves(&self) -> Vec<u8> {
        vec![0, 1]
    }

    fn apply_move(&mut self, mv: &u8) -> Result<PlayerId, StateError> {
        Err(StateError::IllegalMove(format!("{mv} was advertised but refused")))
    }

    fn is_terminal(&self) -> bool {
        false
    }

    fn acting_player(&self) -> PlayerId {
        0
    }

    fn player_count(&self) -> usize {
        1
    }

    fn terminal_score(&self) -> Vec<f64> {
        vec![0.0]
    }
}

/// Players 0, 1 and 2 each pick 0 or 1 in turn; the three picks index a
/// fixed outcome table. Every player's best pick is also the worst one for
/// the players who moved before, and optimal play reaches [0.3, 0.3, 0.4]
/// through picks 1, 0, 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ThreePicks {
    pub picks: Vec<usize>,
}

impl ThreePicks {
    const OUTCOMES: [[f64; 3]; 8] = [
        [0.2, 0.2, 0.6],
        [0.4, 0.3, 0.3],
        [0.1, 0.5, 0.4],
        [0.3, 0.6, 0.1],
        [0.3, 0.3, 0.4],
        [0.5, 0.4, 0.1],
        [0.6, 0.2, 0.2],
        [0.4, 0.1, 0.5],
    ];

    pub fn from_picks(picks: &[usize]) -> Self {
        Self {
            picks: picks.to_vec(),
        }
    }

    pub fn outcome(picks: &[usize]) -> Vec<f64> {
        Self::OUTCOMES[picks[0] * 4 + picks[1] * 2 + picks[2]].to_vec()
    }

    /// Player 2's best last pick after `first` and `second`.
    pub fn best_last_pick(first: usize, second: usize) -> usize {
        let zero = Self::outcome(&[first, second, 0])[2];
        let one = Self::outcome(&[first, second, 1])[2];
        if one > zero {
            1
        } else {
            0
        }
    }
}

impl GameState for ThreePicks {
    type Move = usize;

    fn legal_moves(&self) -> Vec<usize> {
        if self.is_terminal() {
            Vec::new()
        } else {
            vec![0, 1]
        }
    }

    fn apply_move(&mut self, mv: &usize) -> Result<PlayerId, StateError> {
        if self.is_terminal() {
            return Err(StateError::GameOver);
        }
        if *mv > 1 {
            return Err(StateError::IllegalMove(mv.to_string()));
        }
        self.picks.push(*mv);
        Ok(self.acting_player())
    }

    fn is_terminal(&self) -> bool {
        self.picks.len() == 3
    }

    fn acting_player(&self) -> PlayerId {
        self.picks.len() as PlayerId
    }

    fn player_count(&self) -> usize {
        3
    }

    fn terminal_score(&self) -> Vec<f64> {
        Self::outcome(&self.picks)
    }
}

/// Two-player game whose outcome only scores one player.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ShortScore {
    pub done: bool,
}

impl GameState for ShortScore {
    type Move = u8;

    fn legal_moves(&self) -> Vec<u8> {
        if self.done {
            Vec::new()
        } else {
            vec![0, 1]
        }
    }

    fn apply_move(&mut self, _mv: &u8) -> Result<PlayerId, StateError> {
        self.done = true;
        Ok(1)
    }

    fn is_terminal(&self) -> bool {
        self.done
    }

    fn acting_player(&self) -> PlayerId {
        if self.done {
            1
        } else {
            0
        }
    }

    fn player_count(&self) -> usize {
        2
    }

    fn terminal_score(&self) -> Vec<f64> {
        vec![0.5]
    }
}

/// Two-player game that hands the turn to player 5 after the first move.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct StrayActor {
    pub plies: u8,
}

impl GameState for StrayActor {
    type Move = u8;

    fn legal_moves(&self) -> Vec<u8> {
        if self.is_terminal() {
            Vec::new()
        } else {
            vec![0, 1]
        }
    }

    fn apply_move(&mut self, _mv: &u8) -> Result<PlayerId, StateError> {
        self.plies += 1;
        Ok(self.acting_player())
    }

    fn is_terminal(&self) -> bool {
        self.plies >= 2
    }

    fn acting_player(&self) -> PlayerId {
        if self.plies == 0 {
            0
        } else {
            5
        }
    }

    fn player_count(&self) -> usize {
        2
    }

    fn terminal_score(&self) -> Vec<f64> {
        vec![0.5, 0.5]
    }
}
