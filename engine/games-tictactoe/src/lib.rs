//! TicTacToe game implementation for the MCTS engine
//!
//! This crate provides a complete reference implementation of TicTacToe
//! demonstrating how to implement the `GameState` contract.
//!
//! # Usage
//!
//! ```rust
//! use engine_core::GameState;
//! use games_tictactoe::State;
//!
//! let mut state = State::new();
//! state.apply_move(&4).unwrap(); // X takes the center
//! assert_eq!(state.acting_player(), 1);
//! assert_eq!(state.legal_moves().len(), 8);
//! ```

use std::fmt;

use engine_core::{draw, win_for, GameState, PlayerId, StateError};

/// Winning positions (rows, columns, diagonals)
const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8], // rows
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8], // columns
    [0, 4, 8],
    [2, 4, 6], // diagonals
];

/// TicTacToe game state
///
/// Represents the complete state of a TicTacToe game including the board,
/// current player, and winner information. Moves are cell indices 0-8,
/// row-major from the top left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct State {
    /// Board representation: 0=empty, 1=X, 2=O
    board: [u8; 9],
    /// Current player: 1=X, 2=O
    current_player: u8,
    /// Winner: 0=none/ongoing, 1=X, 2=O, 3=draw
    winner: u8,
}

impl State {
    /// Create a new initial game state
    pub fn new() -> Self {
        Self {
            board: [0; 9],
            current_player: 1, // X goes first
            winner: 0,
        }
    }

    /// Play a sequence of cell indices from the initial position.
    pub fn from_moves(moves: &[u8]) -> Result<Self, StateError> {
        let mut state = Self::new();
        for mv in moves {
            state.apply_move(mv)?;
        }
        Ok(state)
    }

    /// Cell index of a (row, column) pair.
    pub fn cell(row: u8, col: u8) -> u8 {
        row * 3 + col
    }

    /// Check if the game is over
    pub fn is_done(&self) -> bool {
        self.winner != 0
    }

    /// Winner: 0=none/ongoing, 1=X, 2=O, 3=draw
    pub fn winner(&self) -> u8 {
        self.winner
    }

    /// Bit-mask representation of legal moves.
    ///
    /// Bits 0-8 correspond to board positions 0-8. A bit set to 1 indicates the
    /// position is currently legal. When the game is finished the mask is zeroed.
    pub fn legal_moves_mask(&self) -> u16 {
        if self.is_done() {
            return 0;
        }

        self.board
            .iter()
            .enumerate()
            .fold(0u16, |mask, (idx, cell)| {
                if *cell == 0 {
                    mask | (1u16 << idx)
                } else {
                    mask
                }
            })
    }

    /// Check for winner on the board
    fn check_winner(board: &[u8; 9]) -> u8 {
        for line in &LINES {
            let [a, b, c] = *line;
            if board[a] != 0 && board[a] == board[b] && board[b] == board[c] {
                return board[a]; // Return the winning player
            }
        }

        // Check for draw (board full but no winner)
        if board.iter().all(|&cell| cell != 0) {
            return 3; // Draw
        }

        0 // Game ongoing
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState for State {
    type Move = u8;

    fn legal_moves(&self) -> Vec<u8> {
        if self.is_done() {
            return Vec::new();
        }

        (0..9u8)
            .filter(|&pos| self.board[pos as usize] == 0)
            .collect()
    }

    fn apply_move(&mut self, position: &u8) -> Result<PlayerId, StateError> {
        if self.is_done() {
            return Err(StateError::GameOver);
        }
        let position = *position;
        if position >= 9 || self.board[position as usize] != 0 {
            return Err(StateError::IllegalMove(format!("cell {position}")));
        }

        self.board[position as usize] = self.current_player;
        self.winner = Self::check_winner(&self.board);

        // Switch player if game not over
        if self.winner == 0 {
            self.current_player = if self.current_player == 1 { 2 } else { 1 };
        }
        Ok(self.acting_player())
    }

    fn is_terminal(&self) -> bool {
        self.is_done()
    }

    fn acting_player(&self) -> PlayerId {
        PlayerId::from(self.current_player) - 1
    }

    fn player_count(&self) -> usize {
        2
    }

    fn terminal_score(&self) -> Vec<f64> {
        match self.winner {
            1 => win_for(0, 2),
            2 => win_for(1, 2),
            _ => draw(2),
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.board.chunks(3) {
            let line: String = row
                .iter()
                .map(|cell| match cell {
                    1 => 'X',
                    2 => 'O',
                    _ => '.',
                })
                .collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
