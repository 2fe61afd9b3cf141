//! Connect 4 game implementation for the MCTS engine
//!
//! Connect 4 is a two-player connection game where players drop colored discs
//! into a 7-column, 6-row vertically suspended grid. The objective is to be
//! the first to form a horizontal, vertical, or diagonal line of four discs.
//!
//! # Board Layout
//!
//! The board is stored in row-major order, with row 0 at the bottom:
//! ```text
//! Row 5: [35][36][37][38][39][40][41]  <- Top
//! Row 4: [28][29][30][31][32][33][34]
//! Row 3: [21][22][23][24][25][26][27]
//! Row 2: [14][15][16][17][18][19][20]
//! Row 1: [ 7][ 8][ 9][10][11][12][13]
//! Row 0: [ 0][ 1][ 2][ 3][ 4][ 5][ 6]  <- Bottom
//!         Col 0  1  2  3  4  5  6
//! ```
//!
//! # Usage
//!
//! ```rust
//! use engine_core::GameState;
//! use games_connect4::State;
//!
//! let mut state = State::new();
//! state.apply_move(&3).unwrap(); // Red drops into the center column
//! assert_eq!(state.acting_player(), 1);
//! ```

use std::fmt;

use engine_core::{draw, win_for, GameState, PlayerId, StateError};

/// Board dimensions
pub const COLS: usize = 7;
pub const ROWS: usize = 6;
pub const BOARD_SIZE: usize = COLS * ROWS; // 42

/// Connect4 game state
///
/// Represents the complete state of a Connect4 game including the board,
/// current player, and winner information. Moves are column indices 0-6.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct State {
    /// Board representation: 0=empty, 1=Red (player 1), 2=Yellow (player 2)
    /// Stored in row-major order with row 0 at the bottom
    board: [u8; BOARD_SIZE],
    /// Current player: 1=Red, 2=Yellow
    current_player: u8,
    /// Winner: 0=none/ongoing, 1=Red, 2=Yellow, 3=draw
    winner: u8,
    /// Height of each column (0-6 means number of pieces in column)
    column_heights: [u8; COLS],
}

impl State {
    /// Create a new initial game state
    pub fn new() -> Self {
        Self {
            board: [0; BOARD_SIZE],
            current_player: 1, // Red goes first
            winner: 0,
            column_heights: [0; COLS],
        }
    }

    /// Play a sequence of columns from the initial position.
    pub fn from_moves(columns: &[u8]) -> Result<Self, StateError> {
        let mut state = Self::new();
        for column in columns {
            state.apply_move(column)?;
        }
        Ok(state)
    }

    /// Check if the game is over
    pub fn is_done(&self) -> bool {
        self.winner != 0
    }

    /// Winner: 0=none/ongoing, 1=Red, 2=Yellow, 3=draw
    pub fn winner(&self) -> u8 {
        self.winner
    }

    /// Bit-mask representation of legal moves.
    ///
    /// Bits 0-6 correspond to columns 0-6. A bit set to 1 indicates the
    /// column is not full and a piece can be dropped there.
    pub fn legal_moves_mask(&self) -> u8 {
        if self.is_done() {
            return 0;
        }

        self.column_heights
            .iter()
            .enumerate()
            .fold(0u8, |mask, (col, &height)| {
                if height < ROWS as u8 {
                    mask | (1u8 << col)
                } else {
                    mask
                }
            })
    }

    /// Convert column and row to board index
    #[inline]
    fn pos(col: usize, row: usize) -> usize {
        row * COLS + col
    }

    /// Check if the piece at (col, row) creates a winning line
    fn check_winner_at(&self, col: usize, row: usize) -> u8 {
        let player = self.board[Self::pos(col, row)];
        if player == 0 {
            return 0;
        }

        // Direction vectors: horizontal, vertical, diagonal /, diagonal \
        let directions: [(i32, i32); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

        for (dc, dr) in directions {
            let count = 1
                + self.run_length(col, row, dc, dr, player)
                + self.run_length(col, row, -dc, -dr, player);
            if count >= 4 {
                return player;
            }
        }

        // Check for draw (board full but no winner)
        if self.column_heights.iter().all(|&h| h >= ROWS as u8) {
            return 3; // Draw
        }

        0 // Game ongoing
    }

    /// Pieces of `player` extending from (col, row) along (dc, dr),
    /// not counting the starting cell.
    fn run_length(&self, col: usize, row: usize, dc: i32, dr: i32, player: u8) -> usize {
        let mut count = 0;
        let (mut c, mut r) = (col as i32 + dc, row as i32 + dr);
        while c >= 0 && c < COLS as i32 && r >= 0 && r < ROWS as i32 {
            if self.board[Self::pos(c as usize, r as usize)] != player {
                break;
            }
            count += 1;
            c += dc;
            r += dr;
        }
        count
    }

    /// Get the row where the last piece was placed in a column
    pub fn last_row_in_column(&self, col: usize) -> Option<usize> {
        if self.column_heights[col] == 0 {
            None
        } else {
            Some((self.column_heights[col] - 1) as usize)
        }
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

        (0..COLS as u8)
            .filter(|&col| self.column_heights[col as usize] < ROWS as u8)
            .collect()
    }

    fn apply_move(&mut self, column: &u8) -> Result<PlayerId, StateError> {
        if self.is_done() {
            return Err(StateError::GameOver);
        }
        let col = *column as usize;
        if col >= COLS || self.column_heights[col] >= ROWS as u8 {
            return Err(StateError::IllegalMove(format!("column {column}")));
        }

        let row = self.column_heights[col] as usize;
        self.board[Self::pos(col, row)] = self.current_player;
        self.column_heights[col] += 1;
        self.winner = self.check_winner_at(col, row);

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

/// Move heuristic preferring central columns.
///
/// Central columns take part in more possible lines. Scores 1.0 for the
/// center column down to -1.0 for the edges.
pub fn column_preference(_state: &State, column: &u8) -> f64 {
    let center = (COLS / 2) as f64;
    let distance = (*column as f64 - center).abs();
    1.0 - 2.0 * distance / center
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..ROWS).rev() {
            let line: String = (0..COLS)
                .map(|col| match self.board[Self::pos(col, row)] {
                    1 => 'R',
                    2 => 'Y',
                    _ => '.',
                })
                .collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
