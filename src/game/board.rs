//! Board snapshots and the rules derived from them
//!
//! Everything here is a pure function of a single [`Board`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of squares on the board
pub const SQUARE_COUNT: usize = 9;

/// The 8 winning lines, checked in this order: rows, columns, diagonals
pub const WINNING_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// A player mark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    X,
    O,
}

impl Player {
    pub fn as_str(&self) -> &'static str {
        match self {
            Player::X => "X",
            Player::O => "O",
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable 3x3 board state, squares indexed row-major 0..9
///
/// Serialized as a 9-element JSON array of `"X"`, `"O"` or `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board([Option<Player>; SQUARE_COUNT]);

impl Board {
    /// Nine empty squares
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_squares(squares: [Option<Player>; SQUARE_COUNT]) -> Self {
        Self(squares)
    }

    pub fn squares(&self) -> &[Option<Player>; SQUARE_COUNT] {
        &self.0
    }

    /// Mark at `index` (`None` when empty or out of range)
    pub fn get(&self, index: usize) -> Option<Player> {
        self.0.get(index).copied().flatten()
    }

    /// Copy of this board with `index` set to `player`
    pub fn with_move(&self, index: usize, player: Player) -> Self {
        let mut squares = self.0;
        squares[index] = Some(player);
        Self(squares)
    }

    /// Number of squares holding `player`
    pub fn count(&self, player: Player) -> usize {
        self.0.iter().filter(|s| **s == Some(player)).count()
    }

    pub fn filled(&self) -> usize {
        self.0.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_full(&self) -> bool {
        self.filled() == SQUARE_COUNT
    }

    /// Whose turn it is: X when both players have the same count, else O
    pub fn next_player(&self) -> Player {
        if self.count(Player::X) == self.count(Player::O) {
            Player::X
        } else {
            Player::O
        }
    }

    /// Owner of the first fully-owned line, if any
    pub fn winner(&self) -> Option<Player> {
        WINNING_LINES.iter().find_map(|&[a, b, c]| {
            let mark = self.0[a]?;
            (self.0[b] == Some(mark) && self.0[c] == Some(mark)).then_some(mark)
        })
    }

    /// Status derived from this board alone
    pub fn status(&self) -> GameStatus {
        status(self.winner(), self, self.next_player())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, squares) in self.0.chunks(3).enumerate() {
            if row > 0 {
                writeln!(f)?;
            }
            for (col, square) in squares.iter().enumerate() {
                if col > 0 {
                    f.write_str("|")?;
                }
                f.write_str(square.map(|p| p.as_str()).unwrap_or(" "))?;
            }
        }
        Ok(())
    }
}

/// Game status shown above the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Winner(Player),
    /// Board full with no winner
    Scratch,
    Next(Player),
}

impl GameStatus {
    /// Whether no further moves can be made
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GameStatus::Next(_))
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::Winner(player) => write!(f, "Winner: {}", player),
            GameStatus::Scratch => f.write_str("Scratch: Cat's game"),
            GameStatus::Next(player) => write!(f, "Next player: {}", player),
        }
    }
}

/// Classify a board: winner first, then full board, else next player
pub fn status(winner: Option<Player>, board: &Board, next_player: Player) -> GameStatus {
    match winner {
        Some(player) => GameStatus::Winner(player),
        None if board.is_full() => GameStatus::Scratch,
        None => GameStatus::Next(next_player),
    }
}
