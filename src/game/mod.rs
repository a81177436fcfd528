//! Tic-tac-toe rules and history
//!
//! - `board`: pure rules over one snapshot (winner, next player, status)
//! - `engine`: persisted history with time travel and branching

pub mod board;
pub mod engine;

pub use board::{Board, GameStatus, Player, SQUARE_COUNT, WINNING_LINES, status};
pub use engine::{GameEngine, GameView, HistoryEntry, IgnoreReason, MoveOutcome, history_label};
