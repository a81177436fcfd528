//! Game engine: move history with time travel
//!
//! State is the full list of board snapshots plus the index being viewed.
//! Both halves are persisted separately so a reload resumes the same game
//! at the same history position.

use std::rc::Rc;

use super::board::{Board, GameStatus, Player, SQUARE_COUNT};
use crate::error::GameError;
use crate::persistence::{KeyValueStore, PersistedValue};
use crate::settings::Settings;

/// Why a square selection had no effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The viewed board already has a winner
    GameWon(Player),
    /// The square is already marked
    Occupied,
}

/// Result of [`GameEngine::select_square`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Placed { player: Player, square: usize },
    Ignored(IgnoreReason),
}

/// One row of the history panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub index: usize,
    pub label: String,
    /// Entry currently shown (rendered disabled)
    pub is_current: bool,
}

/// Everything the UI needs to draw the game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameView {
    pub squares: [Option<Player>; SQUARE_COUNT],
    pub status: String,
    pub history: Vec<HistoryEntry>,
}

/// Label for the history button at `index`
pub fn history_label(index: usize) -> String {
    if index == 0 {
        "Reset history".to_string()
    } else {
        format!("History item {}", index + 1)
    }
}

/// Whether `next` is `prev` plus exactly one mark by the player to move
fn is_legal_step(prev: &Board, next: &Board) -> bool {
    if prev.winner().is_some() {
        return false;
    }
    let player = prev.next_player();
    let mut placed = 0;
    for (before, after) in prev.squares().iter().zip(next.squares()) {
        if before == after {
            continue;
        }
        if before.is_some() || *after != Some(player) {
            return false;
        }
        placed += 1;
    }
    placed == 1
}

/// Tic-tac-toe with persisted history
pub struct GameEngine {
    history: PersistedValue<Vec<Board>>,
    current: PersistedValue<usize>,
}

impl GameEngine {
    /// Open the game stored under the keys in `settings`
    pub fn new(store: Rc<dyn KeyValueStore>, settings: &Settings) -> Self {
        let history =
            PersistedValue::new_with(store.clone(), settings.history_key.as_str(), || {
                vec![Board::empty()]
            });
        let current = PersistedValue::new(store, settings.index_key.as_str(), 0usize);

        let mut engine = Self { history, current };
        engine.repair();
        log::info!(
            "Game loaded: {} moves, viewing {} ({})",
            engine.history().len() - 1,
            engine.current_index(),
            engine.status()
        );
        engine
    }

    /// Bring a loaded game back within its invariants
    fn repair(&mut self) {
        if self.history.get().first() != Some(&Board::empty()) {
            log::warn!("Stored history does not start from an empty board, starting over");
            self.restart();
            return;
        }
        if let Some(step) = self
            .history
            .get()
            .windows(2)
            .position(|pair| !is_legal_step(&pair[0], &pair[1]))
        {
            log::warn!("Stored history has an illegal move at entry {}, starting over", step + 1);
            self.restart();
            return;
        }
        let last = self.history.get().len() - 1;
        if *self.current.get() > last {
            log::warn!(
                "Stored history index {} past last entry {}, clamping",
                self.current.get(),
                last
            );
            self.current.set(last);
        }
    }

    /// All snapshots, oldest first
    pub fn history(&self) -> &[Board] {
        self.history.get()
    }

    pub fn current_index(&self) -> usize {
        *self.current.get()
    }

    /// Snapshot at the current history position
    pub fn current_board(&self) -> &Board {
        &self.history.get()[self.current_index()]
    }

    pub fn winner(&self) -> Option<Player> {
        self.current_board().winner()
    }

    pub fn next_player(&self) -> Player {
        self.current_board().next_player()
    }

    pub fn status(&self) -> GameStatus {
        self.current_board().status()
    }

    /// Play the next mark on `square`, branching from the current position
    ///
    /// Moves made while viewing an earlier entry discard every later entry.
    /// Clicks on a marked square or a won board are ignored.
    pub fn select_square(&mut self, square: usize) -> Result<MoveOutcome, GameError> {
        if square >= SQUARE_COUNT {
            return Err(GameError::InvalidSquare { index: square });
        }

        let board = *self.current_board();
        if let Some(winner) = board.winner() {
            log::debug!("Ignoring square {}: {} already won", square, winner);
            return Ok(MoveOutcome::Ignored(IgnoreReason::GameWon(winner)));
        }
        if board.get(square).is_some() {
            log::debug!("Ignoring square {}: occupied", square);
            return Ok(MoveOutcome::Ignored(IgnoreReason::Occupied));
        }

        let player = board.next_player();
        let next = board.with_move(square, player);
        let keep = self.current_index() + 1;
        let discarded = self.history.get().len() - keep;

        self.history.update(|history| {
            history.truncate(keep);
            history.push(next);
        });
        self.current.set(keep);

        if discarded > 0 {
            log::info!("{} plays {} (discarded {} later moves)", player, square, discarded);
        } else {
            log::info!("{} plays {}", player, square);
        }
        Ok(MoveOutcome::Placed { player, square })
    }

    /// View the snapshot at `index` without changing the history
    pub fn jump_to(&mut self, index: usize) -> Result<(), GameError> {
        let len = self.history.get().len();
        if index >= len {
            return Err(GameError::InvalidHistoryIndex { index, len });
        }
        self.current.set(index);
        log::info!("Jumped to history entry {}", index);
        Ok(())
    }

    /// Back to a single empty board
    pub fn restart(&mut self) {
        self.history.set(vec![Board::empty()]);
        self.current.set(0);
        log::info!("Game restarted");
    }

    /// History panel rows with the current entry marked
    pub fn history_entries(&self) -> Vec<HistoryEntry> {
        let current = self.current_index();
        (0..self.history.get().len())
            .map(|index| HistoryEntry {
                index,
                label: history_label(index),
                is_current: index == current,
            })
            .collect()
    }

    pub fn view(&self) -> GameView {
        GameView {
            squares: *self.current_board().squares(),
            status: self.status().to_string(),
            history: self.history_entries(),
        }
    }
}
