//! Interactive solving engine.
//!
//! The [`Engine`] owns a [`Crossword`], a [`Board`] of current entries, the
//! current [`Selectable`] and an undo history. A user interface calls its
//! operations in response to input and drains [`EngineEvent`]s to learn what
//! to redraw.
//!
//! # Selection
//! A selection is a word plus a cell index within it. Word navigation follows
//! the puzzle's across-then-down cycle, optionally skipping completed words.
//!
//! # Undo
//! With [`UndoMode::Smart`] every edit records the selection it was made under,
//! and the history is dropped as soon as editing continues in a different
//! word, so backspace never undoes an edit made in another word.
//!
//! # Errors
//! Operations that take a word and an index return
//! [`CrosswordError::InvalidArgument`] for unknown words, out-of-range indices
//! and out-of-bounds writes. A rejected operation changes nothing.

pub mod board;
pub mod config;
pub mod undo;

use std::collections::BTreeSet;

use log::{debug, trace, warn};

pub use board::{Board, BoardCell};
pub use config::{EngineConfig, UndoMode};
pub use undo::{CharMatrix, UndoItem, UndoStack};

use crate::crossword::puzzle::Crossword;
use crate::crossword::state::ProgressState;
use crate::crossword::types::{
    error::{CrosswordError, Result},
    models::{Direction, Word},
};

/// A selected cell of a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selectable {
    pub direction: Direction,
    pub number: u32,
    pub cell: usize,
}

impl Selectable {
    pub fn new(word: &Word, cell: usize) -> Self {
        Self {
            direction: word.direction(),
            number: word.number(),
            cell,
        }
    }

    pub fn is_same_word(&self, other: &Selectable) -> bool {
        self.direction == other.direction && self.number == other.number
    }
}

/// Notifications for the user interface, in the order they happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Entries or flags on the board changed.
    Changed,
    /// The puzzle became solved.
    Solved,
    /// The puzzle was solved and no longer is.
    Unsolved,
    SelectionChanged(Option<Selectable>),
}

type WordKey = (Direction, u32);

fn key_of(word: &Word) -> WordKey {
    (word.direction(), word.number())
}

/// Whether every character of `entry` is in `allowed` (case-insensitive).
fn accepts(allowed: &BTreeSet<char>, entry: &str) -> bool {
    !entry.is_empty() && entry.chars().flat_map(char::to_uppercase).all(|c| allowed.contains(&c))
}

/// Solving session over one puzzle.
#[derive(Debug)]
pub struct Engine {
    crossword: Crossword,
    config: EngineConfig,
    board: Board,
    allowed: BTreeSet<char>,
    selection: Option<Selectable>,
    undo: UndoStack,
    solved: bool,
    events: Vec<EngineEvent>,
}

impl Engine {
    /// Starts a session on `crossword` with the first word selected.
    pub fn new(crossword: Crossword, config: EngineConfig) -> Self {
        let mut engine = Self {
            crossword,
            config,
            board: Board::default(),
            allowed: BTreeSet::new(),
            selection: None,
            undo: UndoStack::default(),
            solved: false,
            events: Vec::new(),
        };
        engine.initialize();
        engine
    }

    /// Replaces the puzzle, discarding all entries, history and pending events.
    pub fn set_puzzle(&mut self, crossword: Crossword) {
        self.crossword = crossword;
        self.initialize();
    }

    fn initialize(&mut self) {
        self.board = Board::from_crossword(&self.crossword);
        self.allowed = self
            .crossword
            .alphabet()
            .iter()
            .flat_map(|c| c.to_uppercase())
            .collect();
        self.selection = None;
        self.undo.clear();
        self.events.clear();
        self.solved = self.is_solved();
        debug!(
            "Engine loaded {}x{} puzzle {}",
            self.board.width(),
            self.board.height(),
            self.crossword.hash()
        );
        self.select_next_word();
    }

    pub fn crossword(&self) -> &Crossword {
        &self.crossword
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Applies new policies; toggling error marking re-evaluates every square.
    pub fn set_config(&mut self, config: EngineConfig) {
        let marking_changed = config.mark_errors != self.config.mark_errors;
        self.config = config;
        if marking_changed {
            self.reset_error_markers();
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn selection(&self) -> Option<Selectable> {
        self.selection
    }

    pub fn selected_word(&self) -> Option<&Word> {
        self.selection
            .and_then(|s| self.crossword.find_word(s.direction, s.number))
    }

    pub fn selected_cell(&self) -> Option<usize> {
        self.selection.map(|s| s.cell)
    }

    /// Drains the events produced since the last call.
    pub fn take_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_acceptable(&self, ch: char) -> bool {
        ch.to_uppercase().all(|c| self.allowed.contains(&c))
    }

    // ----- navigation -----

    fn require_word(&self, direction: Direction, number: u32) -> Result<&Word> {
        self.crossword
            .find_word(direction, number)
            .ok_or_else(|| CrosswordError::InvalidArgument(format!("No word {} {}", number, direction)))
    }

    fn square_position(&self, direction: Direction, number: u32, index: usize) -> Result<(usize, usize)> {
        let word = self.require_word(direction, number)?;
        if index >= word.len() {
            return Err(CrosswordError::InvalidArgument(format!(
                "Index {} is outside {} {} (length {})",
                index,
                number,
                direction,
                word.len()
            )));
        }
        Ok(word.position_of(index))
    }

    /// Grid coordinate of a selection; the cell index is clamped to the word.
    fn position(&self, selection: Selectable) -> Option<(usize, usize)> {
        let word = self.crossword.find_word(selection.direction, selection.number)?;
        let last = word.len().checked_sub(1)?;
        Some(word.position_of(selection.cell.min(last)))
    }

    fn first_free_cell(&self, key: WordKey, start: usize) -> Option<usize> {
        let word = self.crossword.find_word(key.0, key.1)?;
        (start..word.len()).find(|&i| {
            let (row, column) = word.position_of(i);
            self.board.get(row, column).is_some_and(BoardCell::is_empty)
        })
    }

    fn next_word_key(&self, current: Option<WordKey>) -> Option<WordKey> {
        let current = current.and_then(|(d, n)| self.crossword.find_word(d, n));
        self.crossword.next_word(current).map(key_of)
    }

    fn previous_word_key(&self, current: Option<WordKey>) -> Option<WordKey> {
        let current = current.and_then(|(d, n)| self.crossword.find_word(d, n));
        self.crossword.previous_word(current).map(key_of)
    }

    /// Steps from `current` until a word with an empty square is found.
    ///
    /// If every word is complete, the first step's word is returned.
    fn find_incomplete(
        &self,
        current: Option<WordKey>,
        step: fn(&Self, Option<WordKey>) -> Option<WordKey>,
    ) -> Option<WordKey> {
        let first = step(self, current);
        let mut word = first;
        while let Some(key) = word {
            if self.first_free_cell(key, 0).is_some() {
                break;
            }
            word = step(self, Some(key));
            if word == first {
                break;
            }
        }
        word
    }

    fn current_key(&self) -> Option<WordKey> {
        self.selection.map(|s| (s.direction, s.number))
    }

    fn initial_cell(&self, key: WordKey) -> usize {
        if self.config.select_first_unoccupied_on_nav {
            self.first_free_cell(key, 0).unwrap_or(0)
        } else {
            0
        }
    }

    fn select_key(&mut self, target: Option<WordKey>) {
        let selection = target.map(|(direction, number)| Selectable {
            direction,
            number,
            cell: self.initial_cell((direction, number)),
        });
        self.reset_selection(selection);
    }

    /// Selects a word by direction and number. Returns false if there is no such word.
    pub fn select_word(&mut self, direction: Direction, number: u32) -> bool {
        if self.crossword.find_word(direction, number).is_none() {
            return false;
        }
        self.select_key(Some((direction, number)));
        true
    }

    pub fn select_next_word(&mut self) {
        let current = self.current_key();
        let target = if self.config.skip_completed_words {
            self.find_incomplete(current, Self::next_word_key)
        } else {
            self.next_word_key(current)
        };
        self.select_key(target);
    }

    pub fn select_previous_word(&mut self) {
        let current = self.current_key();
        let target = if self.config.skip_completed_words {
            self.find_incomplete(current, Self::previous_word_key)
        } else {
            self.previous_word_key(current)
        };
        self.select_key(target);
    }

    /// Selects the word through `(row, column)`, preferring `preferred` where two words cross.
    ///
    /// Picking a square starts a fresh undo history. Returns false for blocks.
    pub fn select_cell(&mut self, row: usize, column: usize, preferred: Direction) -> bool {
        let Some(cell) = self.board.get(row, column) else {
            return false;
        };
        let (across, down) = (cell.across, cell.down);

        let mut selection = None;
        if let Some(number) = across
            && (preferred == Direction::Across || down.is_none())
            && let Some(word) = self.crossword.find_word(Direction::Across, number)
        {
            selection = Some(Selectable::new(word, column - word.start_column()));
        }
        if let Some(number) = down
            && (preferred == Direction::Down || across.is_none())
            && let Some(word) = self.crossword.find_word(Direction::Down, number)
        {
            selection = Some(Selectable::new(word, row - word.start_row()));
        }

        match selection {
            Some(s) => {
                self.reset_selection(Some(s));
                self.undo.clear();
                true
            }
            None => false,
        }
    }

    /// Moves the selection to the crossing word at the selected square.
    ///
    /// Without a selection, the first word is selected. Returns false if no
    /// word crosses the selected square.
    pub fn switch_word_direction(&mut self) -> bool {
        let ortho = match self.selection {
            None => self.crossword.next_word(None).map(|w| Selectable::new(w, 0)),
            Some(selection) => self.position(selection).and_then(|(row, column)| {
                let cell = self.board.get(row, column)?;
                match selection.direction {
                    Direction::Across => {
                        let word = self.crossword.find_word(Direction::Down, cell.down?)?;
                        Some(Selectable::new(word, row - word.start_row()))
                    }
                    Direction::Down => {
                        let word = self.crossword.find_word(Direction::Across, cell.across?)?;
                        Some(Selectable::new(word, column - word.start_column()))
                    }
                }
            }),
        };

        match ortho {
            Some(o) => {
                self.reset_selection(Some(o));
                self.clear_undo_if_needed(Some(o));
                true
            }
            None => false,
        }
    }

    fn next_selectable(&self, selection: Selectable) -> Option<Selectable> {
        let key = (selection.direction, selection.number);
        let len = self
            .crossword
            .find_word(selection.direction, selection.number)
            .map_or(0, Word::len);
        let following = (selection.cell + 1 < len).then_some(selection.cell + 1);

        let next_cell = if self.config.skip_occupied_on_type {
            self.first_free_cell(key, selection.cell + 1).or(following)
        } else {
            following
        };

        match next_cell {
            Some(cell) => Some(Selectable { cell, ..selection }),
            None => {
                let target = if self.config.skip_completed_words {
                    self.find_incomplete(Some(key), Self::next_word_key)
                } else {
                    self.next_word_key(Some(key))
                };
                target.map(|(direction, number)| Selectable {
                    direction,
                    number,
                    cell: self.initial_cell((direction, number)),
                })
            }
        }
    }

    // ----- editing -----

    fn undo_selection(&self) -> Option<Selectable> {
        match self.config.undo_mode {
            UndoMode::Smart => self.selection,
            _ => None,
        }
    }

    fn clear_undo_if_needed(&mut self, selection: Option<Selectable>) {
        if self.config.undo_mode != UndoMode::Smart {
            return;
        }
        if let Some(top) = self.undo.peek()
            && let Some(recorded) = top.selection
            && selection.is_none_or(|s| !s.is_same_word(&recorded))
        {
            trace!("Editing moved off {} {}; dropping undo history", recorded.number, recorded.direction);
            self.undo.clear();
        }
    }

    /// Types `ch` into the selected square and advances the selection.
    ///
    /// Returns false if the engine is read-only, nothing is selected, or `ch`
    /// is not in the puzzle's alphabet.
    pub fn handle_input(&mut self, ch: char) -> bool {
        if !self.config.editable || !self.is_acceptable(ch) {
            return false;
        }
        let Some(selection) = self.selection else {
            return false;
        };
        let Some((row, column)) = self.position(selection) else {
            return false;
        };
        self.clear_undo_if_needed(Some(selection));

        let entry: String = ch.to_uppercase().collect();
        let recorded = self.undo_selection();
        let Some(cell) = self.board.get_mut(row, column) else {
            return false;
        };

        let changed = cell.chars() != Some(entry.as_str());
        if changed {
            if self.config.undo_mode != UndoMode::None {
                self.undo
                    .push(UndoItem::single(cell.chars().map(str::to_string), row, column, recorded));
            }
            cell.set_chars(Some(entry.as_str()));
        }
        if self.config.mark_errors
            && let Some(answer) = self.crossword.cell_at(row, column)
        {
            cell.mark_error(answer, self.config.reveal_sets_cheat_flag);
        }

        let next = self.next_selectable(selection);
        self.reset_selection(next);
        if changed {
            self.on_board_changed();
        }
        true
    }

    /// Types a whole string at the selection.
    ///
    /// Characters outside the alphabet are dropped first. The remaining text is
    /// written from the selected cell if it fits, or over the whole word if it
    /// has exactly the word's length. Returns whether anything was written.
    pub fn enter_word(&mut self, text: &str) -> Result<bool> {
        if !self.config.editable {
            return Ok(false);
        }
        let Some(selection) = self.selection else {
            return Ok(false);
        };

        let filtered: Vec<String> = text
            .chars()
            .filter(|&c| self.is_acceptable(c))
            .map(|c| c.to_string())
            .collect();
        let count = filtered.len();
        if count == 0 {
            return Ok(false);
        }

        let word = self.require_word(selection.direction, selection.number)?;
        let len = word.len();
        let (start, next_cell) = if selection.cell + count <= len {
            (word.position_of(selection.cell), (selection.cell + count).min(len - 1))
        } else if count == len {
            (word.position_of(0), count - 1)
        } else {
            return Ok(false);
        };

        let matrix: CharMatrix = match selection.direction {
            Direction::Across => vec![filtered.into_iter().map(Some).collect()],
            Direction::Down => filtered.into_iter().map(|s| vec![Some(s)]).collect(),
        };
        self.apply_chars(start.0, start.1, &matrix, false, false)?;
        self.reset_selection(Some(Selectable {
            cell: next_cell,
            ..selection
        }));
        Ok(true)
    }

    /// Undoes the last edit, or clears a square if there is nothing to undo.
    ///
    /// A plain backspace clears the selected square; if it is already empty,
    /// the previous square is cleared instead, crossing into the previous word
    /// from a word's first square.
    pub fn backspace(&mut self) -> bool {
        if !self.config.editable {
            return false;
        }
        let Some(selection) = self.selection else {
            return false;
        };

        if let Some(item) = self.undo.pop() {
            debug!("Undoing edit at ({}, {})", item.start_row, item.start_column);
            if let Err(e) = self.apply_chars(item.start_row, item.start_column, &item.chars, false, true) {
                warn!("Discarding undo record: {}", e);
            }
            if let Some(recorded) = item.selection
                && self.crossword.find_word(recorded.direction, recorded.number).is_some()
            {
                self.reset_selection(Some(recorded));
            }
            return true;
        }

        let mut target = selection;
        let Some((row, column)) = self.position(target) else {
            return false;
        };
        if self.board.get(row, column).is_some_and(BoardCell::is_empty) {
            if target.cell > 0 {
                target.cell -= 1;
            } else {
                let current = self.crossword.find_word(target.direction, target.number);
                if let Some(previous) = self.crossword.previous_word(current) {
                    target = Selectable::new(previous, previous.len().saturating_sub(1));
                }
            }
        }

        let Some((row, column)) = self.position(target) else {
            return false;
        };
        let mut changed = false;
        if let Some(cell) = self.board.get_mut(row, column) {
            changed = cell.clear_chars();
            if self.config.mark_errors {
                cell.set_flag(BoardCell::FLAG_ERROR, false);
            }
        }

        self.reset_selection(Some(target));
        if changed {
            self.on_board_changed();
        }
        true
    }

    fn apply_chars(
        &mut self,
        start_row: usize,
        start_column: usize,
        matrix: &[Vec<Option<String>>],
        set_cheat_flag: bool,
        bypass_undo: bool,
    ) -> Result<()> {
        let height = matrix.len();
        let width = matrix.first().map_or(0, Vec::len);
        if height == 0 || width == 0 {
            return Err(CrosswordError::InvalidArgument("Invalid matrix size".to_string()));
        }
        if matrix.iter().any(|row| row.len() != width) {
            return Err(CrosswordError::InvalidArgument("Matrix rows differ in length".to_string()));
        }
        let (end_row, end_column) = (start_row + height - 1, start_column + width - 1);
        if end_row >= self.board.height() || end_column >= self.board.width() {
            return Err(CrosswordError::InvalidArgument(format!(
                "Chars out of bounds: ({}, {}) to ({}, {}) on a {}x{} grid",
                start_row,
                start_column,
                end_row,
                end_column,
                self.board.width(),
                self.board.height()
            )));
        }

        let mut replaced: Option<CharMatrix> =
            (!bypass_undo && self.config.undo_mode != UndoMode::None).then(|| vec![vec![None; width]; height]);
        let mut changed = false;

        for (k, entries) in matrix.iter().enumerate() {
            for (l, entry) in entries.iter().enumerate() {
                let (row, column) = (start_row + k, start_column + l);
                let Some(cell) = self.board.get_mut(row, column) else {
                    continue;
                };
                if let Some(buffer) = replaced.as_mut() {
                    buffer[k][l] = cell.chars().map(str::to_string);
                }

                let canonical = board::canonicalize(entry.as_deref());
                let acceptable = canonical.as_deref().is_none_or(|s| accepts(&self.allowed, s));
                if canonical.as_deref() != cell.chars() && acceptable {
                    changed |= cell.set_chars(canonical.as_deref());
                    if set_cheat_flag {
                        cell.set_flag(BoardCell::FLAG_CHEATED, true);
                    }
                    if self.config.mark_errors
                        && let Some(answer) = self.crossword.cell_at(row, column)
                    {
                        cell.mark_error(answer, self.config.reveal_sets_cheat_flag);
                    }
                }
            }
        }

        if changed {
            if let Some(chars) = replaced {
                self.clear_undo_if_needed(self.selection);
                let selection = self.undo_selection();
                self.undo.push(UndoItem {
                    chars,
                    start_row,
                    start_column,
                    selection,
                });
            }
            self.on_board_changed();
        }
        Ok(())
    }

    /// Writes a block of entries with its top-left corner at `(start_row, start_column)`.
    ///
    /// `None` clears a square; blocks inside the matrix are skipped, and
    /// entries outside the alphabet are ignored.
    ///
    /// # Errors
    /// Returns [`CrosswordError::InvalidArgument`] for an empty or ragged
    /// matrix, or one extending past the grid.
    pub fn set_chars(
        &mut self,
        start_row: usize,
        start_column: usize,
        matrix: &[Vec<Option<String>>],
        set_cheat_flag: bool,
    ) -> Result<()> {
        self.apply_chars(start_row, start_column, matrix, set_cheat_flag, false)
    }

    /// Reveals one word, flagging revealed squares as cheated.
    pub fn solve_word(&mut self, direction: Direction, number: u32) -> Result<()> {
        let word = self.require_word(direction, number)?;
        let answers = word.cells().iter().map(|c| Some(c.chars().to_string()));
        let matrix: CharMatrix = match direction {
            Direction::Across => vec![answers.collect()],
            Direction::Down => answers.map(|a| vec![a]).collect(),
        };
        let (row, column) = (word.start_row(), word.start_column());
        debug!("Revealing {} {}", number, direction);
        self.apply_chars(row, column, &matrix, true, false)
    }

    /// Reveals one square of a word, flagging it as cheated.
    pub fn solve_char(&mut self, direction: Direction, number: u32, index: usize) -> Result<()> {
        let (row, column) = self.square_position(direction, number, index)?;
        let answer = self
            .require_word(direction, number)?
            .cell_at(index)
            .map(|c| c.chars().to_string());
        self.apply_chars(row, column, &[vec![answer]], true, false)
    }

    /// Reveals every square.
    pub fn solve_puzzle(&mut self) -> Result<()> {
        let (width, height) = (self.board.width(), self.board.height());
        let mut matrix: CharMatrix = vec![vec![None; width]; height];
        for word in self
            .crossword
            .words_across()
            .iter()
            .chain(self.crossword.words_down())
        {
            for (i, cell) in word.cells().iter().enumerate() {
                let (row, column) = word.position_of(i);
                if let Some(slot) = matrix.get_mut(row).and_then(|r| r.get_mut(column)) {
                    *slot = Some(cell.chars().to_string());
                }
            }
        }
        debug!("Revealing the whole puzzle");
        self.apply_chars(0, 0, &matrix, true, false)
    }

    /// Clears every entry along with the cheated and error flags.
    pub fn reset(&mut self) {
        for (_, cell) in self.board.iter_mut() {
            cell.reset();
        }
        self.on_board_changed();
    }

    /// The entry in square `index` of a word.
    pub fn cell_contents(&self, direction: Direction, number: u32, index: usize) -> Result<Option<&str>> {
        let (row, column) = self.square_position(direction, number, index)?;
        Ok(self.board.get(row, column).and_then(BoardCell::chars))
    }

    /// Writes the entry in square `index` of a word.
    pub fn set_cell_contents(
        &mut self,
        direction: Direction,
        number: u32,
        index: usize,
        value: Option<&str>,
        mark_as_cheated: bool,
    ) -> Result<()> {
        let (row, column) = self.square_position(direction, number, index)?;
        self.apply_chars(row, column, &[vec![value.map(str::to_string)]], mark_as_cheated, false)
    }

    pub fn is_square_marked(&self, direction: Direction, number: u32, index: usize) -> Result<bool> {
        let (row, column) = self.square_position(direction, number, index)?;
        Ok(self
            .board
            .get(row, column)
            .is_some_and(|c| c.is_flag_set(BoardCell::FLAG_MARKED)))
    }

    /// Sets or clears the user's mark on a square.
    pub fn toggle_square_mark(&mut self, direction: Direction, number: u32, index: usize, mark: bool) -> Result<()> {
        let (row, column) = self.square_position(direction, number, index)?;
        if let Some(cell) = self.board.get_mut(row, column)
            && cell.set_flag(BoardCell::FLAG_MARKED, mark)
        {
            self.events.push(EngineEvent::Changed);
        }
        Ok(())
    }

    /// Re-evaluates error flags after error marking was switched on or off.
    pub fn reset_error_markers(&mut self) {
        let reveal = self.config.reveal_sets_cheat_flag;
        for ((row, column), cell) in self.board.iter_mut() {
            if self.config.mark_errors {
                if let Some(answer) = self.crossword.cell_at(row, column) {
                    cell.mark_error(answer, reveal);
                }
            } else {
                cell.set_flag(BoardCell::FLAG_ERROR, false);
            }
        }
    }

    /// Whether every square holds an accepted answer.
    ///
    /// Always false for puzzles without a solution.
    pub fn is_solved(&self) -> bool {
        if self.crossword.flags() & Crossword::FLAG_NO_SOLUTION != 0 {
            return false;
        }
        self.board.iter().all(|((row, column), cell)| {
            self.crossword
                .cell_at(row, column)
                .is_some_and(|answer| cell.is_solved(answer))
        })
    }

    // ----- progress -----

    /// Snapshot of the entries, flags and selection with fresh statistics.
    pub fn progress(&self) -> Result<ProgressState> {
        let mut state = self.crossword.new_state();
        if let Some(selection) = self.selection {
            state.set_selection(selection.direction, selection.number, selection.cell);
        }

        for ((row, column), cell) in self.board.iter() {
            if let Some(chars) = cell.chars() {
                state.set_char_at(row, column, Some(chars.to_string()));
            }
            state.set_flag_at(
                ProgressState::FLAG_CHEATED,
                row,
                column,
                cell.is_flag_set(BoardCell::FLAG_CHEATED),
            );
            state.set_flag_at(
                ProgressState::FLAG_MARKED,
                row,
                column,
                cell.is_flag_set(BoardCell::FLAG_MARKED),
            );
        }

        self.crossword.update_state_statistics(&mut state)?;
        Ok(state)
    }

    /// Loads entries, flags and selection from a snapshot.
    ///
    /// The undo history is discarded.
    ///
    /// # Errors
    /// Returns [`CrosswordError::DimensionMismatch`] if the snapshot was made for a
    /// puzzle of a different size; the engine is left untouched.
    pub fn restore_progress(&mut self, state: &ProgressState) -> Result<()> {
        let expected = (self.board.width(), self.board.height());
        let found = (state.width(), state.height());
        if expected != found {
            return Err(CrosswordError::DimensionMismatch { expected, found });
        }

        let reveal = self.config.reveal_sets_cheat_flag;
        for ((row, column), cell) in self.board.iter_mut() {
            cell.set_flag(
                BoardCell::FLAG_CHEATED,
                state.is_flag_set(ProgressState::FLAG_CHEATED, row, column),
            );
            cell.set_flag(
                BoardCell::FLAG_MARKED,
                state.is_flag_set(ProgressState::FLAG_MARKED, row, column),
            );
            cell.set_chars(state.char_at(row, column));
            if self.config.mark_errors
                && let Some(answer) = self.crossword.cell_at(row, column)
            {
                cell.mark_error(answer, reveal);
            }
        }

        if state.has_selection()
            && let Ok(direction) = state.selected_direction()
            && let Some(word) = self.crossword.find_word(direction, state.selected_number())
            && state.selected_cell() < word.len()
        {
            let selection = Selectable::new(word, state.selected_cell());
            self.reset_selection(Some(selection));
        }

        self.undo.clear();
        self.on_board_changed();
        Ok(())
    }

    // ----- notifications -----

    fn reset_selection(&mut self, selection: Option<Selectable>) {
        if selection != self.selection {
            trace!("Selection {:?} -> {:?}", self.selection, selection);
            self.selection = selection;
            self.events.push(EngineEvent::SelectionChanged(selection));
        }
    }

    fn on_board_changed(&mut self) {
        let solved = self.is_solved();
        self.events.push(EngineEvent::Changed);
        if solved != self.solved {
            self.events.push(if solved {
                EngineEvent::Solved
            } else {
                EngineEvent::Unsolved
            });
        }
        self.solved = solved;
    }
}
