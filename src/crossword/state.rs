//! Progress snapshot of a solving session.
//!
//! A [`ProgressState`] is independent from the puzzle it belongs to: it only
//! knows the grid dimensions. Statistics are recomputed on demand by
//! [`Crossword::update_state_statistics`](crate::crossword::puzzle::Crossword::update_state_statistics).
//!
//! # Packed Fields
//! ```text
//! statistics (u64): [solved:16][cheated:16][wrong:16][total:16]
//! selection  (u32): [unused:4][direction:4][cell:12][number:12]
//! ```

use crate::crossword::types::{error::Result, models::Direction};

const SEL_NUMBER_MASK: u32 = 0x0000fff;
const SEL_CELL_MASK: u32 = 0x0fff000;
const SEL_CELL_SHIFT: u32 = 12;
const SEL_DIR_MASK: u32 = 0xf000000;
const SEL_DIR_SHIFT: u32 = 24;

/// Attempt grid, per-square flags, counters and selection of one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressState {
    width: usize,
    height: usize,
    pub(crate) play_time_millis: i64,
    pub(crate) last_played: i64,
    pub(crate) selection: u32,
    squares_solved: u16,
    squares_cheated: u16,
    squares_wrong: u16,
    squares_unknown: u16,
    square_count: u16,
    /// Row-major attempts; `None` is an empty square.
    pub(crate) chars: Vec<Option<String>>,
    /// Row-major flag bits.
    pub(crate) attrs: Vec<u32>,
}

impl ProgressState {
    /// The square was revealed rather than solved.
    pub const FLAG_CHEATED: u32 = 0x01;
    /// The solver marked the square.
    pub const FLAG_MARKED: u32 = 0x02;

    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            play_time_millis: 0,
            last_played: 0,
            selection: 0,
            squares_solved: 0,
            squares_cheated: 0,
            squares_wrong: 0,
            squares_unknown: 0,
            square_count: 0,
            chars: vec![None; width * height],
            attrs: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn play_time_millis(&self) -> i64 {
        self.play_time_millis
    }

    pub fn set_play_time_millis(&mut self, millis: i64) {
        self.play_time_millis = millis;
    }

    pub fn last_played(&self) -> i64 {
        self.last_played
    }

    pub fn set_last_played(&mut self, millis: i64) {
        self.last_played = millis;
    }

    pub fn squares_solved(&self) -> u16 {
        self.squares_solved
    }

    pub fn squares_cheated(&self) -> u16 {
        self.squares_cheated
    }

    pub fn squares_wrong(&self) -> u16 {
        self.squares_wrong
    }

    /// Attempts made on squares that have no known solution.
    pub fn squares_unknown(&self) -> u16 {
        self.squares_unknown
    }

    pub fn square_count(&self) -> u16 {
        self.square_count
    }

    pub(crate) fn set_square_stats(&mut self, solved: u16, cheated: u16, wrong: u16, unknown: u16, total: u16) {
        self.squares_solved = solved;
        self.squares_cheated = cheated;
        self.squares_wrong = wrong;
        self.squares_unknown = unknown;
        self.square_count = total;
    }

    pub(crate) fn set_squares_unknown(&mut self, unknown: u16) {
        self.squares_unknown = unknown;
    }

    /// The solved/cheated/wrong/total counters packed into one value.
    pub fn packed_statistics(&self) -> u64 {
        (self.squares_solved as u64) << 48
            | (self.squares_cheated as u64) << 32
            | (self.squares_wrong as u64) << 16
            | self.square_count as u64
    }

    /// Restores the four packed counters; the unknown counter is left untouched.
    pub fn set_packed_statistics(&mut self, packed: u64) {
        self.squares_solved = ((packed >> 48) & 0xffff) as u16;
        self.squares_cheated = ((packed >> 32) & 0xffff) as u16;
        self.squares_wrong = ((packed >> 16) & 0xffff) as u16;
        self.square_count = (packed & 0xffff) as u16;
    }

    /// Every square is either solved or revealed.
    pub fn is_completed(&self) -> bool {
        self.squares_solved as u32 + self.squares_cheated as u32 >= self.square_count as u32
    }

    /// Stores the selected word and cell in packed form.
    ///
    /// Numbers and cell indices above 4095 do not fit and are truncated.
    pub fn set_selection(&mut self, direction: Direction, number: u32, cell: usize) {
        self.selection = ((direction.code() << SEL_DIR_SHIFT) & SEL_DIR_MASK)
            | (number & SEL_NUMBER_MASK)
            | (((cell as u32) << SEL_CELL_SHIFT) & SEL_CELL_MASK);
    }

    pub fn clear_selection(&mut self) {
        self.selection = 0;
    }

    pub fn has_selection(&self) -> bool {
        self.selection != 0
    }

    pub fn packed_selection(&self) -> u32 {
        self.selection
    }

    /// Direction of the stored selection.
    ///
    /// # Errors
    /// Returns [`CrosswordError::InvalidArgument`](crate::crossword::types::error::CrosswordError::InvalidArgument)
    /// if the packed direction is neither across nor down.
    pub fn selected_direction(&self) -> Result<Direction> {
        Direction::from_code((self.selection & SEL_DIR_MASK) >> SEL_DIR_SHIFT)
    }

    pub fn selected_number(&self) -> u32 {
        self.selection & SEL_NUMBER_MASK
    }

    pub fn selected_cell(&self) -> usize {
        ((self.selection & SEL_CELL_MASK) >> SEL_CELL_SHIFT) as usize
    }

    fn offset(&self, row: usize, column: usize) -> usize {
        assert!(
            row < self.height && column < self.width,
            "square ({}, {}) outside {}x{} state",
            row,
            column,
            self.width,
            self.height
        );
        row * self.width + column
    }

    /// The attempt at `(row, column)`, `None` when empty.
    ///
    /// # Panics
    /// Panics if the coordinate is outside the grid.
    pub fn char_at(&self, row: usize, column: usize) -> Option<&str> {
        self.chars[self.offset(row, column)].as_deref()
    }

    pub fn set_char_at(&mut self, row: usize, column: usize, chars: Option<String>) {
        let offset = self.offset(row, column);
        self.chars[offset] = chars;
    }

    pub fn is_flag_set(&self, flag: u32, row: usize, column: usize) -> bool {
        self.attrs[self.offset(row, column)] & flag == flag
    }

    pub fn set_flag_at(&mut self, flag: u32, row: usize, column: usize, set: bool) {
        let offset = self.offset(row, column);
        if set {
            self.attrs[offset] |= flag;
        } else {
            self.attrs[offset] &= !flag;
        }
    }
}
