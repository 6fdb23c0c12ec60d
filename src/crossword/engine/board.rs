//! The solver's view of the grid.
//!
//! Every square covered by a word gets a [`BoardCell`] holding the current
//! entry, the numbers of the across and down words through it, and flags.
//! Blocks are `None`.

use crate::crossword::puzzle::Crossword;
use crate::crossword::types::models::{Cell, Direction};

/// Upper-cases an entry so that comparisons against answers are case-insensitive.
pub fn canonicalize(chars: Option<&str>) -> Option<String> {
    chars.map(str::to_uppercase)
}

/// One playable square.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardCell {
    /// Number printed in the square, if a word starts here.
    pub number: Option<u32>,
    pub across: Option<u32>,
    pub down: Option<u32>,
    chars: Option<String>,
    flags: u8,
}

impl BoardCell {
    pub const FLAG_CHEATED: u8 = 1;
    pub const FLAG_CIRCLED: u8 = 2;
    pub const FLAG_ERROR: u8 = 4;
    pub const FLAG_MARKED: u8 = 8;

    pub fn chars(&self) -> Option<&str> {
        self.chars.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_none()
    }

    /// Stores the canonical form of `chars`. Returns whether the entry changed.
    pub fn set_chars(&mut self, chars: Option<&str>) -> bool {
        let canonical = canonicalize(chars);
        if canonical != self.chars {
            self.chars = canonical;
            return true;
        }
        false
    }

    pub fn clear_chars(&mut self) -> bool {
        self.set_chars(None)
    }

    /// Clears the entry and the cheated and error flags.
    pub fn reset(&mut self) {
        self.clear_chars();
        self.set_flag(Self::FLAG_CHEATED | Self::FLAG_ERROR, false);
    }

    pub fn is_solved(&self, answer: &Cell) -> bool {
        self.chars.is_some() && answer.contains(self.chars())
    }

    /// Sets or clears the error flag by comparing the entry with `answer`.
    pub fn mark_error(&mut self, answer: &Cell, set_cheat_flag: bool) {
        let error = !self.is_empty() && !answer.contains(self.chars());
        if error {
            self.flags |= Self::FLAG_ERROR;
            if set_cheat_flag {
                self.flags |= Self::FLAG_CHEATED;
            }
        } else {
            self.flags &= !Self::FLAG_ERROR;
        }
    }

    pub fn is_flag_set(&self, flag: u8) -> bool {
        self.flags & flag == flag
    }

    /// Returns whether any flag bit changed.
    pub fn set_flag(&mut self, flag: u8, set: bool) -> bool {
        let old = self.flags;
        if set {
            self.flags |= flag;
        } else {
            self.flags &= !flag;
        }
        old != self.flags
    }

    pub fn flags(&self) -> u8 {
        self.flags
    }
}

/// Row-major grid of board cells.
#[derive(Debug, Clone, Default)]
pub struct Board {
    width: usize,
    height: usize,
    cells: Vec<Option<BoardCell>>,
}

impl Board {
    /// Lays out a board for `crossword`: across words first, then down words
    /// filling in squares the across words did not cover.
    pub fn from_crossword(crossword: &Crossword) -> Self {
        let (width, height) = (crossword.width(), crossword.height());
        let mut board = Self {
            width,
            height,
            cells: vec![None; width * height],
        };

        for direction in [Direction::Across, Direction::Down] {
            for word in crossword.words(direction) {
                for (i, cell) in word.cells().iter().enumerate() {
                    let (row, column) = word.position_of(i);
                    let Some(slot) = board.slot_mut(row, column) else {
                        continue;
                    };
                    let square = slot.get_or_insert_with(|| {
                        let mut square = BoardCell::default();
                        square.set_flag(BoardCell::FLAG_CIRCLED, cell.is_circled());
                        square
                    });
                    match direction {
                        Direction::Across => square.across = Some(word.number()),
                        Direction::Down => square.down = Some(word.number()),
                    }
                    if i == 0 && square.number.is_none() {
                        square.number = Some(word.number());
                    }
                }
            }
        }

        board
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn slot_mut(&mut self, row: usize, column: usize) -> Option<&mut Option<BoardCell>> {
        if row >= self.height || column >= self.width {
            return None;
        }
        self.cells.get_mut(row * self.width + column)
    }

    pub fn get(&self, row: usize, column: usize) -> Option<&BoardCell> {
        if row >= self.height || column >= self.width {
            return None;
        }
        self.cells[row * self.width + column].as_ref()
    }

    pub fn get_mut(&mut self, row: usize, column: usize) -> Option<&mut BoardCell> {
        self.slot_mut(row, column).and_then(Option::as_mut)
    }

    /// Playable squares with their coordinates, row-major.
    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), &BoardCell)> {
        let width = self.width.max(1);
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(i, cell)| cell.as_ref().map(|c| ((i / width, i % width), c)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = ((usize, usize), &mut BoardCell)> {
        let width = self.width.max(1);
        self.cells
            .iter_mut()
            .enumerate()
            .filter_map(move |(i, cell)| cell.as_mut().map(|c| ((i / width, i % width), c)))
    }
}
