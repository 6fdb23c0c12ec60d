//! Core value types of a crossword puzzle.
//!
//! This module defines the building blocks shared by every other layer:
//! - [`Direction`] of a word
//! - [`Cell`], a single answer square (possibly a multi-character rebus)
//! - [`Word`] and its [`WordBuilder`]

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Range;

use super::error::{CrosswordError, Result};

/// The English alphabet, the default set of characters a solver may enter.
pub const ALPHABET_ENGLISH: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Orientation of a word in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub enum Direction {
    #[default]
    Across,
    Down,
}

impl Direction {
    /// Numeric code used by packed selections and the internal codec.
    pub fn code(self) -> u32 {
        match self {
            Direction::Across => 0,
            Direction::Down => 1,
        }
    }

    /// Decodes a numeric direction code.
    ///
    /// # Errors
    /// Returns [`CrosswordError::InvalidArgument`] for anything but 0 (across) or 1 (down).
    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            0 => Ok(Direction::Across),
            1 => Ok(Direction::Down),
            other => Err(CrosswordError::InvalidArgument(format!(
                "Word direction not valid: {}",
                other
            ))),
        }
    }

    /// The perpendicular direction.
    pub fn other(self) -> Self {
        match self {
            Direction::Across => Direction::Down,
            Direction::Down => Direction::Across,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Across => f.write_str("Across"),
            Direction::Down => f.write_str("Down"),
        }
    }
}

/// A single answer square.
///
/// Holds one or more characters (rebus squares carry several, e.g. `"CAT"`)
/// plus attribute bits. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cell {
    chars: String,
    attr_flags: u8,
}

impl Cell {
    /// The square is drawn with a circle.
    pub const ATTR_CIRCLED: u8 = 1;
    /// The puzzle ships without an answer for this square.
    pub const ATTR_NO_SOLUTION: u8 = 2;

    pub fn new(chars: impl Into<String>, attr_flags: u8) -> Self {
        Self {
            chars: chars.into(),
            attr_flags,
        }
    }

    pub fn chars(&self) -> &str {
        &self.chars
    }

    pub fn attr_flags(&self) -> u8 {
        self.attr_flags
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn is_circled(&self) -> bool {
        self.attr_flags & Self::ATTR_CIRCLED != 0
    }

    pub fn has_no_solution(&self) -> bool {
        self.attr_flags & Self::ATTR_NO_SOLUTION != 0
    }

    /// Whether `attempt` is the accepted answer for this square.
    pub fn contains(&self, attempt: Option<&str>) -> bool {
        attempt.is_some_and(|a| a == self.chars)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.chars.chars().count() {
            0 => f.write_str(" "),
            1 => f.write_str(&self.chars),
            _ => write!(f, "[{}]", self.chars),
        }
    }
}

/// A run of cells with its clue.
///
/// Two words are equal iff they have the same direction and number; numbers are
/// only unique within a direction.
#[derive(Debug, Clone)]
pub struct Word {
    pub(crate) number: u32,
    pub(crate) hint: Option<String>,
    pub(crate) start_row: usize,
    pub(crate) start_column: usize,
    pub(crate) direction: Direction,
    pub(crate) hint_url: Option<String>,
    pub(crate) citation: Option<String>,
    pub(crate) cells: Vec<Cell>,
}

impl Word {
    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn start_row(&self) -> usize {
        self.start_row
    }

    pub fn start_column(&self) -> usize {
        self.start_column
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn hint_url(&self) -> Option<&str> {
        self.hint_url.as_deref()
    }

    pub fn citation(&self) -> Option<&str> {
        self.citation.as_deref()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Returns the cell at `index`, or `None` past the end of the word.
    pub fn cell_at(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The occupied span along the word's axis: columns for across words, rows for down words.
    pub fn direction_range(&self) -> Range<usize> {
        let start = self.direction_start();
        start..start + self.cells.len()
    }

    /// Start coordinate along the word's own axis.
    pub(crate) fn direction_start(&self) -> usize {
        match self.direction {
            Direction::Across => self.start_column,
            Direction::Down => self.start_row,
        }
    }

    /// Grid coordinate `(row, column)` of the cell at `index`.
    pub fn position_of(&self, index: usize) -> (usize, usize) {
        match self.direction {
            Direction::Across => (self.start_row, self.start_column + index),
            Direction::Down => (self.start_row + index, self.start_column),
        }
    }

    /// Whether the word covers grid coordinate `(row, column)`.
    pub fn covers(&self, row: usize, column: usize) -> bool {
        match self.direction {
            Direction::Across => row == self.start_row && self.direction_range().contains(&column),
            Direction::Down => column == self.start_column && self.direction_range().contains(&row),
        }
    }
}

impl PartialEq for Word {
    fn eq(&self, other: &Self) -> bool {
        self.direction == other.direction && self.number == other.number
    }
}

impl Eq for Word {}

impl Hash for Word {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.direction.hash(state);
        self.number.hash(state);
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {} (", self.number, self.direction, self.hint.as_deref().unwrap_or(""))?;
        for cell in &self.cells {
            write!(f, "{}", cell)?;
        }
        f.write_str(")")
    }
}

/// Mutable construction view of a [`Word`].
#[derive(Debug, Clone, Default)]
pub struct WordBuilder {
    pub number: Option<u32>,
    pub hint: Option<String>,
    pub start_row: usize,
    pub start_column: usize,
    pub direction: Direction,
    pub hint_url: Option<String>,
    pub citation: Option<String>,
    pub cells: Vec<Cell>,
}

impl WordBuilder {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            ..Default::default()
        }
    }

    pub fn number(mut self, number: u32) -> Self {
        self.number = Some(number);
        self
    }

    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn start(mut self, row: usize, column: usize) -> Self {
        self.start_row = row;
        self.start_column = column;
        self
    }

    pub fn hint_url(mut self, url: impl Into<String>) -> Self {
        self.hint_url = Some(url.into());
        self
    }

    pub fn citation(mut self, citation: impl Into<String>) -> Self {
        self.citation = Some(citation.into());
        self
    }

    /// Appends a cell; `chars` may hold several characters for a rebus square.
    pub fn add_cell(&mut self, chars: impl Into<String>, attr_flags: u8) {
        self.cells.push(Cell::new(chars, attr_flags));
    }

    /// Chaining form of [`WordBuilder::add_cell`] for one cell per character of `answer`.
    pub fn answer(mut self, answer: &str) -> Self {
        for ch in answer.chars() {
            self.add_cell(ch.to_string(), 0);
        }
        self
    }

    /// Finalizes the word.
    ///
    /// # Errors
    /// Returns [`CrosswordError::Format`] if no number was ever assigned.
    pub fn build(self) -> Result<Word> {
        let number = self
            .number
            .ok_or_else(|| CrosswordError::Format("Missing hint number".to_string()))?;

        Ok(Word {
            number,
            hint: self.hint,
            start_row: self.start_row,
            start_column: self.start_column,
            direction: self.direction,
            hint_url: self.hint_url,
            citation: self.citation,
            cells: self.cells,
        })
    }
}
