//! The immutable [`Crossword`] and its [`CrosswordBuilder`].
//!
//! A crossword is built once from an arbitrary collection of words and never
//! mutated afterwards. Derived data (the cell map and the content hash) is
//! computed lazily and cached for the lifetime of the value.
//!
//! # Word Order
//! Across and down words are kept in two lists, each sorted by number. Word
//! navigation treats them as one cyclic sequence: every across word in order,
//! then every down word in order, then back to the first across word.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use log::debug;
use sha1::{Digest, Sha1};

use crate::crossword::codec::puzzle_io;
use crate::crossword::state::ProgressState;
use crate::crossword::types::{
    error::{CrosswordError, Result},
    models::{ALPHABET_ENGLISH, Cell, Direction, Word},
};

/// Location of a cell inside one of the two word lists.
///
/// The cell map stores these instead of cells so that the words remain the
/// only owners of their cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    pub direction: Direction,
    pub word_index: usize,
    pub cell_index: usize,
}

/// A finished, immutable crossword puzzle.
#[derive(Debug, Clone)]
pub struct Crossword {
    width: usize,
    height: usize,
    square_count: usize,
    flags: u32,
    title: Option<String>,
    description: Option<String>,
    author: Option<String>,
    copyright: Option<String>,
    comment: Option<String>,
    date: i64,
    words_across: Vec<Word>,
    words_down: Vec<Word>,
    alphabet: BTreeSet<char>,

    cell_map: OnceLock<Vec<Option<CellRef>>>,
    hash: OnceLock<String>,
}

impl Crossword {
    /// The puzzle ships without answers; it can be played but never solved.
    pub const FLAG_NO_SOLUTION: u32 = 1;

    /// Largest grid, in squares, that any reader or decoder will accept.
    pub const MAX_SQUARES: usize = 1 << 20;

    /// Checks that a `width` x `height` grid is non-empty and holds at most
    /// [`Crossword::MAX_SQUARES`] squares.
    ///
    /// Readers call this before allocating anything sized by the dimensions
    /// found in a document.
    ///
    /// # Errors
    /// Returns [`CrosswordError::Format`] if either dimension is zero or the grid is too large.
    pub fn check_dimensions(width: usize, height: usize) -> Result<()> {
        match width.checked_mul(height) {
            Some(squares) if width > 0 && height > 0 && squares <= Self::MAX_SQUARES => Ok(()),
            _ => Err(CrosswordError::Format(format!("Invalid dimensions {}x{}", width, height))),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of distinct grid coordinates covered by at least one word.
    pub fn square_count(&self) -> usize {
        self.square_count
    }

    pub fn flags(&self) -> u32 {
        self.flags
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn copyright(&self) -> Option<&str> {
        self.copyright.as_deref()
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Publish date in milliseconds since the Unix epoch, 0 when unknown.
    pub fn date(&self) -> i64 {
        self.date
    }

    /// Characters a solver may enter.
    pub fn alphabet(&self) -> &BTreeSet<char> {
        &self.alphabet
    }

    pub fn words_across(&self) -> &[Word] {
        &self.words_across
    }

    pub fn words_down(&self) -> &[Word] {
        &self.words_down
    }

    /// The word list for `direction`, sorted by number.
    pub fn words(&self, direction: Direction) -> &[Word] {
        match direction {
            Direction::Across => &self.words_across,
            Direction::Down => &self.words_down,
        }
    }

    /// Creates an empty progress snapshot sized for this puzzle.
    pub fn new_state(&self) -> ProgressState {
        ProgressState::new(self.width, self.height)
    }

    fn index_of(&self, direction: Direction, number: u32) -> Option<usize> {
        self.words(direction).iter().position(|w| w.number == number)
    }

    /// Finds a word by direction and number.
    pub fn find_word(&self, direction: Direction, number: u32) -> Option<&Word> {
        self.index_of(direction, number)
            .map(|index| &self.words(direction)[index])
    }

    /// Finds the word of `direction` that covers grid coordinate `(row, column)`.
    pub fn find_word_at(&self, direction: Direction, row: usize, column: usize) -> Option<&Word> {
        self.words(direction).iter().find(|w| w.covers(row, column))
    }

    /// Returns the word following `word` in across-then-down order.
    ///
    /// With no current word (or one that is not part of this puzzle) the first
    /// across word is returned, or the first down word if there are no across
    /// words. Returns `None` only for a puzzle without words.
    pub fn next_word(&self, word: Option<&Word>) -> Option<&Word> {
        if let Some(word) = word
            && let Some(index) = self.index_of(word.direction, word.number)
        {
            let (own, other) = match word.direction {
                Direction::Across => (&self.words_across, &self.words_down),
                Direction::Down => (&self.words_down, &self.words_across),
            };
            if index + 1 < own.len() {
                return Some(&own[index + 1]);
            }
            if let Some(first) = other.first() {
                return Some(first);
            }
        }

        self.words_across.first().or_else(|| self.words_down.first())
    }

    /// Returns the word preceding `word` in across-then-down order.
    ///
    /// The inverse of [`Crossword::next_word`]. With no current word the last
    /// down word is returned, or the last across word if there are no down words.
    pub fn previous_word(&self, word: Option<&Word>) -> Option<&Word> {
        if let Some(word) = word
            && let Some(index) = self.index_of(word.direction, word.number)
        {
            let (own, other) = match word.direction {
                Direction::Across => (&self.words_across, &self.words_down),
                Direction::Down => (&self.words_down, &self.words_across),
            };
            if index > 0 {
                return Some(&own[index - 1]);
            }
            if let Some(last) = other.last() {
                return Some(last);
            }
        }

        self.words_down.last().or_else(|| self.words_across.last())
    }

    fn cell_map(&self) -> &[Option<CellRef>] {
        self.cell_map.get_or_init(|| {
            let mut map = vec![None; self.width * self.height];
            for direction in [Direction::Across, Direction::Down] {
                for (word_index, word) in self.words(direction).iter().enumerate() {
                    for cell_index in 0..word.len() {
                        let (row, column) = word.position_of(cell_index);
                        if row < self.height && column < self.width {
                            map[row * self.width + column] = Some(CellRef {
                                direction,
                                word_index,
                                cell_index,
                            });
                        }
                    }
                }
            }
            map
        })
    }

    /// Where the cell at `(row, column)` lives, or `None` for a block.
    pub fn cell_ref(&self, row: usize, column: usize) -> Option<CellRef> {
        if row >= self.height || column >= self.width {
            return None;
        }
        self.cell_map()[row * self.width + column]
    }

    /// The answer cell at `(row, column)`, or `None` for a block.
    ///
    /// Where an across and a down word cross, the down word's cell is returned.
    pub fn cell_at(&self, row: usize, column: usize) -> Option<&Cell> {
        let cell_ref = self.cell_ref(row, column)?;
        self.words(cell_ref.direction)
            .get(cell_ref.word_index)
            .and_then(|w| w.cell_at(cell_ref.cell_index))
    }

    /// Content identity of the puzzle: SHA-1 (hex) of the canonical hash encoding.
    ///
    /// Only dimensions and word/cell content take part; metadata such as the
    /// title does not affect the hash.
    pub fn hash(&self) -> &str {
        self.hash
            .get_or_init(|| hex::encode(Sha1::digest(puzzle_io::hash_input(self))))
    }

    /// Reconciles `state` against the answers and stores the resulting counters in it.
    ///
    /// Each covered square is counted once. A square counts as cheated when the
    /// attempt is correct and the cheated flag is set, solved when it is correct
    /// otherwise, wrong when a non-empty attempt is incorrect, and unknown when
    /// an attempt was made on a square that has no solution.
    ///
    /// # Errors
    /// Returns [`CrosswordError::DimensionMismatch`] if the state was not created for
    /// a puzzle of this size.
    pub fn update_state_statistics(&self, state: &mut ProgressState) -> Result<()> {
        if state.width() != self.width || state.height() != self.height {
            return Err(CrosswordError::DimensionMismatch {
                expected: (self.width, self.height),
                found: (state.width(), state.height()),
            });
        }

        let mut total = 0u16;
        let mut solved = 0u16;
        let mut cheated = 0u16;
        let mut wrong = 0u16;
        let mut unknown = 0u16;

        let mut done = vec![false; self.width * self.height];
        for word in self.words_across.iter().chain(self.words_down.iter()) {
            for (i, cell) in word.cells.iter().enumerate() {
                let (row, column) = word.position_of(i);
                let offset = row * self.width + column;
                if done[offset] {
                    continue;
                }

                total = total.saturating_add(1);
                let attempt = state.char_at(row, column);
                if cell.has_no_solution() && attempt.is_some() {
                    unknown = unknown.saturating_add(1);
                } else if cell.contains(attempt)
                    && state.is_flag_set(ProgressState::FLAG_CHEATED, row, column)
                {
                    cheated = cheated.saturating_add(1);
                } else if cell.contains(attempt) {
                    solved = solved.saturating_add(1);
                } else if attempt.is_some() {
                    wrong = wrong.saturating_add(1);
                }

                done[offset] = true;
            }
        }

        debug!(
            "Statistics: total={}, solved={}, cheated={}, wrong={}, unknown={}",
            total, solved, cheated, wrong, unknown
        );
        state.set_square_stats(solved, cheated, wrong, unknown, total);

        Ok(())
    }
}

impl PartialEq for Crossword {
    fn eq(&self, other: &Self) -> bool {
        self.hash() == other.hash()
    }
}

impl Eq for Crossword {}

impl std::hash::Hash for Crossword {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        Crossword::hash(self).hash(state);
    }
}

/// The only mutable view of a crossword under construction.
///
/// Words may be added in any order; [`CrosswordBuilder::build`] sorts them into
/// the across and down lists.
#[derive(Debug, Clone)]
pub struct CrosswordBuilder {
    width: usize,
    height: usize,
    title: Option<String>,
    description: Option<String>,
    author: Option<String>,
    copyright: Option<String>,
    comment: Option<String>,
    date: i64,
    flags: u32,
    alphabet: BTreeSet<char>,
    words: Vec<Word>,
}

impl Default for CrosswordBuilder {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            title: None,
            description: None,
            author: None,
            copyright: None,
            comment: None,
            date: 0,
            flags: 0,
            alphabet: ALPHABET_ENGLISH.chars().collect(),
            words: Vec::new(),
        }
    }
}

impl CrosswordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-opens a built crossword for modification.
    pub fn from_crossword(crossword: &Crossword) -> Self {
        Self {
            width: crossword.width,
            height: crossword.height,
            title: crossword.title.clone(),
            description: crossword.description.clone(),
            author: crossword.author.clone(),
            copyright: crossword.copyright.clone(),
            comment: crossword.comment.clone(),
            date: crossword.date,
            flags: crossword.flags,
            alphabet: crossword.alphabet.clone(),
            words: crossword
                .words_across
                .iter()
                .chain(crossword.words_down.iter())
                .cloned()
                .collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn set_width(&mut self, width: usize) -> &mut Self {
        self.width = width;
        self
    }

    pub fn set_height(&mut self, height: usize) -> &mut Self {
        self.height = height;
        self
    }

    pub fn set_title(&mut self, title: impl Into<Option<String>>) -> &mut Self {
        self.title = title.into();
        self
    }

    pub fn set_description(&mut self, description: impl Into<Option<String>>) -> &mut Self {
        self.description = description.into();
        self
    }

    pub fn set_author(&mut self, author: impl Into<Option<String>>) -> &mut Self {
        self.author = author.into();
        self
    }

    pub fn set_copyright(&mut self, copyright: impl Into<Option<String>>) -> &mut Self {
        self.copyright = copyright.into();
        self
    }

    pub fn set_comment(&mut self, comment: impl Into<Option<String>>) -> &mut Self {
        self.comment = comment.into();
        self
    }

    pub fn set_date(&mut self, date: i64) -> &mut Self {
        self.date = date;
        self
    }

    pub fn set_flags(&mut self, flags: u32) -> &mut Self {
        self.flags = flags;
        self
    }

    /// Replaces the allowed input characters.
    pub fn set_alphabet(&mut self, alphabet: impl IntoIterator<Item = char>) -> &mut Self {
        self.alphabet = alphabet.into_iter().collect();
        self
    }

    pub fn add_word(&mut self, word: Word) -> &mut Self {
        self.words.push(word);
        self
    }

    /// Renumbers every word left-to-right, top-to-bottom.
    ///
    /// Words are ordered by (row, column, across before down). The number is
    /// incremented whenever the start square changes, so an across and a down
    /// word starting on the same square share a number.
    pub fn auto_number(&mut self) -> &mut Self {
        let mut order: Vec<usize> = (0..self.words.len()).collect();
        order.sort_by_key(|&i| {
            let w = &self.words[i];
            (w.start_row, w.start_column, w.direction)
        });

        let mut previous: Option<(usize, usize)> = None;
        let mut number = 0u32;
        for index in order {
            let word = &mut self.words[index];
            let start = (word.start_row, word.start_column);
            if previous != Some(start) {
                number += 1;
            }
            word.number = number;
            previous = Some(start);
        }

        self
    }

    /// Counts distinct covered squares, checking that words stay inside the grid
    /// and that no two words of the same direction overlap.
    fn count_squares(&self) -> Result<usize> {
        let mut count = 0;
        let mut across = vec![false; self.width * self.height];
        let mut down = vec![false; self.width * self.height];

        for word in &self.words {
            let (limit, cross, cross_limit) = match word.direction {
                Direction::Across => (self.width, word.start_row, self.height),
                Direction::Down => (self.height, word.start_column, self.width),
            };
            let start = word.direction_start();
            if cross >= cross_limit || start.checked_add(word.len()).is_none_or(|end| end > limit) {
                return Err(CrosswordError::Format(format!(
                    "Word {} {} extends outside the {}x{} grid",
                    word.number, word.direction, self.width, self.height
                )));
            }

            for i in 0..word.len() {
                let (row, column) = word.position_of(i);
                let offset = row * self.width + column;
                let (own, other) = match word.direction {
                    Direction::Across => (&mut across, &down),
                    Direction::Down => (&mut down, &across),
                };
                if own[offset] {
                    return Err(CrosswordError::Format(format!(
                        "Square ({}, {}) is covered by more than one {} word",
                        row, column, word.direction
                    )));
                }
                if !other[offset] {
                    count += 1;
                }
                own[offset] = true;
            }
        }

        Ok(count)
    }

    /// Finalizes the builder into an immutable [`Crossword`].
    ///
    /// # Errors
    /// Returns [`CrosswordError::Format`] if a dimension is zero or the grid
    /// exceeds [`Crossword::MAX_SQUARES`], a word extends outside the grid, or
    /// two words of one direction overlap. A builder without words yields an
    /// empty puzzle.
    pub fn build(self) -> Result<Crossword> {
        Crossword::check_dimensions(self.width, self.height)?;

        let square_count = self.count_squares()?;

        let (mut words_across, mut words_down): (Vec<Word>, Vec<Word>) = self
            .words
            .into_iter()
            .partition(|w| w.direction == Direction::Across);
        words_across.sort_by_key(|w| w.number);
        words_down.sort_by_key(|w| w.number);

        debug!(
            "Built {}x{} crossword: {} across, {} down, {} squares",
            self.width,
            self.height,
            words_across.len(),
            words_down.len(),
            square_count
        );

        Ok(Crossword {
            width: self.width,
            height: self.height,
            square_count,
            flags: self.flags,
            title: self.title,
            description: self.description,
            author: self.author,
            copyright: self.copyright,
            comment: self.comment,
            date: self.date,
            words_across,
            words_down,
            alphabet: self.alphabet,
            cell_map: OnceLock::new(),
            hash: OnceLock::new(),
        })
    }
}
