//! Cross-references between clues.
//!
//! Hints often point at other entries: "See 17-Across", "With 43-Across, ...",
//! or several numbers sharing one direction as in "17- and 23-Down". Each
//! number of up to three digits is paired with the nearest direction word
//! (`Across` or `Down`, case-insensitive) that follows it. A pair counts as a
//! reference only if the crossword has that word.

use std::fmt;
use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

use crate::crossword::puzzle::Crossword;
use crate::crossword::types::models::{Direction, Word};

static NUMBER_PATTERN: OnceLock<Regex> = OnceLock::new();
static DIRECTION_PATTERN: OnceLock<Regex> = OnceLock::new();

fn number_regex() -> &'static Regex {
    NUMBER_PATTERN.get_or_init(|| Regex::new(r"\b([0-9]{1,3})\b").expect("Invalid number regex pattern"))
}

fn direction_regex() -> &'static Regex {
    DIRECTION_PATTERN.get_or_init(|| Regex::new(r"(?i)\b(across|down)\b").expect("Invalid direction regex pattern"))
}

/// A word referenced from a hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordReference {
    pub number: u32,
    pub direction: Direction,
    /// Byte offset of the number in the hint.
    pub start: usize,
    /// Byte offset just past the number.
    pub end: usize,
}

impl WordReference {
    /// Byte range of the number within the hint.
    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Looks up the referenced word.
    pub fn resolve<'c>(&self, crossword: &'c Crossword) -> Option<&'c Word> {
        crossword.find_word(self.direction, self.number)
    }
}

impl fmt::Display for WordReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} [{}..{}]", self.number, self.direction, self.start, self.end)
    }
}

/// Finds every reference in `hint` to a word of `crossword`, in hint order.
pub fn find_references(hint: &str, crossword: &Crossword) -> Vec<WordReference> {
    number_regex()
        .captures_iter(hint)
        .filter_map(|caps| {
            let m = caps.get(1)?;
            let number: u32 = m.as_str().parse().ok()?;
            let marker = direction_regex().find_at(hint, m.end())?;
            let direction = if marker.as_str().eq_ignore_ascii_case("across") {
                Direction::Across
            } else {
                Direction::Down
            };

            crossword.find_word(direction, number)?;
            Some(WordReference {
                number,
                direction,
                start: m.start(),
                end: m.end(),
            })
        })
        .collect()
}

/// Finds the references made by `word`'s hint.
pub fn word_references(word: &Word, crossword: &Crossword) -> Vec<WordReference> {
    word.hint()
        .map(|hint| find_references(hint, crossword))
        .unwrap_or_default()
}
