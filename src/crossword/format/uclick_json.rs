//! Universal Uclick JSON.
//!
//! # Document Shape
//! ```text
//! Title, Author, Copyright
//! Width, Height                    number or numeric string
//! Layout    { Line1: "010203-1..", .. }   two characters per square, clue number or 00/-1
//! Solution  { Line1: "CAT BAT", .. }      one character per square, " " = block
//! AcrossClue, DownClue             "01|hint\n02|hint\nend\n"
//! ```
//!
//! Lines are numbered from 1. A word runs from the square its number occupies
//! in `Layout` up to the next block or the edge of the grid.

use std::collections::{BTreeMap, HashMap};

use encoding_rs::Encoding;
use log::debug;
use serde::Deserialize;

use super::CrosswordFormatter;
use super::json::{self, Scalar};
use super::text;
use crate::crossword::puzzle::{Crossword, CrosswordBuilder};
use crate::crossword::types::{
    error::{CrosswordError, Result},
    models::{Direction, Word, WordBuilder},
};

const BLOCK: char = ' ';

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Document {
    title: Option<String>,
    author: Option<String>,
    copyright: Option<String>,
    width: Option<Scalar>,
    height: Option<Scalar>,
    layout: Option<BTreeMap<String, String>>,
    solution: Option<BTreeMap<String, String>>,
    across_clue: Option<String>,
    down_clue: Option<String>,
}

/// Reader for Uclick JSON documents.
#[derive(Debug, Clone)]
pub struct UClickJsonFormatter {
    encoding: &'static Encoding,
}

impl Default for UClickJsonFormatter {
    fn default() -> Self {
        Self {
            encoding: encoding_rs::UTF_8,
        }
    }
}

impl UClickJsonFormatter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CrosswordFormatter for UClickJsonFormatter {
    const NAME: &'static str = "uclick-json";

    fn set_encoding(&mut self, label: &str) -> Result<()> {
        self.encoding = text::resolve_encoding(label)?;
        Ok(())
    }

    fn read(&self, builder: &mut CrosswordBuilder, input: &[u8]) -> Result<()> {
        let document = text::decode(input, self.encoding);
        let doc: Document = json::parse_document(&document)?;

        let width = dimension(doc.width.as_ref(), "Width")?;
        let height = dimension(doc.height.as_ref(), "Height")?;
        if width == 0 || height == 0 {
            return Err(CrosswordError::Format(format!(
                "Width ({}) or height ({}) not set",
                width, height
            )));
        }
        Crossword::check_dimensions(width, height)?;

        let layout = read_layout(doc.layout.as_ref().ok_or_else(|| missing("layout"))?)?;
        let solution = read_solution(doc.solution.as_ref().ok_or_else(|| missing("solution"))?)?;
        let across = read_clues(doc.across_clue.as_deref().ok_or_else(|| missing("clues for Across"))?)?;
        let down = read_clues(doc.down_clue.as_deref().ok_or_else(|| missing("clues for Down"))?)?;

        builder
            .set_title(doc.title)
            .set_author(doc.author)
            .set_copyright(doc.copyright)
            .set_width(width)
            .set_height(height);

        debug!("{} across and {} down clues", across.len(), down.len());
        let grid = Grid {
            layout: &layout,
            solution: &solution,
            width,
            height,
        };
        for (direction, clues) in [(Direction::Across, across), (Direction::Down, down)] {
            for (number, hint) in clues {
                builder.add_word(grid.word(direction, number, hint)?);
            }
        }
        Ok(())
    }
}

fn missing(what: &str) -> CrosswordError {
    CrosswordError::Format(format!("Missing {}", what))
}

fn dimension(value: Option<&Scalar>, name: &str) -> Result<usize> {
    let n = value.map(|v| v.as_int(name)).transpose()?.unwrap_or(0);
    usize::try_from(n).map_err(|_| CrosswordError::Format(format!("Invalid {}: {}", name, n)))
}

/// Zero-based row of a `LineN` key; `None` for keys of another shape.
fn line_row(key: &str) -> Result<Option<usize>> {
    let Some(digits) = key.strip_prefix("Line") else {
        return Ok(None);
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(None);
    }
    match text::parse_int::<usize>(digits, "Line number")? {
        0 => Err(CrosswordError::Format(format!("Invalid line key '{}'", key))),
        n => Ok(Some(n - 1)),
    }
}

/// Maps each clue number to its square.
fn read_layout(lines: &BTreeMap<String, String>) -> Result<HashMap<u32, (usize, usize)>> {
    let mut starts = HashMap::new();
    for (key, line) in lines {
        let Some(row) = line_row(key)? else {
            continue;
        };
        let chars: Vec<char> = line.chars().collect();
        for (column, pair) in chars.chunks(2).enumerate() {
            let value: String = pair.iter().collect();
            let n: i64 = text::parse_int(&value, "Layout entry")?;
            if let Ok(number) = u32::try_from(n)
                && number > 0
            {
                starts.insert(number, (row, column));
            }
        }
    }
    Ok(starts)
}

fn read_solution(lines: &BTreeMap<String, String>) -> Result<HashMap<(usize, usize), char>> {
    let mut squares = HashMap::new();
    for (key, line) in lines {
        let Some(row) = line_row(key)? else {
            continue;
        };
        for (column, ch) in line.chars().enumerate() {
            squares.insert((row, column), ch);
        }
    }
    Ok(squares)
}

/// Parses `NN|hint` lines; lines without a separator (such as `end`) are skipped.
fn read_clues(clues: &str) -> Result<BTreeMap<u32, String>> {
    let mut hints = BTreeMap::new();
    for line in clues.lines() {
        if let Some((number, hint)) = line.split_once('|') {
            hints.insert(text::parse_int(number, "Clue number")?, hint.to_string());
        }
    }
    Ok(hints)
}

struct Grid<'a> {
    layout: &'a HashMap<u32, (usize, usize)>,
    solution: &'a HashMap<(usize, usize), char>,
    width: usize,
    height: usize,
}

impl Grid<'_> {
    fn word(&self, direction: Direction, number: u32, hint: String) -> Result<Word> {
        let &(row, column) = self
            .layout
            .get(&number)
            .ok_or_else(|| CrosswordError::Format(format!("No start position for {} {}", number, direction)))?;

        let mut wb = WordBuilder::new(direction).number(number).hint(hint).start(row, column);
        let positions: Box<dyn Iterator<Item = (usize, usize)>> = match direction {
            Direction::Across => Box::new((column..self.width).map(|c| (row, c))),
            Direction::Down => Box::new((row..self.height).map(|r| (r, column))),
        };
        for pos in positions {
            let ch = *self.solution.get(&pos).ok_or_else(|| {
                CrosswordError::Format(format!("No solution at ({}, {}) for {} {}", pos.0, pos.1, number, direction))
            })?;
            if ch == BLOCK {
                break;
            }
            wb.add_cell(ch.to_string(), 0);
        }

        wb.build()
    }
}
