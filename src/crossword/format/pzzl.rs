//! Sectioned text format (`.pzzl`).
//!
//! Sections are separated by blank lines; each blank line advances the
//! section counter, so the counter of a line is the number of blank lines
//! before it.
//!
//! # Sections
//! - 2: title
//! - 3: author
//! - 4: width (not reliable, ignored)
//! - 5: height (an upper bound on the map rows)
//! - 8: map, one line per row
//! - 9: across clues, one per line
//! - 10: down clues, one per line
//!
//! # Map Rows
//! - `.` is a separator and produces no square
//! - `#` is a block
//! - `%` circles the next square
//! - `A` is a one-character square; `A,B,C` is a rebus square holding `ABC`
//!
//! The width is the square count of the first non-empty row. The final height
//! is the number of rows holding at least one open square.

use encoding_rs::Encoding;
use log::{debug, trace};

use super::CrosswordFormatter;
use super::text;
use crate::crossword::puzzle::{Crossword, CrosswordBuilder};
use crate::crossword::types::{
    error::{CrosswordError, Result},
    models::{Cell, Direction, WordBuilder},
};

const SECTION_TITLE: usize = 2;
const SECTION_AUTHOR: usize = 3;
const SECTION_WIDTH: usize = 4;
const SECTION_HEIGHT: usize = 5;
const SECTION_MAP: usize = 8;
const SECTION_ACROSS: usize = 9;
const SECTION_DOWN: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Square {
    chars: String,
    attrs: u8,
}

type Row = Vec<Option<Square>>;

/// Splits a map row into its squares.
fn tokenize(line: &str) -> Row {
    let chars: Vec<char> = line.chars().collect();
    let mut squares = Vec::new();
    let mut attrs = 0;
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '.' => {}
            '#' => {
                squares.push(None);
                attrs = 0;
            }
            '%' => attrs = Cell::ATTR_CIRCLED,
            ch => {
                let mut content = String::from(ch);
                while chars.get(i + 1) == Some(&',') {
                    content.extend(chars.get(i + 2));
                    i += 2;
                }
                squares.push(Some(Square { chars: content, attrs }));
                attrs = 0;
            }
        }
        i += 1;
    }

    squares
}

/// Reader for `.pzzl` puzzles.
#[derive(Debug, Clone)]
pub struct PzzlFormatter {
    encoding: &'static Encoding,
}

impl Default for PzzlFormatter {
    fn default() -> Self {
        Self {
            encoding: encoding_rs::WINDOWS_1252,
        }
    }
}

impl PzzlFormatter {
    /// Creates a reader using windows-1252.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CrosswordFormatter for PzzlFormatter {
    const NAME: &'static str = "pzzl";

    fn set_encoding(&mut self, label: &str) -> Result<()> {
        self.encoding = text::resolve_encoding(label)?;
        Ok(())
    }

    fn read(&self, builder: &mut CrosswordBuilder, input: &[u8]) -> Result<()> {
        let document = text::decode(input, self.encoding);

        let mut section = 0;
        let mut declared_height = 0usize;
        let mut width = 0usize;
        let mut map: Vec<Row> = Vec::new();
        let mut hints_across: Vec<&str> = Vec::new();
        let mut hints_down: Vec<&str> = Vec::new();

        for line in document.lines() {
            if line.is_empty() {
                section += 1;
                continue;
            }

            match section {
                SECTION_TITLE => {
                    builder.set_title(line.to_string());
                }
                SECTION_AUTHOR => {
                    builder.set_author(line.to_string());
                }
                SECTION_WIDTH => trace!("Ignoring declared width '{}'", line),
                SECTION_HEIGHT => declared_height = text::parse_int(line, "Height")?,
                SECTION_MAP => {
                    if declared_height < 1 {
                        return Err(CrosswordError::Format("Height not set".to_string()));
                    }

                    let row = tokenize(line);
                    if map.is_empty() {
                        if row.is_empty() {
                            continue;
                        }
                        width = row.len();
                        Crossword::check_dimensions(width, declared_height)?;
                    }
                    if map.len() >= declared_height {
                        return Err(CrosswordError::Format(format!(
                            "Map row {} exceeds height {}",
                            map.len() + 1,
                            declared_height
                        )));
                    }
                    if row.len() > width {
                        return Err(CrosswordError::Format(format!(
                            "Map row {} holds {} squares, expected {}",
                            map.len() + 1,
                            row.len(),
                            width
                        )));
                    }

                    let mut row = row;
                    row.resize(width, None);
                    map.push(row);
                }
                SECTION_ACROSS => hints_across.push(line),
                SECTION_DOWN => hints_down.push(line),
                _ => {}
            }
        }

        if map.is_empty() {
            return Err(CrosswordError::Format("Missing map".to_string()));
        }
        map.resize(declared_height, vec![None; width]);
        debug!(
            "Map {}x{} (declared height {}), {} across and {} down clues",
            width,
            map.iter().filter(|r| r.iter().any(Option::is_some)).count(),
            declared_height,
            hints_across.len(),
            hints_down.len()
        );

        builder.set_width(width);
        map_out_words(builder, &hints_across, &hints_down, &map)
    }
}

fn map_out_words(builder: &mut CrosswordBuilder, across: &[&str], down: &[&str], map: &[Row]) -> Result<()> {
    let height = map.len();
    let is_open = |row: usize, column: usize| map[row][column].is_some();

    let mut across_hints = across.iter();
    let mut down_hints = down.iter();
    let mut number = 0u32;
    let mut actual_height = 0;

    for (i, row) in map.iter().enumerate() {
        let width = row.len();
        let mut all_empty = true;

        for j in 0..width {
            if !is_open(i, j) {
                continue;
            }
            all_empty = false;

            let mut incremented = false;
            if (j == 0 || !is_open(i, j - 1)) && j + 1 < width && is_open(i, j + 1) {
                number += 1;
                incremented = true;

                let hint = across_hints
                    .next()
                    .ok_or_else(|| CrosswordError::Format(format!("Missing clue for {} Across", number)))?;
                let mut wb = WordBuilder::new(Direction::Across)
                    .number(number)
                    .hint(*hint)
                    .start(i, j);
                for square in row[j..].iter().map_while(Option::as_ref) {
                    wb.add_cell(square.chars.clone(), square.attrs);
                }
                builder.add_word(wb.build()?);
            }

            // A top-row square always starts a down word, even without an open square below.
            if i == 0 || (!is_open(i - 1, j) && i + 1 < height && is_open(i + 1, j)) {
                if !incremented {
                    number += 1;
                }

                let hint = down_hints
                    .next()
                    .ok_or_else(|| CrosswordError::Format(format!("Missing clue for {} Down", number)))?;
                let mut wb = WordBuilder::new(Direction::Down)
                    .number(number)
                    .hint(*hint)
                    .start(i, j);
                for square in map[i..].iter().map_while(|r| r[j].as_ref()) {
                    wb.add_cell(square.chars.clone(), square.attrs);
                }
                builder.add_word(wb.build()?);
            }
        }

        if !all_empty {
            actual_height += 1;
        }
    }

    builder.set_height(actual_height);
    Ok(())
}
