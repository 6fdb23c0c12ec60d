//! Pipe-delimited text format.
//!
//! # File Structure
//! ```text
//! line 1: width|height
//! line 2: flattened row-major map, '+' = block
//! line 3: number|across hint|down hint|number|across hint|down hint|...|
//! line 4: title|author
//! ```
//!
//! The map carries no numbers. A numbering pass over the map assigns each hint
//! its start square, and every numbered start must have a hint.

use std::collections::BTreeMap;

use encoding_rs::Encoding;
use log::debug;

use super::CrosswordFormatter;
use super::text;
use crate::crossword::puzzle::{Crossword, CrosswordBuilder};
use crate::crossword::types::{
    error::{CrosswordError, Result},
    models::{Direction, WordBuilder},
};

const LINE_DIMENSIONS: usize = 1;
const LINE_MAP: usize = 2;
const LINE_HINTS: usize = 3;
const LINE_DESCRIPTION: usize = 4;

const CHAR_EMPTY: char = '+';

#[derive(Debug, Clone)]
struct Hint {
    text: String,
    start: Option<(usize, usize)>,
}

impl Hint {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            start: None,
        }
    }
}

type Map = Vec<Vec<Option<char>>>;

/// Reader for `.dat` puzzles.
#[derive(Debug, Clone)]
pub struct DatFormatter {
    encoding: &'static Encoding,
}

impl Default for DatFormatter {
    fn default() -> Self {
        Self {
            encoding: encoding_rs::UTF_8,
        }
    }
}

impl DatFormatter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CrosswordFormatter for DatFormatter {
    const NAME: &'static str = "dat";

    fn set_encoding(&mut self, label: &str) -> Result<()> {
        self.encoding = text::resolve_encoding(label)?;
        Ok(())
    }

    fn read(&self, builder: &mut CrosswordBuilder, input: &[u8]) -> Result<()> {
        let document = text::decode(input, self.encoding);

        let mut width = 0;
        let mut height = 0;
        let mut map: Option<Map> = None;
        let mut hints_across: BTreeMap<u32, Hint> = BTreeMap::new();
        let mut hints_down: BTreeMap<u32, Hint> = BTreeMap::new();
        let mut title = None;
        let mut author = None;

        for (index, line) in document.lines().enumerate() {
            match index + 1 {
                LINE_DIMENSIONS => {
                    let dims = text::split_trimmed(line, '|');
                    if dims.len() != 2 {
                        return Err(CrosswordError::Format("Dimension format unrecognized".to_string()));
                    }
                    width = text::parse_int::<usize>(dims[0], "Width")?;
                    height = text::parse_int::<usize>(dims[1], "Height")?;
                    if width < 1 {
                        return Err(CrosswordError::Format(format!("Width {} is not valid", width)));
                    }
                    if height < 1 {
                        return Err(CrosswordError::Format(format!("Height {} is not valid", height)));
                    }
                    Crossword::check_dimensions(width, height)?;
                }
                LINE_MAP => {
                    if width == 0 {
                        return Err(CrosswordError::Format("Map precedes dimensions".to_string()));
                    }
                    let mut grid: Map = vec![vec![None; width]; height];
                    for (i, ch) in line.chars().enumerate() {
                        let square = grid
                            .get_mut(i / width)
                            .and_then(|r| r.get_mut(i % width))
                            .ok_or_else(|| CrosswordError::Format("Row exceeds height".to_string()))?;
                        if ch != CHAR_EMPTY {
                            *square = Some(ch);
                        }
                    }
                    map = Some(grid);
                }
                LINE_HINTS => {
                    let parts: Vec<&str> = line.split('|').collect();
                    if parts.len() % 3 != 1 {
                        return Err(CrosswordError::Format(format!("Invalid length for hints: {}", parts.len())));
                    }
                    for triple in parts.chunks_exact(3) {
                        let number: u32 = text::parse_int(triple[0], "Hint number")?;
                        if !triple[1].is_empty() {
                            hints_across.insert(number, Hint::new(triple[1]));
                        }
                        if !triple[2].is_empty() {
                            hints_down.insert(number, Hint::new(triple[2]));
                        }
                    }
                }
                LINE_DESCRIPTION => {
                    let parts = text::split_trimmed(line, '|');
                    if parts.len() != 2 {
                        return Err(CrosswordError::Format("Unexpected description count".to_string()));
                    }
                    title = Some(parts[0].to_string());
                    author = Some(parts[1].to_string());
                }
                _ => break,
            }
        }

        let map = map.ok_or_else(|| CrosswordError::Truncated("Missing map line".to_string()))?;
        debug!(
            "Map {}x{}, {} across and {} down hints",
            width,
            height,
            hints_across.len(),
            hints_down.len()
        );

        builder
            .set_width(width)
            .set_height(height)
            .set_title(title)
            .set_author(author);

        assign_starts(&map, &mut hints_across, &mut hints_down)?;
        build_words(builder, &map, &hints_across, Direction::Across)?;
        build_words(builder, &map, &hints_down, Direction::Down)
    }
}

/// Numbers the map and records each hint's start square.
fn assign_starts(map: &Map, across: &mut BTreeMap<u32, Hint>, down: &mut BTreeMap<u32, Hint>) -> Result<()> {
    let height = map.len();
    let width = map.first().map_or(0, Vec::len);
    let is_open = |row: usize, column: usize| map[row][column].is_some();

    let mut counter = 0u32;
    for row in 0..height {
        for column in 0..width {
            if !is_open(row, column) {
                continue;
            }

            let mut incremented = false;
            if (column == 0 || !is_open(row, column - 1)) && column + 1 < width && is_open(row, column + 1) {
                counter += 1;
                incremented = true;
                across
                    .get_mut(&counter)
                    .ok_or_else(|| CrosswordError::Format(format!("Hint {} Across not found", counter)))?
                    .start = Some((row, column));
            }

            if (row == 0 || !is_open(row - 1, column)) && row + 1 < height && is_open(row + 1, column) {
                if !incremented {
                    counter += 1;
                }
                down.get_mut(&counter)
                    .ok_or_else(|| CrosswordError::Format(format!("Hint {} Down not found", counter)))?
                    .start = Some((row, column));
            }
        }
    }

    Ok(())
}

fn build_words(builder: &mut CrosswordBuilder, map: &Map, hints: &BTreeMap<u32, Hint>, direction: Direction) -> Result<()> {
    let height = map.len();
    let width = map.first().map_or(0, Vec::len);

    for (&number, hint) in hints {
        let (row, column) = hint
            .start
            .ok_or_else(|| CrosswordError::Format(format!("Hint {} {} has no matching square", number, direction)))?;

        let mut wb = WordBuilder::new(direction)
            .number(number)
            .hint(hint.text.clone())
            .start(row, column);

        let squares: Box<dyn Iterator<Item = Option<char>>> = match direction {
            Direction::Across => Box::new((column..width).map(|c| map[row][c])),
            Direction::Down => Box::new((row..height).map(|r| map[r][column])),
        };
        for ch in squares.map_while(|square| square) {
            wb.add_cell(ch.to_string(), 0);
        }

        builder.add_word(wb.build()?);
    }

    Ok(())
}
