//! Wall Street Journal JSON.
//!
//! # Document Shape
//! ```text
//! data.copy.title / description / publisher / byline
//! data.copy.date-publish        "Friday, 5 June 2015"
//! data.copy.gridsize            { cols, rows }
//! data.copy.words[]             { id, x: "1-5" | 3, y: 2 | "2-6" }   (1-based)
//! data.copy.clues[2]            { title: "Across"|"Down", clues: [{ word, clue, number }] }
//! data.grid[rows][cols]         { Letter: "A" }  ("" = block)
//! ```
//!
//! Word positions come from `words[]`; a clue refers to its word by id.
//! Numbers may be encoded as JSON numbers or strings.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use encoding_rs::Encoding;
use log::debug;
use serde::Deserialize;

use super::CrosswordFormatter;
use super::json::{self, Scalar};
use super::text;
use crate::crossword::puzzle::{Crossword, CrosswordBuilder};
use crate::crossword::types::{
    error::{CrosswordError, Result},
    models::{Direction, WordBuilder},
};

/// `chrono` pattern of `date-publish`.
pub const PUBLISH_DATE_FORMAT: &str = "%A, %d %B %Y";

#[derive(Debug, Deserialize)]
struct Document {
    data: Option<Data>,
}

#[derive(Debug, Deserialize)]
struct Data {
    copy: Option<CopyBlock>,
    grid: Option<Vec<Vec<Option<Square>>>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct CopyBlock {
    title: Option<String>,
    description: Option<String>,
    publisher: Option<String>,
    byline: Option<String>,
    date_publish: Option<String>,
    gridsize: Option<GridSize>,
    clues: Option<Vec<ClueGroup>>,
    words: Option<Vec<WordPosition>>,
}

#[derive(Debug, Deserialize)]
struct GridSize {
    cols: Option<Scalar>,
    rows: Option<Scalar>,
}

#[derive(Debug, Deserialize)]
struct Square {
    #[serde(rename = "Letter")]
    letter: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClueGroup {
    title: Option<String>,
    clues: Option<Vec<Clue>>,
}

#[derive(Debug, Deserialize)]
struct Clue {
    word: Option<Scalar>,
    clue: Option<String>,
    number: Option<Scalar>,
}

#[derive(Debug, Deserialize)]
struct WordPosition {
    id: Option<Scalar>,
    x: Option<Scalar>,
    y: Option<Scalar>,
}

/// Resolved extent of a word.
#[derive(Debug, Clone, Copy)]
struct Extent {
    row: usize,
    column: usize,
    length: usize,
}

/// Reader for WSJ JSON documents.
#[derive(Debug, Clone)]
pub struct WsjFormatter {
    encoding: &'static Encoding,
}

impl Default for WsjFormatter {
    fn default() -> Self {
        Self {
            encoding: encoding_rs::UTF_8,
        }
    }
}

impl WsjFormatter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CrosswordFormatter for WsjFormatter {
    const NAME: &'static str = "wsj";

    fn set_encoding(&mut self, label: &str) -> Result<()> {
        self.encoding = text::resolve_encoding(label)?;
        Ok(())
    }

    fn read(&self, builder: &mut CrosswordBuilder, input: &[u8]) -> Result<()> {
        let document = text::decode(input, self.encoding);
        let doc: Document = json::parse_document(&document)?;

        let data = doc.data.ok_or_else(|| missing("data"))?;
        let copy = data.copy.ok_or_else(|| missing("data.copy"))?;
        let gridsize = copy.gridsize.as_ref().ok_or_else(|| missing("data.copy.gridsize"))?;

        let width = dimension(gridsize.cols.as_ref(), "cols")?;
        let height = dimension(gridsize.rows.as_ref(), "rows")?;
        Crossword::check_dimensions(width, height)?;

        let published = copy.date_publish.as_deref().unwrap_or_default();
        let date = NaiveDate::parse_from_str(published.trim(), PUBLISH_DATE_FORMAT)
            .map_err(|e| CrosswordError::caused_by(format!("Can't parse '{}' as publish date", published), e))?;
        let millis = date.and_hms_opt(0, 0, 0).map_or(0, |dt| dt.and_utc().timestamp_millis());

        builder
            .set_title(copy.title.clone())
            .set_description(copy.description.clone())
            .set_copyright(copy.publisher.clone())
            .set_author(copy.byline.clone())
            .set_date(millis)
            .set_width(width)
            .set_height(height);

        let grid = parse_grid(data.grid.as_deref(), width, height)?;
        read_clues(builder, &copy, &grid)
    }
}

fn missing(what: &str) -> CrosswordError {
    CrosswordError::Format(format!("Missing '{}'", what))
}

fn dimension(value: Option<&Scalar>, name: &str) -> Result<usize> {
    let n = value.map(|v| v.as_int(name)).transpose()?.unwrap_or(0);
    usize::try_from(n).map_err(|_| CrosswordError::Format(format!("Invalid grid {}: {}", name, n)))
}

/// Letters of the grid, `None` for blocks.
fn parse_grid(rows: Option<&[Vec<Option<Square>>]>, width: usize, height: usize) -> Result<Vec<Vec<Option<String>>>> {
    let rows = rows.ok_or_else(|| missing("data.grid[]"))?;
    if rows.len() != height {
        return Err(CrosswordError::Format(format!(
            "Unexpected grid length of {} (expected {})",
            rows.len(),
            height
        )));
    }

    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            if row.len() != width {
                return Err(CrosswordError::Format(format!(
                    "Unexpected length of {} for 'data.grid[{}]' (expected {})",
                    row.len(),
                    i,
                    width
                )));
            }
            Ok(row
                .iter()
                .map(|square| {
                    square
                        .as_ref()
                        .and_then(|s| s.letter.clone())
                        .filter(|letter| !letter.is_empty())
                })
                .collect())
        })
        .collect()
}

/// Parses a 1-based `"a-b"` range into (start, length), or a single `n` into (start, 0).
fn parse_position(value: &Scalar, context: &str) -> Result<(usize, Option<usize>)> {
    let text_value = value.as_text();
    let one_based = |v: &str| -> Result<usize> {
        let n: usize = text::parse_int(v, context)?;
        n.checked_sub(1)
            .ok_or_else(|| CrosswordError::Format(format!("{} '{}' is not 1-based", context, text_value)))
    };

    match text_value.split_once('-') {
        Some((first, last)) => {
            let start = one_based(first)?;
            let end: usize = text::parse_int(last, context)?;
            let length = end
                .checked_sub(start)
                .ok_or_else(|| CrosswordError::Format(format!("Reversed {} '{}'", context, text_value)))?;
            Ok((start, Some(length)))
        }
        None => Ok((one_based(&text_value)?, None)),
    }
}

fn parse_extents(positions: &[WordPosition]) -> Result<BTreeMap<i64, Extent>> {
    let mut extents = BTreeMap::new();
    for (i, position) in positions.iter().enumerate() {
        let context = format!("data.copy.words[{}]", i);
        let id = position
            .id
            .as_ref()
            .ok_or_else(|| CrosswordError::Format(format!("Word missing identifier at '{}'", context)))?
            .as_int(&context)?;
        let x = position
            .x
            .as_ref()
            .ok_or_else(|| CrosswordError::Format(format!("Word missing 'x' at '{}'", context)))?;
        let y = position
            .y
            .as_ref()
            .ok_or_else(|| CrosswordError::Format(format!("Word missing 'y' at '{}'", context)))?;

        let (column, across_length) = parse_position(x, &context)?;
        let (row, down_length) = parse_position(y, &context)?;
        let length = down_length.or(across_length).unwrap_or(0);

        extents.insert(id, Extent { row, column, length });
    }
    Ok(extents)
}

fn read_clues(builder: &mut CrosswordBuilder, copy: &CopyBlock, grid: &[Vec<Option<String>>]) -> Result<()> {
    let groups = copy.clues.as_ref().ok_or_else(|| missing("data.copy.clues[]"))?;
    if groups.len() != 2 {
        return Err(CrosswordError::Format(format!("Unexpected clues length of '{}'", groups.len())));
    }

    let positions = copy.words.as_ref().ok_or_else(|| missing("data.copy.words[]"))?;
    let extents = parse_extents(positions)?;
    debug!("{} word positions", extents.len());

    for (i, group) in groups.iter().enumerate() {
        let title = group.title.as_deref().unwrap_or_default();
        let direction = if title.eq_ignore_ascii_case("Across") {
            Direction::Across
        } else if title.eq_ignore_ascii_case("Down") {
            Direction::Down
        } else {
            return Err(CrosswordError::Format(format!("Invalid direction: '{}'", title)));
        };

        let clues = group
            .clues
            .as_ref()
            .ok_or_else(|| missing(&format!("data.copy.clues[{}].clues", i)))?;

        for (j, clue) in clues.iter().enumerate() {
            let context = format!("data.copy.clues[{}].clues[{}]", i, j);
            let word_id = clue
                .word
                .as_ref()
                .map(|w| w.as_int(&context))
                .transpose()?
                .unwrap_or(-1);
            let extent = extents
                .get(&word_id)
                .ok_or_else(|| CrosswordError::Format(format!("No matching word for clue at '{}.word'", context)))?;
            let number = match &clue.number {
                Some(n) => n.as_int(&context)?,
                None => 0,
            };
            let number = u32::try_from(number)
                .map_err(|_| CrosswordError::Format(format!("Invalid number {} at '{}'", number, context)))?;

            let mut wb = WordBuilder::new(direction)
                .number(number)
                .hint(clue.clue.clone().unwrap_or_default())
                .start(extent.row, extent.column);

            for k in 0..extent.length {
                let (row, column) = match direction {
                    Direction::Across => (extent.row, extent.column + k),
                    Direction::Down => (extent.row + k, extent.column),
                };
                let letter = grid
                    .get(row)
                    .and_then(|r| r.get(column))
                    .and_then(Option::as_ref)
                    .ok_or_else(|| {
                        CrosswordError::Format(format!("grid[{}][{}] is null (it shouldn't be)", row, column))
                    })?;
                wb.add_cell(letter.clone(), 0);
            }

            builder.add_word(wb.build()?);
        }
    }

    Ok(())
}
