//! Amuse Labs JSON.
//!
//! # Document Shape
//! ```text
//! title, description, copyright, author
//! w, h                             grid dimensions
//! publishTime                      epoch millis
//! cellInfos[]                      { x, y, isCircled }   (0-based)
//! placedWords[]                    { acrossNotDown, clueNum, x, y, clue: { clue }, word }
//! ```
//!
//! Each character of `word` becomes one cell; circled squares are looked up
//! from `cellInfos`.

use encoding_rs::Encoding;
use log::debug;
use serde::Deserialize;

use super::CrosswordFormatter;
use super::json;
use super::text;
use crate::crossword::puzzle::{Crossword, CrosswordBuilder};
use crate::crossword::types::{
    error::{CrosswordError, Result},
    models::{Cell, Direction, Word, WordBuilder},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Document {
    title: Option<String>,
    description: Option<String>,
    copyright: Option<String>,
    author: Option<String>,
    w: i64,
    h: i64,
    #[serde(default)]
    publish_time: i64,
    cell_infos: Option<Vec<CellInfo>>,
    placed_words: Vec<PlacedWord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CellInfo {
    x: i64,
    y: i64,
    is_circled: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlacedWord {
    across_not_down: bool,
    clue_num: i64,
    x: i64,
    y: i64,
    clue: ClueText,
    word: String,
}

#[derive(Debug, Deserialize)]
struct ClueText {
    clue: Option<String>,
}

/// Reader for Amuse Labs JSON documents.
#[derive(Debug, Clone)]
pub struct AmuseFormatter {
    encoding: &'static Encoding,
}

impl Default for AmuseFormatter {
    fn default() -> Self {
        Self {
            encoding: encoding_rs::UTF_8,
        }
    }
}

impl AmuseFormatter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CrosswordFormatter for AmuseFormatter {
    const NAME: &'static str = "amuse";

    fn set_encoding(&mut self, label: &str) -> Result<()> {
        self.encoding = text::resolve_encoding(label)?;
        Ok(())
    }

    fn read(&self, builder: &mut CrosswordBuilder, input: &[u8]) -> Result<()> {
        let document = text::decode(input, self.encoding);
        let doc: Document = json::parse_document(&document)?;

        let width = index(doc.w, "width")?;
        let height = index(doc.h, "height")?;
        Crossword::check_dimensions(width, height)?;

        builder
            .set_title(doc.title)
            .set_description(doc.description)
            .set_copyright(doc.copyright)
            .set_author(doc.author)
            .set_width(width)
            .set_height(height)
            .set_date(doc.publish_time);

        let mut attrs = vec![0u8; width * height];
        for info in doc.cell_infos.iter().flatten() {
            if info.is_circled != Some(true) {
                continue;
            }
            let (row, column) = (index(info.y, "cell row")?, index(info.x, "cell column")?);
            if row >= height || column >= width {
                return Err(CrosswordError::Format(format!(
                    "Cell info ({}, {}) outside {}x{} grid",
                    info.x, info.y, width, height
                )));
            }
            attrs[row * width + column] = Cell::ATTR_CIRCLED;
        }

        debug!("{} placed words", doc.placed_words.len());
        for placed in &doc.placed_words {
            builder.add_word(build_word(placed, &attrs, width, height)?);
        }
        Ok(())
    }
}

fn index(value: i64, name: &str) -> Result<usize> {
    usize::try_from(value).map_err(|_| CrosswordError::Format(format!("Invalid {}: {}", name, value)))
}

fn build_word(placed: &PlacedWord, attrs: &[u8], width: usize, height: usize) -> Result<Word> {
    let direction = if placed.across_not_down {
        Direction::Across
    } else {
        Direction::Down
    };
    let number = u32::try_from(placed.clue_num)
        .map_err(|_| CrosswordError::Format(format!("Invalid clue number {}", placed.clue_num)))?;
    let row = index(placed.y, "start row")?;
    let column = index(placed.x, "start column")?;

    let mut wb = WordBuilder::new(direction).number(number).start(row, column);
    wb.hint = placed.clue.clue.clone();

    for (i, ch) in placed.word.chars().enumerate() {
        let (r, c) = match direction {
            Direction::Across => (row, column + i),
            Direction::Down => (row + i, column),
        };
        if r >= height || c >= width {
            return Err(CrosswordError::Format(format!(
                "{} {} runs outside the grid",
                number, direction
            )));
        }
        wb.add_cell(ch.to_string(), attrs[r * width + c]);
    }

    wb.build()
}
