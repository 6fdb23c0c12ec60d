//! New York Times JSON.
//!
//! # Document Shape
//! ```text
//! constructors[]                   author names, joined with ", "
//! copyright, publicationDate       "2015-10-20"
//! notes[0].text                    stored as the comment
//! body[0].dimensions               { width, height }
//! body[0].cells[]                  { answer, type }  (row-major, {} = block, type 2 = circled)
//! body[0].clues[]                  { cells: [i..], direction: "Across"|"Down", label: 1 | "1", text: [{ plain, formatted }] }
//! ```
//!
//! Text fields may carry HTML entities, which are resolved. A clue's formatted
//! text wins over its plain text.

use chrono::NaiveDate;
use encoding_rs::Encoding;
use log::debug;
use serde::Deserialize;

use super::CrosswordFormatter;
use super::json::{self, Scalar};
use super::text::{self, strip_html_entities};
use crate::crossword::puzzle::{Crossword, CrosswordBuilder};
use crate::crossword::types::{
    error::{CrosswordError, Result},
    models::{Cell, Direction, Word, WordBuilder},
};

/// `chrono` pattern of `publicationDate`.
pub const PUBLISH_DATE_FORMAT: &str = "%Y-%m-%d";

const TYPE_CIRCLED: i64 = 2;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Document {
    #[serde(default)]
    body: Vec<Body>,
    #[serde(default)]
    constructors: Vec<String>,
    copyright: Option<String>,
    notes: Option<Vec<Note>>,
    publication_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Body {
    dimensions: Dimensions,
    #[serde(default)]
    cells: Vec<Square>,
    #[serde(default)]
    clues: Vec<Clue>,
}

#[derive(Debug, Deserialize)]
struct Note {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Dimensions {
    width: i64,
    height: i64,
}

#[derive(Debug, Deserialize)]
struct Square {
    #[serde(rename = "type")]
    kind: Option<i64>,
    answer: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Clue {
    #[serde(default)]
    cells: Vec<usize>,
    direction: String,
    label: Scalar,
    #[serde(default)]
    text: Vec<ClueText>,
}

#[derive(Debug, Deserialize)]
struct ClueText {
    plain: Option<String>,
    formatted: Option<String>,
}

/// Reader for NYT JSON documents.
#[derive(Debug, Clone)]
pub struct NytFormatter {
    encoding: &'static Encoding,
}

impl Default for NytFormatter {
    fn default() -> Self {
        Self {
            encoding: encoding_rs::UTF_8,
        }
    }
}

impl NytFormatter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CrosswordFormatter for NytFormatter {
    const NAME: &'static str = "nyt";

    fn set_encoding(&mut self, label: &str) -> Result<()> {
        self.encoding = text::resolve_encoding(label)?;
        Ok(())
    }

    fn read(&self, builder: &mut CrosswordBuilder, input: &[u8]) -> Result<()> {
        let document = text::decode(input, self.encoding);
        let doc: Document = json::parse_document(&document)?;
        let body = doc
            .body
            .first()
            .ok_or_else(|| CrosswordError::Format("Missing 'body'".to_string()))?;

        let (width, height) = match (
            usize::try_from(body.dimensions.width),
            usize::try_from(body.dimensions.height),
        ) {
            (Ok(w), Ok(h)) => (w, h),
            _ => {
                return Err(CrosswordError::Format(format!(
                    "Puzzle has bad dimensions ({}x{})",
                    body.dimensions.width, body.dimensions.height
                )));
            }
        };
        Crossword::check_dimensions(width, height)?;

        let date = match doc.publication_date.as_deref() {
            Some(published) => NaiveDate::parse_from_str(published.trim(), PUBLISH_DATE_FORMAT)
                .map_err(|e| CrosswordError::caused_by(format!("Can't parse '{}' as publish date", published), e))?
                .and_hms_opt(0, 0, 0)
                .map_or(0, |dt| dt.and_utc().timestamp_millis()),
            None => 0,
        };

        builder
            .set_width(width)
            .set_height(height)
            .set_author(strip_html_entities(&doc.constructors.join(", ")))
            .set_copyright(doc.copyright.as_deref().map(strip_html_entities))
            .set_comment(
                doc.notes
                    .as_ref()
                    .and_then(|notes| notes.first())
                    .and_then(|note| note.text.as_deref())
                    .map(strip_html_entities),
            )
            .set_date(date);

        debug!("{} squares, {} clues", body.cells.len(), body.clues.len());
        for clue in &body.clues {
            builder.add_word(build_word(clue, &body.cells, width)?);
        }
        Ok(())
    }
}

fn build_word(clue: &Clue, squares: &[Square], width: usize) -> Result<Word> {
    let direction = match clue.direction.as_str() {
        "Across" => Direction::Across,
        "Down" => Direction::Down,
        other => return Err(CrosswordError::Format(format!("{} is not a valid direction", other))),
    };
    let label = clue.label.as_int("Clue label")?;
    let number =
        u32::try_from(label).map_err(|_| CrosswordError::Format(format!("Invalid clue label {}", label)))?;
    let first = *clue
        .cells
        .first()
        .ok_or_else(|| CrosswordError::Format(format!("Clue {} {} has no cells", number, direction)))?;

    let hint = clue.text.first().and_then(|text| {
        text.formatted
            .as_deref()
            .map(strip_html_entities)
            .or_else(|| text.plain.clone())
    });

    let mut wb = WordBuilder::new(direction)
        .number(number)
        .start(first / width, first % width);
    wb.hint = hint;

    for &index in &clue.cells {
        let (answer, kind) = squares
            .get(index)
            .and_then(|square| Some((square.answer.clone()?, square.kind)))
            .ok_or_else(|| {
                CrosswordError::Format(format!("Clue {} {} refers to empty square {}", number, direction, index))
            })?;
        let attrs = match kind {
            Some(TYPE_CIRCLED) => Cell::ATTR_CIRCLED,
            _ => 0,
        };
        wb.add_cell(answer, attrs);
    }

    wb.build()
}
