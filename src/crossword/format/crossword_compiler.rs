//! Crossword Compiler XML (`<rectangular-puzzle>`).
//!
//! # Document Shape
//! ```text
//! ?/rectangular-puzzle                 alphabet="..."
//!   metadata/{title,creator,copyright,description}
//!   crossword/grid                     width, height
//!     cell                             x, y (1-based), solution, number, background-shape
//!   crossword/word                     id, x="1-5" y="3" (across) | x="2" y="1-4" (down)
//!   crossword/clues/clue               word, number, hint-url, citation; text = hint
//! ```
//!
//! Words are collected by id and added in ascending id order once the whole
//! document has been read. A word without a clue number takes the number of
//! its first grid cell.

use std::collections::BTreeMap;

use encoding_rs::Encoding;
use log::{debug, warn};

use super::CrosswordFormatter;
use super::text;
use super::xml::{self, XmlElement, XmlHandler, XmlPath};
use crate::crossword::puzzle::{Crossword, CrosswordBuilder};
use crate::crossword::types::{
    error::{CrosswordError, Result},
    models::{Cell, Direction, WordBuilder},
};

/// Reader for Crossword Compiler XML documents.
#[derive(Debug, Clone)]
pub struct CrosswordCompilerFormatter {
    encoding: &'static Encoding,
}

impl Default for CrosswordCompilerFormatter {
    fn default() -> Self {
        Self {
            encoding: encoding_rs::UTF_8,
        }
    }
}

impl CrosswordCompilerFormatter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CrosswordFormatter for CrosswordCompilerFormatter {
    const NAME: &'static str = "crossword-compiler";

    fn set_encoding(&mut self, label: &str) -> Result<()> {
        self.encoding = text::resolve_encoding(label)?;
        Ok(())
    }

    fn read(&self, builder: &mut CrosswordBuilder, input: &[u8]) -> Result<()> {
        let document = text::decode(input, self.encoding);
        let mut handler = CompilerHandler::new(builder);
        xml::parse_xml(&document, &mut handler)?;
        handler.finish()
    }
}

#[derive(Debug, Clone)]
struct GridCell {
    chars: String,
    number: Option<u32>,
    attrs: u8,
}

struct CompilerHandler<'a> {
    builder: &'a mut CrosswordBuilder,
    cells: Vec<Vec<Option<GridCell>>>,
    words: BTreeMap<i64, WordBuilder>,
    current_clue: Option<i64>,
}

impl<'a> CompilerHandler<'a> {
    fn new(builder: &'a mut CrosswordBuilder) -> Self {
        Self {
            builder,
            cells: Vec::new(),
            words: BTreeMap::new(),
            current_clue: None,
        }
    }

    fn grid_cell(&self, row: usize, column: usize) -> Result<&GridCell> {
        self.cells
            .get(row)
            .and_then(|r| r.get(column))
            .and_then(Option::as_ref)
            .ok_or_else(|| {
                CrosswordError::Format(format!("No solution for square ({}, {})", row + 1, column + 1))
            })
    }

    fn on_grid(&mut self, element: &XmlElement) -> Result<()> {
        let width = dimension(element, "width")?;
        let height = dimension(element, "height")?;
        Crossword::check_dimensions(width, height)?;
        debug!("Grid {}x{}", width, height);

        self.cells = vec![vec![None; width]; height];
        self.builder.set_width(width).set_height(height);
        Ok(())
    }

    fn on_cell(&mut self, element: &XmlElement) -> Result<()> {
        let Some(solution) = element.string_value("solution") else {
            return Ok(());
        };

        let row = coordinate(element, "y")?;
        let column = coordinate(element, "x")?;
        let number = match element.int_value("number")? {
            Some(n) if n > 0 => Some(clue_number(n)?),
            _ => None,
        };
        let attrs = if element.string_value("background-shape").is_some() {
            Cell::ATTR_CIRCLED
        } else {
            0
        };

        let slot = self
            .cells
            .get_mut(row)
            .and_then(|r| r.get_mut(column))
            .ok_or_else(|| CrosswordError::Format(format!("Cell ({}, {}) lies outside the grid", column + 1, row + 1)))?;
        *slot = Some(GridCell {
            chars: solution.to_string(),
            number,
            attrs,
        });
        Ok(())
    }

    fn on_word(&mut self, element: &XmlElement) -> Result<()> {
        let id = element
            .int_value("id")?
            .ok_or_else(|| CrosswordError::Format("Word without id".to_string()))?;
        let x = required(element, "x")?;
        let y = required(element, "y")?;

        let (direction, row, column, length) = match (parse_span(x)?, parse_span(y)?) {
            (Span::Range(first, last), Span::Single(row)) => (Direction::Across, row, first, last + 1 - first),
            (Span::Single(column), Span::Range(first, last)) => (Direction::Down, first, column, last + 1 - first),
            _ => {
                return Err(CrosswordError::Format(format!(
                    "Word {} has ambiguous extent (x={}, y={})",
                    id, x, y
                )));
            }
        };

        let mut wb = WordBuilder::new(direction).start(row, column);
        for i in 0..length {
            let (r, c) = match direction {
                Direction::Across => (row, column + i),
                Direction::Down => (row + i, column),
            };
            let cell = self.grid_cell(r, c)?;
            wb.add_cell(cell.chars.clone(), cell.attrs);
        }

        if self.words.insert(id, wb).is_some() {
            warn!("Duplicate word id {}; keeping the last one", id);
        }
        Ok(())
    }

    fn on_clue(&mut self, element: &XmlElement) -> Result<()> {
        let id = element
            .int_value("word")?
            .ok_or_else(|| CrosswordError::Format("Clue without word reference".to_string()))?;
        let wb = self
            .words
            .get_mut(&id)
            .ok_or_else(|| CrosswordError::Format(format!("Clue refers to unknown word {}", id)))?;

        if let Some(number) = element.int_value("number")? {
            wb.number = Some(clue_number(number)?);
        }
        wb.hint_url = element.string_value("hint-url").map(str::to_string);
        wb.citation = element.string_value("citation").map(str::to_string);
        self.current_clue = Some(id);
        Ok(())
    }

    fn finish(self) -> Result<()> {
        for (_, mut wb) in self.words {
            if wb.number.is_none() {
                wb.number = self
                    .cells
                    .get(wb.start_row)
                    .and_then(|r| r.get(wb.start_column))
                    .and_then(Option::as_ref)
                    .and_then(|cell| cell.number);
            }
            self.builder.add_word(wb.build()?);
        }
        Ok(())
    }
}

impl XmlHandler for CompilerHandler<'_> {
    fn on_start(&mut self, path: &mut XmlPath, element: &XmlElement) -> Result<()> {
        if !path.starts_with(&["?", "rectangular-puzzle"]) {
            return Ok(());
        }

        if path.starts_with(&["crossword"]) {
            if path.starts_with(&["grid"]) {
                if path.is_equal_to(&["cell"]) {
                    self.on_cell(element)?;
                } else if path.is_dead_end() {
                    self.on_grid(element)?;
                }
            } else if path.is_equal_to(&["word"]) {
                self.on_word(element)?;
            } else if path.is_equal_to(&["clues", "clue"]) {
                self.on_clue(element)?;
            }
        } else if path.is_dead_end()
            && let Some(alphabet) = element.string_value("alphabet")
        {
            self.builder.set_alphabet(alphabet.chars());
        }
        Ok(())
    }

    fn on_text(&mut self, path: &mut XmlPath, text: &str) -> Result<()> {
        if !path.starts_with(&["?", "rectangular-puzzle"]) {
            return Ok(());
        }

        if path.starts_with(&["metadata"]) {
            let value = text.to_string();
            if path.is_equal_to(&["title"]) {
                self.builder.set_title(value);
            } else if path.is_equal_to(&["creator"]) {
                self.builder.set_author(value);
            } else if path.is_equal_to(&["copyright"]) {
                self.builder.set_copyright(value);
            } else if path.is_equal_to(&["description"]) {
                self.builder.set_description(value);
            }
        } else if path.is_equal_to(&["crossword", "clues", "clue"])
            && let Some(id) = self.current_clue
            && let Some(wb) = self.words.get_mut(&id)
        {
            match &mut wb.hint {
                Some(hint) => hint.push_str(text),
                None => wb.hint = Some(text.to_string()),
            }
        }
        Ok(())
    }

    fn on_end(&mut self, path: &mut XmlPath) -> Result<()> {
        if path.is_equal_to(&["?", "rectangular-puzzle", "crossword", "clues", "clue"]) {
            self.current_clue = None;
        }
        Ok(())
    }
}

enum Span {
    Single(usize),
    Range(usize, usize),
}

/// Parses a 1-based `"n"` or `"a-b"` attribute into 0-based coordinates.
fn parse_span(value: &str) -> Result<Span> {
    let one_based = |v: &str| -> Result<usize> {
        let n: usize = text::parse_int(v, "Word extent")?;
        n.checked_sub(1)
            .ok_or_else(|| CrosswordError::Format(format!("Word extent '{}' is not 1-based", value)))
    };

    match value.split_once('-') {
        Some((first, last)) => {
            let (first, last) = (one_based(first)?, one_based(last)?);
            if last < first {
                return Err(CrosswordError::Format(format!("Reversed word extent '{}'", value)));
            }
            Ok(Span::Range(first, last))
        }
        None => Ok(Span::Single(one_based(value)?)),
    }
}

fn required<'e>(element: &'e XmlElement, name: &str) -> Result<&'e str> {
    element
        .string_value(name)
        .ok_or_else(|| CrosswordError::Format(format!("<{}> is missing '{}'", element.name, name)))
}

fn dimension(element: &XmlElement, name: &str) -> Result<usize> {
    match element.int_value(name)? {
        Some(n) if n > 0 => usize::try_from(n)
            .map_err(|_| CrosswordError::Format(format!("Invalid grid {}: {}", name, n))),
        other => Err(CrosswordError::Format(format!("Invalid grid {}: {:?}", name, other))),
    }
}

fn clue_number(n: i64) -> Result<u32> {
    u32::try_from(n).map_err(|_| CrosswordError::Format(format!("Invalid clue number {}", n)))
}

fn coordinate(element: &XmlElement, name: &str) -> Result<usize> {
    match element.int_value(name)? {
        Some(n) if n > 0 => usize::try_from(n - 1)
            .map_err(|_| CrosswordError::Format(format!("Invalid cell {}: {}", name, n))),
        other => Err(CrosswordError::Format(format!("Invalid cell {}: {:?}", name, other))),
    }
}
