//! Universal Uclick XML.
//!
//! Every value lives in an attribute and text values are URL-encoded:
//!
//! ```xml
//! <crossword>
//!   <Title v="Daily%20Puzzle"/>
//!   <Width v="15"/> <Height v="15"/>
//!   <across>
//!     <a1 a="CAT" c="Feline" n="1" cn="1"/>
//!   </across>
//!   <down> <d1 .../> </down>
//! </crossword>
//! ```
//!
//! `n` is the 1-based row-major index of the word's first square and `cn` is
//! its clue number.

use std::sync::OnceLock;

use encoding_rs::Encoding;
use regex::{Captures, Regex};

use super::CrosswordFormatter;
use super::text;
use super::xml::{self, XmlElement, XmlHandler, XmlPath};
use crate::crossword::puzzle::CrosswordBuilder;
use crate::crossword::types::{
    error::{CrosswordError, Result},
    models::{Direction, Word, WordBuilder},
};

/// Reader for Universal Uclick XML documents.
#[derive(Debug, Clone)]
pub struct UClickFormatter {
    encoding: &'static Encoding,
}

impl Default for UClickFormatter {
    fn default() -> Self {
        Self {
            encoding: encoding_rs::UTF_8,
        }
    }
}

impl UClickFormatter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CrosswordFormatter for UClickFormatter {
    const NAME: &'static str = "uclick";

    fn set_encoding(&mut self, label: &str) -> Result<()> {
        self.encoding = text::resolve_encoding(label)?;
        Ok(())
    }

    fn read(&self, builder: &mut CrosswordBuilder, input: &[u8]) -> Result<()> {
        let document = text::decode(input, self.encoding);
        xml::parse_xml(&document, &mut UClickHandler { builder })
    }
}

struct UClickHandler<'a> {
    builder: &'a mut CrosswordBuilder,
}

impl UClickHandler<'_> {
    fn parse_word(&self, element: &XmlElement) -> Result<Word> {
        let direction = if element.name.starts_with('a') {
            Direction::Across
        } else if element.name.starts_with('d') {
            Direction::Down
        } else {
            return Err(CrosswordError::Format(format!("Unexpected word indicator: {}", element.name)));
        };

        let number = match element.int_value("cn")?.map(u32::try_from) {
            Some(Ok(n)) if n >= 1 => n,
            _ => {
                return Err(CrosswordError::Format(format!(
                    "Number '{}' not valid",
                    element.string_value("cn").unwrap_or_default()
                )));
            }
        };

        let width = self.builder.width();
        if width == 0 {
            return Err(CrosswordError::Format("Word precedes grid width".to_string()));
        }
        let index = match element.int_value("n")? {
            Some(n) if n >= 1 => (n - 1) as usize,
            _ => {
                return Err(CrosswordError::Format(format!(
                    "Start square '{}' not valid",
                    element.string_value("n").unwrap_or_default()
                )));
            }
        };
        let answer = element
            .string_value("a")
            .ok_or_else(|| CrosswordError::Format(format!("Word {} {} has no answer", number, direction)))?;

        let mut wb = WordBuilder::new(direction)
            .number(number)
            .start(index / width, index % width)
            .answer(answer);
        wb.hint = url_decoded_value(element, "c")?;
        wb.build()
    }
}

impl XmlHandler for UClickHandler<'_> {
    fn on_start(&mut self, path: &mut XmlPath, element: &XmlElement) -> Result<()> {
        if !path.starts_with(&["crossword"]) {
            return Ok(());
        }

        if path.starts_with(&["Title"]) {
            self.builder.set_title(url_decoded_value(element, "v")?);
        } else if path.starts_with(&["Author"]) {
            self.builder.set_author(url_decoded_value(element, "v")?);
        } else if path.starts_with(&["Copyright"]) {
            self.builder.set_copyright(url_decoded_value(element, "v")?);
        } else if path.starts_with(&["Width"]) {
            self.builder.set_width(dimension(element)?);
        } else if path.starts_with(&["Height"]) {
            self.builder.set_height(dimension(element)?);
        } else if path.starts_with(&["across", "?"]) || path.starts_with(&["down", "?"]) {
            let word = self.parse_word(element)?;
            self.builder.add_word(word);
        }
        Ok(())
    }
}

fn dimension(element: &XmlElement) -> Result<usize> {
    match element.int_value("v")? {
        Some(n) if n >= 0 => Ok(n as usize),
        other => Err(CrosswordError::Format(format!("Invalid <{}> value: {:?}", element.name, other))),
    }
}

fn url_decoded_value(element: &XmlElement, name: &str) -> Result<Option<String>> {
    element.string_value(name).map(safe_url_decode).transpose()
}

static PERCENT_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Matches `%` with its escape digits, if any.
fn percent_regex() -> &'static Regex {
    PERCENT_PATTERN.get_or_init(|| Regex::new(r"%([0-9A-Fa-f]{2})?").expect("Invalid percent regex pattern"))
}

/// URL-decodes `value`, treating a `%` that does not start a `%XX` escape as a literal.
///
/// `+` decodes to a space.
pub fn safe_url_decode(value: &str) -> Result<String> {
    let escaped = percent_regex().replace_all(value, |caps: &Captures| match caps.get(1) {
        Some(_) => caps[0].to_string(),
        None => "%25".to_string(),
    });
    let spaced = escaped.replace('+', " ");

    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| CrosswordError::caused_by(format!("Invalid URL-encoded value '{}'", value), e))
}
