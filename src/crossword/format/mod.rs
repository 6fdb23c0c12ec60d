//! Readers for third-party crossword file formats.
//!
//! Every reader is a [`CrosswordFormatter`]: a pure function from the bytes of
//! one document to mutations of a [`CrosswordBuilder`]. No state survives a
//! `read` call. All readers in this module are read-only.
//!
//! # Module Organization
//!
//! - [`puz`]: Across Lite binary format, including locked puzzles
//! - [`crossword_compiler`]: Crossword Compiler XML (`rectangular-puzzle`)
//! - [`uclick`]: Universal Uclick XML with URL-encoded values
//! - [`wsj`]: Wall Street Journal JSON
//! - [`nyt`]: New York Times JSON
//! - [`amuse`]: Amuse Labs JSON
//! - [`uclick_json`]: Universal Uclick JSON
//! - [`dat`]: pipe-delimited text
//! - [`pzzl`]: blank-line sectioned text
//! - [`xml`]: streaming path matcher shared by the XML readers
//! - [`json`]: document parsing shared by the JSON readers
//! - [`text`]: encoding resolution and entity stripping shared by the text readers

pub mod amuse;
pub mod crossword_compiler;
pub mod dat;
pub mod json;
pub mod nyt;
pub mod puz;
pub mod pzzl;
pub mod text;
pub mod uclick;
pub mod uclick_json;
pub mod wsj;
pub mod xml;

use std::io::Write;
use std::path::Path;

use log::{debug, info};

use crate::crossword::puzzle::{Crossword, CrosswordBuilder};
use crate::crossword::types::error::{CrosswordError, Result};

pub use amuse::AmuseFormatter;
pub use crossword_compiler::CrosswordCompilerFormatter;
pub use dat::DatFormatter;
pub use nyt::NytFormatter;
pub use puz::PuzFormatter;
pub use pzzl::PzzlFormatter;
pub use uclick::UClickFormatter;
pub use uclick_json::UClickJsonFormatter;
pub use wsj::WsjFormatter;

/// Common contract of every format reader.
pub trait CrosswordFormatter {
    /// A short name used for logging.
    const NAME: &'static str;

    /// Sets the text encoding used for subsequent reads.
    ///
    /// Formats with a fixed encoding ignore this.
    ///
    /// # Errors
    /// Returns [`CrosswordError::InvalidArgument`] for an unknown encoding label.
    fn set_encoding(&mut self, _label: &str) -> Result<()> {
        Ok(())
    }

    /// Populates `builder` from the bytes of one document.
    fn read(&self, builder: &mut CrosswordBuilder, input: &[u8]) -> Result<()>;

    /// Writes `crossword` in this format.
    fn write(&self, _crossword: &Crossword, _output: &mut dyn Write) -> Result<()> {
        Err(CrosswordError::Unsupported("Writing not supported"))
    }

    fn can_read(&self) -> bool {
        true
    }

    fn can_write(&self) -> bool {
        false
    }
}

/// The supported file dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    Puz,
    CrosswordCompiler,
    UClick,
    Wsj,
    Dat,
    Pzzl,
    Nyt,
    Amuse,
    UClickJson,
}

impl FormatKind {
    pub const ALL: [FormatKind; 9] = [
        FormatKind::Puz,
        FormatKind::CrosswordCompiler,
        FormatKind::UClick,
        FormatKind::Wsj,
        FormatKind::Dat,
        FormatKind::Pzzl,
        FormatKind::Nyt,
        FormatKind::Amuse,
        FormatKind::UClickJson,
    ];

    /// Short name, also accepted by [`FormatKind::from_name`].
    pub fn name(self) -> &'static str {
        match self {
            FormatKind::Puz => PuzFormatter::NAME,
            FormatKind::CrosswordCompiler => CrosswordCompilerFormatter::NAME,
            FormatKind::UClick => UClickFormatter::NAME,
            FormatKind::Wsj => WsjFormatter::NAME,
            FormatKind::Dat => DatFormatter::NAME,
            FormatKind::Pzzl => PzzlFormatter::NAME,
            FormatKind::Nyt => NytFormatter::NAME,
            FormatKind::Amuse => AmuseFormatter::NAME,
            FormatKind::UClickJson => UClickJsonFormatter::NAME,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }

    /// Guesses the dialect from a file extension.
    pub fn from_extension(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "puz" => Some(FormatKind::Puz),
            "jpz" | "xml" => Some(FormatKind::CrosswordCompiler),
            "uclick" => Some(FormatKind::UClick),
            "json" => Some(FormatKind::Wsj),
            "dat" => Some(FormatKind::Dat),
            "pzzl" => Some(FormatKind::Pzzl),
            _ => None,
        }
    }

    /// Guesses the dialect from the leading bytes of a document.
    ///
    /// Only self-describing dialects are recognized; the text dialects have no
    /// signature and yield `None`. JSON dialects are told apart by their keys.
    pub fn sniff(input: &[u8]) -> Option<Self> {
        if input.get(2..2 + puz::MAGIC.len()) == Some(puz::MAGIC) {
            return Some(FormatKind::Puz);
        }

        let head = &input[..input.len().min(1024)];
        let text = String::from_utf8_lossy(head);
        let trimmed = text.trim_start_matches('\u{feff}').trim_start();
        if trimmed.starts_with('{') {
            Some(Self::sniff_json(&String::from_utf8_lossy(input)))
        } else if trimmed.starts_with('<') && trimmed.contains("rectangular-puzzle") {
            Some(FormatKind::CrosswordCompiler)
        } else if trimmed.starts_with('<') && trimmed.contains("crossword") {
            Some(FormatKind::UClick)
        } else {
            None
        }
    }

    /// Tells the JSON dialects apart by their distinguishing keys.
    fn sniff_json(document: &str) -> Self {
        if document.contains("\"placedWords\"") {
            FormatKind::Amuse
        } else if document.contains("\"body\"") && document.contains("\"dimensions\"") {
            FormatKind::Nyt
        } else if document.contains("\"AcrossClue\"") || document.contains("\"Layout\"") {
            FormatKind::UClickJson
        } else {
            FormatKind::Wsj
        }
    }
}

fn read_with<F: CrosswordFormatter>(formatter: &F, input: &[u8]) -> Result<Crossword> {
    let mut builder = CrosswordBuilder::new();
    formatter.read(&mut builder, input)?;
    let crossword = builder.build()?;
    info!(
        "{}: read {}x{} puzzle with {} across and {} down words",
        F::NAME,
        crossword.width(),
        crossword.height(),
        crossword.words_across().len(),
        crossword.words_down().len()
    );
    Ok(crossword)
}

/// Reads a complete puzzle of the given dialect with default reader settings.
pub fn read_puzzle(kind: FormatKind, input: &[u8]) -> Result<Crossword> {
    debug!("Reading {} bytes as {}", input.len(), kind.name());
    match kind {
        FormatKind::Puz => read_with(&PuzFormatter::new(), input),
        FormatKind::CrosswordCompiler => read_with(&CrosswordCompilerFormatter::new(), input),
        FormatKind::UClick => read_with(&UClickFormatter::new(), input),
        FormatKind::Wsj => read_with(&WsjFormatter::new(), input),
        FormatKind::Dat => read_with(&DatFormatter::new(), input),
        FormatKind::Pzzl => read_with(&PzzlFormatter::new(), input),
        FormatKind::Nyt => read_with(&NytFormatter::new(), input),
        FormatKind::Amuse => read_with(&AmuseFormatter::new(), input),
        FormatKind::UClickJson => read_with(&UClickJsonFormatter::new(), input),
    }
}

/// Reads a complete puzzle with an explicit encoding label (text dialects) and
/// unlock key (`.puz` only).
pub fn read_puzzle_with(kind: FormatKind, input: &[u8], encoding: Option<&str>, key: Option<u16>) -> Result<Crossword> {
    fn configured<F: CrosswordFormatter>(mut formatter: F, encoding: Option<&str>) -> Result<F> {
        if let Some(label) = encoding {
            formatter.set_encoding(label)?;
        }
        Ok(formatter)
    }

    match kind {
        FormatKind::Puz => {
            let formatter = configured(PuzFormatter::new(), encoding)?.with_key(key)?;
            read_with(&formatter, input)
        }
        FormatKind::CrosswordCompiler => read_with(&configured(CrosswordCompilerFormatter::new(), encoding)?, input),
        FormatKind::UClick => read_with(&configured(UClickFormatter::new(), encoding)?, input),
        FormatKind::Wsj => read_with(&configured(WsjFormatter::new(), encoding)?, input),
        FormatKind::Dat => read_with(&configured(DatFormatter::new(), encoding)?, input),
        FormatKind::Pzzl => read_with(&configured(PzzlFormatter::new(), encoding)?, input),
        FormatKind::Nyt => read_with(&configured(NytFormatter::new(), encoding)?, input),
        FormatKind::Amuse => read_with(&configured(AmuseFormatter::new(), encoding)?, input),
        FormatKind::UClickJson => read_with(&configured(UClickJsonFormatter::new(), encoding)?, input),
    }
}
