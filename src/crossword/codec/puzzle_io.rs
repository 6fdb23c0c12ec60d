//! Internal binary format for a built [`Crossword`].
//!
//! Used both to cache puzzles and, in reduced form, as the canonical input of
//! the content hash.
//!
//! # Layout
//! ```text
//! [4 bytes] magic number 0xDEADBEA7
//! [1 byte]  version (must equal VERSION_CURRENT)
//! [4 bytes] width, height, square count
//! [string]  title, description, author, copyright, comment
//! [chars]   alphabet
//! [8 bytes] publish date (ms since epoch)
//! [4 bytes] flags
//! [4 bytes] across word count, followed by that many word records
//! [4 bytes] down word count, followed by that many word records
//!
//! word: [4] number, [string] hint, [4] start row, [4] start column,
//!       [string] hint url, [string] citation, [4] cell count, cells
//! cell: [1] attribute flags, [string] chars
//! ```

use std::io::{Read, Write};

use byteorder::{BigEndian, ByteOrder, ReadBytesExt, WriteBytesExt};
use log::{debug, info};

use super::wire;
use crate::crossword::puzzle::{Crossword, CrosswordBuilder};
use crate::crossword::types::{
    error::{CrosswordError, Result},
    models::{Cell, Direction, Word},
};

pub const MAGIC_NUMBER: u32 = 0xDEAD_BEA7;
pub const VERSION_CURRENT: u8 = 4;

/// Serializes `crossword` in full.
pub fn write_crossword<W: Write>(writer: &mut W, crossword: &Crossword) -> Result<()> {
    writer.write_u32::<BigEndian>(MAGIC_NUMBER)?;
    writer.write_u8(VERSION_CURRENT)?;

    writer.write_u32::<BigEndian>(wire::checked_len(crossword.width())?)?;
    writer.write_u32::<BigEndian>(wire::checked_len(crossword.height())?)?;
    writer.write_u32::<BigEndian>(wire::checked_len(crossword.square_count())?)?;
    wire::write_opt_string(writer, crossword.title())?;
    wire::write_opt_string(writer, crossword.description())?;
    wire::write_opt_string(writer, crossword.author())?;
    wire::write_opt_string(writer, crossword.copyright())?;
    wire::write_opt_string(writer, crossword.comment())?;
    wire::write_chars(writer, crossword.alphabet().iter().copied())?;
    writer.write_i64::<BigEndian>(crossword.date())?;
    writer.write_u32::<BigEndian>(crossword.flags())?;

    for direction in [Direction::Across, Direction::Down] {
        let words = crossword.words(direction);
        writer.write_u32::<BigEndian>(wire::checked_len(words.len())?)?;
        for word in words {
            write_word(writer, word)?;
        }
    }

    debug!(
        "Wrote crossword: {} across, {} down",
        crossword.words_across().len(),
        crossword.words_down().len()
    );
    Ok(())
}

fn write_word<W: Write>(writer: &mut W, word: &Word) -> Result<()> {
    writer.write_u32::<BigEndian>(word.number())?;
    wire::write_opt_string(writer, word.hint())?;
    writer.write_u32::<BigEndian>(wire::checked_len(word.start_row())?)?;
    writer.write_u32::<BigEndian>(wire::checked_len(word.start_column())?)?;
    wire::write_opt_string(writer, word.hint_url())?;
    wire::write_opt_string(writer, word.citation())?;
    writer.write_u32::<BigEndian>(wire::checked_len(word.len())?)?;
    for cell in word.cells() {
        write_cell(writer, cell)?;
    }
    Ok(())
}

fn write_cell<W: Write>(writer: &mut W, cell: &Cell) -> Result<()> {
    writer.write_u8(cell.attr_flags())?;
    wire::write_opt_string(writer, Some(cell.chars()))
}

/// Builds the reduced, metadata-free encoding that defines a puzzle's identity.
///
/// Only the dimensions and, per word in across-then-down order, the number,
/// hint, start position and cell contents take part. Every field is written at
/// its full width, so the encoding is lossless and cannot fail.
pub(crate) fn hash_input(crossword: &Crossword) -> Vec<u8> {
    let mut out = Vec::new();
    put_u64(&mut out, crossword.width() as u64);
    put_u64(&mut out, crossword.height() as u64);
    for word in crossword.words_across().iter().chain(crossword.words_down()) {
        put_u32(&mut out, word.number());
        put_str(&mut out, word.hint());
        put_u64(&mut out, word.start_row() as u64);
        put_u64(&mut out, word.start_column() as u64);
        put_u64(&mut out, word.len() as u64);
        for cell in word.cells() {
            out.push(cell.attr_flags());
            put_str(&mut out, Some(cell.chars()));
        }
    }
    out
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    let mut buf = [0u8; 4];
    BigEndian::write_u32(&mut buf, value);
    out.extend_from_slice(&buf);
}

fn put_u64(out: &mut Vec<u8>, value: u64) {
    let mut buf = [0u8; 8];
    BigEndian::write_u64(&mut buf, value);
    out.extend_from_slice(&buf);
}

fn put_str(out: &mut Vec<u8>, value: Option<&str>) {
    match value {
        Some(s) => {
            out.push(1);
            put_u64(out, s.len() as u64);
            out.extend_from_slice(s.as_bytes());
        }
        None => out.push(0),
    }
}

/// Reads a crossword previously written by [`write_crossword`].
///
/// The decoded puzzle goes through [`CrosswordBuilder::build`], so it satisfies
/// the same invariants as one built in memory.
///
/// # Errors
/// - [`CrosswordError::Format`] on a magic number or version mismatch, invalid
///   dimensions, a word outside the grid, overlapping words, or a square count
///   that does not match the words
/// - [`CrosswordError::Truncated`] if the stream ends early
pub fn read_crossword<R: Read>(reader: &mut R) -> Result<Crossword> {
    let magic = reader.read_u32::<BigEndian>()?;
    if magic != MAGIC_NUMBER {
        return Err(CrosswordError::Format(format!("Magic number mismatch: {:#010x}", magic)));
    }

    let version = reader.read_u8()?;
    if version != VERSION_CURRENT {
        return Err(CrosswordError::Format(format!(
            "Crossword version {} not supported (expected {})",
            version, VERSION_CURRENT
        )));
    }

    let width = reader.read_u32::<BigEndian>()? as usize;
    let height = reader.read_u32::<BigEndian>()? as usize;
    Crossword::check_dimensions(width, height)?;
    let square_count = reader.read_u32::<BigEndian>()? as usize;

    let mut builder = CrosswordBuilder::new();
    builder
        .set_width(width)
        .set_height(height)
        .set_title(wire::read_opt_string(reader)?)
        .set_description(wire::read_opt_string(reader)?)
        .set_author(wire::read_opt_string(reader)?)
        .set_copyright(wire::read_opt_string(reader)?)
        .set_comment(wire::read_opt_string(reader)?)
        .set_alphabet(wire::read_chars(reader)?)
        .set_date(reader.read_i64::<BigEndian>()?)
        .set_flags(reader.read_u32::<BigEndian>()?);

    for direction in [Direction::Across, Direction::Down] {
        let count = wire::read_count(reader)?;
        for _ in 0..count {
            builder.add_word(read_word(reader, direction)?);
        }
    }

    let crossword = builder.build()?;
    if crossword.square_count() != square_count {
        return Err(CrosswordError::Format(format!(
            "Square count {} does not match the {} squares covered by words",
            square_count,
            crossword.square_count()
        )));
    }

    info!(
        "Read crossword {}x{}: {} across, {} down",
        width,
        height,
        crossword.words_across().len(),
        crossword.words_down().len()
    );
    Ok(crossword)
}

fn read_word<R: Read>(reader: &mut R, direction: Direction) -> Result<Word> {
    let number = reader.read_u32::<BigEndian>()?;
    let hint = wire::read_opt_string(reader)?;
    let start_row = reader.read_u32::<BigEndian>()? as usize;
    let start_column = reader.read_u32::<BigEndian>()? as usize;
    let hint_url = wire::read_opt_string(reader)?;
    let citation = wire::read_opt_string(reader)?;
    let count = wire::read_count(reader)?;
    let cells = (0..count)
        .map(|_| {
            let attr_flags = reader.read_u8()?;
            let chars = wire::read_string(reader)?;
            Ok(Cell::new(chars, attr_flags))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Word {
        number,
        hint,
        start_row,
        start_column,
        direction,
        hint_url,
        citation,
        cells,
    })
}
