//! Across Lite (`.puz`) binary format.
//!
//! Besides the answer grid and clues, a `.puz` file may carry square attributes
//! (circles), rebus squares holding several characters, a notes string, and may
//! be locked with the 4-digit scrambling scheme implemented in
//! [`scramble`](crate::crossword::codec::scramble).
//!
//! # File Structure
//! ```text
//! [2 bytes]  overall checksum
//! [12 bytes] magic "ACROSS&DOWN\0"
//! [2+4+4]    CIB checksum, masked low/high checksums
//! [4 bytes]  version string
//! [2 bytes]  reserved
//! [2 bytes]  unscrambled solution checksum (LE)
//! [12 bytes] reserved
//! [1+1]      width, height
//! [2 bytes]  clue count (LE)
//! [2 bytes]  unknown
//! [2 bytes]  puzzle type (LE): 4 = scrambled, 2 = no solution
//! [w*h]      answer grid, '.' = block
//! [w*h]      player state (ignored)
//! [NUL str]  title, author, copyright
//! [NUL str]  clue_count clues
//! [NUL str]  notes
//! sections*: [4] tag, [2] length (LE), [2] checksum, [length] data, [1] NUL
//! ```
//!
//! Strings use ISO-8859-1 unless another encoding is set.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{BufRead, Cursor, ErrorKind, Read};

use byteorder::{LittleEndian, ReadBytesExt};
use encoding_rs::Encoding;
use log::{debug, info, trace, warn};

use super::CrosswordFormatter;
use super::text;
use crate::crossword::codec::scramble::{self, EMPTY, KEY_RANGE};
use crate::crossword::puzzle::{Crossword, CrosswordBuilder};
use crate::crossword::types::{
    error::{CrosswordError, Result},
    models::{ALPHABET_ENGLISH, Cell, Direction, WordBuilder},
};

/// Magic literal at offset 2.
pub const MAGIC: &[u8] = b"ACROSS&DOWN\0";

const PUZZLE_TYPE_SCRAMBLED: u16 = 4;
const PUZZLE_TYPE_NO_SOLUTION: u16 = 2;

const GEXT_CIRCLED: u8 = 0x80;

/// Fixed-size header fields needed to parse the body.
#[derive(Debug)]
struct PuzHeader {
    version: String,
    unscrambled_checksum: u16,
    width: usize,
    height: usize,
    clue_count: usize,
    puzzle_type: u16,
}

/// Optional extension sections.
#[derive(Debug, Default)]
struct Extras {
    /// Per-square GEXT attribute bits, row-major.
    attrs: Vec<u8>,
    /// Per-square GRBS rebus keys (0 = none), row-major.
    rebus_keys: Option<Vec<u8>>,
    /// RTBL solutions keyed by GRBS value.
    rebus_solutions: Option<BTreeMap<u16, String>>,
}

/// Reader for Across Lite `.puz` files.
#[derive(Debug, Clone)]
pub struct PuzFormatter {
    encoding: &'static Encoding,
    key: Option<u16>,
}

impl Default for PuzFormatter {
    fn default() -> Self {
        Self {
            encoding: encoding_rs::WINDOWS_1252,
            key: None,
        }
    }
}

impl PuzFormatter {
    /// Creates a reader using ISO-8859-1 (decoded as its windows-1252 superset).
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `key` to unlock scrambled puzzles instead of brute-forcing one.
    ///
    /// # Errors
    /// Returns [`CrosswordError::InvalidArgument`] if the key is above 9999.
    pub fn with_key(mut self, key: Option<u16>) -> Result<Self> {
        check_key(key)?;
        self.key = key;
        Ok(self)
    }

    /// Reads a puzzle, unlocking it with `key` if it is scrambled.
    ///
    /// A `None` key brute-forces all keys from 0000 to 9999.
    ///
    /// # Errors
    /// - [`CrosswordError::InvalidArgument`] if the key is above 9999
    /// - [`CrosswordError::Format`] on a bad magic literal or malformed section
    /// - [`CrosswordError::Truncated`] if the file ends early
    /// - [`CrosswordError::KeyNotFound`] if a scrambled grid cannot be unlocked
    pub fn read_with_key(&self, builder: &mut CrosswordBuilder, input: &[u8], key: Option<u16>) -> Result<()> {
        check_key(key)?;
        info!("Parsing .puz file ({} bytes)", input.len());
        let mut reader = Cursor::new(input);

        // Step 1: Fixed header
        let header = read_header(&mut reader)?;
        debug!(
            "Header: version={:?}, {}x{}, {} clues, type={}",
            header.version, header.width, header.height, header.clue_count, header.puzzle_type
        );

        // Step 2: Answer grid, then the player state which is not needed
        let squares = header.width * header.height;
        let layout = read_block(&mut reader, squares, "Answer grid")?;
        let mut grid: Vec<Vec<u8>> = if header.width == 0 {
            Vec::new()
        } else {
            layout.chunks(header.width).map(<[u8]>::to_vec).collect()
        };
        read_block(&mut reader, squares, "Player state")?;

        // Step 3: Strings
        let title = self.read_string(&mut reader)?;
        let author = self.read_string(&mut reader)?;
        let copyright = self.read_string(&mut reader)?;
        let clues = (0..header.clue_count)
            .map(|_| self.read_string(&mut reader))
            .collect::<Result<Vec<_>>>()?;
        let notes = self.read_string(&mut reader)?;

        // Step 4: Extension sections
        let extras = self.read_sections(&mut reader, squares)?;

        // Step 5: Unlock
        if header.puzzle_type == PUZZLE_TYPE_SCRAMBLED {
            let keys = match key {
                Some(k) => k..=k,
                None => KEY_RANGE,
            };
            let found = scramble::unlock(&mut grid, header.unscrambled_checksum, keys)?;
            info!("Puzzle unlocked with key {:04}", found);
        }
        let has_solution = header.puzzle_type != PUZZLE_TYPE_NO_SOLUTION;

        // Step 6: Populate the builder
        builder
            .set_flags(if has_solution { 0 } else { Crossword::FLAG_NO_SOLUTION })
            .set_width(header.width)
            .set_height(header.height)
            .set_title(title)
            .set_author(author)
            .set_copyright(copyright)
            .set_comment(notes);

        self.build_words(builder, &clues, &grid, &extras, has_solution)
    }

    fn read_string(&self, reader: &mut Cursor<&[u8]>) -> Result<String> {
        let mut bytes = Vec::new();
        reader.read_until(0, &mut bytes)?;
        if bytes.pop() != Some(0) {
            return Err(CrosswordError::Truncated(
                "Unexpected end of null-terminated string".to_string(),
            ));
        }
        Ok(text::decode_field(&bytes, self.encoding))
    }

    fn read_sections(&self, reader: &mut Cursor<&[u8]>, squares: usize) -> Result<Extras> {
        let mut extras = Extras {
            attrs: vec![0; squares],
            ..Default::default()
        };

        loop {
            let mut tag = [0u8; 4];
            match reader.read_exact(&mut tag) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e.into()),
            }

            let length = reader.read_u16::<LittleEndian>()? as usize;
            reader.read_u16::<LittleEndian>()?; // section checksum, not verified
            let data = read_block(reader, length, "Section data")?;
            trace!("Section {:?}: {} bytes", String::from_utf8_lossy(&tag), length);

            match &tag {
                b"GEXT" => {
                    check_section_size(&tag, &data, squares)?;
                    for (attr, &b) in extras.attrs.iter_mut().zip(&data) {
                        *attr |= b;
                    }
                }
                b"GRBS" => {
                    check_section_size(&tag, &data, squares)?;
                    extras.rebus_keys = Some(data[..squares].to_vec());
                }
                b"RTBL" => {
                    extras.rebus_solutions = Some(self.parse_rebus_table(&data)?);
                }
                other => {
                    warn!("Skipping unknown section {:?}", String::from_utf8_lossy(other));
                }
            }

            read_block(reader, 1, "Section terminator")?;
        }

        if let (Some(keys), Some(solutions)) = (&extras.rebus_keys, &extras.rebus_solutions)
            && let Some(&missing) = keys
                .iter()
                .find(|&&k| k != 0 && !solutions.contains_key(&(k as u16)))
        {
            return Err(CrosswordError::Format(format!(
                "Missing rebus solution for key {}",
                missing
            )));
        }

        Ok(extras)
    }

    /// Parses `" 0:CAT; 1:DOG;"` into `{1: "CAT", 2: "DOG"}`.
    ///
    /// Table indices are 0-based while GRBS keys are 1-based.
    fn parse_rebus_table(&self, data: &[u8]) -> Result<BTreeMap<u16, String>> {
        let table = text::decode_field(data, self.encoding);
        let mut solutions = BTreeMap::new();

        for entry in table.split(';') {
            if entry.is_empty() {
                continue;
            }
            let sep = entry
                .find(':')
                .ok_or_else(|| CrosswordError::Format(format!("Missing rebus delimiter (in:{})", entry)))?;
            if sep < 1 {
                return Err(CrosswordError::Format(format!("Invalid rebus index ({})", sep)));
            }
            if sep + 1 >= entry.len() {
                return Err(CrosswordError::Format("Missing rebus solution".to_string()));
            }

            let index: u16 = text::parse_int(entry[..sep].trim_start_matches(' '), "Rebus index")?;
            let key = index
                .checked_add(1)
                .ok_or_else(|| CrosswordError::Format(format!("Rebus index {} out of range", index)))?;
            solutions.insert(key, entry[sep + 1..].to_string());
        }

        Ok(solutions)
    }

    fn build_words(
        &self,
        builder: &mut CrosswordBuilder,
        clues: &[String],
        grid: &[Vec<u8>],
        extras: &Extras,
        has_solution: bool,
    ) -> Result<()> {
        let height = grid.len();
        let width = grid.first().map_or(0, Vec::len);
        let mut alphabet: BTreeSet<char> = ALPHABET_ENGLISH.chars().collect();

        let is_open = |row: usize, column: usize| grid[row][column] != EMPTY;
        let cell_for = |row: usize, column: usize| {
            let offset = row * width + column;
            let mut attrs = 0;
            if extras.attrs[offset] & GEXT_CIRCLED != 0 {
                attrs |= Cell::ATTR_CIRCLED;
            }
            if !has_solution {
                attrs |= Cell::ATTR_NO_SOLUTION;
            }
            let rebus = extras
                .rebus_keys
                .as_ref()
                .zip(extras.rebus_solutions.as_ref())
                .and_then(|(keys, solutions)| solutions.get(&(keys[offset] as u16)));
            let chars = match rebus {
                Some(solution) => solution.clone(),
                None => text::decode_field(&[grid[row][column]], self.encoding),
            };
            (chars, attrs)
        };

        let mut clue_iter = clues.iter();
        let mut next_clue = |number: u32, direction: Direction| {
            clue_iter.next().cloned().ok_or_else(|| {
                CrosswordError::Format(format!("Missing clue for {} {}", number, direction))
            })
        };

        let mut number = 0u32;
        for row in 0..height {
            for column in 0..width {
                if !is_open(row, column) {
                    continue;
                }
                alphabet.extend(text::decode_field(&[grid[row][column]], self.encoding).chars());

                let mut incremented = false;
                if (column == 0 || !is_open(row, column - 1)) && column + 1 < width && is_open(row, column + 1) {
                    number += 1;
                    incremented = true;

                    let mut wb = WordBuilder::new(Direction::Across)
                        .number(number)
                        .hint(next_clue(number, Direction::Across)?)
                        .start(row, column);
                    for k in (column..width).take_while(|&k| is_open(row, k)) {
                        let (chars, attrs) = cell_for(row, k);
                        wb.add_cell(chars, attrs);
                    }
                    builder.add_word(wb.build()?);
                }

                if (row == 0 || !is_open(row - 1, column)) && row + 1 < height && is_open(row + 1, column) {
                    if !incremented {
                        number += 1;
                    }

                    let mut wb = WordBuilder::new(Direction::Down)
                        .number(number)
                        .hint(next_clue(number, Direction::Down)?)
                        .start(row, column);
                    for k in (row..height).take_while(|&k| is_open(k, column)) {
                        let (chars, attrs) = cell_for(k, column);
                        wb.add_cell(chars, attrs);
                    }
                    builder.add_word(wb.build()?);
                }
            }
        }

        let unused = clue_iter.count();
        if unused > 0 {
            warn!("{} clues left without a matching word", unused);
        }

        builder.set_alphabet(alphabet);
        Ok(())
    }
}

impl CrosswordFormatter for PuzFormatter {
    const NAME: &'static str = "puz";

    fn set_encoding(&mut self, label: &str) -> Result<()> {
        self.encoding = text::resolve_encoding(label)?;
        Ok(())
    }

    /// Reads a puzzle; a scrambled grid is unlocked with the configured key or brute-forced.
    fn read(&self, builder: &mut CrosswordBuilder, input: &[u8]) -> Result<()> {
        self.read_with_key(builder, input, self.key)
    }
}

fn check_key(key: Option<u16>) -> Result<()> {
    match key {
        Some(k) if !KEY_RANGE.contains(&k) => Err(CrosswordError::InvalidArgument(format!(
            "Key {} is out of range",
            k
        ))),
        _ => Ok(()),
    }
}

fn check_section_size(tag: &[u8; 4], data: &[u8], squares: usize) -> Result<()> {
    if data.len() < squares {
        return Err(CrosswordError::Format(format!(
            "Section {} holds {} bytes, expected {}",
            String::from_utf8_lossy(tag),
            data.len(),
            squares
        )));
    }
    Ok(())
}

fn read_block<R: Read>(reader: &mut R, len: usize, what: &str) -> Result<Vec<u8>> {
    let mut data = vec![0u8; len];
    reader.read_exact(&mut data).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => CrosswordError::Truncated(format!("{} incomplete (expected {} bytes)", what, len)),
        _ => CrosswordError::Io(e),
    })?;
    Ok(data)
}

fn read_header<R: Read>(reader: &mut R) -> Result<PuzHeader> {
    read_block(reader, 2, "Overall checksum")?;

    let magic = read_block(reader, MAGIC.len(), "Magic string")?;
    if magic != MAGIC {
        return Err(CrosswordError::Format(format!(
            "Magic string mismatch (got '{}')",
            String::from_utf8_lossy(&magic)
        )));
    }

    read_block(reader, 2 + 4 + 4, "Checksums")?;
    let version = read_block(reader, 4, "Version information")?;
    read_block(reader, 2, "Reserved")?;
    let unscrambled_checksum = reader.read_u16::<LittleEndian>()?;
    read_block(reader, 12, "Reserved")?;
    let width = reader.read_u8()? as usize;
    let height = reader.read_u8()? as usize;
    let clue_count = reader.read_u16::<LittleEndian>()? as usize;
    reader.read_u16::<LittleEndian>()?;
    let puzzle_type = reader.read_u16::<LittleEndian>()?;

    Ok(PuzHeader {
        version: String::from_utf8_lossy(&version)
            .trim_end_matches('\0')
            .to_string(),
        unscrambled_checksum,
        width,
        height,
        clue_count,
        puzzle_type,
    })
}
