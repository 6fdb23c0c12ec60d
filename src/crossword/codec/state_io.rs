//! Internal binary format for a [`ProgressState`].
//!
//! Unlike the crossword format, older versions remain readable:
//!
//! | Version | Attempt grid                              | Counters                  |
//! |---------|-------------------------------------------|---------------------------|
//! | 1       | one UTF-32 code point per square, 0 = empty | packed u64              |
//! | 2       | one optional string per square            | packed u64                |
//! | 3       | one optional string per square            | packed u64 + unknown u16  |
//!
//! # Layout (version 3)
//! ```text
//! [4 bytes] magic number 0xBAADDEED
//! [1 byte]  version
//! [4 bytes] width, height
//! [8 bytes] packed statistics
//! [2 bytes] unknown count
//! [8 bytes] play time (ms), last played (ms since epoch)
//! [4 bytes] packed selection
//! [w*h]     attempt grid, row-major
//! [w*h*4]   flag grid, row-major
//! ```

use std::io::{Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use log::debug;

use super::wire;
use crate::crossword::puzzle::Crossword;
use crate::crossword::state::ProgressState;
use crate::crossword::types::error::{CrosswordError, Result};

pub const MAGIC_NUMBER: u32 = 0xBAAD_DEED;
pub const VERSION_CURRENT: u8 = 3;

const MAX_SQUARES: usize = Crossword::MAX_SQUARES;

/// Serializes `state` using the current version.
pub fn write_state<W: Write>(writer: &mut W, state: &ProgressState) -> Result<()> {
    write_state_version(writer, state, VERSION_CURRENT)
}

/// Serializes `state` using an explicit format `version` (1 to current).
///
/// Version 1 can only represent single-character attempts; longer attempts
/// are truncated to their first character.
pub fn write_state_version<W: Write>(writer: &mut W, state: &ProgressState, version: u8) -> Result<()> {
    if version == 0 || version > VERSION_CURRENT {
        return Err(CrosswordError::InvalidArgument(format!(
            "State version {} not supported",
            version
        )));
    }

    writer.write_u32::<BigEndian>(MAGIC_NUMBER)?;
    writer.write_u8(version)?;
    writer.write_u32::<BigEndian>(wire::checked_len(state.width())?)?;
    writer.write_u32::<BigEndian>(wire::checked_len(state.height())?)?;
    writer.write_u64::<BigEndian>(state.packed_statistics())?;
    if version >= 3 {
        writer.write_u16::<BigEndian>(state.squares_unknown())?;
    }
    writer.write_i64::<BigEndian>(state.play_time_millis)?;
    writer.write_i64::<BigEndian>(state.last_played)?;
    writer.write_u32::<BigEndian>(state.selection)?;

    for attempt in &state.chars {
        if version == 1 {
            let code = attempt
                .as_deref()
                .and_then(|s| s.chars().next())
                .map_or(0, |ch| ch as u32);
            writer.write_u32::<BigEndian>(code)?;
        } else {
            wire::write_opt_string(writer, attempt.as_deref())?;
        }
    }
    for attr in &state.attrs {
        writer.write_u32::<BigEndian>(*attr)?;
    }

    Ok(())
}

/// Reads a state written by any supported version.
///
/// # Errors
/// - [`CrosswordError::Format`] on a magic number mismatch, an unsupported version
///   or an invalid character code
/// - [`CrosswordError::Truncated`] if the stream ends early
pub fn read_state<R: Read>(reader: &mut R) -> Result<ProgressState> {
    let magic = reader.read_u32::<BigEndian>()?;
    if magic != MAGIC_NUMBER {
        return Err(CrosswordError::Format(format!("Magic number mismatch: {:#010x}", magic)));
    }

    let version = reader.read_u8()?;
    if version == 0 || version > VERSION_CURRENT {
        return Err(CrosswordError::Format(format!("State version {} not supported", version)));
    }
    debug!("Reading progress state, version {}", version);

    let width = reader.read_u32::<BigEndian>()? as usize;
    let height = reader.read_u32::<BigEndian>()? as usize;
    let squares = width
        .checked_mul(height)
        .filter(|&n| n <= MAX_SQUARES)
        .ok_or_else(|| CrosswordError::Format(format!("State dimensions {}x{} out of range", width, height)))?;

    let mut state = ProgressState::new(width, height);
    state.set_packed_statistics(reader.read_u64::<BigEndian>()?);
    if version >= 3 {
        state.set_squares_unknown(reader.read_u16::<BigEndian>()?);
    }
    state.play_time_millis = reader.read_i64::<BigEndian>()?;
    state.last_played = reader.read_i64::<BigEndian>()?;
    state.selection = reader.read_u32::<BigEndian>()?;

    for i in 0..squares {
        state.chars[i] = if version == 1 {
            match reader.read_u32::<BigEndian>()? {
                0 => None,
                code => Some(
                    char::from_u32(code)
                        .ok_or_else(|| CrosswordError::Format(format!("Invalid character code {:#x}", code)))?
                        .to_string(),
                ),
            }
        } else {
            wire::read_opt_string(reader)?
        };
    }
    for i in 0..squares {
        state.attrs[i] = reader.read_u32::<BigEndian>()?;
    }

    Ok(state)
}
