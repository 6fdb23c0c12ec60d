//! Low-level read/write primitives shared by the internal codecs.
//!
//! All numbers are big-endian. Strings are encoded as
//! ```text
//! [1 byte]  presence (0 = none, 1 = some)
//! [4 bytes] length in bytes (only when present)
//! [N bytes] UTF-8 payload (only when present)
//! ```

use std::io::{Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::crossword::types::error::{CrosswordError, Result};

/// Upper bound for a single string payload, guards against absurd lengths in corrupt input.
const MAX_STRING_LEN: u32 = 16 * 1024 * 1024;

pub fn write_opt_string<W: Write>(writer: &mut W, value: Option<&str>) -> Result<()> {
    match value {
        Some(s) => {
            let len = u32::try_from(s.len()).map_err(|_| {
                CrosswordError::InvalidArgument(format!("String too long to encode: {} bytes", s.len()))
            })?;
            writer.write_u8(1)?;
            writer.write_u32::<BigEndian>(len)?;
            writer.write_all(s.as_bytes())?;
        }
        None => writer.write_u8(0)?,
    }
    Ok(())
}

pub fn read_opt_string<R: Read>(reader: &mut R) -> Result<Option<String>> {
    match reader.read_u8()? {
        0 => Ok(None),
        1 => {
            let len = reader.read_u32::<BigEndian>()?;
            if len > MAX_STRING_LEN {
                return Err(CrosswordError::Format(format!("String length {} out of range", len)));
            }
            let mut bytes = vec![0u8; len as usize];
            reader.read_exact(&mut bytes)?;
            String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| CrosswordError::caused_by("Invalid UTF-8 in string", e))
        }
        other => Err(CrosswordError::Format(format!("Invalid string marker: {:#04x}", other))),
    }
}

/// Reads a string that must be present.
pub fn read_string<R: Read>(reader: &mut R) -> Result<String> {
    read_opt_string(reader)?
        .ok_or_else(|| CrosswordError::Format("Missing required string".to_string()))
}

/// Writes a length-prefixed array of chars as UTF-32 code points.
pub fn write_chars<W: Write>(writer: &mut W, chars: impl ExactSizeIterator<Item = char>) -> Result<()> {
    writer.write_u32::<BigEndian>(checked_len(chars.len())?)?;
    for ch in chars {
        writer.write_u32::<BigEndian>(ch as u32)?;
    }
    Ok(())
}

pub fn read_chars<R: Read>(reader: &mut R) -> Result<Vec<char>> {
    let count = read_count(reader)?;
    (0..count)
        .map(|_| {
            let code = reader.read_u32::<BigEndian>()?;
            char::from_u32(code)
                .ok_or_else(|| CrosswordError::Format(format!("Invalid character code {:#x}", code)))
        })
        .collect()
}

/// Reads a u32 element count, bounded so corrupt input cannot trigger huge allocations.
pub fn read_count<R: Read>(reader: &mut R) -> Result<usize> {
    let count = reader.read_u32::<BigEndian>()?;
    if count > MAX_STRING_LEN {
        return Err(CrosswordError::Format(format!("Element count {} out of range", count)));
    }
    Ok(count as usize)
}

pub fn checked_len(len: usize) -> Result<u32> {
    u32::try_from(len)
        .map_err(|_| CrosswordError::InvalidArgument(format!("Length {} does not fit in 32 bits", len)))
}
