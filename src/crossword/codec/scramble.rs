//! Solution scrambling used by locked Across Lite (`.puz`) puzzles.
//!
//! A locked puzzle stores its answer grid scrambled with a 4-digit key
//! (0000-9999) and carries the checksum of the unscrambled grid. The key is
//! not stored, so readers try keys until the checksum matches.
//!
//! Grids are rows of single-byte characters where [`EMPTY`] marks a block.
//! Only the non-block squares, read in column-major order, take part.

use std::ops::RangeInclusive;

use log::{debug, trace};

use crate::crossword::types::error::{CrosswordError, Result};

/// Block square in a `.puz` answer grid.
pub const EMPTY: u8 = b'.';

/// The full range of unlock keys.
pub const KEY_RANGE: RangeInclusive<u16> = 0..=9999;

/// Running checksum used throughout the `.puz` format.
///
/// # Algorithm
/// For each byte:
/// 1. Rotate the 16-bit accumulator right by one bit
/// 2. Add the byte, wrapping at 16 bits
pub fn checksum_region(data: &[u8], seed: u16) -> u16 {
    data.iter()
        .fold(seed, |sum, &b| sum.rotate_right(1).wrapping_add(b as u16))
}

/// Checksum of a grid's non-block squares in column-major order.
pub fn grid_checksum(grid: &[Vec<u8>]) -> u16 {
    checksum_region(&to_column_major(grid), 0)
}

fn to_column_major(grid: &[Vec<u8>]) -> Vec<u8> {
    let width = grid.first().map_or(0, Vec::len);
    let mut out = Vec::with_capacity(width * grid.len());
    for column in 0..width {
        for row in grid {
            if row[column] != EMPTY {
                out.push(row[column]);
            }
        }
    }
    out
}

fn from_column_major(grid: &mut [Vec<u8>], content: &[u8]) {
    let width = grid.first().map_or(0, Vec::len);
    let mut k = 0;
    for column in 0..width {
        for row in grid.iter_mut() {
            if row[column] != EMPTY {
                row[column] = content[k];
                k += 1;
            }
        }
    }
}

fn key_digits(key: u16) -> [u8; 4] {
    [
        (key / 1000 % 10) as u8,
        (key / 100 % 10) as u8,
        (key / 10 % 10) as u8,
        (key % 10) as u8,
    ]
}

/// Moves odd-indexed bytes to the front, followed by even-indexed bytes.
fn deinterleave(content: &mut Vec<u8>) {
    let odd = content.iter().skip(1).step_by(2).copied();
    let even = content.iter().step_by(2).copied();
    *content = odd.chain(even).collect();
}

/// Inverse of [`deinterleave`].
fn interleave(content: &mut Vec<u8>) {
    let front = content.len() / 2;
    let mut out = vec![0u8; content.len()];
    for (i, &b) in content.iter().enumerate() {
        if i < front {
            out[2 * i + 1] = b;
        } else {
            out[2 * (i - front)] = b;
        }
    }
    *content = out;
}

/// Reverses the scrambling of a grid in place with a known key.
///
/// # Algorithm
/// For each key digit from last to first:
/// 1. Deinterleave: odd-indexed characters first, then even-indexed ones
/// 2. Rotate right by the digit (the trailing `digit` characters move to the front)
/// 3. Subtract `digits[i % 4]` from character `i`, wrapping below `'A'` by adding 26
pub fn unscramble(grid: &mut [Vec<u8>], key: u16) {
    let digits = key_digits(key);
    let mut content = to_column_major(grid);
    if content.is_empty() {
        return;
    }

    for &digit in digits.iter().rev() {
        deinterleave(&mut content);
        let pivot = digit as usize % content.len();
        content.rotate_right(pivot);
        for (i, b) in content.iter_mut().enumerate() {
            let mut code = *b as i16 - digits[i % 4] as i16;
            if code < b'A' as i16 {
                code += 26;
            }
            *b = code as u8;
        }
    }

    from_column_major(grid, &content);
}

/// Scrambles a grid of upper-case letters in place, the exact inverse of [`unscramble`].
pub fn scramble(grid: &mut [Vec<u8>], key: u16) {
    let digits = key_digits(key);
    let mut content = to_column_major(grid);
    if content.is_empty() {
        return;
    }

    for &digit in digits.iter() {
        for (i, b) in content.iter_mut().enumerate() {
            let mut code = *b as i16 + digits[i % 4] as i16;
            if code > b'Z' as i16 {
                code -= 26;
            }
            *b = code as u8;
        }
        let pivot = digit as usize % content.len();
        content.rotate_left(pivot);
        interleave(&mut content);
    }

    from_column_major(grid, &content);
}

/// Finds the key that unscrambles `grid` to the expected checksum and applies it.
///
/// Keys are tried in ascending order; the first match wins. The grid is only
/// modified on success.
///
/// # Errors
/// Returns [`CrosswordError::KeyNotFound`] if no key in `keys` matches.
pub fn unlock(grid: &mut [Vec<u8>], expected_checksum: u16, keys: RangeInclusive<u16>) -> Result<u16> {
    debug!(
        "Unlocking grid: keys {}..={}, expected checksum {:#06x}",
        keys.start(),
        keys.end(),
        expected_checksum
    );

    let mut candidate = grid.to_vec();
    for key in keys {
        candidate.clone_from_slice(grid);
        unscramble(&mut candidate, key);
        let checksum = grid_checksum(&candidate);
        trace!("Key {:04}: checksum {:#06x}", key, checksum);
        if checksum == expected_checksum {
            debug!("Unlocked with key {:04}", key);
            grid.clone_from_slice(&candidate);
            return Ok(key);
        }
    }

    Err(CrosswordError::KeyNotFound)
}
