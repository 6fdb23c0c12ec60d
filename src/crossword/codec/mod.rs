//! Codec layer: the internal binary formats and the `.puz` scrambling cipher.
//!
//! # Submodules
//!
//! - [`puzzle_io`]: Full and hash-only serialization of a [`Crossword`](crate::crossword::puzzle::Crossword)
//! - [`state_io`]: Versioned serialization of a [`ProgressState`](crate::crossword::state::ProgressState)
//! - [`scramble`]: Checksums, scrambling and key brute-forcing for locked puzzles
//! - [`wire`]: Shared big-endian primitives

pub mod puzzle_io;
pub mod scramble;
pub mod state_io;
pub mod wire;
