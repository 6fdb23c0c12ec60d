//! # crossword-reader
//!
//! A crossword puzzle model with readers for common third-party formats
//! (Across Lite `.puz` including locked puzzles, Crossword Compiler XML,
//! Universal Uclick XML and JSON, WSJ, NYT and Amuse Labs JSON, and two
//! plain-text dialects), a compact binary codec for puzzles and solving
//! progress, clue cross-reference scanning, and an interactive solving engine
//! with undo.
//!
//! **Note:** Writing third-party formats is not supported; puzzles are
//! persisted with the internal codec in [`crossword::codec`].
pub mod crossword;

// Re-export the main types for convenience
pub use crossword::{
    Engine,
    EngineConfig,
    FormatKind,
    ProgressState,
    read_puzzle,
    find_references,
    WordReference,
    puzzle::{
        Crossword,
        CrosswordBuilder,
    },
    types::{
        error::{CrosswordError, Result},
        models::{Cell, Direction, Word},
    },
};
