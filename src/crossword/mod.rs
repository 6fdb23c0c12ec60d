//! Core crossword module

pub mod codec;
pub mod engine;
pub mod format;
pub mod puzzle;
pub mod reference;
pub mod state;
pub mod types;

pub use engine::{Engine, EngineConfig, EngineEvent, Selectable, UndoMode};
pub use format::{CrosswordFormatter, FormatKind, read_puzzle, read_puzzle_with};
pub use puzzle::{CellRef, Crossword, CrosswordBuilder};
pub use reference::{WordReference, find_references};
pub use state::ProgressState;
pub use types::error::{CrosswordError, Result};
pub use types::models::{Cell, Direction, Word, WordBuilder};
