//! Engine behavior switches.

/// How edits are recorded for undo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UndoMode {
    /// Nothing is recorded; backspace only clears squares.
    None,
    /// Every edit is recorded; undo restores values but not the selection.
    Simple,
    /// Edits are recorded with the selection they were made under, and the
    /// history is dropped whenever editing moves to another word.
    #[default]
    Smart,
}

/// Solving policies of an [`Engine`](super::Engine).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub undo_mode: UndoMode,
    /// After typing, jump to the next empty square of the word instead of the next square.
    pub skip_occupied_on_type: bool,
    /// When navigating to a word, select its first empty square instead of its first square.
    pub select_first_unoccupied_on_nav: bool,
    /// Word navigation skips words without empty squares.
    pub skip_completed_words: bool,
    /// Flag wrong entries as errors as soon as they are made.
    pub mark_errors: bool,
    /// A square flagged as an error is also flagged as cheated.
    pub reveal_sets_cheat_flag: bool,
    /// Typing and backspace are ignored when false.
    pub editable: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            undo_mode: UndoMode::Smart,
            skip_occupied_on_type: false,
            select_first_unoccupied_on_nav: false,
            skip_completed_words: false,
            mark_errors: false,
            reveal_sets_cheat_flag: true,
            editable: true,
        }
    }
}
