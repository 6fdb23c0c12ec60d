//! Undo records.

use super::Selectable;

/// Rectangular block of entries, rows of columns; `None` is an empty square.
pub type CharMatrix = Vec<Vec<Option<String>>>;

/// The entries a single edit replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoItem {
    pub chars: CharMatrix,
    pub start_row: usize,
    pub start_column: usize,
    /// Selection active when the edit was made (smart undo only).
    pub selection: Option<Selectable>,
}

impl UndoItem {
    /// Record for a single square.
    pub fn single(chars: Option<String>, row: usize, column: usize, selection: Option<Selectable>) -> Self {
        Self {
            chars: vec![vec![chars]],
            start_row: row,
            start_column: column,
            selection,
        }
    }
}

/// Last-in, first-out edit history.
#[derive(Debug, Clone, Default)]
pub struct UndoStack {
    items: Vec<UndoItem>,
}

impl UndoStack {
    pub fn push(&mut self, item: UndoItem) {
        self.items.push(item);
    }

    pub fn pop(&mut self) -> Option<UndoItem> {
        self.items.pop()
    }

    pub fn peek(&self) -> Option<&UndoItem> {
        self.items.last()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
