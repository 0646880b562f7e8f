//! Structured edit notifications.
//!
//! Every insert and delete emits one [`TextChange`] carrying the affected span in the
//! coordinate system *before* the edit plus the same span *after* the edit. This event
//! is the sole input consumers (anchor registries, render caches) need to stay
//! consistent; they must not recompute edits by diffing text.
//!
//! Delivery is synchronous, inside the call stack of the edit, before the edit call
//! returns.

use crate::indexer::Position;

/// What an edit did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Text was inserted at `start`.
    Insert,
    /// The span `start..before_end` was removed.
    Delete,
}

/// A single document edit, described in (line, column) spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChange {
    /// Whether this change inserted or deleted text.
    pub kind: ChangeKind,
    /// Start of the affected span. Identical before and after the edit.
    pub start: Position,
    /// End of the affected span in pre-edit coordinates.
    ///
    /// Equals `start` for an insertion.
    pub before_end: Position,
    /// End of the affected span in post-edit coordinates.
    ///
    /// Equals `start` for a deletion.
    pub after_end: Position,
    /// The exact inserted or removed text, separators included.
    pub text: String,
}

impl TextChange {
    /// Length of the inserted/removed text in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}
