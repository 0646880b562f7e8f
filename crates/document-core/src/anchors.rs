//! Generic registry of position-anchored objects.
//!
//! Diagnostics, inlay hints and style patches all share one problem: they are bound to
//! a (line, column) point and must shift consistently as the document is edited. The
//! registry keeps entries sorted by position (stable insertion order within a
//! same-point run) and applies the edit-to-shift algebra when driven with the same
//! spans the document reports in its [`TextChange`](crate::TextChange) events.
//!
//! The registry never observes the document directly: the caller performing the edit
//! applies [`AnchorRegistry::update_on_insertion`] /
//! [`AnchorRegistry::update_on_deletion`] in the same transaction.

use crate::indexer::Position;

/// Capability of an object anchored to a (line, column) point.
pub trait Anchored {
    /// The current anchor point.
    fn position(&self) -> Position;
    /// Move the anchor point.
    fn set_position(&mut self, position: Position);
}

/// Sorted container of point-anchored entries with bulk-shift on document edits.
#[derive(Debug, Clone)]
pub struct AnchorRegistry<T> {
    entries: Vec<T>,
}

impl<T: Anchored> AnchorRegistry<T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the registry holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add an entry, appending after any existing entries at the same point.
    pub fn add(&mut self, entry: T) {
        let position = entry.position();
        let idx = self.entries.partition_point(|e| e.position() <= position);
        self.entries.insert(idx, entry);
    }

    /// Remove the first entry equal to `entry`. Returns `false` if absent.
    pub fn remove(&mut self, entry: &T) -> bool
    where
        T: PartialEq,
    {
        match self.entries.iter().position(|e| e == entry) {
            Some(idx) => {
                self.entries.remove(idx);
                true
            }
            None => false,
        }
    }

    /// All entries anchored on `line`, in registry order. Empty for unseen lines.
    pub fn get_for_line(&self, line: usize) -> &[T] {
        let start = self.entries.partition_point(|e| e.position().line < line);
        let end = self.entries.partition_point(|e| e.position().line <= line);
        &self.entries[start..end]
    }

    /// Sorted distinct line numbers that hold at least one entry.
    pub fn line_numbers(&self) -> Vec<usize> {
        let mut lines: Vec<usize> = Vec::new();
        for entry in &self.entries {
            let line = entry.position().line;
            if lines.last() != Some(&line) {
                lines.push(line);
            }
        }
        lines
    }

    /// Iterate over all entries in position order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    /// Shift entries for an insertion spanning `start..end` (post-edit end).
    ///
    /// Entries strictly before `start` are unchanged. Entries exactly at `start` move
    /// to `end` (treated as "typed after", matching the document's line-splitting
    /// semantics). Later entries shift by the same line/column delta the text shift
    /// implies.
    pub fn update_on_insertion(&mut self, start: Position, end: Position) {
        if start == end {
            return;
        }
        let line_delta = end.line - start.line;
        for entry in &mut self.entries {
            let p = entry.position();
            if p < start {
                continue;
            }
            let moved = if p.line == start.line {
                Position::new(end.line, end.column + (p.column - start.column))
            } else {
                Position::new(p.line + line_delta, p.column)
            };
            entry.set_position(moved);
        }
    }

    /// Shift entries for a deletion of the span `start..end` (pre-edit end).
    ///
    /// Entries strictly inside the span are removed (their position is no longer
    /// addressable). Entries at the span end collapse to `start`; entries after the
    /// span shift back by the span's line/column delta.
    pub fn update_on_deletion(&mut self, start: Position, end: Position) {
        if start == end {
            return;
        }
        let line_delta = end.line - start.line;
        self.entries.retain(|entry| {
            let p = entry.position();
            p <= start || p >= end
        });
        for entry in &mut self.entries {
            let p = entry.position();
            if p <= start {
                continue;
            }
            let moved = if p.line == end.line {
                Position::new(start.line, start.column + (p.column - end.column))
            } else {
                Position::new(p.line - line_delta, p.column)
            };
            entry.set_position(moved);
        }
    }
}

impl<T: Anchored> Default for AnchorRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T: Anchored> IntoIterator for &'a AnchorRegistry<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
