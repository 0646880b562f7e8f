//! The document facade.
//!
//! [`Document`] composes the segmented line list and the cached indexer: it validates
//! coordinates, performs separator-aware line splitting and merging, maintains the
//! total length and line count, owns the copy-on-write fork protocol, and notifies
//! subscribers of every edit.
//!
//! All operations are synchronous and deterministic. Editing the same instance from
//! two threads is out of contract; two instances produced by
//! [`Document::copy_text_shallow`] may be edited concurrently without extra locking,
//! because a shared line is always copied privately before either side mutates it.

use crate::change::{ChangeKind, TextChange};
use crate::error::DocumentError;
use crate::indexer::{CachedIndexer, CharPosition, Position};
use crate::line::LineBuffer;
use crate::line_list::{DEFAULT_SEGMENT_CAPACITY, SegmentedLineList};
use crate::separator::{LineSeparator, split_separated};
use log::debug;

/// Handle returned by [`Document::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscriber {
    id: SubscriptionId,
    callback: Box<dyn FnMut(&TextChange) + Send>,
}

/// An editable text document: ordered lines, position indexing, copy-on-write forks.
pub struct Document {
    lines: SegmentedLineList,
    indexer: CachedIndexer,
    /// Total chars, separators included.
    length: usize,
    released: bool,
    subscribers: Vec<Subscriber>,
    next_subscription: u64,
}

impl Document {
    /// Create an empty document (one empty line).
    pub fn new() -> Self {
        Self::from_text("")
    }

    /// Create a document from initial text, splitting at separator boundaries.
    pub fn from_text(text: &str) -> Self {
        Self::with_capacity_hint(text, DEFAULT_SEGMENT_CAPACITY)
    }

    /// Create a document with an explicit segment-capacity hint (performance tuning
    /// only).
    pub fn with_capacity_hint(text: &str, segment_capacity: usize) -> Self {
        let mut lines = SegmentedLineList::with_capacity_hint(segment_capacity);
        for (line, separator) in split_separated(text) {
            lines.push(LineBuffer::new(line, separator));
        }
        Self {
            lines,
            indexer: CachedIndexer::new(),
            length: text.chars().count(),
            released: false,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Total document length in characters, separators included. 0 after release.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Number of lines. At least 1 while live, 0 after release.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// The current edit version (monotonically increasing across inserts/deletes).
    pub fn version(&self) -> u64 {
        self.indexer.version()
    }

    /// Insert `text` at (line, column).
    ///
    /// `text` may contain any mix of LF/CR/CRLF separators; each one splits the
    /// insertion into further lines, and the tail of the target line moves after the
    /// last inserted piece.
    pub fn insert(&mut self, line: usize, column: usize, text: &str) -> Result<(), DocumentError> {
        self.ensure_live()?;
        self.validate_edit_point(line, column)?;
        if text.is_empty() {
            return Ok(());
        }

        let start_offset = self.indexer.char_index(&self.lines, line, column)?;
        let pieces: Vec<(&str, LineSeparator)> = split_separated(text).collect();
        let inserted_chars = text.chars().count();

        let (end_line, end_column) = if pieces.len() == 1 {
            let (piece, _) = pieces[0];
            self.lines.make_mut(line).insert_str(column, piece);
            (line, column + piece.chars().count())
        } else {
            let first_separator = pieces[0].1;
            let buffer = self.lines.make_mut(line);
            let right = buffer.split_off(column);
            let right_separator = buffer.separator();
            buffer.push_str(pieces[0].0);
            buffer.set_separator(first_separator);

            for (idx, (piece, separator)) in
                pieces.iter().enumerate().take(pieces.len() - 1).skip(1)
            {
                self.lines.insert(line + idx, LineBuffer::new(piece, *separator));
            }

            let (last_piece, _) = pieces[pieces.len() - 1];
            let mut last = LineBuffer::new(last_piece, right_separator);
            last.push_str(&right);
            let last_index = line + pieces.len() - 1;
            self.lines.insert(last_index, last);
            (last_index, last_piece.chars().count())
        };

        self.length += inserted_chars;
        let start = CharPosition {
            offset: start_offset,
            line,
            column,
        };
        let end = CharPosition {
            offset: start_offset + inserted_chars,
            line: end_line,
            column: end_column,
        };
        self.indexer.on_insert(&start, &end);

        let change = TextChange {
            kind: ChangeKind::Insert,
            start: Position::new(line, column),
            before_end: Position::new(line, column),
            after_end: Position::new(end_line, end_column),
            text: text.to_string(),
        };
        self.notify(&change);
        Ok(())
    }

    /// Delete the span from (start_line, start_column) to (end_line, end_column),
    /// end exclusive.
    ///
    /// The surviving left part of the start line merges with the surviving right part
    /// of the end line; fully enclosed lines are removed.
    pub fn delete(
        &mut self,
        start_line: usize,
        start_column: usize,
        end_line: usize,
        end_column: usize,
    ) -> Result<(), DocumentError> {
        self.ensure_live()?;
        self.validate_edit_point(start_line, start_column)?;
        self.validate_edit_point(end_line, end_column)?;
        if (end_line, end_column) < (start_line, start_column) {
            return Err(DocumentError::RangeOutOfOrder {
                start_line,
                start_column,
                end_line,
                end_column,
            });
        }
        if (start_line, start_column) == (end_line, end_column) {
            return Ok(());
        }

        let removed = self.collect_span(start_line, start_column, end_line, end_column);
        let start_offset = self
            .indexer
            .char_index(&self.lines, start_line, start_column)?;
        let removed_chars = removed.chars().count();

        if start_line == end_line {
            self.lines
                .make_mut(start_line)
                .remove_range(start_column, end_column);
        } else {
            let (right_text, right_separator) = {
                let end_buffer = self.line_buffer(end_line);
                (
                    end_buffer.slice(end_column, end_buffer.len()).to_string(),
                    end_buffer.separator(),
                )
            };
            let buffer = self.lines.make_mut(start_line);
            buffer.split_off(start_column);
            buffer.push_str(&right_text);
            buffer.set_separator(right_separator);
            self.lines.remove_range(start_line + 1, end_line + 1);
        }

        self.length -= removed_chars;
        let start = CharPosition {
            offset: start_offset,
            line: start_line,
            column: start_column,
        };
        let end = CharPosition {
            offset: start_offset + removed_chars,
            line: end_line,
            column: end_column,
        };
        self.indexer.on_delete(&start, &end);

        let change = TextChange {
            kind: ChangeKind::Delete,
            start: Position::new(start_line, start_column),
            before_end: Position::new(end_line, end_column),
            after_end: Position::new(start_line, start_column),
            text: removed,
        };
        self.notify(&change);
        Ok(())
    }

    /// Replace the given span with `text`: a delete followed by an insert in one call.
    ///
    /// Emits two notifications (Delete, then Insert), both anchored at the span start.
    pub fn replace(
        &mut self,
        start_line: usize,
        start_column: usize,
        end_line: usize,
        end_column: usize,
        text: &str,
    ) -> Result<(), DocumentError> {
        self.delete(start_line, start_column, end_line, end_column)?;
        self.insert(start_line, start_column, text)
    }

    /// Resolve (line, column) to an absolute character offset.
    pub fn char_index(&mut self, line: usize, column: usize) -> Result<usize, DocumentError> {
        self.ensure_live()?;
        self.indexer.char_index(&self.lines, line, column)
    }

    /// Resolve an absolute character offset to a full (offset, line, column) anchor.
    pub fn char_position(&mut self, offset: usize) -> Result<CharPosition, DocumentError> {
        self.ensure_live()?;
        self.indexer.char_position(&self.lines, self.length, offset)
    }

    /// Resolve `offset` by scanning forward from `anchor`. See
    /// [`CachedIndexer::find_index_forward`].
    pub fn find_index_forward(
        &self,
        anchor: &CharPosition,
        offset: usize,
    ) -> Result<CharPosition, DocumentError> {
        self.ensure_live()?;
        self.indexer
            .find_index_forward(&self.lines, self.length, anchor, offset)
    }

    /// Resolve `offset` by scanning backward from `anchor`. See
    /// [`CachedIndexer::find_index_backward`].
    pub fn find_index_backward(
        &self,
        anchor: &CharPosition,
        offset: usize,
    ) -> Result<CharPosition, DocumentError> {
        self.ensure_live()?;
        self.indexer.find_index_backward(&self.lines, anchor, offset)
    }

    /// Resolve (line, column) by scanning forward from `anchor`.
    pub fn find_position_forward(
        &self,
        anchor: &CharPosition,
        line: usize,
        column: usize,
    ) -> Result<CharPosition, DocumentError> {
        self.ensure_live()?;
        self.indexer
            .find_position_forward(&self.lines, self.length, anchor, line, column)
    }

    /// Resolve (line, column) by scanning backward from `anchor`.
    pub fn find_position_backward(
        &self,
        anchor: &CharPosition,
        line: usize,
        column: usize,
    ) -> Result<CharPosition, DocumentError> {
        self.ensure_live()?;
        self.indexer
            .find_position_backward(&self.lines, anchor, line, column)
    }

    /// Read-only text extraction for a span (end exclusive), separators included.
    pub fn sub_sequence(
        &self,
        start_line: usize,
        start_column: usize,
        end_line: usize,
        end_column: usize,
    ) -> Result<String, DocumentError> {
        self.ensure_live()?;
        self.validate_edit_point(start_line, start_column)?;
        self.validate_edit_point(end_line, end_column)?;
        if (end_line, end_column) < (start_line, start_column) {
            return Err(DocumentError::RangeOutOfOrder {
                start_line,
                start_column,
                end_line,
                end_column,
            });
        }
        Ok(self.collect_span(start_line, start_column, end_line, end_column))
    }

    /// The character at (line, column). Separator characters are not addressable here.
    pub fn char_at(&self, line: usize, column: usize) -> Result<char, DocumentError> {
        self.ensure_live()?;
        let buffer = self
            .lines
            .get(line)
            .ok_or(DocumentError::LineOutOfRange {
                line,
                line_count: self.lines.len(),
            })?;
        buffer
            .char_at(column)
            .ok_or(DocumentError::PositionOutOfRange { line, column })
    }

    /// The text of one line, without its separator.
    pub fn line_text(&self, line: usize) -> Result<&str, DocumentError> {
        self.ensure_live()?;
        Ok(self.checked_line(line)?.text())
    }

    /// The length of one line in characters, without its separator.
    pub fn line_length(&self, line: usize) -> Result<usize, DocumentError> {
        self.ensure_live()?;
        Ok(self.checked_line(line)?.len())
    }

    /// The separator kind terminating one line.
    pub fn line_separator(&self, line: usize) -> Result<LineSeparator, DocumentError> {
        self.ensure_live()?;
        Ok(self.checked_line(line)?.separator())
    }

    /// Fork the document. The copy shares every line with the source until one side
    /// mutates it; the first mutation of a shared line pays a one-time copy of that
    /// line only.
    ///
    /// The returned document has its own indexer cache and no subscribers. Source and
    /// copy are safe to mutate concurrently on separate threads.
    pub fn copy_text_shallow(&self) -> Result<Document, DocumentError> {
        self.ensure_live()?;
        debug!(
            "forking document: {} lines, {} chars",
            self.lines.len(),
            self.length
        );
        Ok(Document {
            lines: self.lines.shallow_copy(),
            indexer: CachedIndexer::new(),
            length: self.length,
            released: false,
            subscribers: Vec::new(),
            next_subscription: 0,
        })
    }

    /// Copy the document. With `deep`, private line buffers are allocated upfront,
    /// trading a full copy now for no copy-on-write cost later; without, this is
    /// [`Document::copy_text_shallow`].
    pub fn copy_text(&self, deep: bool) -> Result<Document, DocumentError> {
        if !deep {
            return self.copy_text_shallow();
        }
        self.ensure_live()?;
        Ok(Document {
            lines: self.lines.deep_copy(),
            indexer: CachedIndexer::new(),
            length: self.length,
            released: false,
            subscribers: Vec::new(),
            next_subscription: 0,
        })
    }

    /// Returns `true` if line `line` is currently shared with a fork.
    pub fn is_line_shared(&self, line: usize) -> bool {
        self.lines.is_shared(line)
    }

    /// Returns `true` if `self` and `other` reference the same buffer instance for
    /// `line`.
    pub fn shares_line_with(&self, other: &Document, line: usize) -> bool {
        match (self.lines.get(line), other.lines.get(line)) {
            (Some(a), Some(b)) => std::sync::Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Subscribe to edit notifications. Events are delivered synchronously, inside the
    /// edit call.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&TextChange) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push(Subscriber {
            id,
            callback: Box::new(callback),
        });
        id
    }

    /// Remove a subscription. Returns `false` if the id was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    /// Release the document. Terminal and immediate: all lines are freed (shared lines
    /// are reference-decremented, forks are unaffected), the line count drops to 0,
    /// and every further operation fails with [`DocumentError::UseAfterRelease`].
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        debug!("releasing document: {} lines", self.lines.len());
        self.lines.clear();
        self.indexer.clear();
        self.subscribers.clear();
        self.length = 0;
        self.released = true;
    }

    fn ensure_live(&self) -> Result<(), DocumentError> {
        if self.released {
            return Err(DocumentError::UseAfterRelease);
        }
        Ok(())
    }

    /// Mutation-grade coordinate check: the column must stop at the line length.
    /// (CR|LF interior columns are addressable via offsets, never editable.)
    fn validate_edit_point(&self, line: usize, column: usize) -> Result<(), DocumentError> {
        let buffer = self.lines.get(line).ok_or(DocumentError::LineOutOfRange {
            line,
            line_count: self.lines.len(),
        })?;
        if column > buffer.len() {
            return Err(DocumentError::PositionOutOfRange { line, column });
        }
        Ok(())
    }

    fn checked_line(&self, line: usize) -> Result<&LineBuffer, DocumentError> {
        self.lines
            .get(line)
            .map(|buffer| buffer.as_ref())
            .ok_or(DocumentError::LineOutOfRange {
                line,
                line_count: self.lines.len(),
            })
    }

    fn line_buffer(&self, line: usize) -> &LineBuffer {
        self.lines
            .get(line)
            .expect("line index was validated against the line count")
    }

    /// Collect the text of a validated span, separators included.
    fn collect_span(
        &self,
        start_line: usize,
        start_column: usize,
        end_line: usize,
        end_column: usize,
    ) -> String {
        if start_line == end_line {
            return self
                .line_buffer(start_line)
                .slice(start_column, end_column)
                .to_string();
        }

        let mut out = String::new();
        let first = self.line_buffer(start_line);
        out.push_str(first.slice(start_column, first.len()));
        out.push_str(first.separator().as_str());
        for line in start_line + 1..end_line {
            let buffer = self.line_buffer(line);
            out.push_str(buffer.text());
            out.push_str(buffer.separator().as_str());
        }
        out.push_str(self.line_buffer(end_line).slice(0, end_column));
        out
    }

    fn notify(&mut self, change: &TextChange) {
        for subscriber in &mut self.subscribers {
            (subscriber.callback)(change);
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for line in self.lines.iter() {
            f.write_str(line.text())?;
            f.write_str(line.separator().as_str())?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("length", &self.length)
            .field("line_count", &self.lines.len())
            .field("released", &self.released)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_has_one_line() {
        let doc = Document::new();
        assert_eq!(doc.line_count(), 1);
        assert_eq!(doc.length(), 0);
        assert_eq!(doc.to_string(), "");
    }

    #[test]
    fn test_from_text_splits_lines() {
        let doc = Document::from_text("a\nb\r\nc");
        assert_eq!(doc.line_count(), 3);
        assert_eq!(doc.length(), 6);
        assert_eq!(doc.line_text(0).unwrap(), "a");
        assert_eq!(doc.line_separator(1).unwrap(), LineSeparator::Crlf);
        assert_eq!(doc.line_separator(2).unwrap(), LineSeparator::None);
        assert_eq!(doc.to_string(), "a\nb\r\nc");
    }

    #[test]
    fn test_insert_single_line() {
        let mut doc = Document::from_text("helloworld");
        doc.insert(0, 5, ", ").unwrap();
        assert_eq!(doc.to_string(), "hello, world");
        assert_eq!(doc.length(), 12);
        assert_eq!(doc.line_count(), 1);
    }

    #[test]
    fn test_insert_multi_line_splits_target() {
        let mut doc = Document::from_text("headtail");
        doc.insert(0, 4, "1\n2\n3").unwrap();
        assert_eq!(doc.to_string(), "head1\n2\n3tail");
        assert_eq!(doc.line_count(), 3);
        assert_eq!(doc.line_text(0).unwrap(), "head1");
        assert_eq!(doc.line_text(1).unwrap(), "2");
        assert_eq!(doc.line_text(2).unwrap(), "3tail");
    }

    #[test]
    fn test_insert_preserves_final_line_invariant() {
        let mut doc = Document::from_text("ab");
        doc.insert(0, 2, "\n").unwrap();
        assert_eq!(doc.line_count(), 2);
        assert_eq!(doc.line_separator(0).unwrap(), LineSeparator::Lf);
        assert_eq!(doc.line_separator(1).unwrap(), LineSeparator::None);
    }

    #[test]
    fn test_insert_out_of_range() {
        let mut doc = Document::from_text("ab");
        assert_eq!(
            doc.insert(1, 0, "x"),
            Err(DocumentError::LineOutOfRange {
                line: 1,
                line_count: 1
            })
        );
        assert_eq!(
            doc.insert(0, 3, "x"),
            Err(DocumentError::PositionOutOfRange { line: 0, column: 3 })
        );
        // Failed edits leave the document untouched.
        assert_eq!(doc.to_string(), "ab");
    }

    #[test]
    fn test_delete_within_line() {
        let mut doc = Document::from_text("hello, world");
        doc.delete(0, 5, 0, 7).unwrap();
        assert_eq!(doc.to_string(), "helloworld");
        assert_eq!(doc.length(), 10);
    }

    #[test]
    fn test_delete_across_lines_merges() {
        let mut doc = Document::from_text("one\ntwo\nthree");
        doc.delete(0, 2, 2, 3).unwrap();
        assert_eq!(doc.to_string(), "onee");
        assert_eq!(doc.line_count(), 1);
        assert_eq!(doc.length(), 4);
    }

    #[test]
    fn test_delete_separator_only_merges_lines() {
        let mut doc = Document::from_text("ab\ncd");
        doc.delete(0, 2, 1, 0).unwrap();
        assert_eq!(doc.to_string(), "abcd");
        assert_eq!(doc.line_count(), 1);
    }

    #[test]
    fn test_delete_inverted_range() {
        let mut doc = Document::from_text("ab\ncd");
        assert_eq!(
            doc.delete(1, 0, 0, 2),
            Err(DocumentError::RangeOutOfOrder {
                start_line: 1,
                start_column: 0,
                end_line: 0,
                end_column: 2
            })
        );
    }

    #[test]
    fn test_replace() {
        let mut doc = Document::from_text("hello world");
        doc.replace(0, 6, 0, 11, "rust\nlang").unwrap();
        assert_eq!(doc.to_string(), "hello rust\nlang");
        assert_eq!(doc.line_count(), 2);
    }

    #[test]
    fn test_sub_sequence() {
        let doc = Document::from_text("one\r\ntwo\nthree");
        assert_eq!(doc.sub_sequence(0, 1, 0, 3).unwrap(), "ne");
        assert_eq!(doc.sub_sequence(0, 1, 2, 2).unwrap(), "ne\r\ntwo\nth");
        assert_eq!(doc.sub_sequence(0, 0, 2, 5).unwrap(), doc.to_string());
    }

    #[test]
    fn test_change_events() {
        let changes = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = changes.clone();

        let mut doc = Document::from_text("abc");
        let id = doc.subscribe(move |change| sink.lock().unwrap().push(change.clone()));
        doc.insert(0, 1, "x\ny").unwrap();
        doc.delete(0, 1, 1, 1).unwrap();

        {
            let seen = changes.lock().unwrap();
            assert_eq!(seen.len(), 2);

            assert_eq!(seen[0].kind, ChangeKind::Insert);
            assert_eq!(seen[0].start, Position::new(0, 1));
            assert_eq!(seen[0].before_end, Position::new(0, 1));
            assert_eq!(seen[0].after_end, Position::new(1, 1));
            assert_eq!(seen[0].text, "x\ny");

            assert_eq!(seen[1].kind, ChangeKind::Delete);
            assert_eq!(seen[1].start, Position::new(0, 1));
            assert_eq!(seen[1].before_end, Position::new(1, 1));
            assert_eq!(seen[1].after_end, Position::new(0, 1));
            assert_eq!(seen[1].text, "x\ny");
        }

        assert!(doc.unsubscribe(id));
        assert!(!doc.unsubscribe(id));
        doc.insert(0, 0, "q").unwrap();
        assert_eq!(changes.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_release_is_terminal() {
        let mut doc = Document::from_text("abc\ndef");
        doc.release();
        assert_eq!(doc.line_count(), 0);
        assert_eq!(doc.length(), 0);
        assert_eq!(doc.insert(0, 0, "x"), Err(DocumentError::UseAfterRelease));
        assert_eq!(doc.char_position(0), Err(DocumentError::UseAfterRelease));
        assert_eq!(doc.line_text(0), Err(DocumentError::UseAfterRelease));
        // Idempotent.
        doc.release();
    }

    #[test]
    fn test_version_advances_on_edits() {
        let mut doc = Document::from_text("abc");
        let v0 = doc.version();
        doc.insert(0, 0, "x").unwrap();
        let v1 = doc.version();
        doc.delete(0, 0, 0, 1).unwrap();
        let v2 = doc.version();
        assert!(v0 < v1 && v1 < v2);
    }

    #[test]
    fn test_char_at() {
        let doc = Document::from_text("ab\ncd");
        assert_eq!(doc.char_at(1, 1).unwrap(), 'd');
        assert_eq!(
            doc.char_at(0, 2),
            Err(DocumentError::PositionOutOfRange { line: 0, column: 2 })
        );
    }
}
