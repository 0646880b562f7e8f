//! Bidirectional translation between character offsets and (line, column) coordinates.
//!
//! Recomputing a translation from the document start is O(line count). The indexer
//! keeps a bounded cache of recently resolved anchors and scans only the distance
//! between the nearest anchor and the target, which makes the common "sequential
//! editing near the cursor" pattern near O(1) amortized.
//!
//! Cache entries are shifted or dropped transactionally inside the same call that
//! performs an edit, so a stale (offset, line, column) triple is never returned.
//! The edit-version counter is guarded by a read/write lock: a reader thread can poll
//! a monotonically increasing version while a writer advances it, without blocking
//! reads of already-published text.

use crate::error::DocumentError;
use crate::line_list::SegmentedLineList;
use crate::separator::LineSeparator;
use log::trace;
use std::sync::RwLock;

/// Number of resolved anchors kept in the cache.
const MAX_CACHED_ANCHORS: usize = 50;

/// A (line, column) coordinate. Columns count characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    /// Logical line index (0-based).
    pub line: usize,
    /// Column within the line, in characters (0-based).
    pub column: usize,
}

impl Position {
    /// Create a position.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A fully resolved anchor: an absolute offset together with its (line, column).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharPosition {
    /// Absolute character offset from the document start, separators included.
    pub offset: usize,
    /// Logical line index.
    pub line: usize,
    /// Column within the line, in characters.
    pub column: usize,
}

impl CharPosition {
    /// The anchor at the very start of a document.
    pub fn start() -> Self {
        Self {
            offset: 0,
            line: 0,
            column: 0,
        }
    }

    /// The (line, column) part of this anchor.
    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }
}

/// Direction of a directional indexer search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanDirection {
    /// Toward larger offsets.
    Forward,
    /// Toward smaller offsets.
    Backward,
}

impl std::fmt::Display for ScanDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanDirection::Forward => write!(f, "forward"),
            ScanDirection::Backward => write!(f, "backward"),
        }
    }
}

/// Offset ↔ (line, column) translator backed by an anchor cache.
///
/// The indexer does not own the line storage; the owning
/// [`Document`](crate::Document) passes its [`SegmentedLineList`] and total length
/// into every query so both always describe the same revision.
#[derive(Debug)]
pub struct CachedIndexer {
    cache: Vec<CharPosition>,
    max_cached: usize,
    version: RwLock<u64>,
}

impl CachedIndexer {
    /// Create an indexer with an empty cache.
    pub fn new() -> Self {
        Self {
            cache: Vec::new(),
            max_cached: MAX_CACHED_ANCHORS,
            version: RwLock::new(0),
        }
    }

    /// The current edit version. Bumped on every insert/delete.
    pub fn version(&self) -> u64 {
        *self.version.read().expect("version lock poisoned")
    }

    /// Resolve an absolute offset to a full anchor.
    pub fn char_position(
        &mut self,
        lines: &SegmentedLineList,
        length: usize,
        offset: usize,
    ) -> Result<CharPosition, DocumentError> {
        if offset > length {
            return Err(DocumentError::OffsetOutOfRange { offset, length });
        }

        let anchor = self.nearest_anchor_by_offset(offset);
        let resolved = if offset >= anchor.offset {
            scan_forward(lines, anchor, offset)
        } else {
            scan_backward(lines, anchor, offset)
        };
        self.remember(resolved);
        Ok(resolved)
    }

    /// Resolve a (line, column) coordinate to an absolute offset.
    ///
    /// `column` may be at most the line length, except on a CRLF line where the
    /// position between `'\r'` and `'\n'` is also addressable so that every offset
    /// round-trips.
    pub fn char_index(
        &mut self,
        lines: &SegmentedLineList,
        line: usize,
        column: usize,
    ) -> Result<usize, DocumentError> {
        let buffer = lines.get(line).ok_or(DocumentError::LineOutOfRange {
            line,
            line_count: lines.len(),
        })?;
        if column > max_column(buffer.len(), buffer.separator()) {
            return Err(DocumentError::PositionOutOfRange { line, column });
        }

        let anchor = self.nearest_anchor_by_line(line);
        let line_start = line_start_from(lines, anchor, line);
        let resolved = CharPosition {
            offset: line_start + column,
            line,
            column,
        };
        self.remember(resolved);
        Ok(resolved.offset)
    }

    /// Resolve `offset` by scanning forward from a known anchor.
    ///
    /// Fails with [`DocumentError::InvalidDirection`] when `anchor` sits at the end of
    /// the document or `offset` lies behind it; callers must pick the other anchor or
    /// direction.
    pub fn find_index_forward(
        &self,
        lines: &SegmentedLineList,
        length: usize,
        anchor: &CharPosition,
        offset: usize,
    ) -> Result<CharPosition, DocumentError> {
        if anchor.offset >= length || offset < anchor.offset {
            return Err(DocumentError::InvalidDirection(ScanDirection::Forward));
        }
        if offset > length {
            return Err(DocumentError::OffsetOutOfRange { offset, length });
        }
        Ok(scan_forward(lines, *anchor, offset))
    }

    /// Resolve `offset` by scanning backward from a known anchor.
    ///
    /// Fails with [`DocumentError::InvalidDirection`] when `anchor` sits at the start
    /// of the document or `offset` lies ahead of it.
    pub fn find_index_backward(
        &self,
        lines: &SegmentedLineList,
        anchor: &CharPosition,
        offset: usize,
    ) -> Result<CharPosition, DocumentError> {
        if anchor.offset == 0 || offset > anchor.offset {
            return Err(DocumentError::InvalidDirection(ScanDirection::Backward));
        }
        Ok(scan_backward(lines, *anchor, offset))
    }

    /// Resolve a (line, column) coordinate by scanning forward from a known anchor.
    pub fn find_position_forward(
        &self,
        lines: &SegmentedLineList,
        length: usize,
        anchor: &CharPosition,
        line: usize,
        column: usize,
    ) -> Result<CharPosition, DocumentError> {
        let target = Position::new(line, column);
        if anchor.offset >= length || target < anchor.position() {
            return Err(DocumentError::InvalidDirection(ScanDirection::Forward));
        }
        let buffer = lines.get(line).ok_or(DocumentError::LineOutOfRange {
            line,
            line_count: lines.len(),
        })?;
        if column > max_column(buffer.len(), buffer.separator()) {
            return Err(DocumentError::PositionOutOfRange { line, column });
        }
        let line_start = line_start_from(lines, *anchor, line);
        Ok(CharPosition {
            offset: line_start + column,
            line,
            column,
        })
    }

    /// Resolve a (line, column) coordinate by scanning backward from a known anchor.
    pub fn find_position_backward(
        &self,
        lines: &SegmentedLineList,
        anchor: &CharPosition,
        line: usize,
        column: usize,
    ) -> Result<CharPosition, DocumentError> {
        let target = Position::new(line, column);
        if anchor.offset == 0 || target > anchor.position() {
            return Err(DocumentError::InvalidDirection(ScanDirection::Backward));
        }
        let buffer = lines.get(line).ok_or(DocumentError::LineOutOfRange {
            line,
            line_count: lines.len(),
        })?;
        if column > max_column(buffer.len(), buffer.separator()) {
            return Err(DocumentError::PositionOutOfRange { line, column });
        }
        let line_start = line_start_from(lines, *anchor, line);
        Ok(CharPosition {
            offset: line_start + column,
            line,
            column,
        })
    }

    /// Shift cached anchors for an insertion from `start` to `end`.
    ///
    /// Must be called inside the same edit transaction, with both anchors computed by
    /// the caller (pre-edit `start`, post-edit `end`).
    pub fn on_insert(&mut self, start: &CharPosition, end: &CharPosition) {
        let inserted = end.offset - start.offset;
        let line_delta = end.line - start.line;
        for anchor in &mut self.cache {
            if anchor.offset <= start.offset {
                continue;
            }
            anchor.offset += inserted;
            if anchor.line == start.line {
                // Chars after the insertion point move to the end of the inserted
                // text, which may be on a later line.
                anchor.column = end.column + (anchor.column - start.column);
                anchor.line = end.line;
            } else {
                anchor.line += line_delta;
            }
        }
        self.bump_version();
    }

    /// Drop or shift cached anchors for a deletion of the span `start..end`.
    pub fn on_delete(&mut self, start: &CharPosition, end: &CharPosition) {
        let removed = end.offset - start.offset;
        let line_delta = end.line - start.line;
        let before = self.cache.len();
        self.cache
            .retain(|anchor| anchor.offset <= start.offset || anchor.offset >= end.offset);
        if self.cache.len() != before {
            trace!(
                "dropped {} anchors inside deleted span",
                before - self.cache.len()
            );
        }
        for anchor in &mut self.cache {
            if anchor.offset < end.offset {
                continue;
            }
            anchor.offset -= removed;
            if anchor.line == end.line {
                anchor.column = start.column + (anchor.column - end.column);
                anchor.line = start.line;
            } else {
                anchor.line -= line_delta;
            }
        }
        self.bump_version();
    }

    /// Drop every cached anchor. Used on release.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    fn bump_version(&self) {
        let mut version = self.version.write().expect("version lock poisoned");
        *version += 1;
    }

    fn remember(&mut self, anchor: CharPosition) {
        if self.cache.contains(&anchor) {
            return;
        }
        if self.cache.len() == self.max_cached {
            self.cache.remove(0);
        }
        self.cache.push(anchor);
    }

    fn nearest_anchor_by_offset(&self, offset: usize) -> CharPosition {
        let mut best = CharPosition::start();
        let mut best_distance = offset;
        for anchor in &self.cache {
            let distance = anchor.offset.abs_diff(offset);
            if distance < best_distance {
                best = *anchor;
                best_distance = distance;
            }
        }
        best
    }

    fn nearest_anchor_by_line(&self, line: usize) -> CharPosition {
        let mut best = CharPosition::start();
        let mut best_distance = line;
        for anchor in &self.cache {
            let distance = anchor.line.abs_diff(line);
            if distance < best_distance {
                best = *anchor;
                best_distance = distance;
            }
        }
        best
    }
}

impl Default for CachedIndexer {
    fn default() -> Self {
        Self::new()
    }
}

/// Highest addressable column on a line: the line length, plus the CR|LF interior
/// position on CRLF lines.
fn max_column(line_len: usize, separator: LineSeparator) -> usize {
    if separator == LineSeparator::Crlf {
        line_len + 1
    } else {
        line_len
    }
}

fn scan_forward(lines: &SegmentedLineList, anchor: CharPosition, offset: usize) -> CharPosition {
    debug_assert!(anchor.offset <= offset);
    let mut line = anchor.line;
    let mut line_start = anchor.offset - anchor.column;
    loop {
        let buffer = lines
            .get(line)
            .expect("scan anchor must lie within the document");
        let span = buffer.total_len();
        if offset <= line_start + span {
            if offset == line_start + span && !buffer.separator().is_none() {
                // Exactly past this line's separator: start of the next line.
                line += 1;
                line_start += span;
                continue;
            }
            return CharPosition {
                offset,
                line,
                column: offset - line_start,
            };
        }
        line_start += span;
        line += 1;
    }
}

fn scan_backward(lines: &SegmentedLineList, anchor: CharPosition, offset: usize) -> CharPosition {
    debug_assert!(offset <= anchor.offset);
    let mut line = anchor.line;
    let mut line_start = anchor.offset - anchor.column;
    while offset < line_start {
        line -= 1;
        line_start -= lines
            .get(line)
            .expect("scan anchor must lie within the document")
            .total_len();
    }
    CharPosition {
        offset,
        line,
        column: offset - line_start,
    }
}

/// Start offset of `target_line`, derived by walking line spans from `anchor`.
fn line_start_from(lines: &SegmentedLineList, anchor: CharPosition, target_line: usize) -> usize {
    let mut line = anchor.line;
    let mut line_start = anchor.offset - anchor.column;
    while line < target_line {
        line_start += lines
            .get(line)
            .expect("target line must lie within the document")
            .total_len();
        line += 1;
    }
    while line > target_line {
        line -= 1;
        line_start -= lines
            .get(line)
            .expect("target line must lie within the document")
            .total_len();
    }
    line_start
}
