//! Crate-wide error type.
//!
//! All structural errors are reported synchronously to the direct caller; there is no
//! internal retry and nothing is clamped silently. A failed edit leaves the document
//! exactly as it was before the call.

use crate::indexer::ScanDirection;
use thiserror::Error;

/// Errors returned by document, indexer and line-list operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// A character offset beyond the current document length.
    #[error("offset {offset} is out of range (document length {length})")]
    OffsetOutOfRange {
        /// The offending offset.
        offset: usize,
        /// Document length in characters, including separators.
        length: usize,
    },
    /// A (line, column) coordinate whose column does not address a valid position.
    #[error("position {line}:{column} is out of range")]
    PositionOutOfRange {
        /// Logical line index.
        line: usize,
        /// Column in characters.
        column: usize,
    },
    /// A line index beyond the current line count.
    #[error("line {line} is out of range (line count {line_count})")]
    LineOutOfRange {
        /// The offending line index.
        line: usize,
        /// Current number of lines.
        line_count: usize,
    },
    /// A range whose end precedes its start.
    #[error("range end {end_line}:{end_column} precedes start {start_line}:{start_column}")]
    RangeOutOfOrder {
        /// Range start line.
        start_line: usize,
        /// Range start column.
        start_column: usize,
        /// Range end line.
        end_line: usize,
        /// Range end column.
        end_column: usize,
    },
    /// A directional search was requested past the anchor's valid scan direction.
    ///
    /// Scanning backward from the start-of-document anchor or forward from the
    /// end-of-document anchor would leave the document bounds. The caller is expected
    /// to pick the opposite anchor; this is a usage condition, not an internal bug.
    #[error("cannot scan {0} from this anchor")]
    InvalidDirection(ScanDirection),
    /// Any operation on a document after [`release`](crate::Document::release).
    #[error("document was released")]
    UseAfterRelease,
}
