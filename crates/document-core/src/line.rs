//! A single line's character storage.
//!
//! A [`LineBuffer`] holds one logical line's text (without its separator) plus the
//! separator kind that terminates it. Columns are counted in Unicode scalar values
//! (`char`); the char count is cached so column-to-byte conversion only scans the line
//! text when it is not pure ASCII.
//!
//! Sharing between a document and its forks is expressed with `Arc<LineBuffer>`: a
//! strong count of 1 means the line is privately owned and mutable, anything higher
//! means it is shared and must be copied before mutation (see
//! [`SegmentedLineList::make_mut`](crate::line_list::SegmentedLineList::make_mut)).

use crate::separator::LineSeparator;

/// One logical line: text plus terminating separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineBuffer {
    text: String,
    separator: LineSeparator,
    /// Cached `text.chars().count()`.
    char_count: usize,
}

impl LineBuffer {
    /// Create a line from text and a separator kind.
    pub fn new(text: &str, separator: LineSeparator) -> Self {
        Self {
            text: text.to_string(),
            separator,
            char_count: text.chars().count(),
        }
    }

    /// Create an empty line with no separator.
    pub fn empty() -> Self {
        Self::new("", LineSeparator::None)
    }

    /// Line length in characters, excluding the separator.
    pub fn len(&self) -> usize {
        self.char_count
    }

    /// Returns `true` if the line text is empty (the separator does not count).
    pub fn is_empty(&self) -> bool {
        self.char_count == 0
    }

    /// Line length in characters, including the separator.
    pub fn total_len(&self) -> usize {
        self.char_count + self.separator.len()
    }

    /// The line text, without the separator.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The terminating separator kind.
    pub fn separator(&self) -> LineSeparator {
        self.separator
    }

    /// Replace the terminating separator kind.
    pub fn set_separator(&mut self, separator: LineSeparator) {
        self.separator = separator;
    }

    /// The character at `column`, or `None` past the end of the line text.
    pub fn char_at(&self, column: usize) -> Option<char> {
        if column >= self.char_count {
            return None;
        }
        if self.text.is_ascii() {
            return Some(self.text.as_bytes()[column] as char);
        }
        self.text.chars().nth(column)
    }

    /// Convert a char column to a byte index into the line text.
    ///
    /// `column` must be `<= len()`.
    pub(crate) fn byte_index(&self, column: usize) -> usize {
        debug_assert!(
            column <= self.char_count,
            "column {column} beyond line length {}",
            self.char_count
        );
        if self.text.is_ascii() {
            return column;
        }
        if column == self.char_count {
            return self.text.len();
        }
        self.text
            .char_indices()
            .nth(column)
            .map(|(idx, _)| idx)
            .unwrap_or(self.text.len())
    }

    /// The text between two char columns (end exclusive).
    pub fn slice(&self, start: usize, end: usize) -> &str {
        debug_assert!(start <= end);
        &self.text[self.byte_index(start)..self.byte_index(end)]
    }

    /// Insert text (which must not contain separators) at a char column.
    pub fn insert_str(&mut self, column: usize, text: &str) {
        debug_assert!(
            !text.contains(['\r', '\n']),
            "line text must not contain separators"
        );
        let at = self.byte_index(column);
        self.text.insert_str(at, text);
        self.char_count += text.chars().count();
    }

    /// Append text (which must not contain separators) to the line.
    pub fn push_str(&mut self, text: &str) {
        debug_assert!(
            !text.contains(['\r', '\n']),
            "line text must not contain separators"
        );
        self.text.push_str(text);
        self.char_count += text.chars().count();
    }

    /// Remove the chars between two columns (end exclusive), returning the removed text.
    pub fn remove_range(&mut self, start: usize, end: usize) -> String {
        let from = self.byte_index(start);
        let to = self.byte_index(end);
        let removed: String = self.text.drain(from..to).collect();
        self.char_count -= removed.chars().count();
        removed
    }

    /// Split the line at `column`, keeping the left part and returning the right part.
    ///
    /// The separator stays with `self`; the caller decides what terminates the returned
    /// text.
    pub fn split_off(&mut self, column: usize) -> String {
        let at = self.byte_index(column);
        let right = self.text.split_off(at);
        self.char_count = column;
        right
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::empty()
    }
}
