//! Segmented storage for the document's lines.
//!
//! Lines are kept in order inside fixed-capacity segments so that an insert or removal
//! only shifts entries within the affected segment, not the whole list. Segments split
//! when they overflow and merge with a neighbor when they underflow, keeping per-edit
//! cost bounded by the segment capacity plus a segment-table scan.
//!
//! Every entry is an `Arc<LineBuffer>`; [`SegmentedLineList::shallow_copy`] clones only
//! the segment tables, leaving each line shared between the original and the copy until
//! one side mutates it through [`SegmentedLineList::make_mut`].

use crate::line::LineBuffer;
use log::trace;
use std::sync::Arc;

/// Default number of lines per segment. Tuned for locality, not correctness.
pub const DEFAULT_SEGMENT_CAPACITY: usize = 128;

/// Ordered collection of [`LineBuffer`]s with segment-local edits and O(segment) forks.
#[derive(Debug)]
pub struct SegmentedLineList {
    segments: Vec<Vec<Arc<LineBuffer>>>,
    len: usize,
    segment_capacity: usize,
}

impl SegmentedLineList {
    /// Create an empty list with the default segment capacity.
    pub fn new() -> Self {
        Self::with_capacity_hint(DEFAULT_SEGMENT_CAPACITY)
    }

    /// Create an empty list with an explicit segment capacity hint.
    ///
    /// The hint is a performance tuning parameter only; it is clamped to a usable
    /// minimum.
    pub fn with_capacity_hint(segment_capacity: usize) -> Self {
        Self {
            segments: vec![Vec::new()],
            len: 0,
            segment_capacity: segment_capacity.max(4),
        }
    }

    /// Number of lines in the list.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the list holds no lines.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of segments currently in use.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Map a line index to (segment index, offset within segment).
    ///
    /// `index == len` maps to the insertion point past the last entry.
    fn locate(&self, index: usize) -> (usize, usize) {
        debug_assert!(index <= self.len, "index {index} beyond len {}", self.len);
        let mut remaining = index;
        for (seg_idx, segment) in self.segments.iter().enumerate() {
            if remaining < segment.len() {
                return (seg_idx, remaining);
            }
            remaining -= segment.len();
        }
        let last = self.segments.len() - 1;
        (last, self.segments[last].len())
    }

    /// The shared handle for line `index`, or `None` if out of range.
    pub fn get(&self, index: usize) -> Option<&Arc<LineBuffer>> {
        if index >= self.len {
            return None;
        }
        let (seg, off) = self.locate(index);
        Some(&self.segments[seg][off])
    }

    /// Returns `true` if line `index` is currently shared with a fork.
    pub fn is_shared(&self, index: usize) -> bool {
        self.get(index)
            .is_some_and(|line| Arc::strong_count(line) > 1)
    }

    /// Mutable access to line `index`, promoting a shared line to a private copy first.
    ///
    /// This is the copy-on-write trigger: the promotion is local to this list, the
    /// other side of a fork keeps its buffer untouched.
    pub fn make_mut(&mut self, index: usize) -> &mut LineBuffer {
        assert!(index < self.len, "index {index} beyond len {}", self.len);
        let (seg, off) = self.locate(index);
        let slot = &mut self.segments[seg][off];
        if Arc::strong_count(slot) > 1 {
            trace!("promoting shared line {index} to a private copy");
        }
        Arc::make_mut(slot)
    }

    /// Insert a line before `index` (`index == len` appends).
    pub fn insert(&mut self, index: usize, line: LineBuffer) {
        assert!(index <= self.len, "index {index} beyond len {}", self.len);
        let (seg, off) = self.locate(index);
        self.segments[seg].insert(off, Arc::new(line));
        self.len += 1;
        self.split_if_overfull(seg);
    }

    /// Append a line.
    pub fn push(&mut self, line: LineBuffer) {
        self.insert(self.len, line);
    }

    /// Remove and return the line at `index`.
    pub fn remove(&mut self, index: usize) -> Arc<LineBuffer> {
        assert!(index < self.len, "index {index} beyond len {}", self.len);
        let (seg, off) = self.locate(index);
        let removed = self.segments[seg].remove(off);
        self.len -= 1;
        self.merge_if_underfull(seg);
        removed
    }

    /// Remove the lines in `start..end`.
    pub fn remove_range(&mut self, start: usize, end: usize) {
        assert!(
            start <= end && end <= self.len,
            "range {start}..{end} out of bounds (len {})",
            self.len
        );
        let mut remaining = end - start;
        if remaining == 0 {
            return;
        }

        let (mut seg, mut off) = self.locate(start);
        while remaining > 0 {
            let seg_len = self.segments[seg].len();
            debug_assert!(off <= seg_len, "segment bounds inconsistent");
            let take = remaining.min(seg_len - off);
            self.segments[seg].drain(off..off + take);
            self.len -= take;
            remaining -= take;
            if self.segments[seg].is_empty() && self.segments.len() > 1 {
                self.segments.remove(seg);
            } else {
                seg += 1;
            }
            off = 0;
        }

        let seg = seg.min(self.segments.len()).saturating_sub(1);
        self.merge_if_underfull(seg);
    }

    /// Iterate over the line handles in order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<LineBuffer>> {
        self.segments.iter().flatten()
    }

    /// Fork the list: the copy references the same line instances.
    ///
    /// Both sides see every line as shared afterwards; the first mutation on either
    /// side pays a one-time copy of that single line.
    pub fn shallow_copy(&self) -> Self {
        trace!(
            "shallow copy: {} lines across {} segments",
            self.len,
            self.segments.len()
        );
        Self {
            segments: self.segments.clone(),
            len: self.len,
            segment_capacity: self.segment_capacity,
        }
    }

    /// Copy the list with private buffers allocated upfront for every line.
    pub fn deep_copy(&self) -> Self {
        Self {
            segments: self
                .segments
                .iter()
                .map(|segment| {
                    segment
                        .iter()
                        .map(|line| Arc::new(LineBuffer::clone(line)))
                        .collect()
                })
                .collect(),
            len: self.len,
            segment_capacity: self.segment_capacity,
        }
    }

    /// Drop all lines.
    pub fn clear(&mut self) {
        self.segments = vec![Vec::new()];
        self.len = 0;
    }

    fn split_if_overfull(&mut self, seg: usize) {
        if self.segments[seg].len() <= self.segment_capacity * 2 {
            return;
        }
        let half = self.segments[seg].len() / 2;
        let tail = self.segments[seg].split_off(half);
        self.segments.insert(seg + 1, tail);
        trace!("split segment {seg} at {half} lines");
        self.debug_check_invariants();
    }

    fn merge_if_underfull(&mut self, seg: usize) {
        if self.segments.len() <= 1 {
            return;
        }
        let seg = seg.min(self.segments.len() - 1);
        if self.segments[seg].len() >= self.segment_capacity / 4 {
            return;
        }
        // Merge with whichever neighbor keeps the result within capacity.
        if seg + 1 < self.segments.len()
            && self.segments[seg].len() + self.segments[seg + 1].len() <= self.segment_capacity
        {
            let tail = self.segments.remove(seg + 1);
            self.segments[seg].extend(tail);
            trace!("merged segment {} into {seg}", seg + 1);
        } else if seg > 0
            && self.segments[seg - 1].len() + self.segments[seg].len() <= self.segment_capacity
        {
            let tail = self.segments.remove(seg);
            self.segments[seg - 1].extend(tail);
            trace!("merged segment {seg} into {}", seg - 1);
        }
        self.debug_check_invariants();
    }

    /// Rebalance consistency check. Unreachable given correct use; a failure here is a
    /// programming error, not a recoverable condition.
    fn debug_check_invariants(&self) {
        debug_assert_eq!(
            self.segments.iter().map(Vec::len).sum::<usize>(),
            self.len,
            "segment lengths inconsistent with list length"
        );
        debug_assert!(!self.segments.is_empty(), "segment table must not be empty");
    }
}

impl Default for SegmentedLineList {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::separator::LineSeparator;

    fn line(text: &str) -> LineBuffer {
        LineBuffer::new(text, LineSeparator::Lf)
    }

    fn texts(list: &SegmentedLineList) -> Vec<String> {
        list.iter().map(|l| l.text().to_string()).collect()
    }

    #[test]
    fn test_insert_and_get() {
        let mut list = SegmentedLineList::new();
        list.push(line("a"));
        list.push(line("c"));
        list.insert(1, line("b"));

        assert_eq!(list.len(), 3);
        assert_eq!(texts(&list), vec!["a", "b", "c"]);
        assert_eq!(list.get(1).unwrap().text(), "b");
        assert!(list.get(3).is_none());
    }

    #[test]
    fn test_remove_range_across_segments() {
        let mut list = SegmentedLineList::with_capacity_hint(4);
        for i in 0..40 {
            list.push(line(&format!("line {i}")));
        }
        assert!(list.segment_count() > 1);

        list.remove_range(5, 35);
        assert_eq!(list.len(), 10);
        assert_eq!(list.get(4).unwrap().text(), "line 4");
        assert_eq!(list.get(5).unwrap().text(), "line 35");
    }

    #[test]
    fn test_segments_split_on_overflow() {
        let mut list = SegmentedLineList::with_capacity_hint(4);
        for i in 0..20 {
            // Append at the same hot spot to exercise the split path.
            list.insert(list.len() / 2, line(&format!("{i}")));
        }
        assert!(list.segment_count() > 1);
        assert_eq!(list.len(), 20);
    }

    #[test]
    fn test_segments_merge_on_underflow() {
        let mut list = SegmentedLineList::with_capacity_hint(4);
        for i in 0..32 {
            list.push(line(&format!("{i}")));
        }
        let before = list.segment_count();
        list.remove_range(0, 30);
        assert_eq!(list.len(), 2);
        assert!(list.segment_count() < before);
        assert_eq!(texts(&list), vec!["30", "31"]);
    }

    #[test]
    fn test_shallow_copy_shares_lines() {
        let mut list = SegmentedLineList::new();
        list.push(line("a"));
        list.push(line("b"));

        let copy = list.shallow_copy();
        assert!(Arc::ptr_eq(list.get(0).unwrap(), copy.get(0).unwrap()));
        assert!(list.is_shared(0));
        assert!(copy.is_shared(1));
    }

    #[test]
    fn test_make_mut_promotes_only_touched_line() {
        let mut list = SegmentedLineList::new();
        list.push(line("a"));
        list.push(line("b"));
        let copy = list.shallow_copy();

        list.make_mut(0).push_str("!");
        assert_eq!(list.get(0).unwrap().text(), "a!");
        assert_eq!(copy.get(0).unwrap().text(), "a");

        // Line 0 diverged, line 1 is still the same instance.
        assert!(!Arc::ptr_eq(list.get(0).unwrap(), copy.get(0).unwrap()));
        assert!(Arc::ptr_eq(list.get(1).unwrap(), copy.get(1).unwrap()));
        assert!(!list.is_shared(0));
        assert!(list.is_shared(1));
    }

    #[test]
    fn test_deep_copy_shares_nothing() {
        let mut list = SegmentedLineList::new();
        list.push(line("a"));
        let copy = list.deep_copy();
        assert!(!Arc::ptr_eq(list.get(0).unwrap(), copy.get(0).unwrap()));
        assert!(!list.is_shared(0));
        assert_eq!(copy.get(0).unwrap().text(), "a");
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_remove_range_out_of_bounds_panics() {
        let mut list = SegmentedLineList::new();
        list.push(line("a"));
        list.remove_range(0, 2);
    }
}
