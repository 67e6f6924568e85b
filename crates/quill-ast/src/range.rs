//! Source location tracking

use serde::{Deserialize, Serialize};

/// A half-open range `[start, end)` of byte offsets into a source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Range {
    /// Byte offset of the start
    pub start: usize,
    /// Byte offset of the end (exclusive)
    pub end: usize,
}

impl Range {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "range start {start} is after end {end}");
        Self { start, end }
    }

    /// An empty range positioned at `offset`
    pub fn empty(offset: usize) -> Self {
        Self { start: offset, end: offset }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Merge two ranges into one that covers both
    pub fn merge(self, other: Range) -> Range {
        Range {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Whether the two ranges overlap.
    ///
    /// An empty range behaves like a point and intersects any range that
    /// contains it end-inclusively.
    pub fn intersects(self, other: Range) -> bool {
        if self.is_empty() {
            return other.contains_inclusive(self.start);
        }
        if other.is_empty() {
            return self.contains_inclusive(other.start);
        }
        self.start < other.end && other.start < self.end
    }

    /// `start <= offset < end`
    pub fn contains(self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    /// `start <= offset <= end`; a cursor touching the end still selects the range
    pub fn contains_inclusive(self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }

    /// Whether `other` lies completely inside this range
    pub fn encloses(self, other: Range) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Map both ends through an offset translation
    pub fn map(self, f: impl Fn(usize) -> usize) -> Range {
        let start = f(self.start);
        let end = f(self.end).max(start);
        Range { start, end }
    }
}

impl From<std::ops::Range<usize>> for Range {
    fn from(range: std::ops::Range<usize>) -> Self {
        Range::new(range.start, range.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_half_open() {
        let range = Range::new(2, 5);
        assert!(!range.contains(1));
        assert!(range.contains(2));
        assert!(range.contains(4));
        assert!(!range.contains(5));
        assert!(range.contains_inclusive(5));
    }

    #[test]
    fn test_intersects() {
        assert!(Range::new(0, 3).intersects(Range::new(2, 6)));
        assert!(!Range::new(0, 3).intersects(Range::new(3, 6)));
        assert!(Range::new(0, 3).intersects(Range::empty(3)));
        assert!(!Range::new(0, 3).intersects(Range::empty(4)));
    }

    #[test]
    fn test_merge() {
        let merged = Range::new(3, 4).merge(Range::new(1, 2));
        assert_eq!(merged, Range::new(1, 4));
    }
}
