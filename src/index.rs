// src/index.rs

//! Static interval tree over normalized issue lifetimes.
//!
//! Intervals are kept sorted by `(begin, end)`. The sorted array doubles as an
//! implicit balanced BST: the node for a slice `lo..hi` sits at its midpoint,
//! and `max_end[mid]` caches the largest `end` in that slice. A query descends
//! only into slices whose `max_end` reaches past the query start and whose
//! root begins before the query stop, giving `O(log n + k)` per lookup.

use crate::error::IndexError;
use crate::model::{Day, NormalizedInterval};

#[derive(Debug, Clone, Default)]
pub struct IntervalIndex {
    intervals: Vec<NormalizedInterval>,
    max_end: Vec<Day>,
}

impl IntervalIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index in one pass. Rejects the batch on the first degenerate interval.
    pub fn build(intervals: impl IntoIterator<Item = NormalizedInterval>) -> Result<Self, IndexError> {
        let mut intervals: Vec<_> = intervals.into_iter().collect();
        if let Some(bad) = intervals.iter().find(|iv| iv.begin >= iv.end) {
            return Err(invalid(bad));
        }
        intervals.sort_unstable_by_key(|iv| (iv.begin, iv.end, iv.issue));
        let mut index = Self { max_end: vec![0; intervals.len()], intervals };
        index.augment();
        Ok(index)
    }

    /// Add one interval. Insertion keeps the sort order and re-augments, so
    /// prefer [`IntervalIndex::build`] for bulk loads.
    pub fn insert(&mut self, interval: NormalizedInterval) -> Result<(), IndexError> {
        if interval.begin >= interval.end {
            return Err(invalid(&interval));
        }
        let key = (interval.begin, interval.end, interval.issue);
        let at = self
            .intervals
            .partition_point(|iv| (iv.begin, iv.end, iv.issue) <= key);
        self.intervals.insert(at, interval);
        self.max_end.push(0);
        self.augment();
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn global_min_begin(&self) -> Result<Day, IndexError> {
        self.intervals.first().map(|iv| iv.begin).ok_or(IndexError::Empty)
    }

    pub fn global_max_end(&self) -> Result<Day, IndexError> {
        if self.is_empty() {
            return Err(IndexError::Empty);
        }
        Ok(self.max_end[root(0, self.len())])
    }

    /// Every interval whose `[begin, end)` intersects `[start, stop)`, in begin order.
    pub fn overlapping(&self, start: Day, stop: Day) -> Vec<&NormalizedInterval> {
        let mut found = Vec::new();
        if start < stop {
            self.visit(0, self.len(), start, stop, &mut |iv| found.push(iv));
        }
        found
    }

    /// Intervals alive on `day`, i.e. `overlapping(day, day + 1)`.
    pub fn at(&self, day: Day) -> Vec<&NormalizedInterval> {
        self.overlapping(day, day + 1)
    }

    /// Count of intervals alive on `day` that satisfy `keep`, without allocating.
    pub fn count_at<F>(&self, day: Day, keep: F) -> usize
    where
        F: Fn(&NormalizedInterval) -> bool,
    {
        let mut count = 0;
        self.visit(0, self.len(), day, day + 1, &mut |iv| {
            if keep(iv) {
                count += 1;
            }
        });
        count
    }

    fn visit<'a, F>(&'a self, lo: usize, hi: usize, start: Day, stop: Day, f: &mut F)
    where
        F: FnMut(&'a NormalizedInterval),
    {
        if lo >= hi {
            return;
        }
        let mid = root(lo, hi);
        if self.max_end[mid] <= start {
            return;
        }
        self.visit(lo, mid, start, stop, f);
        let iv = &self.intervals[mid];
        if iv.begin < stop {
            if start < iv.end {
                f(iv);
            }
            self.visit(mid + 1, hi, start, stop, f);
        }
    }

    fn augment(&mut self) {
        let n = self.len();
        self.fill_max(0, n);
    }

    fn fill_max(&mut self, lo: usize, hi: usize) -> Option<Day> {
        if lo >= hi {
            return None;
        }
        let mid = root(lo, hi);
        let left = self.fill_max(lo, mid);
        let right = self.fill_max(mid + 1, hi);
        let max = [left, right]
            .into_iter()
            .flatten()
            .fold(self.intervals[mid].end, Day::max);
        self.max_end[mid] = max;
        Some(max)
    }
}

fn root(lo: usize, hi: usize) -> usize {
    lo + (hi - lo) / 2
}

fn invalid(iv: &NormalizedInterval) -> IndexError {
    IndexError::InvalidInterval { issue: iv.issue, begin: iv.begin, end: iv.end }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::IssueState;

    fn iv(issue: u64, begin: Day, end: Day) -> NormalizedInterval {
        NormalizedInterval::new(issue, begin, end, IssueState::Closed, false)
    }

    fn ids(found: Vec<&NormalizedInterval>) -> Vec<u64> {
        let mut ids: Vec<_> = found.iter().map(|iv| iv.issue).collect();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn empty_index_has_no_bounds() {
        let index = IntervalIndex::new();
        assert_eq!(index.global_min_begin(), Err(IndexError::Empty));
        assert_eq!(index.global_max_end(), Err(IndexError::Empty));
        assert!(index.at(0).is_empty());
    }

    #[test]
    fn rejects_degenerate_intervals() {
        let mut index = IntervalIndex::new();
        assert_eq!(
            index.insert(iv(9, 3, 3)),
            Err(IndexError::InvalidInterval { issue: 9, begin: 3, end: 3 })
        );
        assert!(IntervalIndex::build([iv(1, 0, 2), iv(2, 5, 4)]).is_err());
        assert!(index.is_empty());
    }

    #[test]
    fn half_open_point_queries() {
        let index = IntervalIndex::build([iv(1, 0, 5), iv(2, 3, 4), iv(3, 5, 8)]).unwrap();
        assert_eq!(ids(index.at(0)), vec![1]);
        assert_eq!(ids(index.at(3)), vec![1, 2]);
        assert_eq!(ids(index.at(4)), vec![1]);
        assert_eq!(ids(index.at(5)), vec![3]);
        assert!(index.at(8).is_empty());
        assert!(index.at(-1).is_empty());
    }

    #[test]
    fn range_queries() {
        let index = IntervalIndex::build([iv(1, 0, 2), iv(2, 4, 6), iv(3, 10, 20)]).unwrap();
        assert_eq!(ids(index.overlapping(1, 5)), vec![1, 2]);
        assert_eq!(ids(index.overlapping(6, 10)), Vec::<u64>::new());
        assert_eq!(ids(index.overlapping(-5, 100)), vec![1, 2, 3]);
        assert!(index.overlapping(5, 5).is_empty());
    }

    #[test]
    fn bounds_track_inserts() {
        let mut index = IntervalIndex::new();
        index.insert(iv(1, 4, 6)).unwrap();
        index.insert(iv(2, 1, 3)).unwrap();
        index.insert(iv(3, 2, 12)).unwrap();
        assert_eq!(index.global_min_begin(), Ok(1));
        assert_eq!(index.global_max_end(), Ok(12));
        assert_eq!(ids(index.at(5)), vec![1, 3]);
        assert_eq!(index.count_at(2, |iv| iv.issue != 3), 1);
    }

    #[test]
    fn matches_linear_scan() {
        let intervals: Vec<_> = (0..200u64)
            .map(|i| {
                let begin = (i * 37 % 101) as Day;
                iv(i, begin, begin + 1 + (i * 13 % 17) as Day)
            })
            .collect();
        let index = IntervalIndex::build(intervals.clone()).unwrap();
        for day in -2..125 {
            let expected: Vec<u64> = {
                let mut v: Vec<_> = intervals
                    .iter()
                    .filter(|iv| iv.overlaps(day, day + 1))
                    .map(|iv| iv.issue)
                    .collect();
                v.sort_unstable();
                v
            };
            assert_eq!(ids(index.at(day)), expected, "day {day}");
            assert_eq!(index.count_at(day, |_| true), expected.len());
        }
    }
}
