use crate::record::AnalysisResult;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Keeps the `capacity` greatest items seen, using a min-heap so each push is
/// O(log n) and memory stays bounded no matter how many items stream past.
#[derive(Debug, Clone)]
pub struct TopN<T: Ord> {
    capacity: usize,
    heap: BinaryHeap<Reverse<T>>,
}

impl<T: Ord> TopN<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            heap: BinaryHeap::with_capacity(capacity.saturating_add(1)),
        }
    }

    pub fn push(&mut self, item: T) {
        if self.capacity == 0 {
            return;
        }
        if self.heap.len() < self.capacity {
            self.heap.push(Reverse(item));
            return;
        }
        let beats_smallest = self
            .heap
            .peek()
            .is_some_and(|Reverse(smallest)| item > *smallest);
        if beats_smallest {
            self.heap.pop();
            self.heap.push(Reverse(item));
        }
    }

    /// Merging is commutative: the result only depends on the union of items.
    pub fn merge(&mut self, other: TopN<T>) {
        for Reverse(item) in other.heap {
            self.push(item);
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Greatest first.
    pub fn into_sorted_vec(self) -> Vec<T> {
        // ascending order of Reverse<T> is descending order of T
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(item)| item)
            .collect()
    }
}

/// Ranks results by size, larger first, ties broken by path so the order is total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BySize(pub AnalysisResult);

impl Ord for BySize {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .size()
            .cmp(&other.0.size())
            .then_with(|| other.0.path().cmp(self.0.path()))
    }
}

impl PartialOrd for BySize {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Ranks recommendations by reclaimable size, then ascending safety level, then path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByReclaim(pub AnalysisResult);

impl Ord for ByReclaim {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .size()
            .cmp(&other.0.size())
            .then_with(|| other.0.level().cmp(&self.0.level()))
            .then_with(|| other.0.path().cmp(self.0.path()))
    }
}

impl PartialOrd for ByReclaim {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{PathRecord, Recommendation, SafetyLevel};
    use std::path::PathBuf;
    use std::time::UNIX_EPOCH;

    fn result(path: &str, size: u64, level: SafetyLevel) -> AnalysisResult {
        let record = PathRecord {
            path: PathBuf::from(path),
            size,
            modified: UNIX_EPOCH,
            is_hidden: false,
            is_directory: false,
        };
        AnalysisResult::new(record, 10, level, Recommendation::Delete)
    }

    #[test]
    fn keeps_only_the_largest() {
        let mut top = TopN::new(3);
        for n in [5, 1, 9, 7, 3, 8] {
            top.push(n);
        }
        assert_eq!(top.into_sorted_vec(), vec![9, 8, 7]);
    }

    #[test]
    fn zero_capacity_holds_nothing() {
        let mut top = TopN::new(0);
        top.push(1);
        assert!(top.is_empty());
    }

    #[test]
    fn merge_is_order_independent() {
        let mut a = TopN::new(2);
        let mut b = TopN::new(2);
        [4, 10, 2].into_iter().for_each(|n| a.push(n));
        [6, 11].into_iter().for_each(|n| b.push(n));

        let mut left = a.clone();
        left.merge(b.clone());
        let mut right = b;
        right.merge(a);
        assert_eq!(left.into_sorted_vec(), right.into_sorted_vec());
    }

    #[test]
    fn size_ties_break_on_path() {
        let mut top = TopN::new(2);
        top.push(BySize(result("/b", 10, SafetyLevel::Safe)));
        top.push(BySize(result("/c", 10, SafetyLevel::Safe)));
        top.push(BySize(result("/a", 10, SafetyLevel::Safe)));
        let paths: Vec<PathBuf> = top
            .into_sorted_vec()
            .into_iter()
            .map(|r| r.0.path().to_path_buf())
            .collect();
        assert_eq!(paths, vec![PathBuf::from("/a"), PathBuf::from("/b")]);
    }

    #[test]
    fn reclaim_ties_prefer_lower_safety_level() {
        let mut top = TopN::new(3);
        top.push(ByReclaim(result("/x", 10, SafetyLevel::VerySafe)));
        top.push(ByReclaim(result("/y", 10, SafetyLevel::Moderate)));
        top.push(ByReclaim(result("/z", 99, SafetyLevel::VerySafe)));
        let order: Vec<String> = top
            .into_sorted_vec()
            .into_iter()
            .map(|r| r.0.path().display().to_string())
            .collect();
        assert_eq!(order, ["/z", "/y", "/x"]);
    }
}
