//! Bounded top-K ranking of match results.

use std::collections::BinaryHeap;

use crate::result::{MAX_SCORE, MatchResult};

/// Keeps the best `capacity` results seen so far.
///
/// The heap is ordered by [`MatchResult`]'s ranking order, so its top is the
/// worst retained result and is the one evicted on overflow.
#[derive(Debug)]
pub struct TopK {
    heap: BinaryHeap<MatchResult>,
    capacity: usize,
}

impl TopK {
    /// Creates an empty ranker holding at most `capacity` results.
    pub fn new(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    /// Offers a result. Returns true if it was retained.
    pub fn push(&mut self, result: MatchResult) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if self.heap.len() < self.capacity {
            self.heap.push(result);
            return true;
        }

        match self.heap.peek_mut() {
            Some(mut worst) if result < *worst => {
                *worst = result;
                true
            }
            _ => false,
        }
    }

    /// Offers every result from `results`.
    pub fn extend(&mut self, results: impl IntoIterator<Item = MatchResult>) {
        for result in results {
            self.push(result);
        }
    }

    /// Returns true once the ranker is full of perfect scores.
    ///
    /// Candidates arrive in ascending path order, so once this holds no later
    /// candidate can rank before anything retained.
    pub fn is_saturated(&self) -> bool {
        self.heap.len() >= self.capacity
            && self.heap.peek().is_some_and(|worst| worst.score == MAX_SCORE)
    }

    /// Number of retained results.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns true if nothing is retained.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Consumes the ranker, returning results best first.
    pub fn into_sorted_vec(self) -> Vec<MatchResult> {
        self.heap.into_sorted_vec()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;

    use super::*;

    fn file(path: &str, score: u8) -> MatchResult {
        MatchResult::file(PathBuf::from(path), score)
    }

    fn keys(results: &[MatchResult]) -> Vec<(u8, String)> {
        results
            .iter()
            .map(|r| (r.score, r.path.display().to_string()))
            .collect()
    }

    #[test]
    fn test_keeps_best_results() {
        let mut top = TopK::new(2);
        assert!(top.push(file("c", 10)));
        assert!(top.push(file("b", 90)));
        assert!(top.push(file("a", 50)));
        assert!(!top.push(file("d", 5)));

        assert_eq!(top.len(), 2);
        assert_eq!(
            keys(&top.into_sorted_vec()),
            vec![(90, "b".to_string()), (50, "a".to_string())]
        );
    }

    #[test]
    fn test_tie_break_evicts_larger_path() {
        let mut top = TopK::new(2);
        top.push(file("z", 100));
        top.push(file("m", 100));
        assert!(top.push(file("a", 100)));
        assert!(!top.push(file("zz", 100)));

        assert_eq!(
            keys(&top.into_sorted_vec()),
            vec![(100, "a".to_string()), (100, "m".to_string())]
        );
    }

    #[test]
    fn test_order_independent_of_arrival() {
        let inputs = vec![
            file("b", 70),
            file("a", 70),
            file("c", 99),
            file("d", 1),
            file("e", 70),
            file("f", 100),
        ];

        let mut forward = TopK::new(4);
        forward.extend(inputs.clone());
        let mut backward = TopK::new(4);
        backward.extend(inputs.into_iter().rev());

        let forward = forward.into_sorted_vec();
        assert_eq!(keys(&forward), keys(&backward.into_sorted_vec()));
        assert_eq!(
            keys(&forward),
            vec![
                (100, "f".to_string()),
                (99, "c".to_string()),
                (70, "a".to_string()),
                (70, "b".to_string()),
            ]
        );
    }

    #[test]
    fn test_saturation() {
        let mut top = TopK::new(2);
        top.push(file("a", 100));
        assert!(!top.is_saturated());
        top.push(file("b", 80));
        assert!(!top.is_saturated());
        top.push(file("c", 100));
        assert!(top.is_saturated());
    }

    #[test]
    fn test_zero_capacity_retains_nothing() {
        let mut top = TopK::new(0);
        assert!(!top.push(file("a", 100)));
        assert!(top.is_empty());
    }
}
