//! Bélády's optimal (OPT) offline replacement simulation: a cache of size `k` always evicts the
//! resident whose next reference lies farthest in the future.

use crate::bounded_heap::{BoundedKeyedHeap, HeapOrder};
use std::collections::HashMap;
use std::hash::Hash;

/// Sentinel standing in for "no future reference" — always sorts as farthest away.
pub const NEVER_AGAIN: usize = usize::MAX;

/// Precomputes, for each position in `requests`, the index of that key's *next* occurrence
/// (or [`NEVER_AGAIN`] if it never recurs). One reverse scan over the trace.
pub fn next_occurrence<K: Clone + Eq + Hash>(requests: &[K]) -> Vec<usize> {
    let mut last_seen: HashMap<K, usize> = HashMap::new();
    let mut next = vec![NEVER_AGAIN; requests.len()];
    for i in (0..requests.len()).rev() {
        if let Some(&future) = last_seen.get(&requests[i]) {
            next[i] = future;
        }
        last_seen.insert(requests[i].clone(), i);
    }
    next
}

/// Runs the trace through an OPT cache of capacity `size`, returning `(hits, total)`.
pub fn simulate<K: Clone + Eq + Hash>(requests: &[K], size: usize) -> (usize, usize) {
    let total = requests.len();
    if size == 0 {
        return (0, total);
    }
    let next = next_occurrence(requests);
    let mut heap: BoundedKeyedHeap<K, usize> = BoundedKeyedHeap::new(size, HeapOrder::Max);
    let mut hits = 0;
    for (i, key) in requests.iter().enumerate() {
        if heap.contains(key) {
            heap.set(key, next[i]);
            hits += 1;
        } else {
            heap.insert(key.clone(), next[i]);
        }
    }
    (hits, total)
}

pub fn hitrate<K: Clone + Eq + Hash>(requests: &[K], size: usize) -> f64 {
    let (hits, total) = simulate(requests, size);
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_size_cache_never_hits() {
        assert_eq!(simulate(&["a", "a"], 0), (0, 2));
    }

    #[test]
    fn classic_anomaly_opt_is_optimal() {
        let stream = ["A", "B", "C", "A", "B", "D", "E", "A", "B"];
        let (hits, total) = simulate(&stream, 3);
        assert_eq!(total, 9);
        assert_eq!(hits, 4);
    }

    #[test]
    fn opt_never_worse_than_lru_or_lfu() {
        let stream = [1, 2, 3, 4, 1, 2, 5, 1, 3, 2, 4, 6, 1, 2];
        for size in 1..=4 {
            let (opt_hits, _) = simulate(&stream, size);
            let (lfu_hits, _) = crate::lfu::simulate(&stream, size);
            assert!(opt_hits >= lfu_hits, "size={size}");

            let mut lru = crate::lru::LruEngine::with_seed(9);
            let distances = lru.distances(&stream);
            let lru_hits = distances.iter().filter(|d| matches!(d, Some(dist) if *dist < size)).count();
            assert!(opt_hits >= lru_hits, "size={size}");
        }
    }
}
