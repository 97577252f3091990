//! LFU hit-rate simulation: for a fixed cache size, replay the trace through a
//! [`BoundedKeyedHeap`] configured as a min-frequency heap.

use crate::bounded_heap::{BoundedKeyedHeap, HeapOrder};
use std::hash::Hash;

/// Runs the trace through an LFU cache of capacity `size`, returning `(hits, total)`.
pub fn simulate<K: Clone + Eq + Hash>(requests: &[K], size: usize) -> (usize, usize) {
    let total = requests.len();
    if size == 0 {
        return (0, total);
    }
    let mut heap: BoundedKeyedHeap<K, u64> = BoundedKeyedHeap::new(size, HeapOrder::Min);
    let mut hits = 0;
    for key in requests {
        if heap.contains(key) {
            heap.change(key, |freq| freq + 1);
            hits += 1;
        } else {
            heap.insert(key.clone(), 1);
        }
    }
    (hits, total)
}

/// Convenience wrapper returning the hit rate directly.
pub fn hitrate<K: Clone + Eq + Hash>(requests: &[K], size: usize) -> f64 {
    let (hits, total) = simulate(requests, size);
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}
