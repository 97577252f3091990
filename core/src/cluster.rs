//! Cluster simulator: streams multi-table queries through a sharding protocol and an optional
//! cluster cache, accumulating inter-processor traffic statistics.

use crate::cluster_cache::ClusterCache;
use crate::sharding::Sharding;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;
use std::collections::HashMap;

/// Accumulated traffic statistics for one cluster simulation run.
#[derive(Serialize, Clone, Debug)]
pub struct Results {
    pub processors: usize,
    pub tables: usize,
    pub queries: usize,
    pub packets: Vec<Vec<u64>>,
    pub lookups: Vec<Vec<u64>>,
    pub fanout: Vec<u64>,
    pub outgoing_packets: Vec<u64>,
    pub outgoing_lookups: Vec<u64>,
    pub outgoing_tables: Vec<Vec<u64>>,
    pub packet_size: Vec<Vec<u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_hits: Option<Vec<Vec<u64>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_refs: Option<Vec<Vec<u64>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_footprint: Option<Vec<Vec<u64>>>,
}

impl Results {
    fn new(processors: usize, tables: usize, queries: usize) -> Self {
        Self {
            processors,
            tables,
            queries,
            packets: vec![vec![0; processors]; processors],
            lookups: vec![vec![0; processors]; processors],
            fanout: vec![0; processors + 1],
            outgoing_packets: vec![0; processors + 1],
            outgoing_lookups: vec![0; tables + 1],
            outgoing_tables: vec![vec![0; tables]; processors],
            packet_size: vec![vec![0; tables + 1]; processors],
            cache_hits: None,
            cache_refs: None,
            cache_footprint: None,
        }
    }
}

pub struct ClusterSimulator<'a> {
    processors: usize,
    tables: usize,
    sharding: &'a Sharding,
    cache: Option<&'a mut ClusterCache>,
    rng: StdRng,
}

impl<'a> ClusterSimulator<'a> {
    pub fn new(
        processors: usize,
        tables: usize,
        sharding: &'a Sharding,
        cache: Option<&'a mut ClusterCache>,
        seed: u64,
    ) -> Self {
        Self {
            processors,
            tables,
            sharding,
            cache,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Streams `queries` (each a row of width `tables`) and returns the accumulated [`Results`].
    pub fn run(&mut self, queries: &[Vec<u32>]) -> Results {
        let mut results = Results::new(self.processors, self.tables, queries.len());
        for query in queries {
            assert_eq!(
                query.len(),
                self.tables,
                "cluster simulator: query width does not match configured table count"
            );
            let coordinator = self.rng.gen_range(0..self.processors);
            self.accumulate(query, coordinator, &mut results);
        }
        self.attach_cache_stats(&mut results);
        results
    }

    /// Same accounting as [`Self::run`], but with the coordinator for each query supplied by the
    /// caller instead of drawn from the RNG. Used by tests that need to pin a literal scenario
    /// without depending on `StdRng`'s internal sequence.
    #[cfg(test)]
    fn run_with_coordinators(&mut self, queries: &[Vec<u32>], coordinators: &[usize]) -> Results {
        assert_eq!(
            queries.len(),
            coordinators.len(),
            "test harness: one coordinator per query"
        );
        let mut results = Results::new(self.processors, self.tables, queries.len());
        for (query, &coordinator) in queries.iter().zip(coordinators) {
            assert_eq!(
                query.len(),
                self.tables,
                "cluster simulator: query width does not match configured table count"
            );
            self.accumulate(query, coordinator, &mut results);
        }
        self.attach_cache_stats(&mut results);
        results
    }

    /// Resolves `query`'s targets, short-circuits remote lookups through the cache (if any), and
    /// folds the outcome into `results`'s histograms for the chosen `coordinator`.
    fn accumulate(&mut self, query: &[u32], coordinator: usize, results: &mut Results) {
        let mut targets: Vec<usize> = (0..self.tables)
            .map(|i| self.sharding.lookup(i, query[i]))
            .collect();

        if let Some(cache) = self.cache.as_deref_mut() {
            for i in 0..self.tables {
                if targets[i] != coordinator {
                    let hit = cache.reference(coordinator, i, query[i]);
                    if hit {
                        targets[i] = coordinator;
                    }
                }
            }
        }

        let mut counts: HashMap<usize, u64> = HashMap::new();
        for &t in &targets {
            *counts.entry(t).or_insert(0) += 1;
        }

        results.fanout[counts.len()] += 1;
        let has_coordinator = counts.contains_key(&coordinator) as usize;
        results.outgoing_packets[counts.len() - has_coordinator] += 1;
        let local_lookups = *counts.get(&coordinator).unwrap_or(&0);
        results.outgoing_lookups[self.tables - local_lookups as usize] += 1;

        for (&target, &count) in &counts {
            if target != coordinator {
                results.packets[coordinator][target] += 1;
                results.lookups[coordinator][target] += count;
                results.packet_size[coordinator][count as usize] += 1;
            }
        }
        for (i, &target) in targets.iter().enumerate() {
            if target != coordinator {
                results.outgoing_tables[coordinator][i] += 1;
            }
        }
    }

    fn attach_cache_stats(&self, results: &mut Results) {
        if let Some(cache) = &self.cache {
            results.cache_hits = Some(cache.hits().to_vec());
            results.cache_refs = Some(cache.refs().to_vec());
            results.cache_footprint = cache.footprint();
        }
    }
}
