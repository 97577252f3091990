/*
 * This file is a part of the tracecache project.
*/

//! Result writers: one CSV per HRC feature column, one JSON document per cluster run.

use crate::error::CResult;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracecache_core::cluster::Results;

/// One row of the LRU-only HRC CSV (`size,hitrate`).
pub struct LruRow {
    pub size: usize,
    pub hitrate: f64,
}

/// One row of the three-policy comparison CSV.
pub struct ComparisonRow {
    pub cache_size: usize,
    pub cache_size_relative: f64,
    pub hitrate_lru: f64,
    pub hitrate_lfu: f64,
    pub hitrate_opt: f64,
}

pub fn write_lru_only_csv(path: &Path, rows: &[LruRow]) -> CResult<()> {
    let mut f = File::create(path)?;
    writeln!(f, "size,hitrate")?;
    for row in rows {
        writeln!(f, "{},{:.5}", row.size, row.hitrate)?;
    }
    Ok(())
}

pub fn write_comparison_csv(path: &Path, rows: &[ComparisonRow]) -> CResult<()> {
    let mut f = File::create(path)?;
    writeln!(f, "cache_size,cache_size_relative,hitrate_LRU,hitrate_LFU,hitrate_OPT")?;
    for row in rows {
        writeln!(
            f,
            "{},{:.5},{:.5},{:.5},{:.5}",
            row.cache_size, row.cache_size_relative, row.hitrate_lru, row.hitrate_lfu, row.hitrate_opt
        )?;
    }
    Ok(())
}

/// Cluster run metadata the core simulator doesn't know about (file paths, mode names), wrapped
/// around its computed [`Results`] for the JSON report.
#[derive(Serialize)]
pub struct ClusterReport<'a> {
    pub processors: usize,
    pub tables: usize,
    pub queries: usize,
    pub cache_policy: &'a str,
    pub cache_mode: &'a str,
    pub sharding_mode: &'a str,
    pub sharding_file: Option<&'a str>,
    pub sharding_name: &'a str,
    pub packets: &'a Vec<Vec<u64>>,
    pub lookups: &'a Vec<Vec<u64>>,
    pub outgoing_packets: &'a Vec<u64>,
    pub outgoing_lookups: &'a Vec<u64>,
    pub outgoing_tables: &'a Vec<Vec<u64>>,
    pub packet_size: &'a Vec<Vec<u64>>,
    pub fanout: &'a Vec<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_min_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_size_rel: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregate_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_sizes: Option<&'a Vec<usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_hits: Option<&'a Vec<Vec<u64>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_refs: Option<&'a Vec<Vec<u64>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_footprint: Option<&'a Vec<Vec<u64>>>,
}

pub fn write_cluster_json(path: &Path, report: &ClusterReport) -> CResult<()> {
    let mut f = File::create(path)?;
    let json = serde_json::to_string_pretty(report)
        .expect("cluster report is always representable as JSON");
    f.write_all(json.as_bytes())?;
    Ok(())
}

impl<'a> ClusterReport<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn from_results(
        results: &'a Results,
        cache_policy: &'a str,
        cache_mode: &'a str,
        sharding_mode: &'a str,
        sharding_file: Option<&'a str>,
        sharding_name: &'a str,
        cache_sizing: Option<(u64, f64, u64, &'a Vec<usize>)>,
    ) -> Self {
        let (cache_min_size, cache_size_rel, aggregate_size, cache_sizes) = match cache_sizing {
            Some((min, rel, agg, sizes)) => (Some(min), Some(rel), Some(agg), Some(sizes)),
            None => (None, None, None, None),
        };
        Self {
            processors: results.processors,
            tables: results.tables,
            queries: results.queries,
            cache_policy,
            cache_mode,
            sharding_mode,
            sharding_file,
            sharding_name,
            packets: &results.packets,
            lookups: &results.lookups,
            outgoing_packets: &results.outgoing_packets,
            outgoing_lookups: &results.outgoing_lookups,
            outgoing_tables: &results.outgoing_tables,
            packet_size: &results.packet_size,
            fanout: &results.fanout,
            cache_min_size,
            cache_size_rel,
            aggregate_size,
            cache_sizes,
            cache_hits: results.cache_hits.as_ref(),
            cache_refs: results.cache_refs.as_ref(),
            cache_footprint: results.cache_footprint.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lru_only_csv_formats_five_decimals() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_lru_only_csv(
            &path,
            &[LruRow { size: 1, hitrate: 0.0 }, LruRow { size: 2, hitrate: 0.2 }],
        )
        .unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "size,hitrate\n1,0.00000\n2,0.20000\n");
    }

    #[test]
    fn comparison_csv_has_expected_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_comparison_csv(
            &path,
            &[ComparisonRow {
                cache_size: 10,
                cache_size_relative: 0.1,
                hitrate_lru: 0.5,
                hitrate_lfu: 0.6,
                hitrate_opt: 0.7,
            }],
        )
        .unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next().unwrap(),
            "cache_size,cache_size_relative,hitrate_LRU,hitrate_LFU,hitrate_OPT"
        );
        assert_eq!(lines.next().unwrap(), "10,0.10000,0.50000,0.60000,0.70000");
    }
}
