/*
 * This file is a part of the tracecache project.
*/

use crate::error::{CResult, Error};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Reads the sharding-table file: one line per table, each line a comma-separated list of
/// `key:proc` entries. Lines are assigned to tables `0, 1, ..., D-1` in order.
pub fn read_lookup_table(path: &Path) -> CResult<Vec<HashMap<u32, usize>>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut tables = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let mut table = HashMap::new();
        if line.is_empty() {
            tables.push(table);
            continue;
        }
        for entry in line.split(',') {
            let (key_str, proc_str) = entry.split_once(':').ok_or_else(|| {
                Error::parse(line_no + 1, format!("entry {entry:?} is not `key:proc`"))
            })?;
            let key: u32 = key_str.trim().parse().map_err(|_| {
                Error::parse(line_no + 1, format!("key {key_str:?} is not a u32"))
            })?;
            let proc: usize = proc_str.trim().parse().map_err(|_| {
                Error::parse(line_no + 1, format!("processor {proc_str:?} is not a non-negative integer"))
            })?;
            table.insert(key, proc);
        }
        tables.push(table);
    }

    Ok(tables)
}

/// Reads a single comma-separated list of per-table cardinalities.
pub fn read_cardinalities(path: &Path) -> CResult<Vec<u64>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let first_line = reader
        .lines()
        .next()
        .ok_or_else(|| Error::config("cardinalities file is empty"))??;

    first_line
        .split(',')
        .map(|field| {
            field
                .trim()
                .parse::<u64>()
                .map_err(|_| Error::parse(1, format!("cardinality {field:?} is not a u64")))
        })
        .collect()
}

/// `clamp(min_size, floor(cardinality * rel), cardinality)`. Uses `max` then `min` rather than
/// [`u64::clamp`] because a table smaller than `min_size` would otherwise make `min > max` and
/// panic.
pub fn size_from_cardinality(cardinality: u64, min_size: u64, rel: f64) -> u64 {
    let scaled = (cardinality as f64 * rel).floor() as u64;
    scaled.max(min_size).min(cardinality)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn lookup_table_assigns_lines_to_tables_in_order() {
        let f = write_temp("1:0,2:1\n3:1\n");
        let tables = read_lookup_table(&f.path().to_path_buf()).unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0][&1], 0);
        assert_eq!(tables[0][&2], 1);
        assert_eq!(tables[1][&3], 1);
    }

    #[test]
    fn cardinalities_parse_single_line() {
        let f = write_temp("100,200,300\n");
        let cards = read_cardinalities(&f.path().to_path_buf()).unwrap();
        assert_eq!(cards, vec![100, 200, 300]);
    }

    #[test]
    fn size_from_cardinality_clamps_to_bounds() {
        assert_eq!(size_from_cardinality(100_000, 100, 0.01), 1000);
        assert_eq!(size_from_cardinality(10, 100, 0.01), 10); // clamped up to cardinality
        assert_eq!(size_from_cardinality(1_000_000, 100, 0.01), 10_000);
    }
}
