//! Sharding protocols: map `(table, key)` to the processor that owns that row.

use std::collections::HashMap;

pub enum Sharding {
    /// `key mod processors`; the table index is ignored.
    ByModulo { processors: usize },
    /// An explicit, precompiled per-table key→processor mapping.
    Table { tables: Vec<HashMap<u32, usize>> },
}

impl Sharding {
    pub fn by_modulo(processors: usize) -> Self {
        Self::ByModulo { processors }
    }

    pub fn from_tables(tables: Vec<HashMap<u32, usize>>) -> Self {
        Self::Table { tables }
    }

    /// Resolves the owning processor for `key` in `table`. Panics (contract violation) if a
    /// `Table`-backed shard has no entry for `key` — the spec treats this as a configuration
    /// error that aborts rather than falling back silently.
    pub fn lookup(&self, table: usize, key: u32) -> usize {
        match self {
            Self::ByModulo { processors } => (key as usize) % processors,
            Self::Table { tables } => *tables[table].get(&key).unwrap_or_else(|| {
                panic!("sharding table {table} has no entry for key {key}")
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modulo_ignores_table_index() {
        let s = Sharding::by_modulo(2);
        assert_eq!(s.lookup(0, 4), 0);
        assert_eq!(s.lookup(5, 5), 1);
        assert_eq!(s.lookup(9, 4), 0);
    }

    #[test]
    fn table_lookup_returns_stored_processor() {
        let mut t0 = HashMap::new();
        t0.insert(7u32, 2usize);
        let s = Sharding::from_tables(vec![t0]);
        assert_eq!(s.lookup(0, 7), 2);
    }

    #[test]
    #[should_panic(expected = "no entry for key")]
    fn table_lookup_panics_on_missing_key() {
        let s = Sharding::from_tables(vec![HashMap::new()]);
        s.lookup(0, 1);
    }
}
