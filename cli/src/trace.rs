/*
 * This file is a part of the tracecache project.
*/

//! Dataset parsing: the thin I/O adapter the core simulator purposefully excludes.

use crate::error::{CResult, Error};
use std::fs::File;
use std::hash::Hash;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A reference-stream element. Each HRC feature column locks in one variant from its first row
/// and enforces it for the rest of the column (strict mode: a mismatched later row is fatal).
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Key {
    Str(String),
    U32(u32),
    I64(i64),
}

impl Key {
    fn parse_as(field: &str, kind: KeyKind) -> Option<Key> {
        match kind {
            KeyKind::U32 => field.parse::<u32>().ok().map(Key::U32),
            KeyKind::I64 => field.parse::<i64>().ok().map(Key::I64),
            KeyKind::Str => Some(Key::Str(field.to_owned())),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum KeyKind {
    U32,
    I64,
    Str,
}

fn infer_kind(field: &str) -> KeyKind {
    if field.parse::<u32>().is_ok() {
        KeyKind::U32
    } else if field.parse::<i64>().is_ok() {
        KeyKind::I64
    } else {
        KeyKind::Str
    }
}

/// Options controlling [`read_hrc_trace`].
pub struct HrcTraceOptions {
    pub separator: char,
    /// Column indices to extract; empty means "every column".
    pub columns: Vec<usize>,
    pub max_rows: Option<usize>,
}

impl Default for HrcTraceOptions {
    fn default() -> Self {
        Self {
            separator: '\t',
            columns: Vec::new(),
            max_rows: None,
        }
    }
}

/// Reads a delimited trace file, returning one reference stream per selected column.
pub fn read_hrc_trace(path: &Path, opts: &HrcTraceOptions) -> CResult<Vec<Vec<Key>>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut columns: Vec<Vec<Key>> = Vec::new();
    let mut kinds: Vec<KeyKind> = Vec::new();
    let mut selected: Vec<usize> = opts.columns.clone();

    for (line_no, line) in reader.lines().enumerate() {
        if let Some(max) = opts.max_rows {
            if line_no >= max {
                break;
            }
        }
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(opts.separator).collect();

        if selected.is_empty() {
            selected = (0..fields.len()).collect();
        }
        if columns.is_empty() {
            columns = vec![Vec::new(); selected.len()];
            kinds = vec![KeyKind::Str; selected.len()];
        }

        for (slot, &col) in selected.iter().enumerate() {
            let field = fields.get(col).ok_or_else(|| {
                Error::parse(
                    line_no + 1,
                    format!("row has {} fields, column {} requested", fields.len(), col),
                )
            })?;
            if columns[slot].is_empty() {
                kinds[slot] = infer_kind(field);
            }
            let key = Key::parse_as(field, kinds[slot]).ok_or_else(|| {
                Error::parse(
                    line_no + 1,
                    format!("field {field:?} does not match the column's locked-in type {:?}", kinds[slot]),
                )
            })?;
            columns[slot].push(key);
        }
    }

    Ok(columns)
}

/// Reads comma-separated `u32` query rows. The first row's width fixes `D`; any later row of a
/// different width is a fatal parse error.
pub fn read_cluster_queries(path: &Path, max_rows: Option<usize>) -> CResult<Vec<Vec<u32>>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut queries = Vec::new();
    let mut width = None;

    for (line_no, line) in reader.lines().enumerate() {
        if let Some(max) = max_rows {
            if line_no >= max {
                break;
            }
        }
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let mut row = Vec::new();
        for field in line.split(',') {
            let value: u32 = field.trim().parse().map_err(|_| {
                Error::parse(line_no + 1, format!("field {field:?} is not a u32"))
            })?;
            row.push(value);
        }
        match width {
            None => width = Some(row.len()),
            Some(w) if w != row.len() => {
                return Err(Error::parse(
                    line_no + 1,
                    format!("row has width {} but the trace's width was fixed at {w} by row 1", row.len()),
                ))
            }
            _ => {}
        }
        queries.push(row);
    }

    Ok(queries)
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
    fn hrc_trace_infers_types_per_column() {
        let f = write_temp("1\thello\n2\tworld\n");
        let cols = read_hrc_trace(&f.path().to_path_buf(), &HrcTraceOptions::default()).unwrap();
        assert_eq!(cols.len(), 2);
        assert_eq!(cols[0], vec![Key::U32(1), Key::U32(2)]);
        assert_eq!(
            cols[1],
            vec![Key::Str("hello".into()), Key::Str("world".into())]
        );
    }

    #[test]
    fn hrc_trace_selects_subset_of_columns() {
        let f = write_temp("1,2,3\n4,5,6\n");
        let opts = HrcTraceOptions {
            separator: ',',
            columns: vec![0, 2],
            max_rows: None,
        };
        let cols = read_hrc_trace(&f.path().to_path_buf(), &opts).unwrap();
        assert_eq!(cols.len(), 2);
        assert_eq!(cols[0], vec![Key::U32(1), Key::U32(4)]);
        assert_eq!(cols[1], vec![Key::U32(3), Key::U32(6)]);
    }

    #[test]
    fn hrc_trace_rejects_type_mismatch_mid_column() {
        let f = write_temp("1\n2\nhello\n");
        let err = read_hrc_trace(&f.path().to_path_buf(), &HrcTraceOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 3, .. }));
    }

    #[test]
    fn cluster_queries_fix_width_from_first_row() {
        let f = write_temp("1,2,3\n4,5,6\n");
        let rows = read_cluster_queries(&f.path().to_path_buf(), None).unwrap();
        assert_eq!(rows, vec![vec![1, 2, 3], vec![4, 5, 6]]);
    }

    #[test]
    fn cluster_queries_reject_inconsistent_width() {
        let f = write_temp("1,2,3\n4,5\n");
        let err = read_cluster_queries(&f.path().to_path_buf(), None).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }));
    }
}
