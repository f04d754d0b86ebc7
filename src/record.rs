//! Benchmark records and their persistence.
//!
//! One [`RunRecord`] is emitted per benchmark cell. Records are plain
//! rows: downstream visualization is somebody else's job, this module
//! only persists them as JSON and renders a plain-text table.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::runner::Reduction;
use crate::session::Status;

/// One row of benchmark output. Field order and types are fixed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Reducer display name.
    pub reducer: String,
    /// Identifier of the input the cell ran on.
    pub input: String,
    /// Cache used ("hash", "tree", or "none").
    pub cache: String,
    /// Atom count before reduction.
    pub initial_size: usize,
    /// Atom count after reduction.
    pub final_size: usize,
    /// Oracle invocations.
    pub queries: u64,
    /// Candidates answered from the cache.
    pub cache_hits: u64,
    /// FAIL verdicts.
    pub fail: u64,
    /// PASS verdicts.
    pub pass: u64,
    /// UNRESOLVED verdicts.
    pub unresolved: u64,
    /// Wall-clock duration in seconds.
    pub duration_secs: f64,
    /// How the cell's run ended.
    pub status: Status,
}

impl RunRecord {
    /// Build a record from a finished run.
    pub fn from_reduction<R>(reducer: &str, input: &str, reduction: &Reduction<R>) -> Self {
        Self {
            reducer: reducer.to_string(),
            input: input.to_string(),
            cache: reduction.cache_name.to_string(),
            initial_size: reduction.initial_size,
            final_size: reduction.final_size,
            queries: reduction.counters.queries,
            cache_hits: reduction.counters.cache_hits,
            fail: reduction.counters.fail,
            pass: reduction.counters.pass,
            unresolved: reduction.counters.unresolved,
            duration_secs: reduction.duration.as_secs_f64(),
            status: reduction.status,
        }
    }

    /// Fraction of the input removed, 1.0 for an empty input.
    pub fn reduction_ratio(&self) -> f64 {
        if self.initial_size == 0 {
            1.0
        } else {
            (self.initial_size - self.final_size) as f64 / self.initial_size as f64
        }
    }
}

/// An append-only collection of benchmark records.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSet {
    records: Vec<RunRecord>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, record: RunRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RunRecord> {
        self.records.iter()
    }

    /// Write the records to `path` as pretty-printed JSON.
    pub fn store<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let json = serde_json::to_string_pretty(&self.records)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())
    }

    /// Read records back from `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let records = serde_json::from_str(&contents)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(Self { records })
    }

    /// Render a plain-text table of the records.
    ///
    /// With `drop_uniform_columns`, the reducer, input, and cache
    /// columns disappear when they hold a single value across all rows,
    /// which keeps single-input benchmark output narrow.
    pub fn to_table(&self, drop_uniform_columns: bool) -> String {
        const HEADERS: [&str; 13] = [
            "reducer",
            "input",
            "cache",
            "initial",
            "final",
            "ratio",
            "queries",
            "hits",
            "fail",
            "pass",
            "unresolved",
            "time",
            "status",
        ];

        let mut rows: Vec<Vec<String>> = self
            .records
            .iter()
            .map(|r| {
                vec![
                    r.reducer.clone(),
                    r.input.clone(),
                    r.cache.clone(),
                    r.initial_size.to_string(),
                    r.final_size.to_string(),
                    format!("{:.2}", r.reduction_ratio()),
                    r.queries.to_string(),
                    r.cache_hits.to_string(),
                    r.fail.to_string(),
                    r.pass.to_string(),
                    r.unresolved.to_string(),
                    format!("{:.3}s", r.duration_secs),
                    r.status.to_string(),
                ]
            })
            .collect();

        let mut headers: Vec<&str> = HEADERS.to_vec();
        if drop_uniform_columns && rows.len() > 1 {
            // Only the identifying columns are candidates for dropping.
            for column in (0..3).rev() {
                let uniform = rows.iter().all(|row| row[column] == rows[0][column]);
                if uniform {
                    headers.remove(column);
                    for row in &mut rows {
                        row.remove(column);
                    }
                }
            }
        }

        let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.len());
            }
        }

        let mut out = String::new();
        for (i, header) in headers.iter().enumerate() {
            if i > 0 {
                out.push_str("  ");
            }
            out.push_str(&format!("{:<width$}", header, width = widths[i]));
        }
        out.push('\n');
        for (i, width) in widths.iter().enumerate() {
            if i > 0 {
                out.push_str("  ");
            }
            out.push_str(&"-".repeat(*width));
        }
        out.push('\n');
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                if i > 0 {
                    out.push_str("  ");
                }
                out.push_str(&format!("{:<width$}", cell, width = widths[i]));
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(reducer: &str, input: &str, initial: usize, final_size: usize) -> RunRecord {
        RunRecord {
            reducer: reducer.to_string(),
            input: input.to_string(),
            cache: "hash".to_string(),
            initial_size: initial,
            final_size,
            queries: 12,
            cache_hits: 4,
            fail: 3,
            pass: 8,
            unresolved: 1,
            duration_secs: 0.0421,
            status: Status::Completed,
        }
    }

    #[test]
    fn reduction_ratio_definition() {
        assert_eq!(sample("ddmin", "a", 10, 3).reduction_ratio(), 0.7);
        assert_eq!(sample("ddmin", "a", 0, 0).reduction_ratio(), 1.0);
        assert_eq!(sample("ddmin", "a", 5, 5).reduction_ratio(), 0.0);
    }

    #[test]
    fn json_round_trip() {
        let mut set = RecordSet::new();
        set.add(sample("ddmin", "input-1", 20, 4));
        set.add(sample("tictocmin", "input-1", 20, 5));
        let json = serde_json::to_string(&set).unwrap();
        let back: RecordSet = serde_json::from_str(&json).unwrap();
        assert_eq!(set, back);
    }

    #[test]
    fn table_keeps_varying_columns() {
        let mut set = RecordSet::new();
        set.add(sample("ddmin", "input-1", 20, 4));
        set.add(sample("tictocmin", "input-1", 20, 5));
        let table = set.to_table(true);
        // Reducer varies, so it stays; input and cache are uniform and go.
        assert!(table.contains("reducer"));
        assert!(!table.contains("input-1"));
        assert!(table.contains("ddmin"));
        assert!(table.contains("tictocmin"));
        assert!(table.contains("0.80"));
    }

    #[test]
    fn table_without_dropping_shows_everything() {
        let mut set = RecordSet::new();
        set.add(sample("ddmin", "input-1", 20, 4));
        let table = set.to_table(false);
        assert!(table.contains("input-1"));
        assert!(table.contains("hash"));
        assert!(table.contains("completed"));
    }

    #[test]
    fn store_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        let mut set = RecordSet::new();
        set.add(sample("probdd", "corpus/a.bin", 100, 7));
        set.store(&path).unwrap();
        let back = RecordSet::load(&path).unwrap();
        assert_eq!(set, back);
    }

    #[test]
    fn load_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(RecordSet::load(dir.path().join("absent.json")).is_err());
    }
}
