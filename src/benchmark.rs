//! The benchmark harness: a matrix of (reducer, cache) cells per test
//! case, each cell one independent reduction run.
//!
//! Cells never share state: every run gets a fresh cache, because
//! oracles are allowed to own external side effects. The harness only
//! collects records; interpreting them is downstream work.

use tracing::info;

use crate::cache::CacheKind;
use crate::config::ReduceConfig;
use crate::error::ReduceError;
use crate::input::Input;
use crate::record::{RecordSet, RunRecord};
use crate::reducers::Algorithm;
use crate::runner::reduce;
use crate::verdict::Verdict;

/// One input with the reducers and caches to run it under.
pub struct TestCase<I: Input> {
    id: String,
    input: I,
    algorithms: Vec<Algorithm>,
    caches: Vec<Option<CacheKind>>,
    oracle: Box<dyn Fn(&I::Rendered) -> Verdict>,
}

impl<I: Input> TestCase<I> {
    /// A case running `algorithms` against `oracle`, with the default
    /// hash cache.
    pub fn new<F>(id: &str, input: I, algorithms: Vec<Algorithm>, oracle: F) -> Self
    where
        F: Fn(&I::Rendered) -> Verdict + 'static,
    {
        Self {
            id: id.to_string(),
            input,
            algorithms,
            caches: vec![Some(CacheKind::Hash)],
            oracle: Box::new(oracle),
        }
    }

    /// Override the cache column of the matrix. `None` entries run the
    /// cell without memoization.
    pub fn with_caches(mut self, caches: Vec<Option<CacheKind>>) -> Self {
        self.caches = caches;
        self
    }
}

/// Runs test cases and collects one record per cell.
pub struct Benchmark<I: Input> {
    cases: Vec<TestCase<I>>,
    config: ReduceConfig,
    records: RecordSet,
}

impl<I: Input> Benchmark<I> {
    pub fn new(cases: Vec<TestCase<I>>) -> Self {
        Self::with_config(cases, ReduceConfig::default())
    }

    /// Use `config` for every cell; `time_budget` bounds each cell
    /// individually.
    pub fn with_config(cases: Vec<TestCase<I>>, config: ReduceConfig) -> Self {
        Self {
            cases,
            config,
            records: RecordSet::new(),
        }
    }

    /// Run the whole matrix, appending one record per cell.
    pub fn run(&mut self) -> Result<&RecordSet, ReduceError> {
        let mut fresh = Vec::new();
        for case in &self.cases {
            for &algorithm in &case.algorithms {
                for &cache in &case.caches {
                    let reduction = reduce(
                        &case.input,
                        |r: &I::Rendered| (case.oracle)(r),
                        algorithm,
                        &cell_config(&self.config, cache),
                    )?;
                    info!(
                        case = %case.id,
                        algorithm = %algorithm,
                        final_size = reduction.final_size,
                        "benchmark cell finished"
                    );
                    fresh.push(RunRecord::from_reduction(&algorithm.name(), &case.id, &reduction));
                }
            }
        }
        for record in fresh {
            self.records.add(record);
        }
        Ok(&self.records)
    }

    /// Run every cell and check soundness only: does the reduced
    /// candidate still reproduce the failure? Nothing is recorded.
    pub fn validate(&self) -> Result<Vec<bool>, ReduceError> {
        let mut results = Vec::new();
        for case in &self.cases {
            for &algorithm in &case.algorithms {
                for &cache in &case.caches {
                    let reduction = reduce(
                        &case.input,
                        |r: &I::Rendered| (case.oracle)(r),
                        algorithm,
                        &cell_config(&self.config, cache),
                    )?;
                    results.push((case.oracle)(&reduction.output) == Verdict::Fail);
                }
            }
        }
        Ok(results)
    }

    /// Records collected so far.
    pub fn records(&self) -> &RecordSet {
        &self.records
    }
}

fn cell_config(base: &ReduceConfig, cache: Option<CacheKind>) -> ReduceConfig {
    let mut config = base.clone();
    match cache {
        Some(kind) => {
            config.cache_enabled = true;
            config.cache_kind = kind;
        }
        None => config.cache_enabled = false,
    }
    config
}
