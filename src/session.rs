//! The oracle boundary of a reduction run.
//!
//! Every candidate a reducer wants evaluated goes through
//! [`Session::test`]: the one place that consults the verdict cache,
//! invokes the oracle, keeps the counters, and checks the cancellation
//! token and the wall-clock budget. Reducer control flow is pure
//! CPU-bound code between `test` calls.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::VerdictCache;
use crate::config::ReduceConfig;
use crate::input::Input;
use crate::oracle::{guarded_query, Oracle};
use crate::subset::Subset;
use crate::verdict::Verdict;

/// Cooperative cancellation signal, checked at every oracle boundary.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; the run returns its best configuration so
    /// far at the next oracle boundary.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Why a run stopped before its reducer finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    /// The cancellation token fired.
    Cancelled,
    /// The wall-clock budget ran out.
    TimedOut,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// The reducer ran to completion.
    #[serde(rename = "completed")]
    Completed,
    /// The cancellation token fired mid-run.
    #[serde(rename = "cancelled")]
    Cancelled,
    /// The wall-clock budget ran out mid-run.
    #[serde(rename = "timeout")]
    Timeout,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Completed => write!(f, "completed"),
            Status::Cancelled => write!(f, "cancelled"),
            Status::Timeout => write!(f, "timeout"),
        }
    }
}

/// Monotonic per-run counters, frozen when the run ends.
///
/// `queries` and the verdict tallies count actual oracle invocations;
/// candidates answered from the cache appear in `cache_hits` only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Counters {
    /// Oracle invocations.
    pub queries: u64,
    /// Candidates answered from the cache.
    pub cache_hits: u64,
    /// Cache lookups that went on to the oracle.
    pub cache_misses: u64,
    /// FAIL verdicts from the oracle.
    pub fail: u64,
    /// PASS verdicts from the oracle.
    pub pass: u64,
    /// UNRESOLVED verdicts from the oracle.
    pub unresolved: u64,
    /// Contradicting verdicts observed for cached candidates.
    pub inconsistencies: u64,
}

/// One reduction run's private channel to the oracle.
pub struct Session<'a, I: Input, O: Oracle<I::Rendered>> {
    input: &'a I,
    oracle: O,
    cache: Option<Box<dyn VerdictCache>>,
    cache_name: &'static str,
    counters: Counters,
    cancel: CancelToken,
    deadline: Option<Instant>,
    best_failing: Option<Subset>,
}

impl<'a, I: Input, O: Oracle<I::Rendered>> Session<'a, I, O> {
    /// Wire up a session from a validated configuration.
    pub fn new(input: &'a I, oracle: O, config: &ReduceConfig, cancel: CancelToken) -> Self {
        let cache = config
            .cache_enabled
            .then(|| config.cache_kind.build(config.cache_capacity));
        let cache_name = match &cache {
            Some(c) => c.name(),
            None => "none",
        };
        Self {
            input,
            oracle,
            cache,
            cache_name,
            counters: Counters::default(),
            cancel,
            deadline: config.time_budget.map(|budget| Instant::now() + budget),
            best_failing: None,
        }
    }

    /// Evaluate one candidate configuration.
    ///
    /// Returns the cached verdict when the candidate was already tried;
    /// otherwise invokes the oracle exactly once and memoizes the
    /// answer. Interrupts fire here and nowhere else.
    pub fn test(&mut self, subset: &Subset) -> Result<Verdict, Interrupt> {
        if self.cancel.is_cancelled() {
            return Err(Interrupt::Cancelled);
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(Interrupt::TimedOut);
            }
        }

        let fp = self.input.fingerprint(subset);
        if let Some(cache) = &mut self.cache {
            if let Some(verdict) = cache.lookup(&fp) {
                debug!(size = subset.len(), verdict = %verdict, "cache hit");
                if verdict.is_fail() {
                    self.best_failing = Some(subset.clone());
                }
                return Ok(verdict);
            }
        }

        let rendered = self.input.materialize(subset);
        self.counters.queries += 1;
        let verdict = guarded_query(&mut self.oracle, &rendered);
        debug!(size = subset.len(), verdict = %verdict, "oracle query");
        match verdict {
            Verdict::Fail => self.counters.fail += 1,
            Verdict::Pass => self.counters.pass += 1,
            Verdict::Unresolved => self.counters.unresolved += 1,
        }
        if verdict.is_fail() {
            self.best_failing = Some(subset.clone());
        }
        if let Some(cache) = &mut self.cache {
            cache.store(fp, verdict);
        }
        Ok(verdict)
    }

    /// The most recent configuration the oracle classified as FAIL.
    pub fn best_failing(&self) -> Option<&Subset> {
        self.best_failing.as_ref()
    }

    /// Name of the cache in use ("none" when disabled).
    pub fn cache_name(&self) -> &'static str {
        self.cache_name
    }

    /// Freeze the counters, folding in the cache's own tallies.
    pub fn finish(mut self) -> (Counters, Option<Subset>) {
        if let Some(cache) = &self.cache {
            self.counters.cache_hits = cache.hits();
            self.counters.cache_misses = cache.misses();
            self.counters.inconsistencies = cache.inconsistencies();
        }
        (self.counters, self.best_failing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::StringInput;
    use std::time::Duration;

    fn contains_x(s: &String) -> Verdict {
        if s.contains('x') {
            Verdict::Fail
        } else {
            Verdict::Pass
        }
    }

    #[test]
    fn memoizes_repeat_candidates() {
        let input = StringInput::chars("axb");
        let mut calls = 0u64;
        let oracle = |s: &String| {
            calls += 1;
            contains_x(s)
        };
        let config = ReduceConfig::default();
        let mut session = Session::new(&input, oracle, &config, CancelToken::new());
        let s = Subset::from_indices(vec![1]);
        assert_eq!(session.test(&s), Ok(Verdict::Fail));
        assert_eq!(session.test(&s), Ok(Verdict::Fail));
        let (counters, best) = session.finish();
        assert_eq!(counters.queries, 1);
        assert_eq!(counters.cache_hits, 1);
        assert_eq!(counters.cache_misses, 1);
        assert_eq!(counters.fail, 1);
        assert_eq!(best, Some(s));
        assert_eq!(calls, 1);
    }

    #[test]
    fn disabled_cache_reinvokes_oracle() {
        let input = StringInput::chars("x");
        let mut calls = 0u64;
        let oracle = |s: &String| {
            calls += 1;
            contains_x(s)
        };
        let config = ReduceConfig::default().without_cache();
        let mut session = Session::new(&input, oracle, &config, CancelToken::new());
        assert_eq!(session.cache_name(), "none");
        let s = Subset::full(1);
        session.test(&s).unwrap();
        session.test(&s).unwrap();
        let (counters, _) = session.finish();
        assert_eq!(counters.queries, 2);
        assert_eq!(counters.cache_hits, 0);
        assert_eq!(calls, 2);
    }

    #[test]
    fn cancellation_interrupts_before_querying() {
        let input = StringInput::chars("x");
        let cancel = CancelToken::new();
        cancel.cancel();
        let config = ReduceConfig::default();
        let mut session = Session::new(&input, contains_x, &config, cancel);
        assert_eq!(session.test(&Subset::full(1)), Err(Interrupt::Cancelled));
        let (counters, _) = session.finish();
        assert_eq!(counters.queries, 0);
    }

    #[test]
    fn exhausted_budget_interrupts() {
        let input = StringInput::chars("x");
        let config = ReduceConfig::default().with_time_budget(Duration::ZERO);
        let mut session = Session::new(&input, contains_x, &config, CancelToken::new());
        assert_eq!(session.test(&Subset::full(1)), Err(Interrupt::TimedOut));
    }

    #[test]
    fn panicking_oracle_counts_unresolved() {
        let input = StringInput::chars("ab");
        let oracle = |_: &String| -> Verdict { panic!("boom") };
        let config = ReduceConfig::default();
        let mut session = Session::new(&input, oracle, &config, CancelToken::new());
        assert_eq!(session.test(&Subset::full(2)), Ok(Verdict::Unresolved));
        let (counters, best) = session.finish();
        assert_eq!(counters.unresolved, 1);
        assert!(best.is_none());
    }

    #[test]
    fn status_serializes_to_schema_names() {
        assert_eq!(serde_json::to_string(&Status::Completed).unwrap(), "\"completed\"");
        assert_eq!(serde_json::to_string(&Status::Cancelled).unwrap(), "\"cancelled\"");
        assert_eq!(serde_json::to_string(&Status::Timeout).unwrap(), "\"timeout\"");
    }
}
