//! Run configuration for reducers and the harness.

use std::time::Duration;

use crate::cache::CacheKind;

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// `probdd.tau` must lie strictly between 0 and 1.
    InvalidTau(f64),
    /// `probdd.epsilon` must lie strictly between 0 and 0.5.
    InvalidEpsilon(f64),
    /// An explicit stall limit must be at least 1.
    InvalidStallLimit(usize),
    /// A cache capacity of zero cannot hold any entry.
    InvalidCacheCapacity,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidTau(tau) => {
                write!(f, "Invalid probdd.tau: {} (must be in (0, 1))", tau)
            }
            ConfigError::InvalidEpsilon(eps) => {
                write!(f, "Invalid probdd.epsilon: {} (must be in (0, 0.5))", eps)
            }
            ConfigError::InvalidStallLimit(k) => {
                write!(f, "Invalid probdd.stall_k: {} (must be >= 1)", k)
            }
            ConfigError::InvalidCacheCapacity => {
                write!(f, "Invalid cache capacity (must be >= 1)")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// How ProbDD picks its trial subset each iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialPolicy {
    /// Include each unpinned atom independently with probability
    /// `1 - p`, drawn from the seeded RNG. An empty draw falls back to
    /// the single least-likely-required atom.
    IndependentSample,
    /// Deterministic: order atoms by ascending `p` (ties by index) and
    /// extend the prefix while the joint removal probability stays at
    /// least `1 - tau`.
    GreedyPrefix,
}

/// Which sequence reducer HDD runs at each level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InnerReducer {
    DdMin,
    TicTocMin,
}

impl InnerReducer {
    /// Stable display name, used in composed algorithm names.
    pub fn name(&self) -> &'static str {
        match self {
            InnerReducer::DdMin => "ddmin",
            InnerReducer::TicTocMin => "tictocmin",
        }
    }
}

/// ProbDD tuning knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbDdConfig {
    /// Threshold for the greedy-prefix trial policy.
    pub tau: f64,
    /// Pinning margin: an atom with `p >= 1 - epsilon` is treated as
    /// required for the rest of the run.
    pub epsilon: f64,
    /// Give up after this many consecutive iterations without progress.
    /// `None` means `2 * n` for an input of `n` atoms.
    pub stall_k: Option<usize>,
    /// Trial subset selection policy.
    pub policy: TrialPolicy,
}

impl Default for ProbDdConfig {
    fn default() -> Self {
        Self {
            tau: 0.7,
            epsilon: 1e-3,
            stall_k: None,
            policy: TrialPolicy::IndependentSample,
        }
    }
}

/// HDD tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HddConfig {
    /// The per-level sequence reducer.
    pub inner: InnerReducer,
}

impl Default for HddConfig {
    fn default() -> Self {
        Self {
            inner: InnerReducer::DdMin,
        }
    }
}

/// Configuration for one reduction run.
#[derive(Debug, Clone)]
pub struct ReduceConfig {
    /// Whether to memoize oracle verdicts. On by default.
    pub cache_enabled: bool,
    /// Which cache implementation to use when enabled.
    pub cache_kind: CacheKind,
    /// Optional entry cap for the hash cache (LRU beyond it).
    pub cache_capacity: Option<usize>,
    /// Optional wall-clock limit for the whole run, checked at every
    /// oracle boundary.
    pub time_budget: Option<Duration>,
    /// Seed for every stochastic choice a reducer makes. Runs with the
    /// same seed are fully deterministic; `None` uses a fixed default.
    pub seed: Option<u64>,
    /// ProbDD knobs.
    pub probdd: ProbDdConfig,
    /// HDD knobs.
    pub hdd: HddConfig,
}

impl Default for ReduceConfig {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            cache_kind: CacheKind::Hash,
            cache_capacity: None,
            time_budget: None,
            seed: None,
            probdd: ProbDdConfig::default(),
            hdd: HddConfig::default(),
        }
    }
}

impl ReduceConfig {
    /// Limit the run to `budget` of wall-clock time.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    /// Fix the seed for stochastic reducers.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Disable verdict memoization.
    pub fn without_cache(mut self) -> Self {
        self.cache_enabled = false;
        self
    }

    /// Select the cache implementation.
    pub fn with_cache_kind(mut self, kind: CacheKind) -> Self {
        self.cache_kind = kind;
        self
    }

    /// Check every knob for internal consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.probdd.tau > 0.0 && self.probdd.tau < 1.0) {
            return Err(ConfigError::InvalidTau(self.probdd.tau));
        }
        if !(self.probdd.epsilon > 0.0 && self.probdd.epsilon < 0.5) {
            return Err(ConfigError::InvalidEpsilon(self.probdd.epsilon));
        }
        if let Some(k) = self.probdd.stall_k {
            if k == 0 {
                return Err(ConfigError::InvalidStallLimit(k));
            }
        }
        if self.cache_capacity == Some(0) {
            return Err(ConfigError::InvalidCacheCapacity);
        }
        Ok(())
    }
}
