//! # Deltamin - Delta Debugging for Rust
//!
//! Deltamin isolates a minimal failure-inducing input: given an input
//! that makes some oracle report FAIL, it searches for a locally
//! minimal sub-input that still fails. It ships the classical `ddmin`
//! bisection algorithm, the bidirectional `TicTocMin` variant,
//! hierarchical reduction over parse trees (`HDD`), and probabilistic
//! delta debugging (`ProbDD`), all driving the oracle through a shared
//! verdict cache, plus a benchmark harness that replays deterministic
//! oracles and records per-run counters.
//!
//! ## Quick Start
//!
//! ```rust
//! use deltamin::{reduce, Algorithm, ReduceConfig, StringInput, Verdict};
//!
//! let input = StringInput::chars("xxxabcxxx");
//! let oracle = |candidate: &String| {
//!     if candidate.contains("abc") {
//!         Verdict::Fail
//!     } else {
//!         Verdict::Pass
//!     }
//! };
//!
//! let result = reduce(&input, oracle, Algorithm::DdMin, &ReduceConfig::default()).unwrap();
//! assert_eq!(result.output, "abc");
//! ```

// Public modules
pub mod benchmark;
pub mod cache;
pub mod config;
pub mod error;
pub mod input;
pub mod oracle;
pub mod record;
pub mod reducers;
pub mod runner;
pub mod session;
pub mod subset;
pub mod tree;
pub mod verdict;

// Re-export the main public API
pub use benchmark::{Benchmark, TestCase};
pub use cache::{CacheKind, HashCache, TreeCache, VerdictCache};
pub use config::{ConfigError, HddConfig, InnerReducer, ProbDdConfig, ReduceConfig, TrialPolicy};
pub use error::ReduceError;
pub use input::{BytesInput, Granularity, Hierarchy, Input, ListInput, StringInput};
pub use oracle::Oracle;
pub use record::{RecordSet, RunRecord};
pub use reducers::{Algorithm, DdMin, Hdd, ProbDd, TicTocMin};
pub use runner::{reduce, reduce_with_cancel, Reduction};
pub use session::{CancelToken, Counters, Interrupt, Session, Status};
pub use subset::{Fingerprint, Subset};
pub use tree::{Node, TreeModel};
pub use verdict::Verdict;
