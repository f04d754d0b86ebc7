//! The delta debugging algorithm family.
//!
//! Every sequence reducer has the same shape: it owns no state across
//! runs, takes an initial configuration known to FAIL, and drives a
//! probe callback until the configuration is locally minimal. The
//! probe is the only suspension point; it reports interrupts
//! (cancellation, exhausted budget) which reducers propagate with `?`.

mod ddmin;
mod hdd;
mod probdd;
mod tictocmin;

pub use ddmin::DdMin;
pub use hdd::Hdd;
pub use probdd::ProbDd;
pub use tictocmin::TicTocMin;

use crate::config::InnerReducer;

/// Selects which reducer a run or benchmark cell uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// Classical recursive bisection ([`DdMin`]).
    DdMin,
    /// Bidirectional sweep variant ([`TicTocMin`]).
    TicTocMin,
    /// Probability-driven reduction ([`ProbDd`]).
    ProbDd,
    /// Hierarchical reduction over a tree input ([`Hdd`]), running the
    /// given sequence reducer at each level.
    Hdd(InnerReducer),
}

impl Algorithm {
    /// Stable display name, used in benchmark records.
    pub fn name(&self) -> String {
        match self {
            Algorithm::DdMin => "ddmin".to_string(),
            Algorithm::TicTocMin => "tictocmin".to_string(),
            Algorithm::ProbDd => "probdd".to_string(),
            Algorithm::Hdd(inner) => format!("hdd({})", inner.name()),
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
