//! Oracle verdicts for candidate inputs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification of a candidate input by an oracle.
///
/// `Fail` means the failure of interest reproduces on the candidate;
/// `Pass` means it does not. `Unresolved` covers every candidate the
/// oracle could not evaluate meaningfully: syntactically invalid input,
/// a tool crash unrelated to the failure, or an abandoned (timed-out)
/// evaluation. Reducers treat `Unresolved` as non-progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    /// The failure reproduces.
    Fail,
    /// The failure does not reproduce.
    Pass,
    /// The candidate could not be evaluated meaningfully.
    Unresolved,
}

impl Verdict {
    /// Whether this verdict counts as a successful reproduction.
    pub fn is_fail(self) -> bool {
        matches!(self, Verdict::Fail)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Fail => write!(f, "FAIL"),
            Verdict::Pass => write!(f, "PASS"),
            Verdict::Unresolved => write!(f, "UNRESOLVED"),
        }
    }
}
