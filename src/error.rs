//! Errors a reduction run can surface to its caller.
//!
//! Most trouble during a run is absorbed locally: oracle failures and
//! invalid candidates become UNRESOLVED verdicts, timeouts and
//! cancellation end the run with its best configuration so far. Only
//! the errors below abort a run outright.

use std::fmt;

use crate::config::ConfigError;
use crate::verdict::Verdict;

/// A reduction run could not start or had to abort.
#[derive(Debug)]
pub enum ReduceError {
    /// The full initial input did not reproduce the failure, so there
    /// is nothing to minimize.
    ContractViolation {
        /// What the oracle said about the full input.
        verdict: Verdict,
    },
    /// The chosen algorithm cannot run on this input shape, e.g.
    /// hierarchical reduction on a flat sequence.
    UnsupportedInput {
        /// Name of the rejected algorithm.
        algorithm: String,
    },
    /// The configuration failed validation.
    Config(ConfigError),
}

impl fmt::Display for ReduceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReduceError::ContractViolation { verdict } => {
                write!(
                    f,
                    "Initial input does not reproduce the failure (oracle said {})",
                    verdict
                )
            }
            ReduceError::UnsupportedInput { algorithm } => {
                write!(f, "Algorithm {} requires a hierarchical input", algorithm)
            }
            ReduceError::Config(err) => write!(f, "Configuration error: {}", err),
        }
    }
}

impl std::error::Error for ReduceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReduceError::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for ReduceError {
    fn from(err: ConfigError) -> Self {
        ReduceError::Config(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_violation_display() {
        let err = ReduceError::ContractViolation {
            verdict: Verdict::Pass,
        };
        assert_eq!(
            err.to_string(),
            "Initial input does not reproduce the failure (oracle said PASS)"
        );
    }

    #[test]
    fn config_error_is_source() {
        use std::error::Error;
        let err = ReduceError::from(ConfigError::InvalidCacheCapacity);
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("Configuration error:"));
    }
}
