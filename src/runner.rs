//! Top-level entry points: wire an input, an oracle, and an algorithm
//! together and run one reduction.

use std::time::{Duration, Instant};

use tracing::info;

use crate::config::ReduceConfig;
use crate::error::ReduceError;
use crate::input::Input;
use crate::oracle::Oracle;
use crate::reducers::{Algorithm, DdMin, Hdd, ProbDd, TicTocMin};
use crate::session::{CancelToken, Counters, Interrupt, Session, Status};
use crate::subset::Subset;
use crate::verdict::Verdict;

/// Seed used when the configuration does not fix one. Runs stay
/// deterministic either way.
const DEFAULT_SEED: u64 = 0;

/// Everything a finished run reports.
#[derive(Debug)]
pub struct Reduction<R> {
    /// The materialized minimal candidate.
    pub output: R,
    /// The minimal configuration as an index set.
    pub subset: Subset,
    /// Atom count of the initial input.
    pub initial_size: usize,
    /// Atom count of the result.
    pub final_size: usize,
    /// How the run ended.
    pub status: Status,
    /// Frozen run counters.
    pub counters: Counters,
    /// Wall-clock time of the run.
    pub duration: Duration,
    /// Name of the cache used ("none" when disabled).
    pub cache_name: &'static str,
}

/// Run one reduction to completion (or until its time budget ends).
///
/// The full input must reproduce the failure; anything else is a
/// [`ReduceError::ContractViolation`]. On success the returned
/// configuration still FAILs and is as small as the algorithm's
/// minimality guarantee allows.
pub fn reduce<I, O>(
    input: &I,
    oracle: O,
    algorithm: Algorithm,
    config: &ReduceConfig,
) -> Result<Reduction<I::Rendered>, ReduceError>
where
    I: Input,
    O: Oracle<I::Rendered>,
{
    reduce_with_cancel(input, oracle, algorithm, config, CancelToken::new())
}

/// Like [`reduce`], with a caller-held cancellation token.
///
/// Cancellation is checked at every oracle boundary; a cancelled run
/// returns its best failing configuration so far with
/// [`Status::Cancelled`] rather than an error.
pub fn reduce_with_cancel<I, O>(
    input: &I,
    oracle: O,
    algorithm: Algorithm,
    config: &ReduceConfig,
    cancel: CancelToken,
) -> Result<Reduction<I::Rendered>, ReduceError>
where
    I: Input,
    O: Oracle<I::Rendered>,
{
    config.validate()?;
    let started = Instant::now();
    let mut session = Session::new(input, oracle, config, cancel);
    let full = Subset::full(input.len());

    match session.test(&full) {
        Ok(Verdict::Fail) => {}
        Ok(verdict) => return Err(ReduceError::ContractViolation { verdict }),
        Err(interrupt) => {
            // Stopped before the failure was even confirmed; hand back
            // the untouched input.
            return Ok(finish(input, session, full.clone(), full, interrupted(interrupt), started));
        }
    }

    let seed = config.seed.unwrap_or(DEFAULT_SEED);
    let result = match algorithm {
        Algorithm::DdMin => {
            let mut probe = |s: &Subset| session.test(s);
            DdMin.reduce(full.clone(), &mut probe)
        }
        Algorithm::TicTocMin => {
            let mut probe = |s: &Subset| session.test(s);
            TicTocMin.reduce(full.clone(), &mut probe)
        }
        Algorithm::ProbDd => {
            let mut probe = |s: &Subset| session.test(s);
            ProbDd::new(&config.probdd, seed).reduce(full.clone(), &mut probe)
        }
        Algorithm::Hdd(inner) => {
            let hierarchy = input.hierarchy().ok_or_else(|| ReduceError::UnsupportedInput {
                algorithm: algorithm.name(),
            })?;
            let mut probe = |s: &Subset| session.test(s);
            Hdd::new(inner).reduce(hierarchy, full.clone(), &mut probe)
        }
    };

    let (final_subset, status) = match result {
        Ok(subset) => (subset, Status::Completed),
        Err(interrupt) => {
            let best = session.best_failing().cloned().unwrap_or_else(|| full.clone());
            (best, interrupted(interrupt))
        }
    };

    info!(
        algorithm = %algorithm,
        initial_size = input.len(),
        final_size = final_subset.len(),
        status = %status,
        "reduction finished"
    );
    Ok(finish(input, session, full, final_subset, status, started))
}

fn interrupted(interrupt: Interrupt) -> Status {
    match interrupt {
        Interrupt::Cancelled => Status::Cancelled,
        Interrupt::TimedOut => Status::Timeout,
    }
}

fn finish<I, O>(
    input: &I,
    session: Session<'_, I, O>,
    full: Subset,
    final_subset: Subset,
    status: Status,
    started: Instant,
) -> Reduction<I::Rendered>
where
    I: Input,
    O: Oracle<I::Rendered>,
{
    let cache_name = session.cache_name();
    let (counters, _) = session.finish();
    let output = input.materialize(&final_subset);
    Reduction {
        output,
        initial_size: full.len(),
        final_size: final_subset.len(),
        subset: final_subset,
        status,
        counters,
        duration: started.elapsed(),
        cache_name,
    }
}
