//! Classical delta debugging by recursive bisection.

use tracing::debug;

use crate::session::Interrupt;
use crate::subset::Subset;
use crate::verdict::Verdict;

/// The ddmin reducer.
///
/// Partitions the current configuration into `g` contiguous blocks,
/// first trying each block as the whole candidate, then each block's
/// complement, doubling the granularity when neither makes progress.
/// The result is 1-minimal: removing any single remaining atom no
/// longer reproduces the failure.
pub struct DdMin;

impl DdMin {
    /// Minimize `config`, which must FAIL on entry.
    ///
    /// UNRESOLVED candidates count as non-progress, exactly like PASS.
    pub fn reduce<P>(&self, mut config: Subset, probe: &mut P) -> Result<Subset, Interrupt>
    where
        P: FnMut(&Subset) -> Result<Verdict, Interrupt>,
    {
        let mut g = 2usize;

        'step: while config.len() >= 2 {
            let blocks = config.partition(g);

            // Reduce to subset: a failing block becomes the new
            // configuration at minimum granularity.
            for block in &blocks {
                if probe(block)? == Verdict::Fail {
                    debug!(granularity = g, size = block.len(), "reduced to block");
                    config = block.clone();
                    g = 2;
                    continue 'step;
                }
            }

            // Reduce to complement.
            for block in &blocks {
                let complement = config.difference(block);
                if probe(&complement)? == Verdict::Fail {
                    debug!(granularity = g, size = complement.len(), "reduced to complement");
                    config = complement;
                    g = (g - 1).max(2);
                    continue 'step;
                }
            }

            // Increase granularity.
            if g < config.len() {
                g = (2 * g).min(config.len());
                debug!(granularity = g, "increasing granularity");
                continue 'step;
            }
            break;
        }

        // A lone surviving atom still needs its removal checked for the
        // 1-minimality guarantee.
        if config.len() == 1 && probe(&Subset::empty())? == Verdict::Fail {
            config = Subset::empty();
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run<F>(n: usize, oracle: F) -> (Subset, u64)
    where
        F: Fn(&Subset) -> Verdict,
    {
        let mut probes = 0u64;
        let mut probe = |s: &Subset| {
            probes += 1;
            Ok(oracle(s))
        };
        let result = DdMin.reduce(Subset::full(n), &mut probe).unwrap();
        (result, probes)
    }

    #[test]
    fn isolates_single_atom() {
        let (result, _) = run(16, |s| {
            if s.contains(9) {
                Verdict::Fail
            } else {
                Verdict::Pass
            }
        });
        assert_eq!(result.as_slice(), &[9]);
    }

    #[test]
    fn isolates_disjoint_pair() {
        let (result, _) = run(8, |s| {
            if s.contains(2) && s.contains(5) {
                Verdict::Fail
            } else {
                Verdict::Pass
            }
        });
        assert_eq!(result.as_slice(), &[2, 5]);
    }

    #[test]
    fn keeps_everything_when_all_required() {
        let (result, _) = run(5, |s| {
            if s.len() == 5 {
                Verdict::Fail
            } else {
                Verdict::Pass
            }
        });
        assert_eq!(result.len(), 5);
    }

    #[test]
    fn reduces_to_empty_when_empty_fails() {
        let (result, _) = run(4, |_| Verdict::Fail);
        assert!(result.is_empty());
    }

    #[test]
    fn unresolved_is_non_progress() {
        // Nothing below the full set resolves, so nothing is removed.
        let (result, _) = run(6, |s| {
            if s.len() == 6 {
                Verdict::Fail
            } else {
                Verdict::Unresolved
            }
        });
        assert_eq!(result.len(), 6);
    }

    #[test]
    fn probe_count_stays_quadratic() {
        let n = 32;
        let (_, probes) = run(n, |s| {
            if s.contains(7) && s.contains(20) {
                Verdict::Fail
            } else {
                Verdict::Pass
            }
        });
        assert!(probes <= 2 * (n as u64) * (n as u64));
    }

    #[test]
    fn result_is_one_minimal() {
        let oracle = |s: &Subset| {
            if s.contains(1) && s.contains(4) && s.contains(11) {
                Verdict::Fail
            } else {
                Verdict::Pass
            }
        };
        let mut probe = |s: &Subset| Ok(oracle(s));
        let result = DdMin.reduce(Subset::full(12), &mut probe).unwrap();
        assert_eq!(oracle(&result), Verdict::Fail);
        for atom in result.iter() {
            let smaller = result.difference(&Subset::from_indices(vec![atom]));
            assert_ne!(oracle(&smaller), Verdict::Fail);
        }
    }

    #[test]
    fn interrupt_propagates() {
        let mut probe = |_: &Subset| Err(Interrupt::Cancelled);
        assert_eq!(
            DdMin.reduce(Subset::full(4), &mut probe),
            Err(Interrupt::Cancelled)
        );
    }
}
