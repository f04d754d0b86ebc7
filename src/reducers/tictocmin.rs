//! Bidirectional sweep reduction.

use tracing::debug;

use crate::session::Interrupt;
use crate::subset::Subset;
use crate::verdict::Verdict;

/// The TicTocMin reducer.
///
/// Alternates a forward sweep (removing leading blocks) with a backward
/// sweep (removing trailing blocks) at a block size that only ever
/// shrinks. Real-world failure triggers tend to cluster near one end of
/// the input; sweeping from both ends exploits that locality without
/// re-testing symmetric complements. A terminal block-size-1 pass over
/// both directions leaves the result 1-minimal.
pub struct TicTocMin;

impl TicTocMin {
    /// Minimize `config`, which must FAIL on entry.
    ///
    /// UNRESOLVED candidates are treated as non-FAIL for progress; the
    /// session keeps their separate tally.
    pub fn reduce<P>(&self, mut config: Subset, probe: &mut P) -> Result<Subset, Interrupt>
    where
        P: FnMut(&Subset) -> Result<Verdict, Interrupt>,
    {
        if config.is_empty() {
            return Ok(config);
        }

        let mut block = (config.len() / 2).max(1);
        loop {
            let mut committed = false;

            // Tic: walk a window from the front. A committed removal
            // leaves the window in place over the atoms that slid into
            // it.
            let mut pos = 0;
            while pos < config.len() {
                let window = config.window(pos, block);
                let candidate = config.difference(&window);
                if probe(&candidate)? == Verdict::Fail {
                    debug!(block, removed = window.len(), "removed leading block");
                    config = candidate;
                    committed = true;
                } else {
                    pos += block;
                }
            }

            // Toc: the same walk from the back.
            let mut offset = 0;
            while offset < config.len() {
                let end = config.len() - offset;
                let start = end.saturating_sub(block);
                let window = config.window(start, end - start);
                let candidate = config.difference(&window);
                if probe(&candidate)? == Verdict::Fail {
                    debug!(block, removed = window.len(), "removed trailing block");
                    config = candidate;
                    committed = true;
                } else {
                    offset += block;
                }
            }

            if !committed {
                if block == 1 {
                    break;
                }
                block /= 2;
                debug!(block, "halving block size");
            }
        }

        Ok(config)
    }
}
