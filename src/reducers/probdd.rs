//! Probabilistic delta debugging.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::config::{ProbDdConfig, TrialPolicy};
use crate::reducers::DdMin;
use crate::session::Interrupt;
use crate::subset::Subset;
use crate::verdict::Verdict;

/// Smallest posterior movement that still counts as progress.
const BELIEF_CHANGE_MIN: f64 = 1e-9;

/// The ProbDD reducer.
///
/// Maintains one belief per atom: the probability that the atom is
/// required for the failure, starting at 0.5. Each iteration removes a
/// trial subset of the least-likely-required atoms. A FAIL proves none
/// of them required (they are dropped for good); a PASS proves at least
/// one required, and every trial atom's belief is raised by the exact
/// Bayesian posterior. Atoms whose belief converges are pinned and
/// never offered for removal again. A final ddmin pass over the
/// survivors certifies 1-minimality.
pub struct ProbDd {
    tau: f64,
    epsilon: f64,
    stall_k: Option<usize>,
    policy: TrialPolicy,
    seed: u64,
}

impl ProbDd {
    /// Build a reducer from validated knobs and the run seed.
    pub fn new(config: &ProbDdConfig, seed: u64) -> Self {
        Self {
            tau: config.tau,
            epsilon: config.epsilon,
            stall_k: config.stall_k,
            policy: config.policy,
            seed,
        }
    }

    /// Minimize `config`, which must FAIL on entry.
    pub fn reduce<P>(&self, config: Subset, probe: &mut P) -> Result<Subset, Interrupt>
    where
        P: FnMut(&Subset) -> Result<Verdict, Interrupt>,
    {
        let n = config.len();
        if n == 0 {
            return Ok(config);
        }

        let mut atoms: Vec<usize> = config.iter().collect();
        let mut beliefs: Vec<f64> = vec![0.5; n];
        let mut rng = StdRng::seed_from_u64(self.seed);
        let stall_limit = self.stall_k.unwrap_or(2 * n).max(1);
        let mut stall = 0usize;

        loop {
            let unpinned: Vec<usize> = beliefs
                .iter()
                .enumerate()
                .filter(|&(_, &p)| p < 1.0 - self.epsilon)
                .map(|(pos, _)| pos)
                .collect();
            if unpinned.is_empty() {
                break;
            }

            let trial = self.select_trial(&unpinned, &beliefs, &mut rng);
            let removed: Subset = trial.iter().map(|&pos| atoms[pos]).collect();
            let current: Subset = atoms.iter().copied().collect();
            let candidate = current.difference(&removed);

            match probe(&candidate)? {
                Verdict::Fail => {
                    // None of the removed atoms is required.
                    debug!(dropped = trial.len(), left = candidate.len(), "trial removal kept the failure");
                    let mut in_trial = vec![false; atoms.len()];
                    for &pos in &trial {
                        in_trial[pos] = true;
                    }
                    let mut next_atoms = Vec::with_capacity(atoms.len() - trial.len());
                    let mut next_beliefs = Vec::with_capacity(atoms.len() - trial.len());
                    for (pos, &atom) in atoms.iter().enumerate() {
                        if !in_trial[pos] {
                            next_atoms.push(atom);
                            next_beliefs.push(beliefs[pos]);
                        }
                    }
                    atoms = next_atoms;
                    beliefs = next_beliefs;
                    stall = 0;
                }
                Verdict::Pass => {
                    // At least one removed atom is required: posterior
                    // odds of each trial atom grow by the likelihood
                    // ratio. The joint prior is accumulated in log
                    // space so large trials cannot underflow.
                    let ln_pi_trial: f64 = trial
                        .iter()
                        .map(|&pos| (1.0 - beliefs[pos]).ln())
                        .sum();
                    let mut max_shift = 0.0f64;
                    for &pos in &trial {
                        let p = beliefs[pos];
                        let ln_pi_rest = ln_pi_trial - (1.0 - p).ln();
                        let pi_rest = ln_pi_rest.exp();
                        let denominator = p + (1.0 - p) * (1.0 - pi_rest);
                        let posterior = if denominator > 0.0 {
                            (p / denominator).min(1.0)
                        } else {
                            1.0
                        };
                        max_shift = max_shift.max(posterior - p);
                        beliefs[pos] = posterior;
                    }
                    if max_shift > BELIEF_CHANGE_MIN {
                        stall = 0;
                    } else {
                        stall += 1;
                    }
                }
                Verdict::Unresolved => {
                    stall += 1;
                }
            }

            for p in beliefs.iter_mut() {
                if *p >= 1.0 - self.epsilon {
                    *p = 1.0;
                }
            }

            if stall >= stall_limit {
                debug!(stall, "no progress; stopping belief updates");
                break;
            }
        }

        // Certify 1-minimality of the survivors.
        let survivors: Subset = atoms.into_iter().collect();
        DdMin.reduce(survivors, probe)
    }

    fn select_trial(&self, unpinned: &[usize], beliefs: &[f64], rng: &mut StdRng) -> Vec<usize> {
        match self.policy {
            TrialPolicy::IndependentSample => {
                let mut trial: Vec<usize> = unpinned
                    .iter()
                    .copied()
                    .filter(|&pos| rng.gen::<f64>() < 1.0 - beliefs[pos])
                    .collect();
                if trial.is_empty() {
                    // Always test something: fall back to the atom most
                    // likely to be removable, lowest index on ties.
                    let mut pick = unpinned[0];
                    for &pos in &unpinned[1..] {
                        if beliefs[pos] < beliefs[pick] {
                            pick = pos;
                        }
                    }
                    trial.push(pick);
                }
                trial
            }
            TrialPolicy::GreedyPrefix => {
                let mut order: Vec<usize> = unpinned.to_vec();
                order.sort_by(|&a, &b| beliefs[a].total_cmp(&beliefs[b]).then(a.cmp(&b)));
                let floor = 1.0 - self.tau;
                let mut trial = Vec::new();
                let mut ln_pi = 0.0f64;
                for pos in order {
                    let ln_next = ln_pi + (1.0 - beliefs[pos]).ln();
                    if trial.is_empty() || ln_next.exp() >= floor {
                        trial.push(pos);
                        ln_pi = ln_next;
                    } else {
                        break;
                    }
                }
                trial
            }
        }
    }
}
