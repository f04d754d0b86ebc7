//! Hierarchical delta debugging over tree-shaped inputs.

use tracing::debug;

use crate::config::InnerReducer;
use crate::input::Hierarchy;
use crate::reducers::{DdMin, TicTocMin};
use crate::session::Interrupt;
use crate::subset::Subset;
use crate::verdict::Verdict;

/// The HDD reducer.
///
/// Walks the tree level by level, root first. At each level the
/// still-alive removable nodes form a temporary sequence configuration
/// that a 1-minimizing sequence reducer shrinks; the surviving nodes
/// are committed and everything pruned there (subtrees included) is
/// gone before the next level starts. Trial candidates never mutate
/// the committed tree, they are expressed as subsets of the full
/// model.
pub struct Hdd {
    inner: InnerReducer,
}

impl Hdd {
    pub fn new(inner: InnerReducer) -> Self {
        Self { inner }
    }

    /// Minimize `config` over `hierarchy`; the configuration must FAIL
    /// on entry.
    pub fn reduce<P>(
        &self,
        hierarchy: &dyn Hierarchy,
        config: Subset,
        probe: &mut P,
    ) -> Result<Subset, Interrupt>
    where
        P: FnMut(&Subset) -> Result<Verdict, Interrupt>,
    {
        let mut committed = config;

        for level in 0..hierarchy.level_count() {
            let live: Vec<usize> = hierarchy
                .level_atoms(level)
                .into_iter()
                .filter(|&atom| committed.contains(atom) && alive(hierarchy, &committed, atom))
                .collect();
            if live.is_empty() {
                continue;
            }

            debug!(level, atoms = live.len(), "reducing level");

            // The level's nodes become positions 0..m of an inner
            // configuration; an inner probe prunes the deselected nodes
            // from the committed tree and asks the real oracle.
            let mut inner_probe = |selected: &Subset| {
                let dropped: Subset = live
                    .iter()
                    .enumerate()
                    .filter(|&(position, _)| !selected.contains(position))
                    .map(|(_, &atom)| atom)
                    .collect();
                probe(&committed.difference(&dropped))
            };

            let full = Subset::full(live.len());
            let minimal = match self.inner {
                InnerReducer::DdMin => DdMin.reduce(full, &mut inner_probe)?,
                InnerReducer::TicTocMin => TicTocMin.reduce(full, &mut inner_probe)?,
            };

            let dropped: Subset = live
                .iter()
                .enumerate()
                .filter(|&(position, _)| !minimal.contains(position))
                .map(|(_, &atom)| atom)
                .collect();
            debug!(level, pruned = dropped.len(), "committing level");
            committed = committed.difference(&dropped);
        }

        Ok(committed)
    }
}

/// A node is alive when no removable ancestor of it has been pruned.
fn alive(hierarchy: &dyn Hierarchy, committed: &Subset, atom: usize) -> bool {
    let mut cursor = hierarchy.parent_atom(atom);
    while let Some(parent) = cursor {
        if !committed.contains(parent) {
            return false;
        }
        cursor = hierarchy.parent_atom(parent);
    }
    true
}
