//! Verdict memoization keyed by configuration fingerprint.
//!
//! One cache serves exactly one reduction run (oracles may own external
//! side effects, so caches are never shared across runs). A stored
//! verdict is immutable for the lifetime of the run: a contradicting
//! store is counted as an inconsistency, logged, and ignored in favor
//! of the earlier verdict.

use std::collections::HashMap;

use tracing::warn;

use crate::subset::Fingerprint;
use crate::verdict::Verdict;

/// Memoizes oracle verdicts.
///
/// Implementations keep their own hit and miss counters; the session
/// folds them into the run counters when the run finishes.
pub trait VerdictCache {
    /// Look up the verdict for `fp`, counting a hit or a miss.
    fn lookup(&mut self, fp: &Fingerprint) -> Option<Verdict>;

    /// Store a verdict. Contradicting an existing entry counts as an
    /// inconsistency and leaves the cache unchanged.
    fn store(&mut self, fp: Fingerprint, verdict: Verdict);

    /// Number of distinct candidates currently cached.
    fn len(&self) -> usize;

    /// Whether the cache holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lookups answered from the cache.
    fn hits(&self) -> u64;

    /// Lookups that missed.
    fn misses(&self) -> u64;

    /// Contradicting stores observed (a non-deterministic oracle).
    fn inconsistencies(&self) -> u64;

    /// Short name for benchmark records.
    fn name(&self) -> &'static str;
}

/// Which cache a run should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKind {
    /// [`HashCache`], the default.
    Hash,
    /// [`TreeCache`], a trie sharing index prefixes.
    Tree,
}

impl CacheKind {
    pub(crate) fn build(self, capacity: Option<usize>) -> Box<dyn VerdictCache> {
        match self {
            CacheKind::Hash => Box::new(match capacity {
                Some(cap) => HashCache::with_capacity(cap),
                None => HashCache::new(),
            }),
            // The trie keeps every entry; a capacity bound only applies
            // to the hash variant.
            CacheKind::Tree => Box::new(TreeCache::new()),
        }
    }
}

/// Hash-map cache, optionally bounded with least-recently-used eviction.
///
/// Unbounded by default: a reducer performs O(n log n) to O(n²)
/// queries, so memory stays proportional to the number of distinct
/// candidates tried. With a capacity set, evicted entries may be
/// re-evaluated later.
pub struct HashCache {
    map: HashMap<Fingerprint, (Verdict, u64)>,
    capacity: Option<usize>,
    tick: u64,
    hits: u64,
    misses: u64,
    inconsistencies: u64,
}

impl HashCache {
    /// An unbounded cache.
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
            capacity: None,
            tick: 0,
            hits: 0,
            misses: 0,
            inconsistencies: 0,
        }
    }

    /// A cache that evicts the least recently used entry beyond
    /// `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity.max(1)),
            ..Self::new()
        }
    }

    fn evict_lru(&mut self) {
        if let Some((victim, _)) = self
            .map
            .iter()
            .min_by_key(|(_, (_, touched))| *touched)
            .map(|(fp, &(_, touched))| (fp.clone(), touched))
        {
            self.map.remove(&victim);
        }
    }
}

impl Default for HashCache {
    fn default() -> Self {
        Self::new()
    }
}

impl VerdictCache for HashCache {
    fn lookup(&mut self, fp: &Fingerprint) -> Option<Verdict> {
        self.tick += 1;
        let tick = self.tick;
        match self.map.get_mut(fp) {
            Some((verdict, touched)) => {
                *touched = tick;
                self.hits += 1;
                Some(*verdict)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    fn store(&mut self, fp: Fingerprint, verdict: Verdict) {
        self.tick += 1;
        if let Some((existing, _)) = self.map.get(&fp) {
            if *existing != verdict {
                self.inconsistencies += 1;
                warn!(
                    cached = %existing,
                    observed = %verdict,
                    "contradicting verdict for cached candidate; keeping the cached one"
                );
            }
            return;
        }
        if let Some(cap) = self.capacity {
            while self.map.len() >= cap {
                self.evict_lru();
            }
        }
        self.map.insert(fp, (verdict, self.tick));
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn hits(&self) -> u64 {
        self.hits
    }

    fn misses(&self) -> u64 {
        self.misses
    }

    fn inconsistencies(&self) -> u64 {
        self.inconsistencies
    }

    fn name(&self) -> &'static str {
        "hash"
    }
}

#[derive(Default)]
struct TrieNode {
    verdict: Option<Verdict>,
    children: HashMap<usize, usize>,
}

/// Trie cache keyed on the index components of the fingerprint.
///
/// Candidates that share an index prefix share trie nodes, which keeps
/// memory down for the prefix-heavy probe patterns of sweep-style
/// reducers.
pub struct TreeCache {
    nodes: Vec<TrieNode>,
    entries: usize,
    hits: u64,
    misses: u64,
    inconsistencies: u64,
}

impl TreeCache {
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::default()],
            entries: 0,
            hits: 0,
            misses: 0,
            inconsistencies: 0,
        }
    }

    fn walk(&self, fp: &Fingerprint) -> Option<usize> {
        let mut node = 0;
        for component in fp.components() {
            node = *self.nodes[node].children.get(component)?;
        }
        Some(node)
    }
}

impl Default for TreeCache {
    fn default() -> Self {
        Self::new()
    }
}

impl VerdictCache for TreeCache {
    fn lookup(&mut self, fp: &Fingerprint) -> Option<Verdict> {
        let found = self.walk(fp).and_then(|node| self.nodes[node].verdict);
        match found {
            Some(verdict) => {
                self.hits += 1;
                Some(verdict)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    fn store(&mut self, fp: Fingerprint, verdict: Verdict) {
        let mut node = 0;
        for &component in fp.components() {
            let next = match self.nodes[node].children.get(&component) {
                Some(&next) => next,
                None => {
                    let next = self.nodes.len();
                    self.nodes.push(TrieNode::default());
                    self.nodes[node].children.insert(component, next);
                    next
                }
            };
            node = next;
        }
        match self.nodes[node].verdict {
            Some(existing) if existing != verdict => {
                self.inconsistencies += 1;
                warn!(
                    cached = %existing,
                    observed = %verdict,
                    "contradicting verdict for cached candidate; keeping the cached one"
                );
            }
            Some(_) => {}
            None => {
                self.nodes[node].verdict = Some(verdict);
                self.entries += 1;
            }
        }
    }

    fn len(&self) -> usize {
        self.entries
    }

    fn hits(&self) -> u64 {
        self.hits
    }

    fn misses(&self) -> u64 {
        self.misses
    }

    fn inconsistencies(&self) -> u64 {
        self.inconsistencies
    }

    fn name(&self) -> &'static str {
        "tree"
    }
}
