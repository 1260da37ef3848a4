//! Memoized search scores keyed by board configuration.
//!
//! A score produced under a narrowed alpha-beta window is only a bound on the
//! true minimax value, so every entry records whether it is exact or a
//! lower/upper bound and is reused only where that bound decides the probe.
//! Entries are also tied to the remaining depth they were searched with,
//! because win scores scale with it. A cache lives for one move selection, so
//! it never outlives the board size and win length it was filled under.

use std::collections::HashMap;

use super::board::BoardKey;
use super::types::Mark;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    /// The search completed inside the window.
    Exact,
    /// Beta cutoff: the true score is at least the stored one.
    LowerBound,
    /// Fail-low: the true score is at most the stored one.
    UpperBound,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    cells: BoardKey,
    to_move: Mark,
    maximizing: bool,
}

impl CacheKey {
    pub fn new(cells: BoardKey, to_move: Mark, maximizing: bool) -> Self {
        Self {
            cells,
            to_move,
            maximizing,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    depth: usize,
    score: i32,
    entry_type: EntryType,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub probes: u64,
    pub hits: u64,
    pub stores: u64,
}

#[derive(Default)]
pub struct TranspositionCache {
    entries: HashMap<CacheKey, CacheEntry>,
    stats: CacheStats,
}

impl TranspositionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a score only when the stored entry was searched at exactly
    /// `depth` and its bound type settles the `[alpha, beta]` window.
    pub fn probe(&mut self, key: &CacheKey, depth: usize, alpha: i32, beta: i32) -> Option<i32> {
        self.stats.probes += 1;
        let entry = self.entries.get(key)?;
        if entry.depth != depth {
            return None;
        }

        let usable = match entry.entry_type {
            EntryType::Exact => true,
            EntryType::LowerBound => entry.score >= beta,
            EntryType::UpperBound => entry.score <= alpha,
        };
        if usable {
            self.stats.hits += 1;
            Some(entry.score)
        } else {
            None
        }
    }

    /// Classifies `score` against the window the node was entered with.
    pub fn store(&mut self, key: CacheKey, depth: usize, score: i32, alpha: i32, beta: i32) {
        let entry_type = if score <= alpha {
            EntryType::UpperBound
        } else if score >= beta {
            EntryType::LowerBound
        } else {
            EntryType::Exact
        };

        self.stats.stores += 1;
        self.entries.insert(
            key,
            CacheEntry {
                depth,
                score,
                entry_type,
            },
        );
    }

    pub fn entry_type(&self, key: &CacheKey) -> Option<EntryType> {
        self.entries.get(key).map(|entry| entry.entry_type)
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}
