//! Transposition Table.
//!
//! Draughts positions are reached through many move orders, most often once
//! kings are on the board. The table remembers the score of every searched
//! node so repeated subtrees are skipped, and it is shared by all root
//! branches, the foreground search and the ponder search.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::board::Board;
use crate::coretypes::{Color, Cp, MoveRecord, PlyKind};
use crate::zobrist::{HashKind, ZobristTable};

/// How the score of an entry relates to the true score of its position.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Bound {
    Exact, // The score is exact, every child was searched inside the window.
    Lower, // The true score is at least the stored score (fail high).
    Upper, // The true score is at most the stored score (fail low).
}

impl Bound {
    /// Classify a node score against the window the node was searched with.
    pub fn classify(score: Cp, alpha: Cp, beta: Cp) -> Self {
        if score <= alpha {
            Bound::Upper
        } else if score >= beta {
            Bound::Lower
        } else {
            Bound::Exact
        }
    }
}

/// A searched position: its full hash, absolute score, and the draft it was searched to.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Entry {
    pub hash: HashKind,
    pub score: Cp,
    pub depth: PlyKind,
    pub bound: Bound,
}

impl Entry {
    pub fn new(hash: HashKind, score: Cp, depth: PlyKind, bound: Bound) -> Self {
        Self {
            hash,
            score,
            depth,
            bound,
        }
    }

    /// Content of an unused slot. A lookup of hash 0 matches it. Only the empty
    /// board with Light to move is sure to hash to 0, and that game is already over.
    const fn vacant() -> Self {
        Self {
            hash: 0,
            score: Cp(0),
            depth: 0,
            bound: Bound::Upper,
        }
    }
}

/// Each slot has its own lock, so threads using different slots never wait on each other.
type Slot = Mutex<Entry>;

/// A fixed number of slots addressed by `hash % capacity`.
///
/// The table never grows. Storing into an occupied slot evicts its entry
/// under the same lock, so the number of stored entries is bounded by the
/// capacity. Index collisions are resolved by replacement, full key
/// collisions are not detected.
///
/// Example:
/// ```rust
/// # use std::sync::Arc;
/// # use draughts_engine::transposition::{Bound, Entry, TranspositionTable};
/// # use draughts_engine::coretypes::Cp;
/// let tt = Arc::new(TranspositionTable::with_capacity(100));
/// tt.replace(Entry::new(12345, Cp(40), 3, Bound::Exact));
/// assert!(tt.contains(12345));
/// ```
pub struct TranspositionTable {
    slots: Vec<Slot>,
    ztable: ZobristTable,
}

impl TranspositionTable {
    pub const DEFAULT_MAX_CAPACITY: usize = 850_000;

    /// A table of the default capacity with freshly drawn Zobrist keys.
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_MAX_CAPACITY)
    }

    /// A table with `capacity` slots and freshly drawn Zobrist keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_zobrist_table(capacity, ZobristTable::new())
    }

    /// A table with `capacity` slots hashing with `ztable`. A capacity of 0 is raised to 1.
    pub fn with_capacity_and_zobrist_table(capacity: usize, ztable: ZobristTable) -> Self {
        let slots = (0..capacity.max(1))
            .map(|_| Mutex::new(Entry::vacant()))
            .collect();
        Self { slots, ztable }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Vacate every slot.
    /// Each slot is reset under its own lock, so searches may run concurrently.
    pub fn clear(&self) {
        for index in 0..self.slots.len() {
            *self.slot(index) = Entry::vacant();
        }
    }

    /// Hash board with player to move using this table's keys.
    /// Hashes from one table are meaningless to another.
    pub fn generate_hash(&self, board: &Board, player: Color) -> HashKind {
        self.ztable.generate_hash(board, player)
    }

    /// Hash of the position reached by the move of record from the position of hash.
    pub fn update_from_hash(&self, hash: HashKind, record: &MoveRecord) -> HashKind {
        self.ztable.update_from_hash(hash, record)
    }

    fn index(&self, hash: HashKind) -> usize {
        (hash % self.slots.len() as HashKind) as usize
    }

    // A slot only ever holds a whole Entry, so a poisoned lock still guards valid data.
    fn slot(&self, index: usize) -> MutexGuard<'_, Entry> {
        self.slots[index]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Store an entry, evicting whatever its slot held.
    pub fn replace(&self, entry: Entry) {
        let index = self.index(entry.hash);
        *self.slot(index) = entry;
    }

    pub fn contains(&self, hash: HashKind) -> bool {
        self.get(hash).is_some()
    }

    /// The entry stored for hash, if its slot still holds it.
    pub fn get(&self, hash: HashKind) -> Option<Entry> {
        let entry = *self.slot(self.index(hash));
        (entry.hash == hash).then_some(entry)
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn colliding_entries_evict() {
        let tt = TranspositionTable::with_capacity(1);
        let first = Entry::new(100, Cp(100), 3, Bound::Exact);
        let second = Entry::new(200, Cp(-200), 4, Bound::Lower);
        assert_eq!(tt.get(first.hash), None);

        tt.replace(first);
        assert_eq!(tt.get(first.hash), Some(first));
        assert!(!tt.contains(second.hash));

        tt.replace(second);
        assert!(!tt.contains(first.hash));
        assert_eq!(tt.get(second.hash), Some(second));
        assert_eq!(tt.capacity(), 1);
    }

    #[test]
    fn zero_capacity_is_raised() {
        let tt = TranspositionTable::with_capacity(0);
        assert_eq!(tt.capacity(), 1);
        tt.replace(Entry::new(9, Cp(1), 1, Bound::Exact));
        assert!(tt.contains(9));
    }

    #[test]
    fn vacant_slots_only_match_hash_zero() {
        let tt = TranspositionTable::with_capacity(64);
        let hash = tt.generate_hash(&Board::start_position(), Color::Light);
        assert_ne!(hash, 0);
        assert!(!tt.contains(hash));

        assert!(tt.contains(0));
        assert_eq!(tt.generate_hash(&Board::empty(), Color::Light), 0);
        assert_ne!(tt.generate_hash(&Board::empty(), Color::Dark), 0);
    }

    #[test]
    fn clear_vacates_while_shared() {
        let tt = Arc::new(TranspositionTable::with_capacity(10_000));
        let board = Board::start_position();
        let hash = tt.generate_hash(&board, Color::Dark);

        let writers: Vec<_> = (0..4)
            .map(|i| {
                let tt = Arc::clone(&tt);
                thread::spawn(move || {
                    for h in 0..1000u64 {
                        tt.replace(Entry::new(h * 4 + i + 1, Cp(i as i32), 1, Bound::Exact));
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }
        tt.replace(Entry::new(hash, Cp(0), 5, Bound::Exact));
        assert!(tt.contains(hash));

        tt.clear();
        assert!(!tt.contains(hash));
        assert!((1..=4000).all(|h| !tt.contains(h)));
    }

    #[test]
    fn bound_classification() {
        assert_eq!(Bound::classify(Cp(-5), Cp(0), Cp(10)), Bound::Upper);
        assert_eq!(Bound::classify(Cp(10), Cp(0), Cp(10)), Bound::Lower);
        assert_eq!(Bound::classify(Cp(5), Cp(0), Cp(10)), Bound::Exact);
    }
}
