//! Snapshot-based undo/redo history
//!
//! Every discrete edit records a full deep copy of the editable state. The
//! history is a linear list with a cursor: undo moves the cursor back, redo
//! moves it forward, and pushing after an undo discards the redo branch.

use tile_forge_core::{GridLayerStore, LayerName, MarkerSet, TileId};
use uuid::Uuid;

/// Immutable copy of everything an undo step restores
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSnapshot {
    pub draft_id: Option<Uuid>,
    pub tileset_key: String,
    pub active_layer: LayerName,
    pub selected_tile: TileId,
    pub layers: GridLayerStore,
    pub markers: MarkerSet,
}

/// Linear, bounded undo/redo list
#[derive(Debug, Clone)]
pub struct EditHistory<S = EditSnapshot> {
    entries: Vec<S>,
    current: Option<usize>,
    capacity: usize,
}

impl<S> EditHistory<S> {
    /// Create an empty history holding at most `capacity` entries
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            current: None,
            capacity: capacity.max(1),
        }
    }

    /// Record a new entry at the cursor.
    ///
    /// Entries after the cursor are discarded first. Once the list exceeds its
    /// capacity the oldest entry is evicted.
    pub fn push(&mut self, snapshot: S) {
        if let Some(current) = self.current {
            self.entries.truncate(current + 1);
        }
        self.entries.push(snapshot);
        if self.entries.len() > self.capacity {
            self.entries.remove(0);
        }
        self.current = Some(self.entries.len() - 1);
    }

    /// Replace the entry at the cursor, or push if the history is empty
    pub fn amend_current(&mut self, snapshot: S) {
        match self.current {
            Some(current) => self.entries[current] = snapshot,
            None => self.push(snapshot),
        }
    }

    /// Step back one entry and return it. No-op at the oldest entry.
    pub fn undo(&mut self) -> Option<&S> {
        let current = self.current.filter(|c| *c > 0)?;
        self.current = Some(current - 1);
        self.entries.get(current - 1)
    }

    /// Step forward one entry and return it. No-op at the newest entry.
    pub fn redo(&mut self) -> Option<&S> {
        let next = self.current.map(|c| c + 1).filter(|n| *n < self.entries.len())?;
        self.current = Some(next);
        self.entries.get(next)
    }

    /// The entry at the cursor
    pub fn current(&self) -> Option<&S> {
        self.current.and_then(|c| self.entries.get(c))
    }

    /// Zero-based cursor position
    pub fn index(&self) -> Option<usize> {
        self.current
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.current, Some(c) if c > 0)
    }

    pub fn can_redo(&self) -> bool {
        matches!(self.current, Some(c) if c + 1 < self.entries.len())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo_walk() {
        let mut history = EditHistory::new(10);
        history.push(0);
        history.push(1);
        history.push(2);

        assert_eq!(history.undo(), Some(&1));
        assert_eq!(history.undo(), Some(&0));
        assert_eq!(history.undo(), None);
        assert_eq!(history.index(), Some(0));

        assert_eq!(history.redo(), Some(&1));
        assert_eq!(history.redo(), Some(&2));
        assert_eq!(history.redo(), None);
        assert_eq!(history.current(), Some(&2));
    }

    #[test]
    fn test_empty_history_is_inert() {
        let mut history: EditHistory<u32> = EditHistory::new(4);
        assert_eq!(history.undo(), None);
        assert_eq!(history.redo(), None);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_push_after_undo_discards_branch() {
        let mut history = EditHistory::new(10);
        for i in 0..4 {
            history.push(i);
        }
        history.undo();
        history.undo();
        history.push(10);

        assert_eq!(history.len(), 3);
        assert!(!history.can_redo());
        assert_eq!(history.undo(), Some(&1));
        assert_eq!(history.redo(), Some(&10));
    }

    #[test]
    fn test_capacity_bound() {
        const MAX_HISTORY: usize = 80;
        let mut history = EditHistory::new(MAX_HISTORY);
        for i in 0..MAX_HISTORY + 10 {
            history.push(i);
        }

        assert_eq!(history.len(), MAX_HISTORY);
        assert_eq!(history.current(), Some(&(MAX_HISTORY + 9)));

        let mut seen = vec![*history.current().unwrap()];
        while let Some(entry) = history.undo() {
            seen.push(*entry);
        }
        let expected: Vec<usize> = (10..MAX_HISTORY + 10).rev().collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_eviction_after_undo_keeps_cursor_on_new_entry() {
        let mut history = EditHistory::new(3);
        for i in 0..3 {
            history.push(i);
        }
        history.undo();
        history.push(7);
        history.push(8);

        assert_eq!(history.len(), 3);
        assert_eq!(history.current(), Some(&8));
        assert_eq!(history.undo(), Some(&7));
        assert_eq!(history.undo(), Some(&1));
    }

    #[test]
    fn test_amend_current() {
        let mut history = EditHistory::new(4);
        history.amend_current(1);
        assert_eq!(history.len(), 1);

        history.push(2);
        history.amend_current(3);
        assert_eq!(history.len(), 2);
        assert_eq!(history.undo(), Some(&1));
        assert_eq!(history.redo(), Some(&3));
    }
}
