//! Bounded undo history
//!
//! A FIFO ring buffer of snapshots. Each snapshot records the state
//! *before* a mutation; once the buffer is full the oldest entry is evicted.
//! A capacity of zero turns `save` into a no-op.

use std::collections::VecDeque;

/// Bounded snapshot buffer
#[derive(Debug, Clone)]
pub struct History<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T> History<T> {
    /// Create a history keeping at most `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            // Bounded so a huge configured capacity doesn't allocate up front
            entries: VecDeque::with_capacity(capacity.min(64)),
            capacity,
        }
    }

    /// Push a snapshot, evicting the oldest one when full
    pub fn save(&mut self, snapshot: T) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(snapshot);
    }

    /// Remove and return the most recent snapshot
    pub fn pop(&mut self) -> Option<T> {
        self.entries.pop_back()
    }

    /// Most recent snapshot, if any
    pub fn latest(&self) -> Option<&T> {
        self.entries.back()
    }

    /// Drop every snapshot
    pub fn clear(&mut self) {
        self.entries.clear();
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

    /// False when the capacity is zero
    pub fn is_enabled(&self) -> bool {
        self.capacity > 0
    }

    /// Snapshots from oldest to newest
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator + '_ {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evicts_oldest() {
        let mut history = History::with_capacity(3);
        for i in 0..4 {
            history.save(i);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_zero_capacity_stores_nothing() {
        let mut history = History::with_capacity(0);
        for i in 0..1000 {
            history.save(i);
        }
        assert!(history.is_empty());
        assert!(!history.is_enabled());
        assert_eq!(history.pop(), None);
    }

    #[test]
    fn test_pop_returns_newest() {
        let mut history = History::with_capacity(5);
        history.save("a");
        history.save("b");
        assert_eq!(history.latest(), Some(&"b"));
        assert_eq!(history.pop(), Some("b"));
        assert_eq!(history.pop(), Some("a"));
        assert_eq!(history.pop(), None);
    }

    #[test]
    fn test_clear() {
        let mut history = History::with_capacity(2);
        history.save(1);
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.capacity(), 2);
        history.save(2);
        assert_eq!(history.len(), 1);
    }
}
