//! Min-queue whose entries can be retracted by value.

use std::collections::BTreeSet;

/// A priority queue that supports removing arbitrary entries.
///
/// Entries are kept in a [`BTreeSet`], so the smallest entry under `Ord` is
/// the next one popped and any entry can be withdrawn in `O(log n)` when its
/// priority is about to change. Re-prioritising is `remove` followed by
/// `insert` with the updated value.
#[derive(Debug, Clone)]
pub struct MutablePriorityQueue<T: Ord> {
    entries: BTreeSet<T>,
}

impl<T: Ord> MutablePriorityQueue<T> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            entries: BTreeSet::new(),
        }
    }

    /// Add an entry. Returns `false` if an equal entry is already queued.
    pub fn insert(&mut self, entry: T) -> bool {
        self.entries.insert(entry)
    }

    /// Withdraw an entry. Returns `false` if it was not queued.
    pub fn remove(&mut self, entry: &T) -> bool {
        self.entries.remove(entry)
    }

    /// The smallest entry, if any.
    pub fn peek(&self) -> Option<&T> {
        self.entries.first()
    }

    /// Remove and return the smallest entry.
    pub fn pop(&mut self) -> Option<T> {
        self.entries.pop_first()
    }

    /// Number of queued entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Ord> Default for MutablePriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pops_in_order() {
        let mut queue = MutablePriorityQueue::new();
        for x in [5, 1, 4, 2, 3] {
            queue.insert(x);
        }
        assert_eq!(queue.len(), 5);
        assert_eq!(queue.peek(), Some(&1));

        let drained: Vec<_> = std::iter::from_fn(|| queue.pop()).collect();
        assert_eq!(drained, vec![1, 2, 3, 4, 5]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_remove_then_reinsert() {
        let mut queue = MutablePriorityQueue::new();
        queue.insert((3, 'a'));
        queue.insert((1, 'b'));

        assert!(queue.remove(&(1, 'b')));
        assert!(!queue.remove(&(1, 'b')));
        queue.insert((7, 'b'));

        assert_eq!(queue.pop(), Some((3, 'a')));
        assert_eq!(queue.pop(), Some((7, 'b')));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_duplicates_rejected() {
        let mut queue = MutablePriorityQueue::default();
        assert!(queue.insert(2));
        assert!(!queue.insert(2));
        assert_eq!(queue.len(), 1);
    }
}
