//! Slot storage with deferred removal.
//!
//! Each element kind lives in an [`Arena`]. Erasing an element only marks its
//! slot; the value stays readable until [`Arena::finalize`] turns every marked
//! slot into a vacant one. Slots are never reused, so a handle can never come to
//! name a different element.

#[derive(Debug, Clone)]
enum Slot<T> {
    Live(T),
    Erased(T),
    Vacant,
}

#[derive(Debug, Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Slot<T>>,
    live: usize,
    pending: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<T> Arena<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            live: 0,
            pending: 0,
        }
    }

    pub fn push(&mut self, value: T) -> usize {
        self.slots.push(Slot::Live(value));
        self.live += 1;
        self.slots.len() - 1
    }

    /// Value in slot `index`, including erased-but-not-finalized values.
    ///
    /// # Panics
    /// Panics if the slot is vacant.
    #[inline]
    pub fn get(&self, index: usize) -> &T {
        match &self.slots[index] {
            Slot::Live(value) | Slot::Erased(value) => value,
            Slot::Vacant => panic!("slot {index} was finalized away"),
        }
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> &mut T {
        match &mut self.slots[index] {
            Slot::Live(value) | Slot::Erased(value) => value,
            Slot::Vacant => panic!("slot {index} was finalized away"),
        }
    }

    /// Mark a live slot for removal. Returns false if it was not live.
    pub fn erase(&mut self, index: usize) -> bool {
        let slot = &mut self.slots[index];
        match std::mem::replace(slot, Slot::Vacant) {
            Slot::Live(value) => {
                *slot = Slot::Erased(value);
                self.live -= 1;
                self.pending += 1;
                true
            }
            other => {
                *slot = other;
                false
            }
        }
    }

    /// Write `value` back into slot `index` as a live value, undoing an
    /// [`Self::erase`] that has not been finalized yet.
    pub fn restore(&mut self, index: usize, value: T) {
        let slot = &mut self.slots[index];
        match slot {
            Slot::Live(_) => {}
            Slot::Erased(_) => {
                self.live += 1;
                self.pending -= 1;
            }
            Slot::Vacant => self.live += 1,
        }
        *slot = Slot::Live(value);
    }

    #[inline]
    pub fn is_live(&self, index: usize) -> bool {
        matches!(self.slots.get(index), Some(Slot::Live(_)))
    }

    /// Number of live values.
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    /// Number of erased values waiting for [`Self::finalize`].
    #[inline]
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Number of slots ever allocated.
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Drop every erased value. Returns how many were removed.
    pub fn finalize(&mut self) -> usize {
        if self.pending == 0 {
            return 0;
        }
        for slot in &mut self.slots {
            if matches!(slot, Slot::Erased(_)) {
                *slot = Slot::Vacant;
            }
        }
        std::mem::take(&mut self.pending)
    }

    /// Slot positions of live values in insertion order.
    pub fn live_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| matches!(slot, Slot::Live(_)))
            .map(|(i, _)| i)
    }

    /// Live values with their slot positions.
    pub fn iter_live(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, slot)| match slot {
            Slot::Live(value) => Some((i, value)),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_erase_is_deferred() {
        let mut arena = Arena::default();
        let a = arena.push(1);
        let b = arena.push(2);

        assert!(arena.erase(a));
        assert!(!arena.erase(a));
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.pending(), 1);
        // Still readable until finalize.
        assert_eq!(*arena.get(a), 1);
        assert!(!arena.is_live(a));

        assert_eq!(arena.finalize(), 1);
        assert_eq!(arena.pending(), 0);
        assert_eq!(arena.live_indices().collect::<Vec<_>>(), vec![b]);
    }

    #[test]
    fn test_restore_revives_erased() {
        let mut arena = Arena::default();
        let a = arena.push(1);
        arena.push(2);
        arena.erase(a);

        arena.restore(a, 10);
        assert!(arena.is_live(a));
        assert_eq!(*arena.get(a), 10);
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.pending(), 0);

        // Restoring a live slot only replaces the value.
        arena.restore(a, 11);
        assert_eq!(*arena.get(a), 11);
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.finalize(), 0);
    }

    #[test]
    fn test_slots_are_not_reused() {
        let mut arena = Arena::default();
        let a = arena.push('a');
        arena.erase(a);
        arena.finalize();
        let b = arena.push('b');
        assert_ne!(a, b);
        assert_eq!(arena.slot_count(), 2);
    }

    #[test]
    #[should_panic(expected = "finalized away")]
    fn test_vacant_access_panics() {
        let mut arena = Arena::default();
        let a = arena.push(0u8);
        arena.erase(a);
        arena.finalize();
        let _ = arena.get(a);
    }
}
