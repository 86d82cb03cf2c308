//! Ordered pool of unallocated slot numbers.

use std::collections::BTreeSet;

use super::SlotNumber;

/// Free slots of one lot, kept in ascending order.
///
/// `take_min` always yields the numerically smallest free slot, so released
/// low numbers are handed out again before higher ones.
#[derive(Debug, Clone, Default)]
pub(crate) struct FreeSlotPool {
    free: BTreeSet<SlotNumber>,
}

impl FreeSlotPool {
    /// Pool holding `1..=capacity`.
    pub fn dense(capacity: u32) -> Self {
        Self {
            free: (1..=capacity).collect(),
        }
    }

    pub fn take_min(&mut self) -> Option<SlotNumber> {
        self.free.pop_first()
    }

    /// Return a released slot. Returns `false` if it was already free.
    pub fn give(&mut self, slot: SlotNumber) -> bool {
        self.free.insert(slot)
    }

    pub fn extend(&mut self, slots: impl IntoIterator<Item = SlotNumber>) {
        self.free.extend(slots);
    }

    pub fn remove_if_present(&mut self, slot: SlotNumber) -> bool {
        self.free.remove(&slot)
    }

    /// Remove the `count` highest free slots, highest first.
    ///
    /// Returns `None` and leaves the pool untouched when fewer than `count`
    /// slots are free.
    pub fn take_highest(&mut self, count: usize) -> Option<Vec<SlotNumber>> {
        if count > self.free.len() {
            return None;
        }
        let taken: Vec<SlotNumber> = self.free.iter().rev().take(count).copied().collect();
        for slot in &taken {
            self.remove_if_present(*slot);
        }
        Some(taken)
    }

    pub fn contains(&self, slot: SlotNumber) -> bool {
        self.free.contains(&slot)
    }

    pub fn highest(&self) -> Option<SlotNumber> {
        self.free.last().copied()
    }

    pub fn len(&self) -> usize {
        self.free.len()
    }

    pub fn snapshot_sorted(&self) -> Vec<SlotNumber> {
        self.free.iter().copied().collect()
    }
}
