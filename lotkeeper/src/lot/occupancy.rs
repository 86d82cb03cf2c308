//! Slot to occupant storage.

use std::collections::BTreeMap;

use super::{Occupant, SlotNumber};
use crate::error::{LotError, Result};

/// Source of truth for which slots are taken and by whom.
///
/// Pure storage; the lot enforces every consistency rule.
#[derive(Debug, Clone, Default)]
pub(crate) struct OccupancyIndex {
    occupied: BTreeMap<SlotNumber, Occupant>,
}

impl OccupancyIndex {
    pub fn get(&self, slot: SlotNumber) -> Option<&Occupant> {
        self.occupied.get(&slot)
    }

    pub fn set(&mut self, slot: SlotNumber, occupant: Occupant) {
        self.occupied.insert(slot, occupant);
    }

    pub fn remove(&mut self, slot: SlotNumber) -> Result<Occupant> {
        self.occupied
            .remove(&slot)
            .ok_or(LotError::SlotNotOccupied(slot))
    }

    pub fn contains(&self, slot: SlotNumber) -> bool {
        self.occupied.contains_key(&slot)
    }

    pub fn highest(&self) -> Option<SlotNumber> {
        self.occupied.last_key_value().map(|(slot, _)| *slot)
    }

    /// Entries in ascending slot order.
    pub fn entries(&self) -> impl Iterator<Item = (SlotNumber, &Occupant)> {
        self.occupied.iter().map(|(slot, occupant)| (*slot, occupant))
    }

    pub fn count(&self) -> usize {
        self.occupied.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_missing_slot_fails() {
        let mut index = OccupancyIndex::default();
        assert_eq!(index.remove(4), Err(LotError::SlotNotOccupied(4)));
    }

    #[test]
    fn entries_are_sorted_by_slot() {
        let mut index = OccupancyIndex::default();
        index.set(3, Occupant::new("c", "red").unwrap());
        index.set(1, Occupant::new("a", "red").unwrap());
        let slots: Vec<_> = index.entries().map(|(slot, _)| slot).collect();
        assert_eq!(slots, vec![1, 3]);
        assert_eq!(index.highest(), Some(3));
        assert_eq!(index.count(), 2);
        assert_eq!(index.get(1).map(Occupant::key), Some("a"));
    }
}
