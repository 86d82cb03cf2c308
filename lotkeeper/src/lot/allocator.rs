//! The lot: owns the free pool, the occupancy map and the secondary indices.
//!
//! All mutation goes through the transition methods here. Each transition
//! validates its preconditions first and only then touches state, so a
//! rejected call never leaves a partial update behind.

use std::collections::BTreeMap;

use serde::Serialize;

use super::free_pool::FreeSlotPool;
use super::indices::SecondaryIndices;
use super::occupancy::OccupancyIndex;
use super::occupant::normalize;
use super::{Occupant, SlotNumber};
use crate::error::{LotError, Result};

/// Largest capacity a lot may have, at creation or after expanding.
pub const MAX_LOT_CAPACITY: u32 = 1_000_000;

/// One occupied slot in a [`LotSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OccupiedSlot {
    pub slot: SlotNumber,
    pub key: String,
    pub tag: String,
}

/// Serializable view of a lot, consumed by every "get lot" response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LotSnapshot {
    pub total_slots: u32,
    /// Ascending by slot.
    pub occupied_slots: Vec<OccupiedSlot>,
    /// Ascending.
    pub available_slots: Vec<SlotNumber>,
    pub tag_index: BTreeMap<String, Vec<SlotNumber>>,
    pub key_index: BTreeMap<String, SlotNumber>,
}

/// A fixed-capacity pool of numbered slots.
#[derive(Debug, Clone)]
pub struct Lot {
    capacity: u32,
    free: FreeSlotPool,
    occupancy: OccupancyIndex,
    indices: SecondaryIndices,
}

impl Lot {
    pub fn new(capacity: u32) -> Result<Self> {
        if capacity == 0 || capacity > MAX_LOT_CAPACITY {
            return Err(LotError::InvalidCapacity);
        }
        Ok(Self {
            capacity,
            free: FreeSlotPool::dense(capacity),
            occupancy: OccupancyIndex::default(),
            indices: SecondaryIndices::default(),
        })
    }

    /// Park `occupant` in the lowest free slot and return that slot.
    pub fn allocate(&mut self, occupant: Occupant) -> Result<SlotNumber> {
        // Occupant::new already normalized; re-check so no caller can slip
        // an empty field past us.
        if occupant.key().is_empty() || occupant.tag().is_empty() {
            return Err(LotError::InvalidOccupant);
        }
        if self.indices.contains_key(occupant.key()) {
            return Err(LotError::DuplicateKey(occupant.key().to_owned()));
        }
        let slot = self.free.take_min().ok_or(LotError::LotFull)?;

        self.indices.index_on_allocate(slot, &occupant);
        tracing::debug!(slot, key = occupant.key(), tag = occupant.tag(), "Slot allocated");
        self.occupancy.set(slot, occupant);

        self.debug_check();
        Ok(slot)
    }

    /// Free `slot` and return the occupant that held it.
    pub fn release(&mut self, slot: SlotNumber) -> Result<Occupant> {
        let occupant = self.occupancy.remove(slot)?;
        self.indices.index_on_release(slot, &occupant);
        self.free.give(slot);
        tracing::debug!(slot, key = occupant.key(), "Slot released");

        self.debug_check();
        Ok(occupant)
    }

    /// Add `count` free slots numbered directly above the highest existing
    /// slot. For a lot that was never shrunk past an occupied slot this is
    /// `capacity+1..=capacity+count`.
    pub fn expand(&mut self, count: u32) -> Result<u32> {
        if count == 0 {
            return Err(LotError::InvalidCount);
        }
        let new_capacity = self
            .capacity
            .checked_add(count)
            .filter(|capacity| *capacity <= MAX_LOT_CAPACITY)
            .ok_or(LotError::InvalidCount)?;
        let first = self.highest_slot() + 1;
        let last = self
            .highest_slot()
            .checked_add(count)
            .ok_or(LotError::InvalidCount)?;

        self.free.extend(first..=last);
        self.capacity = new_capacity;
        tracing::debug!(count, first, last, capacity = new_capacity, "Lot expanded");

        self.debug_check();
        Ok(new_capacity)
    }

    /// Remove the `count` highest-numbered free slots. Occupied slots are
    /// never evicted.
    pub fn shrink(&mut self, count: u32) -> Result<u32> {
        if count == 0 {
            return Err(LotError::InvalidCount);
        }
        if count > self.capacity {
            return Err(LotError::CountExceedsCapacity {
                requested: count,
                capacity: self.capacity,
            });
        }
        let free = self.free.len();
        if count as usize > free {
            return Err(LotError::CannotRemoveOccupiedSlots {
                requested: count,
                free: free as u32,
            });
        }

        let removed = self.free.take_highest(count as usize).ok_or_else(|| {
            LotError::Internal(format!("free pool shorter than {count} after guard"))
        })?;
        self.capacity -= count;
        tracing::debug!(?removed, capacity = self.capacity, "Lot shrunk");

        self.debug_check();
        Ok(self.capacity)
    }

    /// Highest slot number in use or free; 0 for a lot shrunk to nothing.
    fn highest_slot(&self) -> SlotNumber {
        self.free
            .highest()
            .max(self.occupancy.highest())
            .unwrap_or(0)
    }

    pub fn total_slots(&self) -> u32 {
        self.capacity
    }

    pub fn available_slots(&self) -> Vec<SlotNumber> {
        self.free.snapshot_sorted()
    }

    pub fn occupied_count(&self) -> usize {
        self.occupancy.count()
    }

    /// Occupied slots with their occupants, ascending by slot.
    pub fn occupied(&self) -> Vec<(SlotNumber, Occupant)> {
        self.occupancy
            .entries()
            .map(|(slot, occupant)| (slot, occupant.clone()))
            .collect()
    }

    /// Registration keys of every occupant with `tag`, in slot order.
    pub fn occupants_by_tag(&self, tag: &str) -> Vec<String> {
        self.indices
            .slots_by_tag(&normalize(tag))
            .into_iter()
            .filter_map(|slot| self.occupancy.get(slot))
            .map(|occupant| occupant.key().to_owned())
            .collect()
    }

    pub fn slots_by_tag(&self, tag: &str) -> Vec<SlotNumber> {
        self.indices.slots_by_tag(&normalize(tag))
    }

    pub fn slot_by_key(&self, key: &str) -> Option<SlotNumber> {
        self.indices.slot_by_key(&normalize(key))
    }

    pub fn snapshot(&self) -> LotSnapshot {
        LotSnapshot {
            total_slots: self.capacity,
            occupied_slots: self
                .occupancy
                .entries()
                .map(|(slot, occupant)| OccupiedSlot {
                    slot,
                    key: occupant.key().to_owned(),
                    tag: occupant.tag().to_owned(),
                })
                .collect(),
            available_slots: self.free.snapshot_sorted(),
            tag_index: self.indices.tag_index(),
            key_index: self.indices.key_index(),
        }
    }

    /// Verify that free, occupied and both indices agree with each other.
    pub fn check_invariants(&self) -> Result<()> {
        let violation = |msg: String| Err(LotError::Internal(msg));

        if self.occupancy.count() + self.free.len() != self.capacity as usize {
            return violation(format!(
                "capacity {} != {} occupied + {} free",
                self.capacity,
                self.occupancy.count(),
                self.free.len()
            ));
        }
        // Numbering may be sparse after a shrink, but never shared.
        for slot in self.free.snapshot_sorted() {
            if self.occupancy.contains(slot) {
                return violation(format!("slot {slot} is both occupied and free"));
            }
        }
        if self.free.contains(0) || self.occupancy.contains(0) {
            return violation("slot 0 is in use".to_string());
        }
        for (slot, occupant) in self.occupancy.entries() {
            if self.indices.slot_by_key(occupant.key()) != Some(slot) {
                return violation(format!("key '{}' not indexed at {slot}", occupant.key()));
            }
            if !self.indices.slots_by_tag(occupant.tag()).contains(&slot) {
                return violation(format!("tag '{}' missing slot {slot}", occupant.tag()));
            }
        }
        if self.indices.key_count() != self.occupancy.count() {
            return violation(format!(
                "{} keys indexed for {} occupants",
                self.indices.key_count(),
                self.occupancy.count()
            ));
        }
        for (tag, slots) in self.indices.tag_index() {
            for slot in slots {
                if self.occupancy.get(slot).map(Occupant::tag) != Some(tag.as_str()) {
                    return violation(format!("tag '{tag}' holds stale slot {slot}"));
                }
            }
        }
        Ok(())
    }

    fn debug_check(&self) {
        if cfg!(debug_assertions)
            && let Err(e) = self.check_invariants()
        {
            tracing::error!(error = %e, "Lot invariant broken");
            debug_assert!(false, "{e}");
        }
    }
}
