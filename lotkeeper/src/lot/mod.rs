//! Single-lot slot allocator.
//!
//! [`Lot`] is the only type that can mutate the three substructures:
//! - `FreeSlotPool`: ordered free slot numbers, lowest handed out first
//! - `OccupancyIndex`: slot → occupant, the source of truth
//! - `SecondaryIndices`: key → slot and tag → slots, derived from occupancy

mod allocator;
mod free_pool;
mod indices;
mod occupancy;
mod occupant;

pub use allocator::{Lot, LotSnapshot, MAX_LOT_CAPACITY, OccupiedSlot};
pub use occupant::{Occupant, SlotNumber, normalize};
