//! Randomized operation sequences against a single lot.
//!
//! A plain BTreeSet/BTreeMap model runs alongside the lot; after every call
//! the lot must agree with the model and pass its own invariant check.

use std::collections::{BTreeMap, BTreeSet};

use lotkeeper::{Lot, LotError, Occupant};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Allocate { key: u8, tag: u8 },
    Release { slot: u32 },
    Expand { count: u32 },
    Shrink { count: u32 },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0u8..24, 0u8..4).prop_map(|(key, tag)| Op::Allocate { key, tag }),
        3 => (0u32..20).prop_map(|slot| Op::Release { slot }),
        1 => (0u32..4).prop_map(|count| Op::Expand { count }),
        1 => (0u32..6).prop_map(|count| Op::Shrink { count }),
    ]
}

const TAGS: [&str; 4] = ["Red", "WHITE", "black", "Blue"];

#[derive(Default)]
struct Model {
    capacity: u32,
    free: BTreeSet<u32>,
    occupied: BTreeMap<u32, String>,
}

impl Model {
    fn new(capacity: u32) -> Self {
        Self {
            capacity,
            free: (1..=capacity).collect(),
            occupied: BTreeMap::new(),
        }
    }

    /// New slots continue above the highest number still in the lot.
    fn highest(&self) -> u32 {
        let free = self.free.last().copied();
        let taken = self.occupied.last_key_value().map(|(slot, _)| *slot);
        free.max(taken).unwrap_or(0)
    }
}

proptest! {
    #[test]
    fn lot_matches_model(capacity in 1u32..10, ops in proptest::collection::vec(op(), 1..80)) {
        let mut lot = Lot::new(capacity).unwrap();
        let mut model = Model::new(capacity);

        for op in ops {
            match op {
                Op::Allocate { key, tag } => {
                    let key = format!("KA-{key:02}");
                    let occupant = Occupant::new(&key, TAGS[tag as usize]).unwrap();
                    let normalized = key.to_lowercase();
                    let result = lot.allocate(occupant);

                    if model.occupied.values().any(|k| *k == normalized) {
                        prop_assert_eq!(result, Err(LotError::DuplicateKey(normalized)));
                    } else if let Some(lowest) = model.free.pop_first() {
                        prop_assert_eq!(result, Ok(lowest));
                        model.occupied.insert(lowest, normalized);
                    } else {
                        prop_assert_eq!(result, Err(LotError::LotFull));
                    }
                }
                Op::Release { slot } => {
                    let result = lot.release(slot).map(|o| o.key().to_owned());
                    match model.occupied.remove(&slot) {
                        Some(key) => {
                            prop_assert_eq!(result, Ok(key));
                            model.free.insert(slot);
                        }
                        None => prop_assert_eq!(result, Err(LotError::SlotNotOccupied(slot))),
                    }
                }
                Op::Expand { count } => {
                    let result = lot.expand(count);
                    if count == 0 {
                        prop_assert_eq!(result, Err(LotError::InvalidCount));
                    } else {
                        let highest = model.highest();
                        model.free.extend(highest + 1..=highest + count);
                        model.capacity += count;
                        prop_assert_eq!(result, Ok(model.capacity));
                    }
                }
                Op::Shrink { count } => {
                    let before = lot.snapshot();
                    let result = lot.shrink(count);
                    if count == 0 {
                        prop_assert_eq!(&result, &Err(LotError::InvalidCount));
                    } else if count > model.capacity {
                        prop_assert!(matches!(result, Err(LotError::CountExceedsCapacity { .. })), "unexpected result: {:?}", result);
                    } else if count as usize > model.free.len() {
                        prop_assert!(matches!(result, Err(LotError::CannotRemoveOccupiedSlots { .. })), "unexpected result: {:?}", result);
                    } else {
                        for _ in 0..count {
                            model.free.pop_last();
                        }
                        model.capacity -= count;
                        prop_assert_eq!(&result, &Ok(model.capacity));
                    }
                    if result.is_err() {
                        prop_assert_eq!(lot.snapshot(), before);
                    }
                }
            }

            prop_assert!(lot.check_invariants().is_ok(), "{:?}", lot.check_invariants());
            prop_assert_eq!(lot.total_slots(), model.capacity);
            prop_assert_eq!(lot.available_slots(), model.free.iter().copied().collect::<Vec<_>>());
            for (slot, key) in &model.occupied {
                prop_assert_eq!(lot.slot_by_key(key), Some(*slot));
            }
        }
    }

    #[test]
    fn expand_never_touches_occupancy(capacity in 1u32..8, parked in 0usize..8, count in 1u32..8) {
        let mut lot = Lot::new(capacity).unwrap();
        for i in 0..parked.min(capacity as usize) {
            lot.allocate(Occupant::new(&format!("car-{i}"), "grey").unwrap()).unwrap();
        }
        let before = lot.snapshot();

        let total = lot.expand(count).unwrap();
        let after = lot.snapshot();

        prop_assert_eq!(total, capacity + count);
        prop_assert_eq!(&after.occupied_slots, &before.occupied_slots);
        let added: Vec<u32> = after
            .available_slots
            .iter()
            .copied()
            .filter(|slot| !before.available_slots.contains(slot))
            .collect();
        prop_assert_eq!(added, (capacity + 1..=capacity + count).collect::<Vec<_>>());
    }
}
