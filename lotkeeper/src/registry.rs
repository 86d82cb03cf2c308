//! Keyed collection of lots.
//!
//! Each lot sits behind its own mutex, so calls against one lot are
//! serialized while different lots proceed independently. The outer
//! DashMap guards creation and deletion of ids.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::error::ServiceError;
use crate::lot::{Lot, LotSnapshot};

struct LotEntry {
    /// Creation order, used to list lots the way they were added.
    seq: u64,
    lot: Mutex<Lot>,
}

/// Lock a lot. On poison, keep going: lot transitions validate before they
/// mutate, so a panic cannot have left a half-applied update.
fn lock_lot<'a>(id: &str, lot: &'a Mutex<Lot>) -> MutexGuard<'a, Lot> {
    lot.lock().unwrap_or_else(|poisoned| {
        tracing::error!(lot_id = %id, "Lot mutex poisoned - recovering");
        poisoned.into_inner()
    })
}

#[derive(Default)]
pub struct LotRegistry {
    lots: DashMap<String, LotEntry>,
    next_seq: AtomicU64,
}

impl LotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, id: &str, capacity: u32) -> Result<(), ServiceError> {
        let id = validate_id(id)?;
        let lot = Lot::new(capacity)?;

        match self.lots.entry(id.to_owned()) {
            Entry::Occupied(_) => Err(ServiceError::LotAlreadyExists(id.to_owned())),
            Entry::Vacant(slot) => {
                let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                slot.insert(LotEntry {
                    seq,
                    lot: Mutex::new(lot),
                });
                Ok(())
            }
        }
    }

    pub fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let id = validate_id(id)?;
        self.lots
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| ServiceError::LotNotFound(id.to_owned()))
    }

    /// Run `f` with exclusive access to one lot.
    pub fn with_lot<T>(&self, id: &str, f: impl FnOnce(&mut Lot) -> T) -> Result<T, ServiceError> {
        let id = validate_id(id)?;
        let entry = self
            .lots
            .get(id)
            .ok_or_else(|| ServiceError::LotNotFound(id.to_owned()))?;
        let mut lot = lock_lot(id, &entry.lot);
        Ok(f(&mut lot))
    }

    /// Snapshot of every lot, in creation order.
    pub fn list(&self) -> Vec<(String, LotSnapshot)> {
        let mut lots: Vec<(u64, String, LotSnapshot)> = self
            .lots
            .iter()
            .map(|entry| {
                let snapshot = lock_lot(entry.key(), &entry.lot).snapshot();
                (entry.seq, entry.key().clone(), snapshot)
            })
            .collect();
        lots.sort_by_key(|(seq, _, _)| *seq);
        lots.into_iter()
            .map(|(_, id, snapshot)| (id, snapshot))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lots.is_empty()
    }
}

fn validate_id(id: &str) -> Result<&str, ServiceError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ServiceError::InvalidLotId);
    }
    Ok(id)
}
