//! LotService: transport-agnostic parking lot management.
//!
//! This service owns:
//! - The lot registry (one exclusive lock per lot)
//! - Health reporting (aggregate capacity across lots)
//! - Shutdown coordination
//!
//! Transports (HTTP today) call one method per user operation and map the
//! returned [`ServiceError`] to their own status codes.

use serde::Serialize;
use tokio::sync::watch;

use crate::error::{LotError, ServiceError};
use crate::health::Health;
use crate::lot::{Lot, LotSnapshot, Occupant, SlotNumber};
use crate::registry::LotRegistry;
use crate::version::VersionInfo;

/// A lot snapshot tagged with its id, as returned by "get lot"/"list lots".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LotView {
    pub lot_id: String,
    #[serde(flatten)]
    pub snapshot: LotSnapshot,
}

/// Snapshot of service health for transports to query.
#[derive(Debug, Clone)]
pub struct HealthSnapshot {
    pub state: Health,
    pub lots: usize,
    pub total_slots: u64,
    pub available_slots: u64,
    pub version: VersionInfo,
}

impl HealthSnapshot {
    /// FULL: running, at least one lot, and no slot free anywhere.
    pub fn is_full(&self) -> bool {
        self.state == Health::Ready && self.lots > 0 && self.available_slots == 0
    }

    pub fn status(&self) -> Health {
        if self.is_full() {
            Health::Full
        } else {
            self.state
        }
    }
}

/// Log a rejected operation and hand the result back unchanged.
fn observe<T>(op: &str, lot_id: &str, result: Result<T, ServiceError>) -> Result<T, ServiceError> {
    if let Err(ref e) = result {
        tracing::warn!(lot_id = %lot_id, op, error = %e, "Request rejected");
    }
    result
}

pub struct LotService {
    registry: LotRegistry,

    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,

    version: VersionInfo,
}

impl Default for LotService {
    fn default() -> Self {
        Self::new()
    }
}

impl LotService {
    pub fn new() -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            registry: LotRegistry::new(),
            shutdown_tx,
            shutdown_rx,
            version: VersionInfo::new(),
        }
    }

    pub fn with_version(mut self, version: VersionInfo) -> Self {
        self.version = version;
        self
    }

    pub fn create_lot(&self, lot_id: &str, capacity: u32) -> Result<(), ServiceError> {
        let result = self.registry.create(lot_id, capacity);
        if result.is_ok() {
            tracing::info!(lot_id = %lot_id, capacity, "Parking lot created");
        }
        observe("create", lot_id, result)
    }

    pub fn delete_lot(&self, lot_id: &str) -> Result<(), ServiceError> {
        let result = self.registry.delete(lot_id);
        if result.is_ok() {
            tracing::info!(lot_id = %lot_id, "Parking lot deleted");
        }
        observe("delete", lot_id, result)
    }

    pub fn list_lots(&self) -> Vec<LotView> {
        self.registry
            .list()
            .into_iter()
            .map(|(lot_id, snapshot)| LotView { lot_id, snapshot })
            .collect()
    }

    pub fn lot_snapshot(&self, lot_id: &str) -> Result<LotView, ServiceError> {
        let snapshot = observe("get", lot_id, self.registry.with_lot(lot_id, |lot| lot.snapshot()))?;
        Ok(LotView {
            lot_id: lot_id.trim().to_owned(),
            snapshot,
        })
    }

    /// Add `count` slots; returns the new capacity.
    pub fn expand_lot(&self, lot_id: &str, count: u32) -> Result<u32, ServiceError> {
        let result = self.mutate(lot_id, |lot| lot.expand(count));
        if let Ok(capacity) = result {
            tracing::info!(lot_id = %lot_id, count, capacity, "Parking lot expanded");
        }
        observe("expand", lot_id, result)
    }

    /// Remove `count` free slots; returns the new capacity.
    pub fn shrink_lot(&self, lot_id: &str, count: u32) -> Result<u32, ServiceError> {
        let result = self.mutate(lot_id, |lot| lot.shrink(count));
        if let Ok(capacity) = result {
            tracing::info!(lot_id = %lot_id, count, capacity, "Parking lot shrunk");
        }
        observe("shrink", lot_id, result)
    }

    /// Park a vehicle in the lowest free slot.
    pub fn park(&self, lot_id: &str, key: &str, tag: &str) -> Result<SlotNumber, ServiceError> {
        let result = Occupant::new(key, tag)
            .map_err(ServiceError::from)
            .and_then(|occupant| self.mutate(lot_id, |lot| lot.allocate(occupant)));
        if let Ok(slot) = result {
            tracing::info!(lot_id = %lot_id, slot, "Vehicle parked");
        }
        observe("park", lot_id, result)
    }

    /// Free an occupied slot; returns the vehicle that left.
    pub fn clear_slot(&self, lot_id: &str, slot: SlotNumber) -> Result<Occupant, ServiceError> {
        let result = self.mutate(lot_id, |lot| lot.release(slot));
        if result.is_ok() {
            tracing::info!(lot_id = %lot_id, slot, "Slot cleared");
        }
        observe("clear", lot_id, result)
    }

    pub fn occupied_slots(&self, lot_id: &str) -> Result<Vec<(SlotNumber, Occupant)>, ServiceError> {
        observe("status", lot_id, self.registry.with_lot(lot_id, |lot| lot.occupied()))
    }

    pub fn slots_by_tag(&self, lot_id: &str, tag: &str) -> Result<Vec<SlotNumber>, ServiceError> {
        observe(
            "slots_by_tag",
            lot_id,
            self.registry.with_lot(lot_id, |lot| lot.slots_by_tag(tag)),
        )
    }

    pub fn keys_by_tag(&self, lot_id: &str, tag: &str) -> Result<Vec<String>, ServiceError> {
        observe(
            "keys_by_tag",
            lot_id,
            self.registry.with_lot(lot_id, |lot| lot.occupants_by_tag(tag)),
        )
    }

    pub fn slot_by_key(&self, lot_id: &str, key: &str) -> Result<SlotNumber, ServiceError> {
        let result = self
            .registry
            .with_lot(lot_id, |lot| lot.slot_by_key(key))
            .and_then(|slot| slot.ok_or_else(|| ServiceError::KeyNotFound(key.to_owned())));
        observe("slot_by_key", lot_id, result)
    }

    pub fn health(&self) -> HealthSnapshot {
        let state = if *self.shutdown_rx.borrow() {
            Health::ShuttingDown
        } else {
            Health::Ready
        };
        let lots = self.registry.list();
        let (total_slots, available_slots) =
            lots.iter().fold((0u64, 0u64), |(total, free), (_, snapshot)| {
                (
                    total + u64::from(snapshot.total_slots),
                    free + snapshot.available_slots.len() as u64,
                )
            });

        HealthSnapshot {
            state,
            lots: lots.len(),
            total_slots,
            available_slots,
            version: self.version.clone(),
        }
    }

    pub fn trigger_shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    pub fn shutdown_rx(&self) -> watch::Receiver<bool> {
        self.shutdown_rx.clone()
    }

    fn mutate<T>(
        &self,
        lot_id: &str,
        f: impl FnOnce(&mut Lot) -> Result<T, LotError>,
    ) -> Result<T, ServiceError> {
        Ok(self.registry.with_lot(lot_id, f)??)
    }
}
