use thiserror::Error;

use crate::lot::{MAX_LOT_CAPACITY, SlotNumber};

/// Rejections raised by a single lot.
///
/// Every variant leaves the lot exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LotError {
    #[error("lot capacity must be between 1 and {max}", max = MAX_LOT_CAPACITY)]
    InvalidCapacity,

    #[error("slot count must be greater than zero and keep capacity at most {max}", max = MAX_LOT_CAPACITY)]
    InvalidCount,

    #[error("vehicle registration and color are required")]
    InvalidOccupant,

    #[error("vehicle '{0}' is already parked in this lot")]
    DuplicateKey(String),

    #[error("the parking lot is already full")]
    LotFull,

    #[error("no vehicle is parked in slot {0}")]
    SlotNotOccupied(SlotNumber),

    #[error("cannot remove {requested} slots from a lot of {capacity}")]
    CountExceedsCapacity { requested: u32, capacity: u32 },

    #[error("cannot remove occupied slots: {requested} requested, {free} free")]
    CannotRemoveOccupiedSlots { requested: u32, free: u32 },

    #[error("internal consistency failure: {0}")]
    Internal(String),
}

/// Errors surfaced by the registry and service layers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Lot(#[from] LotError),

    #[error("parking lot with ID \"{0}\" not found")]
    LotNotFound(String),

    #[error("parking lot with ID \"{0}\" already exists")]
    LotAlreadyExists(String),

    #[error("parking lot ID is required")]
    InvalidLotId,

    #[error("no vehicle with registration \"{0}\" found")]
    KeyNotFound(String),
}

pub type Result<T> = std::result::Result<T, LotError>;
