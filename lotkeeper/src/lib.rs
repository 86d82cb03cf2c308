//! lotkeeper: slot allocation for fixed-capacity parking lots.

mod health;
mod version;

pub mod error;
pub mod lot;
pub mod registry;
pub mod service;
pub mod transport;

pub use error::{LotError, ServiceError};
pub use health::Health;
pub use lot::{Lot, LotSnapshot, MAX_LOT_CAPACITY, Occupant, OccupiedSlot, SlotNumber};
pub use registry::LotRegistry;
pub use service::{HealthSnapshot, LotService, LotView};
pub use version::{LOTKEEPER_VERSION, VersionInfo};
