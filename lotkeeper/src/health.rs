//! Health status types for the lot service.

use serde::{Deserialize, Serialize};

/// Health status of the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Health {
    /// Accepting requests
    #[default]
    Ready,
    /// Every slot in every lot is taken (response-only, derived from counts)
    Full,
    /// Shutdown requested; draining in-flight requests
    ShuttingDown,
}
