//! Occupant value type.

use crate::error::{LotError, Result};

/// Slot numbers start at 1; zero never names a slot.
pub type SlotNumber = u32;

/// A vehicle holding a slot: registration key plus color tag.
///
/// Both fields are stored trimmed and lower-cased so every lookup is
/// case-insensitive. Identity is the key alone.
#[derive(Debug, Clone, Eq)]
pub struct Occupant {
    key: String,
    tag: String,
}

impl Occupant {
    pub fn new(key: &str, tag: &str) -> Result<Self> {
        let key = normalize(key);
        let tag = normalize(tag);
        if key.is_empty() || tag.is_empty() {
            return Err(LotError::InvalidOccupant);
        }
        Ok(Self { key, tag })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl PartialEq for Occupant {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

/// Case-fold a user-supplied key or tag into its stored form.
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn occupant_is_normalized() {
        let occupant = Occupant::new("  AB-12 ", "Red").unwrap();
        assert_eq!(occupant.key(), "ab-12");
        assert_eq!(occupant.tag(), "red");
    }

    #[test]
    fn occupant_rejects_blank_fields() {
        assert_eq!(Occupant::new("", "red"), Err(LotError::InvalidOccupant));
        assert_eq!(Occupant::new("ab-12", "   "), Err(LotError::InvalidOccupant));
    }

    #[test]
    fn occupant_identity_is_key_only() {
        let a = Occupant::new("KA-01", "white").unwrap();
        let b = Occupant::new("ka-01", "black").unwrap();
        assert_eq!(a, b);
    }
}
