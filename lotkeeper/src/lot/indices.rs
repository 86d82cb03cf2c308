//! Secondary lookups derived from occupancy: by key and by tag.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::{Occupant, SlotNumber};

#[derive(Debug, Clone, Default)]
pub(crate) struct SecondaryIndices {
    by_key: HashMap<String, SlotNumber>,
    by_tag: HashMap<String, BTreeSet<SlotNumber>>,
}

impl SecondaryIndices {
    pub fn index_on_allocate(&mut self, slot: SlotNumber, occupant: &Occupant) {
        self.by_key.insert(occupant.key().to_owned(), slot);
        self.by_tag
            .entry(occupant.tag().to_owned())
            .or_default()
            .insert(slot);
    }

    pub fn index_on_release(&mut self, slot: SlotNumber, occupant: &Occupant) {
        self.by_key.remove(occupant.key());
        if let Some(bucket) = self.by_tag.get_mut(occupant.tag()) {
            bucket.remove(&slot);
            // Empty buckets are dropped so unknown and vacated tags look alike.
            if bucket.is_empty() {
                self.by_tag.remove(occupant.tag());
            }
        }
    }

    pub fn slot_by_key(&self, key: &str) -> Option<SlotNumber> {
        self.by_key.get(key).copied()
    }

    /// Slots holding `tag`, ascending. Empty for an unknown tag.
    pub fn slots_by_tag(&self, tag: &str) -> Vec<SlotNumber> {
        self.by_tag
            .get(tag)
            .map(|bucket| bucket.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    pub fn key_index(&self) -> BTreeMap<String, SlotNumber> {
        self.by_key
            .iter()
            .map(|(key, slot)| (key.clone(), *slot))
            .collect()
    }

    pub fn tag_index(&self) -> BTreeMap<String, Vec<SlotNumber>> {
        self.by_tag
            .iter()
            .map(|(tag, slots)| (tag.clone(), slots.iter().copied().collect()))
            .collect()
    }

    pub fn key_count(&self) -> usize {
        self.by_key.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_then_release_drops_empty_bucket() {
        let mut indices = SecondaryIndices::default();
        let car = Occupant::new("ab-12", "red").unwrap();

        indices.index_on_allocate(3, &car);
        assert_eq!(indices.slot_by_key("ab-12"), Some(3));
        assert_eq!(indices.slots_by_tag("red"), vec![3]);

        indices.index_on_release(3, &car);
        assert_eq!(indices.slot_by_key("ab-12"), None);
        assert!(indices.slots_by_tag("red").is_empty());
        assert!(indices.tag_index().is_empty());
    }

    #[test]
    fn tag_bucket_keeps_other_slots() {
        let mut indices = SecondaryIndices::default();
        let a = Occupant::new("a", "blue").unwrap();
        let b = Occupant::new("b", "blue").unwrap();
        indices.index_on_allocate(4, &a);
        indices.index_on_allocate(2, &b);
        assert_eq!(indices.slots_by_tag("blue"), vec![2, 4]);

        indices.index_on_release(4, &a);
        assert_eq!(indices.slots_by_tag("blue"), vec![2]);
        assert_eq!(indices.key_count(), 1);
    }
}
