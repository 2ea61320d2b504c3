//! The output handed back to the external writer.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use crate::{bytecode::DecodedInstruction, simplify::events::EventLog};

/// The renumbering map produced when instruction removal shifts addresses.
///
/// Emitted instructions keep their original addresses; this map gives the compacted
/// offset of every surviving instruction, computed from the sizes of what survived
/// before it. The external writer applies it when re-encoding branch targets and the
/// try/catch table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressMap {
    entries: BTreeMap<u32, u32>,
}

impl AddressMap {
    /// Builds the map from the surviving instructions' `(address, size)` pairs, in
    /// address order.
    #[must_use]
    pub fn from_surviving(surviving: impl Iterator<Item = (u32, u32)>) -> Self {
        let mut entries = BTreeMap::new();
        let mut next = 0;
        for (address, size) in surviving {
            entries.insert(address, next);
            next += size;
        }
        AddressMap { entries }
    }

    /// The compacted address of a surviving instruction, or `None` if it was removed.
    #[must_use]
    pub fn renumbered(&self, old: u32) -> Option<u32> {
        self.entries.get(&old).copied()
    }

    /// Whether no instruction moved (nothing was removed before any survivor).
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.entries.iter().all(|(old, new)| old == new)
    }

    /// Number of surviving instructions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(old address, new address)` pairs in address order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.entries.iter().map(|(old, new)| (*old, *new))
    }
}

/// The revised method a simplification run produced.
#[derive(Debug, Clone)]
pub struct MethodSimplification {
    /// Method name, copied from the input body.
    pub name: Arc<str>,
    /// The revised instruction sequence, in address order, still in the original
    /// address domain.
    pub instructions: Vec<DecodedInstruction>,
    /// Old-to-compacted address mapping for the surviving instructions.
    pub address_map: AddressMap,
    /// Addresses the final traversal reached.
    pub reachable: BTreeSet<u32>,
    /// Diagnostic record: resolved branches, folds, removals, unsupported opcodes.
    pub events: EventLog,
    /// Whether any pass changed the instruction stream.
    pub changed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_map_when_nothing_removed() {
        let map = AddressMap::from_surviving(vec![(0, 2), (2, 2), (4, 1)].into_iter());
        assert!(map.is_identity());
        assert_eq!(map.renumbered(2), Some(2));
    }

    #[test]
    fn removal_shifts_later_addresses() {
        // Original: (0,2) (2,2) (4,1); the instruction at 2 was removed.
        let map = AddressMap::from_surviving(vec![(0, 2), (4, 1)].into_iter());
        assert!(!map.is_identity());
        assert_eq!(map.renumbered(0), Some(0));
        assert_eq!(map.renumbered(4), Some(2));
        assert_eq!(map.renumbered(2), None);
    }
}
