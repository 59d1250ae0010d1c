//! Per-node neighbor sets.
//!
//! Each node keeps the set of its neighbors, mapping every neighbor key to
//! the slot of the connecting edge's attribute record. This gives:
//! - O(1) expected edge existence checks and lookups
//! - O(1) expected insertion and removal
//! - iteration in unspecified order
//!
//! Small sets (the common case for mesh-like graphs) are kept inline and
//! scanned linearly. A set is promoted to a hash table once it outgrows the
//! inline buffer and never demoted.

use std::hash::Hash;

use smallvec::SmallVec;
use typedgraph_common::utils::hash::{FastHashMap, map_with_capacity};

use crate::attr::Slot;

/// Neighbors stored inline before promotion to a hash table.
const INLINE_NEIGHBORS: usize = 8;

/// The neighbors of one node, each with its edge record slot.
#[derive(Debug, Clone)]
pub enum NeighborSet<K> {
    /// Few neighbors, scanned linearly.
    Inline(SmallVec<[(K, Slot); INLINE_NEIGHBORS]>),
    /// Many neighbors, hashed.
    Hashed(FastHashMap<K, Slot>),
}

impl<K: Copy + Eq + Hash> NeighborSet<K> {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::Inline(SmallVec::new())
    }

    /// Returns the number of neighbors.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Inline(entries) => entries.len(),
            Self::Hashed(map) => map.len(),
        }
    }

    /// Returns true if there are no neighbors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the edge slot for a neighbor.
    #[must_use]
    pub fn get(&self, neighbor: &K) -> Option<Slot> {
        match self {
            Self::Inline(entries) => entries
                .iter()
                .find(|(key, _)| key == neighbor)
                .map(|&(_, slot)| slot),
            Self::Hashed(map) => map.get(neighbor).copied(),
        }
    }

    /// Returns true if `neighbor` is in the set.
    #[must_use]
    pub fn contains(&self, neighbor: &K) -> bool {
        self.get(neighbor).is_some()
    }

    /// Adds a neighbor. Returns false, leaving the set unchanged, if it is
    /// already present.
    pub fn insert(&mut self, neighbor: K, slot: Slot) -> bool {
        if self.contains(&neighbor) {
            return false;
        }
        match self {
            Self::Inline(entries) if entries.len() < INLINE_NEIGHBORS => {
                entries.push((neighbor, slot));
            }
            Self::Inline(entries) => {
                let mut map = map_with_capacity(INLINE_NEIGHBORS * 2);
                map.extend(entries.drain(..));
                map.insert(neighbor, slot);
                *self = Self::Hashed(map);
            }
            Self::Hashed(map) => {
                map.insert(neighbor, slot);
            }
        }
        true
    }

    /// Removes a neighbor, returning its edge slot.
    pub fn remove(&mut self, neighbor: &K) -> Option<Slot> {
        match self {
            Self::Inline(entries) => {
                let position = entries.iter().position(|(key, _)| key == neighbor)?;
                Some(entries.swap_remove(position).1)
            }
            Self::Hashed(map) => map.remove(neighbor),
        }
    }

    /// Iterates over `(neighbor, edge slot)` pairs.
    pub fn iter(&self) -> NeighborIter<'_, K> {
        match self {
            Self::Inline(entries) => NeighborIter::Inline(entries.iter()),
            Self::Hashed(map) => NeighborIter::Hashed(map.iter()),
        }
    }

    /// Iterates over neighbor keys.
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.iter().map(|(key, _)| key)
    }
}

impl<K: Copy + Eq + Hash> Default for NeighborSet<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over a [`NeighborSet`].
pub enum NeighborIter<'a, K> {
    /// Over an inline set.
    Inline(std::slice::Iter<'a, (K, Slot)>),
    /// Over a hashed set.
    Hashed(hashbrown::hash_map::Iter<'a, K, Slot>),
}

impl<K: Copy> Iterator for NeighborIter<'_, K> {
    type Item = (K, Slot);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Inline(iter) => iter.next().copied(),
            Self::Hashed(iter) => iter.next().map(|(&key, &slot)| (key, slot)),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Self::Inline(iter) => iter.size_hint(),
            Self::Hashed(iter) => iter.size_hint(),
        }
    }
}

impl<K: Copy> ExactSizeIterator for NeighborIter<'_, K> {}
