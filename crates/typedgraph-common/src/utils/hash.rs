//! Hash collection aliases.
//!
//! Node keys are small fixed-width integers, so every lookup structure in the
//! engine uses `hashbrown` tables with the `ahash` hasher instead of SipHash.

/// A `hashbrown` map using `ahash`.
pub type FastHashMap<K, V> = hashbrown::HashMap<K, V, ahash::RandomState>;

/// A `hashbrown` set using `ahash`.
pub type FastHashSet<K> = hashbrown::HashSet<K, ahash::RandomState>;

/// Creates an empty [`FastHashMap`] with room for `capacity` entries.
#[must_use]
pub fn map_with_capacity<K, V>(capacity: usize) -> FastHashMap<K, V> {
    FastHashMap::with_capacity_and_hasher(capacity, ahash::RandomState::new())
}
