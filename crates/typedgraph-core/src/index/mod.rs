//! Adjacency structures.

mod adjacency;

pub use adjacency::{NeighborIter, NeighborSet};
