//! Slab decomposition of the decomposed axis: sizing, neighbours and
//! global→local lookup.
//!
//! All three are pure functions of `(parts, G)` and the ordinal, so any
//! partition can recompute another partition's layout without communicating.

pub mod locate;
pub mod neighbors;
pub mod planner;

pub use locate::Location;
pub use neighbors::NeighborLinks;
pub use planner::{Slab, SlabPlan};
