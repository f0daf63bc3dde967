//! Pair combinatorics, pool binning and event mixing for two-particle
//! correlation analyses.
//!
//! The building blocks, leaves first:
//! - [`partition`]: filtered views and per-collision slices of a collection
//! - [`binning`]: multi-axis pool binning
//! - [`combinations`]: lazy `Full` / `Upper` / `StrictlyUpper` pair generation
//! - [`mixing`]: pairing groups from the same pool

pub mod angles;
pub mod binning;
pub mod combinations;
pub mod error;
pub mod mixing;
pub mod partition;
pub mod record;

// Re-export commonly used types
pub use binning::{AxisSpec, BinAxis, PoolBinning};
pub use combinations::{
    CombinationIter, Combinations, IndexPair, IndexSequence, IndexSpace, PairPolicy,
};
pub use error::{MixError, Result};
pub use mixing::{
    group_collisions, EventMixer, MixedBatch, MixedPairs, MixingConfig, PartnerScan, PoolGroup,
};
pub use partition::{Partition, SliceCache, TrackSelection};
pub use record::{Collision, PoolVariable, Record, Track};
