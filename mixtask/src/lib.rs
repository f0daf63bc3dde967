//! Two-particle correlation tasks built on `mixcore`.
//!
//! `SameEventTask` pairs trigger and associate tracks within a collision
//! using each pairing method, `MixedEventTask` pairs them across collisions
//! of the same pool bin. The driver fans either one out over data frames.

pub mod budget;
pub mod config;
pub mod correlation;
pub mod dataframe;
pub mod driver;
pub mod error;
pub mod histogram;

pub use budget::TaskBudget;
pub use config::{PairingMethod, TaskConfig};
pub use correlation::{CorrelationPair, CorrelationTask, MixedEventTask, SameEventTask, TaskOutput};
pub use dataframe::{load_frames, DataFrame};
pub use driver::{run, run_mixed_event, run_same_event};
pub use error::{Result, TaskError};
pub use histogram::Histogram1D;
