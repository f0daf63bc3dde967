//! Error types for mixcore

use thiserror::Error;

/// Configuration problems detected while building binnings and mixers.
///
/// Every variant is raised once, at setup time. Iteration itself never fails.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MixError {
    /// An axis with fewer than two edges cannot describe an interval
    #[error("axis {axis} needs at least two edges, got {len}")]
    EmptyAxis { axis: usize, len: usize },

    /// NaN or infinite edge value
    #[error("axis {axis} has a non-finite edge at position {position}")]
    NonFiniteEdge { axis: usize, position: usize },

    /// Edges must be strictly increasing
    #[error("axis {axis}: edge {position} not increasing ({previous} >= {current})")]
    NonIncreasingEdges {
        axis: usize,
        position: usize,
        previous: f64,
        current: f64,
    },

    /// A binning without any axis
    #[error("pool binning needs at least one axis")]
    NoAxes,

    /// Feature vector length does not match the number of axes
    #[error("expected {expected} feature values, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// A count limit that must be at least one
    #[error("{name} must be positive")]
    NonPositiveBudget { name: &'static str },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, MixError>;
