//! Pool binning for event mixing.
//!
//! Each axis owns `k` strictly increasing edges and `k` bins: bin 0 covers
//! everything below the second edge (underflow folded into the first
//! interval), bin `m` covers `[e_m, e_(m+1))`, and bin `k - 1` covers
//! everything at or above the last edge. Axes are flattened row-major,
//! first axis fastest.

use serde::{Deserialize, Serialize};

use crate::error::{MixError, Result};

/// How an axis is configured, either explicit edges or a uniform grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AxisSpec {
    /// Explicit edges (variable width)
    Variable { edges: Vec<f64> },
    /// `bins` equal intervals between `min` and `max`
    Uniform { bins: usize, min: f64, max: f64 },
}

impl AxisSpec {
    pub fn variable(edges: &[f64]) -> Self {
        AxisSpec::Variable {
            edges: edges.to_vec(),
        }
    }

    pub fn uniform(bins: usize, min: f64, max: f64) -> Self {
        AxisSpec::Uniform { bins, min, max }
    }

    /// Materialise the edge list. Uniform axes produce `bins + 1` edges.
    pub fn edges(&self) -> Vec<f64> {
        match self {
            AxisSpec::Variable { edges } => edges.clone(),
            AxisSpec::Uniform { bins, min, max } => {
                let width = (max - min) / *bins as f64;
                (0..=*bins).map(|i| min + width * i as f64).collect()
            }
        }
    }
}

/// One validated axis.
#[derive(Clone, Debug, PartialEq)]
pub struct BinAxis {
    edges: Vec<f64>,
}

impl BinAxis {
    /// Validate edges for axis number `axis` (only used in error messages).
    pub fn new(axis: usize, edges: Vec<f64>) -> Result<Self> {
        if edges.len() < 2 {
            return Err(MixError::EmptyAxis {
                axis,
                len: edges.len(),
            });
        }
        if let Some(position) = edges.iter().position(|e| !e.is_finite()) {
            return Err(MixError::NonFiniteEdge { axis, position });
        }
        if let Some(w) = edges.windows(2).position(|w| w[0] >= w[1]) {
            return Err(MixError::NonIncreasingEdges {
                axis,
                position: w + 1,
                previous: edges[w],
                current: edges[w + 1],
            });
        }
        Ok(BinAxis { edges })
    }

    pub fn from_spec(axis: usize, spec: &AxisSpec) -> Result<Self> {
        Self::new(axis, spec.edges())
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Number of bins, including the folded underflow and the overflow bin.
    pub fn n_bins(&self) -> usize {
        self.edges.len()
    }

    /// Binary search for the bin holding `x`. NaN lands in bin 0.
    #[inline]
    pub fn bin(&self, x: f64) -> usize {
        self.edges[1..].partition_point(|&e| e <= x)
    }

    /// `x` lies inside `[first edge, last edge)`.
    #[inline]
    pub fn contains(&self, x: f64) -> bool {
        x >= self.edges[0] && x < self.edges[self.edges.len() - 1]
    }
}

/// Multi-axis pool binning.
#[derive(Clone, Debug, PartialEq)]
pub struct PoolBinning {
    axes: Vec<BinAxis>,
    ignore_overflows: bool,
}

impl PoolBinning {
    pub fn new(axes: Vec<BinAxis>, ignore_overflows: bool) -> Result<Self> {
        if axes.is_empty() {
            return Err(MixError::NoAxes);
        }
        Ok(PoolBinning {
            axes,
            ignore_overflows,
        })
    }

    /// Build and validate all axes from their specs.
    pub fn from_specs(specs: &[AxisSpec], ignore_overflows: bool) -> Result<Self> {
        let axes = specs
            .iter()
            .enumerate()
            .map(|(i, s)| BinAxis::from_spec(i, s))
            .collect::<Result<Vec<_>>>()?;
        Self::new(axes, ignore_overflows)
    }

    pub fn axes(&self) -> &[BinAxis] {
        &self.axes
    }

    pub fn n_axes(&self) -> usize {
        self.axes.len()
    }

    pub fn ignore_overflows(&self) -> bool {
        self.ignore_overflows
    }

    /// Total number of flattened bins.
    pub fn n_bins(&self) -> usize {
        self.axes.iter().map(BinAxis::n_bins).product()
    }

    /// Flattened bin id, `b0 + n0 * (b1 + n1 * (...))`.
    pub fn bin(&self, features: &[f64]) -> Result<usize> {
        self.check_dimension(features)?;
        Ok(self
            .axes
            .iter()
            .zip(features)
            .rev()
            .fold(0, |id, (axis, &x)| id * axis.n_bins() + axis.bin(x)))
    }

    /// Pool of a feature vector, `None` when overflows are ignored and any
    /// value lies outside its axis range.
    pub fn pool_of(&self, features: &[f64]) -> Result<Option<usize>> {
        self.check_dimension(features)?;
        if self.ignore_overflows
            && self
                .axes
                .iter()
                .zip(features)
                .any(|(axis, &x)| !axis.contains(x))
        {
            return Ok(None);
        }
        self.bin(features).map(Some)
    }

    fn check_dimension(&self, features: &[f64]) -> Result<()> {
        if features.len() != self.axes.len() {
            return Err(MixError::DimensionMismatch {
                expected: self.axes.len(),
                got: features.len(),
            });
        }
        Ok(())
    }
}
