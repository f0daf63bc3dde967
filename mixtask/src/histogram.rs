//! Minimal 1D histogram for correlation observables.

use mixcore::{AxisSpec, BinAxis};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TaskError};

/// A 1D histogram with explicit underflow/overflow.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Histogram1D {
    pub name: String,
    /// Bin edges (length = n_bins + 1)
    pub edges: Vec<f64>,
    /// Sum of weights per bin, excluding under/overflow
    pub bin_content: Vec<f64>,
    pub underflow: f64,
    pub overflow: f64,
    /// Total number of fills, under/overflow included
    pub entries: u64,
}

impl Histogram1D {
    pub fn new(name: impl Into<String>, axis: &AxisSpec) -> Result<Self> {
        let edges = BinAxis::from_spec(0, axis)?.edges().to_vec();
        let n_bins = edges.len() - 1;
        Ok(Histogram1D {
            name: name.into(),
            edges,
            bin_content: vec![0.0; n_bins],
            underflow: 0.0,
            overflow: 0.0,
            entries: 0,
        })
    }

    pub fn n_bins(&self) -> usize {
        self.bin_content.len()
    }

    /// Bin holding `x`, `None` outside `[first edge, last edge)`. NaN is
    /// treated as underflow.
    pub fn find_bin(&self, x: f64) -> Option<usize> {
        if !(x >= self.edges[0]) || x >= self.edges[self.edges.len() - 1] {
            return None;
        }
        Some(self.edges.partition_point(|&e| e <= x) - 1)
    }

    pub fn fill(&mut self, x: f64) {
        self.fill_weighted(x, 1.0);
    }

    pub fn fill_weighted(&mut self, x: f64, w: f64) {
        self.entries += 1;
        match self.find_bin(x) {
            Some(i) => self.bin_content[i] += w,
            None if x >= self.edges[self.edges.len() - 1] => self.overflow += w,
            None => self.underflow += w,
        }
    }

    /// Sum of in-range bin contents.
    pub fn integral(&self) -> f64 {
        self.bin_content.iter().sum()
    }

    /// Add another histogram with identical binning.
    pub fn merge(&mut self, other: &Histogram1D) -> Result<()> {
        if self.edges != other.edges {
            return Err(TaskError::Config(format!(
                "cannot merge '{}' into '{}': binning differs",
                other.name, self.name
            )));
        }
        for (a, b) in self.bin_content.iter_mut().zip(&other.bin_content) {
            *a += b;
        }
        self.underflow += other.underflow;
        self.overflow += other.overflow;
        self.entries += other.entries;
        Ok(())
    }
}
