//! Record types read by the pairing core.
//!
//! The core only ever reads records. A record's `index` is its position in the
//! slice that owns it; `global_index` survives filtering and slicing.

use serde::{Deserialize, Serialize};

/// Anything that lives in a collection and keeps a stable identity.
pub trait Record {
    fn global_index(&self) -> usize;
}

/// A reconstructed (or generated) charged particle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub global_index: usize,
    /// Owning collision, `None` for orphan tracks
    pub collision_id: Option<usize>,
    pub pt: f64,
    pub eta: f64,
    pub phi: f64,
}

impl Track {
    pub fn new(
        global_index: usize,
        collision_id: Option<usize>,
        pt: f64,
        eta: f64,
        phi: f64,
    ) -> Self {
        Track {
            global_index,
            collision_id,
            pt,
            eta,
            phi,
        }
    }
}

impl Record for Track {
    fn global_index(&self) -> usize {
        self.global_index
    }
}

/// A primary vertex together with its event-level observables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Collision {
    pub global_index: usize,
    pub pos_x: f64,
    pub pos_y: f64,
    pub pos_z: f64,
    pub multiplicity: f64,
}

impl Collision {
    pub fn new(global_index: usize, pos_x: f64, pos_y: f64, pos_z: f64, multiplicity: f64) -> Self {
        Collision {
            global_index,
            pos_x,
            pos_y,
            pos_z,
            multiplicity,
        }
    }

    /// Read one event-level variable, as used for pool binning.
    pub fn variable(&self, variable: PoolVariable) -> f64 {
        match variable {
            PoolVariable::PosX => self.pos_x,
            PoolVariable::PosY => self.pos_y,
            PoolVariable::PosZ => self.pos_z,
            PoolVariable::Multiplicity => self.multiplicity,
        }
    }

    /// Feature vector for the given variables, in order.
    pub fn features(&self, variables: &[PoolVariable]) -> Vec<f64> {
        variables.iter().map(|&v| self.variable(v)).collect()
    }
}

impl Record for Collision {
    fn global_index(&self) -> usize {
        self.global_index
    }
}

/// Event-level columns that can define a mixing pool axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolVariable {
    PosX,
    PosY,
    PosZ,
    Multiplicity,
}
