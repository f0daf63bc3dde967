//! Task configuration.

use std::fs;
use std::path::Path;

use mixcore::{AxisSpec, BinAxis, MixError, MixingConfig, PoolBinning, PoolVariable, TrackSelection};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TaskError};

/// How the same-event task walks the trigger x associate product.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairingMethod {
    /// Nested loops over both partitions, keeping `i < j`
    TwoForLoops,
    /// Full product, no index check
    FullNoIndexCheck,
    /// Full product filtered to `i < j`
    Full,
    /// Upper triangle filtered to `i < j`
    Upper,
    /// Strictly upper triangle straight from the generator
    StrictlyUpper,
}

impl PairingMethod {
    pub const ALL: [PairingMethod; 5] = [
        PairingMethod::TwoForLoops,
        PairingMethod::FullNoIndexCheck,
        PairingMethod::Full,
        PairingMethod::Upper,
        PairingMethod::StrictlyUpper,
    ];

    /// Histogram name used in the output.
    pub fn histogram_name(self) -> &'static str {
        match self {
            PairingMethod::TwoForLoops => "delta_eta_two_for_loops",
            PairingMethod::FullNoIndexCheck => "delta_eta_full_no_index_check",
            PairingMethod::Full => "delta_eta_full",
            PairingMethod::Upper => "delta_eta_upper",
            PairingMethod::StrictlyUpper => "delta_eta_strictly_upper",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskConfig {
    /// Collisions (same event) or group pairs (mixed event) per frame
    pub col_max: usize,
    /// Pairs per collision or per group pair
    pub pair_max: usize,
    /// Data frames per run
    pub df_max: usize,
    /// Flip the sign of Δη with probability 1/2
    pub random_swap: bool,
    /// Base seed, frame `k` uses `seed + k`
    pub seed: u64,
    pub track_filter: TrackSelection,
    pub trigger: TrackSelection,
    pub associate: TrackSelection,
    pub methods: Vec<PairingMethod>,
    pub pool_axes: Vec<AxisSpec>,
    pub pool_variables: Vec<PoolVariable>,
    pub ignore_overflows: bool,
    pub mixing: MixingConfig,
    pub delta_eta_axis: AxisSpec,
}

impl Default for TaskConfig {
    fn default() -> Self {
        TaskConfig {
            col_max: 100,
            pair_max: 1_000_000,
            df_max: 100,
            random_swap: true,
            seed: 0,
            track_filter: TrackSelection::default(),
            trigger: TrackSelection::pt_window(0.0, 0.5),
            associate: TrackSelection::pt_window(0.5, 1.0),
            methods: vec![PairingMethod::TwoForLoops, PairingMethod::StrictlyUpper],
            pool_axes: vec![
                AxisSpec::variable(&[-10.0, -2.5, 2.5, 10.0]),
                AxisSpec::variable(&[0.0, 900.0, 1800.0, 6000.0]),
            ],
            pool_variables: vec![PoolVariable::PosZ, PoolVariable::Multiplicity],
            ignore_overflows: true,
            mixing: MixingConfig::default(),
            delta_eta_axis: AxisSpec::uniform(40, -2.0, 2.0),
        }
    }
}

impl TaskConfig {
    /// Read a JSON config; missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: TaskConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.col_max == 0 {
            return Err(MixError::NonPositiveBudget { name: "col_max" }.into());
        }
        if self.pair_max == 0 {
            return Err(MixError::NonPositiveBudget { name: "pair_max" }.into());
        }
        self.mixing.validate()?;
        if self.pool_axes.len() != self.pool_variables.len() {
            return Err(TaskError::Config(format!(
                "{} pool axes but {} pool variables",
                self.pool_axes.len(),
                self.pool_variables.len()
            )));
        }
        self.pool_binning()?;
        BinAxis::from_spec(0, &self.delta_eta_axis)?;
        Ok(())
    }

    pub fn pool_binning(&self) -> Result<PoolBinning> {
        Ok(PoolBinning::from_specs(&self.pool_axes, self.ignore_overflows)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_is_valid() {
        let config = TaskConfig::default();
        config.validate().unwrap();
        assert_eq!(config.pool_binning().unwrap().n_bins(), 16);
        assert_eq!(config.mixing.max_partners, 5);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{"pair_max": 10, "methods": ["full", "upper"], "random_swap": false}"#;
        let config: TaskConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.pair_max, 10);
        assert_eq!(config.col_max, 100);
        assert!(!config.random_swap);
        assert_eq!(config.methods, vec![PairingMethod::Full, PairingMethod::Upper]);
        assert_eq!(config.trigger, TrackSelection::pt_window(0.0, 0.5));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = TaskConfig {
            pair_max: 0,
            ..TaskConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(TaskError::Core(MixError::NonPositiveBudget { name: "pair_max" }))
        ));

        let config = TaskConfig {
            pool_variables: vec![PoolVariable::PosZ],
            ..TaskConfig::default()
        };
        assert!(matches!(config.validate(), Err(TaskError::Config(_))));

        let mut config = TaskConfig::default();
        config.mixing.max_partners = 0;
        assert!(config.validate().is_err());

        let config = TaskConfig {
            delta_eta_axis: AxisSpec::variable(&[1.0, 1.0]),
            ..TaskConfig::default()
        };
        assert!(matches!(config.validate(), Err(TaskError::Core(_))));
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"df_max": 3, "seed": 7}}"#).unwrap();
        let config = TaskConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.df_max, 3);
        assert_eq!(config.seed, 7);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"col_max": 0}}"#).unwrap();
        assert!(TaskConfig::from_json_file(file.path()).is_err());
        assert!(matches!(
            TaskConfig::from_json_file("/nonexistent/config.json"),
            Err(TaskError::Io(_))
        ));
    }
}
