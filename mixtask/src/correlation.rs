//! Same-event and mixed-event Δη / Δφ correlation tasks.
//!
//! A task instance owns its histograms and its random stream and processes
//! data frames one at a time. Frame budgets live in the driver.

use mixcore::angles::delta_phi;
use mixcore::{
    group_collisions, AxisSpec, Combinations, EventMixer, PairPolicy, PoolBinning, PoolVariable,
    SliceCache, Track, TrackSelection,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{PairingMethod, TaskConfig};
use crate::dataframe::DataFrame;
use crate::error::{Result, TaskError};
use crate::histogram::Histogram1D;

/// One mixed-event correlation row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPair {
    /// φ_assoc − φ_trig in `[-π/2, 3π/2)`
    pub delta_phi: f64,
    /// η_assoc − η_trig
    pub delta_eta: f64,
    pub pt_trigger: f64,
    pub pt_associate: f64,
    /// Pool bin of the partner collision
    pub pool_bin: usize,
}

/// Everything a task produced, mergeable across frames.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskOutput {
    pub frames_processed: usize,
    pub histograms: Vec<Histogram1D>,
    pub pairs: Vec<CorrelationPair>,
}

impl TaskOutput {
    pub fn histogram(&self, name: &str) -> Option<&Histogram1D> {
        self.histograms.iter().find(|h| h.name == name)
    }

    /// Add `other` into `self`; histograms are matched by position.
    pub fn merge(&mut self, other: TaskOutput) -> Result<()> {
        if self.histograms.len() != other.histograms.len() {
            return Err(TaskError::Config(format!(
                "cannot merge outputs with {} and {} histograms",
                self.histograms.len(),
                other.histograms.len()
            )));
        }
        for (a, b) in self.histograms.iter_mut().zip(&other.histograms) {
            a.merge(b)?;
        }
        self.frames_processed += other.frames_processed;
        self.pairs.extend(other.pairs);
        Ok(())
    }
}

/// A per-frame analysis the driver can fan out over frames.
pub trait CorrelationTask: Sized {
    /// Fresh task with its own random stream.
    fn new(config: &TaskConfig, seed: u64) -> Result<Self>;

    fn process(&mut self, frame: &DataFrame) -> Result<()>;

    fn into_output(self) -> TaskOutput;
}

fn fill_delta_eta(h: &mut Histogram1D, rng: &mut StdRng, random_swap: bool, a: &Track, b: &Track) {
    let mut delta = a.eta - b.eta;
    if random_swap && rng.gen_bool(0.5) {
        delta = -delta;
    }
    h.fill(delta);
}

/// Reference pairing: two plain loops with a position check. The last
/// record of `first` never opens a row.
fn nested_loop_pairs<'a>(
    first: &'a [usize],
    second: &'a [usize],
) -> impl Iterator<Item = (usize, usize)> + 'a {
    let rows = first.len().saturating_sub(1);
    first[..rows].iter().enumerate().flat_map(move |(i, &a)| {
        second
            .iter()
            .enumerate()
            .filter(move |&(j, _)| i < j)
            .map(move |(_, &b)| (a, b))
    })
}

fn pairs_for<'a>(
    method: PairingMethod,
    first: &'a [usize],
    second: &'a [usize],
) -> Box<dyn Iterator<Item = (usize, usize)> + 'a> {
    let last_row = first.len().saturating_sub(1);
    let generated = |policy| Combinations::new(first, second, policy).iter();
    match method {
        PairingMethod::TwoForLoops => Box::new(nested_loop_pairs(first, second)),
        PairingMethod::FullNoIndexCheck => {
            Box::new(generated(PairPolicy::Full).map(|p| p.index))
        }
        PairingMethod::Full => Box::new(
            generated(PairPolicy::Full)
                .take_while(move |p| p.pos.0 < last_row)
                .filter(|p| p.pos.0 < p.pos.1)
                .map(|p| p.index),
        ),
        PairingMethod::Upper => Box::new(
            generated(PairPolicy::Upper)
                .take_while(move |p| p.pos.0 < last_row)
                .filter(|p| p.pos.0 < p.pos.1)
                .map(|p| p.index),
        ),
        PairingMethod::StrictlyUpper => {
            Box::new(generated(PairPolicy::StrictlyUpper).map(|p| p.index))
        }
    }
}

/// One Δη histogram per enabled pairing method.
struct MethodHistograms {
    methods: Vec<PairingMethod>,
    histograms: Vec<Histogram1D>,
    pair_max: usize,
    random_swap: bool,
}

impl MethodHistograms {
    fn new(config: &TaskConfig, suffix: &str) -> Result<Self> {
        let histograms = config
            .methods
            .iter()
            .map(|m| {
                let name = format!("{}{}", m.histogram_name(), suffix);
                Histogram1D::new(name, &config.delta_eta_axis)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(MethodHistograms {
            methods: config.methods.clone(),
            histograms,
            pair_max: config.pair_max,
            random_swap: config.random_swap,
        })
    }

    /// Fill every method from `first x second`, at most `pair_max` pairs
    /// each. Returns the number of pairs filled.
    fn fill(
        &mut self,
        rng: &mut StdRng,
        tracks: &[Track],
        first: &[usize],
        second: &[usize],
    ) -> usize {
        let mut n = 0;
        for (method, h) in self.methods.iter().zip(self.histograms.iter_mut()) {
            for (a, b) in pairs_for(*method, first, second).take(self.pair_max) {
                fill_delta_eta(h, rng, self.random_swap, &tracks[a], &tracks[b]);
                n += 1;
            }
        }
        n
    }
}

/// Δη between trigger and associate tracks of the same collision, one
/// histogram per enabled pairing method.
pub struct SameEventTask {
    trigger: TrackSelection,
    associate: TrackSelection,
    col_max: usize,
    rng: StdRng,
    histograms: MethodHistograms,
    frames_processed: usize,
}

impl SameEventTask {
    pub fn histograms(&self) -> &[Histogram1D] {
        &self.histograms.histograms
    }
}

impl CorrelationTask for SameEventTask {
    fn new(config: &TaskConfig, seed: u64) -> Result<Self> {
        Ok(SameEventTask {
            trigger: config.trigger.clone(),
            associate: config.associate.clone(),
            col_max: config.col_max,
            rng: StdRng::seed_from_u64(seed),
            histograms: MethodHistograms::new(config, "")?,
            frames_processed: 0,
        })
    }

    fn process(&mut self, frame: &DataFrame) -> Result<()> {
        let tracks = &frame.tracks;
        let cache = SliceCache::by_collision(tracks);
        let mut n_pairs = 0usize;

        for collision in frame.collisions.iter().take(self.col_max) {
            let slice = cache.slice(collision.global_index);
            let triggers = self.trigger.partition_subset(tracks, slice);
            let associates = self.associate.partition_subset(tracks, slice);
            debug!(
                collision = collision.global_index,
                triggers = triggers.len(),
                associates = associates.len(),
                "same-event collision"
            );
            n_pairs += self.histograms.fill(
                &mut self.rng,
                tracks,
                triggers.indices(),
                associates.indices(),
            );
        }

        self.frames_processed += 1;
        info!(
            collisions = frame.collisions.len().min(self.col_max),
            tracks = tracks.len(),
            pairs = n_pairs,
            "same-event frame done"
        );
        Ok(())
    }

    fn into_output(self) -> TaskOutput {
        TaskOutput {
            frames_processed: self.frames_processed,
            histograms: self.histograms.histograms,
            pairs: Vec::new(),
        }
    }
}

/// Trigger x associate correlations between collisions sharing a pool bin.
///
/// Every enabled pairing method fills its own Δη histogram from each mixed
/// batch. Correlation rows follow the mixer's own pair policy.
pub struct MixedEventTask {
    trigger: TrackSelection,
    associate: TrackSelection,
    binning: PoolBinning,
    variables: Vec<PoolVariable>,
    mixer: EventMixer,
    col_max: usize,
    pair_max: usize,
    rng: StdRng,
    delta_eta: MethodHistograms,
    trigger_pool_bins: Histogram1D,
    partner_pool_bins: Histogram1D,
    pairs: Vec<CorrelationPair>,
    frames_processed: usize,
}

impl MixedEventTask {
    pub fn pairs(&self) -> &[CorrelationPair] {
        &self.pairs
    }

    pub fn histograms(&self) -> &[Histogram1D] {
        &self.delta_eta.histograms
    }
}

impl CorrelationTask for MixedEventTask {
    fn new(config: &TaskConfig, seed: u64) -> Result<Self> {
        let binning = config.pool_binning()?;
        let n_pools = binning.n_bins();
        let pool_axis = AxisSpec::uniform(n_pools, 0.0, n_pools as f64);
        Ok(MixedEventTask {
            trigger: config.trigger.clone(),
            associate: config.associate.clone(),
            variables: config.pool_variables.clone(),
            mixer: EventMixer::new(config.mixing.clone())?,
            col_max: config.col_max,
            pair_max: config.pair_max,
            rng: StdRng::seed_from_u64(seed),
            delta_eta: MethodHistograms::new(config, "_mixed")?,
            trigger_pool_bins: Histogram1D::new("pool_bin_trigger", &pool_axis)?,
            partner_pool_bins: Histogram1D::new("pool_bin_partner", &pool_axis)?,
            binning,
            pairs: Vec::new(),
            frames_processed: 0,
        })
    }

    fn process(&mut self, frame: &DataFrame) -> Result<()> {
        let tracks = &frame.tracks;
        let groups = group_collisions(
            &frame.collisions,
            tracks,
            &self.binning,
            &self.variables,
            &self.trigger,
            &self.associate,
        )?;
        let before = self.pairs.len();
        let mut n_batches = 0usize;
        let mut n_filled = 0usize;

        for batch in self.mixer.mix(&groups).take(self.col_max) {
            n_batches += 1;
            debug!(
                primary = batch.primary.id,
                partner = batch.partner.id,
                pool_bin = batch.pool_bin,
                "mixed batch"
            );
            if let Some(bin) = batch.primary.pool_bin {
                self.trigger_pool_bins.fill(bin as f64);
            }
            self.partner_pool_bins.fill(batch.pool_bin as f64);

            n_filled += self.delta_eta.fill(
                &mut self.rng,
                tracks,
                &batch.primary.triggers,
                &batch.partner.associates,
            );
            for pair in batch.pairs.iter().take(self.pair_max) {
                let trig = &tracks[pair.index.0];
                let assoc = &tracks[pair.index.1];
                self.pairs.push(CorrelationPair {
                    delta_phi: delta_phi(assoc.phi, trig.phi),
                    delta_eta: assoc.eta - trig.eta,
                    pt_trigger: trig.pt,
                    pt_associate: assoc.pt,
                    pool_bin: batch.pool_bin,
                });
            }
        }

        self.frames_processed += 1;
        info!(
            groups = groups.len(),
            batches = n_batches,
            filled = n_filled,
            pairs = self.pairs.len() - before,
            "mixed-event frame done"
        );
        Ok(())
    }

    fn into_output(self) -> TaskOutput {
        let mut histograms = self.delta_eta.histograms;
        histograms.push(self.trigger_pool_bins);
        histograms.push(self.partner_pool_bins);
        TaskOutput {
            frames_processed: self.frames_processed,
            histograms,
            pairs: self.pairs,
        }
    }
}
