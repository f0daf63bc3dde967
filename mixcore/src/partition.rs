//! Partitions and per-key slices over read-only collections.
//!
//! A [`Partition`] is the ordered list of parent indices whose records pass a
//! predicate. Positions inside the partition are the "filtered index" of a
//! record; the stored values are indices into the parent collection.

use std::collections::HashMap;

use itertools::{Either, Itertools};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::record::Track;

/// Ordered sub-sequence of a collection's indices.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Partition {
    indices: Vec<usize>,
}

impl Partition {
    /// Bind to a whole collection.
    pub fn bind<R, F>(records: &[R], predicate: F) -> Self
    where
        F: Fn(&R) -> bool,
    {
        let indices = records
            .iter()
            .enumerate()
            .filter(|(_, r)| predicate(r))
            .map(|(i, _)| i)
            .collect();
        Partition { indices }
    }

    /// Bind to a whole collection, evaluating the predicate in parallel.
    /// Order is the same as [`Partition::bind`].
    pub fn bind_par<R, F>(records: &[R], predicate: F) -> Self
    where
        R: Sync,
        F: Fn(&R) -> bool + Sync,
    {
        let indices = records
            .par_iter()
            .enumerate()
            .filter(|(_, r)| predicate(r))
            .map(|(i, _)| i)
            .collect();
        Partition { indices }
    }

    /// Bind to a pre-selected subset of a collection (e.g. one collision's
    /// slice). Subset entries past the end of `records` are skipped.
    pub fn bind_subset<R, F>(records: &[R], subset: &[usize], predicate: F) -> Self
    where
        F: Fn(&R) -> bool,
    {
        let indices = subset
            .iter()
            .copied()
            .filter(|&i| records.get(i).is_some_and(|r| predicate(r)))
            .collect();
        Partition { indices }
    }

    /// Recompute against a new revision of the collection.
    pub fn rebind<R, F>(&mut self, records: &[R], predicate: F)
    where
        F: Fn(&R) -> bool,
    {
        self.indices.clear();
        self.indices.extend(
            records
                .iter()
                .enumerate()
                .filter(|(_, r)| predicate(r))
                .map(|(i, _)| i),
        );
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// `(filtered_index, parent_index)` in order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.indices.iter().copied().enumerate()
    }

    /// The selected records themselves.
    pub fn records<'a, R>(&'a self, records: &'a [R]) -> impl Iterator<Item = &'a R> + 'a {
        self.indices.iter().filter_map(move |&i| records.get(i))
    }

    /// Record at a filtered position.
    pub fn get<'a, R>(&self, records: &'a [R], filtered_index: usize) -> Option<&'a R> {
        self.indices.get(filtered_index).and_then(|&i| records.get(i))
    }
}

/// Row indices of a table grouped by a foreign key.
///
/// Built once per table; slicing afterwards is a hash lookup.
#[derive(Clone, Debug, Default)]
pub struct SliceCache {
    slices: HashMap<usize, Vec<usize>>,
    orphans: Vec<usize>,
}

impl SliceCache {
    pub fn build<R, F>(records: &[R], key: F) -> Self
    where
        F: Fn(&R) -> Option<usize>,
    {
        let (keyed, orphans): (Vec<(usize, usize)>, Vec<usize>) =
            records.iter().enumerate().partition_map(|(i, r)| match key(r) {
                Some(k) => Either::Left((k, i)),
                None => Either::Right(i),
            });
        SliceCache {
            slices: keyed.into_iter().into_group_map(),
            orphans,
        }
    }

    /// Tracks grouped by their collision id.
    pub fn by_collision(tracks: &[Track]) -> Self {
        Self::build(tracks, |t| t.collision_id)
    }

    /// Rows carrying `key`, in table order. Empty when the key is unknown.
    pub fn slice(&self, key: usize) -> &[usize] {
        self.slices.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Rows without a key.
    pub fn orphans(&self) -> &[usize] {
        &self.orphans
    }

    /// Number of distinct keys.
    pub fn n_keys(&self) -> usize {
        self.slices.len()
    }
}

/// Kinematic window for tracks.
///
/// Both windows are half-open, `[min, max)`. Use `f64::MAX` / `-f64::MAX` to
/// leave a side open.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackSelection {
    pub pt_min: f64,
    pub pt_max: f64,
    pub eta_min: f64,
    pub eta_max: f64,
}

impl Default for TrackSelection {
    fn default() -> Self {
        Self {
            pt_min: 0.0,
            pt_max: f64::MAX,
            eta_min: -f64::MAX,
            eta_max: f64::MAX,
        }
    }
}

impl TrackSelection {
    /// Only constrain transverse momentum.
    pub fn pt_window(pt_min: f64, pt_max: f64) -> Self {
        Self {
            pt_min,
            pt_max,
            ..Self::default()
        }
    }

    #[inline]
    pub fn passes(&self, t: &Track) -> bool {
        t.pt >= self.pt_min && t.pt < self.pt_max && t.eta >= self.eta_min && t.eta < self.eta_max
    }

    pub fn partition(&self, tracks: &[Track]) -> Partition {
        Partition::bind(tracks, |t| self.passes(t))
    }

    pub fn partition_par(&self, tracks: &[Track]) -> Partition {
        Partition::bind_par(tracks, |t| self.passes(t))
    }

    /// Partition restricted to a slice, typically one collision's tracks.
    pub fn partition_subset(&self, tracks: &[Track], subset: &[usize]) -> Partition {
        Partition::bind_subset(tracks, subset, |t| self.passes(t))
    }

    /// Filter in place, returning count of removed tracks.
    pub fn filter_in_place(&self, tracks: &mut Vec<Track>) -> usize {
        let before = tracks.len();
        tracks.retain(|t| self.passes(t));
        before - tracks.len()
    }
}
