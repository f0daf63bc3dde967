//! Event mixing: pairing records of different groups that share a pool bin.
//!
//! Groups are typically collisions. Each group carries the records it offers
//! as a trigger (first pair member) and as an associate (second member). The
//! mixer walks primaries in collection order and, for each, picks up to
//! `max_partners` other groups from the same pool.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::binning::PoolBinning;
use crate::combinations::{Combinations, IndexSpace, PairPolicy};
use crate::error::{MixError, Result};
use crate::partition::{SliceCache, TrackSelection};
use crate::record::{Collision, PoolVariable, Track};

/// One mixing candidate, e.g. a collision with its selected tracks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoolGroup {
    pub id: usize,
    /// `None` when the group fell outside the pool axes and overflows are ignored
    pub pool_bin: Option<usize>,
    pub triggers: Vec<usize>,
    pub associates: Vec<usize>,
}

impl PoolGroup {
    pub fn new(
        id: usize,
        pool_bin: Option<usize>,
        triggers: Vec<usize>,
        associates: Vec<usize>,
    ) -> Self {
        PoolGroup {
            id,
            pool_bin,
            triggers,
            associates,
        }
    }

    /// Group whose records play both roles.
    pub fn same_kind(id: usize, pool_bin: Option<usize>, records: Vec<usize>) -> Self {
        PoolGroup {
            id,
            pool_bin,
            triggers: records.clone(),
            associates: records,
        }
    }
}

/// Direction in which partners are looked up within a pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartnerScan {
    /// Later groups only, so each unordered group pair appears once
    #[default]
    Forward,
    /// Later groups, then earlier groups, nearest first
    Both,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixingConfig {
    /// Partner groups per primary
    pub max_partners: usize,
    pub skip_self_pairing: bool,
    pub scan: PartnerScan,
    /// Pair policy for `primary.triggers × partner.associates`
    pub policy: PairPolicy,
    pub index_space: IndexSpace,
}

impl Default for MixingConfig {
    fn default() -> Self {
        Self {
            max_partners: 5,
            skip_self_pairing: true,
            scan: PartnerScan::Forward,
            policy: PairPolicy::StrictlyUpper,
            index_space: IndexSpace::Position,
        }
    }
}

impl MixingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_partners == 0 {
            return Err(MixError::NonPositiveBudget {
                name: "max_partners",
            });
        }
        Ok(())
    }
}

/// Validated mixing configuration.
#[derive(Clone, Debug)]
pub struct EventMixer {
    config: MixingConfig,
}

impl EventMixer {
    pub fn new(config: MixingConfig) -> Result<Self> {
        config.validate()?;
        Ok(EventMixer { config })
    }

    pub fn config(&self) -> &MixingConfig {
        &self.config
    }

    /// Lazily pair `groups`. Nothing is scanned until the first pull.
    pub fn mix<'a>(&'a self, groups: &'a [PoolGroup]) -> MixedPairs<'a> {
        MixedPairs {
            groups,
            config: &self.config,
            pools: None,
            next_primary: 0,
            primary: 0,
            partners: Vec::new(),
            cursor: 0,
        }
    }
}

/// One accepted (primary, partner) group pair and its record pairs.
#[derive(Clone, Copy)]
pub struct MixedBatch<'a> {
    pub primary: &'a PoolGroup,
    pub partner: &'a PoolGroup,
    pub pool_bin: usize,
    pub pairs: Combinations<'a, [usize], [usize]>,
}

/// Lazy sequence of [`MixedBatch`]es.
pub struct MixedPairs<'a> {
    groups: &'a [PoolGroup],
    config: &'a MixingConfig,
    // pool bin -> group positions, built on first pull
    pools: Option<HashMap<usize, Vec<usize>>>,
    next_primary: usize,
    primary: usize,
    partners: Vec<usize>,
    cursor: usize,
}

impl<'a> MixedPairs<'a> {
    fn build_pools(groups: &[PoolGroup]) -> HashMap<usize, Vec<usize>> {
        let mut pools: HashMap<usize, Vec<usize>> = HashMap::new();
        for (pos, g) in groups.iter().enumerate() {
            if let Some(bin) = g.pool_bin {
                pools.entry(bin).or_default().push(pos);
            }
        }
        pools
    }

    fn select_partners(
        &self,
        pools: &HashMap<usize, Vec<usize>>,
        p: usize,
        bin: usize,
    ) -> Vec<usize> {
        let members = match pools.get(&bin) {
            Some(m) => m.as_slice(),
            None => return Vec::new(),
        };
        // members are in collection order and contain p
        let rank = members.partition_point(|&m| m < p);
        let own = (!self.config.skip_self_pairing).then_some(p);
        let later = members[rank + 1..].iter().copied();
        let earlier = members[..rank].iter().rev().copied();
        let candidates: Box<dyn Iterator<Item = usize>> = match self.config.scan {
            PartnerScan::Forward => Box::new(own.into_iter().chain(later)),
            PartnerScan::Both => Box::new(own.into_iter().chain(later).chain(earlier)),
        };
        candidates
            .filter(|&q| !self.groups[q].associates.is_empty())
            .take(self.config.max_partners)
            .collect()
    }

    fn batch(&self, q: usize) -> MixedBatch<'a> {
        let groups = self.groups;
        let primary = &groups[self.primary];
        let partner = &groups[q];
        MixedBatch {
            primary,
            partner,
            pool_bin: partner.pool_bin.unwrap_or_default(),
            pairs: Combinations::new(
                primary.triggers.as_slice(),
                partner.associates.as_slice(),
                self.config.policy,
            )
            .with_index_space(self.config.index_space),
        }
    }
}

impl<'a> Iterator for MixedPairs<'a> {
    type Item = MixedBatch<'a>;

    fn next(&mut self) -> Option<MixedBatch<'a>> {
        let pools = self
            .pools
            .take()
            .unwrap_or_else(|| Self::build_pools(self.groups));
        let out = loop {
            if self.cursor < self.partners.len() {
                let q = self.partners[self.cursor];
                self.cursor += 1;
                break Some(self.batch(q));
            }
            if self.next_primary >= self.groups.len() {
                break None;
            }
            let p = self.next_primary;
            self.next_primary += 1;
            let groups = self.groups;
            let g = &groups[p];
            let bin = match g.pool_bin {
                Some(bin) if !g.triggers.is_empty() => bin,
                _ => continue,
            };
            self.primary = p;
            self.partners = self.select_partners(&pools, p, bin);
            self.cursor = 0;
            tracing::trace!(
                primary = g.id,
                pool_bin = bin,
                partners = self.partners.len(),
                "mixing primary"
            );
        };
        self.pools = Some(pools);
        out
    }
}

/// Build one pool group per collision.
///
/// Tracks are sliced by collision id, then split into trigger and associate
/// partitions. The pool bin comes from the collision's `variables`.
pub fn group_collisions(
    collisions: &[Collision],
    tracks: &[Track],
    binning: &PoolBinning,
    variables: &[PoolVariable],
    trigger: &TrackSelection,
    associate: &TrackSelection,
) -> Result<Vec<PoolGroup>> {
    let cache = SliceCache::by_collision(tracks);
    collisions
        .iter()
        .map(|c| {
            let slice = cache.slice(c.global_index);
            let pool_bin = binning.pool_of(&c.features(variables))?;
            Ok(PoolGroup::new(
                c.global_index,
                pool_bin,
                trigger.partition_subset(tracks, slice).indices().to_vec(),
                associate.partition_subset(tracks, slice).indices().to_vec(),
            ))
        })
        .collect()
}
