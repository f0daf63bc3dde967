//! Lazy pair enumeration over one or two index sequences.
//!
//! [`Combinations`] is a cheap, restartable description of the pairs to visit;
//! every call to [`Combinations::iter`] walks them again from the start. The
//! sequences are borrowed immutably for the lifetime of the generator, so a
//! caller may stop pulling at any point without cleanup.

use std::iter::FusedIterator;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::partition::Partition;

/// Which `(i, j)` pairs are emitted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairPolicy {
    /// Every `(i, j)`, diagonal included
    Full,
    /// `j >= i`
    Upper,
    /// `j > i`; on a single sequence this is each unordered pair once
    #[default]
    StrictlyUpper,
}

impl PairPolicy {
    /// Whether `(a, b)` satisfies the policy's ordering constraint.
    #[inline]
    pub fn accepts(self, a: usize, b: usize) -> bool {
        match self {
            PairPolicy::Full => true,
            PairPolicy::Upper => b >= a,
            PairPolicy::StrictlyUpper => b > a,
        }
    }
}

/// What `i` and `j` mean when `Upper` / `StrictlyUpper` compare them.
///
/// `Position` compares positions inside each sequence, which is only
/// meaningful when both sequences are views on comparable data (the same
/// partition, or partitions whose positions the caller wants aligned).
/// `Parent` compares the stored parent indices; both sequences must then
/// index the same parent collection. Mixing a filtered position with a raw
/// global index is a caller error and is not detected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexSpace {
    #[default]
    Position,
    Parent,
}

/// A random-access sequence of parent indices.
pub trait IndexSequence {
    fn len(&self) -> usize;

    /// Parent index stored at `pos`. Callers stay below `len()`.
    fn index_at(&self, pos: usize) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IndexSequence for [usize] {
    fn len(&self) -> usize {
        <[usize]>::len(self)
    }

    fn index_at(&self, pos: usize) -> usize {
        self[pos]
    }
}

impl IndexSequence for Vec<usize> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn index_at(&self, pos: usize) -> usize {
        self[pos]
    }
}

impl IndexSequence for Range<usize> {
    fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    fn index_at(&self, pos: usize) -> usize {
        self.start + pos
    }
}

impl IndexSequence for Partition {
    fn len(&self) -> usize {
        self.indices().len()
    }

    fn index_at(&self, pos: usize) -> usize {
        self.indices()[pos]
    }
}

/// One emitted pair: positions within each sequence and the parent indices
/// stored there.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IndexPair {
    pub pos: (usize, usize),
    pub index: (usize, usize),
}

impl IndexPair {
    /// The same pair with its members exchanged.
    pub fn swapped(self) -> Self {
        IndexPair {
            pos: (self.pos.1, self.pos.0),
            index: (self.index.1, self.index.0),
        }
    }
}

/// Pair generator over `first × second` under a [`PairPolicy`].
pub struct Combinations<'a, A: ?Sized, B: ?Sized> {
    first: &'a A,
    second: &'a B,
    policy: PairPolicy,
    space: IndexSpace,
}

impl<A: ?Sized, B: ?Sized> Clone for Combinations<'_, A, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A: ?Sized, B: ?Sized> Copy for Combinations<'_, A, B> {}

impl<'a, A, B> Combinations<'a, A, B>
where
    A: IndexSequence + ?Sized,
    B: IndexSequence + ?Sized,
{
    pub fn new(first: &'a A, second: &'a B, policy: PairPolicy) -> Self {
        Combinations {
            first,
            second,
            policy,
            space: IndexSpace::Position,
        }
    }

    pub fn with_index_space(mut self, space: IndexSpace) -> Self {
        self.space = space;
        self
    }

    pub fn policy(&self) -> PairPolicy {
        self.policy
    }

    pub fn index_space(&self) -> IndexSpace {
        self.space
    }

    pub fn iter(&self) -> CombinationIter<'a, A, B> {
        let mut it = CombinationIter {
            first: self.first,
            second: self.second,
            policy: self.policy,
            space: self.space,
            i: 0,
            j: 0,
        };
        it.j = it.row_start(0);
        it
    }

    /// Number of pairs one full iteration yields.
    pub fn pair_count(&self) -> usize {
        let (n1, n2) = (self.first.len(), self.second.len());
        match (self.space, self.policy) {
            (_, PairPolicy::Full) => n1 * n2,
            (IndexSpace::Position, PairPolicy::Upper) => (0..n1.min(n2)).map(|i| n2 - i).sum(),
            (IndexSpace::Position, PairPolicy::StrictlyUpper) => (0..n1.saturating_sub(1).min(n2))
                .map(|i| n2 - i - 1)
                .sum(),
            (IndexSpace::Parent, _) => self.iter().count(),
        }
    }
}

impl<'a, A> Combinations<'a, A, A>
where
    A: IndexSequence + ?Sized,
{
    /// Pairs within a single sequence.
    pub fn same(seq: &'a A, policy: PairPolicy) -> Self {
        Self::new(seq, seq, policy)
    }
}

impl<'a, A, B> IntoIterator for &Combinations<'a, A, B>
where
    A: IndexSequence + ?Sized,
    B: IndexSequence + ?Sized,
{
    type Item = IndexPair;
    type IntoIter = CombinationIter<'a, A, B>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, A, B> IntoIterator for Combinations<'a, A, B>
where
    A: IndexSequence + ?Sized,
    B: IndexSequence + ?Sized,
{
    type Item = IndexPair;
    type IntoIter = CombinationIter<'a, A, B>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Cursor state of one pass over a [`Combinations`].
pub struct CombinationIter<'a, A: ?Sized, B: ?Sized> {
    first: &'a A,
    second: &'a B,
    policy: PairPolicy,
    space: IndexSpace,
    i: usize,
    j: usize,
}

impl<A, B> CombinationIter<'_, A, B>
where
    A: IndexSequence + ?Sized,
    B: IndexSequence + ?Sized,
{
    #[inline]
    fn row_start(&self, i: usize) -> usize {
        match (self.space, self.policy) {
            (IndexSpace::Position, PairPolicy::Upper) => i,
            (IndexSpace::Position, PairPolicy::StrictlyUpper) => i + 1,
            _ => 0,
        }
    }

    /// Rows of `first` that may emit pairs. Under positional `StrictlyUpper`
    /// the last row is never used, whatever the length of `second`.
    #[inline]
    fn rows(&self) -> usize {
        let n1 = self.first.len();
        match (self.space, self.policy) {
            (IndexSpace::Position, PairPolicy::StrictlyUpper) => n1.saturating_sub(1),
            _ => n1,
        }
    }
}

impl<A, B> Iterator for CombinationIter<'_, A, B>
where
    A: IndexSequence + ?Sized,
    B: IndexSequence + ?Sized,
{
    type Item = IndexPair;

    fn next(&mut self) -> Option<IndexPair> {
        let n1 = self.rows();
        let n2 = self.second.len();
        while self.i < n1 {
            if self.j >= n2 {
                self.i += 1;
                self.j = self.row_start(self.i);
                // positional rows only start later as i grows
                if self.space == IndexSpace::Position
                    && self.policy != PairPolicy::Full
                    && self.j >= n2
                {
                    self.i = n1;
                }
                continue;
            }
            let (i, j) = (self.i, self.j);
            self.j += 1;
            let a = self.first.index_at(i);
            let b = self.second.index_at(j);
            if self.space == IndexSpace::Parent && !self.policy.accepts(a, b) {
                continue;
            }
            return Some(IndexPair {
                pos: (i, j),
                index: (a, b),
            });
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n1 = self.rows();
        let n2 = self.second.len();
        if self.i >= n1 {
            return (0, Some(0));
        }
        let upper = n2.saturating_sub(self.j) + (n1 - self.i - 1) * n2;
        (0, Some(upper))
    }
}

impl<A, B> FusedIterator for CombinationIter<'_, A, B>
where
    A: IndexSequence + ?Sized,
    B: IndexSequence + ?Sized,
{
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn positions<A, B>(c: &Combinations<'_, A, B>) -> Vec<(usize, usize)>
    where
        A: IndexSequence + ?Sized,
        B: IndexSequence + ?Sized,
    {
        c.iter().map(|p| p.pos).collect()
    }

    #[test]
    fn test_three_element_scenario() {
        let s = vec![0usize, 1, 2];
        let strict = Combinations::same(&s, PairPolicy::StrictlyUpper);
        assert_eq!(positions(&strict), vec![(0, 1), (0, 2), (1, 2)]);

        let full = Combinations::same(&s, PairPolicy::Full);
        let pairs = positions(&full);
        assert_eq!(pairs.len(), 9);
        assert!(pairs.contains(&(1, 1)));

        let upper = Combinations::same(&s, PairPolicy::Upper);
        assert_eq!(
            positions(&upper),
            vec![(0, 0), (0, 1), (0, 2), (1, 1), (1, 2), (2, 2)]
        );
    }

    #[test]
    fn test_empty_sequences_yield_nothing() {
        let empty: Vec<usize> = Vec::new();
        let some = vec![3usize, 4];
        for policy in [PairPolicy::Full, PairPolicy::Upper, PairPolicy::StrictlyUpper] {
            assert_eq!(Combinations::new(&empty, &some, policy).iter().count(), 0);
            assert_eq!(Combinations::new(&some, &empty, policy).iter().count(), 0);
            assert_eq!(Combinations::new(&some, &empty, policy).pair_count(), 0);
        }
    }

    #[test]
    fn test_restartable_and_deterministic() {
        let a = vec![5usize, 7, 9, 11];
        let b = 2..5;
        let c = Combinations::new(&a, &b, PairPolicy::Upper);
        let first: Vec<IndexPair> = c.iter().collect();
        let second: Vec<IndexPair> = (&c).into_iter().collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), c.pair_count());
        // abandoning a pass leaves the generator untouched
        let mut partial = c.iter();
        partial.next();
        assert_eq!(c.iter().next(), first.first().copied());
    }

    #[test]
    fn test_index_pairs_carry_parent_indices() {
        let a = vec![10usize, 20, 30];
        let b = vec![11usize, 21];
        let pairs: Vec<IndexPair> = Combinations::new(&a, &b, PairPolicy::StrictlyUpper)
            .iter()
            .collect();
        assert_eq!(
            pairs,
            vec![IndexPair {
                pos: (0, 1),
                index: (10, 21)
            }]
        );
        assert_eq!(pairs[0].swapped().index, (21, 10));
        assert_eq!(pairs[0].swapped().pos, (1, 0));
    }

    #[test]
    fn test_strictly_upper_skips_last_row_of_first_sequence() {
        let a = vec![0usize, 1];
        let b = vec![0usize, 1, 2, 3];
        let c = Combinations::new(&a, &b, PairPolicy::StrictlyUpper);
        assert_eq!(positions(&c), vec![(0, 1), (0, 2), (0, 3)]);
        assert_eq!(c.pair_count(), 3);
        assert_eq!(c.iter().size_hint(), (0, Some(3)));

        let single = vec![7usize];
        let c = Combinations::new(&single, &b, PairPolicy::StrictlyUpper);
        assert_eq!(c.iter().next(), None);
        assert_eq!(c.pair_count(), 0);

        // shorter second sequence is bounded by j > i anyway
        let c = Combinations::new(&b, &a, PairPolicy::StrictlyUpper);
        assert_eq!(positions(&c), vec![(0, 1)]);
        assert_eq!(c.pair_count(), 1);
    }

    #[test]
    fn test_parent_index_space_for_two_partitions() {
        // two partitions of one parent collection
        let low = vec![0usize, 2, 4];
        let high = vec![1usize, 2, 3];
        let by_position = Combinations::new(&low, &high, PairPolicy::StrictlyUpper);
        assert_eq!(by_position.pair_count(), 3);

        let by_parent = by_position.with_index_space(IndexSpace::Parent);
        let idx: Vec<(usize, usize)> = by_parent.iter().map(|p| p.index).collect();
        assert_eq!(idx, vec![(0, 1), (0, 2), (0, 3), (2, 3)]);
        assert_eq!(by_parent.pair_count(), 4);

        let upper =
            Combinations::new(&low, &high, PairPolicy::Upper).with_index_space(IndexSpace::Parent);
        assert_eq!(upper.pair_count(), 5);
    }

    #[test]
    fn test_partition_as_sequence() {
        let values = [0.1, 0.9, 0.2, 0.8, 0.3];
        let p = Partition::bind(&values, |&v| v < 0.5);
        let c = Combinations::same(&p, PairPolicy::StrictlyUpper);
        let idx: Vec<(usize, usize)> = c.iter().map(|p| p.index).collect();
        assert_eq!(idx, vec![(0, 2), (0, 4), (2, 4)]);
    }

    #[test]
    fn test_size_hint_bounds_remaining() {
        let a = vec![0usize, 1, 2];
        let c = Combinations::same(&a, PairPolicy::Full);
        let mut it = c.iter();
        assert_eq!(it.size_hint(), (0, Some(9)));
        it.next();
        assert_eq!(it.size_hint(), (0, Some(8)));
        assert_eq!(it.by_ref().count(), 8);
        assert_eq!(it.size_hint(), (0, Some(0)));
        assert_eq!(it.next(), None);
    }

    proptest! {
        #[test]
        fn prop_same_sequence_counts(n in 0usize..40) {
            let s: Vec<usize> = (0..n).collect();
            prop_assert_eq!(Combinations::same(&s, PairPolicy::Full).iter().count(), n * n);
            prop_assert_eq!(
                Combinations::same(&s, PairPolicy::Upper).iter().count(),
                n * (n + 1) / 2
            );
            prop_assert_eq!(
                Combinations::same(&s, PairPolicy::StrictlyUpper).iter().count(),
                n * n.saturating_sub(1) / 2
            );
        }

        #[test]
        fn prop_strictly_upper_never_pairs_with_itself(
            n in 0usize..40,
            space in prop_oneof![Just(IndexSpace::Position), Just(IndexSpace::Parent)],
        ) {
            let s: Vec<usize> = (0..n).map(|i| 3 * i).collect();
            let c = Combinations::same(&s, PairPolicy::StrictlyUpper).with_index_space(space);
            let mut seen = HashSet::new();
            for p in c.iter() {
                prop_assert!(p.pos.0 != p.pos.1);
                prop_assert!(seen.insert((p.pos.0.min(p.pos.1), p.pos.0.max(p.pos.1))));
            }
            prop_assert_eq!(seen.len(), n * n.saturating_sub(1) / 2);
        }

        #[test]
        fn prop_full_on_disjoint_sequences(n1 in 0usize..25, n2 in 0usize..25) {
            let a: Vec<usize> = (0..n1).collect();
            let b: Vec<usize> = (100..100 + n2).collect();
            let c = Combinations::new(&a, &b, PairPolicy::Full);
            let pairs: HashSet<(usize, usize)> = c.iter().map(|p| p.index).collect();
            prop_assert_eq!(pairs.len(), n1 * n2);
            prop_assert_eq!(c.iter().count(), n1 * n2);
        }

        #[test]
        fn prop_pair_count_matches_iteration(n1 in 0usize..20, n2 in 0usize..20) {
            let a: Vec<usize> = (0..n1).collect();
            let b: Vec<usize> = (0..n2).collect();
            for policy in [PairPolicy::Full, PairPolicy::Upper, PairPolicy::StrictlyUpper] {
                let c = Combinations::new(&a, &b, policy);
                prop_assert_eq!(c.pair_count(), c.iter().count());
                prop_assert!(c.pair_count() <= n1 * n2);
            }
        }
    }
}
