//! `Multi<T>`: wraps any non-multiplicity `BitVec` `T` (the *occupancy*
//! vector, marking which positions are nonzero) together with a
//! [`SparseBitVec`] of cumulative per-position counts (the *multiplicity*
//! vector), producing a `BitVec` where a 1-bit position can have any
//! count greater than zero.
//!
//! This is how multiplicity is added to representations, such as
//! `DenseBitVec`, that don't support it natively: composition rather than
//! a separate code path per representation.

use crate::bitvec::sparse::{SparseBitVec, SparseBitVecBuilder};
use crate::bitvec::{BitVec, BitVecBuilder};
use std::collections::HashMap;

#[derive(Clone)]
pub struct Multi<T> {
    occupancy: T,
    /// Cumulative multiplicity up through each occupied position, so that
    /// `multiplicity.select1(n-1)` gives the total count through the n-th
    /// nonzero occupancy bit.
    multiplicity: SparseBitVec,
    num_ones: u32,
}

impl<T: BitVec> Multi<T> {
    fn new(occupancy: T, multiplicity: SparseBitVec) -> Self {
        let num_ones = match multiplicity.num_ones() {
            0 => 0,
            n => multiplicity.select1(n - 1),
        };
        Self {
            occupancy,
            multiplicity,
            num_ones,
        }
    }

    /// Rank of unique (occupied) positions below `bit_index`, ignoring
    /// multiplicity. Equivalent to `rank1` on the occupancy vector.
    pub fn unique_rank1(&self, bit_index: u32) -> u32 {
        self.occupancy.rank1(bit_index)
    }

    /// Rank of unoccupied positions below `bit_index`.
    pub fn unique_rank0(&self, bit_index: u32) -> u32 {
        self.occupancy.rank0(bit_index)
    }

    /// Position of the `n`-th unoccupied (zero) bit. Valid even though
    /// `Multi` as a whole reports `has_multiplicity() == true`, since
    /// zero-bit positions of the occupancy vector and of `Multi` coincide.
    pub fn unique_select0(&self, n: u32) -> u32 {
        self.occupancy.select0(n)
    }
}

impl<T: BitVec> BitVec for Multi<T> {
    fn rank1(&self, bit_index: u32) -> u32 {
        match self.occupancy.rank1(bit_index) {
            0 => 0,
            n => self.multiplicity.select1(n - 1),
        }
    }

    fn try_select1(&self, n: u32) -> Option<u32> {
        if n >= self.num_ones {
            return None;
        }
        let i = self.multiplicity.rank1(n + 1);
        self.occupancy.try_select1(i)
    }

    /// Delegates directly to the occupancy vector rather than going through
    /// the default `rank0`-based binary search: occupied and unoccupied
    /// positions coincide between `Multi` and its occupancy vector, so
    /// `occupancy`'s own (possibly accelerated) `try_select0` is exact.
    fn try_select0(&self, n: u32) -> Option<u32> {
        assert!(
            !self.has_multiplicity(),
            "select0 is not supported on a bit vector with multiplicity"
        );
        self.occupancy.try_select0(n)
    }

    fn num_ones(&self) -> u32 {
        self.num_ones
    }

    fn num_unique_ones(&self) -> u32 {
        self.occupancy.num_ones()
    }

    fn universe_size(&self) -> u32 {
        self.occupancy.universe_size()
    }
}

#[derive(Default, Clone)]
pub struct MultiOptions<O: Default + Clone> {
    pub occupancy_options: O,
}

#[derive(Clone)]
pub struct MultiBuilder<B: BitVecBuilder> {
    occupancy: B,
    /// Map from 1-bit index to its accumulated multiplicity (count).
    multiplicity: HashMap<u32, u32>,
}

impl<B: BitVecBuilder> BitVecBuilder for MultiBuilder<B> {
    type Target = Multi<B::Target>;
    type Options = MultiOptions<B::Options>;

    fn new(universe_size: u32) -> Self {
        Self {
            occupancy: B::new(universe_size),
            multiplicity: HashMap::new(),
        }
    }

    fn one_count(&mut self, bit_index: u32, count: u32) {
        if count > 0 {
            self.occupancy.one(bit_index);
            *self.multiplicity.entry(bit_index).or_insert(0) += count;
        }
    }

    fn build_with_options(mut self, options: Self::Options) -> Multi<B::Target> {
        let mut kv: Vec<_> = self.multiplicity.into_iter().collect();
        kv.sort_by_key(|(k, _v)| *k);

        let mut cumulative_counts: Vec<_> = kv.into_iter().map(|(_k, v)| v).collect();
        let mut acc = 0;
        for x in cumulative_counts.iter_mut() {
            acc += *x;
            *x = acc;
        }

        let occupancy = self.occupancy.build_with_options(options.occupancy_options);

        let universe_size = if acc > 0 { acc + 1 } else { 0 };
        let multiplicity = SparseBitVecBuilder::from_ones(universe_size, &cumulative_counts);
        Multi::new(occupancy, multiplicity)
    }
}
