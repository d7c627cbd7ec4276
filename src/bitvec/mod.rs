//! The shared bit vector contract implemented by every representation in
//! this crate ([`crate::SortedArrayBitVec`], [`crate::SparseBitVec`],
//! [`crate::RLEBitVec`], [`crate::DenseBitVec`], [`crate::Multi`]).
//!
//! Rather than dispatch dynamically on a shared interface, each variant is a
//! concrete type implementing the same `BitVec` trait; the handful of
//! operations that every representation computes the same way (`rank0` from
//! `rank1`, `select0`/`select1` from `rank0`/`rank1` by binary search, `get`
//! from two `rank1` calls) are default trait methods shared at compile time
//! rather than injected through dynamic dispatch.

pub mod dense;
pub mod multi;
pub mod rle;
pub mod sorted_array;
pub mod sparse;

#[cfg(test)]
pub(crate) mod test;

use crate::bits::partition_point;

/// A fixed-length sequence of bits answering rank and select queries.
///
/// Some implementations (`SparseBitVec`, `SortedArrayBitVec`, and any
/// `BitVec` produced by [`multi::Multi`]) admit *multiplicity*: a 1-bit
/// position can contribute more than one to `rank1`. 0-bit positions never
/// repeat. `rank0` and `select0` are undefined when multiplicity is present
/// and will panic rather than return a meaningless answer.
pub trait BitVec: Clone {
    /// Number of 1-bits at positions strictly less than `bit_index`.
    fn rank1(&self, bit_index: u32) -> u32;

    /// Number of 0-bits at positions strictly less than `bit_index`.
    ///
    /// Panics if this bit vector has multiplicity, since then
    /// `bit_index - rank1(bit_index)` would not count 0-bits.
    fn rank0(&self, bit_index: u32) -> u32 {
        assert!(
            !self.has_multiplicity(),
            "rank0 is not supported on a bit vector with multiplicity"
        );
        if bit_index >= self.universe_size() {
            self.num_zeros()
        } else {
            bit_index - self.rank1(bit_index)
        }
    }

    /// The bit index of the `n`-th (0-indexed) occurrence of a 1-bit, or
    /// `None` if there is no such occurrence.
    ///
    /// The default implementation binary searches `rank1`, which is correct
    /// but slow (`O(log(universe_size))` `rank1` calls); representations
    /// that can do better should override it.
    fn try_select1(&self, n: u32) -> Option<u32> {
        if n >= self.num_ones() {
            return None;
        }
        let universe = self.universe_size() as usize;
        let bit_index = partition_point(universe, |i| self.rank1(i as u32) <= n) - 1;
        Some(bit_index as u32)
    }

    /// Like [`Self::try_select1`], but panics instead of returning `None`
    /// when `n` is out of range.
    fn select1(&self, n: u32) -> u32 {
        self.try_select1(n).unwrap_or_else(|| {
            panic!(
                "select1({}) out of range: num_ones = {}",
                n,
                self.num_ones()
            )
        })
    }

    /// The bit index of the `n`-th (0-indexed) occurrence of a 0-bit, or
    /// `None` if there is no such occurrence.
    ///
    /// Panics if this bit vector has multiplicity.
    fn try_select0(&self, n: u32) -> Option<u32> {
        assert!(
            !self.has_multiplicity(),
            "select0 is not supported on a bit vector with multiplicity"
        );
        if n >= self.num_zeros() {
            return None;
        }
        let universe = self.universe_size() as usize;
        let bit_index = partition_point(universe, |i| self.rank0(i as u32) <= n) - 1;
        Some(bit_index as u32)
    }

    /// Like [`Self::try_select0`], but panics instead of returning `None`
    /// when `n` is out of range.
    fn select0(&self, n: u32) -> u32 {
        self.try_select0(n).unwrap_or_else(|| {
            panic!(
                "select0({}) out of range: num_zeros = {}",
                n,
                self.num_zeros()
            )
        })
    }

    /// The value of the bit at `bit_index`: 0 or 1, or the multiplicity of
    /// that position if this bit vector has multiplicity.
    ///
    /// Relatively inefficient, since it performs two `rank1` calls.
    fn get(&self, bit_index: u32) -> u32 {
        assert!(
            bit_index < self.universe_size(),
            "bit index {} cannot equal or exceed universe size {}",
            bit_index,
            self.universe_size()
        );
        self.rank1(bit_index + 1) - self.rank1(bit_index)
    }

    fn universe_size(&self) -> u32;

    /// Total count of 1-bits, counting multiplicity.
    fn num_ones(&self) -> u32;

    /// Total count of 0-bits. Equal to `universe_size - num_unique_ones`,
    /// since multiplicity (if any) only ever applies to 1-bits.
    fn num_zeros(&self) -> u32 {
        self.universe_size() - self.num_unique_ones()
    }

    /// Count of distinct bit positions holding a 1-bit, ignoring multiplicity.
    fn num_unique_ones(&self) -> u32;

    /// Count of distinct bit positions holding a 0-bit.
    fn num_unique_zeros(&self) -> u32 {
        self.universe_size() - self.num_unique_ones()
    }

    /// True iff some 1-bit position has multiplicity greater than 1.
    fn has_multiplicity(&self) -> bool {
        self.num_ones() != self.num_unique_ones()
    }
}

/// Construct-then-freeze builder for a [`BitVec`] implementation.
///
/// Builders accumulate `one`/`one_count` calls in any order and then
/// `build` into an immutable bit vector. Builders are not thread-safe and
/// are intended for use by a single writer.
pub trait BitVecBuilder {
    type Target: BitVec;
    type Options: Default + Clone;

    /// `universe_size` must be strictly less than `u32::MAX`.
    fn new(universe_size: u32) -> Self;

    /// Add one 1-bit at `bit_index`. Idempotent for representations without
    /// multiplicity; for representations with multiplicity, repeated calls
    /// accumulate.
    fn one(&mut self, bit_index: u32) {
        self.one_count(bit_index, 1)
    }

    /// Add `count` 1-bits at `bit_index`. `count > 1` is only valid for
    /// representations that support multiplicity; others panic.
    fn one_count(&mut self, bit_index: u32, count: u32);

    fn build(self) -> Self::Target
    where
        Self: Sized,
    {
        self.build_with_options(Self::Options::default())
    }

    fn build_with_options(self, options: Self::Options) -> Self::Target;

    fn from_ones(universe_size: u32, ones: &[u32]) -> Self::Target
    where
        Self: Sized,
    {
        let mut b = Self::new(universe_size);
        for &one in ones {
            b.one(one);
        }
        b.build()
    }
}
