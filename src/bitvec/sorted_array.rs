//! `SortedArrayBitVec`: the reference "oracle" representation. Stores the
//! sorted sequence of 1-bit positions directly, with no compression and no
//! acceleration structures. `O(n)` space and `O(log n)` rank/select via
//! binary search over the stored positions. Used in tests to validate the
//! more sophisticated representations against ground truth, and as a
//! baseline for small or short-lived bit vectors where simplicity wins.
//!
//! Admits multiplicity: pushing the same bit index more than once is legal
//! and increases that position's count in `rank1`.

use super::{BitVec, BitVecBuilder};

#[derive(Clone)]
pub struct SortedArrayBitVec {
    /// Sorted (non-decreasing) 1-bit positions, with repeats for multiplicity.
    ones: Box<[u32]>,
    universe_size: u32,
    num_unique_ones: u32,
}

impl SortedArrayBitVec {
    fn new(ones: Box<[u32]>, universe_size: u32) -> Self {
        let mut num_unique_ones = 0;
        let mut prev: Option<u32> = None;
        for cur in ones.iter().copied() {
            debug_assert!(cur < universe_size, "one-bit position out of range");
            if let Some(prev) = prev {
                debug_assert!(prev <= cur, "ones must be pushed in sorted order");
            }
            if prev != Some(cur) {
                num_unique_ones += 1;
            }
            prev = Some(cur);
        }
        Self {
            ones,
            universe_size,
            num_unique_ones,
        }
    }
}

impl BitVec for SortedArrayBitVec {
    fn rank1(&self, bit_index: u32) -> u32 {
        self.ones.partition_point(|&x| x < bit_index) as u32
    }

    fn try_select1(&self, n: u32) -> Option<u32> {
        self.ones.get(n as usize).copied()
    }

    fn universe_size(&self) -> u32 {
        self.universe_size
    }

    fn num_ones(&self) -> u32 {
        self.ones.len() as u32
    }

    fn num_unique_ones(&self) -> u32 {
        self.num_unique_ones
    }
}

#[derive(Clone, Default)]
pub struct SortedArrayBitVecOptions;

#[derive(Clone)]
pub struct SortedArrayBitVecBuilder {
    universe_size: u32,
    ones: Vec<u32>,
}

impl BitVecBuilder for SortedArrayBitVecBuilder {
    type Target = SortedArrayBitVec;
    type Options = SortedArrayBitVecOptions;

    fn new(universe_size: u32) -> Self {
        Self {
            universe_size,
            ones: Vec::new(),
        }
    }

    fn one_count(&mut self, bit_index: u32, count: u32) {
        assert!(bit_index < self.universe_size);
        for _ in 0..count {
            self.ones.push(bit_index);
        }
    }

    fn build_with_options(mut self, _options: Self::Options) -> SortedArrayBitVec {
        self.ones.sort_unstable();
        SortedArrayBitVec::new(self.ones.into(), self.universe_size)
    }
}
