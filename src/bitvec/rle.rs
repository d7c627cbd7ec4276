//! `RLEBitVec`: a run-length encoded bit vector, efficient when the bit
//! sequence consists of long runs of identical bits. Stores only the
//! boundaries between 0-runs and 1-runs (in `z`) and between complete
//! 01-runs (in `zo`), each as a [`SparseBitVec`] over virtual run-end
//! positions, and derives rank/select arithmetically from those two
//! encodings rather than storing the bits themselves.
//!
//! Does not support multiplicity: every 1-bit position is distinct.

use crate::bits::partition_point;
use crate::bitvec::sparse::SparseBitVecBuilder;
use crate::bitvec::{BitVec, BitVecBuilder};
use std::collections::HashSet;

#[derive(Clone)]
pub struct RLEBitVecBuilder {
    universe_size: u32,
    ones: HashSet<u32>,
}

impl BitVecBuilder for RLEBitVecBuilder {
    type Target = RLEBitVec;
    type Options = ();

    fn new(universe_size: u32) -> Self {
        Self {
            universe_size,
            ones: HashSet::new(),
        }
    }

    fn one_count(&mut self, bit_index: u32, count: u32) {
        assert!(bit_index < self.universe_size);
        assert!(count <= 1, "RLEBitVec does not support multiplicity");
        if count == 1 {
            self.ones.insert(bit_index);
        }
    }

    fn build_with_options(self, _options: Self::Options) -> RLEBitVec {
        let universe_size = self.universe_size;
        let mut ones: Vec<u32> = self.ones.into_iter().collect();
        ones.sort_unstable();
        let mut builder = RLERunBuilder::new();
        let mut prev = u32::MAX;
        for cur in ones {
            let num_preceding_zeros = cur.wrapping_sub(prev) - 1;
            builder.run(num_preceding_zeros, 1);
            prev = cur;
        }
        // Pad out with any trailing zeros.
        let num_zeros = universe_size.wrapping_sub(prev) - 1;
        builder.run(num_zeros, 0);
        builder.build()
    }
}

/// Accumulates alternating zero/one run lengths into the `z`/`zo` virtual
/// position arrays that back an `RLEBitVec`. Adjacent runs of the same
/// kind (all-zero or all-one) are coalesced so that one logical run of
/// zeros followed by ones ends up as a single entry, matching the
/// definition that every stored run ends with a (possibly empty) run of
/// ones.
struct RLERunBuilder {
    z: Vec<u32>,
    zo: Vec<u32>,
    num_zeros: u32,
    num_ones: u32,
}

impl RLERunBuilder {
    fn new() -> Self {
        Self {
            z: Vec::new(),
            zo: Vec::new(),
            num_zeros: 0,
            num_ones: 0,
        }
    }

    fn run(&mut self, num_zeros: u32, num_ones: u32) {
        if num_zeros == 0 && num_ones == 0 {
            return;
        }
        let len = self.z.len();
        self.num_zeros += num_zeros;
        self.num_ones += num_ones;
        if num_zeros == 0 && len > 0 {
            // All-ones run: coalesce with the previous run, since every
            // stored run already ends with a run of ones.
            *self.zo.last_mut().unwrap() += num_ones;
        } else if num_ones == 0 && self.last_block_contains_only_zeros() {
            // All-zeros run, and the previous run was itself all zeros:
            // coalesce rather than starting a new (empty) ones run.
            *self.z.last_mut().unwrap() += num_zeros;
            *self.zo.last_mut().unwrap() += num_zeros;
        } else {
            self.z.push(self.num_zeros);
            self.zo.push(self.num_zeros + self.num_ones);
        }
    }

    fn last_block_contains_only_zeros(&self) -> bool {
        let len = self.z.len();
        match len {
            0 => false,
            1 => self.z[0] == self.zo[0],
            _ => {
                let last_block_length = self.zo[len - 1] - self.zo[len - 2];
                let last_block_num_zeros = self.z[len - 1] - self.z[len - 2];
                last_block_length == last_block_num_zeros
            }
        }
    }

    fn build(self) -> RLEBitVec {
        // The +1 is needed because the marker in z/zo comes at the position
        // just after the zeros/01-run it counts.
        RLEBitVec {
            z: SparseBitVecBuilder::from_ones(self.num_zeros + 1, &self.z),
            zo: SparseBitVecBuilder::from_ones(self.num_zeros + self.num_ones + 1, &self.zo),
            num_zeros: self.num_zeros,
            num_ones: self.num_ones,
        }
    }
}

#[derive(Clone)]
pub struct RLEBitVec {
    z: crate::bitvec::sparse::SparseBitVec,
    zo: crate::bitvec::sparse::SparseBitVec,
    num_zeros: u32,
    num_ones: u32,
}

impl BitVec for RLEBitVec {
    fn rank1(&self, bit_index: u32) -> u32 {
        if bit_index >= self.universe_size() {
            return self.num_ones;
        }

        // Number of complete 01-runs up to the virtual index `bit_index`.
        let j = self.zo.rank1(bit_index);

        // Number of zeros including the j-th block.
        let num_cumulative_zeros = self.z.select1(j);

        // Number of zeros preceding the j-th block. `j.wrapping_sub(1)`
        // relies on bit_index never reaching u32::MAX, since universe_size
        // fits in a u32.
        let num_preceding_zeros = self.z.try_select1(j.wrapping_sub(1)).unwrap_or(0);

        // Number of zeros in the j-th block.
        let num_zeros = num_cumulative_zeros - num_preceding_zeros;

        // Start index of the j-th block.
        let block_start = self.zo.try_select1(j.wrapping_sub(1)).unwrap_or(0);

        // Number of ones preceding the j-th block.
        let num_preceding_ones = block_start - num_preceding_zeros;

        // Start index of ones within the j-th block.
        let ones_start = block_start + num_zeros;

        let adjustment = bit_index.saturating_sub(ones_start);

        num_preceding_ones + adjustment
    }

    fn try_select1(&self, n: u32) -> Option<u32> {
        if n >= self.num_ones {
            return None;
        }

        // The n-th one is in the j-th 01-block.
        let j = partition_point(self.z.num_ones() as usize, |i| {
            let i = i as u32;
            self.zo.select1(i) - self.z.select1(i) <= n
        }) as u32;

        // Number of zeros up to and including the j-th block.
        let num_cumulative_zeros = self.z.select1(j);

        Some(num_cumulative_zeros + n)
    }

    fn try_select0(&self, n: u32) -> Option<u32> {
        if n >= self.num_zeros {
            return None;
        }

        // The n-th zero is in the j-th 01-block.
        let j = self.z.rank1(n + 1);

        if j == 0 {
            return Some(n);
        }

        // Start index of the j-th 01-block.
        let block_start = self.zo.select1(j - 1);

        // Number of zeros preceding the j-th 01-block.
        let num_preceding_zeros = self.z.select1(j - 1);

        Some(block_start + (n - num_preceding_zeros))
    }

    fn universe_size(&self) -> u32 {
        self.num_zeros + self.num_ones
    }

    fn num_ones(&self) -> u32 {
        self.num_ones
    }

    fn num_unique_ones(&self) -> u32 {
        self.num_ones
    }
}
