//! `SparseBitVec`: an Elias-Fano encoded bit vector, efficient when 1-bits
//! are a small fraction of the universe. Splits each 1-bit position into
//! high bits (stored unary, as separators in a [`DenseBitVec`]) and low
//! bits (stored packed in an [`IntBuf`]), so the total size is close to
//! the information-theoretic minimum for a random set of positions of
//! that density.
//!
//! Admits multiplicity: repeated 1-bit positions are simply pushed more
//! than once, in sorted order, and land in consecutive low-bit slots.

use crate::bits::{one_mask, partition_point};
use crate::bitvec::dense::{DenseBitVec, DenseBitVecBuilder, DenseBitVecOptions};
use crate::bitvec::{BitVec, BitVecBuilder};
use crate::intbuf::IntBuf;

#[derive(Clone)]
pub struct SparseBitVec {
    high: DenseBitVec,
    low: IntBuf,
    low_mask: u32,
    low_bit_width: u32,
    universe_size: u32,
    num_ones: u32,
    num_unique_ones: u32,
}

impl SparseBitVec {
    fn new(ones: Box<[u32]>, universe_size: u32, options: SparseBitVecOptions) -> Self {
        let num_ones: u32 = ones
            .len()
            .try_into()
            .expect("number of 1-bits cannot exceed 2^32 - 1");

        // Chooses the split point so that low bits take roughly as much
        // space as the separators they'd otherwise add to the high bits.
        // See: https://observablehq.com/@yurivish/ef-split-points
        let low_bit_width = options.low_bit_width.unwrap_or_else(|| {
            if num_ones == 0 {
                0
            } else {
                (universe_size / num_ones).max(1).ilog2()
            }
        });

        // High bits encoded in unary: 1 denotes a value, 0 a separator.
        let high_len = num_ones + (universe_size >> low_bit_width);
        let mut high = DenseBitVecBuilder::new(high_len);
        let mut low = IntBuf::new(num_ones, low_bit_width);
        let low_mask = one_mask(low_bit_width);

        let mut num_unique_ones = 0;
        let mut prev = None;
        for (i, cur) in ones.iter().copied().enumerate() {
            let same = prev == Some(cur);
            num_unique_ones += if same { 0 } else { 1 };
            assert!(prev.unwrap_or(0) <= cur, "ones must be in ascending order");
            prev = Some(cur);

            let quotient = cur >> low_bit_width;
            high.one(i as u32 + quotient);
            let remainder = cur & low_mask;
            low.push(remainder);
        }

        if let Some(i) = prev {
            assert!(
                i < universe_size,
                "1-bit index {} cannot exceed universe_size {}",
                i,
                universe_size
            );
        }

        Self {
            high: high.build_with_options(options.high_bits_options),
            low,
            low_mask,
            low_bit_width,
            universe_size,
            num_ones,
            num_unique_ones,
        }
    }

    fn quotient(&self, x: u32) -> u32 {
        x >> self.low_bit_width
    }

    fn remainder(&self, x: u32) -> u32 {
        x & self.low_mask
    }
}

impl BitVec for SparseBitVec {
    fn rank1(&self, bit_index: u32) -> u32 {
        if bit_index >= self.universe_size() {
            return self.num_ones;
        }

        let lower_bound;
        let upper_bound;
        let quotient = self.quotient(bit_index);
        if quotient == 0 {
            // Searching within the first group: the lower bound is zero,
            // and the upper bound is the divider separating it from the
            // next group (or the whole vector, if there is no such group).
            lower_bound = 0;
            upper_bound = self.high.try_select0(0).unwrap_or(self.num_ones());
        } else {
            // Searching within a higher group: both bounds come from the
            // positions of the (quotient-1)-th and quotient-th separators,
            // each adjusted for the separators preceding it.
            lower_bound = {
                let i = quotient - 1;
                self.high.try_select0(i).map(|x| x - i).unwrap_or(self.num_ones())
            };
            upper_bound = {
                let i = quotient;
                self.high.try_select0(i).map(|x| x - i).unwrap_or(self.num_ones())
            };
        }

        // Count elements in this bucket strictly below bit_index using
        // just the low bits.
        let remainder = self.remainder(bit_index);
        let bucket_count = partition_point((upper_bound - lower_bound) as usize, |n| {
            let index = lower_bound + n as u32;
            self.low.get(index) < remainder
        }) as u32;

        lower_bound + bucket_count
    }

    fn try_select1(&self, n: u32) -> Option<u32> {
        let pos = self.high.try_select1(n)?;
        let quotient = self.high.rank0(pos);
        let remainder = self.low.get(n);
        Some((quotient << self.low_bit_width) + remainder)
    }

    fn universe_size(&self) -> u32 {
        self.universe_size
    }

    fn num_ones(&self) -> u32 {
        self.num_ones
    }

    fn num_unique_ones(&self) -> u32 {
        self.num_unique_ones
    }
}

#[derive(Default, Clone)]
pub struct SparseBitVecOptions {
    /// Number of low bits in the Elias-Fano split. `None` computes it from
    /// the universe size to minimize total representation size.
    pub low_bit_width: Option<u32>,
    /// Options for the `DenseBitVec` storing the high (unary) bits.
    pub high_bits_options: DenseBitVecOptions,
}

#[derive(Clone)]
pub struct SparseBitVecBuilder {
    universe_size: u32,
    ones: Vec<u32>,
}

impl BitVecBuilder for SparseBitVecBuilder {
    type Target = SparseBitVec;
    type Options = SparseBitVecOptions;

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

    fn build_with_options(mut self, options: Self::Options) -> SparseBitVec {
        self.ones.sort_unstable();
        SparseBitVec::new(self.ones.into(), self.universe_size, options)
    }
}
