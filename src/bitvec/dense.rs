//! `DenseBitVec`: a bit vector backed by a pad-trimmed bit buffer plus
//! sampled rank/select acceleration structures. The central, general
//! purpose representation that every other representation composes with
//! or falls back to: `SparseBitVec`'s high bits and `RLEBitVec`'s run
//! boundaries are themselves stored as (or built from) a `DenseBitVec`.
//!
//! Takes 1 bit per bit of storage, plus sampling overhead that is tunable
//! via [`DenseBitVecOptions`]. By default rank1 samples are taken every
//! 2^10 bits and select0/select1 samples every 2^10 0-bits/1-bits
//! respectively, for roughly 3% + 3% + 3% overhead.

use crate::bitbuf::{BitBuf, PaddedBitBuf};
use crate::bits::{basic_block_index, basic_block_offset, one_mask, select1_in_word, BASIC_BLOCK_BITS, BASIC_BLOCK_SIZE};
use crate::bitvec::{BitVec, BitVecBuilder};

/// Trim a `BitBuf` to a `PaddedBitBuf` whenever the non-padding middle would
/// be at most half the original block count. Chosen to favor `SparseBitVec`'s
/// long runs of identical blocks in its unary high-bit stream without paying
/// the trim scan's cost for buffers that are mostly non-uniform.
const PAD_THRESHOLD: f64 = 0.5;

#[derive(Clone)]
pub struct DenseBitVec {
    buf: PaddedBitBuf,
    num_ones: u32,
    rank1_samples_pow2: u32,
    select0_samples_pow2: u32,
    select1_samples_pow2: u32,
    /// `rank1_samples[i]` is the number of 1-bits preceding basic block
    /// `i << buf_blocks_per_rank1_sample_pow2`.
    rank1_samples: Box<[u32]>,
    /// Each entry packs a block index (high bits) with a small correction
    /// term (low bits) identifying the basic block containing the
    /// `(select1_sample_rate*i + 1)`-th 1-bit.
    select1_samples: Box<[u32]>,
    select0_samples: Box<[u32]>,
    /// A buf block is a basic block of the underlying `BitBuf`.
    buf_blocks_per_rank1_sample_pow2: u32,
}

impl DenseBitVec {
    fn new(buf: PaddedBitBuf, rank1_samples_pow2: u32, select_samples_pow2: u32) -> Self {
        assert!(BASIC_BLOCK_BITS <= rank1_samples_pow2 && rank1_samples_pow2 < 32);
        assert!(BASIC_BLOCK_BITS <= select_samples_pow2 && select_samples_pow2 < 32);

        let select1_sample_rate = 1u32 << select_samples_pow2;
        let select0_sample_rate = 1u32 << select_samples_pow2;
        let buf_blocks_per_rank1_sample = 1u32 << (rank1_samples_pow2 - BASIC_BLOCK_BITS);

        let mut rank1_samples = Vec::new();
        let mut select1_samples = Vec::new();
        let mut select0_samples = Vec::new();

        let mut cumulative_ones: u32 = 0;
        let mut cumulative_bits: u32 = 0;
        let mut zeros_threshold: u32 = 0;
        let mut ones_threshold: u32 = 0;

        let max_block_index = buf.num_blocks().saturating_sub(1);
        for block_index in 0..buf.num_blocks() {
            let block = buf.get_block(block_index);
            if block_index % buf_blocks_per_rank1_sample == 0 {
                rank1_samples.push(cumulative_ones);
            }

            let mut block_ones = block.count_ones();
            let mut block_zeros = BASIC_BLOCK_SIZE - block_ones;

            if block_index == max_block_index {
                let num_non_trailing_bits = BASIC_BLOCK_SIZE - buf.num_trailing_bits();
                let trailing_bits = block & !one_mask(num_non_trailing_bits);
                let trailing_bits_ones = trailing_bits.count_ones();
                let trailing_bits_zeros = buf.num_trailing_bits() - trailing_bits_ones;
                block_ones -= trailing_bits_ones;
                block_zeros -= trailing_bits_zeros;
            }

            let cumulative_zeros = cumulative_bits - cumulative_ones;

            if cumulative_ones + block_ones > ones_threshold {
                let correction = ones_threshold - cumulative_ones;
                debug_assert!(cumulative_bits & correction == 0);
                select1_samples.push(cumulative_bits | correction);
                ones_threshold = ones_threshold.saturating_add(select1_sample_rate);
            }

            if cumulative_zeros + block_zeros > zeros_threshold {
                let correction = zeros_threshold - cumulative_zeros;
                debug_assert!(cumulative_bits & correction == 0);
                select0_samples.push(cumulative_bits | correction);
                zeros_threshold = zeros_threshold.saturating_add(select0_sample_rate);
            }

            cumulative_ones += block_ones;
            cumulative_bits = cumulative_bits.saturating_add(BASIC_BLOCK_SIZE);
        }

        Self {
            buf,
            num_ones: cumulative_ones,
            rank1_samples_pow2,
            select0_samples_pow2: select_samples_pow2,
            select1_samples_pow2: select_samples_pow2,
            rank1_samples: rank1_samples.into(),
            select0_samples: select0_samples.into(),
            select1_samples: select1_samples.into(),
            buf_blocks_per_rank1_sample_pow2: rank1_samples_pow2 - BASIC_BLOCK_BITS,
        }
    }

    /// Decode a select sample into `(preceding_count, block_index)`, where
    /// `preceding_count` counts bits of the sampled kind preceding
    /// `block_index`. Used for both select0 and select1 depending on which
    /// `samples`/`samples_pow2` are passed in.
    fn select_sample(n: u32, samples: &[u32], samples_pow2: u32) -> (u32, u32) {
        let sample_rate = 1u32 << samples_pow2;
        let sample_index = n >> samples_pow2;
        let sample = samples[sample_index as usize];
        let mask = one_mask(BASIC_BLOCK_BITS);
        let cumulative_bits = sample & !mask;
        let correction = sample & mask;
        let preceding_count = sample_index * sample_rate - correction;
        (preceding_count, basic_block_index(cumulative_bits) as u32)
    }

    /// `(preceding_count, starting_block_index)` to seed a linear scan for
    /// `rank1_hinted`.
    fn rank1_hint(&self, bit_index: u32) -> (u32, u32) {
        let rank_index = bit_index >> self.rank1_samples_pow2;
        let count = self.rank1_samples[rank_index as usize];
        let start_index = rank_index << self.buf_blocks_per_rank1_sample_pow2;
        (count, start_index)
    }

    /// Compute rank1, optionally resuming a linear scan from a hint
    /// returned by a previous call. Useful when querying closely spaced
    /// bit indices in sequence.
    fn rank1_hinted(&self, bit_index: u32, hint: Option<(u32, u32)>) -> (u32, (u32, u32)) {
        if bit_index >= self.universe_size() {
            return (self.num_ones(), (0, 0));
        }

        let (mut count, start_index) = hint.unwrap_or_else(|| self.rank1_hint(bit_index));
        let last_index = basic_block_index(bit_index) as u32;

        for block_index in start_index..last_index {
            count += self.buf.get_block(block_index).count_ones();
        }

        let bit_offset = basic_block_offset(bit_index);
        let masked_block = self.buf.get_block(last_index) & one_mask(bit_offset);
        (count + masked_block.count_ones(), (count, last_index))
    }
}

impl BitVec for DenseBitVec {
    fn rank1(&self, bit_index: u32) -> u32 {
        self.rank1_hinted(bit_index, None).0
    }

    fn try_select1(&self, n: u32) -> Option<u32> {
        if n >= self.num_ones() {
            return None;
        }

        let (mut count, mut buf_block_index) =
            Self::select_sample(n, &self.select1_samples, self.select1_samples_pow2);
        debug_assert!(count <= n);

        let mut rank_index = (buf_block_index >> self.buf_blocks_per_rank1_sample_pow2) + 1;
        let num_rank_samples = self.rank1_samples.len() as u32;
        while rank_index < num_rank_samples {
            let next_count = self.rank1_samples[rank_index as usize];
            if next_count > n {
                break;
            }
            count = next_count;
            buf_block_index = rank_index << self.buf_blocks_per_rank1_sample_pow2;
            rank_index += 1;
        }

        let mut buf_block = 0;
        while buf_block_index < self.buf.num_blocks() {
            buf_block = self.buf.get_block(buf_block_index);
            let next_count = count + buf_block.count_ones();
            if next_count > n {
                break;
            }
            count = next_count;
            buf_block_index += 1;
        }

        let buf_block_bit_index = buf_block_index << BASIC_BLOCK_BITS;
        let bit_offset = select1_in_word(buf_block, n - count).unwrap_or(0);
        Some(buf_block_bit_index + bit_offset)
    }

    fn try_select0(&self, n: u32) -> Option<u32> {
        if n >= self.num_zeros() {
            return None;
        }

        let (mut count, mut buf_block_index) =
            Self::select_sample(n, &self.select0_samples, self.select0_samples_pow2);
        debug_assert!(count <= n);

        let mut rank_index = (buf_block_index >> self.buf_blocks_per_rank1_sample_pow2) + 1;
        let num_rank_samples = self.rank1_samples.len() as u32;
        while rank_index < num_rank_samples {
            let next_count =
                (rank_index << self.rank1_samples_pow2) - self.rank1_samples[rank_index as usize];
            if next_count > n {
                break;
            }
            count = next_count;
            buf_block_index = rank_index << self.buf_blocks_per_rank1_sample_pow2;
            rank_index += 1;
        }

        let mut buf_block = 0;
        while buf_block_index < self.buf.num_blocks() {
            buf_block = self.buf.get_block(buf_block_index);
            let next_count = count + (BASIC_BLOCK_SIZE - buf_block.count_ones());
            if next_count > n {
                break;
            }
            count = next_count;
            buf_block_index += 1;
        }

        let buf_block_bit_index = buf_block_index << BASIC_BLOCK_BITS;
        let bit_offset = select1_in_word(!buf_block, n - count).unwrap_or(0);
        Some(buf_block_bit_index + bit_offset)
    }

    fn universe_size(&self) -> u32 {
        self.buf.universe_size()
    }

    fn num_ones(&self) -> u32 {
        self.num_ones
    }

    fn num_unique_ones(&self) -> u32 {
        self.num_ones
    }
}

/// `rank1_samples_pow2`/`select_samples_pow2` default to 10 (sample every
/// 1024 bits/ones/zeros) when unset.
#[derive(Default, Copy, Clone)]
pub struct DenseBitVecOptions {
    pub rank1_samples_pow2: Option<u32>,
    pub select_samples_pow2: Option<u32>,
}

#[derive(Clone)]
pub struct DenseBitVecBuilder {
    buf: BitBuf,
}

impl BitVecBuilder for DenseBitVecBuilder {
    type Target = DenseBitVec;
    type Options = DenseBitVecOptions;

    fn new(universe_size: u32) -> Self {
        Self {
            buf: BitBuf::new(universe_size),
        }
    }

    fn one_count(&mut self, bit_index: u32, count: u32) {
        assert!(count <= 1, "DenseBitVec does not support multiplicity");
        if count == 1 {
            self.buf.set_one(bit_index);
        }
    }

    fn build_with_options(self, options: Self::Options) -> DenseBitVec {
        DenseBitVec::new(
            self.buf.maybe_padded(PAD_THRESHOLD),
            options.rank1_samples_pow2.unwrap_or(10),
            options.select_samples_pow2.unwrap_or(10),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitvec::test::{
        test_bit_vec_builder, test_bit_vec_builder_against_oracle, test_bit_vec_builder_arbtest,
    };

    #[test]
    fn bit_vec_interface() {
        test_bit_vec_builder::<DenseBitVecBuilder>();
    }

    #[test]
    fn oracle_equivalence() {
        test_bit_vec_builder_against_oracle::<DenseBitVecBuilder>(false);
    }

    #[test]
    fn arbtest_fuzz() {
        test_bit_vec_builder_arbtest::<DenseBitVecBuilder>(false, None);
    }

    #[test]
    fn scenario_single_one_in_wide_buffer() {
        let mut b = DenseBitVecBuilder::new(320);
        b.one(137);
        let bv = b.build();
        assert_eq!(bv.rank1(137), 0);
        assert_eq!(bv.rank1(138), 1);
        assert_eq!(bv.select1(0), 137);
        assert_eq!(bv.select0(136), 136);
        assert_eq!(bv.select0(137), 138);
    }

    #[test]
    fn sampling_across_many_blocks() {
        let mut b = DenseBitVecBuilder::new(10_000);
        for i in (0..10_000).step_by(7) {
            b.one(i);
        }
        let bv = b.build();
        let mut expected = 0;
        for i in 0..10_000 {
            if i % 7 == 0 {
                expected += 1;
            }
            assert_eq!(bv.rank1(i + 1), expected);
        }
        for n in 0..bv.num_ones() {
            let pos = bv.select1(n);
            assert_eq!(pos % 7, 0);
            assert_eq!(bv.rank1(pos), n);
        }
    }
}
