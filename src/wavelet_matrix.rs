//! `WaveletMatrix`: a stack of bit vectors over an integer alphabet,
//! supporting rank, select, quantile, and range-restricted symbol queries
//! in time proportional to the number of bit planes (`ceil(log2(max_symbol
//! + 1))`), rather than to the length of the sequence.
//!
//! Each level's bit vector records, for the symbols that have reached that
//! level (in wavelet-*matrix* order: all left-child symbols precede all
//! right-child symbols, unlike a wavelet *tree* where each node's children
//! are stored separately), whether that symbol's next-most-significant bit
//! is 0 or 1. `nz` caches the count of 0-bits on that level, i.e. the size
//! of the left (0-bit) partition, so that navigating to a child doesn't
//! require an extra rank query.

use crate::bits::reverse_low_bits;
use crate::bitvec::dense::{DenseBitVec, DenseBitVecBuilder, DenseBitVecOptions};
use crate::bitvec::{BitVec, BitVecBuilder};
use std::ops::Range;

#[derive(Clone)]
struct Level {
    bv: DenseBitVec,
    /// Count of 0-bits on this level: the boundary between the left
    /// (0-bit) and right (1-bit) partitions in the next level down.
    nz: u32,
    /// Single bit set at the magnitude this level represents, e.g. the
    /// top level's `bit == 1 << (num_levels - 1)`.
    bit: u32,
}

fn ranks(bv: &DenseBitVec, index: u32) -> (u32, u32) {
    (bv.rank0(index), bv.rank1(index))
}

/// A sequence of symbols drawn from `0..=max_symbol`, represented as a
/// wavelet matrix over [`DenseBitVec`] level bit vectors.
#[derive(Clone)]
pub struct WaveletMatrix {
    levels: Vec<Level>,
    max_symbol: u32,
    len: u32,
}

impl WaveletMatrix {
    /// Build a wavelet matrix over `data`, whose entries must not exceed
    /// `max_symbol`.
    pub fn new(data: Vec<u32>, max_symbol: u32) -> Self {
        Self::with_options(data, max_symbol, DenseBitVecOptions::default())
    }

    pub fn with_options(data: Vec<u32>, max_symbol: u32, options: DenseBitVecOptions) -> Self {
        let num_levels = (u32::BITS - max_symbol.leading_zeros()).max(1) as usize;
        let len = data.len();
        let levels = if len == 0 {
            vec![]
        } else if num_levels <= len.ilog2() as usize {
            Self::build_bitvecs(data, num_levels, options)
        } else {
            Self::build_bitvecs_large_alphabet(data, num_levels, options)
        };
        Self::from_bitvecs(levels, max_symbol)
    }

    /// Construct a wavelet matrix directly from one already-built bit
    /// vector per level, ordered from the most significant bit downwards.
    fn from_bitvecs(levels: Vec<DenseBitVec>, max_symbol: u32) -> Self {
        let max_level = levels.len().saturating_sub(1);
        let len = levels.first().map(|l| l.universe_size()).unwrap_or(0);
        let levels = levels
            .into_iter()
            .enumerate()
            .map(|(index, bv)| Level {
                nz: bv.rank0(bv.universe_size()),
                bit: 1 << (max_level - index),
                bv,
            })
            .collect();
        Self {
            levels,
            max_symbol,
            len,
        }
    }

    /// Iterate over levels from the most significant bit downwards,
    /// excluding the bottom `ignore_bits` levels.
    fn levels(&self, ignore_bits: usize) -> std::slice::Iter<Level> {
        self.levels[..self.levels.len() - ignore_bits].iter()
    }

    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn max_symbol(&self) -> u32 {
        self.max_symbol
    }

    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    /// Locate `symbol` within `range`, restricted to the virtual level
    /// `ignore_bits` above the bottom. Returns `(preceding_count, range)`:
    /// the number of elements less than `symbol` in the query range, and
    /// the range occupied by `symbol` at that virtual level (whose length
    /// is therefore the count of `symbol` in the query range).
    pub fn locate(&self, range: Range<u32>, symbol: u32, ignore_bits: usize) -> (u32, Range<u32>) {
        assert!(symbol <= self.max_symbol);
        let mut preceding_count = 0;
        let mut range = range;
        for level in self.levels(ignore_bits) {
            let start = ranks(&level.bv, range.start);
            let end = ranks(&level.bv, range.end);
            if symbol & level.bit == 0 {
                range = start.0..end.0;
            } else {
                preceding_count += end.0 - start.0;
                range = level.nz + start.1..level.nz + end.1;
            }
        }
        (preceding_count, range)
    }

    /// Number of symbols strictly less than `symbol` within `range`.
    pub fn preceding_count(&self, range: Range<u32>, symbol: u32) -> u32 {
        self.locate(range, symbol, 0).0
    }

    /// Number of occurrences of `symbol` within `range`.
    pub fn count(&self, range: Range<u32>, symbol: u32) -> u32 {
        let range = self.locate(range, symbol, 0).1;
        range.end - range.start
    }

    /// The `k`-th smallest symbol in `range` (0-indexed), and its count in
    /// that range.
    pub fn quantile(&self, range: Range<u32>, k: u32) -> (u32, u32) {
        assert!(k < range.end - range.start);
        let mut k = k;
        let mut range = range;
        let mut symbol = 0;
        for level in self.levels(0) {
            let start = ranks(&level.bv, range.start);
            let end = ranks(&level.bv, range.end);
            let left_count = end.0 - start.0;
            if k < left_count {
                range = start.0..end.0;
            } else {
                k -= left_count;
                symbol += level.bit;
                range = level.nz + start.1..level.nz + end.1;
            }
        }
        let count = range.end - range.start;
        (symbol, count)
    }

    /// Index of the `k`-th (0-indexed) occurrence of `symbol` within
    /// `range`, restricted to the virtual level `ignore_bits` above the
    /// bottom.
    pub fn select(&self, range: Range<u32>, symbol: u32, k: u32, ignore_bits: usize) -> Option<u32> {
        if symbol > self.max_symbol {
            return None;
        }
        let range = self.locate(range, symbol, ignore_bits).1;
        let count = range.end - range.start;
        if count <= k {
            return None;
        }
        let index = range.start + k;
        self.select_upwards(index, ignore_bits)
    }

    /// Like [`Self::select`], but counts from the end of `range` rather
    /// than the start.
    pub fn select_last(
        &self,
        range: Range<u32>,
        symbol: u32,
        k: u32,
        ignore_bits: usize,
    ) -> Option<u32> {
        if symbol > self.max_symbol {
            return None;
        }
        let range = self.locate(range, symbol, ignore_bits).1;
        let count = range.end - range.start;
        if count <= k {
            return None;
        }
        let index = range.end - k - 1;
        self.select_upwards(index, ignore_bits)
    }

    /// Map an index on the virtual level `ignore_bits` above the bottom
    /// back up to an index in sequence order. Exposed so that callers of
    /// [`Self::locate`] can perform their own select from the resulting
    /// range.
    pub fn select_upwards(&self, index: u32, ignore_bits: usize) -> Option<u32> {
        let mut index = index;
        for level in self.levels(ignore_bits).rev() {
            if index < level.nz {
                index = level.bv.try_select0(index)?;
            } else {
                index = level.bv.try_select1(index - level.nz)?;
            }
        }
        Some(index)
    }

    /// The symbol stored at sequence position `index`.
    pub fn get(&self, index: u32) -> u32 {
        let mut index = index;
        let mut symbol = 0;
        for level in self.levels(0) {
            if level.bv.get(index) == 0 {
                index = level.bv.rank0(index);
            } else {
                symbol += level.bit;
                index = level.nz + level.bv.rank1(index);
            }
        }
        symbol
    }

    /// The majority element of `range`, if one exists: a symbol occurring
    /// more than half the time.
    pub fn simple_majority(&self, range: Range<u32>) -> Option<u32> {
        let len = range.end - range.start;
        let half_len = len >> 1;
        let (symbol, count) = self.quantile(range, half_len);
        if count > half_len {
            Some(symbol)
        } else {
            None
        }
    }

    /// Histogram-based construction, efficient when the alphabet is no
    /// larger than the data (so a `2^num_levels`-entry histogram is
    /// affordable). Implements Algorithm 1 ("seq.pc") from "Practical
    /// Wavelet Tree Construction".
    fn build_bitvecs(
        data: Vec<u32>,
        num_levels: usize,
        options: DenseBitVecOptions,
    ) -> Vec<DenseBitVec> {
        assert!(data.len() <= u32::MAX as usize);
        let mut levels: Vec<DenseBitVecBuilder> = (0..num_levels)
            .map(|_| DenseBitVecBuilder::new(data.len() as u32))
            .collect();
        let mut hist = vec![0u32; 1 << num_levels];
        let mut borders = vec![0u32; 1 << num_levels];
        let max_level = num_levels - 1;

        {
            let level = &mut levels[0];
            let level_bit = 1u32 << max_level;
            for (i, &d) in data.iter().enumerate() {
                hist[d as usize] += 1;
                if d & level_bit > 0 {
                    level.one(i as u32);
                }
            }
        }

        for l in (1..num_levels).rev() {
            let num_nodes = 1usize << l;

            for i in 0..num_nodes {
                hist[i] = hist[2 * i] + hist[2 * i + 1];
            }

            borders[0] = 0;
            for i in 1..num_nodes {
                let prev_index = reverse_low_bits((i - 1) as u32, l as u32) as usize;
                borders[reverse_low_bits(i as u32, l as u32) as usize] =
                    borders[prev_index] + hist[prev_index];
            }

            let level = &mut levels[l];
            let level_bit_index = max_level - l;
            let level_bit = 1u32 << level_bit_index;
            let bit_prefix_mask = u32::MAX
                .checked_shl((level_bit_index + 1) as u32)
                .unwrap_or(0);

            for &d in data.iter() {
                let node_index = ((d & bit_prefix_mask) >> (level_bit_index + 1)) as usize;
                let p = &mut borders[node_index];
                if d & level_bit > 0 {
                    level.one(*p);
                }
                *p += 1;
            }
        }

        levels
            .into_iter()
            .map(|level| level.build_with_options(options.clone()))
            .collect()
    }

    /// Bucket-sort based construction for large alphabets, where building
    /// a per-symbol histogram would be too expensive. Stably partitions
    /// the data by each level's bit, level by level.
    fn build_bitvecs_large_alphabet(
        mut data: Vec<u32>,
        num_levels: usize,
        options: DenseBitVecOptions,
    ) -> Vec<DenseBitVec> {
        assert!(data.len() <= u32::MAX as usize);
        let mut levels = Vec::with_capacity(num_levels);
        let max_level = num_levels - 1;
        let mut right = Vec::new();

        for l in 0..max_level {
            let level_bit = 1u32 << (max_level - l);
            let mut b = DenseBitVecBuilder::new(data.len() as u32);
            let mut index = 0u32;
            data.retain_mut(|d| {
                let value = *d;
                let go_left = value & level_bit == 0;
                if !go_left {
                    b.one(index);
                    right.push(value);
                }
                index += 1;
                go_left
            });
            data.append(&mut right);
            levels.push(b.build_with_options(options.clone()));
        }

        {
            let mut b = DenseBitVecBuilder::new(data.len() as u32);
            let level_bit = 1u32;
            for (index, d) in data.iter().enumerate() {
                if d & level_bit > 0 {
                    b.one(index as u32);
                }
            }
            levels.push(b.build_with_options(options));
        }

        levels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_quantile(data: &[u32], range: Range<u32>, k: u32) -> u32 {
        let mut slice: Vec<u32> = data[range.start as usize..range.end as usize].to_vec();
        slice.sort_unstable();
        slice[k as usize]
    }

    #[test]
    fn basic_roundtrip() {
        let data = vec![3, 1, 4, 1, 5, 9, 2, 6, 5, 3, 5];
        let max_symbol = *data.iter().max().unwrap();
        let wm = WaveletMatrix::new(data.clone(), max_symbol);
        assert_eq!(wm.len(), data.len() as u32);
        for (i, &d) in data.iter().enumerate() {
            assert_eq!(wm.get(i as u32), d);
        }
    }

    #[test]
    fn count_and_locate() {
        let data = vec![3, 1, 4, 1, 5, 9, 2, 6, 5, 3, 5];
        let max_symbol = *data.iter().max().unwrap();
        let wm = WaveletMatrix::new(data.clone(), max_symbol);
        for symbol in 0..=max_symbol {
            let expected = data.iter().filter(|&&d| d == symbol).count() as u32;
            assert_eq!(wm.count(0..wm.len(), symbol), expected);
        }
    }

    #[test]
    fn quantile_matches_sorted_order() {
        let data = vec![7, 2, 9, 4, 4, 0, 8, 1, 3, 3, 3, 6];
        let max_symbol = *data.iter().max().unwrap();
        let wm = WaveletMatrix::new(data.clone(), max_symbol);
        let range = 2..10;
        for k in 0..(range.end - range.start) {
            let (symbol, _count) = wm.quantile(range.clone(), k);
            assert_eq!(symbol, naive_quantile(&data, range.clone(), k));
        }
    }

    #[test]
    fn select_inverts_get() {
        let data = vec![5, 5, 5, 1, 2, 5, 3, 5, 1];
        let max_symbol = *data.iter().max().unwrap();
        let wm = WaveletMatrix::new(data.clone(), max_symbol);
        let fives: Vec<u32> = data
            .iter()
            .enumerate()
            .filter(|(_, &d)| d == 5)
            .map(|(i, _)| i as u32)
            .collect();
        for (k, &expected_index) in fives.iter().enumerate() {
            let index = wm.select(0..wm.len(), 5, k as u32, 0).unwrap();
            assert_eq!(index, expected_index);
        }
        assert_eq!(wm.select(0..wm.len(), 5, fives.len() as u32, 0), None);
    }

    #[test]
    fn large_alphabet_construction() {
        // Alphabet larger than the data length forces build_bitvecs_large_alphabet.
        let data: Vec<u32> = vec![1000, 5, 999999, 42, 123456];
        let max_symbol = *data.iter().max().unwrap();
        let wm = WaveletMatrix::new(data.clone(), max_symbol);
        for (i, &d) in data.iter().enumerate() {
            assert_eq!(wm.get(i as u32), d);
        }
    }

    #[test]
    fn simple_majority() {
        let data = vec![1, 2, 1, 1, 3, 1, 1];
        let max_symbol = *data.iter().max().unwrap();
        let wm = WaveletMatrix::new(data.clone(), max_symbol);
        assert_eq!(wm.simple_majority(0..wm.len()), Some(1));
        assert_eq!(wm.simple_majority(4..6), None);
    }

    #[test]
    fn scenario_small_alphabet() {
        let data = vec![0, 1, 2, 1, 0, 1, 4, 1];
        let wm = WaveletMatrix::new(data, 4);
        assert_eq!(wm.count(0..8, 1), 4);
        assert_eq!(wm.preceding_count(0..8, 2), 6);
        assert_eq!(wm.quantile(0..8, 2), (1, 4));
        assert_eq!(wm.select(0..8, 1, 3, 0), Some(7));
        assert_eq!(wm.simple_majority(1..8), Some(1));
        assert_eq!(wm.simple_majority(0..8), None);
    }

    #[test]
    fn empty_sequence() {
        let wm = WaveletMatrix::new(vec![], 0);
        assert_eq!(wm.len(), 0);
        assert!(wm.is_empty());
    }
}
