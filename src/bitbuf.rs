//! Fixed-size bit buffers: a writable, zero-initialized [`BitBuf`] and an
//! immutable, pad-trimmed [`PaddedBitBuf`] view over one.

use crate::bits::{basic_block_index, basic_block_offset, one_mask, BASIC_BLOCK_SIZE};
use std::ops::Range;

/// Fixed-size, zero-initialized, writable bit array over 32-bit blocks.
///
/// Invariant: `num_blocks == ceil(universe_size / 32)`, and bits in
/// `universe_size..32*num_blocks` (the unowned trailing bits of the last
/// block) are always zero.
#[derive(Clone)]
pub(crate) struct BitBuf {
    blocks: Box<[u32]>,
    universe_size: u32,
    /// Number of unowned trailing bits in the final block (always zero).
    num_trailing_bits: u32,
}

impl BitBuf {
    /// Construct a new all-zero `BitBuf` of the given universe size.
    pub(crate) fn new(universe_size: u32) -> Self {
        let num_blocks = universe_size.div_ceil(BASIC_BLOCK_SIZE);
        let last_block_occupancy = universe_size % BASIC_BLOCK_SIZE;
        let num_trailing_bits = if last_block_occupancy == 0 {
            0
        } else {
            BASIC_BLOCK_SIZE - last_block_occupancy
        };
        Self {
            blocks: vec![0; num_blocks as usize].into(),
            universe_size,
            num_trailing_bits,
        }
    }

    /// Set the bit at `bit_index` to 1. Idempotent.
    pub(crate) fn set_one(&mut self, bit_index: u32) {
        assert!(bit_index < self.universe_size);
        let index = basic_block_index(bit_index);
        let bit = 1 << basic_block_offset(bit_index);
        self.blocks[index] |= bit;
    }

    /// Set the bit at `bit_index` to 0. Idempotent.
    pub(crate) fn set_zero(&mut self, bit_index: u32) {
        assert!(bit_index < self.universe_size);
        let index = basic_block_index(bit_index);
        let bit = 1 << basic_block_offset(bit_index);
        self.blocks[index] &= !bit;
    }

    pub(crate) fn get(&self, bit_index: u32) -> bool {
        assert!(bit_index < self.universe_size);
        let index = basic_block_index(bit_index);
        let bit = 1 << basic_block_offset(bit_index);
        self.blocks[index] & bit != 0
    }

    pub(crate) fn get_block(&self, block_index: u32) -> u32 {
        self.blocks[block_index as usize]
    }

    pub(crate) fn blocks(&self) -> &[u32] {
        &self.blocks
    }

    pub(crate) fn num_blocks(&self) -> u32 {
        self.blocks.len() as u32
    }

    pub(crate) fn num_trailing_bits(&self) -> u32 {
        self.num_trailing_bits
    }

    pub(crate) fn universe_size(&self) -> u32 {
        self.universe_size
    }

    /// Try to produce a [`PaddedBitBuf`] view that trims block-aligned runs
    /// of identical blocks from the ends. If the surviving middle would
    /// still exceed `threshold * num_blocks` blocks, returns this buffer
    /// unpadded, since trimming would not be worthwhile.
    pub(crate) fn maybe_padded(self, threshold: f64) -> PaddedBitBuf {
        let spec = PadSpec::compute(&self);
        if spec.should_pad(self.num_blocks(), threshold) {
            PaddedBitBuf::new(self, spec)
        } else {
            self.into_padded()
        }
    }

    /// Wrap this buffer in a [`PaddedBitBuf`] with no trimming performed.
    pub(crate) fn into_padded(self) -> PaddedBitBuf {
        let universe_size = self.universe_size;
        let num_trailing_bits = self.num_trailing_bits;
        let right = self.blocks.len() as u32;
        PaddedBitBuf {
            blocks: self.blocks,
            padding: 0,
            left: 0,
            right,
            universe_size,
            num_trailing_bits,
        }
    }
}

/// The range of `blocks` that contains no padding on either side, where
/// padding is defined as a block equal to `pad`. Analogous to a string trim,
/// but returning an index range rather than a slice.
fn trimmed_range(blocks: &[u32], pad: u32) -> Range<usize> {
    let Some(start) = blocks.iter().position(|&b| b != pad) else {
        return 0..0;
    };
    let end = start + blocks[start..].iter().rposition(|&b| b != pad).unwrap() + 1;
    start..end
}

/// A recommended padding word and the block range it leaves unpadded. Split
/// out from `PaddedBitBuf` construction since deciding whether to pad
/// requires a scan that callers may want to short-circuit on.
#[derive(Clone)]
struct PadSpec {
    padding: u32,
    range: Range<usize>,
}

impl PadSpec {
    /// Compute the better of zero-padding or one-padding `buf`, preferring
    /// zero-padding on a tie.
    fn compute(buf: &BitBuf) -> PadSpec {
        if buf.blocks.is_empty() {
            return PadSpec {
                padding: 0,
                range: 0..0,
            };
        }

        let zero_range = trimmed_range(&buf.blocks, 0);

        // While looking for one-padding, the trailing unowned bits of the
        // last block are conceptually zero but would otherwise prevent that
        // block from being recognized as all-ones; patch them in only for
        // this scan, on a scratch copy.
        let mut blocks = buf.blocks.clone();
        let last = blocks.len() - 1;
        let trailing_mask = !one_mask(BASIC_BLOCK_SIZE - buf.num_trailing_bits);
        blocks[last] |= trailing_mask;
        let one_range = trimmed_range(&blocks, u32::MAX);

        if zero_range.len() <= one_range.len() {
            PadSpec {
                padding: 0,
                range: zero_range,
            }
        } else {
            PadSpec {
                padding: u32::MAX,
                range: one_range,
            }
        }
    }

    fn should_pad(&self, num_blocks: u32, threshold: f64) -> bool {
        if num_blocks == 0 {
            return true;
        }
        (self.range.len() as f64) <= threshold * (num_blocks as f64)
    }
}

/// Immutable, pad-trimmed view over a [`BitBuf`]: a block-aligned left pad,
/// a stored middle, and a right pad, where the pad bits are all-0 or all-1
/// (whichever gives smaller storage). Saves memory for long runs of
/// identical blocks at the endpoints, as arise in the unary high-bit stream
/// of an Elias-Fano encoding.
///
/// Invariant: `left + blocks.len() + (num_blocks - right) == num_blocks`,
/// and for any block index outside `[left, right)`, `get_block(i) == padding`.
#[derive(Clone)]
pub(crate) struct PaddedBitBuf {
    /// Stored middle blocks only; `blocks[0]` corresponds to block index `left`.
    blocks: Box<[u32]>,
    padding: u32,
    /// Index of the first non-padding block.
    left: u32,
    /// One beyond the index of the last non-padding block.
    right: u32,
    universe_size: u32,
    num_trailing_bits: u32,
}

impl PaddedBitBuf {
    fn new(buf: BitBuf, spec: PadSpec) -> Self {
        let PadSpec { padding, range } = spec;
        let left = range.start as u32;
        let right = range.end as u32;
        let blocks = if range.len() == buf.blocks.len() {
            buf.blocks
        } else {
            buf.blocks[range].to_vec().into_boxed_slice()
        };
        Self {
            blocks,
            padding,
            left,
            right,
            universe_size: buf.universe_size,
            num_trailing_bits: buf.num_trailing_bits,
        }
    }

    pub(crate) fn get(&self, bit_index: u32) -> bool {
        assert!(bit_index < self.universe_size);
        let index = basic_block_index(bit_index);
        let bit = 1 << basic_block_offset(bit_index);
        self.get_block(index as u32) & bit != 0
    }

    pub(crate) fn get_block(&self, block_index: u32) -> u32 {
        if block_index < self.left || block_index >= self.right {
            self.padding
        } else {
            self.blocks[(block_index - self.left) as usize]
        }
    }

    pub(crate) fn num_blocks(&self) -> u32 {
        self.universe_size.div_ceil(BASIC_BLOCK_SIZE)
    }

    pub(crate) fn num_trailing_bits(&self) -> u32 {
        self.num_trailing_bits
    }

    pub(crate) fn universe_size(&self) -> u32 {
        self.universe_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panics;

    fn check(mut buf: BitBuf, offset: u32) {
        assert_eq!(buf.get(offset), false);
        assert_eq!(buf.get(offset + 1), false);
        assert_eq!(buf.get(offset + 2), false);
        {
            let padded = buf.clone().into_padded();
            assert_eq!(padded.get(offset), false);
        }

        buf.set_one(offset + 1);
        assert_eq!(buf.get(offset), false);
        assert_eq!(buf.get(offset + 1), true);
        assert_eq!(buf.get(offset + 2), false);

        buf.set_one(offset);
        assert_eq!(buf.get(offset), true);
        assert_eq!(buf.get(offset + 1), true);

        buf.set_zero(offset + 1);
        assert_eq!(buf.get(offset), true);
        assert_eq!(buf.get(offset + 1), false);

        assert_eq!(buf.num_blocks(), buf.blocks.len() as u32);

        let mut c = buf.clone();
        assert!(panics(|| c.set_one(c.universe_size)));
        let c = buf.clone();
        assert!(panics(|| c.get(c.universe_size)));
    }

    #[test]
    fn test_bitbuf() {
        assert!(panics(|| BitBuf::new(0).set_one(0)));
        assert!(panics(|| BitBuf::new(0).get(0)));
        // handles max-size bufs without overflow
        BitBuf::new(u32::MAX);

        check(BitBuf::new(3), 0);
        check(BitBuf::new(5), 2);
        check(BitBuf::new(300), 0);
        check(BitBuf::new(300), 100);
    }

    #[test]
    fn test_padded_bitbuf_zero_padding() {
        let sz = BASIC_BLOCK_SIZE * 1000;
        let mut buf = BitBuf::new(BASIC_BLOCK_SIZE * 3000);
        buf.set_one(0);
        buf.set_one(sz / 2);
        buf.set_one(sz - 1);

        let spec = PadSpec::compute(&buf);
        assert!(spec.should_pad(buf.num_blocks(), 1.0));
        assert!(!spec.should_pad(buf.num_blocks(), 0.0));

        let padded = buf.clone().maybe_padded(0.5);
        assert_eq!(padded.get(1), false);
        assert_eq!(padded.get(12345), false);
        assert_eq!(padded.get(sz / 2), true);
    }

    #[test]
    fn test_padded_bitbuf_one_padding() {
        let sz = BASIC_BLOCK_SIZE * 1000;
        let mut buf = BitBuf::new(BASIC_BLOCK_SIZE * 3000);
        for block in 0..buf.blocks.len() {
            buf.blocks[block] = u32::MAX;
        }
        buf.set_zero(0);
        buf.set_zero(sz / 2);
        buf.set_zero(sz - 1);

        let padded = buf.clone().maybe_padded(0.5);
        assert_eq!(padded.get(1), true);
        assert_eq!(padded.get(12345), true);
        assert_eq!(padded.get(sz / 2), false);
    }

    #[test]
    fn test_padded_bitbuf_falls_back_when_not_worthwhile() {
        // 1-bits spread throughout leave nothing to trim, so maybe_padded
        // should hand back the full buffer unpadded.
        let mut buf = BitBuf::new(BASIC_BLOCK_SIZE * 10);
        for i in (0..buf.universe_size()).step_by(5) {
            buf.set_one(i);
        }
        let padded = buf.clone().maybe_padded(0.5);
        for i in 0..buf.universe_size() {
            assert_eq!(padded.get(i), buf.get(i));
        }
    }

    #[test]
    fn test_padded_bitbuf_empty() {
        let a = BitBuf::new(3).maybe_padded(1.0);
        let b = BitBuf::new(300).maybe_padded(1.0);
        assert_eq!(a.get_block(0), 0);
        assert_eq!(b.get_block(0), 0);
    }
}
