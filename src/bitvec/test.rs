//! Generic property tests shared across every `BitVec` implementation.
//! Each concrete type's own test module calls into these helpers rather
//! than re-deriving the same rank/select/get invariants by hand.

use super::sorted_array::SortedArrayBitVecBuilder;
use super::{BitVec, BitVecBuilder};
use crate::panics;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::panic::UnwindSafe;

pub(crate) const BASIC_BLOCK_SIZE: u32 = 32;

/// Exhaustively exercises a builder across a range of universe sizes and
/// one-bit positions, checking the resulting bit vector's basic invariants
/// at each step via [`test_bit_vec`].
pub(crate) fn test_bit_vec_builder<T: BitVecBuilder>()
where
    T::Target: UnwindSafe,
{
    // Step size chosen so that positions land on both sides of a block
    // boundary without an exhaustive bit-by-bit sweep.
    let step = ((BASIC_BLOCK_SIZE >> 1) - 1).max(1);
    for universe_size in [0, 1, 2, 3, 31, 32, 33, 100, 1000] {
        if universe_size == 0 {
            test_bit_vec(T::new(0).build());
            continue;
        }
        let mut i = 0;
        while i < universe_size {
            // A single one-bit at position i.
            let mut b = T::new(universe_size);
            b.one(i);
            test_bit_vec(b.build());

            // Two one-bits, at i and at a different position.
            let j = (i + step) % universe_size;
            if j != i {
                let mut b = T::new(universe_size);
                b.one(i);
                b.one(j);
                test_bit_vec(b.build());
            }
            i += step;
        }
    }
}

/// Checks the oracle-independent invariants that must hold for any correct
/// `BitVec`: rank/select are inverse to one another, `get` agrees with the
/// counts implied by rank, and out-of-range queries panic rather than
/// silently returning a wrong answer.
pub(crate) fn test_bit_vec<T: BitVec + UnwindSafe>(bv: T) {
    let universe_size = bv.universe_size();
    let num_ones = bv.num_ones();
    let has_multiplicity = bv.has_multiplicity();

    assert_eq!(bv.rank1(0), 0);
    assert_eq!(bv.rank1(universe_size), num_ones);

    // rank1 is non-decreasing and select1 inverts it at occupied positions.
    let mut prev_rank = 0;
    for i in 0..universe_size {
        let rank = bv.rank1(i + 1);
        assert!(rank >= prev_rank);
        prev_rank = rank;
    }

    for n in 0..num_ones {
        let pos = bv.select1(n);
        assert!(pos < universe_size);
        assert!(bv.rank1(pos) <= n);
        assert!(bv.rank1(pos + 1) > n);
    }
    assert_eq!(bv.try_select1(num_ones), None);
    assert!(panics(|| bv.clone().select1(num_ones)));

    if !has_multiplicity {
        let num_zeros = bv.num_zeros();
        assert_eq!(bv.rank0(0), 0);
        assert_eq!(bv.rank0(universe_size), num_zeros);
        for n in 0..num_zeros {
            let pos = bv.select0(n);
            assert!(pos < universe_size);
            assert!(bv.rank0(pos) <= n);
            assert!(bv.rank0(pos + 1) > n);
        }
        assert_eq!(bv.try_select0(num_zeros), None);
        assert!(panics(|| bv.clone().select0(num_zeros)));

        // get() must agree with a ground-truth map built purely from rank1.
        let mut counts: BTreeMap<u32, u32> = BTreeMap::new();
        for i in 0..universe_size {
            let count = bv.rank1(i + 1) - bv.rank1(i);
            if count > 0 {
                counts.insert(i, count);
            }
        }
        for i in 0..universe_size {
            let expected = counts.get(&i).copied().unwrap_or(0);
            assert_eq!(bv.get(i), expected);
        }
    }

    assert!(panics(|| bv.clone().get(universe_size)));
    assert_eq!(bv.num_unique_zeros(), universe_size - bv.num_unique_ones());
}

/// Checks that `T` agrees with the `SortedArrayBitVec` oracle on every
/// `rank`/`select` query, across a batch of random inputs built from the
/// same 1-bit positions. `allow_multiplicity` controls whether duplicate
/// positions (and therefore rank0/select0 exclusion) are exercised; pass
/// `false` for representations that don't support multiplicity.
pub(crate) fn test_bit_vec_builder_against_oracle<T: BitVecBuilder>(allow_multiplicity: bool) {
    let mut rng = StdRng::seed_from_u64(0x0ff1ce);
    for _trial in 0..50 {
        let universe_size = rng.gen_range(1..500);
        let num_positions = rng.gen_range(0..universe_size.max(1));
        let mut positions = Vec::with_capacity(num_positions as usize);
        for _ in 0..num_positions {
            let pos = rng.gen_range(0..universe_size);
            positions.push(pos);
            if allow_multiplicity && rng.gen_bool(0.2) {
                positions.push(pos);
            }
        }
        if !allow_multiplicity {
            // An incidental collision between two random positions would
            // otherwise give the oracle (which records every push) spurious
            // multiplicity that a non-multiplicity builder can't reproduce,
            // since repeated `one()` calls at the same index are idempotent.
            positions.sort_unstable();
            positions.dedup();
        }

        let mut oracle_builder = SortedArrayBitVecBuilder::new(universe_size);
        let mut builder = T::new(universe_size);
        for &p in &positions {
            oracle_builder.one(p);
            builder.one(p);
        }
        let oracle = oracle_builder.build();
        let bv = builder.build();

        assert_eq!(bv.num_ones(), oracle.num_ones());
        assert_eq!(bv.num_unique_ones(), oracle.num_unique_ones());
        assert_eq!(bv.has_multiplicity(), oracle.has_multiplicity());

        for i in 0..=universe_size {
            assert_eq!(bv.rank1(i), oracle.rank1(i), "rank1({i}) mismatch");
        }
        for n in 0..bv.num_ones() {
            assert_eq!(bv.select1(n), oracle.select1(n), "select1({n}) mismatch");
        }

        if !bv.has_multiplicity() {
            for i in 0..=universe_size {
                assert_eq!(bv.rank0(i), oracle.rank0(i), "rank0({i}) mismatch");
            }
            for n in 0..bv.num_zeros() {
                assert_eq!(bv.select0(n), oracle.select0(n), "select0({n}) mismatch");
            }
            for i in 0..universe_size {
                assert_eq!(bv.get(i), oracle.get(i), "get({i}) mismatch");
            }
        }
    }
}

/// Randomized-density fuzzing via `arbtest`: builds bit vectors of arbitrary
/// size and 1-bit density (occasionally with multiplicity, when allowed) and
/// runs each through [`test_bit_vec`]. `arbtest` shrinks any failing case to
/// a minimal reproduction automatically.
pub(crate) fn test_bit_vec_builder_arbtest<T: BitVecBuilder>(
    allow_multiplicity: bool,
    seed: Option<u64>,
) where
    T::Target: UnwindSafe,
{
    use arbtest::arbtest;

    fn property<T: BitVecBuilder>(
        allow_multiplicity: bool,
        u: &mut arbitrary::Unstructured,
    ) -> arbitrary::Result<()>
    where
        T::Target: UnwindSafe,
    {
        let ones_percent = u.int_in_range(0..=100)?;
        let universe_size = u.arbitrary_len::<u32>()? as u32;
        let mut builder = T::new(universe_size);
        let with_multiplicity = allow_multiplicity && u.ratio(1, 3)?;
        for i in 0..universe_size {
            if u.int_in_range(0..=100)? < ones_percent {
                let count = if with_multiplicity {
                    u.int_in_range(0..=10)?
                } else {
                    1
                };
                builder.one_count(i, count);
            }
        }
        test_bit_vec(builder.build());
        Ok(())
    }

    let mut test = arbtest(move |u| property::<T>(allow_multiplicity, u));
    if let Some(seed) = seed {
        test = test.seed(seed);
    }
}
