#![allow(unused)]

mod bitbuf;
mod bits;
mod bitvec;
mod intbuf;
mod wavelet_matrix;

pub use bitvec::dense::{DenseBitVec, DenseBitVecBuilder, DenseBitVecOptions};
pub use bitvec::multi::{Multi, MultiBuilder, MultiOptions};
pub use bitvec::rle::{RLEBitVec, RLEBitVecBuilder};
pub use bitvec::sorted_array::{SortedArrayBitVec, SortedArrayBitVecBuilder, SortedArrayBitVecOptions};
pub use bitvec::sparse::{SparseBitVec, SparseBitVecBuilder, SparseBitVecOptions};
pub use bitvec::{BitVec, BitVecBuilder};
pub use wavelet_matrix::WaveletMatrix;

/// A version of `std::panic::catch_unwind` that does not require unwind
/// safety for its closure argument. This lets tests exercise the panic
/// behavior of a `BitVec` implementation without requiring the trait
/// itself to carry an `UnwindSafe` bound; tests always clone the
/// `BitVec` before passing it into the closure, so there is no risk of
/// observing corrupted state after a panic.
pub fn catch_unwind<F: FnOnce() -> R, R>(f: F) -> std::thread::Result<R> {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(f))
}

pub fn panics<F: FnOnce() -> R, R>(f: F) -> bool {
    catch_unwind(f).is_err()
}
