//! Batched symmetry-aware packing and axis-swap kernels.
//!
//! Every kernel walks a batch of `count` independent dense tensors of linear
//! dimension `m`, stored contiguously in row-major order, and writes a
//! caller-owned output buffer. The batch index is the unit of parallel work.
//!
//! # Kernels
//!
//! - [`pack_tril`] / [`unpack_tril`]: `(count, m, m)` symmetric matrices to and
//!   from packed lower-triangular storage `(count, m*(m+1)/2)`
//! - [`make_0213`]: `out = a * v1 + b * v2.transpose(0, 2, 1, 3)`
//! - [`make_021`] / [`sum_021`]: `out = a * v1 + b * v2.transpose(0, 2, 1)`
//! - [`precontract`]: fold `A[j,k] + A[k,j]` into packed lower-triangular
//!   storage, scaling the diagonal by `diagfac`
//!
//! # Example
//!
//! ```rust
//! use strided_sympack::{pack_tril, unpack_tril};
//!
//! let dense = vec![1.0, 2.0, 3.0, 4.0];
//! let mut packed = vec![0.0; 3];
//! pack_tril(&mut packed, &dense, 1, 2).unwrap();
//! assert_eq!(packed, [1.0, 3.0, 4.0]);
//!
//! let mut restored = vec![0.0; 4];
//! unpack_tril(&mut restored, &packed, 1, 2).unwrap();
//! assert_eq!(restored, [1.0, 3.0, 3.0, 4.0]);
//! ```
//!
//! # Features
//!
//! - `parallel` (default): split batches across the current rayon pool
//! - `simd` (default): runtime CPU-feature dispatch for the inner loops
//!
//! The slice API checks buffer lengths once per call. The [`raw`] module
//! exposes the same kernels over raw pointers with no checks at all.

mod combine;
mod fold;
pub mod layout;
mod maybe_sync;
pub mod raw;
mod scalar;
mod simd;
mod swap_021;
mod swap_0213;
mod threading;
mod tril;

pub use combine::Combine;
pub use fold::precontract;
pub use layout::{tril_index, tril_len, BatchShape};
pub use maybe_sync::MaybeSendSync;
pub use scalar::SymScalar;
pub use swap_021::{make_021, make_021_inplace, sum_021};
pub use swap_0213::{make_0213, make_0213_inplace};
pub use tril::{pack_tril, unpack_tril, unpack_tril_with, TrilSymmetry};

/// Minimum number of touched elements to justify multi-threaded execution.
pub const MINTHREADLENGTH: usize = 1 << 15;

// ============================================================================
// Error types
// ============================================================================

/// Errors reported by the slice API when buffers disagree with `count`/`m`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SymPackError {
    /// A buffer does not hold exactly the number of elements the shape implies.
    #[error("{buffer} buffer length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        buffer: &'static str,
        expected: usize,
        actual: usize,
    },

    /// `count` and `m` describe more elements than `usize` can address.
    #[error("batch size overflow: count={count}, m={m}")]
    SizeOverflow { count: usize, m: usize },
}

/// Result type for batched packing operations.
pub type Result<T> = std::result::Result<T, SymPackError>;
