//! Batch-parallel execution.
//!
//! Every kernel hands one closure per batch index to [`for_each_batch`].
//! Batch elements write disjoint output regions, so workers never share a
//! write location and no locking is needed.

#[cfg(feature = "parallel")]
use rayon::iter::{IntoParallelIterator, ParallelIterator};

#[cfg(feature = "parallel")]
use crate::MINTHREADLENGTH;

use crate::maybe_sync::MaybeSendSync;

/// A raw pointer wrapper that is `Send` + `Sync`.
///
/// # Safety
/// The caller must guarantee that the pointed-to data outlives the parallel
/// region and that different batch indices write disjoint regions.
pub(crate) struct SendPtr<T>(pub(crate) *mut T);

impl<T> Clone for SendPtr<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SendPtr<T> {}

unsafe impl<T> Send for SendPtr<T> {}
unsafe impl<T> Sync for SendPtr<T> {}

impl<T> SendPtr<T> {
    pub(crate) fn from_const(ptr: *const T) -> Self {
        SendPtr(ptr as *mut T)
    }

    // Closures must go through these methods: capturing `.0` directly would
    // capture the bare pointer, which is neither Send nor Sync.
    pub(crate) fn as_ptr(self) -> *mut T {
        self.0
    }

    pub(crate) fn as_const(self) -> *const T {
        self.0 as *const T
    }
}

/// How a batch was executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExecPath {
    Sequential,
    #[cfg(feature = "parallel")]
    Parallel,
}

/// Whether `count` batch elements of `per_item` touched elements each are
/// worth splitting across `nthreads` workers.
#[cfg(feature = "parallel")]
fn use_parallel(count: usize, per_item: usize, nthreads: usize) -> bool {
    nthreads > 1 && count > 1 && count.saturating_mul(per_item) > MINTHREADLENGTH
}

/// Index range of block `b` when `0..count` is cut into `nblocks` contiguous
/// blocks whose sizes differ by at most one.
#[cfg(feature = "parallel")]
fn block_range(b: usize, nblocks: usize, count: usize) -> std::ops::Range<usize> {
    let base = count / nblocks;
    let rem = count % nblocks;
    let start = b * base + b.min(rem);
    let len = base + usize::from(b < rem);
    start..start + len
}

/// Run `f(i)` for every `i` in `0..count`.
///
/// Above the threading threshold the index range is cut into
/// `min(count, nthreads)` even contiguous blocks, one rayon task per block.
/// A block runs start to end on a single worker.
pub(crate) fn for_each_batch<F>(count: usize, per_item: usize, f: F) -> ExecPath
where
    F: Fn(usize) + MaybeSendSync,
{
    #[cfg(feature = "parallel")]
    {
        let nthreads = rayon::current_num_threads();
        if use_parallel(count, per_item, nthreads) {
            let nblocks = count.min(nthreads);
            (0..nblocks).into_par_iter().for_each(|b| {
                for i in block_range(b, nblocks, count) {
                    f(i);
                }
            });
            return ExecPath::Parallel;
        }
    }
    #[cfg(not(feature = "parallel"))]
    let _ = per_item;

    for i in 0..count {
        f(i);
    }
    ExecPath::Sequential
}
