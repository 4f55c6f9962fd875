//! Symmetric folding ahead of a trace contraction.
//!
//! When `B` is symmetric, `Tr(A B) = Σ_j A[j,j] B[j,j] + Σ_{j>k} (A[j,k] + A[k,j]) B[j,k]`,
//! so `A` only needs its folded lower triangle.

use crate::layout::{ensure_len, overlaps, tril_len, BatchShape};
use crate::scalar::SymScalar;
use crate::simd::dispatch_if_large;
use crate::threading::{for_each_batch, SendPtr};
use crate::Result;

#[inline]
fn fold_one<T: SymScalar>(out: &mut [T], a: &[T], m: usize, diagfac: T) {
    let mut n = 0;
    for j in 0..m {
        for k in 0..j {
            out[n] = a[j * m + k] + a[k * m + j];
            n += 1;
        }
        out[n] = a[j * m + j] * diagfac;
        n += 1;
    }
}

/// Fold each `m x m` slice into packed lower-triangular storage.
///
/// - off-diagonal `(j, k)`, `j > k`: `input[i,j,k] + input[i,k,j]`
/// - diagonal `(j, j)`: `input[i,j,j] * diagfac`
///
/// `out` is `(count, m*(m+1)/2)`; `input` is `(count, m, m)` and need not be
/// symmetric.
pub fn precontract<T: SymScalar>(
    out: &mut [T],
    input: &[T],
    count: usize,
    m: usize,
    diagfac: T,
) -> Result<()> {
    let shape = BatchShape::new(count, m);
    ensure_len("out", shape.packed_total()?, out.len())?;
    ensure_len("input", shape.dense3_total()?, input.len())?;
    unsafe { precontract_ptr(out.as_mut_ptr(), input.as_ptr(), count, m, diagfac) };
    Ok(())
}

/// Raw-pointer form of [`precontract`].
///
/// # Safety
/// - `out` must be valid for `count * m*(m+1)/2` writes
/// - `input` must be valid for `count * m * m` reads
/// - the two regions must not overlap
pub unsafe fn precontract_ptr<T: SymScalar>(
    out: *mut T,
    input: *const T,
    count: usize,
    m: usize,
    diagfac: T,
) {
    let packed = tril_len(m);
    let mm = m * m;
    debug_assert!(!overlaps(out, count * packed, input, count * mm));
    if count == 0 || m == 0 {
        return;
    }

    let dst = SendPtr(out);
    let src = SendPtr::from_const(input);
    let path = for_each_batch(count, mm, move |i| {
        let (o, a) = unsafe {
            (
                std::slice::from_raw_parts_mut(dst.as_ptr().add(i * packed), packed),
                std::slice::from_raw_parts(src.as_const().add(i * mm), mm),
            )
        };
        dispatch_if_large(mm, || fold_one(o, a, m, diagfac));
    });
    tracing::trace!(kernel = "precontract", count, m, path = ?path);
}
