//! `out = a * v1 + b * v2.transpose(0, 2, 1, 3)` over `(count, m, m, m)`.
//!
//! For batch element `i`, each output row `out[i, j, k, :]` combines the
//! contiguous row `v1[i, j, k, :]` with the row `v2[i, k, j, :]`, which is
//! also contiguous but sits at the swapped `(k, j)` position.

use crate::combine::{zip_rows, zip_rows_inplace, Combine};
use crate::layout::{ensure_len, overlaps, BatchShape};
use crate::maybe_sync::MaybeSendSync;
use crate::scalar::SymScalar;
use crate::simd::dispatch_if_large;
use crate::threading::{for_each_batch, SendPtr};
use crate::Result;

/// `out[i,j,k,l] = a * v1[i,j,k,l] + b * v2[i,k,j,l]`.
///
/// All three buffers have shape `(count, m, m, m)`. `out` and `v2` cannot
/// alias here; use [`make_0213_inplace`] to accumulate into `v1`.
pub fn make_0213<T: SymScalar>(
    out: &mut [T],
    v1: &[T],
    v2: &[T],
    count: usize,
    m: usize,
    a: T,
    b: T,
) -> Result<()> {
    let total = BatchShape::new(count, m).dense4_total()?;
    ensure_len("out", total, out.len())?;
    ensure_len("v1", total, v1.len())?;
    ensure_len("v2", total, v2.len())?;
    unsafe { make_0213_ptr(out.as_mut_ptr(), v1.as_ptr(), v2.as_ptr(), count, m, a, b) };
    Ok(())
}

/// [`make_0213`] with `out` ≡ `v1`: `v1 = a * v1 + b * v2.transpose(0, 2, 1, 3)`.
pub fn make_0213_inplace<T: SymScalar>(
    v1: &mut [T],
    v2: &[T],
    count: usize,
    m: usize,
    a: T,
    b: T,
) -> Result<()> {
    let total = BatchShape::new(count, m).dense4_total()?;
    ensure_len("v1", total, v1.len())?;
    ensure_len("v2", total, v2.len())?;
    let out = v1.as_mut_ptr();
    unsafe { make_0213_ptr(out, out as *const T, v2.as_ptr(), count, m, a, b) };
    Ok(())
}

/// Raw-pointer form of [`make_0213`].
///
/// `out` may equal `v1` exactly; each output row is read from `v1` at the
/// same position before it is written.
///
/// # Safety
/// - all three pointers must be valid for `count * m^3` elements
/// - `out` must not overlap `v2`
/// - `out` must either equal `v1` or not overlap it
pub unsafe fn make_0213_ptr<T: SymScalar>(
    out: *mut T,
    v1: *const T,
    v2: *const T,
    count: usize,
    m: usize,
    a: T,
    b: T,
) {
    let combine = Combine::new(a, b);
    match combine {
        Combine::Sum => run_0213(out, v1, v2, count, m, |x, y| x + y, combine),
        Combine::Weighted { a, b } => {
            run_0213(out, v1, v2, count, m, move |x, y| x * a + y * b, combine)
        }
    }
}

unsafe fn run_0213<T, F>(
    out: *mut T,
    v1: *const T,
    v2: *const T,
    count: usize,
    m: usize,
    f: F,
    combine: Combine<T>,
) where
    T: SymScalar,
    F: Fn(T, T) -> T + MaybeSendSync,
{
    let d2 = m * m;
    let d1 = d2 * m;
    let inplace = out as *const T == v1;
    debug_assert!(!overlaps(out, count * d1, v2, count * d1));
    debug_assert!(inplace || !overlaps(out, count * d1, v1, count * d1));
    if count == 0 || m == 0 {
        return;
    }

    let pout = SendPtr(out);
    let pv1 = SendPtr::from_const(v1);
    let pv2 = SendPtr::from_const(v2);
    let path = for_each_batch(count, d1, move |i| {
        let base = i * d1;
        dispatch_if_large(d1, || {
            for j in 0..m {
                for k in 0..m {
                    let row = base + j * d2 + k * m;
                    let swapped = base + k * d2 + j * m;
                    unsafe {
                        let dst = std::slice::from_raw_parts_mut(pout.as_ptr().add(row), m);
                        let y = std::slice::from_raw_parts(pv2.as_const().add(swapped), m);
                        if inplace {
                            zip_rows_inplace(dst, y, &f);
                        } else {
                            let x = std::slice::from_raw_parts(pv1.as_const().add(row), m);
                            zip_rows(dst, x, y, &f);
                        }
                    }
                }
            }
        });
    });
    tracing::trace!(kernel = "make_0213", count, m, inplace, combine = combine.label(), path = ?path);
}
