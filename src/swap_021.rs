//! `out = a * v1 + b * v2.transpose(0, 2, 1)` over `(count, m, m)`.

use crate::combine::Combine;
use crate::layout::{ensure_len, overlaps, BatchShape};
use crate::maybe_sync::MaybeSendSync;
use crate::scalar::SymScalar;
use crate::simd::dispatch_if_large;
use crate::threading::{for_each_batch, SendPtr};
use crate::Result;

/// `out[i,j,k] = v1[i,j,k] + v2[i,k,j]`.
///
/// Multiplication-free specialization of [`make_021`] with `a = b = 1`.
pub fn sum_021<T: SymScalar>(
    out: &mut [T],
    v1: &[T],
    v2: &[T],
    count: usize,
    m: usize,
) -> Result<()> {
    check_lens(out.len(), v1.len(), v2.len(), count, m)?;
    unsafe { sum_021_ptr(out.as_mut_ptr(), v1.as_ptr(), v2.as_ptr(), count, m) };
    Ok(())
}

/// `out[i,j,k] = a * v1[i,j,k] + b * v2[i,k,j]`.
///
/// Exactly `a == 1 && b == 1` takes the [`sum_021`] path; the result is the
/// same either way. `out` and `v2` cannot alias; use [`make_021_inplace`] to
/// accumulate into `v1`.
pub fn make_021<T: SymScalar>(
    out: &mut [T],
    v1: &[T],
    v2: &[T],
    count: usize,
    m: usize,
    a: T,
    b: T,
) -> Result<()> {
    check_lens(out.len(), v1.len(), v2.len(), count, m)?;
    unsafe { make_021_ptr(out.as_mut_ptr(), v1.as_ptr(), v2.as_ptr(), count, m, a, b) };
    Ok(())
}

/// [`make_021`] with `out` ≡ `v1`.
pub fn make_021_inplace<T: SymScalar>(
    v1: &mut [T],
    v2: &[T],
    count: usize,
    m: usize,
    a: T,
    b: T,
) -> Result<()> {
    check_lens(v1.len(), v1.len(), v2.len(), count, m)?;
    let out = v1.as_mut_ptr();
    unsafe { make_021_ptr(out, out as *const T, v2.as_ptr(), count, m, a, b) };
    Ok(())
}

fn check_lens(out: usize, v1: usize, v2: usize, count: usize, m: usize) -> Result<()> {
    let total = BatchShape::new(count, m).dense3_total()?;
    ensure_len("out", total, out)?;
    ensure_len("v1", total, v1)?;
    ensure_len("v2", total, v2)
}

/// Raw-pointer form of [`sum_021`].
///
/// # Safety
/// - all three pointers must be valid for `count * m * m` elements
/// - `out` must not overlap `v2`
/// - `out` must either equal `v1` or not overlap it
pub unsafe fn sum_021_ptr<T: SymScalar>(
    out: *mut T,
    v1: *const T,
    v2: *const T,
    count: usize,
    m: usize,
) {
    run_021(out, v1, v2, count, m, |x, y| x + y, "sum");
}

/// Raw-pointer form of [`make_021`].
///
/// # Safety
/// Same requirements as [`sum_021_ptr`].
pub unsafe fn make_021_ptr<T: SymScalar>(
    out: *mut T,
    v1: *const T,
    v2: *const T,
    count: usize,
    m: usize,
    a: T,
    b: T,
) {
    match Combine::new(a, b) {
        Combine::Sum => sum_021_ptr(out, v1, v2, count, m),
        Combine::Weighted { a, b } => {
            run_021(out, v1, v2, count, m, move |x, y| x * a + y * b, "weighted")
        }
    }
}

unsafe fn run_021<T, F>(
    out: *mut T,
    v1: *const T,
    v2: *const T,
    count: usize,
    m: usize,
    f: F,
    combine: &'static str,
) where
    T: SymScalar,
    F: Fn(T, T) -> T + MaybeSendSync,
{
    let mm = m * m;
    let inplace = out as *const T == v1;
    debug_assert!(!overlaps(out, count * mm, v2, count * mm));
    debug_assert!(inplace || !overlaps(out, count * mm, v1, count * mm));
    if count == 0 || m == 0 {
        return;
    }

    let pout = SendPtr(out);
    let pv1 = SendPtr::from_const(v1);
    let pv2 = SendPtr::from_const(v2);
    let path = for_each_batch(count, mm, move |i| {
        let base = i * mm;
        let (dst, y) = unsafe {
            (
                std::slice::from_raw_parts_mut(pout.as_ptr().add(base), mm),
                std::slice::from_raw_parts(pv2.as_const().add(base), mm),
            )
        };
        dispatch_if_large(mm, || {
            if inplace {
                for (j, row) in dst.chunks_exact_mut(m).enumerate() {
                    for (k, d) in row.iter_mut().enumerate() {
                        *d = f(*d, y[k * m + j]);
                    }
                }
            } else {
                let x = unsafe { std::slice::from_raw_parts(pv1.as_const().add(base), mm) };
                for (j, (row, xrow)) in dst.chunks_exact_mut(m).zip(x.chunks_exact(m)).enumerate()
                {
                    for (k, (d, &xv)) in row.iter_mut().zip(xrow).enumerate() {
                        *d = f(xv, y[k * m + j]);
                    }
                }
            }
        });
    });
    tracing::trace!(kernel = "make_021", count, m, inplace, combine, path = ?path);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SymPackError;

    fn naive_021(v1: &[f64], v2: &[f64], count: usize, m: usize, a: f64, b: f64) -> Vec<f64> {
        let mut out = vec![0.0; v1.len()];
        for i in 0..count {
            for j in 0..m {
                for k in 0..m {
                    out[i * m * m + j * m + k] = v1[i * m * m + j * m + k] * a
                        + v2[i * m * m + k * m + j] * b;
                }
            }
        }
        out
    }

    #[test]
    fn test_sum_021_small() {
        // v2[0] = [[10, 20], [30, 40]] so v2ᵗ = [[10, 30], [20, 40]]
        let v1 = [1.0, 2.0, 3.0, 4.0];
        let v2 = [10.0, 20.0, 30.0, 40.0];
        let mut out = [0.0; 4];
        sum_021(&mut out, &v1, &v2, 1, 2).unwrap();
        assert_eq!(out, [11.0, 32.0, 23.0, 44.0]);
    }

    #[test]
    fn test_make_021_weighted_matches_naive() {
        let (count, m) = (4, 6);
        let v1: Vec<f64> = (0..count * m * m).map(|x| (x as f64).sin()).collect();
        let v2: Vec<f64> = (0..count * m * m).map(|x| (x as f64).cos()).collect();
        let mut out = vec![0.0; v1.len()];
        make_021(&mut out, &v1, &v2, count, m, 0.75, -1.25).unwrap();
        assert_eq!(out, naive_021(&v1, &v2, count, m, 0.75, -1.25));
    }

    #[test]
    fn test_make_021_unit_coefficients_equal_sum() {
        let (count, m) = (3, 5);
        let v1: Vec<f64> = (0..count * m * m).map(|x| 1.0 / (x as f64 + 1.0)).collect();
        let v2: Vec<f64> = (0..count * m * m).map(|x| (x as f64).sqrt()).collect();
        let mut general = vec![0.0; v1.len()];
        let mut fast = vec![0.0; v1.len()];
        make_021(&mut general, &v1, &v2, count, m, 1.0, 1.0).unwrap();
        sum_021(&mut fast, &v1, &v2, count, m).unwrap();
        let general_bits: Vec<u64> = general.iter().map(|x| x.to_bits()).collect();
        let fast_bits: Vec<u64> = fast.iter().map(|x| x.to_bits()).collect();
        assert_eq!(general_bits, fast_bits);
    }

    #[test]
    fn test_make_021_inplace_matches_out_of_place() {
        let (count, m) = (2, 7);
        let v1: Vec<f64> = (0..count * m * m).map(|x| x as f64).collect();
        let v2: Vec<f64> = (0..count * m * m).map(|x| 100.0 - x as f64).collect();
        let mut out = vec![0.0; v1.len()];
        make_021(&mut out, &v1, &v2, count, m, 2.0, 0.5).unwrap();

        let mut acc = v1.clone();
        make_021_inplace(&mut acc, &v2, count, m, 2.0, 0.5).unwrap();
        assert_eq!(acc, out);
    }

    #[test]
    fn test_make_021_self_transpose_is_symmetric() {
        let m = 4;
        let v: Vec<f64> = (0..m * m).map(|x| (x * x) as f64).collect();
        let mut out = vec![0.0; m * m];
        make_021(&mut out, &v, &v, 1, m, 0.5, 0.5).unwrap();
        for j in 0..m {
            for k in 0..m {
                assert_eq!(out[j * m + k], out[k * m + j]);
            }
        }
    }

    #[test]
    fn test_make_021_length_mismatch() {
        let v = vec![0.0; 8];
        let mut out = vec![0.0; 9];
        let err = make_021(&mut out, &v, &v, 2, 2, 2.0, 1.0).unwrap_err();
        assert_eq!(
            err,
            SymPackError::LengthMismatch {
                buffer: "out",
                expected: 8,
                actual: 9
            }
        );
    }
}
