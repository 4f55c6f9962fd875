//! Packed lower-triangular storage for batches of symmetric matrices.
//!
//! A dense batch `(count, m, m)` maps to a packed batch
//! `(count, m*(m+1)/2)`; row `j` of the lower triangle (columns `0..=j`)
//! starts at packed offset [`tril_len(j)`](crate::tril_len).

use std::ops::Neg;

use crate::layout::{ensure_len, overlaps, tril_len, BatchShape};
use crate::maybe_sync::MaybeSendSync;
use crate::scalar::SymScalar;
use crate::simd::dispatch_if_large;
use crate::threading::{for_each_batch, SendPtr};
use crate::Result;

/// How the strictly-upper triangle is rebuilt from the packed lower triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrilSymmetry {
    /// `A[k,j] = A[j,k]`
    #[default]
    Symmetric,
    /// `A[k,j] = -A[j,k]`; the diagonal is copied unchanged.
    AntiSymmetric,
    /// `A[k,j] = 0`
    LowerOnly,
}

#[inline]
fn pack_one<T: Copy>(tril: &mut [T], mat: &[T], m: usize) {
    for (j, row) in mat.chunks_exact(m).enumerate() {
        tril[tril_len(j)..tril_len(j + 1)].copy_from_slice(&row[..=j]);
    }
}

#[inline]
fn unpack_one<T: Copy, U: Fn(T) -> T>(mat: &mut [T], tril: &[T], m: usize, upper: &U) {
    for j in 0..m {
        let row = &tril[tril_len(j)..tril_len(j + 1)];
        mat[j * m..=j * m + j].copy_from_slice(row);
        for (k, &v) in row[..j].iter().enumerate() {
            mat[k * m + j] = upper(v);
        }
    }
}

/// Pack the lower triangle of each `m x m` matrix: `tril[i] = tril(mat[i])`.
///
/// Only entries `(j, k)` with `j >= k` are read; the upper triangle is
/// ignored, so a non-symmetric input silently loses it.
///
/// - `tril`: `(count, m*(m+1)/2)`
/// - `mat`: `(count, m, m)`
pub fn pack_tril<T: SymScalar>(tril: &mut [T], mat: &[T], count: usize, m: usize) -> Result<()> {
    let shape = BatchShape::new(count, m);
    ensure_len("tril", shape.packed_total()?, tril.len())?;
    ensure_len("mat", shape.dense3_total()?, mat.len())?;
    unsafe { pack_tril_ptr(tril.as_mut_ptr(), mat.as_ptr(), count, m) };
    Ok(())
}

/// Expand packed lower triangles into full symmetric matrices.
///
/// Both `(j, k)` and `(k, j)` receive the packed value of `(j, k)`. The whole
/// of `mat` is overwritten.
///
/// - `mat`: `(count, m, m)`
/// - `tril`: `(count, m*(m+1)/2)`
pub fn unpack_tril<T: SymScalar>(mat: &mut [T], tril: &[T], count: usize, m: usize) -> Result<()> {
    let shape = BatchShape::new(count, m);
    ensure_len("mat", shape.dense3_total()?, mat.len())?;
    ensure_len("tril", shape.packed_total()?, tril.len())?;
    unsafe { unpack_tril_ptr(mat.as_mut_ptr(), tril.as_ptr(), count, m) };
    Ok(())
}

/// [`unpack_tril`] with an explicit rule for the strictly-upper triangle.
pub fn unpack_tril_with<T>(
    mat: &mut [T],
    tril: &[T],
    count: usize,
    m: usize,
    symmetry: TrilSymmetry,
) -> Result<()>
where
    T: SymScalar + Neg<Output = T>,
{
    let shape = BatchShape::new(count, m);
    ensure_len("mat", shape.dense3_total()?, mat.len())?;
    ensure_len("tril", shape.packed_total()?, tril.len())?;
    unsafe { unpack_tril_with_ptr(mat.as_mut_ptr(), tril.as_ptr(), count, m, symmetry) };
    Ok(())
}

/// Raw-pointer form of [`pack_tril`].
///
/// # Safety
/// - `tril` must be valid for `count * m*(m+1)/2` writes
/// - `mat` must be valid for `count * m * m` reads
/// - the two regions must not overlap
pub unsafe fn pack_tril_ptr<T: SymScalar>(tril: *mut T, mat: *const T, count: usize, m: usize) {
    let packed = tril_len(m);
    let mm = m * m;
    debug_assert!(!overlaps(tril, count * packed, mat, count * mm));
    if count == 0 || m == 0 {
        return;
    }

    let dst = SendPtr(tril);
    let src = SendPtr::from_const(mat);
    let path = for_each_batch(count, mm, move |i| {
        let (t, a) = unsafe {
            (
                std::slice::from_raw_parts_mut(dst.as_ptr().add(i * packed), packed),
                std::slice::from_raw_parts(src.as_const().add(i * mm), mm),
            )
        };
        dispatch_if_large(mm, || pack_one(t, a, m));
    });
    tracing::trace!(kernel = "pack_tril", count, m, path = ?path);
}

/// Raw-pointer form of [`unpack_tril`].
///
/// # Safety
/// - `mat` must be valid for `count * m * m` writes
/// - `tril` must be valid for `count * m*(m+1)/2` reads
/// - the two regions must not overlap
pub unsafe fn unpack_tril_ptr<T: SymScalar>(mat: *mut T, tril: *const T, count: usize, m: usize) {
    unpack_batches(mat, tril, count, m, |v| v, TrilSymmetry::Symmetric);
}

/// Raw-pointer form of [`unpack_tril_with`].
///
/// # Safety
/// Same requirements as [`unpack_tril_ptr`].
pub unsafe fn unpack_tril_with_ptr<T>(
    mat: *mut T,
    tril: *const T,
    count: usize,
    m: usize,
    symmetry: TrilSymmetry,
) where
    T: SymScalar + Neg<Output = T>,
{
    match symmetry {
        TrilSymmetry::Symmetric => unpack_batches(mat, tril, count, m, |v| v, symmetry),
        TrilSymmetry::AntiSymmetric => unpack_batches(mat, tril, count, m, |v: T| -v, symmetry),
        TrilSymmetry::LowerOnly => unpack_batches(mat, tril, count, m, |_| T::zero(), symmetry),
    }
}

unsafe fn unpack_batches<T, U>(
    mat: *mut T,
    tril: *const T,
    count: usize,
    m: usize,
    upper: U,
    symmetry: TrilSymmetry,
) where
    T: SymScalar,
    U: Fn(T) -> T + MaybeSendSync,
{
    let packed = tril_len(m);
    let mm = m * m;
    debug_assert!(!overlaps(mat, count * mm, tril, count * packed));
    if count == 0 || m == 0 {
        return;
    }

    let dst = SendPtr(mat);
    let src = SendPtr::from_const(tril);
    let path = for_each_batch(count, mm, move |i| {
        let (a, t) = unsafe {
            (
                std::slice::from_raw_parts_mut(dst.as_ptr().add(i * mm), mm),
                std::slice::from_raw_parts(src.as_const().add(i * packed), packed),
            )
        };
        dispatch_if_large(mm, || unpack_one(a, t, m, &upper));
    });
    tracing::trace!(kernel = "unpack_tril", count, m, symmetry = ?symmetry, path = ?path);
}
