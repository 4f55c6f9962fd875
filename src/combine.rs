//! Linear-combination strategy shared by the axis-swap kernels.

use crate::scalar::SymScalar;

/// How `v1` and the axis-swapped `v2` are combined.
///
/// `Sum` is the multiplication-free fast path. It is chosen only when both
/// coefficients compare exactly equal to one, so it yields the same bits as
/// the weighted form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Combine<T> {
    /// `v1 + v2ᵗ`
    Sum,
    /// `a * v1 + b * v2ᵗ`
    Weighted { a: T, b: T },
}

impl<T: SymScalar> Combine<T> {
    /// Pick the strategy for coefficients `a` and `b`.
    pub fn new(a: T, b: T) -> Self {
        if a == T::one() && b == T::one() {
            Combine::Sum
        } else {
            Combine::Weighted { a, b }
        }
    }

    pub(crate) fn label(&self) -> &'static str {
        match self {
            Combine::Sum => "sum",
            Combine::Weighted { .. } => "weighted",
        }
    }
}

/// `dst[l] = f(x[l], y[l])` over three equally long rows.
#[inline(always)]
pub(crate) fn zip_rows<T: Copy, F: Fn(T, T) -> T>(dst: &mut [T], x: &[T], y: &[T], f: &F) {
    for ((d, &xv), &yv) in dst.iter_mut().zip(x).zip(y) {
        *d = f(xv, yv);
    }
}

/// `dst[l] = f(dst[l], y[l])`, for the case where the output row is `x`.
#[inline(always)]
pub(crate) fn zip_rows_inplace<T: Copy, F: Fn(T, T) -> T>(dst: &mut [T], y: &[T], f: &F) {
    for (d, &yv) in dst.iter_mut().zip(y) {
        *d = f(*d, yv);
    }
}
