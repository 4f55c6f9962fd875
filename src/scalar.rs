//! Element bound for the batched kernels.

use crate::maybe_sync::MaybeSendSync;

/// Arithmetic the kernels need from an element type.
///
/// `PartialEq` + `One` back the exact `a == 1 && b == 1` fast-path test in
/// [`Combine::new`](crate::Combine::new). `f64` is the reference type.
pub trait SymScalar:
    Copy
    + MaybeSendSync
    + std::ops::Mul<Output = Self>
    + std::ops::Add<Output = Self>
    + num_traits::Zero
    + num_traits::One
    + PartialEq
    + 'static
{
}

impl<T> SymScalar for T where
    T: Copy
        + MaybeSendSync
        + std::ops::Mul<Output = T>
        + std::ops::Add<Output = T>
        + num_traits::Zero
        + num_traits::One
        + PartialEq
        + 'static
{
}
