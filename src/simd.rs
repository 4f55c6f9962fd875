//! Runtime SIMD dispatch for per-batch inner loops.

#[inline(always)]
pub(crate) fn dispatch<R>(f: impl FnOnce() -> R) -> R {
    #[cfg(feature = "simd")]
    {
        pulp::Arch::new().dispatch(f)
    }
    #[cfg(not(feature = "simd"))]
    {
        f()
    }
}

/// Per-batch element count below which the CPU-feature check costs more than
/// it saves. Heuristic only; results do not depend on it.
pub(crate) const SIMD_DISPATCH_MIN_LEN: usize = 64;

/// Dispatch only when a batch element touches at least
/// [`SIMD_DISPATCH_MIN_LEN`] elements; tiny matrices run the plain loop.
#[inline(always)]
pub(crate) fn dispatch_if_large<R>(len: usize, f: impl FnOnce() -> R) -> R {
    if len >= SIMD_DISPATCH_MIN_LEN {
        dispatch(f)
    } else {
        f()
    }
}
