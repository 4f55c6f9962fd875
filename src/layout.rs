//! Index arithmetic for dense and packed-triangular batches.

use crate::{Result, SymPackError};

/// Number of elements in the packed lower triangle of an `m x m` matrix.
#[inline]
pub const fn tril_len(m: usize) -> usize {
    m * (m + 1) / 2
}

/// Packed offset of lower-triangular entry `(j, k)`, `j >= k`.
///
/// Rows are stored one after another, row `j` holding columns `0..=j`.
#[inline]
pub const fn tril_index(j: usize, k: usize) -> usize {
    debug_assert!(k <= j);
    tril_len(j) + k
}

/// Batch dimensions shared by every kernel: `count` elements of linear size `m`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchShape {
    pub count: usize,
    pub m: usize,
}

impl BatchShape {
    pub const fn new(count: usize, m: usize) -> Self {
        Self { count, m }
    }

    /// Elements per batch element of a `(count, m, m)` tensor.
    pub fn matrix_len(&self) -> Result<usize> {
        self.m.checked_mul(self.m).ok_or_else(|| self.overflow())
    }

    /// Elements per batch element of a `(count, m, m, m)` tensor.
    pub fn cube_len(&self) -> Result<usize> {
        self.matrix_len()?
            .checked_mul(self.m)
            .ok_or_else(|| self.overflow())
    }

    /// Elements per batch element of a packed `(count, m*(m+1)/2)` buffer.
    pub fn packed_len(&self) -> Result<usize> {
        self.m
            .checked_add(1)
            .and_then(|m1| m1.checked_mul(self.m))
            .map(|v| v / 2)
            .ok_or_else(|| self.overflow())
    }

    /// Total length of a `(count, m, m)` buffer.
    pub fn dense3_total(&self) -> Result<usize> {
        self.batched(self.matrix_len()?)
    }

    /// Total length of a `(count, m, m, m)` buffer.
    pub fn dense4_total(&self) -> Result<usize> {
        self.batched(self.cube_len()?)
    }

    /// Total length of a `(count, m*(m+1)/2)` buffer.
    pub fn packed_total(&self) -> Result<usize> {
        self.batched(self.packed_len()?)
    }

    fn batched(&self, per_item: usize) -> Result<usize> {
        self.count.checked_mul(per_item).ok_or_else(|| self.overflow())
    }

    fn overflow(&self) -> SymPackError {
        SymPackError::SizeOverflow {
            count: self.count,
            m: self.m,
        }
    }
}

/// Check that `buffer` holds exactly `expected` elements.
pub(crate) fn ensure_len(buffer: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(SymPackError::LengthMismatch {
            buffer,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Whether two element ranges share any memory.
pub(crate) fn overlaps<T>(a: *const T, a_len: usize, b: *const T, b_len: usize) -> bool {
    let size = std::mem::size_of::<T>();
    if a_len == 0 || b_len == 0 || size == 0 {
        return false;
    }
    let a0 = a as usize;
    let b0 = b as usize;
    let a1 = a0.saturating_add(a_len.saturating_mul(size));
    let b1 = b0.saturating_add(b_len.saturating_mul(size));
    a0 < b1 && b0 < a1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tril_len_small() {
        assert_eq!(tril_len(0), 0);
        assert_eq!(tril_len(1), 1);
        assert_eq!(tril_len(2), 3);
        assert_eq!(tril_len(5), 15);
    }

    #[test]
    fn test_tril_index_enumerates_rows() {
        // m = 5: (0,0) (1,0) (1,1) (2,0) (2,1) (2,2) ...
        let mut n = 0;
        for j in 0..5 {
            for k in 0..=j {
                assert_eq!(tril_index(j, k), n, "pair ({j},{k})");
                n += 1;
            }
        }
        assert_eq!(n, tril_len(5));
    }

    #[test]
    fn test_batch_shape_totals() {
        let s = BatchShape::new(3, 4);
        assert_eq!(s.dense3_total().unwrap(), 48);
        assert_eq!(s.dense4_total().unwrap(), 192);
        assert_eq!(s.packed_total().unwrap(), 30);
    }

    #[test]
    fn test_batch_shape_empty() {
        let s = BatchShape::new(0, 7);
        assert_eq!(s.dense4_total().unwrap(), 0);
        let s = BatchShape::new(7, 0);
        assert_eq!(s.packed_total().unwrap(), 0);
    }

    #[test]
    fn test_batch_shape_overflow() {
        let s = BatchShape::new(2, usize::MAX / 2);
        assert_eq!(
            s.dense3_total(),
            Err(SymPackError::SizeOverflow {
                count: 2,
                m: usize::MAX / 2
            })
        );
        assert!(BatchShape::new(usize::MAX, 2).packed_total().is_err());
    }

    #[test]
    fn test_ensure_len() {
        assert!(ensure_len("out", 4, 4).is_ok());
        let err = ensure_len("out", 4, 3).unwrap_err();
        assert_eq!(err.to_string(), "out buffer length mismatch: expected 4, got 3");
    }

    #[test]
    fn test_overlaps() {
        let data = [0.0f64; 8];
        let p = data.as_ptr();
        assert!(overlaps(p, 4, p, 4));
        assert!(overlaps(p, 4, p.wrapping_add(3), 4));
        assert!(!overlaps(p, 4, p.wrapping_add(4), 4));
        assert!(!overlaps(p, 0, p, 4));
    }
}
