//! Unchecked raw-pointer entry points.
//!
//! These mirror the slice API for callers that own their buffers across an
//! FFI boundary. Nothing is validated: buffer sizes must match `count`/`m`,
//! and the output must not overlap the operand read at swapped indices. In
//! debug builds the overlap rule is asserted.

pub use crate::fold::precontract_ptr;
pub use crate::swap_021::{make_021_ptr, sum_021_ptr};
pub use crate::swap_0213::make_0213_ptr;
pub use crate::tril::{pack_tril_ptr, unpack_tril_ptr, unpack_tril_with_ptr};
