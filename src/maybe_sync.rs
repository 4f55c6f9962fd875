//! Thread-safety marker for batch closures and elements.
//!
//! With `parallel`, batch elements are handed to rayon workers, so
//! [`MaybeSendSync`] requires [`Send`] + [`Sync`]. Without it the marker holds
//! for every type and the kernels accept single-threaded element types.

#[cfg(feature = "parallel")]
pub trait MaybeSendSync: Send + Sync {}
#[cfg(feature = "parallel")]
impl<T: Send + Sync> MaybeSendSync for T {}

#[cfg(not(feature = "parallel"))]
pub trait MaybeSendSync {}
#[cfg(not(feature = "parallel"))]
impl<T> MaybeSendSync for T {}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync_marker<T: MaybeSendSync>() {}

    #[test]
    fn test_float_types_satisfy_marker() {
        assert_send_sync_marker::<f64>();
        assert_send_sync_marker::<f32>();
    }

    #[cfg(not(feature = "parallel"))]
    #[test]
    fn test_rc_satisfies_marker_without_parallel() {
        assert_send_sync_marker::<std::rc::Rc<f64>>();
    }
}
