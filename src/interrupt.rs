//! Cooperative cancellation for linear array traversals.
//!
//! Array operations never block, but some of them walk every member
//! (reversal, materialization, copying out). Those take an [`Interrupt`]
//! and consult it periodically so that the host can abort a long-running
//! computation.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::ArrayError;

/// A cancellation checkpoint supplied by the host.
///
/// # Examples
///
/// ```rust
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use xqarray::array::Array;
/// use xqarray::error::ArrayError;
///
/// let array: Array<i32> = (0..100).collect();
/// let stop = AtomicBool::new(true);
/// assert_eq!(array.reverse_array(&stop), Err(ArrayError::Interrupted));
///
/// stop.store(false, Ordering::Relaxed);
/// assert!(array.reverse_array(&stop).is_ok());
/// ```
pub trait Interrupt {
    /// Returns [`ArrayError::Interrupted`] if the current operation must stop.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::Interrupted`] when cancellation was requested.
    fn check_stop(&self) -> Result<(), ArrayError>;
}

/// An [`Interrupt`] that never fires.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NeverInterrupt;

impl Interrupt for NeverInterrupt {
    #[inline]
    fn check_stop(&self) -> Result<(), ArrayError> {
        Ok(())
    }
}

impl Interrupt for AtomicBool {
    fn check_stop(&self) -> Result<(), ArrayError> {
        if self.load(Ordering::Relaxed) {
            tracing::debug!("array traversal interrupted");
            Err(ArrayError::Interrupted)
        } else {
            Ok(())
        }
    }
}
