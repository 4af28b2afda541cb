//! At-most-one-in-flight guard for extraction entry points.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::TxError;

/// Holds the busy flag for the lifetime of one extraction.
pub(crate) struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    /// Take the flag or fail with [`TxError::Busy`].
    pub(crate) fn acquire(flag: &'a AtomicBool) -> Result<Self, TxError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| TxError::Busy)?;
        Ok(Self { flag })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_fails_until_release() {
        let flag = AtomicBool::new(false);

        let guard = BusyGuard::acquire(&flag).unwrap();
        assert!(matches!(BusyGuard::acquire(&flag), Err(TxError::Busy)));

        drop(guard);
        assert!(BusyGuard::acquire(&flag).is_ok());
    }
}
