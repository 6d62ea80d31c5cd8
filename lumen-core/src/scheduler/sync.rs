//! Mutual exclusion with a bounded wait
//!
//! A thin layer over `embassy_sync::mutex::Mutex`. Waiting for the lock
//! suspends the calling task and never spins the core, so other tasks keep
//! running while a contender waits out its bound.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::{Mutex, MutexGuard};
use embassy_time::{with_timeout, Duration};

/// A bounded wait expired before the resource became available
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timeout;

/// Mutex whose acquire can give up after a caller-chosen duration
///
/// The guard releases the lock when dropped, so a holder cannot forget to
/// release it on an early return.
pub struct BoundedMutex<M: RawMutex, T> {
    inner: Mutex<M, T>,
}

impl<M: RawMutex, T> BoundedMutex<M, T> {
    /// Create an unlocked mutex around `value`
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(value),
        }
    }

    /// Wait as long as it takes to acquire the lock
    pub async fn lock(&self) -> MutexGuard<'_, M, T> {
        self.inner.lock().await
    }

    /// Acquire the lock, or fail with [`Timeout`] once `bound` has elapsed
    pub async fn lock_within(&self, bound: Duration) -> Result<MutexGuard<'_, M, T>, Timeout> {
        with_timeout(bound, self.inner.lock())
            .await
            .map_err(|_| Timeout)
    }

    /// Acquire the lock only if it is free right now
    pub fn try_lock(&self) -> Option<MutexGuard<'_, M, T>> {
        self.inner.try_lock().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use embassy_futures::join::join;
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
    use embassy_time::{Instant, Timer};

    #[test]
    fn test_uncontended_lock_within_succeeds() {
        let mutex: BoundedMutex<CriticalSectionRawMutex, u32> = BoundedMutex::new(7);
        block_on(async {
            let mut guard = mutex.lock_within(Duration::from_millis(10)).await.unwrap();
            *guard += 1;
        });
        assert_eq!(*mutex.try_lock().unwrap(), 8);
    }

    #[test]
    fn test_lock_within_times_out_while_held() {
        let mutex: BoundedMutex<CriticalSectionRawMutex, u32> = BoundedMutex::new(0);
        let bound = Duration::from_millis(100);

        let holder = async {
            let guard = mutex.lock().await;
            Timer::after_millis(150).await;
            drop(guard);
        };
        let contender = async {
            let start = Instant::now();
            let result = mutex.lock_within(bound).await.map(|_| ());
            (result, start.elapsed())
        };

        let ((), (result, waited)) = block_on(join(holder, contender));
        assert_eq!(result, Err(Timeout));
        assert!(waited >= bound);

        // Released once the holder is done
        assert!(mutex.try_lock().is_some());
    }

    #[test]
    fn test_try_lock_fails_while_held() {
        let mutex: BoundedMutex<CriticalSectionRawMutex, ()> = BoundedMutex::new(());
        let guard = mutex.try_lock();
        assert!(guard.is_some());
        assert!(mutex.try_lock().is_none());
        drop(guard);
        assert!(mutex.try_lock().is_some());
    }
}
