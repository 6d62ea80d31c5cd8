//! Shared measurement store
//!
//! A single-slot register holding the most recent measurement. The slot is
//! only reachable through a guard obtained with a bounded wait, so a reader
//! sees either the initial zeroed value or a complete committed measurement.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::MutexGuard;
use embassy_time::Duration;

use crate::measurement::Measurement;
use crate::scheduler::{BoundedMutex, Timeout};

/// Exclusive access to the store's slot; released on drop
pub type StoreGuard<'a, M> = MutexGuard<'a, M, Measurement>;

/// Last-writer-wins measurement register
pub struct MeasurementStore<M: RawMutex> {
    slot: BoundedMutex<M, Measurement>,
    lock_bound: Duration,
}

impl<M: RawMutex> MeasurementStore<M> {
    /// Lock bound used when none is configured
    pub const DEFAULT_LOCK_BOUND: Duration = Duration::from_millis(100);

    pub const fn new(lock_bound: Duration) -> Self {
        Self {
            slot: BoundedMutex::new(Measurement::ZERO),
            lock_bound,
        }
    }

    pub fn lock_bound(&self) -> Duration {
        self.lock_bound
    }

    /// Acquire the slot within the store's lock bound
    pub async fn access(&self) -> Result<StoreGuard<'_, M>, Timeout> {
        self.slot.lock_within(self.lock_bound).await
    }

    /// Overwrite the slot with `measurement`
    pub async fn commit(&self, measurement: Measurement) -> Result<(), Timeout> {
        let mut slot = self.access().await?;
        *slot = measurement;
        Ok(())
    }

    /// Copy the slot out; the lock is released before this returns
    pub async fn snapshot(&self) -> Result<Measurement, Timeout> {
        let slot = self.access().await?;
        Ok(*slot)
    }

    /// Copy the slot out only if nobody holds it right now
    pub fn try_snapshot(&self) -> Option<Measurement> {
        self.slot.try_lock().map(|slot| *slot)
    }
}

impl<M: RawMutex> Default for MeasurementStore<M> {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LOCK_BOUND)
    }
}
