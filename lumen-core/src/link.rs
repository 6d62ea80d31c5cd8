//! Producer/consumer link strategies
//!
//! The acquisition and presentation tasks are written once against
//! [`MeasurementLink`]. The store implementation gives periodic,
//! latest-value semantics; the channel implementation delivers every
//! measurement exactly once, in order, and paces the consumer by arrival.

use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::measurement::Measurement;
use crate::scheduler::{BlockReason, BoundedQueue, SendPolicy, Timeout};
use crate::store::MeasurementStore;

/// Default depth of the measurement queue
pub const MEASUREMENT_QUEUE_DEPTH: usize = 10;

/// Fate of one published measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Publish {
    /// Written to the store or enqueued
    Committed,
    /// Discarded (store lock timeout, or queue full under drop-newest)
    Dropped,
    /// Enqueued after evicting the oldest queued measurement
    Replaced,
}

/// How the consumer side is paced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pacing {
    /// Consumer polls on its own period
    Periodic,
    /// Consumer wakes when a measurement arrives
    OnArrival,
}

/// Running totals of publish outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStats {
    pub committed: u32,
    pub dropped: u32,
    pub replaced: u32,
}

impl LinkStats {
    pub fn record(&mut self, outcome: Publish) {
        let counter = match outcome {
            Publish::Committed => &mut self.committed,
            Publish::Dropped => &mut self.dropped,
            Publish::Replaced => &mut self.replaced,
        };
        *counter = counter.saturating_add(1);
    }

    pub fn total(&self) -> u32 {
        self.committed
            .saturating_add(self.dropped)
            .saturating_add(self.replaced)
    }
}

/// Transport between the acquisition and presentation tasks
#[allow(async_fn_in_trait)]
pub trait MeasurementLink {
    /// How the consumer should pace itself
    fn pacing(&self) -> Pacing;

    /// What a task waiting on this link is blocked on
    fn wait_reason(&self) -> BlockReason;

    /// Hand a measurement to the consumer side
    async fn publish(&self, measurement: Measurement) -> Publish;

    /// Obtain a measurement for rendering
    ///
    /// Bounded for the store; the channel waits for the next arrival.
    async fn obtain(&self) -> Result<Measurement, Timeout>;
}

impl<L: MeasurementLink + ?Sized> MeasurementLink for &L {
    fn pacing(&self) -> Pacing {
        (**self).pacing()
    }

    fn wait_reason(&self) -> BlockReason {
        (**self).wait_reason()
    }

    async fn publish(&self, measurement: Measurement) -> Publish {
        (**self).publish(measurement).await
    }

    async fn obtain(&self) -> Result<Measurement, Timeout> {
        (**self).obtain().await
    }
}

impl<M: RawMutex> MeasurementLink for MeasurementStore<M> {
    fn pacing(&self) -> Pacing {
        Pacing::Periodic
    }

    fn wait_reason(&self) -> BlockReason {
        BlockReason::Lock
    }

    async fn publish(&self, measurement: Measurement) -> Publish {
        match self.commit(measurement).await {
            Ok(()) => Publish::Committed,
            Err(Timeout) => Publish::Dropped,
        }
    }

    async fn obtain(&self) -> Result<Measurement, Timeout> {
        self.snapshot().await
    }
}

/// Bounded FIFO of measurements with a producer send policy
pub struct MeasurementChannel<M: RawMutex, const N: usize = MEASUREMENT_QUEUE_DEPTH> {
    queue: BoundedQueue<M, Measurement, N>,
    policy: SendPolicy,
}

impl<M: RawMutex, const N: usize> MeasurementChannel<M, N> {
    pub const fn new(policy: SendPolicy) -> Self {
        Self {
            queue: BoundedQueue::new(),
            policy,
        }
    }

    pub fn policy(&self) -> SendPolicy {
        self.policy
    }

    pub fn queue(&self) -> &BoundedQueue<M, Measurement, N> {
        &self.queue
    }
}

impl<M: RawMutex, const N: usize> MeasurementLink for MeasurementChannel<M, N> {
    fn pacing(&self) -> Pacing {
        Pacing::OnArrival
    }

    fn wait_reason(&self) -> BlockReason {
        BlockReason::Queue
    }

    async fn publish(&self, measurement: Measurement) -> Publish {
        self.queue.offer(measurement, self.policy).await
    }

    async fn obtain(&self) -> Result<Measurement, Timeout> {
        Ok(self.queue.receive().await)
    }
}
