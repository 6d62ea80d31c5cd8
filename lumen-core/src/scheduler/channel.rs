//! Bounded FIFO queue
//!
//! Wraps `embassy_sync::channel::Channel`. Elements move out of the queue on
//! receive, so no element is seen by more than one consumer. What happens
//! when a producer finds the queue full is the producer's [`SendPolicy`].

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::{Channel, TrySendError};
use embassy_time::{with_timeout, Duration};

use super::sync::Timeout;
use crate::link::Publish;

/// What a producer does when the queue is full
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SendPolicy {
    /// Wait for space however long it takes
    Block,
    /// Wait up to `wait` for space, then discard the new element
    DropNewest { wait: Duration },
    /// Wait up to `wait` for space, then evict the oldest element
    DropOldest { wait: Duration },
}

impl SendPolicy {
    /// Bound used by the bounded variants when none is configured
    pub const DEFAULT_WAIT: Duration = Duration::from_millis(100);
}

impl Default for SendPolicy {
    fn default() -> Self {
        SendPolicy::DropOldest {
            wait: Self::DEFAULT_WAIT,
        }
    }
}

/// Fixed-capacity FIFO shared between tasks
pub struct BoundedQueue<M: RawMutex, T, const N: usize> {
    inner: Channel<M, T, N>,
}

impl<M: RawMutex, T, const N: usize> BoundedQueue<M, T, N> {
    pub const fn new() -> Self {
        Self {
            inner: Channel::new(),
        }
    }

    /// Enqueue, waiting for space however long it takes
    pub async fn send(&self, value: T) {
        self.inner.send(value).await
    }

    /// Enqueue only if there is space right now; hands the value back if not
    pub fn try_send(&self, value: T) -> Result<(), T> {
        self.inner.try_send(value).map_err(|e| match e {
            TrySendError::Full(v) => v,
        })
    }

    /// Dequeue the oldest element, waiting however long it takes
    pub async fn receive(&self) -> T {
        self.inner.receive().await
    }

    /// Dequeue the oldest element, or fail once `bound` has elapsed
    pub async fn receive_within(&self, bound: Duration) -> Result<T, Timeout> {
        with_timeout(bound, self.inner.receive())
            .await
            .map_err(|_| Timeout)
    }

    pub fn try_receive(&self) -> Option<T> {
        self.inner.try_receive().ok()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.inner.is_full()
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<M: RawMutex, T: Clone, const N: usize> BoundedQueue<M, T, N> {
    /// Enqueue under `policy` and report what happened to the element
    pub async fn offer(&self, value: T, policy: SendPolicy) -> Publish {
        let value = match self.try_send(value) {
            Ok(()) => return Publish::Committed,
            Err(value) => value,
        };

        let wait = match policy {
            SendPolicy::Block => {
                self.send(value).await;
                return Publish::Committed;
            }
            SendPolicy::DropNewest { wait } | SendPolicy::DropOldest { wait } => wait,
        };

        if with_timeout(wait, self.send(value.clone())).await.is_ok() {
            return Publish::Committed;
        }

        match policy {
            SendPolicy::DropOldest { .. } => {
                // The consumer may have drained a slot meanwhile
                let evicted = self.try_receive().is_some();
                match self.try_send(value) {
                    Ok(()) if evicted => Publish::Replaced,
                    Ok(()) => Publish::Committed,
                    Err(_) => Publish::Dropped,
                }
            }
            _ => Publish::Dropped,
        }
    }
}

impl<M: RawMutex, T, const N: usize> Default for BoundedQueue<M, T, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use embassy_futures::join::join;
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
    use embassy_time::{Instant, Timer};
    use proptest::prelude::*;

    type Queue<const N: usize> = BoundedQueue<CriticalSectionRawMutex, u32, N>;

    const SHORT: Duration = Duration::from_millis(10);

    #[test]
    fn test_capacity_and_occupancy() {
        let queue: Queue<10> = BoundedQueue::new();
        assert_eq!(queue.capacity(), 10);
        assert!(queue.is_empty());

        for i in 0..10 {
            assert_eq!(queue.try_send(i), Ok(()));
        }
        assert!(queue.is_full());
        assert_eq!(queue.try_send(99), Err(99));
        assert_eq!(queue.len(), 10);
    }

    #[test]
    fn test_drop_newest_keeps_queue_contents() {
        let queue: Queue<2> = BoundedQueue::new();
        let policy = SendPolicy::DropNewest { wait: SHORT };
        block_on(async {
            assert_eq!(queue.offer(1, policy).await, Publish::Committed);
            assert_eq!(queue.offer(2, policy).await, Publish::Committed);
            assert_eq!(queue.offer(3, policy).await, Publish::Dropped);
        });
        assert_eq!(queue.try_receive(), Some(1));
        assert_eq!(queue.try_receive(), Some(2));
        assert_eq!(queue.try_receive(), None);
    }

    #[test]
    fn test_drop_oldest_evicts_head() {
        let queue: Queue<2> = BoundedQueue::new();
        let policy = SendPolicy::DropOldest { wait: SHORT };
        block_on(async {
            assert_eq!(queue.offer(1, policy).await, Publish::Committed);
            assert_eq!(queue.offer(2, policy).await, Publish::Committed);
            assert_eq!(queue.offer(3, policy).await, Publish::Replaced);
        });
        assert_eq!(queue.try_receive(), Some(2));
        assert_eq!(queue.try_receive(), Some(3));
    }

    #[test]
    fn test_bounded_wait_respects_bound() {
        let queue: Queue<1> = BoundedQueue::new();
        queue.try_send(0).unwrap();

        let start = Instant::now();
        let outcome = block_on(queue.offer(1, SendPolicy::DropNewest { wait: SHORT }));
        assert_eq!(outcome, Publish::Dropped);
        assert!(start.elapsed() >= SHORT);
    }

    #[test]
    fn test_block_waits_for_consumer() {
        let queue: Queue<1> = BoundedQueue::new();
        queue.try_send(0).unwrap();

        let producer = queue.offer(1, SendPolicy::Block);
        let consumer = async {
            Timer::after_millis(20).await;
            let first = queue.receive().await;
            let second = queue.receive().await;
            (first, second)
        };

        let (outcome, received) = block_on(join(producer, consumer));
        assert_eq!(outcome, Publish::Committed);
        assert_eq!(received, (0, 1));
    }

    #[test]
    fn test_receive_within_times_out_when_empty() {
        let queue: Queue<4> = BoundedQueue::new();
        assert_eq!(block_on(queue.receive_within(SHORT)), Err(Timeout));
    }

    proptest! {
        #[test]
        fn fifo_order_preserved(values in proptest::collection::vec(any::<u32>(), 0..=10)) {
            let queue: Queue<10> = BoundedQueue::new();
            block_on(async {
                for v in &values {
                    queue.send(*v).await;
                }
            });
            let mut received = std::vec::Vec::new();
            while let Some(v) = queue.try_receive() {
                received.push(v);
            }
            prop_assert_eq!(received, values);
        }
    }
}
