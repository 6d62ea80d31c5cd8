//! Cooperative cancellation
//!
//! Tasks run forever in production. A [`CancelToken`] lets a harness stop
//! them at their next suspension point: every delay, lock wait and queue
//! wait a task performs is raced against the token.

use core::cell::RefCell;
use core::future::{poll_fn, Future};
use core::task::Poll;

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::waitqueue::MultiWakerRegistration;
use embassy_time::{Duration, Timer};
use portable_atomic::{AtomicBool, Ordering};

/// Tasks that may wait on one token at the same time
pub const MAX_WAITERS: usize = 4;

/// The task was asked to stop while suspended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cancelled;

/// One-shot stop request shared by any number of tasks
pub struct CancelToken<M: RawMutex> {
    requested: AtomicBool,
    waiters: BlockingMutex<M, RefCell<MultiWakerRegistration<MAX_WAITERS>>>,
}

impl<M: RawMutex> CancelToken<M> {
    pub const fn new() -> Self {
        Self {
            requested: AtomicBool::new(false),
            waiters: BlockingMutex::new(RefCell::new(MultiWakerRegistration::new())),
        }
    }

    /// Request a stop and wake every task currently suspended on the token
    pub fn cancel(&self) {
        self.requested.store(true, Ordering::Release);
        self.waiters.lock(|w| w.borrow_mut().wake());
    }

    pub fn is_cancelled(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }

    /// Resolves once [`cancel`](Self::cancel) has been called
    pub async fn cancelled(&self) {
        poll_fn(|cx| {
            if self.is_cancelled() {
                return Poll::Ready(());
            }
            self.waiters.lock(|w| w.borrow_mut().register(cx.waker()));
            // cancel() may have run between the check and the registration
            if self.is_cancelled() {
                Poll::Ready(())
            } else {
                Poll::Pending
            }
        })
        .await
    }

    /// Run `fut` unless the token fires first
    ///
    /// A token that is already cancelled wins without polling `fut`.
    pub async fn guard<F: Future>(&self, fut: F) -> Result<F::Output, Cancelled> {
        if self.is_cancelled() {
            return Err(Cancelled);
        }
        match select(fut, self.cancelled()).await {
            Either::First(output) => Ok(output),
            Either::Second(()) => Err(Cancelled),
        }
    }

    /// Sleep for at least `duration`, cut short by cancellation
    pub async fn delay(&self, duration: Duration) -> Result<(), Cancelled> {
        self.guard(Timer::after(duration)).await
    }
}

impl<M: RawMutex> Default for CancelToken<M> {
    fn default() -> Self {
        Self::new()
    }
}
