//! Task lifecycle
//!
//! Each task's state is a function of its previous state and a lifecycle
//! event. `Terminated` is recorded by whoever owns a task body when that
//! body returns and nothing expected it to; the supervisor treats it as
//! fatal.

use core::cell::Cell;
use core::future::Future;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_time::{Duration, Timer};

use super::cancel::{CancelToken, Cancelled};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Scheduling band
///
/// Tasks in the same band are cooperative with each other; a higher band
/// preempts a lower one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Priority {
    Low,
    Normal,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Normal => "normal",
            Priority::High => "high",
        }
    }
}

/// Static description of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TaskSpec {
    /// Name used in logs
    pub name: &'static str,
    /// Scheduling band
    pub priority: Priority,
    /// Execution budget reserved for the task (bytes)
    pub stack_bytes: usize,
}

impl TaskSpec {
    pub const fn new(name: &'static str, priority: Priority, stack_bytes: usize) -> Self {
        Self {
            name,
            priority,
            stack_bytes,
        }
    }
}

/// What a blocked task is waiting on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BlockReason {
    /// Timed delay
    Delay,
    /// Mutex acquisition
    Lock,
    /// Queue send or receive
    Queue,
}

/// Task states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TaskState {
    /// Declared but not yet admitted by the scheduler
    Created,
    /// Admitted, waiting to be dispatched
    Ready,
    /// Executing its body
    Running,
    /// Suspended at a delay, lock or queue
    Blocked(BlockReason),
    /// Stop requested, unwinding out of the body
    Stopping,
    /// Stopped on request
    Cancelled,
    /// Body returned when its owner did not expect it (fatal)
    Terminated,
}

/// Events that drive task state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TaskEvent {
    /// Scheduler started with this task registered
    Admit,
    /// Task got the core
    Dispatch,
    /// Task suspended
    Block(BlockReason),
    /// Suspension ended (deadline passed, lock acquired, queue ready)
    Wake,
    /// Cancellation observed at a suspension point
    CancelRequested,
    /// Body left its loop after a stop request
    Finish,
    /// Body returned and its owner treats that as a fault
    Return,
}

impl TaskState {
    /// Process an event and return the next state
    pub fn transition(self, event: TaskEvent) -> Self {
        use TaskEvent::*;
        use TaskState::*;

        match (self, event) {
            (Created, Admit) => Ready,

            (Ready, Dispatch) => Running,
            (Running, Block(reason)) => Blocked(reason),
            (Blocked(_), Wake) => Ready,

            (Ready | Running | Blocked(_), CancelRequested) => Stopping,
            (Stopping, Finish) => Cancelled,

            (Ready | Running | Blocked(_) | Stopping | Cancelled, Return) => Terminated,

            // Default: stay in current state
            _ => self,
        }
    }

    /// Task has been admitted and has not stopped
    pub fn is_live(&self) -> bool {
        matches!(
            self,
            TaskState::Ready | TaskState::Running | TaskState::Blocked(_)
        )
    }

    /// Body returned when it should not have
    pub fn is_fatal(&self) -> bool {
        matches!(self, TaskState::Terminated)
    }
}

/// Runtime handle a task body drives its own lifecycle through
///
/// Owns the task's state cell and borrows the shared cancellation token.
/// Every suspension a task performs goes through [`suspend`](Self::suspend),
/// which records the block, races the wait against the token and records
/// the wake-up or the stop request.
pub struct TaskControl<'a, M: RawMutex> {
    spec: TaskSpec,
    state: BlockingMutex<M, Cell<TaskState>>,
    cancel: &'a CancelToken<M>,
}

impl<'a, M: RawMutex> TaskControl<'a, M> {
    pub const fn new(spec: TaskSpec, cancel: &'a CancelToken<M>) -> Self {
        Self {
            spec,
            state: BlockingMutex::new(Cell::new(TaskState::Created)),
            cancel,
        }
    }

    pub fn spec(&self) -> &TaskSpec {
        &self.spec
    }

    pub fn name(&self) -> &'static str {
        self.spec.name
    }

    pub fn state(&self) -> TaskState {
        self.state.lock(|s| s.get())
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    fn apply(&self, event: TaskEvent) -> TaskState {
        self.state.lock(|s| {
            let next = s.get().transition(event);
            s.set(next);
            next
        })
    }

    /// Mark the task as admitted (done by the scheduler on start)
    pub fn admit(&self) -> TaskState {
        self.apply(TaskEvent::Admit)
    }

    /// Called once at the top of the task body
    pub fn enter(&self) -> TaskState {
        let state = self.apply(TaskEvent::Dispatch);
        info!(
            "{} task running (priority {}, budget {} bytes)",
            self.spec.name,
            self.spec.priority.as_str(),
            self.spec.stack_bytes
        );
        state
    }

    /// Suspend on `wait`, giving up if the task is cancelled first
    pub async fn suspend<F: Future>(
        &self,
        reason: BlockReason,
        wait: F,
    ) -> Result<F::Output, Cancelled> {
        self.apply(TaskEvent::Block(reason));
        match self.cancel.guard(wait).await {
            Ok(output) => {
                self.apply(TaskEvent::Wake);
                self.apply(TaskEvent::Dispatch);
                Ok(output)
            }
            Err(cancelled) => {
                self.apply(TaskEvent::CancelRequested);
                Err(cancelled)
            }
        }
    }

    /// Timed delay; suspends for at least `duration`
    pub async fn delay(&self, duration: Duration) -> Result<(), Cancelled> {
        self.suspend(BlockReason::Delay, Timer::after(duration)).await
    }

    /// Record that the body left its loop because of a stop request
    pub fn finish(&self) -> TaskState {
        let state = self.apply(TaskEvent::Finish);
        info!("{} task stopped", self.spec.name);
        state
    }

    /// Record that the body returned and that this is a fault
    pub fn terminated(&self) -> TaskState {
        let state = self.apply(TaskEvent::Return);
        error!("{} task returned unexpectedly", self.spec.name);
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::future::pending;
    use embassy_futures::block_on;
    use embassy_futures::join::join;
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

    const SPEC: TaskSpec = TaskSpec::new("sampler", Priority::Normal, 2048);

    #[test]
    fn test_created_to_running() {
        let state = TaskState::Created;
        let ready = state.transition(TaskEvent::Admit);
        assert_eq!(ready, TaskState::Ready);
        let running = ready.transition(TaskEvent::Dispatch);
        assert_eq!(running, TaskState::Running);
    }

    #[test]
    fn test_block_and_wake_cycle() {
        for reason in [BlockReason::Delay, BlockReason::Lock, BlockReason::Queue] {
            let blocked = TaskState::Running.transition(TaskEvent::Block(reason));
            assert_eq!(blocked, TaskState::Blocked(reason));

            let ready = blocked.transition(TaskEvent::Wake);
            assert_eq!(ready, TaskState::Ready);
        }
    }

    #[test]
    fn test_cancel_from_any_live_state() {
        let states = [
            TaskState::Ready,
            TaskState::Running,
            TaskState::Blocked(BlockReason::Delay),
            TaskState::Blocked(BlockReason::Queue),
        ];

        for state in states {
            let stopping = state.transition(TaskEvent::CancelRequested);
            assert_eq!(stopping, TaskState::Stopping);
            assert_eq!(stopping.transition(TaskEvent::Finish), TaskState::Cancelled);
        }
    }

    #[test]
    fn test_return_is_fatal() {
        let terminated = TaskState::Running.transition(TaskEvent::Return);
        assert_eq!(terminated, TaskState::Terminated);
        assert!(terminated.is_fatal());
        assert!(!terminated.is_live());

        // A stopped body that still returns is a fault to an owner that never stops it
        assert_eq!(
            TaskState::Cancelled.transition(TaskEvent::Return),
            TaskState::Terminated
        );
        assert_eq!(
            TaskState::Created.transition(TaskEvent::Return),
            TaskState::Created
        );
    }

    #[test]
    fn test_not_admitted_ignores_dispatch() {
        assert_eq!(
            TaskState::Created.transition(TaskEvent::Dispatch),
            TaskState::Created
        );
        assert_eq!(
            TaskState::Cancelled.transition(TaskEvent::Dispatch),
            TaskState::Cancelled
        );
    }

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::High > Priority::Normal);
        assert!(Priority::Normal > Priority::Low);
    }

    #[test]
    fn test_control_records_delay_cycle() {
        let token = CancelToken::<CriticalSectionRawMutex>::new();
        let control = TaskControl::new(SPEC, &token);

        assert_eq!(control.state(), TaskState::Created);
        control.admit();
        control.enter();
        assert_eq!(control.state(), TaskState::Running);

        block_on(control.delay(Duration::from_millis(5))).unwrap();
        assert_eq!(control.state(), TaskState::Running);
    }

    #[test]
    fn test_control_stops_while_blocked() {
        let token = CancelToken::<CriticalSectionRawMutex>::new();
        let control = TaskControl::new(SPEC, &token);
        control.admit();
        control.enter();

        let body = async {
            let result = control.suspend(BlockReason::Queue, pending::<()>()).await;
            assert_eq!(result, Err(Cancelled));
            assert_eq!(control.state(), TaskState::Stopping);
            control.finish()
        };
        let observer = async {
            Timer::after_millis(10).await;
            assert_eq!(control.state(), TaskState::Blocked(BlockReason::Queue));
            token.cancel();
        };

        let (state, ()) = block_on(join(body, observer));
        assert_eq!(state, TaskState::Cancelled);
    }
}
