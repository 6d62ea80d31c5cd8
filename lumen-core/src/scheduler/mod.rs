//! Runtime primitives
//!
//! Everything a task needs from the scheduler: lifecycle tracking, the task
//! registry, timed delay, a mutex with bounded wait, a bounded FIFO queue and
//! cooperative cancellation. Executors themselves are board specific and
//! live in the firmware crate.

pub mod cancel;
pub mod channel;
pub mod registry;
pub mod sync;
pub mod task;

pub use cancel::{CancelToken, Cancelled};
pub use channel::{BoundedQueue, SendPolicy};
pub use registry::{FatalError, InitError, Scheduler, StartedScheduler, TaskId, MAX_TASKS, MIN_STACK_BYTES};
pub use sync::{BoundedMutex, Timeout};
pub use task::{BlockReason, Priority, TaskControl, TaskEvent, TaskSpec, TaskState};
