//! Task registry
//!
//! The scheduler is built in two phases. While `Configured`, tasks are
//! registered and checked against the table size and the execution budget.
//! `start` admits every task and hands back the started set; from then on
//! the executors own the tasks and never return.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::{Duration, Timer};
use heapless::Vec;

use super::task::{Priority, TaskControl, TaskSpec};

/// Maximum number of tasks one scheduler can hold
pub const MAX_TASKS: usize = 8;

/// Smallest execution budget a task may declare (bytes)
pub const MIN_STACK_BYTES: usize = 512;

/// Initialization failures; all of them are fatal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitError {
    /// Scheduler started with no tasks registered
    NoTasks,
    /// More than `MAX_TASKS` tasks registered
    TaskTableFull,
    /// Two tasks share a name
    DuplicateTask(&'static str),
    /// Task declared a budget below `MIN_STACK_BYTES`
    StackTooSmall(&'static str),
    /// Task budgets exceed what the scheduler was given
    StackBudgetExceeded { requested: usize, available: usize },
    /// A synchronization primitive could not be created
    Primitive(&'static str),
    /// A peripheral failed to come up
    Device(&'static str),
    /// The executor refused to spawn a task
    Spawn(&'static str),
}

/// Conditions the firmware cannot continue from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FatalError {
    /// Bring-up failed
    Init(InitError),
    /// A task body returned
    TaskExited(&'static str),
}

impl From<InitError> for FatalError {
    fn from(e: InitError) -> Self {
        FatalError::Init(e)
    }
}

/// Handle to a registered task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TaskId(pub u8);

/// Scheduler in the `Configured` phase
pub struct Scheduler<'a, M: RawMutex> {
    tasks: Vec<&'a TaskControl<'a, M>, MAX_TASKS>,
    stack_budget: usize,
    committed: usize,
}

impl<'a, M: RawMutex> Scheduler<'a, M> {
    /// Create a scheduler that may hand out `stack_budget` bytes in total
    pub fn new(stack_budget: usize) -> Self {
        Self {
            tasks: Vec::new(),
            stack_budget,
            committed: 0,
        }
    }

    /// Register a task
    pub fn register(&mut self, task: &'a TaskControl<'a, M>) -> Result<TaskId, InitError> {
        let spec = task.spec();

        if self.tasks.iter().any(|t| t.name() == spec.name) {
            return Err(InitError::DuplicateTask(spec.name));
        }
        if spec.stack_bytes < MIN_STACK_BYTES {
            return Err(InitError::StackTooSmall(spec.name));
        }
        let requested = self
            .committed
            .checked_add(spec.stack_bytes)
            .filter(|&requested| requested <= self.stack_budget)
            .ok_or(InitError::StackBudgetExceeded {
                requested: self.committed.saturating_add(spec.stack_bytes),
                available: self.stack_budget,
            })?;

        let id = TaskId(self.tasks.len() as u8);
        self.tasks
            .push(task)
            .map_err(|_| InitError::TaskTableFull)?;
        self.committed = requested;

        info!(
            "registered {} (priority {}, budget {} bytes)",
            spec.name,
            spec.priority.as_str(),
            spec.stack_bytes
        );
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Budget still available for further tasks
    pub fn remaining_budget(&self) -> usize {
        self.stack_budget - self.committed
    }

    /// Admit every registered task and move to the `Started` phase
    pub fn start(self) -> Result<StartedScheduler<'a, M>, InitError> {
        if self.tasks.is_empty() {
            return Err(InitError::NoTasks);
        }
        for task in &self.tasks {
            task.admit();
        }
        info!(
            "scheduler started with {} tasks, {} bytes committed",
            self.tasks.len(),
            self.committed
        );
        Ok(StartedScheduler { tasks: self.tasks })
    }
}

/// Scheduler in the `Started` phase
pub struct StartedScheduler<'a, M: RawMutex> {
    tasks: Vec<&'a TaskControl<'a, M>, MAX_TASKS>,
}

impl<'a, M: RawMutex> StartedScheduler<'a, M> {
    pub fn task(&self, id: TaskId) -> Option<&'a TaskControl<'a, M>> {
        self.tasks.get(id.0 as usize).copied()
    }

    pub fn spec(&self, id: TaskId) -> Option<TaskSpec> {
        self.task(id).map(|t| *t.spec())
    }

    /// Tasks that run in the given band
    pub fn band(&self, priority: Priority) -> impl Iterator<Item = &'a TaskControl<'a, M>> + '_ {
        self.tasks
            .iter()
            .copied()
            .filter(move |t| t.spec().priority == priority)
    }

    /// First task recorded as terminated, if any
    pub fn terminated(&self) -> Option<&'a TaskControl<'a, M>> {
        self.tasks.iter().copied().find(|t| t.state().is_fatal())
    }

    /// Wait until some task is recorded as terminated, checking every `period`
    pub async fn first_terminated(&self, period: Duration) -> FatalError {
        loop {
            if let Some(task) = self.terminated() {
                error!("{} task terminated", task.name());
                return FatalError::TaskExited(task.name());
            }
            Timer::after(period).await;
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
