//! Embassy task entry points
//!
//! Thin wrappers binding the core task bodies to the board's concrete types.

pub mod acquisition;
pub mod presentation;
pub mod supervisor;

pub use acquisition::acquisition_task;
pub use presentation::presentation_task;
pub use supervisor::supervisor_task;
