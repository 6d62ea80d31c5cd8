//! Task bodies
//!
//! Board-agnostic loops driven by a [`TaskControl`](crate::scheduler::TaskControl).
//! The firmware wraps each one in an executor task; tests drive them with
//! fakes and stop them through the cancellation token.

pub mod acquisition;
pub mod presentation;
pub mod touch_demo;

pub use acquisition::{AcquisitionStats, AcquisitionTask};
pub use presentation::{PresentationStats, PresentationTask, RenderTiming};
pub use touch_demo::{TouchDemoTask, TOUCH_FRAME_PERIOD, TOUCH_MIRROR_WIDTH};
