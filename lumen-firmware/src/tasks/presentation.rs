//! Display presentation task

use defmt::*;

use lumen_core::scheduler::{BoundedMutex, Cancelled, TaskControl};
use lumen_core::screen::Screen;
use lumen_core::tasks::{PresentationTask, RenderTiming};

use crate::board::MonitorDisplay;
use crate::link::SelectedLink;
use crate::Cs;

#[embassy_executor::task]
pub async fn presentation_task(
    control: &'static TaskControl<'static, Cs>,
    display: &'static BoundedMutex<Cs, MonitorDisplay>,
    link: SelectedLink,
    screen: Screen,
    timing: RenderTiming,
) {
    info!("Presentation task started");

    let mut task = PresentationTask::new(control, display, link, screen, timing);
    let Cancelled = task.run().await;

    // Nothing fires CANCEL, so getting here is a fault
    warn!("Presentation task stopped: {:?}", task.stats());
    control.terminated();
}
