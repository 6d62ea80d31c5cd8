//! Light sensor acquisition task

use defmt::*;
use embassy_time::Duration;

use lumen_core::scheduler::{Cancelled, TaskControl};
use lumen_core::tasks::AcquisitionTask;
use lumen_drivers::sensor::LdrSensor;

use crate::board::RpAnalogInput;
use crate::link::SelectedLink;
use crate::Cs;

#[embassy_executor::task]
pub async fn acquisition_task(
    control: &'static TaskControl<'static, Cs>,
    sensor: LdrSensor<RpAnalogInput>,
    link: SelectedLink,
    period: Duration,
) {
    info!("Acquisition task started ({} ms period)", period.as_millis());

    let mut task = AcquisitionTask::new(control, sensor, link, period);
    let Cancelled = task.run().await;

    // Nothing fires CANCEL, so getting here is a fault
    warn!("Acquisition task stopped: {:?}", task.stats());
    control.terminated();
}
