//! Watches the started tasks and halts once any of them stops

use defmt::*;
use embassy_time::Duration;

use lumen_core::scheduler::StartedScheduler;

use crate::fatal;
use crate::Cs;

const CHECK_INTERVAL: Duration = Duration::from_secs(1);

#[embassy_executor::task]
pub async fn supervisor_task(scheduler: StartedScheduler<'static, Cs>) {
    info!("Supervisor watching {} tasks", scheduler.len());

    let reason = scheduler.first_terminated(CHECK_INTERVAL).await;
    fatal::halt(reason);
}
