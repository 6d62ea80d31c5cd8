//! Fatal error halt

use defmt::*;
use embassy_time::{block_for, Duration};

use lumen_core::scheduler::FatalError;

const REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// Stop making progress and keep reporting why
///
/// Busy-waits so it works before and after the executors are running.
pub fn halt(reason: FatalError) -> ! {
    loop {
        error!("Fatal: {:?}", reason);
        block_for(REPORT_INTERVAL);
    }
}
