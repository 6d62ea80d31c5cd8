//! Acquisition task
//!
//! Samples the sensor, hands the measurement to the link, then sleeps for
//! its period. A sensor error or a dropped publish only costs that cycle.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::Duration;

use crate::link::{LinkStats, MeasurementLink, Publish};
use crate::scheduler::{Cancelled, TaskControl};
use crate::traits::MeasurementSensor;

/// Counters kept across cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AcquisitionStats {
    pub cycles: u32,
    pub sensor_errors: u32,
    pub link: LinkStats,
}

pub struct AcquisitionTask<'a, M: RawMutex, S, L> {
    control: &'a TaskControl<'a, M>,
    sensor: S,
    link: L,
    period: Duration,
    stats: AcquisitionStats,
}

impl<'a, M, S, L> AcquisitionTask<'a, M, S, L>
where
    M: RawMutex,
    S: MeasurementSensor,
    L: MeasurementLink,
{
    pub fn new(control: &'a TaskControl<'a, M>, sensor: S, link: L, period: Duration) -> Self {
        Self {
            control,
            sensor,
            link,
            period,
            stats: AcquisitionStats::default(),
        }
    }

    pub fn stats(&self) -> &AcquisitionStats {
        &self.stats
    }

    /// Loop until cancelled
    pub async fn run(&mut self) -> Cancelled {
        self.control.enter();
        loop {
            if let Err(cancelled) = self.cycle().await {
                self.control.finish();
                info!(
                    "acquisition stopped after {} cycles ({} committed, {} dropped)",
                    self.stats.cycles,
                    self.stats.link.committed,
                    self.stats.link.dropped
                );
                return cancelled;
            }
        }
    }

    /// One sample, publish and delay
    pub async fn cycle(&mut self) -> Result<(), Cancelled> {
        match self.sensor.read().await {
            Ok(measurement) => {
                debug!(
                    "V:{}V R:{}ohm I:{}mA",
                    measurement.voltage,
                    measurement.resistance_ohms,
                    measurement.current_ma
                );

                let outcome = self
                    .control
                    .suspend(self.link.wait_reason(), self.link.publish(measurement))
                    .await?;
                self.stats.link.record(outcome);

                match outcome {
                    Publish::Committed => {}
                    Publish::Dropped => warn!("measurement dropped, link busy"),
                    Publish::Replaced => trace!("queue full, oldest measurement replaced"),
                }
            }
            Err(e) => {
                self.stats.sensor_errors = self.stats.sensor_errors.saturating_add(1);
                warn!("sensor read failed: {}", e);
            }
        }

        self.stats.cycles = self.stats.cycles.saturating_add(1);
        self.control.delay(self.period).await
    }
}
