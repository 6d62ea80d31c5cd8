//! Presentation task
//!
//! Owns the render cadence. With a periodic link it takes the display lock
//! (bounded), copies the latest measurement out of the store (bounded),
//! renders and sleeps. With an arrival-paced link it waits for the next
//! measurement, then takes the display lock and renders. The display lock
//! is held for the whole frame; the data lock never is.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::Duration;

use crate::link::{MeasurementLink, Pacing};
use crate::measurement::Measurement;
use crate::scheduler::{BlockReason, BoundedMutex, Cancelled, TaskControl, Timeout};
use crate::screen::Screen;
use crate::traits::DisplayDriver;

/// Counters kept across frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PresentationStats {
    pub frames: u32,
    /// Display lock not obtained within its bound
    pub display_busy: u32,
    /// Measurement not obtained within its bound
    pub data_busy: u32,
    pub render_errors: u32,
}

/// Cadence and lock bound for the periodic variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RenderTiming {
    pub period: Duration,
    pub display_lock_bound: Duration,
}

pub struct PresentationTask<'a, M: RawMutex, D, L> {
    control: &'a TaskControl<'a, M>,
    display: &'a BoundedMutex<M, D>,
    link: L,
    screen: Screen,
    timing: RenderTiming,
    stats: PresentationStats,
}

impl<'a, M, D, L> PresentationTask<'a, M, D, L>
where
    M: RawMutex,
    D: DisplayDriver,
    L: MeasurementLink,
{
    pub fn new(
        control: &'a TaskControl<'a, M>,
        display: &'a BoundedMutex<M, D>,
        link: L,
        screen: Screen,
        timing: RenderTiming,
    ) -> Self {
        Self {
            control,
            display,
            link,
            screen,
            timing,
            stats: PresentationStats::default(),
        }
    }

    pub fn stats(&self) -> &PresentationStats {
        &self.stats
    }

    /// Loop until cancelled
    pub async fn run(&mut self) -> Cancelled {
        self.control.enter();
        loop {
            if let Err(cancelled) = self.cycle().await {
                self.control.finish();
                info!(
                    "presentation stopped after {} frames ({} skipped)",
                    self.stats.frames,
                    self.stats.display_busy + self.stats.data_busy
                );
                return cancelled;
            }
        }
    }

    pub async fn cycle(&mut self) -> Result<(), Cancelled> {
        match self.link.pacing() {
            Pacing::Periodic => self.periodic_frame().await,
            Pacing::OnArrival => self.arrival_frame().await,
        }
    }

    async fn periodic_frame(&mut self) -> Result<(), Cancelled> {
        let display = self.display;
        let locked = self
            .control
            .suspend(
                BlockReason::Lock,
                display.lock_within(self.timing.display_lock_bound),
            )
            .await?;

        match locked {
            Ok(mut panel) => {
                let obtained = self
                    .control
                    .suspend(self.link.wait_reason(), self.link.obtain())
                    .await?;
                match obtained {
                    Ok(measurement) => self.draw(&mut *panel, &measurement),
                    Err(Timeout) => {
                        self.stats.data_busy = self.stats.data_busy.saturating_add(1);
                        warn!("measurement busy, frame skipped");
                    }
                }
            }
            Err(Timeout) => {
                self.stats.display_busy = self.stats.display_busy.saturating_add(1);
                warn!("display busy, frame skipped");
            }
        }

        self.control.delay(self.timing.period).await
    }

    async fn arrival_frame(&mut self) -> Result<(), Cancelled> {
        let obtained = self
            .control
            .suspend(self.link.wait_reason(), self.link.obtain())
            .await?;
        let measurement = match obtained {
            Ok(measurement) => measurement,
            Err(Timeout) => {
                self.stats.data_busy = self.stats.data_busy.saturating_add(1);
                return Ok(());
            }
        };

        let display = self.display;
        let mut panel = self
            .control
            .suspend(BlockReason::Lock, display.lock())
            .await?;
        self.draw(&mut *panel, &measurement);
        Ok(())
    }

    fn draw(&mut self, panel: &mut D, measurement: &Measurement) {
        match self.screen.render(panel, measurement) {
            Ok(()) => {
                self.stats.frames = self.stats.frames.saturating_add(1);
                trace!("frame {} rendered", self.stats.frames);
            }
            Err(e) => {
                self.stats.render_errors = self.stats.render_errors.saturating_add(1);
                warn!("render failed: {}", e);
            }
        }
    }
}
