//! Touch demo task
//!
//! Single-task variant: every frame clears the panel, prints a title and
//! either the touch position (X mirrored) or "Sem toque", then flushes.
//!
//! The controller reports X across the panel's native 240-pixel axis, so
//! the mirror uses that width whatever rotation the panel is drawn in.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::Duration;

use crate::scheduler::{BlockReason, BoundedMutex, Cancelled, TaskControl};
use crate::screen::format;
use crate::traits::{Color, DisplayDriver, DisplayError, TextStyle, TouchInput};

/// Frame period of the demo
pub const TOUCH_FRAME_PERIOD: Duration = Duration::from_millis(1);

/// Width of the touch controller's X axis
pub const TOUCH_MIRROR_WIDTH: u16 = 240;

const TEXT: TextStyle = TextStyle::new(Color::WHITE, 1);

pub struct TouchDemoTask<'a, M: RawMutex, D, T> {
    control: &'a TaskControl<'a, M>,
    display: &'a BoundedMutex<M, D>,
    touch: T,
    period: Duration,
    mirror_width: u16,
    frames: u32,
}

impl<'a, M, D, T> TouchDemoTask<'a, M, D, T>
where
    M: RawMutex,
    D: DisplayDriver,
    T: TouchInput,
{
    pub fn new(control: &'a TaskControl<'a, M>, display: &'a BoundedMutex<M, D>, touch: T) -> Self {
        Self {
            control,
            display,
            touch,
            period: TOUCH_FRAME_PERIOD,
            mirror_width: TOUCH_MIRROR_WIDTH,
            frames: 0,
        }
    }

    /// Mirror X against a controller of a different width
    pub fn with_mirror_width(mut self, width: u16) -> Self {
        self.mirror_width = width;
        self
    }

    pub fn frames(&self) -> u32 {
        self.frames
    }

    pub async fn run(&mut self) -> Cancelled {
        self.control.enter();
        loop {
            if let Err(cancelled) = self.cycle().await {
                self.control.finish();
                return cancelled;
            }
        }
    }

    pub async fn cycle(&mut self) -> Result<(), Cancelled> {
        let display = self.display;
        let mut panel = self
            .control
            .suspend(BlockReason::Lock, display.lock())
            .await?;
        match self.draw_frame(&mut *panel) {
            Ok(()) => self.frames = self.frames.saturating_add(1),
            Err(e) => warn!("touch frame failed: {}", e),
        }
        drop(panel);

        self.control.delay(self.period).await
    }

    fn draw_frame(&mut self, panel: &mut D) -> Result<(), DisplayError> {
        panel.clear(Color::BLACK)?;
        panel.set_cursor(0, 10);
        panel.set_text(TEXT);
        panel.write_text("Touch Demo\n")?;

        match self.touch.poll() {
            Some(point) => {
                let x = self.mirror_width.saturating_sub(point.x);
                let mut line = format::touch_position(x, point.y)?;
                line.push('\n').map_err(|_| DisplayError::BufferOverflow)?;
                panel.write_text(&line)?;
            }
            None => panel.write_text("Sem toque\n")?,
        }

        panel.flush()
    }
}
