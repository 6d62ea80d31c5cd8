//! Monitor screen
//!
//! Static labels are drawn once at start-up. Each frame afterwards clears
//! only the value region, redraws the three quantities and the indicator
//! bar, then flushes. Callers hold the display lock around a whole frame.

pub mod bar;
pub mod format;
pub mod layout;

pub use bar::{BarConfig, BarSource, ColorBand, ColorLadder, MAX_BANDS};
pub use format::{Label, ValueFormat};
pub use layout::{BarGeometry, LayoutKind, Region, ScreenLayout, StaticText, ValueField};

use crate::measurement::Measurement;
use crate::traits::{DisplayDriver, DisplayError, DisplayExt, Rotation};

/// A layout paired with the bar it shows
#[derive(Debug, Clone, PartialEq)]
pub struct Screen {
    layout: ScreenLayout,
    bar: BarConfig,
}

impl Screen {
    pub fn new(layout: ScreenLayout, bar: BarConfig) -> Self {
        Self { layout, bar }
    }

    pub fn layout(&self) -> &ScreenLayout {
        &self.layout
    }

    pub fn bar(&self) -> &BarConfig {
        &self.bar
    }

    /// Initialize the panel, rotate it and draw the fixed labels
    pub fn bring_up<D: DisplayDriver + ?Sized>(
        &self,
        display: &mut D,
        rotation: Rotation,
    ) -> Result<(), DisplayError> {
        display.init()?;
        display.set_rotation(rotation)?;
        self.draw_static(display)
    }

    /// Clear the panel and draw the labels that never change
    pub fn draw_static<D: DisplayDriver + ?Sized>(&self, display: &mut D) -> Result<(), DisplayError> {
        display.clear(self.layout.background)?;
        for label in self.layout.labels {
            display.text_at(label.x, label.y, label.style, label.text)?;
        }
        display.flush()
    }

    /// Draw one frame for `measurement`
    pub fn render<D: DisplayDriver + ?Sized>(
        &self,
        display: &mut D,
        measurement: &Measurement,
    ) -> Result<(), DisplayError> {
        let values = self.layout.values;
        display.fill_region(values.x, values.y, values.w, values.h, self.layout.background)?;

        let fields = [
            (self.layout.voltage, measurement.voltage),
            (self.layout.resistance, measurement.resistance_ohms),
            (self.layout.current, measurement.current_ma),
        ];
        for (field, value) in fields {
            let text = field.format.render(value)?;
            display.text_at(field.x, field.y, field.style, &text)?;
        }

        self.draw_bar(display, measurement)?;
        display.flush()
    }

    fn draw_bar<D: DisplayDriver + ?Sized>(
        &self,
        display: &mut D,
        measurement: &Measurement,
    ) -> Result<(), DisplayError> {
        let geometry = &self.layout.bar;
        let frame = geometry.frame;
        let area = geometry.fill_area();

        let fraction = self.bar.fill_fraction(self.bar.source.pick(measurement));
        let percent = self.bar.percent(fraction);
        let width = self.bar.fill_width(fraction, area.w);

        display.fill_region(frame.x, frame.y, frame.w, frame.h, self.layout.background)?;
        if width > 0 {
            display.fill_region(area.x, area.y, width, area.h, self.bar.color_for(percent))?;
        }
        display.draw_outline(frame.x, frame.y, frame.w, frame.h, geometry.outline)?;

        if let Some((x, y, style)) = geometry.percent_label {
            let text = format::light_level(percent)?;
            display.text_at(x, y, style, &text)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{DrawOp, RecordingDisplay};
    use crate::traits::Color;

    fn light_screen() -> Screen {
        Screen::new(ScreenLayout::light(), BarConfig::light_level())
    }

    #[test]
    fn test_bring_up_draws_labels_once() {
        let screen = light_screen();
        let mut display = RecordingDisplay::new();
        screen.bring_up(&mut display, Rotation::LandscapeFlipped).unwrap();

        assert_eq!(display.ops[0], DrawOp::Init);
        assert_eq!(display.ops[1], DrawOp::Rotate(Rotation::LandscapeFlipped));
        assert_eq!(display.texts(), ["Monitor LDR", "Voltagem:", "Resistencia:", "Corrente:"]);
        assert_eq!(display.ops.last(), Some(&DrawOp::Flush));
    }

    #[test]
    fn test_render_sequence_light() {
        let screen = light_screen();
        let mut display = RecordingDisplay::new();
        let m = Measurement {
            voltage: 1.65,
            resistance_ohms: 5_050.0,
            current_ma: 0.33,
        };
        screen.render(&mut display, &m).unwrap();

        // Value region cleared first, never the whole panel
        assert_eq!(
            display.ops[0],
            DrawOp::Fill(Region::new(180, 60, 130, 120), Color::BLACK)
        );
        assert_eq!(display.texts(), ["1.65 V", "5.1 k", "0.33 mA", "Luz: 50%"]);
        assert!(display.ops.contains(&DrawOp::Fill(Region::new(10, 190, 300, 30), Color::BLACK)));
        assert!(display.ops.contains(&DrawOp::Fill(Region::new(12, 192, 148, 26), Color::YELLOW)));
        assert!(display.ops.contains(&DrawOp::Outline(Region::new(10, 190, 300, 30), Color::WHITE)));
        assert_eq!(display.ops.last(), Some(&DrawOp::Flush));
        assert_eq!(display.flushes(), 1);
    }

    #[test]
    fn test_bright_light_is_green_and_full() {
        let screen = light_screen();
        let mut display = RecordingDisplay::new();
        let m = Measurement {
            voltage: 0.03,
            resistance_ohms: 90.0,
            current_ma: 0.33,
        };
        screen.render(&mut display, &m).unwrap();
        assert!(display.ops.contains(&DrawOp::Fill(Region::new(12, 192, 296, 26), Color::GREEN)));
        assert!(display.texts().contains(&"Luz: 100%".into()));
    }

    #[test]
    fn test_dark_bar_skips_fill() {
        let screen = light_screen();
        let mut display = RecordingDisplay::new();
        let m = Measurement {
            voltage: 3.0,
            resistance_ohms: 100_000.0,
            current_ma: 0.03,
        };
        screen.render(&mut display, &m).unwrap();
        let bar_fills = display
            .ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Fill(r, _) if r.y == 192))
            .count();
        assert_eq!(bar_fills, 0);
        assert!(display.texts().contains(&"Luz: 0%".into()));
    }

    #[test]
    fn test_render_sequence_voltage() {
        let screen = Screen::new(ScreenLayout::voltage(), BarConfig::voltage_level(3.3));
        let mut display = RecordingDisplay::new();
        let m = Measurement {
            voltage: 1.65,
            resistance_ohms: 10_000.0,
            current_ma: 0.165,
        };
        screen.render(&mut display, &m).unwrap();

        assert_eq!(display.texts(), ["V: 1.65 V", "R: 10000 Ohm", "I: 0.17 mA"]);
        assert!(display.ops.contains(&DrawOp::Fill(Region::new(20, 200, 100, 15), Color::GREEN)));
        assert!(display.ops.contains(&DrawOp::Outline(Region::new(20, 200, 200, 15), Color::WHITE)));
    }

    #[test]
    fn test_display_error_aborts_frame() {
        let screen = light_screen();
        let mut display = RecordingDisplay::failing_after(2);
        let result = screen.render(&mut display, &Measurement::ZERO);
        assert_eq!(result, Err(DisplayError::Bus));
        assert_eq!(display.flushes(), 0);
    }
}
