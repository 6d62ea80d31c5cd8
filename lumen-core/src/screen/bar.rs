//! Bounded-range indicator bar
//!
//! Maps one quantity of a measurement onto a fill proportion and picks the
//! fill colour from a threshold ladder.

use heapless::Vec;

use crate::measurement::Measurement;
use crate::traits::Color;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum number of threshold bands in a ladder
pub const MAX_BANDS: usize = 4;

/// Quantity that drives the bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BarSource {
    Voltage,
    Resistance,
    Current,
}

impl BarSource {
    pub fn pick(&self, measurement: &Measurement) -> f32 {
        match self {
            BarSource::Voltage => measurement.voltage,
            BarSource::Resistance => measurement.resistance_ohms,
            BarSource::Current => measurement.current_ma,
        }
    }
}

/// Colour used when the fill is strictly above `above_percent`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ColorBand {
    pub above_percent: u8,
    pub color: Color,
}

/// Threshold ladder, highest band first
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ColorLadder {
    pub bands: Vec<ColorBand, MAX_BANDS>,
    pub fallback: Color,
}

impl ColorLadder {
    /// Every fill level gets the same colour
    pub fn solid(color: Color) -> Self {
        Self {
            bands: Vec::new(),
            fallback: color,
        }
    }

    /// Green above 70%, yellow above 30%, red otherwise
    pub fn traffic_light() -> Self {
        let mut bands = Vec::new();
        // Two entries always fit in MAX_BANDS
        let _ = bands.push(ColorBand {
            above_percent: 70,
            color: Color::GREEN,
        });
        let _ = bands.push(ColorBand {
            above_percent: 30,
            color: Color::YELLOW,
        });
        Self {
            bands,
            fallback: Color::RED,
        }
    }

    /// Bands are strictly descending
    pub fn is_ordered(&self) -> bool {
        self.bands
            .windows(2)
            .all(|pair| pair[0].above_percent > pair[1].above_percent)
    }

    pub fn color_for(&self, percent: u8) -> Color {
        self.bands
            .iter()
            .find(|band| percent > band.above_percent)
            .map(|band| band.color)
            .unwrap_or(self.fallback)
    }
}

impl Default for ColorLadder {
    fn default() -> Self {
        Self::traffic_light()
    }
}

/// What the bar shows and how it is coloured
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BarConfig {
    pub source: BarSource,
    /// Value mapped to an empty bar (a full bar when inverted)
    pub lo: f32,
    /// Value mapped to a full bar (an empty bar when inverted)
    pub hi: f32,
    pub inverted: bool,
    pub ladder: ColorLadder,
}

impl BarConfig {
    /// Light level: falls as the LDR resistance rises over 100..10000 Ω
    pub fn light_level() -> Self {
        Self {
            source: BarSource::Resistance,
            lo: 100.0,
            hi: 10_000.0,
            inverted: true,
            ladder: ColorLadder::traffic_light(),
        }
    }

    /// Voltage over `0..supply`, solid green
    pub fn voltage_level(supply_voltage: f32) -> Self {
        Self {
            source: BarSource::Voltage,
            lo: 0.0,
            hi: supply_voltage,
            inverted: false,
            ladder: ColorLadder::solid(Color::GREEN),
        }
    }

    /// clamp((q - lo) / (hi - lo), 0, 1), mirrored when inverted
    pub fn fill_fraction(&self, quantity: f32) -> f32 {
        let span = self.hi - self.lo;
        let raw = if span > 0.0 {
            (quantity - self.lo) / span
        } else {
            0.0
        };
        // NaN compares false both ways and lands on 0
        let clamped = if raw > 1.0 {
            1.0
        } else if raw > 0.0 {
            raw
        } else {
            0.0
        };
        if self.inverted {
            1.0 - clamped
        } else {
            clamped
        }
    }

    /// Fill level as a whole percentage (truncated)
    pub fn percent(&self, fraction: f32) -> u8 {
        (fraction * 100.0) as u8
    }

    /// Fill width in pixels for a bar `inner_width` pixels wide
    pub fn fill_width(&self, fraction: f32, inner_width: u16) -> u16 {
        (fraction * inner_width as f32) as u16
    }

    pub fn color_for(&self, percent: u8) -> Color {
        self.ladder.color_for(percent)
    }
}

impl Default for BarConfig {
    fn default() -> Self {
        Self::voltage_level(3.3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_ladder_bands() {
        let ladder = ColorLadder::traffic_light();
        assert!(ladder.is_ordered());
        assert_eq!(ladder.color_for(100), Color::GREEN);
        assert_eq!(ladder.color_for(71), Color::GREEN);
        assert_eq!(ladder.color_for(70), Color::YELLOW);
        assert_eq!(ladder.color_for(31), Color::YELLOW);
        assert_eq!(ladder.color_for(30), Color::RED);
        assert_eq!(ladder.color_for(0), Color::RED);
    }

    #[test]
    fn test_solid_ladder() {
        let ladder = ColorLadder::solid(Color::GREEN);
        assert!(ladder.is_ordered());
        assert_eq!(ladder.color_for(0), Color::GREEN);
        assert_eq!(ladder.color_for(100), Color::GREEN);
    }

    #[test]
    fn test_light_level_inverted() {
        let bar = BarConfig::light_level();
        assert_eq!(bar.fill_fraction(100.0), 1.0);
        assert_eq!(bar.fill_fraction(10_000.0), 0.0);
        // Rails report zero resistance, which reads as full light
        assert_eq!(bar.fill_fraction(0.0), 1.0);
        assert_eq!(bar.fill_fraction(50_000.0), 0.0);

        let mid = bar.fill_fraction(5_050.0);
        assert!((mid - 0.5).abs() < 1e-6);
        assert_eq!(bar.percent(mid), 50);
        assert_eq!(bar.fill_width(mid, 296), 148);
    }

    #[test]
    fn test_voltage_level() {
        let bar = BarConfig::voltage_level(3.3);
        assert_eq!(bar.fill_fraction(0.0), 0.0);
        assert_eq!(bar.fill_fraction(3.3), 1.0);
        assert_eq!(bar.fill_width(1.0, 200), 200);
        assert_eq!(bar.color_for(12), Color::GREEN);
    }

    #[test]
    fn test_degenerate_range_is_empty() {
        let bar = BarConfig {
            lo: 5.0,
            hi: 5.0,
            ..BarConfig::voltage_level(3.3)
        };
        assert_eq!(bar.fill_fraction(7.0), 0.0);
        assert_eq!(bar.fill_fraction(f32::NAN), 0.0);
    }

    #[test]
    fn test_source_pick() {
        let m = Measurement {
            voltage: 1.0,
            resistance_ohms: 2.0,
            current_ma: 3.0,
        };
        assert_eq!(BarSource::Voltage.pick(&m), 1.0);
        assert_eq!(BarSource::Resistance.pick(&m), 2.0);
        assert_eq!(BarSource::Current.pick(&m), 3.0);
    }

    proptest! {
        #[test]
        fn fraction_stays_in_unit_range(q in -1.0e6f32..1.0e6, inverted: bool) {
            let bar = BarConfig { inverted, ..BarConfig::light_level() };
            let f = bar.fill_fraction(q);
            prop_assert!((0.0..=1.0).contains(&f));
            prop_assert!(bar.percent(f) <= 100);
            prop_assert!(bar.fill_width(f, 296) <= 296);
        }
    }
}
