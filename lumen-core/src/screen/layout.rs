//! Screen layouts
//!
//! Pixel positions and styles for the two monitor screens. Coordinates
//! assume a 320x240 landscape panel.

use super::format::ValueFormat;
use crate::traits::{Color, Rotation, TextStyle};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which screen to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LayoutKind {
    /// Labelled values and a light-level bar driven by the LDR resistance
    Light,
    /// Big title, prefixed values and a voltage bar
    #[default]
    Voltage,
}

impl LayoutKind {
    pub fn default_rotation(&self) -> Rotation {
        match self {
            LayoutKind::Light => Rotation::LandscapeFlipped,
            LayoutKind::Voltage => Rotation::Landscape,
        }
    }
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Region {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

impl Region {
    pub const fn new(x: u16, y: u16, w: u16, h: u16) -> Self {
        Self { x, y, w, h }
    }

    /// Shrink by `by` pixels on every side
    pub fn inset(&self, by: u16) -> Region {
        Region {
            x: self.x + by,
            y: self.y + by,
            w: self.w.saturating_sub(2 * by),
            h: self.h.saturating_sub(2 * by),
        }
    }

    pub fn contains(&self, other: &Region) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.x + other.w <= self.x + self.w
            && other.y + other.h <= self.y + self.h
    }
}

/// Fixed text drawn once at start-up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticText {
    pub x: u16,
    pub y: u16,
    pub style: TextStyle,
    pub text: &'static str,
}

/// Position and format of one measured quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueField {
    pub x: u16,
    pub y: u16,
    pub style: TextStyle,
    pub format: ValueFormat,
}

/// Geometry of the indicator bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarGeometry {
    pub frame: Region,
    /// Gap between the outline and the fill
    pub inset: u16,
    pub outline: Color,
    /// Where the `Luz: N%` label goes, if shown
    pub percent_label: Option<(u16, u16, TextStyle)>,
}

impl BarGeometry {
    pub fn fill_area(&self) -> Region {
        self.frame.inset(self.inset)
    }
}

/// Everything needed to draw one screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub kind: LayoutKind,
    pub background: Color,
    pub labels: &'static [StaticText],
    /// Cleared before each frame's values are drawn
    pub values: Region,
    pub voltage: ValueField,
    pub resistance: ValueField,
    pub current: ValueField,
    pub bar: BarGeometry,
}

const LABEL: TextStyle = TextStyle::new(Color::CYAN, 2);

static LIGHT_LABELS: [StaticText; 4] = [
    StaticText {
        x: 50,
        y: 10,
        style: TextStyle::new(Color::WHITE, 2),
        text: "Monitor LDR",
    },
    StaticText {
        x: 10,
        y: 60,
        style: LABEL,
        text: "Voltagem:",
    },
    StaticText {
        x: 10,
        y: 100,
        style: LABEL,
        text: "Resistencia:",
    },
    StaticText {
        x: 10,
        y: 140,
        style: LABEL,
        text: "Corrente:",
    },
];

const TITLE: TextStyle = TextStyle::new(Color::CYAN, 3);

static VOLTAGE_LABELS: [StaticText; 3] = [
    StaticText {
        x: 50,
        y: 20,
        style: TITLE,
        text: "SENSOR",
    },
    StaticText {
        x: 45,
        y: 50,
        style: TITLE,
        text: "MONITOR",
    },
    StaticText {
        x: 20,
        y: 220,
        style: TextStyle::new(Color::WHITE, 1),
        text: "Voltage Level 0-3.3V",
    },
];

impl ScreenLayout {
    pub fn for_kind(kind: LayoutKind) -> Self {
        match kind {
            LayoutKind::Light => Self::light(),
            LayoutKind::Voltage => Self::voltage(),
        }
    }

    /// Labelled values on the right, light bar along the bottom
    pub fn light() -> Self {
        let value = TextStyle::new(Color::YELLOW, 2);
        Self {
            kind: LayoutKind::Light,
            background: Color::BLACK,
            labels: &LIGHT_LABELS,
            values: Region::new(180, 60, 130, 120),
            voltage: ValueField {
                x: 180,
                y: 60,
                style: value,
                format: ValueFormat::Volts,
            },
            resistance: ValueField {
                x: 180,
                y: 100,
                style: value,
                format: ValueFormat::Ohms,
            },
            current: ValueField {
                x: 180,
                y: 140,
                style: value,
                format: ValueFormat::MilliAmps,
            },
            bar: BarGeometry {
                frame: Region::new(10, 190, 300, 30),
                inset: 2,
                outline: Color::WHITE,
                percent_label: Some((130, 195, TextStyle::new(Color::WHITE, 2))),
            },
        }
    }

    /// Title on top, one prefixed value per line, voltage bar below
    pub fn voltage() -> Self {
        Self {
            kind: LayoutKind::Voltage,
            background: Color::BLACK,
            labels: &VOLTAGE_LABELS,
            values: Region::new(20, 100, 280, 120),
            voltage: ValueField {
                x: 20,
                y: 100,
                style: TextStyle::new(Color::GREEN, 2),
                format: ValueFormat::LabeledVolts,
            },
            resistance: ValueField {
                x: 20,
                y: 130,
                style: TextStyle::new(Color::YELLOW, 2),
                format: ValueFormat::LabeledOhms,
            },
            current: ValueField {
                x: 20,
                y: 160,
                style: TextStyle::new(Color::CYAN, 2),
                format: ValueFormat::LabeledMilliAmps,
            },
            bar: BarGeometry {
                frame: Region::new(20, 200, 200, 15),
                inset: 0,
                outline: Color::WHITE,
                percent_label: None,
            },
        }
    }
}
