//! Recording fakes shared by the unit tests

use std::string::String;
use std::vec::Vec;

use crate::screen::Region;
use crate::traits::{Color, DisplayDriver, DisplayError, Rotation, TextStyle, TouchInput, TouchPoint};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Init,
    Rotate(Rotation),
    Fill(Region, Color),
    Outline(Region, Color),
    Text {
        x: u16,
        y: u16,
        style: TextStyle,
        text: String,
    },
    Flush,
}

/// Display that records every call
pub struct RecordingDisplay {
    pub ops: Vec<DrawOp>,
    cursor: (u16, u16),
    style: TextStyle,
    fail_after: Option<usize>,
    fallible_calls: usize,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            cursor: (0, 0),
            style: TextStyle::new(Color::WHITE, 1),
            fail_after: None,
            fallible_calls: 0,
        }
    }

    /// Succeed `n` fallible calls, then fail every one after
    pub fn failing_after(n: usize) -> Self {
        Self {
            fail_after: Some(n),
            ..Self::new()
        }
    }

    pub fn texts(&self) -> Vec<String> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn flushes(&self) -> usize {
        self.ops.iter().filter(|op| **op == DrawOp::Flush).count()
    }

    fn step(&mut self) -> Result<(), DisplayError> {
        self.fallible_calls += 1;
        match self.fail_after {
            Some(n) if self.fallible_calls > n => Err(DisplayError::Bus),
            _ => Ok(()),
        }
    }
}

impl DisplayDriver for RecordingDisplay {
    fn init(&mut self) -> Result<(), DisplayError> {
        self.step()?;
        self.ops.push(DrawOp::Init);
        Ok(())
    }

    fn set_rotation(&mut self, rotation: Rotation) -> Result<(), DisplayError> {
        self.step()?;
        self.ops.push(DrawOp::Rotate(rotation));
        Ok(())
    }

    fn size(&self) -> (u16, u16) {
        (320, 240)
    }

    fn fill_region(&mut self, x: u16, y: u16, w: u16, h: u16, color: Color) -> Result<(), DisplayError> {
        self.step()?;
        self.ops.push(DrawOp::Fill(Region::new(x, y, w, h), color));
        Ok(())
    }

    fn draw_outline(&mut self, x: u16, y: u16, w: u16, h: u16, color: Color) -> Result<(), DisplayError> {
        self.step()?;
        self.ops.push(DrawOp::Outline(Region::new(x, y, w, h), color));
        Ok(())
    }

    fn set_cursor(&mut self, x: u16, y: u16) {
        self.cursor = (x, y);
    }

    fn set_text(&mut self, style: TextStyle) {
        self.style = style;
    }

    fn write_text(&mut self, text: &str) -> Result<(), DisplayError> {
        self.step()?;
        self.ops.push(DrawOp::Text {
            x: self.cursor.0,
            y: self.cursor.1,
            style: self.style,
            text: text.into(),
        });
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        self.step()?;
        self.ops.push(DrawOp::Flush);
        Ok(())
    }
}

/// Touch panel that replays a fixed script, then reports no touch
pub struct ScriptedTouch {
    points: Vec<Option<TouchPoint>>,
    next: usize,
}

impl ScriptedTouch {
    pub fn new(points: &[Option<TouchPoint>]) -> Self {
        Self {
            points: points.to_vec(),
            next: 0,
        }
    }
}

impl TouchInput for ScriptedTouch {
    fn poll(&mut self) -> Option<TouchPoint> {
        let point = self.points.get(self.next).copied().flatten();
        self.next += 1;
        point
    }
}
