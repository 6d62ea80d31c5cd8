//! Display driver trait for the TFT panel
//!
//! Narrow drawing surface the presentation code renders through. Controller
//! register programming, bus setup and glyph rasterization stay behind it.

/// RGB565 colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color(pub u16);

impl Color {
    pub const BLACK: Color = Color(0x0000);
    pub const BLUE: Color = Color(0x001F);
    pub const RED: Color = Color(0xF800);
    pub const GREEN: Color = Color(0x07E0);
    pub const CYAN: Color = Color(0x07FF);
    pub const MAGENTA: Color = Color(0xF81F);
    pub const YELLOW: Color = Color(0xFFE0);
    pub const WHITE: Color = Color(0xFFFF);

    /// Look up a colour by its lowercase name
    pub fn from_name(name: &str) -> Option<Color> {
        Some(match name {
            "black" => Color::BLACK,
            "blue" => Color::BLUE,
            "red" => Color::RED,
            "green" => Color::GREEN,
            "cyan" => Color::CYAN,
            "magenta" => Color::MAGENTA,
            "yellow" => Color::YELLOW,
            "white" => Color::WHITE,
            _ => return None,
        })
    }
}

/// Panel orientation, in quarter turns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rotation {
    #[default]
    Portrait,
    Landscape,
    PortraitFlipped,
    LandscapeFlipped,
}

impl Rotation {
    /// Map the controller's 0..=3 rotation index
    pub fn from_index(index: u8) -> Option<Rotation> {
        match index {
            0 => Some(Rotation::Portrait),
            1 => Some(Rotation::Landscape),
            2 => Some(Rotation::PortraitFlipped),
            3 => Some(Rotation::LandscapeFlipped),
            _ => None,
        }
    }

    pub fn is_landscape(&self) -> bool {
        matches!(self, Rotation::Landscape | Rotation::LandscapeFlipped)
    }
}

/// Text colour and scale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TextStyle {
    pub color: Color,
    pub size: u8,
}

impl TextStyle {
    pub const fn new(color: Color, size: u8) -> Self {
        Self { color, size }
    }
}

/// Errors that can occur while drawing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Bus transfer failed
    Bus,
    /// Controller rejected the initialization sequence
    InitFailed,
    /// Drawing outside the panel
    OutOfBounds,
    /// Text did not fit the formatting buffer
    BufferOverflow,
}

/// Drawing surface
///
/// Coordinates are in pixels from the top-left corner of the rotated panel.
pub trait DisplayDriver {
    /// Bring the controller up
    fn init(&mut self) -> Result<(), DisplayError>;

    /// Rotate the panel
    fn set_rotation(&mut self, rotation: Rotation) -> Result<(), DisplayError>;

    /// Panel size after rotation (width, height)
    fn size(&self) -> (u16, u16);

    /// Fill a rectangle
    fn fill_region(&mut self, x: u16, y: u16, w: u16, h: u16, color: Color)
        -> Result<(), DisplayError>;

    /// Draw a one pixel rectangle outline
    fn draw_outline(&mut self, x: u16, y: u16, w: u16, h: u16, color: Color)
        -> Result<(), DisplayError>;

    /// Move the text cursor
    fn set_cursor(&mut self, x: u16, y: u16);

    /// Set colour and scale for subsequent text
    fn set_text(&mut self, style: TextStyle);

    /// Draw text at the cursor and advance it; `\n` starts a new line
    fn write_text(&mut self, text: &str) -> Result<(), DisplayError>;

    /// Push buffered drawing to the panel
    ///
    /// Unbuffered drivers draw immediately and need not override this.
    fn flush(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }

    /// Clear the whole panel
    fn clear(&mut self, color: Color) -> Result<(), DisplayError> {
        let (w, h) = self.size();
        self.fill_region(0, 0, w, h, color)
    }
}

/// Helper trait for drawing common UI elements
pub trait DisplayExt: DisplayDriver {
    /// Draw `text` at a position with a style
    fn text_at(&mut self, x: u16, y: u16, style: TextStyle, text: &str) -> Result<(), DisplayError> {
        self.set_cursor(x, y);
        self.set_text(style);
        self.write_text(text)
    }
}

// Blanket implementation for all DisplayDriver types
impl<T: DisplayDriver + ?Sized> DisplayExt for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_names() {
        assert_eq!(Color::from_name("green"), Some(Color::GREEN));
        assert_eq!(Color::from_name("cyan"), Some(Color(0x07FF)));
        assert_eq!(Color::from_name("Green"), None);
    }

    #[test]
    fn test_rotation_index() {
        assert_eq!(Rotation::from_index(3), Some(Rotation::LandscapeFlipped));
        assert!(Rotation::from_index(3).unwrap().is_landscape());
        assert!(!Rotation::Portrait.is_landscape());
        assert_eq!(Rotation::from_index(4), None);
    }
}
