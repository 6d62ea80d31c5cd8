//! `embedded-graphics` display adapter
//!
//! Implements the monitor's drawing surface on top of any
//! `DrawTarget<Color = Rgb565>`, such as a `mipidsi` ILI9341 panel or the
//! `MockDisplay` used in tests.

use embedded_graphics::mono_font::ascii::{FONT_10X20, FONT_6X10};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::raw::RawU16;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};

use lumen_core::traits::{Color, DisplayDriver, DisplayError, Rotation, TextStyle};

/// Panels whose orientation can be changed at runtime
pub trait Orientable {
    fn set_orientation(&mut self, rotation: Rotation) -> Result<(), DisplayError>;
}

/// Convert an RGB565 colour word
pub fn to_rgb565(color: Color) -> Rgb565 {
    Rgb565::from(RawU16::new(color.0))
}

/// Font for a text size: 1 is small, anything larger uses the big font
fn font_for(size: u8) -> &'static MonoFont<'static> {
    if size <= 1 {
        &FONT_6X10
    } else {
        &FONT_10X20
    }
}

/// Drawing surface with a text cursor
pub struct GraphicsDisplay<D> {
    target: D,
    cursor: Point,
    style: TextStyle,
}

impl<D> GraphicsDisplay<D> {
    pub fn new(target: D) -> Self {
        Self {
            target,
            cursor: Point::zero(),
            style: TextStyle::new(Color::WHITE, 1),
        }
    }

    pub fn cursor(&self) -> (u16, u16) {
        (self.cursor.x.max(0) as u16, self.cursor.y.max(0) as u16)
    }

    pub fn target(&self) -> &D {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut D {
        &mut self.target
    }

    pub fn into_inner(self) -> D {
        self.target
    }
}

fn area(x: u16, y: u16, w: u16, h: u16) -> Rectangle {
    Rectangle::new(
        Point::new(x as i32, y as i32),
        Size::new(w as u32, h as u32),
    )
}

impl<D> DisplayDriver for GraphicsDisplay<D>
where
    D: DrawTarget<Color = Rgb565> + Orientable,
{
    fn init(&mut self) -> Result<(), DisplayError> {
        self.cursor = Point::zero();
        self.target
            .clear(Rgb565::BLACK)
            .map_err(|_| DisplayError::InitFailed)
    }

    fn set_rotation(&mut self, rotation: Rotation) -> Result<(), DisplayError> {
        self.target.set_orientation(rotation)
    }

    fn size(&self) -> (u16, u16) {
        let size = self.target.bounding_box().size;
        (size.width as u16, size.height as u16)
    }

    fn fill_region(&mut self, x: u16, y: u16, w: u16, h: u16, color: Color) -> Result<(), DisplayError> {
        area(x, y, w, h)
            .into_styled(PrimitiveStyle::with_fill(to_rgb565(color)))
            .draw(&mut self.target)
            .map_err(|_| DisplayError::Bus)
    }

    fn draw_outline(&mut self, x: u16, y: u16, w: u16, h: u16, color: Color) -> Result<(), DisplayError> {
        area(x, y, w, h)
            .into_styled(PrimitiveStyle::with_stroke(to_rgb565(color), 1))
            .draw(&mut self.target)
            .map_err(|_| DisplayError::Bus)
    }

    fn set_cursor(&mut self, x: u16, y: u16) {
        self.cursor = Point::new(x as i32, y as i32);
    }

    fn set_text(&mut self, style: TextStyle) {
        self.style = style;
    }

    fn write_text(&mut self, text: &str) -> Result<(), DisplayError> {
        let font = font_for(self.style.size);
        let character_style = MonoTextStyle::new(font, to_rgb565(self.style.color));

        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.cursor = Point::new(0, self.cursor.y + font.character_size.height as i32);
            }
            if line.is_empty() {
                continue;
            }
            self.cursor = Text::with_baseline(line, self.cursor, character_style, Baseline::Top)
                .draw(&mut self.target)
                .map_err(|_| DisplayError::Bus)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_graphics::mock_display::MockDisplay;

    /// MockDisplay that also records rotation requests
    struct MockPanel {
        mock: MockDisplay<Rgb565>,
        rotation: Option<Rotation>,
    }

    impl MockPanel {
        fn new() -> Self {
            let mut mock = MockDisplay::new();
            mock.set_allow_overdraw(true);
            mock.set_allow_out_of_bounds_drawing(true);
            Self {
                mock,
                rotation: None,
            }
        }
    }

    impl DrawTarget for MockPanel {
        type Color = Rgb565;
        type Error = Infallible;

        fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Self::Color>>,
        {
            self.mock.draw_iter(pixels)
        }
    }

    impl OriginDimensions for MockPanel {
        fn size(&self) -> Size {
            self.mock.size()
        }
    }

    impl Orientable for MockPanel {
        fn set_orientation(&mut self, rotation: Rotation) -> Result<(), DisplayError> {
            self.rotation = Some(rotation);
            Ok(())
        }
    }

    #[test]
    fn test_color_conversion() {
        assert_eq!(to_rgb565(Color::RED), Rgb565::RED);
        assert_eq!(to_rgb565(Color::GREEN), Rgb565::GREEN);
        assert_eq!(to_rgb565(Color::WHITE), Rgb565::WHITE);
        assert_eq!(to_rgb565(Color::CYAN), Rgb565::CYAN);
    }

    #[test]
    fn test_fill_and_outline() {
        let mut display = GraphicsDisplay::new(MockPanel::new());
        display.fill_region(2, 2, 4, 3, Color::RED).unwrap();
        display.draw_outline(10, 10, 5, 5, Color::WHITE).unwrap();

        let mock = &display.target().mock;
        assert_eq!(mock.get_pixel(Point::new(3, 3)), Some(Rgb565::RED));
        assert_eq!(mock.get_pixel(Point::new(6, 3)), None);
        assert_eq!(mock.get_pixel(Point::new(10, 12)), Some(Rgb565::WHITE));
        // Outline only
        assert_eq!(mock.get_pixel(Point::new(12, 12)), None);
    }

    #[test]
    fn test_text_advances_cursor() {
        let mut display = GraphicsDisplay::new(MockPanel::new());
        display.set_cursor(0, 0);
        display.set_text(TextStyle::new(Color::WHITE, 1));
        display.write_text("AB").unwrap();
        assert_eq!(display.cursor(), (12, 0));

        display.write_text("\nC").unwrap();
        assert_eq!(display.cursor(), (6, 10));
    }

    #[test]
    fn test_large_text_uses_big_font() {
        let mut display = GraphicsDisplay::new(MockPanel::new());
        display.set_cursor(4, 4);
        display.set_text(TextStyle::new(Color::YELLOW, 2));
        display.write_text("1").unwrap();
        assert_eq!(display.cursor(), (14, 4));
    }

    #[test]
    fn test_rotation_and_size() {
        let mut display = GraphicsDisplay::new(MockPanel::new());
        display.set_rotation(Rotation::Landscape).unwrap();
        assert_eq!(display.target().rotation, Some(Rotation::Landscape));
        assert_eq!(display.size(), (64, 64));

        display.clear(Color::BLUE).unwrap();
        assert_eq!(
            display.target().mock.get_pixel(Point::new(63, 63)),
            Some(Rgb565::BLUE)
        );
    }
}
