use std::convert::Infallible;

use embedded_graphics::{
    Drawable, Pixel,
    mono_font::{MonoFont, MonoTextStyle, ascii::FONT_4X6},
    pixelcolor::BinaryColor,
    prelude::{DrawTarget, OriginDimensions, Point, Primitive, Size},
    primitives::{PrimitiveStyle, Rectangle},
    text::{Alignment, Baseline, Text, TextStyleBuilder, renderer::TextRenderer},
};

use crate::foundation::core::{ChainGeometry, PixelBuffer};

/// Monochrome drawing surface covering a whole panel.
///
/// `BinaryColor::On` is ink and maps to a lit pixel. Drawing outside the panel is clipped.
#[derive(Clone)]
pub struct Canvas {
    geometry: ChainGeometry,
    buffer: PixelBuffer,
    font: &'static MonoFont<'static>,
}

impl Canvas {
    /// Blank canvas using the 4x6 bitmap font.
    pub fn new(geometry: ChainGeometry) -> Self {
        Self {
            geometry,
            buffer: PixelBuffer::blank(geometry),
            font: &FONT_4X6,
        }
    }

    /// Switch the text font.
    pub fn with_font(mut self, font: &'static MonoFont<'static>) -> Self {
        self.font = font;
        self
    }

    /// Panel geometry.
    pub fn geometry(&self) -> ChainGeometry {
        self.geometry
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// Erase everything.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    fn text_style(&self) -> MonoTextStyle<'static, BinaryColor> {
        MonoTextStyle::new(self.font, BinaryColor::On)
    }

    /// Draw `text` anchored at `(x, y)`.
    pub fn text(&mut self, text: &str, x: i32, y: i32, alignment: Alignment, baseline: Baseline) {
        let layout = TextStyleBuilder::new()
            .alignment(alignment)
            .baseline(baseline)
            .build();
        let Ok(_) =
            Text::with_text_style(text, Point::new(x, y), self.text_style(), layout).draw(self);
    }

    /// Fill a `w`x`h` rectangle with its top-left corner at `(x, y)`.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32) {
        let Ok(()) = Rectangle::new(Point::new(x, y), Size::new(w, h))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(self);
    }

    /// Advance width of `text` in pixels.
    pub fn measure(&self, text: &str) -> u32 {
        self.text_style()
            .measure_string(text, Point::zero(), Baseline::Top)
            .bounding_box
            .size
            .width
    }

    /// Current contents.
    pub fn pixels(&self) -> &PixelBuffer {
        &self.buffer
    }

    /// Copy of the current contents, leaving the canvas as is.
    pub fn snapshot(&self) -> PixelBuffer {
        self.buffer.clone()
    }
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("geometry", &self.geometry)
            .field("lit", &self.buffer.lit_count())
            .finish_non_exhaustive()
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(self.buffer.width(), self.buffer.height())
    }
}

impl DrawTarget for Canvas {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            if coord.x >= 0 && coord.y >= 0 {
                self.buffer
                    .set(coord.x as u32, coord.y as u32, color.is_on());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/canvas.rs"]
mod tests;
