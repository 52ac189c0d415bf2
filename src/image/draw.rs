//! Annotations for recognition output frames.

use std::convert::Infallible;

use embedded_graphics::{
    draw_target::DrawTarget,
    mono_font::{ascii::FONT_10X20, MonoTextStyle},
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
    text::{Baseline, Text},
};

use super::{Image, Rect};

pub const RECT_COLOR: [u8; 3] = [0, 255, 255];
pub const LABEL_COLOR: [u8; 3] = [255, 0, 0];

/// Guard returned by [`draw_rect`]; draws the outline when dropped.
pub struct DrawRect<'a> {
    image: &'a mut Image,
    rect: Rect,
    color: [u8; 3],
    stroke_width: u32,
}

impl DrawRect<'_> {
    pub fn color(&mut self, color: [u8; 3]) -> &mut Self {
        self.color = color;
        self
    }

    /// Sets the outline width (2 by default).
    pub fn stroke_width(&mut self, width: u32) -> &mut Self {
        self.stroke_width = width;
        self
    }
}

impl Drop for DrawRect<'_> {
    fn drop(&mut self) {
        let [r, g, b] = self.color;
        let rect = Rectangle::new(
            Point::new(self.rect.x(), self.rect.y()),
            Size::new(self.rect.width(), self.rect.height()),
        );
        match rect
            .into_styled(PrimitiveStyle::with_stroke(Rgb888::new(r, g, b), self.stroke_width))
            .draw(&mut Target(self.image))
        {
            Ok(()) => {}
            Err(infallible) => match infallible {},
        }
    }
}

/// Guard returned by [`draw_label`]; draws the text when dropped.
pub struct DrawLabel<'a> {
    image: &'a mut Image,
    x: i32,
    y: i32,
    text: &'a str,
    color: [u8; 3],
}

impl DrawLabel<'_> {
    pub fn color(&mut self, color: [u8; 3]) -> &mut Self {
        self.color = color;
        self
    }
}

impl Drop for DrawLabel<'_> {
    fn drop(&mut self) {
        let [r, g, b] = self.color;
        let style = MonoTextStyle::new(&FONT_10X20, Rgb888::new(r, g, b));
        match Text::with_baseline(self.text, Point::new(self.x, self.y), style, Baseline::Bottom)
            .draw(&mut Target(self.image))
        {
            Ok(_) => {}
            Err(infallible) => match infallible {},
        }
    }
}

/// Draws the outline of `rect` onto `image`.
///
/// Parts of the outline outside of `image` are clipped.
pub fn draw_rect(image: &mut Image, rect: Rect) -> DrawRect<'_> {
    DrawRect {
        image,
        rect,
        color: RECT_COLOR,
        stroke_width: 2,
    }
}

/// Draws `text` onto `image`, with its bottom-left corner at `(x, y)`.
pub fn draw_label<'a>(image: &'a mut Image, x: i32, y: i32, text: &'a str) -> DrawLabel<'a> {
    DrawLabel {
        image,
        x,
        y,
        text,
        color: LABEL_COLOR,
    }
}

struct Target<'a>(&'a mut Image);

impl OriginDimensions for Target<'_> {
    fn size(&self) -> Size {
        Size::new(self.0.width(), self.0.height())
    }
}

impl DrawTarget for Target<'_> {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x >= 0
                && (point.x as u32) < self.0.width()
                && point.y >= 0
                && (point.y as u32) < self.0.height()
            {
                self.0
                    .set(point.x as u32, point.y as u32, [color.r(), color.g(), color.b()]);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outline_only() {
        let mut image = Image::new(20, 20);
        draw_rect(&mut image, Rect::from_top_left(5, 5, 10, 10)).stroke_width(1);
        assert_eq!(image.get(5, 5), RECT_COLOR);
        assert_eq!(image.get(14, 14), RECT_COLOR);
        assert_eq!(image.get(10, 10), [0, 0, 0]);
        assert_eq!(image.get(4, 4), [0, 0, 0]);
    }

    #[test]
    fn clipped_at_edges() {
        let mut image = Image::new(10, 10);
        draw_rect(&mut image, Rect::from_top_left(-5, -5, 30, 30));
        draw_label(&mut image, -3, 30, "offscreen");
        assert!(image.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn label_is_drawn() {
        let mut image = Image::new(60, 30);
        draw_label(&mut image, 2, 25, "bob").color([1, 2, 3]);
        assert!(image.data().chunks(3).any(|px| px == [1, 2, 3]));
    }
}
