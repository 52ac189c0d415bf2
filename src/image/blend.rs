use image::{Rgb, Rgba};

use super::{Image, Overlay, Rect};

/// Describes how overlay pixels are combined with the pixels they cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// All destination pixels will be overwritten with the corresponding overlay pixel.
    Overwrite,

    /// Performs alpha blending between overlay and destination pixels to make the overlay
    /// appear in front of the destination image.
    Alpha,
}

/// Blends `overlay` onto `background`, placing the overlay's top-left corner at `(x, y)`.
///
/// The placement may extend past any edge of `background`; only the part of the overlay that
/// lands inside the background is blended. Returns the rectangle of `background` that was
/// written to, or `None` if the overlay lies entirely off-canvas (in which case `background` is
/// left untouched).
///
/// [`Overlay::Transparent`] overlays are blended as `a * overlay + (1 - a) * background` with
/// `a = alpha / 255`. [`Overlay::Opaque`] overlays are copied as-is.
pub fn composite(background: &mut Image, overlay: &Overlay, x: i32, y: i32) -> Option<Rect> {
    let placement = Rect::from_top_left(x, y, overlay.width(), overlay.height());
    let target = placement.intersection(&background.rect())?;

    // Offset of the visible part within the overlay.
    let src_x = (i64::from(target.x()) - i64::from(x)) as u32;
    let src_y = (i64::from(target.y()) - i64::from(y)) as u32;
    log::trace!("compositing {overlay:?} at ({x},{y}), visible part {target:?}");

    for dy in 0..target.height() {
        for dx in 0..target.width() {
            let (bx, by) = (target.x() as u32 + dx, target.y() as u32 + dy);
            let (ox, oy) = (src_x + dx, src_y + dy);
            let dest = &mut background.buf[(bx, by)];
            *dest = match overlay {
                Overlay::Opaque(buf) => blend_overwrite(*dest, buf[(ox, oy)]),
                Overlay::Transparent(buf) => blend_alpha(*dest, buf[(ox, oy)]),
            };
        }
    }

    Some(target)
}

fn blend_overwrite(_dest: Rgb<u8>, src: Rgb<u8>) -> Rgb<u8> {
    src
}

fn blend_alpha(dest: Rgb<u8>, src: Rgba<u8>) -> Rgb<u8> {
    let alpha = f32::from(src[3]) / 255.0;
    let blend = |src: u8, dest: u8| (alpha * f32::from(src) + (1.0 - alpha) * f32::from(dest)) as u8;

    Rgb([
        blend(src[0], dest[0]),
        blend(src[1], dest[1]),
        blend(src[2], dest[2]),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_extremes() {
        let dest = Rgb([10, 20, 30]);
        assert_eq!(blend_alpha(dest, Rgba([200, 100, 50, 0])), dest);
        assert_eq!(
            blend_alpha(dest, Rgba([200, 100, 50, 255])),
            Rgb([200, 100, 50])
        );
    }

    #[test]
    fn alpha_truncates() {
        // 3 * 128/255 = 1.506
        let out = blend_alpha(Rgb([0, 0, 0]), Rgba([3, 3, 3, 128]));
        assert_eq!(out, Rgb([1, 1, 1]));

        // 250 * (1 - 100/255) = 151.96
        let out = blend_alpha(Rgb([250, 250, 250]), Rgba([0, 0, 0, 100]));
        assert_eq!(out, Rgb([151, 151, 151]));
    }
}
