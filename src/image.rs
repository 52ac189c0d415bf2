//! Image manipulation.
//!
//! This module provides:
//!
//! - The [`Image`] type, an owned 8-bit RGB image. Camera frames, face samples and overlay
//!   backgrounds are all [`Image`]s.
//! - The [`Overlay`] type, a graphic that may or may not carry an alpha channel.
//! - [`composite`], which blends an [`Overlay`] onto an [`Image`] at an arbitrary offset.
//! - [`Rect`], an integer-valued rectangle representing (parts of) an image.
//! - [`draw_rect`] and [`draw_label`] for annotating frames.

mod blend;
mod draw;
mod rect;

#[cfg(test)]
mod tests;

use std::{fmt, path::Path};

use image::{imageops, imageops::FilterType, DynamicImage, GrayImage, Rgb, RgbImage, RgbaImage};

use crate::{Error, Result};

pub use blend::*;
pub use draw::*;
pub use rect::*;

/// Interpolation used for every resize in this crate (bilinear).
const RESIZE_FILTER: FilterType = FilterType::Triangle;

#[derive(Debug, Clone, Copy)]
#[non_exhaustive]
enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    fn from_path(path: &Path) -> Result<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("jpg" | "jpeg") => Ok(Self::Jpeg),
            Some("png") => Ok(Self::Png),
            _ => Err(Error::UnsupportedImageFormat(path.to_path_buf())),
        }
    }

    fn to_image_format(self) -> image::ImageFormat {
        match self {
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Png => image::ImageFormat::Png,
        }
    }
}

/// Returns whether `path` has one of the image extensions supported by [`Image::load`].
pub fn is_supported_path(path: &Path) -> bool {
    ImageFormat::from_path(path).is_ok()
}

fn decode(path: &Path) -> Result<DynamicImage> {
    let format = ImageFormat::from_path(path)?;
    let data = std::fs::read(path)?;
    Ok(image::load_from_memory_with_format(
        &data,
        format.to_image_format(),
    )?)
}

/// An 8-bit RGB image.
#[derive(Clone, PartialEq, Eq)]
pub struct Image {
    pub(crate) buf: RgbImage,
}

impl Image {
    /// Loads an image from the filesystem.
    ///
    /// The path must have a supported file extension (`jpeg`, `jpg` or `png`). Any alpha channel
    /// is discarded.
    pub fn load<A: AsRef<Path>>(path: A) -> Result<Self> {
        Ok(Self {
            buf: decode(path.as_ref())?.to_rgb8(),
        })
    }

    /// Saves an image to the file system.
    ///
    /// The path must have a supported file extension (`jpeg`, `jpg` or `png`).
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let format = ImageFormat::from_path(path)?;
        self.buf.save_with_format(path, format.to_image_format())?;
        Ok(())
    }

    /// Creates a black image of a specified size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            buf: RgbImage::new(width, height),
        }
    }

    /// Creates an image of a specified size where every pixel is `color`.
    pub fn filled(width: u32, height: u32, color: [u8; 3]) -> Self {
        Self {
            buf: RgbImage::from_pixel(width, height, Rgb(color)),
        }
    }

    /// Returns the width of this image, in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.buf.width()
    }

    /// Returns the height of this image, in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.buf.height()
    }

    /// Returns a [`Rect`] covering this image.
    ///
    /// The rectangle will be positioned at `(0, 0)` and have the width and height of the image.
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_top_left(0, 0, self.width(), self.height())
    }

    /// Gets the image color at the given pixel coordinates.
    ///
    /// # Panics
    ///
    /// This will panic if `(x, y)` is outside the bounds of this image.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> [u8; 3] {
        self.buf[(x, y)].0
    }

    /// Sets the image color at the given pixel coordinates.
    ///
    /// # Panics
    ///
    /// This will panic if `(x, y)` is outside the bounds of this image.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, color: [u8; 3]) {
        self.buf[(x, y)] = Rgb(color);
    }

    /// Copies the part of `self` covered by `rect` into a new [`Image`].
    ///
    /// `rect` is clamped to the bounds of `self` first. Returns `None` if nothing of `rect` lies
    /// inside the image.
    pub fn crop(&self, rect: &Rect) -> Option<Image> {
        let rect = rect.intersection(&self.rect())?;
        let view = imageops::crop_imm(
            &self.buf,
            rect.x() as u32,
            rect.y() as u32,
            rect.width(),
            rect.height(),
        );
        Some(Image {
            buf: view.to_image(),
        })
    }

    /// Stretches or shrinks `self` to exactly `width`x`height` pixels.
    pub fn resize(&self, width: u32, height: u32) -> Image {
        Image {
            buf: imageops::resize(&self.buf, width, height, RESIZE_FILTER),
        }
    }

    /// Blends `overlay` onto `self` with its top-left corner at `(x, y)`.
    ///
    /// See [`composite`].
    pub fn composite(&mut self, overlay: &Overlay, x: i32, y: i32) -> Option<Rect> {
        composite(self, overlay, x, y)
    }

    /// Converts `self` to an 8-bit grayscale buffer, as consumed by most detectors.
    pub fn to_luma8(&self) -> GrayImage {
        imageops::grayscale(&self.buf)
    }

    /// Returns the raw pixel data, row-major with interleaved RGB channels.
    #[inline]
    pub fn data(&self) -> &[u8] {
        self.buf.as_raw()
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} Image", self.width(), self.height())
    }
}

/// A graphic to be composited onto an [`Image`].
///
/// Overlays loaded from files with an alpha channel are [`Overlay::Transparent`] and get alpha
/// blended; all others are [`Overlay::Opaque`] and overwrite the pixels they cover.
#[derive(Clone, PartialEq, Eq)]
pub enum Overlay {
    Opaque(RgbImage),
    Transparent(RgbaImage),
}

impl Overlay {
    /// Loads an overlay from the filesystem, keeping its alpha channel if it has one.
    ///
    /// The path must have a supported file extension (`jpeg`, `jpg` or `png`).
    pub fn load<A: AsRef<Path>>(path: A) -> Result<Self> {
        let image = decode(path.as_ref())?;
        Ok(if image.color().has_alpha() {
            Self::Transparent(image.to_rgba8())
        } else {
            Self::Opaque(image.to_rgb8())
        })
    }

    /// Returns the width of this overlay, in pixels.
    pub fn width(&self) -> u32 {
        match self {
            Self::Opaque(buf) => buf.width(),
            Self::Transparent(buf) => buf.width(),
        }
    }

    /// Returns the height of this overlay, in pixels.
    pub fn height(&self) -> u32 {
        match self {
            Self::Opaque(buf) => buf.height(),
            Self::Transparent(buf) => buf.height(),
        }
    }

    /// Returns whether this overlay carries an alpha channel.
    pub fn has_alpha(&self) -> bool {
        matches!(self, Self::Transparent(_))
    }

    /// Returns the [`BlendMode`] [`composite`] uses for this overlay.
    pub fn blend_mode(&self) -> BlendMode {
        match self {
            Self::Opaque(_) => BlendMode::Overwrite,
            Self::Transparent(_) => BlendMode::Alpha,
        }
    }

    /// Stretches or shrinks `self` to exactly `width`x`height` pixels.
    pub fn resize(&self, width: u32, height: u32) -> Overlay {
        match self {
            Self::Opaque(buf) => Self::Opaque(imageops::resize(buf, width, height, RESIZE_FILTER)),
            Self::Transparent(buf) => {
                Self::Transparent(imageops::resize(buf, width, height, RESIZE_FILTER))
            }
        }
    }
}

impl From<Image> for Overlay {
    fn from(image: Image) -> Self {
        Self::Opaque(image.buf)
    }
}

impl fmt::Debug for Overlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.has_alpha() { "RGBA" } else { "RGB" };
        write!(f, "{}x{} {kind} Overlay", self.width(), self.height())
    }
}
