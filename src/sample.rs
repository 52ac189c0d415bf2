//! Face sample extraction.
//!
//! A [`FaceSample`] is a face crop normalized to a fixed square size. Its flattened pixels are the
//! feature vector the [`knn`](crate::knn) classifier works on.

use ndarray::{Array1, ArrayView1};

use crate::image::{Image, Rect};

/// A fixed-size, 3-channel face crop.
#[derive(Clone)]
pub struct FaceSample {
    image: Image,
}

impl FaceSample {
    /// Returns the side length of this (square) sample, in pixels.
    pub fn size(&self) -> u32 {
        self.image.width()
    }

    /// Returns the feature dimensionality `size² × 3`.
    pub fn dim(&self) -> usize {
        self.image.data().len()
    }

    pub fn image(&self) -> &Image {
        &self.image
    }

    /// Returns the flattened pixel data (row-major, interleaved RGB).
    pub fn pixels(&self) -> &[u8] {
        self.image.data()
    }

    pub fn as_array(&self) -> ArrayView1<'_, u8> {
        ArrayView1::from(self.pixels())
    }

    /// Converts the pixels into the floating-point feature vector used for classification.
    pub fn to_features(&self) -> Array1<f32> {
        self.pixels().iter().map(|&v| f32::from(v)).collect()
    }
}

impl std::fmt::Debug for FaceSample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{0}x{0} FaceSample", self.size())
    }
}

/// Extracts a face sample from `frame`.
///
/// `face` is grown by `padding` pixels on every side and then clamped to the frame, so boxes that
/// extend past the frame (or lie outside of it entirely) are fine. The clamped crop is stretched
/// to `target_size`x`target_size` pixels.
///
/// Returns `None` if the clamped crop is empty.
pub fn extract(frame: &Image, face: &Rect, padding: u32, target_size: u32) -> Option<FaceSample> {
    assert!(target_size > 0, "target sample size must be positive");

    let crop = frame.crop(&face.grow(padding))?;
    Some(FaceSample {
        image: crop.resize(target_size, target_size),
    })
}

/// Extraction settings bundled for repeated use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleExtractor {
    padding: u32,
    size: u32,
}

impl SampleExtractor {
    pub fn new(padding: u32, size: u32) -> Self {
        assert!(size > 0, "target sample size must be positive");
        Self { padding, size }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Returns the feature dimensionality of the samples produced by `self`.
    pub fn dim(&self) -> usize {
        self.size as usize * self.size as usize * 3
    }

    /// See [`extract`].
    pub fn extract(&self, frame: &Image, face: &Rect) -> Option<FaceSample> {
        extract(frame, face, self.padding, self.size)
    }
}

/// Lets through every `every`-th event.
///
/// Consecutive camera frames are nearly identical, so enrollment only keeps every N-th extracted
/// sample.
#[derive(Debug, Clone)]
pub struct Decimator {
    every: u32,
    count: u32,
}

impl Decimator {
    pub fn new(every: u32) -> Self {
        assert!(every > 0, "decimation interval must be positive");
        Self { every, count: 0 }
    }

    /// Registers an event and returns whether it should be kept.
    ///
    /// Returns `true` on the `every`-th, `2 * every`-th, ... call.
    pub fn tick(&mut self) -> bool {
        self.count = (self.count + 1) % self.every;
        self.count == 0
    }
}
