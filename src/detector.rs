//! Object detection.
//!
//! Detectors are treated as black boxes: given an image and a few tuning parameters they return
//! the bounding boxes of everything they found. Two backends are provided:
//!
//! - [`RustfaceDetector`] finds faces using the SeetaFace cascade from the [rustface] crate.
//! - [`FaceGeometry`] locates eyes or the nose inside an already detected face region.
//!
//! [rustface]: https://github.com/atomashpolskiy/rustface

use std::path::Path;

use crate::image::{Image, Rect};
use crate::{Error, Result};

/// A detection result: an axis-aligned box in the pixel coordinates of the searched image.
pub type BoundingBox = Rect;

/// Tuning parameters passed to every [`Detector::detect`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectParams {
    /// Factor by which the search window grows between pyramid levels (> 1).
    pub scale_factor: f32,
    /// How many overlapping candidate hits are required to accept a detection.
    pub min_neighbors: u32,
    /// Objects smaller than this (in pixels, on both axes) are ignored.
    pub min_size: Option<u32>,
}

impl Default for DetectParams {
    fn default() -> Self {
        Self {
            scale_factor: 1.1,
            min_neighbors: 3,
            min_size: None,
        }
    }
}

/// Trait implemented by object detectors.
pub trait Detector {
    /// Searches `image` and returns the bounding boxes of all detected objects.
    ///
    /// Boxes have non-zero width and height, but are not guaranteed to lie within `image`.
    fn detect(&self, image: &Image, params: &DetectParams) -> Vec<BoundingBox>;
}

impl<D: Detector + ?Sized> Detector for &D {
    fn detect(&self, image: &Image, params: &DetectParams) -> Vec<BoundingBox> {
        (**self).detect(image, params)
    }
}

impl<D: Detector + ?Sized> Detector for Box<D> {
    fn detect(&self, image: &Image, params: &DetectParams) -> Vec<BoundingBox> {
        (**self).detect(image, params)
    }
}

/// Score threshold passed to the SeetaFace cascade.
const SEETA_SCORE_THRESH: f64 = 2.0;
/// Smallest face the cascade searches for unless [`DetectParams::min_size`] says otherwise.
const SEETA_MIN_FACE_SIZE: u32 = 20;

/// Face detector backed by the `rustface` crate (SeetaFace engine).
///
/// [`DetectParams::scale_factor`] controls the image pyramid and [`DetectParams::min_size`] the
/// smallest searched face. The SeetaFace cascade scores windows instead of counting neighbor hits,
/// so [`DetectParams::min_neighbors`] has no effect on this backend.
pub struct RustfaceDetector {
    model: rustface::Model,
}

impl RustfaceDetector {
    /// Loads a SeetaFace model (eg. `seeta_fd_frontal_v1.0.bin`) from the filesystem.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let model_error = |message: String| Error::Model {
            path: path.to_path_buf(),
            message,
        };

        let file = std::fs::File::open(path).map_err(|e| model_error(e.to_string()))?;
        let model = rustface::read_model(std::io::BufReader::new(file))
            .map_err(|e| model_error(e.to_string()))?;
        log::debug!("loaded face detector model from '{}'", path.display());
        Ok(Self { model })
    }
}

impl Detector for RustfaceDetector {
    fn detect(&self, image: &Image, params: &DetectParams) -> Vec<BoundingBox> {
        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(params.min_size.unwrap_or(SEETA_MIN_FACE_SIZE));
        detector.set_score_thresh(SEETA_SCORE_THRESH);
        detector.set_pyramid_scale_factor(1.0 / params.scale_factor.max(1.01));
        detector.set_slide_window_step(4, 4);

        let gray = image.to_luma8();
        let faces = detector.detect(&rustface::ImageData::new(
            gray.as_raw(),
            image.width(),
            image.height(),
        ));

        faces
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                Rect::from_top_left(bbox.x(), bbox.y(), bbox.width(), bbox.height())
            })
            .filter(|rect| !rect.is_empty())
            .collect()
    }
}

/// Facial features located by [`FaceGeometry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landmark {
    Eyes,
    Nose,
}

/// Face regions smaller than this (in pixels) yield no landmarks.
const MIN_FACE_REGION: u32 = 12;

/// Default luma standard deviation a candidate box needs to count as a landmark.
pub const MIN_LANDMARK_CONTRAST: f32 = 16.0;

/// Landmark detector that searches for eyes or the nose at their typical position in a face region.
///
/// Each candidate box is accepted only if its luma varies enough (see
/// [`FaceGeometry::with_min_contrast`]): eyes and nostrils are darker than the surrounding skin,
/// while a featureless region (a wall, an overexposed patch) yields nothing.
///
/// `detect` expects the cropped face region as its input image, and returns boxes relative to it.
/// Eyes are returned left to right (as seen in the image).
#[derive(Debug, Clone, Copy)]
pub struct FaceGeometry {
    landmark: Landmark,
    min_contrast: f32,
}

impl FaceGeometry {
    pub fn new(landmark: Landmark) -> Self {
        Self {
            landmark,
            min_contrast: MIN_LANDMARK_CONTRAST,
        }
    }

    /// Sets the luma standard deviation (0-255 scale) a box needs to be reported.
    pub fn with_min_contrast(self, min_contrast: f32) -> Self {
        Self {
            min_contrast,
            ..self
        }
    }

    pub fn eyes() -> Self {
        Self::new(Landmark::Eyes)
    }

    pub fn nose() -> Self {
        Self::new(Landmark::Nose)
    }

    /// Relative `(x, y, w, h)` boxes of the landmark within a face.
    fn layout(&self) -> &'static [[f32; 4]] {
        match self.landmark {
            Landmark::Eyes => &[[0.18, 0.28, 0.26, 0.16], [0.56, 0.28, 0.26, 0.16]],
            Landmark::Nose => &[[0.38, 0.45, 0.24, 0.20]],
        }
    }
}

impl Detector for FaceGeometry {
    fn detect(&self, face: &Image, params: &DetectParams) -> Vec<BoundingBox> {
        let (w, h) = (face.width(), face.height());
        if w.min(h) < MIN_FACE_REGION {
            return Vec::new();
        }

        let (fw, fh) = (w as f32, h as f32);
        self.layout()
            .iter()
            .map(|&[x, y, bw, bh]| {
                Rect::from_top_left(
                    (x * fw) as i32,
                    (y * fh) as i32,
                    ((bw * fw) as u32).max(1),
                    ((bh * fh) as u32).max(1),
                )
            })
            .filter(|rect| {
                params
                    .min_size
                    .map_or(true, |min| rect.width() >= min && rect.height() >= min)
            })
            .filter(|rect| {
                let contrast = luma_stddev(face, rect);
                log::trace!("{:?} candidate {rect:?}: contrast {contrast:.1}", self.landmark);
                contrast >= self.min_contrast
            })
            .collect()
    }
}

/// Standard deviation of the luma of the pixels of `image` inside `rect`.
fn luma_stddev(image: &Image, rect: &Rect) -> f32 {
    let Some(rect) = rect.intersection(&image.rect()) else {
        return 0.0;
    };

    let (mut sum, mut sum_sq) = (0.0f64, 0.0f64);
    for y in rect.y()..rect.y() + rect.height() as i32 {
        for x in rect.x()..rect.x() + rect.width() as i32 {
            let [r, g, b] = image.get(x as u32, y as u32);
            let luma = 0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b);
            sum += luma;
            sum_sq += luma * luma;
        }
    }
    let n = rect.area() as f64;
    let mean = sum / n;
    (sum_sq / n - mean * mean).max(0.0).sqrt() as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test;

    /// A light 80x80 face with dark pupils and nostrils.
    fn face() -> Image {
        let mut face = Image::filled(80, 80, [220, 180, 160]);
        for (x0, y0) in [(22, 28), (52, 28), (34, 46), (42, 46)] {
            for y in y0..y0 + 4 {
                for x in x0..x0 + 4 {
                    face.set(x, y, [30, 20, 20]);
                }
            }
        }
        face
    }

    #[test]
    fn eyes_are_ordered_and_inside() {
        let face = test::gradient(100, 120);
        let eyes = FaceGeometry::eyes().detect(&face, &DetectParams::default());
        assert_eq!(eyes.len(), 2);
        assert!(eyes[0].x() < eyes[1].x());
        for eye in &eyes {
            assert!(face.rect().contains_rect(eye), "{eye:?}");
            assert!(eye.y() < 60, "eyes are in the upper half");
        }
    }

    #[test]
    fn nose_below_eyes() {
        let face = face();
        let params = DetectParams::default();
        let eye = FaceGeometry::eyes().detect(&face, &params)[0];
        let nose = FaceGeometry::nose().detect(&face, &params);
        assert_eq!(nose.len(), 1);
        assert!(nose[0].y() > eye.y());
        assert!(face.rect().contains_rect(&nose[0]));
    }

    #[test]
    fn tiny_regions_have_no_landmarks() {
        let params = DetectParams::default();
        assert!(FaceGeometry::eyes()
            .detect(&test::gradient(11, 40), &params)
            .is_empty());

        let params = DetectParams {
            min_size: Some(30),
            ..params
        };
        assert!(FaceGeometry::nose()
            .detect(&test::gradient(60, 60), &params)
            .is_empty());
    }

    #[test]
    fn featureless_region_has_no_landmarks() {
        let params = DetectParams::default();
        for color in [[255, 255, 255], [0, 0, 0], [220, 180, 160]] {
            let face = Image::filled(80, 80, color);
            assert!(FaceGeometry::eyes().detect(&face, &params).is_empty());
            assert!(FaceGeometry::nose().detect(&face, &params).is_empty());
        }
    }

    #[test]
    fn dark_features_are_found() {
        let params = DetectParams::default();
        let face = face();
        let eyes = FaceGeometry::eyes().detect(&face, &params);
        // 0.18 * 80 = 14.4, 0.28 * 80 = 22.4, 0.26 * 80 = 20.8, 0.16 * 80 = 12.8
        assert_eq!(
            eyes,
            [
                Rect::from_top_left(14, 22, 20, 12),
                Rect::from_top_left(44, 22, 20, 12),
            ]
        );
        assert_eq!(FaceGeometry::nose().detect(&face, &params).len(), 1);

        // With the pupil of the right eye removed, only the left eye is reported.
        let mut one_eye = face.clone();
        for y in 28..32 {
            for x in 52..56 {
                one_eye.set(x, y, [220, 180, 160]);
            }
        }
        assert_eq!(FaceGeometry::eyes().detect(&one_eye, &params), [eyes[0]]);

        let strict = FaceGeometry::eyes().with_min_contrast(255.0);
        assert!(strict.detect(&face, &params).is_empty());
    }

    #[test]
    fn missing_model_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seeta_fd_frontal_v1.0.bin");
        assert!(matches!(
            RustfaceDetector::load(&path),
            Err(Error::Model { path: p, .. }) if p == path
        ));
    }
}
