//! Sunglasses and moustache filters.
//!
//! [`FilterPipeline`] detects faces, locates the eyes and the nose within each face, and
//! composites a resized template over them. Every applied overlay is recorded as an
//! [`OverlayRecord`], which can be written out as CSV with [`write_records`] or [`save_records`].

use std::{fmt, io, path::Path};

use serde::Serialize;

use crate::config::{LANDMARK_DETECTION, STILL_FACE_DETECTION};
use crate::detector::{DetectParams, Detector};
use crate::image::{Image, Overlay, Rect};
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayKind {
    Sunglasses,
    Moustache,
}

impl fmt::Display for OverlayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sunglasses => "sunglasses",
            Self::Moustache => "moustache",
        })
    }
}

/// Where an overlay's top-left corner was placed, in image coordinates.
///
/// The position is the requested placement, which may lie partially outside the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OverlayRecord {
    pub x: i32,
    pub y: i32,
    #[serde(rename = "type")]
    pub kind: OverlayKind,
}

/// Computes the sunglasses rectangle for the first eye `eye` found in the face region starting at
/// `(fx, fy)`.
///
/// The glasses are 2.5 eye widths wide and start 0.75 eye widths to the left of the eye, so that
/// they cover both eyes.
pub fn sunglasses_placement(fx: i32, fy: i32, eye: &Rect) -> Rect {
    let (ew, eh) = (eye.width() as f32, eye.height() as f32);
    Rect::from_top_left(
        fx + eye.x() - (ew * 0.75) as i32,
        fy + eye.y() - (eh * 0.1) as i32,
        (ew * 2.5) as u32,
        (eh * 1.2) as u32,
    )
}

/// Computes the moustache rectangle below the nose `nose` of the face region starting at
/// `(fx, fy)`.
pub fn moustache_placement(fx: i32, fy: i32, nose: &Rect) -> Rect {
    let (nw, nh) = (nose.width() as f32, nose.height() as f32);
    Rect::from_top_left(
        fx + nose.x() - (nw * 0.5) as i32,
        fy + nose.y() + (nh * 0.5) as i32,
        nose.width() * 2,
        (nh * 1.5) as u32,
    )
}

/// Overlay graphics. A missing template disables its filter.
#[derive(Debug, Clone, Default)]
pub struct Templates {
    pub sunglasses: Option<Overlay>,
    pub moustache: Option<Overlay>,
}

impl Templates {
    /// Loads the templates at the given paths.
    ///
    /// A template that cannot be loaded is left out with a warning.
    pub fn load(sunglasses: &Path, moustache: &Path) -> Self {
        let load = |kind: OverlayKind, path: &Path| match Overlay::load(path) {
            Ok(overlay) => {
                if !overlay.has_alpha() {
                    log::warn!("{kind} template '{}' has no alpha channel", path.display());
                }
                Some(overlay)
            }
            Err(e) => {
                log::warn!(
                    "could not load {kind} template from '{}' ({e}), {kind} filter will be skipped",
                    path.display(),
                );
                None
            }
        };

        Self {
            sunglasses: load(OverlayKind::Sunglasses, sunglasses),
            moustache: load(OverlayKind::Moustache, moustache),
        }
    }

    fn get(&self, kind: OverlayKind) -> Option<&Overlay> {
        match kind {
            OverlayKind::Sunglasses => self.sunglasses.as_ref(),
            OverlayKind::Moustache => self.moustache.as_ref(),
        }
    }
}

/// Applies the sunglasses and moustache filters to still images.
pub struct FilterPipeline<F, E, N> {
    faces: F,
    eyes: E,
    nose: N,
    face_params: DetectParams,
    landmark_params: DetectParams,
}

impl<F: Detector, E: Detector, N: Detector> FilterPipeline<F, E, N> {
    pub fn new(faces: F, eyes: E, nose: N) -> Self {
        Self {
            faces,
            eyes,
            nose,
            face_params: STILL_FACE_DETECTION,
            landmark_params: LANDMARK_DETECTION,
        }
    }

    pub fn with_face_params(mut self, params: DetectParams) -> Self {
        self.face_params = params;
        self
    }

    /// Detects faces in `image` and draws the filters onto it.
    ///
    /// At most one pair of sunglasses and one moustache is applied per face, placed on the first
    /// eye and nose detection. Landmarks of a face are detected before anything is drawn on it.
    /// Overlays that end up entirely outside of `image` are not recorded.
    pub fn apply(&self, image: &mut Image, templates: &Templates) -> Vec<OverlayRecord> {
        let faces = self.faces.detect(image, &self.face_params);
        log::info!("detected {} face(s)", faces.len());

        let mut records = Vec::new();
        for face in faces {
            let Some(roi) = face.intersection(&image.rect()) else {
                log::trace!("face {face:?} is outside of the image");
                continue;
            };
            let Some(region) = image.crop(&roi) else {
                continue;
            };

            let eye = self.first(&self.eyes, &region, templates, OverlayKind::Sunglasses);
            let nose = self.first(&self.nose, &region, templates, OverlayKind::Moustache);

            let (fx, fy) = (roi.x(), roi.y());
            let placements = [
                eye.map(|eye| (OverlayKind::Sunglasses, sunglasses_placement(fx, fy, &eye))),
                nose.map(|nose| (OverlayKind::Moustache, moustache_placement(fx, fy, &nose))),
            ];
            for (kind, placement) in placements.into_iter().flatten() {
                if let Some(record) = draw(image, templates, kind, &placement) {
                    records.push(record);
                }
            }
        }

        log::info!("applied {} filter(s)", records.len());
        records
    }

    /// Returns the first landmark found, if the filter it feeds has a template.
    fn first<D: Detector>(
        &self,
        detector: &D,
        region: &Image,
        templates: &Templates,
        kind: OverlayKind,
    ) -> Option<Rect> {
        templates.get(kind)?;
        detector
            .detect(region, &self.landmark_params)
            .into_iter()
            .next()
    }
}

fn draw(
    image: &mut Image,
    templates: &Templates,
    kind: OverlayKind,
    placement: &Rect,
) -> Option<OverlayRecord> {
    let template = templates.get(kind)?;
    if placement.is_empty() {
        log::debug!("{kind} placement {placement:?} is empty, skipping");
        return None;
    }

    let overlay = template.resize(placement.width(), placement.height());
    let written = image.composite(&overlay, placement.x(), placement.y())?;
    log::trace!("{kind} at {placement:?}, wrote {written:?}");
    Some(OverlayRecord {
        x: placement.x(),
        y: placement.y(),
        kind,
    })
}

/// Writes `records` as CSV with an `x,y,type` header.
pub fn write_records<W: io::Write>(writer: W, records: &[OverlayRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes `records` to a CSV file at `path`.
///
/// Nothing is written when `records` is empty; returns whether the file was created.
pub fn save_records<P: AsRef<Path>>(path: P, records: &[OverlayRecord]) -> Result<bool> {
    if records.is_empty() {
        return Ok(false);
    }
    let file = std::fs::File::create(path.as_ref())?;
    write_records(io::BufWriter::new(file), records)?;
    Ok(true)
}
