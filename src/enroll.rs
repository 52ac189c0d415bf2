//! Enrollment: collecting face samples of one person.

use ndarray::Array2;

use crate::image::{Image, Rect};
use crate::sample::{Decimator, FaceSample, SampleExtractor};

/// Collects samples of a single person from a stream of frames.
///
/// Only the largest face of each frame is considered, and only every N-th extracted sample (see
/// [`Decimator`]) is retained.
pub struct Enrollment {
    extractor: SampleExtractor,
    decimator: Decimator,
    samples: Vec<FaceSample>,
}

impl Enrollment {
    pub fn new(extractor: SampleExtractor, decimator: Decimator) -> Self {
        Self {
            extractor,
            decimator,
            samples: Vec::new(),
        }
    }

    /// Processes one frame and the faces detected in it.
    ///
    /// Returns the sample extracted from the largest face (whether or not it was retained), so
    /// that callers can preview it. If several faces share the largest area, the last one wins.
    pub fn process(&mut self, frame: &Image, faces: &[Rect]) -> Option<FaceSample> {
        let face = faces.iter().max_by_key(|face| face.area())?;
        let Some(sample) = self.extractor.extract(frame, face) else {
            log::warn!("face {face:?} is outside of the {}x{} frame", frame.width(), frame.height());
            return None;
        };

        if self.decimator.tick() {
            self.samples.push(sample.clone());
            log::debug!("retained sample #{} from {face:?}", self.samples.len());
        } else {
            log::trace!("extracted sample from {face:?}");
        }
        Some(sample)
    }

    /// Returns the number of retained samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Stacks the retained samples into an `(n, D)` array, one flattened sample per row.
    ///
    /// Returns `None` if no sample was retained.
    pub fn into_sample_set(self) -> Option<Array2<u8>> {
        if self.samples.is_empty() {
            return None;
        }

        let dim = self.extractor.dim();
        let mut set = Array2::zeros((self.samples.len(), dim));
        for (mut row, sample) in set.rows_mut().into_iter().zip(&self.samples) {
            row.assign(&sample.as_array());
        }
        Some(set)
    }
}
