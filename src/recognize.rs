//! Live recognition of enrolled persons.

use crate::dataset::{Gallery, PersonId};
use crate::image::{Image, Rect};
use crate::knn::{Classifier, Knn};
use crate::sample::SampleExtractor;
use crate::timer::{FpsCounter, Timer};
use crate::Result;

/// One classified face.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recognition {
    /// The detected face, in frame coordinates.
    pub rect: Rect,
    pub person: PersonId,
    /// Display name of `person`.
    pub name: String,
}

/// Classifies faces in a stream of frames against a [`Gallery`].
pub struct Recognizer<C: Classifier = Knn> {
    gallery: Gallery,
    classifier: C,
    extractor: SampleExtractor,
    timer: Timer,
    fps: FpsCounter,
}

impl<C: Classifier> Recognizer<C> {
    pub fn new(gallery: Gallery, classifier: C, extractor: SampleExtractor) -> Self {
        Self {
            gallery,
            classifier,
            extractor,
            timer: Timer::new("classify"),
            fps: FpsCounter::new("recognize"),
        }
    }

    /// Classifies every face in `faces`.
    ///
    /// Faces whose (padded) box does not overlap the frame are skipped with a warning. Fails if the
    /// classifier rejects a sample, eg. because the gallery was enrolled with a different sample
    /// size.
    pub fn recognize(&mut self, frame: &Image, faces: &[Rect]) -> Result<Vec<Recognition>> {
        let mut results = Vec::with_capacity(faces.len());
        for face in faces {
            let Some(sample) = self.extractor.extract(frame, face) else {
                log::warn!("skipping face {face:?}: empty crop");
                continue;
            };

            let features = sample.to_features();
            let training = self.gallery.matrix();
            let classifier = &self.classifier;
            let person = self
                .timer
                .time(|| classifier.classify(training, features.view()))?;

            let name = match self.gallery.names().get(person) {
                Some(name) => name.to_string(),
                None => {
                    log::warn!("classifier returned unknown person {person}");
                    person.to_string()
                }
            };
            log::trace!("{face:?} -> {name}");
            results.push(Recognition {
                rect: *face,
                person,
                name,
            });
        }

        self.fps.tick_with([&self.timer]);
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use ndarray::Array2;

    use super::*;
    use crate::Error;

    /// Three uniformly colored `size x size` samples.
    fn samples(size: usize, color: [u8; 3]) -> Array2<u8> {
        let row = color.repeat(size * size);
        Array2::from_shape_fn((3, row.len()), |(_, c)| row[c])
    }

    /// A gallery of uniformly colored 8x8 samples.
    fn gallery(colors: &[(&str, [u8; 3])]) -> Gallery {
        Gallery::from_sets(
            colors.iter().map(|(name, color)| (*name, samples(8, *color))),
            None,
        )
        .unwrap()
    }

    #[test]
    fn recognizes_each_face() {
        let mut frame = Image::filled(60, 30, [250, 0, 0]);
        for y in 0..30 {
            for x in 30..60 {
                frame.set(x, y, [0, 0, 250]);
            }
        }

        let gallery = gallery(&[("red", [255, 0, 0]), ("blue", [0, 0, 255])]);
        let mut recognizer = Recognizer::new(gallery, Knn::new(3), SampleExtractor::new(0, 8));
        let faces = [
            Rect::from_top_left(35, 5, 20, 20),
            Rect::from_top_left(5, 5, 20, 20),
        ];
        let results = recognizer.recognize(&frame, &faces).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!((results[0].person, results[0].name.as_str()), (1, "blue"));
        assert_eq!((results[1].person, results[1].name.as_str()), (0, "red"));
        assert_eq!(results[0].rect, faces[0]);
    }

    #[test]
    fn stale_set_does_not_hide_current_ones() {
        let extractor = SampleExtractor::new(0, 8);
        let gallery = Gallery::from_sets(
            [
                ("aaron", samples(4, [255, 0, 0])),
                ("bob", samples(8, [0, 255, 0])),
                ("carol", samples(8, [0, 0, 255])),
            ],
            Some(extractor.dim()),
        )
        .unwrap();
        assert_eq!(gallery.names().len(), 2);

        let frame = Image::filled(20, 20, [0, 0, 240]);
        let mut recognizer = Recognizer::new(gallery, Knn::new(3), extractor);
        let results = recognizer
            .recognize(&frame, &[Rect::from_top_left(2, 2, 16, 16)])
            .unwrap();
        assert_eq!((results[0].person, results[0].name.as_str()), (1, "carol"));
    }

    #[test]
    fn empty_crops_are_skipped() {
        let frame = Image::filled(20, 20, [0, 0, 0]);
        let mut recognizer = Recognizer::new(
            gallery(&[("only", [0, 0, 0])]),
            Knn::new(1),
            SampleExtractor::new(0, 8),
        );
        let results = recognizer
            .recognize(
                &frame,
                &[
                    Rect::from_top_left(-40, -40, 10, 10),
                    Rect::from_top_left(2, 2, 10, 10),
                ],
            )
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "only");
    }

    #[test]
    fn sample_size_mismatch() {
        let frame = Image::filled(20, 20, [0, 0, 0]);
        let mut recognizer = Recognizer::new(
            gallery(&[("only", [0, 0, 0])]),
            Knn::new(1),
            SampleExtractor::new(0, 4),
        );
        assert!(matches!(
            recognizer.recognize(&frame, &[Rect::from_top_left(0, 0, 10, 10)]),
            Err(Error::DimensionMismatch {
                expected: 192,
                found: 48
            })
        ));
    }
}
