//! Default settings shared by the enrollment, recognition and overlay tools.
//!
//! Every value can be overridden on the command line or through the `FACEGALLERY_*` environment
//! variable named in the binaries' `--help` output.

use std::path::PathBuf;

use clap::Args;

use crate::detector::DetectParams;
use crate::knn::Knn;
use crate::sample::{Decimator, SampleExtractor};

/// Side length of face samples, in pixels.
pub const FACE_SIZE: u32 = 100;

/// Margin added around detected faces before cropping, in pixels.
pub const FACE_PADDING: u32 = 10;

/// Number of neighbors voting in the [`Knn`] classifier.
pub const K_NEIGHBORS: usize = 5;

/// Enrollment keeps one detection out of this many.
pub const SAMPLE_EVERY: u32 = 10;

/// Face detection parameters for the live enrollment and recognition loops.
pub const LIVE_FACE_DETECTION: DetectParams = DetectParams {
    scale_factor: 1.3,
    min_neighbors: 5,
    min_size: None,
};

/// Face detection parameters for still images in the overlay tool.
pub const STILL_FACE_DETECTION: DetectParams = DetectParams {
    scale_factor: 1.1,
    min_neighbors: 5,
    min_size: Some(30),
};

/// Eye and nose detection parameters within a face region.
pub const LANDMARK_DETECTION: DetectParams = DetectParams {
    scale_factor: 1.1,
    min_neighbors: 3,
    min_size: None,
};

/// Directory holding one `.npy` sample file per enrolled person.
pub const DATASET_DIR: &str = "face_dataset";

/// SeetaFace face detection model.
pub const DETECTOR_MODEL: &str = "seeta_fd_frontal_v1.0.bin";

/// Recognition pipeline settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub face_size: u32,
    pub face_padding: u32,
    pub k: usize,
    pub sample_every: u32,
    pub detection: DetectParams,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            face_size: FACE_SIZE,
            face_padding: FACE_PADDING,
            k: K_NEIGHBORS,
            sample_every: SAMPLE_EVERY,
            detection: LIVE_FACE_DETECTION,
        }
    }
}

impl Settings {
    pub fn extractor(&self) -> SampleExtractor {
        SampleExtractor::new(self.face_padding, self.face_size)
    }

    pub fn decimator(&self) -> Decimator {
        Decimator::new(self.sample_every)
    }

    pub fn classifier(&self) -> Knn {
        Knn::new(self.k)
    }
}

/// Command-line arguments shared by the enrollment and recognition tools.
#[derive(Debug, Clone, Args)]
pub struct SettingsArgs {
    /// Directory of per-person sample files
    #[arg(long, env = "FACEGALLERY_DATASET", default_value = DATASET_DIR)]
    pub dataset: PathBuf,

    /// SeetaFace face detector model
    #[arg(long, env = "FACEGALLERY_MODEL", default_value = DETECTOR_MODEL)]
    pub model: PathBuf,

    /// Side length of face samples, in pixels
    #[arg(long, env = "FACEGALLERY_FACE_SIZE", default_value_t = FACE_SIZE,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub face_size: u32,

    /// Margin added around detected faces, in pixels
    #[arg(long, env = "FACEGALLERY_FACE_PADDING", default_value_t = FACE_PADDING)]
    pub face_padding: u32,

    /// Number of voting neighbors
    #[arg(short, long, env = "FACEGALLERY_K", default_value_t = K_NEIGHBORS,
          value_parser = parse_positive)]
    pub k: usize,

    /// Keep one sample out of this many detections
    #[arg(long, env = "FACEGALLERY_SAMPLE_EVERY", default_value_t = SAMPLE_EVERY,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub sample_every: u32,

    /// Face detector pyramid scale factor
    #[arg(long, env = "FACEGALLERY_SCALE_FACTOR", default_value_t = LIVE_FACE_DETECTION.scale_factor)]
    pub scale_factor: f32,

    /// Smallest detected face, in pixels
    #[arg(long, env = "FACEGALLERY_MIN_FACE")]
    pub min_face: Option<u32>,
}

fn parse_positive(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

impl SettingsArgs {
    pub fn settings(&self) -> Settings {
        Settings {
            face_size: self.face_size,
            face_padding: self.face_padding,
            k: self.k,
            sample_every: self.sample_every,
            detection: DetectParams {
                scale_factor: self.scale_factor,
                min_size: self.min_face,
                ..LIVE_FACE_DETECTION
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        settings: SettingsArgs,
    }

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert_eq!(settings.extractor().dim(), 30_000);
        assert_eq!(settings.classifier().k(), 5);
        assert_eq!(settings.detection, LIVE_FACE_DETECTION);
    }

    #[test]
    fn command_line_overrides() {
        let cli = Cli::try_parse_from(["test", "--face-size", "64", "-k", "3", "--min-face", "40"])
            .unwrap();
        let settings = cli.settings.settings();
        assert_eq!(settings.extractor().dim(), 64 * 64 * 3);
        assert_eq!(settings.k, 3);
        assert_eq!(settings.detection.min_size, Some(40));
        assert_eq!(settings.face_padding, FACE_PADDING);
        assert_eq!(cli.settings.dataset, PathBuf::from(DATASET_DIR));

        assert!(Cli::try_parse_from(["test", "-k", "0"]).is_err());
        assert!(Cli::try_parse_from(["test", "--sample-every", "0"]).is_err());
    }
}
