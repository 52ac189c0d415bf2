use std::{io, path::PathBuf};

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// No usable per-person sample set was found while assembling the dataset.
    #[error("no training data found")]
    NoTrainingData,

    /// A classifier was asked to classify against a training matrix without rows.
    #[error("training set is empty")]
    EmptyTrainingSet,

    #[error("feature dimension mismatch: expected {expected} values, got {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("dataset directory '{}' does not exist", .0.display())]
    DatasetDirMissing(PathBuf),

    #[error("frame directory '{}' does not exist", .0.display())]
    FrameDirMissing(PathBuf),

    #[error("invalid image path '{}' (must have one of the supported extensions)", .0.display())]
    UnsupportedImageFormat(PathBuf),

    #[error("failed to load detector model '{}': {message}", .path.display())]
    Model { path: PathBuf, message: String },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    ReadNpy(#[from] ndarray_npy::ReadNpyError),

    #[error(transparent)]
    WriteNpy(#[from] ndarray_npy::WriteNpyError),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}
