//! Per-person face gallery and face identification.
//!
//! # Overview
//!
//! The crate covers two small pipelines:
//!
//! * **Recognition**: face crops are turned into fixed-size [`sample::FaceSample`]s, collected per
//!   person during [`enroll`]ment, assembled into a [`dataset::TrainingMatrix`] and identified
//!   with a K-nearest-neighbor [`knn::Classifier`].
//! * **Overlay filters**: eyes and noses found in a still image get sunglasses and moustache
//!   templates alpha-blended onto them (see [`overlay`] and [`image::composite`]).
//!
//! Object detection itself is abstracted behind the [`detector::Detector`] trait.
//!
//! # Coordinates
//!
//! All rectangles use pixel coordinates with the origin in the top-left corner of the image that
//! produced them. Rectangles may extend past the image bounds; every consumer clamps them.
//!
//! # Environment Variables
//!
//! * `RUST_LOG`: overrides the log filter installed by [`init_logger!`].
//! * `FACEGALLERY_*`: the binaries accept every [`config::Settings`] value as an environment
//!   variable (see their `--help` output).

pub mod config;
pub mod dataset;
pub mod detector;
pub mod enroll;
pub mod image;
pub mod knn;
pub mod overlay;
pub mod recognize;
pub mod sample;
pub mod timer;
pub mod video;

mod error;


pub use error::{Error, Result};

use log::LevelFilter;

/// macro-use only, not part of public API.
#[doc(hidden)]
pub fn init_logger(calling_crate: &'static str) {
    let log_level = if cfg!(debug_assertions) {
        LevelFilter::Trace
    } else {
        LevelFilter::Debug
    };
    env_logger::Builder::new()
        .filter(Some(calling_crate), log_level)
        .filter(Some(env!("CARGO_CRATE_NAME")), log_level)
        .filter(Some("rustface"), LevelFilter::Warn)
        .parse_default_env()
        .try_init()
        .ok();
}

/// Initializes logging to *stderr*.
///
/// If `cfg!(debug_assertions)` is enabled, the calling crate and this library will log at *trace*
/// level. Otherwise, they will log at *debug* level.
///
/// If a global logger is already registered, this macro will do nothing.
#[macro_export]
macro_rules! init_logger {
    () => {
        $crate::init_logger(env!("CARGO_CRATE_NAME"))
    };
}
