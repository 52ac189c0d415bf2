//! Collects face samples of one person from a directory of video frames.

use std::{fs, path::PathBuf, process};

use anyhow::Context;
use clap::Parser;
use facegallery::config::SettingsArgs;
use facegallery::dataset::save_sample_set;
use facegallery::detector::{Detector, RustfaceDetector};
use facegallery::enroll::Enrollment;
use facegallery::timer::{FpsCounter, Timer};
use facegallery::video::{FrameSource, ImageSequence};

#[derive(Parser, Debug)]
#[command(name = "enroll", about = "Collect face samples of a person")]
struct Args {
    /// Name of the person in front of the camera
    #[arg(env = "FACEGALLERY_NAME", value_parser = parse_name)]
    name: String,

    /// Directory of video frames (jpg or png, played back in file name order)
    #[arg(long, env = "FACEGALLERY_FRAMES")]
    frames: PathBuf,

    #[command(flatten)]
    settings: SettingsArgs,
}

/// The name becomes a file name in the dataset directory.
fn parse_name(s: &str) -> Result<String, String> {
    let name = s.trim();
    if name.is_empty() {
        return Err("name must not be empty".to_string());
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(format!("'{name}' is not a valid file name"));
    }
    Ok(name.to_string())
}

fn main() -> anyhow::Result<()> {
    facegallery::init_logger!();
    let args = Args::parse();
    let settings = args.settings.settings();

    let detector = match RustfaceDetector::load(&args.settings.model) {
        Ok(detector) => detector,
        Err(e) => fatal(e, "download the SeetaFace model or pass its location with `--model`"),
    };
    let mut frames = match ImageSequence::open(&args.frames) {
        Ok(frames) => frames,
        Err(e) => fatal(e, "pass a directory of video frames with `--frames`"),
    };

    let mut session = Enrollment::new(settings.extractor(), settings.decimator());
    let mut detect = Timer::new("detect");
    let mut fps = FpsCounter::new("enroll");
    while let Some(frame) = frames.read()? {
        let faces = detect.time(|| detector.detect(&frame, &settings.detection));
        log::trace!("faces: {faces:?}");
        session.process(&frame, &faces);
        fps.tick_with([&detect]);
    }

    log::info!("collected {} sample(s) of '{}'", session.len(), args.name);
    let Some(samples) = session.into_sample_set() else {
        println!("No data collected");
        return Ok(());
    };

    fs::create_dir_all(&args.settings.dataset).with_context(|| {
        format!(
            "failed to create dataset directory '{}'",
            args.settings.dataset.display()
        )
    })?;
    let path = save_sample_set(&args.settings.dataset, &args.name, &samples)
        .context("failed to save samples")?;
    println!("Saved {:?} samples to {}", samples.dim(), path.display());
    Ok(())
}

fn fatal(error: facegallery::Error, hint: &str) -> ! {
    log::error!("{error}");
    eprintln!("error: {error}");
    eprintln!("hint: {hint}");
    process::exit(1);
}
