//! Identifies enrolled persons in a directory of video frames.

use std::{fs, path::PathBuf, process};

use anyhow::Context;
use clap::Parser;
use facegallery::config::SettingsArgs;
use facegallery::dataset::Gallery;
use facegallery::detector::{Detector, RustfaceDetector};
use facegallery::image::{draw_label, draw_rect};
use facegallery::recognize::Recognizer;
use facegallery::video::{FrameSource, ImageSequence};
use facegallery::Error;

#[derive(Parser, Debug)]
#[command(name = "recognize", about = "Identify enrolled persons")]
struct Args {
    /// Directory of video frames (jpg or png, played back in file name order)
    #[arg(long, env = "FACEGALLERY_FRAMES")]
    frames: PathBuf,

    /// Write frames annotated with the recognized names to this directory
    #[arg(long, env = "FACEGALLERY_ANNOTATE")]
    annotate: Option<PathBuf>,

    #[command(flatten)]
    settings: SettingsArgs,
}

fn main() -> anyhow::Result<()> {
    facegallery::init_logger!();
    let args = Args::parse();
    let settings = args.settings.settings();

    let gallery = match Gallery::load(&args.settings.dataset, Some(settings.extractor().dim())) {
        Ok(gallery) => gallery,
        Err(e @ (Error::NoTrainingData | Error::DatasetDirMissing(_))) => fatal(
            e,
            "run `enroll` first, with the same `--face-size` as this session",
        ),
        Err(e) => return Err(e).context("failed to load the gallery"),
    };
    let names = gallery
        .names()
        .iter()
        .map(|(_, name)| name)
        .collect::<Vec<_>>();
    log::info!(
        "training set {:?}, {} person(s): {}",
        gallery.matrix().shape(),
        names.len(),
        names.join(", "),
    );

    let detector = match RustfaceDetector::load(&args.settings.model) {
        Ok(detector) => detector,
        Err(e) => fatal(e, "download the SeetaFace model or pass its location with `--model`"),
    };
    let mut frames = match ImageSequence::open(&args.frames) {
        Ok(frames) => frames,
        Err(e) => fatal(e, "pass a directory of video frames with `--frames`"),
    };
    if let Some(dir) = &args.annotate {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create '{}'", dir.display()))?;
    }

    let mut recognizer = Recognizer::new(gallery, settings.classifier(), settings.extractor());
    let mut index = 0;
    while let Some(mut frame) = frames.read()? {
        let faces = detector.detect(&frame, &settings.detection);
        let results = match recognizer.recognize(&frame, &faces) {
            Ok(results) => results,
            Err(e @ Error::DimensionMismatch { .. }) => {
                fatal(e, "re-enroll with the current `--face-size`")
            }
            Err(e) => return Err(e.into()),
        };
        for result in &results {
            let rect = result.rect;
            println!(
                "{index}\t{}\t{} {} {} {}",
                result.name,
                rect.x(),
                rect.y(),
                rect.width(),
                rect.height()
            );
        }

        if let Some(dir) = &args.annotate {
            for result in &results {
                draw_rect(&mut frame, result.rect);
                draw_label(&mut frame, result.rect.x(), result.rect.y() - 10, &result.name);
            }
            let path = dir.join(format!("{index:05}.png"));
            frame
                .save(&path)
                .with_context(|| format!("failed to write '{}'", path.display()))?;
        }
        index += 1;
    }

    log::info!("processed {index} frame(s)");
    Ok(())
}

fn fatal(error: Error, hint: &str) -> ! {
    log::error!("{error}");
    eprintln!("error: {error}");
    eprintln!("hint: {hint}");
    process::exit(1);
}
