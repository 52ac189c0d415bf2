//! Puts sunglasses and a moustache on every face in a picture.

use std::{path::PathBuf, process};

use anyhow::Context;
use clap::Parser;
use facegallery::config::{DETECTOR_MODEL, STILL_FACE_DETECTION};
use facegallery::detector::{DetectParams, FaceGeometry, RustfaceDetector};
use facegallery::image::Image;
use facegallery::overlay::{save_records, FilterPipeline, Templates};

#[derive(Parser, Debug)]
#[command(name = "snap", about = "Apply sunglasses and moustache filters to a picture")]
struct Args {
    /// Input picture
    #[arg(env = "FACEGALLERY_INPUT", default_value = "test_image.jpg")]
    input: PathBuf,

    /// Where to write the filtered picture
    #[arg(short, long, env = "FACEGALLERY_OUTPUT", default_value = "output_filtered.jpg")]
    output: PathBuf,

    /// Where to write the applied overlay positions
    #[arg(long, env = "FACEGALLERY_CSV", default_value = "output.csv")]
    csv: PathBuf,

    #[arg(
        long,
        env = "FACEGALLERY_SUNGLASSES",
        default_value = "templates/sunglasses_template.png"
    )]
    sunglasses: PathBuf,

    #[arg(
        long,
        env = "FACEGALLERY_MOUSTACHE",
        default_value = "templates/moustache_template.png"
    )]
    moustache: PathBuf,

    /// SeetaFace face detector model
    #[arg(long, env = "FACEGALLERY_MODEL", default_value = DETECTOR_MODEL)]
    model: PathBuf,

    /// Face detector pyramid scale factor
    #[arg(long, env = "FACEGALLERY_SCALE_FACTOR", default_value_t = STILL_FACE_DETECTION.scale_factor)]
    scale_factor: f32,

    /// Smallest detected face, in pixels
    #[arg(long, env = "FACEGALLERY_MIN_FACE", default_value_t = 30)]
    min_face: u32,
}

fn main() -> anyhow::Result<()> {
    facegallery::init_logger!();
    let args = Args::parse();

    let mut image = match Image::load(&args.input) {
        Ok(image) => image,
        Err(e) => fatal(e, "provide the path of a jpg or png picture"),
    };
    log::info!("loaded {image:?} from '{}'", args.input.display());

    let faces = match RustfaceDetector::load(&args.model) {
        Ok(detector) => detector,
        Err(e) => fatal(e, "download the SeetaFace model or pass its location with `--model`"),
    };
    let templates = Templates::load(&args.sunglasses, &args.moustache);

    let pipeline = FilterPipeline::new(faces, FaceGeometry::eyes(), FaceGeometry::nose())
        .with_face_params(DetectParams {
            scale_factor: args.scale_factor,
            min_size: Some(args.min_face),
            ..STILL_FACE_DETECTION
        });
    let records = pipeline.apply(&mut image, &templates);
    println!("Applied {} filter(s)", records.len());

    if save_records(&args.csv, &records)
        .with_context(|| format!("failed to write '{}'", args.csv.display()))?
    {
        println!("Overlay positions saved to {}", args.csv.display());
    } else {
        println!("No filters applied, {} not created", args.csv.display());
    }

    match image.save(&args.output) {
        Ok(()) => println!("Filtered picture saved to {}", args.output.display()),
        Err(e) => log::warn!("could not save '{}': {e}", args.output.display()),
    }
    Ok(())
}

fn fatal(error: facegallery::Error, hint: &str) -> ! {
    log::error!("{error}");
    eprintln!("error: {error}");
    eprintln!("hint: {hint}");
    process::exit(1);
}
