use image::{Rgb, Rgba};

use super::*;
use crate::test;

const RED: [u8; 3] = [255, 0, 0];
const GREEN: [u8; 3] = [0, 255, 0];

fn mkimage<const W: usize, const H: usize>(data: [[[u8; 3]; W]; H]) -> Image {
    let mut image = Image::new(W as u32, H as u32);
    for (y, row) in data.iter().enumerate() {
        for (x, color) in row.iter().enumerate() {
            image.set(x as u32, y as u32, *color);
        }
    }
    image
}

fn transparent(width: u32, height: u32, color: [u8; 4]) -> Overlay {
    Overlay::Transparent(RgbaImage::from_pixel(width, height, Rgba(color)))
}

#[test]
fn crop() {
    let image = mkimage([[RED, GREEN]]);

    let crop = image.crop(&Rect::from_top_left(1, 0, 1, 1)).unwrap();
    assert_eq!((crop.width(), crop.height()), (1, 1));
    assert_eq!(crop.get(0, 0), GREEN);

    // Clamped to the image.
    let crop = image.crop(&Rect::from_corners((1, -5), (99, 99))).unwrap();
    assert_eq!((crop.width(), crop.height()), (1, 1));
    assert_eq!(crop.get(0, 0), GREEN);

    assert!(image.crop(&Rect::from_top_left(2, 0, 5, 5)).is_none());
    assert!(image.crop(&Rect::from_top_left(-5, -5, 5, 5)).is_none());
}

#[test]
fn resize_stretches() {
    let image = test::gradient(30, 10);
    let resized = image.resize(16, 16);
    assert_eq!((resized.width(), resized.height()), (16, 16));
    assert_eq!(resized.data().len(), 16 * 16 * 3);
}

#[test]
fn opaque_overlay_overwrites() {
    let mut image = mkimage([[RED, RED]]);
    let overlay = Overlay::from(mkimage([[GREEN]]));
    assert_eq!(overlay.blend_mode(), BlendMode::Overwrite);

    let written = image.composite(&overlay, 1, 0);
    assert_eq!(written, Some(Rect::from_top_left(1, 0, 1, 1)));
    assert_eq!(image.get(0, 0), RED);
    assert_eq!(image.get(1, 0), GREEN);
}

#[test]
fn transparent_overlay_blends() {
    let mut image = mkimage([[RED]]);
    image.composite(&transparent(1, 1, [0, 255, 0, 0]), 0, 0);
    assert_eq!(image.get(0, 0), RED); // no change

    let mut image = mkimage([[[100, 100, 100]]]);
    image.composite(&transparent(1, 1, [200, 0, 100, 255]), 0, 0);
    assert_eq!(image.get(0, 0), [200, 0, 100]);
}

#[test]
fn off_canvas_is_noop() {
    let original = test::gradient(40, 30);
    let overlay = transparent(10, 10, [1, 2, 3, 255]);

    for (x, y) in [(-10, 0), (0, -10), (40, 0), (0, 30), (-100, -100), (500, 500)] {
        let mut image = original.clone();
        assert_eq!(image.composite(&overlay, x, y), None, "({x},{y})");
        assert!(image == original, "({x},{y}) modified the background");
    }
}

#[test]
fn top_left_region_only() {
    let original = test::gradient(40, 30);
    let mut image = original.clone();
    let written = image.composite(&transparent(8, 5, [7, 7, 7, 255]), 0, 0);
    assert_eq!(written, Some(Rect::from_top_left(0, 0, 8, 5)));

    for y in 0..image.height() {
        for x in 0..image.width() {
            if x < 8 && y < 5 {
                assert_eq!(image.get(x, y), [7, 7, 7]);
            } else {
                assert_eq!(image.get(x, y), original.get(x, y), "({x},{y})");
            }
        }
    }
}

#[test]
fn partial_placement_is_clipped() {
    let original = Image::filled(10, 10, [0, 0, 0]);
    // Overlay whose pixel value encodes its own coordinate, to check which part got copied.
    let mut buf = RgbImage::new(4, 4);
    for (x, y, pix) in buf.enumerate_pixels_mut() {
        *pix = Rgb([x as u8 + 1, y as u8 + 1, 9]);
    }
    let overlay = Overlay::Opaque(buf);

    let mut image = original.clone();
    let written = image.composite(&overlay, -2, 8).unwrap();
    assert_eq!(written, Rect::from_top_left(0, 8, 2, 2));
    assert_eq!(image.get(0, 8), [3, 1, 9]);
    assert_eq!(image.get(1, 9), [4, 2, 9]);
    assert_eq!(image.get(2, 8), [0, 0, 0]);
    assert_eq!(image.get(0, 7), [0, 0, 0]);

    let mut image = original.clone();
    let written = image.composite(&overlay, 8, -3).unwrap();
    assert_eq!(written, Rect::from_top_left(8, 0, 2, 1));
    assert_eq!(image.get(8, 0), [1, 4, 9]);
    assert_eq!(image.get(9, 0), [2, 4, 9]);
    assert_eq!(image.get(8, 1), [0, 0, 0]);
}

#[test]
fn larger_than_background() {
    let mut image = Image::filled(3, 2, [0, 0, 0]);
    let written = image.composite(&transparent(10, 10, [5, 6, 7, 255]), -4, -4);
    assert_eq!(written, Some(image.rect()));
    assert!(image.data().chunks(3).all(|pix| pix == [5, 6, 7]));
}

#[test]
fn opaque_alpha_reproduces_raw_colors() {
    let mut rng = fastrand::Rng::with_seed(7);
    let mut buf = RgbaImage::new(50, 50);
    for pix in buf.pixels_mut() {
        *pix = Rgba([rng.u8(..), rng.u8(..), rng.u8(..), 255]);
    }
    let overlay = Overlay::Transparent(buf.clone());
    let background = test::gradient(120, 90);

    for (x, y) in [(0, 0), (70, 40), (33, 17)] {
        let mut image = background.clone();
        image.composite(&overlay, x, y).unwrap();
        for (ox, oy, pix) in buf.enumerate_pixels() {
            let [r, g, b, _] = pix.0;
            assert_eq!(image.get(x as u32 + ox, y as u32 + oy), [r, g, b]);
        }
    }
}

#[test]
fn overlay_resize_keeps_alpha() {
    let overlay = transparent(4, 2, [1, 2, 3, 128]).resize(9, 7);
    assert!(overlay.has_alpha());
    assert_eq!((overlay.width(), overlay.height()), (9, 7));
}

#[test]
fn image_format_from_path() {
    assert!(is_supported_path("a/b.PNG".as_ref()));
    assert!(is_supported_path("frame.jpeg".as_ref()));
    assert!(!is_supported_path("samples.npy".as_ref()));
    assert!(!is_supported_path("noext".as_ref()));
}

#[test]
fn save_and_load_png() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame.png");
    let image = test::gradient(12, 9);
    image.save(&path).unwrap();

    assert!(Image::load(&path).unwrap() == image);
    assert!(!Overlay::load(&path).unwrap().has_alpha());
    assert!(matches!(
        image.save(dir.path().join("frame.bmp")),
        Err(Error::UnsupportedImageFormat(_))
    ));
}
