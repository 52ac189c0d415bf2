//! Frame sources for the enrollment and recognition loops.

use std::{
    collections::VecDeque,
    fs,
    path::{Path, PathBuf},
};

use itertools::Itertools;

use crate::image::{self, Image};
use crate::{Error, Result};

/// A source of video frames.
pub trait FrameSource {
    /// Returns the next frame, or `None` once the source is exhausted.
    fn read(&mut self) -> Result<Option<Image>>;
}

/// Plays back the image files of a directory as a video, in file name order.
///
/// Files without a supported image extension are ignored. Frames that fail to decode are skipped
/// with a warning.
pub struct ImageSequence {
    paths: VecDeque<PathBuf>,
}

impl ImageSequence {
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(Error::FrameDirMissing(dir.to_path_buf()));
        }

        let paths = fs::read_dir(dir)?
            .map(|entry| entry.map(|entry| entry.path()))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .filter(|path| path.is_file() && image::is_supported_path(path))
            .sorted()
            .collect::<VecDeque<_>>();
        log::info!("{} frame(s) in '{}'", paths.len(), dir.display());

        Ok(Self { paths })
    }
}

impl FrameSource for ImageSequence {
    fn read(&mut self) -> Result<Option<Image>> {
        while let Some(path) = self.paths.pop_front() {
            match Image::load(&path) {
                Ok(frame) => {
                    log::trace!("frame '{}'", path.display());
                    return Ok(Some(frame));
                }
                Err(e) => log::warn!("skipping frame '{}': {}", path.display(), e),
            }
        }
        Ok(None)
    }
}

impl Iterator for ImageSequence {
    type Item = Image;

    fn next(&mut self) -> Option<Image> {
        self.read().ok().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test;

    #[test]
    fn plays_frames_in_order() {
        let dir = tempfile::tempdir().unwrap();
        test::gradient(8, 6).save(dir.path().join("002.png")).unwrap();
        Image::filled(4, 4, [9, 9, 9])
            .save(dir.path().join("001.png"))
            .unwrap();
        fs::write(dir.path().join("003.png"), b"not an image").unwrap();
        fs::write(dir.path().join("readme.txt"), b"ignored").unwrap();
        Image::filled(2, 2, [0, 0, 0])
            .save(dir.path().join("004.PNG"))
            .unwrap();

        let mut frames = ImageSequence::open(dir.path()).unwrap();
        assert_eq!(frames.read().unwrap().unwrap().width(), 4);
        assert_eq!(frames.read().unwrap().unwrap().width(), 8);
        // 003.png is broken and skipped.
        assert_eq!(frames.read().unwrap().unwrap().width(), 2);
        assert!(frames.read().unwrap().is_none());
        assert!(frames.read().unwrap().is_none());
    }

    #[test]
    fn missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("frames");
        assert!(matches!(
            ImageSequence::open(&missing),
            Err(Error::FrameDirMissing(path)) if path == missing
        ));
    }

    #[test]
    fn iterates() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..3 {
            Image::new(3, 3)
                .save(dir.path().join(format!("{i}.jpg")))
                .unwrap();
        }
        assert_eq!(ImageSequence::open(dir.path()).unwrap().count(), 3);
    }
}
