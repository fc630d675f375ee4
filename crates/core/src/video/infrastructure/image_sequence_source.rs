use std::fs;
use std::path::{Path, PathBuf};

use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::frame::Frame;
use crate::video::domain::frame_source::{FrameRead, FrameSource};
use crate::video::domain::source_info::SourceInfo;

/// Replays a directory of still images as a frame stream.
///
/// Files are visited in lexicographic order. An image that fails to decode
/// is reported as a miss, not an error, so one corrupt file doesn't end
/// an offline run.
pub struct ImageSequenceSource {
    dir: PathBuf,
    paths: Vec<PathBuf>,
    cursor: usize,
    opened: bool,
}

impl ImageSequenceSource {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            paths: Vec::new(),
            cursor: 0,
            opened: false,
        }
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn load_rgb(path: &Path, index: usize) -> Result<Frame, image::ImageError> {
    let rgb = image::open(path)?.to_rgb8();
    let (width, height) = rgb.dimensions();
    Ok(Frame::new(rgb.into_raw(), width, height, 3, index))
}

impl FrameSource for ImageSequenceSource {
    fn open(&mut self) -> Result<SourceInfo, Box<dyn std::error::Error>> {
        let mut paths: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && is_image(p))
            .collect();
        paths.sort();
        if paths.is_empty() {
            return Err(format!("No images found in {}", self.dir.display()).into());
        }

        let (width, height) = image::image_dimensions(&paths[0])?;
        self.paths = paths;
        self.cursor = 0;
        self.opened = true;

        Ok(SourceInfo {
            width,
            height,
            fps: 0.0,
            description: format!("{} ({} images)", self.dir.display(), self.paths.len()),
        })
    }

    fn next_frame(&mut self) -> Result<FrameRead, Box<dyn std::error::Error>> {
        if !self.opened {
            return Err("ImageSequenceSource: not opened".into());
        }
        let Some(path) = self.paths.get(self.cursor) else {
            return Ok(FrameRead::Exhausted);
        };
        let index = self.cursor;
        self.cursor += 1;

        match load_rgb(path, index) {
            Ok(frame) => Ok(FrameRead::Frame(frame)),
            Err(e) => {
                log::warn!("Skipping {}: {e}", path.display());
                Ok(FrameRead::Missed)
            }
        }
    }

    fn close(&mut self) {
        self.paths.clear();
        self.cursor = 0;
        self.opened = false;
    }
}
