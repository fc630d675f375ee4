use std::path::{Path, PathBuf};

use opencv::core::{Rect, Size, Vector};
use opencv::objdetect::CascadeClassifier;
use opencv::prelude::*;
use thiserror::Error;

use crate::detection::domain::eye_detector::EyeDetector;
use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::constants::{
    EYE_MIN_NEIGHBORS, EYE_MIN_SIZE, EYE_SCALE_FACTOR, FACE_MIN_NEIGHBORS, FACE_MIN_SIZE,
    FACE_SCALE_FACTOR,
};
use crate::shared::frame::Frame;
use crate::shared::region::Region;

use super::mat_conversion::{gray_frame_to_mat, rect_to_region};

#[derive(Error, Debug)]
pub enum CascadeLoadError {
    #[error("failed to load cascade {path}: {source}")]
    OpenCv {
        path: PathBuf,
        #[source]
        source: opencv::Error,
    },
    #[error("cascade {0} could not be parsed")]
    Empty(PathBuf),
}

/// Sensitivity settings passed to `detectMultiScale`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CascadeParams {
    pub scale_factor: f64,
    pub min_neighbors: i32,
    pub min_size: (i32, i32),
}

impl CascadeParams {
    pub fn face() -> Self {
        Self {
            scale_factor: FACE_SCALE_FACTOR,
            min_neighbors: FACE_MIN_NEIGHBORS,
            min_size: FACE_MIN_SIZE,
        }
    }

    pub fn eye() -> Self {
        Self {
            scale_factor: EYE_SCALE_FACTOR,
            min_neighbors: EYE_MIN_NEIGHBORS,
            min_size: EYE_MIN_SIZE,
        }
    }
}

/// Haar cascade classifier backed by OpenCV's `objdetect` module.
///
/// One type serves both the face and the eye port; only the cascade file
/// and the parameters differ.
pub struct HaarCascadeDetector {
    classifier: CascadeClassifier,
    params: CascadeParams,
}

impl HaarCascadeDetector {
    pub fn new(path: &Path, params: CascadeParams) -> Result<Self, CascadeLoadError> {
        let classifier = CascadeClassifier::new(&path.to_string_lossy()).map_err(|e| {
            CascadeLoadError::OpenCv {
                path: path.to_path_buf(),
                source: e,
            }
        })?;
        if classifier.empty().unwrap_or(true) {
            return Err(CascadeLoadError::Empty(path.to_path_buf()));
        }
        Ok(Self { classifier, params })
    }

    fn detect_regions(&mut self, gray: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
        if gray.is_empty() {
            return Ok(Vec::new());
        }
        let mat = gray_frame_to_mat(gray)?;
        let mut objects = Vector::<Rect>::new();
        let (min_w, min_h) = self.params.min_size;
        self.classifier.detect_multi_scale(
            &mat,
            &mut objects,
            self.params.scale_factor,
            self.params.min_neighbors,
            0,
            Size::new(min_w, min_h),
            Size::new(0, 0),
        )?;
        Ok(objects.iter().map(|r| rect_to_region(&r)).collect())
    }
}

impl FaceDetector for HaarCascadeDetector {
    fn detect(&mut self, gray: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
        self.detect_regions(gray)
    }
}

impl EyeDetector for HaarCascadeDetector {
    fn detect(&mut self, gray: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
        self.detect_regions(gray)
    }
}
