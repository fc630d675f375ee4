use std::path::Path;

use crate::detection::domain::frame_analyzer::{FrameAnalyzer, ScanPolicy};
use crate::shared::cascade_resolver::{self, ProgressFn};
use crate::shared::constants::{EYE_CASCADE_NAME, FACE_CASCADE_NAME};

use super::haar_cascade_detector::{CascadeParams, HaarCascadeDetector};
use super::hough_circle_detector::HoughCircleDetector;

/// Builds the OpenCV-backed analyzer.
///
/// Resolves both Haar cascades (cache, then `cascade_dir`, then download)
/// and loads them. Fails if either cascade cannot be obtained or parsed.
pub fn create_analyzer(
    cascade_dir: Option<&Path>,
    scan_policy: ScanPolicy,
    progress: Option<fn(u64, u64)>,
) -> Result<FrameAnalyzer, Box<dyn std::error::Error>> {
    let to_progress = || progress.map(|f| Box::new(f) as ProgressFn);

    let face_path = cascade_resolver::resolve(FACE_CASCADE_NAME, cascade_dir, to_progress())?;
    let eye_path = cascade_resolver::resolve(EYE_CASCADE_NAME, cascade_dir, to_progress())?;
    log::info!(
        "Loaded cascades {} and {}",
        face_path.display(),
        eye_path.display()
    );

    let face = HaarCascadeDetector::new(&face_path, CascadeParams::face())?;
    let eye = HaarCascadeDetector::new(&eye_path, CascadeParams::eye())?;
    log::info!("Circle scan policy: {scan_policy}");

    Ok(FrameAnalyzer::new(
        Box::new(face),
        Box::new(eye),
        Box::new(HoughCircleDetector::default()),
        scan_policy,
    ))
}
