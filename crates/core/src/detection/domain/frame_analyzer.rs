use std::fmt;
use std::str::FromStr;

use crate::detection::domain::circle_detector::CircleDetector;
use crate::detection::domain::eye_detector::EyeDetector;
use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::circle::Circle;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// How many eye regions are searched for circles per frame.
///
/// Both policies produce the same `any_circle_detected`; they differ only in
/// which circles end up in [`FrameAnalysis::circles`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScanPolicy {
    /// Stop at the first eye region that yields a circle.
    #[default]
    FirstHit,
    /// Search every eye region.
    AllEyes,
}

impl FromStr for ScanPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first" => Ok(ScanPolicy::FirstHit),
            "all" => Ok(ScanPolicy::AllEyes),
            other => Err(format!("Scan policy must be 'first' or 'all', got '{other}'")),
        }
    }
}

impl fmt::Display for ScanPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanPolicy::FirstHit => write!(f, "first"),
            ScanPolicy::AllEyes => write!(f, "all"),
        }
    }
}

/// Result of analyzing one frame.
///
/// The two booleans are the contract; the geometry (in full-frame
/// coordinates) is only used for drawing overlays.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameAnalysis {
    pub face_detected: bool,
    pub any_circle_detected: bool,
    pub faces: Vec<Region>,
    pub eyes: Vec<Region>,
    pub circles: Vec<Circle>,
}

/// Runs face, eye and per-eye circle detection on a frame.
///
/// Detector failures are absorbed: a failing detector contributes no
/// regions or circles for that frame. Callers must not pass empty frames.
pub struct FrameAnalyzer {
    face_detector: Box<dyn FaceDetector>,
    eye_detector: Box<dyn EyeDetector>,
    circle_detector: Box<dyn CircleDetector>,
    scan_policy: ScanPolicy,
}

impl FrameAnalyzer {
    pub fn new(
        face_detector: Box<dyn FaceDetector>,
        eye_detector: Box<dyn EyeDetector>,
        circle_detector: Box<dyn CircleDetector>,
        scan_policy: ScanPolicy,
    ) -> Self {
        Self {
            face_detector,
            eye_detector,
            circle_detector,
            scan_policy,
        }
    }

    pub fn analyze(&mut self, frame: &Frame) -> FrameAnalysis {
        let gray = frame.to_grayscale();

        let faces = self.face_detector.detect(&gray).unwrap_or_else(|e| {
            log::debug!("Face detection failed on frame {}: {e}", frame.index());
            Vec::new()
        });
        let eyes = self.eye_detector.detect(&gray).unwrap_or_else(|e| {
            log::debug!("Eye detection failed on frame {}: {e}", frame.index());
            Vec::new()
        });

        let mut circles = Vec::new();
        for eye in &eyes {
            let found = self.circles_in(&gray, eye);
            if found.is_empty() {
                continue;
            }
            circles.extend(found);
            if self.scan_policy == ScanPolicy::FirstHit {
                break;
            }
        }

        FrameAnalysis {
            face_detected: !faces.is_empty(),
            any_circle_detected: !circles.is_empty(),
            faces,
            eyes,
            circles,
        }
    }

    fn circles_in(&mut self, gray: &Frame, eye: &Region) -> Vec<Circle> {
        let Some(window) = eye.clamp_to(gray.width(), gray.height()) else {
            return Vec::new();
        };
        let Some(crop) = gray.crop(&window) else {
            return Vec::new();
        };

        match self.circle_detector.detect(&crop) {
            Ok(circles) => circles
                .into_iter()
                .map(|c| c.offset(window.x, window.y))
                .collect(),
            Err(e) => {
                log::debug!("Circle detection failed in eye region {window:?}: {e}");
                Vec::new()
            }
        }
    }
}
