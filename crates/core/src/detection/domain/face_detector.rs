use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Domain interface for face detection.
///
/// Receives a single-channel intensity frame and returns face bounding boxes
/// in that frame's coordinates. Implementations may cache native resources,
/// hence `&mut self`.
pub trait FaceDetector: Send {
    fn detect(&mut self, gray: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>>;
}
