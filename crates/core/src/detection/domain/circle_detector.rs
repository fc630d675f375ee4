use crate::shared::circle::Circle;
use crate::shared::frame::Frame;

/// Domain interface for circle finding inside a cropped intensity image.
///
/// Circles are returned in the crop's coordinates.
pub trait CircleDetector: Send {
    fn detect(&mut self, gray: &Frame) -> Result<Vec<Circle>, Box<dyn std::error::Error>>;
}
