use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Domain interface for eye detection over a full intensity frame.
pub trait EyeDetector: Send {
    fn detect(&mut self, gray: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>>;
}
