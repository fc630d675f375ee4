use crate::shared::frame::Frame;

/// Compresses a frame into a transport format.
pub trait FrameEncoder: Send + Sync {
    fn encode(&self, frame: &Frame) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>>;

    /// MIME type of the encoded bytes.
    fn content_type(&self) -> &'static str;
}
