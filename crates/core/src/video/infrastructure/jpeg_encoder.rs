use image::codecs::jpeg::JpegEncoder as ImageJpegEncoder;
use image::ExtendedColorType;
use thiserror::Error;

use crate::shared::frame::Frame;
use crate::video::domain::frame_encoder::FrameEncoder;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("cannot encode an empty frame")]
    EmptyFrame,
    #[error("unsupported channel count for JPEG: {0}")]
    Channels(u8),
    #[error("JPEG encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Baseline JPEG encoder with a fixed quality (1-100).
#[derive(Clone, Copy, Debug)]
pub struct JpegEncoder {
    quality: u8,
}

impl JpegEncoder {
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    pub fn encode_frame(&self, frame: &Frame) -> Result<Vec<u8>, EncodeError> {
        if frame.is_empty() {
            return Err(EncodeError::EmptyFrame);
        }
        let color = match frame.channels() {
            1 => ExtendedColorType::L8,
            3 => ExtendedColorType::Rgb8,
            other => return Err(EncodeError::Channels(other)),
        };
        let mut out = Vec::new();
        ImageJpegEncoder::new_with_quality(&mut out, self.quality).encode(
            frame.data(),
            frame.width(),
            frame.height(),
            color,
        )?;
        Ok(out)
    }
}

impl FrameEncoder for JpegEncoder {
    fn encode(&self, frame: &Frame) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.encode_frame(frame)?)
    }

    fn content_type(&self) -> &'static str {
        "image/jpeg"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn rgb_frame(w: u32, h: u32) -> Frame {
        Frame::new(vec![128; (w * h * 3) as usize], w, h, 3, 0)
    }

    #[test]
    fn test_output_is_jpeg() {
        let bytes = JpegEncoder::new(75).encode_frame(&rgb_frame(16, 8)).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        assert_eq!(&bytes[bytes.len() - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_output_decodes_to_same_size() {
        let bytes = JpegEncoder::new(95).encode_frame(&rgb_frame(20, 10)).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (20, 10));
    }

    #[test]
    fn test_grayscale_frame_encodes() {
        let frame = Frame::new(vec![50; 64], 8, 8, 1, 0);
        assert!(JpegEncoder::new(75).encode_frame(&frame).is_ok());
    }

    #[test]
    fn test_empty_frame_is_rejected() {
        let frame = Frame::new(Vec::new(), 0, 0, 3, 0);
        assert!(matches!(
            JpegEncoder::new(75).encode_frame(&frame),
            Err(EncodeError::EmptyFrame)
        ));
    }

    #[test]
    fn test_rgba_is_rejected() {
        let frame = Frame::new(vec![0; 16], 2, 2, 4, 0);
        assert!(matches!(
            JpegEncoder::new(75).encode_frame(&frame),
            Err(EncodeError::Channels(4))
        ));
    }

    #[rstest]
    #[case(0, 1)]
    #[case(75, 75)]
    #[case(200, 100)]
    fn test_quality_is_clamped(#[case] requested: u8, #[case] expected: u8) {
        assert_eq!(JpegEncoder::new(requested).quality(), expected);
    }

    #[test]
    fn test_content_type() {
        assert_eq!(JpegEncoder::new(75).content_type(), "image/jpeg");
    }
}
