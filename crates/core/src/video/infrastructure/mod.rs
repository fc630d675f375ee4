pub mod image_sequence_source;
pub mod jpeg_encoder;
pub mod opencv_camera;
