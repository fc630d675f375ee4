pub mod blink_tracker;
pub mod circle_detector;
pub mod detection_state;
pub mod eye_detector;
pub mod face_detector;
pub mod frame_analyzer;
