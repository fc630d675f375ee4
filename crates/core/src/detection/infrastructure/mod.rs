pub mod analyzer_factory;
pub mod haar_cascade_detector;
pub mod hough_circle_detector;
pub mod mat_conversion;
