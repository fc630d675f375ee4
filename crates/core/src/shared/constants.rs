pub const FACE_CASCADE_NAME: &str = "haarcascade_frontalface_default.xml";
pub const EYE_CASCADE_NAME: &str = "haarcascade_righteye_2splits.xml";
pub const CASCADE_BASE_URL: &str =
    "https://raw.githubusercontent.com/opencv/opencv/4.x/data/haarcascades/";

pub const FACE_SCALE_FACTOR: f64 = 1.1;
pub const FACE_MIN_NEIGHBORS: i32 = 5;
pub const FACE_MIN_SIZE: (i32, i32) = (30, 30);

/// OpenCV's `detectMultiScale` defaults, used for eyes.
pub const EYE_SCALE_FACTOR: f64 = 1.1;
pub const EYE_MIN_NEIGHBORS: i32 = 3;
pub const EYE_MIN_SIZE: (i32, i32) = (0, 0);

/// Hough gradient parameters. `param2 = 1` is a deliberately permissive
/// accumulator threshold so any roughly circular structure in an eye counts.
pub const HOUGH_DP: f64 = 1.0;
pub const HOUGH_MIN_DIST: f64 = 200.0;
pub const HOUGH_PARAM1: f64 = 200.0;
pub const HOUGH_PARAM2: f64 = 1.0;
pub const HOUGH_MIN_RADIUS: i32 = 0;
pub const HOUGH_MAX_RADIUS: i32 = 0;

/// JPEG quality of single-frame snapshots.
pub const SNAPSHOT_JPEG_QUALITY: u8 = 75;
/// JPEG quality of MJPEG stream parts (OpenCV's `imencode` default).
pub const STREAM_JPEG_QUALITY: u8 = 95;
/// Stream cadence when reading the latest-frame slot (~30 fps).
pub const DEFAULT_STREAM_INTERVAL_MS: u64 = 33;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
