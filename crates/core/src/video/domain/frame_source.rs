use crate::shared::frame::Frame;
use crate::video::domain::source_info::SourceInfo;

/// Outcome of a single read attempt.
#[derive(Debug)]
pub enum FrameRead {
    Frame(Frame),
    /// The source is alive but produced nothing usable this time.
    Missed,
    /// No more frames will ever arrive.
    Exhausted,
}

/// A live or recorded stream of RGB frames.
///
/// Frames are pulled one at a time so the caller decides the cadence.
/// Implementations handle device and decoding details.
pub trait FrameSource: Send {
    /// Opens the underlying device or sequence and returns its properties.
    fn open(&mut self) -> Result<SourceInfo, Box<dyn std::error::Error>>;

    /// Blocks until the next frame is available.
    fn next_frame(&mut self) -> Result<FrameRead, Box<dyn std::error::Error>>;

    /// Releases the device. Safe to call more than once.
    fn close(&mut self);
}
