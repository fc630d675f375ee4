use opencv::core::{Mat, Rect};
use opencv::prelude::*;

use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Copies a single-channel frame into an owned `CV_8UC1` matrix.
pub fn gray_frame_to_mat(gray: &Frame) -> opencv::Result<Mat> {
    debug_assert_eq!(gray.channels(), 1, "expected an intensity frame");
    if gray.is_empty() {
        return Ok(Mat::default());
    }
    let rows: Vec<&[u8]> = gray.data().chunks(gray.width() as usize).collect();
    Mat::from_slice_2d(&rows)
}

pub fn rect_to_region(rect: &Rect) -> Region {
    Region::new(rect.x, rect.y, rect.width, rect.height)
}
