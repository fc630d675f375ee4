use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use opencv::core::{Mat, Point, Scalar, CV_8UC3};
use opencv::imgproc;
use opencv::prelude::*;

use crate::detection::domain::frame_analyzer::FrameAnalysis;
use crate::shared::frame::Frame;

const EYE_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const CIRCLE_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const CENTER_DOT_RADIUS: i32 = 2;
/// Baseline-left corner of the blink counter text.
const LABEL_ORIGIN: (i32, i32) = (10, 30);

/// Draws eye boxes, detected circles with their centres and a
/// `Blinks: N` counter onto an RGB frame.
///
/// Purely cosmetic; detection results are unaffected. Frames that are not
/// 3-channel are returned unchanged.
pub fn draw_analysis(frame: Frame, analysis: &FrameAnalysis, blink_count: u64) -> Frame {
    if frame.channels() != 3 || frame.is_empty() {
        return frame;
    }
    let (width, height, index) = (frame.width(), frame.height(), frame.index());
    let Some(mut img) = RgbImage::from_raw(width, height, frame.data().to_vec()) else {
        return frame;
    };

    for eye in &analysis.eyes {
        if eye.is_empty() {
            continue;
        }
        let rect = Rect::at(eye.x, eye.y).of_size(eye.width as u32, eye.height as u32);
        draw_hollow_rect_mut(&mut img, rect, EYE_COLOR);
    }
    for circle in &analysis.circles {
        let center = (circle.center_x.round() as i32, circle.center_y.round() as i32);
        let radius = circle.radius.round().max(1.0) as i32;
        draw_hollow_circle_mut(&mut img, center, radius, CIRCLE_COLOR);
        draw_filled_circle_mut(&mut img, center, CENTER_DOT_RADIUS, CIRCLE_COLOR);
    }

    let mut data = img.into_raw();
    if let Err(e) = draw_blink_label(&mut data, width, height, blink_count) {
        log::warn!("Skipping blink label on frame {index}: {e}");
    }
    Frame::new(data, width, height, 3, index)
}

/// Writes the counter with OpenCV's built-in Hershey font, so no font file
/// has to ship with the binary. Text outside the frame is clipped.
fn draw_blink_label(
    rgb: &mut [u8],
    width: u32,
    height: u32,
    blink_count: u64,
) -> opencv::Result<()> {
    let mut mat =
        Mat::new_rows_cols_with_default(height as i32, width as i32, CV_8UC3, Scalar::all(0.0))?;
    mat.data_bytes_mut()?.copy_from_slice(rgb);
    imgproc::put_text(
        &mut mat,
        &format!("Blinks: {blink_count}"),
        Point::new(LABEL_ORIGIN.0, LABEL_ORIGIN.1),
        imgproc::FONT_HERSHEY_SIMPLEX,
        1.0,
        // Yellow; the buffer is RGB.
        Scalar::new(255.0, 255.0, 0.0, 0.0),
        2,
        imgproc::LINE_8,
        false,
    )?;
    rgb.copy_from_slice(mat.data_bytes()?);
    Ok(())
}
