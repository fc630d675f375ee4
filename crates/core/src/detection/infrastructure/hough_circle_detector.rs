use opencv::core::{Vec3f, Vector};
use opencv::imgproc;

use crate::detection::domain::circle_detector::CircleDetector;
use crate::shared::circle::Circle;
use crate::shared::constants::{
    HOUGH_DP, HOUGH_MAX_RADIUS, HOUGH_MIN_DIST, HOUGH_MIN_RADIUS, HOUGH_PARAM1, HOUGH_PARAM2,
};
use crate::shared::frame::Frame;

use super::mat_conversion::gray_frame_to_mat;

/// Parameters of the Hough gradient transform.
///
/// `min_dist` is larger than any eye crop, so at most one circle comes back
/// per region.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HoughParams {
    pub dp: f64,
    pub min_dist: f64,
    pub param1: f64,
    pub param2: f64,
    pub min_radius: i32,
    pub max_radius: i32,
}

impl Default for HoughParams {
    fn default() -> Self {
        Self {
            dp: HOUGH_DP,
            min_dist: HOUGH_MIN_DIST,
            param1: HOUGH_PARAM1,
            param2: HOUGH_PARAM2,
            min_radius: HOUGH_MIN_RADIUS,
            max_radius: HOUGH_MAX_RADIUS,
        }
    }
}

#[derive(Default)]
pub struct HoughCircleDetector {
    params: HoughParams,
}

impl CircleDetector for HoughCircleDetector {
    fn detect(&mut self, gray: &Frame) -> Result<Vec<Circle>, Box<dyn std::error::Error>> {
        if gray.is_empty() {
            return Ok(Vec::new());
        }
        let mat = gray_frame_to_mat(gray)?;
        let mut circles = Vector::<Vec3f>::new();
        let p = &self.params;
        imgproc::hough_circles(
            &mat,
            &mut circles,
            imgproc::HOUGH_GRADIENT,
            p.dp,
            p.min_dist,
            p.param1,
            p.param2,
            p.min_radius,
            p.max_radius,
        )?;
        Ok(circles
            .iter()
            .map(|c| Circle::new(c[0], c[1], c[2]))
            .collect())
    }
}
