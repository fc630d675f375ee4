use ndarray::{s, ArrayView3};

use crate::shared::region::Region;

/// ITU-R BT.601 luma weights in 14-bit fixed point, the same integers
/// OpenCV's `COLOR_RGB2GRAY` uses for 8-bit input.
const LUMA_SHIFT: u32 = 14;
const LUMA_R: u32 = 4899;
const LUMA_G: u32 = 9617;
const LUMA_B: u32 = 1868;

/// A single camera/image frame: contiguous bytes in row-major order.
///
/// Colour frames are RGB. Format conversion happens at I/O boundaries only;
/// the domain layer treats pixel data as opaque apart from the intensity
/// conversion and cropping needed for detection.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.channels == 0
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Single-channel intensity copy of this frame.
    ///
    /// One-channel frames are returned as-is, two-channel frames keep their
    /// first (gray) channel, and three/four-channel frames are treated as
    /// RGB(A) with alpha ignored. Colour pixels give the same byte as
    /// OpenCV's `cvtColor` with `COLOR_RGB2GRAY`.
    pub fn to_grayscale(&self) -> Frame {
        if self.channels == 1 {
            return self.clone();
        }

        let pixels = self.as_ndarray();
        let mut gray = Vec::with_capacity(self.width as usize * self.height as usize);
        for row in pixels.outer_iter() {
            for px in row.outer_iter() {
                let value = if self.channels < 3 {
                    px[0]
                } else {
                    let weighted = LUMA_R * px[0] as u32
                        + LUMA_G * px[1] as u32
                        + LUMA_B * px[2] as u32;
                    ((weighted + (1 << (LUMA_SHIFT - 1))) >> LUMA_SHIFT) as u8
                };
                gray.push(value);
            }
        }
        Frame::new(gray, self.width, self.height, 1, self.index)
    }

    /// Copies the sub-window covered by `region`.
    ///
    /// The region is clamped to the frame bounds first; `None` means nothing
    /// of the region lies inside the frame.
    pub fn crop(&self, region: &Region) -> Option<Frame> {
        let clamped = region.clamp_to(self.width, self.height)?;
        let (x0, y0) = (clamped.x as usize, clamped.y as usize);
        let (x1, y1) = (x0 + clamped.width as usize, y0 + clamped.height as usize);

        let data: Vec<u8> = self
            .as_ndarray()
            .slice(s![y0..y1, x0..x1, ..])
            .iter()
            .copied()
            .collect();
        Some(Frame::new(
            data,
            clamped.width as u32,
            clamped.height as u32,
            self.channels,
            self.index,
        ))
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn rgb(width: u32, height: u32, fill: [u8; 3]) -> Frame {
        let data = fill
            .iter()
            .copied()
            .cycle()
            .take((width * height * 3) as usize)
            .collect();
        Frame::new(data, width, height, 3, 0)
    }

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12]; // 2x2x3
        let frame = Frame::new(data.clone(), 2, 2, 3, 5);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.channels(), 3);
        assert_eq!(frame.index(), 5);
        assert_eq!(frame.data(), &data[..]);
        assert!(!frame.is_empty());
    }

    #[test]
    fn test_zero_sized_frame_is_empty() {
        let frame = Frame::new(Vec::new(), 0, 10, 3, 0);
        assert!(frame.is_empty());
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * channels")]
    fn test_mismatched_data_length_panics_in_debug() {
        let data = vec![0u8; 10]; // wrong size for 2x2x3
        Frame::new(data, 2, 2, 3, 0);
    }

    #[test]
    fn test_as_ndarray_shape() {
        let data = vec![0u8; 24]; // 2x4x3
        let frame = Frame::new(data, 4, 2, 3, 0);
        let arr = frame.as_ndarray();
        assert_eq!(arr.shape(), &[2, 4, 3]); // (height, width, channels)
    }

    #[test]
    fn test_grayscale_uses_luma_weights() {
        let red = rgb(1, 1, [255, 0, 0]).to_grayscale();
        let green = rgb(1, 1, [0, 255, 0]).to_grayscale();
        let blue = rgb(1, 1, [0, 0, 255]).to_grayscale();
        assert_eq!(red.data(), &[76]);
        assert_eq!(green.data(), &[150]);
        assert_eq!(blue.data(), &[29]);
    }

    #[rstest]
    #[case([0, 27, 225], 42)]
    #[case([128, 128, 128], 128)]
    #[case([10, 200, 30], 124)]
    #[case([1, 1, 1], 1)]
    fn test_grayscale_matches_fixed_point_luma(#[case] rgb_px: [u8; 3], #[case] expected: u8) {
        assert_eq!(rgb(1, 1, rgb_px).to_grayscale().data(), &[expected]);
    }

    #[test]
    fn test_grayscale_white_stays_white() {
        let gray = rgb(3, 2, [255, 255, 255]).to_grayscale();
        assert_eq!(gray.channels(), 1);
        assert_eq!(gray.width(), 3);
        assert_eq!(gray.height(), 2);
        assert!(gray.data().iter().all(|&v| v == 255));
    }

    #[test]
    fn test_grayscale_of_gray_frame_is_identity() {
        let frame = Frame::new(vec![1, 2, 3, 4], 2, 2, 1, 7);
        let gray = frame.to_grayscale();
        assert_eq!(gray.data(), frame.data());
        assert_eq!(gray.index(), 7);
    }

    #[test]
    fn test_grayscale_ignores_alpha() {
        let frame = Frame::new(vec![255, 255, 255, 0], 1, 1, 4, 0);
        assert_eq!(frame.to_grayscale().data(), &[255]);
    }

    #[test]
    fn test_crop_copies_sub_window() {
        // 4x3 gray frame, values = row * 10 + col
        let data: Vec<u8> = (0..3)
            .flat_map(|row| (0..4).map(move |col| (row * 10 + col) as u8))
            .collect();
        let frame = Frame::new(data, 4, 3, 1, 0);

        let crop = frame.crop(&Region::new(1, 1, 2, 2)).unwrap();
        assert_eq!(crop.width(), 2);
        assert_eq!(crop.height(), 2);
        assert_eq!(crop.data(), &[11, 12, 21, 22]);
    }

    #[test]
    fn test_crop_clamps_to_frame_bounds() {
        let frame = Frame::new(vec![0u8; 4 * 4 * 3], 4, 4, 3, 0);
        let crop = frame.crop(&Region::new(2, 2, 10, 10)).unwrap();
        assert_eq!(crop.width(), 2);
        assert_eq!(crop.height(), 2);
        assert_eq!(crop.data().len(), 2 * 2 * 3);
    }

    #[test]
    fn test_crop_outside_frame_is_none() {
        let frame = Frame::new(vec![0u8; 16], 4, 4, 1, 0);
        assert!(frame.crop(&Region::new(10, 10, 5, 5)).is_none());
        assert!(frame.crop(&Region::new(0, 0, 0, 3)).is_none());
    }
}
