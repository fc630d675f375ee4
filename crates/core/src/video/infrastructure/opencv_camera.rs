use opencv::core::Mat;
use opencv::imgproc;
use opencv::prelude::*;
use opencv::videoio::{self, VideoCapture, CAP_ANY};
use thiserror::Error;

use crate::shared::frame::Frame;
use crate::video::domain::frame_source::{FrameRead, FrameSource};
use crate::video::domain::source_info::SourceInfo;

#[derive(Error, Debug)]
pub enum CameraError {
    #[error("failed to open camera {index}: {source}")]
    Open {
        index: i32,
        #[source]
        source: opencv::Error,
    },
    #[error("camera {0} could not be opened")]
    NotOpened(i32),
    #[error("camera {0} is not open")]
    Closed(i32),
    #[error("camera {index} read failed: {source}")]
    Read {
        index: i32,
        #[source]
        source: opencv::Error,
    },
    #[error("unsupported camera frame layout: {0} channels")]
    Layout(i32),
    #[error("frame conversion failed: {0}")]
    Convert(#[source] opencv::Error),
}

/// Reads frames from a local video device through OpenCV `videoio`.
///
/// OpenCV delivers BGR; frames leave this adapter as RGB.
pub struct OpenCvCamera {
    index: i32,
    capture: Option<VideoCapture>,
    frame_index: usize,
}

impl OpenCvCamera {
    pub fn new(index: i32) -> Self {
        Self {
            index,
            capture: None,
            frame_index: 0,
        }
    }

    pub fn index(&self) -> i32 {
        self.index
    }

    fn open_device(&mut self) -> Result<SourceInfo, CameraError> {
        let capture = VideoCapture::new(self.index, CAP_ANY).map_err(|e| CameraError::Open {
            index: self.index,
            source: e,
        })?;
        if !capture.is_opened().unwrap_or(false) {
            return Err(CameraError::NotOpened(self.index));
        }

        let width = capture.get(videoio::CAP_PROP_FRAME_WIDTH).unwrap_or(0.0);
        let height = capture.get(videoio::CAP_PROP_FRAME_HEIGHT).unwrap_or(0.0);
        let fps = capture.get(videoio::CAP_PROP_FPS).unwrap_or(0.0);
        self.capture = Some(capture);
        self.frame_index = 0;

        Ok(SourceInfo {
            width: width.max(0.0) as u32,
            height: height.max(0.0) as u32,
            fps: fps.max(0.0),
            description: format!("camera {}", self.index),
        })
    }

    fn read_frame(&mut self) -> Result<FrameRead, CameraError> {
        let index = self.index;
        let capture = self.capture.as_mut().ok_or(CameraError::Closed(index))?;

        let mut bgr = Mat::default();
        let grabbed = capture
            .read(&mut bgr)
            .map_err(|e| CameraError::Read { index, source: e })?;
        if !grabbed || bgr.rows() == 0 || bgr.cols() == 0 {
            return Ok(FrameRead::Missed);
        }

        let frame = mat_to_rgb_frame(&bgr, self.frame_index)?;
        self.frame_index += 1;
        Ok(FrameRead::Frame(frame))
    }
}

impl FrameSource for OpenCvCamera {
    fn open(&mut self) -> Result<SourceInfo, Box<dyn std::error::Error>> {
        let info = self.open_device()?;
        log::info!(
            "Camera {} opened at {}x{} ({:.0} fps)",
            self.index,
            info.width,
            info.height,
            info.fps
        );
        Ok(info)
    }

    fn next_frame(&mut self) -> Result<FrameRead, Box<dyn std::error::Error>> {
        Ok(self.read_frame()?)
    }

    fn close(&mut self) {
        if let Some(mut capture) = self.capture.take() {
            if let Err(e) = capture.release() {
                log::warn!("Failed to release camera {}: {e}", self.index);
            }
        }
    }
}

impl Drop for OpenCvCamera {
    fn drop(&mut self) {
        self.close();
    }
}

/// Converts an 8-bit BGR (or grayscale) matrix into an RGB frame.
fn mat_to_rgb_frame(mat: &Mat, index: usize) -> Result<Frame, CameraError> {
    let code = match mat.channels() {
        3 => imgproc::COLOR_BGR2RGB,
        4 => imgproc::COLOR_BGRA2RGB,
        1 => imgproc::COLOR_GRAY2RGB,
        other => return Err(CameraError::Layout(other)),
    };
    let mut rgb = Mat::default();
    imgproc::cvt_color(mat, &mut rgb, code, 0).map_err(CameraError::Convert)?;
    let rgb = if rgb.is_continuous() {
        rgb
    } else {
        rgb.try_clone().map_err(CameraError::Convert)?
    };

    let width = rgb.cols() as u32;
    let height = rgb.rows() as u32;
    let data = rgb.data_bytes().map_err(CameraError::Convert)?.to_vec();
    Ok(Frame::new(data, width, height, 3, index))
}
