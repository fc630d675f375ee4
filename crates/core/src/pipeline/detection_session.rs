use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::detection::domain::detection_state::DetectionState;
use crate::pipeline::latest_frame::{CapturedFrame, LatestFrameSlot};
use crate::shared::frame::Frame;

/// Process-wide detection state shared between the capture loop and readers.
///
/// Only the capture loop writes. Each field is an independent atomic, so a
/// snapshot may pair a `face_detected` from one frame with a `blink_count`
/// from the next; neither field is ever torn.
#[derive(Default)]
pub struct DetectionSession {
    face_detected: AtomicBool,
    blink_count: AtomicU64,
    latest: LatestFrameSlot,
}

impl DetectionSession {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn snapshot(&self) -> DetectionState {
        DetectionState {
            face_detected: self.face_detected.load(Ordering::Acquire),
            blink_count: self.blink_count.load(Ordering::Acquire),
        }
    }

    pub fn latest_frame(&self) -> Option<Arc<CapturedFrame>> {
        self.latest.latest()
    }

    pub fn record(&self, face_detected: bool, blink_count: u64) {
        self.face_detected.store(face_detected, Ordering::Release);
        self.blink_count.fetch_max(blink_count, Ordering::AcqRel);
    }

    pub fn publish_frame(&self, frame: Frame) {
        self.latest.publish(CapturedFrame::new(frame));
    }
}
