use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::shared::frame::Frame;

/// A published frame together with the moment it was read from the source.
#[derive(Clone, Debug)]
pub struct CapturedFrame {
    pub frame: Frame,
    pub captured_at: SystemTime,
}

impl CapturedFrame {
    pub fn new(frame: Frame) -> Self {
        Self {
            frame,
            captured_at: SystemTime::now(),
        }
    }

    /// Capture time as fractional seconds since the Unix epoch.
    pub fn timestamp_secs(&self) -> f64 {
        self.captured_at
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }
}

/// Single-entry, latest-wins frame slot.
///
/// Writers overwrite, readers clone the `Arc`; nothing is ever queued.
#[derive(Default)]
pub struct LatestFrameSlot {
    inner: Mutex<Option<Arc<CapturedFrame>>>,
}

impl LatestFrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, frame: CapturedFrame) {
        let frame = Arc::new(frame);
        match self.inner.lock() {
            Ok(mut guard) => *guard = Some(frame),
            Err(poisoned) => *poisoned.into_inner() = Some(frame),
        }
    }

    pub fn latest(&self) -> Option<Arc<CapturedFrame>> {
        match self.inner.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
