use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use blinkwatch_core::pipeline::capture_worker::{CaptureWorker, StepOutcome};
use blinkwatch_core::pipeline::detection_session::DetectionSession;
use blinkwatch_core::pipeline::latest_frame::CapturedFrame;
use blinkwatch_core::video::domain::frame_encoder::FrameEncoder;

/// How new frames reach the session.
pub enum FrameDriver {
    /// A capture thread publishes frames on its own.
    Background,
    /// Stream handlers step this worker themselves.
    Synchronous(Arc<Mutex<CaptureWorker>>),
}

impl FrameDriver {
    pub fn synchronous(worker: CaptureWorker) -> Self {
        FrameDriver::Synchronous(Arc::new(Mutex::new(worker)))
    }
}

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<DetectionSession>,
    pub snapshot_encoder: Arc<dyn FrameEncoder>,
    pub stream_encoder: Arc<dyn FrameEncoder>,
    pub stream_interval: Duration,
    pub driver: Arc<FrameDriver>,
    pub cancelled: Arc<AtomicBool>,
}

impl AppState {
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Advances a synchronous worker by one frame on the blocking pool.
    ///
    /// Returns `None` in background mode.
    pub async fn step_synchronous(&self) -> Option<Result<StepOutcome, String>> {
        let FrameDriver::Synchronous(worker) = self.driver.as_ref() else {
            return None;
        };
        let worker = Arc::clone(worker);
        let joined = tokio::task::spawn_blocking(move || {
            let mut guard = match worker.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            guard.step().map_err(|e| e.to_string())
        })
        .await;
        Some(joined.unwrap_or_else(|e| Err(format!("capture task failed: {e}"))))
    }
}

/// Encodes a captured frame on the blocking pool, off the async workers.
pub async fn encode_blocking(
    encoder: Arc<dyn FrameEncoder>,
    latest: Arc<CapturedFrame>,
) -> Result<Vec<u8>, String> {
    tokio::task::spawn_blocking(move || encoder.encode(&latest.frame).map_err(|e| e.to_string()))
        .await
        .unwrap_or_else(|e| Err(format!("encode task failed: {e}")))
}
