use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};

use crate::pipeline::capture_worker::{CaptureConfig, CaptureSummary, CaptureWorker};

pub enum CaptureMessage {
    Stopped(CaptureSummary),
    Failed(String),
}

/// Runs a [`CaptureWorker`] on a dedicated thread.
///
/// The thread reports exactly one [`CaptureMessage`] when it ends. Dropping
/// the handle without calling [`ThreadedCapture::stop`] detaches the thread.
pub struct ThreadedCapture {
    handle: Option<JoinHandle<()>>,
    cancelled: Arc<AtomicBool>,
    messages: Receiver<CaptureMessage>,
}

impl ThreadedCapture {
    pub fn spawn(worker: CaptureWorker, max_frames: Option<usize>) -> std::io::Result<Self> {
        let (tx, rx) = crossbeam_channel::bounded::<CaptureMessage>(1);
        let cancelled = Arc::new(AtomicBool::new(false));
        let config = CaptureConfig {
            max_frames,
            cancelled: cancelled.clone(),
        };

        let handle = thread::Builder::new()
            .name("capture".to_string())
            .spawn(move || run_capture(worker, &config, &tx))?;

        Ok(Self {
            handle: Some(handle),
            cancelled,
            messages: rx,
        })
    }

    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    pub fn messages(&self) -> &Receiver<CaptureMessage> {
        &self.messages
    }

    /// Cancels the loop, waits for the thread and returns its final message.
    pub fn stop(mut self) -> Option<CaptureMessage> {
        self.cancelled.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                return Some(CaptureMessage::Failed("capture thread panicked".to_string()));
            }
        }
        self.messages.try_recv().ok()
    }
}

fn run_capture(mut worker: CaptureWorker, config: &CaptureConfig, tx: &Sender<CaptureMessage>) {
    let message = match worker.run(config) {
        Ok(summary) => {
            log::info!(
                "Capture stopped ({:?}) after {} frames, {} blinks",
                summary.stop_reason,
                summary.frames_analyzed,
                summary.blink_count
            );
            CaptureMessage::Stopped(summary)
        }
        Err(e) => {
            log::error!("Capture loop failed: {e}");
            CaptureMessage::Failed(e.to_string())
        }
    };
    worker.close();
    let _ = tx.send(message);
}
