use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Body;
use futures::stream;

use blinkwatch_core::pipeline::capture_worker::StepOutcome;

use crate::state::{encode_blocking, AppState, FrameDriver};

pub const BOUNDARY: &str = "frame";
pub const MJPEG_CONTENT_TYPE: &str = "multipart/x-mixed-replace; boundary=frame";

/// Wraps one encoded image as a multipart part.
pub fn multipart_part(content_type: &str, image: &[u8]) -> Vec<u8> {
    let header = format!("--{BOUNDARY}\r\nContent-Type: {content_type}\r\n\r\n");
    let mut part = Vec::with_capacity(header.len() + image.len() + 2);
    part.extend_from_slice(header.as_bytes());
    part.extend_from_slice(image);
    part.extend_from_slice(b"\r\n");
    part
}

/// Endless MJPEG body. Ends when the server shuts down or, in synchronous
/// mode, when the source runs dry or fails.
pub fn mjpeg_body(state: AppState) -> Body {
    let parts = stream::unfold(state, |state| async move {
        let part = match state.driver.as_ref() {
            FrameDriver::Background => next_background_part(&state).await,
            FrameDriver::Synchronous(_) => next_synchronous_part(&state).await,
        }?;
        Some((Ok::<_, Infallible>(part), state))
    });
    Body::from_stream(parts)
}

/// Re-sends the latest frame every `stream_interval`, whether or not it changed.
async fn next_background_part(state: &AppState) -> Option<Vec<u8>> {
    loop {
        tokio::time::sleep(state.stream_interval).await;
        if state.is_cancelled() {
            return None;
        }
        if let Some(part) = encode_latest(state).await {
            return Some(part);
        }
    }
}

async fn next_synchronous_part(state: &AppState) -> Option<Vec<u8>> {
    loop {
        if state.is_cancelled() {
            return None;
        }
        match state.step_synchronous().await? {
            Ok(StepOutcome::Analyzed { .. }) => {
                if let Some(part) = encode_latest(state).await {
                    return Some(part);
                }
            }
            Ok(StepOutcome::Missed) => continue,
            Ok(StepOutcome::Exhausted) => {
                log::info!("Frame source exhausted, ending stream");
                return None;
            }
            Err(e) => {
                log::error!("Camera read failed, ending stream: {e}");
                return None;
            }
        }
    }
}

async fn encode_latest(state: &AppState) -> Option<Vec<u8>> {
    let latest = state.session.latest_frame()?;
    let index = latest.frame.index();
    let encoder = Arc::clone(&state.stream_encoder);
    match encode_blocking(Arc::clone(&encoder), latest).await {
        Ok(bytes) => Some(multipart_part(encoder.content_type(), &bytes)),
        Err(e) => {
            log::warn!("Dropping stream frame {index}: {e}");
            None
        }
    }
}
