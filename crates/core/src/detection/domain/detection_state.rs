use serde::Serialize;

/// Point-in-time view of the two derived signals reported to clients.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DetectionState {
    pub face_detected: bool,
    pub blink_count: u64,
}
