use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::Parser;

use blinkwatch_core::detection::domain::frame_analyzer::ScanPolicy;
use blinkwatch_core::shared::constants::{
    DEFAULT_STREAM_INTERVAL_MS, SNAPSHOT_JPEG_QUALITY, STREAM_JPEG_QUALITY,
};

/// Who drives the camera.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CaptureMode {
    /// A background thread captures continuously; handlers read the latest frame.
    #[default]
    Background,
    /// Each `/video_feed` request reads and analyzes frames itself.
    Synchronous,
}

impl FromStr for CaptureMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "background" => Ok(CaptureMode::Background),
            "synchronous" => Ok(CaptureMode::Synchronous),
            other => Err(format!(
                "Mode must be 'background' or 'synchronous', got '{other}'"
            )),
        }
    }
}

impl fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureMode::Background => write!(f, "background"),
            CaptureMode::Synchronous => write!(f, "synchronous"),
        }
    }
}

/// Serves a webcam feed with live face and blink detection.
#[derive(Parser, Debug)]
#[command(name = "blinkwatch-server")]
pub struct ServerArgs {
    /// Interface to bind.
    #[arg(long, default_value = "localhost")]
    pub host: String,

    #[arg(long, default_value = "5000")]
    pub port: u16,

    /// Camera device index.
    #[arg(long, default_value = "0")]
    pub camera: i32,

    /// Capture mode: background or synchronous.
    #[arg(long, default_value = "background")]
    pub mode: String,

    /// Delay between MJPEG parts in background mode.
    #[arg(long, default_value_t = DEFAULT_STREAM_INTERVAL_MS)]
    pub stream_interval_ms: u64,

    /// JPEG quality of `/frame` snapshots (1-100).
    #[arg(long, default_value_t = SNAPSHOT_JPEG_QUALITY)]
    pub jpeg_quality: u8,

    /// JPEG quality of `/video_feed` parts (1-100).
    #[arg(long, default_value_t = STREAM_JPEG_QUALITY)]
    pub stream_quality: u8,

    /// Eye regions searched per frame: first or all.
    #[arg(long, default_value = "first")]
    pub scan_policy: String,

    /// Draw eye boxes, circles and the blink count on served frames.
    #[arg(long)]
    pub overlay: bool,

    /// Directory checked for Haar cascade files before downloading.
    #[arg(long)]
    pub cascade_dir: Option<PathBuf>,
}

impl ServerArgs {
    pub fn capture_mode(&self) -> Result<CaptureMode, String> {
        self.mode.parse()
    }

    pub fn scan_policy(&self) -> Result<ScanPolicy, String> {
        self.scan_policy.parse()
    }

    pub fn stream_interval(&self) -> Duration {
        Duration::from_millis(self.stream_interval_ms)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub fn validate(args: &ServerArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.host.trim().is_empty() {
        return Err("Host must not be empty".into());
    }
    if args.camera < 0 {
        return Err(format!("Camera index must be non-negative, got {}", args.camera).into());
    }
    if args.stream_interval_ms == 0 {
        return Err("Stream interval must be at least 1 ms".into());
    }
    for (name, quality) in [
        ("JPEG quality", args.jpeg_quality),
        ("Stream quality", args.stream_quality),
    ] {
        if !(1..=100).contains(&quality) {
            return Err(format!("{name} must be between 1 and 100, got {quality}").into());
        }
    }
    if let Some(dir) = &args.cascade_dir {
        if !dir.is_dir() {
            return Err(format!("Cascade directory not found: {}", dir.display()).into());
        }
    }
    args.capture_mode()?;
    args.scan_policy()?;
    Ok(())
}
