use std::fs;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use clap::Parser;

use blinkwatch_core::detection::domain::frame_analyzer::ScanPolicy;
use blinkwatch_core::detection::infrastructure::analyzer_factory::create_analyzer;
use blinkwatch_core::pipeline::capture_worker::{CaptureConfig, CaptureWorker};
use blinkwatch_core::pipeline::detection_session::DetectionSession;
use blinkwatch_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use blinkwatch_core::shared::constants::SNAPSHOT_JPEG_QUALITY;
use blinkwatch_core::video::domain::frame_source::FrameSource;
use blinkwatch_core::video::infrastructure::image_sequence_source::ImageSequenceSource;
use blinkwatch_core::video::infrastructure::jpeg_encoder::JpegEncoder;
use blinkwatch_core::video::infrastructure::opencv_camera::OpenCvCamera;

/// Counts eye blinks from a webcam or a directory of images.
#[derive(Parser)]
#[command(name = "blinkwatch")]
struct Cli {
    /// Camera device index.
    #[arg(long, default_value = "0")]
    camera: i32,

    /// Read frames from a directory of images instead of a camera.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Stop after this many analyzed frames.
    #[arg(long)]
    max_frames: Option<usize>,

    /// Eye regions searched per frame: first or all.
    #[arg(long, default_value = "first")]
    scan_policy: String,

    /// Directory checked for Haar cascade files before downloading.
    #[arg(long)]
    cascade_dir: Option<PathBuf>,

    /// Draw eye boxes, circles and the blink count on the snapshot.
    #[arg(long)]
    overlay: bool,

    /// Write the last analyzed frame as JPEG when the run ends.
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// JPEG quality of the snapshot (1-100).
    #[arg(long, default_value_t = SNAPSHOT_JPEG_QUALITY)]
    jpeg_quality: u8,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let scan_policy: ScanPolicy = cli.scan_policy.parse()?;
    let analyzer = create_analyzer(
        cli.cascade_dir.as_deref(),
        scan_policy,
        Some(download_progress),
    )?;
    eprintln!();

    let source: Box<dyn FrameSource> = match &cli.input {
        Some(dir) => {
            log::info!("Replaying images from {}", dir.display());
            Box::new(ImageSequenceSource::new(dir))
        }
        None => Box::new(OpenCvCamera::new(cli.camera)),
    };

    let session = DetectionSession::new();
    let mut worker = CaptureWorker::new(source, analyzer, session.clone())
        .with_logger(Box::new(StdoutPipelineLogger::default()))
        .with_overlay(cli.overlay);
    worker.open()?;

    let config = CaptureConfig {
        max_frames: cli.max_frames,
        ..CaptureConfig::default()
    };
    spawn_stop_listener(config.cancelled.clone())?;

    let result = worker.run(&config);
    worker.close();
    let summary = result?;
    log::info!("Watch loop stopped: {:?}", summary.stop_reason);

    let state = session.snapshot();
    println!(
        "Frames analyzed: {} (missed {})",
        summary.frames_analyzed, summary.frames_missed
    );
    println!("Blinks detected: {}", state.blink_count);
    println!(
        "Face in last frame: {}",
        if state.face_detected { "yes" } else { "no" }
    );

    if let Some(path) = &cli.snapshot {
        write_snapshot(&session, path, cli.jpeg_quality)?;
    }

    Ok(())
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(dir) = &cli.input {
        if !dir.is_dir() {
            return Err(format!("Input directory not found: {}", dir.display()).into());
        }
    }
    if let Some(dir) = &cli.cascade_dir {
        if !dir.is_dir() {
            return Err(format!("Cascade directory not found: {}", dir.display()).into());
        }
    }
    if cli.camera < 0 {
        return Err(format!("Camera index must be non-negative, got {}", cli.camera).into());
    }
    if cli.max_frames == Some(0) {
        return Err("Max frames must be at least 1".into());
    }
    if !(1..=100).contains(&cli.jpeg_quality) {
        return Err(format!(
            "JPEG quality must be between 1 and 100, got {}",
            cli.jpeg_quality
        )
        .into());
    }
    cli.scan_policy.parse::<ScanPolicy>()?;
    Ok(())
}

fn write_snapshot(
    session: &DetectionSession,
    path: &Path,
    quality: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(latest) = session.latest_frame() else {
        return Err("No frame was captured, snapshot not written".into());
    };
    let bytes = JpegEncoder::new(quality).encode_frame(&latest.frame)?;
    fs::write(path, bytes)?;
    println!("Snapshot written to {}", path.display());
    Ok(())
}

/// Raises `cancelled` on the first Ctrl-C or SIGTERM so the watch loop ends
/// with its summary and snapshot. A second Ctrl-C exits immediately.
fn spawn_stop_listener(cancelled: Arc<AtomicBool>) -> io::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    thread::Builder::new()
        .name("stop-listener".to_string())
        .spawn(move || {
            runtime.block_on(stop_on(stop_signal(), cancelled));
            log::info!("Stopping after the current frame, press Ctrl-C again to abort");
            runtime.block_on(stop_signal());
            process::exit(130);
        })?;
    Ok(())
}

async fn stop_on(signal: impl Future<Output = ()>, cancelled: Arc<AtomicBool>) {
    signal.await;
    cancelled.store(true, Ordering::Relaxed);
}

async fn stop_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading Haar cascade... {pct}%");
    } else {
        eprint!("\rDownloading Haar cascade... {downloaded} bytes");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("blinkwatch").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults_are_valid() {
        let cli = parse(&[]);
        assert_eq!(cli.camera, 0);
        assert_eq!(cli.jpeg_quality, 75);
        assert!(validate(&cli).is_ok());
    }

    #[test]
    fn test_unknown_scan_policy_is_rejected() {
        assert!(validate(&parse(&["--scan-policy", "some"])).is_err());
    }

    #[test]
    fn test_zero_max_frames_is_rejected() {
        assert!(validate(&parse(&["--max-frames", "0"])).is_err());
    }

    #[test]
    fn test_missing_input_dir_is_rejected() {
        assert!(validate(&parse(&["--input", "/nonexistent/frames"])).is_err());
    }

    #[test]
    fn test_jpeg_quality_out_of_range() {
        assert!(validate(&parse(&["--jpeg-quality", "0"])).is_err());
    }

    #[tokio::test]
    async fn test_stop_signal_raises_cancel_flag() {
        let config = CaptureConfig::default();
        stop_on(async {}, config.cancelled.clone()).await;
        assert!(config.cancelled.load(Ordering::Relaxed));
    }

    #[tokio::test]
    async fn test_no_signal_leaves_run_going() {
        let cancelled = Arc::new(AtomicBool::new(false));
        let pending = stop_on(std::future::pending::<()>(), cancelled.clone());
        let timed_out =
            tokio::time::timeout(std::time::Duration::from_millis(20), pending).await;
        assert!(timed_out.is_err());
        assert!(!cancelled.load(Ordering::Relaxed));
    }

    #[test]
    fn test_stop_listener_starts_without_raising_flag() {
        let cancelled = Arc::new(AtomicBool::new(false));
        spawn_stop_listener(cancelled.clone()).unwrap();
        assert!(!cancelled.load(Ordering::Relaxed));
    }
}
