use std::process;
use std::sync::Arc;

use clap::Parser;

use blinkwatch_core::detection::infrastructure::analyzer_factory::create_analyzer;
use blinkwatch_core::pipeline::capture_worker::CaptureWorker;
use blinkwatch_core::pipeline::detection_session::DetectionSession;
use blinkwatch_core::pipeline::infrastructure::threaded_capture::{CaptureMessage, ThreadedCapture};
use blinkwatch_core::video::infrastructure::jpeg_encoder::JpegEncoder;
use blinkwatch_core::video::infrastructure::opencv_camera::OpenCvCamera;
use blinkwatch_server::config::{validate, CaptureMode, ServerArgs};
use blinkwatch_server::http::create_router;
use blinkwatch_server::shutdown::wait_for_shutdown;
use blinkwatch_server::state::{AppState, FrameDriver};

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = ServerArgs::parse();
    validate(&args)?;
    let mode = args.capture_mode()?;

    // Cascade download uses a blocking HTTP client, so all setup happens
    // before the async runtime starts.
    let analyzer = create_analyzer(args.cascade_dir.as_deref(), args.scan_policy()?, None)?;
    let session = DetectionSession::new();
    let mut worker = CaptureWorker::new(
        Box::new(OpenCvCamera::new(args.camera)),
        analyzer,
        session.clone(),
    )
    .with_overlay(args.overlay);
    worker.open()?;
    println!("Camera opened successfully!");

    let (driver, capture) = match mode {
        CaptureMode::Background => {
            let capture = ThreadedCapture::spawn(worker, None)?;
            (FrameDriver::Background, Some(capture))
        }
        CaptureMode::Synchronous => (FrameDriver::synchronous(worker), None),
    };
    let cancelled = capture
        .as_ref()
        .map(|c| c.cancel_flag())
        .unwrap_or_default();

    let state = AppState {
        session,
        snapshot_encoder: Arc::new(JpegEncoder::new(args.jpeg_quality)),
        stream_encoder: Arc::new(JpegEncoder::new(args.stream_quality)),
        stream_interval: args.stream_interval(),
        driver: Arc::new(driver),
        cancelled,
    };

    print_banner(&args, mode);

    let runtime = tokio::runtime::Runtime::new()?;
    let served = runtime.block_on(serve(&args.bind_address(), state));

    if let Some(capture) = capture {
        match capture.stop() {
            Some(CaptureMessage::Failed(e)) => log::error!("Capture thread ended with: {e}"),
            Some(CaptureMessage::Stopped(summary)) => {
                log::info!("Final blink count: {}", summary.blink_count)
            }
            None => {}
        }
    }
    served
}

async fn serve(address: &str, state: AppState) -> Result<(), Box<dyn std::error::Error>> {
    let listener = tokio::net::TcpListener::bind(address).await?;
    log::info!("Listening on {}", listener.local_addr()?);

    let cancelled = state.cancelled.clone();
    let app = create_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown(cancelled))
        .await?;
    Ok(())
}

fn print_banner(args: &ServerArgs, mode: CaptureMode) {
    let base = format!("http://{}", args.bind_address());
    println!("{}", "=".repeat(60));
    println!("blinkwatch server ({mode} capture)");
    println!("{}", "=".repeat(60));
    println!("Endpoints:");
    println!("  {base}/video_feed (MJPEG)");
    println!("  {base}/frame (Base64 JSON)");
    println!("  {base}/detection_state");
    println!("{}", "=".repeat(60));
}
