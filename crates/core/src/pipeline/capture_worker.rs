use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::detection::domain::blink_tracker::BlinkTracker;
use crate::detection::domain::frame_analyzer::FrameAnalyzer;
use crate::pipeline::detection_session::DetectionSession;
use crate::pipeline::frame_overlay::draw_analysis;
use crate::pipeline::pipeline_logger::{NullPipelineLogger, PipelineLogger};
use crate::shared::frame::Frame;
use crate::video::domain::frame_source::{FrameRead, FrameSource};
use crate::video::domain::source_info::SourceInfo;

/// Stop conditions for [`CaptureWorker::run`].
#[derive(Clone, Debug, Default)]
pub struct CaptureConfig {
    /// Stop after this many analyzed frames. `None` runs until cancelled
    /// or the source is exhausted.
    pub max_frames: Option<usize>,
    pub cancelled: Arc<AtomicBool>,
}

/// What a single [`CaptureWorker::step`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Analyzed { blink: bool },
    Missed,
    Exhausted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    Cancelled,
    FrameLimit,
    Exhausted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureSummary {
    pub frames_analyzed: usize,
    pub frames_missed: usize,
    pub blink_count: u64,
    pub stop_reason: StopReason,
}

/// Acquires frames, analyzes them and publishes the results.
///
/// The worker owns the source, analyzer and blink tracker. It is the only
/// writer of its [`DetectionSession`]; everything else reads snapshots.
pub struct CaptureWorker {
    source: Box<dyn FrameSource>,
    analyzer: FrameAnalyzer,
    tracker: BlinkTracker,
    session: Arc<DetectionSession>,
    logger: Box<dyn PipelineLogger>,
    overlay: bool,
    frames_analyzed: usize,
    frames_missed: usize,
    frame_limit: Option<usize>,
}

impl CaptureWorker {
    pub fn new(
        source: Box<dyn FrameSource>,
        analyzer: FrameAnalyzer,
        session: Arc<DetectionSession>,
    ) -> Self {
        Self {
            source,
            analyzer,
            tracker: BlinkTracker::new(),
            session,
            logger: Box::new(NullPipelineLogger),
            overlay: false,
            frames_analyzed: 0,
            frames_missed: 0,
            frame_limit: None,
        }
    }

    pub fn with_logger(mut self, logger: Box<dyn PipelineLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Draw eye boxes and circles onto published frames.
    pub fn with_overlay(mut self, overlay: bool) -> Self {
        self.overlay = overlay;
        self
    }

    pub fn session(&self) -> &Arc<DetectionSession> {
        &self.session
    }

    pub fn open(&mut self) -> Result<SourceInfo, Box<dyn std::error::Error>> {
        let info = self.source.open()?;
        self.logger.info(&format!(
            "Capturing from {} at {}",
            info.description,
            info.resolution()
        ));
        Ok(info)
    }

    pub fn close(&mut self) {
        self.source.close();
    }

    /// Reads one frame and, if there is one, runs it through detection.
    ///
    /// Returns an error only when the source itself fails.
    pub fn step(&mut self) -> Result<StepOutcome, Box<dyn std::error::Error>> {
        let t0 = Instant::now();
        let read = self.source.next_frame()?;
        self.logger.timing("read", t0.elapsed().as_secs_f64() * 1000.0);

        match read {
            FrameRead::Frame(frame) if !frame.is_empty() => Ok(self.process(frame)),
            FrameRead::Frame(_) | FrameRead::Missed => {
                self.frames_missed += 1;
                Ok(StepOutcome::Missed)
            }
            FrameRead::Exhausted => Ok(StepOutcome::Exhausted),
        }
    }

    fn process(&mut self, frame: Frame) -> StepOutcome {
        let t0 = Instant::now();
        let analysis = self.analyzer.analyze(&frame);
        self.logger.timing("analyze", t0.elapsed().as_secs_f64() * 1000.0);
        self.logger.metric("eyes", analysis.eyes.len() as f64);

        let blink = self.tracker.update(analysis.any_circle_detected);
        let blink_count = self.tracker.blink_count();
        self.session.record(analysis.face_detected, blink_count);
        if blink {
            log::info!("Blinks detected: {blink_count}");
        }

        let published = if self.overlay {
            let t0 = Instant::now();
            let drawn = draw_analysis(frame, &analysis, blink_count);
            self.logger.timing("overlay", t0.elapsed().as_secs_f64() * 1000.0);
            drawn
        } else {
            frame
        };
        self.session.publish_frame(published);

        self.frames_analyzed += 1;
        self.logger.progress(self.frames_analyzed, self.frame_limit.unwrap_or(0));
        StepOutcome::Analyzed { blink }
    }

    /// Steps until cancelled, the frame limit is hit, or the source runs dry.
    ///
    /// Misses are skipped. A source error ends the loop and is returned.
    pub fn run(
        &mut self,
        config: &CaptureConfig,
    ) -> Result<CaptureSummary, Box<dyn std::error::Error>> {
        self.frame_limit = config.max_frames;
        let stop_reason = loop {
            if config.cancelled.load(Ordering::Relaxed) {
                break StopReason::Cancelled;
            }
            if config
                .max_frames
                .is_some_and(|max| self.frames_analyzed >= max)
            {
                break StopReason::FrameLimit;
            }
            if self.step()? == StepOutcome::Exhausted {
                break StopReason::Exhausted;
            }
        };
        self.logger.summary();

        Ok(CaptureSummary {
            frames_analyzed: self.frames_analyzed,
            frames_missed: self.frames_missed,
            blink_count: self.tracker.blink_count(),
            stop_reason,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::detection::domain::circle_detector::CircleDetector;
    use crate::detection::domain::eye_detector::EyeDetector;
    use crate::detection::domain::face_detector::FaceDetector;
    use crate::pipeline::pipeline_logger::StdoutPipelineLogger;
    use crate::shared::circle::Circle;
    use crate::shared::region::Region;

    fn worker(reads: Vec<Result<FrameRead, String>>) -> CaptureWorker {
        CaptureWorker::new(
            Box::new(ScriptedSource::new(reads)),
            analyzer(),
            DetectionSession::new(),
        )
    }

    #[test]
    fn test_run_counts_rising_edges() {
        let (t, f) = (true, false);
        let mut w = worker(frames(&[f, f, t, t, f, t, f, f, t]));
        let summary = w.run(&CaptureConfig::default()).unwrap();

        assert_eq!(summary.blink_count, 3);
        assert_eq!(summary.frames_analyzed, 9);
        assert_eq!(summary.stop_reason, StopReason::Exhausted);
        assert_eq!(w.session().snapshot().blink_count, 3);
    }

    #[test]
    fn test_step_reports_blink_on_edge_only() {
        let mut w = worker(frames(&[true, true]));
        assert_eq!(w.step().unwrap(), StepOutcome::Analyzed { blink: true });
        assert_eq!(w.step().unwrap(), StepOutcome::Analyzed { blink: false });
        assert_eq!(w.step().unwrap(), StepOutcome::Exhausted);
    }

    #[test]
    fn test_miss_keeps_previous_state_and_frame() {
        let mut reads = frames(&[true]);
        reads.push(Ok(FrameRead::Missed));
        let mut w = worker(reads);

        w.step().unwrap();
        let before = w.session().latest_frame().unwrap();
        assert_eq!(w.step().unwrap(), StepOutcome::Missed);

        let after = w.session().latest_frame().unwrap();
        assert_eq!(after.frame.index(), before.frame.index());
        assert!(w.session().snapshot().face_detected);
        assert_eq!(w.session().snapshot().blink_count, 1);
    }

    #[test]
    fn test_empty_frame_counts_as_miss() {
        let mut w = worker(vec![Ok(FrameRead::Frame(Frame::new(Vec::new(), 0, 0, 3, 0)))]);
        assert_eq!(w.step().unwrap(), StepOutcome::Missed);
        assert!(w.session().latest_frame().is_none());
    }

    #[test]
    fn test_misses_are_skipped_by_run() {
        let mut reads = frames(&[false]);
        reads.push(Ok(FrameRead::Missed));
        reads.push(Ok(FrameRead::Missed));
        reads.extend(frames(&[true]));
        let summary = worker(reads).run(&CaptureConfig::default()).unwrap();
        assert_eq!(summary.frames_analyzed, 2);
        assert_eq!(summary.frames_missed, 2);
        assert_eq!(summary.blink_count, 1);
    }

    #[test]
    fn test_frame_limit_stops_run() {
        let config = CaptureConfig {
            max_frames: Some(2),
            ..CaptureConfig::default()
        };
        let summary = worker(frames(&[true, false, true, false]))
            .run(&config)
            .unwrap();
        assert_eq!(summary.frames_analyzed, 2);
        assert_eq!(summary.stop_reason, StopReason::FrameLimit);
    }

    #[test]
    fn test_cancelled_before_start_reads_nothing() {
        let config = CaptureConfig::default();
        config.cancelled.store(true, Ordering::Relaxed);
        let mut w = worker(frames(&[true]));
        let summary = w.run(&config).unwrap();
        assert_eq!(summary.stop_reason, StopReason::Cancelled);
        assert_eq!(summary.frames_analyzed, 0);
        assert!(w.session().latest_frame().is_none());
    }

    /// Never runs dry; raises the stop flag after `stop_after` reads, the
    /// way a Ctrl-C handler would on a live camera.
    struct EndlessCamera {
        reads: usize,
        stop_after: usize,
        cancelled: Arc<AtomicBool>,
    }

    impl FrameSource for EndlessCamera {
        fn open(&mut self) -> Result<SourceInfo, Box<dyn std::error::Error>> {
            Ok(SourceInfo {
                width: 4,
                height: 4,
                fps: 30.0,
                description: "endless".to_string(),
            })
        }

        fn next_frame(&mut self) -> Result<FrameRead, Box<dyn std::error::Error>> {
            self.reads += 1;
            if self.reads == self.stop_after {
                self.cancelled.store(true, Ordering::Relaxed);
            }
            Ok(FrameRead::Frame(frame(self.reads % 2 == 0, self.reads)))
        }

        fn close(&mut self) {}
    }

    #[test]
    fn test_cancel_flag_stops_unbounded_run() {
        let config = CaptureConfig::default();
        let camera = EndlessCamera {
            reads: 0,
            stop_after: 4,
            cancelled: config.cancelled.clone(),
        };
        let mut w = CaptureWorker::new(Box::new(camera), analyzer(), DetectionSession::new());

        let summary = w.run(&config).unwrap();
        assert_eq!(summary.stop_reason, StopReason::Cancelled);
        assert_eq!(summary.frames_analyzed, 4);
        assert_eq!(summary.blink_count, 2);
        // The last frame stays available for a snapshot after the stop.
        assert_eq!(w.session().latest_frame().unwrap().frame.index(), 4);
    }

    #[test]
    fn test_source_error_ends_run() {
        let mut reads = frames(&[true]);
        reads.push(Err("device unplugged".to_string()));
        reads.extend(frames(&[false, true]));
        let mut w = worker(reads);

        let err = w.run(&CaptureConfig::default()).unwrap_err();
        assert!(err.to_string().contains("device unplugged"));
        assert_eq!(w.session().snapshot().blink_count, 1);
    }

    struct FaceOnFirstCallOnly(usize);
    struct NoEyes;
    struct NoCircles;

    impl FaceDetector for FaceOnFirstCallOnly {
        fn detect(&mut self, _gray: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
            self.0 += 1;
            Ok(if self.0 == 1 {
                vec![Region::new(0, 0, 2, 2)]
            } else {
                Vec::new()
            })
        }
    }

    impl EyeDetector for NoEyes {
        fn detect(&mut self, _gray: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
            Ok(Vec::new())
        }
    }

    impl CircleDetector for NoCircles {
        fn detect(&mut self, _gray: &Frame) -> Result<Vec<Circle>, Box<dyn std::error::Error>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_face_flag_reflects_latest_frame_only() {
        let analyzer = FrameAnalyzer::new(
            Box::new(FaceOnFirstCallOnly(0)),
            Box::new(NoEyes),
            Box::new(NoCircles),
            Default::default(),
        );
        let mut w = CaptureWorker::new(
            Box::new(ScriptedSource::new(frames(&[false, false]))),
            analyzer,
            DetectionSession::new(),
        );
        w.step().unwrap();
        assert!(w.session().snapshot().face_detected);
        w.step().unwrap();
        assert!(!w.session().snapshot().face_detected);
    }

    #[test]
    fn test_overlay_changes_published_frame() {
        let mut w = worker(frames(&[false])).with_overlay(true);
        w.step().unwrap();
        let published = w.session().latest_frame().unwrap();
        // Eye box covers the whole 4x4 frame, so its border is green.
        assert_eq!(&published.frame.data()[..3], &[0, 255, 0]);
    }

    #[test]
    fn test_without_overlay_frame_is_published_as_read() {
        let mut w = worker(frames(&[false]));
        w.step().unwrap();
        let published = w.session().latest_frame().unwrap();
        assert!(published.frame.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_open_returns_source_info() {
        let mut w = worker(Vec::new()).with_logger(Box::new(StdoutPipelineLogger::new(1)));
        let info = w.open().unwrap();
        assert_eq!(info.description, "scripted");
    }
}
