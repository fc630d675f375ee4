use std::collections::BTreeMap;
use std::time::Instant;

/// Cross-cutting logger for capture loop events.
///
/// Decouples the capture worker from the output mechanism so the CLI can
/// print timings while the server stays quiet.
pub trait PipelineLogger: Send {
    /// Report frame-level progress. `total` is 0 for unbounded sources.
    fn progress(&mut self, current: usize, total: usize);

    /// Record how long a named pipeline stage took for one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a point-in-time metric (e.g. eye regions per frame).
    fn metric(&mut self, name: &str, value: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events.
///
/// Used by the HTTP server, where the capture loop runs indefinitely,
/// and by tests.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Running aggregates for one named series.
///
/// Storage stays constant however many samples are pushed, so the logger
/// can sit on an unbounded camera run.
#[derive(Clone, Debug)]
pub struct Series {
    count: usize,
    total: f64,
    min: f64,
    max: f64,
}

impl Default for Series {
    fn default() -> Self {
        Self {
            count: 0,
            total: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl Series {
    fn push(&mut self, value: f64) {
        self.count += 1;
        self.total += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn mean(&self) -> f64 {
        match self.count {
            0 => 0.0,
            n => self.total / n as f64,
        }
    }

    pub fn min(&self) -> Option<f64> {
        (self.count > 0).then_some(self.min)
    }

    pub fn max(&self) -> Option<f64> {
        (self.count > 0).then_some(self.max)
    }
}

/// CLI-oriented logger for the watch loop.
///
/// Keeps per-stage timings and metrics and prints a summary when the loop
/// stops. Progress lines are emitted every `throttle_frames` frames.
pub struct StdoutPipelineLogger {
    throttle_frames: usize,
    timings: BTreeMap<String, Series>,
    metrics: BTreeMap<String, Series>,
    started: Instant,
    frames_seen: usize,
}

impl StdoutPipelineLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            timings: BTreeMap::new(),
            metrics: BTreeMap::new(),
            started: Instant::now(),
            frames_seen: 0,
        }
    }

    /// Formatted end-of-run report, or `None` if nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let elapsed = self.started.elapsed().as_secs_f64();
        let elapsed_ms = elapsed * 1000.0;
        let mut report = format!(
            "Capture summary ({} frames, {elapsed:.1}s total):",
            self.frames_seen
        );

        for (stage, series) in &self.timings {
            let share = if elapsed_ms > 0.0 {
                series.total() / elapsed_ms * 100.0
            } else {
                0.0
            };
            report.push_str(&format!(
                "\n  {stage:12}: avg {:6.1}ms  total {:7.0}ms  ({share:4.1}%)",
                series.mean(),
                series.total()
            ));
        }
        for (name, series) in &self.metrics {
            report.push_str(&format!("\n  {name}: avg {:.1}", series.mean()));
        }
        if self.frames_seen > 0 && elapsed > 0.0 {
            report.push_str(&format!(
                "\n  Throughput: {:.1} fps",
                self.frames_seen as f64 / elapsed
            ));
        }
        Some(report)
    }

    pub fn timings_for(&self, stage: &str) -> Option<&Series> {
        self.timings.get(stage)
    }

    pub fn metrics_for(&self, name: &str) -> Option<&Series> {
        self.metrics.get(name)
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new(30)
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn progress(&mut self, current: usize, total: usize) {
        self.frames_seen = self.frames_seen.max(current);
        let on_beat = current % self.throttle_frames == 0;
        if total == 0 {
            if on_beat {
                log::info!("Processed {current} frames");
            }
        } else if on_beat || current == total {
            let pct = current as f64 / total as f64 * 100.0;
            log::info!("Processing: {current}/{total} frames ({pct:.1}%)");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics.entry(name.to_string()).or_default().push(value);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(report) = self.summary_string() {
            log::info!("\n\n{report}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_logger_accepts_everything() {
        let mut logger = NullPipelineLogger;
        logger.progress(1, 0);
        logger.timing("analyze", 5.0);
        logger.metric("eyes", 2.0);
        logger.info("Blinks detected: 1");
        logger.summary();
    }

    #[test]
    fn test_timing_records_values() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.timing("analyze", 20.0);
        logger.timing("analyze", 30.0);
        logger.timing("read", 5.0);

        let analyze = logger.timings_for("analyze").unwrap();
        assert_eq!(analyze.count(), 2);
        approx::assert_abs_diff_eq!(analyze.total(), 50.0);
        approx::assert_abs_diff_eq!(analyze.mean(), 25.0);
        assert_eq!(analyze.min(), Some(20.0));
        assert_eq!(analyze.max(), Some(30.0));
        assert_eq!(logger.timings_for("read").unwrap().count(), 1);
        assert!(logger.timings_for("encode").is_none());
    }

    #[test]
    fn test_long_run_keeps_constant_state() {
        let mut logger = StdoutPipelineLogger::new(1000);
        for i in 1..=200_000 {
            logger.progress(i, 0);
            logger.timing("read", 2.0);
            logger.timing("analyze", (i % 2) as f64 * 10.0);
            logger.metric("eyes", 2.0);
            logger.info("Blink detected");
        }

        assert_eq!(logger.timings.len(), 2);
        assert_eq!(logger.metrics.len(), 1);
        let analyze = logger.timings_for("analyze").unwrap();
        assert_eq!(analyze.count(), 200_000);
        approx::assert_abs_diff_eq!(analyze.mean(), 5.0);
        assert_eq!(analyze.min(), Some(0.0));
        assert_eq!(analyze.max(), Some(10.0));
        approx::assert_abs_diff_eq!(logger.metrics_for("eyes").unwrap().mean(), 2.0);
    }

    #[test]
    fn test_empty_series_has_no_extremes() {
        let series = Series::default();
        assert_eq!(series.count(), 0);
        approx::assert_abs_diff_eq!(series.mean(), 0.0);
        assert!(series.min().is_none());
        assert!(series.max().is_none());
    }

    #[test]
    fn test_metric_average_in_summary() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.progress(2, 0);
        logger.metric("eyes", 1.0);
        logger.metric("eyes", 2.0);

        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("eyes: avg 1.5"));
    }

    #[test]
    fn test_summary_reports_stages_and_throughput() {
        let mut logger = StdoutPipelineLogger::new(10);
        for i in 1..=5 {
            logger.progress(i, 0);
        }
        logger.timing("analyze", 12.0);
        logger.timing("read", 3.0);

        let summary = logger.summary_string().unwrap();
        assert!(summary.starts_with("Capture summary (5 frames"));
        assert!(summary.contains("analyze"));
        assert!(summary.contains("read"));
        assert!(summary.contains("fps"));
    }

    #[test]
    fn test_empty_summary_returns_none() {
        assert!(StdoutPipelineLogger::new(10).summary_string().is_none());
    }

    #[test]
    fn test_unbounded_progress_counts_frames() {
        let mut logger = StdoutPipelineLogger::new(3);
        for i in 1..=7 {
            logger.progress(i, 0);
        }
        assert_eq!(logger.frames_seen, 7);
    }

    #[test]
    fn test_bounded_progress_counts_frames() {
        let mut logger = StdoutPipelineLogger::new(10);
        for i in 1..=20 {
            logger.progress(i, 20);
        }
        assert_eq!(logger.frames_seen, 20);
    }

    #[test]
    fn test_zero_throttle_is_raised_to_one() {
        let logger = StdoutPipelineLogger::new(0);
        assert_eq!(logger.throttle_frames, 1);
    }

    #[test]
    fn test_default_throttle() {
        assert_eq!(StdoutPipelineLogger::default().throttle_frames, 30);
    }
}
