use std::collections::BTreeMap;
use std::time::Instant;

/// Cross-cutting logger for per-frame pipeline events.
///
/// The orchestrator reports stage timings and metrics here; executors report
/// progress. Callers pick the output mechanism without touching the frame
/// loop.
pub trait PipelineLogger: Send {
    /// Report frame-level progress. `total` is 0 when the source length is unknown.
    fn progress(&mut self, current: usize, total: usize);

    /// Record how long a named stage took for one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a point-in-time metric (e.g. live face count).
    fn metric(&mut self, name: &str, value: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-session summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Count, sum and maximum of a stream of samples in constant space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RunningStat {
    count: usize,
    sum: f64,
    max: f64,
}

impl RunningStat {
    pub fn record(&mut self, value: f64) {
        self.max = if self.count == 0 { value } else { self.max.max(value) };
        self.count += 1;
        self.sum += value;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// CLI logger: forwards progress and status lines to `log` and folds
/// timings and metrics into running statistics for the session summary.
///
/// Stored state grows with the number of distinct stage and metric names,
/// never with session length.
pub struct StdoutPipelineLogger {
    throttle_frames: usize,
    started: Instant,
    frames_seen: usize,
    stages: BTreeMap<String, RunningStat>,
    metrics: BTreeMap<String, RunningStat>,
}

impl StdoutPipelineLogger {
    /// Progress lines are logged every `throttle_frames` frames and on the last one.
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            started: Instant::now(),
            frames_seen: 0,
            stages: BTreeMap::new(),
            metrics: BTreeMap::new(),
        }
    }

    pub fn stage(&self, stage: &str) -> Option<&RunningStat> {
        self.stages.get(stage)
    }

    pub fn metric_stat(&self, name: &str) -> Option<&RunningStat> {
        self.metrics.get(name)
    }

    /// Number of distinct stages and metrics tracked.
    pub fn tracked_series(&self) -> usize {
        self.stages.len() + self.metrics.len()
    }

    /// Multi-line session summary, `None` before anything was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.tracked_series() == 0 {
            return None;
        }

        let elapsed = self.started.elapsed().as_secs_f64();
        let mut out = format!(
            "Session summary ({} frames, {elapsed:.1}s total):",
            self.frames_seen
        );

        for (stage, stat) in &self.stages {
            let share = if elapsed > 0.0 {
                stat.sum() / (elapsed * 1000.0) * 100.0
            } else {
                0.0
            };
            out.push_str(&format!(
                "\n  {stage:10}: avg {:6.2}ms  max {:6.2}ms  ({share:4.1}%)",
                stat.mean(),
                stat.max()
            ));
        }
        for (name, stat) in &self.metrics {
            out.push_str(&format!(
                "\n  {name}: avg {:.1}  max {:.0}",
                stat.mean(),
                stat.max()
            ));
        }
        if self.frames_seen > 0 && elapsed > 0.0 {
            out.push_str(&format!(
                "\n  Throughput: {:.1} fps",
                self.frames_seen as f64 / elapsed
            ));
        }
        Some(out)
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new(100)
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn progress(&mut self, current: usize, total: usize) {
        self.frames_seen = current;
        let last = total > 0 && current == total;
        if current % self.throttle_frames != 0 && !last {
            return;
        }
        match total {
            0 => log::info!("Processing: {current} frames"),
            _ => log::info!(
                "Processing: {current}/{total} frames ({:.1}%)",
                current as f64 / total as f64 * 100.0
            ),
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        match self.stages.get_mut(stage) {
            Some(stat) => stat.record(duration_ms),
            None => {
                let mut stat = RunningStat::default();
                stat.record(duration_ms);
                self.stages.insert(stage.to_string(), stat);
            }
        }
    }

    fn metric(&mut self, name: &str, value: f64) {
        match self.metrics.get_mut(name) {
            Some(stat) => stat.record(value),
            None => {
                let mut stat = RunningStat::default();
                stat.record(value);
                self.metrics.insert(name.to_string(), stat);
            }
        }
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
