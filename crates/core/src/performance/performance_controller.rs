use std::collections::VecDeque;

use crate::shared::constants::{DEFAULT_PERFORMANCE_CHECK_INTERVAL, DEFAULT_TARGET_FPS};

/// Below this fraction of the target rate the pipeline is behind.
pub const BEHIND_RATIO: f64 = 0.8;
/// Above this fraction of the target rate the pipeline has slack.
pub const AHEAD_RATIO: f64 = 1.2;
/// Floor on mean latency so a burst of near-zero samples cannot yield infinite fps.
pub const MIN_FRAME_SECONDS: f64 = 0.001;

const BEHIND_SKIP_INCREASE: usize = 2;
const AHEAD_SKIP_DECREASE: usize = 1;

/// Where observed throughput sits relative to the hysteresis band.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PerformanceState {
    Behind,
    OnTarget,
    Ahead,
}

/// Tracks recent frame latencies and recommends a classification cadence.
///
/// Decisions are taken once every `check_interval` frames, and only after
/// the latency window has filled, so a single slow frame cannot swing the
/// cadence.
pub struct PerformanceController {
    target_fps: f64,
    check_interval: usize,
    window: VecDeque<f64>,
    frame_count: usize,
}

impl PerformanceController {
    pub fn new(target_fps: f64, check_interval: usize) -> Self {
        let check_interval = check_interval.max(1);
        Self {
            target_fps,
            check_interval,
            window: VecDeque::with_capacity(check_interval),
            frame_count: 0,
        }
    }

    pub fn record_frame(&mut self, duration_seconds: f64) {
        if self.window.len() == self.check_interval {
            self.window.pop_front();
        }
        self.window.push_back(duration_seconds.max(0.0));
        self.frame_count += 1;
    }

    pub fn due_for_adjustment(&self) -> bool {
        self.frame_count % self.check_interval == 0 && self.window.len() == self.check_interval
    }

    /// Observed frames per second over the window; assumes on-target until
    /// at least two samples exist.
    pub fn current_fps(&self) -> f64 {
        if self.window.len() < 2 {
            return self.target_fps;
        }
        let mean = self.window.iter().sum::<f64>() / self.window.len() as f64;
        1.0 / mean.max(MIN_FRAME_SECONDS)
    }

    pub fn state(&self) -> PerformanceState {
        let fps = self.current_fps();
        if fps < self.target_fps * BEHIND_RATIO {
            PerformanceState::Behind
        } else if fps > self.target_fps * AHEAD_RATIO {
            PerformanceState::Ahead
        } else {
            PerformanceState::OnTarget
        }
    }

    /// Skip cadence for the current state, clamped to `[1, max_skip]`.
    pub fn recommend_skip(&self, base_skip: usize, max_skip: usize) -> usize {
        let max_skip = max_skip.max(1);
        match self.state() {
            PerformanceState::Behind => max_skip.min(base_skip + BEHIND_SKIP_INCREASE),
            PerformanceState::Ahead => base_skip.saturating_sub(AHEAD_SKIP_DECREASE).max(1),
            PerformanceState::OnTarget => base_skip.clamp(1, max_skip),
        }
    }

    pub fn target_fps(&self) -> f64 {
        self.target_fps
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn window_len(&self) -> usize {
        self.window.len()
    }
}

impl Default for PerformanceController {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_FPS, DEFAULT_PERFORMANCE_CHECK_INTERVAL)
    }
}
