use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::detection::domain::face_detector::FaceDetector;
use crate::emotion::domain::emotion_classifier::{ClassifierOutcome, EmotionClassifier};
use crate::emotion::domain::emotion_smoother::EmotionSmoother;
use crate::emotion::domain::label_filter::LabelFilter;
use crate::performance::performance_controller::PerformanceController;
use crate::pipeline::frame_clock::{FrameClock, SystemClock};
use crate::pipeline::pipeline_logger::{NullPipelineLogger, PipelineLogger};
use crate::shared::bounding_box::BoundingBox;
use crate::shared::config::{ConfigError, EmotionPipelineConfig, MatcherKind};
use crate::shared::face_crop::FaceCrop;
use crate::shared::frame::Frame;
use crate::tracking::domain::face_tracker::FaceTracker;
use crate::tracking::domain::track_matcher::TrackMatcher;
use crate::tracking::infrastructure::greedy_matcher::GreedyMatcher;
use crate::tracking::infrastructure::hungarian_matcher::HungarianMatcher;

/// One tracked face as rendered for a frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FaceReport {
    pub track_id: u64,
    pub bbox: BoundingBox,
    pub label: String,
    pub confidence: f64,
}

/// Everything the orchestrator decided for one frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub frame_index: usize,
    /// Live tracks in ascending id order.
    pub faces: Vec<FaceReport>,
    pub fps: f64,
    /// Cadence in effect after this frame's adjustment check.
    pub skip_cadence: usize,
    /// Whether the classifier ran on this frame.
    pub classified: bool,
}

/// Drives detect → track → classify → smooth for one frame at a time.
///
/// Owns the tracker, smoother and performance controller; nothing else
/// mutates them. Classification runs on frames whose 1-based counter is a
/// multiple of the current skip cadence, and the cadence is re-evaluated
/// whenever the performance controller is due.
pub struct FrameOrchestrator {
    detector: Box<dyn FaceDetector>,
    classifier: Box<dyn EmotionClassifier>,
    tracker: FaceTracker,
    smoother: EmotionSmoother,
    controller: PerformanceController,
    label_filter: LabelFilter,
    base_skip: usize,
    max_skip: usize,
    crop_padding_ratio: f64,
    skip_cadence: usize,
    frame_counter: usize,
    logger: Box<dyn PipelineLogger>,
    clock: Box<dyn FrameClock>,
}

impl FrameOrchestrator {
    pub fn from_config(
        config: &EmotionPipelineConfig,
        detector: Box<dyn FaceDetector>,
        classifier: Box<dyn EmotionClassifier>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            detector,
            classifier,
            tracker: FaceTracker::with_matcher(
                config.tracking_iou_threshold,
                config.max_missing_frames,
                matcher_for(config.matcher),
            ),
            smoother: EmotionSmoother::new(config.smoothing_window),
            controller: PerformanceController::new(
                config.target_fps,
                config.performance_check_interval,
            ),
            label_filter: LabelFilter::new(config.excluded_labels.iter().cloned()),
            base_skip: config.base_skip,
            max_skip: config.max_skip,
            crop_padding_ratio: config.crop_padding_ratio,
            skip_cadence: config.base_skip,
            frame_counter: 0,
            logger: Box::new(NullPipelineLogger),
            clock: Box::new(SystemClock),
        })
    }

    pub fn with_logger(mut self, logger: Box<dyn PipelineLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn FrameClock>) -> Self {
        self.clock = clock;
        self
    }

    /// Runs the full per-frame sequence.
    ///
    /// A detector error is returned before any tracker, smoother or
    /// controller state changes. Classifier failures never propagate.
    pub fn process_frame(
        &mut self,
        frame: &Frame,
    ) -> Result<FrameReport, Box<dyn std::error::Error>> {
        let frame_start = self.clock.now();

        let t = Instant::now();
        let detections = self.detector.detect(frame)?;
        self.logger.timing("detect", elapsed_ms(t));

        self.frame_counter += 1;

        let t = Instant::now();
        let live = self.tracker.update(&detections);
        self.logger.timing("track", elapsed_ms(t));
        self.logger.metric("faces", live.len() as f64);

        let classified = self.frame_counter % self.skip_cadence == 0;
        if classified {
            let t = Instant::now();
            self.classify_tracks(frame, &live);
            self.logger.timing("classify", elapsed_ms(t));
        }

        let t = Instant::now();
        let live_ids: BTreeSet<u64> = live.keys().copied().collect();
        self.smoother.cleanup(&live_ids);
        let faces = live
            .iter()
            .map(|(&track_id, &bbox)| {
                let smoothed = self.smoother.query(track_id);
                FaceReport {
                    track_id,
                    bbox,
                    label: smoothed.label,
                    confidence: smoothed.confidence,
                }
            })
            .collect();
        self.logger.timing("smooth", elapsed_ms(t));

        let frame_seconds = self
            .clock
            .now()
            .saturating_duration_since(frame_start)
            .as_secs_f64();
        self.controller.record_frame(frame_seconds);
        self.adjust_cadence();

        Ok(FrameReport {
            frame_index: frame.index(),
            faces,
            fps: self.controller.current_fps(),
            skip_cadence: self.skip_cadence,
            classified,
        })
    }

    fn classify_tracks(&mut self, frame: &Frame, live: &BTreeMap<u64, BoundingBox>) {
        for (&track_id, bbox) in live {
            let outcome = match FaceCrop::extract(frame, bbox, self.crop_padding_ratio) {
                None => ClassifierOutcome::NoFace,
                Some(crop) => match self.classifier.classify(&crop) {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        log::warn!(
                            "Frame {}: classifier failed for track {track_id}: {e}",
                            frame.index()
                        );
                        ClassifierOutcome::Error
                    }
                },
            };

            match self.label_filter.apply(outcome) {
                ClassifierOutcome::Emotion(c) => {
                    self.smoother.add_sample(track_id, c.label, c.confidence)
                }
                sentinel => log::debug!(
                    "Frame {}: discarding {sentinel:?} for track {track_id}",
                    frame.index()
                ),
            }
        }
    }

    fn adjust_cadence(&mut self) {
        if !self.controller.due_for_adjustment() {
            return;
        }
        let recommended = self.controller.recommend_skip(self.base_skip, self.max_skip);
        if recommended == self.skip_cadence {
            return;
        }
        let message = format!(
            "Skip cadence {} -> {recommended} ({:.1} fps, target {:.1})",
            self.skip_cadence,
            self.controller.current_fps(),
            self.controller.target_fps()
        );
        self.logger.info(&message);
        self.skip_cadence = recommended;
    }

    pub fn skip_cadence(&self) -> usize {
        self.skip_cadence
    }

    pub fn current_fps(&self) -> f64 {
        self.controller.current_fps()
    }

    /// Number of frames processed so far.
    pub fn frame_counter(&self) -> usize {
        self.frame_counter
    }

    pub fn tracker(&self) -> &FaceTracker {
        &self.tracker
    }

    pub fn smoother(&self) -> &EmotionSmoother {
        &self.smoother
    }

    pub fn controller(&self) -> &PerformanceController {
        &self.controller
    }

    pub fn logger(&self) -> &dyn PipelineLogger {
        self.logger.as_ref()
    }

    pub fn logger_mut(&mut self) -> &mut dyn PipelineLogger {
        self.logger.as_mut()
    }
}

fn matcher_for(kind: MatcherKind) -> Box<dyn TrackMatcher> {
    match kind {
        MatcherKind::Greedy => Box::new(GreedyMatcher),
        MatcherKind::Hungarian => Box::new(HungarianMatcher),
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
