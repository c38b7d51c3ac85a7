use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::detection::infrastructure::cached_face_detector::{CachedFaceDetector, RecordedFaces};
use crate::emotion::domain::emotion_classifier::ClassifierOutcome;
use crate::emotion::infrastructure::replay_classifier::{OutcomeCache, ReplayEmotionClassifier};
use crate::shared::bounding_box::BoundingBox;
use crate::shared::constants::MAX_TRACE_DIMENSION;
use crate::shared::frame::Frame;
use crate::video::domain::frame_source::FrameSource;

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("failed to read trace {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse trace {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("malformed trace: {0}")]
    Invalid(String),
}

/// One detected face and, if the classifier ran on it, what it returned.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraceFace {
    pub bbox: BoundingBox,
    #[serde(default)]
    pub outcome: Option<ClassifierOutcome>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TraceFrame {
    #[serde(default)]
    pub faces: Vec<TraceFace>,
}

/// A recorded session: frame geometry plus the detector and classifier
/// output for every frame, in order.
///
/// ```json
/// {"width": 640, "height": 480, "frames": [
///   {"faces": [{"bbox": {"x": 10, "y": 20, "width": 80, "height": 80},
///               "outcome": {"kind": "emotion", "label": "Happy", "confidence": 0.9}}]},
///   {"faces": []}
/// ]}
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionTrace {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub frames: Vec<TraceFrame>,
}

/// The replay components a trace splits into.
pub struct TraceParts {
    pub source: TraceFrameSource,
    pub detector: CachedFaceDetector,
    pub classifier: ReplayEmotionClassifier,
}

impl SessionTrace {
    pub fn load(path: &Path) -> Result<Self, TraceError> {
        let json = fs::read_to_string(path).map_err(|source| TraceError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let trace: Self = serde_json::from_str(&json).map_err(|source| TraceError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        trace.validate()?;
        Ok(trace)
    }

    pub fn validate(&self) -> Result<(), TraceError> {
        if self.width == 0 || self.height == 0 {
            return Err(TraceError::Invalid(format!(
                "frame size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.width > MAX_TRACE_DIMENSION || self.height > MAX_TRACE_DIMENSION {
            return Err(TraceError::Invalid(format!(
                "frame size {}x{} exceeds {MAX_TRACE_DIMENSION} pixels per side",
                self.width, self.height
            )));
        }
        for (index, frame) in self.frames.iter().enumerate() {
            for face in &frame.faces {
                let b = face.bbox;
                if b.width < 0 || b.height < 0 {
                    return Err(TraceError::Invalid(format!(
                        "frame {index}: negative box size {}x{}",
                        b.width, b.height
                    )));
                }
                if !b.edges_fit_i32() {
                    return Err(TraceError::Invalid(format!(
                        "frame {index}: box at ({}, {}) size {}x{} overflows pixel coordinates",
                        b.x, b.y, b.width, b.height
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn into_parts(self) -> TraceParts {
        let mut detections: RecordedFaces = HashMap::new();
        let mut outcomes: OutcomeCache = HashMap::new();

        for (index, frame) in self.frames.iter().enumerate() {
            detections.insert(index, frame.faces.iter().map(|f| f.bbox).collect());
            for face in &frame.faces {
                if let Some(outcome) = &face.outcome {
                    outcomes.insert((index, face.bbox), outcome.clone());
                }
            }
        }

        TraceParts {
            source: TraceFrameSource::new(self.width, self.height, self.frames.len()),
            detector: CachedFaceDetector::new(Arc::new(detections)),
            classifier: ReplayEmotionClassifier::new(Arc::new(outcomes)),
        }
    }
}

/// Yields blank frames of the trace's size; pixel content is irrelevant
/// because detection and classification are replayed.
pub struct TraceFrameSource {
    width: u32,
    height: u32,
    frame_count: usize,
    next: usize,
}

impl TraceFrameSource {
    pub fn new(width: u32, height: u32, frame_count: usize) -> Self {
        Self {
            width,
            height,
            frame_count,
            next: 0,
        }
    }
}

impl FrameSource for TraceFrameSource {
    fn total_frames(&self) -> usize {
        self.frame_count
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        let (width, height) = (self.width, self.height);
        let start = self.next;
        self.next = self.frame_count;
        Box::new((start..self.frame_count).map(move |i| Ok(Frame::blank(width, height, i))))
    }

    fn close(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::face_detector::FaceDetector;
    use crate::emotion::domain::emotion_classifier::{Classification, EmotionClassifier};
    use crate::shared::face_crop::FaceCrop;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const TRACE: &str = r#"{
        "width": 320,
        "height": 240,
        "frames": [
            {"faces": [
                {"bbox": {"x": 10, "y": 20, "width": 80, "height": 80},
                 "outcome": {"kind": "emotion", "label": "Happy", "confidence": 0.9,
                             "distribution": {"Happy": 0.9, "Sad": 0.1}}},
                {"bbox": {"x": 200, "y": 20, "width": 60, "height": 60},
                 "outcome": {"kind": "no_face"}}
            ]},
            {},
            {"faces": [{"bbox": {"x": 12, "y": 22, "width": 80, "height": 80}}]}
        ]
    }"#;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_parses_frames_and_outcomes() {
        let file = write_temp(TRACE);

        let trace = SessionTrace::load(file.path()).unwrap();

        assert_eq!((trace.width, trace.height), (320, 240));
        assert_eq!(trace.frame_count(), 3);
        assert_eq!(trace.frames[0].faces.len(), 2);
        assert!(trace.frames[1].faces.is_empty());
        assert_eq!(trace.frames[0].faces[1].outcome, Some(ClassifierOutcome::NoFace));
        assert_eq!(trace.frames[2].faces[0].outcome, None);
        match &trace.frames[0].faces[0].outcome {
            Some(ClassifierOutcome::Emotion(c)) => {
                assert_eq!(c.label, "Happy");
                assert_eq!(c.distribution.len(), 2);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_missing_file() {
        let err = SessionTrace::load(Path::new("/nonexistent/trace.json")).unwrap_err();
        assert!(matches!(err, TraceError::Read { .. }));
    }

    #[test]
    fn test_bad_json() {
        let file = write_temp("{\"width\": 10,");
        let err = SessionTrace::load(file.path()).unwrap_err();
        assert!(matches!(err, TraceError::Parse { .. }));
        assert!(err.to_string().starts_with("failed to parse trace"));
    }

    #[test]
    fn test_zero_size_is_invalid() {
        let file = write_temp(r#"{"width": 0, "height": 240, "frames": []}"#);
        let err = SessionTrace::load(file.path()).unwrap_err();
        assert!(matches!(err, TraceError::Invalid(_)));
    }

    #[test]
    fn test_negative_box_is_invalid() {
        let file = write_temp(
            r#"{"width": 100, "height": 100, "frames": [
                {"faces": [{"bbox": {"x": 0, "y": 0, "width": -5, "height": 10}}]}
            ]}"#,
        );
        let err = SessionTrace::load(file.path()).unwrap_err();
        assert_eq!(err.to_string(), "malformed trace: frame 0: negative box size -5x10");
    }

    #[test]
    fn test_box_edge_past_coordinate_range_is_invalid() {
        let file = write_temp(
            r#"{"width": 640, "height": 480, "frames": [
                {"faces": [{"bbox": {"x": 2147483600, "y": 0, "width": 100, "height": 10}}]}
            ]}"#,
        );
        let err = SessionTrace::load(file.path()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "malformed trace: frame 0: box at (2147483600, 0) size 100x10 overflows pixel coordinates"
        );
    }

    #[test]
    fn test_box_ending_at_coordinate_limit_is_accepted() {
        let file = write_temp(
            r#"{"width": 640, "height": 480, "frames": [
                {"faces": [{"bbox": {"x": 2147483547, "y": 0, "width": 100, "height": 10}}]}
            ]}"#,
        );
        assert!(SessionTrace::load(file.path()).is_ok());
    }

    #[test]
    fn test_oversized_frame_is_invalid() {
        let file = write_temp(r#"{"width": 16385, "height": 240, "frames": []}"#);
        let err = SessionTrace::load(file.path()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "malformed trace: frame size 16385x240 exceeds 16384 pixels per side"
        );

        let file = write_temp(r#"{"width": 16384, "height": 16384, "frames": []}"#);
        assert!(SessionTrace::load(file.path()).is_ok());
    }

    #[test]
    fn test_into_parts_replays_detections_and_outcomes() {
        let file = write_temp(TRACE);
        let TraceParts {
            mut source,
            mut detector,
            mut classifier,
        } = SessionTrace::load(file.path()).unwrap().into_parts();

        assert_eq!(source.total_frames(), 3);
        let frames: Vec<Frame> = source.frames().map(|f| f.unwrap()).collect();
        assert_eq!(frames.len(), 3);
        assert_eq!((frames[0].width(), frames[0].height()), (320, 240));
        assert_eq!(frames[2].index(), 2);

        let boxes = detector.detect(&frames[0]).unwrap();
        assert_eq!(boxes.len(), 2);
        assert!(detector.detect(&frames[1]).unwrap().is_empty());

        let crop = FaceCrop::extract(&frames[0], &boxes[0], 0.2).unwrap();
        assert_eq!(
            classifier.classify(&crop).unwrap(),
            ClassifierOutcome::Emotion(Classification {
                label: "Happy".to_string(),
                confidence: 0.9,
                distribution: [("Happy".to_string(), 0.9), ("Sad".to_string(), 0.1)]
                    .into_iter()
                    .collect(),
            })
        );

        let unrecorded = detector.detect(&frames[2]).unwrap();
        let crop = FaceCrop::extract(&frames[2], &unrecorded[0], 0.2).unwrap();
        assert_eq!(classifier.classify(&crop).unwrap(), ClassifierOutcome::Unknown);
    }

    #[test]
    fn test_frames_are_yielded_once() {
        let mut source = TraceFrameSource::new(8, 8, 2);
        assert_eq!(source.frames().count(), 2);
        assert_eq!(source.frames().count(), 0);
    }
}
