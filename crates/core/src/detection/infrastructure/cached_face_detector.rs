use std::collections::HashMap;
use std::sync::Arc;

use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;

/// Faces recorded per frame index, shared between replay components.
pub type RecordedFaces = HashMap<usize, Vec<BoundingBox>>;

/// Detector stand-in that hands back the faces a session trace recorded
/// for each frame, so tracking and smoothing can be replayed offline.
/// Frames absent from the recording have no faces.
pub struct CachedFaceDetector {
    recorded: Arc<RecordedFaces>,
}

impl CachedFaceDetector {
    pub fn new(recorded: Arc<RecordedFaces>) -> Self {
        Self { recorded }
    }
}

impl FaceDetector for CachedFaceDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<BoundingBox>, Box<dyn std::error::Error>> {
        let faces = match self.recorded.get(&frame.index()) {
            Some(faces) => faces.clone(),
            None => Vec::new(),
        };
        Ok(faces)
    }
}
