use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;

/// Decorator that drops detections too small to classify reliably.
///
/// A box survives only if both its width and height are at least
/// `min_size` pixels.
pub struct MinSizeFaceDetector {
    inner: Box<dyn FaceDetector>,
    min_size: i32,
}

impl MinSizeFaceDetector {
    pub fn new(inner: Box<dyn FaceDetector>, min_size: i32) -> Result<Self, &'static str> {
        if min_size < 0 {
            return Err("min_size must be >= 0");
        }
        Ok(Self { inner, min_size })
    }
}

impl FaceDetector for MinSizeFaceDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<BoundingBox>, Box<dyn std::error::Error>> {
        let boxes = self.inner.detect(frame)?;
        let total = boxes.len();
        let kept: Vec<BoundingBox> = boxes
            .into_iter()
            .filter(|b| b.width >= self.min_size && b.height >= self.min_size)
            .collect();
        if kept.len() < total {
            log::debug!(
                "Frame {}: dropped {} faces below {}px",
                frame.index(),
                total - kept.len(),
                self.min_size
            );
        }
        Ok(kept)
    }
}
